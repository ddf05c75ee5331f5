//! Opcodes for the graft class format
//!
//! This module defines the instruction set recognized by the weaving engine.
//! Opcodes carry symbolic operands in the structured list form (see
//! [`crate::insn`]); the byte values below are only the encoding tags.

use serde::{Deserialize, Serialize};

/// Opcode enumeration
///
/// All opcodes are single-byte tags. Operand layout depends on the
/// instruction kind and is handled by the structured instruction list.
///
/// Opcodes are organized into categories:
/// - 0x00-0x0F: Stack manipulation & constants
/// - 0x10-0x1F: Local variables
/// - 0x20-0x3F: Arithmetic (per operator, per operand width)
/// - 0x40-0x4F: Numeric conversions
/// - 0x50-0x5F: Comparisons
/// - 0x90-0x9F: Control flow
/// - 0xA0-0xAF: Calls & returns
/// - 0xB0-0xBF: Object operations
/// - 0xC0-0xCF: Array operations
/// - 0xE0-0xEF: Synchronization & error handling
/// - 0xF0: Label pseudo-instruction
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Stack Manipulation & Constants (0x00-0x0F) =====
    /// No operation
    Nop = 0x00,
    /// Pop top value from stack
    Pop = 0x01,
    /// Duplicate top stack value
    Dup = 0x02,
    /// Swap top two stack values
    Swap = 0x03,

    /// Push null constant
    ConstNull = 0x04,
    /// Push true constant
    ConstTrue = 0x05,
    /// Push false constant
    ConstFalse = 0x06,
    /// Push 32-bit integer constant
    ConstI32 = 0x07,
    /// Push 64-bit integer constant
    ConstI64 = 0x08,
    /// Push 32-bit float constant
    ConstF32 = 0x09,
    /// Push 64-bit float constant
    ConstF64 = 0x0A,
    /// Push string constant
    ConstStr = 0x0B,

    // ===== Local Variables (0x10-0x1F) =====
    /// Load local slot onto stack
    LoadLocal = 0x10,
    /// Store top of stack to local slot
    StoreLocal = 0x11,
    /// Increment local slot by a signed delta
    IncLocal = 0x12,

    // ===== 32-bit Integer Arithmetic (0x20-0x27) =====
    /// i32 addition: pop b, pop a, push a + b
    I32Add = 0x20,
    /// i32 subtraction
    I32Sub = 0x21,
    /// i32 multiplication
    I32Mul = 0x22,
    /// i32 division
    I32Div = 0x23,
    /// i32 remainder
    I32Rem = 0x24,
    /// i32 negation
    I32Neg = 0x25,

    // ===== 64-bit Integer Arithmetic (0x28-0x2F) =====
    /// i64 addition
    I64Add = 0x28,
    /// i64 subtraction
    I64Sub = 0x29,
    /// i64 multiplication
    I64Mul = 0x2A,
    /// i64 division
    I64Div = 0x2B,
    /// i64 remainder
    I64Rem = 0x2C,
    /// i64 negation
    I64Neg = 0x2D,

    // ===== 32-bit Float Arithmetic (0x30-0x37) =====
    /// f32 addition
    F32Add = 0x30,
    /// f32 subtraction
    F32Sub = 0x31,
    /// f32 multiplication
    F32Mul = 0x32,
    /// f32 division
    F32Div = 0x33,
    /// f32 remainder
    F32Rem = 0x34,
    /// f32 negation
    F32Neg = 0x35,

    // ===== 64-bit Float Arithmetic (0x38-0x3F) =====
    /// f64 addition
    F64Add = 0x38,
    /// f64 subtraction
    F64Sub = 0x39,
    /// f64 multiplication
    F64Mul = 0x3A,
    /// f64 division
    F64Div = 0x3B,
    /// f64 remainder
    F64Rem = 0x3C,
    /// f64 negation
    F64Neg = 0x3D,

    // ===== Numeric Conversions (0x40-0x4F) =====
    /// i32 to i64
    I32ToI64 = 0x40,
    /// i32 to f32
    I32ToF32 = 0x41,
    /// i32 to f64
    I32ToF64 = 0x42,
    /// i64 to i32
    I64ToI32 = 0x43,
    /// i64 to f64
    I64ToF64 = 0x44,
    /// f32 to f64
    F32ToF64 = 0x45,
    /// f64 to i32
    F64ToI32 = 0x46,
    /// f64 to f32
    F64ToF32 = 0x47,

    // ===== Comparisons (0x50-0x5F) =====
    /// i32 equality: pop b, pop a, push a == b
    I32Eq = 0x50,
    /// i32 inequality
    I32Ne = 0x51,
    /// i32 less than
    I32Lt = 0x52,
    /// i32 less or equal
    I32Le = 0x53,
    /// i32 greater than
    I32Gt = 0x54,
    /// i32 greater or equal
    I32Ge = 0x55,
    /// i64 three-way comparison: push -1/0/1
    I64Cmp = 0x58,
    /// f32 three-way comparison
    F32Cmp = 0x59,
    /// f64 three-way comparison
    F64Cmp = 0x5A,

    // ===== Control Flow (0x90-0x9F) =====
    /// Unconditional jump to label
    Jump = 0x90,
    /// Jump if false: pop a, if !a jump
    JumpIfFalse = 0x91,
    /// Jump if true: pop a, if a jump
    JumpIfTrue = 0x92,
    /// Jump if null: pop a, if a == null jump
    JumpIfNull = 0x93,
    /// Jump if not null: pop a, if a != null jump
    JumpIfNonNull = 0x94,
    /// Multi-way branch over i32 keys
    Switch = 0x95,

    // ===== Calls & Returns (0xA0-0xAF) =====
    /// Call instance method (pops receiver + args)
    CallVirtual = 0xA0,
    /// Call static method
    CallStatic = 0xA1,
    /// Call constructor or superclass method directly
    CallSpecial = 0xA2,
    /// Return top of stack
    Return = 0xA3,
    /// Return from void method
    ReturnVoid = 0xA4,

    // ===== Object Operations (0xB0-0xBF) =====
    /// Allocate new object of named type
    New = 0xB0,
    /// Load instance field: pop object, push value
    GetField = 0xB1,
    /// Store instance field: pop value, pop object
    PutField = 0xB2,
    /// Load static field
    GetStatic = 0xB3,
    /// Store static field
    PutStatic = 0xB4,
    /// Cast check: pop object, push object or throw
    CheckCast = 0xB5,
    /// Type test: pop object, push boolean
    InstanceOf = 0xB6,

    // ===== Array Operations (0xC0-0xCF) =====
    /// Create new array: pop length, push array
    NewArray = 0xC0,
    /// Create multi-dimensional array: pop dims lengths
    MultiNewArray = 0xC1,
    /// Load array element: pop index, pop array, push element
    LoadElem = 0xC2,
    /// Store array element: pop value, pop index, pop array
    StoreElem = 0xC3,
    /// Get array length: pop array, push length
    ArrayLen = 0xC4,

    // ===== Synchronization & Error Handling (0xE0-0xEF) =====
    /// Enter monitor: pop object
    MonitorEnter = 0xE0,
    /// Exit monitor: pop object
    MonitorExit = 0xE1,
    /// Throw exception: pop error value
    Throw = 0xE2,

    // ===== Pseudo-instructions (0xF0) =====
    /// Label definition (no runtime effect)
    Label = 0xF0,
}

/// Arithmetic operator, used to refine arithmetic point queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Remainder
    Rem,
    /// Negation
    Neg,
}

/// Numeric operand width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumWidth {
    /// 32-bit integer
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl Opcode {
    /// Convert byte to opcode
    ///
    /// Returns None if the byte does not correspond to a valid opcode.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Nop),
            0x01 => Some(Self::Pop),
            0x02 => Some(Self::Dup),
            0x03 => Some(Self::Swap),
            0x04 => Some(Self::ConstNull),
            0x05 => Some(Self::ConstTrue),
            0x06 => Some(Self::ConstFalse),
            0x07 => Some(Self::ConstI32),
            0x08 => Some(Self::ConstI64),
            0x09 => Some(Self::ConstF32),
            0x0A => Some(Self::ConstF64),
            0x0B => Some(Self::ConstStr),

            0x10 => Some(Self::LoadLocal),
            0x11 => Some(Self::StoreLocal),
            0x12 => Some(Self::IncLocal),

            0x20 => Some(Self::I32Add),
            0x21 => Some(Self::I32Sub),
            0x22 => Some(Self::I32Mul),
            0x23 => Some(Self::I32Div),
            0x24 => Some(Self::I32Rem),
            0x25 => Some(Self::I32Neg),

            0x28 => Some(Self::I64Add),
            0x29 => Some(Self::I64Sub),
            0x2A => Some(Self::I64Mul),
            0x2B => Some(Self::I64Div),
            0x2C => Some(Self::I64Rem),
            0x2D => Some(Self::I64Neg),

            0x30 => Some(Self::F32Add),
            0x31 => Some(Self::F32Sub),
            0x32 => Some(Self::F32Mul),
            0x33 => Some(Self::F32Div),
            0x34 => Some(Self::F32Rem),
            0x35 => Some(Self::F32Neg),

            0x38 => Some(Self::F64Add),
            0x39 => Some(Self::F64Sub),
            0x3A => Some(Self::F64Mul),
            0x3B => Some(Self::F64Div),
            0x3C => Some(Self::F64Rem),
            0x3D => Some(Self::F64Neg),

            0x40 => Some(Self::I32ToI64),
            0x41 => Some(Self::I32ToF32),
            0x42 => Some(Self::I32ToF64),
            0x43 => Some(Self::I64ToI32),
            0x44 => Some(Self::I64ToF64),
            0x45 => Some(Self::F32ToF64),
            0x46 => Some(Self::F64ToI32),
            0x47 => Some(Self::F64ToF32),

            0x50 => Some(Self::I32Eq),
            0x51 => Some(Self::I32Ne),
            0x52 => Some(Self::I32Lt),
            0x53 => Some(Self::I32Le),
            0x54 => Some(Self::I32Gt),
            0x55 => Some(Self::I32Ge),
            0x58 => Some(Self::I64Cmp),
            0x59 => Some(Self::F32Cmp),
            0x5A => Some(Self::F64Cmp),

            0x90 => Some(Self::Jump),
            0x91 => Some(Self::JumpIfFalse),
            0x92 => Some(Self::JumpIfTrue),
            0x93 => Some(Self::JumpIfNull),
            0x94 => Some(Self::JumpIfNonNull),
            0x95 => Some(Self::Switch),

            0xA0 => Some(Self::CallVirtual),
            0xA1 => Some(Self::CallStatic),
            0xA2 => Some(Self::CallSpecial),
            0xA3 => Some(Self::Return),
            0xA4 => Some(Self::ReturnVoid),

            0xB0 => Some(Self::New),
            0xB1 => Some(Self::GetField),
            0xB2 => Some(Self::PutField),
            0xB3 => Some(Self::GetStatic),
            0xB4 => Some(Self::PutStatic),
            0xB5 => Some(Self::CheckCast),
            0xB6 => Some(Self::InstanceOf),

            0xC0 => Some(Self::NewArray),
            0xC1 => Some(Self::MultiNewArray),
            0xC2 => Some(Self::LoadElem),
            0xC3 => Some(Self::StoreElem),
            0xC4 => Some(Self::ArrayLen),

            0xE0 => Some(Self::MonitorEnter),
            0xE1 => Some(Self::MonitorExit),
            0xE2 => Some(Self::Throw),

            0xF0 => Some(Self::Label),

            _ => None,
        }
    }

    /// Convert opcode to byte
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the human-readable name of the opcode
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Pop => "POP",
            Self::Dup => "DUP",
            Self::Swap => "SWAP",
            Self::ConstNull => "CONST_NULL",
            Self::ConstTrue => "CONST_TRUE",
            Self::ConstFalse => "CONST_FALSE",
            Self::ConstI32 => "CONST_I32",
            Self::ConstI64 => "CONST_I64",
            Self::ConstF32 => "CONST_F32",
            Self::ConstF64 => "CONST_F64",
            Self::ConstStr => "CONST_STR",
            Self::LoadLocal => "LOAD_LOCAL",
            Self::StoreLocal => "STORE_LOCAL",
            Self::IncLocal => "INC_LOCAL",
            Self::I32Add => "I32_ADD",
            Self::I32Sub => "I32_SUB",
            Self::I32Mul => "I32_MUL",
            Self::I32Div => "I32_DIV",
            Self::I32Rem => "I32_REM",
            Self::I32Neg => "I32_NEG",
            Self::I64Add => "I64_ADD",
            Self::I64Sub => "I64_SUB",
            Self::I64Mul => "I64_MUL",
            Self::I64Div => "I64_DIV",
            Self::I64Rem => "I64_REM",
            Self::I64Neg => "I64_NEG",
            Self::F32Add => "F32_ADD",
            Self::F32Sub => "F32_SUB",
            Self::F32Mul => "F32_MUL",
            Self::F32Div => "F32_DIV",
            Self::F32Rem => "F32_REM",
            Self::F32Neg => "F32_NEG",
            Self::F64Add => "F64_ADD",
            Self::F64Sub => "F64_SUB",
            Self::F64Mul => "F64_MUL",
            Self::F64Div => "F64_DIV",
            Self::F64Rem => "F64_REM",
            Self::F64Neg => "F64_NEG",
            Self::I32ToI64 => "I32_TO_I64",
            Self::I32ToF32 => "I32_TO_F32",
            Self::I32ToF64 => "I32_TO_F64",
            Self::I64ToI32 => "I64_TO_I32",
            Self::I64ToF64 => "I64_TO_F64",
            Self::F32ToF64 => "F32_TO_F64",
            Self::F64ToI32 => "F64_TO_I32",
            Self::F64ToF32 => "F64_TO_F32",
            Self::I32Eq => "I32_EQ",
            Self::I32Ne => "I32_NE",
            Self::I32Lt => "I32_LT",
            Self::I32Le => "I32_LE",
            Self::I32Gt => "I32_GT",
            Self::I32Ge => "I32_GE",
            Self::I64Cmp => "I64_CMP",
            Self::F32Cmp => "F32_CMP",
            Self::F64Cmp => "F64_CMP",
            Self::Jump => "JUMP",
            Self::JumpIfFalse => "JUMP_IF_FALSE",
            Self::JumpIfTrue => "JUMP_IF_TRUE",
            Self::JumpIfNull => "JUMP_IF_NULL",
            Self::JumpIfNonNull => "JUMP_IF_NON_NULL",
            Self::Switch => "SWITCH",
            Self::CallVirtual => "CALL_VIRTUAL",
            Self::CallStatic => "CALL_STATIC",
            Self::CallSpecial => "CALL_SPECIAL",
            Self::Return => "RETURN",
            Self::ReturnVoid => "RETURN_VOID",
            Self::New => "NEW",
            Self::GetField => "GET_FIELD",
            Self::PutField => "PUT_FIELD",
            Self::GetStatic => "GET_STATIC",
            Self::PutStatic => "PUT_STATIC",
            Self::CheckCast => "CHECK_CAST",
            Self::InstanceOf => "INSTANCE_OF",
            Self::NewArray => "NEW_ARRAY",
            Self::MultiNewArray => "MULTI_NEW_ARRAY",
            Self::LoadElem => "LOAD_ELEM",
            Self::StoreElem => "STORE_ELEM",
            Self::ArrayLen => "ARRAY_LEN",
            Self::MonitorEnter => "MONITOR_ENTER",
            Self::MonitorExit => "MONITOR_EXIT",
            Self::Throw => "THROW",
            Self::Label => "LABEL",
        }
    }

    /// Check if this opcode is a conditional or unconditional jump
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Self::Jump
                | Self::JumpIfFalse
                | Self::JumpIfTrue
                | Self::JumpIfNull
                | Self::JumpIfNonNull
        )
    }

    /// Check if this opcode is a call instruction
    pub fn is_call(self) -> bool {
        matches!(self, Self::CallVirtual | Self::CallStatic | Self::CallSpecial)
    }

    /// Check if this opcode is a return instruction
    pub fn is_return(self) -> bool {
        matches!(self, Self::Return | Self::ReturnVoid)
    }

    /// Check if this opcode reads a field (instance or static)
    pub fn is_field_read(self) -> bool {
        matches!(self, Self::GetField | Self::GetStatic)
    }

    /// Check if this opcode writes a field (instance or static)
    pub fn is_field_write(self) -> bool {
        matches!(self, Self::PutField | Self::PutStatic)
    }

    /// Check if this opcode accesses a field in any way
    pub fn is_field_access(self) -> bool {
        self.is_field_read() || self.is_field_write()
    }

    /// Check if this opcode is a type check or cast
    pub fn is_type_check(self) -> bool {
        matches!(self, Self::CheckCast | Self::InstanceOf)
    }

    /// Check if this opcode is a monitor operation
    pub fn is_monitor(self) -> bool {
        matches!(self, Self::MonitorEnter | Self::MonitorExit)
    }

    /// Check if this opcode pushes a literal constant
    pub fn is_const_load(self) -> bool {
        matches!(
            self,
            Self::ConstNull
                | Self::ConstTrue
                | Self::ConstFalse
                | Self::ConstI32
                | Self::ConstI64
                | Self::ConstF32
                | Self::ConstF64
                | Self::ConstStr
        )
    }

    /// Check if this opcode terminates a basic block
    pub fn is_terminator(self) -> bool {
        self.is_jump() || self.is_return() || matches!(self, Self::Throw | Self::Switch)
    }

    /// The operator and operand width of an arithmetic opcode
    pub fn arith_kind(self) -> Option<(ArithOp, NumWidth)> {
        let kind = match self {
            Self::I32Add => (ArithOp::Add, NumWidth::I32),
            Self::I32Sub => (ArithOp::Sub, NumWidth::I32),
            Self::I32Mul => (ArithOp::Mul, NumWidth::I32),
            Self::I32Div => (ArithOp::Div, NumWidth::I32),
            Self::I32Rem => (ArithOp::Rem, NumWidth::I32),
            Self::I32Neg => (ArithOp::Neg, NumWidth::I32),
            Self::I64Add => (ArithOp::Add, NumWidth::I64),
            Self::I64Sub => (ArithOp::Sub, NumWidth::I64),
            Self::I64Mul => (ArithOp::Mul, NumWidth::I64),
            Self::I64Div => (ArithOp::Div, NumWidth::I64),
            Self::I64Rem => (ArithOp::Rem, NumWidth::I64),
            Self::I64Neg => (ArithOp::Neg, NumWidth::I64),
            Self::F32Add => (ArithOp::Add, NumWidth::F32),
            Self::F32Sub => (ArithOp::Sub, NumWidth::F32),
            Self::F32Mul => (ArithOp::Mul, NumWidth::F32),
            Self::F32Div => (ArithOp::Div, NumWidth::F32),
            Self::F32Rem => (ArithOp::Rem, NumWidth::F32),
            Self::F32Neg => (ArithOp::Neg, NumWidth::F32),
            Self::F64Add => (ArithOp::Add, NumWidth::F64),
            Self::F64Sub => (ArithOp::Sub, NumWidth::F64),
            Self::F64Mul => (ArithOp::Mul, NumWidth::F64),
            Self::F64Div => (ArithOp::Div, NumWidth::F64),
            Self::F64Rem => (ArithOp::Rem, NumWidth::F64),
            Self::F64Neg => (ArithOp::Neg, NumWidth::F64),
            _ => return None,
        };
        Some(kind)
    }

    /// The source operand width of a conversion opcode
    pub fn conversion_source(self) -> Option<NumWidth> {
        match self {
            Self::I32ToI64 | Self::I32ToF32 | Self::I32ToF64 => Some(NumWidth::I32),
            Self::I64ToI32 | Self::I64ToF64 => Some(NumWidth::I64),
            Self::F32ToF64 => Some(NumWidth::F32),
            Self::F64ToI32 | Self::F64ToF32 => Some(NumWidth::F64),
            _ => None,
        }
    }

    /// The operand width of a comparison opcode
    pub fn comparison_width(self) -> Option<NumWidth> {
        match self {
            Self::I32Eq | Self::I32Ne | Self::I32Lt | Self::I32Le | Self::I32Gt | Self::I32Ge => {
                Some(NumWidth::I32)
            }
            Self::I64Cmp => Some(NumWidth::I64),
            Self::F32Cmp => Some(NumWidth::F32),
            Self::F64Cmp => Some(NumWidth::F64),
            _ => None,
        }
    }
}
