//! Structured instruction list form
//!
//! Method code is held as a plain tagged list of [`Insn`] values rather than
//! raw encoded bytes. Branch targets are [`LabelId`] tokens into a per-body
//! label arena, so relocating or cloning a sequence is an index rewrite
//! instead of pointer chasing. Symbolic field/method references stay
//! unresolved until the weaving engine rewrites their owners.

use crate::encoder::{ByteReader, ByteWriter, DecodeError};
use crate::opcode::Opcode;

/// Label token within a method body's label arena
///
/// Valid tokens are `0..label_count` of the owning body. Tokens have no
/// meaning across bodies; cloning code between bodies requires re-basing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl LabelId {
    /// Shift this token into another arena by `offset`
    #[inline]
    pub fn rebase(self, offset: u32) -> Self {
        Self(self.0 + offset)
    }
}

/// Symbolic reference to a field or method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Owning type name (dotted)
    pub owner: String,
    /// Member name
    pub name: String,
    /// Type descriptor (field) or method descriptor
    pub descriptor: String,
}

impl MemberRef {
    /// Create a new member reference
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_str(&self.owner);
        writer.emit_str(&self.name);
        writer.emit_str(&self.descriptor);
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let owner = reader.read_str()?;
        let name = reader.read_str()?;
        let descriptor = reader.read_str()?;
        Ok(Self {
            owner,
            name,
            descriptor,
        })
    }
}

/// Literal constant operand
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// Null reference
    Null,
    /// Boolean literal
    Bool(bool),
    /// 32-bit integer literal
    I32(i32),
    /// 64-bit integer literal
    I64(i64),
    /// 32-bit float literal
    F32(f32),
    /// 64-bit float literal
    F64(f64),
    /// String literal
    Str(String),
}

impl ConstValue {
    /// The opcode used to encode this literal
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Null => Opcode::ConstNull,
            Self::Bool(true) => Opcode::ConstTrue,
            Self::Bool(false) => Opcode::ConstFalse,
            Self::I32(_) => Opcode::ConstI32,
            Self::I64(_) => Opcode::ConstI64,
            Self::F32(_) => Opcode::ConstF32,
            Self::F64(_) => Opcode::ConstF64,
            Self::Str(_) => Opcode::ConstStr,
        }
    }

    /// Encode tag byte plus payload
    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u8(self.opcode().to_u8());
        match self {
            Self::Null | Self::Bool(_) => {}
            Self::I32(v) => writer.emit_i32(*v),
            Self::I64(v) => writer.emit_i64(*v),
            Self::F32(v) => writer.emit_f32(*v),
            Self::F64(v) => writer.emit_f64(*v),
            Self::Str(v) => writer.emit_str(v),
        }
    }

    /// Decode tag byte plus payload
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = reader.position();
        let byte = reader.read_u8()?;
        let opcode = Opcode::from_u8(byte).ok_or(DecodeError::InvalidOpcode(byte, offset))?;
        Self::decode_payload(opcode, reader, offset)
    }

    fn decode_payload(
        opcode: Opcode,
        reader: &mut ByteReader<'_>,
        offset: usize,
    ) -> Result<Self, DecodeError> {
        match opcode {
            Opcode::ConstNull => Ok(Self::Null),
            Opcode::ConstTrue => Ok(Self::Bool(true)),
            Opcode::ConstFalse => Ok(Self::Bool(false)),
            Opcode::ConstI32 => Ok(Self::I32(reader.read_i32()?)),
            Opcode::ConstI64 => Ok(Self::I64(reader.read_i64()?)),
            Opcode::ConstF32 => Ok(Self::F32(reader.read_f32()?)),
            Opcode::ConstF64 => Ok(Self::F64(reader.read_f64()?)),
            Opcode::ConstStr => Ok(Self::Str(reader.read_str()?)),
            other => Err(DecodeError::UnexpectedOpcode(other.name(), offset)),
        }
    }
}

/// One instruction in structured list form
///
/// Each variant has a fixed operand shape; the opcode narrows the kind
/// further (e.g. which of the four field-access opcodes a `Field` carries).
#[derive(Debug, Clone, PartialEq)]
pub enum Insn {
    /// Operand-less instruction (stack ops, arithmetic, returns, ...)
    Simple(Opcode),
    /// Local slot load/store
    Var(Opcode, u16),
    /// Local slot increment by a signed delta
    Inc(u16, i32),
    /// Literal constant load
    Const(ConstValue),
    /// Field access with symbolic reference
    Field(Opcode, MemberRef),
    /// Call with symbolic reference
    Method(Opcode, MemberRef),
    /// Type-operand instruction (`New`, `CheckCast`, `InstanceOf`, `NewArray`)
    Type(Opcode, String),
    /// Conditional or unconditional branch
    Jump(Opcode, LabelId),
    /// Multi-way branch over i32 keys
    Switch {
        /// Match keys, parallel to `targets`
        keys: Vec<i32>,
        /// Branch target per key
        targets: Vec<LabelId>,
        /// Target when no key matches
        default: LabelId,
    },
    /// Label definition
    Label(LabelId),
    /// Multi-dimensional array allocation
    MultiNewArray {
        /// Array type descriptor, e.g. `[[I`
        descriptor: String,
        /// Number of dimension lengths popped
        dims: u8,
    },
}

impl Insn {
    /// The opcode of this instruction
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Simple(op) | Self::Var(op, _) => *op,
            Self::Inc(_, _) => Opcode::IncLocal,
            Self::Const(value) => value.opcode(),
            Self::Field(op, _) | Self::Method(op, _) | Self::Type(op, _) | Self::Jump(op, _) => *op,
            Self::Switch { .. } => Opcode::Switch,
            Self::Label(_) => Opcode::Label,
            Self::MultiNewArray { .. } => Opcode::MultiNewArray,
        }
    }

    /// Clone this instruction with every label token shifted by `offset`
    ///
    /// Used when splicing a sequence into another body: the clone refers to
    /// freshly allocated slots of the destination arena and shares no label
    /// identity with the source.
    pub fn rebase_labels(&self, offset: u32) -> Self {
        match self {
            Self::Jump(op, label) => Self::Jump(*op, label.rebase(offset)),
            Self::Switch {
                keys,
                targets,
                default,
            } => Self::Switch {
                keys: keys.clone(),
                targets: targets.iter().map(|t| t.rebase(offset)).collect(),
                default: default.rebase(offset),
            },
            Self::Label(label) => Self::Label(label.rebase(offset)),
            other => other.clone(),
        }
    }

    /// Encode this instruction
    pub fn encode(&self, writer: &mut ByteWriter) {
        match self {
            Self::Simple(op) => writer.emit_u8(op.to_u8()),
            Self::Var(op, slot) => {
                writer.emit_u8(op.to_u8());
                writer.emit_u16(*slot);
            }
            Self::Inc(slot, delta) => {
                writer.emit_u8(Opcode::IncLocal.to_u8());
                writer.emit_u16(*slot);
                writer.emit_i32(*delta);
            }
            Self::Const(value) => value.encode(writer),
            Self::Field(op, member) | Self::Method(op, member) => {
                writer.emit_u8(op.to_u8());
                member.encode(writer);
            }
            Self::Type(op, name) => {
                writer.emit_u8(op.to_u8());
                writer.emit_str(name);
            }
            Self::Jump(op, label) => {
                writer.emit_u8(op.to_u8());
                writer.emit_u32(label.0);
            }
            Self::Switch {
                keys,
                targets,
                default,
            } => {
                writer.emit_u8(Opcode::Switch.to_u8());
                writer.emit_u32(keys.len() as u32);
                for (key, target) in keys.iter().zip(targets) {
                    writer.emit_i32(*key);
                    writer.emit_u32(target.0);
                }
                writer.emit_u32(default.0);
            }
            Self::Label(label) => {
                writer.emit_u8(Opcode::Label.to_u8());
                writer.emit_u32(label.0);
            }
            Self::MultiNewArray { descriptor, dims } => {
                writer.emit_u8(Opcode::MultiNewArray.to_u8());
                writer.emit_str(descriptor);
                writer.emit_u8(*dims);
            }
        }
    }

    /// Decode one instruction
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = reader.position();
        let byte = reader.read_u8()?;
        let opcode = Opcode::from_u8(byte).ok_or(DecodeError::InvalidOpcode(byte, offset))?;

        if opcode.is_const_load() {
            return Ok(Self::Const(ConstValue::decode_payload(
                opcode, reader, offset,
            )?));
        }

        match opcode {
            Opcode::LoadLocal | Opcode::StoreLocal => Ok(Self::Var(opcode, reader.read_u16()?)),
            Opcode::IncLocal => {
                let slot = reader.read_u16()?;
                let delta = reader.read_i32()?;
                Ok(Self::Inc(slot, delta))
            }
            op if op.is_field_access() => Ok(Self::Field(op, MemberRef::decode(reader)?)),
            op if op.is_call() => Ok(Self::Method(op, MemberRef::decode(reader)?)),
            Opcode::New | Opcode::CheckCast | Opcode::InstanceOf | Opcode::NewArray => {
                Ok(Self::Type(opcode, reader.read_str()?))
            }
            op if op.is_jump() => Ok(Self::Jump(op, LabelId(reader.read_u32()?))),
            Opcode::Switch => {
                let count = reader.read_u32()? as usize;
                let mut keys = Vec::with_capacity(count);
                let mut targets = Vec::with_capacity(count);
                for _ in 0..count {
                    keys.push(reader.read_i32()?);
                    targets.push(LabelId(reader.read_u32()?));
                }
                let default = LabelId(reader.read_u32()?);
                Ok(Self::Switch {
                    keys,
                    targets,
                    default,
                })
            }
            Opcode::Label => Ok(Self::Label(LabelId(reader.read_u32()?))),
            Opcode::MultiNewArray => {
                let descriptor = reader.read_str()?;
                let dims = reader.read_u8()?;
                Ok(Self::MultiNewArray { descriptor, dims })
            }
            op => Ok(Self::Simple(op)),
        }
    }
}
