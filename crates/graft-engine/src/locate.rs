//! Injection-point location.
//!
//! A [`PointQuery`] classifies instruction kinds declaratively; [`locate`]
//! finds the occurrence-th match in a single forward scan. Queries are pure
//! predicates over one instruction with at most one step of lookaround
//! (needed for call-with-stored-result and call-after-string-literal).
//!
//! Fallback rule, applied uniformly: `Entry` always resolves to the first
//! instruction; `Exit` with no occurrence-th match falls back to the first
//! return-family instruction; every other query yields no point. Callers
//! treat "no point" as a skip, never as a failure.

use graft_bytecode::insn::{ConstValue, Insn};
use graft_bytecode::opcode::{ArithOp, NumWidth, Opcode};
use serde::{Deserialize, Serialize};

/// Literal kind used to refine constant-load queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstKind {
    /// Null reference
    Null,
    /// Boolean literal
    Bool,
    /// 32-bit integer literal
    I32,
    /// 64-bit integer literal
    I64,
    /// 32-bit float literal
    F32,
    /// 64-bit float literal
    F64,
    /// String literal
    Str,
}

impl ConstKind {
    fn matches(self, value: &ConstValue) -> bool {
        matches!(
            (self, value),
            (Self::Null, ConstValue::Null)
                | (Self::Bool, ConstValue::Bool(_))
                | (Self::I32, ConstValue::I32(_))
                | (Self::I64, ConstValue::I64(_))
                | (Self::F32, ConstValue::F32(_))
                | (Self::F64, ConstValue::F64(_))
                | (Self::Str, ConstValue::Str(_))
        )
    }
}

/// Declarative classification of an injection site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointQuery {
    /// Method entry; always the first instruction.
    Entry,
    /// Return-family instruction.
    Exit,
    /// Any call.
    Invoke,
    /// Call immediately followed by a local store.
    InvokeAssign,
    /// Call immediately preceded by a string-literal load.
    InvokeString,
    /// Instance field read.
    FieldGet,
    /// Instance field write.
    FieldPut,
    /// Static field read.
    StaticGet,
    /// Static field write.
    StaticPut,
    /// Array element read.
    ArrayLoad,
    /// Array element write.
    ArrayStore,
    /// Object construction.
    New,
    /// Type check or cast.
    TypeCheck,
    /// Arithmetic instruction, refined by operator and operand width.
    Arith {
        /// Operator to match
        op: ArithOp,
        /// Operand width to match
        width: NumWidth,
    },
    /// Numeric conversion, refined by source operand width.
    Convert {
        /// Source width to match
        width: NumWidth,
    },
    /// Comparison, refined by operand width.
    Compare {
        /// Operand width to match
        width: NumWidth,
    },
    /// Monitor acquisition.
    MonitorEnter,
    /// Monitor release.
    MonitorExit,
    /// Constant load, optionally refined by literal kind.
    Const {
        /// Literal kind; `None` matches any constant.
        #[serde(default)]
        kind: Option<ConstKind>,
    },
    /// Conditional or unconditional branch (switch included).
    Jump,
    /// Local slot load.
    LocalLoad,
    /// Local slot store.
    LocalStore,
}

impl PointQuery {
    /// Whether the instruction at `index` matches this query.
    ///
    /// `Entry` matches nothing here; it is resolved by [`locate`] directly.
    pub fn matches(&self, code: &[Insn], index: usize) -> bool {
        let insn = &code[index];
        let opcode = insn.opcode();
        match self {
            Self::Entry => false,
            Self::Exit => opcode.is_return(),
            Self::Invoke => opcode.is_call(),
            Self::InvokeAssign => {
                opcode.is_call()
                    && matches!(code.get(index + 1), Some(Insn::Var(Opcode::StoreLocal, _)))
            }
            Self::InvokeString => {
                opcode.is_call()
                    && index > 0
                    && matches!(code[index - 1], Insn::Const(ConstValue::Str(_)))
            }
            Self::FieldGet => opcode == Opcode::GetField,
            Self::FieldPut => opcode == Opcode::PutField,
            Self::StaticGet => opcode == Opcode::GetStatic,
            Self::StaticPut => opcode == Opcode::PutStatic,
            Self::ArrayLoad => opcode == Opcode::LoadElem,
            Self::ArrayStore => opcode == Opcode::StoreElem,
            Self::New => opcode == Opcode::New,
            Self::TypeCheck => opcode.is_type_check(),
            Self::Arith { op, width } => opcode.arith_kind() == Some((*op, *width)),
            Self::Convert { width } => opcode.conversion_source() == Some(*width),
            Self::Compare { width } => opcode.comparison_width() == Some(*width),
            Self::MonitorEnter => opcode == Opcode::MonitorEnter,
            Self::MonitorExit => opcode == Opcode::MonitorExit,
            Self::Const { kind } => match insn {
                Insn::Const(value) => kind.map_or(true, |k| k.matches(value)),
                _ => false,
            },
            Self::Jump => opcode.is_jump() || opcode == Opcode::Switch,
            Self::LocalLoad => matches!(insn, Insn::Var(Opcode::LoadLocal, _)),
            Self::LocalStore => matches!(insn, Insn::Var(Opcode::StoreLocal, _)),
        }
    }
}

/// Find the occurrence-th instruction matching `query`.
///
/// Deterministic: same code, query, and occurrence always yield the same
/// position.
pub fn locate(code: &[Insn], query: &PointQuery, occurrence: u32) -> Option<usize> {
    if matches!(query, PointQuery::Entry) {
        return if code.is_empty() { None } else { Some(0) };
    }

    let mut found = 0u32;
    for index in 0..code.len() {
        if query.matches(code, index) {
            if found == occurrence {
                return Some(index);
            }
            found += 1;
        }
    }

    // The lone concession: "before the only return" is the common case, so
    // exit queries that miss fall back to the first return.
    if matches!(query, PointQuery::Exit) {
        return code.iter().position(|insn| insn.opcode().is_return());
    }

    None
}
