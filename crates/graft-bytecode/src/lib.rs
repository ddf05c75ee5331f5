//! Graft Class-File Definitions
//!
//! This crate provides the compiled-class container format, the structured
//! instruction list, and the structural verifier used by the graft weaving
//! engine.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod descriptor;
pub mod encoder;
pub mod insn;
pub mod opcode;
pub mod verify;

pub use class::{
    access, Attribute, ClassError, ClassFile, FieldDef, LineRecord, LocalVarRecord, MethodBody,
    MethodDef, TryCatch,
};
pub use encoder::{ByteReader, ByteWriter, DecodeError};
pub use insn::{ConstValue, Insn, LabelId, MemberRef};
pub use opcode::{ArithOp, NumWidth, Opcode};
pub use verify::{verify_class, VerifyError};
