//! Donor instruction extraction.
//!
//! Captures a donor method's instruction sequence, exception ranges, and
//! debug records straight from the donor's raw bytes. Working on raw bytes
//! keeps symbolic references unresolved so the splicer can remap them later.
//! Extraction happens once per descriptor construction and is never cached
//! across descriptors.

use graft_bytecode::class::{ClassError, ClassFile, LineRecord, LocalVarRecord, TryCatch};
use graft_bytecode::descriptor::{self, DescriptorError};
use graft_bytecode::insn::Insn;
use thiserror::Error;

/// Extraction errors. Callers log these and treat the donor as absent.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The donor bytes do not decode as a class
    #[error("malformed donor class: {0}")]
    Class(#[from] ClassError),

    /// The donor method descriptor does not parse
    #[error("malformed donor descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
}

/// A donor method body captured for splicing or synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Instruction sequence, unresolved references intact
    pub code: Vec<Insn>,
    /// Label arena size of the donor body
    pub label_count: u32,
    /// Exception ranges
    pub try_catches: Vec<TryCatch>,
    /// Local variable debug records
    pub local_vars: Vec<LocalVarRecord>,
    /// Line number debug records
    pub lines: Vec<LineRecord>,
    /// Donor stack requirement
    pub max_stack: u16,
    /// Donor local-slot requirement
    pub max_locals: u16,
    /// Number of declared donor parameters
    pub param_count: usize,
    /// Whether the donor method is static
    pub is_static: bool,
}

/// Extract a method body from raw donor bytes.
///
/// Returns `Ok(None)` when the method is absent or abstract; errors only on
/// malformed input.
pub fn extract(
    donor_bytes: &[u8],
    name: &str,
    method_descriptor: &str,
) -> Result<Option<Extraction>, ExtractError> {
    let class = ClassFile::decode(donor_bytes)?;
    let Some(method) = class.method(name, method_descriptor) else {
        return Ok(None);
    };
    let Some(body) = &method.body else {
        return Ok(None);
    };

    Ok(Some(Extraction {
        code: body.code.clone(),
        label_count: body.label_count,
        try_catches: body.try_catches.clone(),
        local_vars: body.local_vars.clone(),
        lines: body.lines.clone(),
        max_stack: body.max_stack,
        max_locals: body.max_locals,
        param_count: descriptor::param_count(method_descriptor)?,
        is_static: method.is_static(),
    }))
}
