//! Structural class verification
//!
//! Checks the invariants an edited class must keep to stay loadable: label
//! identity, branch/exception/debug-record resolution, local slot bounds,
//! and body/abstract consistency. This is intentionally not a type checker;
//! it validates structure only.

use crate::class::{ClassFile, MethodBody, MethodDef};
use crate::insn::{Insn, LabelId};
use std::collections::HashSet;

/// Structural verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Abstract method carries a body
    #[error("Abstract method {0} must not have a body")]
    AbstractWithBody(String),

    /// Concrete method has no body
    #[error("Concrete method {0} has no body")]
    ConcreteWithoutBody(String),

    /// Label token outside the arena
    #[error("Label {label:?} out of range (arena size {arena}) in {method}")]
    LabelOutOfRange {
        /// Offending token
        label: LabelId,
        /// Arena size of the body
        arena: u32,
        /// Method name
        method: String,
    },

    /// Label defined more than once
    #[error("Label {label:?} defined more than once in {method}")]
    DuplicateLabel {
        /// Offending token
        label: LabelId,
        /// Method name
        method: String,
    },

    /// Referenced label never defined
    #[error("Label {label:?} referenced but never defined in {method}")]
    UndefinedLabel {
        /// Offending token
        label: LabelId,
        /// Method name
        method: String,
    },

    /// Local slot index outside the declared frame
    #[error("Local slot {slot} out of range (max {max}) in {method}")]
    InvalidLocalRef {
        /// Offending slot
        slot: u16,
        /// Declared `max_locals`
        max: u16,
        /// Method name
        method: String,
    },

    /// Execution falls off the end of a body
    #[error("Execution falls off end of {0}")]
    FallOffEnd(String),
}

/// Verify a class's structural invariants
pub fn verify_class(class: &ClassFile) -> Result<(), VerifyError> {
    for method in &class.methods {
        verify_method(method)?;
    }
    Ok(())
}

/// Verify a single method
pub fn verify_method(method: &MethodDef) -> Result<(), VerifyError> {
    match (&method.body, method.is_abstract()) {
        (Some(_), true) => return Err(VerifyError::AbstractWithBody(method.name.clone())),
        (None, false) => return Err(VerifyError::ConcreteWithoutBody(method.name.clone())),
        (None, true) => return Ok(()),
        (Some(body), false) => verify_body(body, &method.name)?,
    }
    Ok(())
}

fn verify_body(body: &MethodBody, method: &str) -> Result<(), VerifyError> {
    let defined = collect_defined_labels(body, method)?;

    let check = |label: LabelId| -> Result<(), VerifyError> {
        if label.0 >= body.label_count {
            return Err(VerifyError::LabelOutOfRange {
                label,
                arena: body.label_count,
                method: method.to_string(),
            });
        }
        if !defined.contains(&label) {
            return Err(VerifyError::UndefinedLabel {
                label,
                method: method.to_string(),
            });
        }
        Ok(())
    };

    for insn in &body.code {
        match insn {
            Insn::Jump(_, label) => check(*label)?,
            Insn::Switch {
                targets, default, ..
            } => {
                for target in targets {
                    check(*target)?;
                }
                check(*default)?;
            }
            Insn::Var(_, slot) | Insn::Inc(slot, _) => {
                if *slot >= body.max_locals {
                    return Err(VerifyError::InvalidLocalRef {
                        slot: *slot,
                        max: body.max_locals,
                        method: method.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    for tc in &body.try_catches {
        check(tc.start)?;
        check(tc.end)?;
        check(tc.handler)?;
    }
    for lv in &body.local_vars {
        check(lv.start)?;
        check(lv.end)?;
    }
    for line in &body.lines {
        check(line.start)?;
    }

    // Empty bodies are allowed; anything else must end in a terminator.
    if let Some(last) = body.code.last() {
        if !last.opcode().is_terminator() {
            return Err(VerifyError::FallOffEnd(method.to_string()));
        }
    }

    Ok(())
}

fn collect_defined_labels(
    body: &MethodBody,
    method: &str,
) -> Result<HashSet<LabelId>, VerifyError> {
    let mut defined = HashSet::new();
    for insn in &body.code {
        if let Insn::Label(label) = insn {
            if label.0 >= body.label_count {
                return Err(VerifyError::LabelOutOfRange {
                    label: *label,
                    arena: body.label_count,
                    method: method.to_string(),
                });
            }
            if !defined.insert(*label) {
                return Err(VerifyError::DuplicateLabel {
                    label: *label,
                    method: method.to_string(),
                });
            }
        }
    }
    Ok(defined)
}
