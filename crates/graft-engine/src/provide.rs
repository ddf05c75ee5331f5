//! Shadow reference provision.
//!
//! Mixin source references shadow members through ordinary syntax, so its
//! compiled bodies carry references owned by the mixin type. The provider
//! rewrites every matching field/method reference inside concrete method
//! bodies so the owner becomes the target type; abstract shadow
//! declarations themselves are left untouched.

use crate::descriptor::MemberDecl;
use graft_bytecode::class::{ClassError, ClassFile};
use graft_bytecode::insn::{Insn, MemberRef};

/// Rewrite references to one shadowed field throughout a class buffer.
///
/// Returns the input unchanged when nothing matched.
pub fn provide_field(
    shadow: &MemberDecl,
    target: &str,
    bytes: &[u8],
) -> Result<Vec<u8>, ClassError> {
    provide(shadow, target, bytes, |insn| match insn {
        Insn::Field(_, member) => Some(member),
        _ => None,
    })
}

/// Rewrite references to one shadowed method throughout a class buffer.
///
/// Returns the input unchanged when nothing matched.
pub fn provide_method(
    shadow: &MemberDecl,
    target: &str,
    bytes: &[u8],
) -> Result<Vec<u8>, ClassError> {
    provide(shadow, target, bytes, |insn| match insn {
        Insn::Method(_, member) => Some(member),
        _ => None,
    })
}

fn provide(
    shadow: &MemberDecl,
    target: &str,
    bytes: &[u8],
    select: fn(&mut Insn) -> Option<&mut MemberRef>,
) -> Result<Vec<u8>, ClassError> {
    let mut class = ClassFile::decode(bytes)?;
    let mut changed = false;

    for method in class.methods.iter_mut() {
        let Some(body) = method.body.as_mut() else {
            continue;
        };
        for insn in body.code.iter_mut() {
            if let Some(member) = select(insn) {
                if member.name == shadow.name
                    && member.descriptor == shadow.descriptor
                    && member.owner != target
                {
                    member.owner = target.to_string();
                    changed = true;
                }
            }
        }
    }

    if !changed {
        return Ok(bytes.to_vec());
    }
    Ok(class.encode())
}
