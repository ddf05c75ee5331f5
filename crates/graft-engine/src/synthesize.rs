//! Member synthesis.
//!
//! Grafts wholly new members onto a target class: fields with their declared
//! flags (constant literals become constant-pool-style initializers, not
//! generated init code), and methods whose body is the donor extraction
//! rewritten through the remap table. No positional splice happens here; a
//! synthesized method is self-contained new code.
//!
//! Re-adding an already-present member is not guarded internally; the
//! dispatcher applies each member at most once per class-load event.

use crate::descriptor::{UniqueField, UniqueMethod};
use crate::remap::RemapTable;
use graft_bytecode::class::{ClassError, ClassFile, FieldDef, MethodBody, MethodDef};

/// Add one unique field to the target class buffer.
pub fn add_field(field: &UniqueField, target_bytes: &[u8]) -> Result<Vec<u8>, ClassError> {
    let mut class = ClassFile::decode(target_bytes)?;
    class.fields.push(FieldDef {
        access: field.access,
        name: field.name.clone(),
        descriptor: field.descriptor.clone(),
        constant: field.constant.clone(),
        attrs: Vec::new(),
    });
    Ok(class.encode())
}

/// Add one unique method to the target class buffer.
///
/// The donor body is rewritten through the remap table so references to
/// shadow and unique members resolve against the target.
pub fn add_method(
    method: &UniqueMethod,
    remap: &RemapTable,
    target_bytes: &[u8],
) -> Result<Vec<u8>, ClassError> {
    let mut class = ClassFile::decode(target_bytes)?;

    let donor = &method.body;
    let body = MethodBody {
        max_stack: donor.max_stack,
        max_locals: donor.max_locals,
        label_count: donor.label_count,
        code: donor.code.iter().map(|insn| remap.rewrite_insn(insn)).collect(),
        try_catches: donor.try_catches.clone(),
        local_vars: donor.local_vars.clone(),
        lines: donor.lines.clone(),
    };

    class.methods.push(MethodDef {
        access: method.access,
        name: method.name.clone(),
        descriptor: method.descriptor.clone(),
        attrs: Vec::new(),
        body: Some(body),
    });
    Ok(class.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extraction;
    use graft_bytecode::class::access;
    use graft_bytecode::insn::{ConstValue, Insn, MemberRef};
    use graft_bytecode::opcode::Opcode;
    use graft_bytecode::verify::verify_class;

    fn target() -> Vec<u8> {
        ClassFile::new("demo.Vector").encode()
    }

    #[test]
    fn test_add_plain_field() {
        let field = UniqueField {
            name: "cache".to_string(),
            descriptor: "D".to_string(),
            access: access::PRIVATE,
            constant: None,
        };
        let out = add_field(&field, &target()).unwrap();
        let class = ClassFile::decode(&out).unwrap();
        let added = class.field("cache", "D").unwrap();
        assert_eq!(added.access, access::PRIVATE);
        assert_eq!(added.constant, None);
    }

    #[test]
    fn test_add_constant_field() {
        let field = UniqueField {
            name: "SCALE".to_string(),
            descriptor: "I".to_string(),
            access: access::STATIC | access::FINAL,
            constant: Some(ConstValue::I32(42)),
        };
        let out = add_field(&field, &target()).unwrap();
        let class = ClassFile::decode(&out).unwrap();
        assert_eq!(
            class.field("SCALE", "I").unwrap().constant,
            Some(ConstValue::I32(42))
        );
    }

    #[test]
    fn test_add_method_rewrites_references() {
        let mut remap = RemapTable::new("demo.VectorMixin", "demo.Vector");
        remap.add_field("x", "D");

        let method = UniqueMethod {
            name: "doubleX".to_string(),
            descriptor: "()D".to_string(),
            access: access::PUBLIC,
            body: Extraction {
                code: vec![
                    Insn::Var(Opcode::LoadLocal, 0),
                    Insn::Field(
                        Opcode::GetField,
                        MemberRef::new("demo.VectorMixin", "x", "D"),
                    ),
                    Insn::Const(ConstValue::F64(2.0)),
                    Insn::Simple(Opcode::F64Mul),
                    Insn::Simple(Opcode::Return),
                ],
                label_count: 0,
                try_catches: Vec::new(),
                local_vars: Vec::new(),
                lines: Vec::new(),
                max_stack: 4,
                max_locals: 1,
                param_count: 0,
                is_static: false,
            },
        };

        let out = add_method(&method, &remap, &target()).unwrap();
        let class = ClassFile::decode(&out).unwrap();
        verify_class(&class).unwrap();

        let added = class.method("doubleX", "()D").unwrap();
        let code = &added.body.as_ref().unwrap().code;
        assert_eq!(
            code[1],
            Insn::Field(Opcode::GetField, MemberRef::new("demo.Vector", "x", "D"))
        );
    }

    #[test]
    fn test_malformed_target_errors() {
        let field = UniqueField {
            name: "cache".to_string(),
            descriptor: "D".to_string(),
            access: access::PRIVATE,
            constant: None,
        };
        assert!(add_field(&field, b"garbage").is_err());
    }
}
