//! Splicing donor code into target methods.
//!
//! A [`Splicer`] is a pure function over a target class buffer: it decodes,
//! finds candidate methods by name, locates the injection point per
//! candidate, merges a self-contained donor block, and re-encodes. The donor
//! block binds positionally to the *target* method's argument slots, so the
//! injected code sees the target's real arguments rather than the donor's
//! declared ones.

use crate::descriptor::{InjectSpec, Mode};
use crate::locate::locate;
use crate::remap::RemapTable;
use graft_bytecode::class::{ClassError, ClassFile, MethodBody};
use graft_bytecode::insn::Insn;
use graft_bytecode::opcode::Opcode;

/// Extra stack slots reserved beyond `max(original, donor)`.
const STACK_MARGIN: u16 = 2;
/// Extra local slots reserved beyond `max(original, donor)`, covering the
/// prepended instance/argument loads.
const LOCAL_MARGIN: u16 = 1;

/// Applies one inject spec to target class buffers.
pub struct Splicer<'a> {
    spec: &'a InjectSpec,
    remap: &'a RemapTable,
}

impl<'a> Splicer<'a> {
    /// Create a splicer for one spec and its mixin's remap table.
    pub fn new(spec: &'a InjectSpec, remap: &'a RemapTable) -> Self {
        Self { spec, remap }
    }

    /// Splice the donor block into every matching method of `target_bytes`.
    ///
    /// Methods match by name; an explicit signature restricts to one
    /// overload, otherwise all overloads receive the injection. Candidates
    /// whose point query finds nothing are skipped silently. If nothing was
    /// spliced (empty donor, absent method, no point anywhere), the input
    /// buffer is returned unchanged.
    pub fn inject(&self, target_bytes: &[u8]) -> Result<Vec<u8>, ClassError> {
        if self.spec.body.code.is_empty() {
            return Ok(target_bytes.to_vec());
        }

        let mut class = ClassFile::decode(target_bytes)?;
        let mut injected = false;

        for method in class.methods.iter_mut() {
            if method.name != self.spec.target_method {
                continue;
            }
            if let Some(signature) = &self.spec.signature {
                if &method.descriptor != signature {
                    continue;
                }
            }
            let target_static = method.is_static();
            let Some(body) = method.body.as_mut() else {
                continue;
            };
            let Some(point) = locate(&body.code, &self.spec.query, self.spec.occurrence) else {
                continue;
            };
            self.splice_into(body, target_static, point);
            injected = true;
        }

        if !injected {
            return Ok(target_bytes.to_vec());
        }
        Ok(class.encode())
    }

    /// Merge the donor block into one method body at `point`.
    fn splice_into(&self, target: &mut MethodBody, target_static: bool, point: usize) {
        let donor = &self.spec.body;

        // Fresh label identity for the clone: donor tokens move into newly
        // allocated slots of the target arena.
        let label_base = target.label_count;
        target.label_count += donor.label_count;

        let mut block = Vec::with_capacity(donor.code.len() + donor.param_count + 1);
        if !donor.is_static {
            block.push(Insn::Var(Opcode::LoadLocal, 0));
        }
        let arg_base: u16 = if target_static { 0 } else { 1 };
        for param in 0..donor.param_count {
            block.push(Insn::Var(Opcode::LoadLocal, arg_base + param as u16));
        }
        for insn in &donor.code {
            block.push(self.remap.rewrite_insn(insn).rebase_labels(label_base));
        }
        let block_len = block.len();

        match self.spec.mode {
            Mode::Before => {
                target.code.splice(point..point, block);
            }
            Mode::After => {
                target.code.splice(point + 1..point + 1, block);
            }
            Mode::Replace => {
                // Insert before the point, then remove exactly the located
                // instruction, which now sits right after the block.
                target.code.splice(point..point, block);
                target.code.remove(point + block_len);
            }
        }

        for tc in &donor.try_catches {
            target.try_catches.push(tc.rebase_labels(label_base));
        }
        for lv in &donor.local_vars {
            target.local_vars.push(lv.rebase_labels(label_base));
        }
        for line in &donor.lines {
            target.lines.push(line.rebase_labels(label_base));
        }

        target.max_stack = target.max_stack.max(donor.max_stack) + STACK_MARGIN;
        target.max_locals = target.max_locals.max(donor.max_locals) + LOCAL_MARGIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extraction;
    use crate::locate::PointQuery;
    use graft_bytecode::class::{access, LineRecord, MethodDef, TryCatch};
    use graft_bytecode::insn::{ConstValue, LabelId, MemberRef};
    use graft_bytecode::verify::verify_class;

    fn target_class() -> ClassFile {
        let mut class = ClassFile::new("demo.Vector");

        let mut body = MethodBody::new();
        body.max_stack = 1;
        body.max_locals = 2;
        body.code = vec![
            Insn::Const(ConstValue::I32(1)),
            Insn::Simple(Opcode::Pop),
            Insn::Simple(Opcode::ReturnVoid),
        ];
        let mut update = MethodDef::new(access::PUBLIC, "update", "(I)V");
        update.body = Some(body);
        class.methods.push(update);

        class
    }

    fn donor(code: Vec<Insn>) -> Extraction {
        Extraction {
            code,
            label_count: 0,
            try_catches: Vec::new(),
            local_vars: Vec::new(),
            lines: Vec::new(),
            max_stack: 2,
            max_locals: 2,
            param_count: 0,
            is_static: false,
        }
    }

    fn spec(mode: Mode, query: PointQuery, occurrence: u32, body: Extraction) -> InjectSpec {
        InjectSpec {
            donor_name: "onUpdate".to_string(),
            donor_descriptor: "()V".to_string(),
            target_method: "update".to_string(),
            query,
            mode,
            occurrence,
            signature: None,
            body,
        }
    }

    fn remap() -> RemapTable {
        RemapTable::new("demo.VectorMixin", "demo.Vector")
    }

    fn code_of(bytes: &[u8], name: &str) -> Vec<Insn> {
        let class = ClassFile::decode(bytes).unwrap();
        let method = class
            .methods
            .iter()
            .find(|m| m.name == name)
            .unwrap()
            .clone();
        method.body.unwrap().code
    }

    #[test]
    fn test_empty_donor_is_identity() {
        let bytes = target_class().encode();
        let spec = spec(Mode::Before, PointQuery::Exit, 0, donor(vec![]));
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_absent_method_is_identity() {
        let bytes = target_class().encode();
        let mut spec = spec(
            Mode::Before,
            PointQuery::Exit,
            0,
            donor(vec![Insn::Simple(Opcode::Nop)]),
        );
        spec.target_method = "missing".to_string();
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_absent_point_is_identity() {
        let bytes = target_class().encode();
        // No monitor instruction anywhere in the target.
        let spec = spec(
            Mode::Before,
            PointQuery::MonitorEnter,
            0,
            donor(vec![Insn::Simple(Opcode::Nop)]),
        );
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_before_keeps_located_instruction() {
        let bytes = target_class().encode();
        let spec = spec(
            Mode::Before,
            PointQuery::Exit,
            0,
            donor(vec![Insn::Simple(Opcode::Nop)]),
        );
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let code = code_of(&out, "update");
        // load this + donor nop inserted before the return, which survives.
        assert_eq!(
            code,
            vec![
                Insn::Const(ConstValue::I32(1)),
                Insn::Simple(Opcode::Pop),
                Insn::Var(Opcode::LoadLocal, 0),
                Insn::Simple(Opcode::Nop),
                Insn::Simple(Opcode::ReturnVoid),
            ]
        );
    }

    #[test]
    fn test_after_effects_follow_point() {
        let bytes = target_class().encode();
        let spec = spec(
            Mode::After,
            PointQuery::Const { kind: None },
            0,
            donor(vec![Insn::Simple(Opcode::Nop)]),
        );
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let code = code_of(&out, "update");
        assert_eq!(code[0], Insn::Const(ConstValue::I32(1)));
        assert_eq!(code[1], Insn::Var(Opcode::LoadLocal, 0));
        assert_eq!(code[2], Insn::Simple(Opcode::Nop));
        assert_eq!(code[3], Insn::Simple(Opcode::Pop));
    }

    #[test]
    fn test_replace_removes_exactly_one_instruction() {
        let bytes = target_class().encode();
        let spec = spec(
            Mode::Replace,
            PointQuery::Exit,
            0,
            donor(vec![Insn::Simple(Opcode::ReturnVoid)]),
        );
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let code = code_of(&out, "update");
        // The original return is gone; the donor's return ends the method.
        assert_eq!(
            code,
            vec![
                Insn::Const(ConstValue::I32(1)),
                Insn::Simple(Opcode::Pop),
                Insn::Var(Opcode::LoadLocal, 0),
                Insn::Simple(Opcode::ReturnVoid),
            ]
        );
    }

    #[test]
    fn test_donor_references_are_remapped() {
        let bytes = target_class().encode();
        let spec = spec(
            Mode::Before,
            PointQuery::Exit,
            0,
            donor(vec![
                Insn::Field(
                    Opcode::GetField,
                    MemberRef::new("demo.VectorMixin", "x", "D"),
                ),
                Insn::Simple(Opcode::Pop),
            ]),
        );
        let mut remap = remap();
        remap.add_field("x", "D");
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let code = code_of(&out, "update");
        assert!(code.contains(&Insn::Field(
            Opcode::GetField,
            MemberRef::new("demo.Vector", "x", "D"),
        )));
    }

    #[test]
    fn test_argument_binding_prelude() {
        let bytes = target_class().encode();
        let mut body = donor(vec![Insn::Simple(Opcode::Pop), Insn::Simple(Opcode::Pop)]);
        body.param_count = 1;
        let spec = spec(Mode::Before, PointQuery::Entry, 0, body);
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let code = code_of(&out, "update");
        // Instance slot, then the target's first argument slot.
        assert_eq!(code[0], Insn::Var(Opcode::LoadLocal, 0));
        assert_eq!(code[1], Insn::Var(Opcode::LoadLocal, 1));
    }

    #[test]
    fn test_static_donor_skips_instance_load() {
        let bytes = target_class().encode();
        let mut body = donor(vec![Insn::Simple(Opcode::Nop)]);
        body.is_static = true;
        let spec = spec(Mode::Before, PointQuery::Entry, 0, body);
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let code = code_of(&out, "update");
        assert_eq!(code[0], Insn::Simple(Opcode::Nop));
    }

    #[test]
    fn test_labels_get_fresh_identity() {
        let mut class = target_class();
        // Give the target method a label of its own.
        let body = class.methods[0].body.as_mut().unwrap();
        let own = body.fresh_label();
        body.code.insert(0, Insn::Label(own));
        let bytes = class.encode();

        let mut donor_body = donor(vec![
            Insn::Label(LabelId(0)),
            Insn::Jump(Opcode::Jump, LabelId(1)),
            Insn::Label(LabelId(1)),
        ]);
        donor_body.label_count = 2;
        let spec = spec(Mode::Before, PointQuery::Exit, 0, donor_body);
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let class = ClassFile::decode(&out).unwrap();
        let body = class.methods[0].body.as_ref().unwrap();
        assert_eq!(body.label_count, 3);
        // Donor labels 0 and 1 were rebased past the target's arena.
        assert!(body.code.contains(&Insn::Label(LabelId(1))));
        assert!(body.code.contains(&Insn::Label(LabelId(2))));
        assert!(body.code.contains(&Insn::Jump(Opcode::Jump, LabelId(2))));
        verify_class(&class).unwrap();
    }

    #[test]
    fn test_debug_records_and_ranges_carried() {
        let bytes = target_class().encode();
        let mut donor_body = donor(vec![
            Insn::Label(LabelId(0)),
            Insn::Simple(Opcode::Nop),
            Insn::Label(LabelId(1)),
        ]);
        donor_body.label_count = 2;
        donor_body.try_catches.push(TryCatch {
            start: LabelId(0),
            end: LabelId(1),
            handler: LabelId(1),
            exception: None,
        });
        donor_body.lines.push(LineRecord {
            line: 31,
            start: LabelId(0),
        });
        let spec = spec(Mode::Before, PointQuery::Exit, 0, donor_body);
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let class = ClassFile::decode(&out).unwrap();
        let body = class.methods[0].body.as_ref().unwrap();
        // Ranges re-anchored to the spliced labels (rebased by 0 here, but
        // resolvable within the merged body).
        assert_eq!(body.try_catches.len(), 1);
        assert_eq!(body.lines.len(), 1);
        verify_class(&class).unwrap();
    }

    #[test]
    fn test_frame_margins() {
        let bytes = target_class().encode();
        let mut donor_body = donor(vec![Insn::Simple(Opcode::Nop)]);
        donor_body.max_stack = 5;
        donor_body.max_locals = 1;
        let spec = spec(Mode::Before, PointQuery::Exit, 0, donor_body);
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let class = ClassFile::decode(&out).unwrap();
        let body = class.methods[0].body.as_ref().unwrap();
        assert_eq!(body.max_stack, 5 + STACK_MARGIN);
        assert_eq!(body.max_locals, 2 + LOCAL_MARGIN);
    }

    #[test]
    fn test_all_overloads_receive_injection() {
        let mut class = target_class();
        let mut body = MethodBody::new();
        body.max_locals = 3;
        body.code = vec![Insn::Simple(Opcode::ReturnVoid)];
        let mut overload = MethodDef::new(access::PUBLIC, "update", "(II)V");
        overload.body = Some(body);
        class.methods.push(overload);
        let bytes = class.encode();

        let spec = spec(
            Mode::Before,
            PointQuery::Exit,
            0,
            donor(vec![Insn::Simple(Opcode::Nop)]),
        );
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let class = ClassFile::decode(&out).unwrap();
        for method in &class.methods {
            let code = &method.body.as_ref().unwrap().code;
            assert!(code.contains(&Insn::Simple(Opcode::Nop)), "{}", method.name);
        }
    }

    #[test]
    fn test_explicit_signature_restricts_overloads() {
        let mut class = target_class();
        let mut body = MethodBody::new();
        body.max_locals = 3;
        body.code = vec![Insn::Simple(Opcode::ReturnVoid)];
        let mut overload = MethodDef::new(access::PUBLIC, "update", "(II)V");
        overload.body = Some(body);
        class.methods.push(overload);
        let bytes = class.encode();

        let mut spec = spec(
            Mode::Before,
            PointQuery::Exit,
            0,
            donor(vec![Insn::Simple(Opcode::Nop)]),
        );
        spec.signature = Some("(II)V".to_string());
        let remap = remap();
        let out = Splicer::new(&spec, &remap).inject(&bytes).unwrap();

        let class = ClassFile::decode(&out).unwrap();
        let plain = class.method("update", "(I)V").unwrap();
        let restricted = class.method("update", "(II)V").unwrap();
        assert!(!plain
            .body
            .as_ref()
            .unwrap()
            .code
            .contains(&Insn::Simple(Opcode::Nop)));
        assert!(restricted
            .body
            .as_ref()
            .unwrap()
            .code
            .contains(&Insn::Simple(Opcode::Nop)));
    }

    #[test]
    fn test_two_specs_same_method_apply_independently() {
        let mut class = ClassFile::new("demo.Vector");
        let mut body = MethodBody::new();
        body.max_locals = 1;
        body.code = vec![
            Insn::Method(
                Opcode::CallVirtual,
                MemberRef::new("demo.Vector", "first", "()V"),
            ),
            Insn::Method(
                Opcode::CallVirtual,
                MemberRef::new("demo.Vector", "second", "()V"),
            ),
            Insn::Simple(Opcode::ReturnVoid),
        ];
        let mut update = MethodDef::new(access::PUBLIC, "update", "()V");
        update.body = Some(body);
        class.methods.push(update);
        let bytes = class.encode();

        let spec_a = spec(
            Mode::Before,
            PointQuery::Invoke,
            0,
            donor(vec![Insn::Const(ConstValue::I32(10)), Insn::Simple(Opcode::Pop)]),
        );
        let spec_b = spec(
            Mode::Before,
            PointQuery::Invoke,
            1,
            donor(vec![Insn::Const(ConstValue::I32(20)), Insn::Simple(Opcode::Pop)]),
        );
        let remap = remap();

        // Apply in both orders; both markers land either way.
        for order in [[&spec_a, &spec_b], [&spec_b, &spec_a]] {
            let mut buf = bytes.clone();
            for spec in order {
                buf = Splicer::new(spec, &remap).inject(&buf).unwrap();
            }
            let code = code_of(&buf, "update");
            assert!(code.contains(&Insn::Const(ConstValue::I32(10))));
            assert!(code.contains(&Insn::Const(ConstValue::I32(20))));
            let pos10 = code
                .iter()
                .position(|i| *i == Insn::Const(ConstValue::I32(10)))
                .unwrap();
            let pos20 = code
                .iter()
                .position(|i| *i == Insn::Const(ConstValue::I32(20)))
                .unwrap();
            assert!(pos10 < pos20);
        }
    }
}
