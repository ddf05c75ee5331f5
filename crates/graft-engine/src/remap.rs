//! Symbol remapping.
//!
//! A [`RemapTable`] redirects symbolic references inside donor code so they
//! resolve against the target type: every shadow and unique member keys the
//! table by `(name, descriptor)`, and references the mixin makes to itself
//! rewrite to the target as well. Keys absent from the table are left
//! untouched. Built once per descriptor, immutable afterwards.

use graft_bytecode::insn::Insn;
use rustc_hash::FxHashMap;

type MemberKey = (String, String);

/// Immutable per-mixin reference rewriting table.
#[derive(Debug, Clone)]
pub struct RemapTable {
    fields: FxHashMap<MemberKey, String>,
    methods: FxHashMap<MemberKey, String>,
    mixin: String,
    target: String,
}

impl RemapTable {
    /// Create an empty table for a mixin/target pair.
    pub fn new(mixin: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            fields: FxHashMap::default(),
            methods: FxHashMap::default(),
            mixin: mixin.into(),
            target: target.into(),
        }
    }

    /// The target type every mapped reference rewrites to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Map a field `(name, descriptor)` to the target owner.
    pub fn add_field(&mut self, name: impl Into<String>, descriptor: impl Into<String>) {
        self.fields
            .insert((name.into(), descriptor.into()), self.target.clone());
    }

    /// Map a method `(name, descriptor)` to the target owner.
    pub fn add_method(&mut self, name: impl Into<String>, descriptor: impl Into<String>) {
        self.methods
            .insert((name.into(), descriptor.into()), self.target.clone());
    }

    /// Number of mapped members.
    pub fn len(&self) -> usize {
        self.fields.len() + self.methods.len()
    }

    /// Whether the table maps no members.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }

    fn field_owner(&self, name: &str, descriptor: &str, owner: &str) -> Option<&str> {
        self.member_owner(&self.fields, name, descriptor, owner)
    }

    fn method_owner(&self, name: &str, descriptor: &str, owner: &str) -> Option<&str> {
        self.member_owner(&self.methods, name, descriptor, owner)
    }

    fn member_owner<'a>(
        &'a self,
        map: &'a FxHashMap<MemberKey, String>,
        name: &str,
        descriptor: &str,
        owner: &str,
    ) -> Option<&'a str> {
        if let Some(target) = map.get(&(name.to_string(), descriptor.to_string())) {
            return Some(target);
        }
        if owner == self.mixin {
            return Some(&self.target);
        }
        None
    }

    /// Rewrite a type name: the mixin's own name becomes the target.
    pub fn rewrite_type<'a>(&'a self, name: &'a str) -> &'a str {
        if name == self.mixin {
            &self.target
        } else {
            name
        }
    }

    /// Rewrite one instruction, one rule per instruction kind.
    ///
    /// Field and method references go through the member maps plus the
    /// self-owner rule; type operands and multi-new-array descriptors only
    /// through the self-owner rule. Everything else passes through cloned.
    pub fn rewrite_insn(&self, insn: &Insn) -> Insn {
        match insn {
            Insn::Field(op, member) => {
                match self.field_owner(&member.name, &member.descriptor, &member.owner) {
                    Some(owner) => {
                        let mut member = member.clone();
                        member.owner = owner.to_string();
                        Insn::Field(*op, member)
                    }
                    None => insn.clone(),
                }
            }
            Insn::Method(op, member) => {
                match self.method_owner(&member.name, &member.descriptor, &member.owner) {
                    Some(owner) => {
                        let mut member = member.clone();
                        member.owner = owner.to_string();
                        Insn::Method(*op, member)
                    }
                    None => insn.clone(),
                }
            }
            Insn::Type(op, name) => Insn::Type(*op, self.rewrite_type(name).to_string()),
            Insn::MultiNewArray { descriptor, dims } => {
                let elem = format!("L{};", self.mixin);
                if descriptor.contains(&elem) {
                    Insn::MultiNewArray {
                        descriptor: descriptor.replace(&elem, &format!("L{};", self.target)),
                        dims: *dims,
                    }
                } else {
                    insn.clone()
                }
            }
            other => other.clone(),
        }
    }
}
