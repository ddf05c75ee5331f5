//! Mixin descriptor registry.
//!
//! Populated once at startup from every type named by discovered manifests,
//! then frozen: transforms only ever read it, so no locking is needed during
//! the load phase. A candidate becomes a descriptor only if its shape,
//! target association, and resolvability checks pass; failures are reported
//! and the candidate is dropped, never fatal.

use crate::archive::ArchiveSet;
use crate::descriptor::{MixinDescriptor, MixinInfo, ShapeError};
use crate::diag;
use crate::extract;
use graft_bytecode::class::{ClassError, ClassFile};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Reasons a mixin candidate was dropped during population.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The mixin class bytes could not be resolved
    #[error("mixin class {0} is unresolvable")]
    UnresolvableMixin(String),

    /// The declared target could not be resolved
    #[error("target {target} of mixin {mixin} is unresolvable")]
    UnresolvableTarget {
        /// Mixin class name
        mixin: String,
        /// Declared target name
        target: String,
    },

    /// The mixin class bytes do not decode
    #[error("malformed mixin class: {0}")]
    Class(#[from] ClassError),

    /// The mixin class has an invalid shape
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Frozen context object holding every descriptor for the process.
///
/// Built once, passed by reference to the dispatcher; owns its descriptors
/// exclusively until dropped at shutdown.
pub struct MixinRegistry {
    by_target: FxHashMap<String, Vec<MixinDescriptor>>,
}

impl MixinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            by_target: FxHashMap::default(),
        }
    }

    /// Populate a registry from every manifest the archive set knows.
    ///
    /// Dropped candidates are reported to the diagnostic stream; one
    /// malformed mixin never aborts the batch.
    pub fn populate(archives: &ArchiveSet) -> Self {
        let mut registry = Self::new();
        for manifest in archives.manifests() {
            for name in &manifest.mixins {
                match load_descriptor(archives, name) {
                    Ok(descriptor) => registry.insert(descriptor),
                    Err(e) => diag::warn(&format!("dropping mixin {name}: {e}")),
                }
            }
        }
        registry
    }

    fn insert(&mut self, descriptor: MixinDescriptor) {
        self.by_target
            .entry(descriptor.target.clone())
            .or_default()
            .push(descriptor);
    }

    /// All descriptors registered for an exact target type name.
    pub fn descriptors_for(&self, target: &str) -> &[MixinDescriptor] {
        self.by_target
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any descriptor targets the given type.
    pub fn is_target(&self, name: &str) -> bool {
        self.by_target.contains_key(name)
    }

    /// Total number of registered descriptors.
    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    /// Whether the registry holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

impl Default for MixinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn load_descriptor(archives: &ArchiveSet, name: &str) -> Result<MixinDescriptor, RegistryError> {
    let bytes = archives
        .class_bytes(name)
        .ok_or_else(|| RegistryError::UnresolvableMixin(name.to_string()))?;
    let class = ClassFile::decode(&bytes)?;

    let (info, dropped) = MixinInfo::introspect(&class)?;
    for err in &dropped {
        diag::warn(&err.to_string());
    }

    if archives.class_bytes(&info.target).is_none() {
        return Err(RegistryError::UnresolvableTarget {
            mixin: info.name.clone(),
            target: info.target.clone(),
        });
    }

    // One-shot donor extraction, straight from the mixin's raw bytes.
    let mut bodies = FxHashMap::default();
    let donors = info
        .unique_methods
        .iter()
        .map(|decl| (decl.name.clone(), decl.descriptor.clone()))
        .chain(
            info.injects
                .iter()
                .map(|decl| (decl.name.clone(), decl.descriptor.clone())),
        );
    for (donor_name, donor_descriptor) in donors {
        match extract::extract(&bytes, &donor_name, &donor_descriptor) {
            Ok(Some(extraction)) => {
                bodies.insert((donor_name, donor_descriptor), extraction);
            }
            Ok(None) => diag::warn(&format!(
                "donor body {}.{}{} is absent, dropping member",
                info.name, donor_name, donor_descriptor
            )),
            Err(e) => diag::warn(&format!(
                "failed extracting {}.{}{}: {e}",
                info.name, donor_name, donor_descriptor
            )),
        }
    }

    Ok(MixinDescriptor::build(info, bodies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ATTR_INJECT, ATTR_SHADOW, ATTR_TARGET};
    use crate::manifest::MANIFEST_ENTRY;
    use graft_bytecode::class::{access, Attribute, FieldDef, MethodBody, MethodDef};
    use graft_bytecode::insn::Insn;
    use graft_bytecode::opcode::Opcode;
    use std::io::Write;
    use std::path::Path;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_archive(path: &Path, entries: &[(&str, Vec<u8>)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn target_class() -> ClassFile {
        let mut class = ClassFile::new("demo.Vector");
        class.fields.push(FieldDef::new(access::PRIVATE, "x", "D"));
        class
    }

    fn mixin_class(name: &str, target: &str) -> ClassFile {
        let mut class = ClassFile::new(name);
        class.access |= access::ABSTRACT;
        class.attrs.push(Attribute::new(ATTR_TARGET, target));

        let mut shadow = FieldDef::new(access::PRIVATE, "x", "D");
        shadow.attrs.push(Attribute::new(ATTR_SHADOW, ""));
        class.fields.push(shadow);

        let mut inject = MethodDef::new(access::PUBLIC, "onUpdate", "()V");
        inject.attrs.push(Attribute::new(
            ATTR_INJECT,
            r#"{"method": "update", "at": "exit"}"#,
        ));
        let mut body = MethodBody::new();
        body.max_locals = 1;
        body.code = vec![Insn::Simple(Opcode::ReturnVoid)];
        inject.body = Some(body);
        class.methods.push(inject);

        class
    }

    fn populated(entries: &[(&str, Vec<u8>)]) -> MixinRegistry {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.gpk");
        write_archive(&path, entries);
        let mut archives = ArchiveSet::new();
        archives.register(&path).unwrap();
        MixinRegistry::populate(&archives)
    }

    #[test]
    fn test_populate_registers_valid_mixin() {
        let registry = populated(&[
            (
                MANIFEST_ENTRY,
                br#"{"mixins": ["demo.VectorMixin"]}"#.to_vec(),
            ),
            ("demo/Vector.gbc", target_class().encode()),
            (
                "demo/VectorMixin.gbc",
                mixin_class("demo.VectorMixin", "demo.Vector").encode(),
            ),
        ]);

        assert_eq!(registry.len(), 1);
        assert!(registry.is_target("demo.Vector"));
        let descriptors = registry.descriptors_for("demo.Vector");
        assert_eq!(descriptors[0].mixin, "demo.VectorMixin");
        assert_eq!(descriptors[0].injects.len(), 1);
    }

    #[test]
    fn test_unresolvable_mixin_dropped() {
        let registry = populated(&[
            (
                MANIFEST_ENTRY,
                br#"{"mixins": ["demo.Missing"]}"#.to_vec(),
            ),
            ("demo/Vector.gbc", target_class().encode()),
        ]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unresolvable_target_dropped() {
        let registry = populated(&[
            (
                MANIFEST_ENTRY,
                br#"{"mixins": ["demo.VectorMixin"]}"#.to_vec(),
            ),
            (
                "demo/VectorMixin.gbc",
                mixin_class("demo.VectorMixin", "demo.Gone").encode(),
            ),
        ]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_shape_dropped_without_aborting_batch() {
        let mut concrete = mixin_class("demo.BadMixin", "demo.Vector");
        concrete.access &= !access::ABSTRACT;

        let registry = populated(&[
            (
                MANIFEST_ENTRY,
                br#"{"mixins": ["demo.BadMixin", "demo.VectorMixin"]}"#.to_vec(),
            ),
            ("demo/Vector.gbc", target_class().encode()),
            ("demo/BadMixin.gbc", concrete.encode()),
            (
                "demo/VectorMixin.gbc",
                mixin_class("demo.VectorMixin", "demo.Vector").encode(),
            ),
        ]);

        // The malformed candidate is gone, the valid one survived.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.descriptors_for("demo.Vector")[0].mixin, "demo.VectorMixin");
    }

    #[test]
    fn test_unknown_target_lookup_is_empty() {
        let registry = MixinRegistry::new();
        assert!(registry.descriptors_for("demo.Nothing").is_empty());
        assert!(!registry.is_target("demo.Nothing"));
    }
}
