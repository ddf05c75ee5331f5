//! Per-class-load transform dispatch.
//!
//! The dispatcher is the sole consumer of the host's class-load hook: it
//! receives `(type name, raw bytes)` and answers with transformed bytes or
//! "unchanged". Stages run in a fixed order per descriptor — reference
//! provider, member synthesizer (fields then methods), splicer — because
//! later stages may reference members the earlier stages just added. Any
//! stage failure is reported and leaves the buffer as it was before that
//! stage; the engine can only add or alter behavior, never corrupt an
//! unrelated class.

use crate::diag;
use crate::registry::MixinRegistry;
use crate::splice::Splicer;
use crate::{provide, synthesize};
use std::fmt::Display;

/// Namespaces that always pass through untouched: the engine itself, core
/// platform types, and the class-format dependency.
pub const EXCLUDED_PREFIXES: &[&str] = &["graft.", "lang.", "sys."];

/// Per-class-load transform entry point over a frozen registry.
pub struct Dispatcher<'a> {
    registry: &'a MixinRegistry,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher over a populated registry.
    pub fn new(registry: &'a MixinRegistry) -> Self {
        Self { registry }
    }

    /// Whether a class name falls under an excluded namespace.
    pub fn is_excluded(class_name: &str) -> bool {
        EXCLUDED_PREFIXES
            .iter()
            .any(|prefix| class_name.starts_with(prefix))
    }

    /// Transform one class-load event.
    ///
    /// Returns `None` when the class is excluded or no descriptor targets
    /// it; the host keeps its original bytes. Exactly one logical writer per
    /// class-load event is the caller's contract.
    pub fn transform(&self, class_name: &str, bytes: &[u8]) -> Option<Vec<u8>> {
        if Self::is_excluded(class_name) {
            return None;
        }
        let descriptors = self.registry.descriptors_for(class_name);
        if descriptors.is_empty() {
            return None;
        }

        let mut buf = bytes.to_vec();
        for descriptor in descriptors {
            for shadow in &descriptor.shadow_fields {
                let result = provide::provide_field(shadow, &descriptor.target, &buf);
                buf = keep_on_error(result, buf, &descriptor.mixin, "field provision");
            }
            for shadow in &descriptor.shadow_methods {
                let result = provide::provide_method(shadow, &descriptor.target, &buf);
                buf = keep_on_error(result, buf, &descriptor.mixin, "method provision");
            }
            for field in &descriptor.unique_fields {
                let result = synthesize::add_field(field, &buf);
                buf = keep_on_error(result, buf, &descriptor.mixin, "field synthesis");
            }
            for method in &descriptor.unique_methods {
                let result = synthesize::add_method(method, &descriptor.remap, &buf);
                buf = keep_on_error(result, buf, &descriptor.mixin, "method synthesis");
            }
            for spec in &descriptor.injects {
                let result = Splicer::new(spec, &descriptor.remap).inject(&buf);
                buf = keep_on_error(result, buf, &descriptor.mixin, "splice");
            }
        }
        Some(buf)
    }
}

fn keep_on_error<E: Display>(
    result: Result<Vec<u8>, E>,
    previous: Vec<u8>,
    mixin: &str,
    stage: &str,
) -> Vec<u8> {
    match result {
        Ok(bytes) => bytes,
        Err(e) => {
            diag::error(&format!("{stage} failed for {mixin}: {e}"));
            previous
        }
    }
}
