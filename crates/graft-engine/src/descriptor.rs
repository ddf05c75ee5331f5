//! Member descriptor model.
//!
//! Mixin classes carry their markers as class/member attributes in the
//! compiled form: `mixin.target` names the one target association,
//! `mixin.shadow` and `mixin.unique` mark members, and `mixin.inject`
//! carries a JSON configuration payload.
//!
//! Construction is split in two phases. [`MixinInfo::introspect`] reads a
//! decoded class into plain declaration values and is the only step that
//! looks at a class file. [`MixinDescriptor::build`] is a pure data
//! transformation from those values (plus pre-extracted donor bodies) into
//! the descriptor and its remap table, so it can be tested without any I/O.

use crate::extract::Extraction;
use crate::locate::PointQuery;
use crate::remap::RemapTable;
use graft_bytecode::class::{ClassFile, FieldDef};
use graft_bytecode::insn::ConstValue;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class attribute naming the target type.
pub const ATTR_TARGET: &str = "mixin.target";
/// Member attribute marking a shadow member.
pub const ATTR_SHADOW: &str = "mixin.shadow";
/// Member attribute marking a unique member.
pub const ATTR_UNIQUE: &str = "mixin.unique";
/// Method attribute carrying an inject configuration.
pub const ATTR_INJECT: &str = "mixin.inject";

/// Mixin shape and configuration errors.
///
/// Class-level errors drop the whole candidate; member-level errors drop the
/// offending member and processing continues.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Mixin class is not abstract
    #[error("mixin {0} must be abstract")]
    NotAbstract(String),

    /// Mixin class is an interface, enum, or annotation
    #[error("mixin {0} must be a plain class")]
    NotPlainClass(String),

    /// No target association declared
    #[error("mixin {0} declares no target association")]
    MissingTarget(String),

    /// More than one target association declared
    #[error("mixin {0} declares more than one target association")]
    MultipleTargets(String),

    /// Member carries mutually exclusive markers
    #[error("member {member} cannot be marked {first} and {second}")]
    ConflictingMarkers {
        /// Offending member name
        member: String,
        /// First marker
        first: &'static str,
        /// Second marker
        second: &'static str,
    },

    /// Inject configuration payload does not parse
    #[error("invalid inject configuration on {member}: {source}")]
    BadInjectConfig {
        /// Offending method name
        member: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },
}

/// Splice mode of an inject spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Insert the donor block before the located instruction.
    #[default]
    Before,
    /// Insert the donor block after the located instruction.
    After,
    /// Insert the donor block, then remove exactly the located instruction.
    Replace,
}

/// Parsed `mixin.inject` attribute payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectConfig {
    /// Target method name.
    pub method: String,
    /// Point query locating the injection site.
    pub at: PointQuery,
    /// Splice mode.
    #[serde(default)]
    pub mode: Mode,
    /// Which category match to use (0 = first).
    #[serde(default)]
    pub index: u32,
    /// Explicit target method descriptor for overload disambiguation.
    #[serde(default)]
    pub signature: Option<String>,
}

/// A plain member declaration read off the mixin class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    /// Member name
    pub name: String,
    /// Type or method descriptor
    pub descriptor: String,
    /// Declared access flags
    pub access: u32,
}

/// A unique field declaration, with its extracted constant if any.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueFieldDecl {
    /// The declaration
    pub decl: MemberDecl,
    /// Literal initializer for static-final fields
    pub constant: Option<ConstValue>,
}

/// An inject method declaration with its parsed configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectDecl {
    /// Donor method name
    pub name: String,
    /// Donor method descriptor
    pub descriptor: String,
    /// Parsed configuration payload
    pub config: InjectConfig,
}

/// Phase-1 result: everything introspection read off a mixin class.
#[derive(Debug, Clone, PartialEq)]
pub struct MixinInfo {
    /// Mixin class name
    pub name: String,
    /// Declared target type name
    pub target: String,
    /// Shadow field declarations
    pub shadow_fields: Vec<MemberDecl>,
    /// Shadow method declarations
    pub shadow_methods: Vec<MemberDecl>,
    /// Unique field declarations
    pub unique_fields: Vec<UniqueFieldDecl>,
    /// Unique method declarations
    pub unique_methods: Vec<MemberDecl>,
    /// Inject declarations
    pub injects: Vec<InjectDecl>,
}

impl MixinInfo {
    /// Introspect a decoded mixin class into plain declaration values.
    ///
    /// Class-level shape violations fail the whole candidate. Member-level
    /// violations drop the member and are returned for the caller to report.
    pub fn introspect(class: &ClassFile) -> Result<(Self, Vec<ShapeError>), ShapeError> {
        if class.is_interface() || class.is_enum() || class.is_annotation() {
            return Err(ShapeError::NotPlainClass(class.name.clone()));
        }
        if !class.is_abstract() {
            return Err(ShapeError::NotAbstract(class.name.clone()));
        }
        let target_count = class
            .attrs
            .iter()
            .filter(|attr| attr.name == ATTR_TARGET)
            .count();
        let target = match target_count {
            0 => return Err(ShapeError::MissingTarget(class.name.clone())),
            1 => class.attr(ATTR_TARGET).unwrap_or_default().to_string(),
            _ => return Err(ShapeError::MultipleTargets(class.name.clone())),
        };

        let mut info = Self {
            name: class.name.clone(),
            target,
            shadow_fields: Vec::new(),
            shadow_methods: Vec::new(),
            unique_fields: Vec::new(),
            unique_methods: Vec::new(),
            injects: Vec::new(),
        };
        let mut dropped = Vec::new();

        for field in &class.fields {
            let shadow = field.has_attr(ATTR_SHADOW);
            let unique = field.has_attr(ATTR_UNIQUE);
            if shadow && unique {
                dropped.push(ShapeError::ConflictingMarkers {
                    member: format!("{}.{}", class.name, field.name),
                    first: ATTR_SHADOW,
                    second: ATTR_UNIQUE,
                });
                continue;
            }
            let decl = MemberDecl {
                name: field.name.clone(),
                descriptor: field.descriptor.clone(),
                access: field.access,
            };
            if shadow {
                info.shadow_fields.push(decl);
            } else if unique {
                info.unique_fields.push(UniqueFieldDecl {
                    constant: constant_literal(field),
                    decl,
                });
            }
        }

        for method in &class.methods {
            let member = || format!("{}.{}", class.name, method.name);
            let markers = [
                (ATTR_SHADOW, method.has_attr(ATTR_SHADOW)),
                (ATTR_UNIQUE, method.has_attr(ATTR_UNIQUE)),
                (ATTR_INJECT, method.has_attr(ATTR_INJECT)),
            ];
            let set: Vec<&'static str> = markers
                .iter()
                .filter(|(_, present)| *present)
                .map(|(name, _)| *name)
                .collect();
            if set.len() > 1 {
                dropped.push(ShapeError::ConflictingMarkers {
                    member: member(),
                    first: set[0],
                    second: set[1],
                });
                continue;
            }

            let decl = MemberDecl {
                name: method.name.clone(),
                descriptor: method.descriptor.clone(),
                access: method.access,
            };
            match set.first() {
                Some(&marker) if marker == ATTR_SHADOW => info.shadow_methods.push(decl),
                Some(&marker) if marker == ATTR_UNIQUE => info.unique_methods.push(decl),
                Some(&marker) if marker == ATTR_INJECT => {
                    let payload = method.attr(ATTR_INJECT).unwrap_or_default();
                    match serde_json::from_str::<InjectConfig>(payload) {
                        Ok(config) => info.injects.push(InjectDecl {
                            name: method.name.clone(),
                            descriptor: method.descriptor.clone(),
                            config,
                        }),
                        Err(source) => dropped.push(ShapeError::BadInjectConfig {
                            member: member(),
                            source,
                        }),
                    }
                }
                _ => {}
            }
        }

        Ok((info, dropped))
    }
}

/// Extract the literal initializer of a static-immutable field.
///
/// Booleans fold to integers (true is 1); anything without a literal yields
/// nothing and the field initializes to its type default.
fn constant_literal(field: &FieldDef) -> Option<ConstValue> {
    if !field.is_static() || !field.is_final() {
        return None;
    }
    match field.constant.as_ref()? {
        ConstValue::Bool(b) => Some(ConstValue::I32(i32::from(*b))),
        ConstValue::Null => None,
        value => Some(value.clone()),
    }
}

/// A wholly new field grafted onto the target.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueField {
    /// Field name
    pub name: String,
    /// Type descriptor
    pub descriptor: String,
    /// Declared access flags
    pub access: u32,
    /// Literal initializer, if the field is a static-immutable constant
    pub constant: Option<ConstValue>,
}

/// A wholly new method grafted onto the target.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueMethod {
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Declared access flags
    pub access: u32,
    /// Extracted donor body
    pub body: Extraction,
}

/// One splice of donor code into a target method.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectSpec {
    /// Donor method name
    pub donor_name: String,
    /// Donor method descriptor
    pub donor_descriptor: String,
    /// Target method name
    pub target_method: String,
    /// Point query locating the injection site
    pub query: PointQuery,
    /// Splice mode
    pub mode: Mode,
    /// Which category match to use
    pub occurrence: u32,
    /// Explicit target descriptor for overload disambiguation
    pub signature: Option<String>,
    /// Extracted donor body
    pub body: Extraction,
}

/// Everything the engine knows about one mixin, frozen after construction.
#[derive(Debug, Clone)]
pub struct MixinDescriptor {
    /// Mixin class name
    pub mixin: String,
    /// Target type name
    pub target: String,
    /// Shadow field declarations
    pub shadow_fields: Vec<MemberDecl>,
    /// Shadow method declarations
    pub shadow_methods: Vec<MemberDecl>,
    /// Unique fields to synthesize
    pub unique_fields: Vec<UniqueField>,
    /// Unique methods to synthesize
    pub unique_methods: Vec<UniqueMethod>,
    /// Inject specs to splice
    pub injects: Vec<InjectSpec>,
    /// Reference rewriting table covering all shadow and unique members
    pub remap: RemapTable,
}

impl MixinDescriptor {
    /// Build a descriptor from introspected declarations and pre-extracted
    /// donor bodies, keyed by `(name, descriptor)`.
    ///
    /// Pure data transformation: unique methods and injects whose body is
    /// missing from `bodies` were already reported by the extraction step
    /// and are dropped here.
    pub fn build(info: MixinInfo, mut bodies: FxHashMap<(String, String), Extraction>) -> Self {
        let mut remap = RemapTable::new(info.name.clone(), info.target.clone());
        for decl in &info.shadow_fields {
            remap.add_field(&decl.name, &decl.descriptor);
        }
        for decl in &info.unique_fields {
            remap.add_field(&decl.decl.name, &decl.decl.descriptor);
        }
        for decl in &info.shadow_methods {
            remap.add_method(&decl.name, &decl.descriptor);
        }
        for decl in &info.unique_methods {
            remap.add_method(&decl.name, &decl.descriptor);
        }

        let unique_fields = info
            .unique_fields
            .into_iter()
            .map(|field| UniqueField {
                name: field.decl.name,
                descriptor: field.decl.descriptor,
                access: field.decl.access,
                constant: field.constant,
            })
            .collect();

        let unique_methods = info
            .unique_methods
            .into_iter()
            .filter_map(|decl| {
                let body = bodies.remove(&(decl.name.clone(), decl.descriptor.clone()))?;
                Some(UniqueMethod {
                    name: decl.name,
                    descriptor: decl.descriptor,
                    access: decl.access,
                    body,
                })
            })
            .collect();

        let injects = info
            .injects
            .into_iter()
            .filter_map(|decl| {
                let body = bodies.remove(&(decl.name.clone(), decl.descriptor.clone()))?;
                Some(InjectSpec {
                    donor_name: decl.name,
                    donor_descriptor: decl.descriptor,
                    target_method: decl.config.method,
                    query: decl.config.at,
                    mode: decl.config.mode,
                    occurrence: decl.config.index,
                    signature: decl.config.signature,
                    body,
                })
            })
            .collect();

        Self {
            mixin: info.name,
            target: info.target,
            shadow_fields: info.shadow_fields,
            shadow_methods: info.shadow_methods,
            unique_fields,
            unique_methods,
            injects,
            remap,
        }
    }
}
