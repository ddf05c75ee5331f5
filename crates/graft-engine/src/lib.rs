//! Graft Mixin Weaving Engine
//!
//! Weaves companion mixin definitions into already-compiled classes at load
//! time: shadow members resolve against the target, unique members are
//! grafted on, and donor code fragments are spliced into located points of
//! existing method bodies. Transformation is a pure, in-memory, per-load
//! function; nothing is persisted and nothing is transformed twice.
//!
//! Pipeline per class-load event (see [`dispatch::Dispatcher`]):
//! reference provider, member synthesizer, splicer, in that order.

#![warn(rust_2018_idioms)]

pub mod archive;
pub mod descriptor;
pub mod diag;
pub mod dispatch;
pub mod extract;
pub mod locate;
pub mod manifest;
pub mod provide;
pub mod registry;
pub mod remap;
pub mod splice;
pub mod synthesize;

pub use archive::{ArchiveError, ArchiveSet};
pub use descriptor::{
    InjectConfig, InjectSpec, MixinDescriptor, MixinInfo, Mode, ShapeError, UniqueField,
    UniqueMethod,
};
pub use dispatch::{Dispatcher, EXCLUDED_PREFIXES};
pub use extract::{extract, ExtractError, Extraction};
pub use locate::{locate, ConstKind, PointQuery};
pub use manifest::Manifest;
pub use registry::{MixinRegistry, RegistryError};
pub use remap::RemapTable;
pub use splice::Splicer;
