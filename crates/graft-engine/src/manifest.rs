//! Mixin manifest format.
//!
//! Each packaged unit declares its mixins in a `mixins.json` entry at the
//! archive root: an ordered sequence of fully-qualified mixin type names.

use serde::{Deserialize, Serialize};

/// Archive entry name holding the manifest.
pub const MANIFEST_ENTRY: &str = "mixins.json";

/// Parsed mixin manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Fully-qualified mixin type names, in declaration order.
    pub mixins: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from raw JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
