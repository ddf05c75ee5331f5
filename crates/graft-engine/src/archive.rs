//! Archive containers backing donor-byte lookups.
//!
//! Mixin and donor classes ship inside `.gpk` archives (plain zip
//! containers). The set is populated during startup, then serves read-only
//! byte lookups for the rest of the process; lookups go through a memoizing
//! cache, and concurrent misses for the same type may race to parse but
//! always converge on equal bytes.

use crate::diag;
use crate::manifest::{Manifest, MANIFEST_ENTRY};
use dashmap::DashMap;
use graft_bytecode::class::CLASS_EXT;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// File extension of archive containers.
pub const ARCHIVE_EXT: &str = "gpk";

/// Archive registration errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed archive
    #[error("Archive error: {0}")]
    Zip(#[from] ZipError),
}

/// An ordered set of open archive containers with a donor-byte cache.
pub struct ArchiveSet {
    archives: Vec<(PathBuf, Mutex<ZipArchive<File>>)>,
    cache: DashMap<String, Vec<u8>>,
}

impl ArchiveSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            archives: Vec::new(),
            cache: DashMap::new(),
        }
    }

    /// Number of registered archives.
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether no archives are registered.
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Open an archive and retain its handle.
    pub fn register(&mut self, path: &Path) -> Result<(), ArchiveError> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        self.archives.push((path.to_path_buf(), Mutex::new(archive)));
        Ok(())
    }

    /// Recursively register every `.gpk` archive under a directory.
    ///
    /// Unreadable entries are reported and skipped; returns the number of
    /// archives registered.
    pub fn scan_dir(&mut self, dir: &Path) -> usize {
        let mut registered = 0;
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                registered += self.scan_dir(&path);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some(ARCHIVE_EXT) {
                match self.register(&path) {
                    Ok(()) => registered += 1,
                    Err(e) => diag::warn(&format!("skipping archive {}: {e}", path.display())),
                }
            }
        }
        registered
    }

    /// Fetch the raw bytes of a class by fully-qualified name.
    ///
    /// Resolves `name` to `path/to/Name.gbc` across containers in
    /// registration order. Found bytes are cached; absence is not.
    pub fn class_bytes(&self, name: &str) -> Option<Vec<u8>> {
        if let Some(bytes) = self.cache.get(name) {
            return Some(bytes.clone());
        }

        let entry_path = format!("{}.{}", name.replace('.', "/"), CLASS_EXT);
        for (path, archive) in &self.archives {
            match read_entry(&mut archive.lock(), &entry_path) {
                Ok(Some(bytes)) => {
                    self.cache.insert(name.to_string(), bytes.clone());
                    return Some(bytes);
                }
                Ok(None) => {}
                Err(e) => {
                    diag::warn(&format!("failed reading {} from {}: {e}", entry_path, path.display()));
                }
            }
        }
        None
    }

    /// Parse every registered container's manifest.
    ///
    /// Containers without a manifest are skipped; malformed manifests are
    /// reported and skipped.
    pub fn manifests(&self) -> Vec<Manifest> {
        let mut manifests = Vec::new();
        for (path, archive) in &self.archives {
            match read_entry(&mut archive.lock(), MANIFEST_ENTRY) {
                Ok(Some(bytes)) => match Manifest::parse(&bytes) {
                    Ok(manifest) => manifests.push(manifest),
                    Err(e) => {
                        diag::warn(&format!("malformed manifest in {}: {e}", path.display()))
                    }
                },
                Ok(None) => {}
                Err(e) => diag::warn(&format!("failed reading manifest from {}: {e}", path.display())),
            }
        }
        manifests
    }

    /// Release every archive handle and the byte cache.
    ///
    /// The set is unusable afterwards; called exactly once at shutdown.
    pub fn close(&mut self) {
        self.archives.clear();
        self.cache.clear();
    }
}

impl Default for ArchiveSet {
    fn default() -> Self {
        Self::new()
    }
}

fn read_entry(
    archive: &mut ZipArchive<File>,
    entry_path: &str,
) -> Result<Option<Vec<u8>>, ArchiveError> {
    let mut entry = match archive.by_name(entry_path) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}
