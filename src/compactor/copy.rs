//! Pass-through compactor for opaque files (images, fonts, ...).

use super::Compactor;
use crate::build::BuildManager;
use crate::utils::hash::ContentDigest;
use crate::utils::path::extension;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Copies files unchanged; the hash is the digest of the raw bytes.
#[derive(Debug, Clone, Default)]
pub struct CopyCompactor {
    extensions: Vec<String>,
}

impl CopyCompactor {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

impl Compactor for CopyCompactor {
    fn source_extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }

    fn target_extension(&self, _manager: &BuildManager, path: &str) -> String {
        extension(path)
    }

    fn calc_hash(
        &self,
        _manager: &mut BuildManager,
        digest: &mut ContentDigest,
        _path: &str,
        source: &Path,
    ) -> io::Result<()> {
        hash_file(digest, source)
    }

    fn compact(
        &self,
        _manager: &mut BuildManager,
        _path: &str,
        source: &Path,
        target: &Path,
    ) -> io::Result<()> {
        copy_file(source, target)
    }
}

/// Stream a file's bytes into `digest`.
pub fn hash_file(digest: &mut ContentDigest, source: &Path) -> io::Result<()> {
    digest.update_reader(File::open(source)?)
}

/// Copy `source` to `target`, creating parent directories.
pub fn copy_file(source: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(())
}
