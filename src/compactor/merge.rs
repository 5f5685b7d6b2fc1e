//! Merge manifests (`.merge`).
//!
//! A manifest lists other resources, one per line; `#` starts a comment
//! line. Lines starting with `/` are webapp-absolute, anything else is
//! relative to the manifest. The output is the concatenation of the listed
//! resources' outputs in listed order.
//!
//! ```text
//! # /js/all.merge
//! /lib/jquery.js
//! app.js
//! ../widgets/all.merge
//! ```
//!
//! After the build, a multi-child manifest's hashed path is aliased to a
//! debug stand-in that loads every child separately. A single-child
//! manifest aliases straight to that child.

use super::Compactor;
use crate::build::BuildManager;
use crate::placeholder::PlaceholderGenerator;
use crate::utils::hash::ContentDigest;
use crate::utils::path::{extension, file_name, resolve_link};
use crate::{debug, log};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Directory (below the cdn root) holding debug stand-ins.
const DEBUG_DIR: &str = "debug/";

pub struct MergeCompactor {
    placeholders: Vec<Box<dyn PlaceholderGenerator>>,
}

impl MergeCompactor {
    pub fn new(placeholders: Vec<Box<dyn PlaceholderGenerator>>) -> Self {
        Self { placeholders }
    }

    fn placeholder_for(&self, extension: &str) -> Option<&dyn PlaceholderGenerator> {
        self.placeholders
            .iter()
            .find(|generator| generator.target_extension() == extension)
            .map(Box::as_ref)
    }
}

impl std::fmt::Debug for MergeCompactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extensions: Vec<_> = self
            .placeholders
            .iter()
            .map(|generator| generator.target_extension())
            .collect();
        f.debug_struct("MergeCompactor")
            .field("placeholders", &extensions)
            .finish()
    }
}

impl Compactor for MergeCompactor {
    fn source_extensions(&self) -> Vec<String> {
        vec![".merge".to_string()]
    }

    /// Extension of the first child whose hashed name has one.
    fn target_extension(&self, manager: &BuildManager, path: &str) -> String {
        manager
            .dependencies(path)
            .filter_map(|child| manager.processed_path(child))
            .map(extension)
            .find(|ext| !ext.is_empty())
            .unwrap_or_default()
    }

    /// Resolves every listed child and hashes their hashed paths in order.
    /// A manifest with nothing resolvable fails.
    fn calc_hash(
        &self,
        manager: &mut BuildManager,
        digest: &mut ContentDigest,
        path: &str,
        source: &Path,
    ) -> io::Result<()> {
        let listing = fs::read_to_string(source)?;
        for child in manifest_entries(path, &listing) {
            manager.ensure_processed(&child);
            let Some(hashed) = manager.processed_path(&child).map(str::to_string) else {
                log!("warning"; "missing merge reference: {} (in {})", child, path);
                continue;
            };
            if manager.add_dependency(path, &child) {
                digest.update_str(&hashed);
            }
        }
        if manager.dependencies(path).next().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "no resolvable entries to merge",
            ));
        }
        Ok(())
    }

    fn compact(
        &self,
        manager: &mut BuildManager,
        path: &str,
        _source: &Path,
        target: &Path,
    ) -> io::Result<()> {
        let children: Vec<String> = manager.dependencies(path).map(str::to_string).collect();
        let mut writer = BufWriter::new(File::create(target)?);
        let mut last_byte = None;
        for child in &children {
            let Some(child_target) = manager.target_file(child) else {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("merge child {child} has no output"),
                ));
            };
            let mut content = Vec::new();
            File::open(&child_target)?.read_to_end(&mut content)?;
            if content.is_empty() {
                continue;
            }
            // keep the previous child's last statement or rule terminated
            if last_byte.is_some_and(|byte| byte != b'\n') {
                writer.write_all(b"\n")?;
            }
            writer.write_all(&content)?;
            last_byte = content.last().copied();
        }
        writer.flush()?;
        debug!("merge"; "{}: merged {} file(s)", path, children.len());
        Ok(())
    }

    /// Alias the hashed path to its debug stand-in.
    fn emit_debug(&self, manager: &mut BuildManager, path: &str) -> io::Result<()> {
        let Some(hashed) = manager.processed_path(path).map(str::to_string) else {
            return Ok(());
        };
        let children: Vec<String> = manager.dependencies(path).map(str::to_string).collect();

        match children.as_slice() {
            [] => Ok(()),
            [only] => {
                let alias = manager.placeholder_path(only).to_string();
                manager.set_processed_path(&hashed, &alias);
                Ok(())
            }
            _ => {
                let debug = debug_path(&hashed);
                manager.set_processed_path(&hashed, &debug);
                for child in &children {
                    manager.add_child_link(&debug, child);
                }

                let target = manager.settings().target_file(&debug);
                if target.exists() {
                    return Ok(());
                }
                let ext = extension(&hashed);
                let Some(generator) = self.placeholder_for(&ext) else {
                    log!("warning"; "{}: no debug stand-in for `{}` outputs", path, ext);
                    return Ok(());
                };
                generator.build(manager, &target, &children)
            }
        }
    }
}

/// Logical paths listed in a manifest, in order.
///
/// Blank lines and `#` comments are skipped; so are lines that point
/// outside the webapp.
pub fn manifest_entries(manifest: &str, listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let resolved = resolve_link(manifest, line);
            if resolved.is_none() {
                log!("warning"; "ignoring merge entry `{}` (in {})", line, manifest);
            }
            resolved
        })
        .collect()
}

/// Debug stand-in path of a hashed path: `/cdn/ab12.js` -> `/cdn/debug/ab12.js`.
pub fn debug_path(hashed: &str) -> String {
    let name = file_name(hashed);
    let dir = &hashed[..hashed.len() - name.len()];
    format!("{dir}{DEBUG_DIR}{name}")
}
