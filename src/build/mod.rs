//! Build orchestration.
//!
//! [`BuildManager`] owns the state of one build run and resolves resources
//! on demand:
//!
//! ```text
//! discover ──► resolve(path) ──► hash ──► compact ──► verify ──► debug
//!                  ▲               │
//!                  └───────────────┘  (children: manifest entries, url()s)
//! ```
//!
//! A resource is *processed* once it has a hashed path and its output file
//! exists. Resolution is recursive and memoized: whoever needs a resource
//! first builds it, regardless of discovery order. A path re-entered while
//! still being resolved is a cycle and fails that branch only.

mod error;
mod inflight;
mod output;
mod tables;


pub use error::{BuildError, ResolveError};
pub use inflight::{InFlight, InFlightGuard};
pub use tables::{PathSetMap, propagate_child_links};

use crate::compactor::{CompactorRegistry, copy_file};
use crate::config::Settings;
use crate::discover::find_files;
use crate::logger::ProgressLine;
use crate::utils::hash::ContentDigest;
use crate::utils::path::extension;
use crate::{debug, log};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Summary of a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Candidate files found on disk.
    pub discovered: usize,
    /// Resources that failed to resolve (logged, left out of the map).
    pub failed: usize,
    /// Entries written to the map file.
    pub mapped: usize,
    /// Entries written to the child-link table.
    pub linked: usize,
}

/// State of one build run.
pub struct BuildManager {
    settings: Settings,
    compactors: Arc<CompactorRegistry>,
    /// Logical path -> hashed path, plus hashed path -> debug alias.
    hash_lookup: IndexMap<String, String>,
    /// Manifest -> resolved children, in manifest order.
    dependencies: PathSetMap,
    /// Resource -> logical paths it references.
    child_links: PathSetMap,
    in_flight: InFlight,
}

impl BuildManager {
    /// Manager with the built-in compactors.
    pub fn new(settings: Settings) -> Result<Self, BuildError> {
        let compactors = CompactorRegistry::standard(&settings);
        Self::with_compactors(settings, compactors)
    }

    /// Manager with a custom compactor registry.
    pub fn with_compactors(
        settings: Settings,
        compactors: CompactorRegistry,
    ) -> Result<Self, BuildError> {
        settings.validate()?;
        Ok(Self {
            settings,
            compactors: Arc::new(compactors),
            hash_lookup: IndexMap::new(),
            dependencies: PathSetMap::new(),
            child_links: PathSetMap::new(),
            in_flight: InFlight::new(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Hashed path of `path`, if it has been hashed.
    pub fn processed_path(&self, path: &str) -> Option<&str> {
        self.hash_lookup.get(path).map(String::as_str)
    }

    /// Path to load `path` through in debug mode.
    ///
    /// Follows one extra indirection: a merged output maps to its debug
    /// stand-in. Falls back to the hashed path, then to `path` itself.
    pub fn placeholder_path<'a>(&'a self, path: &'a str) -> &'a str {
        let Some(hashed) = self.processed_path(path) else {
            return path;
        };
        self.processed_path(hashed).unwrap_or(hashed)
    }

    /// Resolved children of a manifest, in manifest order.
    pub fn dependencies<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.dependencies.children(path)
    }

    /// Logical paths referenced by `path`.
    pub fn child_links<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.child_links.children(path)
    }

    /// Output file of `path`, if it has been hashed.
    pub fn target_file(&self, path: &str) -> Option<PathBuf> {
        self.processed_path(path)
            .map(|hashed| self.settings.target_file(hashed))
    }

    pub fn hash_lookup(&self) -> &IndexMap<String, String> {
        &self.hash_lookup
    }

    pub fn child_link_map(&self) -> &PathSetMap {
        &self.child_links
    }

    /// Hashed and written.
    pub fn is_processed(&self, path: &str) -> bool {
        self.target_file(path).is_some_and(|target| target.exists())
    }

    // ========================================================================
    // Mutations (for compactors)
    // ========================================================================

    pub fn set_processed_path(&mut self, path: &str, hashed: &str) {
        self.hash_lookup.insert(path.to_string(), hashed.to_string());
    }

    /// Record `child` as a manifest entry of `path`. `false` if already known.
    pub fn add_dependency(&mut self, path: &str, child: &str) -> bool {
        self.dependencies.insert(path, child)
    }

    pub fn add_child_link(&mut self, path: &str, child: &str) -> bool {
        self.child_links.insert(path, child)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Make sure `path` is processed, building it if needed.
    ///
    /// Returns whether `path` has a hashed path afterwards. Failures are
    /// logged, never raised.
    pub fn ensure_processed(&mut self, path: &str) -> bool {
        if self.is_processed(path) {
            return true;
        }
        match self.settings.find_source_file(path) {
            Some(source) => {
                if let Err(err) = self.resolve(path, &source) {
                    err.report();
                }
            }
            None => debug!("build"; "no source file for {}", path),
        }
        self.hash_lookup.contains_key(path)
    }

    /// Hash, compact and verify one resource.
    pub fn resolve(&mut self, path: &str, source: &Path) -> Result<(), ResolveError> {
        let Some(_guard) = self.in_flight.enter(path) else {
            let mut chain = self.in_flight.chain();
            chain.push(path.to_string());
            return Err(ResolveError::Cycle {
                chain: chain.join(" -> "),
            });
        };

        let ext = extension(&source.to_string_lossy());
        let Some(compactor) = self.compactors.get(&ext) else {
            return Err(ResolveError::NoCompactor {
                path: path.to_string(),
            });
        };

        if !self.hash_lookup.contains_key(path) {
            let mut digest = ContentDigest::new();
            compactor
                .calc_hash(self, &mut digest, path, source)
                .map_err(|err| ResolveError::io(path, err))?;
            let target_ext = compactor.target_extension(self, path);
            let hashed = format!("{}{}{}", self.settings.cdn_root(), digest.finalize_hex(), target_ext);
            debug!("hash"; "{} -> {}", path, hashed);
            self.set_processed_path(path, &hashed);
        }

        let target = self
            .target_file(path)
            .ok_or_else(|| ResolveError::NoOutput {
                path: path.to_string(),
            })?;

        if !target.exists() {
            debug!("build"; "compacting {}", path);
            let compacted = match target.parent() {
                Some(parent) => fs::create_dir_all(parent),
                None => Ok(()),
            }
            .and_then(|()| compactor.compact(self, path, source, &target));
            if let Err(err) = compacted {
                // never leave a half-written output behind a hashed name
                let _ = fs::remove_file(&target);
                self.hash_lookup.shift_remove(path);
                return Err(ResolveError::io(path, err));
            }
        }

        match fs::metadata(&target).map(|meta| meta.len()) {
            Err(_) => {
                self.hash_lookup.shift_remove(path);
                return Err(ResolveError::NoOutput {
                    path: path.to_string(),
                });
            }
            Ok(0) => {
                let source_len = match fs::metadata(source) {
                    Ok(meta) => meta.len(),
                    Err(err) => {
                        self.hash_lookup.shift_remove(path);
                        return Err(ResolveError::io(path, err));
                    }
                };
                if source_len == 0 {
                    self.hash_lookup.shift_remove(path);
                    return Err(ResolveError::Empty {
                        path: path.to_string(),
                    });
                }
                log!("warning"; "{} compacted to nothing, using the original", path);
                if let Err(err) = copy_file(source, &target) {
                    self.hash_lookup.shift_remove(path);
                    return Err(ResolveError::io(path, err));
                }
            }
            Ok(_) => {}
        }

        // the output itself is valid; only the debug alias is given up
        if let Err(err) = compactor.emit_debug(self, path) {
            log!("warning"; "{}: debug stand-in not written ({})", path, err);
            if let Some(hashed) = self.processed_path(path).map(str::to_string) {
                self.hash_lookup.shift_remove(&hashed);
            }
        }
        Ok(())
    }

    /// Build everything under the configured roots and write the tables.
    pub fn execute(&mut self) -> Result<BuildReport, BuildError> {
        let extensions = self.compactors.extensions();
        let files = find_files(&self.settings.search_roots(), &extensions, &self.settings.cdn_dir());
        log!(
            "build";
            "{} resource(s) in {}",
            files.len(),
            self.settings.source_dir().display()
        );

        let mut report = BuildReport {
            discovered: files.len(),
            ..BuildReport::default()
        };

        let progress = ProgressLine::new(&[("files", files.len())]);
        for file in &files {
            if !self.is_processed(&file.path)
                && let Err(err) = self.resolve(&file.path, &file.source)
            {
                err.report();
                report.failed += 1;
            }
            progress.inc("files");
        }
        progress.finish();

        propagate_child_links(&self.dependencies, &mut self.child_links);

        report.mapped = self.write_hash_lookup()?;
        report.linked = self.write_child_links()?;
        Ok(report)
    }
}

impl std::fmt::Debug for BuildManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildManager")
            .field("settings", &self.settings)
            .field("compactors", &self.compactors)
            .field("hashed", &self.hash_lookup.len())
            .finish_non_exhaustive()
    }
}
