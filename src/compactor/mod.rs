//! Compactors: per-extension hashing and output strategies.
//!
//! A compactor decides three things for the resources it handles:
//!
//! | Step               | Purpose                                         |
//! |--------------------|-------------------------------------------------|
//! | `target_extension` | extension of the hashed output name             |
//! | `calc_hash`        | bytes that identify the output's content        |
//! | `compact`          | write the output file                           |
//!
//! Compactors receive the [`BuildManager`] mutably so they can resolve the
//! resources they reference (stylesheet `url(...)`s, manifest entries)
//! before their own hash is known.
//!
//! # Built-ins
//!
//! | Extension          | Compactor          |
//! |--------------------|--------------------|
//! | `.merge`           | [`MergeCompactor`] |
//! | `.css`             | [`CssCompactor`]   |
//! | `.js`              | [`JsCompactor`]    |
//! | configured extras  | [`CopyCompactor`]  |

mod copy;
mod css;
mod js;
mod merge;

pub use copy::{CopyCompactor, copy_file, hash_file};
pub use css::CssCompactor;
pub use js::JsCompactor;
pub use merge::{MergeCompactor, debug_path};

use crate::build::BuildManager;
use crate::config::Settings;
use crate::placeholder::{ScriptPlaceholder, StylePlaceholder};
use crate::utils::hash::ContentDigest;
use rustc_hash::{FxHashMap, FxHashSet};
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Hashing and output strategy for one family of source extensions.
pub trait Compactor: Send + Sync {
    /// Lowercase, dotted source extensions this compactor handles.
    fn source_extensions(&self) -> Vec<String>;

    /// Extension (with dot, possibly empty) of the hashed output path.
    ///
    /// Called after [`Compactor::calc_hash`], so anything recorded while
    /// hashing is visible here.
    fn target_extension(&self, manager: &BuildManager, path: &str) -> String;

    /// Feed everything that determines the output bytes into `digest`.
    fn calc_hash(
        &self,
        manager: &mut BuildManager,
        digest: &mut ContentDigest,
        path: &str,
        source: &Path,
    ) -> io::Result<()>;

    /// Write the output for `path` to `target`.
    ///
    /// Only called when `target` does not exist yet.
    fn compact(
        &self,
        manager: &mut BuildManager,
        path: &str,
        source: &Path,
        target: &Path,
    ) -> io::Result<()>;

    /// Produce any debug companions once `path` is hashed and its output is
    /// in place. Runs on every build, even when compaction was skipped.
    fn emit_debug(&self, _manager: &mut BuildManager, _path: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Extension -> compactor lookup.
///
/// Registration order matters: a later registration for the same extension
/// replaces the earlier one.
#[derive(Default, Clone)]
pub struct CompactorRegistry {
    by_extension: FxHashMap<String, Arc<dyn Compactor>>,
}

impl CompactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in compactors for `settings`.
    ///
    /// Pass-through extras go in first so the built-ins keep `.merge`,
    /// `.css` and `.js` even when those are also listed as extras.
    pub fn standard(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CopyCompactor::new(settings.extensions().to_vec())));
        registry.register(Arc::new(MergeCompactor::new(vec![
            Box::new(ScriptPlaceholder),
            Box::new(StylePlaceholder),
        ])));
        registry.register(Arc::new(CssCompactor::new(settings.minify())));
        registry.register(Arc::new(JsCompactor::new(settings.minify())));
        registry
    }

    /// Register `compactor` for each of its source extensions.
    pub fn register(&mut self, compactor: Arc<dyn Compactor>) {
        for ext in compactor.source_extensions() {
            self.by_extension.insert(ext, Arc::clone(&compactor));
        }
    }

    /// Compactor for a dotted, lowercase extension.
    pub fn get(&self, extension: &str) -> Option<Arc<dyn Compactor>> {
        self.by_extension.get(extension).cloned()
    }

    /// Every registered extension.
    pub fn extensions(&self) -> FxHashSet<String> {
        self.by_extension.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl std::fmt::Debug for CompactorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<_> = self.by_extension.keys().collect();
        extensions.sort();
        f.debug_struct("CompactorRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_extensions() {
        let settings = Settings::new("/webapp").with_extensions([".png", ".gif"]);
        let registry = CompactorRegistry::standard(&settings);
        let mut extensions: Vec<_> = registry.extensions().into_iter().collect();
        extensions.sort();
        assert_eq!(extensions, [".css", ".gif", ".js", ".merge", ".png"]);
    }

    #[test]
    fn test_builtins_win_over_extras() {
        let settings = Settings::new("/webapp").with_extensions([".css", ".png"]);
        let registry = CompactorRegistry::standard(&settings);
        let css = registry.get(".css").unwrap();
        let png = registry.get(".png").unwrap();
        assert_eq!(css.source_extensions(), [".css"]);
        assert_eq!(png.source_extensions(), [".css", ".png"]);
    }

    #[test]
    fn test_unknown_extension() {
        let registry = CompactorRegistry::standard(&Settings::new("/webapp"));
        assert!(registry.get(".txt").is_none());
        assert!(!registry.is_empty());
    }
}
