//! Debug placeholders for merged resources.
//!
//! A merged file is hard to debug in the browser, so every multi-child merge
//! also gets a small stand-in under `<cdn-root>debug/` that loads each child
//! individually. The stand-in is chosen by the merged output's extension.
//!
//! Every child URL carries a `?<placeholder-stem>` suffix. The stem changes
//! whenever the merge content changes, so browsers refetch the children.

mod script;
mod style;

pub use script::ScriptPlaceholder;
pub use style::StylePlaceholder;

use crate::build::BuildManager;
use std::fs;
use std::io;
use std::path::Path;

/// Generator of debug stand-ins for one merged output type.
pub trait PlaceholderGenerator: Send + Sync {
    /// Dotted extension of the merged outputs this generator handles.
    fn target_extension(&self) -> &'static str;

    /// Render the stand-in body for already-resolved child URLs.
    fn render(&self, suffix: &str, children: &[&str]) -> String;

    /// Write the stand-in for `children` to `target`.
    ///
    /// Children are resolved through [`BuildManager::placeholder_path`], so
    /// nested merges are loaded through their own stand-ins.
    fn build(&self, manager: &BuildManager, target: &Path, children: &[String]) -> io::Result<()> {
        let suffix = nocache_suffix(target);
        let resolved: Vec<&str> = children
            .iter()
            .map(|child| manager.placeholder_path(child))
            .collect();
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, self.render(&suffix, &resolved))
    }
}

/// `?` followed by the file stem of `target`.
pub fn nocache_suffix(target: &Path) -> String {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    format!("?{stem}")
}
