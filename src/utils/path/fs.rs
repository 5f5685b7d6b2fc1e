//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths with fallback directory
//! - `logical_path` - root-relative, forward-slash resource paths

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a path that may be relative to a base directory.
///
/// Always returns an absolute path. Used for paths read from a config file,
/// which are relative to the directory holding that file.
#[inline]
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    normalize_path(&base_dir.join(path))
}

/// Compute the logical resource path of `file` under `root`.
///
/// The result starts with `/` and uses forward slashes regardless of
/// platform: `<root>/css/site.css` becomes `/css/site.css`.
/// Returns `None` if `file` is not inside `root`.
pub fn logical_path(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let mut logical = String::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                logical.push('/');
                logical.push_str(&part.to_string_lossy());
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    if logical.is_empty() {
        return None;
    }
    Some(logical)
}
