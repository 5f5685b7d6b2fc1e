//! Candidate file discovery.

use crate::utils::path::{extension, logical_path, normalize_path};
use jwalk::WalkDir;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// A file found on disk together with its logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub source: PathBuf,
}

/// Collect files below `roots` whose extension is in `extensions`.
///
/// Everything under `exclude` (the hashed output directory) is skipped.
/// Files are sorted per root; a logical path found under an earlier root
/// is not reported again for a later one.
pub fn find_files(
    roots: &[&Path],
    extensions: &FxHashSet<String>,
    exclude: &Path,
) -> Vec<SourceFile> {
    let exclude = normalize_path(exclude);
    let mut seen = FxHashSet::default();
    let mut found = Vec::new();

    for root in roots {
        let root = normalize_path(root);
        let mut files: Vec<PathBuf> = WalkDir::new(&root)
            .skip_hidden(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_str().unwrap_or_default();
                !IGNORED_FILES.contains(&name)
            })
            .map(|e| e.path())
            .filter(|file| !file.starts_with(&exclude))
            .collect();
        files.sort();

        for source in files {
            let Some(path) = logical_path(&root, &source) else {
                continue;
            };
            if !extensions.contains(&extension(&path)) || !seen.insert(path.clone()) {
                continue;
            }
            found.push(SourceFile { path, source });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn extensions(list: &[&str]) -> FxHashSet<String> {
        list.iter().map(|ext| ext.to_string()).collect()
    }

    fn paths(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|file| file.path.as_str()).collect()
    }

    #[test]
    fn test_find_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("js/b.js"), "b").unwrap();
        fs::write(root.join("js/a.JS"), "a").unwrap();
        fs::write(root.join("css/site.css"), "c").unwrap();
        fs::write(root.join("index.html"), "<html>").unwrap();

        let files = find_files(&[root], &extensions(&[".js", ".css"]), &root.join("cdn"));
        assert_eq!(paths(&files), ["/css/site.css", "/js/a.JS", "/js/b.js"]);
        assert!(files[0].source.ends_with("css/site.css"));
    }

    #[test]
    fn test_find_files_skips_output_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("cdn/debug")).unwrap();
        fs::write(root.join("cdn/abc.js"), "x").unwrap();
        fs::write(root.join("cdn/debug/def.js"), "x").unwrap();
        fs::write(root.join("app.js"), "x").unwrap();

        let files = find_files(&[root], &extensions(&[".js"]), &root.join("cdn"));
        assert_eq!(paths(&files), ["/app.js"]);
    }

    #[test]
    fn test_find_files_first_root_wins() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(source.path().join("a.js"), "source").unwrap();
        fs::write(output.path().join("a.js"), "output").unwrap();
        fs::write(output.path().join("gen.js"), "generated").unwrap();

        let files = find_files(
            &[source.path(), output.path()],
            &extensions(&[".js"]),
            &output.path().join("cdn"),
        );
        assert_eq!(paths(&files), ["/a.js", "/gen.js"]);
        assert_eq!(fs::read_to_string(&files[0].source).unwrap(), "source");
    }
}
