//! Build settings: path layout and resource options.
//!
//! Settings come from three layers, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config merge.toml`, `[build]` table)
//! 3. command-line flags
//!
//! ```toml
//! [build]
//! source = "src/main/webapp"
//! output = "target/webapp"
//! map_file = "target/classes/cdn.properties"
//! cdn_root = "/cdn/"
//! extensions = ".png|.jpg|.gif|.ico"
//! minify = true
//! ```
//!
//! Relative paths in the file are relative to the file's own directory.

mod error;

pub use error::ConfigError;

use crate::cli::Cli;
use crate::log;
use crate::utils::path::{normalize_path, resolve_path};
use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default URL root of hashed output files.
pub const DEFAULT_CDN_ROOT: &str = "/cdn/";
/// Default map file name (placed in the output directory).
pub const DEFAULT_MAP_FILE: &str = "cdn.properties";
/// Default child-link table name (placed next to the map file).
pub const DEFAULT_LINKS_FILE: &str = "cdn-links.properties";

/// Separators accepted in an extension list string.
static EXTENSION_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|,\s]+").unwrap());

// ============================================================================
// Settings
// ============================================================================

/// Path configuration for one build run.
#[derive(Debug, Clone)]
pub struct Settings {
    source_dir: PathBuf,
    target_dir: Option<PathBuf>,
    map_file: Option<PathBuf>,
    links_file: Option<PathBuf>,
    cdn_root: String,
    extensions: Vec<String>,
    minify: bool,
}

impl Settings {
    /// Create settings for a webapp source directory with all defaults.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: None,
            map_file: None,
            links_file: None,
            cdn_root: DEFAULT_CDN_ROOT.to_string(),
            extensions: Vec::new(),
            minify: true,
        }
    }

    /// Set the output directory (defaults to the source directory).
    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    /// Set the map file path (defaults to `<output>/cdn.properties`).
    pub fn with_map_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.map_file = Some(file.into());
        self
    }

    /// Set the child-link table path (defaults to a sibling of the map file).
    pub fn with_links_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.links_file = Some(file.into());
        self
    }

    /// Set the URL root of hashed files. Empty resets to `/cdn/`.
    pub fn with_cdn_root(mut self, root: &str) -> Self {
        self.cdn_root = normalize_cdn_root(root);
        self
    }

    /// Set the extra extensions copied verbatim (e.g. images, fonts).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// Enable or disable script and stylesheet minification.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    // ========================================================================
    // accessors
    // ========================================================================

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn target_dir(&self) -> &Path {
        self.target_dir.as_deref().unwrap_or(&self.source_dir)
    }

    pub fn map_file(&self) -> PathBuf {
        self.map_file
            .clone()
            .unwrap_or_else(|| self.target_dir().join(DEFAULT_MAP_FILE))
    }

    pub fn links_file(&self) -> PathBuf {
        if let Some(file) = &self.links_file {
            return file.clone();
        }
        let map_file = self.map_file();
        map_file
            .parent()
            .map_or_else(|| PathBuf::from(DEFAULT_LINKS_FILE), |dir| dir.join(DEFAULT_LINKS_FILE))
    }

    pub fn cdn_root(&self) -> &str {
        &self.cdn_root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub const fn minify(&self) -> bool {
        self.minify
    }

    /// Directory holding hashed output files (excluded from discovery).
    pub fn cdn_dir(&self) -> PathBuf {
        self.target_dir().join(self.cdn_root.trim_matches('/'))
    }

    /// Output file for a hashed (or debug) path.
    pub fn target_file(&self, hashed_path: &str) -> PathBuf {
        self.target_dir().join(hashed_path.trim_start_matches('/'))
    }

    /// Locate the source file of a logical path.
    ///
    /// Output directory first, then source directory. `None` if neither exists.
    pub fn find_source_file(&self, path: &str) -> Option<PathBuf> {
        let rel = path.trim_start_matches('/');
        if rel.is_empty() {
            return None;
        }
        [self.target_dir(), self.source_dir()]
            .into_iter()
            .map(|dir| dir.join(rel))
            .find(|file| file.is_file())
    }

    /// Roots scanned for candidate files, in [`Settings::find_source_file`]
    /// order and without duplicates.
    pub fn search_roots(&self) -> Vec<&Path> {
        let mut roots = Vec::with_capacity(2);
        if self.target_dir() != self.source_dir() && self.target_dir().is_dir() {
            roots.push(self.target_dir());
        }
        roots.push(self.source_dir());
        roots
    }

    /// Check the settings before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingSource);
        }
        if !self.source_dir.is_dir() {
            return Err(ConfigError::SourceNotFound(self.source_dir.clone()));
        }
        if self.cdn_root.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(format!(
                "cdn root `{}` must name a subdirectory",
                self.cdn_root
            )));
        }
        Ok(())
    }

    // ========================================================================
    // loading
    // ========================================================================

    /// Build settings from the command line and an optional config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(FileConfig::from_path(path)?),
            None => None,
        };
        let file_section = file.as_ref().map(|f| &f.build);
        let base_dir = cli
            .config
            .as_deref()
            .and_then(Path::parent)
            .map(normalize_path)
            .unwrap_or_else(|| normalize_path(Path::new(".")));

        let from_file = |value: Option<&PathBuf>| value.map(|p| resolve_path(p, &base_dir));
        let from_cli = |value: Option<&PathBuf>| value.map(|p| normalize_path(p));

        let source = from_cli(cli.source.as_ref())
            .or_else(|| from_file(file_section.and_then(|b| b.source.as_ref())))
            .ok_or(ConfigError::MissingSource)?;

        let mut settings = Self::new(source);

        if let Some(dir) = from_cli(cli.output.as_ref())
            .or_else(|| from_file(file_section.and_then(|b| b.output.as_ref())))
        {
            settings = settings.with_target_dir(dir);
        }
        if let Some(file) = from_cli(cli.map_file.as_ref())
            .or_else(|| from_file(file_section.and_then(|b| b.map_file.as_ref())))
        {
            settings = settings.with_map_file(file);
        }
        if let Some(file) = from_cli(cli.links_file.as_ref())
            .or_else(|| from_file(file_section.and_then(|b| b.links_file.as_ref())))
        {
            settings = settings.with_links_file(file);
        }
        if let Some(root) = cli
            .cdn_root
            .as_deref()
            .or_else(|| file_section.and_then(|b| b.cdn_root.as_deref()))
        {
            settings = settings.with_cdn_root(root);
        }

        let extensions = match (&cli.extensions, file_section.and_then(|b| b.extensions.as_ref())) {
            (Some(list), _) => parse_extension_list(list),
            (None, Some(list)) => list.to_vec(),
            (None, None) => Vec::new(),
        };
        settings = settings.with_extensions(extensions);

        let minify = !cli.no_minify && file_section.and_then(|b| b.minify).unwrap_or(true);
        settings = settings.with_minify(minify);

        settings.validate()?;
        Ok(settings)
    }
}

// ============================================================================
// config file
// ============================================================================

/// Root of the optional TOML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    build: BuildSection,
}

/// `[build]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BuildSection {
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    map_file: Option<PathBuf>,
    links_file: Option<PathBuf>,
    cdn_root: Option<String>,
    extensions: Option<ExtensionList>,
    minify: Option<bool>,
}

/// Extensions as either a joined string (`".png|.jpg"`) or an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtensionList {
    Joined(String),
    List(Vec<String>),
}

impl ExtensionList {
    fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Joined(joined) => parse_extension_list(joined),
            Self::List(list) => list.clone(),
        }
    }
}

impl FileConfig {
    /// Load from a file, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {}, ignoring: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }
}

// ============================================================================
// normalization helpers
// ============================================================================

/// Normalize a URL root to `/segment/` form.
pub fn normalize_cdn_root(root: &str) -> String {
    let root = root.trim().replace('\\', "/");
    if root.is_empty() {
        return DEFAULT_CDN_ROOT.to_string();
    }
    let mut normalized = String::with_capacity(root.len() + 2);
    if !root.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(&root);
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Normalize an extension to lowercase dotted form (`PNG` -> `.png`).
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{ext}"))
    }
}

/// Split an extension list on `|`, `,` or whitespace.
pub fn parse_extension_list(list: &str) -> Vec<String> {
    EXTENSION_SEPARATORS
        .split(list)
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_cdn_root() {
        assert_eq!(normalize_cdn_root(""), "/cdn/");
        assert_eq!(normalize_cdn_root("static"), "/static/");
        assert_eq!(normalize_cdn_root("/assets"), "/assets/");
        assert_eq!(normalize_cdn_root("a\\b\\"), "/a/b/");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("PNG").as_deref(), Some(".png"));
        assert_eq!(normalize_extension(".woff2").as_deref(), Some(".woff2"));
        assert_eq!(normalize_extension("  "), None);
        assert_eq!(normalize_extension("."), None);
    }

    #[test]
    fn test_parse_extension_list() {
        assert_eq!(
            parse_extension_list(".png|.jpg, .gif\t.ico"),
            vec![".png", ".jpg", ".gif", ".ico"]
        );
        assert!(parse_extension_list("").is_empty());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new("/webapp");
        assert_eq!(settings.target_dir(), Path::new("/webapp"));
        assert_eq!(settings.map_file(), PathBuf::from("/webapp/cdn.properties"));
        assert_eq!(settings.links_file(), PathBuf::from("/webapp/cdn-links.properties"));
        assert_eq!(settings.cdn_root(), "/cdn/");
        assert_eq!(settings.cdn_dir(), PathBuf::from("/webapp/cdn"));
        assert!(settings.minify());
    }

    #[test]
    fn test_settings_target_file() {
        let settings = Settings::new("/webapp").with_target_dir("/out");
        assert_eq!(
            settings.target_file("/cdn/abc.js"),
            PathBuf::from("/out/cdn/abc.js")
        );
        assert_eq!(
            settings.target_file("/cdn/debug/abc.js"),
            PathBuf::from("/out/cdn/debug/abc.js")
        );
    }

    #[test]
    fn test_find_source_file_prefers_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        let output = dir.path().join("out");
        fs::create_dir_all(source.join("js")).unwrap();
        fs::create_dir_all(output.join("js")).unwrap();
        fs::write(source.join("js/a.js"), "a").unwrap();
        fs::write(source.join("js/b.js"), "b").unwrap();
        fs::write(output.join("js/b.js"), "generated b").unwrap();

        let settings = Settings::new(&source).with_target_dir(&output);
        assert_eq!(settings.find_source_file("/js/a.js"), Some(source.join("js/a.js")));
        assert_eq!(settings.find_source_file("/js/b.js"), Some(output.join("js/b.js")));
        assert_eq!(settings.find_source_file("/js/c.js"), None);
        assert_eq!(settings.find_source_file("/"), None);
    }

    #[test]
    fn test_validate_missing_source() {
        let settings = Settings::new("/definitely/not/here");
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_root_cdn() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path()).with_cdn_root("/");
        assert!(matches!(settings.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_parse_config_file_with_unknown_field() {
        let content = r#"
            [build]
            source = "webapp"
            extensions = ".png|.gif"
            minify = false
            colour = "blue"
        "#;
        let (config, ignored) = FileConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.build.source, Some(PathBuf::from("webapp")));
        assert_eq!(
            config.build.extensions.map(|e| e.to_vec()),
            Some(vec![".png".to_string(), ".gif".to_string()])
        );
        assert_eq!(config.build.minify, Some(false));
        assert_eq!(ignored, vec!["build.colour".to_string()]);
    }

    #[test]
    fn test_parse_config_extension_array() {
        let content = "[build]\nextensions = [\"png\", \".ICO\"]\n";
        let (config, _) = FileConfig::parse_with_ignored(content).unwrap();
        let settings = Settings::new("/webapp")
            .with_extensions(config.build.extensions.map(|e| e.to_vec()).unwrap_or_default());
        assert_eq!(settings.extensions(), [".png", ".ico"]);
    }
}
