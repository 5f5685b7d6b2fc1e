//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// All of these are fatal and raised before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("missing source directory (pass <SOURCE> or set `build.source`)")]
    MissingSource,

    #[error("source directory `{0}` does not exist")]
    SourceNotFound(PathBuf),

    #[error("Config validation error: {0}")]
    Validation(String),
}
