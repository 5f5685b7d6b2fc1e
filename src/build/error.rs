//! Build error types.

use crate::config::ConfigError;
use crate::log;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why one resource could not be resolved.
///
/// Never fatal: the resource is left out of the map and the build goes on.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference: {chain}")]
    Cycle { chain: String },

    #[error("no compactor for `{path}`")]
    NoCompactor { path: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{path}: no output produced")]
    NoOutput { path: String },

    #[error("{path}: source is empty, skipped")]
    Empty { path: String },
}

impl ResolveError {
    pub fn io(path: &str, source: io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Log at the matching severity.
    pub fn report(&self) {
        match self {
            Self::Empty { .. } => log!("warning"; "{}", self),
            _ => log!("error"; "{}", self),
        }
    }
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write `{path}`")]
    WriteTable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
