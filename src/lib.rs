//! Merge - content-addressed web resource builder.
//!
//! Walks a webapp directory, names every script, stylesheet and configured
//! asset after a digest of its content, and writes a map from original
//! paths to hashed paths. `.merge` manifests concatenate several resources
//! into one output and get a debug stand-in that loads them one by one.

pub mod build;
pub mod cli;
pub mod compactor;
pub mod config;
pub mod discover;
pub mod link;
pub mod logger;
pub mod placeholder;
pub mod properties;
pub mod utils;

pub use build::{BuildError, BuildManager, BuildReport, ResolveError};
pub use config::{ConfigError, Settings};
