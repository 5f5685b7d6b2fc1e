//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`, `logical_path`)
//! - [`url`]: Logical path helpers (`extension`, `file_name`, `resolve_link`, `split_suffix`)

pub mod fs;
pub mod url;

pub use fs::{logical_path, normalize_path, resolve_path};
pub use url::{extension, file_name, is_external_link, resolve_link, split_suffix};
