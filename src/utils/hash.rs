//! Content hashing for cache-busting file names.
//!
//! Uses blake3: fast, deterministic, and wide enough that two different
//! inputs never share an output name in practice. Digests are rendered as
//! lowercase hex.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash::ContentDigest;
//!
//! let mut digest = ContentDigest::new();
//! digest.update_reader(File::open(path)?)?;
//! let name = digest.finalize_hex(); // 64 hex chars
//! ```

use std::io::{self, Read};

/// Streaming digest context used while naming one resource.
#[derive(Debug, Clone, Default)]
pub struct ContentDigest {
    hasher: blake3::Hasher,
}

impl ContentDigest {
    /// Create a fresh digest context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes.
    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Feed the UTF-8 bytes of a string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.hasher.update(value.as_bytes());
    }

    /// Feed everything a reader yields (streaming, for large files).
    pub fn update_reader(&mut self, mut reader: impl Read) -> io::Result<()> {
        let mut buffer = [0u8; 64 * 1024];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    self.hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Finish and render as lowercase hex.
    pub fn finalize_hex(&self) -> String {
        hex::encode(self.hasher.finalize().as_bytes())
    }
}

/// Digest an ordered sequence of strings over their concatenated UTF-8 bytes.
pub fn digest_strings<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut digest = ContentDigest::new();
    for value in values {
        digest.update_str(value.as_ref());
    }
    digest.finalize_hex()
}

/// Digest a byte slice.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut digest = ContentDigest::new();
    digest.update(bytes);
    digest.finalize_hex()
}
