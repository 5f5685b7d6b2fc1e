//! Utility modules shared by the build engine.

pub mod hash;
pub mod path;
