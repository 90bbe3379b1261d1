// src/errors.rs

//! Crate-wide error types.
//!
//! Every failure in an `orgtangle` run is fatal: nothing is retried, and the
//! binary exits 1 on the first error. The variants here exist so the caller
//! can report *which* phase failed, not to enable recovery.

use std::path::PathBuf;

pub use anyhow::{Context, Error, Result};

/// Fatal failures of a single `orgtangle` invocation.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The primary literate source file does not exist.
    #[error("source file {0:?} does not exist")]
    MissingSource(PathBuf),

    /// The external engine could not enumerate tangle targets.
    #[error("target discovery failed for {file:?}: {detail}")]
    Discovery { file: PathBuf, detail: String },

    /// The external engine failed to tangle a source file.
    #[error("tangling {0:?} failed")]
    Tangle(PathBuf),

    /// The external engine failed to byte-compile the stale outputs.
    #[error("byte-compilation failed: {0}")]
    Compile(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
