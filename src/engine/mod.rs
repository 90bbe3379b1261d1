// src/engine/mod.rs

//! External literate-engine layer.
//!
//! Org parsing, tangling, and byte-compilation are all delegated to an
//! external engine (Emacs in batch mode) driven through subprocesses. This
//! module defines the [`LiterateEngine`] seam the orchestration runs
//! against, so the freshness logic and pipeline can be exercised without a
//! real engine installed:
//!
//! - [`wire`] parses the line-oriented `source:dest` records the engine's
//!   dry run emits on stdout.
//! - [`emacs`] is the subprocess adapter, spawning the engine with
//!   `tokio::process::Command` and streaming its output line-by-line.

pub mod emacs;
pub mod wire;

use std::path::{Path, PathBuf};

use crate::errors::RunError;
use crate::report::Reporter;
use crate::resolve::TangleTarget;

pub use emacs::EmacsEngine;

/// The external literate-programming engine.
///
/// All three operations are single-shot subprocess invocations; none are
/// retried, and any failure aborts the whole run.
pub trait LiterateEngine {
    /// Enumerate every file the engine would tangle `source` into, without
    /// writing any of them.
    fn list_targets(
        &self,
        source: &Path,
        log: &Reporter,
    ) -> impl Future<Output = Result<Vec<TangleTarget>, RunError>> + Send;

    /// Tangle `source`, writing all of its output files.
    fn tangle(
        &self,
        source: &Path,
        log: &Reporter,
    ) -> impl Future<Output = Result<(), RunError>> + Send;

    /// Byte-compile the given tangled outputs.
    fn compile(
        &self,
        files: &[PathBuf],
        log: &Reporter,
    ) -> impl Future<Output = Result<(), RunError>> + Send;
}
