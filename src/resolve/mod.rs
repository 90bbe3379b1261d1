// src/resolve/mod.rs

//! Freshness resolution.
//!
//! Given the (source, destination) pairs discovered by the engine's dry run
//! plus any `--dependency` files, this module computes the minimal set of
//! files to re-tangle and the minimal set of tangled outputs to byte-compile.
//! The resolver is pure over filesystem mtimes and never invokes the engine,
//! which keeps it unit-testable against synthetic target lists.

pub mod freshness;

pub use freshness::{
    FreshnessSet, TangleTarget, default_output, dependency_forced, resolve, resolve_targets,
};
