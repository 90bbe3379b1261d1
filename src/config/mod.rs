// src/config/mod.rs

//! Configuration handling.
//!
//! Everything in `Orgtangle.toml` is optional; a missing file yields the
//! built-in defaults, so most users never write one.

pub mod loader;
pub mod model;

pub use loader::load_or_default;
pub use model::{ConfigFile, EngineSection, ReportSection};
