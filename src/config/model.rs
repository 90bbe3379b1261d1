// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from `Orgtangle.toml`.
///
/// ```toml
/// [engine]
/// program = "emacs"
/// load = ["~/.emacs.d/early-init.el"]
/// tangle_extension = "el"
///
/// [report]
/// tick_ms = 100
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// External literate-engine settings from `[engine]`.
    #[serde(default)]
    pub engine: EngineSection,

    /// Progress-indicator settings from `[report]`.
    #[serde(default)]
    pub report: ReportSection,
}

/// `[engine]` section.
///
/// Controls how the external tangle/compile engine is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Program to invoke; must understand batch-mode evaluation.
    #[serde(default = "default_program")]
    pub program: String,

    /// Extra files passed as `--load` before evaluation, in order.
    #[serde(default)]
    pub load: Vec<String>,

    /// Extension of the engine's default tangled output. The primary source
    /// with its extension replaced by this value is the "default output"
    /// compared against `--dependency` files.
    #[serde(default = "default_tangle_extension")]
    pub tangle_extension: String,
}

fn default_program() -> String {
    "emacs".to_string()
}

fn default_tangle_extension() -> String {
    "el".to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            load: Vec::new(),
            tangle_extension: default_tangle_extension(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    /// Spinner redraw interval in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    100
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}
