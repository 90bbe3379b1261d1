// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::model::ConfigFile;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "Orgtangle.toml";

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; defaults are applied by the
/// `serde` + `Default` impls on [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {path:?}"))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {path:?}"))?;

    Ok(config)
}

/// Load `Orgtangle.toml` from the working directory if it exists, falling
/// back to built-in defaults otherwise.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_or_default() -> Result<ConfigFile> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        debug!(config = %path.display(), "loading configuration file");
        load_from_path(path)
    } else {
        debug!("no configuration file found; using defaults");
        Ok(ConfigFile::default())
    }
}
