// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for `orgtangle`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "orgtangle",
    version,
    about = "Tangle org-mode literate configuration files and rebuild stale outputs.",
    long_about = None
)]
pub struct CliArgs {
    /// Literate source file to tangle.
    #[arg(short, long, value_name = "FILE", default_value = "init.org")]
    pub file: PathBuf,

    /// Write the log to this file instead of stderr ("-" for stdout).
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<String>,

    /// Extra file whose mtime forces a full re-tangle of the source when it
    /// is newer than the default tangled output. May be given multiple times.
    #[arg(short, long = "dependency", value_name = "FILE")]
    pub dependency: Vec<PathBuf>,

    /// Animate a progress indicator on the terminal.
    #[arg(short, long)]
    pub interactive: bool,

    /// Byte-compile stale tangled outputs after tangling.
    #[arg(short, long)]
    pub compile: bool,

    /// Change to this directory before doing anything else.
    #[arg(long, value_name = "DIR")]
    pub cd: Option<PathBuf>,

    /// Forward the external engine's output to the log.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
