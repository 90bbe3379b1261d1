// src/report/style.rs

//! Terminal string decoration.
//!
//! Selected once at startup from terminal detection; everything downstream
//! just asks the styler to paint, so no other code branches on colour
//! support.

use std::io::{IsTerminal, stderr};

/// Paints status strings for the final report lines.
pub trait Styler: Send + Sync {
    fn ok(&self, text: &str) -> String;
    fn failed(&self, text: &str) -> String;
    fn emphasis(&self, text: &str) -> String;
}

/// ANSI colour codes for real terminals.
pub struct AnsiStyler;

impl Styler for AnsiStyler {
    fn ok(&self, text: &str) -> String {
        format!("\x1b[32m{text}\x1b[0m")
    }

    fn failed(&self, text: &str) -> String {
        format!("\x1b[31m{text}\x1b[0m")
    }

    fn emphasis(&self, text: &str) -> String {
        format!("\x1b[1m{text}\x1b[0m")
    }
}

/// Pass-through styler for pipes and dumb terminals.
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn ok(&self, text: &str) -> String {
        text.to_string()
    }

    fn failed(&self, text: &str) -> String {
        text.to_string()
    }

    fn emphasis(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Pick a styler for the status stream (stderr).
pub fn auto() -> &'static dyn Styler {
    if stderr().is_terminal() {
        &AnsiStyler
    } else {
        &PlainStyler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_styler_passes_text_through() {
        assert_eq!(PlainStyler.ok("fine"), "fine");
        assert_eq!(PlainStyler.failed("bad"), "bad");
        assert_eq!(PlainStyler.emphasis("loud"), "loud");
    }

    #[test]
    fn ansi_styler_wraps_and_resets() {
        let painted = AnsiStyler.failed("bad");
        assert!(painted.contains("bad"));
        assert!(painted.ends_with("\x1b[0m"));
    }
}
