// src/engine/wire.rs

//! Wire format between the engine's dry run and the freshness resolver.
//!
//! The dry run prints one record per discovered tangle block on stdout:
//!
//! ```text
//! init.org:/home/user/.config/emacs/init.el
//! init.org:bin/sync-mail.py
//! ```
//!
//! Records are split at the first `:`; the source path is the file we handed
//! to the engine and never contains one. Diagnostics go to stderr and never
//! reach this parser.

use crate::resolve::TangleTarget;

/// Parse a single `source:dest` record.
///
/// Returns `None` for blank lines and for lines without a separator, so the
/// caller can log and skip any stray noise.
pub fn parse_target_line(line: &str) -> Option<TangleTarget> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (source, dest) = line.split_once(':')?;
    if source.is_empty() || dest.is_empty() {
        return None;
    }

    Some(TangleTarget::new(source, dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_simple_record() {
        let target = parse_target_line("init.org:init.el").unwrap();
        assert_eq!(target.source, Path::new("init.org"));
        assert_eq!(target.dest, Path::new("init.el"));
    }

    #[test]
    fn splits_at_first_separator_only() {
        let target = parse_target_line("init.org:bin/odd:name.sh").unwrap();
        assert_eq!(target.source, Path::new("init.org"));
        assert_eq!(target.dest, Path::new("bin/odd:name.sh"));
    }

    #[test]
    fn rejects_blank_and_malformed_lines() {
        assert_eq!(parse_target_line(""), None);
        assert_eq!(parse_target_line("   "), None);
        assert_eq!(parse_target_line("no separator here"), None);
        assert_eq!(parse_target_line(":dest-only"), None);
        assert_eq!(parse_target_line("source-only:"), None);
    }
}
