//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Progress and results go to stdout; warnings, errors and hints go to
//! stderr. Everything except errors and hints respects the quiet flag.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an informational note (respects quiet mode).
pub fn info(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("note: {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a remediation hint under an error (always shown).
///
/// Continuation lines are indented to line up with the first.
pub fn hint(message: impl Display) {
    eprintln!("{}", format_hint(&message.to_string()));
}

fn format_hint(message: &str) -> String {
    message
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("  hint: {}", line)
            } else {
                format!("        {}", line.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn hint_lines_align() {
        assert_eq!(
            format_hint("git remote add origin <URL>"),
            "  hint: git remote add origin <URL>"
        );
        assert_eq!(
            format_hint("brew install --cask docker\n        (Start Docker.app once.)"),
            "  hint: brew install --cask docker\n        (Start Docker.app once.)"
        );
    }
}
