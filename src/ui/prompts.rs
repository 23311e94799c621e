//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts read one line from any [`BufRead`] and write to any [`Write`],
//! so workflows can be driven from tests with in-memory buffers. End of
//! input is a cancellation, not an empty answer.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled (end of input)")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Ask for one line of text.
///
/// The answer is trimmed. An empty answer yields `default` when one is
/// given, otherwise the empty string.
pub fn input<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
    default: Option<&str>,
) -> Result<String, PromptError> {
    match default {
        Some(default) => write!(writer, "{message} [{default}]: ")?,
        None => write!(writer, "{message}: ")?,
    }
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(PromptError::Cancelled);
    }

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_trimmed_answer() {
        let mut reader = Cursor::new("  2 \n");
        let mut out = Vec::new();
        let answer = input(&mut reader, &mut out, "Enter 1-4", None).unwrap();
        assert_eq!(answer, "2");
        assert_eq!(String::from_utf8(out).unwrap(), "Enter 1-4: ");
    }

    #[test]
    fn empty_answer_uses_default() {
        let mut reader = Cursor::new("\n");
        let mut out = Vec::new();
        let answer = input(&mut reader, &mut out, "Branch", Some("feature")).unwrap();
        assert_eq!(answer, "feature");
        assert_eq!(String::from_utf8(out).unwrap(), "Branch [feature]: ");
    }

    #[test]
    fn end_of_input_is_cancelled() {
        let mut reader = Cursor::new("");
        let mut out = Vec::new();
        assert!(matches!(
            input(&mut reader, &mut out, "Branch", None),
            Err(PromptError::Cancelled)
        ));
    }
}
