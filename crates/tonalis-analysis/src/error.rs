//! Error types for notation parsing.

use thiserror::Error;

use tonalis_theory::TonalisError;

/// Errors that can occur while parsing a Roman-numeral progression.
///
/// Parsing is fail-fast: the first malformed token aborts the whole
/// progression and no partial result is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("progression contains no chords")]
    EmptyProgression,
    #[error("invalid chord token '{token}' (#{index}) at '{offending}': {reason}")]
    InvalidToken {
        /// Position of the token in the progression (0-based, empty tokens skipped).
        index: usize,
        /// The normalized token text.
        token: String,
        /// The substring that could not be parsed.
        offending: String,
        reason: String,
    },
}

impl NotationError {
    /// The offending substring, if the error points at one.
    pub fn offending(&self) -> Option<&str> {
        match self {
            NotationError::EmptyProgression => None,
            NotationError::InvalidToken { offending, .. } => Some(offending),
        }
    }
}

impl TonalisError for NotationError {
    fn code(&self) -> &'static str {
        match self {
            NotationError::EmptyProgression => "NOTATION_001",
            NotationError::InvalidToken { .. } => "NOTATION_002",
        }
    }

    fn category(&self) -> &'static str {
        "notation"
    }
}
