//! Error types for the shared harmony model.

use thiserror::Error;

/// Common trait for Tonalis errors.
///
/// Every error type in the workspace implements this trait so that callers
/// (a CLI, a JSON exporter) can report failures uniformly:
/// - a stable error code for programmatic handling
/// - a human-readable message
/// - a category grouping related errors
///
/// # Example
///
/// ```
/// use tonalis_theory::error::TonalisError;
/// use tonalis_theory::Key;
///
/// let err = "H# major".parse::<Key>().unwrap_err();
/// assert_eq!(err.code(), "THEORY_001");
/// assert_eq!(err.category(), "theory");
/// ```
pub trait TonalisError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "THEORY_001" or "NOTATION_002". Codes are
    /// stable and safe to match on.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category ("theory", "notation", ...).
    fn category(&self) -> &'static str;
}

/// Errors raised while building model values from text or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    /// A key name such as "C major" or "f#m" could not be parsed.
    #[error("invalid key '{input}': {reason}")]
    InvalidKey { input: String, reason: String },

    /// A pitch-class or note name could not be parsed.
    #[error("invalid note name '{input}'")]
    InvalidNoteName { input: String },

    /// A four-part voicing description could not be parsed.
    #[error("invalid voicing '{input}': {reason}")]
    InvalidVoicing { input: String, reason: String },

    /// A configuration value is out of range or not finite.
    #[error("invalid option '{field}': {reason}")]
    InvalidOption { field: &'static str, reason: String },

    /// An unknown preset name was requested.
    #[error("unknown preset '{name}' (expected one of: default, strict_pac, pedagogical)")]
    UnknownPreset { name: String },
}

impl TonalisError for TheoryError {
    fn code(&self) -> &'static str {
        match self {
            TheoryError::InvalidKey { .. } => "THEORY_001",
            TheoryError::InvalidNoteName { .. } => "THEORY_002",
            TheoryError::InvalidVoicing { .. } => "THEORY_003",
            TheoryError::InvalidOption { .. } => "THEORY_004",
            TheoryError::UnknownPreset { .. } => "THEORY_005",
        }
    }

    fn category(&self) -> &'static str {
        "theory"
    }
}
