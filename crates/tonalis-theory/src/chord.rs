//! Labeled chord results.

use serde::{Deserialize, Serialize};

use crate::pitch::PitchClassSet;
use crate::roman::{Figure, RomanNumeral, TonalFunction};

/// Result of labeling one chord against a key.
///
/// `success == false` is an expected outcome ("no match"), not an error:
/// callers must branch on it before reading the label fields. Warnings are
/// advisory and never block success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedChord {
    /// Whether a Roman-numeral interpretation was found.
    pub success: bool,
    /// Display label (e.g. "V65/V", "viiø7", "Ger65"); empty on failure.
    pub roman_text: String,
    /// Base numeral; absent for augmented sixths and failures.
    pub roman: Option<RomanNumeral>,
    /// Tonal function derived from the base numeral.
    pub function: TonalFunction,
    /// Inversion figure; absent for extensions, augmented sixths and failures.
    pub figure: Option<Figure>,
    /// Pitch classes that were analyzed.
    pub pitch_classes: PitchClassSet,
    /// Bass pitch class used for figuring, when known.
    pub bass_pc: Option<u8>,
    /// Advisory messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Reasons the chord could not be labeled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AnalyzedChord {
    /// A successful label.
    pub fn labeled(
        roman_text: impl Into<String>,
        roman: Option<RomanNumeral>,
        figure: Option<Figure>,
        pitch_classes: PitchClassSet,
        bass_pc: Option<u8>,
    ) -> Self {
        Self {
            success: true,
            roman_text: roman_text.into(),
            roman,
            function: TonalFunction::of(roman),
            figure,
            pitch_classes,
            bass_pc,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A "no match" result carrying one explanatory error.
    pub fn unmatched(
        pitch_classes: PitchClassSet,
        bass_pc: Option<u8>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            roman_text: String::new(),
            roman: None,
            function: TonalFunction::Unknown,
            figure: None,
            pitch_classes,
            bass_pc,
            warnings: Vec::new(),
            errors: vec![error.into()],
        }
    }

    /// Whether the label is a secondary function (`x/y`).
    pub fn is_secondary(&self) -> bool {
        self.roman_text.contains('/')
    }

    /// Whether the label is a borrowed (flat-prefixed) chord.
    pub fn is_flat_degree(&self) -> bool {
        self.roman_text.starts_with('b')
    }

    /// Whether the chord is a second-inversion triad (a six-four chord).
    pub fn is_six_four(&self) -> bool {
        self.success && self.figure == Some(Figure::SixFour)
    }

    /// A copy with a different label, numeral and derived function.
    ///
    /// Used when a sequence-level rule reinterprets a chord (for example the
    /// cadential six-four written as a dominant).
    pub fn with_label(&self, roman_text: impl Into<String>, roman: Option<RomanNumeral>) -> Self {
        Self {
            roman_text: roman_text.into(),
            roman,
            function: TonalFunction::of(roman),
            ..self.clone()
        }
    }
}
