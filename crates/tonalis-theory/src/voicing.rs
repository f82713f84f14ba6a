//! Four-part (SATB) voicings.

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::pitch::{midi_to_note_name, parse_note_name, PitchClassSet};

/// Four absolute pitches (MIDI note numbers) for soprano, alto, tenor, bass.
///
/// The conventional ordering S ≥ A ≥ T ≥ B is not enforced; use
/// [`FourPartVoicing::is_ordered`] to check it. Harmony analysis only reads
/// the bass and soprano pitch classes; the voice-leading predicates read all
/// four voices.
///
/// ```
/// use tonalis_theory::FourPartVoicing;
///
/// let v = FourPartVoicing::parse("E5 C5 G4 C3").unwrap();
/// assert_eq!(v.bass_pc(), 0);
/// assert_eq!(v.soprano_pc(), 4);
/// assert!(v.is_ordered());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FourPartVoicing {
    pub soprano: u8,
    pub alto: u8,
    pub tenor: u8,
    pub bass: u8,
}

impl FourPartVoicing {
    /// Create a voicing from MIDI note numbers.
    pub fn new(soprano: u8, alto: u8, tenor: u8, bass: u8) -> Self {
        Self {
            soprano,
            alto,
            tenor,
            bass,
        }
    }

    /// Parse four note names in S A T B order, separated by whitespace or commas.
    pub fn parse(text: &str) -> Result<Self, TheoryError> {
        let names: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();
        if names.len() != 4 {
            return Err(TheoryError::InvalidVoicing {
                input: text.to_string(),
                reason: format!("expected 4 notes (S A T B), found {}", names.len()),
            });
        }

        let mut midi = [0u8; 4];
        for (slot, name) in midi.iter_mut().zip(&names) {
            *slot = parse_note_name(name).map_err(|_| TheoryError::InvalidVoicing {
                input: text.to_string(),
                reason: format!("invalid note '{}'", name),
            })?;
        }
        Ok(Self::new(midi[0], midi[1], midi[2], midi[3]))
    }

    /// Voices from top to bottom: `[soprano, alto, tenor, bass]`.
    pub fn voices(&self) -> [u8; 4] {
        [self.soprano, self.alto, self.tenor, self.bass]
    }

    /// Bass pitch class.
    pub fn bass_pc(&self) -> u8 {
        self.bass % 12
    }

    /// Soprano pitch class.
    pub fn soprano_pc(&self) -> u8 {
        self.soprano % 12
    }

    /// Pitch classes sounding in the voicing.
    pub fn pitch_classes(&self) -> PitchClassSet {
        PitchClassSet::from_midi(&self.voices())
    }

    /// Whether S ≥ A ≥ T ≥ B holds.
    pub fn is_ordered(&self) -> bool {
        self.soprano >= self.alto && self.alto >= self.tenor && self.tenor >= self.bass
    }
}

impl std::fmt::Display for FourPartVoicing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            midi_to_note_name(self.soprano),
            midi_to_note_name(self.alto),
            midi_to_note_name(self.tenor),
            midi_to_note_name(self.bass)
        )
    }
}

impl std::str::FromStr for FourPartVoicing {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_commas() {
        let v = FourPartVoicing::parse("G5, D5, B4, G2").unwrap();
        assert_eq!(v, FourPartVoicing::new(79, 74, 71, 43));
        assert_eq!(v.to_string(), "G5 D5 B4 G2");
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        let err = FourPartVoicing::parse("C5 G4 C3").unwrap_err();
        assert!(err.to_string().contains("expected 4 notes"));
    }

    #[test]
    fn test_parse_rejects_bad_note() {
        assert!(FourPartVoicing::parse("C5 G4 E4 Q3").is_err());
    }

    #[test]
    fn test_pitch_classes_and_order() {
        let v = FourPartVoicing::new(60, 64, 67, 48);
        assert!(!v.is_ordered());
        assert_eq!(v.pitch_classes(), PitchClassSet::from_pcs([0, 4, 7]));
    }
}
