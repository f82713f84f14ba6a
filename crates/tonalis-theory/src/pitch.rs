//! Pitch classes, pitch-class sets and note-name parsing.

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;

/// Semitone offsets for natural note letters (C=0, D=2, E=4, F=5, G=7, A=9, B=11).
const SEMITONE_MAP: [(char, i32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

const NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Reduce any integer to a pitch class in `0..=11`.
///
/// ```
/// use tonalis_theory::pitch::pc;
///
/// assert_eq!(pc(-1), 11);
/// assert_eq!(pc(19), 7);
/// ```
pub fn pc(value: i32) -> u8 {
    value.rem_euclid(12) as u8
}

/// Name of a pitch class, spelled with sharps or flats.
pub fn pitch_class_name(pitch_class: u8, prefer_flats: bool) -> &'static str {
    let idx = (pitch_class % 12) as usize;
    if prefer_flats {
        NAMES_FLAT[idx]
    } else {
        NAMES_SHARP[idx]
    }
}

/// Parse a pitch-class name ("C", "F#", "Bb", "e♭") into `0..=11`.
pub fn parse_pitch_class(name: &str) -> Result<u8, TheoryError> {
    let trimmed = name.trim();
    let (letter, rest) = split_letter(trimmed).ok_or_else(|| TheoryError::InvalidNoteName {
        input: trimmed.to_string(),
    })?;
    let accidental = parse_accidentals(rest).ok_or_else(|| TheoryError::InvalidNoteName {
        input: trimmed.to_string(),
    })?;
    Ok(pc(letter + accidental))
}

/// Parse a note name with octave ("C4", "F#3", "Bb5") into a MIDI note number.
///
/// Uses the convention C4 = 60.
pub fn parse_note_name(name: &str) -> Result<u8, TheoryError> {
    let trimmed = name.trim();
    let invalid = || TheoryError::InvalidNoteName {
        input: trimmed.to_string(),
    };

    let (letter, rest) = split_letter(trimmed).ok_or_else(invalid)?;
    let octave_start = rest
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() || *c == '-')
        .map(|(i, _)| i)
        .ok_or_else(invalid)?;
    let accidental = parse_accidentals(&rest[..octave_start]).ok_or_else(invalid)?;
    let octave: i32 = rest[octave_start..].parse().map_err(|_| invalid())?;

    let midi = (octave + 1) * 12 + letter + accidental;
    if !(0..=127).contains(&midi) {
        return Err(invalid());
    }
    Ok(midi as u8)
}

/// Convert a MIDI note number to a note name (e.g., 60 -> "C4").
pub fn midi_to_note_name(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", NAMES_SHARP[(midi % 12) as usize], octave)
}

fn split_letter(s: &str) -> Option<(i32, &str)> {
    let mut chars = s.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let semitone = SEMITONE_MAP
        .iter()
        .find(|(c, _)| *c == first)
        .map(|(_, s)| *s)?;
    Some((semitone, chars.as_str()))
}

fn parse_accidentals(s: &str) -> Option<i32> {
    let mut total = 0;
    for c in s.chars() {
        match c {
            '#' | '♯' | 's' => total += 1,
            'b' | '♭' => total -= 1,
            _ => return None,
        }
    }
    Some(total)
}

/// An unordered set of pitch classes, stored as a 12-bit mask.
///
/// Construction reduces every input modulo 12 and removes duplicates, so the
/// set is the chord's identity for matching purposes.
///
/// ```
/// use tonalis_theory::PitchClassSet;
///
/// let g7 = PitchClassSet::from_pcs([7, 11, 14, 17]);
/// assert_eq!(g7.len(), 4);
/// assert!(g7.contains(2));
/// assert_eq!(g7.to_string(), "{2,5,7,11}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<i32>", into = "Vec<u8>")]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    /// The empty set.
    pub const EMPTY: PitchClassSet = PitchClassSet(0);

    /// Build a set from arbitrary integers, reducing each modulo 12.
    pub fn from_pcs<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<i32>,
    {
        let mut mask = 0u16;
        for v in values {
            mask |= 1 << pc(v.into());
        }
        Self(mask)
    }

    /// Build a set from MIDI note numbers.
    pub fn from_midi(notes: &[u8]) -> Self {
        Self::from_pcs(notes.iter().map(|&n| n as i32))
    }

    /// Build a set from a root and intervals above it.
    pub fn from_intervals(root: u8, intervals: &[i32]) -> Self {
        Self::from_pcs(intervals.iter().map(|&i| root as i32 + i))
    }

    /// Raw 12-bit mask (bit n = pitch class n).
    pub fn mask(&self) -> u16 {
        self.0
    }

    /// Whether the set contains the given pitch class.
    pub fn contains(&self, pitch_class: u8) -> bool {
        self.0 & (1 << (pitch_class % 12)) != 0
    }

    /// Number of distinct pitch classes.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Pitch classes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..12).filter(move |&p| self.contains(p))
    }

    /// Whether every member is also in `other`.
    pub fn is_subset(&self, other: &PitchClassSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Members of `self` not in `other`.
    pub fn difference(&self, other: &PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 & !other.0)
    }

    /// Members of either set.
    pub fn union(&self, other: &PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 | other.0)
    }

    /// Number of members shared with `other`.
    pub fn intersection_len(&self, other: &PitchClassSet) -> usize {
        (self.0 & other.0).count_ones() as usize
    }

    /// Transpose every member by `semitones`.
    pub fn transpose(&self, semitones: i32) -> PitchClassSet {
        Self::from_pcs(self.iter().map(|p| p as i32 + semitones))
    }

    /// Return a copy with `pitch_class` added.
    pub fn with(&self, pitch_class: u8) -> PitchClassSet {
        PitchClassSet(self.0 | (1 << (pitch_class % 12)))
    }
}

impl From<Vec<i32>> for PitchClassSet {
    fn from(values: Vec<i32>) -> Self {
        Self::from_pcs(values)
    }
}

impl From<PitchClassSet> for Vec<u8> {
    fn from(set: PitchClassSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<u8> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::from_pcs(iter.into_iter().map(i32::from))
    }
}

impl std::fmt::Display for PitchClassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "}}")
    }
}
