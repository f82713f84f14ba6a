//! Keys and modes.

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::pitch::{parse_pitch_class, pc, pitch_class_name, PitchClassSet};
use crate::roman::ChordQuality;

/// Major scale intervals.
pub const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Natural minor scale intervals.
pub const NATURAL_MINOR_SCALE: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Major tonics conventionally spelled with flats (Db, Eb, F, Gb, Ab, Bb).
const FLAT_MAJOR_TONICS: [u8; 6] = [1, 3, 5, 6, 8, 10];

/// Mode of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Major (Ionian).
    Major,
    /// Minor: natural minor with an implied raised leading tone.
    Minor,
}

impl Mode {
    /// Returns the mode name as used in key display strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }

    /// Scale intervals for this mode (natural minor for `Minor`).
    pub fn scale_intervals(&self) -> [i32; 7] {
        match self {
            Mode::Major => MAJOR_SCALE,
            Mode::Minor => NATURAL_MINOR_SCALE,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A key: tonic pitch class plus mode.
///
/// Keys are small `Copy` values created once per analysis call.
///
/// ```
/// use tonalis_theory::{Key, Mode};
///
/// let key: Key = "Eb major".parse().unwrap();
/// assert_eq!(key.tonic(), 3);
/// assert_eq!(key.mode(), Mode::Major);
/// assert_eq!(key.to_string(), "Eb major");
///
/// let minor: Key = "f#m".parse().unwrap();
/// assert_eq!(minor, Key::minor(6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    tonic: u8,
    mode: Mode,
}

impl Key {
    /// Create a key from a tonic pitch class (reduced mod 12) and mode.
    pub const fn new(tonic: u8, mode: Mode) -> Self {
        Self {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Major key on `tonic`.
    pub const fn major(tonic: u8) -> Self {
        Self::new(tonic, Mode::Major)
    }

    /// Minor key on `tonic`.
    pub const fn minor(tonic: u8) -> Self {
        Self::new(tonic, Mode::Minor)
    }

    /// Tonic pitch class.
    pub fn tonic(&self) -> u8 {
        self.tonic
    }

    /// Mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the key is major.
    pub fn is_major(&self) -> bool {
        self.mode == Mode::Major
    }

    /// The parallel key (same tonic, other mode).
    pub fn parallel(&self) -> Key {
        match self.mode {
            Mode::Major => Key::minor(self.tonic),
            Mode::Minor => Key::major(self.tonic),
        }
    }

    /// Pitch class `semitones` above the tonic.
    pub fn pc_above_tonic(&self, semitones: i32) -> u8 {
        pc(self.tonic as i32 + semitones)
    }

    /// Scale pitch classes (major or natural minor), degree 1 first.
    pub fn scale(&self) -> [u8; 7] {
        let intervals = self.mode.scale_intervals();
        let mut out = [0u8; 7];
        for (slot, interval) in out.iter_mut().zip(intervals) {
            *slot = self.pc_above_tonic(interval);
        }
        out
    }

    /// Pitch class of scale degree `degree` (1-based, wraps past 7).
    pub fn degree_pc(&self, degree: usize) -> u8 {
        let idx = (degree.max(1) - 1) % 7;
        self.pc_above_tonic(self.mode.scale_intervals()[idx])
    }

    /// Semitones from `degree` (1-based) up `steps` scale steps, in the
    /// major or natural minor scale.
    fn scale_span(&self, degree: usize, steps: usize) -> i32 {
        let scale = self.mode.scale_intervals();
        let d = (degree.max(1) - 1) % 7;
        (scale[(d + steps) % 7] - scale[d]).rem_euclid(12)
    }

    /// Quality of the triad stacked in thirds on `degree` (1-based) of the
    /// major or natural minor scale.
    pub fn natural_triad(&self, degree: usize) -> ChordQuality {
        match (self.scale_span(degree, 2), self.scale_span(degree, 4)) {
            (4, 7) => ChordQuality::Major,
            (3, 7) => ChordQuality::Minor,
            _ => ChordQuality::Diminished,
        }
    }

    /// Semitones from `degree` (1-based) up to its diatonic seventh in the
    /// major or natural minor scale.
    pub fn natural_seventh(&self, degree: usize) -> i32 {
        self.scale_span(degree, 6)
    }

    /// The leading tone (a semitone below the tonic) in both modes.
    pub fn leading_tone(&self) -> u8 {
        self.pc_above_tonic(11)
    }

    /// Lowered sixth degree (b6), the anchor of augmented-sixth chords.
    pub fn flat_six(&self) -> u8 {
        self.pc_above_tonic(8)
    }

    /// Diatonic collection used for membership tests.
    ///
    /// Major keys use the major scale. Minor keys use the natural minor
    /// scale extended with the raised leading tone.
    pub fn diatonic_collection(&self) -> PitchClassSet {
        let base: PitchClassSet = self.scale().into_iter().collect();
        match self.mode {
            Mode::Major => base,
            Mode::Minor => base.with(self.leading_tone()),
        }
    }

    /// Whether every pitch class of `set` is in the diatonic collection.
    pub fn is_diatonic(&self, set: &PitchClassSet) -> bool {
        set.is_subset(&self.diatonic_collection())
    }

    /// All 24 keys in canonical order: tonic 0..11, major before minor.
    pub fn all() -> impl Iterator<Item = Key> {
        (0u8..12).flat_map(|t| [Key::major(t), Key::minor(t)])
    }

    /// Canonical index of the key in `0..24` (matches [`Key::all`]).
    pub fn index(&self) -> usize {
        self.tonic as usize * 2
            + match self.mode {
                Mode::Major => 0,
                Mode::Minor => 1,
            }
    }

    /// Tonic name spelled to match the key signature convention.
    pub fn tonic_name(&self) -> &'static str {
        let flats = match self.mode {
            Mode::Major => FLAT_MAJOR_TONICS.contains(&self.tonic),
            // Black-key minor tonics read as sharps except Eb and Bb minor.
            Mode::Minor => matches!(self.tonic, 3 | 10),
        };
        pitch_class_name(self.tonic, flats)
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::major(0)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.mode)
    }
}

impl std::str::FromStr for Key {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |reason: &str| TheoryError::InvalidKey {
            input: trimmed.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(invalid("key cannot be empty"));
        }

        let (tonic_part, mode_part) = match trimmed.split_once(char::is_whitespace) {
            Some((t, m)) => (t, Some(m.trim())),
            None => (trimmed, None),
        };

        // A lower-case letter alone ("a", "f#") names a minor key.
        let lower_letter = tonic_part
            .chars()
            .next()
            .map(|c| c.is_ascii_lowercase())
            .unwrap_or(false);

        let (tonic_text, suffix_minor) = match mode_part {
            Some(_) => (tonic_part, false),
            None => match tonic_part.strip_suffix("min") {
                Some(t) => (t, true),
                None => match tonic_part.strip_suffix('m') {
                    Some(t) if !t.is_empty() => (t, true),
                    _ => (tonic_part, false),
                },
            },
        };

        let tonic = parse_pitch_class(tonic_text).map_err(|_| invalid("unknown tonic"))?;

        let mode = match mode_part.map(|m| m.to_ascii_lowercase()) {
            Some(m) if m == "major" || m == "maj" => Mode::Major,
            Some(m) if m == "minor" || m == "min" => Mode::Minor,
            Some(_) => return Err(invalid("mode must be 'major' or 'minor'")),
            None if suffix_minor || lower_letter => Mode::Minor,
            None => Mode::Major,
        };

        Ok(Key::new(tonic, mode))
    }
}

impl TryFrom<String> for Key {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}
