//! Roman-numeral progression notation.
//!
//! A progression is a `;`-separated list of tokens such as
//! `I; ii65; V7/V; V64; V7; I`. Each token is built into a pitch-class set
//! relative to a key, with a bass hint derived from its figure.
//!
//! Token grammar (after normalization):
//!
//! ```text
//! token    := aug6 | head ("/" target)?
//! aug6     := "It6" | "Fr43" | "Ger65"
//! head     := ("N" | "b"? numeral) marker? "maj"? figure
//! target   := "b"? numeral
//! numeral  := I | II | ... | VII        (all upper or all lower case)
//! marker   := "°" | "o" | "ø" | "0"
//! figure   := "" | 6 | 64 | 7 | 65 | 43 | 42 | 9 | 7(9)
//! ```

use serde::{Deserialize, Serialize};

use tonalis_theory::key::MAJOR_SCALE;
use tonalis_theory::{pc, ChordQuality, Key, Mode, PitchClassSet, ScaleDegree};

use crate::error::NotationError;

const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// ASCII spellings of the Unicode Roman numeral glyphs U+2160..=U+2166.
const ROMAN_GLYPHS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// One parsed progression token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChord {
    /// Pitch classes of the chord.
    pub pitch_classes: PitchClassSet,
    /// Bass pitch class implied by the figure; `None` when no figure was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass_hint: Option<u8>,
    /// Normalized token text; empty for chords not read from notation.
    #[serde(default)]
    pub token: String,
}

impl ParsedChord {
    /// A chord given directly as pitch classes, with no hint or token.
    pub fn from_pitch_classes(pitch_classes: PitchClassSet) -> Self {
        Self {
            pitch_classes,
            bass_hint: None,
            token: String::new(),
        }
    }

    /// The token, or `None` for chords that did not come from notation.
    pub fn token(&self) -> Option<&str> {
        if self.token.is_empty() {
            None
        } else {
            Some(&self.token)
        }
    }
}

impl From<PitchClassSet> for ParsedChord {
    fn from(pitch_classes: PitchClassSet) -> Self {
        Self::from_pitch_classes(pitch_classes)
    }
}

/// The three augmented-sixth chords, anchored on the lowered sixth degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentedSixth {
    Italian,
    French,
    German,
}

impl AugmentedSixth {
    pub const ALL: [AugmentedSixth; 3] = [
        AugmentedSixth::Italian,
        AugmentedSixth::French,
        AugmentedSixth::German,
    ];

    /// Label and notation token.
    pub fn token(&self) -> &'static str {
        match self {
            AugmentedSixth::Italian => "It6",
            AugmentedSixth::French => "Fr43",
            AugmentedSixth::German => "Ger65",
        }
    }

    /// Semitones above the tonic: b6, 1, (2 | b3), #4.
    pub fn intervals(&self) -> &'static [i32] {
        match self {
            AugmentedSixth::Italian => &[8, 0, 6],
            AugmentedSixth::French => &[8, 0, 2, 6],
            AugmentedSixth::German => &[8, 0, 3, 6],
        }
    }

    /// Pitch classes in `key`.
    pub fn pitch_classes(&self, key: Key) -> PitchClassSet {
        PitchClassSet::from_intervals(key.tonic(), self.intervals())
    }

    /// Whether the same set also reads as a mixture seventh (Ger65 = bVI7).
    pub fn has_mixture_reading(&self) -> bool {
        matches!(self, AugmentedSixth::German)
    }

    /// The chord named by a notation token.
    pub fn from_token(token: &str) -> Option<AugmentedSixth> {
        Self::ALL.into_iter().find(|a| a.token() == token)
    }

    /// The augmented sixth whose set equals `set` in `key`.
    pub fn matching(set: &PitchClassSet, key: Key) -> Option<AugmentedSixth> {
        Self::ALL
            .into_iter()
            .find(|a| a.pitch_classes(key) == *set)
    }
}

/// Parse a `;`-separated progression relative to `key`.
///
/// ```
/// use tonalis_analysis::notation::parse_progression;
/// use tonalis_theory::{Key, PitchClassSet};
///
/// let chords = parse_progression("V6; I64", Key::major(0)).unwrap();
/// assert_eq!(chords[0].pitch_classes, PitchClassSet::from_pcs([7, 11, 2]));
/// assert_eq!(chords[0].bass_hint, Some(11));
/// assert_eq!(chords[1].bass_hint, Some(7));
/// ```
pub fn parse_progression(text: &str, key: Key) -> Result<Vec<ParsedChord>, NotationError> {
    let chords = text
        .split(';')
        .map(normalize)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| TokenParser::new(&token, index).parse(key))
        .collect::<Result<Vec<_>, _>>()?;

    if chords.is_empty() {
        return Err(NotationError::EmptyProgression);
    }
    Ok(chords)
}

/// Parse a single chord token relative to `key`.
pub fn parse_chord(token: &str, key: Key) -> Result<ParsedChord, NotationError> {
    let normalized = normalize(token);
    if normalized.is_empty() {
        return Err(NotationError::EmptyProgression);
    }
    TokenParser::new(&normalized, 0).parse(key)
}

/// Strip whitespace and zero-width spaces; map Unicode spellings to ASCII.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_whitespace() || c == ZERO_WIDTH_SPACE {
            continue;
        }
        match c {
            '\u{266D}' => out.push('b'),
            '\u{BA}' => out.push('\u{B0}'),
            '\u{D8}' => out.push('\u{F8}'),
            '\u{2160}'..='\u{2166}' => {
                out.push_str(ROMAN_GLYPHS[(c as u32 - 0x2160) as usize]);
            }
            '\u{2170}'..='\u{2176}' => {
                out.push_str(&ROMAN_GLYPHS[(c as u32 - 0x2170) as usize].to_ascii_lowercase());
            }
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Plain,
    Diminished,
    HalfDiminished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FigureToken {
    Root,
    Six,
    SixFour,
    Seven,
    SixFive,
    FourThree,
    FourTwo,
    Ninth,
    SeventhNinth,
}

impl FigureToken {
    fn parse(text: &str) -> Option<FigureToken> {
        Some(match text {
            "" => FigureToken::Root,
            "6" => FigureToken::Six,
            "64" => FigureToken::SixFour,
            "7" => FigureToken::Seven,
            "65" => FigureToken::SixFive,
            "43" => FigureToken::FourThree,
            "42" => FigureToken::FourTwo,
            "9" => FigureToken::Ninth,
            "7(9)" => FigureToken::SeventhNinth,
            _ => return None,
        })
    }

    fn is_triad_inversion(&self) -> bool {
        matches!(self, FigureToken::Six | FigureToken::SixFour)
    }

    fn is_ninth(&self) -> bool {
        matches!(self, FigureToken::Ninth | FigureToken::SeventhNinth)
    }

    fn requires_seventh(&self) -> bool {
        matches!(
            self,
            FigureToken::Seven
                | FigureToken::SixFive
                | FigureToken::FourThree
                | FigureToken::FourTwo
                | FigureToken::Ninth
                | FigureToken::SeventhNinth
        )
    }

    /// Index into the chord's interval template of the implied bass.
    fn bass_tone(&self) -> Option<usize> {
        match self {
            FigureToken::Root => None,
            FigureToken::Seven | FigureToken::Ninth | FigureToken::SeventhNinth => Some(0),
            FigureToken::Six | FigureToken::SixFive => Some(1),
            FigureToken::SixFour | FigureToken::FourThree => Some(2),
            FigureToken::FourTwo => Some(3),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Numeral {
    degree: ScaleDegree,
    upper: bool,
    flat: bool,
}

impl Numeral {
    fn root(&self, key: Key) -> u8 {
        let idx = self.degree.number() - 1;
        if self.flat {
            key.pc_above_tonic(MAJOR_SCALE[idx] - 1)
        } else if key.mode() == Mode::Minor && self.degree == ScaleDegree::VII && !self.upper {
            key.leading_tone()
        } else {
            key.degree_pc(self.degree.number())
        }
    }
}

struct TokenParser<'a> {
    token: &'a str,
    index: usize,
}

impl<'a> TokenParser<'a> {
    fn new(token: &'a str, index: usize) -> Self {
        Self { token, index }
    }

    fn fail(&self, offending: &str, reason: impl Into<String>) -> NotationError {
        NotationError::InvalidToken {
            index: self.index,
            token: self.token.to_string(),
            offending: offending.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(&self, key: Key) -> Result<ParsedChord, NotationError> {
        if let Some(aug) = AugmentedSixth::from_token(self.token) {
            return Ok(ParsedChord {
                pitch_classes: aug.pitch_classes(key),
                bass_hint: Some(key.flat_six()),
                token: self.token.to_string(),
            });
        }

        let (head, target) = match self.token.split_once('/') {
            Some((head, target)) => (head, Some(target)),
            None => (self.token, None),
        };
        let context = match target {
            Some(target) => self.target_key(target, key)?,
            None => key,
        };

        let (numeral, rest) = self.numeral(head)?;
        let (marker, rest) = match rest.chars().next() {
            Some(c @ ('°' | 'o')) => (Marker::Diminished, &rest[c.len_utf8()..]),
            Some(c @ ('ø' | '0')) => (Marker::HalfDiminished, &rest[c.len_utf8()..]),
            _ => (Marker::Plain, rest),
        };
        let (major_seventh, rest) = match rest.strip_prefix("maj") {
            Some(r) => (true, r),
            None => (false, rest),
        };
        let figure =
            FigureToken::parse(rest).ok_or_else(|| self.fail(rest, "unknown figure"))?;

        if major_seventh && marker != Marker::Plain {
            return Err(self.fail(head, "'maj' cannot follow a diminished marker"));
        }
        if (major_seventh || marker == Marker::HalfDiminished) && figure.is_triad_inversion() {
            return Err(self.fail(rest, "seventh chord written with a triad figure"));
        }

        let root = numeral.root(context);
        let triad = match marker {
            Marker::Diminished | Marker::HalfDiminished => ChordQuality::Diminished,
            Marker::Plain if numeral.upper => ChordQuality::Major,
            Marker::Plain => ChordQuality::Minor,
        };
        let bare = figure == FigureToken::Root;
        let seventh = figure.requires_seventh()
            || marker == Marker::HalfDiminished
            || (major_seventh && bare)
            || (marker == Marker::Diminished && target.is_some() && bare);

        let quality = if seventh {
            let interval = seventh_interval(&numeral, marker, major_seventh, triad, context);
            ChordQuality::with_seventh(triad, interval)
                .ok_or_else(|| self.fail(head, "no seventh chord of this quality"))?
        } else {
            triad
        };

        let mut pitch_classes = quality.pitch_classes(root);
        if figure.is_ninth() {
            if quality != ChordQuality::DominantSeventh {
                return Err(self.fail(rest, "ninth figures need a dominant-seventh chord"));
            }
            let ninth = if context.is_major() { 14 } else { 13 };
            pitch_classes = pitch_classes.with(pc(root as i32 + ninth));
        }

        let bass_hint = figure
            .bass_tone()
            .and_then(|i| quality.intervals().get(i))
            .map(|&interval| pc(root as i32 + interval));

        Ok(ParsedChord {
            pitch_classes,
            bass_hint,
            token: self.token.to_string(),
        })
    }

    /// Read `N` or an optionally flatted numeral; returns the unread remainder.
    fn numeral<'t>(&self, text: &'t str) -> Result<(Numeral, &'t str), NotationError> {
        if let Some(rest) = text.strip_prefix('N') {
            let numeral = Numeral {
                degree: ScaleDegree::II,
                upper: true,
                flat: true,
            };
            return Ok((numeral, rest));
        }

        let (flat, body) = match text.strip_prefix('b') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let len = body
            .find(|c: char| !matches!(c, 'I' | 'V' | 'i' | 'v'))
            .unwrap_or(body.len());
        let letters = &body[..len];
        if letters.is_empty() {
            return Err(self.fail(text, "expected a Roman numeral (I-VII)"));
        }

        let upper = letters.chars().all(|c| c.is_ascii_uppercase());
        if !upper && !letters.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(self.fail(letters, "numeral mixes upper and lower case"));
        }
        let degree = ScaleDegree::ALL
            .into_iter()
            .find(|d| d.as_upper().eq_ignore_ascii_case(letters))
            .ok_or_else(|| self.fail(letters, "unknown Roman numeral"))?;

        Ok((
            Numeral {
                degree,
                upper,
                flat,
            },
            &body[len..],
        ))
    }

    /// The temporary key of a `/target` suffix: tonic on the target's root,
    /// mode from its case.
    fn target_key(&self, text: &str, key: Key) -> Result<Key, NotationError> {
        if text.is_empty() {
            return Err(self.fail("/", "missing secondary target"));
        }
        let (numeral, rest) = self.numeral(text)?;
        if !rest.is_empty() {
            return Err(self.fail(rest, "unexpected text after secondary target"));
        }
        let mode = if numeral.upper {
            Mode::Major
        } else {
            Mode::Minor
        };
        Ok(Key::new(numeral.root(key), mode))
    }
}

/// Seventh above the root, in semitones.
fn seventh_interval(
    numeral: &Numeral,
    marker: Marker,
    major_seventh: bool,
    triad: ChordQuality,
    key: Key,
) -> i32 {
    match marker {
        Marker::Diminished => 9,
        Marker::HalfDiminished => 10,
        Marker::Plain if major_seventh => 11,
        Marker::Plain if numeral.flat => 10,
        Marker::Plain => {
            let degree = numeral.degree.number();
            if key.natural_triad(degree) == triad {
                key.natural_seventh(degree)
            } else {
                10
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tonalis_theory::TonalisError;

    fn set(pcs: &[i32]) -> PitchClassSet {
        PitchClassSet::from_pcs(pcs.iter().copied())
    }

    fn parse_c(token: &str) -> ParsedChord {
        parse_chord(token, Key::major(0)).unwrap()
    }

    #[test]
    fn test_inversion_hints() {
        let chords = parse_progression("V6; I64", Key::major(0)).unwrap();
        assert_eq!(chords.len(), 2);
        assert_eq!(chords[0].pitch_classes, set(&[7, 11, 2]));
        assert_eq!(chords[0].bass_hint, Some(11));
        assert_eq!(chords[1].pitch_classes, set(&[0, 4, 7]));
        assert_eq!(chords[1].bass_hint, Some(7));
        assert_eq!(chords[1].token, "I64");
    }

    #[test]
    fn test_root_position_has_no_hint() {
        assert_eq!(parse_c("IV").bass_hint, None);
        assert_eq!(parse_c("V7").bass_hint, Some(7));
        assert_eq!(parse_c("V42").bass_hint, Some(5));
        assert_eq!(parse_c("ii65").bass_hint, Some(5));
        assert_eq!(parse_c("V43").bass_hint, Some(2));
    }

    #[test]
    fn test_diatonic_sevenths() {
        assert_eq!(parse_c("V7").pitch_classes, set(&[7, 11, 2, 5]));
        assert_eq!(parse_c("I7").pitch_classes, set(&[0, 4, 7, 11]));
        assert_eq!(parse_c("ii7").pitch_classes, set(&[2, 5, 9, 0]));
        assert_eq!(parse_c("viiø7").pitch_classes, set(&[11, 2, 5, 9]));
        assert_eq!(parse_c("viio7").pitch_classes, set(&[11, 2, 5, 8]));
        assert_eq!(parse_c("IVmaj7").pitch_classes, set(&[5, 9, 0, 4]));
    }

    #[test]
    fn test_minor_key_roots() {
        let a_minor = Key::minor(9);
        let chord = |t: &str| parse_chord(t, a_minor).unwrap().pitch_classes;
        assert_eq!(chord("V7"), set(&[4, 8, 11, 2]));
        assert_eq!(chord("vii°7"), set(&[8, 11, 2, 5]));
        assert_eq!(chord("VII"), set(&[7, 11, 2]));
        assert_eq!(chord("III7"), set(&[0, 4, 7, 11]));
        assert_eq!(chord("iiø7"), set(&[11, 2, 5, 9]));
        assert_eq!(chord("iv7"), set(&[2, 5, 9, 0]));
    }

    #[test]
    fn test_secondary_functions() {
        assert_eq!(parse_c("V7/V").pitch_classes, set(&[2, 6, 9, 0]));
        assert_eq!(parse_c("V/ii").pitch_classes, set(&[9, 1, 4]));
        assert_eq!(parse_c("V7/ii").pitch_classes, set(&[9, 1, 4, 7]));
        assert_eq!(parse_c("viiø7/V").pitch_classes, set(&[6, 9, 0, 4]));
        assert_eq!(parse_c("vii°6/ii").pitch_classes, set(&[1, 4, 7]));
        assert_eq!(parse_c("V65/V").bass_hint, Some(6));
    }

    #[test]
    fn test_bare_diminished_secondary_implies_seventh() {
        let chord = parse_c("vii°/V");
        assert_eq!(chord.pitch_classes, set(&[6, 9, 0, 3]));
        assert_eq!(chord.bass_hint, None);
        // Without a target a bare ° stays a triad.
        assert_eq!(parse_c("vii°").pitch_classes, set(&[11, 2, 5]));
    }

    #[test]
    fn test_borrowed_and_neapolitan() {
        assert_eq!(parse_c("bVI").pitch_classes, set(&[8, 0, 3]));
        assert_eq!(parse_c("bVII7").pitch_classes, set(&[10, 2, 5, 8]));
        assert_eq!(parse_c("bVI7").pitch_classes, set(&[8, 0, 3, 6]));
        let n6 = parse_c("N6");
        assert_eq!(n6.pitch_classes, set(&[1, 5, 8]));
        assert_eq!(n6.bass_hint, Some(5));
        assert_eq!(parse_c("bII").pitch_classes, n6.pitch_classes);
    }

    #[test]
    fn test_augmented_sixths() {
        let ger = parse_c("Ger65");
        assert_eq!(ger.pitch_classes, set(&[8, 0, 3, 6]));
        assert_eq!(ger.bass_hint, Some(8));
        assert_eq!(parse_c("It6").pitch_classes, set(&[8, 0, 6]));
        assert_eq!(parse_c("Fr43").pitch_classes, set(&[8, 0, 2, 6]));
        // Anchored on the tonic, not the key signature.
        let a_minor = parse_chord("It6", Key::minor(9)).unwrap();
        assert_eq!(a_minor.pitch_classes, set(&[5, 9, 3]));
    }

    #[test]
    fn test_dominant_ninths() {
        assert_eq!(parse_c("V9").pitch_classes, set(&[7, 11, 2, 5, 9]));
        assert_eq!(parse_c("V7(9)").pitch_classes, set(&[7, 11, 2, 5, 9]));
        let minor = parse_chord("V9", Key::minor(0)).unwrap();
        assert_eq!(minor.pitch_classes, set(&[7, 11, 2, 5, 8]));
        assert!(parse_chord("ii9", Key::major(0)).is_err());
    }

    #[test]
    fn test_unicode_normalization() {
        let text = "\u{2164} ;\u{200B}\u{266D}\u{2165}; \u{2171}\u{BA}; \u{2176}\u{D8}7";
        let chords = parse_progression(text, Key::major(0)).unwrap();
        assert_eq!(chords[0].token, "V");
        assert_eq!(chords[1].token, "bVI");
        assert_eq!(chords[1].pitch_classes, set(&[8, 0, 3]));
        assert_eq!(chords[2].token, "ii°");
        assert_eq!(chords[3].token, "viiø7");
        assert_eq!(chords[3].pitch_classes, set(&[11, 2, 5, 9]));
    }

    #[test]
    fn test_whitespace_and_trailing_separators() {
        let chords = parse_progression(" I ;; V 7 ; I ; ", Key::major(0)).unwrap();
        assert_eq!(chords.len(), 3);
        assert_eq!(chords[1].token, "V7");
    }

    #[test]
    fn test_empty_progression() {
        assert_eq!(
            parse_progression(" ; ;\u{200B}", Key::major(0)),
            Err(NotationError::EmptyProgression)
        );
    }

    #[test]
    fn test_errors_name_offending_text() {
        let err = parse_progression("I; V; Q", Key::major(0)).unwrap_err();
        assert_eq!(err.code(), "NOTATION_002");
        match err {
            NotationError::InvalidToken {
                index, offending, ..
            } => {
                assert_eq!(index, 2);
                assert_eq!(offending, "Q");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = parse_chord("V8", Key::major(0)).unwrap_err();
        assert_eq!(err.offending(), Some("8"));
        let err = parse_chord("Vi", Key::major(0)).unwrap_err();
        assert_eq!(err.offending(), Some("Vi"));
        let err = parse_chord("IIII", Key::major(0)).unwrap_err();
        assert_eq!(err.offending(), Some("IIII"));
        let err = parse_chord("V/V/V", Key::major(0)).unwrap_err();
        assert_eq!(err.offending(), Some("/V"));
        assert!(parse_chord("V/", Key::major(0)).is_err());
        assert!(parse_chord("iiø6", Key::major(0)).is_err());
    }
}
