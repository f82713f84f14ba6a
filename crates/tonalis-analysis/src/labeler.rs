//! Chord labeling: pitch-class set + key → Roman-numeral label.
//!
//! Interpretations are tried in a fixed order and the first match wins:
//!
//! 1. diatonic triads and sevenths of the key
//! 2. secondary dominants and leading-tone chords of diatonic targets
//! 3. augmented sixths, resolved against the b6 mixture seventh they share a set with
//! 4. borrowed (mixture) chords and the Neapolitan
//! 5. dominant ninths, in the key or as secondaries
//!
//! A chord that matches none of these is returned with `success == false`.

use tonalis_theory::{
    pc, AnalyzedChord, ChordQuality, Figure, FourPartVoicing, HarmonyOptions, Key, Mode,
    PitchClassSet, RomanNumeral, ScaleDegree,
};

use crate::notation::{AugmentedSixth, ParsedChord};

/// Optional information about the chord beyond its pitch classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordContext<'a> {
    /// Four-part voicing; supplies the bass and soprano.
    pub voicing: Option<&'a FourPartVoicing>,
    /// Bass pitch class implied by notation, used when there is no voicing.
    pub bass_hint: Option<u8>,
    /// Notation token the chord was parsed from.
    pub token: Option<&'a str>,
}

impl<'a> ChordContext<'a> {
    /// Context for a parsed chord, optionally voiced.
    pub fn for_parsed(chord: &'a ParsedChord, voicing: Option<&'a FourPartVoicing>) -> Self {
        Self {
            voicing,
            bass_hint: chord.bass_hint,
            token: chord.token(),
        }
    }

    fn bass(&self) -> Option<u8> {
        self.voicing
            .map(|v| v.bass_pc())
            .or(self.bass_hint.map(|b| b % 12))
    }

    fn soprano(&self) -> Option<u8> {
        self.voicing.map(|v| v.soprano_pc())
    }
}

/// Advisory messages attached to labeled chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// A borrowed seventh and the chord it conventionally resolves to.
    BorrowedSeventhResolution {
        label: &'static str,
        target: &'static str,
    },
    NeapolitanNotFirstInversion,
    NeapolitanResolvesToDominant,
    BassNotChordTone {
        bass: u8,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::BorrowedSeventhResolution { label, target } => {
                write!(f, "borrowed {} usually resolves to {}", label, target)
            }
            Advisory::NeapolitanNotFirstInversion => {
                write!(f, "Neapolitan is conventionally voiced in first inversion (bII6)")
            }
            Advisory::NeapolitanResolvesToDominant => write!(f, "Neapolitan resolves to V"),
            Advisory::BassNotChordTone { bass } => write!(
                f,
                "bass pitch class {} is not a chord tone; labeled in root position",
                bass
            ),
        }
    }
}

/// A chord template: root, quality, and how to spell its numeral.
#[derive(Debug, Clone, Copy)]
struct Template {
    root: u8,
    quality: ChordQuality,
    degree: ScaleDegree,
    flat: bool,
}

impl Template {
    fn new(root: u8, quality: ChordQuality, degree: ScaleDegree) -> Self {
        Self {
            root,
            quality,
            degree,
            flat: false,
        }
    }

    fn flat(mut self) -> Self {
        self.flat = true;
        self
    }

    fn pitch_classes(&self) -> PitchClassSet {
        self.quality.pitch_classes(self.root)
    }

    fn numeral(&self) -> RomanNumeral {
        if self.quality.is_upper_case() {
            RomanNumeral::upper(self.degree)
        } else {
            RomanNumeral::lower(self.degree)
        }
    }

    /// Numeral with flat prefix and degree symbol, e.g. "bVI", "vii°", "iiø".
    fn numeral_text(&self) -> String {
        format!(
            "{}{}{}",
            if self.flat { "b" } else { "" },
            self.numeral(),
            self.quality.degree_symbol()
        )
    }

    fn is_neapolitan(&self) -> bool {
        self.flat && self.degree == ScaleDegree::II
    }
}

/// Diatonic triads and sevenths, as (semitones above tonic, degree, quality).
const MAJOR_DIATONIC: [(i32, ScaleDegree, ChordQuality); 15] = [
    (0, ScaleDegree::I, ChordQuality::Major),
    (2, ScaleDegree::II, ChordQuality::Minor),
    (4, ScaleDegree::III, ChordQuality::Minor),
    (5, ScaleDegree::IV, ChordQuality::Major),
    (7, ScaleDegree::V, ChordQuality::Major),
    (9, ScaleDegree::VI, ChordQuality::Minor),
    (11, ScaleDegree::VII, ChordQuality::Diminished),
    (0, ScaleDegree::I, ChordQuality::MajorSeventh),
    (2, ScaleDegree::II, ChordQuality::MinorSeventh),
    (4, ScaleDegree::III, ChordQuality::MinorSeventh),
    (5, ScaleDegree::IV, ChordQuality::MajorSeventh),
    (7, ScaleDegree::V, ChordQuality::DominantSeventh),
    (9, ScaleDegree::VI, ChordQuality::MinorSeventh),
    (11, ScaleDegree::VII, ChordQuality::HalfDiminishedSeventh),
    (11, ScaleDegree::VII, ChordQuality::DiminishedSeventh),
];

const MINOR_DIATONIC: [(i32, ScaleDegree, ChordQuality); 18] = [
    (0, ScaleDegree::I, ChordQuality::Minor),
    (2, ScaleDegree::II, ChordQuality::Diminished),
    (3, ScaleDegree::III, ChordQuality::Major),
    (5, ScaleDegree::IV, ChordQuality::Minor),
    (7, ScaleDegree::V, ChordQuality::Minor),
    (7, ScaleDegree::V, ChordQuality::Major),
    (8, ScaleDegree::VI, ChordQuality::Major),
    (10, ScaleDegree::VII, ChordQuality::Major),
    (11, ScaleDegree::VII, ChordQuality::Diminished),
    (0, ScaleDegree::I, ChordQuality::MinorSeventh),
    (2, ScaleDegree::II, ChordQuality::HalfDiminishedSeventh),
    (3, ScaleDegree::III, ChordQuality::MajorSeventh),
    (5, ScaleDegree::IV, ChordQuality::MinorSeventh),
    (7, ScaleDegree::V, ChordQuality::MinorSeventh),
    (7, ScaleDegree::V, ChordQuality::DominantSeventh),
    (8, ScaleDegree::VI, ChordQuality::MajorSeventh),
    (10, ScaleDegree::VII, ChordQuality::DominantSeventh),
    (11, ScaleDegree::VII, ChordQuality::DiminishedSeventh),
];

/// Mixture chords available in either mode, as (semitones, degree, quality, flat).
const BORROWED: [(i32, ScaleDegree, ChordQuality, bool); 10] = [
    (0, ScaleDegree::I, ChordQuality::Minor, false),
    (5, ScaleDegree::IV, ChordQuality::Minor, false),
    (3, ScaleDegree::III, ChordQuality::Major, true),
    (8, ScaleDegree::VI, ChordQuality::Major, true),
    (10, ScaleDegree::VII, ChordQuality::Major, true),
    (1, ScaleDegree::II, ChordQuality::Major, true),
    (5, ScaleDegree::IV, ChordQuality::MinorSeventh, false),
    (8, ScaleDegree::VI, ChordQuality::DominantSeventh, true),
    (10, ScaleDegree::VII, ChordQuality::DominantSeventh, true),
    (1, ScaleDegree::II, ChordQuality::DominantSeventh, true),
];

/// Resolution text for each borrowed seventh, keyed by its unfigured label.
const BORROWED_SEVENTH_TARGETS: [(&str, &str); 4] =
    [("iv7", "V"), ("bVI7", "V"), ("bVII7", "I"), ("bII7", "V")];

/// Order in which secondary targets are tried.
const SECONDARY_TARGET_ORDER: [ScaleDegree; 6] = [
    ScaleDegree::V,
    ScaleDegree::II,
    ScaleDegree::IV,
    ScaleDegree::VI,
    ScaleDegree::III,
    ScaleDegree::VII,
];

/// A degree that can be tonicized, with its label text ("V", "ii", "VI").
#[derive(Debug, Clone)]
struct SecondaryTarget {
    root: u8,
    major: bool,
    label: &'static str,
}

fn secondary_targets(key: Key) -> Vec<SecondaryTarget> {
    SECONDARY_TARGET_ORDER
        .into_iter()
        .filter_map(|degree| {
            let n = degree.number();
            // The dominant is tonicized as a major triad in both modes.
            let quality = if degree == ScaleDegree::V {
                ChordQuality::Major
            } else {
                key.natural_triad(n)
            };
            if quality == ChordQuality::Diminished {
                return None;
            }
            let major = quality == ChordQuality::Major;
            Some(SecondaryTarget {
                root: key.degree_pc(n),
                major,
                label: if major {
                    degree.as_upper()
                } else {
                    degree.as_lower()
                },
            })
        })
        .collect()
}

/// Label one chord against `key`.
///
/// ```
/// use tonalis_analysis::labeler::{analyze, ChordContext};
/// use tonalis_theory::{HarmonyOptions, Key, PitchClassSet, TonalFunction};
///
/// let chord = analyze(
///     &PitchClassSet::from_pcs([7, 11, 2, 5]),
///     Key::major(0),
///     &HarmonyOptions::default(),
///     &ChordContext::default(),
/// );
/// assert_eq!(chord.roman_text, "V7");
/// assert_eq!(chord.function, TonalFunction::Dominant);
/// ```
pub fn analyze(
    pitch_classes: &PitchClassSet,
    key: Key,
    options: &HarmonyOptions,
    context: &ChordContext<'_>,
) -> AnalyzedChord {
    Labeler {
        pcs: *pitch_classes,
        key,
        options,
        bass: context.bass(),
        soprano: context.soprano(),
        token: context.token,
    }
    .run()
}

/// Label a chord with an optional voicing and no notation context.
pub fn analyze_voiced(
    pitch_classes: &PitchClassSet,
    key: Key,
    options: &HarmonyOptions,
    voicing: Option<&FourPartVoicing>,
) -> AnalyzedChord {
    let context = ChordContext {
        voicing,
        ..ChordContext::default()
    };
    analyze(pitch_classes, key, options, &context)
}

struct Labeler<'a> {
    pcs: PitchClassSet,
    key: Key,
    options: &'a HarmonyOptions,
    bass: Option<u8>,
    soprano: Option<u8>,
    token: Option<&'a str>,
}

impl Labeler<'_> {
    fn run(&self) -> AnalyzedChord {
        if let Some(chord) = self.diatonic() {
            return chord;
        }
        if let Some(chord) = self.secondary() {
            return chord;
        }
        if let Some(chord) = self.augmented_sixth() {
            return chord;
        }
        if let Some(chord) = self.borrowed() {
            return chord;
        }
        if let Some(chord) = self.dominant_ninth() {
            return chord;
        }

        log::trace!("no interpretation of {} in {}", self.pcs, self.key);
        AnalyzedChord::unmatched(
            self.pcs,
            self.bass,
            format!(
                "no Roman-numeral interpretation of {} in {}",
                self.pcs, self.key
            ),
        )
    }

    fn diatonic(&self) -> Option<AnalyzedChord> {
        let table: &[(i32, ScaleDegree, ChordQuality)] = match self.key.mode() {
            Mode::Major => &MAJOR_DIATONIC,
            Mode::Minor => &MINOR_DIATONIC,
        };
        table
            .iter()
            .map(|&(semitones, degree, quality)| {
                Template::new(self.key.pc_above_tonic(semitones), quality, degree)
            })
            .find(|t| t.pitch_classes() == self.pcs)
            .map(|t| self.label(&t, ""))
    }

    fn secondary(&self) -> Option<AnalyzedChord> {
        const QUALITIES: [(i32, ScaleDegree, ChordQuality); 5] = [
            (7, ScaleDegree::V, ChordQuality::Major),
            (7, ScaleDegree::V, ChordQuality::DominantSeventh),
            (11, ScaleDegree::VII, ChordQuality::Diminished),
            (11, ScaleDegree::VII, ChordQuality::HalfDiminishedSeventh),
            (11, ScaleDegree::VII, ChordQuality::DiminishedSeventh),
        ];

        let matches: Vec<(Template, SecondaryTarget)> = secondary_targets(self.key)
            .into_iter()
            .flat_map(|target| {
                QUALITIES.into_iter().map(move |(above, degree, quality)| {
                    let root = pc(target.root as i32 + above);
                    (Template::new(root, quality, degree), target.clone())
                })
            })
            .filter(|(t, _)| t.pitch_classes() == self.pcs)
            .collect();

        // A diminished seventh spells the leading-tone chord of several
        // targets; the one whose leading tone is in the bass wins.
        let chosen = matches
            .iter()
            .find(|(t, _)| {
                t.quality == ChordQuality::DiminishedSeventh && Some(t.root) == self.bass
            })
            .or_else(|| matches.first())?;

        let (template, target) = chosen;
        Some(self.label(template, &format!("/{}", target.label)))
    }

    fn augmented_sixth(&self) -> Option<AnalyzedChord> {
        let aug = AugmentedSixth::matching(&self.pcs, self.key)?;
        let flat_six = self.key.flat_six();
        let token_is_aug6 = self
            .token
            .map(|t| AugmentedSixth::from_token(t).is_some())
            .unwrap_or(false);

        let candidate = match self.bass {
            Some(bass) => bass == flat_six,
            None => !aug.has_mixture_reading() || token_is_aug6,
        };
        if !candidate {
            return None;
        }

        let chosen = if !aug.has_mixture_reading() {
            true
        } else {
            match self.soprano {
                Some(soprano) if soprano != flat_six => true,
                Some(_) if self.options.disallow_augmented_sixth_when_soprano_flat6 => false,
                _ if self
                    .options
                    .prefer_augmented_sixth_over_mixture_when_bass_flat6 =>
                {
                    true
                }
                _ if self
                    .options
                    .prefer_mixture_seventh_over_augmented_sixth_when_ambiguous =>
                {
                    false
                }
                _ => self.token.map(|_| token_is_aug6).unwrap_or(true),
            }
        };

        log::trace!(
            "{} with b6 bass in {}: {}",
            aug.token(),
            self.key,
            if chosen {
                "augmented sixth"
            } else {
                "mixture seventh"
            }
        );

        chosen.then(|| AnalyzedChord::labeled(aug.token(), None, None, self.pcs, self.bass))
    }

    fn borrowed(&self) -> Option<AnalyzedChord> {
        BORROWED
            .iter()
            .map(|&(semitones, degree, quality, flat)| {
                let t = Template::new(self.key.pc_above_tonic(semitones), quality, degree);
                if flat {
                    t.flat()
                } else {
                    t
                }
            })
            .find(|t| t.pitch_classes() == self.pcs)
            .map(|t| self.label(&t, ""))
    }

    fn dominant_ninth(&self) -> Option<AnalyzedChord> {
        let in_key = (self.key.pc_above_tonic(7), self.key.is_major(), String::new());
        let secondaries = secondary_targets(self.key)
            .into_iter()
            .map(|t| (pc(t.root as i32 + 7), t.major, format!("/{}", t.label)));

        std::iter::once(in_key)
            .chain(secondaries)
            .find(|(root, major, _)| {
                let ninth = if *major { 2 } else { 1 };
                let core = PitchClassSet::from_intervals(*root, &[0, 4, 10, ninth]);
                self.pcs == core || self.pcs == core.with(pc(*root as i32 + 7))
            })
            .map(|(_, _, suffix)| {
                let base = if self.options.prefer_v7_paren9_over_v9 {
                    "V7(9)"
                } else {
                    "V9"
                };
                AnalyzedChord::labeled(
                    format!("{}{}", base, suffix),
                    Some(RomanNumeral::upper(ScaleDegree::V)),
                    None,
                    self.pcs,
                    self.bass,
                )
            })
    }

    /// Figure a matched template against the bass and build the result.
    fn label(&self, template: &Template, suffix: &str) -> AnalyzedChord {
        let seventh = template.quality.is_seventh();
        let root_position = if seventh { Figure::Seven } else { Figure::Root };
        let mut warnings = Vec::new();

        let figure = match self.bass {
            None if template.is_neapolitan()
                && !seventh
                && self.options.enforce_neapolitan_first_inversion =>
            {
                Figure::Six
            }
            None => root_position,
            Some(bass) => {
                let inversion = template
                    .quality
                    .intervals()
                    .iter()
                    .position(|&i| pc(template.root as i32 + i) == bass);
                match inversion {
                    Some(inv) => Figure::for_inversion(inv, seventh).unwrap_or(root_position),
                    None => {
                        warnings.push(Advisory::BassNotChordTone { bass });
                        root_position
                    }
                }
            }
        };

        let text = format!(
            "{}{}{}",
            template.numeral_text(),
            self.figure_text(template.quality, figure),
            suffix
        );

        if self.options.warn_on_borrowed_chords && suffix.is_empty() {
            let unfigured = format!("{}{}", template.numeral_text(), if seventh { "7" } else { "" });
            if let Some(&(label, target)) = BORROWED_SEVENTH_TARGETS
                .iter()
                .find(|(label, _)| *label == unfigured && self.is_borrowed_in_key(template))
            {
                warnings.push(Advisory::BorrowedSeventhResolution { label, target });
            }
        }
        if template.is_neapolitan() && suffix.is_empty() {
            let first_inversion = if seventh {
                Figure::SixFive
            } else {
                Figure::Six
            };
            if figure != first_inversion {
                warnings.push(Advisory::NeapolitanNotFirstInversion);
            }
            warnings.push(Advisory::NeapolitanResolvesToDominant);
        }

        let mut chord = AnalyzedChord::labeled(
            text,
            Some(template.numeral()),
            Some(figure),
            self.pcs,
            self.bass,
        );
        chord.warnings = warnings.iter().map(ToString::to_string).collect();
        chord
    }

    /// Whether a template reached through the borrowed table is outside the
    /// key's own diatonic chords (iv7 is diatonic in minor).
    fn is_borrowed_in_key(&self, template: &Template) -> bool {
        template.flat || !self.key.is_diatonic(&template.pitch_classes())
    }

    fn figure_text(&self, quality: ChordQuality, figure: Figure) -> String {
        let major_seventh = quality == ChordQuality::MajorSeventh;
        match figure {
            Figure::Seven if major_seventh => "maj7".to_string(),
            Figure::SixFive | Figure::FourThree | Figure::FourTwo
                if major_seventh && self.options.include_maj_in_seventh_inversions =>
            {
                format!("maj{}", figure)
            }
            _ => figure.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tonalis_theory::TonalFunction;

    fn set(pcs: &[i32]) -> PitchClassSet {
        PitchClassSet::from_pcs(pcs.iter().copied())
    }

    fn label(pcs: &[i32], key: Key) -> AnalyzedChord {
        analyze(
            &set(pcs),
            key,
            &HarmonyOptions::default(),
            &ChordContext::default(),
        )
    }

    fn label_with_bass(pcs: &[i32], key: Key, bass: u8) -> AnalyzedChord {
        let context = ChordContext {
            bass_hint: Some(bass),
            ..ChordContext::default()
        };
        analyze(&set(pcs), key, &HarmonyOptions::default(), &context)
    }

    fn voiced(pcs: &[i32], key: Key, options: &HarmonyOptions, voicing: &str) -> AnalyzedChord {
        let v = FourPartVoicing::parse(voicing).unwrap();
        analyze_voiced(&set(pcs), key, options, Some(&v))
    }

    const C: Key = Key::major(0);

    #[test]
    fn test_dominant_seventh() {
        let chord = label(&[7, 11, 2, 5], C);
        assert!(chord.success);
        assert_eq!(chord.roman_text, "V7");
        assert_eq!(chord.function, TonalFunction::Dominant);
        assert_eq!(chord.figure, Some(Figure::Seven));
    }

    #[test]
    fn test_diatonic_triads_with_inversions() {
        assert_eq!(label(&[0, 4, 7], C).roman_text, "I");
        assert_eq!(label_with_bass(&[0, 4, 7], C, 4).roman_text, "I6");
        assert_eq!(label_with_bass(&[0, 4, 7], C, 7).roman_text, "I64");
        assert_eq!(label_with_bass(&[11, 2, 5], C, 2).roman_text, "vii°6");
        assert_eq!(label(&[2, 5, 9], C).function, TonalFunction::Subdominant);
    }

    #[test]
    fn test_seventh_inversions_and_symbols() {
        assert_eq!(label_with_bass(&[7, 11, 2, 5], C, 11).roman_text, "V65");
        assert_eq!(label_with_bass(&[7, 11, 2, 5], C, 2).roman_text, "V43");
        assert_eq!(label_with_bass(&[7, 11, 2, 5], C, 5).roman_text, "V42");
        assert_eq!(label(&[11, 2, 5, 9], C).roman_text, "viiø7");
        assert_eq!(label_with_bass(&[11, 2, 5, 8], C, 2).roman_text, "vii°65");
        assert_eq!(label(&[0, 4, 7, 11], C).roman_text, "Imaj7");
    }

    #[test]
    fn test_maj_in_inversions_is_optional() {
        assert_eq!(label_with_bass(&[5, 9, 0, 4], C, 9).roman_text, "IV65");
        let options = HarmonyOptions::default().with_include_maj_in_seventh_inversions(true);
        let context = ChordContext {
            bass_hint: Some(9),
            ..ChordContext::default()
        };
        let chord = analyze(&set(&[5, 9, 0, 4]), C, &options, &context);
        assert_eq!(chord.roman_text, "IVmaj65");
    }

    #[test]
    fn test_minor_key_diatonic() {
        let a = Key::minor(9);
        assert_eq!(label(&[4, 8, 11], a).roman_text, "V");
        assert_eq!(label(&[4, 7, 11], a).roman_text, "v");
        assert_eq!(label(&[7, 11, 2], a).roman_text, "VII");
        assert_eq!(label(&[8, 11, 2, 5], a).roman_text, "vii°7");
        assert_eq!(label(&[11, 2, 5, 9], a).roman_text, "iiø7");
        assert_eq!(label(&[5, 9, 0, 4], a).roman_text, "VImaj7");
    }

    #[test]
    fn test_secondary_dominants() {
        let chord = label(&[2, 6, 9, 0], C);
        assert_eq!(chord.roman_text, "V7/V");
        assert_eq!(chord.function, TonalFunction::Dominant);
        assert!(chord.is_secondary());
        assert_eq!(label_with_bass(&[2, 6, 9, 0], C, 6).roman_text, "V65/V");
        assert_eq!(label(&[9, 1, 4], C).roman_text, "V/ii");
        assert_eq!(label(&[0, 4, 7, 10], C).roman_text, "V7/IV");
        assert_eq!(label(&[6, 9, 0, 4], C).roman_text, "viiø7/V");
    }

    #[test]
    fn test_diatonic_chords_are_not_secondaries() {
        // C major triad is V/IV but must stay I.
        assert_eq!(label(&[0, 4, 7], C).roman_text, "I");
        // G major triad is V/V in F but plain V in C.
        assert_eq!(label(&[7, 11, 2], C).roman_text, "V");
    }

    #[test]
    fn test_diminished_seventh_target_follows_bass() {
        let dim7 = [6, 9, 0, 3];
        assert_eq!(label(&dim7, C).roman_text, "vii°7/V");
        assert_eq!(label_with_bass(&dim7, C, 6).roman_text, "vii°7/V");
        // D# is the leading tone of E (iii).
        assert_eq!(label_with_bass(&dim7, C, 3).roman_text, "vii°7/iii");
    }

    #[test]
    fn test_borrowed_chords() {
        assert_eq!(label(&[8, 0, 3], C).roman_text, "bVI");
        assert_eq!(label(&[5, 8, 0], C).roman_text, "iv");
        assert_eq!(label(&[10, 2, 5], C).roman_text, "bVII");
        let bvi = label(&[8, 0, 3], C);
        assert_eq!(bvi.roman, Some(RomanNumeral::upper(ScaleDegree::VI)));
        assert_eq!(bvi.function, TonalFunction::Tonic);
    }

    #[test]
    fn test_borrowed_seventh_warnings() {
        let chord = label(&[10, 2, 5, 8], C);
        assert_eq!(chord.roman_text, "bVII7");
        assert_eq!(chord.warnings, vec!["borrowed bVII7 usually resolves to I"]);

        let chord = label(&[5, 8, 0, 3], C);
        assert_eq!(chord.roman_text, "iv7");
        assert_eq!(chord.warnings, vec!["borrowed iv7 usually resolves to V"]);

        // iv7 is diatonic in minor: no advisory.
        let chord = label(&[2, 5, 9, 0], Key::minor(9));
        assert_eq!(chord.roman_text, "iv7");
        assert!(chord.warnings.is_empty());
    }

    #[test]
    fn test_neapolitan() {
        let n = label(&[1, 5, 8], C);
        assert_eq!(n.roman_text, "bII");
        assert_eq!(
            n.warnings,
            vec![
                Advisory::NeapolitanNotFirstInversion.to_string(),
                Advisory::NeapolitanResolvesToDominant.to_string(),
            ]
        );

        let n6 = label_with_bass(&[1, 5, 8], C, 5);
        assert_eq!(n6.roman_text, "bII6");
        assert_eq!(
            n6.warnings,
            vec![Advisory::NeapolitanResolvesToDominant.to_string()]
        );

        let options = HarmonyOptions::default().with_enforce_neapolitan_first_inversion(true);
        let chord = analyze(&set(&[1, 5, 8]), C, &options, &ChordContext::default());
        assert_eq!(chord.roman_text, "bII6");
        assert_eq!(chord.figure, Some(Figure::Six));
    }

    #[test]
    fn test_neapolitan_advisories_ignore_borrowed_flag() {
        let quiet = HarmonyOptions::default().with_warn_on_borrowed_chords(false);
        let n = analyze(&set(&[1, 5, 8]), C, &quiet, &ChordContext::default());
        assert_eq!(n.roman_text, "bII");
        assert_eq!(
            n.warnings,
            vec![
                Advisory::NeapolitanNotFirstInversion.to_string(),
                Advisory::NeapolitanResolvesToDominant.to_string(),
            ]
        );

        let context = ChordContext {
            bass_hint: Some(5),
            ..ChordContext::default()
        };
        let n6 = analyze(&set(&[1, 5, 8]), C, &quiet, &context);
        assert_eq!(n6.roman_text, "bII6");
        assert_eq!(
            n6.warnings,
            vec![Advisory::NeapolitanResolvesToDominant.to_string()]
        );
    }

    #[test]
    fn test_german_sixth_vs_mixture_seventh() {
        let ger = [8, 0, 3, 6];
        let options = HarmonyOptions::default();

        // Bass Ab, soprano Ab: mixture seventh.
        let chord = voiced(&ger, C, &options, "Ab4 Eb4 C4 Ab2");
        assert!(chord.roman_text.starts_with("bVI7"));

        // Bass Ab, soprano F#: augmented sixth.
        let chord = voiced(&ger, C, &options, "F#5 C5 Eb4 Ab2");
        assert_eq!(chord.roman_text, "Ger65");
        assert_eq!(chord.roman, None);
        assert_eq!(chord.function, TonalFunction::Unknown);
        assert_eq!(chord.figure, None);
    }

    #[test]
    fn test_augmented_sixth_flags() {
        let ger = [8, 0, 3, 6];
        let flat6_soprano = "Ab4 Eb4 C4 Ab2";

        let permissive = HarmonyOptions::default()
            .with_disallow_augmented_sixth_when_soprano_flat6(false)
            .with_prefer_augmented_sixth_over_mixture_when_bass_flat6(true);
        assert_eq!(voiced(&ger, C, &permissive, flat6_soprano).roman_text, "Ger65");

        let mixture = HarmonyOptions::default()
            .with_disallow_augmented_sixth_when_soprano_flat6(false)
            .with_prefer_mixture_seventh_over_augmented_sixth_when_ambiguous(true);
        assert_eq!(voiced(&ger, C, &mixture, flat6_soprano).roman_text, "bVI7");

        // No soprano, bass from the notation: the token decides.
        let options = HarmonyOptions::default();
        let context = ChordContext {
            bass_hint: Some(8),
            token: Some("bVI7"),
            ..ChordContext::default()
        };
        assert_eq!(analyze(&set(&ger), C, &options, &context).roman_text, "bVI7");
        let context = ChordContext {
            bass_hint: Some(8),
            token: Some("Ger65"),
            ..ChordContext::default()
        };
        assert_eq!(analyze(&set(&ger), C, &options, &context).roman_text, "Ger65");
        assert_eq!(label_with_bass(&ger, C, 8).roman_text, "Ger65");
    }

    #[test]
    fn test_german_set_without_flat6_bass_is_mixture() {
        assert_eq!(label(&[8, 0, 3, 6], C).roman_text, "bVI7");
        assert_eq!(label_with_bass(&[8, 0, 3, 6], C, 0).roman_text, "bVI65");
    }

    #[test]
    fn test_italian_and_french_sixths() {
        assert_eq!(label(&[8, 0, 6], C).roman_text, "It6");
        assert_eq!(label_with_bass(&[8, 0, 2, 6], C, 8).roman_text, "Fr43");
        // A non-b6 bass rules the augmented sixth out.
        assert!(!label_with_bass(&[8, 0, 6], C, 0).success);
    }

    #[test]
    fn test_dominant_ninths() {
        let ninth = [7, 11, 2, 5, 9];
        assert_eq!(label(&ninth, C).roman_text, "V9");
        let options = HarmonyOptions::default().with_prefer_v7_paren9_over_v9(true);
        let chord = analyze(&set(&ninth), C, &options, &ChordContext::default());
        assert_eq!(chord.roman_text, "V7(9)");
        assert_eq!(chord.figure, None);
        assert_eq!(chord.function, TonalFunction::Dominant);

        // Fifth omitted.
        assert_eq!(label(&[7, 11, 5, 9], C).roman_text, "V9");
        // Minor ninth in minor.
        assert_eq!(label(&[7, 11, 2, 5, 8], Key::minor(0)).roman_text, "V9");
        // Secondary ninth.
        assert_eq!(label(&[2, 6, 9, 0, 4], C).roman_text, "V9/V");
    }

    #[test]
    fn test_no_match() {
        let chord = label(&[0, 1, 2], C);
        assert!(!chord.success);
        assert!(chord.roman_text.is_empty());
        assert_eq!(chord.roman, None);
        assert_eq!(chord.function, TonalFunction::Unknown);
        assert_eq!(chord.errors.len(), 1);
        assert!(chord.errors[0].contains("{0,1,2}"));
        assert!(chord.errors[0].contains("C major"));
    }

    #[test]
    fn test_bass_outside_chord_warns() {
        let chord = label_with_bass(&[0, 4, 7], C, 2);
        assert_eq!(chord.roman_text, "I");
        assert_eq!(chord.figure, Some(Figure::Root));
        assert_eq!(chord.warnings.len(), 1);
    }

    #[test]
    fn test_figures_only_on_triads_and_sevenths() {
        for pcs in [vec![7, 11, 2, 5, 9], vec![8, 0, 6]] {
            let chord = label(&pcs, C);
            assert!(chord.success);
            assert_eq!(chord.figure, None);
        }
    }
}
