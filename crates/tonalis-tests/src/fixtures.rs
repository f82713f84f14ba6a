//! Named progressions shared by the integration tests.

use tonalis_analysis::{parse_progression, ParsedChord};
use tonalis_theory::{FourPartVoicing, Key, PitchClassSet};

/// A progression in Roman-numeral notation with optional SATB voicings.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionFixture {
    pub name: &'static str,
    pub key: &'static str,
    pub notation: &'static str,
    /// One "S A T B" string per chord, or empty.
    pub voicings: &'static [&'static str],
}

impl ProgressionFixture {
    pub fn key(&self) -> Key {
        self.key.parse().expect("fixture key parses")
    }

    pub fn chords(&self) -> Vec<ParsedChord> {
        parse_progression(self.notation, self.key()).expect("fixture notation parses")
    }

    pub fn voicings(&self) -> Vec<FourPartVoicing> {
        self.voicings
            .iter()
            .map(|v| FourPartVoicing::parse(v).expect("fixture voicing parses"))
            .collect()
    }
}

/// I64 → V → I with the tonic in the soprano.
pub const CADENTIAL_SIX_FOUR: ProgressionFixture = ProgressionFixture {
    name: "cadential_six_four",
    key: "C major",
    notation: "I64; V; I",
    voicings: &["C5 G4 E4 G2", "B4 G4 D4 G2", "C5 G4 E4 C3"],
};

/// IV → IV64 → IV6: bass F, C, A.
pub const PASSING_SIX_FOUR: ProgressionFixture = ProgressionFixture {
    name: "passing_six_four",
    key: "C major",
    notation: "IV; IV64; IV6",
    voicings: &[],
};

/// IV → IV64 → IV: bass F, C, F.
pub const PEDAL_SIX_FOUR: ProgressionFixture = ProgressionFixture {
    name: "pedal_six_four",
    key: "C major",
    notation: "IV; IV64; IV",
    voicings: &[],
};

/// A phrase with a secondary dominant, a Neapolitan and a deceptive cadence.
pub const CHROMATIC_PHRASE: ProgressionFixture = ProgressionFixture {
    name: "chromatic_phrase",
    key: "A minor",
    notation: "i; iv6; bII6; V7; VI; V65/V; V; i",
    voicings: &[],
};

/// Borrowed and augmented-sixth chords.
pub const MIXTURE_PHRASE: ProgressionFixture = ProgressionFixture {
    name: "mixture_phrase",
    key: "C major",
    notation: "I; bVI; iv; Ger65; I64; V7; I",
    voicings: &[],
};

/// Every named fixture.
pub const ALL: [ProgressionFixture; 5] = [
    CADENTIAL_SIX_FOUR,
    PASSING_SIX_FOUR,
    PEDAL_SIX_FOUR,
    CHROMATIC_PHRASE,
    MIXTURE_PHRASE,
];

fn set(pcs: &[i32]) -> PitchClassSet {
    PitchClassSet::from_pcs(pcs.iter().copied())
}

/// C major (I V I) moving through a G major chord to D major (D A7 D A7 D).
pub fn modulating_chords() -> Vec<PitchClassSet> {
    vec![
        set(&[0, 4, 7]),
        set(&[7, 11, 2]),
        set(&[0, 4, 7]),
        set(&[2, 6, 9]),
        set(&[9, 1, 4, 7]),
        set(&[2, 6, 9]),
        set(&[9, 1, 4, 7]),
        set(&[2, 6, 9]),
    ]
}
