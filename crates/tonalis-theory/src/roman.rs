//! Roman numerals, tonal functions, chord qualities and inversion figures.

use serde::{Deserialize, Serialize};

/// Scale degree of a Roman numeral (I..VII).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScaleDegree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl ScaleDegree {
    /// All degrees, tonic first.
    pub const ALL: [ScaleDegree; 7] = [
        ScaleDegree::I,
        ScaleDegree::II,
        ScaleDegree::III,
        ScaleDegree::IV,
        ScaleDegree::V,
        ScaleDegree::VI,
        ScaleDegree::VII,
    ];

    /// 1-based degree number.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    /// Degree from a 1-based number.
    pub fn from_number(n: usize) -> Option<ScaleDegree> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Upper-case numeral text.
    pub fn as_upper(&self) -> &'static str {
        match self {
            ScaleDegree::I => "I",
            ScaleDegree::II => "II",
            ScaleDegree::III => "III",
            ScaleDegree::IV => "IV",
            ScaleDegree::V => "V",
            ScaleDegree::VI => "VI",
            ScaleDegree::VII => "VII",
        }
    }

    /// Lower-case numeral text.
    pub fn as_lower(&self) -> &'static str {
        match self {
            ScaleDegree::I => "i",
            ScaleDegree::II => "ii",
            ScaleDegree::III => "iii",
            ScaleDegree::IV => "iv",
            ScaleDegree::V => "v",
            ScaleDegree::VI => "vi",
            ScaleDegree::VII => "vii",
        }
    }

    /// Tonal function of the degree.
    pub fn function(&self) -> TonalFunction {
        match self {
            ScaleDegree::I | ScaleDegree::III | ScaleDegree::VI => TonalFunction::Tonic,
            ScaleDegree::II | ScaleDegree::IV => TonalFunction::Subdominant,
            ScaleDegree::V | ScaleDegree::VII => TonalFunction::Dominant,
        }
    }
}

/// A base Roman numeral: scale degree plus letter case.
///
/// Upper case denotes a major (or augmented) triad quality, lower case minor
/// or diminished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RomanNumeral {
    pub degree: ScaleDegree,
    pub upper: bool,
}

impl RomanNumeral {
    /// Create an upper-case numeral.
    pub fn upper(degree: ScaleDegree) -> Self {
        Self {
            degree,
            upper: true,
        }
    }

    /// Create a lower-case numeral.
    pub fn lower(degree: ScaleDegree) -> Self {
        Self {
            degree,
            upper: false,
        }
    }

    /// Tonal function (depends only on the degree).
    pub fn function(&self) -> TonalFunction {
        self.degree.function()
    }

    /// Numeral text in its case.
    pub fn as_str(&self) -> &'static str {
        if self.upper {
            self.degree.as_upper()
        } else {
            self.degree.as_lower()
        }
    }
}

impl std::fmt::Display for RomanNumeral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tonal function of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonalFunction {
    Tonic,
    Subdominant,
    Dominant,
    #[default]
    Unknown,
}

impl TonalFunction {
    /// Function of an optional numeral; no numeral yields `Unknown`.
    pub fn of(roman: Option<RomanNumeral>) -> TonalFunction {
        roman.map(|r| r.function()).unwrap_or(TonalFunction::Unknown)
    }
}

/// Chord quality with its interval template above the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    MajorSeventh,
    DominantSeventh,
    MinorSeventh,
    MinorMajorSeventh,
    HalfDiminishedSeventh,
    DiminishedSeventh,
}

impl ChordQuality {
    /// Semitone intervals above the root.
    pub fn intervals(&self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::MajorSeventh => &[0, 4, 7, 11],
            ChordQuality::DominantSeventh => &[0, 4, 7, 10],
            ChordQuality::MinorSeventh => &[0, 3, 7, 10],
            ChordQuality::MinorMajorSeventh => &[0, 3, 7, 11],
            ChordQuality::HalfDiminishedSeventh => &[0, 3, 6, 10],
            ChordQuality::DiminishedSeventh => &[0, 3, 6, 9],
        }
    }

    /// Whether the quality includes a seventh.
    pub fn is_seventh(&self) -> bool {
        self.intervals().len() == 4
    }

    /// Triad quality underlying a seventh chord (identity for triads).
    pub fn triad(&self) -> ChordQuality {
        match self {
            ChordQuality::Major | ChordQuality::MajorSeventh | ChordQuality::DominantSeventh => {
                ChordQuality::Major
            }
            ChordQuality::Minor | ChordQuality::MinorSeventh | ChordQuality::MinorMajorSeventh => {
                ChordQuality::Minor
            }
            ChordQuality::Diminished
            | ChordQuality::HalfDiminishedSeventh
            | ChordQuality::DiminishedSeventh => ChordQuality::Diminished,
        }
    }

    /// Seventh quality from a triad quality and a seventh interval.
    pub fn with_seventh(triad: ChordQuality, seventh: i32) -> Option<ChordQuality> {
        match (triad.triad(), seventh) {
            (ChordQuality::Major, 11) => Some(ChordQuality::MajorSeventh),
            (ChordQuality::Major, 10) => Some(ChordQuality::DominantSeventh),
            (ChordQuality::Minor, 10) => Some(ChordQuality::MinorSeventh),
            (ChordQuality::Minor, 11) => Some(ChordQuality::MinorMajorSeventh),
            (ChordQuality::Diminished, 10) => Some(ChordQuality::HalfDiminishedSeventh),
            (ChordQuality::Diminished, 9) => Some(ChordQuality::DiminishedSeventh),
            _ => None,
        }
    }

    /// Whether the numeral for this quality is written upper case.
    pub fn is_upper_case(&self) -> bool {
        self.triad() == ChordQuality::Major
    }

    /// Degree symbol written after the numeral ("°", "ø" or nothing).
    pub fn degree_symbol(&self) -> &'static str {
        match self {
            ChordQuality::Diminished | ChordQuality::DiminishedSeventh => "°",
            ChordQuality::HalfDiminishedSeventh => "ø",
            _ => "",
        }
    }

    /// Pitch classes of the chord on `root`.
    pub fn pitch_classes(&self, root: u8) -> crate::PitchClassSet {
        crate::PitchClassSet::from_intervals(root, self.intervals())
    }
}

/// Inversion figure (figured-bass suffix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Figure {
    /// Root-position triad (no figure).
    Root,
    /// First-inversion triad: 6.
    Six,
    /// Second-inversion triad: 64.
    SixFour,
    /// Root-position seventh: 7.
    Seven,
    /// First-inversion seventh: 65.
    SixFive,
    /// Second-inversion seventh: 43.
    FourThree,
    /// Third-inversion seventh: 42.
    FourTwo,
}

impl Figure {
    /// Figure text as written after the numeral.
    pub fn as_str(&self) -> &'static str {
        match self {
            Figure::Root => "",
            Figure::Six => "6",
            Figure::SixFour => "64",
            Figure::Seven => "7",
            Figure::SixFive => "65",
            Figure::FourThree => "43",
            Figure::FourTwo => "42",
        }
    }

    /// Inversion number (0 = root position).
    pub fn inversion(&self) -> usize {
        match self {
            Figure::Root | Figure::Seven => 0,
            Figure::Six | Figure::SixFive => 1,
            Figure::SixFour | Figure::FourThree => 2,
            Figure::FourTwo => 3,
        }
    }

    /// Whether this is a seventh-chord figure.
    pub fn is_seventh(&self) -> bool {
        matches!(
            self,
            Figure::Seven | Figure::SixFive | Figure::FourThree | Figure::FourTwo
        )
    }

    /// Figure for an inversion of a triad (`seventh == false`) or seventh chord.
    pub fn for_inversion(inversion: usize, seventh: bool) -> Option<Figure> {
        match (seventh, inversion) {
            (false, 0) => Some(Figure::Root),
            (false, 1) => Some(Figure::Six),
            (false, 2) => Some(Figure::SixFour),
            (true, 0) => Some(Figure::Seven),
            (true, 1) => Some(Figure::SixFive),
            (true, 2) => Some(Figure::FourThree),
            (true, 3) => Some(Figure::FourTwo),
            _ => None,
        }
    }
}

impl std::fmt::Display for Figure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
