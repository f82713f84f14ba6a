//! Cadence and six-four classification records.

use serde::{Deserialize, Serialize};

/// Kind of harmonic closure detected between two chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceType {
    #[default]
    None,
    Authentic,
    Plagal,
    Half,
    Deceptive,
}

/// Classification of a second-inversion triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SixFourType {
    #[default]
    None,
    Cadential,
    Passing,
    Pedal,
}

/// One detected transition.
///
/// A cadential six-four is attached to the cadence it decorates
/// (`has_cadential_six_four`), never emitted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CadenceInfo {
    /// Index of the first chord of the transition.
    pub index_from: usize,
    pub cadence_type: CadenceType,
    pub is_perfect_authentic: bool,
    pub has_cadential_six_four: bool,
    pub six_four: SixFourType,
}

impl CadenceInfo {
    /// An empty classification at `index_from`.
    pub fn none(index_from: usize) -> Self {
        Self {
            index_from,
            ..Self::default()
        }
    }

    /// A cadence of the given type.
    pub fn cadence(index_from: usize, cadence_type: CadenceType) -> Self {
        Self {
            index_from,
            cadence_type,
            ..Self::default()
        }
    }

    /// A non-cadence six-four record (`cadence_type == None`).
    pub fn six_four(index_from: usize, six_four: SixFourType) -> Self {
        Self {
            index_from,
            six_four,
            ..Self::default()
        }
    }

    /// Whether this record carries any classification worth reporting.
    pub fn is_reportable(&self) -> bool {
        self.cadence_type != CadenceType::None || self.six_four != SixFourType::None
    }

    /// Whether this is a cadence (any type other than `None`).
    pub fn is_cadence(&self) -> bool {
        self.cadence_type != CadenceType::None
    }
}
