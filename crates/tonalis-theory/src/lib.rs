//! Tonalis Theory - Shared Tonal Harmony Model
//!
//! This crate defines the value types every Tonalis analysis stage shares:
//!
//! - [`Key`] and [`Mode`]: tonic pitch class plus major/minor
//! - [`PitchClassSet`]: a chord's identity for matching (12-bit set)
//! - [`FourPartVoicing`]: SATB pitches, read for bass and soprano
//! - [`RomanNumeral`], [`TonalFunction`], [`ChordQuality`], [`Figure`]
//! - [`AnalyzedChord`]: the labeler's per-chord result
//! - [`CadenceInfo`]: cadence and six-four records
//! - [`HarmonyOptions`] and [`KeyEstimatorOptions`]: immutable configuration
//!
//! The model carries no analysis logic beyond scale arithmetic and the
//! advisory [`voice_leading`] predicates.
//!
//! # Example
//!
//! ```
//! use tonalis_theory::{Key, PitchClassSet};
//!
//! let key: Key = "G major".parse().unwrap();
//! let d_major = PitchClassSet::from_pcs([2, 6, 9]);
//! assert!(key.is_diatonic(&d_major));
//! assert_eq!(d_major.to_string(), "{2,6,9}");
//! ```

pub mod cadence;
pub mod chord;
pub mod error;
pub mod key;
pub mod options;
pub mod pitch;
pub mod roman;
pub mod voice_leading;
pub mod voicing;

pub use cadence::{CadenceInfo, CadenceType, SixFourType};
pub use chord::AnalyzedChord;
pub use error::{TheoryError, TonalisError};
pub use key::{Key, Mode};
pub use options::{HarmonyOptions, HarmonyPreset, KeyEstimatorOptions};
pub use pitch::{pc, PitchClassSet};
pub use roman::{ChordQuality, Figure, RomanNumeral, ScaleDegree, TonalFunction};
pub use voicing::FourPartVoicing;
