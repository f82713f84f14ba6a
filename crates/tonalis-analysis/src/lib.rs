//! Tonalis Analysis - Roman-Numeral Harmony Analysis
//!
//! The analysis pipeline over the [`tonalis_theory`] model:
//!
//! - [`notation`]: parse `;`-separated Roman-numeral progressions into
//!   pitch-class sets with bass hints
//! - [`labeler`]: label a pitch-class set in a key (diatonic, secondary,
//!   augmented sixth, borrowed, dominant ninth)
//! - [`cadence`]: classify cadences and six-four chords over a labeled
//!   sequence
//! - [`estimator`]: estimate a key per chord with hysteresis and segment
//!   the result into modulations
//! - [`progression`]: the sequence-level entry points and [`Analyzer`]
//!
//! Parsing is the only fallible stage. Labeling reports unmatched chords
//! with `success == false`; the classifier and estimator always produce a
//! result.
//!
//! # Example
//!
//! ```
//! use tonalis_analysis::analyze_notation;
//! use tonalis_theory::{CadenceType, HarmonyOptions, Key};
//!
//! let analysis = analyze_notation("I; IV; I64; V7; I", Key::major(0), &HarmonyOptions::default(), &[]).unwrap();
//! let labels: Vec<&str> = analysis.chords.iter().map(|c| c.roman_text.as_str()).collect();
//! assert_eq!(labels, ["I", "IV", "I64", "V7", "I"]);
//!
//! let cadence = &analysis.cadences[0];
//! assert_eq!(cadence.cadence_type, CadenceType::Authentic);
//! assert!(cadence.has_cadential_six_four);
//! ```

pub mod cadence;
pub mod error;
pub mod estimator;
pub mod labeler;
pub mod notation;
pub mod progression;

pub use cadence::{detect_detailed, detect_sequence, CadenceSequence, CadenceStep};
pub use error::NotationError;
pub use estimator::{
    estimate_per_chord, segment_keys, CandidateScore, KeyEstimate, KeySegment, TraceEntry,
    VoiceLeadingFlags,
};
pub use labeler::{analyze, analyze_voiced, Advisory, ChordContext};
pub use notation::{parse_chord, parse_progression, AugmentedSixth, ParsedChord};
pub use progression::{
    analyze_notation, analyze_with_detailed_cadences, analyze_with_key_estimate,
    analyze_with_key_estimate_and_modulation, Analyzer, KeyedAnalysis, ModulationAnalysis,
    ProgressionAnalysis,
};
