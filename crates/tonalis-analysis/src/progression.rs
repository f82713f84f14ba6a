//! Sequence-level analysis: labeling, cadences and key estimation together.
//!
//! Chords are always labeled against the fixed input key; the estimated
//! per-chord keys are reported alongside the labels, not fed back into them.

use serde::{Deserialize, Serialize};
use tonalis_theory::{
    AnalyzedChord, CadenceInfo, FourPartVoicing, HarmonyOptions, HarmonyPreset, Key,
    KeyEstimatorOptions, PitchClassSet, RomanNumeral, ScaleDegree,
};

use crate::cadence::detect_sequence;
use crate::error::NotationError;
use crate::estimator::{estimate_per_chord, segment_keys, KeySegment, TraceEntry};
use crate::labeler::{analyze, ChordContext};
use crate::notation::{parse_progression, ParsedChord};

/// Label written for a cadential six-four read as a dominant.
pub const CADENTIAL_SIX_FOUR_AS_DOMINANT: &str = "V64-53";

/// Labeled chords and their cadence records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionAnalysis {
    pub chords: Vec<AnalyzedChord>,
    pub cadences: Vec<CadenceInfo>,
}

impl ProgressionAnalysis {
    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// BLAKE3 hex digest of the compact JSON form.
    ///
    /// Identical inputs always produce identical fingerprints.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

/// Labeled chords with a per-chord key estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyedAnalysis {
    pub chords: Vec<AnalyzedChord>,
    pub keys: Vec<Key>,
    pub confidences: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEntry>,
}

/// Labeled chords with key segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulationAnalysis {
    pub chords: Vec<AnalyzedChord>,
    pub segments: Vec<KeySegment>,
    pub keys: Vec<Key>,
}

fn label_all(
    chords: &[ParsedChord],
    key: Key,
    options: &HarmonyOptions,
    voicings: &[FourPartVoicing],
) -> Vec<AnalyzedChord> {
    chords
        .iter()
        .enumerate()
        .map(|(i, chord)| {
            let context = ChordContext::for_parsed(chord, voicings.get(i));
            analyze(&chord.pitch_classes, key, options, &context)
        })
        .collect()
}

/// Label every chord and classify cadences.
///
/// `voicings[i]` belongs to `chords[i]`; missing entries leave a chord
/// unvoiced.
pub fn analyze_with_detailed_cadences(
    chords: &[ParsedChord],
    key: Key,
    options: &HarmonyOptions,
    voicings: &[FourPartVoicing],
) -> ProgressionAnalysis {
    let mut labeled = label_all(chords, key, options, voicings);
    let sequence = detect_sequence(&labeled, voicings, key, options);

    if options.prefer_cadential_six_four_as_dominant {
        for &i in &sequence.cadential_six_fours {
            if let Some(chord) = labeled.get_mut(i) {
                *chord = chord.with_label(
                    CADENTIAL_SIX_FOUR_AS_DOMINANT,
                    Some(RomanNumeral::upper(ScaleDegree::V)),
                );
            }
        }
    }

    ProgressionAnalysis {
        chords: labeled,
        cadences: sequence.cadences,
    }
}

fn pitch_classes(chords: &[ParsedChord]) -> Vec<PitchClassSet> {
    chords.iter().map(|c| c.pitch_classes).collect()
}

/// Label every chord against `initial_key` and estimate a key per chord.
pub fn analyze_with_key_estimate(
    chords: &[ParsedChord],
    initial_key: Key,
    harmony: &HarmonyOptions,
    estimator: &KeyEstimatorOptions,
    voicings: &[FourPartVoicing],
) -> KeyedAnalysis {
    let labeled = label_all(chords, initial_key, harmony, voicings);
    let estimate = estimate_per_chord(&pitch_classes(chords), initial_key, estimator, voicings);
    KeyedAnalysis {
        chords: labeled,
        keys: estimate.keys,
        confidences: estimate.confidences,
        trace: estimate.trace,
    }
}

/// [`analyze_with_key_estimate`] followed by key segmentation.
pub fn analyze_with_key_estimate_and_modulation(
    chords: &[ParsedChord],
    initial_key: Key,
    harmony: &HarmonyOptions,
    estimator: &KeyEstimatorOptions,
    voicings: &[FourPartVoicing],
    min_length: usize,
    min_confidence: f64,
) -> ModulationAnalysis {
    let keyed = analyze_with_key_estimate(chords, initial_key, harmony, estimator, voicings);
    let segments = segment_keys(&keyed.keys, &keyed.confidences, min_length, min_confidence);
    ModulationAnalysis {
        chords: keyed.chords,
        segments,
        keys: keyed.keys,
    }
}

/// Parse a `;`-separated progression and analyze it.
pub fn analyze_notation(
    text: &str,
    key: Key,
    options: &HarmonyOptions,
    voicings: &[FourPartVoicing],
) -> Result<ProgressionAnalysis, NotationError> {
    let chords = parse_progression(text, key)?;
    Ok(analyze_with_detailed_cadences(&chords, key, options, voicings))
}

/// Harmony and estimator configuration carried together.
///
/// ```
/// use tonalis_analysis::Analyzer;
/// use tonalis_theory::{CadenceType, HarmonyPreset, Key};
///
/// let analyzer = Analyzer::with_preset(HarmonyPreset::StrictPac);
/// let analysis = analyzer.notation("V; I", Key::major(0), &[]).unwrap();
/// assert_eq!(analysis.cadences[0].cadence_type, CadenceType::Authentic);
/// // no voicing, so the soprano cannot be checked
/// assert!(!analysis.cadences[0].is_perfect_authentic);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Analyzer {
    pub harmony: HarmonyOptions,
    pub estimator: KeyEstimatorOptions,
}

impl Analyzer {
    pub fn new(harmony: HarmonyOptions, estimator: KeyEstimatorOptions) -> Self {
        Self { harmony, estimator }
    }

    pub fn with_preset(preset: HarmonyPreset) -> Self {
        Self {
            harmony: preset.options(),
            estimator: KeyEstimatorOptions::default(),
        }
    }

    pub fn label(
        &self,
        pitch_classes: &PitchClassSet,
        key: Key,
        context: &ChordContext<'_>,
    ) -> AnalyzedChord {
        analyze(pitch_classes, key, &self.harmony, context)
    }

    pub fn cadences(
        &self,
        chords: &[ParsedChord],
        key: Key,
        voicings: &[FourPartVoicing],
    ) -> ProgressionAnalysis {
        analyze_with_detailed_cadences(chords, key, &self.harmony, voicings)
    }

    pub fn key_estimate(
        &self,
        chords: &[ParsedChord],
        initial_key: Key,
        voicings: &[FourPartVoicing],
    ) -> KeyedAnalysis {
        analyze_with_key_estimate(chords, initial_key, &self.harmony, &self.estimator, voicings)
    }

    pub fn modulation(
        &self,
        chords: &[ParsedChord],
        initial_key: Key,
        voicings: &[FourPartVoicing],
        min_length: usize,
        min_confidence: f64,
    ) -> ModulationAnalysis {
        analyze_with_key_estimate_and_modulation(
            chords,
            initial_key,
            &self.harmony,
            &self.estimator,
            voicings,
            min_length,
            min_confidence,
        )
    }

    pub fn notation(
        &self,
        text: &str,
        key: Key,
        voicings: &[FourPartVoicing],
    ) -> Result<ProgressionAnalysis, NotationError> {
        analyze_notation(text, key, &self.harmony, voicings)
    }
}
