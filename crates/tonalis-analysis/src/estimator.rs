//! Windowed per-chord key estimation with hysteresis.
//!
//! Every chord is scored against all 24 keys. The score combines diatonic
//! membership over a window of neighbouring chords with bonuses for
//! functional evidence at the current chord (dominants, cadences, pivots,
//! secondary dominants) and biases toward the previous and initial keys.
//! The estimate only leaves the previous key when the best candidate beats
//! it by more than `switch_margin`.
//!
//! # Algorithm
//!
//! 1. Score the 24 candidates for chord `i`
//! 2. Rank them with one strict total order
//! 3. Apply the lock (`min_switch_index`) and hysteresis
//! 4. Record confidence and, when enabled, a trace entry

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tonalis_theory::voice_leading::{
    has_overlap, has_parallel_perfects, has_range_violation, has_spacing_violations,
};
use tonalis_theory::{ChordQuality, FourPartVoicing, Key, KeyEstimatorOptions, Mode, PitchClassSet};

/// Scores within this distance count as tied.
const TIE_EPSILON: f64 = 1e-9;

/// Per-key breakdown of a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub key: Key,
    /// Diatonic hits across the window.
    pub base: f64,
    pub dominant: f64,
    pub cadence: f64,
    pub pivot: f64,
    pub secondary: f64,
    pub secondary_resolution: f64,
    /// Out-of-key penalty (stored as a positive amount, subtracted).
    pub penalty: f64,
    pub prev_key_bias: f64,
    pub initial_key_bias: f64,
    pub total: f64,
}

impl CandidateScore {
    fn sum(&mut self) {
        self.total = self.base
            + self.dominant
            + self.cadence
            + self.pivot
            + self.secondary
            + self.secondary_resolution
            - self.penalty
            + self.prev_key_bias
            + self.initial_key_bias;
    }
}

/// Advisory voice-leading flags for one voiced chord.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLeadingFlags {
    /// Parallel fifths or octaves from the previous voicing.
    pub parallel_perfects: bool,
    /// Voice overlap with the previous voicing.
    pub overlap: bool,
    pub spacing: bool,
    pub range: bool,
}

impl VoiceLeadingFlags {
    pub fn check(prev: Option<&FourPartVoicing>, voicing: &FourPartVoicing) -> Self {
        Self {
            parallel_perfects: prev.is_some_and(|p| has_parallel_perfects(p, voicing)),
            overlap: prev.is_some_and(|p| has_overlap(p, voicing)),
            spacing: has_spacing_violations(voicing),
            range: has_range_violation(voicing),
        }
    }

    pub fn any(&self) -> bool {
        self.parallel_perfects || self.overlap || self.spacing || self.range
    }
}

/// Diagnostic record of one estimator decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub index: usize,
    pub previous_key: Key,
    pub chosen_key: Key,
    /// All candidates in rank order; empty when scoring was skipped.
    pub candidates: Vec<CandidateScore>,
    pub best_score: f64,
    pub second_score: f64,
    /// The top-ranked key differed from the previous key but the estimate
    /// held (hysteresis or lock).
    pub stayed: bool,
    /// Keys tied with the best score, in rank order.
    pub tied_keys: Vec<Key>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_leading: Option<VoiceLeadingFlags>,
}

/// Estimated key and confidence for every chord.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    pub keys: Vec<Key>,
    pub confidences: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEntry>,
}

/// A maximal run of chords sharing one estimated key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeySegment {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    pub key: Key,
    /// Mean confidence over the run.
    pub confidence: f64,
}

impl KeySegment {
    /// Number of chords in the segment.
    pub fn chord_count(&self) -> usize {
        self.end + 1 - self.start
    }
}

/// A dominant and the triad it tonicizes.
#[derive(Debug, Clone, Copy)]
struct Secondary {
    triad: PitchClassSet,
    seventh: PitchClassSet,
    target: PitchClassSet,
}

/// Templates of one candidate key, built once per call.
#[derive(Debug, Clone, Copy)]
struct KeyProfile {
    key: Key,
    collection: PitchClassSet,
    tonic: PitchClassSet,
    dominant_triad: PitchClassSet,
    dominant_seventh: PitchClassSet,
    leading_tone_triad: PitchClassSet,
    leading_tone_seventh: PitchClassSet,
    secondaries: [Option<Secondary>; 6],
}

impl KeyProfile {
    fn new(key: Key) -> Self {
        let tonic_quality = match key.mode() {
            Mode::Major => ChordQuality::Major,
            Mode::Minor => ChordQuality::Minor,
        };
        let dominant = key.pc_above_tonic(7);
        let leading_tone = key.leading_tone();

        let mut secondaries = [None; 6];
        for (slot, degree) in secondaries.iter_mut().zip(2..=7usize) {
            let quality = if degree == 5 {
                ChordQuality::Major
            } else {
                key.natural_triad(degree)
            };
            if quality == ChordQuality::Diminished {
                continue;
            }
            let target_root = key.degree_pc(degree);
            let root = (target_root + 7) % 12;
            *slot = Some(Secondary {
                triad: ChordQuality::Major.pitch_classes(root),
                seventh: ChordQuality::DominantSeventh.pitch_classes(root),
                target: quality.pitch_classes(target_root),
            });
        }

        Self {
            key,
            collection: key.diatonic_collection(),
            tonic: tonic_quality.pitch_classes(key.tonic()),
            dominant_triad: ChordQuality::Major.pitch_classes(dominant),
            dominant_seventh: ChordQuality::DominantSeventh.pitch_classes(dominant),
            leading_tone_triad: ChordQuality::Diminished.pitch_classes(leading_tone),
            leading_tone_seventh: ChordQuality::DiminishedSeventh.pitch_classes(leading_tone),
            secondaries,
        }
    }

    fn is_diatonic(&self, set: &PitchClassSet) -> bool {
        set.is_subset(&self.collection)
    }

    fn is_cadential_dominant(&self, set: &PitchClassSet) -> bool {
        [
            self.dominant_triad,
            self.dominant_seventh,
            self.leading_tone_triad,
            self.leading_tone_seventh,
        ]
        .contains(set)
    }

    fn secondaries(&self) -> impl Iterator<Item = &Secondary> {
        self.secondaries.iter().flatten()
    }
}

/// Candidate key at canonical index `i` (see [`Key::index`]).
fn key_at(i: usize) -> Key {
    let mode = if i % 2 == 0 { Mode::Major } else { Mode::Minor };
    Key::new((i / 2) as u8, mode)
}

/// Rank order: total descending, then the previous key, then major over
/// minor, then lower tonic pitch class.
fn rank(a: &CandidateScore, b: &CandidateScore, previous: Key) -> Ordering {
    b.total
        .total_cmp(&a.total)
        .then_with(|| (b.key == previous).cmp(&(a.key == previous)))
        .then_with(|| b.key.is_major().cmp(&a.key.is_major()))
        .then_with(|| a.key.tonic().cmp(&b.key.tonic()))
}

struct Scorer<'a> {
    chords: &'a [PitchClassSet],
    initial_key: Key,
    options: &'a KeyEstimatorOptions,
    profiles: [KeyProfile; 24],
}

impl Scorer<'_> {
    /// Ranked candidates for chord `i` given the key chosen at `i - 1`.
    fn score(&self, i: usize, previous: Key) -> [CandidateScore; 24] {
        let o = self.options;
        let current = &self.chords[i];
        let prev_chord = i.checked_sub(1).map(|j| &self.chords[j]);
        let lo = i.saturating_sub(o.window);
        let hi = i.saturating_add(o.window).min(self.chords.len() - 1);
        let window = &self.chords[lo..=hi];

        let mut scores: [CandidateScore; 24] = std::array::from_fn(|k| {
            let p = &self.profiles[k];
            let mut s = CandidateScore {
                key: p.key,
                ..CandidateScore::default()
            };

            s.base = window
                .iter()
                .map(|c| c.intersection_len(&p.collection) as f64)
                .sum();

            if *current == p.dominant_triad {
                s.dominant = o.dominant_triad_bonus;
            } else if *current == p.dominant_seventh {
                s.dominant = o.dominant_seventh_bonus;
            }

            if let Some(prev) = prev_chord {
                if p.is_cadential_dominant(prev) && *current == p.tonic {
                    s.cadence = o.cadence_bonus;
                }
                if p.key != previous
                    && p.is_diatonic(current)
                    && self.profiles[previous.index()].is_diatonic(current)
                {
                    s.pivot = o.pivot_chord_bonus;
                }
                let resolves = p.secondaries().any(|sec| {
                    (*prev == sec.triad || *prev == sec.seventh)
                        && !p.is_diatonic(prev)
                        && *current == sec.target
                });
                if resolves {
                    s.secondary_resolution = o.secondary_resolution_bonus;
                }
            }

            if !p.is_diatonic(current) {
                for sec in p.secondaries() {
                    if *current == sec.triad {
                        s.secondary = o.secondary_dominant_triad_bonus;
                        break;
                    }
                    if *current == sec.seventh {
                        s.secondary = o.secondary_dominant_seventh_bonus;
                        break;
                    }
                }
            }

            s.penalty = o.out_of_key_penalty_per_pc * current.difference(&p.collection).len() as f64;
            if p.key == previous {
                s.prev_key_bias = o.prev_key_bias;
            }
            if p.key == self.initial_key {
                s.initial_key_bias = o.initial_key_bias;
            }
            s.sum();
            s
        });

        scores.sort_by(|a, b| rank(a, b, previous));
        scores
    }
}

#[derive(Debug, Clone, Copy)]
enum Decision {
    /// Before `min_switch_index`.
    Locked,
    /// The previous key ranked first.
    Kept,
    Switched,
    /// Another key ranked first but not by more than the margin.
    Held,
}

/// Confidence from the top two scores, in `[0, 1]`.
fn confidence(best: f64, second: f64) -> f64 {
    if best <= 0.0 {
        return 0.0;
    }
    ((best - second) / best).clamp(0.0, 1.0)
}

fn voice_leading_at(voicings: &[FourPartVoicing], i: usize) -> Option<VoiceLeadingFlags> {
    let voicing = voicings.get(i)?;
    let prev = i.checked_sub(1).and_then(|j| voicings.get(j));
    Some(VoiceLeadingFlags::check(prev, voicing))
}

/// Estimate a key for every chord.
///
/// Always returns exactly one key and one confidence per chord. `voicings`
/// only feeds the trace.
pub fn estimate_per_chord(
    chords: &[PitchClassSet],
    initial_key: Key,
    options: &KeyEstimatorOptions,
    voicings: &[FourPartVoicing],
) -> KeyEstimate {
    let n = chords.len();
    let mut estimate = KeyEstimate {
        keys: Vec::with_capacity(n),
        confidences: Vec::with_capacity(n),
        trace: Vec::new(),
    };
    if n == 0 {
        return estimate;
    }

    if options.min_switch_index >= n {
        log::debug!(
            "key locked to {} for all {} chords (min_switch_index={})",
            initial_key,
            n,
            options.min_switch_index
        );
        for i in 0..n {
            estimate.keys.push(initial_key);
            estimate.confidences.push(0.0);
            if options.collect_trace {
                estimate.trace.push(TraceEntry {
                    index: i,
                    previous_key: initial_key,
                    chosen_key: initial_key,
                    candidates: Vec::new(),
                    best_score: 0.0,
                    second_score: 0.0,
                    stayed: i > 0,
                    tied_keys: Vec::new(),
                    summary: "locked to initial key; scoring skipped".to_string(),
                    voice_leading: voice_leading_at(voicings, i),
                });
            }
        }
        return estimate;
    }

    let scorer = Scorer {
        chords,
        initial_key,
        options,
        profiles: std::array::from_fn(|k| KeyProfile::new(key_at(k))),
    };

    let mut previous = initial_key;
    for i in 0..n {
        let ranked = scorer.score(i, previous);
        let best = ranked[0];
        let second = ranked[1];
        let previous_total = ranked
            .iter()
            .find(|c| c.key == previous)
            .map(|c| c.total)
            .unwrap_or(f64::NEG_INFINITY);
        let lead = best.total - previous_total;

        let decision = if i < options.min_switch_index {
            Decision::Locked
        } else if best.key == previous {
            Decision::Kept
        } else if lead > options.switch_margin {
            log::debug!(
                "chord {}: switching {} -> {} (lead {:.2} > margin {:.2})",
                i,
                previous,
                best.key,
                lead,
                options.switch_margin
            );
            Decision::Switched
        } else {
            log::debug!(
                "chord {}: holding {} over {} (lead {:.2} <= margin {:.2})",
                i,
                previous,
                best.key,
                lead,
                options.switch_margin
            );
            Decision::Held
        };
        let (chosen, stayed) = match decision {
            Decision::Locked => (initial_key, i > 0),
            Decision::Kept => (previous, false),
            Decision::Switched => (best.key, false),
            Decision::Held => (previous, true),
        };

        estimate.keys.push(chosen);
        estimate.confidences.push(confidence(best.total, second.total));

        if options.collect_trace {
            let tied_keys: Vec<Key> = ranked
                .iter()
                .take_while(|c| (best.total - c.total).abs() <= TIE_EPSILON)
                .map(|c| c.key)
                .collect();
            let mut summary = match decision {
                Decision::Locked => format!(
                    "locked to {} before index {}",
                    initial_key, options.min_switch_index
                ),
                Decision::Kept => format!("kept {}", previous),
                Decision::Switched => format!(
                    "switched from {} to {} (lead {:.2} > margin {:.2})",
                    previous, best.key, lead, options.switch_margin
                ),
                Decision::Held => format!(
                    "stayed in {}: {} leads by {:.2} (margin {:.2})",
                    previous, best.key, lead, options.switch_margin
                ),
            };
            if tied_keys.len() > 1 {
                let names: Vec<String> = tied_keys.iter().map(Key::to_string).collect();
                summary.push_str(&format!("; tie between {}", names.join(", ")));
            }
            estimate.trace.push(TraceEntry {
                index: i,
                previous_key: previous,
                chosen_key: chosen,
                candidates: ranked.to_vec(),
                best_score: best.total,
                second_score: second.total,
                stayed,
                tied_keys,
                summary,
                voice_leading: voice_leading_at(voicings, i),
            });
        }

        previous = chosen;
    }

    estimate
}

/// Group consecutive equal keys into segments and filter them.
///
/// Segments shorter than `min_length` chords or with mean confidence below
/// `min_confidence` are dropped. If that drops everything, the first
/// unfiltered segment is returned alone. Only empty input yields an empty
/// list. Missing confidences count as 0.
pub fn segment_keys(
    keys: &[Key],
    confidences: &[f64],
    min_length: usize,
    min_confidence: f64,
) -> Vec<KeySegment> {
    let mut runs: Vec<KeySegment> = Vec::new();
    let mut start = 0;
    for i in 0..keys.len() {
        let last = i + 1 == keys.len();
        if last || keys[i + 1] != keys[i] {
            let sum: f64 = (start..=i)
                .map(|j| confidences.get(j).copied().unwrap_or(0.0))
                .sum();
            runs.push(KeySegment {
                start,
                end: i,
                key: keys[i],
                confidence: sum / (i + 1 - start) as f64,
            });
            start = i + 1;
        }
    }

    let kept: Vec<KeySegment> = runs
        .iter()
        .filter(|s| s.chord_count() >= min_length && s.confidence >= min_confidence)
        .copied()
        .collect();

    if kept.is_empty() {
        runs.into_iter().take(1).collect()
    } else {
        kept
    }
}
