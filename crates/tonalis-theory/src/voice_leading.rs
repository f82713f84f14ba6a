//! Four-part voice-leading predicates.
//!
//! These are advisory checks. The key estimator records them in its trace
//! when voicings are supplied; they never influence labeling or key choice.

use crate::voicing::FourPartVoicing;

/// Comfortable ranges (inclusive MIDI) for soprano, alto, tenor, bass.
pub const VOICE_RANGES: [(u8, u8); 4] = [(60, 81), (55, 74), (48, 69), (40, 62)];

/// Maximum distance between adjacent upper voices.
pub const MAX_UPPER_SPACING: u8 = 12;

fn direction(from: u8, to: u8) -> i32 {
    (to as i32 - from as i32).signum()
}

fn perfect_class(upper: u8, lower: u8) -> Option<u8> {
    let interval = upper.abs_diff(lower) % 12;
    match interval {
        0 | 7 => Some(interval),
        _ => None,
    }
}

/// Whether any voice pair moves in similar motion from a perfect fifth or
/// octave (unison) to the same perfect interval.
pub fn has_parallel_perfects(prev: &FourPartVoicing, next: &FourPartVoicing) -> bool {
    let a = prev.voices();
    let b = next.voices();
    for i in 0..4 {
        for j in (i + 1)..4 {
            let di = direction(a[i], b[i]);
            let dj = direction(a[j], b[j]);
            if di == 0 || di != dj {
                continue;
            }
            match (perfect_class(a[i], a[j]), perfect_class(b[i], b[j])) {
                (Some(x), Some(y)) if x == y => return true,
                _ => {}
            }
        }
    }
    false
}

/// Whether a voice moves past the previous position of an adjacent voice
/// (above the old upper voice or below the old lower voice).
pub fn has_overlap(prev: &FourPartVoicing, next: &FourPartVoicing) -> bool {
    let a = prev.voices();
    let b = next.voices();
    (0..3).any(|i| b[i + 1] > a[i] || b[i] < a[i + 1])
}

/// Whether soprano-alto or alto-tenor exceed an octave.
pub fn has_spacing_violations(voicing: &FourPartVoicing) -> bool {
    let v = voicing.voices();
    v[0].saturating_sub(v[1]) > MAX_UPPER_SPACING || v[1].saturating_sub(v[2]) > MAX_UPPER_SPACING
}

/// Whether any voice lies outside its range.
pub fn has_range_violation(voicing: &FourPartVoicing) -> bool {
    voicing
        .voices()
        .iter()
        .zip(VOICE_RANGES)
        .any(|(&pitch, (low, high))| pitch < low || pitch > high)
}
