//! Property-based invariants for the parser, labeler, classifier and
//! estimator.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tonalis-tests --test proptest_invariants
//! ```

use proptest::prelude::*;

use tonalis_analysis::{
    analyze, analyze_with_detailed_cadences, estimate_per_chord, parse_progression, segment_keys,
    ChordContext, ParsedChord,
};
use tonalis_theory::{HarmonyOptions, Key, KeyEstimatorOptions, PitchClassSet, TonalFunction};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = Key> {
    (0u8..12, any::<bool>()).prop_map(|(tonic, major)| {
        if major {
            Key::major(tonic)
        } else {
            Key::minor(tonic)
        }
    })
}

/// Any non-empty pitch-class set.
fn arb_set() -> impl Strategy<Value = PitchClassSet> {
    (1u16..4096).prop_map(|mask| {
        PitchClassSet::from_pcs((0i32..12).filter(move |b| mask & (1u16 << *b) != 0))
    })
}

const TOKENS: [&str; 24] = [
    "I", "ii", "iii", "IV", "V", "vi", "vii°", "V7", "ii65", "I64", "IV6", "V43", "V65/V",
    "vii°7/V", "V7/IV", "bVI", "iv", "N6", "Ger65", "It6", "Fr43", "V9", "V7(9)", "viiø7",
];

fn arb_notation() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(&TOKENS[..]), 1..12)
}

fn arb_options() -> impl Strategy<Value = KeyEstimatorOptions> {
    (0usize..4, 0usize..6, 0.0f64..3.0, any::<bool>()).prop_map(|(window, lock, margin, trace)| {
        KeyEstimatorOptions::default()
            .with_window(window)
            .with_min_switch_index(lock)
            .with_switch_margin(margin)
            .with_collect_trace(trace)
    })
}

// ============================================================================
// Parser
// ============================================================================

proptest! {
    /// Arbitrary text never panics the parser.
    #[test]
    fn parser_never_panics(text in "\\PC{0,60}", key in arb_key()) {
        let _ = parse_progression(&text, key);
    }

    /// Well-formed tokens always parse, one chord per token.
    #[test]
    fn vocabulary_parses(tokens in arb_notation(), key in arb_key()) {
        let text = tokens.join("; ");
        let chords = parse_progression(&text, key);
        prop_assert!(chords.is_ok(), "failed on '{}': {:?}", text, chords.err());
        let chords = chords.unwrap();
        prop_assert_eq!(chords.len(), tokens.len());
        for chord in &chords {
            prop_assert!(chord.pitch_classes.len() >= 3);
            if let Some(bass) = chord.bass_hint {
                prop_assert!(chord.pitch_classes.contains(bass));
            }
        }
    }
}

// ============================================================================
// Labeler and classifier
// ============================================================================

proptest! {
    /// Success and failure results are internally consistent.
    #[test]
    fn labels_are_consistent(set in arb_set(), key in arb_key(), bass in proptest::option::of(0u8..12)) {
        let context = ChordContext { bass_hint: bass, ..ChordContext::default() };
        let chord = analyze(&set, key, &HarmonyOptions::default(), &context);
        prop_assert_eq!(chord.pitch_classes, set);
        if chord.success {
            prop_assert!(!chord.roman_text.is_empty());
            prop_assert!(chord.errors.is_empty());
        } else {
            prop_assert!(chord.roman_text.is_empty());
            prop_assert!(chord.roman.is_none());
            prop_assert_eq!(chord.function, TonalFunction::Unknown);
            prop_assert_eq!(chord.errors.len(), 1);
        }
        if chord.roman.is_none() {
            prop_assert_eq!(chord.function, TonalFunction::Unknown);
        }
    }

    /// Cadence records come out in strictly increasing order, one per
    /// transition at most.
    #[test]
    fn cadence_records_are_ordered(tokens in arb_notation(), show in any::<bool>()) {
        let key = Key::major(0);
        let chords = parse_progression(&tokens.join(";"), key).unwrap();
        let options = HarmonyOptions::default().with_show_non_cadential_six_four(show);
        let analysis = analyze_with_detailed_cadences(&chords, key, &options, &[]);

        prop_assert_eq!(analysis.chords.len(), chords.len());
        prop_assert!(analysis.cadences.len() < chords.len().max(1));
        for pair in analysis.cadences.windows(2) {
            prop_assert!(pair[0].index_from < pair[1].index_from);
        }
        for record in &analysis.cadences {
            prop_assert!(record.is_reportable());
            prop_assert!(record.index_from + 1 < chords.len());
        }
    }
}

// ============================================================================
// Estimator
// ============================================================================

proptest! {
    /// One key and one confidence in [0, 1] per chord, always.
    #[test]
    fn estimator_shape(
        sets in prop::collection::vec(arb_set(), 0..16),
        key in arb_key(),
        options in arb_options(),
    ) {
        let estimate = estimate_per_chord(&sets, key, &options, &[]);
        prop_assert_eq!(estimate.keys.len(), sets.len());
        prop_assert_eq!(estimate.confidences.len(), sets.len());
        for c in &estimate.confidences {
            prop_assert!((0.0..=1.0).contains(c));
        }
        let locked = options.min_switch_index.min(sets.len());
        prop_assert!(estimate.keys[..locked].iter().all(|k| *k == key));
        if options.collect_trace {
            prop_assert_eq!(estimate.trace.len(), sets.len());
        } else {
            prop_assert!(estimate.trace.is_empty());
        }
    }

    /// A lock at or past the end pins every chord to the initial key.
    #[test]
    fn full_lock(sets in prop::collection::vec(arb_set(), 1..12), key in arb_key(), extra in 0usize..4) {
        let options = KeyEstimatorOptions::default()
            .with_min_switch_index(sets.len() + extra)
            .with_collect_trace(true);
        let estimate = estimate_per_chord(&sets, key, &options, &[]);
        prop_assert!(estimate.keys.iter().all(|k| *k == key));
        prop_assert!(!estimate.trace[0].stayed);
        prop_assert!(estimate.trace[1..].iter().all(|t| t.stayed));
    }

    /// Segmentation never returns an empty list for non-empty input.
    #[test]
    fn segments_never_empty(
        sets in prop::collection::vec(arb_set(), 1..16),
        key in arb_key(),
        min_length in 0usize..20,
        min_confidence in 0.0f64..1.5,
    ) {
        let estimate = estimate_per_chord(&sets, key, &KeyEstimatorOptions::default(), &[]);
        let segments = segment_keys(&estimate.keys, &estimate.confidences, min_length, min_confidence);
        prop_assert!(!segments.is_empty());
        for s in &segments {
            prop_assert!(s.start <= s.end);
            prop_assert!(s.end < sets.len());
            prop_assert!((0.0..=1.0).contains(&s.confidence));
        }
    }

    /// Labels never depend on the estimator.
    #[test]
    fn keyed_labels_match_fixed_key_labels(sets in prop::collection::vec(arb_set(), 1..10), key in arb_key()) {
        let chords: Vec<ParsedChord> = sets.iter().copied().map(ParsedChord::from).collect();
        let keyed = tonalis_analysis::analyze_with_key_estimate(
            &chords,
            key,
            &HarmonyOptions::default(),
            &KeyEstimatorOptions::default(),
            &[],
        );
        let fixed = analyze_with_detailed_cadences(&chords, key, &HarmonyOptions::default(), &[]);
        prop_assert_eq!(keyed.chords, fixed.chords);
    }
}
