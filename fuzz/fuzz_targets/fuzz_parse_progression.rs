#![no_main]

use libfuzzer_sys::fuzz_target;
use tonalis_analysis::{analyze_with_detailed_cadences, parse_progression};
use tonalis_theory::{HarmonyOptions, Key};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let Some(key) = Key::all().nth(selector as usize % 24) else {
        return;
    };

    if let Ok(chords) = parse_progression(text, key) {
        let analysis = analyze_with_detailed_cadences(&chords, key, &HarmonyOptions::default(), &[]);
        assert_eq!(analysis.chords.len(), chords.len());
        for pair in analysis.cadences.windows(2) {
            assert!(pair[0].index_from < pair[1].index_from);
        }
    }
});
