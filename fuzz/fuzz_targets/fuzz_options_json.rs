#![no_main]

use libfuzzer_sys::fuzz_target;
use tonalis_theory::{FourPartVoicing, HarmonyOptions, KeyEstimatorOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(options) = HarmonyOptions::from_json(text) {
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(HarmonyOptions::from_json(&json).unwrap(), options);
    }
    // Accepted estimator options have already passed validation.
    if let Ok(options) = KeyEstimatorOptions::from_json(text) {
        assert!(options.validate().is_ok());
    }
    let _ = FourPartVoicing::parse(text);
});
