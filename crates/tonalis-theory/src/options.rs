//! Analysis configuration: harmony labeling options and key estimator weights.
//!
//! Both bundles are plain values. They are built once (from defaults, a
//! preset, JSON, or the `with_*` builder methods) and passed by reference to
//! every analysis call; nothing reads a process-wide default.

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;

/// Named [`HarmonyOptions`] configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyPreset {
    /// Library defaults.
    #[default]
    Default,
    /// Perfect authentic cadences restricted to plain V→I with the tonic
    /// in the soprano.
    StrictPac,
    /// Textbook labeling: Neapolitan sixths, `maj` in seventh inversions,
    /// cadential six-four as a dominant, `V7(9)` ninths.
    Pedagogical,
}

impl HarmonyPreset {
    /// Returns the preset name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmonyPreset::Default => "default",
            HarmonyPreset::StrictPac => "strict_pac",
            HarmonyPreset::Pedagogical => "pedagogical",
        }
    }

    /// The option bundle for this preset.
    pub fn options(&self) -> HarmonyOptions {
        let base = HarmonyOptions::default();
        match self {
            HarmonyPreset::Default => base,
            HarmonyPreset::StrictPac => HarmonyOptions {
                strict_pac_plain_triads_only: true,
                strict_pac_require_soprano_tonic: true,
                strict_pac_disallow_dominant_extensions: true,
                ..base
            },
            HarmonyPreset::Pedagogical => HarmonyOptions {
                enforce_neapolitan_first_inversion: true,
                include_maj_in_seventh_inversions: true,
                prefer_cadential_six_four_as_dominant: true,
                prefer_v7_paren9_over_v9: true,
                ..base
            },
        }
    }
}

impl std::fmt::Display for HarmonyPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HarmonyPreset {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "default" => Ok(HarmonyPreset::Default),
            "strict_pac" | "strictpac" => Ok(HarmonyPreset::StrictPac),
            "pedagogical" => Ok(HarmonyPreset::Pedagogical),
            _ => Err(TheoryError::UnknownPreset {
                name: s.to_string(),
            }),
        }
    }
}

/// Labeling and cadence options.
///
/// Missing fields in JSON take their default; unknown fields are rejected.
///
/// ```
/// use tonalis_theory::{HarmonyOptions, HarmonyPreset};
///
/// let opts = HarmonyOptions::from_json(r#"{"prefer_v7_paren9_over_v9": true}"#).unwrap();
/// assert!(opts.prefer_v7_paren9_over_v9);
/// assert!(opts.show_non_cadential_six_four);
///
/// let strict = HarmonyOptions::preset(HarmonyPreset::StrictPac);
/// assert!(strict.strict_pac_require_soprano_tonic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarmonyOptions {
    /// Label a bII triad with no known bass as `bII6`.
    pub enforce_neapolitan_first_inversion: bool,
    /// Write `maj` in inverted major-seventh labels (`IVmaj65`).
    pub include_maj_in_seventh_inversions: bool,
    /// Label dominant ninths `V7(9)` instead of `V9`.
    pub prefer_v7_paren9_over_v9: bool,
    /// Read the b6-bass/b6-soprano set as a mixture seventh, not an augmented sixth.
    pub disallow_augmented_sixth_when_soprano_flat6: bool,
    /// Resolve otherwise ambiguous b6-bass sets as augmented sixths.
    pub prefer_augmented_sixth_over_mixture_when_bass_flat6: bool,
    /// Resolve otherwise ambiguous b6-bass sets as mixture sevenths.
    pub prefer_mixture_seventh_over_augmented_sixth_when_ambiguous: bool,
    /// Relabel the cadential I64 as `V64-53`.
    pub prefer_cadential_six_four_as_dominant: bool,
    /// Report passing and pedal six-fours.
    pub show_non_cadential_six_four: bool,
    /// PAC goal must be a plain tonic triad.
    pub strict_pac_plain_triads_only: bool,
    /// PAC goal must have the tonic in the soprano.
    pub strict_pac_require_soprano_tonic: bool,
    /// PAC soprano must move leading tone to tonic. Implies the soprano-tonic rule.
    pub strict_pac_require_soprano_leading_tone_resolution: bool,
    /// PAC dominant must be a plain `V` triad.
    pub strict_pac_disallow_dominant_extensions: bool,
    /// Leading-tone chords (vii°, viiø7, vii°7) act as dominants in cadences.
    pub treat_leading_tone_seventh_as_dominant: bool,
    /// Accept borrowed bVI as a deceptive goal.
    pub allow_deceptive_to_borrowed_submediant: bool,
    /// Attach resolution advisories to borrowed sevenths. Neapolitan
    /// advisories are attached regardless.
    pub warn_on_borrowed_chords: bool,
}

impl Default for HarmonyOptions {
    fn default() -> Self {
        Self {
            enforce_neapolitan_first_inversion: false,
            include_maj_in_seventh_inversions: false,
            prefer_v7_paren9_over_v9: false,
            disallow_augmented_sixth_when_soprano_flat6: true,
            prefer_augmented_sixth_over_mixture_when_bass_flat6: false,
            prefer_mixture_seventh_over_augmented_sixth_when_ambiguous: false,
            prefer_cadential_six_four_as_dominant: false,
            show_non_cadential_six_four: true,
            strict_pac_plain_triads_only: false,
            strict_pac_require_soprano_tonic: false,
            strict_pac_require_soprano_leading_tone_resolution: false,
            strict_pac_disallow_dominant_extensions: false,
            treat_leading_tone_seventh_as_dominant: true,
            allow_deceptive_to_borrowed_submediant: true,
            warn_on_borrowed_chords: true,
        }
    }
}

impl HarmonyOptions {
    /// Options for a named preset.
    pub fn preset(preset: HarmonyPreset) -> Self {
        preset.options()
    }

    /// Parses options from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether PAC requires the tonic in the goal soprano, directly or via
    /// the leading-tone resolution rule.
    pub fn requires_soprano_tonic(&self) -> bool {
        self.strict_pac_require_soprano_tonic
            || self.strict_pac_require_soprano_leading_tone_resolution
    }

    pub fn with_enforce_neapolitan_first_inversion(mut self, value: bool) -> Self {
        self.enforce_neapolitan_first_inversion = value;
        self
    }

    pub fn with_include_maj_in_seventh_inversions(mut self, value: bool) -> Self {
        self.include_maj_in_seventh_inversions = value;
        self
    }

    pub fn with_prefer_v7_paren9_over_v9(mut self, value: bool) -> Self {
        self.prefer_v7_paren9_over_v9 = value;
        self
    }

    pub fn with_disallow_augmented_sixth_when_soprano_flat6(mut self, value: bool) -> Self {
        self.disallow_augmented_sixth_when_soprano_flat6 = value;
        self
    }

    pub fn with_prefer_augmented_sixth_over_mixture_when_bass_flat6(mut self, value: bool) -> Self {
        self.prefer_augmented_sixth_over_mixture_when_bass_flat6 = value;
        self
    }

    pub fn with_prefer_mixture_seventh_over_augmented_sixth_when_ambiguous(
        mut self,
        value: bool,
    ) -> Self {
        self.prefer_mixture_seventh_over_augmented_sixth_when_ambiguous = value;
        self
    }

    pub fn with_prefer_cadential_six_four_as_dominant(mut self, value: bool) -> Self {
        self.prefer_cadential_six_four_as_dominant = value;
        self
    }

    pub fn with_show_non_cadential_six_four(mut self, value: bool) -> Self {
        self.show_non_cadential_six_four = value;
        self
    }

    pub fn with_strict_pac_plain_triads_only(mut self, value: bool) -> Self {
        self.strict_pac_plain_triads_only = value;
        self
    }

    pub fn with_strict_pac_require_soprano_tonic(mut self, value: bool) -> Self {
        self.strict_pac_require_soprano_tonic = value;
        self
    }

    pub fn with_strict_pac_require_soprano_leading_tone_resolution(mut self, value: bool) -> Self {
        self.strict_pac_require_soprano_leading_tone_resolution = value;
        self
    }

    pub fn with_strict_pac_disallow_dominant_extensions(mut self, value: bool) -> Self {
        self.strict_pac_disallow_dominant_extensions = value;
        self
    }

    pub fn with_treat_leading_tone_seventh_as_dominant(mut self, value: bool) -> Self {
        self.treat_leading_tone_seventh_as_dominant = value;
        self
    }

    pub fn with_allow_deceptive_to_borrowed_submediant(mut self, value: bool) -> Self {
        self.allow_deceptive_to_borrowed_submediant = value;
        self
    }

    pub fn with_warn_on_borrowed_chords(mut self, value: bool) -> Self {
        self.warn_on_borrowed_chords = value;
        self
    }
}

/// Scoring weights and switching policy for the key estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyEstimatorOptions {
    /// Chords on each side of the current chord counted in the base score.
    pub window: usize,
    /// Indices below this are locked to the initial key.
    pub min_switch_index: usize,
    pub prev_key_bias: f64,
    pub initial_key_bias: f64,
    /// Required lead of the best candidate over the previous key before switching.
    pub switch_margin: f64,
    pub out_of_key_penalty_per_pc: f64,
    pub dominant_triad_bonus: f64,
    pub dominant_seventh_bonus: f64,
    pub cadence_bonus: f64,
    pub pivot_chord_bonus: f64,
    pub secondary_dominant_triad_bonus: f64,
    pub secondary_dominant_seventh_bonus: f64,
    pub secondary_resolution_bonus: f64,
    /// Record a per-chord score trace.
    pub collect_trace: bool,
}

impl Default for KeyEstimatorOptions {
    fn default() -> Self {
        Self {
            window: 2,
            min_switch_index: 0,
            prev_key_bias: 1.0,
            initial_key_bias: 0.5,
            switch_margin: 1.0,
            out_of_key_penalty_per_pc: 1.0,
            dominant_triad_bonus: 1.0,
            dominant_seventh_bonus: 1.5,
            cadence_bonus: 2.0,
            pivot_chord_bonus: 0.5,
            secondary_dominant_triad_bonus: 0.25,
            secondary_dominant_seventh_bonus: 0.5,
            secondary_resolution_bonus: 0.5,
            collect_trace: false,
        }
    }
}

impl KeyEstimatorOptions {
    /// Parses options from JSON and validates them.
    pub fn from_json(json: &str) -> Result<Self, TheoryError> {
        let options: Self = serde_json::from_str(json).map_err(|e| TheoryError::InvalidOption {
            field: "json",
            reason: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks that every weight is finite and the switch margin is not negative.
    pub fn validate(&self) -> Result<(), TheoryError> {
        for (field, value) in self.weights() {
            if !value.is_finite() {
                return Err(TheoryError::InvalidOption {
                    field,
                    reason: format!("must be finite, got {}", value),
                });
            }
        }
        if self.switch_margin < 0.0 {
            return Err(TheoryError::InvalidOption {
                field: "switch_margin",
                reason: format!("must be >= 0, got {}", self.switch_margin),
            });
        }
        Ok(())
    }

    fn weights(&self) -> [(&'static str, f64); 11] {
        [
            ("prev_key_bias", self.prev_key_bias),
            ("initial_key_bias", self.initial_key_bias),
            ("switch_margin", self.switch_margin),
            ("out_of_key_penalty_per_pc", self.out_of_key_penalty_per_pc),
            ("dominant_triad_bonus", self.dominant_triad_bonus),
            ("dominant_seventh_bonus", self.dominant_seventh_bonus),
            ("cadence_bonus", self.cadence_bonus),
            ("pivot_chord_bonus", self.pivot_chord_bonus),
            (
                "secondary_dominant_triad_bonus",
                self.secondary_dominant_triad_bonus,
            ),
            (
                "secondary_dominant_seventh_bonus",
                self.secondary_dominant_seventh_bonus,
            ),
            ("secondary_resolution_bonus", self.secondary_resolution_bonus),
        ]
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_min_switch_index(mut self, index: usize) -> Self {
        self.min_switch_index = index;
        self
    }

    pub fn with_prev_key_bias(mut self, value: f64) -> Self {
        self.prev_key_bias = value;
        self
    }

    pub fn with_initial_key_bias(mut self, value: f64) -> Self {
        self.initial_key_bias = value;
        self
    }

    pub fn with_switch_margin(mut self, value: f64) -> Self {
        self.switch_margin = value;
        self
    }

    pub fn with_out_of_key_penalty_per_pc(mut self, value: f64) -> Self {
        self.out_of_key_penalty_per_pc = value;
        self
    }

    pub fn with_dominant_triad_bonus(mut self, value: f64) -> Self {
        self.dominant_triad_bonus = value;
        self
    }

    pub fn with_dominant_seventh_bonus(mut self, value: f64) -> Self {
        self.dominant_seventh_bonus = value;
        self
    }

    pub fn with_cadence_bonus(mut self, value: f64) -> Self {
        self.cadence_bonus = value;
        self
    }

    pub fn with_pivot_chord_bonus(mut self, value: f64) -> Self {
        self.pivot_chord_bonus = value;
        self
    }

    pub fn with_secondary_dominant_triad_bonus(mut self, value: f64) -> Self {
        self.secondary_dominant_triad_bonus = value;
        self
    }

    pub fn with_secondary_dominant_seventh_bonus(mut self, value: f64) -> Self {
        self.secondary_dominant_seventh_bonus = value;
        self
    }

    pub fn with_secondary_resolution_bonus(mut self, value: f64) -> Self {
        self.secondary_resolution_bonus = value;
        self
    }

    pub fn with_collect_trace(mut self, collect: bool) -> Self {
        self.collect_trace = collect;
        self
    }
}
