//! Determinism harness.
//!
//! Every Tonalis analysis is a pure function of its inputs, so serializing
//! the same analysis twice must give byte-identical JSON. These helpers run
//! an analysis several times, hash each output with BLAKE3 and report the
//! first byte where two runs diverge.
//!
//! ```
//! use tonalis_tests::determinism::{analysis_bytes, verify_determinism};
//! use tonalis_analysis::analyze_notation;
//! use tonalis_theory::{HarmonyOptions, Key};
//!
//! let result = verify_determinism(
//!     || {
//!         let analysis =
//!             analyze_notation("I; V7; I", Key::major(0), &HarmonyOptions::default(), &[]).unwrap();
//!         analysis_bytes(&analysis)
//!     },
//!     3,
//! );
//! assert!(result.is_deterministic);
//! ```

use std::fmt;

use serde::Serialize;

/// Outcome of running one analysis several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    pub is_deterministic: bool,
    pub runs: usize,
    /// Length of the first run's output.
    pub output_size: usize,
    /// BLAKE3 hex digest of the first run's output.
    pub hash: String,
    pub divergence: Option<Divergence>,
}

/// First point where a run's output differs from the first run's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub run_index: usize,
    pub offset: usize,
    /// Byte from the first run; `None` past its end.
    pub expected: Option<u8>,
    /// Byte from the diverging run; `None` past its end.
    pub actual: Option<u8>,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |b: Option<u8>| match b {
            Some(b) => format!("0x{:02X}", b),
            None => "end of output".to_string(),
        };
        write!(
            f,
            "run {} diverges at byte {}: expected {}, got {}",
            self.run_index,
            self.offset,
            byte(self.expected),
            byte(self.actual)
        )
    }
}

impl DeterminismResult {
    /// Panic with the divergence if the runs differed.
    pub fn assert_deterministic(&self) {
        if let Some(divergence) = &self.divergence {
            panic!(
                "non-deterministic analysis over {} runs ({} bytes, hash {}): {}",
                self.runs, self.output_size, self.hash, divergence
            );
        }
    }
}

/// BLAKE3 hex digest of `data`.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Compact JSON bytes of any serializable analysis result.
///
/// Panics if the value cannot be serialized; analysis results always can.
pub fn analysis_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("analysis results serialize to JSON")
}

fn first_divergence(expected: &[u8], actual: &[u8], run_index: usize) -> Option<Divergence> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;
    Some(Divergence {
        run_index,
        offset,
        expected: expected.get(offset).copied(),
        actual: actual.get(offset).copied(),
    })
}

/// Run `generate` `runs` times (at least 2) and compare every output with
/// the first.
pub fn verify_determinism<F, O>(generate: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "determinism needs at least 2 runs");

    let reference = generate();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    let divergence = (1..runs).find_map(|run_index| {
        let output = generate();
        first_divergence(reference, output.as_ref(), run_index)
    });

    DeterminismResult {
        is_deterministic: divergence.is_none(),
        runs,
        output_size: reference.len(),
        hash,
        divergence,
    }
}

/// Whether every hash in `hashes` is identical.
pub fn verify_hash_determinism(hashes: &[String]) -> bool {
    hashes.windows(2).all(|w| w[0] == w[1])
}

/// Define a `#[test]` that serializes an analysis several times and asserts
/// identical bytes.
///
/// The expression must evaluate to something `Serialize`.
///
/// ```ignore
/// test_determinism!(cadence_run, {
///     analyze_notation("I; V; I", Key::major(0), &HarmonyOptions::default(), &[]).unwrap()
/// });
/// test_determinism!(estimate_run, runs = 5, { estimate() });
/// ```
#[macro_export]
macro_rules! test_determinism {
    ($name:ident, runs = $runs:expr, $analysis:expr) => {
        #[test]
        fn $name() {
            $crate::determinism::verify_determinism(
                || $crate::determinism::analysis_bytes(&$analysis),
                $runs,
            )
            .assert_deterministic();
        }
    };
    ($name:ident, $analysis:expr) => {
        $crate::test_determinism!($name, runs = 3, $analysis);
    };
}
