//! Tonalis Integration Test Infrastructure
//!
//! This crate holds the end-to-end tests for the analysis pipeline:
//!
//! - Cadences: notation → labels → cadence records
//! - Key estimation: hysteresis, locking, segmentation
//! - Property tests: parser and estimator invariants over random input
//! - **Determinism**: byte-identical serialized output across runs
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tonalis-tests
//! cargo test -p tonalis-tests --test proptest_invariants
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{
    analysis_bytes, compute_hash, verify_determinism, verify_hash_determinism, DeterminismResult,
    Divergence,
};
pub use fixtures::ProgressionFixture;
