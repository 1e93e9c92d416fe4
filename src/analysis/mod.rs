//! Result shaping and comparison.
//!
//! The normalizer turns service payloads into typed profiles; the
//! aggregator lines profiles up across subjects.

pub mod aggregator;
pub mod normalizer;

pub use aggregator::*;
pub use normalizer::{normalize, normalize_strict, parse_scoring_result};
