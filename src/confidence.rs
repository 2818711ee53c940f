//! Synthetic confidence values
//!
//! The confidence shown in the overlay is a display-only placeholder, not a
//! model output. It is produced behind a trait so tests can pin it.

use rand::Rng;

/// Source of the displayed confidence percentage, in `[95.0, 99.0)`.
pub trait ConfidenceGenerator: Send + Sync {
    fn generate(&self) -> f64;
}

/// Production generator: uniform random in `[95.0, 99.0)`.
#[derive(Debug, Default)]
pub struct RandomConfidence;

impl ConfidenceGenerator for RandomConfidence {
    fn generate(&self) -> f64 {
        rand::thread_rng().gen_range(95.0..99.0)
    }
}

/// Deterministic generator for tests.
#[derive(Debug)]
pub struct FixedConfidence(pub f64);

impl ConfidenceGenerator for FixedConfidence {
    fn generate(&self) -> f64 {
        self.0
    }
}
