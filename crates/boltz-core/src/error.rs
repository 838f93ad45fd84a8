//! Error taxonomy for the boltz crates.
//!
//! There are no retries anywhere in this library: every numerical failure is
//! a hard stop for the computation that produced it, and the error carries
//! the offending values so the caller can dump them for debugging.

use thiserror::Error;

/// Result type used across the boltz crates.
pub type Result<T> = std::result::Result<T, BoltzError>;

/// Errors that can occur in model evaluation, sampling, and training.
#[derive(Debug, Error)]
pub enum BoltzError {
    /// A parameter or data vector disagrees with the declared layer sizes.
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// An accumulator (partition function, expectation sum, log-likelihood)
    /// became non-finite. Continuing would produce meaningless gradients.
    #[error("numerical overflow in {context}: {detail}")]
    NumericalOverflow { context: &'static str, detail: String },

    /// The continuous-hidden closed form for this quantity has not been
    /// derived. Calling it fails fast rather than returning a wrong number.
    #[error("closed form not derived for {0} with a continuous hidden domain")]
    NotDerived(&'static str),

    /// A sampling step was asked to draw from an invalid distribution
    /// (zero, negative, or non-finite local normalizer / weights).
    #[error("invalid sampling distribution for {context}: normalizer {normalizer}")]
    InvalidDistribution { context: &'static str, normalizer: f64 },

    /// Zero-size state spaces, non-positive cardinalities, and other
    /// construction-time misconfigurations.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested operation is not defined for this model's domains
    /// (e.g. exhaustive enumeration over a Gaussian visible layer).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Checkpoint (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Checkpoint file I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoltzError {
    /// Shorthand for a dimension-mismatch error.
    pub fn dims(what: &'static str, expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            got,
        }
    }

    /// Shorthand for a numerical-overflow error with a formatted detail dump.
    pub fn overflow(context: &'static str, detail: impl Into<String>) -> Self {
        Self::NumericalOverflow {
            context,
            detail: detail.into(),
        }
    }
}

/// Check that an accumulated value is still finite.
///
/// Called after every enumeration pass; a non-finite sum is fatal for the
/// computation and is surfaced as an error instead of a process abort.
pub fn ensure_finite(value: f64, context: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BoltzError::overflow(context, format!("accumulator = {value}")))
    }
}
