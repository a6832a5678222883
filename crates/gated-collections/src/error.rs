//! Error types for gated collections

use thiserror::Error;

/// Errors raised while constructing or restoring gated collection parts.
///
/// Collection operations themselves never fail: absence is reported with
/// `false` or an empty iterator, and capacity overrun is only advisory.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid false positive rate: {fpr} (must be in (0, 0.5])")]
    InvalidFalsePositiveRate { fpr: f64 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}
