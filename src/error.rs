//! Error taxonomy for the segmentation pipeline.
//!
//! None of these are fatal to a caller. The orchestrator absorbs every
//! variant: a failing semantic strategy triggers the windowed fallback, a
//! failing fallback triggers a single truncated chunk, and budget or
//! input-range conditions are downgraded to warnings with a partial but
//! valid result.

use thiserror::Error;

/// Errors surfaced while planning a segmentation strategy.
///
/// The built-in strategies only fail at plan time, before any chunk has been
/// emitted; a stream they return is infallible. Custom strategies may use
/// the full taxonomy.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The global or per-tier chunk budget was exhausted.
    #[error("chunk budget of {limit} exhausted")]
    BudgetExceeded {
        /// The budget that was hit
        limit: usize,
    },

    /// A strategy could not produce a usable plan for the input.
    #[error("{strategy} strategy failed: {reason}")]
    StrategyFailure {
        /// Name of the failing strategy
        strategy: &'static str,
        /// Human-readable failure description
        reason: String,
    },

    /// An internal consistency check tripped: boundary offsets out of order
    /// or a span outside the text.
    #[error("inconsistent boundary plan: {0}")]
    InvalidPlan(String),

    /// A caller-provided parameter was outside the valid range.
    #[error("input out of range: {0}")]
    InputOutOfRange(String),

    /// Catch-all for unexpected internal failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SegmentError::StrategyFailure {
            strategy: "semantic",
            reason: "no sections".to_string(),
        };
        assert_eq!(err.to_string(), "semantic strategy failed: no sections");

        let err = SegmentError::BudgetExceeded { limit: 5000 };
        assert_eq!(err.to_string(), "chunk budget of 5000 exhausted");
    }

    #[test]
    fn test_from_anyhow() {
        let err: SegmentError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, SegmentError::Other(_)));
    }
}
