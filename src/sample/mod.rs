//! Positive and negative edge samplers.
//!
//! Both samplers treat an edge's identity as the unordered
//! (subject, object) pair: the underlying tables look directed, but for
//! holdout disjointness and duplicate detection the graph is undirected.

mod negative;
mod positive;

pub use negative::make_negative_edges;
pub use positive::make_positive_edges;

use crate::table::SchemaError;
use thiserror::Error;

/// Label written into the `predicate` and `relation` columns of held-out
/// positive edges
pub const POSITIVE_EDGE_LABEL: &str = "positive_edge";

/// Default label for sampled negative edges
pub const NEGATIVE_EDGE_LABEL: &str = "negative_edge";

/// Errors that can occur during sampling
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("train_fraction must be strictly between 0 and 1, got {0}")]
    InvalidFraction(f64),
}

/// Result type for sampling operations
pub type SampleResult<T> = Result<T, SampleError>;

/// Canonical key for an edge: the (subject, object) pair in sorted order
pub(crate) fn unordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_pair_is_direction_independent() {
        assert_eq!(unordered_pair("g1", "g2"), unordered_pair("g2", "g1"));
        assert_eq!(unordered_pair("g1", "g1"), ("g1".to_string(), "g1".to_string()));
    }
}
