//! Error taxonomy for grid construction, lookup, and normalisation.

use thiserror::Error;

/// Errors returned by [`Grid`](crate::Grid) operations.
///
/// All variants are local precondition violations: nothing is transient, so
/// nothing is retried. A failed operation leaves the grid untouched.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Malformed parameters: bin count, standard deviation, mass, quantile
    /// level, likelihood value, or a domain that is empty, non-finite, or not
    /// strictly increasing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A queried or assigned value lies outside `[min, max]`.
    #[error("value {value} is outside the domain [{min}, {max}]")]
    OutOfDomain { value: f64, min: f64, max: f64 },

    /// Total mass is zero or non-finite, so there is nothing to rescale.
    #[error("degenerate distribution: total mass is {total}")]
    DegenerateDistribution { total: f64 },
}

impl GridError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
