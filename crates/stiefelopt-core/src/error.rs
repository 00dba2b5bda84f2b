//! Error types for Stiefel manifold operations.
//!
//! Every failure a manifold operator can produce is a variant of
//! [`ManifoldError`]. Variants are kept distinguishable so that a consuming
//! optimizer can decide, for example, to shrink its step after a
//! [`ManifoldError::NumericalError`] while treating
//! [`ManifoldError::InvalidDimension`] as fatal.

use thiserror::Error;

/// Errors that can occur during manifold construction and manifold operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifoldError {
    /// The manifold parameters are invalid.
    ///
    /// Raised at construction time when the requested shape does not describe
    /// a Stiefel manifold (for instance `n < p`, `p == 0` or `k == 0`).
    #[error("Invalid manifold dimension: {reason}")]
    InvalidDimension {
        /// Description of the violated constraint
        reason: String,
    },

    /// Dimension mismatch between operands.
    ///
    /// Raised when a point, tangent vector or ambient matrix stack does not
    /// have the shape expected by the manifold or by another operand.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Numerical failure in a dense linear-algebra kernel.
    ///
    /// The QR factorization or matrix exponential produced non-finite values,
    /// or a normalization hit a zero norm.
    #[error("Numerical failure: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// Operation not implemented for this manifold.
    #[error("Feature not implemented: {feature}")]
    NotImplemented {
        /// Name of the unimplemented feature
        feature: String,
    },
}

impl ManifoldError {
    /// Create an InvalidDimension error with a custom reason.
    pub fn invalid_dimension<S: Into<String>>(reason: S) -> Self {
        Self::InvalidDimension {
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create a NotImplemented error for a specific feature.
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }
}

/// Result type alias for operations that can produce ManifoldError.
pub type Result<T> = std::result::Result<T, ManifoldError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_creation() {
        let err = ManifoldError::invalid_dimension("n must be >= p");
        assert!(matches!(err, ManifoldError::InvalidDimension { .. }));
        assert_eq!(err.to_string(), "Invalid manifold dimension: n must be >= p");

        let err = ManifoldError::dimension_mismatch("(1, 5, 2)", "(1, 4, 2)");
        assert!(matches!(err, ManifoldError::DimensionMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected (1, 5, 2), got (1, 4, 2)"
        );
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            ManifoldError::invalid_dimension("k must be >= 1"),
            ManifoldError::dimension_mismatch("3 slices", "2 slices"),
            ManifoldError::numerical_error("matrix exponential overflowed"),
            ManifoldError::not_implemented("logarithmic map"),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_errors_are_distinguishable() {
        let not_impl = ManifoldError::not_implemented("distance");
        let numeric = ManifoldError::numerical_error("singular input");
        assert_ne!(not_impl, numeric);
        assert_eq!(not_impl, ManifoldError::not_implemented("distance"));
    }
}
