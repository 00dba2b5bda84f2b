//! Type definitions and aliases for Stiefel optimization.
//!
//! This module provides the [`Scalar`] trait bounding every numeric
//! computation in the workspace, the matrix aliases used for individual
//! slices, and the tolerance constants consumers use for membership checks.

use nalgebra::{Dyn, OMatrix, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in manifold computations (f32 or f64).
///
/// This trait combines all the numeric traits required by the dense kernels
/// (QR factorization, matrix exponential) and the manifold operators.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Tolerance for checking if a point is on the manifold.
    const MANIFOLD_TOLERANCE: Self;

    /// Tolerance for checking tangency (skew-symmetry of XᵗU).
    const ORTHOGONALITY_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert from usize (for dimension-derived quantities).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const MANIFOLD_TOLERANCE: Self = 1e-5;
    const ORTHOGONALITY_TOLERANCE: Self = 1e-5;
}

impl Scalar for f64 {
    const MANIFOLD_TOLERANCE: Self = 1e-10;
    const ORTHOGONALITY_TOLERANCE: Self = 1e-10;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;

    /// Get manifold membership tolerance.
    pub fn manifold_tolerance<T: Scalar>() -> T {
        T::MANIFOLD_TOLERANCE
    }

    /// Get orthogonality checking tolerance.
    pub fn orthogonality_tolerance<T: Scalar>() -> T {
        T::ORTHOGONALITY_TOLERANCE
    }

    /// One half, used by the symmetric-part operator.
    pub fn half<T: Scalar>() -> T {
        <T as Scalar>::from_f64(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_trait_f64() {
        assert!(f64::MANIFOLD_TOLERANCE > 0.0);
        assert!(f64::ORTHOGONALITY_TOLERANCE > 0.0);
    }

    #[test]
    fn test_scalar_conversions() {
        let val_f64 = 3.14159;
        let val_f32 = <f32 as Scalar>::from_f64(val_f64);
        assert_relative_eq!(val_f32 as f64, val_f64, epsilon = 1e-6);

        assert_eq!(<f64 as Scalar>::from_usize(7), 7.0);
        assert_eq!(<f32 as Scalar>::from_usize(12), 12.0);
    }

    #[test]
    fn test_constants() {
        assert_eq!(constants::manifold_tolerance::<f64>(), 1e-10);
        assert_eq!(constants::orthogonality_tolerance::<f32>(), 1e-5);
        assert_relative_eq!(constants::half::<f64>(), 0.5);
    }

    #[test]
    fn test_tolerance_ordering() {
        assert!(f64::EPSILON < f64::MANIFOLD_TOLERANCE);
        assert!(f32::EPSILON < f32::MANIFOLD_TOLERANCE);
        assert!(f64::MANIFOLD_TOLERANCE < f32::MANIFOLD_TOLERANCE as f64);
    }
}
