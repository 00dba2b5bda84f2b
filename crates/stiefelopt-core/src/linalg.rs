//! Dense linear-algebra kernels used by the manifold operators.
//!
//! The factorizations themselves come from nalgebra. This module fixes the
//! conventions the manifolds rely on (sign of the thin QR factor, finiteness
//! checks on kernel output) and hosts the Gaussian sampler so that every
//! random draw goes through an explicitly passed generator.

use nalgebra::DMatrix;
use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::{
    error::{ManifoldError, Result},
    types::Scalar,
};

/// Sign with `sign(0) = 0`, unlike `Float::signum` which maps `±0` to `±1`.
fn sign<T: Scalar>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Column multiplier applied to Q after a thin QR.
///
/// `sign(sign(r) + 1/2)` is `+1` for `r >= 0` and `-1` for `r < 0`, so a zero
/// diagonal entry of R never zeroes out a column of Q.
pub fn qr_column_sign<T: Scalar>(r_diag: T) -> T {
    sign(sign(r_diag) + <T as Scalar>::from_f64(0.5))
}

/// Orthonormal factor of the thin QR decomposition of an `n x p` matrix
/// (`n >= p`), with columns sign-normalized by [`qr_column_sign`].
///
/// Equivalent to `Q · diag(sign(sign(diag(R)) + 0.5))`.
///
/// # Errors
///
/// - `DimensionMismatch` if the matrix has more columns than rows.
/// - `NumericalError` if the input or the computed factor is not finite.
pub fn orthonormal_factor<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    let (n, p) = matrix.shape();
    if n < p {
        return Err(ManifoldError::dimension_mismatch(
            format!("at least {} rows for a thin QR", p),
            format!("{}x{}", n, p),
        ));
    }
    ensure_finite(matrix, "thin QR input")?;

    let qr = matrix.clone().qr();
    let r = qr.r();
    let mut q = qr.q();

    for (j, mut column) in q.column_iter_mut().enumerate() {
        let r_jj = r[(j, j)];
        if r_jj == T::zero() {
            log::warn!(
                "thin QR of a {}x{} matrix is rank deficient (R[{}, {}] = 0)",
                n,
                p,
                j,
                j
            );
        }
        column *= qr_column_sign(r_jj);
    }

    ensure_finite(&q, "thin QR factor")?;
    Ok(q)
}

/// Matrix exponential of a square matrix.
///
/// # Errors
///
/// - `DimensionMismatch` if the matrix is not square.
/// - `NumericalError` if the input or the result is not finite.
pub fn expm<T: Scalar>(matrix: &DMatrix<T>) -> Result<DMatrix<T>> {
    if !matrix.is_square() {
        return Err(ManifoldError::dimension_mismatch(
            "square matrix",
            format!("{}x{}", matrix.nrows(), matrix.ncols()),
        ));
    }
    ensure_finite(matrix, "matrix exponential input")?;
    let result = matrix.exp();
    ensure_finite(&result, "matrix exponential")?;
    Ok(result)
}

/// Draws an `nrows x ncols` matrix of independent standard-normal entries.
pub fn standard_normal<T, R>(nrows: usize, ncols: usize, rng: &mut R) -> DMatrix<T>
where
    T: Scalar,
    R: Rng + ?Sized,
{
    DMatrix::from_fn(nrows, ncols, |_, _| {
        let value: f64 = StandardNormal.sample(&mut *rng);
        <T as Scalar>::from_f64(value)
    })
}

/// Fails with `NumericalError` if any entry of `matrix` is NaN or infinite.
pub fn ensure_finite<T: Scalar>(matrix: &DMatrix<T>, what: &str) -> Result<()> {
    if matrix.iter().all(|v| <T as Float>::is_finite(*v)) {
        Ok(())
    } else {
        log::warn!("{} contains non-finite entries", what);
        Err(ManifoldError::numerical_error(format!(
            "{} contains non-finite entries",
            what
        )))
    }
}
