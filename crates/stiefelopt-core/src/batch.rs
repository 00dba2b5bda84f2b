//! Batched matrix calculus over [`MatrixStack`]s.
//!
//! These are the per-slice building blocks of the product-manifold operators:
//!
//! - [`multitransp`]: transpose of every slice
//! - [`multiprod`]: slice-wise matrix product `Aᵢ · Bᵢ`
//! - [`multisym`]: symmetric part `(Mᵢ + Mᵢᵗ) / 2` of every square slice
//!
//! Slice `i` of the output only ever depends on slice `i` of the inputs.

use nalgebra::DMatrix;

use crate::{
    error::{ManifoldError, Result},
    stack::MatrixStack,
    types::{constants, Scalar},
};

/// Transposes every slice.
pub fn multitransp<T: Scalar>(a: &MatrixStack<T>) -> MatrixStack<T> {
    a.map(|s| s.transpose())
}

/// Slice-wise matrix product `Aᵢ · Bᵢ`.
///
/// # Errors
///
/// `DimensionMismatch` when the stacks hold a different number of slices or
/// when `ncols(A) != nrows(B)`.
pub fn multiprod<T: Scalar>(a: &MatrixStack<T>, b: &MatrixStack<T>) -> Result<MatrixStack<T>> {
    if a.ncols() != b.nrows() {
        return Err(ManifoldError::dimension_mismatch(
            format!("right operand with {} rows", a.ncols()),
            format!("{} rows", b.nrows()),
        ));
    }
    a.try_zip_map(b, |x, y| Ok(x * y))
}

/// Slice-wise product `Aᵢᵗ · Bᵢ` without materializing the transposes.
pub fn multiprod_tn<T: Scalar>(a: &MatrixStack<T>, b: &MatrixStack<T>) -> Result<MatrixStack<T>> {
    if a.nrows() != b.nrows() {
        return Err(ManifoldError::dimension_mismatch(
            format!("right operand with {} rows", a.nrows()),
            format!("{} rows", b.nrows()),
        ));
    }
    a.try_zip_map(b, |x, y| Ok(x.tr_mul(y)))
}

/// Symmetric part `(Mᵢ + Mᵢᵗ) / 2` of every slice.
///
/// # Errors
///
/// `DimensionMismatch` when the slices are not square.
pub fn multisym<T: Scalar>(m: &MatrixStack<T>) -> Result<MatrixStack<T>> {
    if m.nrows() != m.ncols() {
        return Err(ManifoldError::dimension_mismatch(
            "square slices",
            format!("{}x{}", m.nrows(), m.ncols()),
        ));
    }
    Ok(m.map(sym))
}

/// Symmetric part of a single square matrix.
pub fn sym<T: Scalar>(m: &DMatrix<T>) -> DMatrix<T> {
    (m + m.transpose()) * constants::half::<T>()
}
