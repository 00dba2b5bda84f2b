//! Ordered stacks of equally-shaped matrices.
//!
//! A point of the product manifold St(n,p)^k, a tangent vector at such a
//! point, and a Euclidean gradient are all represented by a [`MatrixStack`]:
//! a non-empty sequence of `k` matrices that share one shape. The single
//! manifold St(n,p) is the `k = 1` case, so every operator is written once
//! over the slice sequence.
//!
//! Slice order is significant. Every operation in this module maps slice `i`
//! of its inputs to slice `i` of its output.

use nalgebra::DMatrix;
use num_traits::Float;
use std::ops::{Index, Mul, Neg};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ManifoldError, Result},
    types::Scalar,
};

/// A non-empty ordered sequence of matrices with identical shape.
///
/// The shape of a stack is reported as `(k, nrows, ncols)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        try_from = "Vec<DMatrix<T>>",
        into = "Vec<DMatrix<T>>",
        bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>")
    )
)]
pub struct MatrixStack<T: Scalar> {
    slices: Vec<DMatrix<T>>,
}

impl<T: Scalar> MatrixStack<T> {
    /// Builds a stack from its slices.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `slices` is empty or if the slices do
    /// not all share the shape of the first one.
    pub fn new(slices: Vec<DMatrix<T>>) -> Result<Self> {
        let Some(first) = slices.first() else {
            return Err(ManifoldError::dimension_mismatch(
                "at least one slice",
                "empty stack",
            ));
        };
        let shape = first.shape();
        if let Some((i, bad)) = slices
            .iter()
            .enumerate()
            .find(|(_, s)| s.shape() != shape)
        {
            return Err(ManifoldError::dimension_mismatch(
                format!("slice {} of shape {}x{}", i, shape.0, shape.1),
                format!("{}x{}", bad.nrows(), bad.ncols()),
            ));
        }
        Ok(Self { slices })
    }

    /// Wraps a single matrix as a stack with `k = 1`.
    pub fn from_matrix(matrix: DMatrix<T>) -> Self {
        Self {
            slices: vec![matrix],
        }
    }

    /// A zero stack with the same shape as `self`.
    pub fn zeros_like(&self) -> Self {
        let (_, nrows, ncols) = self.shape();
        self.map(|_| DMatrix::zeros(nrows, ncols))
    }

    /// Number of slices `k`.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Always `false`: a stack holds at least one slice.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Number of rows of every slice.
    pub fn nrows(&self) -> usize {
        self.slices[0].nrows()
    }

    /// Number of columns of every slice.
    pub fn ncols(&self) -> usize {
        self.slices[0].ncols()
    }

    /// Shape as `(k, nrows, ncols)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.len(), self.nrows(), self.ncols())
    }

    /// Iterates over the slices in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DMatrix<T>> {
        self.slices.iter()
    }

    /// Consumes the stack and returns its slices.
    pub fn into_slices(self) -> Vec<DMatrix<T>> {
        self.slices
    }

    /// Fails with `DimensionMismatch` unless the stack has the given shape.
    pub fn ensure_shape(&self, expected: (usize, usize, usize)) -> Result<()> {
        let actual = self.shape();
        if actual != expected {
            return Err(ManifoldError::dimension_mismatch(
                format_shape(expected),
                format_shape(actual),
            ));
        }
        Ok(())
    }

    /// Applies `f` to every slice.
    ///
    /// `f` must return matrices of one common shape.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(&DMatrix<T>) -> DMatrix<T>,
    {
        Self {
            slices: self.slices.iter().map(f).collect(),
        }
    }

    /// Applies a fallible `f` to every slice, stopping at the first error.
    pub fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: FnMut(&DMatrix<T>) -> Result<DMatrix<T>>,
    {
        let slices = self.slices.iter().map(f).collect::<Result<Vec<_>>>()?;
        Self::new(slices)
    }

    /// Applies `f` slice-wise to `self` and `other`.
    ///
    /// Both stacks must have the same number of slices; slice shapes are
    /// checked by `f` or by the resulting stack.
    pub fn try_zip_map<F>(&self, other: &Self, mut f: F) -> Result<Self>
    where
        F: FnMut(&DMatrix<T>, &DMatrix<T>) -> Result<DMatrix<T>>,
    {
        if self.len() != other.len() {
            return Err(ManifoldError::dimension_mismatch(
                format!("{} slices", self.len()),
                format!("{} slices", other.len()),
            ));
        }
        let slices = self
            .slices
            .iter()
            .zip(other.slices.iter())
            .map(|(a, b)| f(a, b))
            .collect::<Result<Vec<_>>>()?;
        Self::new(slices)
    }

    /// Slice-wise sum `self + other`.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.ensure_shape(other.shape())?;
        self.try_zip_map(other, |a, b| Ok(a + b))
    }

    /// Slice-wise difference `self - other`.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.ensure_shape(other.shape())?;
        self.try_zip_map(other, |a, b| Ok(a - b))
    }

    /// Multiplies every entry by `factor`.
    pub fn scale(&self, factor: T) -> Self {
        self.map(|s| s * factor)
    }

    /// Full contraction over all axes: the sum of the slice-wise Frobenius
    /// inner products.
    pub fn dot(&self, other: &Self) -> Result<T> {
        self.ensure_shape(other.shape())?;
        Ok(self
            .slices
            .iter()
            .zip(other.slices.iter())
            .fold(T::zero(), |acc, (a, b)| acc + a.dot(b)))
    }

    /// Sum of squared entries over all slices.
    pub fn norm_squared(&self) -> T {
        self.slices
            .iter()
            .fold(T::zero(), |acc, s| acc + s.norm_squared())
    }

    /// Frobenius norm of the whole stack.
    pub fn norm(&self) -> T {
        <T as Float>::sqrt(self.norm_squared())
    }
}

pub(crate) fn format_shape((k, nrows, ncols): (usize, usize, usize)) -> String {
    format!("({}, {}, {})", k, nrows, ncols)
}

impl<T: Scalar> Index<usize> for MatrixStack<T> {
    type Output = DMatrix<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slices[index]
    }
}

impl<'a, T: Scalar> IntoIterator for &'a MatrixStack<T> {
    type Item = &'a DMatrix<T>;
    type IntoIter = std::slice::Iter<'a, DMatrix<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

impl<T: Scalar> Mul<T> for &MatrixStack<T> {
    type Output = MatrixStack<T>;

    fn mul(self, rhs: T) -> Self::Output {
        self.scale(rhs)
    }
}

impl<T: Scalar> Mul<T> for MatrixStack<T> {
    type Output = Self;

    fn mul(mut self, rhs: T) -> Self::Output {
        for slice in &mut self.slices {
            *slice *= rhs;
        }
        self
    }
}

impl<T: Scalar> Neg for &MatrixStack<T> {
    type Output = MatrixStack<T>;

    fn neg(self) -> Self::Output {
        self.map(|s| -s)
    }
}

impl<T: Scalar> From<DMatrix<T>> for MatrixStack<T> {
    fn from(matrix: DMatrix<T>) -> Self {
        Self::from_matrix(matrix)
    }
}

impl<T: Scalar> TryFrom<Vec<DMatrix<T>>> for MatrixStack<T> {
    type Error = ManifoldError;

    fn try_from(slices: Vec<DMatrix<T>>) -> Result<Self> {
        Self::new(slices)
    }
}

impl<T: Scalar> From<MatrixStack<T>> for Vec<DMatrix<T>> {
    fn from(stack: MatrixStack<T>) -> Self {
        stack.slices
    }
}
