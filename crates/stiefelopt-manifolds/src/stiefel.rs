//! Stiefel manifold St(n,p) = {X in R^{n x p} : X^T X = I_p} and its k-fold
//! product St(n,p)^k.
//!
//! Points and tangent vectors are [`MatrixStack`]s of `k` slices, each of
//! size n x p. The single manifold is the `k = 1` case; every operator below
//! is written once and applied slice by slice, so slice `i` of an output
//! depends only on slice `i` of the inputs.
//!
//! The metric is the one inherited from the Euclidean embedding, so the
//! inner product of two stacked tangent vectors is the sum of the slice-wise
//! Frobenius inner products.

use nalgebra::DMatrix;
use num_traits::Float;
use rand::Rng;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use stiefelopt_core::{
    batch::{multiprod, multiprod_tn, multisym},
    error::{ManifoldError, Result},
    linalg::{ensure_finite, expm, orthonormal_factor, standard_normal},
    manifold::{Manifold, Point, TangentVector},
    stack::MatrixStack,
    types::Scalar,
};

/// The Stiefel manifold St(n,p) of n x p orthonormal matrices, or the
/// product of `k` copies of it.
///
/// # Mathematical Properties
///
/// - **Dimension**: k (np - p(p+1)/2)
/// - **Tangent space**: T_X St(n,p) = {V : X^T V + V^T X = 0}
/// - **Riemannian metric**: Frobenius inner product of the embedding
/// - **Retraction**: sign-normalized QR of X + V
/// - **Exponential map**: closed form through a 2p x 2p matrix exponential
///
/// The descriptor is immutable; `dim` and `name` are computed once by the
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "StiefelParams", into = "StiefelParams")
)]
pub struct Stiefel {
    /// Number of rows (n)
    n: usize,
    /// Number of columns (p)
    p: usize,
    /// Number of copies (k)
    k: usize,
    dim: usize,
    name: String,
}

/// Serialized form of [`Stiefel`]: only the defining triple.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StiefelParams {
    /// Number of rows
    pub n: usize,
    /// Number of columns
    pub p: usize,
    /// Number of copies
    pub k: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<StiefelParams> for Stiefel {
    type Error = ManifoldError;

    fn try_from(params: StiefelParams) -> Result<Self> {
        Self::product(params.n, params.p, params.k)
    }
}

#[cfg(feature = "serde")]
impl From<Stiefel> for StiefelParams {
    fn from(manifold: Stiefel) -> Self {
        Self {
            n: manifold.n,
            p: manifold.p,
            k: manifold.k,
        }
    }
}

/// k (np - p(p+1)/2). Callers validate n >= p first.
fn intrinsic_dimension(n: usize, p: usize, k: usize) -> usize {
    k * (n * p - p * (p + 1) / 2)
}

fn display_name(n: usize, p: usize, k: usize) -> String {
    if k == 1 {
        format!("Stiefel manifold St({}, {})", n, p)
    } else {
        format!("Product Stiefel manifold St({}, {})^{}", n, p, k)
    }
}

impl Stiefel {
    /// Creates a new Stiefel manifold St(n,p).
    ///
    /// # Errors
    /// Returns `InvalidDimension` if p > n or p == 0.
    pub fn new(n: usize, p: usize) -> Result<Self> {
        Self::product(n, p, 1)
    }

    /// Creates the product manifold St(n,p)^k of `k` Stiefel manifolds.
    ///
    /// # Errors
    /// Returns `InvalidDimension` if p > n, p == 0 or k == 0.
    pub fn product(n: usize, p: usize, k: usize) -> Result<Self> {
        if n < p || p < 1 {
            return Err(ManifoldError::invalid_dimension(format!(
                "Stiefel manifold requires n >= p >= 1, got n = {}, p = {}",
                n, p
            )));
        }
        if k < 1 {
            return Err(ManifoldError::invalid_dimension(format!(
                "Stiefel manifold requires k >= 1, got k = {}",
                k
            )));
        }

        let manifold = Self {
            n,
            p,
            k,
            dim: intrinsic_dimension(n, p, k),
            name: display_name(n, p, k),
        };
        log::debug!("created {} (dim = {})", manifold.name, manifold.dim);
        Ok(manifold)
    }

    /// Returns the number of rows (n)
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns the number of columns (p)
    pub fn p(&self) -> usize {
        self.p
    }

    /// Returns the number of copies (k)
    pub fn k(&self) -> usize {
        self.k
    }

    /// Shape `(k, n, p)` of points and tangent vectors.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.k, self.n, self.p)
    }

    /// Intrinsic dimension, fixed at construction.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Display name, fixed at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zero tangent vector at `point`.
    pub fn zero_vector<T: Scalar>(&self, point: &Point<T>) -> Result<TangentVector<T>> {
        self.check_shape(point)?;
        Ok(point.zeros_like())
    }

    /// Maps an ambient stack onto the manifold by the sign-normalized thin QR
    /// of each slice.
    ///
    /// # Errors
    /// `DimensionMismatch` on a shape mismatch, `NumericalError` on
    /// non-finite input.
    pub fn project_point<T: Scalar>(&self, matrix: &MatrixStack<T>) -> Result<Point<T>> {
        self.check_shape(matrix)?;
        matrix.try_map(orthonormal_factor)
    }

    fn check_shape<T: Scalar>(&self, stack: &MatrixStack<T>) -> Result<()> {
        stack.ensure_shape(self.shape())
    }

    /// U - X sym(X^T U), slice-wise.
    ///
    /// Shared by `project_tangent`, `euclidean_to_riemannian_gradient`,
    /// `euclidean_to_riemannian_hessian` and `vector_transport`.
    fn tangent_projection<T: Scalar>(
        &self,
        point: &Point<T>,
        vector: &MatrixStack<T>,
    ) -> Result<TangentVector<T>> {
        self.check_shape(point)?;
        self.check_shape(vector)?;

        let sym_xtu = multisym(&multiprod_tn(point, vector)?)?;
        vector.sub(&multiprod(point, &sym_xtu)?)
    }

    /// Exponential map on a single slice.
    ///
    /// With A = X^T U:
    ///
    /// ```text
    /// Y = [X | U] · expm([[A, -U^T U], [I_p, A]]) · [expm(-A); 0_p]
    /// ```
    fn exp_slice<T: Scalar>(&self, x: &DMatrix<T>, u: &DMatrix<T>) -> Result<DMatrix<T>> {
        let (n, p) = (self.n, self.p);
        let a = x.tr_mul(u);

        let mut block = DMatrix::<T>::zeros(2 * p, 2 * p);
        block.view_mut((0, 0), (p, p)).copy_from(&a);
        block.view_mut((0, p), (p, p)).copy_from(&(-u.tr_mul(u)));
        block.view_mut((p, 0), (p, p)).fill_with_identity();
        block.view_mut((p, p), (p, p)).copy_from(&a);
        let block_exp = expm(&block)?;

        let mut tail = DMatrix::<T>::zeros(2 * p, p);
        tail.view_mut((0, 0), (p, p)).copy_from(&expm(&(-&a))?);

        let mut frame = DMatrix::<T>::zeros(n, 2 * p);
        frame.view_mut((0, 0), (n, p)).copy_from(x);
        frame.view_mut((0, p), (n, p)).copy_from(u);

        let y = frame * block_exp * tail;
        ensure_finite(&y, "exponential map")?;
        Ok(y)
    }
}

impl fmt::Display for Stiefel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<T: Scalar> Manifold<T> for Stiefel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn typical_dist(&self) -> T {
        <T as Float>::sqrt(<T as Scalar>::from_usize(self.p * self.k))
    }

    fn is_point_on_manifold(&self, point: &Point<T>, tol: T) -> bool {
        if point.shape() != self.shape() {
            return false;
        }
        let identity = DMatrix::<T>::identity(self.p, self.p);
        point
            .iter()
            .all(|x| (x.tr_mul(x) - &identity).norm() <= tol)
    }

    fn is_vector_in_tangent_space(
        &self,
        point: &Point<T>,
        vector: &TangentVector<T>,
        tol: T,
    ) -> bool {
        if point.shape() != self.shape() || vector.shape() != self.shape() {
            return false;
        }
        // X^T V + V^T X must vanish on every slice
        point.iter().zip(vector.iter()).all(|(x, v)| {
            let xtv = x.tr_mul(v);
            (&xtv + xtv.transpose()).norm() <= tol
        })
    }

    fn project_tangent(
        &self,
        point: &Point<T>,
        vector: &TangentVector<T>,
    ) -> Result<TangentVector<T>> {
        self.tangent_projection(point, vector)
    }

    fn inner_product(
        &self,
        point: &Point<T>,
        u: &TangentVector<T>,
        v: &TangentVector<T>,
    ) -> Result<T> {
        self.check_shape(point)?;
        self.check_shape(u)?;
        self.check_shape(v)?;
        u.dot(v)
    }

    fn norm(&self, point: &Point<T>, vector: &TangentVector<T>) -> Result<T> {
        self.check_shape(point)?;
        self.check_shape(vector)?;
        Ok(vector.norm())
    }

    fn euclidean_to_riemannian_gradient(
        &self,
        point: &Point<T>,
        euclidean_grad: &TangentVector<T>,
    ) -> Result<TangentVector<T>> {
        // The embedded metric needs no rescaling.
        self.tangent_projection(point, euclidean_grad)
    }

    fn euclidean_to_riemannian_hessian(
        &self,
        point: &Point<T>,
        euclidean_grad: &TangentVector<T>,
        euclidean_hvp: &TangentVector<T>,
        direction: &TangentVector<T>,
    ) -> Result<TangentVector<T>> {
        self.check_shape(euclidean_grad)?;
        self.check_shape(direction)?;

        let sym_xtg = multisym(&multiprod_tn(point, euclidean_grad)?)?;
        let correction = multiprod(direction, &sym_xtg)?;
        self.tangent_projection(point, &euclidean_hvp.sub(&correction)?)
    }

    fn retract(&self, point: &Point<T>, tangent: &TangentVector<T>) -> Result<Point<T>> {
        self.check_shape(point)?;
        self.check_shape(tangent)?;
        point.add(tangent)?.try_map(orthonormal_factor)
    }

    fn exp_map(&self, point: &Point<T>, tangent: &TangentVector<T>) -> Result<Point<T>> {
        self.check_shape(point)?;
        self.check_shape(tangent)?;
        point.try_zip_map(tangent, |x, u| self.exp_slice(x, u))
    }

    fn log_map(&self, _point: &Point<T>, _other: &Point<T>) -> Result<TangentVector<T>> {
        Err(ManifoldError::not_implemented(format!(
            "logarithmic map on {}",
            self.name
        )))
    }

    fn distance(&self, _x: &Point<T>, _y: &Point<T>) -> Result<T> {
        Err(ManifoldError::not_implemented(format!(
            "geodesic distance on {}",
            self.name
        )))
    }

    fn vector_transport(
        &self,
        from: &Point<T>,
        to: &Point<T>,
        vector: &TangentVector<T>,
    ) -> Result<TangentVector<T>> {
        // Projection-based transport; not parallel transport.
        self.check_shape(from)?;
        self.tangent_projection(to, vector)
    }

    fn random_point<R>(&self, rng: &mut R) -> Result<Point<T>>
    where
        R: Rng + ?Sized,
    {
        let slices = (0..self.k)
            .map(|_| orthonormal_factor(&standard_normal(self.n, self.p, &mut *rng)))
            .collect::<Result<Vec<_>>>()?;
        MatrixStack::new(slices)
    }

    fn random_tangent<R>(&self, point: &Point<T>, rng: &mut R) -> Result<TangentVector<T>>
    where
        R: Rng + ?Sized,
    {
        self.check_shape(point)?;
        let ambient = MatrixStack::new(
            (0..self.k)
                .map(|_| standard_normal(self.n, self.p, &mut *rng))
                .collect(),
        )?;

        let tangent = self.tangent_projection(point, &ambient)?;
        // One normalization over the whole stack, not per slice.
        let norm = tangent.norm();
        if norm <= T::zero() {
            log::warn!("random tangent vector on {} has zero norm", self.name);
            return Err(ManifoldError::numerical_error(
                "random tangent vector has zero norm",
            ));
        }
        Ok(tangent * (T::one() / norm))
    }
}
