//! Core manifold trait.
//!
//! [`Manifold`] is the seam between a manifold and the optimizers that walk
//! on it. An optimizer only ever calls these operators, one per step, and
//! never inspects the representation of points beyond the [`MatrixStack`]
//! value type.

use rand::Rng;
use std::fmt::Debug;

use crate::{
    error::{ManifoldError, Result},
    stack::MatrixStack,
    types::{constants, Scalar},
};

/// A point of a matrix manifold: an ordered stack of matrices.
pub type Point<T> = MatrixStack<T>;

/// A tangent (or ambient) vector at a point: same shape as the point.
pub type TangentVector<T> = MatrixStack<T>;

/// Trait for Riemannian matrix manifolds.
///
/// A Riemannian manifold (ℳ, g) is a smooth manifold ℳ equipped with an
/// inner product g_X on each tangent space T_X ℳ.
///
/// ## Core Operations
/// - **Tangent projection**: P_X: ℝⁿˣᵖ → T_X ℳ
/// - **Retraction**: first-order approximation of the exponential map
/// - **Riemannian metric**: ⟨·,·⟩_X: T_X ℳ × T_X ℳ → ℝ
/// - **Gradient and Hessian conversion** from the Euclidean embedding
///
/// ## Randomness
///
/// Sampling operators receive the random source as an argument. The trait
/// never touches a global generator; a host that samples from several
/// threads must give each thread its own generator.
///
/// # Type Parameters
///
/// - `T`: The scalar type (f32 or f64)
pub trait Manifold<T: Scalar>: Debug + Send + Sync {
    /// Returns a human-readable name for the manifold.
    fn name(&self) -> &str;

    /// Returns the intrinsic dimension of the manifold.
    fn dimension(&self) -> usize;

    /// A typical distance between points, used by optimizers to scale
    /// initial step sizes and trust-region radii.
    fn typical_dist(&self) -> T;

    /// Checks if a point lies on the manifold within a given tolerance.
    fn is_point_on_manifold(&self, point: &Point<T>, tol: T) -> bool;

    /// Checks if a vector is in the tangent space at a given point.
    fn is_vector_in_tangent_space(
        &self,
        point: &Point<T>,
        vector: &TangentVector<T>,
        tol: T,
    ) -> bool;

    /// [`Manifold::is_point_on_manifold`] at the scalar's default
    /// [`MANIFOLD_TOLERANCE`](Scalar::MANIFOLD_TOLERANCE).
    fn contains_point(&self, point: &Point<T>) -> bool {
        self.is_point_on_manifold(point, constants::manifold_tolerance())
    }

    /// [`Manifold::is_vector_in_tangent_space`] at the scalar's default
    /// [`ORTHOGONALITY_TOLERANCE`](Scalar::ORTHOGONALITY_TOLERANCE).
    fn contains_tangent(&self, point: &Point<T>, vector: &TangentVector<T>) -> bool {
        self.is_vector_in_tangent_space(point, vector, constants::orthogonality_tolerance())
    }

    /// Projects an ambient vector onto the tangent space at `point`.
    ///
    /// The projection satisfies:
    /// 1. **Idempotency**: P_X(P_X(V)) = P_X(V)
    /// 2. **Linearity**: P_X(αU + βV) = αP_X(U) + βP_X(V)
    fn project_tangent(
        &self,
        point: &Point<T>,
        vector: &TangentVector<T>,
    ) -> Result<TangentVector<T>>;

    /// Computes the Riemannian inner product between two tangent vectors.
    ///
    /// # Mathematical Properties
    ///
    /// 1. **Symmetry**: ⟨u,v⟩_X = ⟨v,u⟩_X
    /// 2. **Bilinearity**
    /// 3. **Positive definiteness**: ⟨u,u⟩_X > 0 for all u ≠ 0
    fn inner_product(
        &self,
        point: &Point<T>,
        u: &TangentVector<T>,
        v: &TangentVector<T>,
    ) -> Result<T>;

    /// Computes the norm of a tangent vector.
    ///
    /// Must agree with sqrt(inner_product(point, v, v)).
    fn norm(&self, point: &Point<T>, vector: &TangentVector<T>) -> Result<T> {
        self.inner_product(point, vector, vector)
            .map(<T as num_traits::Float>::sqrt)
    }

    /// Converts the Euclidean gradient to the Riemannian gradient.
    fn euclidean_to_riemannian_gradient(
        &self,
        point: &Point<T>,
        euclidean_grad: &TangentVector<T>,
    ) -> Result<TangentVector<T>>;

    /// Converts a Euclidean Hessian-vector product into the Riemannian one.
    ///
    /// # Arguments
    ///
    /// * `point` - A point on the manifold
    /// * `euclidean_grad` - Euclidean gradient at `point`
    /// * `euclidean_hvp` - Euclidean Hessian applied to `direction`
    /// * `direction` - Tangent direction the Hessian is applied along
    fn euclidean_to_riemannian_hessian(
        &self,
        point: &Point<T>,
        euclidean_grad: &TangentVector<T>,
        euclidean_hvp: &TangentVector<T>,
        direction: &TangentVector<T>,
    ) -> Result<TangentVector<T>>;

    /// Performs a retraction from the tangent space to the manifold.
    ///
    /// A retraction R_X must satisfy R_X(0) = X and dR_X(0) = id.
    fn retract(&self, point: &Point<T>, tangent: &TangentVector<T>) -> Result<Point<T>>;

    /// Exponential map: follows the geodesic from `point` with initial
    /// velocity `tangent` for unit time.
    ///
    /// # Default Implementation
    ///
    /// Returns `NotImplemented`.
    fn exp_map(&self, _point: &Point<T>, _tangent: &TangentVector<T>) -> Result<Point<T>> {
        Err(ManifoldError::not_implemented(format!(
            "exponential map on {}",
            self.name()
        )))
    }

    /// Logarithmic map: the inverse of [`Manifold::exp_map`].
    ///
    /// # Default Implementation
    ///
    /// Returns `NotImplemented`.
    fn log_map(&self, _point: &Point<T>, _other: &Point<T>) -> Result<TangentVector<T>> {
        Err(ManifoldError::not_implemented(format!(
            "logarithmic map on {}",
            self.name()
        )))
    }

    /// Geodesic distance between two points.
    ///
    /// # Default Implementation
    ///
    /// Returns `NotImplemented`.
    fn distance(&self, _x: &Point<T>, _y: &Point<T>) -> Result<T> {
        Err(ManifoldError::not_implemented(format!(
            "geodesic distance on {}",
            self.name()
        )))
    }

    /// Transports a tangent vector at `from` into the tangent space at `to`.
    ///
    /// # Default Implementation
    ///
    /// Vector transport by projection onto T_to ℳ. This is not parallel
    /// transport.
    fn vector_transport(
        &self,
        _from: &Point<T>,
        to: &Point<T>,
        vector: &TangentVector<T>,
    ) -> Result<TangentVector<T>> {
        self.project_tangent(to, vector)
    }

    /// Generates a random point on the manifold.
    fn random_point<R>(&self, rng: &mut R) -> Result<Point<T>>
    where
        R: Rng + ?Sized;

    /// Generates a random unit-norm tangent vector at `point`.
    fn random_tangent<R>(&self, point: &Point<T>, rng: &mut R) -> Result<TangentVector<T>>
    where
        R: Rng + ?Sized;

    /// Checks if the manifold implements its exponential and logarithmic
    /// maps in closed form.
    fn has_exact_exp_log(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::standard_normal;
    use nalgebra::DMatrix;
    use rand::{rngs::StdRng, SeedableRng};

    /// Flat space of `n x p` matrices, used to exercise the default methods.
    #[derive(Debug)]
    struct MatrixSpace {
        n: usize,
        p: usize,
    }

    impl Manifold<f64> for MatrixSpace {
        fn name(&self) -> &str {
            "MatrixSpace"
        }

        fn dimension(&self) -> usize {
            self.n * self.p
        }

        fn typical_dist(&self) -> f64 {
            ((self.n * self.p) as f64).sqrt()
        }

        fn is_point_on_manifold(&self, point: &Point<f64>, _tol: f64) -> bool {
            point.shape() == (1, self.n, self.p)
        }

        fn is_vector_in_tangent_space(
            &self,
            point: &Point<f64>,
            vector: &TangentVector<f64>,
            _tol: f64,
        ) -> bool {
            point.shape() == vector.shape()
        }

        fn project_tangent(
            &self,
            _point: &Point<f64>,
            vector: &TangentVector<f64>,
        ) -> Result<TangentVector<f64>> {
            Ok(vector.clone())
        }

        fn inner_product(
            &self,
            _point: &Point<f64>,
            u: &TangentVector<f64>,
            v: &TangentVector<f64>,
        ) -> Result<f64> {
            u.dot(v)
        }

        fn euclidean_to_riemannian_gradient(
            &self,
            point: &Point<f64>,
            euclidean_grad: &TangentVector<f64>,
        ) -> Result<TangentVector<f64>> {
            self.project_tangent(point, euclidean_grad)
        }

        fn euclidean_to_riemannian_hessian(
            &self,
            _point: &Point<f64>,
            _euclidean_grad: &TangentVector<f64>,
            euclidean_hvp: &TangentVector<f64>,
            _direction: &TangentVector<f64>,
        ) -> Result<TangentVector<f64>> {
            Ok(euclidean_hvp.clone())
        }

        fn retract(&self, point: &Point<f64>, tangent: &TangentVector<f64>) -> Result<Point<f64>> {
            point.add(tangent)
        }

        fn random_point<R>(&self, rng: &mut R) -> Result<Point<f64>>
        where
            R: Rng + ?Sized,
        {
            Ok(MatrixStack::from_matrix(standard_normal(self.n, self.p, rng)))
        }

        fn random_tangent<R>(&self, _point: &Point<f64>, rng: &mut R) -> Result<TangentVector<f64>>
        where
            R: Rng + ?Sized,
        {
            let v = MatrixStack::from_matrix(standard_normal(self.n, self.p, rng));
            let norm = v.norm();
            Ok(v.scale(1.0 / norm))
        }
    }

    #[test]
    fn test_default_norm_uses_inner_product() {
        let space = MatrixSpace { n: 2, p: 2 };
        let x = MatrixStack::from_matrix(DMatrix::zeros(2, 2));
        let v = MatrixStack::from_matrix(DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, 4.0]));
        assert_eq!(space.norm(&x, &v).unwrap(), 5.0);
    }

    #[test]
    fn test_default_transport_projects() {
        let space = MatrixSpace { n: 3, p: 1 };
        let mut rng = StdRng::seed_from_u64(3);
        let x = space.random_point(&mut rng).unwrap();
        let y = space.random_point(&mut rng).unwrap();
        let v = space.random_tangent(&x, &mut rng).unwrap();
        assert_eq!(space.vector_transport(&x, &y, &v).unwrap(), v);
    }

    #[test]
    fn test_default_exp_log_distance_not_implemented() {
        let space = MatrixSpace { n: 2, p: 1 };
        let x = MatrixStack::from_matrix(DMatrix::zeros(2, 1));
        assert!(matches!(
            space.exp_map(&x, &x),
            Err(ManifoldError::NotImplemented { .. })
        ));
        assert!(matches!(
            space.log_map(&x, &x),
            Err(ManifoldError::NotImplemented { .. })
        ));
        assert!(matches!(
            space.distance(&x, &x),
            Err(ManifoldError::NotImplemented { .. })
        ));
        assert!(!space.has_exact_exp_log());
    }

    #[test]
    fn test_manifold_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MatrixSpace>();
    }
}
