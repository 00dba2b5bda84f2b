//! Property-based tests for the Stiefel manifold operators.

use approx::assert_relative_eq;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use stiefelopt_core::{linalg::standard_normal, prelude::*};
use stiefelopt_manifolds::Stiefel;

/// Valid (n, p, k) triples small enough for dense linear algebra.
fn shapes() -> impl Strategy<Value = (usize, usize, usize)> {
    (1_usize..9, 1_usize..4).prop_flat_map(|(n, k)| (Just(n), 1..=n, Just(k)))
}

fn ambient(stiefel: &Stiefel, rng: &mut StdRng) -> MatrixStack<f64> {
    let (k, n, p) = stiefel.shape();
    MatrixStack::new((0..k).map(|_| standard_normal(n, p, &mut *rng)).collect()).unwrap()
}

proptest! {
    #[test]
    fn prop_dimension_formula(n in 1_usize..40, p in 1_usize..40, k in 1_usize..6) {
        let result = Stiefel::product(n, p, k);
        if n >= p {
            let stiefel = result.unwrap();
            prop_assert_eq!(stiefel.dimension(), k * (n * p - p * (p + 1) / 2));
            prop_assert_eq!(2 * stiefel.dimension(), k * (2 * n * p - p * p - p));
        } else {
            let rejected = matches!(result, Err(ManifoldError::InvalidDimension { .. }));
            prop_assert!(rejected, "St({}, {})^{} should be rejected", n, p, k);
        }
    }

    #[test]
    fn prop_random_points_are_orthonormal((n, p, k) in shapes(), seed in any::<u64>()) {
        let stiefel = Stiefel::product(n, p, k).unwrap();
        let x: Point<f64> = stiefel.random_point(&mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert!(stiefel.is_point_on_manifold(&x, 1e-10));
        prop_assert!(stiefel.contains_point(&x));
    }

    #[test]
    fn prop_projection_is_idempotent((n, p, k) in shapes(), seed in any::<u64>()) {
        let stiefel = Stiefel::product(n, p, k).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let x: Point<f64> = stiefel.random_point(&mut rng).unwrap();
        let u = ambient(&stiefel, &mut rng);

        let once = stiefel.project_tangent(&x, &u).unwrap();
        let twice = stiefel.project_tangent(&x, &once).unwrap();
        prop_assert!(once.sub(&twice).unwrap().norm() <= 1e-10 * (1.0 + u.norm()));
        prop_assert!(stiefel.is_vector_in_tangent_space(&x, &once, 1e-10 * (1.0 + u.norm())));
    }

    #[test]
    fn prop_inner_product_is_symmetric((n, p, k) in shapes(), seed in any::<u64>()) {
        let stiefel = Stiefel::product(n, p, k).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let x: Point<f64> = stiefel.random_point(&mut rng).unwrap();
        let g = stiefel.project_tangent(&x, &ambient(&stiefel, &mut rng)).unwrap();
        let h = stiefel.project_tangent(&x, &ambient(&stiefel, &mut rng)).unwrap();

        let gh = stiefel.inner_product(&x, &g, &h).unwrap();
        let hg = stiefel.inner_product(&x, &h, &g).unwrap();
        assert_relative_eq!(gh, hg, epsilon = 1e-12);
    }

    #[test]
    fn prop_retraction_stays_on_manifold(
        (n, p, k) in shapes(),
        seed in any::<u64>(),
        t in 0.0_f64..2.0,
    ) {
        let stiefel = Stiefel::product(n, p, k).unwrap();
        // St(1, 1) = {-1, 1} has no non-zero tangent vectors.
        prop_assume!(stiefel.dimension() > 0);
        let mut rng = StdRng::seed_from_u64(seed);
        let x: Point<f64> = stiefel.random_point(&mut rng).unwrap();
        let u = stiefel.random_tangent(&x, &mut rng).unwrap();

        let y = stiefel.retract(&x, &u.scale(t)).unwrap();
        prop_assert!(stiefel.is_point_on_manifold(&y, 1e-10));
        let z = stiefel.exp_map(&x, &u.scale(t)).unwrap();
        prop_assert!(stiefel.is_point_on_manifold(&z, 1e-9));
    }
}
