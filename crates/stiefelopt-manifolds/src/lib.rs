//! stiefelopt Manifolds - the Stiefel manifold and its products.
//!
//! [`Stiefel`] implements [`Manifold`](stiefelopt_core::manifold::Manifold)
//! for St(n,p) and for the product St(n,p)^k, with points and tangent
//! vectors stored as [`MatrixStack`](stiefelopt_core::MatrixStack)s.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use stiefelopt_core::prelude::*;
//! use stiefelopt_manifolds::Stiefel;
//!
//! let stiefel = Stiefel::new(5, 2)?;
//! assert_eq!(stiefel.dimension(), 7);
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let x: Point<f64> = stiefel.random_point(&mut rng)?;
//! let u = stiefel.random_tangent(&x, &mut rng)?;
//! let y = stiefel.retract(&x, &u.scale(0.01))?;
//! assert!(stiefel.is_point_on_manifold(&y, 1e-10));
//! # Ok::<(), ManifoldError>(())
//! ```

pub mod stiefel;

pub use stiefel::Stiefel;
#[cfg(feature = "serde")]
pub use stiefel::StiefelParams;
