//! Core traits and types for optimization on Stiefel manifolds.
//!
//! This crate provides the pieces every matrix-manifold implementation in
//! the workspace is built from: the scalar abstraction, the error taxonomy,
//! stacks of matrices representing points of product manifolds, batched
//! per-slice matrix calculus, and thin wrappers around the dense kernels.
//!
//! # Modules
//!
//! - [`batch`]: Slice-wise transpose, product and symmetric part
//! - [`error`]: Error types for manifold operations
//! - [`linalg`]: Sign-normalized thin QR, matrix exponential, Gaussian sampling
//! - [`manifold`]: Core manifold trait
//! - [`stack`]: The [`MatrixStack`](stack::MatrixStack) value type
//! - [`types`]: Scalar trait, type aliases and numerical constants

pub mod batch;
pub mod error;
pub mod linalg;
pub mod manifold;
pub mod stack;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{ManifoldError, Result};
pub use stack::MatrixStack;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use stiefelopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::{multiprod, multisym, multitransp};
    pub use crate::error::{ManifoldError, Result};
    pub use crate::manifold::{Manifold, Point, TangentVector};
    pub use crate::stack::MatrixStack;
    pub use crate::types::{constants, DMatrix, Scalar};
}
