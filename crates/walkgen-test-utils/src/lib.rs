//! Shared test fixtures and utilities for walkgen crates.
//!
//! Provides deterministic RNG setup and central finite differences used to
//! check the kernel's analytic derivatives.

pub mod finite_diff;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use finite_diff::{numerical_gradient, numerical_hessian, numerical_jacobian};
pub use rng::{random_vector, seeded_rng};
