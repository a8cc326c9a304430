//! Centroidal dynamics and cost kernel for quadruped trajectory optimization.
//!
//! One [`ActionModel`] describes a single node of a walking trajectory:
//!
//! 1. **Reparametrization**: [`ActionModel::update_model`] fixes the contact
//!    schedule, reference state and footholds of the node
//! 2. **Forward pass**: [`ActionModel::calc`] produces the next state, the
//!    tracking residual, friction-cone violations and the cost
//! 3. **Derivatives**: [`ActionModel::calc_diff`] produces the cost
//!    gradient, Gauss-Newton Hessians and the dynamics Jacobians
//!
//! Results go into an [`ActionData`] owned by the caller.
//!
//! # Layouts
//!
//! The same kernel runs on two states, selected by the [`StateLayout`]
//! parameter:
//!
//! - [`CentroidalModel`]: 12 states `[p, Θ, v, ω]`, contact points from the
//!   reparametrized footholds, shoulder-height penalty
//! - [`AugmentedModel`]: the 12 centroidal states plus `(x, y)` of every
//!   foot, tracked towards a heuristic shoulder reference and the previous
//!   foothold
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use walkgen_model::CentroidalModel;
//!
//! let mut model = CentroidalModel::default();
//! let l_feet = DMatrix::from_row_slice(3, 4, &[
//!     0.2, 0.2, -0.2, -0.2,
//!     0.15, -0.15, 0.15, -0.15,
//!     0.0, 0.0, 0.0, 0.0,
//! ]);
//! let mut xref = DVector::zeros(12);
//! xref[2] = 0.2;
//! model.update_model(&l_feet, &xref, &[1.0, 1.0, 1.0, 1.0])?;
//!
//! let mut data = model.create_data();
//! let u = DVector::from_fn(12, |i, _| if i % 3 == 2 { 6.13 } else { 0.0 });
//! model.calc(&mut data, &xref, &u)?;
//! model.calc_diff(&mut data, &xref, &u)?;
//! assert!(data.cost >= 0.0);
//! # Ok::<(), walkgen_core::ModelError>(())
//! ```

pub mod data;
pub mod dynamics;
pub mod friction;
pub mod heuristic;
pub mod layout;
pub mod model;
pub mod params;
pub mod types;

pub use data::ActionData;
pub use dynamics::{skew_symmetric, yaw_rotation_matrix};
pub use friction::FrictionCone;
pub use heuristic::{FootPlacementHeuristic, Shoulders};
pub use layout::{Augmented, Centroidal, StateLayout};
pub use model::{ActionModel, AugmentedModel, CentroidalModel};
pub use params::ModelParams;
pub use types::{BodyState, ContactSchedule};
pub use walkgen_core::ModelError;
