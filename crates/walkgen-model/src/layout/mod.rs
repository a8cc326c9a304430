//! State layouts.
//!
//! The dynamics and cost machinery in [`ActionModel`](crate::ActionModel)
//! is shared; a layout decides where the contact points come from and which
//! extra terms sit on top of the centroidal state.
//!
//! | Layout | `nx` | Contact points | Extra cost |
//! |---|---|---|---|
//! | [`Centroidal`] | 12 | reparametrized footholds | shoulder-height penalty |
//! | [`Augmented`] | 20 | foot offsets in the state | shoulder tracking, last position |

mod augmented;
mod centroidal;

pub use augmented::Augmented;
pub use centroidal::Centroidal;

use std::fmt;

use nalgebra::{DVector, Matrix3x4, Vector3};
use walkgen_core::ModelConfig;

use crate::data::ActionData;
use crate::types::{ContactSchedule, Vector12};

/// Layout-specific part of the evaluation kernel.
///
/// Residual rows `12..12 + NR_EXTRA` and state rows `12..NX` belong to the
/// layout; everything else is written by the model.
pub trait StateLayout: Clone + fmt::Debug + Send + Sync {
    /// State dimension.
    const NX: usize;
    /// Residual rows between the state and force residuals.
    const NR_EXTRA: usize;
    /// Short name used in log messages.
    const NAME: &'static str;

    fn from_config(config: &ModelConfig) -> Self;

    /// Refresh the layout's node data from the foot references and the
    /// reference state.
    fn reparametrize(&mut self, l_feet: &Matrix3x4<f64>, xref: &Vector12);

    /// World-frame contact point of `foot` for state `x`.
    fn contact_point(&self, foot: usize, x: &DVector<f64>) -> Vector3<f64>;

    /// First state index of the planar contact point of `foot`, if the
    /// contact point is part of the state.
    fn contact_column(foot: usize) -> Option<usize>;

    /// Write the layout's residual rows, next-state tail and violations.
    /// Returns the cost not already covered by `½‖r‖²`.
    fn evaluate(&self, schedule: &ContactSchedule, x: &DVector<f64>, data: &mut ActionData)
    -> f64;

    /// Add the layout's terms to `lx` and `lxx`. Runs after
    /// [`evaluate`](Self::evaluate) on the same `x`.
    fn differentiate(&self, schedule: &ContactSchedule, x: &DVector<f64>, data: &mut ActionData);
}
