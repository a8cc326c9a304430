//! 20-state layout with the planar foot positions as decision variables.

use nalgebra::{DVector, Matrix3x4, Vector3};
use walkgen_core::{ModelConfig, ModelError};

use super::StateLayout;
use crate::data::ActionData;
use crate::heuristic::{FootPlacementHeuristic, Shoulders, shoulders_from_config};
use crate::types::{
    CENTROIDAL_DIM, ContactSchedule, FOOT_OFFSET_DIM, N_FEET, Vector8, Vector12,
};

/// Centroidal state plus the `(x, y)` contact point of every foot.
///
/// The foot positions have no dynamics: they are copied to the next state
/// and shaped only through two stance-masked costs,
///
/// - shoulder tracking `½‖sw ⊙ (p - p_shoulder) ⊙ mask‖²`, part of the residual
/// - last position `½‖lw ⊙ (p - p_last) ⊙ mask‖²`
///
/// where `p_shoulder` comes from the [`FootPlacementHeuristic`] and `p_last`
/// is the foothold passed to the last reparametrization.
#[derive(Clone, Debug)]
pub struct Augmented {
    shoulder_weights: Vector8,
    last_position_weights: Vector8,
    nominal_shoulders: Shoulders,
    shoulder_reference: Vector8,
    last_position: Vector8,
    heuristic: FootPlacementHeuristic,
}

impl Augmented {
    pub const fn shoulder_weights(&self) -> &Vector8 {
        &self.shoulder_weights
    }

    pub fn set_shoulder_weights(&mut self, weights: &[f64]) -> Result<(), ModelError> {
        self.shoulder_weights = checked_vector8("shoulder_weights", weights)?;
        Ok(())
    }

    pub const fn last_position_weights(&self) -> &Vector8 {
        &self.last_position_weights
    }

    pub fn set_last_position_weights(&mut self, weights: &[f64]) -> Result<(), ModelError> {
        self.last_position_weights = checked_vector8("last_position_weights", weights)?;
        Ok(())
    }

    /// Heuristic foot reference, `(x, y)` per foot.
    pub const fn shoulder_position(&self) -> &Vector8 {
        &self.shoulder_reference
    }

    /// Override the heuristic foot reference until the next
    /// reparametrization.
    pub fn set_shoulder_position(&mut self, position: &[f64]) -> Result<(), ModelError> {
        self.shoulder_reference = checked_vector8("shoulder_position", position)?;
        Ok(())
    }

    /// Footholds of the last reparametrization, `(x, y)` per foot.
    pub const fn last_position(&self) -> &Vector8 {
        &self.last_position
    }

    pub const fn nominal_shoulders(&self) -> &Shoulders {
        &self.nominal_shoulders
    }

    pub const fn set_nominal_shoulders(&mut self, shoulders: Shoulders) {
        self.nominal_shoulders = shoulders;
    }

    pub const fn heuristic(&self) -> &FootPlacementHeuristic {
        &self.heuristic
    }

    pub const fn gait_period(&self) -> f64 {
        self.heuristic.gait_period
    }

    pub const fn set_gait_period(&mut self, period: f64) {
        self.heuristic.gait_period = period;
    }

    pub const fn symmetry_term(&self) -> bool {
        self.heuristic.symmetry_term
    }

    pub const fn set_symmetry_term(&mut self, enabled: bool) {
        self.heuristic.symmetry_term = enabled;
    }

    pub const fn centrifugal_term(&self) -> bool {
        self.heuristic.centrifugal_term
    }

    pub const fn set_centrifugal_term(&mut self, enabled: bool) {
        self.heuristic.centrifugal_term = enabled;
    }

    fn foot_offsets(x: &DVector<f64>) -> Vector8 {
        x.fixed_rows::<FOOT_OFFSET_DIM>(CENTROIDAL_DIM).into_owned()
    }

    /// Weighted last-position residual `lw ⊙ (p - p_last) ⊙ mask`.
    fn last_position_residual(&self, offsets: &Vector8, mask: &Vector8) -> Vector8 {
        (offsets - self.last_position)
            .component_mul(&self.last_position_weights)
            .component_mul(mask)
    }
}

fn checked_vector8(what: &'static str, values: &[f64]) -> Result<Vector8, ModelError> {
    ModelError::check_dim(what, FOOT_OFFSET_DIM, values.len())?;
    Ok(Vector8::from_column_slice(values))
}

impl Default for Augmented {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl StateLayout for Augmented {
    const NX: usize = CENTROIDAL_DIM + FOOT_OFFSET_DIM;
    const NR_EXTRA: usize = FOOT_OFFSET_DIM;
    const NAME: &'static str = "augmented";

    fn from_config(config: &ModelConfig) -> Self {
        let fp = &config.foot_placement;
        Self {
            shoulder_weights: Vector8::from(fp.shoulder_weights),
            last_position_weights: Vector8::from(fp.last_position_weights),
            nominal_shoulders: shoulders_from_config(&fp.nominal_shoulders),
            shoulder_reference: Vector8::zeros(),
            last_position: Vector8::zeros(),
            heuristic: FootPlacementHeuristic::from_config(fp),
        }
    }

    fn reparametrize(&mut self, l_feet: &Matrix3x4<f64>, xref: &Vector12) {
        for foot in 0..N_FEET {
            self.last_position[2 * foot] = l_feet[(0, foot)];
            self.last_position[2 * foot + 1] = l_feet[(1, foot)];
        }
        self.shoulder_reference = self
            .heuristic
            .shoulder_reference(&self.nominal_shoulders, xref);
    }

    fn contact_point(&self, foot: usize, x: &DVector<f64>) -> Vector3<f64> {
        let col = CENTROIDAL_DIM + 2 * foot;
        Vector3::new(x[col], x[col + 1], 0.0)
    }

    fn contact_column(foot: usize) -> Option<usize> {
        Some(CENTROIDAL_DIM + 2 * foot)
    }

    fn evaluate(&self, schedule: &ContactSchedule, x: &DVector<f64>, data: &mut ActionData) -> f64 {
        let offsets = Self::foot_offsets(x);
        let mask = schedule.expanded();

        data.xnext
            .fixed_rows_mut::<FOOT_OFFSET_DIM>(CENTROIDAL_DIM)
            .copy_from(&offsets);

        let shoulder = (offsets - self.shoulder_reference)
            .component_mul(&self.shoulder_weights)
            .component_mul(&mask);
        data.r
            .fixed_rows_mut::<FOOT_OFFSET_DIM>(CENTROIDAL_DIM)
            .copy_from(&shoulder);

        data.shoulder_violation.fill(0.0);
        0.5 * self.last_position_residual(&offsets, &mask).norm_squared()
    }

    fn differentiate(&self, schedule: &ContactSchedule, x: &DVector<f64>, data: &mut ActionData) {
        let offsets = Self::foot_offsets(x);
        let mask = schedule.expanded();
        let shoulder: Vector8 = data
            .r
            .fixed_rows::<FOOT_OFFSET_DIM>(CENTROIDAL_DIM)
            .into_owned();
        let last = self.last_position_residual(&offsets, &mask);

        let grad = shoulder.component_mul(&self.shoulder_weights)
            + last.component_mul(&self.last_position_weights);
        let mut lx = data.lx.fixed_rows_mut::<FOOT_OFFSET_DIM>(CENTROIDAL_DIM);
        lx += grad;

        for i in 0..FOOT_OFFSET_DIM {
            let sw = self.shoulder_weights[i];
            let lw = self.last_position_weights[i];
            let k = CENTROIDAL_DIM + i;
            data.lxx[(k, k)] += mask[i] * sw.mul_add(sw, lw * lw);
        }
    }
}
