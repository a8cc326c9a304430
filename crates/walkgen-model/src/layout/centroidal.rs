//! 12-state layout with fixed footholds and a shoulder-height penalty.

use nalgebra::{DVector, Matrix3, Matrix3x4, Vector2, Vector3};
use walkgen_core::ModelConfig;

use super::StateLayout;
use crate::data::ActionData;
use crate::heuristic::{Shoulders, shoulders_from_config};
use crate::types::{CENTROIDAL_DIM, ContactSchedule, N_FEET, POSITION, Vector4, Vector12};

/// Rows of the state touched by the height penalty: `z`, roll, pitch.
const HEIGHT_ROWS: usize = POSITION + 2;

/// Centroidal state only. Contact points come from the footholds passed to
/// the last reparametrization and lie on the ground plane.
///
/// Each shoulder is kept below `limit` with a one-sided quadratic penalty on
/// its small-angle height `z + py·roll - px·pitch`.
#[derive(Clone, Debug)]
pub struct Centroidal {
    footholds: [Vector2<f64>; N_FEET],
    nominal_shoulders: Shoulders,
    shoulder_height_limit: f64,
    shoulder_height_weight: f64,
}

impl Centroidal {
    /// Planar footholds set by the last reparametrization.
    pub const fn footholds(&self) -> &[Vector2<f64>; N_FEET] {
        &self.footholds
    }

    pub const fn nominal_shoulders(&self) -> &Shoulders {
        &self.nominal_shoulders
    }

    pub const fn set_nominal_shoulders(&mut self, shoulders: Shoulders) {
        self.nominal_shoulders = shoulders;
    }

    pub const fn shoulder_height_limit(&self) -> f64 {
        self.shoulder_height_limit
    }

    pub const fn set_shoulder_height_limit(&mut self, limit: f64) {
        self.shoulder_height_limit = limit;
    }

    pub const fn shoulder_height_weight(&self) -> f64 {
        self.shoulder_height_weight
    }

    pub const fn set_shoulder_height_weight(&mut self, weight: f64) {
        self.shoulder_height_weight = weight;
    }

    /// Sensitivity of shoulder `foot`'s height to `(z, roll, pitch)`.
    fn height_direction(&self, foot: usize) -> Vector3<f64> {
        let s = self.nominal_shoulders[foot];
        Vector3::new(1.0, s.y, -s.x)
    }

    /// Shoulder height above the limit, unclamped.
    fn height_margins(&self, x: &DVector<f64>) -> Vector4 {
        let pose: Vector3<f64> = x.fixed_rows::<3>(HEIGHT_ROWS).into_owned();
        Vector4::from_fn(|foot, _| self.height_direction(foot).dot(&pose) - self.shoulder_height_limit)
    }
}

impl Default for Centroidal {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl StateLayout for Centroidal {
    const NX: usize = CENTROIDAL_DIM;
    const NR_EXTRA: usize = 0;
    const NAME: &'static str = "centroidal";

    fn from_config(config: &ModelConfig) -> Self {
        Self {
            footholds: [Vector2::zeros(); N_FEET],
            nominal_shoulders: shoulders_from_config(&config.foot_placement.nominal_shoulders),
            shoulder_height_limit: config.shoulder_height.limit,
            shoulder_height_weight: config.shoulder_height.weight,
        }
    }

    fn reparametrize(&mut self, l_feet: &Matrix3x4<f64>, _xref: &Vector12) {
        for (foot, hold) in self.footholds.iter_mut().enumerate() {
            *hold = Vector2::new(l_feet[(0, foot)], l_feet[(1, foot)]);
        }
    }

    fn contact_point(&self, foot: usize, _x: &DVector<f64>) -> Vector3<f64> {
        let hold = self.footholds[foot];
        Vector3::new(hold.x, hold.y, 0.0)
    }

    fn contact_column(_foot: usize) -> Option<usize> {
        None
    }

    fn evaluate(
        &self,
        _schedule: &ContactSchedule,
        x: &DVector<f64>,
        data: &mut ActionData,
    ) -> f64 {
        let violation = self.height_margins(x).map(|m| m.max(0.0));
        data.shoulder_violation = violation;
        0.5 * self.shoulder_height_weight * violation.norm_squared()
    }

    fn differentiate(&self, _schedule: &ContactSchedule, _x: &DVector<f64>, data: &mut ActionData) {
        let w = self.shoulder_height_weight;
        for foot in 0..N_FEET {
            let v = data.shoulder_violation[foot];
            if v <= 0.0 {
                continue;
            }
            let a = self.height_direction(foot);
            let grad = a * (w * v);
            let hess: Matrix3<f64> = a * a.transpose() * w;
            let mut lx = data.lx.fixed_rows_mut::<3>(HEIGHT_ROWS);
            lx += grad;
            let mut lxx = data.lxx.fixed_view_mut::<3, 3>(HEIGHT_ROWS, HEIGHT_ROWS);
            lxx += hess;
        }
    }
}
