//! Heuristic foot placement around the shoulders.
//!
//! Each foot is attracted to its nominal shoulder position, rotated by the
//! reference yaw and shifted by the reference base position, plus two
//! optional Raibert-style biases:
//!
//! - symmetry: `0.25 · T_gait · v_xy`, half the stance displacement for a
//!   50% duty gait
//! - centrifugal: `½ √(h/g) · (v × ω)`, projected to the ground plane

use nalgebra::{Matrix2, Vector2, Vector3};
use walkgen_core::FootPlacementConfig;

use crate::dynamics::yaw_rotation_matrix;
use crate::types::{
    ANGULAR_VELOCITY, GRAVITY, LINEAR_VELOCITY, N_FEET, POSITION, Vector8, Vector12, YAW,
};

/// Nominal shoulder positions in the base frame, FL, FR, HL, HR.
pub type Shoulders = [Vector2<f64>; N_FEET];

/// Converts the config's `[x, y]` pairs into shoulder vectors.
pub fn shoulders_from_config(pairs: &[[f64; 2]; N_FEET]) -> Shoulders {
    pairs.map(|[x, y]| Vector2::new(x, y))
}

/// Heuristic reference for the planar foot positions.
#[derive(Clone, Debug, PartialEq)]
pub struct FootPlacementHeuristic {
    /// Gait period in seconds.
    pub gait_period: f64,
    /// Add the velocity symmetry bias.
    pub symmetry_term: bool,
    /// Add the centrifugal bias.
    pub centrifugal_term: bool,
}

impl Default for FootPlacementHeuristic {
    fn default() -> Self {
        Self::from_config(&FootPlacementConfig::default())
    }
}

impl FootPlacementHeuristic {
    pub const fn from_config(config: &FootPlacementConfig) -> Self {
        Self {
            gait_period: config.gait_period,
            symmetry_term: config.symmetry_term,
            centrifugal_term: config.centrifugal_term,
        }
    }

    /// Centrifugal offset `½ √(h/g) · (v × ω)` for a reference state.
    ///
    /// Negative reference heights are clamped to zero.
    pub fn centrifugal_offset(xref: &Vector12) -> Vector3<f64> {
        let v: Vector3<f64> = xref.fixed_rows::<3>(LINEAR_VELOCITY).into_owned();
        let w: Vector3<f64> = xref.fixed_rows::<3>(ANGULAR_VELOCITY).into_owned();
        let height = xref[POSITION + 2].max(0.0);
        v.cross(&w) * (0.5 * (height / GRAVITY).sqrt())
    }

    /// Planar bias added to every nominal shoulder before rotation.
    pub fn bias(&self, xref: &Vector12) -> Vector2<f64> {
        let mut bias = Vector2::zeros();
        if self.symmetry_term {
            let v = Vector2::new(xref[LINEAR_VELOCITY], xref[LINEAR_VELOCITY + 1]);
            bias += v * (0.25 * self.gait_period);
        }
        if self.centrifugal_term {
            let c = Self::centrifugal_offset(xref);
            bias += Vector2::new(c.x, c.y);
        }
        bias
    }

    /// World-frame planar foot references, `(x, y)` per foot.
    pub fn shoulder_reference(&self, nominal: &Shoulders, xref: &Vector12) -> Vector8 {
        let rot: Matrix2<f64> = yaw_rotation_matrix(xref[YAW])
            .fixed_view::<2, 2>(0, 0)
            .into_owned();
        let base = Vector2::new(xref[POSITION], xref[POSITION + 1]);
        let bias = self.bias(xref);

        let mut out = Vector8::zeros();
        for (foot, shoulder) in nominal.iter().enumerate() {
            let p = rot * (shoulder + bias) + base;
            out.fixed_rows_mut::<2>(2 * foot).copy_from(&p);
        }
        out
    }
}
