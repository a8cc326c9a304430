//! Core types shared by the evaluation kernel.

use nalgebra::{DVector, SMatrix, SVector, Vector3};
use walkgen_core::ModelError;

/// Number of feet. The kernel is written for quadrupeds only.
pub const N_FEET: usize = 4;

/// Centroidal state dimension: `[p(3), Θ(3), v(3), ω(3)]`.
pub const CENTROIDAL_DIM: usize = 12;

/// Control dimension: one 3D contact force per foot.
pub const CONTROL_DIM: usize = 3 * N_FEET;

/// Planar foot offsets appended by the augmented layout, `(x, y)` per foot.
pub const FOOT_OFFSET_DIM: usize = 2 * N_FEET;

/// Faces of the linearized friction pyramid per foot (4 sides + normal bound).
pub const FACES_PER_FOOT: usize = 5;

/// Total number of friction-cone faces.
pub const CONE_DIM: usize = FACES_PER_FOOT * N_FEET;

/// Gravitational acceleration magnitude (m/s^2).
pub const GRAVITY: f64 = 9.81;

/// Offset of the base position inside the state.
pub const POSITION: usize = 0;
/// Offset of the Euler angles (roll, pitch, yaw) inside the state.
pub const ORIENTATION: usize = 3;
/// Index of the yaw angle.
pub const YAW: usize = 5;
/// Offset of the linear velocity inside the state.
pub const LINEAR_VELOCITY: usize = 6;
/// Offset of the angular velocity inside the state.
pub const ANGULAR_VELOCITY: usize = 9;

pub type Vector4 = SVector<f64, 4>;
pub type Vector8 = SVector<f64, FOOT_OFFSET_DIM>;
pub type Vector12 = SVector<f64, CENTROIDAL_DIM>;
pub type Vector20 = SVector<f64, CONE_DIM>;
pub type Matrix12 = SMatrix<f64, CENTROIDAL_DIM, CENTROIDAL_DIM>;

// ---------------------------------------------------------------------------
// ContactSchedule
// ---------------------------------------------------------------------------

/// Stance flag per foot for one node, ordered FL, FR, HL, HR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContactSchedule([bool; N_FEET]);

impl ContactSchedule {
    pub const fn new(stance: [bool; N_FEET]) -> Self {
        Self(stance)
    }

    /// All four feet on the ground.
    pub const fn all_stance() -> Self {
        Self([true; N_FEET])
    }

    /// All four feet in the air.
    pub const fn all_swing() -> Self {
        Self([false; N_FEET])
    }

    /// Build from raw gait values; any non-zero value counts as stance.
    ///
    /// Fractional values are accepted and treated as stance, so every mask
    /// derived from the schedule is exactly 0/1.
    pub fn from_values(values: &[f64]) -> Result<Self, ModelError> {
        ModelError::check_dim("contact_schedule", N_FEET, values.len())?;
        let mut stance = [false; N_FEET];
        for (flag, &value) in stance.iter_mut().zip(values) {
            *flag = value != 0.0;
        }
        Ok(Self(stance))
    }

    pub const fn is_stance(&self, foot: usize) -> bool {
        self.0[foot]
    }

    pub const fn as_array(&self) -> [bool; N_FEET] {
        self.0
    }

    /// Number of feet in stance.
    pub fn stance_count(&self) -> usize {
        self.0.iter().filter(|&&s| s).count()
    }

    /// Indices of the stance feet.
    pub fn stance_feet(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(foot, &s)| s.then_some(foot))
    }

    /// Per-axis 0/1 gait mask over the planar foot offsets.
    pub fn expanded(&self) -> Vector8 {
        Vector8::from_fn(|i, _| if self.0[i / 2] { 1.0 } else { 0.0 })
    }
}

impl From<[bool; N_FEET]> for ContactSchedule {
    fn from(stance: [bool; N_FEET]) -> Self {
        Self(stance)
    }
}

// ---------------------------------------------------------------------------
// BodyState
// ---------------------------------------------------------------------------

/// Body state in the centroidal model.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyState {
    /// Center of mass position in world frame (meters).
    pub position: Vector3<f64>,
    /// Euler angles: roll, pitch, yaw (radians).
    pub orientation: Vector3<f64>,
    /// Linear velocity in world frame (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity in world frame (rad/s).
    pub angular_velocity: Vector3<f64>,
}

impl BodyState {
    /// Body at rest, level, at the given height above the origin.
    pub fn standing(height: f64) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, height),
            orientation: Vector3::zeros(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    /// Pack into the fixed 12-element state `[p, Θ, v, ω]`.
    pub fn to_vector12(&self) -> Vector12 {
        let mut x = Vector12::zeros();
        x.fixed_rows_mut::<3>(POSITION).copy_from(&self.position);
        x.fixed_rows_mut::<3>(ORIENTATION).copy_from(&self.orientation);
        x.fixed_rows_mut::<3>(LINEAR_VELOCITY).copy_from(&self.linear_velocity);
        x.fixed_rows_mut::<3>(ANGULAR_VELOCITY).copy_from(&self.angular_velocity);
        x
    }

    /// Pack into a 12-element dynamic state vector.
    pub fn to_state_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(self.to_vector12().as_slice())
    }

    /// Unpack from the leading 12 entries of a state vector.
    ///
    /// Longer vectors (the augmented layout) are accepted; the foot offsets
    /// are ignored.
    pub fn from_state_vector(x: &DVector<f64>) -> Result<Self, ModelError> {
        if x.len() < CENTROIDAL_DIM {
            return Err(ModelError::DimensionMismatch {
                what: "x",
                expected: CENTROIDAL_DIM,
                got: x.len(),
            });
        }
        Ok(Self {
            position: x.fixed_rows::<3>(POSITION).into_owned(),
            orientation: x.fixed_rows::<3>(ORIENTATION).into_owned(),
            linear_velocity: x.fixed_rows::<3>(LINEAR_VELOCITY).into_owned(),
            angular_velocity: x.fixed_rows::<3>(ANGULAR_VELOCITY).into_owned(),
        })
    }
}
