//! Discrete centroidal dynamics.
//!
//! Treats the robot as a single floating rigid body with point-contact feet.
//! With `x = [p, Θ, v, ω]` and one force `f_i` per foot, one explicit step of
//! length `dt` is
//!
//! ```text
//! p⁺ = p + dt v
//! Θ⁺ = Θ + dt ω
//! v⁺ = v + dt/m Σ f_i - dt g e_z
//! ω⁺ = ω + dt R Σ (c_i - p) × f_i,      R = (R_z(yaw_ref) I_body)^{-1}
//! ```
//!
//! i.e. `x⁺ = A x + B(x) u + g` where only the torque blocks of `B` depend
//! on the state, through the lever arms `c_i - p`.
//!
//! Convexification assumptions:
//! 1. Euler rates equal the angular velocity (small roll/pitch)
//! 2. Inertia is rotated with the reference yaw only
//! 3. Swing feet contribute no force or torque

use nalgebra::{Matrix3, Vector3};

use crate::types::{ANGULAR_VELOCITY, GRAVITY, LINEAR_VELOCITY, Matrix12, Vector12};

/// Discrete state-transition matrix `A = [[I, dt I], [0, I]]` (6×6 blocks).
pub fn state_transition(dt: f64) -> Matrix12 {
    let mut a = Matrix12::identity();
    for i in 0..6 {
        a[(i, i + 6)] = dt;
    }
    a
}

/// Constant gravity drift on the vertical velocity.
pub fn gravity_drift(dt: f64) -> Vector12 {
    let mut g = Vector12::zeros();
    g[LINEAR_VELOCITY + 2] = -GRAVITY * dt;
    g
}

/// World-frame inverse inertia `(R_z(yaw) I_body)^{-1}`.
///
/// # Panics
///
/// Panics if `body_inertia` is singular. Like mass, the inertia is assumed
/// to be validated by the caller.
pub fn world_inverse_inertia(yaw: f64, body_inertia: &Matrix3<f64>) -> Matrix3<f64> {
    (yaw_rotation_matrix(yaw) * body_inertia)
        .try_inverse()
        .expect("world-frame inertia tensor must be invertible")
}

/// Set the translational block of `foot`: `v⁺ += gain · f_foot`.
pub fn set_force_block(b: &mut Matrix12, foot: usize, gain: f64) {
    b.fixed_view_mut::<3, 3>(LINEAR_VELOCITY, 3 * foot)
        .copy_from(&(Matrix3::identity() * gain));
}

/// Zero both the translational and the torque block of `foot`.
pub fn clear_foot_blocks(b: &mut Matrix12, foot: usize) {
    b.fixed_view_mut::<3, 3>(LINEAR_VELOCITY, 3 * foot).fill(0.0);
    b.fixed_view_mut::<3, 3>(ANGULAR_VELOCITY, 3 * foot).fill(0.0);
}

/// Torque block of the input matrix for one stance foot: `dt R [r]_×`.
pub fn torque_block(dt: f64, inertia_inv: &Matrix3<f64>, lever: &Vector3<f64>) -> Matrix3<f64> {
    inertia_inv * skew_symmetric(lever) * dt
}

/// Sensitivity of `ω⁺` to the contact point of a foot carrying `force`.
///
/// From `∂/∂c (c × f) = -[f]_×`. The sensitivity to the base position is
/// the negative of this, since the lever arm is `c - p`.
pub fn contact_sensitivity(
    dt: f64,
    inertia_inv: &Matrix3<f64>,
    force: &Vector3<f64>,
) -> Matrix3<f64> {
    -(inertia_inv * skew_symmetric(force) * dt)
}

/// Compute the yaw-only rotation matrix R_z(yaw).
pub fn yaw_rotation_matrix(yaw: f64) -> Matrix3<f64> {
    let (sy, cy) = yaw.sin_cos();
    Matrix3::new(cy, -sy, 0.0, sy, cy, 0.0, 0.0, 0.0, 1.0)
}

/// Compute the skew-symmetric (cross product) matrix of a 3D vector.
///
/// ```text
/// [v]_× = [ 0   -vz   vy ]
///         [ vz   0   -vx ]
///         [-vy   vx   0  ]
/// ```
pub fn skew_symmetric(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::types::{ORIENTATION, POSITION};

    fn test_inertia() -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(0.005_785_74, 0.019_381_08, 0.024_761_24))
    }

    #[test]
    fn skew_symmetric_properties() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let s = skew_symmetric(&v);

        assert_relative_eq!(s, -s.transpose(), epsilon = 1e-12);

        let w = Vector3::new(4.0, 5.0, 6.0);
        assert_relative_eq!(s * w, v.cross(&w), epsilon = 1e-12);
    }

    #[test]
    fn transition_integrates_velocities() {
        let dt = 0.02;
        let a = state_transition(dt);
        let mut x = Vector12::zeros();
        x[LINEAR_VELOCITY] = 1.0;
        x[ANGULAR_VELOCITY + 2] = 2.0;
        let next = a * x;
        assert_relative_eq!(next[POSITION], dt, epsilon = 1e-12);
        assert_relative_eq!(next[ORIENTATION + 2], 2.0 * dt, epsilon = 1e-12);
        assert_relative_eq!(next[LINEAR_VELOCITY], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gravity_drift_only_on_vertical_velocity() {
        let g = gravity_drift(0.02);
        assert_relative_eq!(g[LINEAR_VELOCITY + 2], -0.1962, epsilon = 1e-12);
        assert_relative_eq!(g.sum(), -0.1962, epsilon = 1e-12);
    }

    #[test]
    fn inverse_inertia_at_zero_yaw_is_diagonal_inverse() {
        let r = world_inverse_inertia(0.0, &test_inertia());
        assert_relative_eq!(r[(0, 0)], 1.0 / 0.005_785_74, epsilon = 1e-9);
        assert_relative_eq!(r[(1, 1)], 1.0 / 0.019_381_08, epsilon = 1e-9);
        assert_relative_eq!(r[(0, 1)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inverse_inertia_inverts_rotated_inertia() {
        let yaw = 0.7;
        let r = world_inverse_inertia(yaw, &test_inertia());
        let product = yaw_rotation_matrix(yaw) * test_inertia() * r;
        assert_relative_eq!(product, Matrix3::identity(), epsilon = 1e-10);
    }

    #[test]
    fn force_blocks_set_and_clear() {
        let mut b = Matrix12::zeros();
        set_force_block(&mut b, 2, 0.008);
        assert_relative_eq!(b[(LINEAR_VELOCITY, 6)], 0.008, epsilon = 1e-15);
        assert_relative_eq!(b[(LINEAR_VELOCITY + 2, 8)], 0.008, epsilon = 1e-15);
        assert_relative_eq!(b[(LINEAR_VELOCITY, 7)], 0.0, epsilon = 1e-15);

        b.fixed_view_mut::<3, 3>(ANGULAR_VELOCITY, 6).fill(1.0);
        clear_foot_blocks(&mut b, 2);
        assert_relative_eq!(b, Matrix12::zeros(), epsilon = 1e-15);
    }

    #[test]
    fn torque_from_vertical_force() {
        // r=(1,0,0), f_z: torque = (1,0,0)×(0,0,1) = (0,-1,0)
        let block = torque_block(1.0, &Matrix3::identity(), &Vector3::new(1.0, 0.0, 0.0));
        let torque = block * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(torque, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn contact_sensitivity_matches_cross_product_derivative() {
        let dt = 0.02;
        let r_inv = world_inverse_inertia(0.3, &test_inertia());
        let force = Vector3::new(1.5, -2.0, 20.0);
        let contact = Vector3::new(0.2, -0.1, 0.0);
        let sens = contact_sensitivity(dt, &r_inv, &force);

        let h = 1e-6;
        for j in 0..3 {
            let mut plus = contact;
            plus[j] += h;
            let mut minus = contact;
            minus[j] -= h;
            let fd = (torque_block(dt, &r_inv, &plus) * force
                - torque_block(dt, &r_inv, &minus) * force)
                / (2.0 * h);
            assert_relative_eq!(sens.column(j).into_owned(), fd, epsilon = 1e-6);
        }
    }
}
