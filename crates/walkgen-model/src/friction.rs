//! Linearized friction pyramid as a one-sided quadratic penalty.
//!
//! For each foot with force `f = (fx, fy, fz)` the five faces are
//!
//! ```text
//!  fx - mu fz ≤ 0      -fx - mu fz ≤ 0
//!  fy - mu fz ≤ 0      -fy - mu fz ≤ 0
//!  -fz ≤ ub_5
//! ```
//!
//! where `ub_5 = -f_min` for a stance foot and `0` for a swing foot. The
//! penalty is `½ w Σ max(0, face - ub)²`; its Hessian uses the active set
//! `face - ub ≥ 0` (Gauss-Newton at the kink).

use nalgebra::{Matrix3, Vector3};

use crate::types::{
    ContactSchedule, FACES_PER_FOOT, Matrix12, N_FEET, Vector12, Vector20,
};

/// Index of the normal-force face within a foot's five faces.
const NORMAL_FACE: usize = 4;

/// Pyramidal friction cone with coefficient `mu`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionCone {
    mu: f64,
}

impl FrictionCone {
    pub const fn new(mu: f64) -> Self {
        Self { mu }
    }

    pub const fn mu(&self) -> f64 {
        self.mu
    }

    /// Upper bounds of the 20 faces for a contact schedule.
    pub fn upper_bounds(schedule: &ContactSchedule, min_normal_force: f64) -> Vector20 {
        let mut ub = Vector20::zeros();
        for foot in schedule.stance_feet() {
            ub[FACES_PER_FOOT * foot + NORMAL_FACE] = -min_normal_force;
        }
        ub
    }

    /// Left-hand side of the 20 face inequalities.
    pub fn face_values(&self, u: &Vector12) -> Vector20 {
        let mut faces = Vector20::zeros();
        for foot in 0..N_FEET {
            let (fx, fy, fz) = (u[3 * foot], u[3 * foot + 1], u[3 * foot + 2]);
            let row = FACES_PER_FOOT * foot;
            faces[row] = self.mu.mul_add(-fz, fx);
            faces[row + 1] = self.mu.mul_add(-fz, -fx);
            faces[row + 2] = self.mu.mul_add(-fz, fy);
            faces[row + 3] = self.mu.mul_add(-fz, -fy);
            faces[row + NORMAL_FACE] = -fz;
        }
        faces
    }

    /// Clamp the margins `face - ub` to the violation amounts.
    pub fn violation(margin: &Vector20) -> Vector20 {
        margin.map(|m| m.max(0.0))
    }

    /// Gradient of `½ w ‖violation‖²` with respect to the forces.
    pub fn gradient(&self, violation: &Vector20, weight: f64) -> Vector12 {
        let mut grad = Vector12::zeros();
        for foot in 0..N_FEET {
            let v = violation.fixed_rows::<FACES_PER_FOOT>(FACES_PER_FOOT * foot) * weight;
            let g = Vector3::new(
                v[0] - v[1],
                v[2] - v[3],
                -self.mu * (v[0] + v[1] + v[2] + v[3]) - v[NORMAL_FACE],
            );
            grad.fixed_rows_mut::<3>(3 * foot).copy_from(&g);
        }
        grad
    }

    /// Gauss-Newton Hessian of `½ w ‖violation‖²`, block diagonal per foot.
    pub fn hessian(&self, margin: &Vector20, weight: f64) -> Matrix12 {
        let mu = self.mu;
        let mut hess = Matrix12::zeros();
        for foot in 0..N_FEET {
            let a = margin
                .fixed_rows::<FACES_PER_FOOT>(FACES_PER_FOOT * foot)
                .map(|m| if m >= 0.0 { weight } else { 0.0 });
            let xz = mu * (a[1] - a[0]);
            let yz = mu * (a[3] - a[2]);
            let zz = (mu * mu).mul_add(a[0] + a[1] + a[2] + a[3], a[NORMAL_FACE]);
            let block = Matrix3::new(
                a[0] + a[1], 0.0, xz,
                0.0, a[2] + a[3], yz,
                xz, yz, zz,
            );
            hess.fixed_view_mut::<3, 3>(3 * foot, 3 * foot).copy_from(&block);
        }
        hess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn forces(per_foot: [[f64; 3]; 4]) -> Vector12 {
        Vector12::from_iterator(per_foot.iter().flatten().copied())
    }

    #[test]
    fn upper_bounds_follow_schedule() {
        let schedule = ContactSchedule::new([true, false, true, false]);
        let ub = FrictionCone::upper_bounds(&schedule, 3.0);
        assert_relative_eq!(ub[4], -3.0);
        assert_relative_eq!(ub[9], 0.0);
        assert_relative_eq!(ub[14], -3.0);
        assert_relative_eq!(ub[19], 0.0);
        assert_relative_eq!(ub.abs().sum(), 6.0);
    }

    #[test]
    fn force_inside_cone_has_no_violation() {
        let cone = FrictionCone::new(0.8);
        let u = forces([[1.0, -2.0, 10.0], [0.0, 0.0, 5.0], [3.0, 3.0, 4.0], [0.0; 3]]);
        let ub = FrictionCone::upper_bounds(&ContactSchedule::all_stance(), 0.0);
        let viol = FrictionCone::violation(&(cone.face_values(&u) - ub));
        assert_relative_eq!(viol, Vector20::zeros());
    }

    #[test]
    fn sliding_force_violates_one_side() {
        let cone = FrictionCone::new(0.5);
        let u = forces([[8.0, 0.0, 10.0], [0.0, 0.0, 10.0], [0.0, 0.0, 10.0], [0.0, 0.0, 10.0]]);
        let viol = FrictionCone::violation(&cone.face_values(&u));
        assert_relative_eq!(viol[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(viol.sum(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn min_normal_force_bound() {
        let cone = FrictionCone::new(1.0);
        let schedule = ContactSchedule::all_stance();
        let ub = FrictionCone::upper_bounds(&schedule, 5.0);
        let u = forces([[0.0, 0.0, 2.0], [0.0, 0.0, 5.0], [0.0, 0.0, 9.0], [0.0, 0.0, 5.0]]);
        let viol = FrictionCone::violation(&(cone.face_values(&u) - ub));
        // Foot 0 carries 2 N < 5 N.
        assert_relative_eq!(viol[4], 3.0, epsilon = 1e-12);
        assert_relative_eq!(viol[9], 0.0, epsilon = 1e-12);
        assert_relative_eq!(viol[14], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn gradient_and_hessian_match_finite_differences() {
        let cone = FrictionCone::new(0.7);
        let weight = 10.0;
        let ub = FrictionCone::upper_bounds(&ContactSchedule::new([true, true, false, true]), 1.0);
        let u = forces([[6.0, -1.0, 4.0], [-3.0, 5.0, 2.0], [0.5, 0.2, -1.5], [0.1, 0.2, 0.4]]);
        let cost = |u: &Vector12| {
            0.5 * weight * FrictionCone::violation(&(cone.face_values(u) - ub)).norm_squared()
        };

        let margin = cone.face_values(&u) - ub;
        let grad = cone.gradient(&FrictionCone::violation(&margin), weight);
        let hess = cone.hessian(&margin, weight);

        let h = 1e-6;
        for i in 0..12 {
            let mut plus = u;
            plus[i] += h;
            let mut minus = u;
            minus[i] -= h;
            assert_relative_eq!(grad[i], (cost(&plus) - cost(&minus)) / (2.0 * h), epsilon = 1e-5);

            let margin_p = cone.face_values(&plus) - ub;
            let margin_m = cone.face_values(&minus) - ub;
            let dg = (cone.gradient(&FrictionCone::violation(&margin_p), weight)
                - cone.gradient(&FrictionCone::violation(&margin_m), weight))
                / (2.0 * h);
            assert_relative_eq!(hess.column(i).into_owned(), dg, epsilon = 1e-5);
        }
    }

    #[test]
    fn hessian_is_block_diagonal() {
        let cone = FrictionCone::new(1.0);
        let u = forces([[5.0, 5.0, -1.0]; 4]);
        let hess = cone.hessian(&cone.face_values(&u), 1.0);
        assert_relative_eq!(hess.fixed_view::<3, 3>(0, 3).into_owned(), Matrix3::zeros());
        assert_relative_eq!(hess, hess.transpose(), epsilon = 1e-12);
    }
}
