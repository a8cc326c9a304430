//! Per-node result container.

use nalgebra::{DMatrix, DVector};

use crate::types::{Matrix12, Vector4, Vector20};

/// Outputs of one forward/derivative evaluation.
///
/// Allocated once per trajectory node with
/// [`ActionModel::create_data`](crate::ActionModel::create_data) and
/// overwritten by every call. Besides the outputs it keeps the intermediate
/// quantities the derivative pass reuses, so a model can be shared while each
/// node owns its own `ActionData`.
#[derive(Clone, Debug)]
pub struct ActionData {
    /// Next state.
    pub xnext: DVector<f64>,
    /// Weighted residual of the quadratic tracking terms.
    pub r: DVector<f64>,
    /// Total cost.
    pub cost: f64,
    /// Cost gradient w.r.t. the state.
    pub lx: DVector<f64>,
    /// Cost gradient w.r.t. the control.
    pub lu: DVector<f64>,
    /// Cost Hessian w.r.t. the state.
    pub lxx: DMatrix<f64>,
    /// Cost Hessian w.r.t. the control.
    pub luu: DMatrix<f64>,
    /// Mixed cost Hessian; the cost is separable so this stays zero.
    pub lxu: DMatrix<f64>,
    /// Dynamics Jacobian w.r.t. the state.
    pub fx: DMatrix<f64>,
    /// Dynamics Jacobian w.r.t. the control.
    pub fu: DMatrix<f64>,

    /// Input matrix including this evaluation's torque blocks.
    pub(crate) input: Matrix12,
    /// Friction face values minus their upper bounds.
    pub(crate) cone_margin: Vector20,
    pub(crate) cone_violation: Vector20,
    pub(crate) shoulder_violation: Vector4,
    last_x: DVector<f64>,
    last_u: DVector<f64>,
    /// Model stamp of the last forward pass, 0 before the first.
    last_stamp: u64,
    /// Model stamp the unconfigured-node warning was last emitted for.
    pub(crate) warned_stamp: u64,
}

impl ActionData {
    /// Zeroed container for a model with `nx` states, `nu` controls and `nr`
    /// residual rows.
    pub fn new(nx: usize, nu: usize, nr: usize) -> Self {
        Self {
            xnext: DVector::zeros(nx),
            r: DVector::zeros(nr),
            cost: 0.0,
            lx: DVector::zeros(nx),
            lu: DVector::zeros(nu),
            lxx: DMatrix::zeros(nx, nx),
            luu: DMatrix::zeros(nu, nu),
            lxu: DMatrix::zeros(nx, nu),
            fx: DMatrix::zeros(nx, nx),
            fu: DMatrix::zeros(nx, nu),
            input: Matrix12::zeros(),
            cone_margin: Vector20::zeros(),
            cone_violation: Vector20::zeros(),
            shoulder_violation: Vector4::zeros(),
            last_x: DVector::zeros(nx),
            last_u: DVector::zeros(nu),
            last_stamp: 0,
            warned_stamp: 0,
        }
    }

    pub fn nx(&self) -> usize {
        self.xnext.len()
    }

    pub fn nu(&self) -> usize {
        self.lu.len()
    }

    /// Friction-cone violation amounts, 5 per foot, all `>= 0`.
    pub const fn friction_violation(&self) -> &Vector20 {
        &self.cone_violation
    }

    /// Shoulder-height violation per foot (zero for layouts without the
    /// height penalty).
    pub const fn shoulder_height_violation(&self) -> &Vector4 {
        &self.shoulder_violation
    }

    /// Input matrix used by the last forward pass.
    pub const fn input_matrix(&self) -> &Matrix12 {
        &self.input
    }

    /// Whether the last forward pass ran on exactly this `(x, u)` under the
    /// model setup identified by `stamp`.
    pub(crate) fn is_evaluated_at(&self, stamp: u64, x: &DVector<f64>, u: &DVector<f64>) -> bool {
        self.last_stamp != 0 && self.last_stamp == stamp && self.last_x == *x && self.last_u == *u
    }

    pub(crate) fn mark_evaluated(&mut self, stamp: u64, x: &DVector<f64>, u: &DVector<f64>) {
        self.last_x.copy_from(x);
        self.last_u.copy_from(u);
        self.last_stamp = stamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_data_has_requested_shapes() {
        let d = ActionData::new(20, 12, 32);
        assert_eq!(d.xnext.len(), 20);
        assert_eq!(d.r.len(), 32);
        assert_eq!(d.lxx.shape(), (20, 20));
        assert_eq!(d.luu.shape(), (12, 12));
        assert_eq!(d.lxu.shape(), (20, 12));
        assert_eq!(d.fx.shape(), (20, 20));
        assert_eq!(d.fu.shape(), (20, 12));
        assert_eq!((d.nx(), d.nu()), (20, 12));
    }

    #[test]
    fn evaluation_marker_tracks_inputs() {
        let mut d = ActionData::new(12, 12, 24);
        let x = DVector::from_element(12, 0.1);
        let u = DVector::from_element(12, 2.0);
        assert!(!d.is_evaluated_at(0, &x, &u));
        assert!(!d.is_evaluated_at(7, &x, &u));

        d.mark_evaluated(7, &x, &u);
        assert!(d.is_evaluated_at(7, &x, &u));
        // Same inputs under another model setup are stale.
        assert!(!d.is_evaluated_at(8, &x, &u));

        let mut u2 = u.clone();
        u2[3] = 2.5;
        assert!(!d.is_evaluated_at(7, &x, &u2));
    }
}
