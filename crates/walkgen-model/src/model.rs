//! Per-node action model: reparametrization, forward pass and derivatives.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3x4, Vector3};
use tracing::{debug, warn};
use walkgen_core::{ModelConfig, ModelError};

use crate::data::ActionData;
use crate::dynamics::{
    clear_foot_blocks, contact_sensitivity, gravity_drift, set_force_block, state_transition,
    torque_block, world_inverse_inertia,
};
use crate::friction::FrictionCone;
use crate::layout::{Augmented, Centroidal, StateLayout};
use crate::params::ModelParams;
use crate::types::{
    ANGULAR_VELOCITY, CENTROIDAL_DIM, CONTROL_DIM, ContactSchedule, Matrix12, N_FEET, POSITION,
    Vector12, Vector20, YAW,
};

/// 12-state model with fixed footholds.
pub type CentroidalModel = ActionModel<Centroidal>;
/// 20-state model with the foot positions in the state.
pub type AugmentedModel = ActionModel<Augmented>;

/// Source of model stamps; 0 is never handed out.
static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Everything [`ActionModel::update_model`] derives for one node.
#[derive(Clone, Debug)]
struct NodeSetup {
    /// Timestep the matrices below were built with.
    dt: f64,
    xref: Vector12,
    schedule: ContactSchedule,
    inertia_inv: Matrix3<f64>,
    transition: Matrix12,
    drift: Vector12,
    /// Translational blocks only; torque blocks are per evaluation.
    input: Matrix12,
    upper_bounds: Vector20,
    /// Parameter revision the setup was built from, `None` until the first
    /// reparametrization.
    revision: Option<u64>,
}

impl NodeSetup {
    /// All feet in swing, zero reference.
    fn unconfigured(params: &ModelParams) -> Self {
        let schedule = ContactSchedule::all_swing();
        Self {
            dt: params.dt(),
            xref: Vector12::zeros(),
            schedule,
            inertia_inv: world_inverse_inertia(0.0, params.inertia()),
            transition: state_transition(params.dt()),
            drift: gravity_drift(params.dt()),
            input: Matrix12::zeros(),
            upper_bounds: FrictionCone::upper_bounds(&schedule, params.min_normal_force()),
            revision: None,
        }
    }
}

/// Dynamics and cost of one trajectory node.
///
/// Two phases: [`update_model`](Self::update_model) configures the node for
/// a contact schedule, reference state and footholds; [`calc`](Self::calc)
/// and [`calc_diff`](Self::calc_diff) then evaluate it any number of times.
/// Evaluation only reads the model, so one configured model can be shared
/// by several threads as long as each owns its [`ActionData`].
///
/// The cost is
///
/// ```text
/// ½‖r‖² + ½ w_f ‖max(0, faces(u) - ub)‖² + layout terms
/// ```
///
/// with `r = [sw ⊙ (x - xref), layout rows, fw ⊙ u]`.
#[derive(Clone, Debug)]
pub struct ActionModel<L: StateLayout> {
    params: ModelParams,
    layout: L,
    node: NodeSetup,
    /// Changes whenever the node or anything the evaluation reads may have
    /// changed; recorded by [`ActionData`] to detect stale forward passes.
    stamp: u64,
}

impl<L: StateLayout> Default for ActionModel<L> {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl<L: StateLayout> ActionModel<L> {
    pub fn new(params: ModelParams, layout: L) -> Self {
        let node = NodeSetup::unconfigured(&params);
        Self {
            params,
            layout,
            node,
            stamp: next_stamp(),
        }
    }

    /// Build from configuration. The config is expected to be validated.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(ModelParams::from_config(config), L::from_config(config))
    }

    /// State dimension.
    pub const fn nx(&self) -> usize {
        L::NX
    }

    /// Control dimension.
    pub const fn nu(&self) -> usize {
        CONTROL_DIM
    }

    /// Residual dimension.
    pub const fn nr(&self) -> usize {
        CENTROIDAL_DIM + L::NR_EXTRA + CONTROL_DIM
    }

    pub const fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Mutable parameters. Changes to mass, timestep, inertia or minimum
    /// normal force only reach the evaluation after the next
    /// [`update_model`](Self::update_model).
    ///
    /// Results computed before the call are treated as stale by
    /// [`calc_diff`](Self::calc_diff).
    pub fn params_mut(&mut self) -> &mut ModelParams {
        self.stamp = next_stamp();
        &mut self.params
    }

    pub const fn layout(&self) -> &L {
        &self.layout
    }

    /// Like [`params_mut`](Self::params_mut), invalidates earlier results.
    pub fn layout_mut(&mut self) -> &mut L {
        self.stamp = next_stamp();
        &mut self.layout
    }

    /// Result container sized for this model.
    pub fn create_data(&self) -> ActionData {
        ActionData::new(self.nx(), self.nu(), self.nr())
    }

    /// Reparametrize the node.
    ///
    /// `l_feet` is 3×4 with one foothold per column, `xref` the 12-element
    /// reference state and `contact_schedule` one value per foot, non-zero
    /// for stance.
    pub fn update_model(
        &mut self,
        l_feet: &DMatrix<f64>,
        xref: &DVector<f64>,
        contact_schedule: &[f64],
    ) -> Result<(), ModelError> {
        ModelError::check_dim("l_feet rows", 3, l_feet.nrows())?;
        ModelError::check_dim("l_feet cols", N_FEET, l_feet.ncols())?;
        ModelError::check_dim("xref", CENTROIDAL_DIM, xref.len())?;
        let schedule = ContactSchedule::from_values(contact_schedule)?;

        let l_feet: Matrix3x4<f64> = l_feet.fixed_view::<3, N_FEET>(0, 0).into_owned();
        let xref = Vector12::from_column_slice(xref.as_slice());
        self.configure(&l_feet, &xref, schedule);
        Ok(())
    }

    /// Typed form of [`update_model`](Self::update_model).
    pub fn configure(
        &mut self,
        l_feet: &Matrix3x4<f64>,
        xref: &Vector12,
        schedule: ContactSchedule,
    ) {
        let dt = self.params.dt();
        let gain = dt / self.params.mass();

        let mut input = Matrix12::zeros();
        for foot in 0..N_FEET {
            if schedule.is_stance(foot) {
                set_force_block(&mut input, foot, gain);
            } else {
                clear_foot_blocks(&mut input, foot);
            }
        }

        self.node = NodeSetup {
            dt,
            xref: *xref,
            schedule,
            inertia_inv: world_inverse_inertia(xref[YAW], self.params.inertia()),
            transition: state_transition(dt),
            drift: gravity_drift(dt),
            input,
            upper_bounds: FrictionCone::upper_bounds(&schedule, self.params.min_normal_force()),
            revision: Some(self.params.revision()),
        };
        self.layout.reparametrize(l_feet, xref);
        self.stamp = next_stamp();

        debug!(
            layout = L::NAME,
            stance = schedule.stance_count(),
            yaw = xref[YAW],
            "Reparametrized node"
        );
    }

    /// Whether `data` holds the forward pass of this model, in its current
    /// setup, at `(x, u)`.
    pub fn is_evaluated(&self, data: &ActionData, x: &DVector<f64>, u: &DVector<f64>) -> bool {
        data.is_evaluated_at(self.stamp, x, u)
    }

    /// Whether the node was reparametrized since the last change of mass,
    /// timestep, inertia or minimum normal force.
    pub fn is_configured(&self) -> bool {
        self.node.revision == Some(self.params.revision())
    }

    /// Discrete state-transition matrix of the centroidal block.
    pub const fn state_transition(&self) -> &Matrix12 {
        &self.node.transition
    }

    /// Input matrix of the last reparametrization (translational blocks).
    pub const fn input_matrix(&self) -> &Matrix12 {
        &self.node.input
    }

    pub const fn world_inverse_inertia(&self) -> &Matrix3<f64> {
        &self.node.inertia_inv
    }

    pub const fn friction_upper_bounds(&self) -> &Vector20 {
        &self.node.upper_bounds
    }

    pub const fn reference(&self) -> &Vector12 {
        &self.node.xref
    }

    pub const fn contact_schedule(&self) -> ContactSchedule {
        self.node.schedule
    }

    fn check_inputs(
        &self,
        data: &ActionData,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<(), ModelError> {
        ModelError::check_dim("x", L::NX, x.len())?;
        ModelError::check_dim("u", CONTROL_DIM, u.len())?;
        ModelError::check_dim("data.nx", L::NX, data.nx())?;
        ModelError::check_dim("data.nu", CONTROL_DIM, data.nu())?;
        ModelError::check_dim("data.r", self.nr(), data.r.len())
    }

    /// Forward pass: next state, residual, violations and cost.
    pub fn calc(
        &self,
        data: &mut ActionData,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<(), ModelError> {
        self.check_inputs(data, x, u)?;
        if !self.is_configured() && data.warned_stamp != self.stamp {
            warn!(
                layout = L::NAME,
                revision = self.params.revision(),
                "calc on a node not reparametrized since the last parameter change"
            );
            data.warned_stamp = self.stamp;
        }

        let node = &self.node;
        let dt = node.dt;
        let xc: Vector12 = x.fixed_rows::<CENTROIDAL_DIM>(0).into_owned();
        let uc = Vector12::from_column_slice(u.as_slice());
        let base: Vector3<f64> = xc.fixed_rows::<3>(POSITION).into_owned();

        data.input = node.input;
        for foot in node.schedule.stance_feet() {
            let lever = self.layout.contact_point(foot, x) - base;
            data.input
                .fixed_view_mut::<3, 3>(ANGULAR_VELOCITY, 3 * foot)
                .copy_from(&torque_block(dt, &node.inertia_inv, &lever));
        }

        let next = node.transition * xc + node.drift + data.input * uc;
        data.xnext
            .fixed_rows_mut::<CENTROIDAL_DIM>(0)
            .copy_from(&next);

        let state_res = (xc - node.xref).component_mul(self.params.state_weights());
        let force_res = uc.component_mul(self.params.force_weights());
        data.r
            .fixed_rows_mut::<CENTROIDAL_DIM>(0)
            .copy_from(&state_res);
        data.r
            .fixed_rows_mut::<CONTROL_DIM>(CENTROIDAL_DIM + L::NR_EXTRA)
            .copy_from(&force_res);

        let cone = FrictionCone::new(self.params.mu());
        data.cone_margin = cone.face_values(&uc) - node.upper_bounds;
        data.cone_violation = FrictionCone::violation(&data.cone_margin);

        let layout_cost = self.layout.evaluate(&node.schedule, x, data);
        data.cost = 0.5 * data.r.norm_squared()
            + 0.5 * self.params.friction_weight() * data.cone_violation.norm_squared()
            + layout_cost;

        data.mark_evaluated(self.stamp, x, u);
        Ok(())
    }

    /// Derivative pass: cost gradient and Hessians, dynamics Jacobians.
    ///
    /// Reuses the buffers of the forward pass on the same `(x, u)`. If `data`
    /// holds a different evaluation the forward pass is run first.
    pub fn calc_diff(
        &self,
        data: &mut ActionData,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<(), ModelError> {
        self.check_inputs(data, x, u)?;
        if !self.is_evaluated(data, x, u) {
            warn!(
                layout = L::NAME,
                "calc_diff without a matching calc, running the forward pass"
            );
            self.calc(data, x, u)?;
        }

        let node = &self.node;
        let dt = node.dt;
        let sw = self.params.state_weights();
        let fw = self.params.force_weights();
        let cone = FrictionCone::new(self.params.mu());
        let friction_weight = self.params.friction_weight();

        // Cost w.r.t. the state.
        let state_res: Vector12 = data.r.fixed_rows::<CENTROIDAL_DIM>(0).into_owned();
        data.lx.fill(0.0);
        data.lx
            .fixed_rows_mut::<CENTROIDAL_DIM>(0)
            .copy_from(&state_res.component_mul(sw));
        data.lxx.fill(0.0);
        for i in 0..CENTROIDAL_DIM {
            data.lxx[(i, i)] = sw[i] * sw[i];
        }
        self.layout.differentiate(&node.schedule, x, data);

        // Cost w.r.t. the control.
        let force_res: Vector12 = data
            .r
            .fixed_rows::<CONTROL_DIM>(CENTROIDAL_DIM + L::NR_EXTRA)
            .into_owned();
        let lu = force_res.component_mul(fw) + cone.gradient(&data.cone_violation, friction_weight);
        data.lu.copy_from(&lu);
        let mut luu = cone.hessian(&data.cone_margin, friction_weight);
        for i in 0..CONTROL_DIM {
            luu[(i, i)] += fw[i] * fw[i];
        }
        data.luu.copy_from(&luu);
        data.lxu.fill(0.0);

        // Dynamics.
        data.fx.fill_with_identity();
        data.fx
            .fixed_view_mut::<CENTROIDAL_DIM, CENTROIDAL_DIM>(0, 0)
            .copy_from(&node.transition);
        for foot in node.schedule.stance_feet() {
            let force: Vector3<f64> = u.fixed_rows::<3>(3 * foot).into_owned();
            let sens = contact_sensitivity(dt, &node.inertia_inv, &force);
            let mut d_base = data.fx.fixed_view_mut::<3, 3>(ANGULAR_VELOCITY, POSITION);
            d_base -= sens;
            if let Some(col) = L::contact_column(foot) {
                let mut d_contact = data.fx.fixed_view_mut::<3, 2>(ANGULAR_VELOCITY, col);
                d_contact += sens.fixed_columns::<2>(0);
            }
        }

        data.fu.fill(0.0);
        data.fu
            .fixed_view_mut::<CENTROIDAL_DIM, CONTROL_DIM>(0, 0)
            .copy_from(&data.input);
        Ok(())
    }
}
