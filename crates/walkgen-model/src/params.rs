//! Physical constants and tracking weights shared by both state layouts.

use nalgebra::{Matrix3, Vector3};
use walkgen_core::{ModelConfig, ModelError};

use crate::types::{CENTROIDAL_DIM, CONTROL_DIM, Vector12};

/// Model parameter store.
///
/// Mass, timestep, inertia and the minimum normal force feed the matrices
/// and bounds built by
/// [`ActionModel::update_model`](crate::ActionModel::update_model). Changing
/// them bumps [`revision`](Self::revision) but does not rebuild anything; the
/// caller must reparametrize every node afterwards.
#[derive(Clone, Debug)]
pub struct ModelParams {
    mass: f64,
    dt: f64,
    mu: f64,
    min_normal_force: f64,
    inertia: Matrix3<f64>,
    state_weights: Vector12,
    force_weights: Vector12,
    friction_weight: f64,
    revision: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl ModelParams {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            mass: config.mass,
            dt: config.dt,
            mu: config.friction_coeff,
            min_normal_force: config.min_normal_force,
            inertia: Matrix3::from_diagonal(&Vector3::from(config.inertia_diagonal)),
            state_weights: Vector12::from(config.state_weights),
            force_weights: Vector12::from(config.force_weights),
            friction_weight: config.friction_weight,
            revision: 0,
        }
    }

    /// Total robot mass in kg.
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    pub const fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.revision += 1;
    }

    /// Node timestep in seconds.
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    pub const fn set_dt(&mut self, dt: f64) {
        self.dt = dt;
        self.revision += 1;
    }

    /// Body-frame inertia tensor.
    pub const fn inertia(&self) -> &Matrix3<f64> {
        &self.inertia
    }

    pub const fn set_inertia(&mut self, inertia: Matrix3<f64>) {
        self.inertia = inertia;
        self.revision += 1;
    }

    /// Friction coefficient.
    pub const fn mu(&self) -> f64 {
        self.mu
    }

    pub const fn set_mu(&mut self, mu: f64) {
        self.mu = mu;
    }

    /// Minimum normal force of a stance foot.
    pub const fn min_normal_force(&self) -> f64 {
        self.min_normal_force
    }

    /// Takes effect at the next reparametrization.
    pub const fn set_min_normal_force(&mut self, min_normal_force: f64) {
        self.min_normal_force = min_normal_force;
        self.revision += 1;
    }

    pub const fn state_weights(&self) -> &Vector12 {
        &self.state_weights
    }

    pub fn set_state_weights(&mut self, weights: &[f64]) -> Result<(), ModelError> {
        ModelError::check_dim("state_weights", CENTROIDAL_DIM, weights.len())?;
        self.state_weights = Vector12::from_column_slice(weights);
        Ok(())
    }

    pub const fn force_weights(&self) -> &Vector12 {
        &self.force_weights
    }

    pub fn set_force_weights(&mut self, weights: &[f64]) -> Result<(), ModelError> {
        ModelError::check_dim("force_weights", CONTROL_DIM, weights.len())?;
        self.force_weights = Vector12::from_column_slice(weights);
        Ok(())
    }

    pub const fn friction_weight(&self) -> f64 {
        self.friction_weight
    }

    pub const fn set_friction_weight(&mut self, weight: f64) {
        self.friction_weight = weight;
    }

    /// Counter bumped by every setter whose value feeds the reparametrized
    /// matrices or friction bounds: mass, timestep, inertia and minimum
    /// normal force.
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_reference_quadruped() {
        let p = ModelParams::default();
        assert_relative_eq!(p.mass(), 2.500_002_79);
        assert_relative_eq!(p.dt(), 0.02);
        assert_relative_eq!(p.mu(), 1.0);
        assert_relative_eq!(p.min_normal_force(), 0.0);
        assert_relative_eq!(p.inertia()[(0, 0)], 0.005_785_74);
        assert_relative_eq!(p.inertia()[(2, 2)], 0.024_761_24);
        assert_relative_eq!(p.inertia()[(0, 1)], 0.0);
        assert_relative_eq!(p.state_weights()[2], 150.0);
        assert_relative_eq!(p.force_weights()[7], 0.2);
        assert_relative_eq!(p.friction_weight(), 10.0);
    }

    #[test]
    fn weight_setters_validate_length() {
        let mut p = ModelParams::default();
        assert_eq!(
            p.set_state_weights(&[1.0; 8]),
            Err(ModelError::DimensionMismatch {
                what: "state_weights",
                expected: 12,
                got: 8
            })
        );
        assert!(p.set_force_weights(&[1.0; 13]).is_err());

        p.set_force_weights(&[0.5; 12]).unwrap();
        assert_relative_eq!(p.force_weights()[11], 0.5);
        // A rejected call leaves the previous weights in place.
        assert_relative_eq!(p.state_weights()[2], 150.0);
    }

    #[test]
    fn physical_setters_bump_revision() {
        let mut p = ModelParams::default();
        assert_eq!(p.revision(), 0);
        p.set_mass(3.0);
        p.set_dt(0.01);
        p.set_inertia(Matrix3::identity());
        assert_eq!(p.revision(), 3);
        p.set_min_normal_force(2.0);
        assert_eq!(p.revision(), 4);

        p.set_mu(0.5);
        p.set_friction_weight(1.0);
        p.set_state_weights(&[1.0; 12]).unwrap();
        assert_eq!(p.revision(), 4);
    }
}
