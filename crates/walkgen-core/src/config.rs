use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_mass() -> f64 {
    2.500_002_79
}
const fn default_dt() -> f64 {
    0.02
}
const fn default_friction_coeff() -> f64 {
    1.0
}
const fn default_inertia_diagonal() -> [f64; 3] {
    [0.005_785_74, 0.019_381_08, 0.024_761_24]
}
const fn default_state_weights() -> [f64; 12] {
    [
        1.0, 1.0, 150.0, 35.0, 30.0, 8.0, 20.0, 20.0, 15.0, 4.0, 4.0, 8.0,
    ]
}
const fn default_force_weights() -> [f64; 12] {
    [0.2; 12]
}
const fn default_friction_weight() -> f64 {
    10.0
}
const fn default_shoulder_height_limit() -> f64 {
    0.24
}
const fn default_shoulder_height_weight() -> f64 {
    100.0
}
const fn default_unit_weights() -> [f64; 8] {
    [1.0; 8]
}
const fn default_nominal_shoulders() -> [[f64; 2]; 4] {
    [
        [0.1946, 0.150_05],
        [0.1946, -0.150_05],
        [-0.1946, 0.150_05],
        [-0.1946, -0.150_05],
    ]
}
const fn default_gait_period() -> f64 {
    0.64
}
const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Physical constants and cost weights for the evaluation kernel.
///
/// Every field has a serde default, so a TOML file only needs to list what
/// differs from the reference quadruped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Total robot mass in kg.
    #[serde(default = "default_mass")]
    pub mass: f64,

    /// Node timestep in seconds.
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Coulomb friction coefficient of the pyramidal cone.
    #[serde(default = "default_friction_coeff")]
    pub friction_coeff: f64,

    /// Minimum normal force for a stance foot (N).
    #[serde(default)]
    pub min_normal_force: f64,

    /// Diagonal of the body-frame inertia tensor (kg m^2).
    #[serde(default = "default_inertia_diagonal")]
    pub inertia_diagonal: [f64; 3],

    /// Tracking weights on `[p, Θ, v, ω]`.
    #[serde(default = "default_state_weights")]
    pub state_weights: [f64; 12],

    /// Weights on the 12 contact-force components.
    #[serde(default = "default_force_weights")]
    pub force_weights: [f64; 12],

    /// Weight of the friction-cone penalty.
    #[serde(default = "default_friction_weight")]
    pub friction_weight: f64,

    #[serde(default)]
    pub shoulder_height: ShoulderHeightConfig,

    #[serde(default)]
    pub foot_placement: FootPlacementConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            dt: default_dt(),
            friction_coeff: default_friction_coeff(),
            min_normal_force: 0.0,
            inertia_diagonal: default_inertia_diagonal(),
            state_weights: default_state_weights(),
            force_weights: default_force_weights(),
            friction_weight: default_friction_weight(),
            shoulder_height: ShoulderHeightConfig::default(),
            foot_placement: FootPlacementConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mass <= 0.0 {
            return Err(ConfigError::invalid("mass", format!("{} (must be > 0)", self.mass)));
        }
        if self.dt <= 0.0 {
            return Err(ConfigError::invalid("dt", format!("{} (must be > 0)", self.dt)));
        }
        if self.friction_coeff < 0.0 {
            return Err(ConfigError::invalid(
                "friction_coeff",
                format!("{} (must be >= 0)", self.friction_coeff),
            ));
        }
        if self.min_normal_force < 0.0 {
            return Err(ConfigError::invalid(
                "min_normal_force",
                format!("{} (must be >= 0)", self.min_normal_force),
            ));
        }
        if self.inertia_diagonal.iter().any(|&i| i <= 0.0) {
            return Err(ConfigError::invalid(
                "inertia_diagonal",
                "all entries must be > 0",
            ));
        }
        if self.foot_placement.gait_period < 0.0 {
            return Err(ConfigError::invalid(
                "foot_placement.gait_period",
                format!("{} (must be >= 0)", self.foot_placement.gait_period),
            ));
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), mass = config.mass, dt = config.dt, "Loaded model config");
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// ShoulderHeightConfig
// ---------------------------------------------------------------------------

/// Shoulder-height inequality used by the 12-state centroidal layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoulderHeightConfig {
    /// Maximum shoulder height above ground (m).
    #[serde(default = "default_shoulder_height_limit")]
    pub limit: f64,

    /// Penalty weight on the height violation.
    #[serde(default = "default_shoulder_height_weight")]
    pub weight: f64,
}

impl Default for ShoulderHeightConfig {
    fn default() -> Self {
        Self {
            limit: default_shoulder_height_limit(),
            weight: default_shoulder_height_weight(),
        }
    }
}

// ---------------------------------------------------------------------------
// FootPlacementConfig
// ---------------------------------------------------------------------------

/// Foot-placement tracking used by the 20-state augmented layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootPlacementConfig {
    /// Weights on the heuristic shoulder-position residual, `(x, y)` per foot.
    #[serde(default = "default_unit_weights")]
    pub shoulder_weights: [f64; 8],

    /// Weights on the last-position tracking term, `(x, y)` per foot.
    #[serde(default = "default_unit_weights")]
    pub last_position_weights: [f64; 8],

    /// Nominal shoulder positions in the base frame, `[x, y]` per foot
    /// (FL, FR, HL, HR).
    #[serde(default = "default_nominal_shoulders")]
    pub nominal_shoulders: [[f64; 2]; 4],

    /// Gait period in seconds, scales the symmetry term.
    #[serde(default = "default_gait_period")]
    pub gait_period: f64,

    /// Bias the reference by the commanded planar velocity.
    #[serde(default = "default_true")]
    pub symmetry_term: bool,

    /// Bias the reference by the centrifugal correction.
    #[serde(default = "default_true")]
    pub centrifugal_term: bool,
}

impl Default for FootPlacementConfig {
    fn default() -> Self {
        Self {
            shoulder_weights: default_unit_weights(),
            last_position_weights: default_unit_weights(),
            nominal_shoulders: default_nominal_shoulders(),
            gait_period: default_gait_period(),
            symmetry_term: true,
            centrifugal_term: true,
        }
    }
}
