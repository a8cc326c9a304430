// walkgen-core: errors and configuration for the walkgen evaluation kernel.

pub mod config;
pub mod error;

pub use config::{FootPlacementConfig, ModelConfig, ShoulderHeightConfig};
pub use error::{ConfigError, ModelError, WalkgenError};
