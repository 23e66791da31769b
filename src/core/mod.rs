pub mod config;
pub mod constraints;
pub mod types;

pub use config::{PsoConfig, DEFAULT_COEFFICIENTS, DEFAULT_SWARM_SIZE, DEFAULT_TIME_STEPS};
pub use constraints::validate_config;
pub use types::*;
