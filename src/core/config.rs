use super::constraints::validate_config;
use super::types::{Bound, Direction, InertiaSchedule, Parallelism, PsoVariant, VelocityBound};
use crate::error::PsoError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of particles in the swarm.
pub const DEFAULT_SWARM_SIZE: usize = 30;
/// Default number of time steps.
pub const DEFAULT_TIME_STEPS: usize = 1000;
/// Default cognitive and social coefficients (c1, c2).
pub const DEFAULT_COEFFICIENTS: (f64, f64) = (2.05, 2.05);

/// Everything the engine needs to know about a run, besides the strategies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PsoConfig {
    pub dimensions: usize,
    #[serde(default = "default_swarm_size")]
    pub swarm_size: usize,
    pub position_bounds: Vec<Bound>,
    /// Used only when seeding positions; falls back to `position_bounds`.
    #[serde(default)]
    pub initial_position_bounds: Option<Vec<Bound>>,
    pub velocity_bounds: Vec<VelocityBound>,
    #[serde(default = "default_c1")]
    pub c1: f64,
    #[serde(default = "default_c2")]
    pub c2: f64,
    #[serde(default)]
    pub variant: PsoVariant,
    #[serde(default)]
    pub inertia: Option<InertiaSchedule>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_time_steps")]
    pub time_steps: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallelism: Parallelism,
}

fn default_swarm_size() -> usize {
    DEFAULT_SWARM_SIZE
}

fn default_time_steps() -> usize {
    DEFAULT_TIME_STEPS
}

fn default_c1() -> f64 {
    DEFAULT_COEFFICIENTS.0
}

fn default_c2() -> f64 {
    DEFAULT_COEFFICIENTS.1
}

impl PsoConfig {
    /// Configuration for a `dimensions`-dimensional search in `[-100, 100]`
    /// with velocities limited to `±100`, every other field at its default.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            swarm_size: DEFAULT_SWARM_SIZE,
            position_bounds: vec![Bound::new(-100.0, 100.0); dimensions],
            initial_position_bounds: None,
            velocity_bounds: vec![VelocityBound::symmetric(100.0); dimensions],
            c1: DEFAULT_COEFFICIENTS.0,
            c2: DEFAULT_COEFFICIENTS.1,
            variant: PsoVariant::default(),
            inertia: None,
            direction: Direction::default(),
            time_steps: DEFAULT_TIME_STEPS,
            seed: None,
            parallelism: Parallelism::default(),
        }
    }

    /// Configure swarm size (default: 30)
    pub fn with_swarm_size(mut self, size: usize) -> Self {
        self.swarm_size = size;
        self
    }

    pub fn with_time_steps(mut self, steps: usize) -> Self {
        self.time_steps = steps;
        self
    }

    /// Same position bound for every dimension.
    pub fn with_uniform_bounds(mut self, min: f64, max: f64) -> Self {
        self.position_bounds = vec![Bound::new(min, max); self.dimensions];
        self
    }

    pub fn with_position_bounds<B: Into<Bound>>(mut self, bounds: Vec<B>) -> Self {
        self.position_bounds = bounds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_initial_position_bounds<B: Into<Bound>>(mut self, bounds: Vec<B>) -> Self {
        self.initial_position_bounds = Some(bounds.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_velocity_bounds<B: Into<VelocityBound>>(mut self, bounds: Vec<B>) -> Self {
        self.velocity_bounds = bounds.into_iter().map(Into::into).collect();
        self
    }

    /// Configure acceleration coefficients (defaults: c1=2.05, c2=2.05)
    pub fn with_coefficients(mut self, c1: f64, c2: f64) -> Self {
        self.c1 = c1;
        self.c2 = c2;
        self
    }

    pub fn with_variant(mut self, variant: PsoVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_inertia(mut self, start: f64, end: f64) -> Self {
        self.inertia = Some(InertiaSchedule::new(start, end));
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Bounds used to seed positions.
    pub fn seeding_bounds(&self) -> &[Bound] {
        self.initial_position_bounds
            .as_deref()
            .unwrap_or(&self.position_bounds)
    }

    /// Checks field ranges and bound lengths. Strategy presence is checked by
    /// the engine.
    pub fn validate(&self) -> Result<(), PsoError> {
        validate_config(self)
    }

    pub fn from_json(json: &str) -> Result<Self, PsoError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PsoError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PsoError::config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String, PsoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_follow_constants() {
        let config = PsoConfig::new(3);
        assert_eq!(config.swarm_size, 30);
        assert_eq!(config.time_steps, 1000);
        assert_eq!((config.c1, config.c2), (2.05, 2.05));
        assert_eq!(config.variant, PsoVariant::Basic);
        assert_eq!(config.direction, Direction::Minimize);
        assert_eq!(config.position_bounds.len(), 3);
        assert_eq!(config.seeding_bounds(), config.position_bounds.as_slice());
    }

    #[test]
    fn test_seeding_bounds_override() {
        let config = PsoConfig::new(2).with_initial_position_bounds(vec![(5.0, 10.0), (5.0, 10.0)]);
        assert_eq!(config.seeding_bounds(), &[Bound::new(5.0, 10.0); 2]);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PsoConfig::new(2)
            .with_variant(PsoVariant::Inertia)
            .with_inertia(0.9, 0.4)
            .with_seed(7);
        let json = config.to_json().unwrap();
        let parsed = PsoConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_defaults_and_variant_names() {
        let json = r#"{
            "dimensions": 1,
            "position_bounds": [{"min": -1.0, "max": 1.0}],
            "velocity_bounds": [{"min": -0.5, "max": 0.5}],
            "variant": "CONSTRICTED",
            "direction": "maximize"
        }"#;
        let config = PsoConfig::from_json(json).unwrap();
        assert_eq!(config.swarm_size, DEFAULT_SWARM_SIZE);
        assert_eq!(config.variant, PsoVariant::Constricted);
        assert_eq!(config.direction, Direction::Maximize);
    }

    #[test]
    fn test_json_rejects_invalid_config() {
        let json = r#"{
            "dimensions": 2,
            "position_bounds": [{"min": -1.0, "max": 1.0}],
            "velocity_bounds": [{"min": -0.5, "max": 0.5}]
        }"#;
        assert!(matches!(
            PsoConfig::from_json(json),
            Err(PsoError::Configuration(_))
        ));
    }
}
