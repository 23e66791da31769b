use super::particle::Particle;
use crate::core::{Bound, PsoConfig, PsoVariant, VelocityBound};
use crate::error::PsoError;
use rand::RngCore;

/// Per-step weighting of the velocity update, resolved once by the engine
/// before the position pass so every particle sees the same value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VelocityWeighting {
    Basic,
    /// Current inertia factor `w`.
    Inertia(f64),
    /// Constriction coefficient `k`.
    Constricted(f64),
}

impl VelocityWeighting {
    pub fn variant(&self) -> PsoVariant {
        match self {
            Self::Basic => PsoVariant::Basic,
            Self::Inertia(_) => PsoVariant::Inertia,
            Self::Constricted(_) => PsoVariant::Constricted,
        }
    }
}

/// Moves one particle: computes the new velocity and position for every
/// dimension, honouring the bounds in `config`.
pub trait UpdateRule: Send + Sync {
    fn name(&self) -> &str;

    /// `guide` is the reference best position (the global best's personal
    /// best for the global topology). It is fixed for the whole pass.
    fn update(
        &self,
        particle: &mut Particle,
        guide: &[f64],
        config: &PsoConfig,
        weighting: &VelocityWeighting,
        rng: &mut dyn RngCore,
    ) -> Result<(), PsoError>;
}

/// Produces the initial position of a particle.
pub trait PositionInitializer: Send + Sync {
    fn initial_position(&self, bounds: &[Bound], rng: &mut dyn RngCore) -> Vec<f64>;
}

/// Produces the initial velocity of a particle.
pub trait VelocityInitializer: Send + Sync {
    fn initial_velocity(&self, bounds: &[VelocityBound], rng: &mut dyn RngCore) -> Vec<f64>;
}
