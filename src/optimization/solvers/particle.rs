use super::traits::{PositionInitializer, VelocityInitializer};
use crate::core::{Direction, PsoConfig};
use crate::error::PsoError;
use crate::optimization::problem::Evaluator;
use rand::RngCore;

/// A candidate solution: position, velocity, current fitness and the best
/// position this particle has seen so far.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Particle {
    pub(crate) id: usize,
    pub(crate) position: Vec<f64>,
    pub(crate) velocity: Vec<f64>,
    pub(crate) fitness: f64,
    pub(crate) best_position: Vec<f64>,
    pub(crate) best_fitness: f64,
}

impl Particle {
    /// An empty particle, populated by [`Particle::initialize`]. `id` is its
    /// index in the swarm and is reported in evaluation errors.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Build a particle from explicit state. Personal best starts at the
    /// given position with the given fitness.
    pub fn from_state(id: usize, position: Vec<f64>, velocity: Vec<f64>, fitness: f64) -> Self {
        Self {
            id,
            best_position: position.clone(),
            position,
            velocity,
            fitness,
            best_fitness: fitness,
        }
    }

    /// Draw position and velocity, evaluate, and seed the personal best.
    pub fn initialize(
        &mut self,
        config: &PsoConfig,
        positions: &dyn PositionInitializer,
        velocities: &dyn VelocityInitializer,
        evaluator: &dyn Evaluator,
        rng: &mut dyn RngCore,
    ) -> Result<(), PsoError> {
        if config.dimensions < 1 {
            return Err(PsoError::config("particle needs at least one dimension"));
        }

        self.position = positions.initial_position(config.seeding_bounds(), rng);
        self.velocity = velocities.initial_velocity(&config.velocity_bounds, rng);
        if self.position.len() != config.dimensions || self.velocity.len() != config.dimensions {
            return Err(PsoError::config(format!(
                "initializer produced {} positions and {} velocities for {} dimensions",
                self.position.len(),
                self.velocity.len(),
                config.dimensions
            )));
        }

        self.best_position = self.position.clone();
        self.evaluate(evaluator)?;
        self.best_fitness = self.fitness;
        Ok(())
    }

    /// Re-evaluate the current position. Leaves the personal best alone.
    pub fn evaluate(&mut self, evaluator: &dyn Evaluator) -> Result<f64, PsoError> {
        let fitness = evaluator
            .evaluate(&self.position)
            .map_err(|message| PsoError::Evaluation {
                particle: self.id,
                message,
            })?;
        if fitness.is_nan() {
            return Err(PsoError::Evaluation {
                particle: self.id,
                message: "fitness function returned NaN".into(),
            });
        }
        self.fitness = fitness;
        Ok(fitness)
    }

    /// Adopt the current position as personal best if it improves on it.
    /// Returns whether the personal best changed.
    pub fn update_personal_best(&mut self, direction: Direction) -> bool {
        if direction.improves(self.fitness, self.best_fitness) {
            self.best_fitness = self.fitness;
            self.best_position.copy_from_slice(&self.position);
            true
        } else {
            false
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut [f64] {
        &mut self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    pub fn velocity_mut(&mut self) -> &mut [f64] {
        &mut self.velocity
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn best_position(&self) -> &[f64] {
        &self.best_position
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn dimensions(&self) -> usize {
        self.position.len()
    }

    /// Position, velocity and personal best all have `dimensions` entries.
    pub fn is_consistent(&self, dimensions: usize) -> bool {
        self.position.len() == dimensions
            && self.velocity.len() == dimensions
            && self.best_position.len() == dimensions
    }
}
