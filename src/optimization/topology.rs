use super::problem::Evaluator;
use super::solvers::{
    Particle, PositionInitializer, UpdateRule, VelocityInitializer, VelocityWeighting,
};
use super::statistics::Statistics;
use crate::core::{Direction, PsoConfig};
use crate::error::PsoError;
use rand::RngCore;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Strategies and shared state a topology needs for one operation.
pub struct SwarmContext<'a> {
    pub config: &'a PsoConfig,
    pub evaluator: &'a dyn Evaluator,
    pub update_rule: &'a dyn UpdateRule,
    pub positions: &'a dyn PositionInitializer,
    pub velocities: &'a dyn VelocityInitializer,
    pub rng: &'a mut dyn RngCore,
    /// Evaluate on this pool when present, sequentially otherwise.
    pub pool: Option<&'a ThreadPool>,
}

/// Owns the swarm and decides which best position guides each particle.
pub trait Topology: Send {
    fn name(&self) -> &str;

    /// Create and initialize `swarm_size` particles and pick the best one.
    fn initialize(&mut self, ctx: &mut SwarmContext<'_>) -> Result<(), PsoError>;

    /// Move every particle and re-evaluate it. Returns the number of fitness
    /// evaluations performed.
    fn update_positions(
        &mut self,
        ctx: &mut SwarmContext<'_>,
        weighting: &VelocityWeighting,
    ) -> Result<usize, PsoError>;

    /// Refresh personal bests, then the swarm best.
    fn update_information(&mut self, direction: Direction);

    /// Cached statistics; `None` before initialization.
    fn statistics(&mut self) -> Option<&Statistics>;

    fn particles(&self) -> &[Particle];

    fn best_particle(&self) -> Option<&Particle>;
}

/// Fully connected topology: one swarm-wide best guides every particle.
#[derive(Debug, Default)]
pub struct GlobalTopology {
    particles: Vec<Particle>,
    best: usize,
    stats: Option<Statistics>,
}

impl GlobalTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology around an existing swarm, picking the best particle
    /// by personal-best fitness.
    pub fn from_particles(particles: Vec<Particle>, direction: Direction) -> Self {
        let best = direction
            .best_index(particles.iter().map(|p| p.best_fitness))
            .unwrap_or(0);
        Self {
            particles,
            best,
            stats: None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    /// Current (or personal-best) fitness of every particle.
    pub fn swarm_fitness(&self, best: bool) -> Vec<f64> {
        self.particles
            .iter()
            .map(|p| if best { p.best_fitness } else { p.fitness })
            .collect()
    }

    /// Current (or personal-best) positions, best particle first.
    pub fn swarm_positions(&self, best: bool) -> Vec<Vec<f64>> {
        let pick = |p: &Particle| {
            if best {
                p.best_position.clone()
            } else {
                p.position.clone()
            }
        };
        let mut positions = Vec::with_capacity(self.particles.len());
        if let Some(leader) = self.particles.get(self.best) {
            positions.push(pick(leader));
        }
        positions.extend(
            self.particles
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != self.best)
                .map(|(_, p)| pick(p)),
        );
        positions
    }

    fn invalidate(&mut self) {
        self.stats = None;
    }

    fn evaluate_all(
        particles: &mut [Particle],
        evaluator: &dyn Evaluator,
        pool: &ThreadPool,
    ) -> Result<(), PsoError> {
        pool.install(|| {
            particles
                .par_iter_mut()
                .try_for_each(|p| p.evaluate(evaluator).map(|_| ()))
        })
    }
}

impl Topology for GlobalTopology {
    fn name(&self) -> &str {
        "GlobalTopology"
    }

    fn initialize(&mut self, ctx: &mut SwarmContext<'_>) -> Result<(), PsoError> {
        let config = ctx.config;
        let mut particles = Vec::with_capacity(config.swarm_size);
        for id in 0..config.swarm_size {
            let mut particle = Particle::new(id);
            particle.initialize(config, ctx.positions, ctx.velocities, ctx.evaluator, ctx.rng)?;
            particles.push(particle);
        }

        self.best = config
            .direction
            .best_index(particles.iter().map(|p| p.best_fitness))
            .unwrap_or(0);
        self.particles = particles;
        self.invalidate();
        Ok(())
    }

    fn update_positions(
        &mut self,
        ctx: &mut SwarmContext<'_>,
        weighting: &VelocityWeighting,
    ) -> Result<usize, PsoError> {
        if self.particles.is_empty() {
            return Err(PsoError::config("topology has not been initialized"));
        }

        // Everyone follows the best known at the start of the pass.
        let guide = self.particles[self.best].best_position.clone();
        self.invalidate();

        match ctx.pool {
            Some(pool) => {
                for particle in self.particles.iter_mut() {
                    ctx.update_rule
                        .update(particle, &guide, ctx.config, weighting, ctx.rng)?;
                }
                Self::evaluate_all(&mut self.particles, ctx.evaluator, pool)?;
            }
            None => {
                for particle in self.particles.iter_mut() {
                    ctx.update_rule
                        .update(particle, &guide, ctx.config, weighting, ctx.rng)?;
                    particle.evaluate(ctx.evaluator)?;
                }
            }
        }

        Ok(self.particles.len())
    }

    fn update_information(&mut self, direction: Direction) {
        for i in 0..self.particles.len() {
            self.particles[i].update_personal_best(direction);
            if direction.improves(
                self.particles[i].best_fitness,
                self.particles[self.best].best_fitness,
            ) {
                self.best = i;
            }
        }
        self.invalidate();
    }

    fn statistics(&mut self) -> Option<&Statistics> {
        if self.stats.is_none() {
            self.stats = Statistics::compute(&self.particles, self.best);
        }
        self.stats.as_ref()
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn best_particle(&self) -> Option<&Particle> {
        self.particles.get(self.best)
    }
}
