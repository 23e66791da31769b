use super::solvers::Particle;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregates over every particle in the swarm.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SwarmStatistics {
    pub fit_min: f64,
    pub fit_max: f64,
    pub fit_avg: f64,
    pub best_fit_min: f64,
    pub best_fit_max: f64,
    pub best_fit_avg: f64,
    /// Sample variance (n - 1) of the personal-best fitness values.
    pub best_fit_var: f64,
    pub best_fit_dev: f64,
}

/// State of the topology's best particle.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TopologyStatistics {
    pub best_fitness: f64,
    pub best_position: Vec<f64>,
    pub best_pos_dim0: f64,
    /// Current (not personal-best) fitness of the best particle.
    pub fitness: f64,
    /// Current (not personal-best) position of the best particle.
    pub position: Vec<f64>,
}

/// One statistics snapshot, as handed to reporters.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub swarm: SwarmStatistics,
    pub topology: TopologyStatistics,
}

impl Statistics {
    /// Compute the snapshot for `particles` with `best` as the best index.
    /// Returns `None` for an empty swarm.
    pub fn compute(particles: &[Particle], best: usize) -> Option<Self> {
        let best_particle = particles.get(best)?;
        let n = particles.len() as f64;

        let mut swarm = SwarmStatistics {
            fit_min: f64::INFINITY,
            fit_max: f64::NEG_INFINITY,
            best_fit_min: f64::INFINITY,
            best_fit_max: f64::NEG_INFINITY,
            ..SwarmStatistics::default()
        };

        let mut fit_sum = 0.0;
        let mut best_fit_sum = 0.0;
        for p in particles {
            swarm.fit_min = swarm.fit_min.min(p.fitness);
            swarm.fit_max = swarm.fit_max.max(p.fitness);
            swarm.best_fit_min = swarm.best_fit_min.min(p.best_fitness);
            swarm.best_fit_max = swarm.best_fit_max.max(p.best_fitness);
            fit_sum += p.fitness;
            best_fit_sum += p.best_fitness;
        }
        swarm.fit_avg = fit_sum / n;
        swarm.best_fit_avg = best_fit_sum / n;

        if particles.len() > 1 {
            let sq_sum: f64 = particles
                .iter()
                .map(|p| (p.best_fitness - swarm.best_fit_avg).powi(2))
                .sum();
            swarm.best_fit_var = sq_sum / (n - 1.0);
            swarm.best_fit_dev = swarm.best_fit_var.sqrt();
        }

        let topology = TopologyStatistics {
            best_fitness: best_particle.best_fitness,
            best_position: best_particle.best_position.clone(),
            best_pos_dim0: best_particle.best_position.first().copied().unwrap_or(f64::NAN),
            fitness: best_particle.fitness,
            position: best_particle.position.clone(),
        };

        Some(Self { swarm, topology })
    }

    /// Flat, ordered view of the scalar statistics for tabular writers.
    pub fn to_record(&self) -> IndexMap<&'static str, f64> {
        let s = &self.swarm;
        let t = &self.topology;
        IndexMap::from([
            ("fitMin", s.fit_min),
            ("fitMax", s.fit_max),
            ("fitAvg", s.fit_avg),
            ("bestFitMin", s.best_fit_min),
            ("bestFitMax", s.best_fit_max),
            ("bestFitAvg", s.best_fit_avg),
            ("bestFitVar", s.best_fit_var),
            ("bestFitDev", s.best_fit_dev),
            ("bestFitness", t.best_fitness),
            ("bestPosDim0", t.best_pos_dim0),
            ("fitness", t.fitness),
        ])
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Swarm] min/max/avg fitness {:.6e}/{:.6e}/{:.6e} | best {:.6e}/{:.6e}/{:.6e} (dev {:.6e}) [Topology] bestFitness/bestPosDim {:.6e}/{:.6e}",
            self.swarm.fit_min,
            self.swarm.fit_max,
            self.swarm.fit_avg,
            self.swarm.best_fit_min,
            self.swarm.best_fit_max,
            self.swarm.best_fit_avg,
            self.swarm.best_fit_dev,
            self.topology.best_fitness,
            self.topology.best_pos_dim0
        )
    }
}
