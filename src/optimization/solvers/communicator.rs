use super::particle::Particle;
use super::traits::{PositionInitializer, UpdateRule, VelocityInitializer, VelocityWeighting};
use crate::core::{Bound, PsoConfig, VelocityBound};
use crate::error::PsoError;
use rand::{Rng, RngCore};

/// Constriction coefficient `k = 2 / |2 - phi - sqrt(phi^2 - 4 phi)|` with
/// `phi = c1 + c2`. Undefined for `phi < 4`, which is reported instead of
/// producing NaN.
pub fn constriction_coefficient(c1: f64, c2: f64) -> Result<f64, PsoError> {
    let phi = c1 + c2;
    if !(phi >= 4.0) {
        return Err(PsoError::NumericDomain { c1, c2, phi });
    }
    Ok(2.0 / (2.0 - phi - (phi * phi - 4.0 * phi).sqrt()).abs())
}

/// Velocity and position update against a single guide position
///
/// Per dimension, with fresh `r1, r2 ~ U(0, 1)`:
///
/// v = w * v + c1 * r1 * (p - x) + c2 * r2 * (g - x)   (w = 1 for BASIC)
/// v = k * (v + c1 * r1 * (p - x) + c2 * r2 * (g - x))  (CONSTRICTED)
///
/// then v is clamped to its bound, x += v, and x is clamped to its bound with
/// the velocity reversed whenever the clamp kicks in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Communicator;

impl Communicator {
    #[inline]
    fn reflect(position: &mut f64, velocity: &mut f64, bound: &Bound) {
        if *position > bound.max {
            *position = bound.max;
            *velocity = -*velocity;
        } else if *position < bound.min {
            *position = bound.min;
            *velocity = -*velocity;
        }
    }
}

impl UpdateRule for Communicator {
    fn name(&self) -> &str {
        "global-communicator"
    }

    fn update(
        &self,
        particle: &mut Particle,
        guide: &[f64],
        config: &PsoConfig,
        weighting: &VelocityWeighting,
        rng: &mut dyn RngCore,
    ) -> Result<(), PsoError> {
        let n = particle.dimensions();
        if guide.len() != n || config.position_bounds.len() != n || config.velocity_bounds.len() != n
        {
            return Err(PsoError::config(format!(
                "particle {} has {} dimensions but guide/bounds have {}/{}/{}",
                particle.id,
                n,
                guide.len(),
                config.position_bounds.len(),
                config.velocity_bounds.len()
            )));
        }

        let (c1, c2) = (config.c1, config.c2);
        for i in 0..n {
            let r1 = rng.gen_range(0.0..1.0);
            let r2 = rng.gen_range(0.0..1.0);

            let x = particle.position[i];
            let pull = c1 * r1 * (particle.best_position[i] - x) + c2 * r2 * (guide[i] - x);
            let v = particle.velocity[i];

            let v = match *weighting {
                VelocityWeighting::Basic => v + pull,
                VelocityWeighting::Inertia(w) => w * v + pull,
                VelocityWeighting::Constricted(k) => k * (v + pull),
            };

            let mut v = config.velocity_bounds[i].clamp(v);
            let mut x = x + v;
            Self::reflect(&mut x, &mut v, &config.position_bounds[i]);

            particle.velocity[i] = v;
            particle.position[i] = x;
        }

        Ok(())
    }
}

/// Positions drawn uniformly from each dimension's seeding bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPosition;

impl PositionInitializer for UniformPosition {
    fn initial_position(&self, bounds: &[Bound], rng: &mut dyn RngCore) -> Vec<f64> {
        bounds
            .iter()
            .map(|b| rng.gen_range(b.min..=b.max))
            .collect()
    }
}

/// Velocities drawn uniformly from `[0, max]` of each velocity bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformVelocity;

impl VelocityInitializer for UniformVelocity {
    fn initial_velocity(&self, bounds: &[VelocityBound], rng: &mut dyn RngCore) -> Vec<f64> {
        bounds
            .iter()
            .map(|b| {
                let (lo, hi) = b.seed_range();
                rng.gen_range(lo..=hi)
            })
            .collect()
    }
}
