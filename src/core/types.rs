use crate::error::PsoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== ENUMS =====

/// Velocity update flavour applied by the communicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PsoVariant {
    /// The canonical PSO update.
    #[default]
    Basic,
    /// Previous velocity weighted by a linearly decaying inertia factor.
    Inertia,
    /// Whole velocity damped by the constriction coefficient.
    Constricted,
}

impl PsoVariant {
    pub fn code(&self) -> u8 {
        match self {
            Self::Basic => 0,
            Self::Inertia => 1,
            Self::Constricted => 2,
        }
    }
}

impl fmt::Display for PsoVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "BASIC",
            Self::Inertia => "INERTIA",
            Self::Constricted => "CONSTRICTED",
        };
        f.write_str(name)
    }
}

impl FromStr for PsoVariant {
    type Err = PsoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASIC" => Ok(Self::Basic),
            "INERTIA" => Ok(Self::Inertia),
            "CONSTRICTED" => Ok(Self::Constricted),
            _ => Err(PsoError::UnsupportedVariant(s.to_string())),
        }
    }
}

impl TryFrom<u8> for PsoVariant {
    type Error = PsoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Basic),
            1 => Ok(Self::Inertia),
            2 => Ok(Self::Constricted),
            other => Err(PsoError::UnsupportedVariant(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// True if `candidate` is strictly better than `incumbent`.
    #[inline]
    pub fn improves(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }

    /// Index of the best value in `values`, first one wins on ties.
    pub fn best_index<I>(&self, values: I) -> Option<usize>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut best: Option<(usize, f64)> = None;
        for (idx, value) in values.into_iter().enumerate() {
            match best {
                Some((_, incumbent)) if !self.improves(value, incumbent) => {}
                _ => best = Some((idx, value)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimize => f.write_str("Minimize"),
            Self::Maximize => f.write_str("Maximize"),
        }
    }
}

/// How fitness evaluation is scheduled across particles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parallelism {
    #[default]
    Sequential,
    /// Evaluate on a rayon pool; `0` sizes the pool from the CPU count.
    Threads(usize),
}

// ===== CORE DATA TYPES =====

/// Closed interval for one dimension of the search space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `other` lies entirely inside this bound.
    pub fn encloses(&self, other: &Bound) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    /// Finite ends, `min <= max`, and a width that does not overflow.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.width().is_finite()
    }
}

impl From<(f64, f64)> for Bound {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Velocity limit for one dimension. Usually symmetric around zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VelocityBound {
    pub min: f64,
    pub max: f64,
}

impl VelocityBound {
    pub fn symmetric(limit: f64) -> Self {
        let limit = limit.abs();
        Self {
            min: -limit,
            max: limit,
        }
    }

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, velocity: f64) -> f64 {
        velocity.clamp(self.min, self.max)
    }

    /// Range used to seed initial velocities: from zero (or the nearest
    /// admissible value) up to `max`.
    pub fn seed_range(&self) -> (f64, f64) {
        (0.0_f64.clamp(self.min, self.max), self.max)
    }

    /// Finite ends, `min <= max`, and a width that does not overflow.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max && (self.max - self.min).is_finite()
    }
}

impl From<f64> for VelocityBound {
    fn from(limit: f64) -> Self {
        Self::symmetric(limit)
    }
}

impl From<(f64, f64)> for VelocityBound {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Linear inertia decay from `start` to `end` over the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InertiaSchedule {
    pub start: f64,
    pub end: f64,
}

impl InertiaSchedule {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Per-step decrement for a run of `time_steps` steps.
    pub fn decrement(&self, time_steps: usize) -> f64 {
        (self.start - self.end) / time_steps as f64
    }

    /// Next inertia factor, never overshooting `end`.
    pub fn next(&self, current: f64, time_steps: usize) -> f64 {
        let delta = self.decrement(time_steps);
        let next = current - delta;
        if (delta >= 0.0 && next < self.end) || (delta < 0.0 && next > self.end) {
            self.end
        } else {
            next
        }
    }
}

impl Default for InertiaSchedule {
    fn default() -> Self {
        Self {
            start: 0.9,
            end: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case("basic", PsoVariant::Basic)]
    #[test_case("INERTIA", PsoVariant::Inertia)]
    #[test_case(" Constricted ", PsoVariant::Constricted)]
    fn test_variant_from_str(name: &str, expected: PsoVariant) {
        assert_eq!(name.parse::<PsoVariant>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "fips".parse::<PsoVariant>().unwrap_err();
        assert!(matches!(err, PsoError::UnsupportedVariant(ref v) if v == "fips"));

        let err = PsoVariant::try_from(3).unwrap_err();
        assert!(matches!(err, PsoError::UnsupportedVariant(_)));
    }

    #[test]
    fn test_variant_codes_round_trip() {
        for variant in [PsoVariant::Basic, PsoVariant::Inertia, PsoVariant::Constricted] {
            assert_eq!(PsoVariant::try_from(variant.code()).unwrap(), variant);
        }
    }

    #[test]
    fn test_direction_best_index() {
        let values = [3.0, 1.0, 5.0, 1.0];
        assert_eq!(Direction::Minimize.best_index(values), Some(1));
        assert_eq!(Direction::Maximize.best_index(values), Some(2));
        assert_eq!(Direction::Minimize.best_index(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_velocity_seed_range() {
        assert_eq!(VelocityBound::symmetric(5.0).seed_range(), (0.0, 5.0));
        assert_eq!(VelocityBound::new(1.0, 3.0).seed_range(), (1.0, 3.0));
        assert_eq!(VelocityBound::new(-3.0, -1.0).seed_range(), (-1.0, -1.0));
    }

    #[test]
    fn test_inertia_decays_and_floors() {
        let schedule = InertiaSchedule::default();
        let mut w = schedule.start;
        for _ in 0..10 {
            w = schedule.next(w, 10);
        }
        assert_relative_eq!(w, 0.4, epsilon = 1e-12);
        assert_eq!(schedule.next(0.4, 10), 0.4);
    }
}
