use super::solvers::Particle;
use super::topology::Topology;
use crate::core::Direction;

/// Read-only snapshot of the engine handed to hooks after every step.
pub struct EngineView<'a> {
    pub step: usize,
    pub time_steps: usize,
    pub direction: Direction,
    /// Current inertia factor, `None` unless the INERTIA variant is used.
    pub inertia_factor: Option<f64>,
    pub evaluations: usize,
    pub topology: &'a dyn Topology,
}

impl EngineView<'_> {
    pub fn best_particle(&self) -> Option<&Particle> {
        self.topology.best_particle()
    }

    /// Personal-best fitness of the swarm's best particle.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best_particle().map(Particle::best_fitness)
    }

    pub fn best_position(&self) -> Option<&[f64]> {
        self.best_particle().map(Particle::best_position)
    }
}

/// Predicate deciding whether a run should stop after the current step.
///
/// Used both for step callbacks and termination criteria; the engine only
/// distinguishes them in the reported stop state.
pub trait StopCondition {
    fn should_stop(&mut self, view: &EngineView<'_>) -> bool;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> StopCondition for F
where
    F: FnMut(&EngineView<'_>) -> bool,
{
    fn should_stop(&mut self, view: &EngineView<'_>) -> bool {
        self(view)
    }
}

/// Stops once the best fitness reaches `target`.
///
/// Minimizing stops when `target >= best`. Maximizing stops when
/// `target < best`, or `target <= best` once rounding is enabled. With
/// `round_decimals` set, the best fitness is rounded to that many decimals
/// before the comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitnessScoreCriteria {
    pub target: f64,
    pub round_decimals: Option<u32>,
}

impl FitnessScoreCriteria {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            round_decimals: None,
        }
    }

    pub fn with_rounding(mut self, decimals: u32) -> Self {
        self.round_decimals = Some(decimals);
        self
    }

    fn round(&self, value: f64) -> f64 {
        match self.round_decimals {
            Some(decimals) => {
                let scale = 10f64.powi(decimals as i32);
                (value * scale).round() / scale
            }
            None => value,
        }
    }

    /// Whether `best` satisfies the target for `direction`.
    pub fn is_met(&self, best: f64, direction: Direction) -> bool {
        let best = self.round(best);
        match (direction, self.round_decimals) {
            (Direction::Minimize, _) => self.target >= best,
            (Direction::Maximize, Some(_)) => self.target <= best,
            (Direction::Maximize, None) => self.target < best,
        }
    }
}

impl StopCondition for FitnessScoreCriteria {
    fn should_stop(&mut self, view: &EngineView<'_>) -> bool {
        view.best_fitness()
            .is_some_and(|best| self.is_met(best, view.direction))
    }

    fn name(&self) -> &str {
        "fitness-score"
    }
}

/// Stops after `patience` consecutive steps in which the best fitness moved
/// by less than `tolerance`.
#[derive(Clone, Debug, PartialEq)]
pub struct StagnationCriteria {
    pub tolerance: f64,
    pub patience: usize,
    previous: Option<f64>,
    stalled: usize,
}

impl StagnationCriteria {
    pub fn new(tolerance: f64, patience: usize) -> Self {
        Self {
            tolerance,
            patience,
            previous: None,
            stalled: 0,
        }
    }

    /// Number of consecutive stalled steps seen so far.
    pub fn stalled_steps(&self) -> usize {
        self.stalled
    }

    fn observe(&mut self, best: f64) -> bool {
        match self.previous {
            Some(previous) if (previous - best).abs() < self.tolerance => self.stalled += 1,
            _ => self.stalled = 0,
        }
        self.previous = Some(best);
        self.patience > 0 && self.stalled >= self.patience
    }
}

impl StopCondition for StagnationCriteria {
    fn should_stop(&mut self, view: &EngineView<'_>) -> bool {
        match view.best_fitness() {
            Some(best) => self.observe(best),
            None => false,
        }
    }

    fn name(&self) -> &str {
        "stagnation"
    }
}

/// Inspection hook run after every step, at the same point the interrupt
/// flag is polled. Cannot stop the run.
pub trait StepObserver {
    fn on_step(&mut self, view: &EngineView<'_>);
}

impl<F> StepObserver for F
where
    F: FnMut(&EngineView<'_>),
{
    fn on_step(&mut self, view: &EngineView<'_>) {
        self(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::topology::GlobalTopology;
    use test_case::test_case;

    fn topology(best: f64) -> GlobalTopology {
        GlobalTopology::from_particles(
            vec![
                Particle::from_state(0, vec![1.0], vec![0.0], best),
                Particle::from_state(1, vec![2.0], vec![0.0], best + 10.0),
            ],
            Direction::Minimize,
        )
    }

    fn view(topology: &GlobalTopology, direction: Direction) -> EngineView<'_> {
        EngineView {
            step: 1,
            time_steps: 10,
            direction,
            inertia_factor: None,
            evaluations: 4,
            topology,
        }
    }

    #[test_case(0.5, 1.0, None, Direction::Minimize, false; "minimize above target")]
    #[test_case(1.0, 1.0, None, Direction::Minimize, true; "minimize at target")]
    #[test_case(1.0, 1.004, Some(2), Direction::Minimize, true; "minimize rounded down to target")]
    #[test_case(1.0, 1.0, None, Direction::Maximize, false; "maximize at target unrounded")]
    #[test_case(1.0, 1.0, Some(3), Direction::Maximize, true; "maximize at target rounded")]
    #[test_case(1.0, 1.5, None, Direction::Maximize, true; "maximize beyond target")]
    fn test_fitness_score_criteria(
        target: f64,
        best: f64,
        round: Option<u32>,
        direction: Direction,
        expected: bool,
    ) {
        let criteria = FitnessScoreCriteria {
            target,
            round_decimals: round,
        };
        assert_eq!(criteria.is_met(best, direction), expected);
    }

    #[test]
    fn test_fitness_score_reads_best_particle() {
        let topology = topology(0.25);
        let mut criteria = FitnessScoreCriteria::new(0.5);
        assert!(criteria.should_stop(&view(&topology, Direction::Minimize)));

        let mut criteria = FitnessScoreCriteria::new(0.1);
        assert!(!criteria.should_stop(&view(&topology, Direction::Minimize)));
    }

    #[test]
    fn test_stagnation_needs_consecutive_stalls() {
        let mut criteria = StagnationCriteria::new(1e-3, 2);
        assert!(!criteria.observe(5.0));
        assert!(!criteria.observe(5.0));
        assert_eq!(criteria.stalled_steps(), 1);
        assert!(!criteria.observe(4.0));
        assert_eq!(criteria.stalled_steps(), 0);
        assert!(!criteria.observe(4.0));
        assert!(criteria.observe(4.0));
    }

    #[test]
    fn test_stagnation_with_zero_patience_never_stops() {
        let mut criteria = StagnationCriteria::new(1.0, 0);
        for _ in 0..5 {
            assert!(!criteria.observe(1.0));
        }
    }

    #[test]
    fn test_closures_are_hooks() {
        let topology = topology(3.0);
        let view = view(&topology, Direction::Minimize);

        let mut stop_after_first = |v: &EngineView<'_>| v.step >= 1;
        assert!(StopCondition::should_stop(&mut stop_after_first, &view));

        let mut seen = Vec::new();
        {
            let mut record = |v: &EngineView<'_>| seen.push(v.best_fitness());
            record.on_step(&view);
        }
        assert_eq!(seen, vec![Some(3.0)]);
        assert_eq!(view.best_position(), Some(&[1.0][..]));
    }
}
