mod report;
mod utils;

pub use report::{ChannelReporter, LogReporter, StatsRecord, StatsReporter};
pub use utils::{format_duration, InterruptHandle};

use crate::core::{Parallelism, PsoConfig, PsoVariant};
use crate::error::PsoError;
use crate::optimization::solvers::{
    select_weighting, Communicator, Particle, PositionInitializer, UniformPosition,
    UniformVelocity, UpdateRule, VelocityInitializer,
};
use crate::optimization::{
    EngineView, Evaluator, Statistics, StepObserver, StopCondition, SwarmContext, Topology,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::time::{Duration, Instant};

/// Lifecycle of a [`PsoEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Converged,
    StoppedByCallback,
    StoppedByTerminationCriteria,
    Interrupted,
    /// A fitness or strategy error ended the run early.
    Aborted,
}

impl EngineState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Converged
                | Self::StoppedByCallback
                | Self::StoppedByTerminationCriteria
                | Self::Interrupted
                | Self::Aborted
        )
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized => "Initialized",
            Self::Running => "Running",
            Self::Converged => "Converged",
            Self::StoppedByCallback => "StoppedByCallback",
            Self::StoppedByTerminationCriteria => "StoppedByTerminationCriteria",
            Self::Interrupted => "Interrupted",
            Self::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// Outcome of [`PsoEngine::execute`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub state: EngineState,
    /// Completed time steps.
    pub iterations: usize,
    pub best_fitness: f64,
    pub best_position: Vec<f64>,
    /// Fitness evaluations, initialization included.
    pub evaluations: usize,
    pub elapsed: Duration,
    pub message: String,
}

/// Step callbacks, termination criteria, observers and reporters.
#[derive(Default)]
struct Hooks {
    step_callbacks: Vec<Box<dyn StopCondition>>,
    termination: Vec<Box<dyn StopCondition>>,
    observers: Vec<Box<dyn StepObserver>>,
    reporters: Vec<Box<dyn StatsReporter>>,
}

impl Hooks {
    /// Run every hook once and decide whether the run stops here.
    ///
    /// All hooks see every step, so stateful criteria stay in sync even when
    /// an earlier one already asked to stop.
    fn poll(
        &mut self,
        view: &EngineView<'_>,
        interrupt: &InterruptHandle,
    ) -> Option<(EngineState, String)> {
        let mut by_callback = None;
        for callback in self.step_callbacks.iter_mut() {
            if callback.should_stop(view) && by_callback.is_none() {
                by_callback = Some(callback.name().to_string());
            }
        }

        let mut by_criteria = None;
        for criteria in self.termination.iter_mut() {
            if criteria.should_stop(view) && by_criteria.is_none() {
                by_criteria = Some(criteria.name().to_string());
            }
        }

        for observer in self.observers.iter_mut() {
            observer.on_step(view);
        }

        if let Some(name) = by_criteria {
            Some((
                EngineState::StoppedByTerminationCriteria,
                format!("Termination criteria '{}' met at step {}", name, view.step),
            ))
        } else if let Some(name) = by_callback {
            Some((
                EngineState::StoppedByCallback,
                format!("Step callback '{}' stopped the run at step {}", name, view.step),
            ))
        } else if interrupt.is_interrupted() {
            Some((
                EngineState::Interrupted,
                format!("Interrupted at step {}", view.step),
            ))
        } else {
            None
        }
    }

    fn open_reporters(&mut self) {
        for reporter in self.reporters.iter_mut() {
            if let Err(e) = reporter.open() {
                warn!("Statistics reporter failed to open: {}", e);
            }
        }
    }

    /// Whether any reporter wants a snapshot at `step`.
    fn reporters_due(&self, step: usize, default_frequency: usize) -> bool {
        self.reporters
            .iter()
            .any(|r| is_due(step, r.frequency().unwrap_or(default_frequency)))
    }

    /// Hand `stats` to every reporter due at `step`. With `final_step`, only
    /// reporters whose cadence skipped `step` receive it.
    fn report(
        &mut self,
        step: usize,
        stats: &Statistics,
        default_frequency: usize,
        final_step: bool,
    ) {
        for reporter in self.reporters.iter_mut() {
            let frequency = reporter.frequency().unwrap_or(default_frequency);
            let due = is_due(step, frequency);
            if final_step == due || frequency == 0 {
                continue;
            }
            if let Err(e) = reporter.insert(step, stats) {
                warn!("Statistics reporter failed at step {}: {}", step, e);
            }
        }
    }

    fn close_reporters(&mut self) {
        for reporter in self.reporters.iter_mut() {
            if let Err(e) = reporter.close() {
                warn!("Statistics reporter failed to close: {}", e);
            }
        }
    }
}

/// Drives a swarm through its time steps.
///
/// Strategies are injected: a topology and an evaluator must be set before
/// [`PsoEngine::execute`]; the update rule and the initializers default to
/// [`Communicator`], [`UniformPosition`] and [`UniformVelocity`].
pub struct PsoEngine {
    config: Option<PsoConfig>,
    topology: Option<Box<dyn Topology>>,
    evaluator: Option<Box<dyn Evaluator>>,
    update_rule: Box<dyn UpdateRule>,
    positions: Box<dyn PositionInitializer>,
    velocities: Box<dyn VelocityInitializer>,
    hooks: Hooks,
    interrupt: InterruptHandle,
    state: EngineState,
    current_step: usize,
    inertia_factor: Option<f64>,
    evaluations: usize,
    last_statistics: Option<Statistics>,
}

impl Default for PsoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PsoEngine {
    pub fn new() -> Self {
        Self {
            config: None,
            topology: None,
            evaluator: None,
            update_rule: Box::new(Communicator),
            positions: Box::new(UniformPosition),
            velocities: Box::new(UniformVelocity),
            hooks: Hooks::default(),
            interrupt: InterruptHandle::new(),
            state: EngineState::Uninitialized,
            current_step: 0,
            inertia_factor: None,
            evaluations: 0,
            last_statistics: None,
        }
    }

    /// Replace the configuration. The engine goes back to `Uninitialized`.
    pub fn configure(&mut self, config: PsoConfig) -> &mut Self {
        self.config = Some(config);
        self.state = EngineState::Uninitialized;
        self
    }

    pub fn set_topology<T: Topology + 'static>(&mut self, topology: T) -> &mut Self {
        self.topology = Some(Box::new(topology));
        self.state = EngineState::Uninitialized;
        self
    }

    pub fn set_evaluator<E: Evaluator + 'static>(&mut self, evaluator: E) -> &mut Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub fn set_update_rule<U: UpdateRule + 'static>(&mut self, rule: U) -> &mut Self {
        self.update_rule = Box::new(rule);
        self
    }

    pub fn set_position_initializer<P: PositionInitializer + 'static>(
        &mut self,
        initializer: P,
    ) -> &mut Self {
        self.positions = Box::new(initializer);
        self
    }

    pub fn set_velocity_initializer<V: VelocityInitializer + 'static>(
        &mut self,
        initializer: V,
    ) -> &mut Self {
        self.velocities = Box::new(initializer);
        self
    }

    /// Hook run after every step; returning `true` ends the run with
    /// [`EngineState::StoppedByCallback`].
    pub fn add_step_callback<C: StopCondition + 'static>(&mut self, callback: C) -> &mut Self {
        self.hooks.step_callbacks.push(Box::new(callback));
        self
    }

    /// Hook run after every step; returning `true` ends the run with
    /// [`EngineState::StoppedByTerminationCriteria`]. Takes precedence over
    /// step callbacks.
    pub fn add_termination_criteria<C: StopCondition + 'static>(
        &mut self,
        criteria: C,
    ) -> &mut Self {
        self.hooks.termination.push(Box::new(criteria));
        self
    }

    pub fn add_observer<O: StepObserver + 'static>(&mut self, observer: O) -> &mut Self {
        self.hooks.observers.push(Box::new(observer));
        self
    }

    pub fn add_reporter<R: StatsReporter + 'static>(&mut self, reporter: R) -> &mut Self {
        self.hooks.reporters.push(Box::new(reporter));
        self
    }

    /// Handle that stops the run after the step in progress completes.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn config(&self) -> Option<&PsoConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn inertia_factor(&self) -> Option<f64> {
        self.inertia_factor
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn topology(&self) -> Option<&dyn Topology> {
        self.topology.as_deref()
    }

    pub fn best_particle(&self) -> Option<&Particle> {
        self.topology.as_deref().and_then(|t| t.best_particle())
    }

    /// Statistics computed when the last run ended, however it ended.
    pub fn last_statistics(&self) -> Option<&Statistics> {
        self.last_statistics.as_ref()
    }

    /// Check that the engine can run: configuration, topology and evaluator
    /// are set and the configuration is consistent.
    pub fn validate_configuration(&self) -> Result<(), PsoError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| PsoError::config("no configuration set"))?;
        if self.topology.is_none() {
            return Err(PsoError::config("no topology set"));
        }
        if self.evaluator.is_none() {
            return Err(PsoError::config("no fitness evaluator set"));
        }
        config.validate()
    }

    /// Initialize the swarm and run it until a stop condition fires or all
    /// time steps are done.
    ///
    /// Statistics are logged at step 1 and every `stats_frequency` steps
    /// after that; `0` disables periodic logging. Reporters follow the same
    /// cadence unless they set their own [`StatsReporter::frequency`], and
    /// receive the final snapshot when their cadence skipped the last step.
    /// Final statistics are always kept and available through
    /// [`PsoEngine::last_statistics`]. An error leaves the engine
    /// [`EngineState::Aborted`].
    pub fn execute(&mut self, stats_frequency: usize) -> Result<RunResult, PsoError> {
        self.validate_configuration()?;
        let config = self
            .config
            .clone()
            .ok_or_else(|| PsoError::config("no configuration set"))?;

        let start = Instant::now();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = build_pool(config.parallelism)?;

        self.current_step = 0;
        self.evaluations = 0;
        self.last_statistics = None;
        self.inertia_factor = match config.variant {
            PsoVariant::Inertia => config.inertia.map(|schedule| schedule.start),
            _ => None,
        };

        self.hooks.open_reporters();
        let outcome = self.run(&config, stats_frequency, &mut rng, pool.as_ref());
        self.hooks.close_reporters();
        let (state, message) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = EngineState::Aborted;
                warn!("Run aborted at step {}: {}", self.current_step, e);
                return Err(e);
            }
        };
        self.state = state;

        let elapsed = start.elapsed();
        let (best_fitness, best_position) = self
            .best_particle()
            .map(|p| (p.best_fitness(), p.best_position().to_vec()))
            .unwrap_or((f64::NAN, Vec::new()));

        info!("{} ({})", message, state);
        info!(
            "Best fitness {:.6e} after {} steps and {} evaluations",
            best_fitness, self.current_step, self.evaluations
        );
        info!("Time elapsed: {}", format_duration(elapsed));

        Ok(RunResult {
            state,
            iterations: self.current_step,
            best_fitness,
            best_position,
            evaluations: self.evaluations,
            elapsed,
            message,
        })
    }

    fn run(
        &mut self,
        config: &PsoConfig,
        stats_frequency: usize,
        rng: &mut StdRng,
        pool: Option<&ThreadPool>,
    ) -> Result<(EngineState, String), PsoError> {
        let topology = self
            .topology
            .as_deref_mut()
            .ok_or_else(|| PsoError::config("no topology set"))?;
        let evaluator = self
            .evaluator
            .as_deref()
            .ok_or_else(|| PsoError::config("no fitness evaluator set"))?;

        let mut ctx = SwarmContext {
            config,
            evaluator,
            update_rule: self.update_rule.as_ref(),
            positions: self.positions.as_ref(),
            velocities: self.velocities.as_ref(),
            rng,
            pool,
        };

        info!(
            "Initializing {} with {} particles in {} dimensions ({} variant, {}, evaluator '{}')",
            topology.name(),
            config.swarm_size,
            config.dimensions,
            config.variant,
            config.direction,
            evaluator.name()
        );
        topology.initialize(&mut ctx)?;
        self.evaluations = config.swarm_size;
        self.state = EngineState::Initialized;

        let outcome = loop {
            self.state = EngineState::Running;

            let weighting = select_weighting(config, self.inertia_factor)?;
            self.evaluations += topology.update_positions(&mut ctx, &weighting)?;
            topology.update_information(config.direction);

            if let (Some(schedule), Some(w)) = (config.inertia, self.inertia_factor) {
                self.inertia_factor = Some(schedule.next(w, config.time_steps));
            }
            self.current_step += 1;
            let step = self.current_step;

            let log_due = is_due(step, stats_frequency);
            if log_due || self.hooks.reporters_due(step, stats_frequency) {
                if let Some(stats) = topology.statistics() {
                    if log_due {
                        debug!("Step {:>5}: {}", step, stats);
                    }
                    self.hooks.report(step, stats, stats_frequency, false);
                }
            }

            let view = EngineView {
                step,
                time_steps: config.time_steps,
                direction: config.direction,
                inertia_factor: self.inertia_factor,
                evaluations: self.evaluations,
                topology: &*topology,
            };
            if let Some(stop) = self.hooks.poll(&view, &self.interrupt) {
                break stop;
            }

            if step >= config.time_steps {
                break (
                    EngineState::Converged,
                    format!("Completed {} time steps", config.time_steps),
                );
            }
        };

        self.last_statistics = topology.statistics().cloned();
        if let Some(stats) = &self.last_statistics {
            info!("Final statistics: {}", stats);
            self.hooks
                .report(self.current_step, stats, stats_frequency, true);
        }

        Ok(outcome)
    }
}

/// Step 1 and every multiple of `frequency`; never when `frequency` is 0.
fn is_due(step: usize, frequency: usize) -> bool {
    frequency > 0 && (step == 1 || step % frequency == 0)
}

/// Evaluation pool for `parallelism`, `None` when evaluating sequentially.
fn build_pool(parallelism: Parallelism) -> Result<Option<ThreadPool>, PsoError> {
    match parallelism {
        Parallelism::Sequential => Ok(None),
        Parallelism::Threads(requested) => {
            let threads = if requested == 0 {
                num_cpus::get()
            } else {
                requested
            };
            debug!("Evaluating on {} threads", threads);
            let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
            Ok(Some(pool))
        }
    }
}
