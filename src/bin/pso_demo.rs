use env_logger::Env;
use log::error;
use std::process::ExitCode;
use swarmopt::{
    FitnessScoreCriteria, GlobalTopology, LogReporter, PsoConfig, PsoEngine, PsoError, PsoVariant,
    RunResult, Sphere,
};

const DIMENSIONS: usize = 30;
const SWARM_SIZE: usize = 30;
const TIME_STEPS: usize = 10_000;
const STATS_FREQUENCY: usize = 500;

fn run() -> Result<RunResult, PsoError> {
    let config = PsoConfig::new(DIMENSIONS)
        .with_swarm_size(SWARM_SIZE)
        .with_time_steps(TIME_STEPS)
        .with_variant(PsoVariant::Constricted)
        .with_uniform_bounds(-100.0, 100.0)
        .with_initial_position_bounds(vec![(50.0, 100.0); DIMENSIONS])
        .with_velocity_bounds(vec![100.0; DIMENSIONS]);

    let mut engine = PsoEngine::new();
    engine
        .configure(config)
        .set_topology(GlobalTopology::new())
        .set_evaluator(Sphere)
        .add_termination_criteria(FitnessScoreCriteria::new(1e-10))
        .add_reporter(LogReporter::new());

    engine.execute(STATS_FREQUENCY)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run() {
        Ok(result) => {
            println!("State:        {}", result.state);
            println!("Steps:        {}", result.iterations);
            println!("Evaluations:  {}", result.evaluations);
            println!("Best fitness: {:.6e}", result.best_fitness);
            println!("Best position:");
            for (i, x) in result.best_position.iter().enumerate() {
                println!("  x[{:2}] = {:.6e}", i, x);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("PSO run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
