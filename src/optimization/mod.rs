pub mod callback;
pub mod problem;
pub mod solvers;
pub mod statistics;
pub mod topology;

pub use callback::{
    EngineView, FitnessScoreCriteria, StagnationCriteria, StepObserver, StopCondition,
};
pub use problem::{ArgminCost, Evaluator, Fallible, Rastrigin, Rosenbrock, Sphere};
pub use solvers::{
    constriction_coefficient, Communicator, Particle, PositionInitializer, UniformPosition,
    UniformVelocity, UpdateRule, VelocityInitializer, VelocityWeighting,
};
pub use statistics::{Statistics, SwarmStatistics, TopologyStatistics};
pub use topology::{GlobalTopology, SwarmContext, Topology};
