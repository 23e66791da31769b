//! Particle swarm optimization engine.
//!
//! A [`PsoEngine`] drives a swarm held by a [`Topology`] through a fixed
//! number of time steps, moving every particle with an [`UpdateRule`] and
//! scoring it with an [`Evaluator`]. Step callbacks, termination criteria
//! and statistics reporters hook into the loop.

pub mod core;
pub mod error;
pub mod optimization;
pub mod optimizer;

pub use crate::core::*;
pub use error::PsoError;
pub use optimization::*;
pub use optimizer::{
    format_duration, ChannelReporter, EngineState, InterruptHandle, LogReporter, PsoEngine,
    RunResult, StatsRecord, StatsReporter,
};
