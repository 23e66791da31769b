use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsoError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("PSO variant '{0}' is not implemented (expected BASIC, INERTIA or CONSTRICTED)")]
    UnsupportedVariant(String),

    #[error("Constriction coefficient undefined for c1={c1}, c2={c2}: phi={phi} must be >= 4")]
    NumericDomain { c1: f64, c2: f64, phi: f64 },

    #[error("Fitness evaluation failed for particle {particle}: {message}")]
    Evaluation { particle: usize, message: String },

    #[error("Failed to build evaluation thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to (de)serialize configuration: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PsoError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
