use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdeError {
    #[error("Unknown SDE type '{0}'. Supported types: ve, ve2, simple")]
    UnknownSdeType(String),

    #[error("Unknown direction '{0}'. Expected 'forward' or 'backward'")]
    UnknownDirection(String),

    #[error("Unknown train method '{0}'. Expected 'alternate' or 'joint'")]
    UnknownTrainMethod(String),

    /// A time grid was not strictly increasing
    #[error("{name} must be strictly increasing: {name}[{index}] = {prev} is followed by {next}")]
    NonIncreasing {
        name: &'static str,
        index: usize,
        prev: f64,
        next: f64,
    },

    #[error("{0} must contain at least one time point")]
    EmptyTimeGrid(&'static str),

    /// Diffusion bounds outside `0 < sigma_min < sigma_max`
    #[error("Invalid diffusion bounds: expected 0 < sigma_min < sigma_max, got sigma_min = {s_min}, sigma_max = {s_max}")]
    InvalidBounds { s_min: f64, s_max: f64 },

    #[error("Diffusion scale must be finite and non-negative, got {0}")]
    InvalidScale(f64),

    #[error("Horizon T must be finite and positive, got {0}")]
    InvalidHorizon(f64),

    #[error("interval must be at least 1")]
    ZeroInterval,

    #[error("Step size must be finite and positive, got {0}")]
    InvalidStep(f64),

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Sampled batch has no batch axis")]
    ScalarSample,

    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}
