use thiserror::Error;

/// Errors that can occur during statistical computations
#[derive(Error, Debug)]
pub enum StatsError {
    // Input validation errors
    #[error("Invalid alpha parameter: {0} (must be in (0, 1))")]
    InvalidAlpha(f64),

    #[error("Invalid trim fraction: {0} (must be in [0, 0.5))")]
    InvalidTrimFraction(f64),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    // Numerical errors
    #[error("Numerical routine failed to converge after {iterations} iterations (tolerance: {tolerance})")]
    ConvergenceFailure { iterations: usize, tolerance: f64 },
}

/// Result type for statistical operations
pub type StatsResult<T> = Result<T, StatsError>;
