use thiserror::Error;

/// Failures raised by the decomposition pipeline.
///
/// Reaching the iteration cap is not one of them: it is reported through
/// `DecomposedResult::converged`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcaError {
    #[error("Frequency must be > 0 (got {frequency}).")]
    InvalidFrequency { frequency: usize },

    #[error("Series length {len} is not evenly divisible by frequency {frequency}.")]
    NotDivisible { len: usize, frequency: usize },

    #[error("Series is empty.")]
    EmptySeries,

    #[error("Series value at index {index} is not finite.")]
    NonFiniteValue { index: usize },

    #[error("Penalty {name} must be finite and > 0 (got {value}).")]
    InvalidPenalty { name: &'static str, value: f64 },

    #[error("Cannot scale a series with zero standard deviation (got {std_dev}).")]
    DegenerateScale { std_dev: f64 },

    #[error("Singular value decomposition did not converge on a {rows}x{cols} matrix.")]
    SvdFailed { rows: usize, cols: usize },
}

impl RpcaError {
    /// Process exit code used by the `rpca` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            RpcaError::InvalidFrequency { .. }
            | RpcaError::NotDivisible { .. }
            | RpcaError::EmptySeries
            | RpcaError::NonFiniteValue { .. }
            | RpcaError::InvalidPenalty { .. } => 2,
            RpcaError::DegenerateScale { .. } => 3,
            RpcaError::SvdFailed { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RpcaError> for AppError {
    fn from(err: RpcaError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
