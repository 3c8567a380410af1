use thiserror::Error;

/// Failures raised while evaluating a scenario.
///
/// Every stage of the pipeline (identification, synthesis, algebra,
/// simulation, analysis) reports through this type; nothing is defaulted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed, mismatched or too-short input data.
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// An identification threshold was never crossed by the recorded output.
    #[error("output never reached the identification threshold {threshold:.6}")]
    ThresholdNotReached { threshold: f64 },

    /// A degenerate gain or time constant appeared in a denominator.
    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),

    /// Degenerate transfer function or model parameters.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// The internal state realization could not be built or integrated.
    #[error("simulation failed: {0}")]
    SimulationFailure(String),

    /// Two sequences that must be aligned sample-for-sample are not.
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),

    /// A scenario request could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
