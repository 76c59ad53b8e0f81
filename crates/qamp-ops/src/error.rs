//! Error types for operation composition and amplification.

use qamp_ir::IrError;
use thiserror::Error;

/// Errors that can occur while applying or configuring operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpError {
    /// A flag index does not address a qubit of the register it is used with.
    #[error("Flag index {index} out of range for register of length {len}")]
    FlagIndexOutOfRange {
        /// The requested flag position.
        index: usize,
        /// Length of the register.
        len: usize,
    },

    /// An operation received a register of the wrong width.
    #[error("{operation} expects a register of {expected} qubit(s), got {got}")]
    RegisterLengthMismatch {
        /// Name of the operation.
        operation: &'static str,
        /// Required register length.
        expected: usize,
        /// Supplied register length.
        got: usize,
    },

    /// An operation that needs at least one qubit received none.
    #[error("{operation} requires a non-empty register")]
    EmptyRegister {
        /// Name of the operation.
        operation: &'static str,
    },

    /// Amplification was requested with a negative number of iterations.
    #[error("Iteration count must be non-negative, got {0}")]
    InvalidIterationCount(i64),

    /// A scheduled reflection phase is NaN or infinite.
    #[error("Phase {phase} in iteration {iteration} is not finite")]
    NonFinitePhase {
        /// Zero-based iteration of the offending pair.
        iteration: usize,
        /// The offending phase.
        phase: f64,
    },

    /// A target fraction is not a finite number in `[0, 1]`.
    #[error("Target fraction {0} is not in [0, 1]")]
    InvalidTargetFraction(f64),

    /// A standard schedule has neither an iteration count nor a fraction to derive one from.
    #[error("No iteration count given and no target fraction to derive one from")]
    MissingIterationCount,

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The circuit rejected an emitted instruction.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for operation composition.
pub type OpResult<T> = Result<T, OpError>;
