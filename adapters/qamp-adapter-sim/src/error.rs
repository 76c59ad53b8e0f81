//! Error types for the simulator backend.

use thiserror::Error;

/// Errors produced while executing a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit is wider than the simulator allows.
    #[error("Circuit has {requested} qubits but simulator only supports {max}")]
    TooManyQubits {
        /// Qubits requested by the circuit.
        requested: usize,
        /// Simulator limit.
        max: usize,
    },

    /// An instruction addresses a qubit outside the statevector.
    #[error("Qubit index {qubit} out of range for a {num_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: usize,
        /// Width of the statevector.
        num_qubits: usize,
    },

    /// A measurement writes a classical bit the shot has no room for.
    #[error("Classical bit index {clbit} out of range ({num_clbits} bits)")]
    ClbitOutOfRange {
        /// The offending classical bit index.
        clbit: usize,
        /// Number of classical bits in the circuit.
        num_clbits: usize,
    },

    /// Amplitude vector length is not a power of two.
    #[error("State of length {0} is not a power of two")]
    InvalidStateLength(usize),

    /// A purely unitary evolution was requested for a circuit that measures or resets.
    #[error("Circuit contains non-unitary instruction '{0}'")]
    MeasurementInCircuit(String),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
