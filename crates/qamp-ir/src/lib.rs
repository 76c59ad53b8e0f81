//! qamp Circuit Intermediate Representation
//!
//! This crate provides the instruction vocabulary that qamp operations emit.
//! It is deliberately small: every gate is a single-target [`StandardGate`]
//! with an arbitrary list of control qubits, which is exactly what the
//! adjoint and controlled forms of composed operations lower to.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`] handles and the
//!   named [`QubitRegister`]
//! - **Gates**: [`StandardGate`] with its inverse and 2×2 matrix
//! - **Instructions**: [`Instruction`] combining a gate with targets and controls
//! - **Circuit**: [`Circuit`], a validating builder over an ordered instruction list
//!
//! # Example: Controlled Phase on the All-Ones State
//!
//! ```rust
//! use qamp_ir::{Circuit, StandardGate};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::new("all_ones");
//! let reg = circuit.add_qreg("q", 3);
//!
//! // P(π) on q[0], controlled on q[1] and q[2]
//! circuit
//!     .controlled(StandardGate::P(PI), reg.as_slice()[1..].to_vec(), reg[0])
//!     .unwrap();
//!
//! assert_eq!(circuit.len(), 1);
//! assert_eq!(circuit.instructions()[0].controls.len(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Description |
//! |------|-------------|
//! | `I` | Identity |
//! | `X`, `Y`, `Z` | Pauli gates |
//! | `H` | Hadamard gate |
//! | `S`, `Sdg` | S and S-dagger gates |
//! | `T`, `Tdg` | T and T-dagger gates |
//! | `Rx`, `Ry`, `Rz` | Rotation gates |
//! | `P` | Phase shift on `|1⟩` |
//!
//! Any gate may carry controls; `X` with one control is a CNOT.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId, QubitRegister};
