//! qamp Local Statevector Simulator
//!
//! Exact statevector execution of `qamp-ir` circuits. Used to check the
//! circuits emitted by `qamp-ops` and to sample search outcomes.
//!
//! # Features
//!
//! - **Exact Simulation**: Full statevector representation
//! - **Multi-Controlled Gates**: Any standard gate under any number of controls
//! - **Measurement Sampling**: Seeded or entropy-driven shots
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//!
//! # Example
//!
//! ```
//! use qamp_adapter_sim::StatevectorSimulator;
//! use qamp_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
//!
//! let sim = StatevectorSimulator::new().with_seed(1);
//! let state = sim.statevector(&circuit)?;
//! assert!((state.probability(|i| i == 0b11) - 0.5).abs() < 1e-12);
//!
//! let result = sim.run(&circuit, 100)?;
//! assert_eq!(result.counts.get("01") + result.counts.get("10"), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod simulator;
mod statevector;

pub use error::{SimError, SimResult};
pub use simulator::{Counts, ExecutionResult, StatevectorSimulator};
pub use statevector::Statevector;
