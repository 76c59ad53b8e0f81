//! qamp Operation Combinators and Amplitude Amplification
//!
//! Operations here are immutable descriptors that emit instructions into a
//! [`qamp_ir::Circuit`]. Each one states, through the traits it implements,
//! whether it can also run inverted ([`Adjoint`]), under extra controls
//! ([`Controlled`]), or both ([`ControlledAdjoint`]). Combinators forward
//! exactly the functors their inputs provide, so asking for a controlled
//! form of something that has none is a compile error.
//!
//! # Layers
//!
//! - **Capability model**: [`Operation`] and its functor traits, [`Capability`],
//!   [`AdjointOf`], [`NoOp`]
//! - **Primitives**: [`StandardGate`](qamp_ir::StandardGate) on one qubit,
//!   [`ApplyToEach`], [`AtPhase`]
//! - **Conjugation**: [`With`], [`WithA`], [`WithC`], [`WithCA`]
//! - **Oracle adapters**: conversions between the state, deterministic,
//!   oblivious and reflection oracle shapes
//! - **Reflections**: [`RAll1`], [`RAll0`], [`ReflectionFromDeterministic`],
//!   [`TargetStateReflection`]
//! - **Amplification**: [`AmplitudeAmplification`] and its state-oracle and
//!   oblivious variants, plus the closed-form success probability
//!
//! # Example: One Grover Step
//!
//! ```rust
//! use qamp_adapter_sim::StatevectorSimulator;
//! use qamp_ir::{Circuit, StandardGate};
//! use qamp_ops::{
//!     AmplitudeAmplification, ApplyToEach, Operation,
//!     reflection_oracle_from_deterministic_state_oracle, success_probability,
//!     target_state_reflection_oracle,
//! };
//!
//! let mut circuit = Circuit::new("grover");
//! let reg = circuit.add_qreg("q", 3);
//!
//! // Uniform superposition; q[0] = |1⟩ marks half the states.
//! let prepare = ApplyToEach::new(StandardGate::H);
//! prepare.apply(&mut circuit, reg.as_slice())?;
//!
//! let search = AmplitudeAmplification::standard(
//!     1,
//!     target_state_reflection_oracle(0),
//!     reflection_oracle_from_deterministic_state_oracle(prepare),
//! );
//! search.apply(&mut circuit, reg.as_slice())?;
//!
//! let state = StatevectorSimulator::new().statevector(&circuit)?;
//! let expected = success_probability(1, 0.5)?;
//! assert!((state.probability_of_one(0)? - expected).abs() < 1e-10);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod amplification;
pub mod capability;
pub mod config;
pub mod conjugation;
pub mod error;
pub mod oracle;
pub mod primitive;
pub mod reflection;

pub use amplification::{
    AmplitudeAmplification, ObliviousAmplitudeAmplification, PhasePair, ReflectionPhases,
    StateOracleAmplification, amplitude_amplification, amplitude_amplification_from_state_oracle,
    oblivious_amplitude_amplification, optimal_iterations, standard_amplitude_amplification,
    success_amplitude, success_probability,
};
pub use capability::{
    Adjoint, AdjointOf, Capability, Controlled, ControlledAdjoint, FlaggedRegister, NoOp,
    Operation, PhasedRegister, Register, SplitRegister, adjoint,
};
pub use config::{AmplificationConfig, Schedule};
pub use conjugation::{Conjugation, With, WithA, WithC, WithCA, with, with_a, with_c, with_ca};
pub use error::{OpError, OpResult};
pub use oracle::{
    DeterministicStateOracle, FixedFlag, IgnoreFlag, ObliviousFromDeterministic, ObliviousOracle,
    OnAncilla, ReflectionOracle, StateOracle, check_flag_index,
    deterministic_state_oracle_from_state_oracle, oblivious_oracle_from_deterministic_state_oracle,
    state_oracle_from_deterministic_state_oracle,
};
pub use primitive::{ApplyToEach, AtPhase};
pub use reflection::{
    RAll0, RAll1, ReflectionFromDeterministic, TargetStateReflection,
    reflection_oracle_from_deterministic_state_oracle, reflection_start,
    target_state_reflection_oracle,
};
