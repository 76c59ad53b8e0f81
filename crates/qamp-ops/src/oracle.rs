//! Oracle shapes and the adapters between them.
//!
//! Four shapes are in use:
//!
//! | Shape | Target | Meaning |
//! |-------|--------|---------|
//! | [`StateOracle`] | `(flag_index, register)` | Prepares a state whose `register[flag_index]` marks success |
//! | [`DeterministicStateOracle`] | `register` | Prepares a fixed state from `|0…0⟩` |
//! | [`ObliviousOracle`] | `(ancilla, system)` | Acts the same whatever the system register holds |
//! | [`ReflectionOracle`] | `(phase, register)` | Phase-shift reflection about a fixed subspace |
//!
//! Every shape is a trait alias over [`Operation`]; any type that is an
//! operation of that shape for all register lifetimes qualifies.

use qamp_ir::{Circuit, QubitId};

use crate::capability::{
    Adjoint, Capability, Controlled, ControlledAdjoint, FlaggedRegister, Operation,
    PhasedRegister, Register, SplitRegister,
};
use crate::error::{OpError, OpResult};

/// `(flag_index, register) → ()`.
pub trait StateOracle: for<'a> Operation<FlaggedRegister<'a>> {}

impl<T: ?Sized> StateOracle for T where T: for<'a> Operation<FlaggedRegister<'a>> {}

/// `register → ()`.
pub trait DeterministicStateOracle: for<'a> Operation<Register<'a>> {}

impl<T: ?Sized> DeterministicStateOracle for T where T: for<'a> Operation<Register<'a>> {}

/// `(ancilla, system) → ()`.
pub trait ObliviousOracle: for<'a> Operation<SplitRegister<'a>> {}

impl<T: ?Sized> ObliviousOracle for T where T: for<'a> Operation<SplitRegister<'a>> {}

/// `(phase, register) → ()`.
pub trait ReflectionOracle: for<'a> Operation<PhasedRegister<'a>> {}

impl<T: ?Sized> ReflectionOracle for T where T: for<'a> Operation<PhasedRegister<'a>> {}

/// Fail with [`OpError::FlagIndexOutOfRange`] unless `index` addresses `register`.
pub fn check_flag_index(index: usize, register: &[QubitId]) -> OpResult<()> {
    if index >= register.len() {
        return Err(OpError::FlagIndexOutOfRange {
            index,
            len: register.len(),
        });
    }
    Ok(())
}

// =============================================================================
// State oracle -> deterministic state oracle
// =============================================================================

/// A state oracle with its flag index fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFlag<O> {
    flag_index: usize,
    oracle: O,
}

impl<O> FixedFlag<O> {
    /// The fixed flag position.
    pub fn flag_index(&self) -> usize {
        self.flag_index
    }

    /// The wrapped state oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

/// Fix the flag index of `state_oracle`, giving a deterministic state oracle.
pub fn deterministic_state_oracle_from_state_oracle<O: StateOracle>(
    flag_index: usize,
    state_oracle: O,
) -> FixedFlag<O> {
    FixedFlag {
        flag_index,
        oracle: state_oracle,
    }
}

impl<'a, O: Operation<FlaggedRegister<'a>>> Operation<Register<'a>> for FixedFlag<O> {
    fn apply(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.oracle.apply(circuit, (self.flag_index, target))
    }

    fn capability(&self) -> Capability {
        self.oracle.capability()
    }
}

impl<'a, O: Adjoint<FlaggedRegister<'a>>> Adjoint<Register<'a>> for FixedFlag<O> {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.oracle.apply_adjoint(circuit, (self.flag_index, target))
    }
}

impl<'a, O: Controlled<FlaggedRegister<'a>>> Controlled<Register<'a>> for FixedFlag<O> {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.oracle
            .apply_controlled(circuit, controls, (self.flag_index, target))
    }
}

impl<'a, O: ControlledAdjoint<FlaggedRegister<'a>>> ControlledAdjoint<Register<'a>>
    for FixedFlag<O>
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.oracle
            .apply_controlled_adjoint(circuit, controls, (self.flag_index, target))
    }
}

// =============================================================================
// Deterministic state oracle -> state oracle
// =============================================================================

/// A deterministic state oracle presented as a state oracle.
///
/// The flag index is range-checked and then ignored: the wrapped oracle
/// always acts on the whole register. Callers must not expect index-dependent
/// behavior through this adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IgnoreFlag<O> {
    oracle: O,
}

impl<O> IgnoreFlag<O> {
    /// The wrapped deterministic oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

/// Present `oracle` in the flag-indexed shape.
pub fn state_oracle_from_deterministic_state_oracle<O: DeterministicStateOracle>(
    oracle: O,
) -> IgnoreFlag<O> {
    IgnoreFlag { oracle }
}

impl<'a, O: Operation<Register<'a>>> Operation<FlaggedRegister<'a>> for IgnoreFlag<O> {
    fn apply(&self, circuit: &mut Circuit, (index, register): FlaggedRegister<'a>) -> OpResult<()> {
        check_flag_index(index, register)?;
        self.oracle.apply(circuit, register)
    }

    fn capability(&self) -> Capability {
        self.oracle.capability()
    }
}

impl<'a, O: Adjoint<Register<'a>>> Adjoint<FlaggedRegister<'a>> for IgnoreFlag<O> {
    fn apply_adjoint(
        &self,
        circuit: &mut Circuit,
        (index, register): FlaggedRegister<'a>,
    ) -> OpResult<()> {
        check_flag_index(index, register)?;
        self.oracle.apply_adjoint(circuit, register)
    }
}

impl<'a, O: Controlled<Register<'a>>> Controlled<FlaggedRegister<'a>> for IgnoreFlag<O> {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (index, register): FlaggedRegister<'a>,
    ) -> OpResult<()> {
        check_flag_index(index, register)?;
        self.oracle.apply_controlled(circuit, controls, register)
    }
}

impl<'a, O: ControlledAdjoint<Register<'a>>> ControlledAdjoint<FlaggedRegister<'a>>
    for IgnoreFlag<O>
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (index, register): FlaggedRegister<'a>,
    ) -> OpResult<()> {
        check_flag_index(index, register)?;
        self.oracle
            .apply_controlled_adjoint(circuit, controls, register)
    }
}

// =============================================================================
// Deterministic state oracle + signal oracle -> oblivious oracle
// =============================================================================

/// Ancilla preparation followed by a signal oracle over `(ancilla, system)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObliviousFromDeterministic<A, S> {
    ancilla_oracle: A,
    signal_oracle: S,
}

/// Lift ancilla preparation into the oblivious shape: `ancilla_oracle(ancilla)`
/// then `signal_oracle(ancilla, system)`.
pub fn oblivious_oracle_from_deterministic_state_oracle<A, S>(
    ancilla_oracle: A,
    signal_oracle: S,
) -> ObliviousFromDeterministic<A, S>
where
    A: DeterministicStateOracle,
    S: ObliviousOracle,
{
    ObliviousFromDeterministic {
        ancilla_oracle,
        signal_oracle,
    }
}

impl<'a, A, S> Operation<SplitRegister<'a>> for ObliviousFromDeterministic<A, S>
where
    A: Operation<Register<'a>>,
    S: Operation<SplitRegister<'a>>,
{
    fn apply(&self, circuit: &mut Circuit, target: SplitRegister<'a>) -> OpResult<()> {
        self.ancilla_oracle.apply(circuit, target.0)?;
        self.signal_oracle.apply(circuit, target)
    }

    fn capability(&self) -> Capability {
        self.ancilla_oracle
            .capability()
            .intersect(self.signal_oracle.capability())
    }
}

impl<'a, A, S> Adjoint<SplitRegister<'a>> for ObliviousFromDeterministic<A, S>
where
    A: Adjoint<Register<'a>>,
    S: Adjoint<SplitRegister<'a>>,
{
    fn apply_adjoint(&self, circuit: &mut Circuit, target: SplitRegister<'a>) -> OpResult<()> {
        self.signal_oracle.apply_adjoint(circuit, target)?;
        self.ancilla_oracle.apply_adjoint(circuit, target.0)
    }
}

impl<'a, A, S> Controlled<SplitRegister<'a>> for ObliviousFromDeterministic<A, S>
where
    A: Controlled<Register<'a>>,
    S: Controlled<SplitRegister<'a>>,
{
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: SplitRegister<'a>,
    ) -> OpResult<()> {
        self.ancilla_oracle
            .apply_controlled(circuit, controls, target.0)?;
        self.signal_oracle.apply_controlled(circuit, controls, target)
    }
}

impl<'a, A, S> ControlledAdjoint<SplitRegister<'a>> for ObliviousFromDeterministic<A, S>
where
    A: ControlledAdjoint<Register<'a>>,
    S: ControlledAdjoint<SplitRegister<'a>>,
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: SplitRegister<'a>,
    ) -> OpResult<()> {
        self.signal_oracle
            .apply_controlled_adjoint(circuit, controls, target)?;
        self.ancilla_oracle
            .apply_controlled_adjoint(circuit, controls, target.0)
    }
}

// =============================================================================
// Register operation -> ancilla half of a split register
// =============================================================================

/// Runs a register operation on the ancilla half of a split register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnAncilla<O>(pub O);

impl<'a, O: Operation<Register<'a>>> Operation<SplitRegister<'a>> for OnAncilla<O> {
    fn apply(&self, circuit: &mut Circuit, target: SplitRegister<'a>) -> OpResult<()> {
        self.0.apply(circuit, target.0)
    }

    fn capability(&self) -> Capability {
        self.0.capability()
    }
}

impl<'a, O: Adjoint<Register<'a>>> Adjoint<SplitRegister<'a>> for OnAncilla<O> {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: SplitRegister<'a>) -> OpResult<()> {
        self.0.apply_adjoint(circuit, target.0)
    }
}

impl<'a, O: Controlled<Register<'a>>> Controlled<SplitRegister<'a>> for OnAncilla<O> {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: SplitRegister<'a>,
    ) -> OpResult<()> {
        self.0.apply_controlled(circuit, controls, target.0)
    }
}

impl<'a, O: ControlledAdjoint<Register<'a>>> ControlledAdjoint<SplitRegister<'a>>
    for OnAncilla<O>
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: SplitRegister<'a>,
    ) -> OpResult<()> {
        self.0.apply_controlled_adjoint(circuit, controls, target.0)
    }
}
