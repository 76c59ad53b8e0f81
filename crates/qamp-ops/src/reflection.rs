//! Phase-shift reflections.
//!
//! A reflection oracle takes `(phase, register)` and multiplies the target
//! subspace by `e^{iθ}`, i.e. applies `I − (1 − e^{iθ})·P`. At `θ = π` this
//! is an exact involution; other phases give partial reflections.

use qamp_ir::{Circuit, QubitId, StandardGate};

use crate::capability::{
    Adjoint, AdjointOf, Capability, Controlled, ControlledAdjoint, Operation, PhasedRegister,
    Register,
};
use crate::conjugation::WithCA;
use crate::error::{OpError, OpResult};
use crate::oracle::{DeterministicStateOracle, check_flag_index};
use crate::primitive::{ApplyToEach, AtPhase};

fn split_first<'a>(
    operation: &'static str,
    register: Register<'a>,
) -> OpResult<(QubitId, Register<'a>)> {
    match register.split_first() {
        Some((first, rest)) => Ok((*first, rest)),
        None => Err(OpError::EmptyRegister { operation }),
    }
}

// =============================================================================
// RAll1
// =============================================================================

/// Phase shift on the all-ones state.
///
/// Emitted as one `P(θ)` on `register[0]` controlled on the remaining qubits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RAll1;

impl RAll1 {
    fn emit(
        circuit: &mut Circuit,
        controls: &[QubitId],
        phase: f64,
        register: Register<'_>,
    ) -> OpResult<()> {
        let (target, rest) = split_first("RAll1", register)?;
        circuit.controlled(
            StandardGate::P(phase),
            controls.iter().chain(rest).copied(),
            target,
        )?;
        Ok(())
    }
}

impl<'a> Operation<PhasedRegister<'a>> for RAll1 {
    fn apply(&self, circuit: &mut Circuit, (phase, register): PhasedRegister<'a>) -> OpResult<()> {
        Self::emit(circuit, &[], phase, register)
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<'a> Adjoint<PhasedRegister<'a>> for RAll1 {
    fn apply_adjoint(
        &self,
        circuit: &mut Circuit,
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        Self::emit(circuit, &[], -phase, register)
    }
}

impl<'a> Controlled<PhasedRegister<'a>> for RAll1 {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        Self::emit(circuit, controls, phase, register)
    }
}

impl<'a> ControlledAdjoint<PhasedRegister<'a>> for RAll1 {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        Self::emit(circuit, controls, -phase, register)
    }
}

// =============================================================================
// RAll0
// =============================================================================

/// Phase shift on the all-zeros state: [`RAll1`] conjugated by X on every qubit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RAll0;

impl RAll0 {
    fn body(phase: f64) -> WithCA<ApplyToEach<StandardGate>, AtPhase<RAll1>> {
        WithCA::new(ApplyToEach::new(StandardGate::X), AtPhase::new(phase, RAll1))
    }

    fn non_empty(register: Register<'_>) -> OpResult<()> {
        split_first("RAll0", register).map(|_| ())
    }
}

impl<'a> Operation<PhasedRegister<'a>> for RAll0 {
    fn apply(&self, circuit: &mut Circuit, (phase, register): PhasedRegister<'a>) -> OpResult<()> {
        Self::non_empty(register)?;
        Self::body(phase).apply(circuit, register)
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<'a> Adjoint<PhasedRegister<'a>> for RAll0 {
    fn apply_adjoint(
        &self,
        circuit: &mut Circuit,
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        Self::non_empty(register)?;
        Self::body(phase).apply_adjoint(circuit, register)
    }
}

impl<'a> Controlled<PhasedRegister<'a>> for RAll0 {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        Self::non_empty(register)?;
        Self::body(phase).apply_controlled(circuit, controls, register)
    }
}

impl<'a> ControlledAdjoint<PhasedRegister<'a>> for RAll0 {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        Self::non_empty(register)?;
        Self::body(phase).apply_controlled_adjoint(circuit, controls, register)
    }
}

/// Reflection about the canonical start state `|0…0⟩`.
pub fn reflection_start() -> RAll0 {
    RAll0
}

// =============================================================================
// Reflection about a prepared state
// =============================================================================

/// Reflection about the state a deterministic oracle prepares from `|0…0⟩`.
///
/// Emits `oracle†`, [`RAll0`], `oracle`. Only the oracle's adjoint is needed;
/// the oracle is never controlled, so the reflection supports every functor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionFromDeterministic<O> {
    oracle: O,
}

impl<O> ReflectionFromDeterministic<O> {
    /// The state-preparation oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    fn body(&self, phase: f64) -> WithCA<AdjointOf<&O>, AtPhase<RAll0>> {
        WithCA::new(AdjointOf::new(&self.oracle), AtPhase::new(phase, RAll0))
    }
}

/// Reflect about the state `oracle` prepares.
pub fn reflection_oracle_from_deterministic_state_oracle<O>(
    oracle: O,
) -> ReflectionFromDeterministic<O>
where
    O: DeterministicStateOracle + for<'a> Adjoint<Register<'a>>,
{
    ReflectionFromDeterministic { oracle }
}

impl<'a, O: Adjoint<Register<'a>>> Operation<PhasedRegister<'a>>
    for ReflectionFromDeterministic<O>
{
    fn apply(&self, circuit: &mut Circuit, (phase, register): PhasedRegister<'a>) -> OpResult<()> {
        self.body(phase).apply(circuit, register)
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<'a, O: Adjoint<Register<'a>>> Adjoint<PhasedRegister<'a>> for ReflectionFromDeterministic<O> {
    fn apply_adjoint(
        &self,
        circuit: &mut Circuit,
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        self.body(phase).apply_adjoint(circuit, register)
    }
}

impl<'a, O: Adjoint<Register<'a>>> Controlled<PhasedRegister<'a>>
    for ReflectionFromDeterministic<O>
{
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        self.body(phase)
            .apply_controlled(circuit, controls, register)
    }
}

impl<'a, O: Adjoint<Register<'a>>> ControlledAdjoint<PhasedRegister<'a>>
    for ReflectionFromDeterministic<O>
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        self.body(phase)
            .apply_controlled_adjoint(circuit, controls, register)
    }
}

// =============================================================================
// Target-state reflection
// =============================================================================

/// Phase shift on the `|1⟩` state of a single flag qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetStateReflection {
    flag_index: usize,
}

impl TargetStateReflection {
    /// Position of the flag qubit within the register.
    pub fn flag_index(&self) -> usize {
        self.flag_index
    }

    fn emit(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        phase: f64,
        register: Register<'_>,
    ) -> OpResult<()> {
        check_flag_index(self.flag_index, register)?;
        circuit.controlled(
            StandardGate::P(phase),
            controls.iter().copied(),
            register[self.flag_index],
        )?;
        Ok(())
    }
}

/// Reflect about the flag qubit `register[flag_index]` being `|1⟩`.
pub fn target_state_reflection_oracle(flag_index: usize) -> TargetStateReflection {
    TargetStateReflection { flag_index }
}

impl<'a> Operation<PhasedRegister<'a>> for TargetStateReflection {
    fn apply(&self, circuit: &mut Circuit, (phase, register): PhasedRegister<'a>) -> OpResult<()> {
        self.emit(circuit, &[], phase, register)
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<'a> Adjoint<PhasedRegister<'a>> for TargetStateReflection {
    fn apply_adjoint(
        &self,
        circuit: &mut Circuit,
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        self.emit(circuit, &[], -phase, register)
    }
}

impl<'a> Controlled<PhasedRegister<'a>> for TargetStateReflection {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        self.emit(circuit, controls, phase, register)
    }
}

impl<'a> ControlledAdjoint<PhasedRegister<'a>> for TargetStateReflection {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (phase, register): PhasedRegister<'a>,
    ) -> OpResult<()> {
        self.emit(circuit, controls, -phase, register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rall1_single_multicontrolled_phase() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        let q = circuit.qubits().to_vec();
        RAll1.apply(&mut circuit, (PI, &q[..])).unwrap();
        assert_eq!(circuit.len(), 1);
        let inst = &circuit.instructions()[0];
        assert_eq!(inst.as_gate(), Some(&StandardGate::P(PI)));
        assert_eq!(inst.qubits, vec![q[0]]);
        assert_eq!(inst.controls, vec![q[1], q[2]]);
    }

    #[test]
    fn test_rall1_controlled_prepends_controls() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        let q = circuit.qubits().to_vec();
        RAll1
            .apply_controlled_adjoint(&mut circuit, &q[2..], (0.5, &q[..2]))
            .unwrap();
        let inst = &circuit.instructions()[0];
        assert_eq!(inst.as_gate(), Some(&StandardGate::P(-0.5)));
        assert_eq!(inst.controls, vec![q[2], q[1]]);
    }

    #[test]
    fn test_empty_register_rejected() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        let q = circuit.qubits().to_vec();
        assert!(matches!(
            RAll1.apply(&mut circuit, (PI, &q[..0])),
            Err(OpError::EmptyRegister { operation: "RAll1" })
        ));
        assert!(matches!(
            reflection_start().apply(&mut circuit, (PI, &q[..0])),
            Err(OpError::EmptyRegister { operation: "RAll0" })
        ));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_rall0_structure() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        let q = circuit.qubits().to_vec();
        RAll0.apply(&mut circuit, (PI, &q[..])).unwrap();
        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["x", "x", "p", "x", "x"]);
    }

    #[test]
    fn test_reflection_from_oracle_order() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        let q = circuit.qubits().to_vec();
        reflection_oracle_from_deterministic_state_oracle(StandardGate::S)
            .apply(&mut circuit, (PI, &q[..]))
            .unwrap();
        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["sdg", "x", "p", "x", "s"]);
    }

    #[test]
    fn test_reflection_from_oracle_controlled_leaves_oracle_uncontrolled() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        let q = circuit.qubits().to_vec();
        reflection_oracle_from_deterministic_state_oracle(StandardGate::H)
            .apply_controlled(&mut circuit, &q[1..], (PI, &q[..1]))
            .unwrap();
        let controlled: Vec<_> = circuit
            .instructions()
            .iter()
            .map(|i| (i.name().to_string(), !i.controls.is_empty()))
            .collect();
        assert_eq!(
            controlled,
            vec![
                ("h".to_string(), false),
                ("x".to_string(), false),
                ("p".to_string(), true),
                ("x".to_string(), false),
                ("h".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_target_state_reflection() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        let q = circuit.qubits().to_vec();
        let reflection = target_state_reflection_oracle(2);
        reflection.apply(&mut circuit, (PI, &q[..])).unwrap();
        assert_eq!(circuit.instructions()[0].qubits, vec![q[2]]);
        assert!(matches!(
            reflection.apply(&mut circuit, (PI, &q[..2])),
            Err(OpError::FlagIndexOutOfRange { index: 2, len: 2 })
        ));
    }
}
