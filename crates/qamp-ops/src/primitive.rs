//! Primitive operations: single gates, broadcasting, and phase binding.

use qamp_ir::{Circuit, QubitId, StandardGate};

use crate::capability::{
    Adjoint, Capability, Controlled, ControlledAdjoint, Operation, PhasedRegister, Register,
};
use crate::error::{OpError, OpResult};

fn single_qubit(gate: &StandardGate, register: Register<'_>) -> OpResult<QubitId> {
    match register {
        [q] => Ok(*q),
        _ => Err(OpError::RegisterLengthMismatch {
            operation: gate.name(),
            expected: 1,
            got: register.len(),
        }),
    }
}

// =============================================================================
// StandardGate
// =============================================================================

impl<'a> Operation<Register<'a>> for StandardGate {
    fn apply(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        let q = single_qubit(self, target)?;
        circuit.gate(*self, q)?;
        Ok(())
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<'a> Adjoint<Register<'a>> for StandardGate {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        let q = single_qubit(self, target)?;
        circuit.gate(self.adjoint(), q)?;
        Ok(())
    }
}

impl<'a> Controlled<Register<'a>> for StandardGate {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        let q = single_qubit(self, target)?;
        circuit.controlled(*self, controls.iter().copied(), q)?;
        Ok(())
    }
}

impl<'a> ControlledAdjoint<Register<'a>> for StandardGate {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        let q = single_qubit(self, target)?;
        circuit.controlled(self.adjoint(), controls.iter().copied(), q)?;
        Ok(())
    }
}

// =============================================================================
// ApplyToEach
// =============================================================================

/// Applies a single-qubit operation to every qubit of a register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyToEach<O> {
    op: O,
}

impl<O> ApplyToEach<O> {
    /// Broadcast `op` over a register.
    pub fn new(op: O) -> Self {
        Self { op }
    }
}

impl<'a, O: Operation<Register<'a>>> Operation<Register<'a>> for ApplyToEach<O> {
    fn apply(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        for q in target {
            self.op.apply(circuit, std::slice::from_ref(q))?;
        }
        Ok(())
    }

    fn capability(&self) -> Capability {
        self.op.capability()
    }
}

impl<'a, O: Adjoint<Register<'a>>> Adjoint<Register<'a>> for ApplyToEach<O> {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        for q in target.iter().rev() {
            self.op.apply_adjoint(circuit, std::slice::from_ref(q))?;
        }
        Ok(())
    }
}

impl<'a, O: Controlled<Register<'a>>> Controlled<Register<'a>> for ApplyToEach<O> {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        for q in target {
            self.op
                .apply_controlled(circuit, controls, std::slice::from_ref(q))?;
        }
        Ok(())
    }
}

impl<'a, O: ControlledAdjoint<Register<'a>>> ControlledAdjoint<Register<'a>> for ApplyToEach<O> {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        for q in target.iter().rev() {
            self.op
                .apply_controlled_adjoint(circuit, controls, std::slice::from_ref(q))?;
        }
        Ok(())
    }
}

// =============================================================================
// AtPhase
// =============================================================================

/// A phased operation with its phase fixed, acting on a plain register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtPhase<O> {
    phase: f64,
    op: O,
}

impl<O> AtPhase<O> {
    /// Bind `phase` (radians) as the first argument of `op`.
    pub fn new(phase: f64, op: O) -> Self {
        Self { phase, op }
    }

    /// The bound phase.
    pub fn phase(&self) -> f64 {
        self.phase
    }
}

impl<'a, O: Operation<PhasedRegister<'a>>> Operation<Register<'a>> for AtPhase<O> {
    fn apply(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        self.op.apply(circuit, (self.phase, target))
    }

    fn capability(&self) -> Capability {
        self.op.capability()
    }
}

impl<'a, O: Adjoint<PhasedRegister<'a>>> Adjoint<Register<'a>> for AtPhase<O> {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        self.op.apply_adjoint(circuit, (self.phase, target))
    }
}

impl<'a, O: Controlled<PhasedRegister<'a>>> Controlled<Register<'a>> for AtPhase<O> {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        self.op
            .apply_controlled(circuit, controls, (self.phase, target))
    }
}

impl<'a, O: ControlledAdjoint<PhasedRegister<'a>>> ControlledAdjoint<Register<'a>> for AtPhase<O> {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        self.op
            .apply_controlled_adjoint(circuit, controls, (self.phase, target))
    }
}
