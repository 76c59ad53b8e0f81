//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(StandardGate),
    /// Measurement operation.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction acts on (the single target for gates).
    pub qubits: Vec<QubitId>,
    /// Control qubits; the gate acts only on basis states where all are `|1⟩`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<QubitId>,
    /// Classical bits this instruction writes (for measure).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create an uncontrolled gate instruction.
    pub fn gate(gate: StandardGate, target: QubitId) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: vec![target],
            controls: vec![],
            clbits: vec![],
        }
    }

    /// Create a gate instruction conditioned on `controls`.
    ///
    /// An empty control list yields a plain gate.
    pub fn controlled_gate(
        gate: StandardGate,
        controls: impl IntoIterator<Item = QubitId>,
        target: QubitId,
    ) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: vec![target],
            controls: controls.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            controls: vec![],
            clbits: vec![clbit],
        }
    }

    /// Create a multi-qubit measurement instruction.
    ///
    /// Returns an error if the number of qubits and classical bits do not match.
    pub fn measure_all(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let clbits: Vec<_> = clbits.into_iter().collect();
        if qubits.len() != clbits.len() {
            return Err(IrError::QubitCountMismatch {
                gate_name: "measure".into(),
                expected: qubits.len(),
                got: clbits.len(),
            });
        }
        Ok(Self {
            kind: InstructionKind::Measure,
            qubits,
            controls: vec![],
            clbits,
        })
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            controls: vec![],
            clbits: vec![],
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            controls: vec![],
            clbits: vec![],
        }
    }

    /// Get the name of this instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// The gate, if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Whether this instruction is a gate.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Whether this instruction acts unitarily (gates and barriers).
    pub fn is_unitary(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_) | InstructionKind::Barrier)
    }

    /// All qubits touched by this instruction, controls first.
    pub fn operands(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.controls.iter().chain(&self.qubits).copied()
    }

    /// The inverse instruction.
    pub fn adjoint(&self) -> IrResult<Self> {
        match &self.kind {
            InstructionKind::Gate(g) => Ok(Self {
                kind: InstructionKind::Gate(g.adjoint()),
                ..self.clone()
            }),
            InstructionKind::Barrier => Ok(self.clone()),
            InstructionKind::Measure | InstructionKind::Reset => {
                Err(IrError::NotInvertible(self.name().to_string()))
            }
        }
    }

    /// This instruction conditioned on additional control qubits.
    ///
    /// The new controls are placed before the existing ones.
    pub fn with_controls(&self, extra: &[QubitId]) -> IrResult<Self> {
        match &self.kind {
            InstructionKind::Gate(_) => Ok(Self {
                controls: extra.iter().chain(&self.controls).copied().collect(),
                ..self.clone()
            }),
            InstructionKind::Barrier => Ok(self.clone()),
            InstructionKind::Measure | InstructionKind::Reset => {
                Err(IrError::NotControllable(self.name().to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controlled_gate_operands() {
        let inst =
            Instruction::controlled_gate(StandardGate::X, [QubitId(1), QubitId(2)], QubitId(0));
        assert_eq!(inst.name(), "x");
        let operands: Vec<_> = inst.operands().collect();
        assert_eq!(operands, vec![QubitId(1), QubitId(2), QubitId(0)]);
    }

    #[test]
    fn test_adjoint_gate() {
        let inst = Instruction::controlled_gate(StandardGate::T, [QubitId(1)], QubitId(0));
        let adj = inst.adjoint().unwrap();
        assert_eq!(adj.as_gate(), Some(&StandardGate::Tdg));
        assert_eq!(adj.controls, vec![QubitId(1)]);
    }

    #[test]
    fn test_measure_not_invertible() {
        let inst = Instruction::measure(QubitId(0), ClbitId(0));
        assert!(matches!(inst.adjoint(), Err(IrError::NotInvertible(_))));
        assert!(matches!(
            inst.with_controls(&[QubitId(1)]),
            Err(IrError::NotControllable(_))
        ));
    }

    #[test]
    fn test_with_controls_prepends() {
        let inst = Instruction::controlled_gate(StandardGate::P(0.5), [QubitId(2)], QubitId(0));
        let ctl = inst.with_controls(&[QubitId(5)]).unwrap();
        assert_eq!(ctl.controls, vec![QubitId(5), QubitId(2)]);
        assert_eq!(ctl.qubits, vec![QubitId(0)]);
    }

    #[test]
    fn test_measure_all_count_mismatch() {
        let result = Instruction::measure_all([QubitId(0), QubitId(1)], [ClbitId(0)]);
        assert!(matches!(
            result,
            Err(IrError::QubitCountMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_serde_skips_empty_controls() {
        let inst = Instruction::gate(StandardGate::H, QubitId(0));
        let json = serde_json::to_string(&inst).unwrap();
        assert!(!json.contains("controls"));
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
