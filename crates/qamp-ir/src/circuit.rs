//! High-level circuit builder API.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId, QubitRegister};

/// A quantum circuit.
///
/// Operations append to an ordered instruction list. Every appended
/// instruction is checked against the circuit's qubits and classical bits,
/// so a circuit only ever holds instructions a backend can execute.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in allocation order.
    qubits: Vec<QubitId>,
    /// Classical bits in allocation order.
    clbits: Vec<ClbitId>,
    /// Fast membership lookups for validation.
    qubit_set: FxHashSet<QubitId>,
    clbit_set: FxHashSet<ClbitId>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
    /// Counter for generating classical bit IDs.
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qubit_set: FxHashSet::default(),
            clbit_set: FxHashSet::default(),
            instructions: vec![],
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(id);
        self.qubit_set.insert(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> QubitRegister {
        let qubits = (0..size).map(|_| self.add_qubit()).collect();
        QubitRegister::new(name, qubits)
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.clbits.push(id);
        self.clbit_set.insert(id);
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, size: u32) -> Vec<ClbitId> {
        (0..size).map(|_| self.add_clbit()).collect()
    }

    /// Append an instruction after validating its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append several instructions in order.
    pub fn extend(
        &mut self,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<&mut Self> {
        for instruction in instructions {
            self.apply(instruction)?;
        }
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name().to_string());

        if instruction.is_gate() && instruction.qubits.len() != 1 {
            return Err(IrError::QubitCountMismatch {
                gate_name: instruction.name().to_string(),
                expected: 1,
                got: instruction.qubits.len(),
            });
        }
        if matches!(instruction.kind, InstructionKind::Measure)
            && instruction.qubits.len() != instruction.clbits.len()
        {
            return Err(IrError::QubitCountMismatch {
                gate_name: instruction.name().to_string(),
                expected: instruction.qubits.len(),
                got: instruction.clbits.len(),
            });
        }

        let mut seen = FxHashSet::default();
        for qubit in instruction.operands() {
            if !self.qubit_set.contains(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name(),
                });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.clbit_set.contains(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply a gate to one qubit.
    pub fn gate(&mut self, gate: StandardGate, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, target))
    }

    /// Apply a gate conditioned on `controls`.
    pub fn controlled(
        &mut self,
        gate: StandardGate,
        controls: impl IntoIterator<Item = QubitId>,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::controlled_gate(gate, controls, target))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::S, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::T, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta), qubit)
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::P(theta), qubit)
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.controlled(StandardGate::X, [control], target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.controlled(StandardGate::Z, [control], target)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure all qubits to corresponding classical bits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        let qubits = self.qubits.clone();
        let clbits: Vec<_> = self.clbits.iter().copied().take(qubits.len()).collect();
        self.apply(Instruction::measure_all(qubits, clbits)?)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the qubits in allocation order.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Get the classical bits in allocation order.
    pub fn clbits(&self) -> &[ClbitId] {
        &self.clbits
    }

    /// Get the instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether every instruction is unitary (no measurement or reset).
    pub fn is_unitary(&self) -> bool {
        self.instructions.iter().all(Instruction::is_unitary)
    }

    /// Circuit depth: the longest chain of instructions sharing an operand.
    ///
    /// Barriers synchronize their qubits without adding a layer.
    pub fn depth(&self) -> usize {
        let mut qubit_layer: FxHashMap<QubitId, usize> = FxHashMap::default();
        let mut clbit_layer: FxHashMap<ClbitId, usize> = FxHashMap::default();
        let mut depth = 0;

        for inst in &self.instructions {
            let start = inst
                .operands()
                .map(|q| qubit_layer.get(&q).copied().unwrap_or(0))
                .chain(
                    inst.clbits
                        .iter()
                        .map(|c| clbit_layer.get(c).copied().unwrap_or(0)),
                )
                .max()
                .unwrap_or(0);
            let layer = if matches!(inst.kind, InstructionKind::Barrier) {
                start
            } else {
                start + 1
            };
            for q in inst.operands() {
                qubit_layer.insert(q, layer);
            }
            for &c in &inst.clbits {
                clbit_layer.insert(c, layer);
            }
            depth = depth.max(layer);
        }
        depth
    }

    /// Count instructions by name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 5, 3);
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_clbits(), 3);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let flag = circuit.add_qreg("flag", 1);
        let db = circuit.add_qreg("db", 3);
        assert_eq!(flag.as_slice(), &[QubitId(0)]);
        assert_eq!(db.as_slice(), &[QubitId(1), QubitId(2), QubitId(3)]);
        assert_eq!(circuit.num_qubits(), 4);
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure_all().unwrap();
        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.depth(), 3);
        assert!(!circuit.is_unitary());
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .p(PI / 4.0, QubitId(2))
            .unwrap();
        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.depth(), 2);
        assert!(circuit.is_unitary());
    }

    #[test]
    fn test_unknown_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit.h(QubitId(7)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(7), .. }));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_duplicate_control_rejected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit
            .controlled(StandardGate::X, [QubitId(1)], QubitId(1))
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { qubit: QubitId(1), .. }));
    }

    #[test]
    fn test_unknown_clbit_rejected() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        let err = circuit.measure(QubitId(0), ClbitId(0)).unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));
    }

    #[test]
    fn test_count_ops() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.x(QubitId(0)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        circuit
            .controlled(StandardGate::P(PI), [QubitId(1), QubitId(2)], QubitId(0))
            .unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("x"), Some(&2));
        assert_eq!(counts.get("p"), Some(&1));
    }

    #[test]
    fn test_barrier_does_not_add_depth() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.barrier([QubitId(0), QubitId(1)]).unwrap();
        circuit.h(QubitId(1)).unwrap();
        assert_eq!(circuit.depth(), 2);
    }
}
