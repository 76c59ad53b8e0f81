//! Shared fixtures: a database-search state oracle and simulation helpers.

#![allow(dead_code)]

use std::f64::consts::PI;

use qamp_adapter_sim::{Statevector, StatevectorSimulator};
use qamp_ir::{Circuit, QubitId, StandardGate};
use qamp_ops::{
    Adjoint, Capability, Controlled, ControlledAdjoint, FlaggedRegister, OpResult, Operation,
    check_flag_index,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tolerance for amplitude and probability comparisons.
pub const TOL: f64 = 1e-10;

/// State oracle for unstructured search.
///
/// Puts the database (every qubit except the flag) into uniform
/// superposition, then flips the flag for each marked index. Database qubit
/// `k` holds bit `k` of the index.
#[derive(Debug, Clone)]
pub struct DatabaseOracle {
    marked: Vec<usize>,
}

impl DatabaseOracle {
    pub fn new(marked: impl Into<Vec<usize>>) -> Self {
        Self {
            marked: marked.into(),
        }
    }

    fn split(flag: usize, register: &[QubitId]) -> OpResult<(QubitId, Vec<QubitId>)> {
        check_flag_index(flag, register)?;
        let database = register
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != flag)
            .map(|(_, q)| *q)
            .collect();
        Ok((register[flag], database))
    }

    fn superpose(
        circuit: &mut Circuit,
        controls: &[QubitId],
        database: &[QubitId],
    ) -> OpResult<()> {
        for &q in database {
            circuit.controlled(StandardGate::H, controls.iter().copied(), q)?;
        }
        Ok(())
    }

    fn mark(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        flag: QubitId,
        database: &[QubitId],
    ) -> OpResult<()> {
        for &index in &self.marked {
            let zeros: Vec<QubitId> = database
                .iter()
                .enumerate()
                .filter(|(bit, _)| (index >> bit) & 1 == 0)
                .map(|(_, q)| *q)
                .collect();
            for &q in &zeros {
                circuit.x(q)?;
            }
            circuit.controlled(
                StandardGate::X,
                controls.iter().chain(database).copied(),
                flag,
            )?;
            for &q in &zeros {
                circuit.x(q)?;
            }
        }
        Ok(())
    }

    fn emit(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (flag, register): FlaggedRegister<'_>,
        inverse: bool,
    ) -> OpResult<()> {
        let (flag, database) = Self::split(flag, register)?;
        if inverse {
            self.mark(circuit, controls, flag, &database)?;
            Self::superpose(circuit, controls, &database)
        } else {
            Self::superpose(circuit, controls, &database)?;
            self.mark(circuit, controls, flag, &database)
        }
    }
}

impl<'a> Operation<FlaggedRegister<'a>> for DatabaseOracle {
    fn apply(&self, circuit: &mut Circuit, target: FlaggedRegister<'a>) -> OpResult<()> {
        self.emit(circuit, &[], target, false)
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<'a> Adjoint<FlaggedRegister<'a>> for DatabaseOracle {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: FlaggedRegister<'a>) -> OpResult<()> {
        self.emit(circuit, &[], target, true)
    }
}

impl<'a> Controlled<FlaggedRegister<'a>> for DatabaseOracle {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: FlaggedRegister<'a>,
    ) -> OpResult<()> {
        self.emit(circuit, controls, target, false)
    }
}

impl<'a> ControlledAdjoint<FlaggedRegister<'a>> for DatabaseOracle {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: FlaggedRegister<'a>,
    ) -> OpResult<()> {
        self.emit(circuit, controls, target, true)
    }
}

/// Allocate a circuit with a single `n`-qubit register.
pub fn circuit_with_register(name: &str, n: u32) -> (Circuit, Vec<QubitId>) {
    let mut circuit = Circuit::new(name);
    let reg = circuit.add_qreg("q", n);
    (circuit, reg.as_slice().to_vec())
}

/// Entangle `qubits` into a seeded pseudo-random state with complex amplitudes.
pub fn prepare_random_state(circuit: &mut Circuit, qubits: &[QubitId], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..2 {
        for &q in qubits {
            circuit.ry(rng.gen_range(-PI..PI), q).unwrap();
            circuit.rz(rng.gen_range(-PI..PI), q).unwrap();
        }
        for pair in qubits.windows(2) {
            circuit.cx(pair[0], pair[1]).unwrap();
        }
    }
}

/// Exact final state of a unitary circuit.
pub fn simulate(circuit: &Circuit) -> Statevector {
    StatevectorSimulator::new()
        .statevector(circuit)
        .expect("simulation failed")
}

/// Panic unless the two states agree amplitude by amplitude.
pub fn assert_same_state(actual: &Statevector, expected: &Statevector) {
    let distance = actual.max_distance(expected);
    assert!(
        distance < TOL,
        "states differ by {distance:e} (fidelity {})",
        actual.fidelity(expected)
    );
}

/// Probability that the flag at position 0 reads `|1⟩`.
pub fn flag_probability(state: &Statevector) -> f64 {
    state.probability_of_one(0).unwrap()
}

/// Database indices with non-negligible weight among flagged basis states.
///
/// Assumes the flag is qubit 0 and the database follows it.
pub fn flagged_indices(state: &Statevector) -> Vec<usize> {
    let mut indices: Vec<usize> = state
        .amplitudes()
        .iter()
        .enumerate()
        .filter(|(basis, amp)| basis & 1 == 1 && amp.norm_sqr() > TOL)
        .map(|(basis, _)| basis >> 1)
        .collect();
    indices.dedup();
    indices
}
