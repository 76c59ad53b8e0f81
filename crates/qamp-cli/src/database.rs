//! State oracle for unstructured database search.

use qamp_ir::{Circuit, QubitId, StandardGate};
use qamp_ops::{
    Adjoint, Capability, Controlled, ControlledAdjoint, FlaggedRegister, OpResult, Operation,
    check_flag_index,
};

/// Uniform superposition over the database with the marked indices flagged.
///
/// The database is every register qubit except the flag; database qubit `k`
/// holds bit `k` of an index. Marked indices are deduplicated, so each one
/// flips the flag exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseOracle {
    marked: Vec<usize>,
}

impl DatabaseOracle {
    /// Create an oracle marking `marked`.
    pub fn new(marked: impl IntoIterator<Item = usize>) -> Self {
        let mut marked: Vec<usize> = marked.into_iter().collect();
        marked.sort_unstable();
        marked.dedup();
        Self { marked }
    }

    /// Marked indices, sorted.
    pub fn marked(&self) -> &[usize] {
        &self.marked
    }

    fn emit(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        (flag_index, register): FlaggedRegister<'_>,
        inverse: bool,
    ) -> OpResult<()> {
        check_flag_index(flag_index, register)?;
        let flag = register[flag_index];
        let database: Vec<QubitId> = register
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != flag_index)
            .map(|(_, q)| *q)
            .collect();

        // Superposition and marking each square to the identity.
        if inverse {
            self.mark(circuit, controls, flag, &database)?;
            superpose(circuit, controls, &database)
        } else {
            superpose(circuit, controls, &database)?;
            self.mark(circuit, controls, flag, &database)
        }
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
}

fn superpose(circuit: &mut Circuit, controls: &[QubitId], database: &[QubitId]) -> OpResult<()> {
    for &q in database {
        circuit.controlled(StandardGate::H, controls.iter().copied(), q)?;
    }
    Ok(())
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
