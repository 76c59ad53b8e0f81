//! Qubit and classical bit handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Opaque handle to a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Position of this qubit in a basis-state index (bit `n` for `QubitId(n)`).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Opaque handle to a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A named, ordered sequence of qubits.
///
/// Positions are significant: operations address `register[i]` by index and
/// never reorder. How an integer is encoded across positions is up to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitRegister {
    name: String,
    qubits: Vec<QubitId>,
}

impl QubitRegister {
    /// Create a register from existing qubit handles.
    pub fn new(name: impl Into<String>, qubits: Vec<QubitId>) -> Self {
        Self {
            name: name.into(),
            qubits,
        }
    }

    /// The register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the qubits as a slice, the form every operation consumes.
    pub fn as_slice(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Number of qubits in the register.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// Whether the register holds no qubits.
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }

    /// Iterate over the qubits in order.
    pub fn iter(&self) -> impl Iterator<Item = &QubitId> {
        self.qubits.iter()
    }
}

impl Index<usize> for QubitRegister {
    type Output = QubitId;

    fn index(&self, index: usize) -> &QubitId {
        &self.qubits[index]
    }
}

impl fmt::Display for QubitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.qubits.len())
    }
}
