//! Operations, their capability tags, and the adjoint functor.
//!
//! An operation emits instructions into a [`Circuit`] for a target of shape
//! `A`. Running it inverted or under extra controls is a separate trait, so a
//! combinator that needs one of those forms states it as a bound and a
//! mismatch is rejected by the compiler rather than at run time.
//! [`Capability`] mirrors the implemented traits for inspection.

use std::fmt;

use qamp_ir::{Circuit, QubitId};
use serde::{Deserialize, Serialize};

use crate::error::OpResult;

/// An ordered qubit register.
pub type Register<'a> = &'a [QubitId];

/// A register with a distinguished flag position: `(flag_index, register)`.
pub type FlaggedRegister<'a> = (usize, &'a [QubitId]);

/// A register paired with a reflection phase in radians: `(phase, register)`.
pub type PhasedRegister<'a> = (f64, &'a [QubitId]);

/// An ancilla register and a system register: `(ancilla, system)`.
pub type SplitRegister<'a> = (&'a [QubitId], &'a [QubitId]);

/// Declared ability of an operation to run inverted and/or controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Forward application only.
    #[default]
    None,
    /// Has an adjoint.
    Adjoint,
    /// Has a controlled form.
    Controlled,
    /// Has an adjoint, a controlled form, and their combination.
    AdjointControlled,
}

impl Capability {
    /// Build a capability from its two flags.
    pub const fn new(adjoint: bool, controlled: bool) -> Self {
        match (adjoint, controlled) {
            (false, false) => Capability::None,
            (true, false) => Capability::Adjoint,
            (false, true) => Capability::Controlled,
            (true, true) => Capability::AdjointControlled,
        }
    }

    /// Whether an adjoint is available.
    pub const fn supports_adjoint(self) -> bool {
        matches!(self, Capability::Adjoint | Capability::AdjointControlled)
    }

    /// Whether a controlled form is available.
    pub const fn supports_controlled(self) -> bool {
        matches!(self, Capability::Controlled | Capability::AdjointControlled)
    }

    /// Capabilities present in both `self` and `other`.
    pub const fn intersect(self, other: Capability) -> Self {
        Self::new(
            self.supports_adjoint() && other.supports_adjoint(),
            self.supports_controlled() && other.supports_controlled(),
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::None => "none",
            Capability::Adjoint => "adj",
            Capability::Controlled => "ctl",
            Capability::AdjointControlled => "adj+ctl",
        };
        write!(f, "{s}")
    }
}

/// A unit of computation over a target of shape `A`.
///
/// Implementations must not retain `target` past the call.
pub trait Operation<A: Copy> {
    /// Emit the operation into `circuit`.
    fn apply(&self, circuit: &mut Circuit, target: A) -> OpResult<()>;

    /// Runtime view of the capability traits this operation implements.
    fn capability(&self) -> Capability {
        Capability::None
    }
}

/// An operation with an inverse.
pub trait Adjoint<A: Copy>: Operation<A> {
    /// Emit the inverse of the operation.
    fn apply_adjoint(&self, circuit: &mut Circuit, target: A) -> OpResult<()>;
}

/// An operation that can be conditioned on control qubits.
pub trait Controlled<A: Copy>: Operation<A> {
    /// Emit the operation so that it acts only where every control is `|1⟩`.
    fn apply_controlled(&self, circuit: &mut Circuit, controls: &[QubitId], target: A)
    -> OpResult<()>;
}

/// An operation whose inverse can be conditioned on control qubits.
pub trait ControlledAdjoint<A: Copy>: Adjoint<A> + Controlled<A> {
    /// Emit the inverse, acting only where every control is `|1⟩`.
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()>;
}

impl<A: Copy, T: Operation<A> + ?Sized> Operation<A> for &T {
    fn apply(&self, circuit: &mut Circuit, target: A) -> OpResult<()> {
        (**self).apply(circuit, target)
    }

    fn capability(&self) -> Capability {
        (**self).capability()
    }
}

impl<A: Copy, T: Adjoint<A> + ?Sized> Adjoint<A> for &T {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: A) -> OpResult<()> {
        (**self).apply_adjoint(circuit, target)
    }
}

impl<A: Copy, T: Controlled<A> + ?Sized> Controlled<A> for &T {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()> {
        (**self).apply_controlled(circuit, controls, target)
    }
}

impl<A: Copy, T: ControlledAdjoint<A> + ?Sized> ControlledAdjoint<A> for &T {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()> {
        (**self).apply_controlled_adjoint(circuit, controls, target)
    }
}

/// The adjoint of an operation, as an operation in its own right.
///
/// Applying it runs the wrapped operation's inverse; its adjoint is the
/// wrapped operation; its controlled form is the wrapped operation's
/// controlled adjoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjointOf<O>(O);

impl<O> AdjointOf<O> {
    /// Wrap `op`.
    pub fn new(op: O) -> Self {
        Self(op)
    }

    /// The wrapped operation.
    pub fn inner(&self) -> &O {
        &self.0
    }
}

/// Adjoint functor: `adjoint(op)` applies `op` inverted.
pub fn adjoint<O>(op: O) -> AdjointOf<O> {
    AdjointOf::new(op)
}

impl<A: Copy, O: Adjoint<A>> Operation<A> for AdjointOf<O> {
    fn apply(&self, circuit: &mut Circuit, target: A) -> OpResult<()> {
        self.0.apply_adjoint(circuit, target)
    }

    fn capability(&self) -> Capability {
        self.0.capability()
    }
}

impl<A: Copy, O: Adjoint<A>> Adjoint<A> for AdjointOf<O> {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: A) -> OpResult<()> {
        self.0.apply(circuit, target)
    }
}

impl<A: Copy, O: ControlledAdjoint<A>> Controlled<A> for AdjointOf<O> {
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()> {
        self.0.apply_controlled_adjoint(circuit, controls, target)
    }
}

impl<A: Copy, O: ControlledAdjoint<A>> ControlledAdjoint<A> for AdjointOf<O> {
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()> {
        self.0.apply_controlled(circuit, controls, target)
    }
}

/// The identity operation on any target shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOp;

impl<A: Copy> Operation<A> for NoOp {
    fn apply(&self, _circuit: &mut Circuit, _target: A) -> OpResult<()> {
        Ok(())
    }

    fn capability(&self) -> Capability {
        Capability::AdjointControlled
    }
}

impl<A: Copy> Adjoint<A> for NoOp {
    fn apply_adjoint(&self, _circuit: &mut Circuit, _target: A) -> OpResult<()> {
        Ok(())
    }
}

impl<A: Copy> Controlled<A> for NoOp {
    fn apply_controlled(
        &self,
        _circuit: &mut Circuit,
        _controls: &[QubitId],
        _target: A,
    ) -> OpResult<()> {
        Ok(())
    }
}

impl<A: Copy> ControlledAdjoint<A> for NoOp {
    fn apply_controlled_adjoint(
        &self,
        _circuit: &mut Circuit,
        _controls: &[QubitId],
        _target: A,
    ) -> OpResult<()> {
        Ok(())
    }
}
