//! Conjugation combinators: apply `U`, apply `V`, undo `U`.
//!
//! The four variants differ only in which functors of the composite they
//! provide:
//!
//! | Variant | Forward | Adjoint | Controlled |
//! |---------|---------|---------|------------|
//! | [`With`] | `U, V, U†` | - | - |
//! | [`WithA`] | `U, V, U†` | `U, V†, U†` | - |
//! | [`WithC`] | `U, V, U†` | - | `U, C(V), U†` |
//! | [`WithCA`] | `U, V, U†` | `U, V†, U†` | `U, C(V), U†` |
//!
//! The adjoint of a conjugation is the conjugation of the inverse, so `U`
//! keeps its place. In the controlled forms only `V` is gated; `U` and `U†`
//! run unconditionally, which requires the controls to be disjoint from the
//! qubits `U` touches. That is the caller's responsibility.

use std::marker::PhantomData;

use qamp_ir::{Circuit, QubitId};

use crate::capability::{
    Adjoint, Capability, Controlled, ControlledAdjoint, Operation, Register,
};
use crate::error::OpResult;

mod sealed {
    pub trait Sealed {}
}

/// Which functors a [`Conjugation`] provides.
pub trait ConjugationKind: sealed::Sealed {
    /// The capability the composite reports.
    const CAPABILITY: Capability;
}

/// Kinds whose conjugation has an adjoint.
pub trait AdjointKind: ConjugationKind {}

/// Kinds whose conjugation has a controlled form.
pub trait ControlledKind: ConjugationKind {}

/// Forward application only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plain {}

/// Adds the adjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adj {}

/// Adds the controlled form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ctl {}

/// Adds the adjoint, the controlled form, and the controlled adjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjCtl {}

impl sealed::Sealed for Plain {}
impl sealed::Sealed for Adj {}
impl sealed::Sealed for Ctl {}
impl sealed::Sealed for AdjCtl {}

impl ConjugationKind for Plain {
    const CAPABILITY: Capability = Capability::None;
}

impl ConjugationKind for Adj {
    const CAPABILITY: Capability = Capability::Adjoint;
}

impl ConjugationKind for Ctl {
    const CAPABILITY: Capability = Capability::Controlled;
}

impl ConjugationKind for AdjCtl {
    const CAPABILITY: Capability = Capability::AdjointControlled;
}

impl AdjointKind for Adj {}
impl AdjointKind for AdjCtl {}
impl ControlledKind for Ctl {}
impl ControlledKind for AdjCtl {}

/// `U · V · U†` on a shared target.
#[derive(Debug, Clone, Copy)]
pub struct Conjugation<U, V, K> {
    outer: U,
    inner: V,
    kind: PhantomData<K>,
}

/// Conjugation with no functors.
pub type With<U, V> = Conjugation<U, V, Plain>;
/// Conjugation with an adjoint.
pub type WithA<U, V> = Conjugation<U, V, Adj>;
/// Conjugation with a controlled form.
pub type WithC<U, V> = Conjugation<U, V, Ctl>;
/// Conjugation with every functor.
pub type WithCA<U, V> = Conjugation<U, V, AdjCtl>;

impl<U, V, K: ConjugationKind> Conjugation<U, V, K> {
    /// Conjugate `inner` by `outer` for any target shape.
    ///
    /// The functors of the result exist only for the shapes where `outer`
    /// and `inner` provide what the kind requires.
    pub fn new(outer: U, inner: V) -> Self {
        Self {
            outer,
            inner,
            kind: PhantomData,
        }
    }

    /// The change of basis.
    pub fn outer(&self) -> &U {
        &self.outer
    }

    /// The conjugated operation.
    pub fn inner(&self) -> &V {
        &self.inner
    }
}

/// `With(U, V)` on registers.
pub fn with<U, V>(outer: U, inner: V) -> With<U, V>
where
    U: for<'a> Adjoint<Register<'a>>,
    V: for<'a> Operation<Register<'a>>,
{
    Conjugation::new(outer, inner)
}

/// `WithA(U, V)` on registers.
pub fn with_a<U, V>(outer: U, inner: V) -> WithA<U, V>
where
    U: for<'a> Adjoint<Register<'a>>,
    V: for<'a> Adjoint<Register<'a>>,
{
    Conjugation::new(outer, inner)
}

/// `WithC(U, V)` on registers.
pub fn with_c<U, V>(outer: U, inner: V) -> WithC<U, V>
where
    U: for<'a> Adjoint<Register<'a>>,
    V: for<'a> Controlled<Register<'a>>,
{
    Conjugation::new(outer, inner)
}

/// `WithCA(U, V)` on registers.
pub fn with_ca<U, V>(outer: U, inner: V) -> WithCA<U, V>
where
    U: for<'a> Adjoint<Register<'a>>,
    V: for<'a> ControlledAdjoint<Register<'a>>,
{
    Conjugation::new(outer, inner)
}

impl<A, U, V, K> Operation<A> for Conjugation<U, V, K>
where
    A: Copy,
    U: Adjoint<A>,
    V: Operation<A>,
    K: ConjugationKind,
{
    fn apply(&self, circuit: &mut Circuit, target: A) -> OpResult<()> {
        self.outer.apply(circuit, target)?;
        self.inner.apply(circuit, target)?;
        self.outer.apply_adjoint(circuit, target)
    }

    fn capability(&self) -> Capability {
        K::CAPABILITY
    }
}

impl<A, U, V, K> Adjoint<A> for Conjugation<U, V, K>
where
    A: Copy,
    U: Adjoint<A>,
    V: Adjoint<A>,
    K: AdjointKind,
{
    fn apply_adjoint(&self, circuit: &mut Circuit, target: A) -> OpResult<()> {
        self.outer.apply(circuit, target)?;
        self.inner.apply_adjoint(circuit, target)?;
        self.outer.apply_adjoint(circuit, target)
    }
}

impl<A, U, V, K> Controlled<A> for Conjugation<U, V, K>
where
    A: Copy,
    U: Adjoint<A>,
    V: Controlled<A>,
    K: ControlledKind,
{
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()> {
        self.outer.apply(circuit, target)?;
        self.inner.apply_controlled(circuit, controls, target)?;
        self.outer.apply_adjoint(circuit, target)
    }
}

impl<A, U, V, K> ControlledAdjoint<A> for Conjugation<U, V, K>
where
    A: Copy,
    U: Adjoint<A>,
    V: ControlledAdjoint<A>,
    K: AdjointKind + ControlledKind,
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: A,
    ) -> OpResult<()> {
        self.outer.apply(circuit, target)?;
        self.inner
            .apply_controlled_adjoint(circuit, controls, target)?;
        self.outer.apply_adjoint(circuit, target)
    }
}
