//! Amplitude amplification.
//!
//! The driver interleaves a reflection about the marked subspace with a
//! reflection about the start state, one pair of phases per iteration:
//!
//! ```text
//! start ─► [marked(φ₁) ─► start(ψ₁)] ─► … ─► [marked(φ_M) ─► start(ψ_M)] ─► measure
//! ```
//!
//! With the standard schedule (every phase `π`) and a start state whose
//! marked component has amplitude `sin β`, the marked amplitude after `M`
//! iterations is `sin((2M+1)β)`; see [`success_amplitude`].

use std::f64::consts::PI;

use qamp_ir::{Circuit, QubitId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::capability::{
    Adjoint, AdjointOf, Capability, Controlled, ControlledAdjoint, FlaggedRegister, Operation,
    PhasedRegister, Register, SplitRegister,
};
use crate::conjugation::WithCA;
use crate::error::{OpError, OpResult};
use crate::oracle::{
    FixedFlag, ObliviousOracle, OnAncilla, ReflectionOracle, StateOracle, check_flag_index,
    deterministic_state_oracle_from_state_oracle,
};
use crate::primitive::AtPhase;
use crate::reflection::{
    ReflectionFromDeterministic, TargetStateReflection,
    reflection_oracle_from_deterministic_state_oracle, target_state_reflection_oracle,
};

// =============================================================================
// Phase schedules
// =============================================================================

/// Reflection phases for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePair {
    /// Phase of the reflection about the marked subspace.
    pub marked: f64,
    /// Phase of the reflection about the start state.
    pub start: f64,
}

impl PhasePair {
    /// The Grover pair `(π, π)`.
    pub const STANDARD: PhasePair = PhasePair {
        marked: PI,
        start: PI,
    };
}

/// A validated phase schedule, one [`PhasePair`] per iteration.
///
/// Every phase is finite; deserialization applies the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PhasePair>", into = "Vec<PhasePair>")]
pub struct ReflectionPhases {
    pairs: Vec<PhasePair>,
}

impl ReflectionPhases {
    /// Build a schedule from explicit pairs.
    pub fn new(pairs: Vec<PhasePair>) -> OpResult<Self> {
        for (iteration, pair) in pairs.iter().enumerate() {
            for phase in [pair.marked, pair.start] {
                if !phase.is_finite() {
                    return Err(OpError::NonFinitePhase { iteration, phase });
                }
            }
        }
        Ok(Self { pairs })
    }

    /// The fixed Grover schedule: `iterations` copies of `(π, π)`.
    pub fn standard(iterations: usize) -> Self {
        Self {
            pairs: vec![PhasePair::STANDARD; iterations],
        }
    }

    /// [`standard`](Self::standard) from a signed count, rejecting negatives.
    pub fn try_standard(iterations: i64) -> OpResult<Self> {
        usize::try_from(iterations)
            .map(Self::standard)
            .map_err(|_| OpError::InvalidIterationCount(iterations))
    }

    /// Number of iterations.
    pub fn iterations(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the schedule has no iterations.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pairs in application order.
    pub fn pairs(&self) -> &[PhasePair] {
        &self.pairs
    }

    /// Whether every pair is `(π, π)`.
    pub fn is_standard(&self) -> bool {
        self.pairs.iter().all(|p| *p == PhasePair::STANDARD)
    }
}

impl TryFrom<Vec<PhasePair>> for ReflectionPhases {
    type Error = OpError;

    fn try_from(pairs: Vec<PhasePair>) -> OpResult<Self> {
        Self::new(pairs)
    }
}

impl From<ReflectionPhases> for Vec<PhasePair> {
    fn from(phases: ReflectionPhases) -> Self {
        phases.pairs
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Iterated `reflect_marked` / `reflect_start` pairs over one register.
///
/// The schedule is validated when built, so applying either runs every
/// iteration or fails on the reflections' own register checks.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeAmplification<M, S> {
    phases: ReflectionPhases,
    reflect_marked: M,
    reflect_start: S,
}

impl<M, S> AmplitudeAmplification<M, S>
where
    M: ReflectionOracle,
    S: ReflectionOracle,
{
    /// Amplification with an arbitrary schedule.
    pub fn new(phases: ReflectionPhases, reflect_marked: M, reflect_start: S) -> Self {
        Self {
            phases,
            reflect_marked,
            reflect_start,
        }
    }

    /// Amplification with `iterations` standard Grover steps.
    pub fn standard(iterations: usize, reflect_marked: M, reflect_start: S) -> Self {
        Self::new(
            ReflectionPhases::standard(iterations),
            reflect_marked,
            reflect_start,
        )
    }
}

impl<M, S> AmplitudeAmplification<M, S> {
    /// The phase schedule.
    pub fn phases(&self) -> &ReflectionPhases {
        &self.phases
    }

    /// Reflection about the marked subspace.
    pub fn reflect_marked(&self) -> &M {
        &self.reflect_marked
    }

    /// Reflection about the start state.
    pub fn reflect_start(&self) -> &S {
        &self.reflect_start
    }
}

/// `AmplitudeAmplification(phases, reflect_marked, reflect_start)`.
pub fn amplitude_amplification<M, S>(
    phases: ReflectionPhases,
    reflect_marked: M,
    reflect_start: S,
) -> AmplitudeAmplification<M, S>
where
    M: ReflectionOracle,
    S: ReflectionOracle,
{
    AmplitudeAmplification::new(phases, reflect_marked, reflect_start)
}

impl<'a, M, S> Operation<Register<'a>> for AmplitudeAmplification<M, S>
where
    M: Operation<PhasedRegister<'a>>,
    S: Operation<PhasedRegister<'a>>,
{
    fn apply(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        debug!(
            iterations = self.phases.iterations(),
            width = target.len(),
            "applying amplitude amplification"
        );
        for (k, pair) in self.phases.pairs().iter().enumerate() {
            trace!(iteration = k, marked = pair.marked, start = pair.start, "iteration");
            self.reflect_marked.apply(circuit, (pair.marked, target))?;
            self.reflect_start.apply(circuit, (pair.start, target))?;
        }
        Ok(())
    }

    fn capability(&self) -> Capability {
        self.reflect_marked
            .capability()
            .intersect(self.reflect_start.capability())
    }
}

impl<'a, M, S> Adjoint<Register<'a>> for AmplitudeAmplification<M, S>
where
    M: Adjoint<PhasedRegister<'a>>,
    S: Adjoint<PhasedRegister<'a>>,
{
    fn apply_adjoint(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        debug!(
            iterations = self.phases.iterations(),
            width = target.len(),
            "applying adjoint amplitude amplification"
        );
        for pair in self.phases.pairs().iter().rev() {
            self.reflect_start
                .apply_adjoint(circuit, (pair.start, target))?;
            self.reflect_marked
                .apply_adjoint(circuit, (pair.marked, target))?;
        }
        Ok(())
    }
}

impl<'a, M, S> Controlled<Register<'a>> for AmplitudeAmplification<M, S>
where
    M: Controlled<PhasedRegister<'a>>,
    S: Controlled<PhasedRegister<'a>>,
{
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        debug!(
            iterations = self.phases.iterations(),
            width = target.len(),
            controls = controls.len(),
            "applying controlled amplitude amplification"
        );
        for pair in self.phases.pairs() {
            self.reflect_marked
                .apply_controlled(circuit, controls, (pair.marked, target))?;
            self.reflect_start
                .apply_controlled(circuit, controls, (pair.start, target))?;
        }
        Ok(())
    }
}

impl<'a, M, S> ControlledAdjoint<Register<'a>> for AmplitudeAmplification<M, S>
where
    M: ControlledAdjoint<PhasedRegister<'a>>,
    S: ControlledAdjoint<PhasedRegister<'a>>,
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        for pair in self.phases.pairs().iter().rev() {
            self.reflect_start
                .apply_controlled_adjoint(circuit, controls, (pair.start, target))?;
            self.reflect_marked
                .apply_controlled_adjoint(circuit, controls, (pair.marked, target))?;
        }
        Ok(())
    }
}

// =============================================================================
// State-oracle driven amplification
// =============================================================================

type StateOracleDriver<O> =
    AmplitudeAmplification<TargetStateReflection, ReflectionFromDeterministic<FixedFlag<O>>>;

/// Amplification of the flag qubit of a state oracle.
///
/// Prepares the start state with the oracle, then reflects about
/// `register[flag_index] = |1⟩` and about the prepared state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateOracleAmplification<O> {
    flag_index: usize,
    driver: StateOracleDriver<O>,
}

impl<O> StateOracleAmplification<O> {
    /// Position of the flag qubit.
    pub fn flag_index(&self) -> usize {
        self.flag_index
    }

    /// The phase schedule.
    pub fn phases(&self) -> &ReflectionPhases {
        self.driver.phases()
    }

    fn prepare(&self) -> &FixedFlag<O> {
        self.driver.reflect_start().oracle()
    }
}

/// Amplify the success flag of `oracle` with an arbitrary schedule.
pub fn amplitude_amplification_from_state_oracle<O>(
    phases: ReflectionPhases,
    oracle: O,
    flag_index: usize,
) -> StateOracleAmplification<O>
where
    O: StateOracle + for<'a> Adjoint<FlaggedRegister<'a>>,
{
    let prepare = deterministic_state_oracle_from_state_oracle(flag_index, oracle);
    StateOracleAmplification {
        flag_index,
        driver: AmplitudeAmplification::new(
            phases,
            target_state_reflection_oracle(flag_index),
            reflection_oracle_from_deterministic_state_oracle(prepare),
        ),
    }
}

/// Standard Grover search on the success flag of `oracle`.
pub fn standard_amplitude_amplification<O>(
    iterations: usize,
    oracle: O,
    flag_index: usize,
) -> StateOracleAmplification<O>
where
    O: StateOracle + for<'a> Adjoint<FlaggedRegister<'a>>,
{
    amplitude_amplification_from_state_oracle(
        ReflectionPhases::standard(iterations),
        oracle,
        flag_index,
    )
}

impl<'a, O: Adjoint<FlaggedRegister<'a>>> Operation<Register<'a>> for StateOracleAmplification<O> {
    fn apply(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.prepare().apply(circuit, target)?;
        self.driver.apply(circuit, target)
    }

    fn capability(&self) -> Capability {
        self.prepare()
            .capability()
            .intersect(self.driver.capability())
    }
}

impl<'a, O: Adjoint<FlaggedRegister<'a>>> Adjoint<Register<'a>> for StateOracleAmplification<O> {
    fn apply_adjoint(&self, circuit: &mut Circuit, target: Register<'a>) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.driver.apply_adjoint(circuit, target)?;
        self.prepare().apply_adjoint(circuit, target)
    }
}

impl<'a, O> Controlled<Register<'a>> for StateOracleAmplification<O>
where
    O: Adjoint<FlaggedRegister<'a>> + Controlled<FlaggedRegister<'a>>,
{
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.prepare().apply_controlled(circuit, controls, target)?;
        self.driver.apply_controlled(circuit, controls, target)
    }
}

impl<'a, O: ControlledAdjoint<FlaggedRegister<'a>>> ControlledAdjoint<Register<'a>>
    for StateOracleAmplification<O>
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: Register<'a>,
    ) -> OpResult<()> {
        check_flag_index(self.flag_index, target)?;
        self.driver
            .apply_controlled_adjoint(circuit, controls, target)?;
        self.prepare()
            .apply_controlled_adjoint(circuit, controls, target)
    }
}

// =============================================================================
// Oblivious amplification
// =============================================================================

/// Amplification over `(ancilla, system)` driven by an oblivious signal oracle.
///
/// Runs `W`, then per iteration `reflect_marked` on the ancilla followed by
/// `reflect_start` on the ancilla conjugated by `W†`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObliviousAmplitudeAmplification<M, S, W> {
    phases: ReflectionPhases,
    reflect_marked: M,
    reflect_start: S,
    signal_oracle: W,
}

impl<M, S, W> ObliviousAmplitudeAmplification<M, S, W> {
    /// The phase schedule.
    pub fn phases(&self) -> &ReflectionPhases {
        &self.phases
    }

    fn start_step<'s>(
        &'s self,
        phase: f64,
    ) -> WithCA<AdjointOf<&'s W>, OnAncilla<AtPhase<&'s S>>> {
        WithCA::new(
            AdjointOf::new(&self.signal_oracle),
            OnAncilla(AtPhase::new(phase, &self.reflect_start)),
        )
    }
}

/// Oblivious amplitude amplification.
pub fn oblivious_amplitude_amplification<M, S, W>(
    phases: ReflectionPhases,
    reflect_marked: M,
    reflect_start: S,
    signal_oracle: W,
) -> ObliviousAmplitudeAmplification<M, S, W>
where
    M: ReflectionOracle,
    S: ReflectionOracle,
    W: ObliviousOracle + for<'a> Adjoint<SplitRegister<'a>>,
{
    ObliviousAmplitudeAmplification {
        phases,
        reflect_marked,
        reflect_start,
        signal_oracle,
    }
}

impl<'a, M, S, W> Operation<SplitRegister<'a>> for ObliviousAmplitudeAmplification<M, S, W>
where
    M: Operation<PhasedRegister<'a>>,
    S: Operation<PhasedRegister<'a>>,
    W: Adjoint<SplitRegister<'a>>,
{
    fn apply(&self, circuit: &mut Circuit, target: SplitRegister<'a>) -> OpResult<()> {
        let (ancilla, system) = target;
        debug!(
            iterations = self.phases.iterations(),
            ancilla = ancilla.len(),
            system = system.len(),
            "applying oblivious amplitude amplification"
        );
        self.signal_oracle.apply(circuit, target)?;
        for pair in self.phases.pairs() {
            self.reflect_marked.apply(circuit, (pair.marked, ancilla))?;
            self.start_step(pair.start).apply(circuit, target)?;
        }
        Ok(())
    }

    fn capability(&self) -> Capability {
        self.reflect_marked
            .capability()
            .intersect(self.reflect_start.capability())
            .intersect(self.signal_oracle.capability())
    }
}

impl<'a, M, S, W> Adjoint<SplitRegister<'a>> for ObliviousAmplitudeAmplification<M, S, W>
where
    M: Adjoint<PhasedRegister<'a>>,
    S: Adjoint<PhasedRegister<'a>>,
    W: Adjoint<SplitRegister<'a>>,
{
    fn apply_adjoint(&self, circuit: &mut Circuit, target: SplitRegister<'a>) -> OpResult<()> {
        for pair in self.phases.pairs().iter().rev() {
            self.start_step(pair.start).apply_adjoint(circuit, target)?;
            self.reflect_marked
                .apply_adjoint(circuit, (pair.marked, target.0))?;
        }
        self.signal_oracle.apply_adjoint(circuit, target)
    }
}

impl<'a, M, S, W> Controlled<SplitRegister<'a>> for ObliviousAmplitudeAmplification<M, S, W>
where
    M: Controlled<PhasedRegister<'a>>,
    S: Controlled<PhasedRegister<'a>>,
    W: Adjoint<SplitRegister<'a>> + Controlled<SplitRegister<'a>>,
{
    fn apply_controlled(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: SplitRegister<'a>,
    ) -> OpResult<()> {
        self.signal_oracle
            .apply_controlled(circuit, controls, target)?;
        for pair in self.phases.pairs() {
            self.reflect_marked
                .apply_controlled(circuit, controls, (pair.marked, target.0))?;
            self.start_step(pair.start)
                .apply_controlled(circuit, controls, target)?;
        }
        Ok(())
    }
}

impl<'a, M, S, W> ControlledAdjoint<SplitRegister<'a>> for ObliviousAmplitudeAmplification<M, S, W>
where
    M: ControlledAdjoint<PhasedRegister<'a>>,
    S: ControlledAdjoint<PhasedRegister<'a>>,
    W: ControlledAdjoint<SplitRegister<'a>>,
{
    fn apply_controlled_adjoint(
        &self,
        circuit: &mut Circuit,
        controls: &[QubitId],
        target: SplitRegister<'a>,
    ) -> OpResult<()> {
        for pair in self.phases.pairs().iter().rev() {
            self.start_step(pair.start)
                .apply_controlled_adjoint(circuit, controls, target)?;
            self.reflect_marked
                .apply_controlled_adjoint(circuit, controls, (pair.marked, target.0))?;
        }
        self.signal_oracle
            .apply_controlled_adjoint(circuit, controls, target)
    }
}

// =============================================================================
// Closed forms
// =============================================================================

fn rotation_angle(target_fraction: f64) -> OpResult<f64> {
    if !target_fraction.is_finite() || !(0.0..=1.0).contains(&target_fraction) {
        return Err(OpError::InvalidTargetFraction(target_fraction));
    }
    Ok(target_fraction.sqrt().asin())
}

/// Marked amplitude `sin((2M+1)·asin(√fraction))` after `iterations` standard steps.
pub fn success_amplitude(iterations: usize, target_fraction: f64) -> OpResult<f64> {
    let beta = rotation_angle(target_fraction)?;
    Ok(((2 * iterations + 1) as f64 * beta).sin())
}

/// Probability of measuring a marked state after `iterations` standard steps.
pub fn success_probability(iterations: usize, target_fraction: f64) -> OpResult<f64> {
    success_amplitude(iterations, target_fraction).map(|a| a * a)
}

/// Iteration count that brings the marked amplitude closest to 1.
///
/// A fraction of zero has no marked state to amplify and is rejected.
pub fn optimal_iterations(target_fraction: f64) -> OpResult<usize> {
    let beta = rotation_angle(target_fraction)?;
    if beta == 0.0 {
        return Err(OpError::InvalidTargetFraction(target_fraction));
    }
    Ok((PI / (4.0 * beta) - 0.5).round().max(0.0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NoOp;
    use crate::reflection::{RAll0, reflection_start};

    #[test]
    fn test_standard_schedule() {
        let phases = ReflectionPhases::standard(3);
        assert_eq!(phases.iterations(), 3);
        assert!(phases.is_standard());
        assert!(ReflectionPhases::standard(0).is_empty());
    }

    #[test]
    fn test_negative_iterations_rejected() {
        assert!(matches!(
            ReflectionPhases::try_standard(-1),
            Err(OpError::InvalidIterationCount(-1))
        ));
        assert_eq!(ReflectionPhases::try_standard(2).unwrap().iterations(), 2);
    }

    #[test]
    fn test_non_finite_phase_rejected() {
        let pairs = vec![
            PhasePair::STANDARD,
            PhasePair {
                marked: 0.3,
                start: f64::NAN,
            },
        ];
        let err = ReflectionPhases::new(pairs).unwrap_err();
        assert!(matches!(err, OpError::NonFinitePhase { iteration: 1, .. }));
    }

    #[test]
    fn test_schedule_serde_validates() {
        let json = r#"[{"marked": 1.0, "start": 2.0}]"#;
        let phases: ReflectionPhases = serde_json::from_str(json).unwrap();
        assert_eq!(phases.pairs()[0].start, 2.0);

        let back = serde_json::to_string(&phases).unwrap();
        assert!(back.starts_with('['));
        let overflow = r#"[{"marked": 1e999, "start": 0}]"#;
        assert!(serde_json::from_str::<ReflectionPhases>(overflow).is_err());
    }

    #[test]
    fn test_driver_interleaves_reflections() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        let q = circuit.qubits().to_vec();
        let driver = AmplitudeAmplification::standard(
            2,
            target_state_reflection_oracle(0),
            reflection_start(),
        );
        driver.apply(&mut circuit, &q[..]).unwrap();
        // Each iteration: one p on the flag, then x x p x x.
        assert_eq!(circuit.len(), 2 * 6);
        assert_eq!(circuit.instructions()[0].qubits, vec![q[0]]);
        assert!(circuit.instructions()[0].controls.is_empty());
    }

    #[test]
    fn test_driver_zero_iterations_is_empty() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        let q = circuit.qubits().to_vec();
        AmplitudeAmplification::standard(0, RAll0, RAll0)
            .apply(&mut circuit, &q[..])
            .unwrap();
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_driver_capability_is_intersection() {
        let driver = AmplitudeAmplification::standard(1, RAll0, NoOp);
        assert_eq!(
            Operation::<Register<'_>>::capability(&driver),
            Capability::AdjointControlled
        );
    }

    #[test]
    fn test_success_amplitude_closed_form() {
        // One marked element out of four: a single iteration is exact.
        let p = success_probability(1, 0.25).unwrap();
        assert!((p - 1.0).abs() < 1e-12);
        assert!((success_probability(0, 0.25).unwrap() - 0.25).abs() < 1e-12);
        assert!(matches!(
            success_amplitude(1, 1.5),
            Err(OpError::InvalidTargetFraction(_))
        ));
        assert!(success_amplitude(1, f64::NAN).is_err());
    }

    #[test]
    fn test_optimal_iterations() {
        assert_eq!(optimal_iterations(0.25).unwrap(), 1);
        assert_eq!(optimal_iterations(1.0).unwrap(), 0);
        assert_eq!(optimal_iterations(1.0 / 1024.0).unwrap(), 25);
        assert!(optimal_iterations(0.0).is_err());
    }

    #[test]
    fn test_state_oracle_amplification_checks_flag() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        let q = circuit.qubits().to_vec();
        let search = standard_amplitude_amplification(
            1,
            crate::oracle::state_oracle_from_deterministic_state_oracle(
                crate::primitive::ApplyToEach::new(qamp_ir::StandardGate::H),
            ),
            3,
        );
        assert!(matches!(
            search.apply(&mut circuit, &q[..]),
            Err(OpError::FlagIndexOutOfRange { index: 3, len: 2 })
        ));
        assert!(circuit.is_empty());
    }
}
