//! Circuit execution on top of [`Statevector`].

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qamp_ir::{Circuit, InstructionKind};

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Measurement outcome histogram keyed by bitstring (bit 0 first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts(FxHashMap<String, u64>);

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Number of observations of `bitstring`.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// The most frequent outcome, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| (k.as_str(), *v))
    }

    /// Outcomes sorted by descending count.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Iterate over `(bitstring, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Result of a sampled execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome histogram.
    pub counts: Counts,
    /// Number of shots taken.
    pub shots: u32,
    /// Wall-clock time spent simulating, in milliseconds.
    pub execution_time_ms: u64,
}

/// Local statevector simulator.
///
/// Exact simulation, practical up to ~20 qubits.
#[derive(Debug, Clone)]
pub struct StatevectorSimulator {
    /// Maximum number of qubits supported.
    max_qubits: usize,
    /// Seed for reproducible sampling; entropy-seeded when absent.
    seed: Option<u64>,
}

impl StatevectorSimulator {
    /// Create a new simulator with default settings.
    pub fn new() -> Self {
        Self {
            max_qubits: 20,
            seed: None,
        }
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Fix the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Maximum circuit width accepted.
    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn check_size(&self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() > self.max_qubits {
            return Err(SimError::TooManyQubits {
                requested: circuit.num_qubits(),
                max: self.max_qubits,
            });
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Evolve `|0…0⟩` through a unitary circuit.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn statevector(&self, circuit: &Circuit) -> SimResult<Statevector> {
        self.check_size(circuit)?;
        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst)?;
        }
        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            "statevector evolved"
        );
        Ok(sv)
    }

    /// Execute one shot, honoring mid-circuit measurement and reset.
    ///
    /// Returns the final state and the classical register.
    pub fn run_shot<R: Rng + ?Sized>(
        &self,
        circuit: &Circuit,
        rng: &mut R,
    ) -> SimResult<(Statevector, Vec<bool>)> {
        self.check_size(circuit)?;
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut clbits = vec![false; circuit.num_clbits()];
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        let outcome = sv.measure(q.index(), rng)?;
                        let slot = clbits.get_mut(c.0 as usize).ok_or(
                            SimError::ClbitOutOfRange {
                                clbit: c.0 as usize,
                                num_clbits: circuit.num_clbits(),
                            },
                        )?;
                        *slot = outcome;
                    }
                }
                InstructionKind::Reset => {
                    for q in &inst.qubits {
                        sv.reset(q.index(), rng)?;
                    }
                }
                _ => sv.apply(inst)?,
            }
        }
        Ok((sv, clbits))
    }

    /// Sample `shots` outcomes.
    ///
    /// Unitary circuits are evolved once and sampled over all qubits;
    /// circuits with measurements are re-run per shot and report their
    /// classical register.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &Circuit, shots: u32) -> SimResult<ExecutionResult> {
        let start = Instant::now();
        let mut rng = self.rng();
        let mut counts = Counts::new();

        debug!(
            qubits = circuit.num_qubits(),
            shots,
            unitary = circuit.is_unitary(),
            "starting simulation"
        );

        if circuit.is_unitary() {
            let sv = self.statevector(circuit)?;
            for _ in 0..shots {
                let outcome = sv.sample(&mut rng);
                counts.insert(sv.outcome_to_bitstring(outcome), 1);
            }
        } else {
            for shot in 0..shots {
                let (_, clbits) = self.run_shot(circuit, &mut rng)?;
                let bitstring: String =
                    clbits.iter().map(|&b| if b { '1' } else { '0' }).collect();
                counts.insert(bitstring, 1);

                if shot > 0 && shot % 1000 == 0 {
                    debug!(shot, "shots completed");
                }
            }
        }

        let elapsed = start.elapsed();
        debug!(?elapsed, "simulation completed");

        Ok(ExecutionResult {
            counts,
            shots,
            execution_time_ms: elapsed.as_millis() as u64,
        })
    }
}

impl Default for StatevectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qamp_ir::{ClbitId, QubitId};

    #[test]
    fn test_bell_counts() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let sim = StatevectorSimulator::new().with_seed(42);
        let result = sim.run(&circuit, 1000).unwrap();

        assert_eq!(result.counts.total(), 1000);
        assert_eq!(result.counts.get("01"), 0);
        assert_eq!(result.counts.get("10"), 0);
        let zeros = result.counts.get("00");
        assert!(zeros > 400 && zeros < 600);
    }

    #[test]
    fn test_too_many_qubits() {
        let circuit = Circuit::with_size("wide", 8, 0);
        let sim = StatevectorSimulator::new().with_max_qubits(4);
        assert!(matches!(
            sim.statevector(&circuit),
            Err(SimError::TooManyQubits {
                requested: 8,
                max: 4
            })
        ));
    }

    #[test]
    fn test_statevector_rejects_measurement() {
        let mut circuit = Circuit::with_size("m", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        let sim = StatevectorSimulator::new();
        assert!(matches!(
            sim.statevector(&circuit),
            Err(SimError::MeasurementInCircuit(_))
        ));
    }

    #[test]
    fn test_measured_circuit_reports_clbits() {
        let mut circuit = Circuit::with_size("x-measure", 2, 2);
        circuit.x(QubitId(1)).unwrap();
        circuit.measure_all().unwrap();

        let sim = StatevectorSimulator::new().with_seed(3);
        let result = sim.run(&circuit, 50).unwrap();
        assert_eq!(result.counts.get("01"), 50);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let mut circuit = Circuit::with_size("plus", 3, 0);
        for q in 0..3 {
            circuit.h(QubitId(q)).unwrap();
        }
        let sim = StatevectorSimulator::new().with_seed(9);
        let a = sim.run(&circuit, 200).unwrap();
        let b = sim.run(&circuit, 200).unwrap();
        assert_eq!(a.counts, b.counts);
    }

    #[test]
    fn test_counts_sorted() {
        let mut counts = Counts::new();
        counts.insert("00", 3);
        counts.insert("11", 7);
        counts.insert("00", 1);
        assert_eq!(counts.sorted(), vec![("11", 7), ("00", 4)]);
        assert_eq!(counts.most_frequent(), Some(("11", 7)));
    }
}
