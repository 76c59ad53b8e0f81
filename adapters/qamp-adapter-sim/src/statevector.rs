//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use qamp_ir::{Instruction, InstructionKind, StandardGate};

use crate::error::{SimError, SimResult};

/// A statevector representing a quantum state.
///
/// Basis index bit `n` holds the value of `QubitId(n)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap an existing amplitude vector.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> SimResult<Self> {
        let len = amplitudes.len();
        if !len.is_power_of_two() {
            return Err(SimError::InvalidStateLength(len));
        }
        Ok(Self {
            num_qubits: len.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm of the state; 1 for a normalized state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Apply a unitary instruction to the statevector.
    ///
    /// Measurement and reset are left to the caller, which owns the
    /// randomness and the classical record.
    pub fn apply(&mut self, instruction: &Instruction) -> SimResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let controls: Vec<usize> = instruction.controls.iter().map(|q| q.index()).collect();
                self.apply_gate(gate, &controls, instruction.qubits[0].index())
            }
            InstructionKind::Barrier => Ok(()),
            InstructionKind::Measure | InstructionKind::Reset => Err(
                SimError::MeasurementInCircuit(instruction.name().to_string()),
            ),
        }
    }

    /// Apply `gate` to `target`, conditioned on every qubit in `controls` being `|1⟩`.
    pub fn apply_gate(
        &mut self,
        gate: &StandardGate,
        controls: &[usize],
        target: usize,
    ) -> SimResult<()> {
        for &q in controls.iter().chain(std::iter::once(&target)) {
            self.check_qubit(q)?;
        }
        let ctrl_mask = controls.iter().fold(0usize, |mask, &c| mask | (1 << c));
        let tgt_mask = 1 << target;

        if gate.is_diagonal() {
            let [[d0, _], [_, d1]] = gate.matrix();
            for (i, amp) in self.amplitudes.iter_mut().enumerate() {
                if i & ctrl_mask == ctrl_mask {
                    *amp *= if i & tgt_mask == 0 { d0 } else { d1 };
                }
            }
            return Ok(());
        }

        let [[m00, m01], [m10, m11]] = gate.matrix();
        for i in 0..self.amplitudes.len() {
            if i & tgt_mask == 0 && i & ctrl_mask == ctrl_mask {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m00 * a + m01 * b;
                self.amplitudes[j] = m10 * a + m11 * b;
            }
        }
        Ok(())
    }

    /// Probability that `qubit` measures `|1⟩`.
    pub fn probability_of_one(&self, qubit: usize) -> SimResult<f64> {
        self.check_qubit(qubit)?;
        let mask = 1 << qubit;
        Ok(self.probability(|index| index & mask != 0))
    }

    /// Total probability of the basis states selected by `predicate`.
    pub fn probability(&self, predicate: impl Fn(usize) -> bool) -> f64 {
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| predicate(*i))
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }

    /// `|⟨self|other⟩|²`.
    pub fn fidelity(&self, other: &Statevector) -> f64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum::<Complex64>()
            .norm_sqr()
    }

    /// Largest amplitude-wise distance to `other`; zero only for identical states.
    pub fn max_distance(&self, other: &Statevector) -> f64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }

    /// Measure `qubit` in the computational basis, collapsing the state.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> SimResult<bool> {
        let p_one = self.probability_of_one(qubit)?;
        let outcome = rng.r#gen::<f64>() < p_one;
        self.project(qubit, outcome, if outcome { p_one } else { 1.0 - p_one });
        Ok(outcome)
    }

    /// Reset `qubit` to `|0⟩` by measuring it and flipping on `|1⟩`.
    pub fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> SimResult<()> {
        if self.measure(qubit, rng)? {
            self.apply_gate(&StandardGate::X, &[], qubit)?;
        }
        Ok(())
    }

    fn project(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let scale = if probability > 0.0 {
            1.0 / probability.sqrt()
        } else {
            0.0
        };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
    }

    /// Sample a basis-state index without collapsing.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum a hair under 1.
        self.amplitudes.len() - 1
    }

    /// Convert a basis index to a bitstring, qubit 0 first.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        format!("{:0width$b}", outcome, width = self.num_qubits)
            .chars()
            .rev()
            .collect()
    }

    fn check_qubit(&self, qubit: usize) -> SimResult<()> {
        if qubit >= self.num_qubits {
            return Err(SimError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }
}
