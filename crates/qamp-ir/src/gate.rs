//! Single-target gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::f64::consts::PI;

/// A 2×2 unitary in row-major order.
pub type Matrix2 = [[Complex64; 2]; 2];

/// Standard single-target gates with known semantics.
///
/// Multi-qubit gates are built by attaching controls to one of these in an
/// [`Instruction`](crate::Instruction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase shift of `|1⟩` by the given angle.
    P(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
        }
    }

    /// Get the angle of a rotation or phase gate.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::Rz(t) | StandardGate::P(t) => {
                Some(*t)
            }
            _ => None,
        }
    }

    /// The inverse gate.
    #[must_use]
    pub fn adjoint(&self) -> StandardGate {
        match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::P(t) => StandardGate::P(-t),
            gate @ (StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H) => gate,
        }
    }

    /// Whether the gate is its own inverse.
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            StandardGate::I | StandardGate::X | StandardGate::Y | StandardGate::Z | StandardGate::H
        )
    }

    /// Whether the gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
        )
    }

    /// The unitary matrix of this gate.
    pub fn matrix(&self) -> Matrix2 {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let diag = |phase: f64| [[one, zero], [zero, Complex64::from_polar(1.0, phase)]];

        match *self {
            StandardGate::I => [[one, zero], [zero, one]],
            StandardGate::X => [[zero, one], [one, zero]],
            StandardGate::Y => [[zero, -i], [i, zero]],
            StandardGate::Z => [[one, zero], [zero, -one]],
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            StandardGate::S => diag(PI / 2.0),
            StandardGate::Sdg => diag(-PI / 2.0),
            StandardGate::T => diag(PI / 4.0),
            StandardGate::Tdg => diag(-PI / 4.0),
            StandardGate::P(theta) => diag(theta),
            StandardGate::Rx(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                [[c, s], [s, c]]
            }
            StandardGate::Ry(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                [[c, -s], [s, c]]
            }
            StandardGate::Rz(theta) => [
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)],
            ],
        }
    }
}
