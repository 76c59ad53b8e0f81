//! End-to-end tests for the amplitude-amplification driver.

mod common;

use std::f64::consts::PI;

use common::{
    DatabaseOracle, TOL, assert_same_state, circuit_with_register, flag_probability,
    flagged_indices, prepare_random_state, simulate,
};
use qamp_adapter_sim::{Statevector, StatevectorSimulator};
use qamp_ir::{Circuit, QubitId};
use qamp_ops::{
    Adjoint, AmplificationConfig, AmplitudeAmplification, Capability, Controlled, NoOp, OpError,
    Operation, PhasePair, ReflectionPhases, Register, amplitude_amplification_from_state_oracle,
    deterministic_state_oracle_from_state_oracle, oblivious_amplitude_amplification,
    oblivious_oracle_from_deterministic_state_oracle, reflection_start,
    standard_amplitude_amplification, success_probability, target_state_reflection_oracle,
};

fn run_search(database_qubits: u32, marked: &[usize], iterations: usize) -> Statevector {
    let (mut circuit, reg) = circuit_with_register("search", database_qubits + 1);
    standard_amplitude_amplification(iterations, DatabaseOracle::new(marked), 0)
        .apply(&mut circuit, &reg[..])
        .unwrap();
    simulate(&circuit)
}

// ---------------------------------------------------------------------------
// Closed-form success probability
// ---------------------------------------------------------------------------

#[test]
fn single_marked_element_matches_closed_form() {
    for n in 0..=4_u32 {
        let marked = (1_usize << n) - 1;
        let fraction = 1.0 / f64::from(1_u32 << n);
        for iterations in 0..=5 {
            let state = run_search(n, &[marked], iterations);
            let expected = ((2 * iterations + 1) as f64 * fraction.sqrt().asin())
                .sin()
                .powi(2);
            let actual = flag_probability(&state);
            assert!(
                (actual - expected).abs() < TOL,
                "n={n} M={iterations}: got {actual}, expected {expected}"
            );
            assert!((success_probability(iterations, fraction).unwrap() - expected).abs() < TOL);
        }
    }
}

#[test]
fn three_marked_elements_match_closed_form() {
    let marked = [1, 4, 9];
    for n in 4..=6_u32 {
        let fraction = 3.0 / f64::from(1_u32 << n);
        for iterations in 0..=5 {
            let state = run_search(n, &marked, iterations);
            let expected = success_probability(iterations, fraction).unwrap();
            let actual = flag_probability(&state);
            assert!(
                (actual - expected).abs() < TOL,
                "n={n} M={iterations}: got {actual}, expected {expected}"
            );
            for index in flagged_indices(&state) {
                assert!(marked.contains(&index), "flagged unmarked index {index}");
            }
        }
    }
}

#[test]
fn sampled_successes_recover_marked_indices() {
    let marked = [1, 4, 9];
    let (mut circuit, reg) = circuit_with_register("sampled", 5);
    standard_amplitude_amplification(1, DatabaseOracle::new(marked), 0)
        .apply(&mut circuit, &reg[..])
        .unwrap();

    let result = StatevectorSimulator::new()
        .with_seed(2024)
        .run(&circuit, 500)
        .unwrap();

    let mut successes = 0;
    for (bitstring, count) in result.counts.iter() {
        let bits: Vec<char> = bitstring.chars().collect();
        if bits[0] == '1' {
            let index = bits[1..]
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == '1')
                .map(|(k, _)| 1 << k)
                .sum::<usize>();
            assert!(marked.contains(&index), "sampled unmarked index {index}");
            successes += count;
        }
    }
    // sin²(3·asin(√(3/16))) ≈ 0.95
    assert!(successes > 400, "only {successes} successes in 500 shots");
}

// ---------------------------------------------------------------------------
// Functors of the composed search
// ---------------------------------------------------------------------------

#[test]
fn adjoint_undoes_forward_run() {
    let (mut circuit, reg) = circuit_with_register("undo", 5);
    let search = standard_amplitude_amplification(3, DatabaseOracle::new([1, 4, 9]), 0);
    search.apply(&mut circuit, &reg[..]).unwrap();
    search.apply_adjoint(&mut circuit, &reg[..]).unwrap();
    assert_same_state(&simulate(&circuit), &Statevector::new(5));
}

#[test]
fn controlled_search_with_control_off_is_identity() {
    let (mut circuit, reg) = circuit_with_register("ctl_off", 4);
    let control = circuit.add_qubit();
    standard_amplitude_amplification(2, DatabaseOracle::new([5]), 0)
        .apply_controlled(&mut circuit, &[control], &reg[..])
        .unwrap();
    assert_same_state(&simulate(&circuit), &Statevector::new(5));
}

#[test]
fn controlled_search_with_control_on_matches_uncontrolled() {
    let search = standard_amplitude_amplification(2, DatabaseOracle::new([5]), 0);

    let (mut controlled, reg) = circuit_with_register("ctl_on", 4);
    let control = controlled.add_qubit();
    controlled.x(control).unwrap();
    search
        .apply_controlled(&mut controlled, &[control], &reg[..])
        .unwrap();

    let (mut reference, reg) = circuit_with_register("reference", 4);
    let control = reference.add_qubit();
    reference.x(control).unwrap();
    search.apply(&mut reference, &reg[..]).unwrap();

    assert_same_state(&simulate(&controlled), &simulate(&reference));
}

#[test]
fn capability_is_intersection_of_reflections() {
    let search = standard_amplitude_amplification(1, DatabaseOracle::new([0]), 0);
    assert_eq!(
        Operation::<Register<'_>>::capability(&search),
        Capability::AdjointControlled
    );

    let driver = AmplitudeAmplification::standard(1, target_state_reflection_oracle(0), NoOp);
    assert_eq!(
        Operation::<Register<'_>>::capability(&driver),
        Capability::AdjointControlled
    );
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[test]
fn custom_schedule_with_standard_phases_matches_standard() {
    let phases = ReflectionPhases::new(vec![PhasePair { marked: PI, start: PI }; 2]).unwrap();
    let oracle = DatabaseOracle::new([3]);

    let (mut custom, reg) = circuit_with_register("custom", 3);
    amplitude_amplification_from_state_oracle(phases, oracle.clone(), 0)
        .apply(&mut custom, &reg[..])
        .unwrap();

    let (mut standard, reg) = circuit_with_register("standard", 3);
    standard_amplitude_amplification(2, oracle, 0)
        .apply(&mut standard, &reg[..])
        .unwrap();

    assert_eq!(custom.instructions(), standard.instructions());
}

#[test]
fn partial_phases_are_undone_by_adjoint() {
    let phases = ReflectionPhases::new(vec![
        PhasePair {
            marked: 0.7,
            start: -1.3,
        },
        PhasePair {
            marked: 2.1,
            start: 0.4,
        },
    ])
    .unwrap();
    let search = amplitude_amplification_from_state_oracle(phases, DatabaseOracle::new([2]), 0);

    let (mut circuit, reg) = circuit_with_register("partial", 3);
    prepare_random_state(&mut circuit, &reg, 17);
    let before = simulate(&circuit);
    search.apply(&mut circuit, &reg[..]).unwrap();
    search.apply_adjoint(&mut circuit, &reg[..]).unwrap();
    assert_same_state(&simulate(&circuit), &before);
}

#[test]
fn configured_iterations_drive_search() {
    let n = 4_u32;
    let fraction = 1.0 / 16.0;
    let config = AmplificationConfig::from_json(r#"{"flag_index": 0}"#).unwrap();
    let phases = config.phases(Some(fraction)).unwrap();
    assert_eq!(phases.iterations(), 3);

    let (mut circuit, reg) = circuit_with_register("configured", n + 1);
    amplitude_amplification_from_state_oracle(phases, DatabaseOracle::new([7]), config.flag_index)
        .apply(&mut circuit, &reg[..])
        .unwrap();
    assert!(flag_probability(&simulate(&circuit)) > 0.95);
}

#[test]
fn invalid_schedules_fail_before_anything_is_built() {
    assert!(matches!(
        ReflectionPhases::try_standard(-3),
        Err(OpError::InvalidIterationCount(-3))
    ));
    assert!(matches!(
        ReflectionPhases::new(vec![PhasePair {
            marked: f64::INFINITY,
            start: PI
        }]),
        Err(OpError::NonFinitePhase { iteration: 0, .. })
    ));
}

#[test]
fn out_of_range_flag_emits_nothing() {
    let (mut circuit, reg) = circuit_with_register("bad_flag", 3);
    let search = standard_amplitude_amplification(2, DatabaseOracle::new([1]), 3);
    assert!(matches!(
        search.apply(&mut circuit, &reg[..]),
        Err(OpError::FlagIndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(circuit.is_empty());
}

// ---------------------------------------------------------------------------
// Flag positions other than 0
// ---------------------------------------------------------------------------

#[test]
fn flag_in_last_position_matches_closed_form() {
    let n = 3_u32;
    let (mut circuit, reg) = circuit_with_register("last_flag", n + 1);
    let flag = n as usize;
    standard_amplitude_amplification(1, DatabaseOracle::new([6]), flag)
        .apply(&mut circuit, &reg[..])
        .unwrap();
    let state = simulate(&circuit);
    let expected = success_probability(1, 1.0 / 8.0).unwrap();
    assert!((state.probability_of_one(flag).unwrap() - expected).abs() < TOL);
}

// ---------------------------------------------------------------------------
// Oblivious amplification
// ---------------------------------------------------------------------------

#[test]
fn oblivious_with_trivial_signal_matches_state_oracle_driver() {
    let n = 3_u32;
    let iterations = 2;
    let oracle = DatabaseOracle::new([5]);

    // Reference: state-oracle driver on the ancilla, system qubit spectating.
    let (mut reference, reg) = circuit_with_register("reference", n + 1);
    let system = reference.add_qubit();
    reference.ry(0.9, system).unwrap();
    standard_amplitude_amplification(iterations, oracle.clone(), 0)
        .apply(&mut reference, &reg[..])
        .unwrap();

    // Oblivious: ancilla preparation lifted into the oblivious shape.
    let (mut oblivious, reg) = circuit_with_register("oblivious", n + 1);
    let system = oblivious.add_qubit();
    oblivious.ry(0.9, system).unwrap();
    let signal = oblivious_oracle_from_deterministic_state_oracle(
        deterministic_state_oracle_from_state_oracle(0, oracle),
        NoOp,
    );
    let search = oblivious_amplitude_amplification(
        ReflectionPhases::standard(iterations),
        target_state_reflection_oracle(0),
        reflection_start(),
        signal,
    );
    search
        .apply(&mut oblivious, (&reg[..], &[system][..]))
        .unwrap();

    assert_same_state(&simulate(&oblivious), &simulate(&reference));
}

#[test]
fn oblivious_adjoint_undoes_forward() {
    let (mut circuit, ancilla) = circuit_with_register("oblivious_undo", 3);
    let system: Vec<QubitId> = (0..2).map(|_| circuit.add_qubit()).collect();
    prepare_random_state(&mut circuit, &system, 5);
    let before = simulate(&circuit);

    let signal = oblivious_oracle_from_deterministic_state_oracle(
        deterministic_state_oracle_from_state_oracle(0, DatabaseOracle::new([2])),
        NoOp,
    );
    let search = oblivious_amplitude_amplification(
        ReflectionPhases::standard(2),
        target_state_reflection_oracle(0),
        reflection_start(),
        signal,
    );
    search
        .apply(&mut circuit, (&ancilla[..], &system[..]))
        .unwrap();
    search
        .apply_adjoint(&mut circuit, (&ancilla[..], &system[..]))
        .unwrap();

    assert_same_state(&simulate(&circuit), &before);
}

#[test]
fn empty_register_search_is_certain() {
    // No database qubits: the single element is always marked.
    let mut circuit = Circuit::new("trivial");
    let flag = circuit.add_qubit();
    standard_amplitude_amplification(4, DatabaseOracle::new([0]), 0)
        .apply(&mut circuit, &[flag][..])
        .unwrap();
    assert!((flag_probability(&simulate(&circuit)) - 1.0).abs() < TOL);
}
