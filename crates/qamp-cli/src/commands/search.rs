//! Search command implementation.

use anyhow::Result;
use console::style;
use tracing::info;

use qamp_adapter_sim::{ExecutionResult, StatevectorSimulator};
use qamp_ir::Circuit;
use qamp_ops::{
    Operation, ReflectionPhases, amplitude_amplification_from_state_oracle, success_probability,
};

use super::common::{
    SearchSettings, decode_outcome, load_settings, print_results, target_fraction,
};
use crate::database::DatabaseOracle;

const DEFAULT_SHOTS: u32 = 1024;

/// Arguments of the search command.
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub qubits: u32,
    pub marked: Vec<usize>,
    pub iterations: Option<i64>,
    pub shots: Option<u32>,
    pub seed: Option<u64>,
    pub config: Option<String>,
}

/// Flags on top of file settings.
fn resolve_settings(args: &SearchArgs) -> Result<SearchSettings> {
    let mut settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => SearchSettings::default(),
    };
    if args.iterations.is_some() {
        settings.amplification.iterations = args.iterations;
    }
    if args.shots.is_some() {
        settings.shots = args.shots;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    Ok(settings)
}

/// Build the search circuit over `qubits + 1` qubits.
fn build_circuit(
    qubits: u32,
    oracle: DatabaseOracle,
    settings: &SearchSettings,
    fraction: f64,
) -> Result<(Circuit, ReflectionPhases)> {
    let phases = settings.amplification.phases(Some(fraction))?;
    let flag_index = settings.amplification.flag_index;

    let mut circuit = Circuit::new("search");
    let register = circuit.add_qreg("q", qubits + 1);
    amplitude_amplification_from_state_oracle(phases.clone(), oracle, flag_index)
        .apply(&mut circuit, register.as_slice())?;
    Ok((circuit, phases))
}

/// Share of shots with the flag set, and the flagged indices by frequency.
fn flagged_outcomes(result: &ExecutionResult, flag_index: usize) -> (f64, Vec<(usize, u64)>) {
    let mut hits: Vec<(usize, u64)> = Vec::new();
    let mut flagged = 0;
    for (bitstring, count) in result.counts.iter() {
        let (flag, index) = decode_outcome(bitstring, flag_index);
        if !flag {
            continue;
        }
        flagged += count;
        match hits.iter_mut().find(|(i, _)| *i == index) {
            Some((_, c)) => *c += count,
            None => hits.push((index, count)),
        }
    }
    hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let total = result.counts.total();
    let rate = if total == 0 {
        0.0
    } else {
        flagged as f64 / total as f64
    };
    (rate, hits)
}

/// Execute the search command.
pub fn execute(args: &SearchArgs) -> Result<()> {
    let settings = resolve_settings(args)?;
    let size = 1_usize
        .checked_shl(args.qubits)
        .ok_or_else(|| anyhow::anyhow!("Database of 2^{} entries is too large", args.qubits))?;
    if let Some(&bad) = args.marked.iter().find(|&&m| m >= size) {
        anyhow::bail!("Marked index {bad} is outside a database of {size} entries");
    }

    let oracle = DatabaseOracle::new(args.marked.iter().copied());
    let marked = oracle.marked().to_vec();
    let fraction = target_fraction(marked.len() as u64, args.qubits)?;

    println!(
        "{} Searching {} entries for {:?}",
        style("→").cyan().bold(),
        style(size).green(),
        marked
    );

    let (circuit, phases) = build_circuit(args.qubits, oracle, &settings, fraction)?;
    let iterations = phases.iterations();
    let custom = !phases.is_standard();
    info!(
        iterations,
        custom,
        instructions = circuit.len(),
        "search circuit built"
    );
    println!(
        "  Circuit: {} qubits, {} instructions, depth {}, {} iteration(s)",
        circuit.num_qubits(),
        circuit.len(),
        circuit.depth(),
        iterations
    );

    let mut simulator = StatevectorSimulator::new();
    if let Some(seed) = settings.seed {
        simulator = simulator.with_seed(seed);
    }

    let flag_index = settings.amplification.flag_index;
    let exact = simulator
        .statevector(&circuit)?
        .probability(|basis| (basis >> flag_index) & 1 == 1);

    let shots = settings.shots.unwrap_or(DEFAULT_SHOTS);
    let result = simulator.run(&circuit, shots)?;
    print_results(&result);

    let (sampled, hits) = flagged_outcomes(&result, flag_index);

    println!("\n{} Success probability:", style("✓").green().bold());
    if custom {
        println!("  Theoretical: {}", style("n/a (custom schedule)").dim());
    } else {
        let theoretical = success_probability(iterations, fraction)?;
        println!("  Theoretical: {}", style(format!("{theoretical:.6}")).yellow());
    }
    println!("  Exact:       {}", style(format!("{exact:.6}")).yellow());
    println!("  Sampled:     {}", style(format!("{sampled:.6}")).yellow());

    println!("\n{} Recovered indices:", style("✓").green().bold());
    if hits.is_empty() {
        println!("  {}", style("none").dim());
    }
    for (index, count) in hits {
        let status = if marked.contains(&index) {
            style("marked").green()
        } else {
            style("unmarked").red()
        };
        println!("  {:>8}: {:>6} ({})", style(index).cyan(), count, status);
    }

    Ok(())
}
