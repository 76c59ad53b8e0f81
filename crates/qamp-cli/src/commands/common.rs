//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use qamp_adapter_sim::ExecutionResult;
use qamp_ops::AmplificationConfig;

/// Search settings read from a YAML file.
///
/// ```yaml
/// iterations: 2
/// flag_index: 0
/// schedule:
///   kind: standard
/// shots: 4096
/// seed: 7
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Schedule, iteration count and flag position.
    #[serde(flatten)]
    pub amplification: AmplificationConfig,
    /// Number of shots.
    pub shots: Option<u32>,
    /// Simulator seed.
    pub seed: Option<u64>,
}

/// Load search settings from a YAML file.
pub fn load_settings(path: &str) -> Result<SearchSettings> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    parse_settings(&source).with_context(|| format!("Invalid settings in {path}"))
}

/// Parse search settings from YAML text.
pub fn parse_settings(source: &str) -> Result<SearchSettings> {
    if source.trim().is_empty() {
        return Ok(SearchSettings::default());
    }
    Ok(serde_yaml_ng::from_str(source)?)
}

/// Share of `2^qubits` database entries that are marked.
pub fn target_fraction(marked: u64, qubits: u32) -> Result<f64> {
    if qubits >= 63 {
        anyhow::bail!("Database of 2^{qubits} entries is too large");
    }
    let size = 1_u64 << qubits;
    if marked > size {
        anyhow::bail!("{marked} marked entries exceed database size {size}");
    }
    Ok(marked as f64 / size as f64)
}

/// Split a bitstring (qubit 0 first) into its flag bit and database index.
pub fn decode_outcome(bitstring: &str, flag_index: usize) -> (bool, usize) {
    let mut flag = false;
    let mut index = 0;
    let mut bit = 0;
    for (position, c) in bitstring.chars().enumerate() {
        if position == flag_index {
            flag = c == '1';
            continue;
        }
        if c == '1' {
            index |= 1 << bit;
        }
        bit += 1;
    }
    (flag, index)
}

/// Print the most frequent outcomes as a histogram.
pub fn print_results(result: &ExecutionResult) {
    use console::style;

    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        result.shots
    );

    let sorted = result.counts.sorted();
    let total = result.counts.total() as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = *count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    println!(
        "\n  Execution time: {} ms",
        style(result.execution_time_ms).yellow()
    );
}
