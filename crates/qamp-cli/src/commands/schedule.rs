//! Schedule command implementation.

use anyhow::Result;
use console::style;
use tracing::debug;

use qamp_ops::{optimal_iterations, success_probability};

use super::common::target_fraction;

/// One row of the probability table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleRow {
    pub iterations: usize,
    pub probability: f64,
}

/// Success probability for `0..=max_iterations` standard iterations.
pub fn probability_table(fraction: f64, max_iterations: usize) -> Result<Vec<ScheduleRow>> {
    (0..=max_iterations)
        .map(|iterations| {
            Ok(ScheduleRow {
                iterations,
                probability: success_probability(iterations, fraction)?,
            })
        })
        .collect()
}

/// Execute the schedule command.
pub fn execute(qubits: u32, marked_count: u64, max_iterations: usize) -> Result<()> {
    let fraction = target_fraction(marked_count, qubits)?;
    let optimal = if marked_count == 0 {
        None
    } else {
        Some(optimal_iterations(fraction)?)
    };
    debug!(fraction, ?optimal, "tabulating schedule");

    println!(
        "{} {} of {} entries marked (fraction {:.6})",
        style("→").cyan().bold(),
        style(marked_count).green(),
        style(1_u64 << qubits).green(),
        fraction
    );

    println!("\n  {:>10}  {:>11}", "iterations", "probability");
    for row in probability_table(fraction, max_iterations)? {
        let bar: String = "█".repeat((row.probability * 40.0).round() as usize);
        let marker = if Some(row.iterations) == optimal {
            style("← optimal").yellow().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:>10}  {:>11.6}  {} {}",
            row.iterations,
            row.probability,
            style(bar).green(),
            marker
        );
    }

    if let Some(optimal) = optimal.filter(|&m| m > max_iterations) {
        println!(
            "\n  Optimal count {} lies beyond the table",
            style(optimal).yellow()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_single_marked() {
        let table = probability_table(0.25, 3).unwrap();
        assert_eq!(table.len(), 4);
        assert!((table[0].probability - 0.25).abs() < 1e-12);
        // One iteration finds one of four entries with certainty.
        assert!((table[1].probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_table_rejects_bad_fraction() {
        assert!(probability_table(1.5, 2).is_err());
    }

    #[test]
    fn test_execute() {
        assert!(execute(4, 1, 5).is_ok());
        assert!(execute(4, 0, 2).is_ok());
        assert!(execute(2, 5, 2).is_err());
    }
}
