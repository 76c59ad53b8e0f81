//! qamp Command-Line Interface
//!
//! Runs Grover-style database search through the statevector simulator and
//! tabulates the closed-form success probability of the standard schedule.
//!
//! ```text
//! qamp search -n 4 --marked 1,4,9 --shots 2048 --seed 7
//! qamp schedule -n 10 --marked-count 1 --max-iterations 30
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod database;

use commands::{schedule, search};

/// qamp - composable quantum operations and amplitude amplification
#[derive(Parser)]
#[command(name = "qamp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a uniform database for marked indices
    Search {
        /// Number of database qubits (the flag qubit is extra)
        #[arg(short = 'n', long)]
        qubits: u32,

        /// Marked database indices, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        marked: Vec<usize>,

        /// Grover iterations (defaults to the optimal count)
        #[arg(short, long, allow_negative_numbers = true)]
        iterations: Option<i64>,

        /// Number of shots
        #[arg(short, long)]
        shots: Option<u32>,

        /// Simulator seed
        #[arg(long, env = "QAMP_SEED")]
        seed: Option<u64>,

        /// YAML settings file; flags override its values
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Tabulate success probability against iteration count
    Schedule {
        /// Number of database qubits
        #[arg(short = 'n', long)]
        qubits: u32,

        /// Number of marked indices
        #[arg(short = 'k', long, default_value = "1")]
        marked_count: u64,

        /// Largest iteration count to show
        #[arg(short = 'M', long, default_value = "10")]
        max_iterations: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Search {
            qubits,
            marked,
            iterations,
            shots,
            seed,
            config,
        } => search::execute(&search::SearchArgs {
            qubits,
            marked,
            iterations,
            shots,
            seed,
            config,
        }),

        Commands::Schedule {
            qubits,
            marked_count,
            max_iterations,
        } => schedule::execute(qubits, marked_count, max_iterations),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
