//! Out-of-order pipeline simulator CLI.
//!
//! This binary loads a text program and runs it to completion. It performs:
//! 1. **Load:** Parse the program file into code memory (fatal on any error).
//! 2. **Run:** Step the machine until halt, drain, or the cycle budget.
//! 3. **Dump:** Print the register file, data memory, and statistics.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use oosim_core::sim::loader;
use oosim_core::{Config, Simulator};

/// Output mode for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Per-cycle dump of every pipeline stage, then the final state.
    Display,
    /// Final state dump only.
    Simulate,
}

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Cycle-level out-of-order pipeline simulator",
    long_about = "Run a text program on the simulated out-of-order machine.\n\n\
Examples:\n  sim programs/sum.asm\n  sim programs/sum.asm display\n  sim programs/sum.asm simulate 200"
)]
struct Cli {
    /// Program file: one instruction per line.
    file: PathBuf,

    /// Output mode.
    #[arg(value_enum, default_value_t = Mode::Simulate)]
    mode: Mode,

    /// Stop after this many cycles even if the machine has not terminated.
    cycles: Option<u64>,

    /// JSON configuration file overriding queue capacities and start PC.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => load_config(&path),
        None => Config::default(),
    };
    config.general.trace_stages = cli.mode == Mode::Display;
    if cli.cycles.is_some() {
        config.general.cycle_limit = cli.cycles;
    }

    let code = match loader::load_program(&cli.file, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[!] FATAL: {e}");
            process::exit(1);
        }
    };

    let mut sim = Simulator::new(code, &config);
    match sim.run() {
        Ok(summary) => {
            println!("(sim) >> Simulation Complete: {:?} after {} cycles, {} instructions retired",
                summary.reason, summary.cycles, summary.retired);
            sim.dump_state();
            sim.machine.stats.print();
        }
        Err(e) => {
            eprintln!("[!] FATAL: {e}");
            sim.dump_state();
            process::exit(1);
        }
    }
}

/// Reads and parses a JSON configuration file; exits non-zero on error.
fn load_config(path: &PathBuf) -> Config {
    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: could not read config '{}': {e}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: invalid config '{}': {e}", path.display());
        process::exit(1);
    })
}
