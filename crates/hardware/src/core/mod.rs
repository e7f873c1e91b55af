//! Machine state and the execution pipeline.
//!
//! [`Machine`] is the single explicit simulation-state value: architectural
//! registers (with validity), data memory, code memory, the PC, and run
//! statistics. Every stage function receives it by reference — there are no
//! process-wide singletons. The pipeline structures live in
//! [`pipeline`](crate::core::pipeline).

pub mod memory;
pub mod pipeline;

use crate::config::Config;
use crate::core::memory::{CodeMemory, DataMemory};
use crate::core::pipeline::scoreboard::Scoreboard;
use crate::stats::SimStats;

/// Architectural machine state threaded through every pipeline stage.
#[derive(Debug)]
pub struct Machine {
    /// Current fetch program counter.
    pub pc: u64,
    /// The loaded program.
    pub code: CodeMemory,
    /// Register file with per-register validity (and the zero flag).
    pub scoreboard: Scoreboard,
    /// Word-addressed data memory.
    pub dmem: DataMemory,
    /// Run statistics.
    pub stats: SimStats,
    /// PCs in retirement order, for commit-order diagnostics.
    pub retired_trace: Vec<u64>,
    /// Print the per-cycle stage dump (CLI `display` mode).
    pub trace: bool,
}

impl Machine {
    /// Creates a machine with the given program and configuration.
    pub fn new(code: CodeMemory, config: &Config) -> Self {
        Self {
            pc: code.base(),
            code,
            scoreboard: Scoreboard::new(),
            dmem: DataMemory::new(config.memory.data_words),
            stats: SimStats::default(),
            retired_trace: Vec::new(),
            trace: config.general.trace_stages,
        }
    }
}
