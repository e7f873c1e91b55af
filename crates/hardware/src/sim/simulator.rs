//! Simulator: owns the machine state and the pipeline side-by-side.
//!
//! The run loop steps the machine one cycle at a time until a `HALT`
//! retires, the pipeline drains past the end of code memory, or the
//! optional cycle budget is exhausted. It also produces the end-of-run
//! state dump: all registers with validity, the zero flag, data memory,
//! and statistics.

use crate::common::SimResult;
use crate::config::Config;
use crate::core::Machine;
use crate::core::memory::CodeMemory;
use crate::core::pipeline::{Pipeline, TickEvent};

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// A `HALT` instruction retired.
    Halted,
    /// The pipeline drained past the end of code memory.
    Drained,
    /// The configured cycle budget ran out.
    CycleLimit,
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    /// Why the run stopped.
    pub reason: ExitReason,
    /// Cycles executed.
    pub cycles: u64,
    /// Instructions retired.
    pub retired: u64,
}

/// Top-level simulator: architectural state plus pipeline.
#[derive(Debug)]
pub struct Simulator {
    /// Architectural machine state.
    pub machine: Machine,
    /// Pipeline latches, queues, and functional units.
    pub pipeline: Pipeline,
    cycle_limit: Option<u64>,
}

impl Simulator {
    /// Creates a simulator for the given program and configuration.
    pub fn new(code: CodeMemory, config: &Config) -> Self {
        Self {
            machine: Machine::new(code, config),
            pipeline: Pipeline::new(config),
            cycle_limit: config.general.cycle_limit,
        }
    }

    /// Advances the simulator by one clock cycle.
    pub fn step(&mut self) -> SimResult<TickEvent> {
        if self.machine.trace {
            println!("--------------------------------");
            println!("Clock Cycle #: {}", self.machine.stats.cycles + 1);
            println!("--------------------------------");
        }
        let event = self.pipeline.tick(&mut self.machine)?;
        self.machine.stats.cycles += 1;
        Ok(event)
    }

    /// Runs until halt, drain, or the cycle budget; returns the summary.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        let reason = loop {
            if self
                .cycle_limit
                .is_some_and(|limit| self.machine.stats.cycles >= limit)
            {
                break ExitReason::CycleLimit;
            }
            match self.step()? {
                TickEvent::HaltRetired => break ExitReason::Halted,
                TickEvent::Running => {}
            }
            if self.pipeline.is_drained(&self.machine) {
                break ExitReason::Drained;
            }
        };

        Ok(RunSummary {
            reason,
            cycles: self.machine.stats.cycles,
            retired: self.machine.stats.instructions_retired,
        })
    }

    /// Prints the end-of-run dump: registers, zero flag, and data memory.
    pub fn dump_state(&self) {
        println!("=============== STATE OF ARCHITECTURAL REGISTER FILE ==========");
        for (i, entry) in self.machine.scoreboard.entries().iter().enumerate() {
            println!(
                "R{i:<3} | value = {:<12} | status = {}",
                entry.value,
                if entry.valid { "VALID" } else { "INVALID" }
            );
        }
        let (zero_set, zero_valid) = self.machine.scoreboard.read_zero();
        println!(
            "Z    | set   = {:<12} | status = {}",
            zero_set,
            if zero_valid { "VALID" } else { "INVALID" }
        );

        println!("============== STATE OF DATA MEMORY =============");
        for (row, chunk) in self.machine.dmem.words().chunks(8).enumerate() {
            print!("mem[{:>4}]", row * 8);
            for word in chunk {
                print!(" {word:>6}");
            }
            println!();
        }
    }
}
