//! Memory unit: three-stage pipeline.
//!
//! Stage 1 bounds-checks the effective address computed at issue (an
//! out-of-range address is a fatal simulation error, never wrapped). Stage 2
//! models access latency. Stage 3 performs the data memory access: loads
//! read into the result buffer and write the scoreboard; stores write memory
//! and never touch an architectural register.

use tracing::trace;

use crate::common::SimResult;
use crate::core::Machine;
use crate::core::pipeline::latches::ExecEntry;
use crate::core::pipeline::rob::{Rob, RobTag};

/// Three-stage memory pipeline.
#[derive(Debug, Default)]
pub struct MemUnit {
    stages: [Option<ExecEntry>; 3],
}

impl MemUnit {
    /// Creates an empty memory unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when stage 1 can take a new instruction this cycle.
    pub const fn can_accept(&self) -> bool {
        self.stages[0].is_none()
    }

    /// Places an issued memory operation into stage 1.
    pub const fn issue(&mut self, entry: ExecEntry) {
        self.stages[0] = Some(entry);
    }

    /// Advances the pipeline one cycle, final stage first.
    pub fn advance(&mut self, m: &mut Machine, rob: &mut Rob) -> SimResult<()> {
        if let Some(mut entry) = self.stages[2].take() {
            if entry.inst.opcode.is_load() {
                entry.result = m.dmem.read(entry.pc, entry.mem_address)?;
                m.scoreboard.writeback(entry.inst.rd, entry.result, entry.tag);
                trace!(
                    pc = entry.pc,
                    address = entry.mem_address,
                    value = entry.result,
                    "load"
                );
            } else {
                // Stores carry the data in rv1.
                m.dmem.write(entry.pc, entry.mem_address, entry.rv1)?;
                trace!(
                    pc = entry.pc,
                    address = entry.mem_address,
                    value = entry.rv1,
                    "store"
                );
            }
            rob.complete(entry.tag);
            if m.trace {
                println!("{:<15}: pc({}) {}", "MEM3", entry.pc, entry.inst);
            }
        }

        if let Some(entry) = self.stages[1].take() {
            if m.trace {
                println!("{:<15}: pc({}) {}", "MEM2", entry.pc, entry.inst);
            }
            self.stages[2] = Some(entry);
        }

        if let Some(entry) = self.stages[0].take() {
            let _index = m.dmem.check(entry.pc, entry.mem_address)?;
            if m.trace {
                println!("{:<15}: pc({}) {}", "MEM1", entry.pc, entry.inst);
            }
            self.stages[1] = Some(entry);
        }

        Ok(())
    }

    /// Drops in-flight entries younger than `tag` (branch squash).
    pub fn flush_after(&mut self, tag: RobTag) {
        for stage in &mut self.stages {
            if stage.is_some_and(|e| e.tag > tag) {
                *stage = None;
            }
        }
    }

    /// True when no instruction is in flight.
    pub const fn is_empty(&self) -> bool {
        self.stages[0].is_none() && self.stages[1].is_none() && self.stages[2].is_none()
    }
}
