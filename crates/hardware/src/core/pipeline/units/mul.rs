//! Multiply unit: three-stage pipeline.
//!
//! The product is computed in stage 1 and carried through; the writeback to
//! the scoreboard (and zero flag) happens at stage 3.

use tracing::trace;

use crate::core::Machine;
use crate::core::pipeline::latches::ExecEntry;
use crate::core::pipeline::rob::{Rob, RobTag};

/// Three-stage multiply pipeline.
#[derive(Debug, Default)]
pub struct MulUnit {
    stages: [Option<ExecEntry>; 3],
}

impl MulUnit {
    /// Creates an empty multiply unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when stage 1 can take a new instruction this cycle.
    pub const fn can_accept(&self) -> bool {
        self.stages[0].is_none()
    }

    /// Places an issued instruction into stage 1.
    pub const fn issue(&mut self, entry: ExecEntry) {
        self.stages[0] = Some(entry);
    }

    /// Advances the pipeline one cycle, final stage first.
    pub fn advance(&mut self, m: &mut Machine, rob: &mut Rob) {
        if let Some(entry) = self.stages[2].take() {
            m.scoreboard.writeback(entry.inst.rd, entry.result, entry.tag);
            m.scoreboard.writeback_zero(entry.result == 0, entry.tag);
            rob.complete(entry.tag);
            trace!(pc = entry.pc, result = entry.result, "mul writeback");
            if m.trace {
                println!("{:<15}: pc({}) {}", "MUL3", entry.pc, entry.inst);
            }
        }

        if let Some(entry) = self.stages[1].take() {
            if m.trace {
                println!("{:<15}: pc({}) {}", "MUL2", entry.pc, entry.inst);
            }
            self.stages[2] = Some(entry);
        }

        if let Some(mut entry) = self.stages[0].take() {
            entry.result = entry.rv1.wrapping_mul(entry.rv2);
            if m.trace {
                println!("{:<15}: pc({}) {}", "MUL1", entry.pc, entry.inst);
            }
            self.stages[1] = Some(entry);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::memory::CodeMemory;
    use crate::isa::{Instruction, Opcode};

    #[test]
    fn test_three_cycle_latency() {
        let mut m = Machine::new(CodeMemory::new(4000, Vec::new()), &Config::default());
        let mut rob = Rob::new(4);
        let mut unit = MulUnit::new();

        let inst = Instruction {
            opcode: Opcode::Mul,
            rd: 7,
            rs1: 1,
            rs2: 2,
            rs3: 0,
            imm: 0,
        };
        let tag = rob.allocate(4000, inst, false).unwrap();
        m.scoreboard.invalidate(7, tag);
        m.scoreboard.invalidate_zero(tag);

        unit.issue(ExecEntry {
            tag,
            pc: 4000,
            inst,
            rv1: 6,
            rv2: 7,
            zero: false,
            result: 0,
            mem_address: 0,
        });

        // Two cycles in flight: no writeback yet.
        unit.advance(&mut m, &mut rob);
        unit.advance(&mut m, &mut rob);
        assert_eq!(m.scoreboard.read(7).1, false);

        // Third cycle: writeback + completion.
        unit.advance(&mut m, &mut rob);
        assert_eq!(m.scoreboard.read(7), (42, true));
        assert!(rob.commit_head().is_some());
        assert!(unit.is_empty());
    }
}
