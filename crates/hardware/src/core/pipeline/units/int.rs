//! Integer unit: two-stage pipeline.
//!
//! Stage 1 computes the result — and resolves `BZ`/`BNZ`/`JUMP`, reporting a
//! redirect to the clock driver when the branch is taken. Stage 2 performs
//! the scoreboard writeback (destination register and/or zero flag) and
//! marks the ROB entry complete.

use tracing::trace;

use crate::core::Machine;
use crate::core::pipeline::latches::ExecEntry;
use crate::core::pipeline::rob::{Rob, RobTag};
use crate::isa::Opcode;

/// A taken branch resolved this cycle: everything younger than `tag` is on
/// the wrong path and the PC must move to `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Tag of the resolved branch.
    pub tag: RobTag,
    /// New fetch PC.
    pub target: u64,
}

/// What the integer unit observed while advancing one cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntOutcome {
    /// Branch whose direction became known this cycle (taken or not).
    pub resolved: Option<RobTag>,
    /// Redirect for a taken branch.
    pub redirect: Option<Redirect>,
}

/// Two-stage integer pipeline.
#[derive(Debug, Default)]
pub struct IntUnit {
    stages: [Option<ExecEntry>; 2],
}

impl IntUnit {
    /// Creates an empty integer unit.
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
    pub fn advance(&mut self, m: &mut Machine, rob: &mut Rob) -> IntOutcome {
        let mut outcome = IntOutcome::default();

        if let Some(entry) = self.stages[1].take() {
            if entry.inst.opcode.writes_register() {
                m.scoreboard.writeback(entry.inst.rd, entry.result, entry.tag);
            }
            if entry.inst.opcode.sets_zero_flag() {
                m.scoreboard.writeback_zero(entry.result == 0, entry.tag);
            }
            rob.complete(entry.tag);
            trace!(pc = entry.pc, result = entry.result, "int writeback");
            if m.trace {
                println!("{:<15}: pc({}) {}", "INT2", entry.pc, entry.inst);
            }
        }

        if let Some(mut entry) = self.stages[0].take() {
            match entry.inst.opcode {
                Opcode::Movc => entry.result = entry.inst.imm,
                Opcode::Add => entry.result = entry.rv1.wrapping_add(entry.rv2),
                Opcode::Addl => entry.result = entry.rv1.wrapping_add(entry.inst.imm),
                Opcode::Sub => entry.result = entry.rv1.wrapping_sub(entry.rv2),
                Opcode::Subl => entry.result = entry.rv1.wrapping_sub(entry.inst.imm),
                Opcode::And => entry.result = entry.rv1 & entry.rv2,
                Opcode::Or => entry.result = entry.rv1 | entry.rv2,
                Opcode::Xor => entry.result = entry.rv1 ^ entry.rv2,
                Opcode::Bz | Opcode::Bnz | Opcode::Jump => {
                    outcome.resolved = Some(entry.tag);
                    let taken = match entry.inst.opcode {
                        Opcode::Bz => entry.zero,
                        Opcode::Bnz => !entry.zero,
                        _ => true,
                    };
                    if taken {
                        let target = match entry.inst.opcode {
                            Opcode::Jump => entry.rv1.wrapping_add(entry.inst.imm) as u64,
                            _ => entry.pc.wrapping_add_signed(entry.inst.imm),
                        };
                        outcome.redirect = Some(Redirect {
                            tag: entry.tag,
                            target,
                        });
                    }
                    trace!(pc = entry.pc, taken, "branch resolved");
                }
                _ => {}
            }
            if m.trace {
                println!("{:<15}: pc({}) {}", "INT1", entry.pc, entry.inst);
            }
            self.stages[1] = Some(entry);
        }

        outcome
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
        self.stages[0].is_none() && self.stages[1].is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::memory::CodeMemory;
    use crate::isa::Instruction;

    fn machine() -> Machine {
        Machine::new(CodeMemory::new(4000, Vec::new()), &Config::default())
    }

    fn exec_entry(tag: u64, opcode: Opcode, rv1: i64, rv2: i64, imm: i64) -> ExecEntry {
        ExecEntry {
            tag: RobTag(tag),
            pc: 4000,
            inst: Instruction {
                opcode,
                rd: 5,
                rs1: 1,
                rs2: 2,
                rs3: 0,
                imm,
            },
            rv1,
            rv2,
            zero: false,
            result: 0,
            mem_address: 0,
        }
    }

    #[test]
    fn test_two_cycle_latency_and_writeback() {
        let mut m = machine();
        let mut rob = Rob::new(4);
        let mut unit = IntUnit::new();

        let inst = Instruction {
            opcode: Opcode::Add,
            rd: 5,
            rs1: 1,
            rs2: 2,
            rs3: 0,
            imm: 0,
        };
        let tag = rob.allocate(4000, inst, false).unwrap();
        m.scoreboard.invalidate(5, tag);
        m.scoreboard.invalidate_zero(tag);

        let mut entry = exec_entry(0, Opcode::Add, 3, 4, 0);
        entry.tag = tag;
        unit.issue(entry);

        // Cycle 1: compute, no writeback yet.
        let _ = unit.advance(&mut m, &mut rob);
        assert_eq!(m.scoreboard.read(5).1, false);
        assert!(rob.commit_head().is_none());

        // Cycle 2: writeback + completion.
        let _ = unit.advance(&mut m, &mut rob);
        assert_eq!(m.scoreboard.read(5), (7, true));
        assert_eq!(m.scoreboard.read_zero(), (false, true));
        assert!(rob.commit_head().is_some());
        assert!(unit.is_empty());
    }

    #[test]
    fn test_taken_bz_redirects() {
        let mut m = machine();
        let mut rob = Rob::new(4);
        let mut unit = IntUnit::new();

        let mut entry = exec_entry(3, Opcode::Bz, 0, 0, -8);
        entry.zero = true;
        unit.issue(entry);

        let outcome = unit.advance(&mut m, &mut rob);
        assert_eq!(outcome.resolved, Some(RobTag(3)));
        assert_eq!(
            outcome.redirect,
            Some(Redirect {
                tag: RobTag(3),
                target: 3992
            })
        );
    }

    #[test]
    fn test_not_taken_bnz_resolves_without_redirect() {
        let mut m = machine();
        let mut rob = Rob::new(4);
        let mut unit = IntUnit::new();

        let mut entry = exec_entry(3, Opcode::Bnz, 0, 0, 8);
        entry.zero = true; // BNZ with flag set: not taken
        unit.issue(entry);

        let outcome = unit.advance(&mut m, &mut rob);
        assert_eq!(outcome.resolved, Some(RobTag(3)));
        assert_eq!(outcome.redirect, None);
    }

    #[test]
    fn test_jump_targets_register_plus_literal() {
        let mut m = machine();
        let mut rob = Rob::new(4);
        let mut unit = IntUnit::new();

        unit.issue(exec_entry(2, Opcode::Jump, 4016, 0, 8));
        let outcome = unit.advance(&mut m, &mut rob);
        assert_eq!(outcome.redirect.map(|r| r.target), Some(4024));
    }

    #[test]
    fn test_flush_after_clears_younger() {
        let mut m = machine();
        let mut rob = Rob::new(4);
        let mut unit = IntUnit::new();

        unit.issue(exec_entry(5, Opcode::Add, 1, 1, 0));
        let _ = unit.advance(&mut m, &mut rob);
        unit.issue(exec_entry(6, Opcode::Sub, 1, 1, 0));

        unit.flush_after(RobTag(4));
        assert!(unit.is_empty());
    }
}
