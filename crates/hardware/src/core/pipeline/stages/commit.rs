//! Commit stage: retire instructions from the ROB head.
//!
//! Retirement inspects only the oldest entry. A complete head is popped and
//! counted; an incomplete head means nothing retires this cycle, however
//! complete younger entries may be. Retiring a `HALT` is the terminal
//! signal for the whole run.

use tracing::trace;

use crate::core::Machine;
use crate::core::pipeline::rob::{Rob, RobTag};
use crate::isa::Opcode;

/// What retirement did this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetireEvent {
    /// Head missing or not yet complete.
    Idle,
    /// One instruction retired.
    Retired(RobTag),
    /// The retired instruction was `HALT`: stop the clock.
    Halted,
}

/// Executes the commit stage for one cycle.
pub fn commit_stage(m: &mut Machine, rob: &mut Rob) -> RetireEvent {
    let Some(entry) = rob.commit_head() else {
        return RetireEvent::Idle;
    };

    m.stats.instructions_retired += 1;
    m.retired_trace.push(entry.pc);
    match entry.inst.opcode {
        Opcode::Load | Opcode::Ldr => m.stats.inst_load += 1,
        Opcode::Store | Opcode::Str => m.stats.inst_store += 1,
        Opcode::Bz | Opcode::Bnz | Opcode::Jump => m.stats.inst_branch += 1,
        Opcode::Halt => {}
        _ => m.stats.inst_alu += 1,
    }

    trace!(pc = entry.pc, tag = entry.tag.0, "retire");
    if m.trace {
        println!("{:<15}: pc({}) {}", "Retire", entry.pc, entry.inst);
    }

    if entry.inst.opcode == Opcode::Halt {
        RetireEvent::Halted
    } else {
        RetireEvent::Retired(entry.tag)
    }
}
