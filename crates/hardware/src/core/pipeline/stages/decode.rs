//! Decode/dispatch stage.
//!
//! Classifies the instruction in the decode latch, checks the scoreboard for
//! its sources, and on success captures operand values, invalidates the
//! destination (and the zero flag for arithmetic opcodes), and copies the
//! instruction into the IQ or LSQ plus the ROB. Any invalid source is a data
//! hazard and any full queue a structural hazard; both stall the stage,
//! which retries the same instruction every cycle — no younger instruction
//! may dispatch past it.

use tracing::trace;

use crate::core::Machine;
use crate::core::pipeline::issue_queue::IssueQueue;
use crate::core::pipeline::latches::{DispatchEntry, FetchEntry};
use crate::core::pipeline::lsq::LoadStoreQueue;
use crate::core::pipeline::rob::{Rob, RobTag};
use crate::isa::Opcode;

/// A successful dispatch, reported back to the clock driver.
#[derive(Clone, Copy, Debug)]
pub struct Dispatched {
    /// Tag allocated in the ROB.
    pub tag: RobTag,
    /// The instruction is a branch the integer unit must resolve.
    pub is_branch: bool,
    /// The instruction is a halt; fetch must stop.
    pub is_halt: bool,
}

/// Executes the decode/dispatch stage for one cycle.
pub fn decode_stage(
    m: &mut Machine,
    latch: &mut Option<FetchEntry>,
    stalled: &mut bool,
    iq: &mut IssueQueue,
    lsq: &mut LoadStoreQueue,
    rob: &mut Rob,
) -> Option<Dispatched> {
    let Some(entry) = *latch else {
        *stalled = false;
        return None;
    };
    let inst = entry.inst;

    // Data hazards: every register source must be valid, and BZ/BNZ
    // additionally need the zero flag.
    let mut values = [0i64; 3];
    let mut ready = true;
    for (slot, reg) in inst.source_regs().into_iter().enumerate() {
        if let Some(reg) = reg {
            let (value, valid) = m.scoreboard.read(reg);
            values[slot] = value;
            ready &= valid;
        }
    }
    let mut zero = false;
    if matches!(inst.opcode, Opcode::Bz | Opcode::Bnz) {
        let (set, valid) = m.scoreboard.read_zero();
        zero = set;
        ready &= valid;
    }

    if !ready {
        *stalled = true;
        m.stats.stalls_data += 1;
        trace!(pc = entry.pc, "decode data stall");
        if m.trace {
            println!("{:<15}: pc({}) {} (stalled)", "Decode/RF", entry.pc, inst);
        }
        return None;
    }

    // Structural hazards: the target queue and the ROB both need a free
    // slot before anything is allocated.
    let queue_full = if inst.opcode.is_memory() {
        lsq.is_full()
    } else if inst.opcode == Opcode::Halt {
        false
    } else {
        iq.is_full()
    };
    if queue_full || rob.is_full() {
        *stalled = true;
        m.stats.stalls_structural += 1;
        trace!(pc = entry.pc, "decode structural stall");
        if m.trace {
            println!("{:<15}: pc({}) {} (stalled)", "Decode/RF", entry.pc, inst);
        }
        return None;
    }

    // Dispatch: ROB entry first (it defines the tag), then the queue copy,
    // in program order. HALT completes at allocation — it has no unit.
    let tag = rob.allocate(entry.pc, inst, inst.opcode == Opcode::Halt)?;
    m.stats.instructions_dispatched += 1;

    if inst.opcode.writes_register() {
        m.scoreboard.invalidate(inst.rd, tag);
    }
    if inst.opcode.sets_zero_flag() {
        m.scoreboard.invalidate_zero(tag);
    }

    let dispatch = DispatchEntry {
        tag,
        pc: entry.pc,
        inst,
        rv1: values[0],
        rv2: values[1],
        rv3: values[2],
        zero,
    };
    if inst.opcode.is_memory() {
        let _slotted = lsq.allocate(dispatch);
        debug_assert!(_slotted, "LSQ slot checked before dispatch");
    } else if inst.opcode.unit().is_some() {
        let _slotted = iq.allocate(dispatch);
        debug_assert!(_slotted, "IQ slot checked before dispatch");
    }

    *stalled = false;
    *latch = None;
    trace!(pc = entry.pc, tag = tag.0, "dispatch");
    if m.trace {
        println!("{:<15}: pc({}) {}", "Decode/RF", entry.pc, inst);
    }

    Some(Dispatched {
        tag,
        is_branch: inst.opcode.is_branch(),
        is_halt: inst.opcode == Opcode::Halt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::memory::CodeMemory;
    use crate::isa::parse::parse_line;

    struct Harness {
        m: Machine,
        iq: IssueQueue,
        lsq: LoadStoreQueue,
        rob: Rob,
        latch: Option<FetchEntry>,
        stalled: bool,
    }

    impl Harness {
        fn new() -> Self {
            let config = Config::default();
            Self {
                m: Machine::new(CodeMemory::new(4000, Vec::new()), &config),
                iq: IssueQueue::new(config.pipeline.iq_size),
                lsq: LoadStoreQueue::new(config.pipeline.lsq_size),
                rob: Rob::new(config.pipeline.rob_size),
                latch: None,
                stalled: false,
            }
        }

        fn put(&mut self, text: &str) {
            let inst = parse_line(text, 1).unwrap().unwrap();
            self.latch = Some(FetchEntry { pc: 4000, inst });
        }

        fn step(&mut self) -> Option<Dispatched> {
            decode_stage(
                &mut self.m,
                &mut self.latch,
                &mut self.stalled,
                &mut self.iq,
                &mut self.lsq,
                &mut self.rob,
            )
        }
    }

    #[test]
    fn test_movc_dispatches_and_invalidates_rd() {
        let mut h = Harness::new();
        h.put("MOVC R1,#5");

        let dispatched = h.step().unwrap();
        assert!(!dispatched.is_branch);
        assert_eq!(h.m.scoreboard.read(1).1, false);
        assert_eq!(h.iq.len(), 1);
        assert_eq!(h.rob.len(), 1);
        assert!(h.latch.is_none());
    }

    #[test]
    fn test_invalid_source_stalls_in_place() {
        let mut h = Harness::new();
        h.m.scoreboard.invalidate(1, RobTag(9));
        h.put("ADD R2,R1,R1");

        assert!(h.step().is_none());
        assert!(h.stalled);
        assert!(h.latch.is_some());
        assert_eq!(h.m.stats.stalls_data, 1);
        // R2 must not be touched by a stalled dispatch.
        assert_eq!(h.m.scoreboard.read(2).1, true);
        assert_eq!(h.rob.len(), 0);

        // Producer writes back; the retry succeeds.
        h.m.scoreboard.writeback(1, 5, RobTag(9));
        let _ = h.step().unwrap();
        assert_eq!(h.iq.len(), 1);
        let queued = h.iq.select(crate::isa::FuKind::Int).unwrap();
        assert_eq!((queued.rv1, queued.rv2), (5, 5));
    }

    #[test]
    fn test_bz_waits_for_zero_flag() {
        let mut h = Harness::new();
        h.m.scoreboard.invalidate_zero(RobTag(4));
        h.put("BZ #8");

        assert!(h.step().is_none());
        assert!(h.stalled);

        h.m.scoreboard.writeback_zero(true, RobTag(4));
        let dispatched = h.step().unwrap();
        assert!(dispatched.is_branch);
        let queued = h.iq.select(crate::isa::FuKind::Int).unwrap();
        assert!(queued.zero);
    }

    #[test]
    fn test_store_reads_both_sources_no_invalidate() {
        let mut h = Harness::new();
        h.m.scoreboard.preload(1, 9);
        h.m.scoreboard.preload(2, 16);
        h.put("STORE R1,R2,#4");

        let _ = h.step().unwrap();
        assert_eq!(h.lsq.len(), 1);
        assert_eq!(h.iq.len(), 0);
        let queued = h.lsq.pop_head().unwrap();
        assert_eq!((queued.rv1, queued.rv2), (9, 16));
        // Stores have no destination; nothing became invalid.
        for i in 0..4 {
            assert!(h.m.scoreboard.read(i).1);
        }
    }

    #[test]
    fn test_full_lsq_is_structural_stall() {
        let mut h = Harness::new();
        for _ in 0..h.lsq.capacity() {
            h.put("LOAD R1,R0,#0");
            assert!(h.step().is_some());
        }
        h.put("LOAD R2,R0,#4");
        assert!(h.step().is_none());
        assert!(h.stalled);
        assert_eq!(h.m.stats.stalls_structural, 1);
        assert_eq!(h.lsq.len(), h.lsq.capacity());
    }

    #[test]
    fn test_full_rob_blocks_even_with_free_queue() {
        let mut h = Harness::new();
        for _ in 0..h.rob.capacity() {
            let _ = h
                .rob
                .allocate(4000, parse_line("HALT", 1).unwrap().unwrap(), true)
                .unwrap();
        }
        h.put("MOVC R1,#5");
        assert!(h.step().is_none());
        assert!(h.stalled);
    }

    #[test]
    fn test_halt_needs_only_rob() {
        let mut h = Harness::new();
        h.put("HALT");
        let dispatched = h.step().unwrap();
        assert!(dispatched.is_halt);
        assert_eq!(h.iq.len(), 0);
        assert_eq!(h.lsq.len(), 0);
        // Complete at allocation: retires immediately in order.
        assert!(h.rob.commit_head().is_some());
    }

    #[test]
    fn test_arith_invalidates_zero_flag() {
        let mut h = Harness::new();
        h.put("SUB R3,R0,R0");
        let _ = h.step().unwrap();
        assert_eq!(h.m.scoreboard.read_zero().1, false);
        assert_eq!(h.m.scoreboard.read(3).1, false);
    }
}
