//! The out-of-order execution pipeline and its clock driver.
//!
//! One [`Pipeline::tick`] is one machine cycle. Stages are advanced in
//! reverse dataflow order — Retire, the functional units (final stages
//! first), LSQ issue, IQ issue, Decode/dispatch, Fetch — so a value
//! produced this cycle is visible to a downstream stage only through the
//! latch it already occupies, never by read-after-write within one step.

pub mod issue_queue;
pub mod latches;
pub mod lsq;
pub mod rob;
pub mod scoreboard;
pub mod stages;
pub mod units;

use tracing::debug;

use crate::common::SimResult;
use crate::config::Config;
use crate::core::Machine;
use crate::core::pipeline::issue_queue::IssueQueue;
use crate::core::pipeline::latches::{ExecEntry, FetchEntry};
use crate::core::pipeline::lsq::LoadStoreQueue;
use crate::core::pipeline::rob::{Rob, RobTag};
use crate::core::pipeline::stages::commit::RetireEvent;
use crate::core::pipeline::units::{IntUnit, MemUnit, MulUnit, Redirect};
use crate::isa::FuKind;

/// Result of one clock tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickEvent {
    /// The machine keeps running.
    Running,
    /// A `HALT` retired this cycle; no further cycles may execute.
    HaltRetired,
}

/// All pipeline state: latches, queues, the ROB, and the functional units.
#[derive(Debug)]
pub struct Pipeline {
    fetch_latch: Option<FetchEntry>,
    decode_latch: Option<FetchEntry>,
    decode_stalled: bool,
    iq: IssueQueue,
    lsq: LoadStoreQueue,
    rob: Rob,
    int_unit: IntUnit,
    mul_unit: MulUnit,
    mem_unit: MemUnit,
    /// Dispatched branches the integer unit has not yet resolved.
    pending_branches: Vec<RobTag>,
    /// A dispatched `HALT` that has not retired; gates fetch.
    halt_pending: Option<RobTag>,
}

impl Pipeline {
    /// Creates an empty pipeline with the configured capacities.
    pub fn new(config: &Config) -> Self {
        Self {
            fetch_latch: None,
            decode_latch: None,
            decode_stalled: false,
            iq: IssueQueue::new(config.pipeline.iq_size),
            lsq: LoadStoreQueue::new(config.pipeline.lsq_size),
            rob: Rob::new(config.pipeline.rob_size),
            int_unit: IntUnit::new(),
            mul_unit: MulUnit::new(),
            mem_unit: MemUnit::new(),
            pending_branches: Vec::new(),
            halt_pending: None,
        }
    }

    /// Advances the whole machine by one cycle.
    pub fn tick(&mut self, m: &mut Machine) -> SimResult<TickEvent> {
        // Retire.
        if stages::commit::commit_stage(m, &mut self.rob) == RetireEvent::Halted {
            return Ok(TickEvent::HaltRetired);
        }

        // Functional units, final stages first.
        self.mem_unit.advance(m, &mut self.rob)?;
        self.mul_unit.advance(m, &mut self.rob);
        let outcome = self.int_unit.advance(m, &mut self.rob);
        if let Some(tag) = outcome.resolved {
            self.pending_branches.retain(|t| *t != tag);
        }
        if let Some(redirect) = outcome.redirect {
            self.squash(m, redirect);
        }

        // LSQ: only the head may issue, and not past an older unresolved
        // branch — a store reaching stage 3 could not be squashed.
        if self.mem_unit.can_accept() {
            let blocked = self
                .lsq
                .peek_head()
                .is_some_and(|head| self.pending_branches.iter().any(|b| *b < head.tag));
            if !blocked && let Some(entry) = self.lsq.pop_head() {
                let address = LoadStoreQueue::effective_address(&entry);
                debug!(pc = entry.pc, address, "lsq issue");
                self.mem_unit.issue(ExecEntry::from_dispatch(entry, address));
            }
        }

        // IQ: at most one instruction per unit per cycle, oldest first.
        if self.int_unit.can_accept()
            && let Some(entry) = self.iq.select(FuKind::Int)
        {
            debug!(pc = entry.pc, "iq issue to int");
            self.int_unit.issue(ExecEntry::from_dispatch(entry, 0));
        }
        if self.mul_unit.can_accept()
            && let Some(entry) = self.iq.select(FuKind::Mul)
        {
            debug!(pc = entry.pc, "iq issue to mul");
            self.mul_unit.issue(ExecEntry::from_dispatch(entry, 0));
        }

        // Decode / dispatch.
        if let Some(dispatched) = stages::decode::decode_stage(
            m,
            &mut self.decode_latch,
            &mut self.decode_stalled,
            &mut self.iq,
            &mut self.lsq,
            &mut self.rob,
        ) {
            if dispatched.is_branch {
                self.pending_branches.push(dispatched.tag);
            }
            if dispatched.is_halt {
                self.halt_pending = Some(dispatched.tag);
            }
        }

        // Fetch.
        stages::fetch::fetch_stage(
            m,
            &mut self.fetch_latch,
            &mut self.decode_latch,
            self.halt_pending.is_some(),
        );

        if m.trace {
            self.dump_queues();
        }

        Ok(TickEvent::Running)
    }

    /// Squashes everything younger than a taken branch and redirects fetch.
    fn squash(&mut self, m: &mut Machine, redirect: Redirect) {
        m.pc = redirect.target;
        self.fetch_latch = None;
        self.decode_latch = None;
        self.decode_stalled = false;
        if self.halt_pending.is_some_and(|t| t > redirect.tag) {
            self.halt_pending = None;
        }
        self.iq.flush_after(redirect.tag);
        self.lsq.flush_after(redirect.tag);
        self.rob.flush_after(redirect.tag);
        self.int_unit.flush_after(redirect.tag);
        self.mul_unit.flush_after(redirect.tag);
        self.mem_unit.flush_after(redirect.tag);
        self.pending_branches.retain(|t| *t <= redirect.tag);
        m.scoreboard.rebuild(&self.rob);
        m.stats.branch_flushes += 1;
        debug!(new_pc = redirect.target, "taken branch squash");
        if m.trace {
            println!("*** taken branch: squash and redirect to pc({})", redirect.target);
        }
    }

    /// True when nothing is in flight and fetch has run out of program.
    ///
    /// For straight-line programs this is exactly "completed-instruction
    /// count equals code memory size".
    pub fn is_drained(&self, m: &Machine) -> bool {
        self.fetch_latch.is_none()
            && self.decode_latch.is_none()
            && self.iq.is_empty()
            && self.lsq.is_empty()
            && self.rob.is_empty()
            && self.int_unit.is_empty()
            && self.mul_unit.is_empty()
            && self.mem_unit.is_empty()
            && m.code.fetch(m.pc).is_none()
    }

    /// The reorder buffer (read-only, for dumps and tests).
    pub const fn rob(&self) -> &Rob {
        &self.rob
    }

    /// The issue queue (read-only, for dumps and tests).
    pub const fn iq(&self) -> &IssueQueue {
        &self.iq
    }

    /// The load-store queue (read-only, for dumps and tests).
    pub const fn lsq(&self) -> &LoadStoreQueue {
        &self.lsq
    }

    /// Prints queue occupancy rows of the per-cycle stage dump.
    fn dump_queues(&self) {
        print!("{:<15}:", "IQ");
        self.iq.for_each(|e| print!(" [pc({}) {}]", e.pc, e.inst));
        println!();
        print!("{:<15}:", "LSQ");
        self.lsq.for_each(|e| print!(" [pc({}) {}]", e.pc, e.inst));
        println!();
        print!("{:<15}:", "ROB");
        self.rob.for_each(|e| {
            print!(
                " [pc({}) {}{}]",
                e.pc,
                e.inst,
                if e.complete { " *" } else { "" }
            );
        });
        println!();
    }
}
