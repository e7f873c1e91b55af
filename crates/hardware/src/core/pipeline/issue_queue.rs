//! Issue Queue (IQ): dispatched non-memory instructions awaiting a unit.
//!
//! A fixed-capacity arena with an explicit free list, so allocation and
//! release are O(1) and "queue full" is an explicit condition the dispatch
//! stage tests before committing to anything. Selection scans the occupied
//! slots for the oldest entry routed to the requested functional unit and
//! issues at most one instruction per unit per cycle.

use crate::core::pipeline::latches::DispatchEntry;
use crate::core::pipeline::rob::RobTag;
use crate::isa::FuKind;

/// Fixed-capacity pool of pending non-memory instructions.
#[derive(Debug)]
pub struct IssueQueue {
    slots: Vec<Option<DispatchEntry>>,
    free: Vec<usize>,
}

impl IssueQueue {
    /// Creates an issue queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            free: (0..capacity).rev().collect(),
        }
    }

    /// Returns the queue capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns true when no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.free.len() == self.slots.len()
    }

    /// Returns true when dispatch must stall on this queue.
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Places a dispatched instruction into a free slot.
    ///
    /// Returns false (and drops nothing) when the queue is full; the caller
    /// must have checked [`Self::is_full`] and stalled instead.
    pub fn allocate(&mut self, entry: DispatchEntry) -> bool {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the oldest entry routed to `kind`, if any.
    pub fn select(&mut self, kind: FuKind) -> Option<DispatchEntry> {
        let mut oldest: Option<(usize, RobTag)> = None;
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(entry) = slot {
                if entry.inst.opcode.unit() == Some(kind)
                    && oldest.is_none_or(|(_, tag)| entry.tag < tag)
                {
                    oldest = Some((idx, entry.tag));
                }
            }
        }

        let (idx, _) = oldest?;
        let entry = self.slots[idx].take();
        self.free.push(idx);
        entry
    }

    /// Drops every entry younger than `tag` (branch squash).
    pub fn flush_after(&mut self, tag: RobTag) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_some_and(|e| e.tag > tag) {
                *slot = None;
                self.free.push(idx);
            }
        }
    }

    /// Iterates over occupied slots, oldest first.
    pub fn for_each(&self, mut f: impl FnMut(&DispatchEntry)) {
        let mut entries: Vec<&DispatchEntry> = self.slots.iter().flatten().collect();
        entries.sort_by_key(|e| e.tag);
        for entry in entries {
            f(entry);
        }
    }
}
