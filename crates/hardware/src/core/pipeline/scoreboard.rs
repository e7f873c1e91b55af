//! Register scoreboard: architectural values plus validity tracking.
//!
//! Each of the 32 architectural registers carries its value, a valid bit,
//! and the tag of its most recent in-flight producer. The zero flag — read
//! by `BZ`/`BNZ` and produced by the arithmetic opcodes — follows the same
//! discipline. Decode invalidates a destination when it dispatches a writer;
//! a functional unit's final stage writes the value back and revalidates it,
//! but only when it is still the most recent producer (the last dispatched
//! producer wins the validity token).

use crate::core::pipeline::rob::{Rob, RobTag};
use crate::isa::REG_COUNT;

/// One architectural register: value, validity, and pending producer.
#[derive(Clone, Copy, Debug)]
pub struct RegEntry {
    /// Current architectural value.
    pub value: i64,
    /// False while a dispatched producer has not yet written back.
    pub valid: bool,
    /// Tag of the most recently dispatched in-flight producer.
    producer: Option<RobTag>,
}

impl Default for RegEntry {
    fn default() -> Self {
        Self {
            value: 0,
            valid: true,
            producer: None,
        }
    }
}

/// One-bit zero flag with the same validity discipline as a register.
#[derive(Clone, Copy, Debug)]
pub struct FlagEntry {
    /// True when the most recent arithmetic result was zero.
    pub set: bool,
    /// False while a dispatched arithmetic instruction has not written back.
    pub valid: bool,
    producer: Option<RobTag>,
}

impl Default for FlagEntry {
    fn default() -> Self {
        Self {
            set: false,
            valid: true,
            producer: None,
        }
    }
}

/// Per-register hazard scoreboard holding the architectural register file.
#[derive(Debug)]
pub struct Scoreboard {
    regs: [RegEntry; REG_COUNT],
    zero: FlagEntry,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Scoreboard {
    /// Creates a scoreboard with all registers zero and valid.
    pub fn new() -> Self {
        Self {
            regs: [RegEntry::default(); REG_COUNT],
            zero: FlagEntry::default(),
        }
    }

    /// Reads a register: `(value, valid)`.
    pub const fn read(&self, reg: usize) -> (i64, bool) {
        let entry = &self.regs[reg];
        (entry.value, entry.valid)
    }

    /// Marks `reg` invalid with `tag` as its pending producer.
    pub const fn invalidate(&mut self, reg: usize, tag: RobTag) {
        self.regs[reg].valid = false;
        self.regs[reg].producer = Some(tag);
    }

    /// Writes back `value` to `reg` from the instruction tagged `tag`.
    ///
    /// The write lands only when `tag` is still the most recent producer.
    /// A superseded producer's writeback is discarded outright: every reader
    /// that wanted its value captured it at dispatch, and storing it would
    /// clobber the younger producer's result.
    pub fn writeback(&mut self, reg: usize, value: i64, tag: RobTag) {
        let entry = &mut self.regs[reg];
        if entry.producer == Some(tag) {
            entry.value = value;
            entry.valid = true;
            entry.producer = None;
        }
    }

    /// Reads the zero flag: `(set, valid)`.
    pub const fn read_zero(&self) -> (bool, bool) {
        (self.zero.set, self.zero.valid)
    }

    /// Marks the zero flag invalid with `tag` as its pending producer.
    pub const fn invalidate_zero(&mut self, tag: RobTag) {
        self.zero.valid = false;
        self.zero.producer = Some(tag);
    }

    /// Writes the zero flag back from the instruction tagged `tag`.
    pub fn writeback_zero(&mut self, set: bool, tag: RobTag) {
        if self.zero.producer == Some(tag) {
            self.zero.set = set;
            self.zero.valid = true;
            self.zero.producer = None;
        }
    }

    /// Presets a register value, for initial machine state.
    pub const fn preload(&mut self, reg: usize, value: i64) {
        self.regs[reg].value = value;
        self.regs[reg].valid = true;
        self.regs[reg].producer = None;
    }

    /// Rebuilds validity after a squash.
    ///
    /// Every register (and the flag) becomes valid, then the surviving
    /// not-yet-complete ROB entries re-invalidate their destinations in
    /// program order, so the youngest surviving producer ends up holding
    /// each validity token.
    pub fn rebuild(&mut self, rob: &Rob) {
        for entry in &mut self.regs {
            entry.valid = true;
            entry.producer = None;
        }
        self.zero.valid = true;
        self.zero.producer = None;

        rob.for_each(|entry| {
            if entry.complete {
                return;
            }
            if entry.inst.opcode.writes_register() {
                self.invalidate(entry.inst.rd, entry.tag);
            }
            if entry.inst.opcode.sets_zero_flag() {
                self.invalidate_zero(entry.tag);
            }
        });
    }

    /// All register entries, for the end-of-run dump.
    pub fn entries(&self) -> &[RegEntry; REG_COUNT] {
        &self.regs
    }
}
