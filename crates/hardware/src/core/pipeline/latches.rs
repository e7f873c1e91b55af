//! Pipeline latch entry types.
//!
//! Instructions move through the machine in three representations:
//! 1. **`FetchEntry`** — fetched but not yet dispatched (fetch and decode latches).
//! 2. **`DispatchEntry`** — dispatched with operands captured (IQ and LSQ slots).
//! 3. **`ExecEntry`** — inside a functional unit, accumulating the result and
//!    effective address as it shifts through the stages.

use crate::core::pipeline::rob::RobTag;
use crate::isa::Instruction;

/// Entry in the fetch or decode latch.
#[derive(Clone, Copy, Debug)]
pub struct FetchEntry {
    /// Program counter of the instruction.
    pub pc: u64,
    /// The fetched instruction.
    pub inst: Instruction,
}

/// A dispatched instruction waiting in the IQ or LSQ.
///
/// Operand values were read from the scoreboard at decode, so entries are
/// ready by construction and wait only for a functional-unit slot (and, in
/// the LSQ, for program order among memory operations).
#[derive(Clone, Copy, Debug)]
pub struct DispatchEntry {
    /// ROB tag assigned at dispatch; orders entries by age.
    pub tag: RobTag,
    /// Program counter of the instruction.
    pub pc: u64,
    /// The dispatched instruction.
    pub inst: Instruction,
    /// Resolved value of `rs1`.
    pub rv1: i64,
    /// Resolved value of `rs2`.
    pub rv2: i64,
    /// Resolved value of `rs3`.
    pub rv3: i64,
    /// Zero flag value captured at decode (`BZ`/`BNZ`).
    pub zero: bool,
}

/// An instruction in flight inside a functional-unit pipeline.
#[derive(Clone, Copy, Debug)]
pub struct ExecEntry {
    /// ROB tag assigned at dispatch.
    pub tag: RobTag,
    /// Program counter of the instruction.
    pub pc: u64,
    /// The executing instruction.
    pub inst: Instruction,
    /// Resolved value of `rs1`.
    pub rv1: i64,
    /// Resolved value of `rs2`.
    pub rv2: i64,
    /// Zero flag value captured at decode.
    pub zero: bool,
    /// Result buffer: computed value, or loaded data for loads.
    pub result: i64,
    /// Effective address for memory operations.
    pub mem_address: i64,
}

impl ExecEntry {
    /// Builds a unit entry from an issued queue entry.
    pub const fn from_dispatch(entry: DispatchEntry, mem_address: i64) -> Self {
        Self {
            tag: entry.tag,
            pc: entry.pc,
            inst: entry.inst,
            rv1: entry.rv1,
            rv2: entry.rv2,
            zero: entry.zero,
            result: 0,
            mem_address,
        }
    }
}
