//! Code and data memory.
//!
//! Code memory is an immutable, ordered sequence of decoded instructions
//! addressed by PC (`index = (pc - base) / instruction size`). Data memory is
//! a flat array of signed words addressed by word index; out-of-range
//! addresses are a fatal simulation error, never wrapped.

use crate::common::{SimError, SimResult};
use crate::config::defaults::INSTRUCTION_SIZE;
use crate::isa::Instruction;

/// Immutable instruction store addressed by PC.
#[derive(Debug, Clone)]
pub struct CodeMemory {
    base: u64,
    instructions: Vec<Instruction>,
}

impl CodeMemory {
    /// Creates code memory with the given base PC and program.
    pub fn new(base: u64, instructions: Vec<Instruction>) -> Self {
        Self { base, instructions }
    }

    /// Returns the instruction at `pc`, or `None` when `pc` is outside the program.
    pub fn fetch(&self, pc: u64) -> Option<Instruction> {
        if pc < self.base || (pc - self.base) % INSTRUCTION_SIZE != 0 {
            return None;
        }
        let index = ((pc - self.base) / INSTRUCTION_SIZE) as usize;
        self.instructions.get(index).copied()
    }

    /// The PC of the first instruction.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// The first PC past the end of the program.
    pub fn end_pc(&self) -> u64 {
        self.base + self.instructions.len() as u64 * INSTRUCTION_SIZE
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program is empty.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

/// Flat word-addressed data memory.
#[derive(Debug, Clone)]
pub struct DataMemory {
    words: Vec<i64>,
}

impl DataMemory {
    /// Creates zeroed data memory with `words` cells.
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    /// Bounds-checks an effective address computed at `pc`.
    pub fn check(&self, pc: u64, address: i64) -> SimResult<usize> {
        if address < 0 || address as usize >= self.words.len() {
            return Err(SimError::MemoryFault {
                pc,
                address,
                words: self.words.len(),
            });
        }
        Ok(address as usize)
    }

    /// Reads the word at `address`.
    pub fn read(&self, pc: u64, address: i64) -> SimResult<i64> {
        let index = self.check(pc, address)?;
        Ok(self.words[index])
    }

    /// Writes the word at `address`.
    pub fn write(&mut self, pc: u64, address: i64, value: i64) -> SimResult<()> {
        let index = self.check(pc, address)?;
        self.words[index] = value;
        Ok(())
    }

    /// Presets a cell, for initial machine state. Panics on a bad index.
    pub fn preload(&mut self, address: usize, value: i64) {
        self.words[address] = value;
    }

    /// All memory cells, for the end-of-run dump.
    pub fn words(&self) -> &[i64] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Opcode;

    fn nop() -> Instruction {
        Instruction {
            opcode: Opcode::Halt,
            rd: 0,
            rs1: 0,
            rs2: 0,
            rs3: 0,
            imm: 0,
        }
    }

    #[test]
    fn test_code_pc_mapping() {
        let code = CodeMemory::new(4000, vec![nop(), nop(), nop()]);
        assert!(code.fetch(4000).is_some());
        assert!(code.fetch(4008).is_some());
        assert!(code.fetch(4012).is_none());
        assert!(code.fetch(3996).is_none());
        assert!(code.fetch(4002).is_none());
        assert_eq!(code.end_pc(), 4012);
    }

    #[test]
    fn test_data_memory_round_trip() {
        let mut dmem = DataMemory::new(16);
        dmem.write(4000, 4, 7).unwrap();
        assert_eq!(dmem.read(4000, 4).unwrap(), 7);
        assert_eq!(dmem.read(4000, 5).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_is_fatal() {
        let mut dmem = DataMemory::new(16);
        assert!(matches!(
            dmem.read(4004, 16),
            Err(SimError::MemoryFault {
                pc: 4004,
                address: 16,
                words: 16
            })
        ));
        assert!(dmem.write(4008, -1, 3).is_err());
    }
}
