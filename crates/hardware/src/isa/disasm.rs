//! Instruction disassembler.
//!
//! Renders a decoded instruction back into its assembly-text form. The output
//! string is used for stage dumps, logging, and test diagnostics.

use std::fmt;

use crate::isa::{Instruction, Opcode};

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Movc => write!(f, "MOVC,R{},#{}", self.rd, self.imm),
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::And | Opcode::Or | Opcode::Xor => {
                write!(
                    f,
                    "{},R{},R{},R{}",
                    self.opcode.mnemonic(),
                    self.rd,
                    self.rs1,
                    self.rs2
                )
            }
            Opcode::Addl | Opcode::Subl => write!(
                f,
                "{},R{},R{},#{}",
                self.opcode.mnemonic(),
                self.rd,
                self.rs1,
                self.imm
            ),
            Opcode::Load => write!(f, "LOAD,R{},R{},#{}", self.rd, self.rs1, self.imm),
            Opcode::Ldr => write!(f, "LDR,R{},R{},R{}", self.rd, self.rs1, self.rs2),
            Opcode::Store => write!(f, "STORE,R{},R{},#{}", self.rs1, self.rs2, self.imm),
            Opcode::Str => write!(f, "STR,R{},R{},R{}", self.rs1, self.rs2, self.rs3),
            Opcode::Bz | Opcode::Bnz => {
                write!(f, "{},#{}", self.opcode.mnemonic(), self.imm)
            }
            Opcode::Jump => write!(f, "JUMP,R{},#{}", self.rs1, self.imm),
            Opcode::Halt => write!(f, "HALT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::parse::parse_line;

    #[test]
    fn test_disasm_round_trip() {
        for text in [
            "MOVC,R1,#5",
            "ADD,R2,R1,R1",
            "SUBL,R4,R2,#-3",
            "EX-OR,R6,R5,R4",
            "LOAD,R3,R0,#4",
            "STORE,R1,R2,#0",
            "STR,R7,R8,R9",
            "BZ,#-8",
            "BNZ,#12",
            "JUMP,R5,#0",
            "HALT",
        ] {
            let inst = parse_line(text, 1).unwrap().unwrap();
            assert_eq!(inst.to_string(), text);
        }
    }
}
