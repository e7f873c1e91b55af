//! Text program parser.
//!
//! Programs are line-oriented: one instruction per line, a mnemonic followed
//! by comma- or whitespace-separated operands. Register operands are written
//! `R<n>`, literals `#<signed>` (the `#` is optional). Blank lines and lines
//! starting with `;` or `//` are skipped.

use crate::common::{SimError, SimResult};
use crate::isa::{Instruction, Opcode, REG_COUNT};

/// Operand positions expected by an opcode, in source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operand {
    Rd,
    Rs1,
    Rs2,
    Rs3,
    Imm,
}

/// The operand shape for each opcode, in the order operands appear in text.
const fn shape(opcode: Opcode) -> &'static [Operand] {
    use Operand::{Imm, Rd, Rs1, Rs2, Rs3};
    match opcode {
        Opcode::Movc => &[Rd, Imm],
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::And | Opcode::Or | Opcode::Xor => {
            &[Rd, Rs1, Rs2]
        }
        Opcode::Addl | Opcode::Subl | Opcode::Load => &[Rd, Rs1, Imm],
        Opcode::Ldr => &[Rd, Rs1, Rs2],
        Opcode::Store => &[Rs1, Rs2, Imm],
        Opcode::Str => &[Rs1, Rs2, Rs3],
        Opcode::Bz | Opcode::Bnz => &[Imm],
        Opcode::Jump => &[Rs1, Imm],
        Opcode::Halt => &[],
    }
}

/// Parses a whole program source into instructions, preserving line order.
pub fn parse_program(src: &str) -> SimResult<Vec<Instruction>> {
    let mut program = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        if let Some(inst) = parse_line(raw, line)? {
            program.push(inst);
        }
    }
    Ok(program)
}

/// Parses a single line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(raw: &str, line: usize) -> SimResult<Option<Instruction>> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with(';') || text.starts_with("//") {
        return Ok(None);
    }

    let mut tokens = text.split(|c: char| c == ',' || c.is_whitespace());
    let mnemonic = match tokens.next() {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(None),
    };
    let operands: Vec<&str> = tokens.filter(|t| !t.is_empty()).collect();

    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| SimError::ProgramParse {
        line,
        reason: format!("unknown mnemonic '{mnemonic}'"),
    })?;

    let expected = shape(opcode);
    if operands.len() != expected.len() {
        return Err(SimError::ProgramParse {
            line,
            reason: format!(
                "{} expects {} operand(s), found {}",
                opcode.mnemonic(),
                expected.len(),
                operands.len()
            ),
        });
    }

    let mut inst = Instruction {
        opcode,
        rd: 0,
        rs1: 0,
        rs2: 0,
        rs3: 0,
        imm: 0,
    };

    for (slot, token) in expected.iter().zip(&operands) {
        match slot {
            Operand::Imm => inst.imm = parse_literal(token, line)?,
            Operand::Rd => inst.rd = parse_register(token, line)?,
            Operand::Rs1 => inst.rs1 = parse_register(token, line)?,
            Operand::Rs2 => inst.rs2 = parse_register(token, line)?,
            Operand::Rs3 => inst.rs3 = parse_register(token, line)?,
        }
    }

    Ok(Some(inst))
}

/// Parses a register operand `R<n>` and range-checks the index.
fn parse_register(token: &str, line: usize) -> SimResult<usize> {
    let digits = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(|| SimError::ProgramParse {
            line,
            reason: format!("expected register operand, found '{token}'"),
        })?;

    let index: i64 = digits.parse().map_err(|_| SimError::ProgramParse {
        line,
        reason: format!("malformed register operand '{token}'"),
    })?;

    if index < 0 || index as usize >= REG_COUNT {
        return Err(SimError::RegisterOutOfRange {
            line,
            index,
            count: REG_COUNT,
        });
    }
    Ok(index as usize)
}

/// Parses a literal operand, with or without a leading `#`.
fn parse_literal(token: &str, line: usize) -> SimResult<i64> {
    let digits = token.strip_prefix('#').unwrap_or(token);
    digits.parse().map_err(|_| SimError::ProgramParse {
        line,
        reason: format!("malformed literal operand '{token}'"),
    })
}
