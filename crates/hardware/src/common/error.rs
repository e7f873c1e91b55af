//! Error definitions for the simulator.
//!
//! Only two things can go wrong fatally in a run:
//! 1. **Load errors:** the program file is missing, unreadable, or malformed.
//! 2. **Memory faults:** a load or store computes an address outside data memory.
//!
//! Hazards (data or structural) are never errors — they are resolved locally
//! by stalling the stage that detected them and are invisible to callers.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator.
#[derive(Error, Debug)]
pub enum SimError {
    /// The program file could not be read from disk.
    #[error("failed to read program file '{path}': {source}")]
    ProgramRead {
        /// Path of the program file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A program line could not be parsed into an instruction.
    #[error("line {line}: {reason}")]
    ProgramParse {
        /// One-based line number in the program file.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A register operand names a register the machine does not have.
    #[error("line {line}: register R{index} out of range (machine has {count} registers)")]
    RegisterOutOfRange {
        /// One-based line number in the program file.
        line: usize,
        /// The offending register index.
        index: i64,
        /// Number of architectural registers.
        count: usize,
    },

    /// The program file contained no instructions.
    #[error("program file contains no instructions")]
    EmptyProgram,

    /// A memory instruction computed an address outside data memory.
    #[error("memory fault at pc {pc}: address {address} outside data memory (0..{words})")]
    MemoryFault {
        /// PC of the faulting instruction.
        pc: u64,
        /// The computed effective address.
        address: i64,
        /// Size of data memory in words.
        words: usize,
    },

    /// The configuration file was invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Type alias for `Result` with [`SimError`].
pub type SimResult<T> = Result<T, SimError>;
