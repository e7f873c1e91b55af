//! Cycle-level out-of-order processor simulator library.
//!
//! This crate models a small out-of-order superscalar machine, one fully
//! ordered cycle at a time:
//! 1. **Core:** Machine state, pipeline latches, scoreboard, IQ/LSQ, reorder buffer, and functional units.
//! 2. **ISA:** A fixed teaching instruction set (arithmetic, memory, branch, move) with a text assembler.
//! 3. **Simulation:** Program loader, clock driver, and end-of-run state dump.
//! 4. **Configuration and statistics:** JSON-configurable capacities and per-run metrics.

/// Common types (errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Machine state and the execution pipeline.
pub mod core;
/// Instruction set (opcodes, parsing, disassembly).
pub mod isa;
/// Program loading and the run loop.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Architectural machine state.
pub use crate::core::Machine;
/// Fatal error type for loading and simulation.
pub use crate::common::SimError;
/// Top-level simulator; owns the machine and the pipeline.
pub use crate::sim::simulator::Simulator;
