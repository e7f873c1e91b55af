//! Functional unit pipelines.
//!
//! Three independent fixed-depth shift registers:
//! 1. **Integer** (2 stages): arithmetic/logic/moves; resolves branches in stage 1.
//! 2. **Multiply** (3 stages): result computed in stage 1 and carried through.
//! 3. **Memory** (3 stages): address check, access latency, then the data memory access.
//!
//! A unit never stalls internally: each stage unconditionally forwards its
//! latch every cycle, and the final stage performs the scoreboard writeback
//! and marks the ROB entry complete.

pub mod int;
pub mod mem;
pub mod mul;

pub use int::{IntOutcome, IntUnit, Redirect};
pub use mem::MemUnit;
pub use mul::MulUnit;
