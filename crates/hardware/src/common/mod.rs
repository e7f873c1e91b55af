//! Common types shared across the simulator.

pub mod error;

pub use error::{SimError, SimResult};
