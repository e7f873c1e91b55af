//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! machine. It provides:
//! 1. **Defaults:** Baseline hardware constants (code base, queue capacities, memory size).
//! 2. **Structures:** Hierarchical config for general, pipeline, and memory settings.
//!
//! Configuration is supplied via JSON (`serde`) or `Config::default()` for the CLI.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values reproduce the reference machine and apply when not
/// explicitly overridden in a JSON configuration file.
pub mod defaults {
    /// Program counter of the first instruction in code memory.
    pub const CODE_BASE: u64 = 4000;

    /// Size of one instruction in PC units.
    ///
    /// Code memory index for a PC is `(pc - CODE_BASE) / INSTRUCTION_SIZE`.
    pub const INSTRUCTION_SIZE: u64 = 4;

    /// Issue queue capacity (pending non-memory instructions).
    pub const IQ_SIZE: usize = 8;

    /// Load-store queue capacity (pending memory instructions).
    pub const LSQ_SIZE: usize = 6;

    /// Reorder buffer capacity (all in-flight instructions).
    pub const ROB_SIZE: usize = 12;

    /// Data memory size in words. Addresses are word indices.
    pub const DATA_WORDS: usize = 4096;
}

/// Root configuration for a simulation run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Queue and buffer capacities.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Data memory geometry.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// PC of the first instruction; code memory is laid out from here.
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u64,

    /// Print the per-cycle stage dump to stdout (the CLI `display` mode).
    #[serde(default)]
    pub trace_stages: bool,

    /// Stop after this many cycles even if the machine has not terminated.
    #[serde(default)]
    pub cycle_limit: Option<u64>,
}

impl GeneralConfig {
    /// Returns the default starting program counter.
    const fn default_start_pc() -> u64 {
        defaults::CODE_BASE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_pc: defaults::CODE_BASE,
            trace_stages: false,
            cycle_limit: None,
        }
    }
}

/// Queue and buffer capacities.
///
/// All three are structural resources: dispatch stalls when the needed
/// queue has no free slot.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Issue queue capacity.
    #[serde(default = "PipelineConfig::default_iq_size")]
    pub iq_size: usize,

    /// Load-store queue capacity.
    #[serde(default = "PipelineConfig::default_lsq_size")]
    pub lsq_size: usize,

    /// Reorder buffer capacity.
    #[serde(default = "PipelineConfig::default_rob_size")]
    pub rob_size: usize,
}

impl PipelineConfig {
    const fn default_iq_size() -> usize {
        defaults::IQ_SIZE
    }

    const fn default_lsq_size() -> usize {
        defaults::LSQ_SIZE
    }

    const fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            iq_size: defaults::IQ_SIZE,
            lsq_size: defaults::LSQ_SIZE,
            rob_size: defaults::ROB_SIZE,
        }
    }
}

/// Data memory geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Number of data memory words.
    #[serde(default = "MemoryConfig::default_data_words")]
    pub data_words: usize,
}

impl MemoryConfig {
    const fn default_data_words() -> usize {
        defaults::DATA_WORDS
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_words: defaults::DATA_WORDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_machine() {
        let config = Config::default();
        assert_eq!(config.general.start_pc, 4000);
        assert_eq!(config.pipeline.iq_size, 8);
        assert_eq!(config.pipeline.lsq_size, 6);
        assert_eq!(config.pipeline.rob_size, 12);
        assert_eq!(config.memory.data_words, 4096);
        assert_eq!(config.general.cycle_limit, None);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: Config =
            serde_json::from_str(r#"{"pipeline": {"lsq_size": 2}, "general": {"cycle_limit": 50}}"#)
                .unwrap();
        assert_eq!(config.pipeline.lsq_size, 2);
        assert_eq!(config.pipeline.iq_size, 8);
        assert_eq!(config.general.cycle_limit, Some(50));
        assert_eq!(config.memory.data_words, 4096);
    }
}
