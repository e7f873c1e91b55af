//! Simulation statistics collection and reporting.
//!
//! This module tracks run metrics for the simulator:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, and cycles per instruction.
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch).
//! 3. **Hazards:** Data and structural stall cycles, and taken-branch flushes.

/// Run statistics for one simulation.
#[derive(Clone, Debug, Default)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired (in-order commit count).
    pub instructions_retired: u64,

    /// ALU/move instructions retired.
    pub inst_alu: u64,
    /// Load instructions retired.
    pub inst_load: u64,
    /// Store instructions retired.
    pub inst_store: u64,
    /// Branch/jump instructions retired.
    pub inst_branch: u64,

    /// Decode cycles stalled on an invalid source operand.
    pub stalls_data: u64,
    /// Decode cycles stalled on a full IQ, LSQ, or ROB.
    pub stalls_structural: u64,
    /// Taken branches that squashed younger instructions.
    pub branch_flushes: u64,

    /// Instructions dispatched into the ROB (including squashed ones).
    pub instructions_dispatched: u64,
}

impl SimStats {
    /// Prints the end-of-run report to stdout.
    pub fn print(&self) {
        println!("---------------- Simulation Statistics ----------------");
        println!("Cycles                 : {}", self.cycles);
        println!("Instructions retired   : {}", self.instructions_retired);
        println!("Instructions dispatched: {}", self.instructions_dispatched);
        if self.instructions_retired > 0 {
            let cpi = self.cycles as f64 / self.instructions_retired as f64;
            println!("CPI                    : {cpi:.2}");
        }
        println!(
            "Mix                    : alu={} load={} store={} branch={}",
            self.inst_alu, self.inst_load, self.inst_store, self.inst_branch
        );
        println!(
            "Stalls                 : data={} structural={}",
            self.stalls_data, self.stalls_structural
        );
        println!("Branch flushes         : {}", self.branch_flushes);
    }
}
