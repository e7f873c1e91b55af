//! Fetch stage: pulls the next instruction into the fetch latch.
//!
//! Fetch is the sole producer of new instructions. Each cycle, if its latch
//! is free, no halt has been decoded, and the PC is inside code memory, it
//! loads the instruction at the PC and advances the PC. The fetched entry
//! moves on to decode only when the decode latch is free; otherwise it is
//! held back and no further instruction is fetched.

use tracing::trace;

use crate::config::defaults::INSTRUCTION_SIZE;
use crate::core::Machine;
use crate::core::pipeline::latches::FetchEntry;

/// Executes the fetch stage for one cycle.
pub fn fetch_stage(
    m: &mut Machine,
    fetch_latch: &mut Option<FetchEntry>,
    decode_latch: &mut Option<FetchEntry>,
    halt_seen: bool,
) {
    if fetch_latch.is_none() && !halt_seen {
        if let Some(inst) = m.code.fetch(m.pc) {
            *fetch_latch = Some(FetchEntry { pc: m.pc, inst });
            trace!(pc = m.pc, "fetch");
            m.pc += INSTRUCTION_SIZE;
        }
    }

    if m.trace && let Some(entry) = fetch_latch.as_ref() {
        println!("{:<15}: pc({}) {}", "Fetch", entry.pc, entry.inst);
    }

    if decode_latch.is_none()
        && let Some(entry) = fetch_latch.take()
    {
        *decode_latch = Some(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::memory::CodeMemory;
    use crate::isa::parse::parse_program;

    fn machine(src: &str) -> Machine {
        let program = parse_program(src).unwrap();
        Machine::new(CodeMemory::new(4000, program), &Config::default())
    }

    #[test]
    fn test_fetch_advances_pc_and_hands_off() {
        let mut m = machine("MOVC R1,#5\nHALT\n");
        let mut fetch = None;
        let mut decode = None;

        fetch_stage(&mut m, &mut fetch, &mut decode, false);
        assert_eq!(m.pc, 4004);
        assert!(fetch.is_none());
        assert_eq!(decode.map(|e| e.pc), Some(4000));
    }

    #[test]
    fn test_fetch_holds_while_decode_occupied() {
        let mut m = machine("MOVC R1,#5\nMOVC R2,#6\nHALT\n");
        let mut fetch = None;
        let mut decode = None;

        fetch_stage(&mut m, &mut fetch, &mut decode, false);
        // Decode still holds the first instruction: the second is fetched
        // once, then held — the PC must not advance again.
        fetch_stage(&mut m, &mut fetch, &mut decode, false);
        assert_eq!(m.pc, 4008);
        assert_eq!(fetch.map(|e| e.pc), Some(4004));

        fetch_stage(&mut m, &mut fetch, &mut decode, false);
        assert_eq!(m.pc, 4008);
        assert_eq!(fetch.map(|e| e.pc), Some(4004));
    }

    #[test]
    fn test_halt_gates_fetch() {
        let mut m = machine("MOVC R1,#5\nMOVC R2,#6\n");
        let mut fetch = None;
        let mut decode = None;

        fetch_stage(&mut m, &mut fetch, &mut decode, true);
        assert_eq!(m.pc, 4000);
        assert!(fetch.is_none());
        assert!(decode.is_none());
    }

    #[test]
    fn test_fetch_stops_past_end_of_code() {
        let mut m = machine("MOVC R1,#5\n");
        let mut fetch = None;
        let mut decode = None;

        fetch_stage(&mut m, &mut fetch, &mut decode, false);
        let mut decode2 = None;
        fetch_stage(&mut m, &mut fetch, &mut decode2, false);
        assert_eq!(m.pc, 4004);
        assert!(fetch.is_none());
        assert!(decode2.is_none());
    }
}
