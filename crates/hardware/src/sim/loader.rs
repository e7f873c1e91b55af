//! Program loader.
//!
//! Reads a text program from disk and produces code memory, one instruction
//! per line in program order. A missing or unreadable file, a malformed
//! line, or an empty program is a fatal load error — the machine never
//! starts with partial state.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::common::{SimError, SimResult};
use crate::config::Config;
use crate::core::memory::CodeMemory;
use crate::isa::parse;

/// Loads a program file into code memory at the configured base PC.
pub fn load_program(path: &Path, config: &Config) -> SimResult<CodeMemory> {
    let src = fs::read_to_string(path).map_err(|source| SimError::ProgramRead {
        path: path.to_path_buf(),
        source,
    })?;
    let code = assemble(&src, config)?;
    info!(
        path = %path.display(),
        instructions = code.len(),
        "loaded program"
    );
    Ok(code)
}

/// Assembles program source into code memory (shared by loader and tests).
pub fn assemble(src: &str, config: &Config) -> SimResult<CodeMemory> {
    let instructions = parse::parse_program(src)?;
    if instructions.is_empty() {
        return Err(SimError::EmptyProgram);
    }
    Ok(CodeMemory::new(config.general.start_pc, instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_program_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "MOVC R1,#5").unwrap();
        writeln!(file, "ADD R2,R1,R1").unwrap();
        writeln!(file, "HALT").unwrap();

        let code = load_program(file.path(), &Config::default()).unwrap();
        assert_eq!(code.len(), 3);
        assert_eq!(code.base(), 4000);
        assert_eq!(code.fetch(4004).unwrap().to_string(), "ADD,R2,R1,R1");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_program(Path::new("/no/such/program.asm"), &Config::default());
        assert!(matches!(err, Err(SimError::ProgramRead { .. })));
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "MOVC R1,#5").unwrap();
        writeln!(file, "ADD R2,R1").unwrap();

        let err = load_program(file.path(), &Config::default());
        assert!(matches!(err, Err(SimError::ProgramParse { line: 2, .. })));
    }

    #[test]
    fn test_empty_program_is_fatal() {
        assert!(matches!(
            assemble("; nothing here\n", &Config::default()),
            Err(SimError::EmptyProgram)
        ));
    }
}
