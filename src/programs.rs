use crate::parser::parse;
use crate::types::{Program, TuringMachineError};

use std::sync::RwLock;
use tracing::error;

// Built-in programs
const PROGRAM_TEXTS: [&str; 3] = [
    include_str!("../programs/unary-addition.tm"),
    include_str!("../programs/unary-increment.tm"),
    include_str!("../programs/busy-beaver-2.tm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(load_builtin());
}

fn load_builtin() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match parse(text) {
            Ok(program) => Some(program),
            Err(e) => {
                error!(error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect()
}

fn lock_error() -> TuringMachineError {
    TuringMachineError::FileError("Failed to acquire program lock".to_string())
}

/// Registry of built-in and registered programs.
pub struct ProgramManager;

impl ProgramManager {
    /// Adds a program to the registry and returns its index.
    pub fn register(program: Program) -> Result<usize, TuringMachineError> {
        let mut programs = PROGRAMS.write().map_err(|_| lock_error())?;
        programs.push(program);
        Ok(programs.len() - 1)
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .read()
            .map_err(|_| lock_error())?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {index} out of range"))
            })
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .read()
            .map_err(|_| lock_error())?
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| TuringMachineError::ValidationError(format!("Program '{name}' not found")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .read()
            .map(|programs| programs.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            initial_state: program.start_state().unwrap_or_default().to_string(),
            initial_tape: program.initial_tape(),
            state_count: program.state_count(),
            rule_count: program.rules.len(),
            name: program.name,
        })
    }

    /// Search for programs whose name contains `query`, ignoring case
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .enumerate()
                    .filter(|(_, program)| program.name.to_lowercase().contains(&query))
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the source text of a built-in program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program text index {index} out of range"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub rule_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HaltReason;

    #[test]
    fn test_builtin_programs_load() {
        assert!(ProgramManager::get_program_count() >= PROGRAM_TEXTS.len());

        let names = ProgramManager::list_program_names();
        assert!(names.contains(&"Unary addition".to_string()));
        assert!(names.contains(&"Unary increment".to_string()));
        assert!(names.contains(&"Busy beaver 2".to_string()));
    }

    #[test]
    fn test_builtin_programs_halt_by_instruction() {
        for index in 0..PROGRAM_TEXTS.len() {
            let program = ProgramManager::get_program_by_index(index).unwrap();
            let mut machine = program.build().unwrap();

            assert_eq!(
                machine.run().unwrap(),
                HaltReason::Instruction,
                "Program '{}' did not halt by itself",
                program.name
            );
        }
    }

    #[test]
    fn test_unary_addition() {
        let program = ProgramManager::get_program_by_name("unary addition").unwrap();
        let mut machine = program.build().unwrap();

        machine.run().unwrap();
        assert_eq!(machine.tape().count('1'), 5);
        assert_eq!(machine.tape().contents(), "11111");
    }

    #[test]
    fn test_busy_beaver() {
        let program = ProgramManager::get_program_by_name("Busy beaver 2").unwrap();
        let mut machine = program.build().unwrap();

        machine.run().unwrap();
        assert_eq!(machine.step_count(), 6);
        assert_eq!(machine.tape().count('1'), 4);
        assert_eq!(machine.tape().contents(), "1111");
    }

    #[test]
    fn test_get_program_by_index_out_of_range() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_get_program_info() {
        let info = ProgramManager::get_program_info(0).unwrap();

        assert_eq!(info.index, 0);
        assert_eq!(info.name, "Unary addition");
        assert_eq!(info.initial_state, "A");
        assert_eq!(info.initial_tape, "111 11");
        assert_eq!(info.state_count, 3);
        assert_eq!(info.rule_count, 5);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_search_programs() {
        assert_eq!(ProgramManager::search_programs("UNARY"), vec![0, 1]);
        assert!(ProgramManager::search_programs("nonexistent").is_empty());
    }

    #[test]
    fn test_program_text() {
        let text = ProgramManager::get_program_text_by_index(1).unwrap();
        assert!(text.contains("name: Unary increment"));
        assert!(ProgramManager::get_program_text_by_index(99).is_err());
    }

    #[test]
    fn test_register_program() {
        let program = parse("name: Registered\ntape: 1\nrules:\n  A:\n    * -> A, H").unwrap();
        let index = ProgramManager::register(program).unwrap();

        assert_eq!(
            ProgramManager::get_program_by_index(index).unwrap().name,
            "Registered"
        );
    }
}
