//! This module provides the `ProgramLoader` struct, responsible for loading `.tm` programs
//! from files, strings, and directories.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of program files.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` loads programs from individual files, from string content, and from
/// every `.tm` file of a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is read, parsed, and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    /// * Any error of [`parse`] for invalid content.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let metadata = fs::metadata(path).map_err(|e| file_error(path, e))?;
        if metadata.len() > MAX_PROGRAM_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} exceeds maximum program size of {} bytes",
                path.display(),
                MAX_PROGRAM_SIZE
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| file_error(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "loading program");

        parse(&content)
    }

    /// Loads a single program from string content, e.g. piped input.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads every `.tm` file of a directory, sorted by path.
    ///
    /// Sub-directories and other files are skipped. A file that fails to load yields an
    /// `Err(TuringMachineError::FileError)` naming the file, without stopping the others.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) if is_program_file(&entry.path()) => paths.push(entry.path()),
                Ok(entry) => debug!(path = %entry.path().display(), "skipping"),
                Err(e) => results.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {e}"
                )))),
            }
        }

        paths.sort();
        results.extend(paths.into_iter().map(|path| {
            Self::load_program(&path)
                .map(|program| (path.clone(), program))
                .map_err(|e| {
                    TuringMachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    ))
                })
        }));

        results
    }
}

fn is_program_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION)
}

fn file_error(path: &Path, e: std::io::Error) -> TuringMachineError {
    TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
}
