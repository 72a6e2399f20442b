//! This crate provides the core logic for a single-tape Turing Machine interpreter.
//! It includes the tape storage model, the rule table, the step/run execution engine,
//! a parser for `.tm` program files, and a small set of built-in programs.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod rules;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the analysis entry points from the analyzer module.
pub use analyzer::{analyze, validate, AnalysisWarning};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `RuleTable` from the rules module.
pub use rules::{RuleTable, SymbolKey};
/// Re-exports the `Tape` from the tape module.
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Action, HaltReason, Instruction, MachineConfig, Phase, Program, RuleDefinition, Step,
    Symbol, TuringMachineError, DEFAULT_BLANK_SYMBOL, DEFAULT_MAX_ITERATIONS, MAX_PROGRAM_SIZE,
};
