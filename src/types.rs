//! This module defines the core data structures and types used throughout the Turing Machine
//! interpreter, including instructions, actions, execution results, configuration, and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::machine::TuringMachine;
use crate::tape::Tape;
use crate::Rule;

/// A single tape symbol.
pub type Symbol = char;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: Symbol = ' ';
/// A special input symbol used in program definitions to represent the blank symbol.
pub const INPUT_BLANK_SYMBOL: Symbol = '_';
/// The default number of steps a machine may execute before it is stopped.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// The maximum allowed size for a program text in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// A Turing Machine program: initial tape, machine settings, and transition rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The initial state. When `None`, the origin state of the first rule is used.
    pub initial_state: Option<String>,
    /// The initial tape content, starting at position 0.
    pub tape: Vec<Symbol>,
    /// The initial head position, as an index into `tape`.
    pub head: usize,
    /// The blank symbol used on the tape.
    pub blank: Symbol,
    /// Safety bound on the number of executed steps.
    pub max_iterations: usize,
    /// Transition rules in declaration order.
    pub rules: Vec<RuleDefinition>,
}

/// A single rule declaration of a program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDefinition {
    /// The origin state.
    pub state: String,
    /// The symbols this rule reads. Empty means any symbol.
    pub symbols: Vec<Symbol>,
    /// The state entered after the instructions are applied.
    pub next_state: String,
    /// The instructions applied to the tape.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Returns the initial tape content as a `String`.
    pub fn initial_tape(&self) -> String {
        self.tape.iter().collect()
    }

    /// Returns the initial state, falling back to the origin of the first rule.
    pub fn start_state(&self) -> Option<&str> {
        self.initial_state
            .as_deref()
            .or_else(|| self.rules.first().map(|rule| rule.state.as_str()))
    }

    /// Returns the number of distinct origin states.
    pub fn state_count(&self) -> usize {
        self.rules
            .iter()
            .map(|rule| rule.state.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Returns the machine settings declared by this program.
    pub fn config(&self) -> MachineConfig {
        MachineConfig {
            initial_state: self.initial_state.clone(),
            max_iterations: self.max_iterations,
            blank: self.blank,
        }
    }

    /// Replaces the initial tape. The input blank symbol `_` is rewritten to the program's
    /// blank and the head is reset to position 0.
    pub fn with_tape(mut self, content: &str) -> Self {
        let blank = self.blank;
        self.tape = content
            .chars()
            .map(|c| if c == INPUT_BLANK_SYMBOL { blank } else { c })
            .collect();
        self.head = 0;
        self
    }

    /// Builds a finalized machine with the rules registered and the tape seeded.
    pub fn build(&self) -> Result<TuringMachine, TuringMachineError> {
        self.build_with(self.config())
    }

    /// Like `build`, with explicit machine settings.
    pub fn build_with(&self, config: MachineConfig) -> Result<TuringMachine, TuringMachineError> {
        let mut machine = TuringMachine::new(config);
        for rule in &self.rules {
            machine.add_rule(
                &rule.state,
                &rule.symbols,
                &rule.next_state,
                rule.instructions.clone(),
            )?;
        }

        let mut tape = Tape::from_symbols(self.tape.iter().copied(), self.blank);
        tape.move_right(self.head);
        machine.load_tape(tape)?;
        machine.finalize()?;

        Ok(machine)
    }
}

/// A primitive operation applied to the tape when a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Move the head one cell to the left.
    MoveLeft,
    /// Move the head one cell to the right.
    MoveRight,
    /// Overwrite the cell under the head.
    Write(Symbol),
    /// Stop the machine.
    Halt,
}

impl Instruction {
    /// Parses a single instruction token.
    ///
    /// Accepted tokens are `L`/`<`, `R`/`>`, `H`, and `P<symbol>`. The input blank
    /// symbol `_` (and a bare `P`) write `blank`.
    ///
    /// # Returns
    ///
    /// * `Ok(Instruction)` for a recognized token.
    /// * `Err(TuringMachineError::UndefinedInstruction)` otherwise.
    pub fn parse(token: &str, blank: Symbol) -> Result<Self, TuringMachineError> {
        match token {
            "L" | "<" => return Ok(Instruction::MoveLeft),
            "R" | ">" => return Ok(Instruction::MoveRight),
            "H" => return Ok(Instruction::Halt),
            "P" => return Ok(Instruction::Write(blank)),
            _ => {}
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('P'), Some(INPUT_BLANK_SYMBOL), None) => Ok(Instruction::Write(blank)),
            (Some('P'), Some(symbol), None) => Ok(Instruction::Write(symbol)),
            _ => Err(TuringMachineError::UndefinedInstruction(token.to_string())),
        }
    }

    /// Parses a `;`-separated instruction sequence such as `P1;R`.
    ///
    /// Tokens are trimmed of surrounding whitespace; empty tokens are skipped.
    pub fn parse_sequence(text: &str, blank: Symbol) -> Result<Vec<Self>, TuringMachineError> {
        text.split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Self::parse(token, blank))
            .collect()
    }
}

/// The outcome of a rule match: where to go next and what to do to the tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The state the machine moves into after applying the instructions.
    pub next_state: String,
    /// The ordered, non-empty instruction sequence.
    pub instructions: Vec<Instruction>,
}

impl Action {
    /// Returns true if any instruction of this action halts the machine.
    pub fn halts(&self) -> bool {
        self.instructions.contains(&Instruction::Halt)
    }
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// A rule executed a `Halt` instruction.
    Instruction,
    /// The step counter reached the configured maximum.
    IterationLimit,
}

/// Represents the outcome of a Turing Machine execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and can continue.
    Continue,
    /// The machine is halted.
    Halt(HaltReason),
}

/// Lifecycle phase of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Rules may still be added.
    Configurable,
    /// Validation passed; configuration is locked.
    Finalized,
    /// At least one step has been executed.
    Running,
    /// Terminal.
    Halted,
}

/// Construction-time settings of a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Initial state; when absent the origin state of the first rule is used.
    pub initial_state: Option<String>,
    /// Safety bound on the number of executed steps.
    pub max_iterations: usize,
    /// Fill symbol for unwritten cells.
    pub blank: Symbol,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            initial_state: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            blank: DEFAULT_BLANK_SYMBOL,
        }
    }
}

impl MachineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, TuringMachineError> {
        serde_json::from_str(input)
            .map_err(|e| TuringMachineError::ValidationError(format!("Invalid configuration: {e}")))
    }

    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_blank(mut self, blank: Symbol) -> Self {
        self.blank = blank;
        self
    }
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// A rule was added after the machine was finalized.
    #[error("Machine configuration already finalized")]
    ConfigurationLocked,
    /// States are used as transition targets but have no rules of their own.
    #[error("Machine configuration error: state(s) used but not defined {states:?}")]
    ConfigurationError { states: Vec<String> },
    /// No rule was added and no initial state was configured.
    #[error("Machine configuration error: no initial state")]
    MissingInitialState,
    /// The machine was stepped before `finalize()`.
    #[error("Machine configuration has not been finalized")]
    NotFinalized,
    /// A rule was registered without instructions.
    #[error("Rule for state {0} has no instructions")]
    EmptyInstructions(String),
    /// A lookup was made for a state without rules.
    #[error("Undefined state {0}")]
    UndefinedState(String),
    /// Neither an exact nor a wildcard rule matches.
    #[error("Undefined symbol {symbol:?} in state {state}")]
    UndefinedTransition { state: String, symbol: Symbol },
    /// An instruction token outside the recognized set.
    #[error("Undefined instruction: {0}")]
    UndefinedInstruction(String),
    /// Indicates an error during the parsing of a program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instruction_tokens() {
        assert_eq!(Instruction::parse("L", ' ').unwrap(), Instruction::MoveLeft);
        assert_eq!(Instruction::parse("<", ' ').unwrap(), Instruction::MoveLeft);
        assert_eq!(Instruction::parse("R", ' ').unwrap(), Instruction::MoveRight);
        assert_eq!(Instruction::parse("H", ' ').unwrap(), Instruction::Halt);
        assert_eq!(Instruction::parse("P1", ' ').unwrap(), Instruction::Write('1'));
        assert_eq!(Instruction::parse("P_", '0').unwrap(), Instruction::Write('0'));
        assert_eq!(Instruction::parse("P", '0').unwrap(), Instruction::Write('0'));
    }

    #[test]
    fn test_parse_undefined_instruction() {
        let error = Instruction::parse("X", ' ').unwrap_err();
        assert_eq!(error, TuringMachineError::UndefinedInstruction("X".into()));

        let error = Instruction::parse("P12", ' ').unwrap_err();
        assert!(matches!(error, TuringMachineError::UndefinedInstruction(_)));
    }

    #[test]
    fn test_parse_sequence() {
        let instructions = Instruction::parse_sequence("P1; R", ' ').unwrap();
        assert_eq!(
            instructions,
            vec![Instruction::Write('1'), Instruction::MoveRight]
        );

        // A bare `P` followed by a space is how the blank is written in compact notation.
        let instructions = Instruction::parse_sequence("P ;H", ' ').unwrap();
        assert_eq!(instructions, vec![Instruction::Write(' '), Instruction::Halt]);

        assert!(Instruction::parse_sequence("R;Q", ' ').is_err());
    }

    #[test]
    fn test_instruction_serialization() {
        let json = serde_json::to_string(&Instruction::Write('x')).unwrap();
        assert_eq!(json, r#"{"Write":"x"}"#);

        let decoded: Instruction = serde_json::from_str("\"MoveLeft\"").unwrap();
        assert_eq!(decoded, Instruction::MoveLeft);
    }

    #[test]
    fn test_action_halts() {
        let action = Action {
            next_state: "A".into(),
            instructions: vec![Instruction::Write('1'), Instruction::Halt],
        };
        assert!(action.halts());

        let action = Action {
            next_state: "A".into(),
            instructions: vec![Instruction::MoveRight],
        };
        assert!(!action.halts());
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config = MachineConfig::from_json(r#"{"max_iterations": 5}"#).unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.blank, DEFAULT_BLANK_SYMBOL);
        assert_eq!(config.initial_state, None);

        let config = MachineConfig::from_json("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
        assert_eq!(config.max_iterations, 100);

        assert!(MachineConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::UndefinedTransition {
            state: "A".to_string(),
            symbol: ' ',
        };
        assert_eq!(error.to_string(), "Undefined symbol ' ' in state A");

        let error = TuringMachineError::ConfigurationError {
            states: vec!["B".to_string()],
        };
        assert!(error.to_string().contains("\"B\""));
    }
}
