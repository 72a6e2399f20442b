//! This module defines the `TuringMachine` struct, which drives a single-tape Turing Machine.
//! It owns the rule table and the tape, enforces the configure/finalize/run lifecycle, and
//! executes rules one step at a time.

use crate::analyzer::{analyze, validate, AnalysisWarning};
use crate::rules::RuleTable;
use crate::tape::Tape;
use crate::types::{
    HaltReason, Instruction, MachineConfig, Phase, Step, Symbol, TuringMachineError,
};
use tracing::{debug, info, warn};

/// A single-tape, single-head Turing Machine.
///
/// Rules are added while the machine is configurable. `finalize()` validates and locks the
/// configuration, after which `step()` and `run()` execute the program until a `Halt`
/// instruction or the iteration bound stops it.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    state: Option<String>,
    initial_state: Option<String>,
    rules: RuleTable,
    tape: Tape,
    phase: Phase,
    step_count: usize,
    max_iterations: usize,
    halt_reason: Option<HaltReason>,
    warnings: Vec<AnalysisWarning>,
}

impl Default for TuringMachine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl TuringMachine {
    /// Creates a configurable machine with an empty tape.
    pub fn new(config: MachineConfig) -> Self {
        Self {
            state: config.initial_state.clone(),
            initial_state: config.initial_state,
            rules: RuleTable::new(),
            tape: Tape::new(config.blank),
            phase: Phase::Configurable,
            step_count: 0,
            max_iterations: config.max_iterations,
            halt_reason: None,
            warnings: Vec::new(),
        }
    }

    /// Adds a rule: in `state`, reading any of `symbols` (any symbol if empty), apply
    /// `instructions` and move to `next_state`.
    ///
    /// The origin of the first rule becomes the initial state unless one was configured.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::ConfigurationLocked)` once the machine is finalized.
    /// * `Err(TuringMachineError::EmptyInstructions)` if `instructions` is empty.
    pub fn add_rule(
        &mut self,
        state: &str,
        symbols: &[Symbol],
        next_state: &str,
        instructions: Vec<Instruction>,
    ) -> Result<(), TuringMachineError> {
        if self.phase != Phase::Configurable {
            return Err(TuringMachineError::ConfigurationLocked);
        }

        self.rules.add_rule(state, symbols, next_state, instructions)?;

        if self.initial_state.is_none() {
            self.initial_state = Some(state.to_string());
            self.state = Some(state.to_string());
        }

        Ok(())
    }

    /// Validates the configuration and locks it.
    ///
    /// Soft analysis findings are logged and kept in `warnings()`.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::ConfigurationLocked)` if already finalized.
    /// * `Err(TuringMachineError::MissingInitialState)` if there is no initial state.
    /// * `Err(TuringMachineError::ConfigurationError)` listing undefined states.
    pub fn finalize(&mut self) -> Result<(), TuringMachineError> {
        if self.phase != Phase::Configurable {
            return Err(TuringMachineError::ConfigurationLocked);
        }

        let initial_state = self
            .initial_state
            .as_deref()
            .ok_or(TuringMachineError::MissingInitialState)?;

        validate(&self.rules, initial_state)?;

        self.warnings = analyze(&self.rules, initial_state, &self.tape);
        for warning in &self.warnings {
            warn!(%warning, "machine analysis");
        }

        debug!(
            initial_state,
            rules = self.rules.rule_count(),
            max_iterations = self.max_iterations,
            "machine finalized"
        );
        self.phase = Phase::Finalized;

        Ok(())
    }

    /// Executes a single step.
    ///
    /// A halted machine returns `Step::Halt` again without doing anything. Before a rule is
    /// consulted, a machine whose step count reached `max_iterations` halts with
    /// `HaltReason::IterationLimit`. An action starting with `Halt` halts without touching
    /// the tape, state, or step count; a `Halt` later in the sequence ends the step after the
    /// preceding instructions were applied.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine can continue.
    /// * `Ok(Step::Halt(_))` if the machine is halted.
    /// * `Err(TuringMachineError::NotFinalized)` before `finalize()`.
    /// * `Err(TuringMachineError::UndefinedState | UndefinedTransition)` from the rule lookup.
    pub fn step(&mut self) -> Result<Step, TuringMachineError> {
        match self.phase {
            Phase::Halted => {
                return Ok(Step::Halt(
                    self.halt_reason.unwrap_or(HaltReason::Instruction),
                ))
            }
            Phase::Configurable => return Err(TuringMachineError::NotFinalized),
            Phase::Finalized | Phase::Running => {}
        }

        if self.step_count >= self.max_iterations {
            return Ok(self.halt(HaltReason::IterationLimit));
        }

        let state = self
            .state
            .as_deref()
            .ok_or(TuringMachineError::MissingInitialState)?;
        let symbol = self.tape.read();
        let action = self.rules.lookup(state, symbol)?;

        if action.instructions.first() == Some(&Instruction::Halt) {
            return Ok(self.halt(HaltReason::Instruction));
        }

        let mut halted = false;
        for instruction in &action.instructions {
            match *instruction {
                Instruction::MoveLeft => self.tape.move_left(1),
                Instruction::MoveRight => self.tape.move_right(1),
                Instruction::Write(symbol) => self.tape.write(symbol),
                Instruction::Halt => {
                    halted = true;
                    break;
                }
            }
        }

        debug!(
            step = self.step_count + 1,
            state,
            %symbol,
            next_state = %action.next_state,
            position = self.tape.position(),
            "step"
        );

        self.state = Some(action.next_state.clone());
        self.step_count += 1;
        self.phase = Phase::Running;

        if halted {
            return Ok(self.halt(HaltReason::Instruction));
        }

        Ok(Step::Continue)
    }

    /// Runs the machine until it halts.
    ///
    /// Terminates within `max_iterations` steps for every rule table.
    pub fn run(&mut self) -> Result<HaltReason, TuringMachineError> {
        loop {
            if let Step::Halt(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    fn halt(&mut self, reason: HaltReason) -> Step {
        info!(
            ?reason,
            steps = self.step_count,
            state = self.state.as_deref().unwrap_or_default(),
            "machine halted"
        );
        self.phase = Phase::Halted;
        self.halt_reason = Some(reason);
        Step::Halt(reason)
    }

    /// Replaces the tape. Only allowed before the machine starts running.
    pub fn load_tape(&mut self, tape: Tape) -> Result<(), TuringMachineError> {
        if matches!(self.phase, Phase::Running | Phase::Halted) {
            return Err(TuringMachineError::ConfigurationLocked);
        }
        self.tape = tape;
        Ok(())
    }

    /// Returns the current state, if any rule or initial state was configured.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Returns the initial state of the machine.
    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state.as_deref()
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    /// Returns why the machine halted, or `None` while it can still run.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt_reason
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the tape for seeding or rendering.
    pub fn tape_mut(&mut self) -> &mut Tape {
        &mut self.tape
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Returns the analysis warnings collected by `finalize()`.
    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }
}
