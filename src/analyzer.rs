//! This module provides the checks run when a machine is finalized. Hard checks reject the
//! configuration; soft checks produce warnings about programs that are valid but suspicious.

use crate::rules::RuleTable;
use crate::tape::Tape;
use crate::types::{Symbol, TuringMachineError};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Findings that do not prevent a machine from running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisWarning {
    /// States with rules that cannot be reached from the initial state.
    #[error("Unreachable states detected: {0:?}")]
    UnreachableStates(Vec<String>),
    /// Symbols on the seeded tape that no exact rule reads.
    #[error("Initial tape contains symbols not handled by any rule: {0:?}")]
    UnhandledTapeSymbols(Vec<Symbol>),
}

/// Validates a rule table before execution.
///
/// The initial state must have rules, and every transition target must have rules unless
/// it is only entered by actions that halt.
///
/// # Returns
///
/// * `Ok(())` if the configuration holds.
/// * `Err(TuringMachineError::ConfigurationError)` listing every offending state, sorted.
pub fn validate(rules: &RuleTable, initial_state: &str) -> Result<(), TuringMachineError> {
    let mut offending: BTreeSet<String> = undefined_targets(rules);

    if !rules.contains_state(initial_state) {
        offending.insert(initial_state.to_string());
    }

    if !offending.is_empty() {
        return Err(TuringMachineError::ConfigurationError {
            states: offending.into_iter().collect(),
        });
    }

    Ok(())
}

/// Runs the soft checks and returns every warning found.
pub fn analyze(rules: &RuleTable, initial_state: &str, tape: &Tape) -> Vec<AnalysisWarning> {
    [
        check_unreachable_states(rules, initial_state),
        check_tape_symbols(rules, tape),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Collects targets without rules that are entered by at least one non-halting action.
/// Exact rules hidden by a wildcard of the same state never fire and are not checked.
fn undefined_targets(rules: &RuleTable) -> BTreeSet<String> {
    rules
        .states()
        .into_iter()
        .flat_map(|state| rules.live_actions(state))
        .filter(|action| !action.halts() && !rules.contains_state(&action.next_state))
        .map(|action| action.next_state.clone())
        .collect()
}

/// Walks the transition graph from the initial state and reports states with rules that
/// were never visited.
fn check_unreachable_states(rules: &RuleTable, initial_state: &str) -> Option<AnalysisWarning> {
    let mut visited = HashSet::new();
    let mut queue = vec![initial_state.to_string()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        for action in rules.live_actions(&state) {
            if !visited.contains(&action.next_state) {
                queue.push(action.next_state.clone());
            }
        }
    }

    let unreachable: Vec<String> = rules
        .states()
        .into_iter()
        .filter(|state| !visited.contains(*state))
        .map(str::to_string)
        .collect();

    (!unreachable.is_empty()).then_some(AnalysisWarning::UnreachableStates(unreachable))
}

/// Reports non-blank tape symbols that no exact rule reads. Skipped when any state has a
/// wildcard, since that state accepts every symbol.
fn check_tape_symbols(rules: &RuleTable, tape: &Tape) -> Option<AnalysisWarning> {
    if rules.states().iter().any(|state| rules.has_wildcard(state)) {
        return None;
    }

    let handled = rules.symbols();
    let unhandled: BTreeSet<Symbol> = tape
        .symbols()
        .iter()
        .copied()
        .filter(|&symbol| symbol != tape.blank() && !handled.contains(&symbol))
        .collect();

    (!unhandled.is_empty())
        .then(|| AnalysisWarning::UnhandledTapeSymbols(unhandled.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Instruction::{Halt, MoveLeft, MoveRight, Write};

    #[test]
    fn test_validate_self_contained_rules() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "A", vec![MoveRight]).unwrap();
        rules
            .add_rule("A", &[' '], "A", vec![Write('1'), Halt])
            .unwrap();

        assert!(validate(&rules, "A").is_ok());
    }

    #[test]
    fn test_validate_reports_undefined_targets() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "B", vec![MoveRight]).unwrap();
        rules.add_rule("A", &['0'], "C", vec![MoveLeft]).unwrap();

        assert_eq!(
            validate(&rules, "A").unwrap_err(),
            TuringMachineError::ConfigurationError {
                states: vec!["B".into(), "C".into()],
            }
        );
    }

    #[test]
    fn test_validate_allows_halting_sentinel() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "A", vec![MoveRight]).unwrap();
        rules
            .add_rule("A", &[' '], "halt", vec![Write('1'), Halt])
            .unwrap();

        assert!(validate(&rules, "A").is_ok());
    }

    #[test]
    fn test_validate_sentinel_needs_every_entry_to_halt() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "halt", vec![Halt]).unwrap();
        rules.add_rule("A", &['0'], "halt", vec![MoveRight]).unwrap();

        assert_eq!(
            validate(&rules, "A").unwrap_err(),
            TuringMachineError::ConfigurationError {
                states: vec!["halt".into()],
            }
        );
    }

    #[test]
    fn test_validate_ignores_rules_hidden_by_wildcard() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "ghost", vec![MoveRight]).unwrap();
        rules.add_rule("A", &[], "A", vec![Write('1'), Halt]).unwrap();

        assert!(validate(&rules, "A").is_ok());
    }

    #[test]
    fn test_validate_reports_undefined_initial_state() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "A", vec![MoveRight]).unwrap();

        assert_eq!(
            validate(&rules, "start").unwrap_err(),
            TuringMachineError::ConfigurationError {
                states: vec!["start".into()],
            }
        );
    }

    #[test]
    fn test_source_only_state_is_valid() {
        // B has rules but nothing transitions into it: it is unreachable, not undefined.
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "A", vec![Halt]).unwrap();
        rules.add_rule("B", &['1'], "A", vec![MoveRight]).unwrap();

        assert!(validate(&rules, "A").is_ok());
        assert_eq!(
            analyze(&rules, "A", &Tape::default()),
            vec![AnalysisWarning::UnreachableStates(vec!["B".into()])]
        );
    }

    #[test]
    fn test_unhandled_tape_symbols() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &['1'], "A", vec![MoveRight]).unwrap();
        let tape = Tape::from_symbols("1x1 y".chars(), ' ');

        assert_eq!(
            analyze(&rules, "A", &tape),
            vec![AnalysisWarning::UnhandledTapeSymbols(vec!['x', 'y'])]
        );
    }

    #[test]
    fn test_wildcard_handles_every_symbol() {
        let mut rules = RuleTable::new();
        rules.add_rule("A", &[], "A", vec![MoveRight]).unwrap();
        let tape = Tape::from_symbols("xyz".chars(), ' ');

        assert!(analyze(&rules, "A", &tape).is_empty());
    }
}
