//! This module defines the `RuleTable`, the deterministic mapping from a (state, symbol)
//! pair to the `Action` a machine performs.

use crate::types::{Action, Instruction, Symbol, TuringMachineError};
use std::collections::{BTreeSet, HashMap};

/// The symbol side of a rule key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKey {
    /// Matches exactly one symbol.
    Exact(Symbol),
    /// Matches any symbol in the state.
    Wildcard,
}

/// Transition rules keyed by state, then by symbol.
///
/// A wildcard entry takes precedence over every exact entry of the same state: once a state
/// has a wildcard rule, its symbol-specific rules are never selected.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, HashMap<SymbolKey, Action>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action for `state` and each symbol in `symbols`.
    ///
    /// An empty `symbols` slice registers the action under the wildcard key. Existing entries
    /// for the same key are overwritten.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::EmptyInstructions)` if `instructions` is empty.
    pub fn add_rule(
        &mut self,
        state: &str,
        symbols: &[Symbol],
        next_state: &str,
        instructions: Vec<Instruction>,
    ) -> Result<(), TuringMachineError> {
        if instructions.is_empty() {
            return Err(TuringMachineError::EmptyInstructions(state.to_string()));
        }

        let action = Action {
            next_state: next_state.to_string(),
            instructions,
        };
        let entries = self.rules.entry(state.to_string()).or_default();

        if symbols.is_empty() {
            entries.insert(SymbolKey::Wildcard, action);
        } else {
            for &symbol in symbols {
                entries.insert(SymbolKey::Exact(symbol), action.clone());
            }
        }

        Ok(())
    }

    /// Finds the action for `state` reading `symbol`.
    ///
    /// # Returns
    ///
    /// * `Ok(&Action)` with the wildcard action if the state has one, otherwise the exact match.
    /// * `Err(TuringMachineError::UndefinedState)` if the state has no rules.
    /// * `Err(TuringMachineError::UndefinedTransition)` if nothing matches.
    pub fn lookup(&self, state: &str, symbol: Symbol) -> Result<&Action, TuringMachineError> {
        let entries = self
            .rules
            .get(state)
            .ok_or_else(|| TuringMachineError::UndefinedState(state.to_string()))?;

        entries
            .get(&SymbolKey::Wildcard)
            .or_else(|| entries.get(&SymbolKey::Exact(symbol)))
            .ok_or_else(|| TuringMachineError::UndefinedTransition {
                state: state.to_string(),
                symbol,
            })
    }

    /// Returns true if at least one rule has `state` as its origin.
    pub fn contains_state(&self, state: &str) -> bool {
        self.rules.contains_key(state)
    }

    /// Returns every origin state, sorted.
    pub fn states(&self) -> Vec<&str> {
        let mut states: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        states.sort_unstable();
        states
    }

    /// Returns the entries registered for `state`.
    pub fn actions(&self, state: &str) -> impl Iterator<Item = (&SymbolKey, &Action)> {
        self.rules.get(state).into_iter().flatten()
    }

    /// Returns every action in the table.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.rules.values().flat_map(|entries| entries.values())
    }

    /// Returns the actions `lookup` can select for `state`. A wildcard hides the exact
    /// entries of its state.
    pub fn live_actions(&self, state: &str) -> Vec<&Action> {
        let Some(entries) = self.rules.get(state) else {
            return Vec::new();
        };

        match entries.get(&SymbolKey::Wildcard) {
            Some(action) => vec![action],
            None => entries.values().collect(),
        }
    }

    /// Returns true if `state` has a wildcard rule.
    pub fn has_wildcard(&self, state: &str) -> bool {
        self.rules
            .get(state)
            .is_some_and(|entries| entries.contains_key(&SymbolKey::Wildcard))
    }

    /// Returns every symbol named by an exact rule in any state.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.rules
            .values()
            .flat_map(|entries| entries.keys())
            .filter_map(|key| match key {
                SymbolKey::Exact(symbol) => Some(*symbol),
                SymbolKey::Wildcard => None,
            })
            .collect()
    }

    /// Returns the number of registered (state, key) entries.
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
