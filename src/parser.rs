//! This module provides the parser for Turing Machine programs, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a `Program` struct.

use crate::types::{
    Instruction, Program, RuleDefinition, Symbol, TuringMachineError, DEFAULT_BLANK_SYMBOL,
    DEFAULT_MAX_ITERATIONS, INPUT_BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the Turing Machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// This is the main entry point for parsing program definitions. The parsed program is
/// validated by building a machine from it before being returned.
///
/// # Arguments
///
/// * `input` - A string slice containing the program definition.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if a required section is missing.
/// * `Err(TuringMachineError::UndefinedInstruction)` for unknown instruction tokens.
/// * `Err(TuringMachineError::ConfigurationError)` if the rules reference undefined states.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Program exceeds maximum size of {MAX_PROGRAM_SIZE} bytes"
        )));
    }

    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".into()))?;

    let program = parse_program(root)?;

    program.build()?;

    Ok(program)
}

/// Rule declaration as written, before the blank symbol is known.
struct ParsedRule {
    state: String,
    read: Option<Vec<Symbol>>,
    next_state: String,
    instructions: Vec<String>,
}

/// Parses the top-level structure of a program from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<Symbol> = None;
    let mut tape: Option<Vec<Symbol>> = None;
    let mut head: Option<usize> = None;
    let mut initial_state: Option<String> = None;
    let mut max_iterations: Option<usize> = None;
    let mut rules: Option<Vec<ParsedRule>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let kind = p.as_rule();

        check_unique_rule(kind, span, &mut seen)?;

        match kind {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p))),
            Rule::tape => tape = Some(parse_symbols(p)),
            Rule::head => head = Some(parse_index(p)?),
            Rule::start => initial_state = Some(parse_inner_string(p)),
            Rule::max_iterations => max_iterations = Some(parse_index(p)?),
            Rule::rules => rules = Some(parse_rules(p)),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let tape = check_required_rule(tape, "tape")?;
    let rules = check_required_rule(rules, "rules")?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);
    let head = head.unwrap_or(0);

    check_head(head, &tape)?;

    let rules = rules
        .into_iter()
        .map(|rule| resolve_rule(rule, blank))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Program {
        name,
        initial_state,
        tape: rewrite_blanks(tape, blank),
        head,
        blank,
        max_iterations: max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        rules,
    })
}

/// Parses the rules section. State blocks without rules contribute nothing.
fn parse_rules(pair: Pair<Rule>) -> Vec<ParsedRule> {
    let mut rules = Vec::new();

    // Rule: rules > [state_block] > state, [rule]
    for block in pair.into_inner() {
        let mut inner = block.into_inner();
        let state = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();

        for rule_pair in inner {
            rules.push(parse_rule(&state, rule_pair));
        }
    }

    rules
}

/// Parses a single `read -> next_state, instructions` line.
fn parse_rule(state: &str, pair: Pair<Rule>) -> ParsedRule {
    let mut read = None;
    let mut next_state = String::new();
    let mut instructions = Vec::new();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::read => read = parse_read(p),
            Rule::state => next_state = p.as_str().to_string(),
            Rule::instructions => {
                instructions = p.into_inner().map(|i| i.as_str().to_string()).collect();
            }
            _ => {}
        }
    }

    ParsedRule {
        state: state.to_string(),
        read,
        next_state,
        instructions,
    }
}

/// Parses the read side of a rule. `None` stands for the wildcard.
fn parse_read(pair: Pair<Rule>) -> Option<Vec<Symbol>> {
    let inner = pair.into_inner().next()?;

    match inner.as_rule() {
        Rule::wildcard => None,
        Rule::symbols => Some(parse_symbols(inner)),
        _ => Some(vec![parse_symbol(inner.as_str())]),
    }
}

/// Converts a parsed rule into a `RuleDefinition`, resolving the blank symbol.
fn resolve_rule(rule: ParsedRule, blank: Symbol) -> Result<RuleDefinition, TuringMachineError> {
    let instructions = rule
        .instructions
        .iter()
        .map(|token| Instruction::parse(&unquote_instruction(token), blank))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleDefinition {
        state: rule.state,
        symbols: rule
            .read
            .map(|symbols| rewrite_blanks(symbols, blank))
            .unwrap_or_default(),
        next_state: rule.next_state,
        instructions,
    })
}

/// Turns `P'x'` into `Px`.
fn unquote_instruction(token: &str) -> String {
    match token
        .strip_prefix("P'")
        .and_then(|symbol| symbol.strip_suffix('\''))
    {
        Some(symbol) if !symbol.is_empty() => format!("P{symbol}"),
        _ => token.to_string(),
    }
}

/// Collects every `symbol` below the given pair.
fn parse_symbols(pair: Pair<Rule>) -> Vec<Symbol> {
    pair.into_inner()
        .flat_map(|p| match p.as_rule() {
            Rule::symbols => parse_symbols(p),
            _ => vec![parse_symbol(p.as_str())],
        })
        .collect()
}

/// Parses a single character symbol from a string, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> Symbol {
    let unquoted = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);

    unquoted.chars().next().unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// Parses the numeric value of a `head` or `max_iterations` section.
fn parse_index(pair: Pair<Rule>) -> Result<usize, TuringMachineError> {
    let span = pair.as_span();
    let text = parse_inner_string(pair);

    text.parse::<usize>()
        .map_err(|e| parse_error(&format!("Invalid number {text}: {e}"), span))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    kind: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if kind == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(kind) {
        return Err(parse_error(
            &format!("Duplicate \"{kind:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

/// Checks that the head starts on the seeded tape.
fn check_head(head: usize, tape: &[Symbol]) -> Result<(), TuringMachineError> {
    if head >= tape.len() && !(tape.is_empty() && head == 0) {
        return Err(TuringMachineError::ValidationError(format!(
            "Invalid head position: {head}"
        )));
    }

    Ok(())
}

/// Replaces `INPUT_BLANK_SYMBOL` with the actual blank symbol.
fn rewrite_blanks(symbols: Vec<Symbol>, blank: Symbol) -> Vec<Symbol> {
    symbols
        .into_iter()
        .map(|s| if s == INPUT_BLANK_SYMBOL { blank } else { s })
        .collect()
}
