use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tmi::{HaltReason, Program, ProgramLoader, ProgramManager, Step, TuringMachine};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmi-cli programs/unary-addition.tm
  tmi-cli --builtin 'Busy beaver 2' --debug
  cat programs/unary-increment.tm | tmi-cli --tape 11111")]
struct Cli {
    /// The program file (.tm) to execute. Read from stdin when omitted and piped.
    program: Option<PathBuf>,

    /// Run a built-in program by name instead of a file.
    #[clap(short, long, conflicts_with = "program")]
    builtin: Option<String>,

    /// Replace the program's initial tape ('_' is the blank).
    #[clap(short, long)]
    tape: Option<String>,

    /// Override the program's iteration bound.
    #[clap(short, long)]
    max_iterations: Option<usize>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Number of cells shown on each side of the head.
    #[clap(short, long, default_value_t = 5)]
    window: usize,

    /// List the built-in programs and exit.
    #[clap(short, long)]
    list: bool,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return ExitCode::SUCCESS;
    }

    match execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the program, runs it, and prints the final tape.
fn execute(cli: &Cli) -> Result<HaltReason, Box<dyn std::error::Error>> {
    let mut program = load_program(cli)?;
    if let Some(tape) = &cli.tape {
        program = program.with_tape(tape);
    }

    let mut config = program.config();
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }

    info!(
        program = %program.name,
        max_iterations = config.max_iterations,
        "Loaded program"
    );

    let mut machine = program.build_with(config)?;
    println!("Program: {}", program.name);
    println!("Start:   {}", machine.tape_mut().render(cli.window));

    let reason = if cli.debug {
        run_verbose(&mut machine, cli.window)?
    } else {
        machine.run()?
    };

    println!("End:     {}", machine.tape_mut().render(cli.window));
    info!(steps = machine.step_count(), ?reason, "Machine halted");
    println!("Tape:    {}", machine.tape().contents());
    println!(
        "Halted after {} step(s): {}",
        machine.step_count(),
        match reason {
            HaltReason::Instruction => "halt instruction",
            HaltReason::IterationLimit => "iteration limit reached",
        }
    );

    Ok(reason)
}

/// Steps through the program, printing the tape after every step.
fn run_verbose(
    machine: &mut TuringMachine,
    window: usize,
) -> Result<HaltReason, Box<dyn std::error::Error>> {
    loop {
        let step = machine.step()?;
        let tape = machine.tape_mut().render(window);
        println!(
            "Step {:>4}  {:<8} {}",
            machine.step_count(),
            machine.state().unwrap_or_default(),
            tape
        );

        if let Step::Halt(reason) = step {
            return Ok(reason);
        }
    }
}

fn load_program(cli: &Cli) -> Result<Program, Box<dyn std::error::Error>> {
    if let Some(name) = &cli.builtin {
        return Ok(ProgramManager::get_program_by_name(name)?);
    }

    if let Some(path) = &cli.program {
        return Ok(ProgramLoader::load_program(path)?);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(ProgramLoader::load_program_from_string(&buffer)?);
    }

    Err("no program given; pass a file, --builtin NAME, or pipe a program on stdin".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tmi-cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_execute_builtin() {
        let reason = execute(&cli(&["--builtin", "busy beaver 2"])).unwrap();
        assert_eq!(reason, HaltReason::Instruction);
    }

    #[test]
    fn test_execute_with_iteration_override() {
        let reason = execute(&cli(&["-b", "busy beaver 2", "-m", "2", "-d"])).unwrap();
        assert_eq!(reason, HaltReason::IterationLimit);
    }

    #[test]
    fn test_execute_unknown_builtin_fails() {
        let error = execute(&cli(&["--builtin", "no such program"])).unwrap_err();
        assert!(!error.to_string().is_empty());
    }
}
