// File: src/main.rs
//
// Main entry point for the Sprout interpreter.
// Handles command-line argument parsing, configuration and logging setup, and
// dispatches to the appropriate subcommand (run, repl, or test).

use clap::{Parser as ClapParser, Subcommand};
use sprout::config::{Config, StateFormat};
use sprout::errors::{Diagnostic, LoadError};
use sprout::interpreter::{Interpreter, SnapshotRunner, State};
use sprout::repl::Repl;
use sprout::SourceFormat;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(
    name = "sprout",
    about = "Sprout: a small interpreted language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to ./sprout.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a Sprout script file
    Run {
        /// Path to the .sp file
        file: PathBuf,

        /// The file holds a JSON AST instead of source text
        #[arg(long)]
        ast: bool,

        /// Print the top-level variables after the run
        #[arg(long)]
        print_state: bool,

        /// Format used by --print-state
        #[arg(long, value_enum)]
        format: Option<StateFormat>,
    },

    /// Launch interactive Sprout REPL
    Repl,

    /// Run every script in a directory against its .out snapshot
    Test {
        /// Directory holding the .sp scripts
        dir: Option<PathBuf>,

        /// Regenerate all .out files based on actual output
        #[arg(long)]
        update: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match Config::load(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", Diagnostic::new("Config Error", err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    if !config.color {
        colored::control::set_override(false);
    }
    install_tracing(cli.verbose, config.log.filter.as_deref());

    match cli.command {
        Commands::Run { file, ast, print_state, format } => {
            let source_format = if ast { SourceFormat::JsonAst } else { SourceFormat::Script };
            let print_state = print_state || config.run.print_state;
            let format = format.unwrap_or(config.run.format);
            run_file(&file, source_format, print_state.then_some(format))
        }

        Commands::Repl => match Repl::new().and_then(|mut repl| repl.run()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{}", err);
                ExitCode::FAILURE
            }
        },

        Commands::Test { dir, update } => {
            let dir = dir.unwrap_or(config.test.dir);
            match SnapshotRunner::new(&dir, update).run_all() {
                Ok(report) => {
                    report.print(cli.verbose > 0);
                    ExitCode::from(report.exit_code() as u8)
                }
                Err(err) => {
                    eprint!("{}", Diagnostic::new("Test Error", format!("{}: {}", dir.display(), err)));
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// `RUST_LOG` wins, then -v flags, then the config file, then `warn`
fn install_tracing(verbose: u8, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new(configured.unwrap_or("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn run_file(path: &Path, source_format: SourceFormat, print_state: Option<StateFormat>) -> ExitCode {
    let file_name = path.display().to_string();

    let source = match sprout::read_source(path) {
        Ok(source) => source,
        Err(err) => {
            eprint!("{}", Diagnostic::new("IO Error", err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let program = match sprout::parse_source(&source, source_format) {
        Ok(program) => program,
        Err(LoadError::Syntax(err)) => {
            let mut diagnostic = Diagnostic::syntax(&err, &source);
            if let Some(location) = diagnostic.location.take() {
                diagnostic.location = Some(location.with_file(file_name));
            }
            eprint!("{}", diagnostic);
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprint!("{}", Diagnostic::new("Load Error", err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let mut interpreter = Interpreter::new();
    let outcome = interpreter.run(&program);

    let (state, code) = match outcome {
        Ok(state) => (state, ExitCode::SUCCESS),
        Err(aborted) => {
            eprint!("{}", Diagnostic::runtime(&aborted.error, &aborted.visible));
            (aborted.state, ExitCode::FAILURE)
        }
    };

    if let Some(format) = print_state {
        if let Err(err) = print_state_as(&mut io::stdout().lock(), &state, format) {
            if err.kind() != io::ErrorKind::BrokenPipe {
                eprintln!("failed to print state: {}", err);
            }
        }
    }

    code
}

fn print_state_as(out: &mut impl Write, state: &State, format: StateFormat) -> io::Result<()> {
    match format {
        StateFormat::Text => {
            for (name, value) in state {
                writeln!(out, "{} = {}", name, value)?;
            }
        }
        StateFormat::Json => {
            let json = serde_json::to_string_pretty(state).map_err(io::Error::from)?;
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}
