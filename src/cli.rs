//! Command line interface for the minic interpreter.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::interpreter::eval::{run_program, RunOptions};
use crate::interpreter::parser::parse_program;
use crate::interpreter::validate::{has_errors, Validator};
use crate::interpreter::values::Value;

#[derive(Parser)]
#[command(name = "minic")]
#[command(about = "minic - a C-like scripting language with coroutines", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script
    Run {
        /// Script file to execute
        script: String,
    },

    /// Parse and validate a script without running it
    Check {
        /// Script file to check
        script: String,
    },

    /// Print the parsed AST as JSON
    Ast {
        /// Script file to parse
        script: String,
    },
}

pub fn run_cli() -> Result<ExitCode> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = Config::builder().config_path(cli.config.clone()).build()?;

    match cli.command {
        Commands::Run { script } => run(&script, &config),
        Commands::Check { script } => check(&script),
        Commands::Ast { script } => ast(&script),
    }
}

fn load_program(path: &str) -> Result<crate::interpreter::ast::Program> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script '{}'", path))?;
    parse_program(&source).with_context(|| format!("failed to parse '{}'", path))
}

fn run(path: &str, config: &Config) -> Result<ExitCode> {
    let program = load_program(path)?;

    let diagnostics = Validator::new().validate_program(&program);
    for diag in &diagnostics {
        eprintln!("{}", diag);
    }
    if has_errors(&diagnostics) {
        bail!("validation failed for '{}'", path);
    }

    info!(script = path, "running script");
    let options = RunOptions {
        carrier_stack_bytes: config.carrier_stack_bytes(),
    };
    let result = run_program(&program, Box::new(std::io::stdout()), options)
        .with_context(|| format!("script '{}' failed", path))?;

    // A nonzero int from main becomes the process exit status, like C.
    match result {
        Value::Int { v } if v != 0 => Ok(ExitCode::from((v & 0xff) as u8)),
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn check(path: &str) -> Result<ExitCode> {
    let program = load_program(path)?;

    let diagnostics = Validator::new().validate_program(&program);
    for diag in &diagnostics {
        eprintln!("{}", diag);
    }
    if has_errors(&diagnostics) {
        bail!("validation failed for '{}'", path);
    }

    println!(
        "{}: ok ({} function(s), {} global(s))",
        path,
        program.functions.len(),
        program.globals.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn ast(path: &str) -> Result<ExitCode> {
    let program = load_program(path)?;
    let json = serde_json::to_string_pretty(&program).context("failed to serialize AST")?;
    println!("{}", json);
    Ok(ExitCode::SUCCESS)
}
