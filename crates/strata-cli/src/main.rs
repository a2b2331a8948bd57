// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Strata CLI: compile `.st` files to x86-64 NASM assembly.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use strata_compiler::{CompileError, SyntaxError};
use strata_diagnostics::json::{to_json_report, to_json_string};
use strata_diagnostics::{Diagnostic, DiagnosticFormatter, ToDiagnostic};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Compile Strata programs to x86-64 NASM assembly")]
struct Cli {
    /// Log each compiler phase to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// How errors (and inspection output) are printed
    #[arg(long, value_enum, default_value_t = Format::Human, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a source file to assembly
    Build(commands::build::BuildArgs),
    /// Print the token stream
    Lex { file: PathBuf },
    /// Print the syntax tree
    Parse { file: PathBuf },
    /// Type check without generating code
    Check { file: PathBuf },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::init();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Build(args) => commands::build::cmd_build(args, cli.format),
        Command::Lex { file } => commands::phase::cmd_lex(&file, cli.format),
        Command::Parse { file } => commands::phase::cmd_parse(&file, cli.format),
        Command::Check { file } => commands::phase::cmd_check(&file, cli.format),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failed) => ExitCode::FAILURE,
    }
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// A command failed and has already reported why.
#[derive(Debug)]
pub struct Failed;

pub type CmdResult = Result<(), Failed>;

fn diagnostic_for(err: &CompileError) -> Diagnostic {
    match err {
        CompileError::Syntax(SyntaxError::Lex(e)) => e.to_diagnostic(),
        CompileError::Syntax(SyntaxError::Parse(e)) => e.to_diagnostic(),
        CompileError::Type { error, .. } => error.to_diagnostic(),
        CompileError::Codegen(e) => e.to_diagnostic(),
        CompileError::Io { .. } => Diagnostic::error(err.to_string()),
    }
}

/// Print `err` in the requested format and turn it into a failure.
pub fn report(err: &CompileError, source: &str, path: &str, format: Format) -> Failed {
    show_diagnostics(&[diagnostic_for(err)], source, path, err.phase(), format);
    if format == Format::Human {
        eprintln!("\n{}", output::banner_fail(err.phase()));
    }
    Failed
}

pub fn show_diagnostics(diags: &[Diagnostic], source: &str, path: &str, phase: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(source).with_file_name(path);
            for diag in diags {
                eprint!("{}", formatter.format(diag));
            }
        }
        Format::Json => {
            let report = to_json_report(diags, source, path, phase);
            println!("{}", to_json_string(&report));
        }
    }
}

/// Read a source file, reporting failure in the requested format.
pub fn read_source(path: &std::path::Path, format: Format) -> Result<String, Failed> {
    strata_compiler::read_source(path).map_err(|e| report(&e, "", &path.display().to_string(), format))
}

