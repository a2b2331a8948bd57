// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `strata build`: source file in, `.asm` file out.

use std::path::PathBuf;

use clap::Args;
use strata_compiler::{compile_with, write_assembly, CallingConvention, CodegenConfig, CompileOptions};

use crate::{output, read_source, report, CmdResult, Format};

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Strata source file
    pub file: PathBuf,

    /// Output path (defaults to the input with an `.asm` extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target calling convention: win64 or sysv (defaults to the host)
    #[arg(long)]
    pub abi: Option<CallingConvention>,

    /// Print the assembly to stdout instead of writing a file
    #[arg(short = 'S', long)]
    pub stdout: bool,

    /// Leave out `;` annotations
    #[arg(long)]
    pub no_comments: bool,
}

impl BuildArgs {
    fn options(&self) -> CompileOptions {
        CompileOptions {
            codegen: CodegenConfig {
                abi: self.abi.unwrap_or_default(),
                emit_comments: !self.no_comments,
            },
        }
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.file.with_extension("asm"))
    }
}

pub fn cmd_build(args: BuildArgs, format: Format) -> CmdResult {
    let source = read_source(&args.file, format)?;
    let path = args.file.display().to_string();
    let options = args.options();
    tracing::debug!(file = %path, abi = options.codegen.abi.name(), "building");

    let asm = compile_with(&source, &options).map_err(|e| report(&e, &source, &path, format))?;

    if args.stdout {
        print!("{asm}");
        return Ok(());
    }

    let out = args.output_path();
    write_assembly(&out, &asm).map_err(|e| report(&e, &source, &path, format))?;
    if format == Format::Human {
        println!(
            "{} {} -> {} ({})",
            output::status_pass(),
            output::file_path(&path),
            output::file_path(&out.display().to_string()),
            options.codegen.abi
        );
    }
    Ok(())
}
