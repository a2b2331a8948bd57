// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Strata compiler driver.
//!
//! Runs the pipeline lexer → parser → type checker → code generator and
//! returns NASM text. Each phase is also exposed on its own for tools that
//! only need part of the pipeline.

mod error;
mod output;

pub use error::{CompileError, SyntaxError};
pub use output::{read_source, write_assembly};
pub use strata_codegen::{CallingConvention, CodegenConfig, CodegenError};

use strata_ast::stmt::Stmt;
use strata_ast::token::Token;
use strata_ast::LineMap;
use strata_types::TypedProgram;

/// Options for one compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub codegen: CodegenConfig,
}

impl CompileOptions {
    pub fn for_abi(abi: CallingConvention) -> Self {
        Self {
            codegen: CodegenConfig::for_abi(abi),
        }
    }
}

/// Compile `source` to assembly for `abi`.
pub fn compile(source: &str, abi: CallingConvention) -> Result<String, CompileError> {
    compile_with(source, &CompileOptions::for_abi(abi))
}

pub fn compile_with(source: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let tokens = lex(source)?;
    let stmts = parse(tokens)?;
    let typed = check(source, &stmts)?;
    generate(&stmts, &typed, options.codegen)
}

/// Tokenize, ending with the `Eof` token.
pub fn lex(source: &str) -> Result<Vec<Token>, CompileError> {
    let _span = tracing::debug_span!("lex", bytes = source.len()).entered();
    let tokens = strata_lexer::tokenize(source)?;
    tracing::debug!(tokens = tokens.len(), "lexed");
    Ok(tokens)
}

pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, CompileError> {
    let _span = tracing::debug_span!("parse").entered();
    let stmts = strata_parser::Parser::new(tokens).parse_program()?;
    tracing::debug!(statements = stmts.len(), "parsed");
    Ok(stmts)
}

/// Type check; `source` is only used to position the error.
pub fn check(source: &str, stmts: &[Stmt]) -> Result<TypedProgram, CompileError> {
    let _span = tracing::debug_span!("check").entered();
    let typed = strata_types::typecheck(stmts).map_err(|error| {
        let location = LineMap::new(source).locate(source, error.span().start);
        CompileError::Type { error, location }
    })?;
    tracing::debug!(
        functions = typed.functions.len(),
        expressions = typed.node_types.len(),
        "checked"
    );
    Ok(typed)
}

pub fn generate(stmts: &[Stmt], typed: &TypedProgram, config: CodegenConfig) -> Result<String, CompileError> {
    let _span = tracing::debug_span!("codegen", abi = config.abi.name()).entered();
    let asm = strata_codegen::generate(stmts, typed, config)?;
    tracing::debug!(bytes = asm.len(), lines = asm.lines().count(), "generated");
    Ok(asm)
}
