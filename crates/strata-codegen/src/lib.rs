// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Strata code generator: type-checked AST → x86-64 NASM text.
//!
//! Output is deterministic: the same AST and calling convention always
//! produce byte-identical assembly.

mod abi;
mod builder;
mod expr;
mod frame;
mod literals;
mod module;
mod runtime;
mod stmt;
mod tests;

pub use abi::{CallingConvention, Reg, UnknownAbi};
pub use frame::Variable;
pub use module::CodeGenerator;
pub use runtime::PrintKind;

use std::error::Error;
use std::fmt;

use strata_ast::stmt::Stmt;
use strata_types::TypedProgram;

/// Knobs for a single generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    pub abi: CallingConvention,
    /// Annotate the output with `; ...` source comments.
    pub emit_comments: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            abi: CallingConvention::host(),
            emit_comments: true,
        }
    }
}

impl CodegenConfig {
    pub fn for_abi(abi: CallingConvention) -> Self {
        Self { abi, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A name with no binding in any enclosing scope.
    UnresolvedIdentifier(String),
    FunctionNotFound(String),
    DuplicateFunction(String),
    ImmutableAssignment(String),
    /// `break` or `continue` with no enclosing loop.
    OutsideLoop(&'static str),
    UnsupportedFeature(String),
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodegenError::UnresolvedIdentifier(name) => write!(f, "unresolved identifier '{}'", name),
            CodegenError::FunctionNotFound(name) => write!(f, "function not found: {}", name),
            CodegenError::DuplicateFunction(name) => write!(f, "function '{}' is defined more than once", name),
            CodegenError::ImmutableAssignment(name) => write!(f, "assignment to immutable variable '{}'", name),
            CodegenError::OutsideLoop(keyword) => write!(f, "'{}' outside of a loop", keyword),
            CodegenError::UnsupportedFeature(msg) => write!(f, "unsupported: {}", msg),
        }
    }
}

impl Error for CodegenError {}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Generate assembly for a checked program.
pub fn generate(stmts: &[Stmt], types: &TypedProgram, config: CodegenConfig) -> CodegenResult<String> {
    CodeGenerator::new(config, types).generate(stmts)
}
