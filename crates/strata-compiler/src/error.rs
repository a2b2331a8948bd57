// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The unified compilation error.

use std::path::PathBuf;

use strata_ast::{Location, Span};
use strata_codegen::CodegenError;
use strata_lexer::LexError;
use strata_parser::ParseError;
use strata_types::TypeError;

/// A lexical or grammatical error; both carry a location and an optional hint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    pub fn message(&self) -> &str {
        match self {
            SyntaxError::Lex(e) => &e.message,
            SyntaxError::Parse(e) => &e.message,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            SyntaxError::Lex(e) => &e.location,
            SyntaxError::Parse(e) => &e.location,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(e) => e.span,
            SyntaxError::Parse(e) => e.span,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            SyntaxError::Lex(e) => e.hint.as_deref(),
            SyntaxError::Parse(e) => e.hint.as_deref(),
        }
    }
}

/// Why a compilation produced no assembly.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{}: {}", .0.location(), .0)]
    Syntax(#[from] SyntaxError),

    /// Any checker failure, positioned at the offending node.
    #[error("{location}: {error}")]
    Type { error: TypeError, location: Location },

    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    /// Name of the phase that failed.
    pub fn phase(&self) -> &'static str {
        match self {
            CompileError::Syntax(SyntaxError::Lex(_)) => "lex",
            CompileError::Syntax(SyntaxError::Parse(_)) => "parse",
            CompileError::Type { .. } => "check",
            CompileError::Codegen(_) => "codegen",
            CompileError::Io { .. } => "io",
        }
    }

    /// Source location, for errors that have one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::Syntax(e) => Some(e.location()),
            CompileError::Type { location, .. } => Some(location),
            CompileError::Codegen(_) | CompileError::Io { .. } => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Syntax(SyntaxError::Lex(e))
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Syntax(SyntaxError::Parse(e))
    }
}
