// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checking errors.

use strata_ast::ty::TypeDef;
use strata_ast::Span;

/// A type error. The checker stops at the first one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch {
        expected: TypeDef,
        found: TypeDef,
        span: Span,
    },
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },
    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String, span: Span },
    #[error("cannot assign twice to immutable variable '{name}'")]
    ImmutableAssign { name: String, span: Span, declared: Span },
    #[error("function '{name}' takes {expected} arguments, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("return outside of function")]
    ReturnOutsideFunction { span: Span },
    #[error("function must return a value of type {expected}")]
    MissingReturnValue { expected: TypeDef, span: Span },
    #[error("function '{name}' is defined more than once")]
    DuplicateFunction { name: String, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::UndefinedVariable { span, .. }
            | TypeError::UndefinedFunction { span, .. }
            | TypeError::ImmutableAssign { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::ReturnOutsideFunction { span }
            | TypeError::MissingReturnValue { span, .. }
            | TypeError::DuplicateFunction { span, .. } => *span,
        }
    }
}
