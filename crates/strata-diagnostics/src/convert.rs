// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from phase error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for strata_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        use strata_lexer::LexErrorKind::*;

        let (code, label) = match self.kind {
            UnexpectedChar => ("E0001", "unexpected character"),
            UnterminatedString => ("E0002", "string starts here"),
        };
        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, label);
        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for strata_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        use strata_parser::ParseErrorKind::*;

        let (code, label) = match self.kind {
            Expected => ("E0100", "here"),
            UnknownType => ("E0101", "not a type"),
            InvalidNumber => ("E0003", "out of range"),
            InvalidAssignment => ("E0102", "cannot assign to this"),
        };
        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, label);
        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        diag
    }
}

// ============================================================================
// Type Errors
// ============================================================================

impl ToDiagnostic for strata_types::TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        use strata_types::TypeError::*;

        let span = self.span();
        let message = self.to_string();
        match self {
            Mismatch { expected, found, .. } => Diagnostic::error(message)
                .with_code("E0200")
                .with_primary(span, format!("expected `{expected}`, found `{found}`"))
                .with_help(mismatch_help(expected, found)),

            UndefinedVariable { name, .. } => Diagnostic::error(message)
                .with_code("E0201")
                .with_primary(span, "not found in this scope")
                .with_help(format!("declare it first: `let {name}: int = ...`")),

            UndefinedFunction { .. } => Diagnostic::error(message)
                .with_code("E0202")
                .with_primary(span, "no function with this name"),

            ImmutableAssign { name, declared, .. } => Diagnostic::error(message)
                .with_code("E0203")
                .with_primary(span, "cannot assign")
                .with_secondary(*declared, "declared immutable here")
                .with_help(format!("declare `{name}` with `var` to make it mutable")),

            ArityMismatch { expected, .. } => Diagnostic::error(message)
                .with_code("E0204")
                .with_primary(span, format!("expected {expected} arguments")),

            ReturnOutsideFunction { .. } => Diagnostic::error(message)
                .with_code("E0205")
                .with_primary(span, "not inside a function"),

            MissingReturnValue { expected, .. } => Diagnostic::error(message)
                .with_code("E0206")
                .with_primary(span, format!("expected a `{expected}` value")),

            DuplicateFunction { .. } => Diagnostic::error(message)
                .with_code("E0207")
                .with_primary(span, "redefined here"),
        }
    }
}

fn mismatch_help(expected: &strata_ast::ty::TypeDef, found: &strata_ast::ty::TypeDef) -> String {
    use strata_ast::ty::Primitive;

    match (found.base(), expected.base()) {
        (Primitive::Float, Primitive::Int) => {
            "floats never narrow implicitly; declare the target as `float`".to_string()
        }
        _ => "only `int` to `float` and `char` to `string` convert implicitly".to_string(),
    }
}

// ============================================================================
// Codegen Errors
// ============================================================================

impl ToDiagnostic for strata_codegen::CodegenError {
    fn to_diagnostic(&self) -> Diagnostic {
        use strata_codegen::CodegenError::*;

        let code = match self {
            UnresolvedIdentifier(_) => "E0300",
            FunctionNotFound(_) => "E0301",
            DuplicateFunction(_) => "E0302",
            ImmutableAssignment(_) => "E0303",
            OutsideLoop(_) => "E0304",
            UnsupportedFeature(_) => "E0305",
        };
        // Codegen errors carry no spans.
        Diagnostic::error(self.to_string())
            .with_code(code)
            .with_note("reported during code generation")
    }
}
