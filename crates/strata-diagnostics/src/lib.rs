// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Strata compiler diagnostics.
//!
//! Every phase's error type converts into a `Diagnostic` through the
//! `ToDiagnostic` trait. The phase crates stay free of presentation concerns;
//! this crate renders diagnostics for terminals and as JSON.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

pub use formatter::DiagnosticFormatter;

use serde::Serialize;
use strata_ast::Span;

/// What went wrong and where, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

/// An annotated span. `^^^` for primary, `---` for secondary.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// Stable identifier such as `E0200`; see [`codes::ErrorCodeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub &'static str);

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Label {
    fn new(span: Span, style: LabelStyle, message: impl Into<String>) -> Self {
        let message = message.into();
        Label {
            span,
            style,
            message: (!message.is_empty()).then_some(message),
        }
    }
}

impl Diagnostic {
    /// Every phase failure is fatal, so every diagnostic is an error.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            code: None,
            labels: vec![],
            notes: vec![],
            help: None,
        }
    }

    pub fn with_code(self, code: &'static str) -> Self {
        Diagnostic {
            code: Some(ErrorCode(code)),
            ..self
        }
    }

    /// Mark the span the diagnostic is about. An empty message draws a bare underline.
    pub fn with_primary(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, LabelStyle::Primary, message));
        self
    }

    pub fn with_secondary(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, LabelStyle::Secondary, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Diagnostic {
            help: Some(help.into()),
            ..self
        }
    }

    /// The label to anchor on: the first primary one, else whatever comes first.
    pub fn primary_label(&self) -> Option<&Label> {
        let mut labels = self.labels.iter();
        labels
            .clone()
            .find(|label| label.style == LabelStyle::Primary)
            .or_else(|| labels.next())
    }

    pub fn primary_span(&self) -> Option<Span> {
        Some(self.primary_label()?.span)
    }
}

/// Implemented by every phase error so the CLI can render it uniformly.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}
