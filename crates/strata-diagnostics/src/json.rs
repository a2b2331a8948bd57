// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for editors and scripts (`--format json`).

use serde::Serialize;
use strata_ast::LineMap;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle};

/// Everything one compiler run reported.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version.
    pub version: u32,
    pub file: String,
    pub success: bool,
    /// Phase that stopped the run: `lex`, `parse`, `check` or `codegen`.
    pub phase: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Always `"error"`.
    pub severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// 1-based position plus the text of its line.
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub style: LabelStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: usize,
    pub end: usize,
}

/// What every entry of one report is resolved against.
struct Context<'a> {
    source: &'a str,
    lines: LineMap,
    registry: ErrorCodeRegistry,
}

impl Context<'_> {
    fn convert(&self, diag: &Diagnostic) -> JsonDiagnostic {
        let category = diag
            .code
            .and_then(|code| self.registry.get(code.0))
            .map(|info| info.category.to_string());
        let location = diag.primary_span().map(|span| {
            let at = self.lines.locate(self.source, span.start);
            SourceLocation {
                line: at.line,
                column: at.column,
                byte_offset: span.start,
                source_line: at.snippet,
            }
        });
        let labels = diag
            .labels
            .iter()
            .map(|label| JsonLabel {
                style: label.style,
                message: label.message.clone(),
                start: label.span.start,
                end: label.span.end,
            })
            .collect();

        JsonDiagnostic {
            severity: "error",
            code: diag.code.map(|code| code.to_string()),
            category,
            message: diag.message.clone(),
            location,
            labels,
            notes: diag.notes.clone(),
            help: diag.help.clone(),
        }
    }
}

/// Build a report for `diagnostics` raised while compiling `file`.
pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str, phase: &str) -> DiagnosticReport {
    let cx = Context {
        source,
        lines: LineMap::new(source),
        registry: ErrorCodeRegistry::default(),
    };
    let error_count = diagnostics.len();

    DiagnosticReport {
        version: 1,
        file: file.to_owned(),
        success: error_count == 0,
        phase: phase.to_owned(),
        diagnostics: diagnostics.iter().map(|d| cx.convert(d)).collect(),
        error_count,
    }
}

/// Pretty-printed JSON text of a report.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    match serde_json::to_string_pretty(report) {
        Ok(text) => text,
        Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
    }
}
