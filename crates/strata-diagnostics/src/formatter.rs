// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Colored terminal rendering of diagnostics.
//!
//! ```text
//! error[E0200]: type mismatch: expected int, found string
//!   --> main.st:1:14
//!    |
//!  1 | let y: int = "hi"
//!    |              ^^^^ expected `int`, found `string`
//!    = help: only `int` to `float` and `char` to `string` convert implicitly
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use colored::Colorize;
use strata_ast::LineMap;

use crate::{Diagnostic, Label, LabelStyle};

/// Formats diagnostics against one source file.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: &'a str,
    line_map: LineMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: "<source>",
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = name;
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let lines = self.group_labels(&diagnostic.labels);
        let gutter = lines
            .keys()
            .next_back()
            .map_or(1, |n| n.to_string().len())
            .max(2);

        if let Some(label) = diagnostic.primary_label() {
            let (line, col) = self.line_map.offset_to_line_col(label.span.start);
            let _ = writeln!(out, "{:>gutter$}{} {}:{}:{}", "", "-->".blue(), self.file_name, line, col);
            let _ = writeln!(out, "{:>gutter$} {}", "", "|".blue());
        }

        let mut prev: Option<u32> = None;
        for (line_num, labels) in &lines {
            if prev.is_some_and(|p| *line_num > p + 1) {
                let _ = writeln!(out, "{:>gutter$} {}", "", "...".blue());
            }
            let text = self.line_map.line_text(self.source, *line_num).unwrap_or("");
            let _ = writeln!(
                out,
                "{:>gutter$} {} {}",
                line_num.to_string().blue().bold(),
                "|".blue(),
                text
            );
            for label in labels {
                self.format_underline(&mut out, label, text.len(), gutter);
            }
            prev = Some(*line_num);
        }

        for note in &diagnostic.notes {
            let _ = writeln!(out, "{:>gutter$} {} {}: {}", "", "=".cyan(), "note".cyan().bold(), note);
        }
        if let Some(ref help) = diagnostic.help {
            let _ = writeln!(out, "{:>gutter$} {} {}: {}", "", "=".cyan(), "help".cyan().bold(), help);
        }
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = "error".red().bold();
        match diagnostic.code {
            Some(ref code) => {
                let _ = writeln!(out, "{}[{}]: {}", severity, code.0.red().bold(), diagnostic.message.bold());
            }
            None => {
                let _ = writeln!(out, "{}: {}", severity, diagnostic.message.bold());
            }
        }
    }

    /// Labels keyed by the 1-based line they start on; multi-line spans are
    /// only marked on their first line.
    fn group_labels<'d>(&self, labels: &'d [Label]) -> BTreeMap<u32, Vec<&'d Label>> {
        let mut lines: BTreeMap<u32, Vec<&Label>> = BTreeMap::new();
        for label in labels {
            let (line, _) = self.line_map.offset_to_line_col(label.span.start);
            lines.entry(line).or_default().push(label);
        }
        for labels in lines.values_mut() {
            labels.sort_by_key(|l| (l.style != LabelStyle::Primary, l.span.start));
        }
        lines
    }

    fn format_underline(&self, out: &mut String, label: &Label, line_len: usize, gutter: usize) {
        let (start_line, start_col) = self.line_map.offset_to_line_col(label.span.start);
        let (end_line, end_col) = self.line_map.offset_to_line_col(label.span.end);
        let start = start_col as usize - 1;
        let end = if end_line == start_line { end_col as usize - 1 } else { line_len };
        let width = end.saturating_sub(start).max(1);

        let (marks, message) = match label.style {
            LabelStyle::Primary => (
                "^".repeat(width).red().bold(),
                label.message.as_deref().unwrap_or("").red().bold(),
            ),
            LabelStyle::Secondary => (
                "-".repeat(width).blue(),
                label.message.as_deref().unwrap_or("").blue(),
            ),
        };
        let _ = writeln!(
            out,
            "{:>gutter$} {} {}{} {}",
            "",
            "|".blue(),
            " ".repeat(start),
            marks,
            message
        );
    }
}
