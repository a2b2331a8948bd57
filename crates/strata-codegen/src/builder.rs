// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Line-oriented NASM text builder.

use std::fmt::Display;

use crate::abi::Reg;

/// Accumulates assembly lines. Instructions are indented four spaces,
/// labels and directives are not.
#[derive(Debug, Default)]
pub(crate) struct Builder {
    lines: Vec<String>,
    comments: bool,
}

impl Builder {
    pub fn new(comments: bool) -> Self {
        Self { lines: Vec::new(), comments }
    }

    /// Add a raw line.
    pub fn str<S: Into<String>>(&mut self, line: S) {
        self.lines.push(line.into());
    }

    /// One instruction at a single level of indentation.
    pub fn ins<D: Display>(&mut self, instr: D) {
        self.str(format!("    {instr}"));
    }

    pub fn nl(&mut self) {
        self.str("");
    }

    pub fn label<D: Display>(&mut self, label: D) {
        self.str(format!("{label}:"));
    }

    /// A `; text` line, dropped when comments are turned off.
    pub fn comment<D: Display>(&mut self, text: D) {
        if self.comments {
            self.ins(format!("; {text}"));
        }
    }

    pub fn section(&mut self, name: &str) {
        self.str(format!("section {name}"));
    }

    // Common instructions

    pub fn mov<A: Display, B: Display>(&mut self, dest: A, src: B) {
        self.ins(format!("mov {dest}, {src}"));
    }

    pub fn push(&mut self, reg: Reg) {
        self.ins(format!("push {reg}"));
    }

    pub fn pop(&mut self, reg: Reg) {
        self.ins(format!("pop {reg}"));
    }

    pub fn jmp(&mut self, label: &str) {
        self.ins(format!("jmp {label}"));
    }

    pub fn call(&mut self, target: &str) {
        self.ins(format!("call {target}"));
    }

    /// `test rax, rax` followed by a conditional jump.
    pub fn test_rax_and(&mut self, jump: &str, label: &str) {
        self.ins("test rax, rax");
        self.ins(format!("{jump} {label}"));
    }

    /// Restore the caller's frame and return.
    pub fn epilogue(&mut self) {
        self.ins("mov rsp, rbp");
        self.pop(Reg::Rbp);
        self.ins("ret");
    }

    /// Move every line of `other` onto the end of this builder.
    pub fn append(&mut self, other: Builder) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_text(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
