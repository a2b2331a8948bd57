// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Top-level layout of the assembly file and per-function frames.

use std::collections::HashMap;

use strata_ast::decl::FnDecl;
use strata_ast::stmt::{Stmt, StmtKind};
use strata_types::TypedProgram;

use crate::abi::{CallingConvention, Reg};
use crate::builder::Builder;
use crate::frame::Frame;
use crate::literals::StringTable;
use crate::{runtime, CodegenConfig, CodegenError, CodegenResult};

/// Where `break` and `continue` jump inside the innermost loop.
#[derive(Debug, Clone)]
pub(crate) struct LoopTargets {
    pub break_label: String,
    pub continue_label: String,
}

/// Walks a checked program once and emits NASM text.
///
/// One instance per compilation unit; `generate` consumes it.
pub struct CodeGenerator<'a> {
    pub(crate) config: CodegenConfig,
    pub(crate) types: &'a TypedProgram,
    pub(crate) functions: HashMap<&'a str, &'a FnDecl>,
    /// Finished sections.
    pub(crate) out: Builder,
    /// Body of the function being generated; its prologue depends on the
    /// final frame size, so it is written out only once the body is done.
    pub(crate) code: Builder,
    pub(crate) frame: Frame,
    pub(crate) labels: u32,
    pub(crate) loops: Vec<LoopTargets>,
    pub(crate) strings: StringTable,
    /// Temporaries currently pushed on the stack, for call-site alignment.
    pub(crate) depth: usize,
    pub(crate) current_fn: Option<&'a FnDecl>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(config: CodegenConfig, types: &'a TypedProgram) -> Self {
        Self {
            config,
            types,
            functions: HashMap::new(),
            out: Builder::new(config.emit_comments),
            code: Builder::new(config.emit_comments),
            frame: Frame::new(),
            labels: 0,
            loops: Vec::new(),
            strings: StringTable::default(),
            depth: 0,
            current_fn: None,
        }
    }

    pub fn abi(&self) -> CallingConvention {
        self.config.abi
    }

    /// Generate the complete assembly file.
    pub fn generate(mut self, stmts: &'a [Stmt]) -> CodegenResult<String> {
        let decls: Vec<&'a FnDecl> = stmts
            .iter()
            .filter_map(|s| match &s.kind {
                StmtKind::Func(decl) => Some(decl),
                _ => None,
            })
            .collect();
        for decl in decls.iter().copied() {
            if self.functions.insert(decl.name.as_str(), decl).is_some() {
                return Err(CodegenError::DuplicateFunction(decl.name.clone()));
            }
        }

        self.emit_header();
        for decl in decls.iter().copied() {
            self.emit_function(decl)?;
        }
        let abi = self.abi();
        runtime::emit_thunks(&mut self.out, abi);
        self.emit_main(stmts)?;
        self.emit_data();

        tracing::debug!(
            abi = self.abi().name(),
            functions = decls.len(),
            literals = self.strings.len(),
            labels = self.labels,
            "generated assembly"
        );
        Ok(self.out.into_text())
    }

    fn emit_header(&mut self) {
        self.out.str(format!("; generated by strata for {}", self.abi()));
        self.out.str("default rel");
        self.out.str("global main");
        self.out.str("extern printf");
        if self.abi() == CallingConvention::Win64 {
            self.out.str("extern ExitProcess");
        }
        self.out.nl();
        self.out.section(".text");
        self.out.nl();
    }

    fn emit_data(&mut self) {
        self.out.section(".data");
        for line in runtime::DATA_PREAMBLE {
            self.out.str(*line);
        }
        for line in self.strings.data_lines() {
            self.out.str(line);
        }
        self.out.nl();
        self.out.section(".bss");
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn begin_function(&mut self, current: Option<&'a FnDecl>) {
        self.frame = Frame::new();
        self.code = Builder::new(self.config.emit_comments);
        self.depth = 0;
        self.current_fn = current;
    }

    /// Write label, prologue and the buffered body to the output.
    fn finish_function(&mut self, label: &str) {
        let body = std::mem::replace(&mut self.code, Builder::new(self.config.emit_comments));
        self.out.label(label);
        self.out.push(Reg::Rbp);
        self.out.mov(Reg::Rbp, "rsp");
        let size = self.frame.size();
        // An empty frame would be `sub rsp, 0`; leave it out.
        if size > 0 {
            self.out.ins(format!("sub rsp, {size}"));
        }
        self.out.append(body);
        self.out.nl();
        self.current_fn = None;
    }

    fn emit_function(&mut self, decl: &'a FnDecl) -> CodegenResult<()> {
        self.begin_function(Some(decl));
        self.frame.push_scope();
        self.bind_params(decl);
        self.emit_block(&decl.body)?;
        if !decl.body.last().is_some_and(Stmt::is_return) {
            self.code.ins("xor eax, eax");
            self.code.epilogue();
        }
        self.frame.pop_scope();
        self.finish_function(&fn_label(&decl.name));
        Ok(())
    }

    /// Spill each parameter into its own slot. Register parameters come from
    /// the convention's list; the rest sit above the return address.
    fn bind_params(&mut self, decl: &FnDecl) {
        let regs = self.abi().param_registers();
        let stack_base = 16 + self.abi().shadow_space();

        for (i, param) in decl.params.iter().enumerate() {
            let offset = self.frame.declare(&param.name, param.ty.clone(), false);
            match regs.get(i) {
                Some(reg) => self.code.mov(slot(offset), reg),
                None => {
                    let above = stack_base + 8 * (i - regs.len());
                    self.code.mov(Reg::Rax, format!("[rbp+{above}]"));
                    self.code.mov(slot(offset), Reg::Rax);
                }
            }
        }
    }

    /// Top-level statements become the body of `main`.
    fn emit_main(&mut self, stmts: &'a [Stmt]) -> CodegenResult<()> {
        self.begin_function(None);
        self.frame.push_scope();
        for stmt in stmts {
            if !matches!(stmt.kind, StmtKind::Func(_)) {
                self.emit_stmt(stmt)?;
            }
        }
        self.frame.pop_scope();

        self.code.comment("exit");
        match self.abi() {
            CallingConvention::Win64 => {
                self.code.ins("xor ecx, ecx");
                self.code.ins("sub rsp, 32");
                self.code.call("ExitProcess");
            }
            CallingConvention::SystemV => {
                self.code.ins("xor eax, eax");
                self.code.epilogue();
            }
        }
        self.finish_function("main");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------------

    /// Fresh number for a family of labels belonging to one construct.
    pub(crate) fn next_label_id(&mut self) -> u32 {
        let id = self.labels;
        self.labels += 1;
        id
    }
}

/// Assembly label of a user function.
pub(crate) fn fn_label(name: &str) -> String {
    format!("fn_{name}")
}

/// Memory operand of a local's slot.
pub(crate) fn slot(offset: usize) -> String {
    format!("[rbp-{offset}]")
}
