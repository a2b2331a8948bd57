// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement code generation.

use strata_ast::expr::Expr;
use strata_ast::stmt::{Stmt, StmtKind};

use crate::abi::Reg;
use crate::module::{slot, CodeGenerator, LoopTargets};
use crate::{CodegenError, CodegenResult};

impl<'a> CodeGenerator<'a> {
    pub(crate) fn emit_stmt(&mut self, stmt: &'a Stmt) -> CodegenResult<()> {
        match &stmt.kind {
            StmtKind::Let { name, ty, value, mutable } => {
                let keyword = if *mutable { "var" } else { "let" };
                self.code.comment(format!("{keyword} {name}: {ty}"));
                // The value is evaluated before the name is bound, so
                // `let x = x + 1` reads an outer `x`.
                self.emit_coerced(value, ty)?;
                let offset = self.frame.declare(name, ty.clone(), *mutable);
                self.code.mov(slot(offset), Reg::Rax);
            }
            StmtKind::Assign { target, value } => {
                let var = self
                    .frame
                    .lookup(target)
                    .cloned()
                    .ok_or_else(|| CodegenError::UnresolvedIdentifier(target.clone()))?;
                if !var.mutable {
                    return Err(CodegenError::ImmutableAssignment(target.clone()));
                }
                self.code.comment(format!("{target} = ..."));
                self.emit_coerced(value, &var.ty)?;
                self.code.mov(slot(var.offset), Reg::Rax);
            }
            StmtKind::Expr(expr) => self.emit_discarded(expr)?,
            StmtKind::If { cond, then_body, else_body } => {
                self.emit_if(cond, then_body, else_body.as_deref())?
            }
            StmtKind::While { cond, body } => self.emit_while(cond, body)?,
            StmtKind::For { init, cond, update, body } => {
                self.frame.push_scope();
                let result = self.emit_for(init, cond, update, body);
                self.frame.pop_scope();
                result?
            }
            StmtKind::Return(value) => self.emit_return(value.as_ref())?,
            StmtKind::Break => {
                let target = self.loops.last().ok_or(CodegenError::OutsideLoop("break"))?;
                let label = target.break_label.clone();
                self.code.jmp(&label);
            }
            StmtKind::Continue => {
                let target = self.loops.last().ok_or(CodegenError::OutsideLoop("continue"))?;
                let label = target.continue_label.clone();
                self.code.jmp(&label);
            }
            StmtKind::Func(decl) => {
                return Err(CodegenError::UnsupportedFeature(format!(
                    "nested function '{}'",
                    decl.name
                )));
            }
            StmtKind::Import { name, module } => {
                self.code.comment(format!("import {name} from {module}"));
            }
        }
        Ok(())
    }

    /// Statements in a fresh lexical scope.
    pub(crate) fn emit_block(&mut self, stmts: &'a [Stmt]) -> CodegenResult<()> {
        self.frame.push_scope();
        let result = stmts.iter().try_for_each(|stmt| self.emit_stmt(stmt));
        self.frame.pop_scope();
        result
    }

    /// Body of a loop, with `break`/`continue` bound to the given labels.
    fn emit_loop_body(&mut self, body: &'a [Stmt], break_label: &str, continue_label: &str) -> CodegenResult<()> {
        self.loops.push(LoopTargets {
            break_label: break_label.to_string(),
            continue_label: continue_label.to_string(),
        });
        let result = self.emit_block(body);
        self.loops.pop();
        result
    }

    fn emit_if(&mut self, cond: &'a Expr, then_body: &'a [Stmt], else_body: Option<&'a [Stmt]>) -> CodegenResult<()> {
        let id = self.next_label_id();
        let else_label = format!(".Lelse_{id}");
        let end_label = format!(".Lendif_{id}");

        self.code.comment("if");
        self.emit_expr(cond)?;
        self.code.test_rax_and("jz", &else_label);
        self.emit_block(then_body)?;
        self.code.jmp(&end_label);
        self.code.label(&else_label);
        if let Some(else_body) = else_body {
            self.emit_block(else_body)?;
        }
        self.code.label(&end_label);
        Ok(())
    }

    fn emit_while(&mut self, cond: &'a Expr, body: &'a [Stmt]) -> CodegenResult<()> {
        let id = self.next_label_id();
        let head = format!(".Lwhile_{id}");
        let end = format!(".Lendwhile_{id}");

        self.code.label(&head);
        self.emit_expr(cond)?;
        self.code.test_rax_and("jz", &end);
        self.emit_loop_body(body, &end, &head)?;
        self.code.jmp(&head);
        self.code.label(&end);
        Ok(())
    }

    /// Runs inside the scope that holds the loop variable.
    fn emit_for(&mut self, init: &'a Stmt, cond: &'a Expr, update: &'a Stmt, body: &'a [Stmt]) -> CodegenResult<()> {
        let id = self.next_label_id();
        let head = format!(".Lfor_{id}");
        let step = format!(".Lforupd_{id}");
        let end = format!(".Lendfor_{id}");

        self.emit_stmt(init)?;
        self.code.label(&head);
        self.emit_expr(cond)?;
        self.code.test_rax_and("jz", &end);
        self.emit_loop_body(body, &end, &step)?;
        self.code.label(&step);
        self.emit_stmt(update)?;
        self.code.jmp(&head);
        self.code.label(&end);
        Ok(())
    }

    fn emit_return(&mut self, value: Option<&'a Expr>) -> CodegenResult<()> {
        let decl = self
            .current_fn
            .ok_or_else(|| CodegenError::UnsupportedFeature("return outside of a function".to_string()))?;
        match value {
            Some(value) => self.emit_coerced(value, &decl.ret_ty)?,
            None => self.code.ins("xor eax, eax"),
        }
        self.code.epilogue();
        Ok(())
    }
}
