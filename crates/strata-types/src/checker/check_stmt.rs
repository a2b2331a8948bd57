// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement type checking.

use strata_ast::decl::FnDecl;
use strata_ast::expr::Expr;
use strata_ast::stmt::{Stmt, StmtKind};
use strata_ast::ty::TypeDef;

use super::errors::TypeError;
use super::{FnSig, TypeChecker};
use crate::compat::type_compatible;

impl TypeChecker {
    pub(super) fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), TypeError> {
        match &stmt.kind {
            StmtKind::Let { name, ty, value, mutable } => {
                self.expect_type(value, ty)?;
                self.define_local(name.clone(), ty.clone(), *mutable, stmt.span);
            }
            StmtKind::Assign { target, value } => {
                let binding = self.lookup_local(target, stmt.span)?;
                if !binding.mutable {
                    return Err(TypeError::ImmutableAssign {
                        name: target.clone(),
                        span: stmt.span,
                        declared: binding.span,
                    });
                }
                let declared = binding.ty.clone();
                self.expect_type(value, &declared)?;
            }
            StmtKind::Expr(expr) => {
                self.infer_expr(expr)?;
            }
            StmtKind::If { cond, then_body, else_body } => {
                self.expect_type(cond, &TypeDef::BOOL)?;
                self.check_block(then_body)?;
                if let Some(else_body) = else_body {
                    self.check_block(else_body)?;
                }
            }
            StmtKind::While { cond, body } => {
                self.expect_type(cond, &TypeDef::BOOL)?;
                self.check_block(body)?;
            }
            StmtKind::For { init, cond, update, body } => {
                self.push_scope();
                let result = self.check_for(init, cond, update, body);
                self.pop_scope();
                result?;
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt)?,
            StmtKind::Func(decl) => self.check_fn(decl)?,
            StmtKind::Break | StmtKind::Continue | StmtKind::Import { .. } => {}
        }
        Ok(())
    }

    fn check_block(&mut self, stmts: &[Stmt]) -> Result<(), TypeError> {
        self.push_scope();
        let result = stmts.iter().try_for_each(|s| self.check_stmt(s));
        self.pop_scope();
        result
    }

    fn check_for(&mut self, init: &Stmt, cond: &Expr, update: &Stmt, body: &[Stmt]) -> Result<(), TypeError> {
        self.check_stmt(init)?;
        self.expect_type(cond, &TypeDef::BOOL)?;
        self.check_stmt(update)?;
        self.check_block(body)
    }

    fn check_return(&mut self, value: Option<&Expr>, stmt: &Stmt) -> Result<(), TypeError> {
        let Some(expected) = self.current_return_type.clone() else {
            return Err(TypeError::ReturnOutsideFunction { span: stmt.span });
        };
        match value {
            Some(value) => self.expect_type(value, &expected),
            None if expected.is_void() || expected.is_any() => Ok(()),
            None => Err(TypeError::MissingReturnValue { expected, span: stmt.span }),
        }
    }

    /// Functions see only their own parameters and locals, never the
    /// enclosing top-level bindings.
    fn check_fn(&mut self, decl: &FnDecl) -> Result<(), TypeError> {
        self.functions
            .entry(decl.name.clone())
            .or_insert_with(|| FnSig { params: decl.param_types(), ret: decl.ret_ty.clone() });

        let outer_scopes = std::mem::replace(&mut self.scopes, vec![Default::default()]);
        let outer_return = self.current_return_type.replace(decl.ret_ty.clone());

        for param in &decl.params {
            self.define_local(param.name.clone(), param.ty.clone(), false, param.span);
        }
        let result = self.check_block(&decl.body);

        self.scopes = outer_scopes;
        self.current_return_type = outer_return;
        result
    }

    /// Infer `expr` and require it to fit into `expected`.
    pub(super) fn expect_type(&mut self, expr: &Expr, expected: &TypeDef) -> Result<(), TypeError> {
        let found = self.infer_expr(expr)?;
        if type_compatible(&found, expected) {
            Ok(())
        } else {
            Err(TypeError::Mismatch {
                expected: expected.clone(),
                found,
                span: expr.span,
            })
        }
    }
}
