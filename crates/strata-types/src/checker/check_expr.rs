// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression type inference.

use strata_ast::expr::{Expr, ExprKind, UnaryOp};
use strata_ast::ty::TypeDef;

use super::errors::TypeError;
use super::TypeChecker;
use crate::compat::type_compatible;

impl TypeChecker {
    /// Infer the type of an expression and record it in the node table.
    pub(super) fn infer_expr(&mut self, expr: &Expr) -> Result<TypeDef, TypeError> {
        let ty = match &expr.kind {
            ExprKind::Literal(lit) => lit.static_type(),
            ExprKind::Ident(name) => self.lookup_local(name, expr.span)?.ty.clone(),
            ExprKind::Binary { op, left, right } if op.is_logical() => {
                self.expect_type(left, &TypeDef::BOOL)?;
                self.expect_type(right, &TypeDef::BOOL)?;
                TypeDef::BOOL
            }
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.infer_expr(left)?;
                self.infer_expr(right)?;
                if op.is_comparison() {
                    TypeDef::BOOL
                } else {
                    left_ty
                }
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                self.expect_type(operand, &TypeDef::BOOL)?;
                TypeDef::BOOL
            }
            ExprKind::Unary { op, operand } => {
                let operand_ty = self.infer_expr(operand)?;
                match op {
                    UnaryOp::BitNot => TypeDef::INT,
                    _ => operand_ty,
                }
            }
            ExprKind::Call { callee, args } => self.infer_call(expr, callee, args)?,
            ExprKind::Member { object, .. } => {
                // Module handles like `io` are not variables.
                if object.as_ident().is_none() {
                    self.infer_expr(object)?;
                }
                TypeDef::ANY
            }
        };
        self.node_types.insert(expr.id, ty.clone());
        Ok(ty)
    }

    fn infer_call(&mut self, call: &Expr, callee: &Expr, args: &[Expr]) -> Result<TypeDef, TypeError> {
        let Some(name) = callee.as_ident() else {
            // Module functions are untyped.
            self.infer_expr(callee)?;
            for arg in args {
                self.infer_expr(arg)?;
            }
            return Ok(TypeDef::ANY);
        };

        let sig = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| TypeError::UndefinedFunction {
                name: name.to_string(),
                span: callee.span,
            })?;

        if sig.params.len() != args.len() {
            return Err(TypeError::ArityMismatch {
                name: name.to_string(),
                expected: sig.params.len(),
                found: args.len(),
                span: call.span,
            });
        }

        for (arg, param_ty) in args.iter().zip(&sig.params) {
            let found = self.infer_expr(arg)?;
            if !type_compatible(&found, param_ty) {
                return Err(TypeError::Mismatch {
                    expected: param_ty.clone(),
                    found,
                    span: arg.span,
                });
            }
        }

        Ok(sig.ret)
    }
}
