// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker implementation.

use std::collections::HashMap;

use strata_ast::stmt::{Stmt, StmtKind};
use strata_ast::ty::TypeDef;
use strata_ast::{NodeId, Span};

mod check_expr;
mod check_stmt;
mod errors;

pub use errors::TypeError;

/// A declared function's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub params: Vec<TypeDef>,
    pub ret: TypeDef,
}

/// The checker's output: the inferred type of every expression node.
///
/// The AST is left untouched; later passes look types up by `NodeId`.
#[derive(Debug, Clone, Default)]
pub struct TypedProgram {
    pub node_types: HashMap<NodeId, TypeDef>,
    pub functions: HashMap<String, FnSig>,
}

impl TypedProgram {
    /// Inferred type of an expression, `any` if the node was never checked.
    pub fn type_of(&self, id: NodeId) -> TypeDef {
        self.node_types.get(&id).cloned().unwrap_or(TypeDef::ANY)
    }
}

#[derive(Debug, Clone)]
pub(super) struct Binding {
    pub ty: TypeDef,
    pub mutable: bool,
    /// The declaring statement or parameter.
    pub span: Span,
}

pub struct TypeChecker {
    /// Scope stack for variables (innermost scope last).
    pub(super) scopes: Vec<HashMap<String, Binding>>,
    /// Signatures of every known function.
    pub(super) functions: HashMap<String, FnSig>,
    /// Types assigned to expression nodes.
    pub(super) node_types: HashMap<NodeId, TypeDef>,
    /// Current function's return type (for checking return statements).
    pub(super) current_return_type: Option<TypeDef>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            functions: HashMap::new(),
            node_types: HashMap::new(),
            current_return_type: None,
        }
    }

    /// Validate a whole program, failing on the first violation.
    pub fn check(&mut self, stmts: &[Stmt]) -> Result<(), TypeError> {
        self.declare_functions(stmts)?;
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        tracing::trace!(
            functions = self.functions.len(),
            expressions = self.node_types.len(),
            "type check passed"
        );
        Ok(())
    }

    pub fn into_typed(self) -> TypedProgram {
        TypedProgram {
            node_types: self.node_types,
            functions: self.functions,
        }
    }

    /// Register every top-level function so calls may precede definitions.
    fn declare_functions(&mut self, stmts: &[Stmt]) -> Result<(), TypeError> {
        for stmt in stmts {
            if let StmtKind::Func(decl) = &stmt.kind {
                if self.functions.contains_key(&decl.name) {
                    return Err(TypeError::DuplicateFunction {
                        name: decl.name.clone(),
                        span: stmt.span,
                    });
                }
                self.functions.insert(
                    decl.name.clone(),
                    FnSig { params: decl.param_types(), ret: decl.ret_ty.clone() },
                );
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------------

    pub(super) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub(super) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(super) fn define_local(&mut self, name: String, ty: TypeDef, mutable: bool, span: Span) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Binding { ty, mutable, span });
        }
    }

    pub(super) fn lookup_local(&self, name: &str, span: Span) -> Result<&Binding, TypeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| TypeError::UndefinedVariable { name: name.to_string(), span })
    }
}

/// Type check a program, returning the per-node type table on success.
pub fn typecheck(stmts: &[Stmt]) -> Result<TypedProgram, TypeError> {
    let mut checker = TypeChecker::new();
    checker.check(stmts)?;
    Ok(checker.into_typed())
}
