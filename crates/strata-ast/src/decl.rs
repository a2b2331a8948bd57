// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Function declarations.

use crate::stmt::Stmt;
use crate::ty::TypeDef;
use crate::Span;

/// `func name(params) => ret { body }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_ty: TypeDef,
    pub body: Vec<Stmt>,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub ty: TypeDef,
    pub span: Span,
}

impl FnDecl {
    pub fn param_types(&self) -> Vec<TypeDef> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}
