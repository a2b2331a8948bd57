// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Stack frame layout: one 8-byte slot per local, addressed below `rbp`.

use std::collections::HashMap;

use strata_ast::ty::TypeDef;

const SLOT_SIZE: usize = 8;

/// A local bound to a stack slot at `[rbp - offset]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub offset: usize,
    pub ty: TypeDef,
    pub mutable: bool,
}

/// Per-function frame state.
///
/// Slots are never reclaimed when a scope ends, so the final offset is the
/// frame size.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    scopes: Vec<HashMap<String, Variable>>,
    next_offset: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Allocate a fresh slot in the innermost scope and return its offset.
    pub fn declare(&mut self, name: &str, ty: TypeDef, mutable: bool) -> usize {
        self.next_offset += SLOT_SIZE;
        let offset = self.next_offset;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Variable { offset, ty, mutable });
        }
        offset
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Bytes to reserve in the prologue, rounded up to 16.
    pub fn size(&self) -> usize {
        align16(self.next_offset)
    }
}

pub(crate) fn align16(n: usize) -> usize {
    (n + 15) & !15
}
