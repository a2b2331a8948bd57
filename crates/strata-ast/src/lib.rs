// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Strata language.
//!
//! This crate defines the nodes shared between the lexer, parser,
//! type checker, and code generator.

pub mod decl;
pub mod expr;
pub mod span;
pub mod stmt;
pub mod token;
pub mod ty;

pub use span::{LineMap, Location, Span};

/// Unique identifier for AST nodes.
///
/// The type checker keys its inferred-type table by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}
