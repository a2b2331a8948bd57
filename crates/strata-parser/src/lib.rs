// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Strata language.
//!
//! Transforms a token stream into an abstract syntax tree.

mod hints;
mod parser;

pub use parser::{ParseError, ParseErrorKind, Parser};
