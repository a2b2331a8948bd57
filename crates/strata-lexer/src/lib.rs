// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the Strata language.
//!
//! Turns source text into a flat, location-tagged token stream for the parser.

mod lexer;

pub use lexer::{LexError, LexErrorKind, Lexer};

/// Tokenize a whole source string, stopping at the first error.
pub fn tokenize(source: &str) -> Result<Vec<strata_ast::token::Token>, LexError> {
    Lexer::new(source).tokenize()
}
