// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.

use strata_ast::token::{Keyword, TokenKind};

/// Get a hint for an "expected X" error based on what was found instead.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("`:`", TokenKind::Eq) => Some("declarations need a type: `let x: int = 1`"),
        ("`:`", _) => Some("syntax: name: type"),

        ("`=`", TokenKind::Eof) => Some("a declaration needs an initial value"),

        ("`{`", _) => Some("blocks start with '{'"),
        ("`}`", _) => Some("every '{' needs a matching '}'"),

        ("`(`", TokenKind::Ident(_)) => Some("conditions are wrapped in parentheses: `if (x) { }`"),
        ("`)`", TokenKind::Eof) => Some("add ')' to close the parenthesis"),

        ("`;`", _) => Some("`for` headers are `for (init; condition; update)`"),

        ("`from`", _) => Some("syntax: import name from module"),

        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Eof) => Some("statement is incomplete"),
        ("expression", TokenKind::Keyword(Keyword::Else)) => Some("`else` must follow the closing '}' of an `if`"),
        ("expression", _) => Some("try a value, variable, or function call"),

        ("a name", TokenKind::Number) => Some("names can't start with a number"),
        ("a name", TokenKind::Keyword(_)) => Some("reserved words can't be used as names"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("type", _) => Some("try a type like 'int', 'float', 'bool', 'char', 'string' or 'any'"),

        _ => None,
    }
}
