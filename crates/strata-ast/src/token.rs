// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::{Location, Span};

/// A token produced by the lexer.
///
/// `text` is the exact source slice, so concatenating token texts with the
/// original separators reproduces the input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub location: Location,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Reserved words. The lexer tags them, the parser gives them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Keyword {
    Let,
    Const,
    Var,
    Func,
    Return,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    Import,
    From,
    True,
    False,
}

/// The fixed reserved-word set.
pub const KEYWORDS: &[(&str, Keyword)] = &[
    ("let", Keyword::Let),
    ("const", Keyword::Const),
    ("var", Keyword::Var),
    ("func", Keyword::Func),
    ("return", Keyword::Return),
    ("if", Keyword::If),
    ("else", Keyword::Else),
    ("while", Keyword::While),
    ("for", Keyword::For),
    ("break", Keyword::Break),
    ("continue", Keyword::Continue),
    ("import", Keyword::Import),
    ("from", Keyword::From),
    ("true", Keyword::True),
    ("false", Keyword::False),
];

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS.iter().find(|(w, _)| *w == word).map(|&(_, k)| k)
    }

    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(w, _)| *w)
            .unwrap_or("<keyword>")
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Digits with an optional fraction; int vs float is decided by the parser.
    Number,
    /// String literal with escapes already decoded.
    Str(String),
    Ident(String),
    Keyword(Keyword),

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Eq,         // =
    EqEq,       // ==
    BangEq,     // !=
    Lt,         // <
    Gt,         // >
    LtEq,       // <=
    GtEq,       // >=
    AmpAmp,     // &&
    PipePipe,   // ||
    Bang,       // !
    Tilde,      // ~
    FatArrow,   // =>
    PlusPlus,   // ++
    MinusMinus, // --
    ColonColon, // ::
    Question,   // ?

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semi,
    Dot,

    Eof,
}

impl TokenKind {
    /// Short description used in "expected X, found Y" messages.
    pub fn display_name(&self) -> String {
        let fixed = match self {
            TokenKind::Number => "number",
            TokenKind::Str(_) => "string",
            TokenKind::Ident(name) => return format!("identifier `{name}`"),
            TokenKind::Keyword(k) => return format!("`{}`", k.as_str()),
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Eq => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::BangEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Question => "`?`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Semi => "`;`",
            TokenKind::Dot => "`.`",
            TokenKind::Eof => "end of file",
        };
        fixed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_round_trips() {
        for &(word, kw) in KEYWORDS {
            assert_eq!(Keyword::lookup(word), Some(kw));
            assert_eq!(kw.as_str(), word);
        }
        assert_eq!(Keyword::lookup("int"), None);
    }
}
