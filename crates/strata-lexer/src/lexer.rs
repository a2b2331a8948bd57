// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use strata_ast::token::{Keyword, Token, TokenKind};
use strata_ast::{LineMap, Location, Span};

/// Raw token type for logos - literal values are decoded in a second pass.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    // Same body without the closing quote. Only wins when `Str` cannot match.
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedStr,

    // === Two-character operators ===
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=>")]
    FatArrow,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("::")]
    ColonColon,

    // === Single-character operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
}

/// The lexer for Strata source code.
///
/// Pull tokens one at a time with [`Lexer::next_token`], or drain the whole
/// input with [`Lexer::tokenize`]. Both stop at the first error.
pub struct Lexer<'a> {
    source: &'a str,
    raw: logos::Lexer<'a, RawToken>,
    line_map: LineMap,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            raw: RawToken::lexer(source),
            line_map: LineMap::new(source),
        }
    }

    /// Next token, or an `Eof` token once the input is exhausted.
    ///
    /// Calling this again after `Eof` keeps returning `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let Some(result) = self.raw.next() else {
            let end = self.source.len();
            return Ok(self.make_token(TokenKind::Eof, Span::new(end, end)));
        };

        let range = self.raw.span();
        let span = Span::new(range.start, range.end);

        match result {
            Ok(raw) => {
                let kind = self.convert_token(raw, self.raw.slice(), span)?;
                Ok(self.make_token(kind, span))
            }
            Err(()) => {
                let ch = self.source[span.start..].chars().next().unwrap_or('?');
                Err(LexError::unexpected_char(ch, span.start, self.location(span.start)))
            }
        }
    }

    /// Tokenize the entire source. The final token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::trace!(count = tokens.len(), "lexed source");
        Ok(tokens)
    }

    fn make_token(&self, kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            text: self.source[span.start..span.end].to_string(),
            span,
            location: self.location(span.start),
        }
    }

    fn location(&self, offset: usize) -> Location {
        self.line_map.locate(self.source, offset)
    }

    /// Convert a raw logos token to our TokenKind, decoding literals.
    fn convert_token(&self, raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
        Ok(match raw {
            RawToken::Ident => match Keyword::lookup(slice) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(slice.to_string()),
            },
            RawToken::Int | RawToken::Float => TokenKind::Number,
            RawToken::Str => TokenKind::Str(parse_string(&slice[1..slice.len() - 1])),
            RawToken::UnterminatedStr => {
                return Err(LexError::unterminated_string(span, self.location(span.start)));
            }
            // `logos::skip` never hands these back.
            RawToken::LineComment => unreachable!("comments are skipped by logos"),

            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::ColonColon => TokenKind::ColonColon,

            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Question => TokenKind::Question,

            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Dot => TokenKind::Dot,
        })
    }
}

/// Decode the body of a string literal (quotes already stripped).
fn parse_string(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(parse_escape(escaped));
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Known escapes are translated; anything else stands for itself.
fn parse_escape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

/// What went wrong while lexing. Drives error codes in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedChar,
    UnterminatedString,
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub location: Location,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn unexpected_char(ch: char, pos: usize, location: Location) -> Self {
        let hint = match ch {
            '&' => Some("logical and is written `&&`".to_string()),
            '|' => Some("logical or is written `||`".to_string()),
            '\'' => Some("string literals use double quotes".to_string()),
            _ => None,
        };
        Self {
            kind: LexErrorKind::UnexpectedChar,
            span: Span::new(pos, pos + ch.len_utf8()),
            location,
            message: format!("unexpected character '{}'", ch),
            hint,
        }
    }

    fn unterminated_string(span: Span, location: Location) -> Self {
        Self {
            kind: LexErrorKind::UnterminatedString,
            span,
            location,
            message: "unterminated string literal".to_string(),
            hint: Some("add a closing '\"'".to_string()),
        }
    }
}
