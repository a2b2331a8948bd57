// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps codes (E0001, E0200, ...) to a short title and the phase that
//! reports them.

use std::collections::BTreeMap;
use std::fmt;

/// Every code the compiler can emit.
pub struct ErrorCodeRegistry {
    codes: BTreeMap<&'static str, ErrorCodeInfo>,
}

pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Type,
    Codegen,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Syntax => write!(f, "Syntax"),
            ErrorCategory::Type => write!(f, "Type"),
            ErrorCategory::Codegen => write!(f, "Codegen"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = BTreeMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer (E00xx)
                "E0001" => ("unexpected character", Lexical),
                "E0002" => ("unterminated string literal", Lexical),
                "E0003" => ("invalid number literal", Lexical),

                // Parser (E01xx)
                "E0100" => ("unexpected token", Syntax),
                "E0101" => ("unknown type", Syntax),
                "E0102" => ("invalid assignment target", Syntax),

                // Type checker (E02xx)
                "E0200" => ("mismatched types", Type),
                "E0201" => ("undefined variable", Type),
                "E0202" => ("undefined function", Type),
                "E0203" => ("assignment to immutable variable", Type),
                "E0204" => ("wrong number of arguments", Type),
                "E0205" => ("return outside of function", Type),
                "E0206" => ("missing return value", Type),
                "E0207" => ("duplicate function", Type),

                // Code generator (E03xx)
                "E0300" => ("unresolved identifier", Codegen),
                "E0301" => ("function not found", Codegen),
                "E0302" => ("duplicate function", Codegen),
                "E0303" => ("assignment to immutable variable", Codegen),
                "E0304" => ("loop control outside of loop", Codegen),
                "E0305" => ("unsupported construct", Codegen),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    /// All codes in ascending order.
    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_hundreds() {
        let registry = ErrorCodeRegistry::default();
        for info in registry.all() {
            let expected = match &info.code[..3] {
                "E00" => ErrorCategory::Lexical,
                "E01" => ErrorCategory::Syntax,
                "E02" => ErrorCategory::Type,
                "E03" => ErrorCategory::Codegen,
                other => panic!("unexpected code family {other}"),
            };
            assert_eq!(info.category, expected, "{}", info.code);
        }
    }

    #[test]
    fn lookup() {
        let registry = ErrorCodeRegistry::default();
        assert_eq!(registry.get("E0200").map(|i| i.title), Some("mismatched types"));
        assert!(registry.get("E9999").is_none());
    }
}
