// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The assignment-compatibility rule.

use strata_ast::ty::{Primitive, TypeDef};

/// Whether a value of type `actual` may flow into a slot of type `expected`.
///
/// `any` on either side is always accepted. Otherwise the types must be
/// identical, except for the two implicit widenings `int -> float` and
/// `char -> string`.
pub fn type_compatible(actual: &TypeDef, expected: &TypeDef) -> bool {
    if actual.is_any() || expected.is_any() || actual == expected {
        return true;
    }
    matches!(
        (actual, expected),
        (TypeDef::Primitive(Primitive::Int), TypeDef::Primitive(Primitive::Float))
            | (TypeDef::Primitive(Primitive::Char), TypeDef::Primitive(Primitive::Str))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_is_one_way() {
        assert!(type_compatible(&TypeDef::INT, &TypeDef::FLOAT));
        assert!(!type_compatible(&TypeDef::FLOAT, &TypeDef::INT));
        assert!(type_compatible(&TypeDef::CHAR, &TypeDef::STRING));
        assert!(!type_compatible(&TypeDef::STRING, &TypeDef::CHAR));
    }

    #[test]
    fn any_accepts_and_is_accepted() {
        assert!(type_compatible(&TypeDef::ANY, &TypeDef::BOOL));
        assert!(type_compatible(&TypeDef::optional(TypeDef::INT), &TypeDef::ANY));
    }

    #[test]
    fn optionals_must_match_exactly() {
        let opt_int = TypeDef::optional(TypeDef::INT);
        assert!(type_compatible(&opt_int, &opt_int.clone()));
        assert!(!type_compatible(&TypeDef::INT, &opt_int));
        assert!(!type_compatible(&opt_int, &TypeDef::optional(TypeDef::FLOAT)));
    }
}
