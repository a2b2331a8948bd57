// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declared types.

use std::fmt;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    Int,
    Float,
    Bool,
    Char,
    Str,
    Any,
    /// Only valid as a function return type.
    Void,
}

impl Primitive {
    /// Resolve a type name as written in source, including the sized aliases.
    pub fn from_name(name: &str) -> Option<Primitive> {
        Some(match name {
            "int" | "i32" | "i64" => Primitive::Int,
            "float" | "f32" | "f64" => Primitive::Float,
            "bool" => Primitive::Bool,
            "char" => Primitive::Char,
            "string" => Primitive::Str,
            "any" => Primitive::Any,
            "void" => Primitive::Void,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::Str => "string",
            Primitive::Any => "any",
            Primitive::Void => "void",
        }
    }
}

/// A type as it appears in declarations and in the checker's environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDef {
    Primitive(Primitive),
    Optional(Box<TypeDef>),
}

impl TypeDef {
    pub const INT: TypeDef = TypeDef::Primitive(Primitive::Int);
    pub const FLOAT: TypeDef = TypeDef::Primitive(Primitive::Float);
    pub const BOOL: TypeDef = TypeDef::Primitive(Primitive::Bool);
    pub const CHAR: TypeDef = TypeDef::Primitive(Primitive::Char);
    pub const STRING: TypeDef = TypeDef::Primitive(Primitive::Str);
    pub const ANY: TypeDef = TypeDef::Primitive(Primitive::Any);
    pub const VOID: TypeDef = TypeDef::Primitive(Primitive::Void);

    pub fn optional(inner: TypeDef) -> TypeDef {
        TypeDef::Optional(Box::new(inner))
    }

    pub fn is_any(&self) -> bool {
        *self == TypeDef::ANY
    }

    pub fn is_void(&self) -> bool {
        *self == TypeDef::VOID
    }

    /// The primitive underneath any number of `?` wrappers.
    pub fn base(&self) -> Primitive {
        match self {
            TypeDef::Primitive(p) => *p,
            TypeDef::Optional(inner) => inner.base(),
        }
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDef::Primitive(p) => f.write_str(p.name()),
            TypeDef::Optional(inner) => write!(f, "{inner}?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_names() {
        assert_eq!(Primitive::from_name("i64"), Some(Primitive::Int));
        assert_eq!(Primitive::from_name("f32"), Some(Primitive::Float));
        assert_eq!(Primitive::from_name("number"), None);
    }

    #[test]
    fn optional_display_and_base() {
        let ty = TypeDef::optional(TypeDef::FLOAT);
        assert_eq!(ty.to_string(), "float?");
        assert_eq!(ty.base(), Primitive::Float);
        assert!(!ty.is_any());
    }
}
