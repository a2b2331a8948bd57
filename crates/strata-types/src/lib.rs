// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker for the Strata language.
//!
//! A single validating walk over the AST using a minimal widening rule set.

mod checker;
mod compat;

pub use checker::{typecheck, FnSig, TypeChecker, TypeError, TypedProgram};
pub use compat::type_compatible;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_ast::expr::ExprKind;
    use strata_ast::stmt::{Stmt, StmtKind};
    use strata_ast::ty::TypeDef;

    fn parse(src: &str) -> Vec<Stmt> {
        let tokens = strata_lexer::tokenize(src).expect("lex errors");
        strata_parser::Parser::new(tokens).parse_program().expect("parse errors")
    }

    fn check(src: &str) -> Result<TypedProgram, TypeError> {
        typecheck(&parse(src))
    }

    fn check_err(src: &str) -> TypeError {
        check(src).expect_err("expected a type error")
    }

    #[test]
    fn int_widens_to_float() {
        assert!(check("let x: float = 10").is_ok());
    }

    #[test]
    fn string_into_int_is_a_mismatch() {
        let err = check_err("let y: int = \"hi\"");
        let TypeError::Mismatch { expected, found, span } = &err else {
            panic!("expected mismatch, got {err:?}");
        };
        assert_eq!(expected, &TypeDef::INT);
        assert_eq!(found, &TypeDef::STRING);
        assert_eq!((span.start, span.end), (13, 17));
        assert_eq!(err.to_string(), "type mismatch: expected int, found string");
    }

    #[test]
    fn char_widens_to_string_through_declared_types() {
        assert!(check("func c() => char { return \"x\" }").is_err());
        assert!(check("func c(v: char) => string { return v }").is_ok());
    }

    #[test]
    fn any_is_compatible_both_ways() {
        assert!(check("let a: any = 1\nlet b: string = a").is_ok());
    }

    #[test]
    fn comparisons_and_logic_infer_bool() {
        let typed = check("let a: int = 1\nlet b: bool = a < 2 && a != 3").unwrap();
        assert!(typed.node_types.values().any(|t| *t == TypeDef::BOOL));
        assert!(check("let b: bool = 1 + 2").is_err());
    }

    #[test]
    fn arithmetic_infers_left_operand() {
        // No promotion: `int + float` is an int.
        assert!(check("let a: int = 1 + 2.5").is_ok());
        let err = check_err("let a: int = 2.5 + 1");
        assert!(matches!(err, TypeError::Mismatch { found, .. } if found == TypeDef::FLOAT));
    }

    #[test]
    fn node_types_are_recorded() {
        let stmts = parse("let x: int = 42\nio.print(x)");
        let typed = typecheck(&stmts).unwrap();
        let StmtKind::Expr(call) = &stmts[1].kind else { panic!("expected call") };
        let ExprKind::Call { args, .. } = &call.kind else { panic!("expected call") };
        assert_eq!(typed.type_of(args[0].id), TypeDef::INT);
        assert_eq!(typed.type_of(call.id), TypeDef::ANY);
    }

    #[test]
    fn undefined_variable() {
        let err = check_err("io.print(missing)");
        assert_eq!(err.to_string(), "undefined variable 'missing'");
    }

    #[test]
    fn assignment_rules() {
        assert!(check("var n: int = 0\nn = n + 1").is_ok());
        let err = check_err("let n: int = 0\nn = 1");
        let TypeError::ImmutableAssign { span, declared, .. } = &err else {
            panic!("expected immutable assignment, got {err:?}");
        };
        assert_eq!(declared.start, 0);
        assert!(declared.end <= 15);
        assert_eq!(span.start, 15);
        assert!(matches!(
            check_err("const n: int = 0\nn = 1"),
            TypeError::ImmutableAssign { .. }
        ));
        assert!(matches!(check_err("var s: string = \"\"\ns = 1"), TypeError::Mismatch { .. }));
        assert!(matches!(check_err("z = 1"), TypeError::UndefinedVariable { .. }));
    }

    #[test]
    fn conditions_must_be_bool() {
        assert!(check("if (1 < 2) { }").is_ok());
        let err = check_err("while (1) { }");
        assert!(matches!(err, TypeError::Mismatch { expected, .. } if expected == TypeDef::BOOL));
    }

    #[test]
    fn logical_operands_must_be_bool() {
        assert!(check("let a: any = 1\nlet b: bool = a && !a || true").is_ok());
        let err = check_err("let b: bool = 1.5 && 2");
        let TypeError::Mismatch { expected, found, .. } = &err else {
            panic!("expected mismatch, got {err:?}");
        };
        assert_eq!(*expected, TypeDef::BOOL);
        assert_eq!(*found, TypeDef::FLOAT);

        assert!(matches!(
            check_err("let b: bool = true || 0"),
            TypeError::Mismatch { found, .. } if found == TypeDef::INT
        ));
        assert!(matches!(
            check_err("let c: bool = !7"),
            TypeError::Mismatch { expected, .. } if expected == TypeDef::BOOL
        ));
    }

    #[test]
    fn block_scopes_end_at_the_brace() {
        assert!(matches!(
            check_err("if (true) { let inner: int = 1 }\nio.print(inner)"),
            TypeError::UndefinedVariable { .. }
        ));
        assert!(check("for (var i: int = 0; i < 3; i++) { io.print(i) }").is_ok());
        assert!(check_err("for (var i: int = 0; i < 3; i++) { }\nio.print(i)")
            .to_string()
            .contains("'i'"));
    }

    #[test]
    fn calls_check_arity_and_arguments() {
        let src = "func add(a: int, b: float) => float { return a + b }\n";
        assert!(check(&format!("{src}let r: float = add(1, 2)")).is_ok());

        let err = check_err(&format!("{src}add(1)"));
        assert_eq!(err.to_string(), "function 'add' takes 2 arguments, found 1");

        let err = check_err(&format!("{src}add(1, \"two\")"));
        assert!(matches!(err, TypeError::Mismatch { expected, .. } if expected == TypeDef::FLOAT));

        let err = check_err(&format!("{src}let r: bool = add(1, 2)"));
        assert!(matches!(err, TypeError::Mismatch { found, .. } if found == TypeDef::FLOAT));
    }

    #[test]
    fn functions_are_hoisted() {
        assert!(check("io.print(twice(4))\nfunc twice(n: int) => int { return n * 2 }").is_ok());
        assert!(check("func fact(n: int) => int { if (n <= 1) { return 1 } return n * fact(n - 1) }").is_ok());
    }

    #[test]
    fn unknown_function() {
        assert!(matches!(check_err("nope(1)"), TypeError::UndefinedFunction { .. }));
    }

    #[test]
    fn duplicate_functions() {
        let err = check_err("func f() { }\nfunc f() { }");
        assert!(matches!(err, TypeError::DuplicateFunction { .. }));
    }

    #[test]
    fn return_rules() {
        assert!(matches!(check_err("return 1"), TypeError::ReturnOutsideFunction { .. }));
        assert!(matches!(
            check_err("func f() => int { return }"),
            TypeError::MissingReturnValue { .. }
        ));
        assert!(check("func f() => void { return }").is_ok());
        assert!(matches!(
            check_err("func f() => int { return true }"),
            TypeError::Mismatch { .. }
        ));
    }

    #[test]
    fn parameters_are_immutable() {
        let err = check_err("func f(n: int) => int { n = 2\nreturn n }");
        assert!(matches!(err, TypeError::ImmutableAssign { .. }));
    }

    #[test]
    fn functions_do_not_see_top_level_locals() {
        let err = check_err("let g: int = 1\nfunc f() => int { return g }");
        assert!(matches!(err, TypeError::UndefinedVariable { .. }));
    }

    #[test]
    fn unary_operators() {
        assert!(check("let a: bool = !true\nlet b: int = ~5\nlet c: float = -2.5").is_ok());
        assert!(check("let c: int = -2.5").is_err());
    }

    #[test]
    fn optional_declarations() {
        assert!(check("let a: int? = nothing()\nfunc nothing() => int? { return 1 }").is_err());
        assert!(check("func maybe(v: any) => int? { return v }\nlet a: int? = maybe(1)").is_ok());
    }
}
