// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Codegen tests: source text through the checker to NASM text.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strata_ast::stmt::Stmt;
    use strata_types::TypedProgram;

    use crate::{generate, CallingConvention, CodegenConfig, CodegenError};

    // ── Pipeline helpers ────────────────────────────────────────

    fn parse(src: &str) -> Vec<Stmt> {
        let tokens = strata_lexer::tokenize(src).expect("lex errors");
        strata_parser::Parser::new(tokens).parse_program().expect("parse errors")
    }

    fn config(abi: CallingConvention) -> CodegenConfig {
        CodegenConfig { abi, emit_comments: false }
    }

    fn compile(src: &str, abi: CallingConvention) -> String {
        let stmts = parse(src);
        let types = strata_types::typecheck(&stmts).expect("type errors");
        generate(&stmts, &types, config(abi)).expect("codegen failed")
    }

    fn sysv(src: &str) -> String {
        compile(src, CallingConvention::SystemV)
    }

    /// Generate without running the checker, for errors only codegen sees.
    fn codegen_err(src: &str) -> CodegenError {
        let stmts = parse(src);
        generate(&stmts, &TypedProgram::default(), config(CallingConvention::SystemV))
            .expect_err("expected a codegen error")
    }

    // ── Assertion helpers ───────────────────────────────────────

    /// Trimmed lines from `label:` up to the blank line ending the function.
    fn block<'s>(asm: &'s str, label: &str) -> Vec<&'s str> {
        let header = format!("{label}:");
        asm.lines()
            .skip_while(|l| *l != header)
            .take_while(|l| !l.is_empty())
            .map(str::trim)
            .collect()
    }

    fn position(lines: &[&str], needle: &str) -> usize {
        lines
            .iter()
            .position(|l| *l == needle)
            .unwrap_or_else(|| panic!("`{needle}` not found in:\n{}", lines.join("\n")))
    }

    /// `expected` appears as consecutive lines.
    fn assert_seq(lines: &[&str], expected: &[&str]) {
        assert!(
            lines.windows(expected.len()).any(|w| w == expected),
            "expected sequence:\n{}\nin:\n{}",
            expected.join("\n"),
            lines.join("\n")
        );
    }

    // ── Layout ──────────────────────────────────────────────────

    #[test]
    fn generation_is_deterministic() {
        let src = "func sq(n: int) => int { return n * n }\n\
                   var i: int = 0\n\
                   while (i < 4) { io.print(sq(i)); io.print(\"x\"); i++ }";
        for abi in [CallingConvention::SystemV, CallingConvention::Win64] {
            assert_eq!(compile(src, abi), compile(src, abi));
        }
    }

    #[test]
    fn let_and_print_end_to_end() {
        let asm = sysv("let x: int = 42\nio.print(x)");
        assert_eq!(
            block(&asm, "main"),
            vec![
                "main:",
                "push rbp",
                "mov rbp, rsp",
                "sub rsp, 16",
                "mov rax, 42",
                "mov [rbp-8], rax",
                "mov rdi, [rbp-8]",
                "call _print_int",
                "xor eax, eax",
                "mov rsp, rbp",
                "pop rbp",
                "ret",
            ]
        );
    }

    #[test]
    fn win64_print_reserves_shadow_space() {
        let asm = compile("let x: int = 42\nio.print(x)", CallingConvention::Win64);
        let main = block(&asm, "main");
        assert_seq(
            &main,
            &["mov rcx, [rbp-8]", "sub rsp, 32", "call _print_int", "add rsp, 32"],
        );
    }

    #[test]
    fn abi_specific_header_and_exit() {
        let win = compile("io.print(1)", CallingConvention::Win64);
        assert!(win.lines().any(|l| l == "extern ExitProcess"));
        assert_seq(
            &block(&win, "main"),
            &["xor ecx, ecx", "sub rsp, 32", "call ExitProcess"],
        );

        let sys = sysv("io.print(1)");
        assert!(!sys.contains("ExitProcess"));
        assert!(sys.lines().any(|l| l == "extern printf"));
        assert!(sys.lines().any(|l| l == "default rel"));
        assert!(sys.lines().any(|l| l == "global main"));
    }

    #[test]
    fn sections_in_order() {
        let asm = sysv("io.print(\"hi\")");
        let text = asm.find("section .text").unwrap();
        let data = asm.find("section .data").unwrap();
        let bss = asm.find("section .bss").unwrap();
        assert!(text < data && data < bss);
        // Thunks come before main.
        assert!(asm.find("_print_bool:").unwrap() < asm.find("main:").unwrap());
    }

    #[test]
    fn every_string_literal_gets_a_label() {
        let asm = sysv("io.print(\"hi\")\nio.print(\"hi\")");
        let main = block(&asm, "main");
        position(&main, "lea rdi, [lit_0]");
        position(&main, "lea rdi, [lit_1]");
        assert!(asm.lines().any(|l| l == "lit_0: db 104, 105, 0"));
        assert!(asm.lines().any(|l| l == "lit_1: db 104, 105, 0"));
    }

    #[test]
    fn comments_follow_config() {
        let stmts = parse("let x: int = 1");
        let types = strata_types::typecheck(&stmts).unwrap();
        let with = generate(&stmts, &types, CodegenConfig::for_abi(CallingConvention::SystemV)).unwrap();
        assert!(with.lines().any(|l| l.trim() == "; let x: int"));
        let without = sysv("let x: int = 1");
        assert!(!without.lines().any(|l| l.starts_with("    ;")));
    }

    // ── Expressions ─────────────────────────────────────────────

    #[test]
    fn and_skips_the_right_operand() {
        let asm = sysv("func side() => bool { return true }\nlet r: bool = false && side()");
        let main = block(&asm, "main");
        let jump = position(&main, "jz .Land_false_0");
        let call = position(&main, "call fn_side");
        assert!(jump < call);
        assert_seq(&main, &["mov rax, 0", "test rax, rax", "jz .Land_false_0"]);
        assert_seq(&main, &[".Land_false_0:", "mov rax, 0", ".Land_end_0:"]);
    }

    #[test]
    fn or_jumps_on_true() {
        let asm = sysv("let a: bool = true || false");
        let main = block(&asm, "main");
        assert_seq(&main, &["mov rax, 1", "test rax, rax", "jnz .Lor_true_0"]);
        assert_seq(&main, &[".Lor_true_0:", "mov rax, 1", ".Lor_end_0:"]);
    }

    #[test]
    fn integer_arithmetic_and_comparison() {
        let asm = sysv("let a: int = 7 % 3\nlet b: bool = a <= 2");
        let main = block(&asm, "main");
        assert_seq(
            &main,
            &["mov rax, 7", "push rax", "mov rax, 3", "mov rcx, rax", "pop rax", "cqo", "idiv rcx", "mov rax, rdx"],
        );
        assert_seq(&main, &["cmp rax, rcx", "setle al", "movzx rax, al"]);
    }

    #[test]
    fn int_widens_to_float_on_store() {
        let asm = sysv("let f: float = 10");
        assert_seq(
            &block(&asm, "main"),
            &["mov rax, 10", "cvtsi2sd xmm0, rax", "movq rax, xmm0", "mov [rbp-8], rax"],
        );
    }

    #[test]
    fn float_literals_are_raw_bits() {
        let asm = sysv("let g: float = 2.5");
        assert_seq(&block(&asm, "main"), &["mov rax, 0x4004000000000000", "movq xmm0, rax"]);
    }

    #[test]
    fn float_arithmetic_uses_sse() {
        let asm = sysv("let a: float = 1.5\nlet b: float = a * 2");
        assert_seq(
            &block(&asm, "main"),
            &[
                "mov rax, 2",
                "cvtsi2sd xmm0, rax",
                "movq rax, xmm0",
                "mov rcx, rax",
                "pop rax",
                "movq xmm0, rax",
                "movq xmm1, rcx",
                "mulsd xmm0, xmm1",
                "movq rax, xmm0",
            ],
        );
    }

    #[test]
    fn float_comparison_uses_unsigned_flags() {
        let asm = sysv("let a: float = 1.5\nlet b: bool = a < 2.0");
        assert_seq(&block(&asm, "main"), &["ucomisd xmm0, xmm1", "setb al", "movzx rax, al"]);
    }

    #[test]
    fn unary_operators() {
        let asm = sysv("let a: int = -5\nlet b: float = -2.5\nlet c: bool = !true\nlet d: int = ~0");
        let main = block(&asm, "main");
        assert_seq(&main, &["mov rax, 5", "neg rax"]);
        position(&main, "btc rax, 63");
        assert_seq(&main, &["mov rax, 1", "test rax, rax", "setz al", "movzx rax, al"]);
        assert_seq(&main, &["mov rax, 0", "not rax"]);
    }

    #[test]
    fn print_routes_by_type() {
        let asm = sysv("io.print(1.5)\nio.print(true)\nio.println(\"s\")");
        let main = block(&asm, "main");
        assert_seq(&main, &["mov rax, 0x3FF8000000000000", "movq xmm0, rax", "call _print_float"]);
        assert_seq(&main, &["mov rdi, 1", "call _print_bool"]);
        assert_seq(&main, &["lea rdi, [lit_0]", "call _print_str"]);
    }

    #[test]
    fn print_receiver_side_effects_run_first() {
        let asm = sysv("func mk() => int {\n io.print(99)\n return 1\n}\nmk().print(5)");
        let main = block(&asm, "main");
        let call = position(&main, "call fn_mk");
        let print = position(&main, "call _print_int");
        assert!(call < print);
        // Module paths are names, not values.
        let plain = sysv("io.print(5)");
        assert!(!block(&plain, "main").iter().any(|l| l.contains("fn_")));
    }

    #[test]
    fn print_value_is_zero_only_when_used() {
        let stmt = block(&sysv("io.print(1)"), "main").join("\n");
        assert_eq!(stmt.matches("xor eax, eax").count(), 1);

        let used = sysv("let r: any = io.print(1)");
        assert_seq(&block(&used, "main"), &["call _print_int", "xor eax, eax", "mov [rbp-8], rax"]);
    }

    // ── Calls and frames ────────────────────────────────────────

    #[test]
    fn empty_frame_skips_stack_reservation() {
        let asm = sysv("func zero() => int { return 0 }");
        let body = block(&asm, "fn_zero");
        assert_eq!(&body[..3], ["fn_zero:", "push rbp", "mov rbp, rsp"]);
        assert!(!body.iter().any(|l| l.starts_with("sub rsp")));
    }

    #[test]
    fn function_frame_and_explicit_return() {
        let asm = sysv("func id(n: int) => int { return n }");
        assert_eq!(
            block(&asm, "fn_id"),
            vec![
                "fn_id:",
                "push rbp",
                "mov rbp, rsp",
                "sub rsp, 16",
                "mov [rbp-8], rdi",
                "mov rax, [rbp-8]",
                "mov rsp, rbp",
                "pop rbp",
                "ret",
            ]
        );
    }

    #[test]
    fn function_without_return_gets_implicit_epilogue() {
        let asm = sysv("func hello() { io.print(1) }");
        let body = block(&asm, "fn_hello");
        assert_eq!(&body[body.len() - 4..], ["xor eax, eax", "mov rsp, rbp", "pop rbp", "ret"]);
        // Empty frame, no stack reservation.
        assert_eq!(&body[..3], ["fn_hello:", "push rbp", "mov rbp, rsp"]);
        assert_eq!(body[3], "mov rdi, 1");
    }

    #[test]
    fn nested_call_is_aligned() {
        let asm = sysv("func one() => int { return 1 }\nio.print(2 + one())");
        assert_seq(
            &block(&asm, "main"),
            &[
                "push rax",
                "sub rsp, 8",
                "call fn_one",
                "add rsp, 8",
                "mov rcx, rax",
                "pop rax",
                "add rax, rcx",
                "mov rdi, rax",
                "call _print_int",
            ],
        );
    }

    #[test]
    fn arguments_beyond_registers_go_on_the_stack() {
        let src = "func last(a: int, b: int, c: int, d: int, e: int, f: int, g: int) => int { return g }\n\
                   io.print(last(1, 2, 3, 4, 5, 6, 7))";
        let asm = sysv(src);
        assert_seq(&block(&asm, "fn_last"), &["mov [rbp-48], r9", "mov rax, [rbp+16]", "mov [rbp-56], rax"]);
        assert_seq(
            &block(&asm, "main"),
            &[
                "sub rsp, 8",
                "mov rax, 7",
                "push rax",
                "mov rdi, 1",
                "mov rsi, 2",
                "mov rdx, 3",
                "mov rcx, 4",
                "mov r8, 5",
                "mov r9, 6",
                "call fn_last",
                "add rsp, 16",
            ],
        );

        let win = compile(
            "func five(a: int, b: int, c: int, d: int, e: int) => int { return e }",
            CallingConvention::Win64,
        );
        assert_seq(&block(&win, "fn_five"), &["mov rax, [rbp+48]", "mov [rbp-40], rax"]);
    }

    #[test]
    fn complex_arguments_are_staged_on_the_stack() {
        let asm = sysv("func add(a: int, b: int) => int { return a + b }\nlet r: int = add(1 + 2, 3)");
        assert_seq(
            &block(&asm, "main"),
            &["push rax", "mov rax, 3", "push rax", "pop rsi", "pop rdi", "call fn_add"],
        );
    }

    #[test]
    fn arguments_widen_to_parameter_types() {
        let asm = sysv("func half(x: float) => float { return x / 2.0 }\nlet h: float = half(3)");
        assert_seq(
            &block(&asm, "main"),
            &["mov rax, 3", "cvtsi2sd xmm0, rax", "movq rax, xmm0", "push rax", "pop rdi", "call fn_half"],
        );
    }

    #[test]
    fn float_operand_narrows_in_integer_arithmetic() {
        let asm = sysv("let a: int = 1 + 2.5");
        assert_seq(
            &block(&asm, "main"),
            &["movq xmm0, rax", "cvttsd2si rax, xmm0", "mov rcx, rax", "pop rax", "add rax, rcx"],
        );
    }

    #[test]
    fn return_narrows_float_to_int() {
        // The checker rejects this; codegen still converts at the boundary.
        let stmts = parse("func trunc(x: float) => int { return x }");
        let asm = generate(&stmts, &TypedProgram::default(), config(CallingConvention::SystemV)).unwrap();
        assert_seq(
            &block(&asm, "fn_trunc"),
            &["mov rax, [rbp-8]", "movq xmm0, rax", "cvttsd2si rax, xmm0", "mov rsp, rbp"],
        );
    }

    // ── Control flow ────────────────────────────────────────────

    #[test]
    fn if_else_layout() {
        let asm = sysv("let a: int = 1\nif (a > 0) { io.print(1) } else { io.print(2) }");
        let main = block(&asm, "main");
        let jz = position(&main, "jz .Lelse_0");
        let jmp = position(&main, "jmp .Lendif_0");
        let else_label = position(&main, ".Lelse_0:");
        let end = position(&main, ".Lendif_0:");
        assert!(jz < jmp && jmp < else_label && else_label < end);
    }

    #[test]
    fn nested_loops_resolve_break_and_continue() {
        let src = "var i: int = 0\n\
                   while (i < 3) {\n\
                     for (var j: int = 0; j < 3; j++) {\n\
                       if (j == 1) { continue }\n\
                       if (j == 2) { break }\n\
                     }\n\
                     i = i + 1\n\
                     if (i == 2) { continue }\n\
                   }";
        let asm = sysv(src);
        let main = block(&asm, "main");

        let for_head = position(&main, ".Lfor_1:");
        let inner_continue = position(&main, "jmp .Lforupd_1");
        let inner_break = position(&main, "jmp .Lendfor_1");
        let step = position(&main, ".Lforupd_1:");
        let for_end = position(&main, ".Lendfor_1:");
        assert!(for_head < inner_continue && inner_continue < inner_break && inner_break < step);

        let outer_continue = main[for_end..]
            .iter()
            .position(|l| *l == "jmp .Lwhile_0")
            .map(|i| i + for_end)
            .unwrap();
        assert!(outer_continue < position(&main, ".Lendif_4:"));
        assert_seq(&main, &["jmp .Lwhile_0", ".Lendwhile_0:"]);
    }

    #[test]
    fn loop_variable_lives_in_its_own_slot() {
        let asm = sysv("for (var i: int = 0; i < 2; i++) { let sq: int = i * i }\nlet after: int = 1");
        let main = block(&asm, "main");
        assert_eq!(main[3], "sub rsp, 32");
        position(&main, "mov [rbp-24], rax");
    }

    // ── Errors ──────────────────────────────────────────────────

    #[test]
    fn unresolved_identifier() {
        assert_eq!(
            codegen_err("io.print(y)"),
            CodegenError::UnresolvedIdentifier("y".to_string())
        );
    }

    #[test]
    fn break_and_continue_outside_loops() {
        assert_eq!(codegen_err("break"), CodegenError::OutsideLoop("break"));
        assert_eq!(codegen_err("continue"), CodegenError::OutsideLoop("continue"));
    }

    #[test]
    fn assignment_to_immutable() {
        assert_eq!(
            codegen_err("let n: int = 1\nn = 2"),
            CodegenError::ImmutableAssignment("n".to_string())
        );
    }

    #[test]
    fn unknown_and_duplicate_functions() {
        assert_eq!(codegen_err("missing(1)"), CodegenError::FunctionNotFound("missing".to_string()));
        assert_eq!(
            codegen_err("func f() { }\nfunc f() { }"),
            CodegenError::DuplicateFunction("f".to_string())
        );
    }

    #[test]
    fn unsupported_constructs() {
        for src in [
            "return 1",
            "func outer() { func inner() { } }",
            "let s: string = \"a\"\nlet t: string = s + s",
            "let x: float = 1.5 % 2.0",
            "io.read(1)",
        ] {
            assert!(
                matches!(codegen_err(src), CodegenError::UnsupportedFeature(_)),
                "expected unsupported for {src:?}"
            );
        }
    }
}
