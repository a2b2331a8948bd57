// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! End-to-end tests: Strata source in, NASM text out.

use pretty_assertions::assert_eq;
use strata_compiler::{
    compile, compile_with, write_assembly, CallingConvention, CodegenConfig, CompileError, CompileOptions,
};

const FACTORIAL: &str = r#"
import io from std::io

func fact(n: int) => int {
    if (n <= 1) {
        return 1
    }
    return n * fact(n - 1)
}

var total: int = 0
for (var i: int = 1; i <= 5; i++) {
    total = total + fact(i)
}
io.println("sum of factorials:")
io.print(total)
"#;

const MIXED: &str = r#"
func average(a: int, b: int) => float {
    let sum: float = a + b
    return sum / 2.0
}

let avg: float = average(3, 4)
let big: bool = avg > 3 && avg < 10.0
io.print(avg)
io.print(big)
var count: int = 10
while (count > 0) {
    count--
    if (count % 2 == 0) { continue }
    if (count < 3) { break }
    io.print(count)
}
"#;

fn lines(asm: &str) -> Vec<&str> {
    asm.lines().map(str::trim).collect()
}

#[test]
fn same_input_same_output() {
    for abi in [CallingConvention::Win64, CallingConvention::SystemV] {
        let a = compile(FACTORIAL, abi).unwrap();
        let b = compile(FACTORIAL, abi).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn factorial_program() {
    let asm = compile(FACTORIAL, CallingConvention::SystemV).unwrap();
    let lines = lines(&asm);

    assert!(lines.contains(&"fn_fact:"));
    assert!(lines.contains(&"call fn_fact"));
    assert!(lines.contains(&"call _print_str"));
    assert!(lines.contains(&"call _print_int"));
    assert!(lines.contains(&"; import io from std::io"));
    // The string literal lands in .data after the fixed format strings.
    let data = asm.find("section .data").unwrap();
    assert!(asm[data..].contains("lit_0: db 115, 117, 109"));
}

#[test]
fn mixed_program_uses_sse_and_loops() {
    let asm = compile(MIXED, CallingConvention::Win64).unwrap();
    let lines = lines(&asm);
    assert!(lines.contains(&"cvtsi2sd xmm0, rax"));
    assert!(lines.contains(&"divsd xmm0, xmm1"));
    assert!(lines.contains(&"call _print_float"));
    assert!(lines.contains(&"call _print_bool"));
    assert!(lines.iter().any(|l| l.starts_with("jmp .Lwhile_")));
    assert!(lines.iter().any(|l| l.starts_with("jmp .Lendwhile_")));
    assert!(lines.contains(&"call ExitProcess"));
}

#[test]
fn abis_differ_only_where_they_must() {
    let win = compile("io.print(1)", CallingConvention::Win64).unwrap();
    let sys = compile("io.print(1)", CallingConvention::SystemV).unwrap();
    assert!(win.contains("mov rcx, 1"));
    assert!(sys.contains("mov rdi, 1"));
    assert!(win.contains("extern ExitProcess"));
    assert!(!sys.contains("extern ExitProcess"));
}

#[test]
fn comments_can_be_turned_off() {
    let options = CompileOptions {
        codegen: CodegenConfig {
            abi: CallingConvention::SystemV,
            emit_comments: false,
        },
    };
    let quiet = compile_with(FACTORIAL, &options).unwrap();
    let loud = compile(FACTORIAL, CallingConvention::SystemV).unwrap();
    let strip = |asm: &str| -> Vec<String> {
        asm.lines()
            .filter(|l| !l.trim_start().starts_with(';'))
            .map(String::from)
            .collect()
    };
    assert_eq!(strip(&quiet), strip(&loud));
    assert!(loud.len() > quiet.len());
}

#[test]
fn each_phase_reports_its_own_errors() {
    let cases = [
        ("let s: string = 'x'", "lex"),
        ("let x: int = (1 + 2", "parse"),
        ("let x: int = true", "check"),
        ("var i: int = 0\ncontinue", "codegen"),
    ];
    for (src, phase) in cases {
        let err = compile(src, CallingConvention::SystemV).unwrap_err();
        assert_eq!(err.phase(), phase, "{src:?}: {err}");
    }
}

#[test]
fn failed_compilation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bad.asm");
    let result = compile("let x: int = \"no\"", CallingConvention::SystemV)
        .and_then(|asm| write_assembly(&out, &asm));
    assert!(matches!(result, Err(CompileError::Type { .. })));
    assert!(!out.exists());
}

#[test]
fn successful_compilation_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("fact.asm");
    let asm = compile(FACTORIAL, CallingConvention::SystemV).unwrap();
    write_assembly(&out, &asm).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), asm);
}
