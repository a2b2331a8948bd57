// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Fixed runtime support: the four print thunks and their format strings.

use strata_ast::ty::{Primitive, TypeDef};

use crate::abi::CallingConvention;
use crate::builder::Builder;

/// Which print thunk a value is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrintKind {
    Int,
    Float,
    Bool,
    Str,
}

impl PrintKind {
    pub const ALL: [PrintKind; 4] = [PrintKind::Int, PrintKind::Float, PrintKind::Str, PrintKind::Bool];

    /// Chars, `any` and everything else print as integers.
    pub fn for_type(ty: &TypeDef) -> Self {
        match ty.base() {
            Primitive::Float => PrintKind::Float,
            Primitive::Bool => PrintKind::Bool,
            Primitive::Str => PrintKind::Str,
            _ => PrintKind::Int,
        }
    }

    pub fn thunk(self) -> &'static str {
        match self {
            PrintKind::Int => "_print_int",
            PrintKind::Float => "_print_float",
            PrintKind::Bool => "_print_bool",
            PrintKind::Str => "_print_str",
        }
    }
}

/// Each thunk receives its value in the first argument register (`xmm0`
/// for floats) and forwards it to `printf`.
pub(crate) fn emit_thunks(out: &mut Builder, abi: CallingConvention) {
    for kind in PrintKind::ALL {
        out.label(kind.thunk());
        out.ins("push rbp");
        out.ins("mov rbp, rsp");
        out.ins("sub rsp, 32");
        for line in thunk_body(kind, abi) {
            out.ins(line);
        }
        out.call("printf");
        out.epilogue();
        out.nl();
    }
}

fn thunk_body(kind: PrintKind, abi: CallingConvention) -> &'static [&'static str] {
    use CallingConvention::*;
    match (kind, abi) {
        (PrintKind::Int, Win64) => &["mov rdx, rcx", "lea rcx, [fmt_int]"],
        // Variadic floats travel in both the xmm and the integer register.
        (PrintKind::Float, Win64) => &["movsd xmm1, xmm0", "movq rdx, xmm1", "lea rcx, [fmt_float]"],
        (PrintKind::Str, Win64) => &["mov rdx, rcx", "lea rcx, [fmt_str]"],
        (PrintKind::Bool, Win64) => &[
            "test ecx, ecx",
            "lea rdx, [str_true]",
            "lea rax, [str_false]",
            "cmovz rdx, rax",
            "lea rcx, [fmt_str]",
        ],
        (PrintKind::Int, SystemV) => &["mov rsi, rdi", "lea rdi, [fmt_int]", "xor eax, eax"],
        (PrintKind::Float, SystemV) => &["lea rdi, [fmt_float]", "mov eax, 1"],
        (PrintKind::Str, SystemV) => &["mov rsi, rdi", "lea rdi, [fmt_str]", "xor eax, eax"],
        (PrintKind::Bool, SystemV) => &[
            "test edi, edi",
            "lea rsi, [str_true]",
            "lea rax, [str_false]",
            "cmovz rsi, rax",
            "lea rdi, [fmt_str]",
            "xor eax, eax",
        ],
    }
}

/// Format and boolean strings that precede the literal table in `.data`.
pub(crate) const DATA_PREAMBLE: &[&str] = &[
    "fmt_int: db \"%lld\", 10, 0",
    "fmt_float: db \"%g\", 10, 0",
    "fmt_str: db \"%s\", 10, 0",
    "str_true: db \"true\", 0",
    "str_false: db \"false\", 0",
];
