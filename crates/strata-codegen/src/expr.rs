// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression code generation.
//!
//! Every expression leaves its value in `rax`. Floats travel as raw IEEE-754
//! bits in `rax` and only visit `xmm0`/`xmm1` for arithmetic.

use strata_ast::expr::{BinOp, Expr, ExprKind, Literal, UnaryOp};
use strata_ast::ty::{Primitive, TypeDef};

use crate::abi::Reg;
use crate::module::{fn_label, slot, CodeGenerator};
use crate::runtime::PrintKind;
use crate::{CodegenError, CodegenResult};

/// Member names routed to the print thunks.
const PRINT_METHODS: &[&str] = &["print", "println"];

impl<'a> CodeGenerator<'a> {
    pub(crate) fn emit_expr(&mut self, expr: &'a Expr) -> CodegenResult<()> {
        match &expr.kind {
            ExprKind::Literal(Literal::Float(_)) => {
                self.load_into(expr, Reg::Rax)?;
                self.code.ins("movq xmm0, rax");
            }
            ExprKind::Literal(_) | ExprKind::Ident(_) => self.load_into(expr, Reg::Rax)?,
            ExprKind::Binary { op, left, right } if op.is_logical() => {
                self.emit_logical(*op, left, right)?
            }
            ExprKind::Binary { op, left, right } => self.emit_binary(*op, left, right)?,
            ExprKind::Unary { op, operand } => self.emit_unary(*op, operand)?,
            ExprKind::Call { callee, args } => self.emit_call(callee, args)?,
            ExprKind::Member { object, property } => {
                return Err(CodegenError::UnsupportedFeature(format!(
                    "member access '{}.{property}' outside of a call",
                    member_path(object)
                )));
            }
        }
        Ok(())
    }

    /// Static type of an expression. Literals and locals are answered
    /// directly, everything else comes from the checker.
    pub(crate) fn type_of(&self, expr: &Expr) -> TypeDef {
        match &expr.kind {
            ExprKind::Literal(lit) => lit.static_type(),
            ExprKind::Ident(name) => match self.frame.lookup(name) {
                Some(var) => var.ty.clone(),
                None => self.types.type_of(expr.id),
            },
            _ => self.types.type_of(expr.id),
        }
    }

    /// Put the value of `expr` in `reg`. Literals and locals are loaded
    /// straight into the register; anything else goes through `rax`.
    fn load_into(&mut self, expr: &'a Expr, reg: Reg) -> CodegenResult<()> {
        match &expr.kind {
            ExprKind::Literal(Literal::Int(n)) => self.code.mov(reg, n),
            ExprKind::Literal(Literal::Bool(b)) => self.code.mov(reg, u8::from(*b)),
            ExprKind::Literal(Literal::Float(f)) => {
                self.code.mov(reg, format!("0x{:016X}", f.to_bits()))
            }
            ExprKind::Literal(Literal::Str(s)) => {
                let label = self.strings.add(s);
                self.code.ins(format!("lea {reg}, [{label}]"));
            }
            ExprKind::Ident(name) => {
                let var = self
                    .frame
                    .lookup(name)
                    .ok_or_else(|| CodegenError::UnresolvedIdentifier(name.clone()))?;
                let src = slot(var.offset);
                self.code.mov(reg, src);
            }
            _ => {
                self.emit_expr(expr)?;
                if reg != Reg::Rax {
                    self.code.mov(reg, Reg::Rax);
                }
            }
        }
        Ok(())
    }

    /// Evaluate `expr` and convert the result to `target` if one side is
    /// `int` and the other `float`.
    pub(crate) fn emit_coerced(&mut self, expr: &'a Expr, target: &TypeDef) -> CodegenResult<()> {
        let from = self.type_of(expr);
        self.emit_expr(expr)?;
        self.coerce(&from, target);
        Ok(())
    }

    fn coerce(&mut self, from: &TypeDef, to: &TypeDef) {
        match (from.base(), to.base()) {
            (Primitive::Int, Primitive::Float) => {
                self.code.ins("cvtsi2sd xmm0, rax");
                self.code.ins("movq rax, xmm0");
            }
            (Primitive::Float, Primitive::Int) => {
                self.code.ins("movq xmm0, rax");
                self.code.ins("cvttsd2si rax, xmm0");
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    fn emit_binary(&mut self, op: BinOp, left: &'a Expr, right: &'a Expr) -> CodegenResult<()> {
        let left_ty = self.type_of(left);
        let right_ty = self.type_of(right);
        if left_ty.base() == Primitive::Str || right_ty.base() == Primitive::Str {
            return Err(CodegenError::UnsupportedFeature(format!(
                "operator '{}' on strings",
                op.symbol()
            )));
        }

        // Arithmetic follows the left operand; a comparison is done in
        // floating point when either side is a float.
        let float = left_ty.base() == Primitive::Float
            || (op.is_comparison() && right_ty.base() == Primitive::Float);
        if float && op == BinOp::Mod {
            return Err(CodegenError::UnsupportedFeature("'%' on floats".to_string()));
        }
        let operand_ty = if float { TypeDef::FLOAT } else { TypeDef::INT };

        self.emit_expr(left)?;
        self.coerce(&left_ty, &operand_ty);
        self.push_rax();
        self.emit_expr(right)?;
        self.coerce(&right_ty, &operand_ty);
        self.code.mov(Reg::Rcx, Reg::Rax);
        self.pop(Reg::Rax);

        if float {
            self.float_op(op);
        } else {
            self.int_op(op);
        }
        Ok(())
    }

    fn int_op(&mut self, op: BinOp) {
        let set = match op {
            BinOp::Add => return self.code.ins("add rax, rcx"),
            BinOp::Sub => return self.code.ins("sub rax, rcx"),
            BinOp::Mul => return self.code.ins("imul rax, rcx"),
            BinOp::Div | BinOp::Mod => {
                self.code.ins("cqo");
                self.code.ins("idiv rcx");
                if op == BinOp::Mod {
                    self.code.mov(Reg::Rax, Reg::Rdx);
                }
                return;
            }
            BinOp::Eq => "sete",
            BinOp::Ne => "setne",
            BinOp::Lt => "setl",
            BinOp::Gt => "setg",
            BinOp::Le => "setle",
            BinOp::Ge => "setge",
            BinOp::And | BinOp::Or => unreachable!("logical operators short-circuit"),
        };
        self.code.ins("cmp rax, rcx");
        self.code.ins(format!("{set} al"));
        self.code.ins("movzx rax, al");
    }

    fn float_op(&mut self, op: BinOp) {
        self.code.ins("movq xmm0, rax");
        self.code.ins("movq xmm1, rcx");
        let arith = match op {
            BinOp::Add => Some("addsd"),
            BinOp::Sub => Some("subsd"),
            BinOp::Mul => Some("mulsd"),
            BinOp::Div => Some("divsd"),
            _ => None,
        };
        if let Some(instr) = arith {
            self.code.ins(format!("{instr} xmm0, xmm1"));
            self.code.ins("movq rax, xmm0");
            return;
        }
        // ucomisd sets the unsigned-compare flags.
        let set = match op {
            BinOp::Eq => "sete",
            BinOp::Ne => "setne",
            BinOp::Lt => "setb",
            BinOp::Gt => "seta",
            BinOp::Le => "setbe",
            BinOp::Ge => "setae",
            _ => unreachable!("'{}' has no float form", op.symbol()),
        };
        self.code.ins("ucomisd xmm0, xmm1");
        self.code.ins(format!("{set} al"));
        self.code.ins("movzx rax, al");
    }

    /// `&&` and `||`; the right operand is skipped once the result is known.
    fn emit_logical(&mut self, op: BinOp, left: &'a Expr, right: &'a Expr) -> CodegenResult<()> {
        let id = self.next_label_id();
        let (short, jump, short_value, end) = match op {
            BinOp::And => (format!(".Land_false_{id}"), "jz", 0, format!(".Land_end_{id}")),
            _ => (format!(".Lor_true_{id}"), "jnz", 1, format!(".Lor_end_{id}")),
        };

        self.emit_expr(left)?;
        self.code.test_rax_and(jump, &short);
        self.emit_expr(right)?;
        self.code.test_rax_and(jump, &short);
        self.code.mov(Reg::Rax, 1 - short_value);
        self.code.jmp(&end);
        self.code.label(&short);
        self.code.mov(Reg::Rax, short_value);
        self.code.label(&end);
        Ok(())
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &'a Expr) -> CodegenResult<()> {
        let float = self.type_of(operand).base() == Primitive::Float;
        self.emit_expr(operand)?;
        match op {
            UnaryOp::Neg if float => self.code.ins("btc rax, 63"),
            UnaryOp::Neg => self.code.ins("neg rax"),
            UnaryOp::Plus => {}
            UnaryOp::Not => {
                self.code.ins("test rax, rax");
                self.code.ins("setz al");
                self.code.ins("movzx rax, al");
            }
            UnaryOp::BitNot => self.code.ins("not rax"),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    fn emit_call(&mut self, callee: &'a Expr, args: &'a [Expr]) -> CodegenResult<()> {
        match &callee.kind {
            ExprKind::Member { object, property } if PRINT_METHODS.contains(&property.as_str()) => {
                self.emit_print(object, args)?;
                self.code.ins("xor eax, eax");
                Ok(())
            }
            ExprKind::Member { object, property } => Err(CodegenError::UnsupportedFeature(format!(
                "call to module function '{}.{property}'",
                member_path(object)
            ))),
            ExprKind::Ident(name) => self.emit_user_call(name, args),
            _ => Err(CodegenError::UnsupportedFeature("call of a computed callee".to_string())),
        }
    }

    /// Evaluate `expr` for its side effects only.
    ///
    /// A print in statement position skips zeroing `rax` for a result nobody reads.
    pub(crate) fn emit_discarded(&mut self, expr: &'a Expr) -> CodegenResult<()> {
        if let ExprKind::Call { callee, args } = &expr.kind {
            if let ExprKind::Member { object, property } = &callee.kind {
                if PRINT_METHODS.contains(&property.as_str()) {
                    return self.emit_print(object, args);
                }
            }
        }
        self.emit_expr(expr)
    }

    /// One thunk call per argument, each picked by the argument's type.
    ///
    /// A receiver that is not a module path (`mk().print(x)`) is evaluated
    /// first and its value dropped.
    fn emit_print(&mut self, receiver: &'a Expr, args: &'a [Expr]) -> CodegenResult<()> {
        if !is_module_path(receiver) {
            self.emit_expr(receiver)?;
        }
        for arg in args {
            let kind = PrintKind::for_type(&self.type_of(arg));
            let padded = self.align_for_call(0);
            if kind == PrintKind::Float {
                self.emit_expr(arg)?;
                if !matches!(arg.kind, ExprKind::Literal(Literal::Float(_))) {
                    self.code.ins("movq xmm0, rax");
                }
            } else {
                self.load_into(arg, self.abi().first_arg())?;
            }
            self.finish_call(kind.thunk(), 0, padded);
        }
        Ok(())
    }

    fn emit_user_call(&mut self, name: &str, args: &'a [Expr]) -> CodegenResult<()> {
        let decl = *self
            .functions
            .get(name)
            .ok_or_else(|| CodegenError::FunctionNotFound(name.to_string()))?;
        if decl.params.len() != args.len() {
            return Err(CodegenError::UnsupportedFeature(format!(
                "call to '{name}' with {} arguments, expected {}",
                args.len(),
                decl.params.len()
            )));
        }

        let regs = self.abi().param_registers();
        let in_regs = args.len().min(regs.len());
        let on_stack = args.len() - in_regs;
        let padded = self.align_for_call(on_stack);

        for (arg, param) in args.iter().zip(&decl.params).skip(in_regs).rev() {
            self.emit_coerced(arg, &param.ty)?;
            self.push_rax();
        }

        // Literals and locals cannot clobber earlier registers, so they load
        // directly. Anything else is staged on the stack first.
        let direct = args[..in_regs]
            .iter()
            .zip(&decl.params)
            .all(|(arg, param)| is_leaf(arg) && !needs_conversion(&self.type_of(arg), &param.ty));
        if direct {
            for (arg, reg) in args.iter().zip(regs).take(in_regs) {
                self.load_into(arg, *reg)?;
            }
        } else {
            for (arg, param) in args.iter().zip(&decl.params).take(in_regs) {
                self.emit_coerced(arg, &param.ty)?;
                self.push_rax();
            }
            for reg in regs[..in_regs].iter().rev() {
                self.pop(*reg);
            }
        }

        self.finish_call(&fn_label(name), on_stack, padded);
        Ok(())
    }

    /// Pad the stack so that `rsp` is 16-byte aligned once `stack_args`
    /// more values are pushed. Returns whether padding was added.
    fn align_for_call(&mut self, stack_args: usize) -> bool {
        let padded = (self.depth + stack_args) % 2 == 1;
        if padded {
            self.code.ins("sub rsp, 8");
            self.depth += 1;
        }
        padded
    }

    /// Shadow space, the call itself, and cleanup of stack arguments,
    /// shadow space and padding.
    fn finish_call(&mut self, target: &str, stack_args: usize, padded: bool) {
        let shadow = self.abi().shadow_space();
        if shadow > 0 {
            self.code.ins(format!("sub rsp, {shadow}"));
        }
        self.code.call(target);
        let popped = stack_args + usize::from(padded);
        let cleanup = shadow + 8 * popped;
        if cleanup > 0 {
            self.code.ins(format!("add rsp, {cleanup}"));
        }
        self.depth -= popped;
    }

    pub(crate) fn push_rax(&mut self) {
        self.code.push(Reg::Rax);
        self.depth += 1;
    }

    pub(crate) fn pop(&mut self, reg: Reg) {
        self.code.pop(reg);
        self.depth -= 1;
    }
}

fn is_leaf(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Literal(_) | ExprKind::Ident(_))
}

fn needs_conversion(from: &TypeDef, to: &TypeDef) -> bool {
    matches!(
        (from.base(), to.base()),
        (Primitive::Int, Primitive::Float) | (Primitive::Float, Primitive::Int)
    )
}

/// `a.b.c` for diagnostics.
/// `io`, `std::io`, `a.b`: names only, nothing to evaluate.
fn is_module_path(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Member { object, .. } => is_module_path(object),
        _ => false,
    }
}

fn member_path(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Member { object, property } => format!("{}.{property}", member_path(object)),
        _ => "<expr>".to_string(),
    }
}
