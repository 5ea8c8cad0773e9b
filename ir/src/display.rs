//! C-like rendering of expressions and lowered functions for logs and tests.

use std::fmt::{self, Display, Formatter, Write};

use crate::lower::{ArgKind, LoweredFunc};
use crate::{Expr, ForKind, Op, UnaryOp};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.op() {
            Op::Const(v) => write!(f, "{v}"),
            Op::Var { name } => f.write_str(name),
            Op::Unary(UnaryOp::Neg, x) => write!(f, "(-{x})"),
            Op::Unary(UnaryOp::Not, x) => write!(f, "(!{x})"),
            Op::Unary(UnaryOp::Floor, x) => write!(f, "floor({x})"),
            Op::Binary(op, a, b) => match op.symbol() {
                Some(sym) => write!(f, "({a} {sym} {b})"),
                None => write!(f, "{}({a}, {b})", format!("{op:?}").to_lowercase()),
            },
            Op::Select { cond, on_true, on_false } => write!(f, "select({cond}, {on_true}, {on_false})"),
            Op::Cast(x) => write!(f, "({}){x}", self.dtype().c_style()),
            Op::TensorLoad { tensor, indices } => {
                write!(f, "{}(", tensor.name())?;
                write_list(f, indices.iter())?;
                f.write_char(')')
            }
            Op::Load { buffer, index } => write!(f, "{}[{index}]", buffer.name()),
            Op::CallExtern { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args.iter())?;
                f.write_char(')')
            }
            Op::Sequence { effect, value } => write!(f, "({{ {} }}, {value})", effect.op_name()),
            Op::Store { .. } | Op::For { .. } | Op::IfThen { .. } | Op::Allocate { .. } | Op::Block(_) => {
                let mut out = String::new();
                write_stmt(&mut out, self, 0)?;
                f.write_str(out.trim_end())
            }
        }
    }
}

impl Expr {
    fn op_name(&self) -> &'static str {
        match self.op() {
            Op::Store { .. } => "store",
            Op::For { .. } => "for",
            Op::IfThen { .. } => "if",
            Op::Allocate { .. } => "allocate",
            Op::Block(_) => "block",
            _ => "expr",
        }
    }
}

fn write_list<'a>(f: &mut Formatter<'_>, items: impl Iterator<Item = &'a std::sync::Arc<Expr>>) -> fmt::Result {
    for (k, item) in items.enumerate() {
        if k > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn loop_annotation(kind: ForKind) -> String {
    match kind {
        ForKind::Serial => String::new(),
        ForKind::Parallel => "parallel ".into(),
        ForKind::Vectorized(lanes) => format!("vectorized({lanes}) "),
        ForKind::Unrolled => "unroll ".into(),
        ForKind::GpuBlock(axis) => format!("blockIdx.{} ", axis.suffix()),
        ForKind::GpuThread(axis) => format!("threadIdx.{} ", axis.suffix()),
    }
}

fn write_stmt(out: &mut String, stmt: &Expr, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match stmt.op() {
        Op::Store { buffer, index, value } => match value.op() {
            // Hoist the effect so reductions read as loops ahead of the store.
            Op::Sequence { effect, value } => {
                write_stmt(out, effect, depth)?;
                writeln!(out, "{pad}{}[{index}] = {value};", buffer.name())
            }
            _ => writeln!(out, "{pad}{}[{index}] = {value};", buffer.name()),
        },
        Op::For { var, min, extent, kind, body } => {
            writeln!(out, "{pad}{}for ({var} = {min}; {var} < {min} + {extent}; {var}++) {{", loop_annotation(*kind))?;
            write_stmt(out, body, depth + 1)?;
            writeln!(out, "{pad}}}")
        }
        Op::IfThen { cond, body } => {
            writeln!(out, "{pad}if {cond} {{")?;
            write_stmt(out, body, depth + 1)?;
            writeln!(out, "{pad}}}")
        }
        Op::Allocate { buffer, body } => {
            let len = buffer.len().map_or_else(|| "?".to_string(), |n| n.to_string());
            writeln!(out, "{pad}{} {}[{len}];", buffer.dtype().c_style(), buffer.name())?;
            write_stmt(out, body, depth)
        }
        Op::Block(stmts) => stmts.iter().try_for_each(|s| write_stmt(out, s, depth)),
        Op::Sequence { effect, value } => {
            write_stmt(out, effect, depth)?;
            writeln!(out, "{pad}{value};")
        }
        _ => writeln!(out, "{pad}{stmt};"),
    }
}

impl Display for LoweredFunc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "void {}(", self.name)?;
        for (k, arg) in self.args.iter().enumerate() {
            if k > 0 {
                f.write_str(", ")?;
            }
            let qualifier = if arg.kind == ArgKind::Input { "const " } else { "" };
            write!(f, "{qualifier}{}* {}", arg.buffer.dtype().c_style(), arg.buffer.name())?;
        }
        f.write_str(") {\n")?;
        let mut body = String::new();
        write_stmt(&mut body, &self.body, 1)?;
        f.write_str(&body)?;
        f.write_str("}")
    }
}
