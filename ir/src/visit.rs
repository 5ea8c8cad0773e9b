//! Traversal and rebuilding of expression trees.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::{Expr, Op, Result};

/// Direct children in a fixed per-op order.
///
/// `For` yields `[var, min, extent, body]`; `TensorLoad` yields its indices
/// only (the tensor body is a separate tree).
pub fn children(expr: &Expr) -> SmallVec<[&Arc<Expr>; 4]> {
    match expr.op() {
        Op::Const(_) | Op::Var { .. } => SmallVec::new(),
        Op::Unary(_, x) | Op::Cast(x) => smallvec::smallvec![x],
        Op::Binary(_, a, b) => smallvec::smallvec![a, b],
        Op::Select { cond, on_true, on_false } => smallvec::smallvec![cond, on_true, on_false],
        Op::TensorLoad { indices, .. } => indices.iter().collect(),
        Op::Load { index, .. } => smallvec::smallvec![index],
        Op::Store { index, value, .. } => smallvec::smallvec![index, value],
        Op::For { var, min, extent, body, .. } => smallvec::smallvec![var, min, extent, body],
        Op::IfThen { cond, body } => smallvec::smallvec![cond, body],
        Op::Allocate { body, .. } => smallvec::smallvec![body],
        Op::Block(stmts) => stmts.iter().collect(),
        Op::Sequence { effect, value } => smallvec::smallvec![effect, value],
        Op::CallExtern { args, .. } => args.iter().collect(),
    }
}

/// Rebuild `expr` with new children (same order as [`children`]) through the
/// checked constructors, so folding applies to the result.
pub fn rebuild(expr: &Arc<Expr>, new: &[Arc<Expr>]) -> Result<Arc<Expr>> {
    Ok(match expr.op() {
        Op::Const(_) | Op::Var { .. } => expr.clone(),
        Op::Unary(op, _) => Expr::try_unary(*op, &new[0])?,
        Op::Cast(_) => Expr::cast(&new[0], expr.dtype()),
        Op::Binary(op, _, _) => Expr::try_binary(*op, &new[0], &new[1])?,
        Op::Select { .. } => Expr::try_select(&new[0], &new[1], &new[2])?,
        Op::TensorLoad { tensor, .. } => Expr::tensor_load(tensor, new)?,
        Op::Load { buffer, .. } => Expr::try_load(buffer, &new[0])?,
        Op::Store { buffer, .. } => Expr::try_store(buffer, &new[0], &new[1])?,
        Op::For { kind, .. } => Expr::for_loop(&new[0], &new[1], &new[2], *kind, &new[3])?,
        Op::IfThen { .. } => Expr::if_then(&new[0], &new[1])?,
        Op::Allocate { buffer, .. } => Expr::allocate(buffer, &new[0])?,
        Op::Block(_) => Expr::block(new.to_vec()),
        Op::Sequence { .. } => Expr::sequence(&new[0], &new[1]),
        Op::CallExtern { name, .. } => Expr::call_extern(name.clone(), new, expr.dtype()),
    })
}

/// Apply `f` to every child and rebuild when any child changed.
pub fn map_children<F>(expr: &Arc<Expr>, mut f: F) -> Result<Arc<Expr>>
where
    F: FnMut(&Arc<Expr>) -> Result<Arc<Expr>>,
{
    let old = children(expr);
    if old.is_empty() {
        return Ok(expr.clone());
    }
    let new = old.iter().map(|child| f(child)).collect::<Result<Vec<_>>>()?;
    if old.iter().zip(&new).all(|(a, b)| Arc::ptr_eq(a, b)) {
        return Ok(expr.clone());
    }
    rebuild(expr, &new)
}

/// Replace variables (by node id) throughout `expr`.
pub fn substitute(expr: &Arc<Expr>, map: &HashMap<u64, Arc<Expr>>) -> Result<Arc<Expr>> {
    fn go(expr: &Arc<Expr>, map: &HashMap<u64, Arc<Expr>>, memo: &mut HashMap<u64, Arc<Expr>>) -> Result<Arc<Expr>> {
        if let Some(done) = memo.get(&expr.id) {
            return Ok(done.clone());
        }
        let out = match map.get(&expr.id) {
            Some(replacement) if expr.is_var() => replacement.clone(),
            _ => map_children(expr, |child| go(child, map, memo))?,
        };
        memo.insert(expr.id, out.clone());
        Ok(out)
    }

    if map.is_empty() {
        return Ok(expr.clone());
    }
    go(expr, map, &mut HashMap::new())
}

/// Re-run constant folding bottom-up over the whole tree.
pub fn simplify(expr: &Arc<Expr>) -> Result<Arc<Expr>> {
    fn go(expr: &Arc<Expr>, memo: &mut HashMap<u64, Arc<Expr>>) -> Result<Arc<Expr>> {
        if let Some(done) = memo.get(&expr.id) {
            return Ok(done.clone());
        }
        let children = children(expr);
        let out = if children.is_empty() {
            expr.clone()
        } else {
            let new = children.iter().map(|child| go(child, memo)).collect::<Result<Vec<_>>>()?;
            rebuild(expr, &new)?
        };
        memo.insert(expr.id, out.clone());
        Ok(out)
    }

    go(expr, &mut HashMap::new())
}

/// Pre-order walk over `expr` and its descendants.
pub fn walk<F: FnMut(&Arc<Expr>)>(expr: &Arc<Expr>, f: &mut F) {
    f(expr);
    for child in children(expr) {
        walk(child, f);
    }
}

/// True if any `For` node occurs in `expr`.
pub fn contains_loop(expr: &Arc<Expr>) -> bool {
    let mut found = false;
    walk(expr, &mut |e| found |= matches!(e.op(), Op::For { .. }));
    found
}
