//! Lowering from arena nodes to closures.
//!
//! Applications are specialized on arity so the common unary and binary
//! cases evaluate their operands into a fixed array instead of a heap
//! vector. Each closure re-enters [`ensure_sufficient_stack`] because
//! evaluation recurses once per tree level, just like lowering does.

use std::sync::Arc;

use quill_ir::{custom, widen_int, EvalResult, Evaluator, ExprArena, ExprId, ExprKind, Value};
use quill_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::CompiledFn;

fn node<F>(f: F) -> CompiledFn
where
    F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Lower the subtree at `id`.
pub fn lower(arena: &ExprArena, id: ExprId) -> CompiledFn {
    ensure_sufficient_stack(|| match arena.kind(id) {
        ExprKind::Literal(c) => {
            let value = arena.constant(c).clone();
            node(move |_| Ok(value.clone()))
        }
        ExprKind::Argument(index) => {
            let index = index as usize;
            node(move |args| {
                args.get(index)
                    .cloned()
                    .ok_or_else(|| custom(format!("argument ${index} was not supplied")))
            })
        }
        ExprKind::Widen(operand) => {
            let inner = lower(arena, operand);
            node(move |args| match inner(args)? {
                Value::Int(n) => Ok(Value::Float(widen_int(n))),
                other => Ok(other),
            })
        }
        ExprKind::Apply { apply, args } => {
            let eval = arena.application(apply).eval.clone();
            let children: SmallVec<[CompiledFn; 4]> =
                arena.list(args).iter().map(|&child| lower(arena, child)).collect();
            apply_node(eval, children)
        }
        ExprKind::Error => node(|_| Err(custom("expression contains unresolved parts"))),
    })
}

fn apply_node(eval: Evaluator, children: SmallVec<[CompiledFn; 4]>) -> CompiledFn {
    match children.as_slice() {
        [] => node(move |_| eval(&[])),
        [operand] => {
            let operand = Arc::clone(operand);
            node(move |args| {
                ensure_sufficient_stack(|| {
                    let value = operand(args)?;
                    eval(std::slice::from_ref(&value))
                })
            })
        }
        [left, right] => {
            let (left, right) = (Arc::clone(left), Arc::clone(right));
            node(move |args| {
                ensure_sufficient_stack(|| {
                    let operands = [left(args)?, right(args)?];
                    eval(&operands)
                })
            })
        }
        _ => node(move |args| {
            ensure_sufficient_stack(|| {
                let values = children
                    .iter()
                    .map(|child| child(args))
                    .collect::<Result<SmallVec<[Value; 4]>, _>>()?;
                eval(&values)
            })
        }),
    }
}
