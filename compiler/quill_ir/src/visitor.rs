//! Read-only traversal of an expression tree.
//!
//! Override the `visit_*` hooks to observe specific nodes; call the `walk_*`
//! functions from an override to keep descending. Traversal is pre-order
//! with children in evaluation order.

use crate::{ApplyId, ConstId, ExprArena, ExprId, ExprKind, ExprRange};

/// Expression tree visitor.
pub trait Visitor<'a> {
    fn visit_expr(&mut self, id: ExprId, arena: &'a ExprArena) {
        walk_expr(self, id, arena);
    }

    fn visit_literal(&mut self, _id: ExprId, _constant: ConstId, _arena: &'a ExprArena) {}

    fn visit_argument(&mut self, _id: ExprId, _index: u32, _arena: &'a ExprArena) {}

    fn visit_apply(&mut self, _id: ExprId, apply: ApplyId, args: ExprRange, arena: &'a ExprArena) {
        let _ = apply;
        for &arg in arena.list(args) {
            self.visit_expr(arg, arena);
        }
    }

    fn visit_widen(&mut self, _id: ExprId, operand: ExprId, arena: &'a ExprArena) {
        self.visit_expr(operand, arena);
    }

    fn visit_error(&mut self, _id: ExprId, _arena: &'a ExprArena) {}
}

/// Dispatch `id` to the matching hook.
pub fn walk_expr<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, id: ExprId, arena: &'a ExprArena) {
    quill_stack::ensure_sufficient_stack(|| match arena.kind(id) {
        ExprKind::Literal(constant) => visitor.visit_literal(id, constant, arena),
        ExprKind::Argument(index) => visitor.visit_argument(id, index, arena),
        ExprKind::Apply { apply, args } => visitor.visit_apply(id, apply, args, arena),
        ExprKind::Widen(operand) => visitor.visit_widen(id, operand, arena),
        ExprKind::Error => visitor.visit_error(id, arena),
    });
}

/// Which unbound argument slots the tree rooted at `root` reads.
///
/// Returns one flag per slot in `0..arity`.
pub fn referenced_arguments(arena: &ExprArena, root: ExprId, arity: usize) -> Vec<bool> {
    struct Collect {
        used: Vec<bool>,
    }

    impl<'a> Visitor<'a> for Collect {
        fn visit_argument(&mut self, _id: ExprId, index: u32, _arena: &'a ExprArena) {
            if let Some(slot) = self.used.get_mut(index as usize) {
                *slot = true;
            }
        }
    }

    let mut collect = Collect {
        used: vec![false; arity],
    };
    collect.visit_expr(root, arena);
    collect.used
}
