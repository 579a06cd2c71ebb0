//! Copying an expression tree with its argument slots remapped.
//!
//! Binding never touches the source arena. The tree is copied node by node
//! into a fresh arena; each argument read is either renumbered or replaced
//! by the bound constant.

use quill_ir::{ExprArena, ExprId, ExprKind, Value};
use quill_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

/// What becomes of one argument slot.
#[derive(Clone, Debug)]
pub(crate) enum Slot {
    /// Still unbound, now at this index.
    Keep(u32),
    /// Replaced by a constant.
    Bind(Value),
}

/// Copy the tree at `root`, applying `slots` by old argument index.
pub(crate) fn rebind(arena: &ExprArena, root: ExprId, slots: &[Slot]) -> (ExprArena, ExprId) {
    let mut rewriter = Rewriter {
        from: arena,
        to: ExprArena::new(),
        slots,
    };
    let root = rewriter.copy(root);
    (rewriter.to, root)
}

struct Rewriter<'a> {
    from: &'a ExprArena,
    to: ExprArena,
    slots: &'a [Slot],
}

impl Rewriter<'_> {
    fn copy(&mut self, id: ExprId) -> ExprId {
        ensure_sufficient_stack(|| {
            let from = self.from;
            let span = from.span(id);
            match from.kind(id) {
                ExprKind::Literal(c) => self.to.alloc_literal(from.constant(c).clone(), span),
                ExprKind::Argument(index) => match self.slots.get(index as usize) {
                    Some(Slot::Keep(new)) => self.to.alloc_argument(*new, from.ty(id).clone(), span),
                    Some(Slot::Bind(value)) => self.to.alloc_literal(value.clone(), span),
                    None => self.to.alloc_error(span),
                },
                ExprKind::Widen(operand) => {
                    let operand = self.copy(operand);
                    self.to.alloc_widen(operand)
                }
                ExprKind::Apply { apply, args } => {
                    let children: SmallVec<[ExprId; 4]> =
                        from.list(args).iter().map(|&child| self.copy(child)).collect();
                    self.to.alloc_apply(
                        from.application(apply).clone(),
                        &children,
                        from.ty(id).clone(),
                        span,
                    )
                }
                ExprKind::Error => self.to.alloc_error(span),
            }
        })
    }
}
