//! Quill Eval - turns a parsed expression tree into a callable.
//!
//! Lowering walks the arena once and produces a tree of nested closures,
//! one per node, each holding the evaluator its construct resolved to.
//! Invoking the result does no lookups: overloads, widenings and constant
//! values were all settled by the parser.
//!
//! - [`compile`] lowers an arena rooted at an expression
//! - [`CompiledExpression`] is the callable, with its argument map
//! - [`InvokeError`] covers argument mistakes and construct failures

mod compiled;
mod errors;
mod lower;

pub use compiled::{CompiledExpression, CompiledFn};
pub use errors::InvokeError;
pub use lower::lower;

use quill_ir::{ExprArena, ExprId, Name, Type};
use tracing::debug;

/// Lower the tree at `root` into a [`CompiledExpression`].
///
/// `arguments` names the unbound argument slots in index order; `output`
/// is the result type the parser settled on.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = arena.len(), arguments = arguments.len()))]
pub fn compile(arena: &ExprArena, root: ExprId, arguments: Vec<Name>, output: Type) -> CompiledExpression {
    let function = lower(arena, root);
    debug!(output = %output, "compiled");
    CompiledExpression::new(function, arguments, output)
}
