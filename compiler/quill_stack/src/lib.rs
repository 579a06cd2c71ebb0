//! Stack safety for recursive walks over expression trees.
//!
//! The reduction engine is iterative, but everything that runs after it
//! (lowering to closures, argument rebinding, visitors, evaluation of the
//! lowered closures) recurses once per tree level. A formula such as
//! `-(-(-(...)))` nested a few hundred thousand levels deep would blow the
//! default thread stack, so those walks go through [`ensure_sufficient_stack`].
//!
//! - **Native targets** grow the stack on demand with `stacker`.
//! - **WASM targets** call straight through.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn lower(&self, id: ExprId) -> CompiledFn {
///     ensure_sufficient_stack(|| match self.arena.kind(id) {
///         ExprKind::Widen(inner) => { let inner = self.lower(inner); ... }
///         ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
