//! Operand and pending stacks of the reduction engine.

use quill_ir::{ExprId, Name, Span};
use quill_registry::{ConstructCollection, ConstructDefinition};

/// A finished subexpression on the operand stack.
///
/// A poisoned operand stands for a subtree that already failed; anything
/// built on it is poisoned too, without a further diagnostic.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Operand {
    pub(crate) id: ExprId,
    pub(crate) span: Span,
    pub(crate) poisoned: bool,
}

/// An operator waiting for its right operand, with the collection it
/// resolves against.
pub(crate) struct PendingOperator<'r> {
    pub(crate) symbol: &'r Name,
    pub(crate) collection: &'r ConstructCollection,
    pub(crate) span: Span,
}

pub(crate) enum Pending<'r> {
    Prefix(PendingOperator<'r>),
    Binary(PendingOperator<'r>),
    /// An open bracket; operators below it are not reduced until it closes.
    Scope(Scope<'r>),
}

impl Pending<'_> {
    pub(crate) fn precedence(&self) -> Option<i32> {
        match self {
            Pending::Prefix(op) | Pending::Binary(op) => Some(op.collection.precedence()),
            Pending::Scope(_) => None,
        }
    }
}

/// An open parenthesized or bracketed list.
pub(crate) struct Scope<'r> {
    pub(crate) kind: ScopeKind<'r>,
    pub(crate) open: Span,
    /// Operand stack height when the scope opened.
    pub(crate) base: usize,
    /// Completed comma-separated entries.
    pub(crate) args: Vec<Operand>,
}

pub(crate) enum ScopeKind<'r> {
    /// `( expr )`
    Group,
    /// `[a, b]`
    Array,
    /// `f(a, b)` for a function set or variadic function.
    Call {
        definition: &'r ConstructDefinition,
        callee: Span,
    },
    /// `T(a, b)` for a type declaration.
    Constructor { type_name: Name, callee: Span },
    /// `x.name(a, b)`
    Method {
        target: Operand,
        name: Name,
        name_span: Span,
    },
    /// `x[i]`
    Index { target: Operand },
    /// `x(a)`
    Invoke { target: Operand },
}

impl ScopeKind<'_> {
    pub(crate) fn opener(&self) -> char {
        match self {
            ScopeKind::Array | ScopeKind::Index { .. } => '[',
            _ => '(',
        }
    }

    pub(crate) fn closer(&self) -> char {
        match self.opener() {
            '[' => ']',
            _ => ')',
        }
    }

    /// Where the finished node starts.
    pub(crate) fn start(&self, open: Span) -> Span {
        match self {
            ScopeKind::Call { callee, .. } | ScopeKind::Constructor { callee, .. } => *callee,
            ScopeKind::Method { target, .. }
            | ScopeKind::Index { target }
            | ScopeKind::Invoke { target } => target.span,
            ScopeKind::Group | ScopeKind::Array => open,
        }
    }
}
