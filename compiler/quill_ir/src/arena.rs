//! Flat expression arena.
//!
//! Struct-of-arrays storage: node kinds, spans and result types live in
//! parallel vectors indexed by [`ExprId`]. Literal values, resolved
//! applications and child lists sit in side pools so that [`ExprKind`]
//! stays `Copy`.
//!
//! An arena holds one expression tree. Nodes are only ever appended, and a
//! node's children are always allocated before it, so every child id is
//! smaller than its parent's.

use std::fmt;

use smallvec::SmallVec;

use crate::{
    ApplyId, ConstId, ConstructId, Evaluator, ExprId, ExprRange, Name, Span, Type, Value,
};

/// Shape of an expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// A constant from the arena's pool (number, string, bound argument,
    /// registered constant).
    Literal(ConstId),
    /// Read of the unbound argument at this position.
    Argument(u32),
    /// A resolved construct applied to its operands or arguments.
    Apply { apply: ApplyId, args: ExprRange },
    /// Implicit `int -> float` widening of the operand.
    Widen(ExprId),
    /// Placeholder for a subtree that failed to resolve. Never present in
    /// an arena that parsed without errors.
    Error,
}

/// Syntactic position a construct was applied in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ApplyForm {
    Prefix,
    Postfix,
    Binary,
    /// Function, variadic or internal construct with a parenthesized list.
    Call,
}

/// A construct resolved during parsing, with the native code to run.
#[derive(Clone)]
pub struct Application {
    pub symbol: Name,
    pub form: ApplyForm,
    pub construct: ConstructId,
    pub eval: Evaluator,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("symbol", &self.symbol)
            .field("form", &self.form)
            .field("construct", &self.construct)
            .finish_non_exhaustive()
    }
}

/// Storage for one expression tree.
#[derive(Clone, Default)]
pub struct ExprArena {
    kinds: Vec<ExprKind>,
    spans: Vec<Span>,
    types: Vec<Type>,
    constants: Vec<Value>,
    applications: Vec<Application>,
    expr_lists: Vec<ExprId>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena sized for a formula of `source_len` bytes.
    ///
    /// Formulas average roughly one node per three bytes of text.
    pub fn with_capacity(source_len: usize) -> Self {
        let nodes = source_len / 3 + 1;
        ExprArena {
            kinds: Vec::with_capacity(nodes),
            spans: Vec::with_capacity(nodes),
            types: Vec::with_capacity(nodes),
            constants: Vec::new(),
            applications: Vec::new(),
            expr_lists: Vec::new(),
        }
    }

    fn push(&mut self, kind: ExprKind, span: Span, ty: Type) -> ExprId {
        let id = ExprId::new(u32::try_from(self.kinds.len()).unwrap_or(u32::MAX - 1));
        self.kinds.push(kind);
        self.spans.push(span);
        self.types.push(ty);
        id
    }

    /// Allocate a literal node holding `value`.
    pub fn alloc_literal(&mut self, value: Value, span: Span) -> ExprId {
        let ty = value.ty();
        let id = ConstId::new(u32::try_from(self.constants.len()).unwrap_or(u32::MAX));
        self.constants.push(value);
        self.push(ExprKind::Literal(id), span, ty)
    }

    /// Allocate a read of unbound argument `index`.
    pub fn alloc_argument(&mut self, index: u32, ty: Type, span: Span) -> ExprId {
        self.push(ExprKind::Argument(index), span, ty)
    }

    /// Allocate an application of a resolved construct to `args`.
    pub fn alloc_apply(
        &mut self,
        application: Application,
        args: &[ExprId],
        ty: Type,
        span: Span,
    ) -> ExprId {
        let apply = ApplyId::new(u32::try_from(self.applications.len()).unwrap_or(u32::MAX));
        self.applications.push(application);
        let args = self.push_expr_list(args);
        self.push(ExprKind::Apply { apply, args }, span, ty)
    }

    /// Allocate an `int -> float` widening of `operand`.
    pub fn alloc_widen(&mut self, operand: ExprId) -> ExprId {
        let span = self.span(operand);
        self.push(ExprKind::Widen(operand), span, Type::Float)
    }

    /// Allocate an error placeholder.
    pub fn alloc_error(&mut self, span: Span) -> ExprId {
        self.push(ExprKind::Error, span, Type::Unit)
    }

    /// Store a child list, returning its range.
    ///
    /// Lists longer than `u16::MAX` are truncated; the parser rejects such
    /// calls before they reach the arena.
    pub fn push_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        if ids.is_empty() {
            return ExprRange::EMPTY;
        }
        let len = u16::try_from(ids.len()).unwrap_or(u16::MAX);
        let start = u32::try_from(self.expr_lists.len()).unwrap_or(u32::MAX);
        self.expr_lists.extend_from_slice(&ids[..usize::from(len)]);
        ExprRange::new(start, len)
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.kinds[id.index()]
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.spans[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: ExprId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn constant(&self, id: ConstId) -> &Value {
        &self.constants[id.index()]
    }

    #[inline]
    pub fn application(&self, id: ApplyId) -> &Application {
        &self.applications[id.index()]
    }

    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.to_range()]
    }

    /// Direct children of a node, in evaluation order.
    pub fn children(&self, id: ExprId) -> SmallVec<[ExprId; 4]> {
        match self.kind(id) {
            ExprKind::Apply { args, .. } => self.list(args).iter().copied().collect(),
            ExprKind::Widen(operand) => smallvec::smallvec![operand],
            ExprKind::Literal(_) | ExprKind::Argument(_) | ExprKind::Error => SmallVec::new(),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Render the tree rooted at `root` in a fully parenthesized form,
    /// e.g. `(2 + (3 * 4))`. Intended for logs and tests.
    pub fn display(&self, root: ExprId) -> DisplayExpr<'_> {
        DisplayExpr { arena: self, root }
    }
}

impl fmt::Debug for ExprArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprArena")
            .field("nodes", &self.kinds.len())
            .field("constants", &self.constants.len())
            .field("applications", &self.applications.len())
            .finish()
    }
}

/// Display adapter returned by [`ExprArena::display`].
pub struct DisplayExpr<'a> {
    arena: &'a ExprArena,
    root: ExprId,
}

impl DisplayExpr<'_> {
    fn write(&self, f: &mut fmt::Formatter<'_>, id: ExprId) -> fmt::Result {
        quill_stack::ensure_sufficient_stack(|| {
            let arena = self.arena;
            match arena.kind(id) {
                ExprKind::Literal(c) => match arena.constant(c) {
                    Value::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
                    other => write!(f, "{other}"),
                },
                ExprKind::Argument(index) => write!(f, "${index}"),
                ExprKind::Widen(operand) => {
                    f.write_str("widen(")?;
                    self.write(f, operand)?;
                    f.write_str(")")
                }
                ExprKind::Error => f.write_str("<error>"),
                ExprKind::Apply { apply, args } => {
                    let app = arena.application(apply);
                    let args = arena.list(args);
                    match (app.form, args) {
                        (ApplyForm::Binary, [left, right]) => {
                            f.write_str("(")?;
                            self.write(f, *left)?;
                            write!(f, " {} ", app.symbol)?;
                            self.write(f, *right)?;
                            f.write_str(")")
                        }
                        (ApplyForm::Prefix, [operand]) => {
                            write!(f, "({}", app.symbol)?;
                            if app.symbol.as_str().ends_with(|c: char| c.is_alphanumeric()) {
                                f.write_str(" ")?;
                            }
                            self.write(f, *operand)?;
                            f.write_str(")")
                        }
                        (ApplyForm::Postfix, [operand]) => {
                            f.write_str("(")?;
                            self.write(f, *operand)?;
                            write!(f, "{})", app.symbol)
                        }
                        _ => {
                            write!(f, "{}(", app.symbol)?;
                            for (i, arg) in args.iter().enumerate() {
                                if i > 0 {
                                    f.write_str(", ")?;
                                }
                                self.write(f, *arg)?;
                            }
                            f.write_str(")")
                        }
                    }
                }
            }
        })
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, self.root)
    }
}
