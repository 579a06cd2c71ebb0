//! Parsed expressions: argument partitions, binding and compilation.

use std::fmt;
use std::sync::Arc;

use quill_eval::{CompiledExpression, InvokeError};
use quill_ir::{ExprArena, ExprId, Name, Parameter, Type, Value};
use tracing::debug;

use crate::rewrite::{rebind, Slot};

/// Refers to an unbound argument by name or by current index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentKey {
    Name(Name),
    Index(usize),
}

impl From<&str> for ArgumentKey {
    fn from(name: &str) -> Self {
        ArgumentKey::Name(Name::new(name))
    }
}

impl From<String> for ArgumentKey {
    fn from(name: String) -> Self {
        ArgumentKey::Name(Name::from(name))
    }
}

impl From<Name> for ArgumentKey {
    fn from(name: Name) -> Self {
        ArgumentKey::Name(name)
    }
}

impl From<usize> for ArgumentKey {
    fn from(index: usize) -> Self {
        ArgumentKey::Index(index)
    }
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKey::Name(name) => write!(f, "`{name}`"),
            ArgumentKey::Index(index) => write!(f, "#{index}"),
        }
    }
}

/// Why a bind was refused. Nothing is bound when any binding fails.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("unknown argument `{0}`")]
    UnknownArgument(Name),
    #[error("argument index {index} is out of range ({count} unbound)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("argument `{0}` is bound more than once")]
    DuplicateBinding(Name),
    #[error("argument `{name}` has type `{expected}`, cannot bind a value of type `{found}`")]
    TypeMismatch {
        name: Name,
        expected: Type,
        found: Type,
    },
}

/// A successfully parsed expression.
///
/// Immutable: [`bind_arguments`](Expression::bind_arguments) returns a new
/// expression and leaves this one usable. Cloning is cheap.
///
/// Declared parameters fall into three disjoint groups:
/// - *unbound*: supplied at invocation, in index order
/// - *bound*: baked into the tree as constants
/// - *discarded*: declared but never read by the expression
#[derive(Clone)]
pub struct Expression {
    source: Arc<str>,
    arena: Arc<ExprArena>,
    root: ExprId,
    unbound: Arc<[Parameter]>,
    bound: Arc<[(Name, Value)]>,
    discarded: Arc<[Parameter]>,
    output: Type,
}

impl Expression {
    /// Wraps a parse result, moving unread parameters to the discarded set.
    pub(crate) fn from_parse(
        source: &str,
        arena: ExprArena,
        root: ExprId,
        parameters: &[Parameter],
        referenced: &[bool],
    ) -> Self {
        let output = arena.ty(root).clone();
        let mut unbound = Vec::new();
        let mut discarded = Vec::new();
        let mut slots = Vec::with_capacity(parameters.len());
        for (parameter, read) in parameters.iter().zip(referenced) {
            if *read {
                slots.push(Slot::Keep(index_u32(unbound.len())));
                unbound.push(parameter.clone());
            } else {
                slots.push(Slot::Keep(u32::MAX));
                discarded.push(parameter.clone());
            }
        }
        let (arena, root) = if discarded.is_empty() {
            (arena, root)
        } else {
            rebind(&arena, root, &slots)
        };
        Expression {
            source: source.into(),
            arena: Arc::new(arena),
            root,
            unbound: unbound.into(),
            bound: Arc::from(Vec::new()),
            discarded: discarded.into(),
            output,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn output_type(&self) -> &Type {
        &self.output
    }

    /// Arguments still to be supplied, in invocation order.
    pub fn unbound(&self) -> &[Parameter] {
        &self.unbound
    }

    pub fn unbound_index(&self, name: &str) -> Option<usize> {
        self.unbound.iter().position(|p| p.name == name)
    }

    /// Bound arguments with their values, in binding order.
    pub fn bound(&self) -> &[(Name, Value)] {
        &self.bound
    }

    pub fn bound_value(&self, name: &str) -> Option<&Value> {
        self.bound
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, value)| value)
    }

    pub fn discarded(&self) -> &[Parameter] {
        &self.discarded
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    /// Fully parenthesized rendering of the tree, with `$n` for unbound
    /// arguments.
    pub fn tree(&self) -> String {
        self.arena.display(self.root).to_string()
    }

    /// Bind some unbound arguments to constants.
    ///
    /// Returns a new expression whose remaining unbound arguments keep
    /// their relative order and are renumbered from zero. Values are
    /// checked against the parameter type; an `int` binds to a `float`
    /// parameter by widening.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %self.source))]
    pub fn bind_arguments<K, V, I>(&self, bindings: I) -> Result<Expression, BindError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ArgumentKey>,
        V: Into<Value>,
    {
        let mut values: Vec<Option<Value>> = vec![None; self.unbound.len()];
        let mut order = Vec::new();
        for (key, value) in bindings {
            let index = self.resolve_key(&key.into())?;
            let parameter = &self.unbound[index];
            let value = value.into();
            let Some(value) = value.coerce_to(&parameter.ty) else {
                return Err(BindError::TypeMismatch {
                    name: parameter.name.clone(),
                    expected: parameter.ty.clone(),
                    found: value.ty(),
                });
            };
            if values[index].replace(value).is_some() {
                return Err(BindError::DuplicateBinding(parameter.name.clone()));
            }
            order.push(index);
        }
        if order.is_empty() {
            return Ok(self.clone());
        }

        let mut slots = Vec::with_capacity(values.len());
        let mut unbound = Vec::new();
        for (parameter, value) in self.unbound.iter().zip(&values) {
            match value {
                Some(value) => slots.push(Slot::Bind(value.clone())),
                None => {
                    slots.push(Slot::Keep(index_u32(unbound.len())));
                    unbound.push(parameter.clone());
                }
            }
        }
        let mut bound: Vec<(Name, Value)> = self.bound.to_vec();
        for index in order {
            if let Some(value) = values[index].take() {
                bound.push((self.unbound[index].name.clone(), value));
            }
        }

        let (arena, root) = rebind(&self.arena, self.root, &slots);
        debug!(bound = bound.len(), unbound = unbound.len(), "arguments bound");
        Ok(Expression {
            source: Arc::clone(&self.source),
            arena: Arc::new(arena),
            root,
            unbound: unbound.into(),
            bound: bound.into(),
            discarded: Arc::clone(&self.discarded),
            output: self.output.clone(),
        })
    }

    fn resolve_key(&self, key: &ArgumentKey) -> Result<usize, BindError> {
        match key {
            ArgumentKey::Name(name) => self
                .unbound_index(name.as_str())
                .ok_or_else(|| BindError::UnknownArgument(name.clone())),
            ArgumentKey::Index(index) if *index < self.unbound.len() => Ok(*index),
            ArgumentKey::Index(index) => Err(BindError::IndexOutOfRange {
                index: *index,
                count: self.unbound.len(),
            }),
        }
    }

    /// Lower to a callable taking the unbound arguments in order.
    ///
    /// Pure: compiling twice gives two equivalent callables.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %self.source))]
    pub fn compile(&self) -> CompiledExpression {
        let names = self.unbound.iter().map(|p| p.name.clone()).collect();
        quill_eval::compile(&self.arena, self.root, names, self.output.clone())
    }

    /// Compile and invoke once.
    pub fn evaluate(&self, values: &[Value]) -> Result<Value, InvokeError> {
        self.compile().invoke(values)
    }
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("tree", &self.tree())
            .field("unbound", &self.unbound)
            .field("bound", &self.bound)
            .field("discarded", &self.discarded)
            .field("output", &self.output)
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
