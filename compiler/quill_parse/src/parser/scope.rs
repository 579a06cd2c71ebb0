//! Bracketed scopes: groups, argument lists, array literals, indexing.

use quill_diagnostic::{unexpected_token, unmatched_delimiter, Diagnostic, ErrorCode};
use quill_ir::{Span, Value};
use quill_registry::Internal;

use super::stack::{Operand, Pending, Scope, ScopeKind};
use super::{Expect, Parser};

/// Most arguments a single call may take.
const MAX_ARGUMENTS: usize = u16::MAX as usize;

impl<'a> Parser<'a> {
    pub(super) fn open_scope(&mut self, kind: ScopeKind<'a>, open: Span) {
        self.pending.push(Pending::Scope(Scope {
            kind,
            open,
            base: self.operands.len(),
            args: Vec::new(),
        }));
        self.expect = Expect::Operand;
    }

    fn innermost_scope(&self) -> Option<usize> {
        self.pending
            .iter()
            .rposition(|p| matches!(p, Pending::Scope(_)))
    }

    /// Whether `closer` ends a scope with nothing in it, as in `f()` or `[]`.
    pub(super) fn closes_empty_scope(&self, closer: char) -> bool {
        match self.pending.last() {
            Some(Pending::Scope(scope)) => {
                scope.kind.closer() == closer
                    && scope.args.is_empty()
                    && self.operands.len() == scope.base
            }
            _ => false,
        }
    }

    pub(super) fn close_scope(&mut self, closer: char, span: Span) {
        let Some(position) = self.innermost_scope() else {
            self.errors.push(unmatched_delimiter(span, closer));
            return;
        };
        self.reduce_above(position);
        let Some(Pending::Scope(mut scope)) = self.pending.pop() else {
            return;
        };
        if scope.kind.closer() != closer {
            let expected = format!("`{}`", scope.kind.closer());
            self.errors
                .push(unexpected_token(span, &expected, &closer.to_string()));
        }
        if let Some(argument) = self.take_argument(scope.base) {
            scope.args.push(argument);
        }
        self.finish_scope(scope, span);
        self.expect = Expect::Operator;
    }

    pub(super) fn comma(&mut self, span: Span) {
        let Some(position) = self.innermost_scope() else {
            self.errors.push(unexpected_token(span, "an operator", ","));
            self.expect = Expect::Operand;
            return;
        };
        self.reduce_above(position);
        let Some(Pending::Scope(scope)) = self.pending.get(position) else {
            return;
        };
        if matches!(scope.kind, ScopeKind::Group) && scope.args.is_empty() {
            self.errors.push(unexpected_token(span, "`)`", ","));
        }
        let base = scope.base;
        let argument = self.take_argument(base);
        if let (Some(argument), Some(Pending::Scope(scope))) =
            (argument, self.pending.get_mut(position))
        {
            scope.args.push(argument);
        }
        self.expect = Expect::Operand;
    }

    /// Pop the operand(s) above `base` as one argument.
    fn take_argument(&mut self, base: usize) -> Option<Operand> {
        let base = base.min(self.operands.len());
        let parts: Vec<Operand> = self.operands.drain(base..).collect();
        match parts.as_slice() {
            [] => None,
            [single] => Some(*single),
            [first, .., last] => {
                let span = first.span.merge(last.span);
                if self.errors.is_empty() {
                    self.errors.push(
                        Diagnostic::error(ErrorCode::E1005)
                            .with_message("malformed expression")
                            .with_label(span, "these parts do not form a single expression"),
                    );
                }
                Some(Operand {
                    id: self.arena.alloc_error(span),
                    span,
                    poisoned: true,
                })
            }
        }
    }

    fn name_literal(&mut self, name: &str, span: Span) -> Operand {
        let id = self.arena.alloc_literal(Value::from(name), span);
        Operand {
            id,
            span,
            poisoned: false,
        }
    }

    fn finish_scope(&mut self, scope: Scope<'a>, close: Span) {
        let span = scope.kind.start(scope.open).merge(close);
        let mut args = scope.args;
        if args.len() > MAX_ARGUMENTS {
            self.errors.push(
                Diagnostic::error(ErrorCode::E1008)
                    .with_message(format!(
                        "too many arguments: {} (at most {MAX_ARGUMENTS})",
                        args.len()
                    ))
                    .with_label(span, "in this list"),
            );
            self.push_poisoned(span);
            return;
        }

        match scope.kind {
            ScopeKind::Group => match args.as_slice() {
                [] => {
                    self.errors.push(
                        Diagnostic::error(ErrorCode::E1007)
                            .with_message("empty parentheses")
                            .with_label(span, "expected an expression inside"),
                    );
                    self.push_poisoned(span);
                }
                [inner] => self.operands.push(Operand { span, ..*inner }),
                _ => self.push_poisoned(span),
            },
            ScopeKind::Array => self.call_internal(Internal::Array, &args, span),
            ScopeKind::Call { definition, .. } => self.call_function(definition, &args, span),
            ScopeKind::Constructor { type_name, callee } => {
                let name = self.name_literal(type_name.as_str(), callee);
                args.insert(0, name);
                self.call_internal(Internal::Constructor, &args, span);
            }
            ScopeKind::Method {
                target,
                name,
                name_span,
            } => {
                let name = self.name_literal(name.as_str(), name_span);
                args.insert(0, name);
                args.insert(0, target);
                self.call_internal(Internal::Method, &args, span);
            }
            ScopeKind::Index { target } => {
                args.insert(0, target);
                self.call_internal(Internal::Indexer, &args, span);
            }
            ScopeKind::Invoke { target } => {
                args.insert(0, target);
                self.call_internal(Internal::Invoke, &args, span);
            }
        }
    }
}
