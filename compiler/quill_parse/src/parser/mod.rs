//! The reduction engine.
//!
//! One pass over the token stream with two stacks: finished operands and
//! pending operators/open brackets. The parser is always either expecting
//! an operand or expecting an operator, which decides whether a symbol is
//! used as a prefix construct or as a binary/postfix one. Reduction is
//! iterative, so nesting depth is bounded only by memory.

mod reduce;
mod scope;
mod stack;


use quill_diagnostic::{
    expected_expression, type_mismatch, unexpected_token, unresolved_symbol, Diagnostic,
    ErrorChain, ErrorCode,
};
use quill_ir::visitor::referenced_arguments;
use quill_ir::{ApplyForm, ExprArena, ExprId, Parameter, Span, Type, Value};
use quill_lexer::{Token, TokenKind};
use quill_registry::{Fixity, Registry, ValueConstruct};
use tracing::trace;

use crate::cursor::Cursor;
use crate::{ParseOutput, ParseRequest};
use stack::{Operand, Pending, PendingOperator, ScopeKind};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Expect {
    Operand,
    Operator,
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    registry: &'a Registry,
    parameters: &'a [Parameter],
    output: Option<&'a Type>,
    cursor: Cursor<'a>,
    arena: ExprArena,
    operands: Vec<Operand>,
    pending: Vec<Pending<'a>>,
    expect: Expect,
    errors: ErrorChain,
    consumed: usize,
}

/// Identifier syntax required of parameter names.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl<'a> Parser<'a> {
    pub(crate) fn new(registry: &'a Registry, request: &ParseRequest<'a>) -> Self {
        let config = &registry.configuration().lexer;
        Parser {
            source: request.source,
            registry,
            parameters: request.parameters,
            output: request.output,
            cursor: Cursor::new(request.source, config, registry),
            arena: ExprArena::with_capacity(request.source.len()),
            operands: Vec::new(),
            pending: Vec::new(),
            expect: Expect::Operand,
            errors: ErrorChain::new(),
            consumed: 0,
        }
    }

    pub(crate) fn run(mut self) -> ParseOutput {
        self.check_parameters();
        loop {
            let token = self.next_token();
            if token.is_eof() {
                self.finish(token.span);
                break;
            }
            self.consumed += 1;
            match self.expect {
                Expect::Operand => self.operand_token(token),
                Expect::Operator => self.operator_token(token),
            }
        }
        let root = self.take_root();
        let root = self.convert_root(root);
        let referenced = referenced_arguments(&self.arena, root, self.parameters.len());
        ParseOutput {
            arena: self.arena,
            root,
            errors: self.errors,
            referenced,
        }
    }

    fn next_token(&mut self) -> Token {
        let token = self.cursor.advance();
        self.absorb_lexer_errors();
        token
    }

    fn peek(&mut self) -> Token {
        let token = self.cursor.peek().clone();
        self.absorb_lexer_errors();
        token
    }

    fn absorb_lexer_errors(&mut self) {
        for diagnostic in self.cursor.take_diagnostics() {
            self.errors.push(diagnostic);
        }
    }

    fn check_parameters(&mut self) {
        for (i, parameter) in self.parameters.iter().enumerate() {
            let name = parameter.name.as_str();
            let problem = if !is_identifier(name) {
                Some("parameter names must be identifiers")
            } else if self.parameters[..i].iter().any(|p| p.name == name) {
                Some("parameter is declared more than once")
            } else {
                None
            };
            if let Some(problem) = problem {
                self.errors.push(
                    Diagnostic::error(ErrorCode::E2008)
                        .with_message(format!("invalid parameter `{name}`"))
                        .with_note(problem),
                );
            }
        }
    }

    fn parameter_index(&self, text: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == text)
    }

    fn found(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", token.text(self.source)),
        }
    }

    // Operand stack

    fn push(&mut self, id: ExprId, span: Span) {
        self.operands.push(Operand {
            id,
            span,
            poisoned: false,
        });
    }

    fn push_poisoned(&mut self, span: Span) {
        let id = self.arena.alloc_error(span);
        self.operands.push(Operand {
            id,
            span,
            poisoned: true,
        });
    }

    fn pop_operand(&mut self, at: Span) -> Operand {
        match self.operands.pop() {
            Some(operand) => operand,
            None => Operand {
                id: self.arena.alloc_error(at),
                span: at,
                poisoned: true,
            },
        }
    }

    fn push_literal(&mut self, value: Value, span: Span) {
        let id = self.arena.alloc_literal(value, span);
        self.push(id, span);
        self.expect = Expect::Operator;
    }

    // Operand position

    fn operand_token(&mut self, token: Token) {
        let span = token.span;
        match token.kind {
            TokenKind::Int(n) => self.push_literal(Value::Int(n), span),
            TokenKind::Float(x) => self.push_literal(Value::Float(x), span),
            TokenKind::Str(s) => self.push_literal(Value::Str(s), span),
            TokenKind::Error => {
                self.push_poisoned(span);
                self.expect = Expect::Operator;
            }
            TokenKind::LParen => self.open_scope(ScopeKind::Group, span),
            TokenKind::LBracket => self.open_scope(ScopeKind::Array, span),
            TokenKind::RParen | TokenKind::RBracket => {
                let closer = if token.kind == TokenKind::RParen { ')' } else { ']' };
                if !self.closes_empty_scope(closer) {
                    let found = self.found(&token);
                    self.errors.push(expected_expression(span, &found));
                    self.push_poisoned(span);
                }
                self.close_scope(closer, span);
            }
            TokenKind::Comma => {
                self.errors.push(expected_expression(span, "`,`"));
                self.push_poisoned(span);
                self.comma(span);
            }
            TokenKind::Dot => {
                self.errors
                    .push(unexpected_token(span, "an expression", "."));
            }
            TokenKind::Symbol => self.operand_symbol(&token),
            TokenKind::Eof => {}
        }
    }

    fn operand_symbol(&mut self, token: &Token) {
        let registry = self.registry;
        let text = token.text(self.source);
        let span = token.span;

        if let Some(index) = self.parameter_index(text) {
            let ty = self.parameters[index].ty.clone();
            let id = self
                .arena
                .alloc_argument(u32::try_from(index).unwrap_or(u32::MAX), ty, span);
            self.push(id, span);
            self.expect = Expect::Operator;
            return;
        }

        let Some(definition) = registry.definition(text) else {
            self.errors.push(unresolved_symbol(span, text));
            self.push_poisoned(span);
            self.expect = Expect::Operator;
            return;
        };

        if let Some(collection) = definition.collection(Fixity::Prefix) {
            trace!(symbol = text, "prefix");
            self.pending.push(Pending::Prefix(PendingOperator {
                symbol: definition.symbol(),
                collection,
                span,
            }));
            return;
        }

        match definition.value() {
            Some(ValueConstruct::Constant(id)) => {
                let value = registry.constant(*id).cloned().unwrap_or(Value::Unit);
                self.push_literal(value, span);
            }
            Some(ValueConstruct::Functions(_) | ValueConstruct::Variadic(_)) => {
                if self.peek().kind == TokenKind::LParen {
                    let open = self.next_token().span;
                    self.open_scope(
                        ScopeKind::Call {
                            definition,
                            callee: span,
                        },
                        open,
                    );
                } else {
                    self.errors.push(
                        Diagnostic::error(ErrorCode::E2006)
                            .with_message(format!("function `{text}` must be called"))
                            .with_label(span, "expected `(` after the function name"),
                    );
                    self.push_poisoned(span);
                    self.expect = Expect::Operator;
                }
            }
            Some(ValueConstruct::TypeDeclaration(id)) => {
                if self.peek().kind == TokenKind::LParen {
                    let type_name = match registry.construct(*id).fixed_result() {
                        Some(Type::Object(name)) => name,
                        _ => definition.symbol().clone(),
                    };
                    let open = self.next_token().span;
                    self.open_scope(
                        ScopeKind::Constructor {
                            type_name,
                            callee: span,
                        },
                        open,
                    );
                } else {
                    self.errors.push(
                        Diagnostic::error(ErrorCode::E2006)
                            .with_message(format!("type `{text}` cannot be used as a value"))
                            .with_label(span, "expected `(` to construct a value"),
                    );
                    self.push_poisoned(span);
                    self.expect = Expect::Operator;
                }
            }
            None => {
                // Binary or postfix only; nothing to start an operand with.
                let found = self.found(token);
                self.errors.push(expected_expression(span, &found));
            }
        }
    }

    // Operator position

    fn operator_token(&mut self, token: Token) {
        let span = token.span;
        match token.kind {
            TokenKind::Symbol => self.operator_symbol(token),
            TokenKind::RParen => self.close_scope(')', span),
            TokenKind::RBracket => self.close_scope(']', span),
            TokenKind::Comma => self.comma(span),
            TokenKind::Dot => self.member_access(span),
            TokenKind::LParen => {
                let target = self.pop_operand(span);
                self.open_scope(ScopeKind::Invoke { target }, span);
            }
            TokenKind::LBracket => {
                let target = self.pop_operand(span);
                self.open_scope(ScopeKind::Index { target }, span);
            }
            TokenKind::Error => self.push_poisoned(span),
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Str(_) => {
                let found = token.text(self.source).to_string();
                self.errors
                    .push(unexpected_token(span, "an operator", &found));
                self.expect = Expect::Operand;
                self.operand_token(token);
            }
            TokenKind::Eof => {}
        }
    }

    fn operator_symbol(&mut self, token: Token) {
        let registry = self.registry;
        let text = token.text(self.source);
        let span = token.span;
        let definition = registry.definition(text);
        let binary = definition.and_then(|d| d.collection(Fixity::Binary));
        let postfix = definition.and_then(|d| d.collection(Fixity::Postfix));

        let (fixity, collection) = match (binary, postfix) {
            (Some(b), Some(p)) => {
                let next = self.peek();
                if self.starts_operand(&next) {
                    (Fixity::Binary, b)
                } else {
                    (Fixity::Postfix, p)
                }
            }
            (Some(b), None) => (Fixity::Binary, b),
            (None, Some(p)) => (Fixity::Postfix, p),
            (None, None) => {
                self.errors.push(unexpected_token(span, "an operator", text));
                self.expect = Expect::Operand;
                self.operand_token(token);
                return;
            }
        };
        let Some(definition) = definition else {
            return;
        };

        self.reduce_while(collection.precedence());
        let op = PendingOperator {
            symbol: definition.symbol(),
            collection,
            span,
        };
        if fixity == Fixity::Binary {
            self.pending.push(Pending::Binary(op));
            self.expect = Expect::Operand;
        } else {
            let operand = self.pop_operand(span);
            self.apply_operator(&op, ApplyForm::Postfix, &[operand]);
            self.expect = Expect::Operator;
        }
    }

    /// Whether `token` would begin an operand if it came next.
    fn starts_operand(&self, token: &Token) -> bool {
        if token.kind != TokenKind::Symbol {
            return token.kind.starts_operand();
        }
        let text = token.text(self.source);
        if self.parameter_index(text).is_some() {
            return true;
        }
        match self.registry.definition(text) {
            Some(d) => d.collection(Fixity::Prefix).is_some() || d.value().is_some(),
            None => is_identifier(text),
        }
    }

    /// `.name` or `.name(args)` applied to the operand on top of the stack.
    fn member_access(&mut self, dot: Span) {
        let target = self.pop_operand(dot);
        let name_token = self.next_token();
        if name_token.kind != TokenKind::Symbol {
            let found = self.found(&name_token);
            self.errors
                .push(unexpected_token(name_token.span, "a member name", &found));
            self.push_poisoned(target.span.merge(name_token.span));
            return;
        }
        let name = quill_ir::Name::new(name_token.text(self.source));
        if self.peek().kind == TokenKind::LParen {
            let open = self.next_token().span;
            self.open_scope(
                ScopeKind::Method {
                    target,
                    name,
                    name_span: name_token.span,
                },
                open,
            );
        } else {
            let name_id = self
                .arena
                .alloc_literal(Value::Str(name.as_str().into()), name_token.span);
            let name_operand = Operand {
                id: name_id,
                span: name_token.span,
                poisoned: false,
            };
            let span = target.span.merge(name_token.span);
            self.call_internal(
                quill_registry::Internal::Member,
                &[target, name_operand],
                span,
            );
            self.expect = Expect::Operator;
        }
    }

    // End of input

    fn finish(&mut self, end: Span) {
        if self.expect == Expect::Operand {
            if self.consumed == 0 && self.pending.is_empty() {
                self.errors.push(
                    Diagnostic::error(ErrorCode::E1007)
                        .with_message("empty expression")
                        .with_label(end, "expected an expression"),
                );
            } else if self.pending.is_empty() && !self.operands.is_empty() {
                // Only a leading symbol was skipped; its error is reported.
            } else {
                self.errors.push(expected_expression(end, "end of input"));
            }
            self.push_poisoned(end);
        }

        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Scope(scope) => {
                    self.errors.push(quill_diagnostic::unclosed_delimiter(
                        scope.open,
                        end,
                        scope.kind.opener(),
                    ));
                    self.operands.truncate(scope.base);
                    let span = scope.kind.start(scope.open).merge(end);
                    self.push_poisoned(span);
                }
                Pending::Prefix(op) => {
                    let operand = self.pop_operand(end);
                    self.apply_operator(&op, ApplyForm::Prefix, &[operand]);
                }
                Pending::Binary(op) => {
                    let right = self.pop_operand(end);
                    let left = self.pop_operand(end);
                    self.apply_operator(&op, ApplyForm::Binary, &[left, right]);
                }
            }
        }
    }

    fn take_root(&mut self) -> Operand {
        match self.operands.len() {
            1 => self.pop_operand(Span::DUMMY),
            0 => {
                let end = Span::point(u32::try_from(self.source.len()).unwrap_or(u32::MAX));
                if self.errors.is_empty() {
                    self.errors.push(
                        Diagnostic::error(ErrorCode::E1007)
                            .with_message("empty expression")
                            .with_label(end, "expected an expression"),
                    );
                }
                self.pop_operand(end)
            }
            _ => {
                let span = self
                    .operands
                    .iter()
                    .map(|o| o.span)
                    .reduce(Span::merge)
                    .unwrap_or(Span::DUMMY);
                if self.errors.is_empty() {
                    self.errors.push(
                        Diagnostic::error(ErrorCode::E1005)
                            .with_message("malformed expression")
                            .with_label(span, "these parts do not form a single expression"),
                    );
                }
                self.operands.clear();
                let id = self.arena.alloc_error(span);
                Operand {
                    id,
                    span,
                    poisoned: true,
                }
            }
        }
    }

    /// Converts the root to the requested output type.
    fn convert_root(&mut self, root: Operand) -> ExprId {
        let Some(target) = self.output else {
            return root.id;
        };
        if root.poisoned || !self.errors.is_empty() {
            return root.id;
        }
        let found = self.arena.ty(root.id).clone();
        if found == *target {
            return root.id;
        }
        if found.widens_to(target) {
            return self.arena.alloc_widen(root.id);
        }
        if self
            .registry
            .configuration()
            .convert_result_to_output_type_automatically
        {
            if let Some(resolution) = self.registry.find_converter(&found, target) {
                let symbol = self.registry.construct(resolution.construct).symbol.clone();
                trace!(symbol = %symbol, from = %found, to = %target, "output conversion");
                return self.build_apply(&symbol, ApplyForm::Prefix, resolution, &[root], root.span);
            }
        }
        self.errors.push(type_mismatch(
            root.span,
            &target.to_string(),
            &found.to_string(),
            "expression result",
        ));
        root.id
    }
}
