//! Operator reduction and construct application.

use quill_diagnostic::{unresolved_overload, Diagnostic, ErrorCode};
use quill_ir::{ApplyForm, Application, ExprId, ExprKind, Name, Span, Type, TypeSignature, Value};
use quill_registry::{
    CallRejection, CallSite, ConstructDefinition, Internal, Resolution, ResolveError,
    ValueConstruct,
};
use smallvec::SmallVec;
use tracing::trace;

use super::stack::{Operand, Pending, PendingOperator};
use super::Parser;

impl Parser<'_> {
    /// Reduce pending operators that bind at least as tightly as `precedence`.
    ///
    /// Stops at the first open scope.
    pub(super) fn reduce_while(&mut self, precedence: i32) {
        while let Some(top) = self.pending.last() {
            match top.precedence() {
                Some(p) if p <= precedence => self.reduce_top(),
                _ => break,
            }
        }
    }

    /// Reduce every operator above the pending entry at `floor`.
    pub(super) fn reduce_above(&mut self, floor: usize) {
        while self.pending.len() > floor + 1 {
            self.reduce_top();
        }
    }

    fn reduce_top(&mut self) {
        let Some(pending) = self.pending.pop() else {
            return;
        };
        match pending {
            Pending::Prefix(op) => {
                let operand = self.pop_operand(op.span);
                self.apply_operator(&op, ApplyForm::Prefix, &[operand]);
            }
            Pending::Binary(op) => {
                let right = self.pop_operand(op.span);
                let left = self.pop_operand(op.span);
                self.apply_operator(&op, ApplyForm::Binary, &[left, right]);
            }
            Pending::Scope(scope) => self.pending.push(Pending::Scope(scope)),
        }
    }

    /// Resolve `op` against the operand types and push the result.
    pub(super) fn apply_operator(
        &mut self,
        op: &PendingOperator<'_>,
        form: ApplyForm,
        operands: &[Operand],
    ) {
        let span = operands
            .iter()
            .map(|o| o.span)
            .fold(op.span, Span::merge);
        if operands.iter().any(|o| o.poisoned) {
            self.push_poisoned(span);
            return;
        }
        let types = self.operand_types(operands);
        match self.registry.resolve_operator(op.collection, &types) {
            Ok(resolution) => {
                trace!(symbol = %op.symbol, ?form, widened = resolution.is_widened(), "reduce");
                let id = self.build_apply(op.symbol, form, resolution, operands, span);
                self.push(id, span);
            }
            Err(error) => {
                self.report(op.symbol, error, span, &types, ErrorCode::E2003);
                self.push_poisoned(span);
            }
        }
    }

    /// Apply a function set or variadic function to call arguments.
    pub(super) fn call_function(
        &mut self,
        definition: &ConstructDefinition,
        args: &[Operand],
        span: Span,
    ) {
        if args.iter().any(|o| o.poisoned) {
            self.push_poisoned(span);
            return;
        }
        let types = self.operand_types(args);
        let result = match definition.value() {
            Some(ValueConstruct::Functions(set)) => self.registry.resolve_functions(set, &types),
            Some(ValueConstruct::Variadic(id)) => {
                let constants = self.literal_constants(args);
                let site = CallSite {
                    types: &types,
                    constants: &constants,
                };
                self.registry.resolve_variadic(*id, &site)
            }
            _ => {
                self.push_poisoned(span);
                return;
            }
        };
        let symbol = definition.symbol();
        match result {
            Ok(resolution) => {
                trace!(symbol = %symbol, args = args.len(), "call");
                let id = self.build_apply(symbol, ApplyForm::Call, resolution, args, span);
                self.push(id, span);
            }
            Err(error) => {
                self.report(symbol, error, span, &types, ErrorCode::E2003);
                self.push_poisoned(span);
            }
        }
    }

    /// Apply one of the registry's internal constructs.
    pub(super) fn call_internal(&mut self, internal: Internal, args: &[Operand], span: Span) {
        if args.iter().any(|o| o.poisoned) {
            self.push_poisoned(span);
            return;
        }
        let types = self.operand_types(args);
        let constants = self.literal_constants(args);
        let site = CallSite {
            types: &types,
            constants: &constants,
        };
        let id = self.registry.internal(internal);
        let symbol = Name::new(internal.symbol());
        match self.registry.resolve_variadic(id, &site) {
            Ok(resolution) => {
                trace!(internal = internal.purpose(), "internal call");
                let id = self.build_apply(&symbol, ApplyForm::Call, resolution, args, span);
                self.push(id, span);
            }
            Err(error) => {
                let types_code = if internal == Internal::Array {
                    ErrorCode::E2007
                } else {
                    ErrorCode::E2003
                };
                self.report(&symbol, error, span, &types, types_code);
                self.push_poisoned(span);
            }
        }
    }

    /// Allocate the application node, inserting widenings where resolution
    /// asked for them.
    pub(super) fn build_apply(
        &mut self,
        symbol: &Name,
        form: ApplyForm,
        resolution: Resolution,
        operands: &[Operand],
        span: Span,
    ) -> ExprId {
        let ids: SmallVec<[ExprId; 4]> = operands
            .iter()
            .enumerate()
            .map(|(i, o)| {
                if resolution.widen.get(i).copied().unwrap_or(false) {
                    self.arena.alloc_widen(o.id)
                } else {
                    o.id
                }
            })
            .collect();
        let application = Application {
            symbol: symbol.clone(),
            form,
            construct: resolution.construct,
            eval: resolution.eval,
        };
        self.arena.alloc_apply(application, &ids, resolution.result, span)
    }

    fn operand_types(&self, operands: &[Operand]) -> Vec<Type> {
        operands
            .iter()
            .map(|o| self.arena.ty(o.id).clone())
            .collect()
    }

    /// Values of operands that are literals, for variadic resolvers.
    fn literal_constants(&self, operands: &[Operand]) -> Vec<Option<Value>> {
        operands
            .iter()
            .map(|o| match self.arena.kind(o.id) {
                ExprKind::Literal(id) => Some(self.arena.constant(id).clone()),
                _ => None,
            })
            .collect()
    }

    /// Turn a resolution failure into a diagnostic.
    ///
    /// `types_code` is used when a resolver rejects the operand types.
    fn report(
        &mut self,
        symbol: &str,
        error: ResolveError,
        span: Span,
        types: &[Type],
        types_code: ErrorCode,
    ) {
        let diagnostic = match error {
            ResolveError::NoOverload {
                available,
                rejection,
            } => {
                let operands = describe_operands(types);
                let diagnostic = unresolved_overload(span, symbol, &operands, &available);
                match rejection {
                    Some(reason) => diagnostic.with_note(reason),
                    None => diagnostic,
                }
            }
            ResolveError::WrongArity { expected, found } => {
                let expected = join_counts(&expected);
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "`{symbol}` takes {expected} argument(s), found {found}"
                    ))
                    .with_label(span, "wrong number of arguments")
            }
            ResolveError::Rejected(rejection) => {
                let code = match rejection {
                    CallRejection::Types(_) => types_code,
                    CallRejection::Arity(_) => ErrorCode::E2004,
                    CallRejection::UnknownMember(_) => ErrorCode::E2005,
                };
                let message = rejection.message().to_string();
                Diagnostic::error(code)
                    .with_label(span, message.clone())
                    .with_message(message)
            }
        };
        self.errors.push(diagnostic);
    }
}

fn describe_operands(types: &[Type]) -> String {
    match types {
        [] => "no arguments".to_string(),
        [ty] => format!("operand `{ty}`"),
        _ => format!("operands `{}`", TypeSignature::from(types)),
    }
}

/// `1`, `1 or 2`, `1, 2 or 3`.
fn join_counts(counts: &[usize]) -> String {
    match counts {
        [] => "no".to_string(),
        [one] => one.to_string(),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(ToString::to_string).collect();
            format!("{} or {last}", init.join(", "))
        }
    }
}
