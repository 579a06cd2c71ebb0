//! Reduction engine for the Quill expression language.
//!
//! [`parse`] turns formula text into a typed [`ExprArena`] against a built
//! [`Registry`]. Every symbol is resolved and every application is
//! overload-checked while parsing, so a successful [`ParseOutput`] is ready
//! to compile. Failures are collected in an [`ErrorChain`] instead of
//! stopping at the first one.

mod cursor;
mod parser;

use std::panic::{self, AssertUnwindSafe};

use quill_diagnostic::{internal_error, Diagnostic, ErrorChain, ErrorCode};
use quill_ir::{ExprArena, ExprId, Parameter, Span, Type};
use quill_registry::Registry;
use tracing::debug;

pub use parser::is_identifier;

/// What to parse: source text, declared parameters, and the requested
/// result type.
#[derive(Copy, Clone, Debug)]
pub struct ParseRequest<'a> {
    pub source: &'a str,
    pub parameters: &'a [Parameter],
    /// `None` accepts whatever type the expression has.
    pub output: Option<&'a Type>,
}

impl<'a> ParseRequest<'a> {
    pub fn new(source: &'a str) -> Self {
        ParseRequest {
            source,
            parameters: &[],
            output: None,
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: &'a [Parameter]) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: &'a Type) -> Self {
        self.output = Some(output);
        self
    }
}

/// Result of parsing.
///
/// The arena is always present; when `errors` is non-empty it may contain
/// `Error` placeholders and must not be compiled.
#[derive(Debug)]
pub struct ParseOutput {
    pub arena: ExprArena,
    pub root: ExprId,
    pub errors: ErrorChain,
    /// Per declared parameter, whether the expression reads it.
    pub referenced: Vec<bool>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn result_type(&self) -> &Type {
        self.arena.ty(self.root)
    }

    fn failed(diagnostic: Diagnostic, span: Span, parameters: usize) -> Self {
        let mut arena = ExprArena::new();
        let root = arena.alloc_error(span);
        let mut errors = ErrorChain::new();
        errors.push(diagnostic);
        ParseOutput {
            arena,
            root,
            errors,
            referenced: vec![false; parameters],
        }
    }
}

/// Parse `request.source` against `registry`.
///
/// Never panics: a construct that panics while being resolved is reported
/// as an internal error (E9001) covering the whole input.
#[tracing::instrument(level = "debug", skip_all, fields(len = request.source.len()))]
pub fn parse(registry: &Registry, request: &ParseRequest<'_>) -> ParseOutput {
    let whole = Span::from_range(0..request.source.len());
    let parameters = request.parameters.len();

    if let Some(limit) = registry.configuration().max_input_length {
        if request.source.len() > limit {
            let diagnostic = Diagnostic::error(ErrorCode::E1006)
                .with_message(format!(
                    "expression is too long: {} bytes (limit {limit})",
                    request.source.len()
                ))
                .with_label(whole, "this input");
            return ParseOutput::failed(diagnostic, whole, parameters);
        }
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        parser::Parser::new(registry, request).run()
    }));
    match result {
        Ok(output) => {
            debug!(
                nodes = output.arena.len(),
                errors = output.errors.len(),
                "parsed"
            );
            output
        }
        Err(payload) => {
            let detail = if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else {
                "unknown panic".to_string()
            };
            debug!(%detail, "construct panicked during parse");
            ParseOutput::failed(internal_error(whole, &detail), whole, parameters)
        }
    }
}
