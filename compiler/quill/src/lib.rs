//! Quill: an embeddable, extensible expression language.
//!
//! A host registers the grammar it wants (operators, converters, constants,
//! functions, host types) on a [`RegistryBuilder`], freezes it into an
//! [`ExpressionFactory`], and turns formula text into typed [`Expression`]s
//! that can be partially bound and compiled into reusable callables.
//!
//! # Pipeline
//!
//! ```text
//! source text
//!     │
//!     ▼
//! quill_lexer::Lexer ──► tokens (lazy)
//!     │
//!     ▼
//! quill_parse::parse ──► ExprArena + root   (resolution and typing happen here)
//!     │
//!     ▼
//! Expression ──► bind_arguments ──► Expression
//!     │
//!     ▼
//! compile ──► CompiledExpression::invoke
//! ```
//!
//! # Example
//!
//! ```
//! use quill::{ExpressionFactory, Signature, Type, Value};
//!
//! let factory = ExpressionFactory::standard().unwrap();
//! let signature = Signature::returning(Type::Float)
//!     .param("price", Type::Float)
//!     .param("qty", Type::Int);
//! let expr = factory.create("price * qty * (1 - 10%)", &signature).unwrap();
//! let compiled = expr.compile();
//! let total = compiled.invoke(&[Value::Float(2.0), Value::Int(5)]).unwrap();
//! assert_eq!(total, Value::Float(9.0));
//! ```

mod expression;
mod factory;
mod rewrite;
mod signature;
pub mod stdlib;
mod tracing_setup;

pub use expression::{ArgumentKey, BindError, Expression};
pub use factory::ExpressionFactory;
pub use signature::Signature;
pub use tracing_setup::{init_tracing, LOG_ENV, TREE_ENV};

pub use quill_diagnostic::{Diagnostic, ErrorChain, ErrorCode};
pub use quill_eval::{CompiledExpression, InvokeError};
pub use quill_ir::{EvalError, EvalResult, Name, Parameter, Span, Type, TypeSignature, Value};
pub use quill_lexer::LexerConfig;
pub use quill_registry::{
    BuildError, BuildErrors, CallRejection, CallSite, Configuration, ConstructInfo,
    ConstructKinds, Converter, Fixity, Function, Operator, Registry, RegistryBuilder, Resolved,
    TypeDescriptor, VariadicFunction,
};
