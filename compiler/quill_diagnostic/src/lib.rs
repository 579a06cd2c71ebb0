//! Diagnostic system for formula errors.
//!
//! Every problem found while building an expression is reported as a
//! [`Diagnostic`]:
//! - an error code for searchability
//! - a clear message (what went wrong)
//! - a primary span (where it went wrong)
//! - optional notes and suggestions
//!
//! A failed parse returns all diagnostics together as an [`ErrorChain`].

mod chain;
mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use chain::ErrorChain;
pub use diagnostic::{
    expected_expression, internal_error, type_mismatch, unclosed_delimiter, unexpected_token,
    unmatched_delimiter, unresolved_overload, unresolved_symbol, Diagnostic, Label, LabelStyle,
    Severity,
};
pub use error_code::{ErrorCode, Phase};
