//! Runtime evaluation errors.
//!
//! Constructs report failures through [`EvalError`]. The factory functions
//! below are the public way to build them; they keep messages uniform across
//! the standard library and host-supplied constructs.

use std::sync::Arc;

use crate::Value;

/// Result of evaluating a construct.
pub type EvalResult = Result<Value, EvalError>;

/// Native implementation of a construct: takes the evaluated operands or
/// arguments in order and produces the result.
pub type Evaluator = Arc<dyn Fn(&[Value]) -> EvalResult + Send + Sync>;

/// Wrap a closure as an [`Evaluator`].
pub fn evaluator<F>(f: F) -> Evaluator
where
    F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Failure raised while evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("`{type_name}` has no member `{member}`")]
    UnknownMember { type_name: String, member: String },
    #[error("{operation} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        found: usize,
    },
    #[error("{0}")]
    Custom(String),
}

pub fn division_by_zero() -> EvalError {
    EvalError::DivisionByZero
}

pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::IntegerOverflow {
        operation: operation.to_string(),
    }
}

/// The value had a different runtime type than the construct expected.
pub fn type_mismatch(expected: &str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name(),
    }
}

pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::IndexOutOfBounds { index, len }
}

pub fn unknown_member(type_name: &str, member: &str) -> EvalError {
    EvalError::UnknownMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
    }
}

pub fn arity_mismatch(operation: &str, expected: usize, found: usize) -> EvalError {
    EvalError::ArityMismatch {
        operation: operation.to_string(),
        expected,
        found,
    }
}

/// Free-form failure from a host construct.
pub fn custom(message: impl Into<String>) -> EvalError {
    EvalError::Custom(message.into())
}
