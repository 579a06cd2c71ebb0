//! Invocation errors.

use quill_ir::EvalError;

/// Failure while invoking a [`CompiledExpression`](crate::CompiledExpression).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error("expected {expected} argument(s), got {found}")]
    ArgumentCount { expected: usize, found: usize },
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
    #[error("missing value for argument `{0}`")]
    MissingArgument(String),
    #[error("argument `{0}` given more than once")]
    DuplicateArgument(String),
    /// A construct failed while running.
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}
