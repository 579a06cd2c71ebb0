//! Quill IR - core data structures for the Quill expression language.
//!
//! - Spans for source locations
//! - Names, types and runtime values
//! - Evaluation errors and the native evaluator signature
//! - The flat expression arena produced by the parser
//!
//! # Design
//!
//! - **Flatten everything**: nodes refer to children by `ExprId(u32)`.
//! - **Immutable once built**: an arena is filled by exactly one parse or
//!   one rebind and is then shared behind `Arc`.
//! - **Thread-safe**: every type here is `Send + Sync`, so parsed
//!   expressions can be handed across threads.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod eval_error;
mod expr_id;
mod name;
mod parameter;
mod span;
mod types;
mod value;
pub mod visitor;

pub use arena::{Application, ApplyForm, DisplayExpr, ExprArena, ExprKind};
pub use eval_error::{
    arity_mismatch, custom, division_by_zero, evaluator, index_out_of_bounds, integer_overflow,
    type_mismatch, unknown_member, EvalError, EvalResult, Evaluator,
};
pub use expr_id::{ApplyId, ConstId, ConstructId, ExprId, ExprRange};
pub use name::Name;
pub use parameter::Parameter;
pub use span::Span;
pub use types::{Type, TypeSignature};
pub use value::{widen_int, ListValue, ObjectRef, Value};
