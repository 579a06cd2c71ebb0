//! Quill construct registry.
//!
//! Every piece of grammar behavior is a *construct* registered under a
//! symbol: operators, converters, constants, type declarations, function
//! overloads and variadic functions. A [`RegistryBuilder`] collects them,
//! validates everything in one pass, and freezes the result into a
//! [`Registry`] which is shared read-only by every parse.
//!
//! Overload resolution (exact match, generic rule, `int` to `float`
//! widening) lives in [`resolve`]; the reserved member-access, indexing,
//! method, constructor, array and invocation constructs live in
//! [`internal`].

mod build_error;
mod builder;
mod collection;
mod config;
mod construct;
mod descriptor;
pub mod internal;
mod registry;
pub mod resolve;
mod validate;

pub use build_error::{BuildError, BuildErrors};
pub use builder::RegistryBuilder;
pub use collection::{
    ConstructCollection, ConstructDefinition, FunctionSet, RegisteredConstruct, ValueConstruct,
};
pub use config::Configuration;
pub use construct::{
    CallRejection, CallSite, Constant, Construct, ConstructKind, ConstructKinds, Converter,
    Fixity, Function, Operator, Resolved, Resolver, TypeDeclaration, TypeRule, Typing,
    VariadicFunction,
};
pub use descriptor::{Member, Method, TypeDescriptor, TypeTable};
pub use internal::Internal;
pub use registry::{ConstructInfo, Registry};
pub use resolve::{Resolution, ResolveError, Widening};
