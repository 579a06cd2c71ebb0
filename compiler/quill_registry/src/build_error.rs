//! Registry build errors.

use std::fmt;

use quill_ir::TypeSignature;

use crate::{ConstructKind, Fixity};

/// One problem found while validating a [`RegistryBuilder`](crate::RegistryBuilder).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("invalid symbol `{symbol}`: {reason}")]
    InvalidSymbol { symbol: String, reason: &'static str },

    #[error("symbol `{symbol}` is reserved for {purpose}")]
    ReservedSymbol {
        symbol: String,
        purpose: &'static str,
    },

    #[error("symbol `{symbol}` cannot be both a {first} and a {second}")]
    IncompatibleKinds {
        symbol: String,
        first: ConstructKind,
        second: ConstructKind,
    },

    #[error("{fixity} `{symbol}` has more than one generic construct")]
    DuplicateGeneric { symbol: String, fixity: Fixity },

    #[error("{fixity} `{symbol}` has more than one construct for {signature}")]
    DuplicateSpecialized {
        symbol: String,
        fixity: Fixity,
        signature: TypeSignature,
    },

    #[error("{kind} `{symbol}` declares {found} operand type(s), expected {expected}")]
    ArityMismatch {
        symbol: String,
        kind: ConstructKind,
        expected: usize,
        found: usize,
    },

    #[error(
        "converters for `{symbol}` disagree on the target type: \
         {first_fixity} gives {first}, {second_fixity} gives {second}"
    )]
    ConverterTargetMismatch {
        symbol: String,
        first_fixity: Fixity,
        first: String,
        second_fixity: Fixity,
        second: String,
    },

    #[error("{fixity} `{symbol}` has no precedence")]
    MissingPrecedence { symbol: String, fixity: Fixity },

    #[error("{fixity} precedence of `{symbol}` set to both {first} and {second}")]
    ConflictingPrecedence {
        symbol: String,
        fixity: Fixity,
        first: i32,
        second: i32,
    },

    #[error("{fixity} precedence set for `{symbol}`, which has no {fixity} constructs")]
    OrphanPrecedence { symbol: String, fixity: Fixity },

    #[error("constant `{symbol}` is registered more than once")]
    DuplicateConstant { symbol: String },

    #[error("type declaration `{symbol}` is registered more than once")]
    DuplicateTypeDeclaration { symbol: String },

    #[error("type `{type_name}` is declared by both `{first}` and `{second}`")]
    DuplicateTypeName {
        type_name: String,
        first: String,
        second: String,
    },

    #[error("type `{type_name}` declares {entry} more than once")]
    DuplicateDescriptorEntry { type_name: String, entry: String },

    #[error("function `{symbol}` has more than one overload for {signature}")]
    DuplicateOverload {
        symbol: String,
        signature: TypeSignature,
    },

    #[error("variadic function `{symbol}` is registered more than once")]
    DuplicateVariadic { symbol: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl BuildError {
    /// The symbol the error is about, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            BuildError::InvalidSymbol { symbol, .. }
            | BuildError::ReservedSymbol { symbol, .. }
            | BuildError::IncompatibleKinds { symbol, .. }
            | BuildError::DuplicateGeneric { symbol, .. }
            | BuildError::DuplicateSpecialized { symbol, .. }
            | BuildError::ArityMismatch { symbol, .. }
            | BuildError::ConverterTargetMismatch { symbol, .. }
            | BuildError::MissingPrecedence { symbol, .. }
            | BuildError::ConflictingPrecedence { symbol, .. }
            | BuildError::OrphanPrecedence { symbol, .. }
            | BuildError::DuplicateConstant { symbol }
            | BuildError::DuplicateTypeDeclaration { symbol }
            | BuildError::DuplicateOverload { symbol, .. }
            | BuildError::DuplicateVariadic { symbol } => Some(symbol),
            BuildError::DuplicateTypeName { .. }
            | BuildError::DuplicateDescriptorEntry { .. }
            | BuildError::InvalidConfiguration(_) => None,
        }
    }
}

/// Every problem found by one `build()` call, in report order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildErrors(Vec<BuildError>);

impl BuildErrors {
    pub(crate) fn new(errors: Vec<BuildError>) -> Self {
        BuildErrors(errors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BuildError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<BuildError> {
        self.0
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.len();
        write!(
            f,
            "registry build failed with {n} error{}",
            if n == 1 { "" } else { "s" }
        )?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildErrors {}

impl<'a> IntoIterator for &'a BuildErrors {
    type Item = &'a BuildError;
    type IntoIter = std::slice::Iter<'a, BuildError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for BuildErrors {
    type Item = BuildError;
    type IntoIter = std::vec::IntoIter<BuildError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
