//! Formal parameters of an expression.

use std::fmt;

use crate::{Name, Type};

/// A named, typed formal argument an expression may read.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Parameter {
    pub name: Name,
    pub ty: Type,
}

impl Parameter {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Parameter {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}
