//! Declared parameters and result type of an expression.

use quill_ir::{Name, Parameter, Type};

/// What the host expects of an expression: the arguments it may read and
/// the type it must produce.
///
/// ```text
/// let sig = Signature::returning(Type::Float)
///     .param("price", Type::Float)
///     .param("qty", Type::Int);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
    output: Option<Type>,
}

impl Signature {
    /// Result must have type `output`, converting if the registry allows.
    pub fn returning(output: Type) -> Self {
        Signature {
            parameters: Vec::new(),
            output: Some(output),
        }
    }

    /// Result type is whatever the expression produces.
    pub fn inferred() -> Self {
        Signature::default()
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<Name>, ty: Type) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn output(&self) -> Option<&Type> {
        self.output.as_ref()
    }
}
