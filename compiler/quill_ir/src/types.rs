//! Runtime types of expression values.
//!
//! Types drive overload resolution: every operand on the reduction stack
//! carries one, and specialized constructs are keyed by the exact sequence
//! of operand types they accept.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::Name;

/// The type of an expression value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Unit,
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit IEEE float.
    Float,
    Str,
    /// Homogeneous list.
    List(Arc<Type>),
    /// Host-defined type, described by a type declaration in the registry.
    Object(Name),
}

impl Type {
    /// List of `element`.
    pub fn list_of(element: Type) -> Self {
        Type::List(Arc::new(element))
    }

    /// Host object type called `name`.
    pub fn object(name: impl Into<Name>) -> Self {
        Type::Object(name.into())
    }

    /// Element type if this is a list.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::List(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether a value of this type may be implicitly widened to `target`.
    ///
    /// The only implicit promotion is `int -> float`.
    pub fn widens_to(&self, target: &Type) -> bool {
        matches!((self, target), (Type::Int, Type::Float))
    }

    /// Whether a value of this type can flow into a slot of type `target`,
    /// either exactly or through widening.
    pub fn assignable_to(&self, target: &Type) -> bool {
        self == target || self.widens_to(target)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => f.write_str("unit"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Str => f.write_str("str"),
            Type::List(elem) => write!(f, "[{elem}]"),
            Type::Object(name) => write!(f, "{name}"),
        }
    }
}

/// Ordered operand or parameter types identifying one overload.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct TypeSignature(SmallVec<[Type; 2]>);

impl TypeSignature {
    /// Create from any sequence of types.
    pub fn new(types: impl IntoIterator<Item = Type>) -> Self {
        TypeSignature(types.into_iter().collect())
    }

    /// Signature of a single operand.
    pub fn unary(operand: Type) -> Self {
        TypeSignature(smallvec::smallvec![operand])
    }

    /// Signature of a left/right operand pair.
    pub fn binary(left: Type, right: Type) -> Self {
        TypeSignature(smallvec::smallvec![left, right])
    }

    #[inline]
    pub fn types(&self) -> &[Type] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Type> {
        self.0.iter()
    }

    /// Whether arguments of types `args` can call this signature, allowing
    /// `int -> float` widening per position.
    pub fn accepts(&self, args: &[Type]) -> bool {
        self.0.len() == args.len()
            && self
                .0
                .iter()
                .zip(args)
                .all(|(param, arg)| arg.assignable_to(param))
    }
}

impl From<&[Type]> for TypeSignature {
    fn from(types: &[Type]) -> Self {
        TypeSignature(types.iter().cloned().collect())
    }
}

impl<const N: usize> From<[Type; N]> for TypeSignature {
    fn from(types: [Type; N]) -> Self {
        TypeSignature(types.into_iter().collect())
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSignature{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_display() {
        assert_eq!(Type::list_of(Type::list_of(Type::Int)).to_string(), "[[int]]");
        assert_eq!(Type::object("Money").to_string(), "Money");
        assert_eq!(
            TypeSignature::binary(Type::Int, Type::Str).to_string(),
            "(int, str)"
        );
        assert_eq!(TypeSignature::default().to_string(), "()");
    }

    #[test]
    fn test_widening_is_int_to_float_only() {
        assert!(Type::Int.widens_to(&Type::Float));
        assert!(!Type::Float.widens_to(&Type::Int));
        assert!(!Type::Bool.widens_to(&Type::Int));
        assert!(!Type::list_of(Type::Int).widens_to(&Type::list_of(Type::Float)));
    }

    #[test]
    fn test_signature_accepts() {
        let sig = TypeSignature::binary(Type::Float, Type::Str);
        assert!(sig.accepts(&[Type::Int, Type::Str]));
        assert!(sig.accepts(&[Type::Float, Type::Str]));
        assert!(!sig.accepts(&[Type::Str, Type::Str]));
        assert!(!sig.accepts(&[Type::Float]));
    }
}
