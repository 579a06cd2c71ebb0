//! Construct definitions.
//!
//! A construct is one unit of grammar behavior registered under a symbol:
//! an operator, a type converter, a constant, a type declaration, a
//! fixed-arity function overload or a variadic function. Constructs are
//! closed data; their behavior lives in the [`Evaluator`] and typing
//! closures they carry.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use quill_ir::{EvalResult, Evaluator, Type, TypeSignature, Value};

use crate::TypeDescriptor;

/// Computes a generic operator's result type from its operand types, or
/// explains why the operands are not accepted.
pub type TypeRule = Arc<dyn Fn(&[Type]) -> Result<Type, String> + Send + Sync>;

/// Picks the result type and implementation of a variadic call.
pub type Resolver = Arc<dyn Fn(&CallSite<'_>) -> Result<Resolved, CallRejection> + Send + Sync>;

/// How an operator determines its result type.
#[derive(Clone)]
pub enum Typing {
    /// Specialized: applies only to exactly these operand types.
    Fixed { params: TypeSignature, result: Type },
    /// Generic: applies to any operands the rule accepts.
    Generic(TypeRule),
}

/// A binary, prefix or postfix operator.
#[derive(Clone)]
pub struct Operator {
    pub typing: Typing,
    pub eval: Evaluator,
}

impl Operator {
    /// Operator for exactly the operand types in `params`.
    pub fn specialized<F>(params: impl Into<TypeSignature>, result: Type, eval: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Operator {
            typing: Typing::Fixed {
                params: params.into(),
                result,
            },
            eval: Arc::new(eval),
        }
    }

    /// Operator whose accepted operands and result type are decided by `rule`.
    pub fn generic<R, F>(rule: R, eval: F) -> Self
    where
        R: Fn(&[Type]) -> Result<Type, String> + Send + Sync + 'static,
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Operator {
            typing: Typing::Generic(Arc::new(rule)),
            eval: Arc::new(eval),
        }
    }

    /// Operand types of a specialized operator; `None` when generic.
    pub fn signature(&self) -> Option<&TypeSignature> {
        match &self.typing {
            Typing::Fixed { params, .. } => Some(params),
            Typing::Generic(_) => None,
        }
    }
}

/// A unary construct that converts its operand to a fixed target type.
#[derive(Clone)]
pub struct Converter {
    /// Accepted operand type; `None` accepts any operand.
    pub source: Option<Type>,
    pub target: Type,
    pub eval: Evaluator,
}

impl Converter {
    /// Converter from exactly `source`.
    pub fn new<F>(source: Type, target: Type, eval: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Converter {
            source: Some(source),
            target,
            eval: Arc::new(eval),
        }
    }

    /// Converter from any operand type.
    pub fn generic<F>(target: Type, eval: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Converter {
            source: None,
            target,
            eval: Arc::new(eval),
        }
    }
}

/// A named value.
#[derive(Clone, Debug)]
pub struct Constant {
    pub value: Value,
}

/// A host type made available to formulas.
#[derive(Clone, Debug)]
pub struct TypeDeclaration {
    pub descriptor: Arc<TypeDescriptor>,
}

/// One fixed-arity overload of a function.
#[derive(Clone)]
pub struct Function {
    pub params: TypeSignature,
    pub result: Type,
    pub eval: Evaluator,
}

impl Function {
    pub fn new<F>(params: impl Into<TypeSignature>, result: Type, eval: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Function {
            params: params.into(),
            result,
            eval: Arc::new(eval),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function{} -> {}", self.params, self.result)
    }
}

/// Arguments of a variadic call as seen at parse time.
#[derive(Debug)]
pub struct CallSite<'a> {
    /// Argument types, in order.
    pub types: &'a [Type],
    /// Literal value of each argument, where the argument is a literal.
    pub constants: &'a [Option<Value>],
}

impl CallSite<'_> {
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The literal string at position `index`, if there is one.
    pub fn literal_str(&self, index: usize) -> Option<&str> {
        self.constants.get(index)?.as_ref()?.as_str()
    }
}

/// Outcome of resolving a variadic call.
#[derive(Clone)]
pub struct Resolved {
    pub result: Type,
    pub eval: Evaluator,
}

impl Resolved {
    pub fn new<F>(result: Type, eval: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Resolved {
            result,
            eval: Arc::new(eval),
        }
    }
}

/// Why a variadic call was not accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallRejection {
    /// The argument types are not accepted.
    Types(String),
    /// The number of arguments is not accepted.
    Arity(String),
    /// The target type has no such member, method, indexer or constructor.
    UnknownMember(String),
}

impl CallRejection {
    pub fn message(&self) -> &str {
        match self {
            CallRejection::Types(m) | CallRejection::Arity(m) | CallRejection::UnknownMember(m) => m,
        }
    }
}

impl From<String> for CallRejection {
    fn from(message: String) -> Self {
        CallRejection::Types(message)
    }
}

impl From<&str> for CallRejection {
    fn from(message: &str) -> Self {
        CallRejection::Types(message.to_string())
    }
}

/// A function taking any number of arguments; typing is decided per call.
#[derive(Clone)]
pub struct VariadicFunction {
    pub resolver: Resolver,
}

impl VariadicFunction {
    pub fn new<R>(resolver: R) -> Self
    where
        R: Fn(&CallSite<'_>) -> Result<Resolved, CallRejection> + Send + Sync + 'static,
    {
        VariadicFunction {
            resolver: Arc::new(resolver),
        }
    }
}

/// Any registrable construct.
#[derive(Clone)]
pub enum Construct {
    Operator(Operator),
    Converter(Converter),
    Constant(Constant),
    TypeDeclaration(TypeDeclaration),
    Function(Function),
    Variadic(VariadicFunction),
}

impl fmt::Debug for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Operator(op) => match op.signature() {
                Some(sig) => write!(f, "Operator{sig}"),
                None => f.write_str("Operator(generic)"),
            },
            Construct::Converter(c) => match &c.source {
                Some(source) => write!(f, "Converter({source} -> {})", c.target),
                None => write!(f, "Converter(_ -> {})", c.target),
            },
            Construct::Constant(c) => write!(f, "Constant({:?})", c.value),
            Construct::TypeDeclaration(t) => write!(f, "TypeDeclaration({})", t.descriptor.name()),
            Construct::Function(func) => write!(f, "{func:?}"),
            Construct::Variadic(_) => f.write_str("Variadic"),
        }
    }
}

/// Syntactic position of a unary or binary construct.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Fixity {
    Prefix,
    Postfix,
    Binary,
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fixity::Prefix => f.write_str("prefix"),
            Fixity::Postfix => f.write_str("postfix"),
            Fixity::Binary => f.write_str("binary"),
        }
    }
}

/// What a registration declares a construct to be.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum ConstructKind {
    BinaryOperator,
    PrefixOperator,
    PostfixOperator,
    PrefixConverter,
    PostfixConverter,
    Constant,
    TypeDeclaration,
    Function,
    VariadicFunction,
}

impl ConstructKind {
    /// Collection the construct belongs to, for operators and converters.
    pub fn fixity(self) -> Option<Fixity> {
        match self {
            ConstructKind::BinaryOperator => Some(Fixity::Binary),
            ConstructKind::PrefixOperator | ConstructKind::PrefixConverter => Some(Fixity::Prefix),
            ConstructKind::PostfixOperator | ConstructKind::PostfixConverter => {
                Some(Fixity::Postfix)
            }
            ConstructKind::Constant
            | ConstructKind::TypeDeclaration
            | ConstructKind::Function
            | ConstructKind::VariadicFunction => None,
        }
    }

    pub fn is_converter(self) -> bool {
        matches!(
            self,
            ConstructKind::PrefixConverter | ConstructKind::PostfixConverter
        )
    }

    pub fn flag(self) -> ConstructKinds {
        match self {
            ConstructKind::BinaryOperator => ConstructKinds::BINARY_OPERATOR,
            ConstructKind::PrefixOperator => ConstructKinds::PREFIX_OPERATOR,
            ConstructKind::PostfixOperator => ConstructKinds::POSTFIX_OPERATOR,
            ConstructKind::PrefixConverter => ConstructKinds::PREFIX_CONVERTER,
            ConstructKind::PostfixConverter => ConstructKinds::POSTFIX_CONVERTER,
            ConstructKind::Constant => ConstructKinds::CONSTANT,
            ConstructKind::TypeDeclaration => ConstructKinds::TYPE_DECLARATION,
            ConstructKind::Function => ConstructKinds::FUNCTION,
            ConstructKind::VariadicFunction => ConstructKinds::VARIADIC_FUNCTION,
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstructKind::BinaryOperator => "binary operator",
            ConstructKind::PrefixOperator => "prefix operator",
            ConstructKind::PostfixOperator => "postfix operator",
            ConstructKind::PrefixConverter => "prefix converter",
            ConstructKind::PostfixConverter => "postfix converter",
            ConstructKind::Constant => "constant",
            ConstructKind::TypeDeclaration => "type declaration",
            ConstructKind::Function => "function",
            ConstructKind::VariadicFunction => "variadic function",
        })
    }
}

bitflags! {
    /// Set of construct kinds registered under one symbol.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ConstructKinds: u16 {
        const BINARY_OPERATOR = 1 << 0;
        const PREFIX_OPERATOR = 1 << 1;
        const POSTFIX_OPERATOR = 1 << 2;
        const PREFIX_CONVERTER = 1 << 3;
        const POSTFIX_CONVERTER = 1 << 4;
        const CONSTANT = 1 << 5;
        const TYPE_DECLARATION = 1 << 6;
        const FUNCTION = 1 << 7;
        const VARIADIC_FUNCTION = 1 << 8;

        /// Kinds that live in binary/prefix/postfix collections.
        const OPERATOR_LIKE = Self::BINARY_OPERATOR.bits()
            | Self::PREFIX_OPERATOR.bits()
            | Self::POSTFIX_OPERATOR.bits()
            | Self::PREFIX_CONVERTER.bits()
            | Self::POSTFIX_CONVERTER.bits();

        /// Kinds of which a symbol may hold at most one, exclusively.
        const VALUE_LIKE = Self::CONSTANT.bits()
            | Self::TYPE_DECLARATION.bits()
            | Self::FUNCTION.bits()
            | Self::VARIADIC_FUNCTION.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_flags_partition() {
        let all = [
            ConstructKind::BinaryOperator,
            ConstructKind::PrefixOperator,
            ConstructKind::PostfixOperator,
            ConstructKind::PrefixConverter,
            ConstructKind::PostfixConverter,
            ConstructKind::Constant,
            ConstructKind::TypeDeclaration,
            ConstructKind::Function,
            ConstructKind::VariadicFunction,
        ];
        for kind in all {
            let flag = kind.flag();
            assert_eq!(
                ConstructKinds::OPERATOR_LIKE.contains(flag),
                kind.fixity().is_some(),
                "{kind}"
            );
            assert_ne!(
                ConstructKinds::OPERATOR_LIKE.contains(flag),
                ConstructKinds::VALUE_LIKE.contains(flag)
            );
        }
    }

    #[test]
    fn test_call_site_literal_str() {
        let types = [Type::Int, Type::Str];
        let constants = [None, Some(Value::from("length"))];
        let site = CallSite {
            types: &types,
            constants: &constants,
        };
        assert_eq!(site.literal_str(1), Some("length"));
        assert_eq!(site.literal_str(0), None);
        assert_eq!(site.literal_str(5), None);
    }
}
