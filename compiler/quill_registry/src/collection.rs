//! Per-symbol construct tables.

use quill_ir::{ConstructId, Evaluator, Name, Type, TypeSignature};
use rustc_hash::FxHashMap;

use crate::{Construct, ConstructKind, ConstructKinds, Fixity, Typing};

/// A construct after registration, owned by the registry.
#[derive(Clone, Debug)]
pub struct RegisteredConstruct {
    pub symbol: Name,
    pub kind: ConstructKind,
    pub construct: Construct,
}

impl RegisteredConstruct {
    /// Operand or parameter types, for specialized constructs.
    pub fn signature(&self) -> Option<TypeSignature> {
        match &self.construct {
            Construct::Operator(op) => op.signature().cloned(),
            Construct::Converter(c) => c.source.clone().map(TypeSignature::unary),
            Construct::Function(f) => Some(f.params.clone()),
            Construct::Constant(_) | Construct::TypeDeclaration(_) | Construct::Variadic(_) => {
                None
            }
        }
    }

    /// Result type when it does not depend on the operands.
    pub fn fixed_result(&self) -> Option<Type> {
        match &self.construct {
            Construct::Operator(op) => match &op.typing {
                Typing::Fixed { result, .. } => Some(result.clone()),
                Typing::Generic(_) => None,
            },
            Construct::Converter(c) => Some(c.target.clone()),
            Construct::Function(f) => Some(f.result.clone()),
            Construct::Constant(c) => Some(c.value.ty()),
            Construct::TypeDeclaration(t) => Some(t.descriptor.ty()),
            Construct::Variadic(_) => None,
        }
    }

    /// Evaluator of constructs that carry a single one.
    pub fn evaluator(&self) -> Option<&Evaluator> {
        match &self.construct {
            Construct::Operator(op) => Some(&op.eval),
            Construct::Converter(c) => Some(&c.eval),
            Construct::Function(f) => Some(&f.eval),
            Construct::Constant(_) | Construct::TypeDeclaration(_) | Construct::Variadic(_) => {
                None
            }
        }
    }

    pub fn is_generic(&self) -> bool {
        match &self.construct {
            Construct::Operator(op) => matches!(op.typing, Typing::Generic(_)),
            Construct::Converter(c) => c.source.is_none(),
            _ => false,
        }
    }
}

/// The binary, prefix or postfix constructs of one symbol, sharing one
/// precedence.
#[derive(Clone, Debug)]
pub struct ConstructCollection {
    pub(crate) fixity: Fixity,
    pub(crate) generic: Option<ConstructId>,
    pub(crate) specialized: FxHashMap<TypeSignature, ConstructId>,
    /// Registration order, for stable listings.
    pub(crate) order: Vec<ConstructId>,
    pub(crate) precedence: i32,
}

impl ConstructCollection {
    pub(crate) fn new(fixity: Fixity) -> Self {
        ConstructCollection {
            fixity,
            generic: None,
            specialized: FxHashMap::default(),
            order: Vec::new(),
            precedence: 0,
        }
    }

    pub fn fixity(&self) -> Fixity {
        self.fixity
    }

    /// Lower binds tighter.
    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn generic(&self) -> Option<ConstructId> {
        self.generic
    }

    pub fn specialized(&self, signature: &TypeSignature) -> Option<ConstructId> {
        self.specialized.get(signature).copied()
    }

    pub fn constructs(&self) -> &[ConstructId] {
        &self.order
    }
}

/// Fixed-arity overloads of one function symbol.
#[derive(Clone, Debug, Default)]
pub struct FunctionSet {
    pub(crate) overloads: FxHashMap<TypeSignature, ConstructId>,
    pub(crate) order: Vec<ConstructId>,
}

impl FunctionSet {
    pub fn get(&self, signature: &TypeSignature) -> Option<ConstructId> {
        self.overloads.get(signature).copied()
    }

    pub fn constructs(&self) -> &[ConstructId] {
        &self.order
    }

    /// Distinct parameter counts, ascending.
    pub fn arities(&self) -> Vec<usize> {
        let mut arities: Vec<usize> = self.overloads.keys().map(TypeSignature::len).collect();
        arities.sort_unstable();
        arities.dedup();
        arities
    }
}

/// The single value-like construct a symbol may hold.
#[derive(Clone, Debug)]
pub enum ValueConstruct {
    Constant(ConstructId),
    TypeDeclaration(ConstructId),
    Functions(FunctionSet),
    Variadic(ConstructId),
}

/// Everything registered under one symbol.
#[derive(Clone, Debug)]
pub struct ConstructDefinition {
    pub(crate) symbol: Name,
    pub(crate) kinds: ConstructKinds,
    pub(crate) binary: Option<ConstructCollection>,
    pub(crate) prefix: Option<ConstructCollection>,
    pub(crate) postfix: Option<ConstructCollection>,
    pub(crate) value: Option<ValueConstruct>,
}

impl ConstructDefinition {
    pub(crate) fn new(symbol: Name) -> Self {
        ConstructDefinition {
            symbol,
            kinds: ConstructKinds::empty(),
            binary: None,
            prefix: None,
            postfix: None,
            value: None,
        }
    }

    pub fn symbol(&self) -> &Name {
        &self.symbol
    }

    pub fn kinds(&self) -> ConstructKinds {
        self.kinds
    }

    pub fn collection(&self, fixity: Fixity) -> Option<&ConstructCollection> {
        match fixity {
            Fixity::Prefix => self.prefix.as_ref(),
            Fixity::Postfix => self.postfix.as_ref(),
            Fixity::Binary => self.binary.as_ref(),
        }
    }

    pub(crate) fn collection_mut(&mut self, fixity: Fixity) -> &mut ConstructCollection {
        let slot = match fixity {
            Fixity::Prefix => &mut self.prefix,
            Fixity::Postfix => &mut self.postfix,
            Fixity::Binary => &mut self.binary,
        };
        slot.get_or_insert_with(|| ConstructCollection::new(fixity))
    }

    pub fn value(&self) -> Option<&ValueConstruct> {
        self.value.as_ref()
    }
}
