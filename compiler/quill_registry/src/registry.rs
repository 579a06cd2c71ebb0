//! The frozen construct registry.

use std::fmt;
use std::sync::Arc;

use quill_ir::{ConstructId, Name, Type, TypeSignature, Value};
use quill_lexer::SymbolSet;
use rustc_hash::FxHashMap;

use crate::internal::{self, Internal, Internals};
use crate::{
    Construct, ConstructDefinition, ConstructKind, ConstructKinds, Configuration, Fixity,
    RegisteredConstruct, RegistryBuilder, TypeTable,
};

/// Immutable table of constructs, keyed by symbol.
///
/// Built once by [`RegistryBuilder::build`] and then shared by reference
/// (typically behind `Arc`) across threads; nothing in it changes after
/// construction.
pub struct Registry {
    constructs: Vec<RegisteredConstruct>,
    definitions: FxHashMap<Name, ConstructDefinition>,
    /// User symbols, sorted.
    symbols: Vec<Name>,
    /// Symbols by first character, longest first.
    lexicon: FxHashMap<char, Vec<Name>>,
    types: Arc<TypeTable>,
    internals: Internals,
    configuration: Configuration,
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry>();
};

impl Registry {
    pub(crate) fn from_parts(
        mut constructs: Vec<RegisteredConstruct>,
        definitions: FxHashMap<Name, ConstructDefinition>,
        types: TypeTable,
        configuration: Configuration,
    ) -> Self {
        let types = Arc::new(types);
        let internals = internal::install(&mut constructs, &types);

        let mut symbols: Vec<Name> = definitions.keys().cloned().collect();
        symbols.sort();

        let mut lexicon: FxHashMap<char, Vec<Name>> = FxHashMap::default();
        for symbol in &symbols {
            if let Some(first) = symbol.as_str().chars().next() {
                lexicon.entry(first).or_default().push(symbol.clone());
            }
        }
        for candidates in lexicon.values_mut() {
            candidates.sort_by(|a, b| b.as_str().len().cmp(&a.as_str().len()));
        }

        Registry {
            constructs,
            definitions,
            symbols,
            lexicon,
            types,
            internals,
            configuration,
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn definition(&self, symbol: &str) -> Option<&ConstructDefinition> {
        self.definitions.get(symbol)
    }

    /// The construct with this id. Ids come from this registry's own
    /// definitions and resolutions.
    pub fn construct(&self, id: ConstructId) -> &RegisteredConstruct {
        &self.constructs[id.index()]
    }

    pub fn constructs(&self) -> &[RegisteredConstruct] {
        &self.constructs
    }

    /// Value of a constant construct.
    pub fn constant(&self, id: ConstructId) -> Option<&Value> {
        match &self.construct(id).construct {
            Construct::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    pub fn internal(&self, internal: Internal) -> ConstructId {
        self.internals.get(internal)
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Registered symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &Name> + '_ {
        self.symbols.iter()
    }

    pub fn kinds(&self, symbol: &str) -> ConstructKinds {
        self.definition(symbol)
            .map(ConstructDefinition::kinds)
            .unwrap_or_default()
    }

    pub fn precedence(&self, symbol: &str, fixity: Fixity) -> Option<i32> {
        self.definition(symbol)?
            .collection(fixity)
            .map(|c| c.precedence())
    }

    /// Every construct registered under `symbol`, in registration order.
    pub fn describe(&self, symbol: &str) -> Vec<ConstructInfo> {
        self.constructs
            .iter()
            .filter(|c| c.symbol == symbol)
            .map(|c| ConstructInfo {
                kind: c.kind,
                signature: c.signature(),
                result: c.fixed_result(),
                precedence: c
                    .kind
                    .fixity()
                    .and_then(|fixity| self.precedence(symbol, fixity)),
            })
            .collect()
    }
}

impl SymbolSet for Registry {
    fn longest_prefix(&self, text: &str) -> Option<usize> {
        let first = text.chars().next()?;
        self.lexicon
            .get(&first)?
            .iter()
            .find(|symbol| text.starts_with(symbol.as_str()))
            .map(|symbol| symbol.as_str().len())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("symbols", &self.symbols)
            .field("constructs", &self.constructs.len())
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

/// Introspection record for one registered construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructInfo {
    pub kind: ConstructKind,
    /// Operand or parameter types; `None` for generic and variadic constructs.
    pub signature: Option<TypeSignature>,
    /// Result type when fixed.
    pub result: Option<Type>,
    pub precedence: Option<i32>,
}

impl fmt::Display for ConstructInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        match (&self.signature, self.kind) {
            (Some(signature), _) => write!(f, " {signature}")?,
            (None, ConstructKind::VariadicFunction) => f.write_str(" (...)")?,
            (None, kind) if kind.fixity().is_some() => f.write_str(" (generic)")?,
            (None, _) => {}
        }
        if let Some(result) = &self.result {
            write!(f, " -> {result}")?;
        }
        if let Some(precedence) = self.precedence {
            write!(f, ", precedence {precedence}")?;
        }
        Ok(())
    }
}
