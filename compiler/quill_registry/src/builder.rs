//! Registry builder.

use tracing::debug;

use quill_ir::Value;

use crate::validate::{self, Entry, PrecedenceEntry};
use crate::{
    BuildErrors, Configuration, Constant, Construct, ConstructKind, Converter, Fixity, Function,
    Operator, Registry, TypeDeclaration, TypeDescriptor, VariadicFunction,
};

/// Collects constructs, precedences and configuration, then validates
/// everything at once in [`build`](RegistryBuilder::build).
///
/// Registration never fails; every problem is reported by `build`.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
    precedences: Vec<PrecedenceEntry>,
    configuration: Configuration,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, symbol: &str, kind: ConstructKind, construct: Construct) -> &mut Self {
        self.entries.push(Entry {
            symbol: symbol.to_string(),
            kind,
            construct,
        });
        self
    }

    pub fn add_binary_operator(&mut self, symbol: &str, operator: Operator) -> &mut Self {
        self.push(symbol, ConstructKind::BinaryOperator, Construct::Operator(operator))
    }

    pub fn add_prefix_unary_operator(&mut self, symbol: &str, operator: Operator) -> &mut Self {
        self.push(symbol, ConstructKind::PrefixOperator, Construct::Operator(operator))
    }

    pub fn add_postfix_unary_operator(&mut self, symbol: &str, operator: Operator) -> &mut Self {
        self.push(symbol, ConstructKind::PostfixOperator, Construct::Operator(operator))
    }

    pub fn add_prefix_type_converter(&mut self, symbol: &str, converter: Converter) -> &mut Self {
        self.push(symbol, ConstructKind::PrefixConverter, Construct::Converter(converter))
    }

    pub fn add_postfix_type_converter(&mut self, symbol: &str, converter: Converter) -> &mut Self {
        self.push(symbol, ConstructKind::PostfixConverter, Construct::Converter(converter))
    }

    pub fn add_constant(&mut self, symbol: &str, value: impl Into<Value>) -> &mut Self {
        let constant = Constant {
            value: value.into(),
        };
        self.push(symbol, ConstructKind::Constant, Construct::Constant(constant))
    }

    pub fn add_type_declaration(&mut self, symbol: &str, descriptor: TypeDescriptor) -> &mut Self {
        let declaration = TypeDeclaration {
            descriptor: descriptor.into(),
        };
        self.push(
            symbol,
            ConstructKind::TypeDeclaration,
            Construct::TypeDeclaration(declaration),
        )
    }

    /// Adds one overload to the function set named `symbol`.
    pub fn add_function(&mut self, symbol: &str, function: Function) -> &mut Self {
        self.push(symbol, ConstructKind::Function, Construct::Function(function))
    }

    pub fn add_variadic_function(&mut self, symbol: &str, function: VariadicFunction) -> &mut Self {
        self.push(symbol, ConstructKind::VariadicFunction, Construct::Variadic(function))
    }

    fn set_precedence(&mut self, symbol: &str, fixity: Fixity, precedence: i32) -> &mut Self {
        self.precedences.push(PrecedenceEntry {
            symbol: symbol.to_string(),
            fixity,
            precedence,
        });
        self
    }

    /// Precedence of the binary operators of `symbol`; lower binds tighter.
    pub fn set_binary_precedence(&mut self, symbol: &str, precedence: i32) -> &mut Self {
        self.set_precedence(symbol, Fixity::Binary, precedence)
    }

    /// Precedence shared by the prefix operators and converters of `symbol`.
    pub fn set_prefix_precedence(&mut self, symbol: &str, precedence: i32) -> &mut Self {
        self.set_precedence(symbol, Fixity::Prefix, precedence)
    }

    /// Precedence shared by the postfix operators and converters of `symbol`.
    pub fn set_postfix_precedence(&mut self, symbol: &str, precedence: i32) -> &mut Self {
        self.set_precedence(symbol, Fixity::Postfix, precedence)
    }

    pub fn set_configuration(&mut self, configuration: Configuration) -> &mut Self {
        self.configuration = configuration;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Number of constructs registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate everything and freeze it into a [`Registry`].
    ///
    /// Either every check passes and a registry is returned, or every
    /// problem found is returned together and nothing is built.
    #[tracing::instrument(level = "debug", skip_all, fields(constructs = self.entries.len()))]
    pub fn build(self) -> Result<Registry, BuildErrors> {
        match validate::assemble(self.entries, self.precedences, self.configuration) {
            Ok(registry) => {
                debug!(symbols = registry.symbols().count(), "registry built");
                Ok(registry)
            }
            Err(errors) => {
                debug!(errors = errors.len(), "registry rejected");
                Err(errors)
            }
        }
    }
}
