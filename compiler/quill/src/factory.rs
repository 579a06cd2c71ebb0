//! The runtime entry point: a frozen registry that creates expressions.

use std::sync::Arc;

use quill_diagnostic::ErrorChain;
use quill_registry::{
    BuildErrors, ConstructInfo, ConstructKinds, Fixity, Registry, RegistryBuilder,
};
use quill_parse::{parse, ParseRequest};
use tracing::debug;

use crate::{stdlib, Expression, Signature};

/// Creates [`Expression`]s from formula text against one registry.
///
/// Cheap to clone and safe to share across threads; every `create` call is
/// independent.
#[derive(Clone, Debug)]
pub struct ExpressionFactory {
    registry: Arc<Registry>,
}

impl ExpressionFactory {
    pub fn new(registry: Registry) -> Self {
        ExpressionFactory {
            registry: Arc::new(registry),
        }
    }

    pub fn from_builder(builder: RegistryBuilder) -> Result<Self, BuildErrors> {
        builder.build().map(Self::new)
    }

    /// A factory with the standard constructs installed.
    pub fn standard() -> Result<Self, BuildErrors> {
        let mut builder = Registry::builder();
        stdlib::register(&mut builder);
        Self::from_builder(builder)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse `source` for `signature`.
    ///
    /// On failure every problem found is returned, in source order of
    /// discovery.
    pub fn create(&self, source: &str, signature: &Signature) -> Result<Expression, ErrorChain> {
        let mut request = ParseRequest::new(source).with_parameters(signature.parameters());
        if let Some(output) = signature.output() {
            request = request.with_output(output);
        }
        let output = parse(&self.registry, &request);
        if output.has_errors() {
            debug!(errors = output.errors.len(), "create failed");
            return Err(output.errors);
        }
        Ok(Expression::from_parse(
            source,
            output.arena,
            output.root,
            signature.parameters(),
            &output.referenced,
        ))
    }

    /// [`create`](Self::create) without the diagnostics.
    pub fn try_create(&self, source: &str, signature: &Signature) -> Option<Expression> {
        self.create(source, signature).ok()
    }

    // Introspection

    /// Registered symbols in sorted order.
    pub fn symbols(&self) -> Vec<&str> {
        self.registry.symbols().map(|s| s.as_str()).collect()
    }

    pub fn kinds(&self, symbol: &str) -> ConstructKinds {
        self.registry.kinds(symbol)
    }

    pub fn precedence(&self, symbol: &str, fixity: Fixity) -> Option<i32> {
        self.registry.precedence(symbol, fixity)
    }

    /// Every construct registered under `symbol`, with signatures.
    pub fn describe(&self, symbol: &str) -> Vec<ConstructInfo> {
        self.registry.describe(symbol)
    }
}
