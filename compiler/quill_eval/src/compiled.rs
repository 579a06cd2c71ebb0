//! The compiled callable.

use std::fmt;
use std::sync::Arc;

use quill_ir::{EvalResult, Name, Type, Value};

use crate::InvokeError;

/// A lowered expression: takes the unbound argument values in index order.
pub type CompiledFn = Arc<dyn Fn(&[Value]) -> EvalResult + Send + Sync>;

/// An expression ready to run, paired with its argument map.
///
/// Immutable and cheap to clone; safe to invoke from many threads at once.
#[derive(Clone)]
pub struct CompiledExpression {
    function: CompiledFn,
    arguments: Arc<[Name]>,
    output: Type,
}

impl CompiledExpression {
    pub fn new(function: CompiledFn, arguments: Vec<Name>, output: Type) -> Self {
        CompiledExpression {
            function,
            arguments: arguments.into(),
            output,
        }
    }

    /// Names of the arguments `invoke` expects, in order.
    pub fn arguments(&self) -> &[Name] {
        &self.arguments
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn argument_index(&self, name: &str) -> Option<usize> {
        self.arguments.iter().position(|n| n.as_str() == name)
    }

    pub fn output_type(&self) -> &Type {
        &self.output
    }

    /// Run the expression with one value per unbound argument.
    ///
    /// Values are not type-checked here; binding and parsing already did.
    pub fn invoke(&self, values: &[Value]) -> Result<Value, InvokeError> {
        if values.len() != self.arguments.len() {
            return Err(InvokeError::ArgumentCount {
                expected: self.arguments.len(),
                found: values.len(),
            });
        }
        Ok((self.function)(values)?)
    }

    /// Run the expression with values given by argument name.
    pub fn invoke_named(&self, values: &[(&str, Value)]) -> Result<Value, InvokeError> {
        let mut slots: Vec<Option<Value>> = vec![None; self.arguments.len()];
        for (name, value) in values {
            let index = self
                .argument_index(name)
                .ok_or_else(|| InvokeError::UnknownArgument((*name).to_string()))?;
            if slots[index].replace(value.clone()).is_some() {
                return Err(InvokeError::DuplicateArgument((*name).to_string()));
            }
        }
        let ordered = slots
            .into_iter()
            .zip(self.arguments.iter())
            .map(|(slot, name)| slot.ok_or_else(|| InvokeError::MissingArgument(name.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        self.invoke(&ordered)
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("arguments", &self.arguments)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
