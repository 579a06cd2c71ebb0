//! Host type descriptors.
//!
//! A [`TypeDescriptor`] tells the member-access, method, indexer,
//! constructor and invocation constructs what a host type offers. Receivers
//! are passed as the first evaluator argument.

use std::fmt;
use std::sync::Arc;

use quill_ir::{EvalResult, Evaluator, Name, Type, TypeSignature, Value};
use rustc_hash::FxHashMap;

use crate::Function;

/// A readable property of a host type.
#[derive(Clone)]
pub struct Member {
    pub name: Name,
    pub ty: Type,
    /// Receives `[receiver]`.
    pub get: Evaluator,
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// One overload of a named method. The evaluator receives
/// `[receiver, args...]`; `function.params` excludes the receiver.
#[derive(Clone, Debug)]
pub struct Method {
    pub name: Name,
    pub function: Function,
}

/// Everything the internal constructs know about a host type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    name: Name,
    members: Vec<Member>,
    methods: Vec<Method>,
    indexers: Vec<Function>,
    constructors: Vec<Function>,
    invokers: Vec<Function>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Name>) -> Self {
        TypeDescriptor {
            name: name.into(),
            members: Vec::new(),
            methods: Vec::new(),
            indexers: Vec::new(),
            constructors: Vec::new(),
            invokers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_member<F>(mut self, name: &str, ty: Type, get: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.members.push(Member {
            name: Name::new(name),
            ty,
            get: Arc::new(get),
        });
        self
    }

    #[must_use]
    pub fn with_method(mut self, name: &str, function: Function) -> Self {
        self.methods.push(Method {
            name: Name::new(name),
            function,
        });
        self
    }

    /// Adds an indexer; `function.params` are the index types.
    #[must_use]
    pub fn with_indexer(mut self, function: Function) -> Self {
        self.indexers.push(function);
        self
    }

    /// Adds a constructor producing this type from `params`.
    #[must_use]
    pub fn with_constructor<F>(mut self, params: impl Into<TypeSignature>, eval: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        let result = self.ty();
        self.constructors.push(Function::new(params, result, eval));
        self
    }

    /// Makes values of this type callable with `function.params`.
    #[must_use]
    pub fn with_invoker(mut self, function: Function) -> Self {
        self.invokers.push(function);
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The object type this descriptor describes.
    pub fn ty(&self) -> Type {
        Type::Object(self.name.clone())
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// All overloads of the method `name`.
    pub fn methods<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> + 'a {
        self.methods
            .iter()
            .filter(move |m| m.name == name)
            .map(|m| &m.function)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    pub fn indexers(&self) -> &[Function] {
        &self.indexers
    }

    pub fn constructors(&self) -> &[Function] {
        &self.constructors
    }

    pub fn invokers(&self) -> &[Function] {
        &self.invokers
    }

    /// Entries declared more than once, described for build errors.
    pub(crate) fn duplicates(&self) -> Vec<String> {
        let mut found = Vec::new();
        for (i, member) in self.members.iter().enumerate() {
            if self.members[..i].iter().any(|m| m.name == member.name) {
                found.push(format!("member `{}`", member.name));
            }
        }
        for (i, method) in self.methods.iter().enumerate() {
            let earlier = &self.methods[..i];
            if earlier
                .iter()
                .any(|m| m.name == method.name && m.function.params == method.function.params)
            {
                found.push(format!(
                    "method `{}{}`",
                    method.name, method.function.params
                ));
            }
        }
        let overloads = [
            ("indexer", &self.indexers),
            ("constructor", &self.constructors),
            ("invoker", &self.invokers),
        ];
        for (what, list) in overloads {
            for (i, function) in list.iter().enumerate() {
                if list[..i].iter().any(|f| f.params == function.params) {
                    found.push(format!("{what} `{}`", function.params));
                }
            }
        }
        found
    }
}

/// Host types known to a registry, by type name.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    by_name: FxHashMap<Name, Arc<TypeDescriptor>>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a descriptor, returning the one it replaced.
    pub fn insert(&mut self, descriptor: Arc<TypeDescriptor>) -> Option<Arc<TypeDescriptor>> {
        self.by_name.insert(descriptor.name().clone(), descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.by_name.get(name)
    }

    /// Descriptor of an object type; `None` for built-in types.
    pub fn describe(&self, ty: &Type) -> Option<&Arc<TypeDescriptor>> {
        match ty {
            Type::Object(name) => self.get(name.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
