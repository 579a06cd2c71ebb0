//! Reserved internal constructs.
//!
//! The parser desugars postfix member access, method calls, indexing,
//! constructor calls, array literals and invocation into calls of these
//! variadic constructs. They are installed into every registry under
//! symbols user registrations may not take, and consult the registry's
//! [`TypeTable`] for host types.

use std::sync::Arc;

use quill_ir::{
    arity_mismatch, index_out_of_bounds, type_mismatch, ConstructId, EvalResult, Evaluator,
    ListValue, Name, Type, TypeSignature, Value,
};
use smallvec::SmallVec;

use crate::resolve::{select_signature, widening_evaluator};
use crate::{
    CallRejection, CallSite, Construct, ConstructKind, Function, RegisteredConstruct, Resolved,
    TypeTable, VariadicFunction,
};

/// The reserved constructs.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Internal {
    /// `x.name`; arguments `[target, name]`.
    Member,
    /// `x[i]`; arguments `[target, index...]`.
    Indexer,
    /// `x.name(a)`; arguments `[target, name, args...]`.
    Method,
    /// `T(a)`; arguments `[type name, args...]`.
    Constructor,
    /// `[a, b]`; arguments are the elements.
    Array,
    /// `x(a)`; arguments `[target, args...]`.
    Invoke,
}

impl Internal {
    pub const ALL: [Internal; 6] = [
        Internal::Member,
        Internal::Indexer,
        Internal::Method,
        Internal::Constructor,
        Internal::Array,
        Internal::Invoke,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Internal::Member => ".",
            Internal::Indexer => "[]",
            Internal::Method => ".()",
            Internal::Constructor => "#new",
            Internal::Array => "[..]",
            Internal::Invoke => "()",
        }
    }

    pub fn purpose(self) -> &'static str {
        match self {
            Internal::Member => "member access",
            Internal::Indexer => "indexing",
            Internal::Method => "method calls",
            Internal::Constructor => "constructor calls",
            Internal::Array => "array literals",
            Internal::Invoke => "invocation",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Internal> {
        Internal::ALL.into_iter().find(|i| i.symbol() == symbol)
    }

    fn slot(self) -> usize {
        match self {
            Internal::Member => 0,
            Internal::Indexer => 1,
            Internal::Method => 2,
            Internal::Constructor => 3,
            Internal::Array => 4,
            Internal::Invoke => 5,
        }
    }
}

/// Construct ids of the installed internal constructs.
#[derive(Clone, Debug)]
pub(crate) struct Internals {
    ids: [ConstructId; 6],
}

impl Internals {
    pub(crate) fn get(&self, internal: Internal) -> ConstructId {
        self.ids[internal.slot()]
    }
}

/// Appends the internal constructs to `constructs`.
pub(crate) fn install(
    constructs: &mut Vec<RegisteredConstruct>,
    types: &Arc<TypeTable>,
) -> Internals {
    let mut ids = [ConstructId::new(0); 6];
    for internal in Internal::ALL {
        let table = Arc::clone(types);
        let resolver = VariadicFunction::new(move |site| match internal {
            Internal::Member => member(&table, site),
            Internal::Indexer => indexer(&table, site),
            Internal::Method => method(&table, site),
            Internal::Constructor => constructor(&table, site),
            Internal::Array => array(site),
            Internal::Invoke => invoke(&table, site),
        });
        ids[internal.slot()] = ConstructId::new(u32::try_from(constructs.len()).unwrap_or(u32::MAX));
        constructs.push(RegisteredConstruct {
            symbol: Name::new(internal.symbol()),
            kind: ConstructKind::VariadicFunction,
            construct: Construct::Variadic(resolver),
        });
    }
    Internals { ids }
}

fn arity(message: &str) -> CallRejection {
    CallRejection::Arity(message.to_string())
}

/// Removes the name argument at position 1 before calling `eval`.
fn skip_name(eval: Evaluator) -> Evaluator {
    Arc::new(move |args: &[Value]| {
        let kept: SmallVec<[Value; 4]> = args
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 1)
            .map(|(_, v)| v.clone())
            .collect();
        eval(&kept)
    })
}

fn receiver(args: &[Value], operation: &str) -> Result<Value, quill_ir::EvalError> {
    args.first()
        .cloned()
        .ok_or_else(|| arity_mismatch(operation, 1, 0))
}

fn length(args: &[Value]) -> EvalResult {
    let len = match receiver(args, "length")? {
        Value::Str(s) => s.chars().count(),
        Value::List(list) => list.len(),
        other => return Err(type_mismatch("str or list", &other)),
    };
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

fn member(types: &TypeTable, site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    let [target, _] = site.types else {
        return Err(arity("member access takes a target and a member name"));
    };
    let name = site
        .literal_str(1)
        .ok_or_else(|| CallRejection::Types("member name must be a literal".to_string()))?;
    match target {
        Type::Str | Type::List(_) if name == "length" => Ok(Resolved::new(Type::Int, length)),
        Type::Object(type_name) => {
            let found = types.get(type_name.as_str()).and_then(|d| d.member(name));
            let Some(found) = found else {
                return Err(CallRejection::UnknownMember(format!(
                    "type `{type_name}` has no member `{name}`"
                )));
            };
            Ok(Resolved {
                result: found.ty.clone(),
                eval: skip_name(found.get.clone()),
            })
        }
        _ => Err(CallRejection::UnknownMember(format!(
            "type `{target}` has no member `{name}`"
        ))),
    }
}

fn string_method(name: &str, args: &[Type]) -> Option<Function> {
    fn text(args: &[Value], op: fn(&str) -> String) -> EvalResult {
        match receiver(args, "string method")? {
            Value::Str(s) => Ok(Value::string(op(&s))),
            other => Err(type_mismatch("str", &other)),
        }
    }
    fn test(args: &[Value], op: fn(&str, &str) -> bool) -> EvalResult {
        match (args.first(), args.get(1)) {
            (Some(Value::Str(s)), Some(Value::Str(p))) => Ok(Value::Bool(op(s, p))),
            (Some(Value::Str(_)), Some(other)) | (Some(other), _) => {
                Err(type_mismatch("str", other))
            }
            (None, _) => Err(arity_mismatch("string method", 2, 0)),
        }
    }
    let none = TypeSignature::default();
    let function = match (name, args) {
        ("upper", []) => Function::new(none, Type::Str, |a| text(a, str::to_uppercase)),
        ("lower", []) => Function::new(none, Type::Str, |a| text(a, str::to_lowercase)),
        ("trim", []) => Function::new(none, Type::Str, |a| text(a, |s| s.trim().to_string())),
        ("contains", [Type::Str]) => {
            Function::new([Type::Str], Type::Bool, |a| test(a, |s, p| s.contains(p)))
        }
        ("starts_with", [Type::Str]) => {
            Function::new([Type::Str], Type::Bool, |a| test(a, |s, p| s.starts_with(p)))
        }
        ("ends_with", [Type::Str]) => {
            Function::new([Type::Str], Type::Bool, |a| test(a, |s, p| s.ends_with(p)))
        }
        _ => return None,
    };
    Some(function)
}

fn list_method(element: &Type, name: &str, args: &[Type]) -> Option<(Function, bool)> {
    match (name, args) {
        ("contains", [arg]) if arg == element || arg.widens_to(element) => {
            let widen = arg != element;
            let function = Function::new([arg.clone()], Type::Bool, |a| {
                match (a.first(), a.get(1)) {
                    (Some(Value::List(list)), Some(needle)) => {
                        Ok(Value::Bool(list.items().contains(needle)))
                    }
                    (Some(other), _) => Err(type_mismatch("list", other)),
                    (None, _) => Err(arity_mismatch("contains", 2, 0)),
                }
            });
            Some((function, widen))
        }
        _ => None,
    }
}

fn method(types: &TypeTable, site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    if site.len() < 2 {
        return Err(arity("method call takes a target and a method name"));
    }
    let name = site
        .literal_str(1)
        .ok_or_else(|| CallRejection::Types("method name must be a literal".to_string()))?;
    let target = &site.types[0];
    let args = &site.types[2..];
    let described = TypeSignature::from(args);

    match target {
        Type::Str => {
            if let Some(function) = string_method(name, args) {
                return Ok(Resolved {
                    result: function.result,
                    eval: skip_name(function.eval),
                });
            }
        }
        Type::List(element) => {
            if let Some((function, widen)) = list_method(element, name, args) {
                let eval = widening_evaluator(function.eval, &[widen], 1);
                return Ok(Resolved {
                    result: function.result,
                    eval: skip_name(eval),
                });
            }
        }
        Type::Object(type_name) => {
            if let Some(descriptor) = types.get(type_name.as_str()) {
                let overloads: Vec<&Function> = descriptor.methods(name).collect();
                if !overloads.is_empty() {
                    let chosen = select_signature(overloads.iter().map(|f| &f.params), args);
                    let Some((index, widen)) = chosen else {
                        return Err(CallRejection::Types(format!(
                            "no overload of `{type_name}.{name}` accepts {described}"
                        )));
                    };
                    let function = overloads[index];
                    let eval = widening_evaluator(function.eval.clone(), &widen, 1);
                    return Ok(Resolved {
                        result: function.result.clone(),
                        eval: skip_name(eval),
                    });
                }
            }
        }
        _ => {}
    }
    Err(CallRejection::UnknownMember(format!(
        "type `{target}` has no method `{name}` accepting {described}"
    )))
}

fn index_of(index: &Value, len: usize) -> Result<usize, quill_ir::EvalError> {
    let Value::Int(i) = index else {
        return Err(type_mismatch("int", index));
    };
    usize::try_from(*i)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| index_out_of_bounds(*i, len))
}

fn builtin_index(args: &[Value]) -> EvalResult {
    let (Some(target), Some(index)) = (args.first(), args.get(1)) else {
        return Err(arity_mismatch("indexing", 2, args.len()));
    };
    match target {
        Value::List(list) => Ok(list.items()[index_of(index, list.len())?].clone()),
        Value::Str(s) => {
            let i = index_of(index, s.chars().count())?;
            Ok(s.chars()
                .nth(i)
                .map_or(Value::Unit, |c| Value::string(c.to_string())))
        }
        other => Err(type_mismatch("str or list", other)),
    }
}

fn indexer(types: &TypeTable, site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    let Some((target, args)) = site.types.split_first() else {
        return Err(arity("indexing takes a target"));
    };
    match (target, args) {
        (Type::List(element), [Type::Int]) => {
            return Ok(Resolved::new((**element).clone(), builtin_index));
        }
        (Type::Str, [Type::Int]) => return Ok(Resolved::new(Type::Str, builtin_index)),
        (Type::List(_) | Type::Str, _) => {
            return Err(CallRejection::Types(format!(
                "`{target}` is indexed by a single int, found {}",
                TypeSignature::from(args)
            )));
        }
        _ => {}
    }
    let descriptor = types.describe(target);
    let indexers = descriptor.map(|d| d.indexers()).unwrap_or_default();
    if indexers.is_empty() {
        return Err(CallRejection::UnknownMember(format!(
            "type `{target}` cannot be indexed"
        )));
    }
    let Some((index, widen)) = select_signature(indexers.iter().map(|f| &f.params), args) else {
        return Err(CallRejection::Types(format!(
            "no indexer of `{target}` accepts {}",
            TypeSignature::from(args)
        )));
    };
    let function = &indexers[index];
    Ok(Resolved {
        result: function.result.clone(),
        eval: widening_evaluator(function.eval.clone(), &widen, 1),
    })
}

fn overloads_for(
    functions: &[Function],
    args: &[Type],
    what: &str,
) -> Result<(Type, Evaluator, SmallVec<[bool; 4]>), CallRejection> {
    match select_signature(functions.iter().map(|f| &f.params), args) {
        Some((index, widen)) => {
            let function = &functions[index];
            Ok((function.result.clone(), function.eval.clone(), widen))
        }
        None if functions.iter().all(|f| f.params.len() != args.len()) => {
            Err(CallRejection::Arity(format!(
                "no {what} takes {} argument(s)",
                args.len()
            )))
        }
        None => Err(CallRejection::Types(format!(
            "no {what} accepts {}",
            TypeSignature::from(args)
        ))),
    }
}

fn constructor(types: &TypeTable, site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    let Some(type_name) = site.literal_str(0) else {
        return Err(CallRejection::Types("constructor needs a type name".to_string()));
    };
    let Some(descriptor) = types.get(type_name) else {
        return Err(CallRejection::UnknownMember(format!("unknown type `{type_name}`")));
    };
    if descriptor.constructors().is_empty() {
        return Err(CallRejection::UnknownMember(format!(
            "type `{type_name}` has no constructors"
        )));
    }
    let args = &site.types[1..];
    let what = format!("constructor of `{type_name}`");
    let (result, eval, widen) = overloads_for(descriptor.constructors(), args, &what)?;
    let inner = widening_evaluator(eval, &widen, 0);
    Ok(Resolved {
        result,
        eval: Arc::new(move |values: &[Value]| inner(values.get(1..).unwrap_or_default())),
    })
}

fn array(site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    let Some(first) = site.types.first() else {
        return Err(CallRejection::Types(
            "an empty array literal has no element type".to_string(),
        ));
    };
    let mut element = first.clone();
    for ty in &site.types[1..] {
        if *ty == element {
            continue;
        }
        if ty.widens_to(&element) {
            continue;
        }
        if element.widens_to(ty) {
            element = ty.clone();
            continue;
        }
        return Err(CallRejection::Types(format!(
            "array elements have different types: `{element}` and `{ty}`"
        )));
    }
    let result = Type::list_of(element.clone());
    Ok(Resolved::new(result, move |values| {
        let items = values
            .iter()
            .map(|v| v.coerce_to(&element).ok_or_else(|| type_mismatch(&element.to_string(), v)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(ListValue::new(element.clone(), items)))
    }))
}

fn invoke(types: &TypeTable, site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    let Some((target, args)) = site.types.split_first() else {
        return Err(arity("invocation takes a target"));
    };
    let invokers = types.describe(target).map(|d| d.invokers()).unwrap_or_default();
    if invokers.is_empty() {
        return Err(CallRejection::UnknownMember(format!(
            "values of type `{target}` cannot be called"
        )));
    }
    let what = format!("invocation of `{target}`");
    let (result, eval, widen) = overloads_for(invokers, args, &what)?;
    Ok(Resolved {
        result,
        eval: widening_evaluator(eval, &widen, 1),
    })
}

#[cfg(test)]
mod tests;
