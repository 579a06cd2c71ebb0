#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill_ir::{EvalError, Type, Value};

use super::*;
use crate::{Registry, RegistryBuilder, ResolveError, TypeDescriptor};

#[derive(Debug)]
struct Money(f64);

fn amount(value: &Value) -> f64 {
    value
        .as_object()
        .and_then(|o| o.downcast_ref::<Money>())
        .map_or(f64::NAN, |m| m.0)
}

fn registry() -> Registry {
    let money = TypeDescriptor::new("Money")
        .with_member("amount", Type::Float, |args| Ok(Value::Float(amount(&args[0]))))
        .with_method(
            "scale",
            Function::new([Type::Float], Type::object("Money"), |args| {
                let factor = args[1].as_float().unwrap_or(f64::NAN);
                Ok(Value::object("Money", Money(amount(&args[0]) * factor)))
            }),
        )
        .with_indexer(Function::new([Type::Int], Type::Float, |args| {
            Ok(Value::Float(amount(&args[0]) + args[1].as_float().unwrap_or(0.0)))
        }))
        .with_constructor([Type::Float], |args| {
            Ok(Value::object("Money", Money(args[0].as_float().unwrap_or(0.0))))
        })
        .with_invoker(Function::new([Type::Float], Type::Float, |args| {
            Ok(Value::Float(amount(&args[0]) * args[1].as_float().unwrap_or(0.0)))
        }));
    let mut builder = RegistryBuilder::new();
    builder.add_type_declaration("Money", money);
    builder.build().unwrap()
}

fn resolve(
    registry: &Registry,
    internal: Internal,
    types: &[Type],
    constants: &[Option<Value>],
) -> Result<crate::Resolution, ResolveError> {
    let site = CallSite { types, constants };
    registry.resolve_variadic(registry.internal(internal), &site)
}

fn money(n: f64) -> Value {
    Value::object("Money", Money(n))
}

#[test]
fn test_reserved_symbol_table() {
    for internal in Internal::ALL {
        assert_eq!(Internal::from_symbol(internal.symbol()), Some(internal));
    }
    assert_eq!(Internal::from_symbol("+"), None);
    let registry = registry();
    let member = registry.construct(registry.internal(Internal::Member));
    assert_eq!(member.symbol, ".");
    assert!(registry.definition(".").is_none());
}

#[test]
fn test_builtin_length() {
    let registry = registry();
    let name = Some(Value::from("length"));
    let resolution = resolve(&registry, Internal::Member, &[Type::Str, Type::Str], &[None, name]).unwrap();
    assert_eq!(resolution.result, Type::Int);
    let value = (resolution.eval)(&[Value::from("héllo"), Value::from("length")]).unwrap();
    assert_eq!(value, Value::Int(5));
}

#[test]
fn test_host_member() {
    let registry = registry();
    let types = [Type::object("Money"), Type::Str];
    let resolution = resolve(
        &registry,
        Internal::Member,
        &types,
        &[None, Some(Value::from("amount"))],
    )
    .unwrap();
    assert_eq!(resolution.result, Type::Float);
    let value = (resolution.eval)(&[money(2.5), Value::from("amount")]).unwrap();
    assert_eq!(value, Value::Float(2.5));

    let missing = resolve(
        &registry,
        Internal::Member,
        &types,
        &[None, Some(Value::from("currency"))],
    );
    assert!(matches!(
        missing,
        Err(ResolveError::Rejected(CallRejection::UnknownMember(_)))
    ));
}

#[test]
fn test_method_with_widening() {
    let registry = registry();
    let types = [Type::object("Money"), Type::Str, Type::Int];
    let resolution = resolve(
        &registry,
        Internal::Method,
        &types,
        &[None, Some(Value::from("scale")), None],
    )
    .unwrap();
    assert_eq!(resolution.result, Type::object("Money"));
    let value = (resolution.eval)(&[money(2.0), Value::from("scale"), Value::Int(3)]).unwrap();
    assert_eq!(amount(&value), 6.0);
}

#[test]
fn test_string_methods() {
    let registry = registry();
    let upper = resolve(
        &registry,
        Internal::Method,
        &[Type::Str, Type::Str],
        &[None, Some(Value::from("upper"))],
    )
    .unwrap();
    let value = (upper.eval)(&[Value::from("abc"), Value::from("upper")]).unwrap();
    assert_eq!(value, Value::from("ABC"));

    let contains = resolve(
        &registry,
        Internal::Method,
        &[Type::Str, Type::Str, Type::Str],
        &[None, Some(Value::from("contains")), None],
    )
    .unwrap();
    assert_eq!(contains.result, Type::Bool);
    let value = (contains.eval)(&[Value::from("abc"), Value::from("contains"), Value::from("b")])
        .unwrap();
    assert_eq!(value, Value::Bool(true));
}

#[test]
fn test_list_indexing() {
    let registry = registry();
    let list_ty = Type::list_of(Type::Int);
    let resolution = resolve(&registry, Internal::Indexer, &[list_ty, Type::Int], &[None, None]).unwrap();
    assert_eq!(resolution.result, Type::Int);
    let list = Value::list(Type::Int, vec![Value::Int(10), Value::Int(20)]);
    assert_eq!(
        (resolution.eval)(&[list.clone(), Value::Int(1)]).unwrap(),
        Value::Int(20)
    );
    assert_eq!(
        (resolution.eval)(&[list, Value::Int(2)]).unwrap_err(),
        EvalError::IndexOutOfBounds { index: 2, len: 2 }
    );
}

#[test]
fn test_string_indexing_counts_chars() {
    let registry = registry();
    let resolution = resolve(&registry, Internal::Indexer, &[Type::Str, Type::Int], &[None, None]).unwrap();
    let value = (resolution.eval)(&[Value::from("héllo"), Value::Int(1)]).unwrap();
    assert_eq!(value, Value::from("é"));
}

#[test]
fn test_unindexable() {
    let registry = registry();
    let error = resolve(&registry, Internal::Indexer, &[Type::Bool, Type::Int], &[None, None]);
    assert!(matches!(
        error,
        Err(ResolveError::Rejected(CallRejection::UnknownMember(_)))
    ));
}

#[test]
fn test_host_indexer() {
    let registry = registry();
    let resolution = resolve(
        &registry,
        Internal::Indexer,
        &[Type::object("Money"), Type::Int],
        &[None, None],
    )
    .unwrap();
    let value = (resolution.eval)(&[money(1.0), Value::Int(2)]).unwrap();
    assert_eq!(value, Value::Float(3.0));
}

#[test]
fn test_constructor() {
    let registry = registry();
    let resolution = resolve(
        &registry,
        Internal::Constructor,
        &[Type::Str, Type::Int],
        &[Some(Value::from("Money")), None],
    )
    .unwrap();
    assert_eq!(resolution.result, Type::object("Money"));
    let value = (resolution.eval)(&[Value::from("Money"), Value::Int(4)]).unwrap();
    assert_eq!(amount(&value), 4.0);

    let arity = resolve(
        &registry,
        Internal::Constructor,
        &[Type::Str],
        &[Some(Value::from("Money"))],
    );
    assert!(matches!(
        arity,
        Err(ResolveError::Rejected(CallRejection::Arity(_)))
    ));
}

#[test]
fn test_array_literal_types() {
    let registry = registry();
    let mixed = resolve(&registry, Internal::Array, &[Type::Int, Type::Float], &[None, None]).unwrap();
    assert_eq!(mixed.result, Type::list_of(Type::Float));
    let value = (mixed.eval)(&[Value::Int(1), Value::Float(2.5)]).unwrap();
    assert_eq!(
        value,
        Value::list(Type::Float, vec![Value::Float(1.0), Value::Float(2.5)])
    );

    let empty = resolve(&registry, Internal::Array, &[], &[]);
    assert!(matches!(empty, Err(ResolveError::Rejected(CallRejection::Types(_)))));

    let clash = resolve(&registry, Internal::Array, &[Type::Int, Type::Str], &[None, None]);
    assert_eq!(
        clash.unwrap_err(),
        ResolveError::Rejected(CallRejection::Types(
            "array elements have different types: `int` and `str`".to_string()
        ))
    );
}

#[test]
fn test_invocation() {
    let registry = registry();
    let resolution = resolve(
        &registry,
        Internal::Invoke,
        &[Type::object("Money"), Type::Int],
        &[None, None],
    )
    .unwrap();
    let value = (resolution.eval)(&[money(2.0), Value::Int(3)]).unwrap();
    assert_eq!(value, Value::Float(6.0));

    let not_callable = resolve(&registry, Internal::Invoke, &[Type::Int], &[None]);
    assert!(matches!(
        not_callable,
        Err(ResolveError::Rejected(CallRejection::UnknownMember(_)))
    ));
}
