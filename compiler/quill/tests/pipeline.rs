//! End-to-end: registry, parse, bind, compile, invoke.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill::{
    Configuration, ErrorCode, ExpressionFactory, Function, InvokeError, Operator, RegistryBuilder,
    Signature, Type, TypeDescriptor, Value,
};

fn standard() -> ExpressionFactory {
    ExpressionFactory::standard().unwrap()
}

#[test]
fn arithmetic_follows_precedence_and_associativity() {
    let f = standard();
    let eval = |s: &str| f.create(s, &Signature::inferred()).unwrap().evaluate(&[]).unwrap();
    assert_eq!(eval("2 + 3 * 4"), Value::Int(14));
    assert_eq!(eval("(2 + 3) * 4"), Value::Int(20));
    assert_eq!(eval("8 - 3 - 2"), Value::Int(3));
    assert_eq!(eval("2 * 3!"), Value::Int(12));
}

#[test]
fn try_create_returns_none_on_any_error() {
    let f = standard();
    let signature = Signature::inferred().param("x", Type::Int);

    let expression = f.try_create("x * 2 + 1", &signature).unwrap();
    assert_eq!(expression.evaluate(&[Value::Int(4)]).unwrap(), Value::Int(9));

    assert!(f.try_create("x * nope", &signature).is_none());
    assert!(f.try_create("(x + 1", &signature).is_none());
}

#[test]
fn parameters_are_supplied_in_declaration_order() {
    let f = standard();
    let signature = Signature::inferred()
        .param("price", Type::Float)
        .param("qty", Type::Int);
    let compiled = f.create("price * qty", &signature).unwrap().compile();

    assert_eq!(compiled.arguments().len(), 2);
    assert_eq!(compiled.output_type(), &Type::Float);
    assert_eq!(
        compiled.invoke(&[Value::Float(2.5), Value::Int(4)]).unwrap(),
        Value::Float(10.0)
    );
    assert_eq!(
        compiled
            .invoke_named(&[("qty", Value::Int(2)), ("price", Value::Float(1.5))])
            .unwrap(),
        Value::Float(3.0)
    );
}

#[test]
fn invoke_checks_argument_count_both_ways() {
    let f = standard();
    let signature = Signature::inferred().param("a", Type::Int).param("b", Type::Int);
    let compiled = f.create("a - b", &signature).unwrap().compile();

    assert_eq!(
        compiled.invoke(&[Value::Int(1)]),
        Err(InvokeError::ArgumentCount { expected: 2, found: 1 })
    );
    assert_eq!(
        compiled.invoke(&[Value::Int(1), Value::Int(2), Value::Int(3)]),
        Err(InvokeError::ArgumentCount { expected: 2, found: 3 })
    );
    assert!(matches!(
        compiled.invoke_named(&[("a", Value::Int(1))]),
        Err(InvokeError::MissingArgument(_))
    ));
    assert!(matches!(
        compiled.invoke_named(&[("a", Value::Int(1)), ("c", Value::Int(2))]),
        Err(InvokeError::UnknownArgument(_))
    ));
}

#[test]
fn compiled_callables_are_reusable() {
    let f = standard();
    let signature = Signature::inferred().param("n", Type::Int);
    let compiled = f.create("n * n + 1", &signature).unwrap().compile();
    for n in 0..20 {
        assert_eq!(compiled.invoke(&[Value::Int(n)]).unwrap(), Value::Int(n * n + 1));
    }
}

#[test]
fn output_type_widens_or_converts() {
    let f = standard();

    let widened = f.create("1 + 2", &Signature::returning(Type::Float)).unwrap();
    assert_eq!(widened.output_type(), &Type::Float);
    assert_eq!(widened.evaluate(&[]).unwrap(), Value::Float(3.0));

    let converted = f.create("1 + 2", &Signature::returning(Type::Str)).unwrap();
    assert_eq!(converted.evaluate(&[]).unwrap(), Value::from("3"));

    let errors = f.create("1 < 2", &Signature::returning(Type::Int)).unwrap_err();
    assert!(errors.has_code(ErrorCode::E2001), "{errors:?}");
}

#[test]
fn automatic_conversion_can_be_disabled() {
    let mut builder = RegistryBuilder::new();
    quill::stdlib::register(&mut builder);
    builder.set_configuration(Configuration::default().with_automatic_conversion(false));
    let f = ExpressionFactory::from_builder(builder).unwrap();

    let errors = f.create("1 + 2", &Signature::returning(Type::Str)).unwrap_err();
    assert_eq!(errors.codes(), vec![ErrorCode::E2001]);
    // Widening is not a conversion and still applies.
    assert!(f.create("1 + 2", &Signature::returning(Type::Float)).is_ok());
}

#[test]
fn specialized_overload_wins_over_generic() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_binary_operator(
            "+",
            Operator::generic(
                |types| match types {
                    [Type::Int, Type::Int] => Ok(Type::Int),
                    _ => Err("numbers only".to_string()),
                },
                |args| Ok(Value::Int(args[0].as_int().unwrap() + args[1].as_int().unwrap())),
            ),
        )
        .add_binary_operator(
            "+",
            Operator::specialized([Type::Bool, Type::Bool], Type::Bool, |args| {
                Ok(Value::Bool(args[0].as_bool().unwrap() || args[1].as_bool().unwrap()))
            }),
        )
        .add_constant("yes", true)
        .add_constant("no", false)
        .set_binary_precedence("+", 1);
    let f = ExpressionFactory::from_builder(builder).unwrap();
    let eval = |s: &str| f.create(s, &Signature::inferred()).unwrap().evaluate(&[]).unwrap();

    assert_eq!(eval("1 + 2"), Value::Int(3));
    assert_eq!(eval("no + yes"), Value::Bool(true));

    let errors = f.create("1 + yes", &Signature::inferred()).unwrap_err();
    assert!(errors.has_code(ErrorCode::E2003));
}

#[derive(Debug)]
struct Point {
    x: f64,
    y: f64,
}

fn point(value: &Value) -> &Point {
    value.as_object().and_then(|o| o.downcast_ref::<Point>()).unwrap()
}

fn geometry() -> ExpressionFactory {
    let descriptor = TypeDescriptor::new("Point")
        .with_member("x", Type::Float, |args| Ok(Value::Float(point(&args[0]).x)))
        .with_member("y", Type::Float, |args| Ok(Value::Float(point(&args[0]).y)))
        .with_method(
            "dist",
            Function::new([Type::object("Point")], Type::Float, |args| {
                let (a, b) = (point(&args[0]), point(&args[1]));
                Ok(Value::Float((a.x - b.x).hypot(a.y - b.y)))
            }),
        )
        .with_constructor([Type::Float, Type::Float], |args| {
            Ok(Value::object(
                "Point",
                Point {
                    x: args[0].as_float().unwrap(),
                    y: args[1].as_float().unwrap(),
                },
            ))
        });
    let mut builder = RegistryBuilder::new();
    quill::stdlib::register(&mut builder);
    builder.add_type_declaration("Point", descriptor);
    ExpressionFactory::from_builder(builder).unwrap()
}

#[test]
fn host_types_expose_members_methods_and_constructors() {
    let f = geometry();
    let eval = |s: &str| f.create(s, &Signature::inferred()).unwrap().evaluate(&[]).unwrap();

    assert_eq!(eval("Point(3, 4).x + Point(3, 4).y"), Value::Float(7.0));
    assert_eq!(eval("Point(0, 0).dist(Point(3, 4))"), Value::Float(5.0));

    let origin = Value::object("Point", Point { x: 1.0, y: 2.0 });
    let signature = Signature::inferred().param("p", Type::object("Point"));
    let expr = f.create("p.y * 10", &signature).unwrap();
    assert_eq!(expr.evaluate(&[origin]).unwrap(), Value::Float(20.0));

    let errors = f.create("Point(1, 2).z", &Signature::inferred()).unwrap_err();
    assert!(errors.has_code(ErrorCode::E2005));
}

#[test]
fn arrays_and_indexing() {
    let f = standard();
    let eval = |s: &str| f.create(s, &Signature::inferred()).unwrap().evaluate(&[]).unwrap();

    assert_eq!(eval("[10, 20, 30][1]"), Value::Int(20));
    assert_eq!(eval("[1, 2.5][0]"), Value::Float(1.0));
    assert_eq!(eval("'hello'.length"), Value::Int(5));
    assert_eq!(eval("[1, 2, 3].length"), Value::Int(3));
    assert_eq!(
        f.create("[1, 2, 3]", &Signature::inferred()).unwrap().output_type(),
        &Type::list_of(Type::Int)
    );

    let expr = f.create("[1, 2][5]", &Signature::inferred()).unwrap();
    assert!(matches!(
        expr.evaluate(&[]),
        Err(InvokeError::Evaluation(quill::EvalError::IndexOutOfBounds { .. }))
    ));
}

#[test]
fn runtime_failures_surface_as_evaluation_errors() {
    let f = standard();
    let signature = Signature::inferred().param("d", Type::Int);
    let compiled = f.create("10 mod d", &signature).unwrap().compile();
    assert_eq!(compiled.invoke(&[Value::Int(4)]).unwrap(), Value::Int(2));
    assert_eq!(
        compiled.invoke(&[Value::Int(0)]),
        Err(InvokeError::Evaluation(quill::EvalError::DivisionByZero))
    );
}

#[test]
fn tree_shows_resolved_structure() {
    let f = standard();
    let signature = Signature::inferred().param("x", Type::Int);
    let expr = f.create("-x + 2 * 2.5", &signature).unwrap();
    assert_eq!(expr.tree(), "((-$0) + (widen(2) * 2.5))");
}

#[test]
fn tree_keeps_float_literals_distinct_from_ints() {
    let f = standard();
    let tree = |s: &str| f.create(s, &Signature::inferred()).unwrap().tree();
    assert_eq!(tree("1 = 1.0"), "(1 = 1.0)");
    assert_eq!(tree("1e3 + 0.5"), "(1000.0 + 0.5)");
}
