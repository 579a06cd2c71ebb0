//! Partial binding: partitions, renumbering and atomicity.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quill::{ArgumentKey, BindError, Expression, ExpressionFactory, Name, Signature, Type, Value};

const SOURCE: &str = "a * 1000 + b * 100 - c * 10 + d";
const NAMES: [&str; 4] = ["a", "b", "c", "d"];

fn expression() -> Expression {
    let signature = NAMES
        .iter()
        .fold(Signature::inferred(), |s, name| s.param(*name, Type::Int));
    ExpressionFactory::standard()
        .unwrap()
        .create(SOURCE, &signature)
        .unwrap()
}

fn unbound_names(expr: &Expression) -> Vec<&str> {
    expr.unbound().iter().map(|p| p.name.as_str()).collect()
}

fn reference(values: [i64; 4]) -> i64 {
    values[0] * 1000 + values[1] * 100 - values[2] * 10 + values[3]
}

#[test]
fn binding_by_name_renumbers_the_rest() {
    let expr = expression();
    let bound = expr.bind_arguments([("b", 2), ("d", 4)]).unwrap();

    assert_eq!(unbound_names(&bound), vec!["a", "c"]);
    assert_eq!(bound.unbound_index("c"), Some(1));
    assert_eq!(bound.bound_value("d"), Some(&Value::Int(4)));
    assert_eq!(
        bound.bound().iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        vec!["b", "d"]
    );
    assert_eq!(
        bound.evaluate(&[Value::Int(1), Value::Int(3)]).unwrap(),
        Value::Int(reference([1, 2, 3, 4]))
    );
    // The original is untouched.
    assert_eq!(unbound_names(&expr), NAMES.to_vec());
}

#[test]
fn binding_by_index_uses_current_numbering() {
    let expr = expression();
    let once = expr.bind_arguments([(0_usize, 9)]).unwrap();
    assert_eq!(unbound_names(&once), vec!["b", "c", "d"]);

    // Index 0 now refers to `b`.
    let twice = once.bind_arguments([(0_usize, 8)]).unwrap();
    assert_eq!(unbound_names(&twice), vec!["c", "d"]);
    assert_eq!(twice.bound_value("b"), Some(&Value::Int(8)));
}

#[test]
fn binding_all_arguments_leaves_a_constant() {
    let expr = expression();
    let bound = expr
        .bind_arguments(NAMES.iter().zip([1, 2, 3, 4]).map(|(n, v)| (*n, v)))
        .unwrap();
    assert!(bound.unbound().is_empty());
    assert_eq!(bound.compile().argument_count(), 0);
    assert_eq!(bound.evaluate(&[]).unwrap(), Value::Int(reference([1, 2, 3, 4])));
}

#[test]
fn empty_binding_is_identity() {
    let expr = expression();
    let same = expr
        .bind_arguments(Vec::<(ArgumentKey, Value)>::new())
        .unwrap();
    assert_eq!(same.tree(), expr.tree());
    assert_eq!(unbound_names(&same), NAMES.to_vec());
}

#[test]
fn failed_binding_changes_nothing() {
    let expr = expression();

    assert_eq!(
        expr.bind_arguments([("a", 1), ("zz", 2)]).unwrap_err(),
        BindError::UnknownArgument(Name::new("zz"))
    );
    assert_eq!(
        expr.bind_arguments([(7_usize, 1)]).unwrap_err(),
        BindError::IndexOutOfRange { index: 7, count: 4 }
    );
    assert_eq!(
        expr.bind_arguments([(ArgumentKey::from("a"), 1), (ArgumentKey::from(0_usize), 2)])
            .unwrap_err(),
        BindError::DuplicateBinding(Name::new("a"))
    );
    assert_eq!(
        expr.bind_arguments([("c", Value::from("x"))]).unwrap_err(),
        BindError::TypeMismatch {
            name: Name::new("c"),
            expected: Type::Int,
            found: Type::Str,
        }
    );
    assert_eq!(unbound_names(&expr), NAMES.to_vec());
    assert!(expr.bound().is_empty());
}

#[test]
fn int_binds_to_float_parameter() {
    let f = ExpressionFactory::standard().unwrap();
    let signature = Signature::inferred().param("rate", Type::Float);
    let expr = f.create("rate * 2", &signature).unwrap();
    let bound = expr.bind_arguments([("rate", 3)]).unwrap();
    assert_eq!(bound.bound_value("rate"), Some(&Value::Float(3.0)));
    assert_eq!(bound.evaluate(&[]).unwrap(), Value::Float(6.0));
}

#[test]
fn unread_parameters_are_discarded() {
    let f = ExpressionFactory::standard().unwrap();
    let signature = Signature::inferred()
        .param("x", Type::Int)
        .param("unused", Type::Str)
        .param("y", Type::Int);
    let expr = f.create("y - x", &signature).unwrap();

    assert_eq!(unbound_names(&expr), vec!["x", "y"]);
    assert_eq!(expr.discarded().len(), 1);
    assert_eq!(expr.discarded()[0].name, "unused");
    assert_eq!(
        expr.evaluate(&[Value::Int(1), Value::Int(5)]).unwrap(),
        Value::Int(4)
    );
    assert!(matches!(
        expr.bind_arguments([("unused", "x")]),
        Err(BindError::UnknownArgument(_))
    ));
}

fn split(values: [i64; 4], mask: u8) -> (Vec<(&'static str, i64)>, Vec<Value>) {
    let mut bound = Vec::new();
    let mut rest = Vec::new();
    for (i, (name, value)) in NAMES.iter().zip(values).enumerate() {
        if mask & (1 << i) == 0 {
            rest.push(Value::Int(value));
        } else {
            bound.push((*name, value));
        }
    }
    (bound, rest)
}

proptest! {
    #[test]
    fn partial_binding_preserves_the_result(
        values in prop::array::uniform4(-1000_i64..1000),
        mask in 0_u8..16,
    ) {
        let expr = expression();
        let (bound, rest) = split(values, mask);
        let count = bound.len();
        let partial = expr.bind_arguments(bound).unwrap();

        prop_assert_eq!(partial.unbound().len(), 4 - count);
        prop_assert_eq!(partial.bound().len(), count);
        prop_assert_eq!(partial.evaluate(&rest).unwrap(), Value::Int(reference(values)));
    }

    #[test]
    fn disjoint_binds_compose(
        values in prop::array::uniform4(-1000_i64..1000),
        first in 0_u8..16,
        second in 0_u8..16,
    ) {
        let second = second & !first;
        let expr = expression();

        let (a, _) = split(values, first);
        let (b, _) = split(values, second);
        let stepwise = expr
            .bind_arguments(a)
            .unwrap()
            .bind_arguments(b)
            .unwrap();

        let (together, rest) = split(values, first | second);
        let at_once = expr.bind_arguments(together).unwrap();

        prop_assert_eq!(stepwise.tree(), at_once.tree());
        prop_assert_eq!(
            stepwise.evaluate(&rest).unwrap(),
            at_once.evaluate(&rest).unwrap()
        );
    }
}
