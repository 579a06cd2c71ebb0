#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill_diagnostic::ErrorCode;
use quill_ir::{EvalError, Type, Value};
use quill_registry::Fixity;

use crate::{ExpressionFactory, InvokeError, Signature};

fn factory() -> ExpressionFactory {
    ExpressionFactory::standard().expect("standard constructs build")
}

fn eval(source: &str) -> Value {
    factory()
        .create(source, &Signature::inferred())
        .unwrap_or_else(|errors| panic!("{source}: {errors:?}"))
        .evaluate(&[])
        .unwrap_or_else(|e| panic!("{source}: {e}"))
}

fn eval_err(source: &str) -> EvalError {
    match factory().create(source, &Signature::inferred()).unwrap().evaluate(&[]) {
        Err(InvokeError::Evaluation(e)) => e,
        other => panic!("{source}: expected an evaluation error, got {other:?}"),
    }
}

fn first_code(source: &str) -> ErrorCode {
    let errors = factory()
        .create(source, &Signature::inferred())
        .expect_err(source);
    errors.first().unwrap().code
}

#[test]
fn test_precedence_table() {
    let f = factory();
    assert_eq!(f.precedence("!", Fixity::Postfix), Some(super::POSTFIX));
    assert_eq!(f.precedence("^", Fixity::Binary), Some(super::POWER));
    assert_eq!(f.precedence("-", Fixity::Prefix), Some(super::PREFIX));
    assert_eq!(f.precedence("-", Fixity::Binary), Some(super::ADDITIVE));
    assert_eq!(f.precedence("mod", Fixity::Binary), Some(super::MULTIPLICATIVE));
    assert_eq!(f.precedence("or", Fixity::Binary), Some(super::OR));
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("2 + 3 * 4"), Value::Int(14));
    assert_eq!(eval("8 - 3 - 2"), Value::Int(3));
    assert_eq!(eval("-7 mod 3"), Value::Int(2));
    assert_eq!(eval("5!"), Value::Int(120));
    assert_eq!(eval("0!"), Value::Int(1));
}

#[test]
fn test_division_and_power_are_float() {
    assert_eq!(eval("7 / 2"), Value::Float(3.5));
    assert_eq!(eval("2 ^ 10"), Value::Float(1024.0));
    assert_eq!(eval("-2 ^ 2"), Value::Float(-4.0));
}

#[test]
fn test_mixed_addition_widens() {
    assert_eq!(eval("1 + 2.5"), Value::Float(3.5));
    assert_eq!(eval("2.5 - 1"), Value::Float(1.5));
}

#[test]
fn test_percent_and_factorial_postfix() {
    assert_eq!(eval("50%"), Value::Float(0.5));
    assert_eq!(eval("200 * 50%"), Value::Float(100.0));
}

#[test]
fn test_text() {
    assert_eq!(eval("'ab' + 'cd'"), Value::from("abcd"));
    assert_eq!(eval("'n=' & 3"), Value::from("n=3"));
    assert_eq!(eval("len('héllo')"), Value::Int(5));
    assert_eq!(eval("upper('abc')"), Value::from("ABC"));
    assert_eq!(eval("text 1.5"), Value::from("1.5"));
}

#[test]
fn test_comparison_and_logic() {
    assert_eq!(eval("1 < 2 and 2 <= 2"), Value::Bool(true));
    assert_eq!(eval("'b' > 'a'"), Value::Bool(true));
    assert_eq!(eval("1 = 1.0"), Value::Bool(true));
    assert_eq!(eval("'x' <> 'x' or not false"), Value::Bool(true));
    assert_eq!(eval("3 > 2.5"), Value::Bool(true));
}

#[test]
fn test_conversions() {
    assert_eq!(eval("int 3.9"), Value::Int(3));
    assert_eq!(eval("int '42'"), Value::Int(42));
    assert_eq!(eval("int true"), Value::Int(1));
    assert_eq!(eval("float '2.5' + 1"), Value::Float(3.5));
}

#[test]
fn test_functions() {
    assert_eq!(eval("abs(-3)"), Value::Int(3));
    assert_eq!(eval("abs(-1.5)"), Value::Float(1.5));
    assert_eq!(eval("sqrt(16)"), Value::Float(4.0));
    assert_eq!(eval("max(2, 7)"), Value::Int(7));
    assert_eq!(eval("min(2, 0.5)"), Value::Float(0.5));
    assert_eq!(eval("round(2.5)"), Value::Int(3));
    assert_eq!(eval("round(3.14159, 2)"), Value::Float(3.14));
    assert_eq!(eval("floor(-1.5)"), Value::Int(-2));
    assert_eq!(eval("ceil(1.2)"), Value::Int(2));
}

#[test]
fn test_variadics() {
    assert_eq!(eval("sum()"), Value::Int(0));
    assert_eq!(eval("sum(1, 2, 3)"), Value::Int(6));
    assert_eq!(eval("sum(1, 2.5)"), Value::Float(3.5));
    assert_eq!(eval("concat('a', 1, true)"), Value::from("a1true"));
    assert_eq!(eval("iif(1 < 2, 'yes', 'no')"), Value::from("yes"));
    assert_eq!(eval("iif(false, 1, 2.5)"), Value::Float(2.5));
    assert_eq!(eval("iif(true, 1, 2.5)"), Value::Float(1.0));
}

#[test]
fn test_constants() {
    assert_eq!(eval("pi"), Value::Float(std::f64::consts::PI));
    assert_eq!(eval("true and false"), Value::Bool(false));
}

#[test]
fn test_runtime_failures() {
    assert_eq!(eval_err("1 / 0"), EvalError::DivisionByZero);
    assert_eq!(eval_err("5 mod 0"), EvalError::DivisionByZero);
    assert!(matches!(eval_err("21!"), EvalError::IntegerOverflow { .. }));
    assert!(matches!(
        eval_err("9223372036854775807 + 1"),
        EvalError::IntegerOverflow { .. }
    ));
    assert!(matches!(eval_err("sqrt(-1)"), EvalError::Custom(_)));
    assert!(matches!(eval_err("int 'abc'"), EvalError::Custom(_)));
}

#[test]
fn test_type_errors_are_reported_at_parse_time() {
    assert_eq!(first_code("1 and true"), ErrorCode::E2003);
    assert_eq!(first_code("sum('a')"), ErrorCode::E2003);
    assert_eq!(first_code("iif(1, 2, 3)"), ErrorCode::E2003);
    assert_eq!(first_code("iif(true, 2)"), ErrorCode::E2004);
    assert_eq!(first_code("1 = 'a'"), ErrorCode::E2003);
}

#[test]
fn test_result_types() {
    let f = factory();
    let ty = |source: &str| {
        f.create(source, &Signature::inferred())
            .unwrap()
            .output_type()
            .clone()
    };
    assert_eq!(ty("1 + 2"), Type::Int);
    assert_eq!(ty("1 + 2.0"), Type::Float);
    assert_eq!(ty("1 < 2"), Type::Bool);
    assert_eq!(ty("concat()"), Type::Str);
}
