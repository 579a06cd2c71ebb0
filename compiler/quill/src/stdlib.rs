//! The standard construct library.
//!
//! A ready-to-use grammar for arithmetic, comparison, logic and text.
//! Precedence levels, tightest first:
//!
//! | level | fixity  | symbols                                   |
//! |-------|---------|-------------------------------------------|
//! | 1     | postfix | `%` (percent), `!` (factorial)            |
//! | 2     | binary  | `^`                                       |
//! | 3     | prefix  | `-`, `+`, `not`, `int`, `float`, `text`   |
//! | 4     | binary  | `*`, `/`, `mod`                           |
//! | 5     | binary  | `+`, `-`, `&`                             |
//! | 6     | binary  | `<`, `<=`, `>`, `>=`                      |
//! | 7     | binary  | `=`, `<>`                                 |
//! | 8     | binary  | `and`                                     |
//! | 9     | binary  | `or`                                      |
//!
//! `/` and `^` always produce floats; integer operands widen. Integer
//! arithmetic is checked and reports overflow instead of wrapping.

use std::cmp::Ordering;

use quill_ir::{
    arity_mismatch, custom, division_by_zero, integer_overflow, type_mismatch, widen_int,
    EvalError, EvalResult, Type, Value,
};
use quill_registry::{
    CallRejection, CallSite, Converter, Function, Operator, RegistryBuilder, Resolved,
    VariadicFunction,
};

pub const POSTFIX: i32 = 1;
pub const POWER: i32 = 2;
pub const PREFIX: i32 = 3;
pub const MULTIPLICATIVE: i32 = 4;
pub const ADDITIVE: i32 = 5;
pub const RELATIONAL: i32 = 6;
pub const EQUALITY: i32 = 7;
pub const AND: i32 = 8;
pub const OR: i32 = 9;

/// Install every standard construct into `builder`.
pub fn register(builder: &mut RegistryBuilder) {
    arithmetic(builder);
    comparisons(builder);
    logic(builder);
    conversions(builder);
    constants(builder);
    functions(builder);
    variadics(builder);
}

// Operand helpers

fn ints(args: &[Value]) -> Result<(i64, i64), EvalError> {
    match args {
        [Value::Int(a), Value::Int(b)] => Ok((*a, *b)),
        [Value::Int(_), other] | [other, _] => Err(type_mismatch("int", other)),
        _ => Err(arity_mismatch("binary operator", 2, args.len())),
    }
}

fn floats(args: &[Value]) -> Result<(f64, f64), EvalError> {
    match args {
        [a, b] => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => Ok((x, y)),
            (None, _) => Err(type_mismatch("float", a)),
            (_, None) => Err(type_mismatch("float", b)),
        },
        _ => Err(arity_mismatch("binary operator", 2, args.len())),
    }
}

fn int(args: &[Value]) -> Result<i64, EvalError> {
    match args {
        [Value::Int(n)] => Ok(*n),
        [other] => Err(type_mismatch("int", other)),
        _ => Err(arity_mismatch("unary operator", 1, args.len())),
    }
}

fn float(args: &[Value]) -> Result<f64, EvalError> {
    match args {
        [value] => value.as_float().ok_or_else(|| type_mismatch("float", value)),
        _ => Err(arity_mismatch("unary operator", 1, args.len())),
    }
}

fn text(args: &[Value]) -> Result<&str, EvalError> {
    match args {
        [value] => value.as_str().ok_or_else(|| type_mismatch("str", value)),
        _ => Err(arity_mismatch("unary operator", 1, args.len())),
    }
}

fn checked(operation: &str, result: Option<i64>) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(operation))
}

fn int_binary(operation: &'static str, f: fn(i64, i64) -> Option<i64>) -> Operator {
    Operator::specialized([Type::Int, Type::Int], Type::Int, move |args| {
        let (a, b) = ints(args)?;
        checked(operation, f(a, b))
    })
}

fn float_binary(f: fn(f64, f64) -> f64) -> Operator {
    Operator::specialized([Type::Float, Type::Float], Type::Float, move |args| {
        let (a, b) = floats(args)?;
        Ok(Value::Float(f(a, b)))
    })
}

/// Truncate toward zero, failing outside the `int` range.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the range is checked before the cast"
)]
fn float_to_int(x: f64) -> EvalResult {
    let (min, max) = (widen_int(i64::MIN), widen_int(i64::MAX));
    let t = x.trunc();
    if !t.is_finite() || t < min || t >= max {
        return Err(custom(format!("{x} does not fit in an int")));
    }
    Ok(Value::Int(t as i64))
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// Operators

fn arithmetic(b: &mut RegistryBuilder) {
    b.add_binary_operator(
        "+",
        Operator::generic(numeric_rule("+"), |args| match args {
            [Value::Int(x), Value::Int(y)] => checked("addition", x.checked_add(*y)),
            _ => floats(args).map(|(x, y)| Value::Float(x + y)),
        }),
    )
    .add_binary_operator(
        "+",
        Operator::specialized([Type::Str, Type::Str], Type::Str, |args| match args {
            [Value::Str(x), Value::Str(y)] => Ok(Value::string(format!("{x}{y}"))),
            _ => Err(custom("string concatenation needs two strings")),
        }),
    )
    .add_binary_operator("-", int_binary("subtraction", i64::checked_sub))
    .add_binary_operator("-", float_binary(|x, y| x - y))
    .add_binary_operator("*", int_binary("multiplication", i64::checked_mul))
    .add_binary_operator("*", float_binary(|x, y| x * y))
    .add_binary_operator(
        "/",
        Operator::specialized([Type::Float, Type::Float], Type::Float, |args| {
            let (x, y) = floats(args)?;
            if y == 0.0 {
                return Err(division_by_zero());
            }
            Ok(Value::Float(x / y))
        }),
    )
    .add_binary_operator(
        "mod",
        Operator::specialized([Type::Int, Type::Int], Type::Int, |args| {
            let (x, y) = ints(args)?;
            if y == 0 {
                return Err(division_by_zero());
            }
            checked("modulo", x.checked_rem_euclid(y))
        }),
    )
    .add_binary_operator(
        "mod",
        Operator::specialized([Type::Float, Type::Float], Type::Float, |args| {
            let (x, y) = floats(args)?;
            if y == 0.0 {
                return Err(division_by_zero());
            }
            Ok(Value::Float(x.rem_euclid(y)))
        }),
    )
    .add_binary_operator("^", float_binary(f64::powf))
    .add_binary_operator(
        "&",
        Operator::generic(
            |types| match types {
                [_, _] => Ok(Type::Str),
                _ => Err("`&` joins two values".to_string()),
            },
            |args| Ok(Value::string(args.iter().map(ToString::to_string).collect::<String>())),
        ),
    )
    .add_prefix_unary_operator(
        "-",
        Operator::specialized([Type::Int], Type::Int, |args| {
            checked("negation", int(args)?.checked_neg())
        }),
    )
    .add_prefix_unary_operator(
        "-",
        Operator::specialized([Type::Float], Type::Float, |args| Ok(Value::Float(-float(args)?))),
    )
    .add_prefix_unary_operator(
        "+",
        Operator::specialized([Type::Int], Type::Int, |args| Ok(Value::Int(int(args)?))),
    )
    .add_prefix_unary_operator(
        "+",
        Operator::specialized([Type::Float], Type::Float, |args| Ok(Value::Float(float(args)?))),
    )
    .add_postfix_unary_operator(
        "!",
        Operator::specialized([Type::Int], Type::Int, |args| factorial(int(args)?)),
    )
    .add_postfix_type_converter(
        "%",
        Converter::new(Type::Int, Type::Float, |args| Ok(Value::Float(float(args)? / 100.0))),
    )
    .add_postfix_type_converter(
        "%",
        Converter::new(Type::Float, Type::Float, |args| Ok(Value::Float(float(args)? / 100.0))),
    );

    b.set_postfix_precedence("!", POSTFIX)
        .set_postfix_precedence("%", POSTFIX)
        .set_binary_precedence("^", POWER)
        .set_prefix_precedence("-", PREFIX)
        .set_prefix_precedence("+", PREFIX)
        .set_binary_precedence("*", MULTIPLICATIVE)
        .set_binary_precedence("/", MULTIPLICATIVE)
        .set_binary_precedence("mod", MULTIPLICATIVE)
        .set_binary_precedence("+", ADDITIVE)
        .set_binary_precedence("-", ADDITIVE)
        .set_binary_precedence("&", ADDITIVE);
}

/// Accepts two numbers: `int` when both are, `float` otherwise.
fn numeric_rule(symbol: &'static str) -> impl Fn(&[Type]) -> Result<Type, String> + Send + Sync {
    move |types| match types {
        [Type::Int, Type::Int] => Ok(Type::Int),
        [x, y] if x.is_numeric() && y.is_numeric() => Ok(Type::Float),
        [x, y] => Err(format!("`{symbol}` needs numbers, found `{x}` and `{y}`")),
        _ => Err(format!("`{symbol}` takes two operands")),
    }
}

fn factorial(n: i64) -> EvalResult {
    if n < 0 {
        return Err(custom("factorial of a negative number"));
    }
    checked("factorial", (2..=n).try_fold(1_i64, i64::checked_mul))
}

fn comparisons(b: &mut RegistryBuilder) {
    comparison(b, "<", Ordering::is_lt);
    comparison(b, "<=", Ordering::is_le);
    comparison(b, ">", Ordering::is_gt);
    comparison(b, ">=", Ordering::is_ge);
    equality(b, "=", true);
    equality(b, "<>", false);
}

fn comparison(b: &mut RegistryBuilder, symbol: &str, accept: fn(Ordering) -> bool) {
    b.add_binary_operator(
        symbol,
        Operator::specialized([Type::Int, Type::Int], Type::Bool, move |args| {
            let (x, y) = ints(args)?;
            Ok(Value::Bool(accept(x.cmp(&y))))
        }),
    )
    .add_binary_operator(
        symbol,
        Operator::specialized([Type::Float, Type::Float], Type::Bool, move |args| {
            let (x, y) = floats(args)?;
            Ok(Value::Bool(x.partial_cmp(&y).is_some_and(accept)))
        }),
    )
    .add_binary_operator(
        symbol,
        Operator::specialized([Type::Str, Type::Str], Type::Bool, move |args| match args {
            [Value::Str(x), Value::Str(y)] => Ok(Value::Bool(accept(x.cmp(y)))),
            _ => Err(custom("string comparison needs two strings")),
        }),
    )
    .set_binary_precedence(symbol, RELATIONAL);
}

/// `=` and `<>`: any two values of the same type, or two numbers.
fn equality(b: &mut RegistryBuilder, symbol: &'static str, equal: bool) {
    b.add_binary_operator(
        symbol,
        Operator::generic(
            move |types| match types {
                [x, y] if x == y || (x.is_numeric() && y.is_numeric()) => Ok(Type::Bool),
                [x, y] => Err(format!("cannot compare `{x}` with `{y}`")),
                _ => Err(format!("`{symbol}` takes two operands")),
            },
            move |args| match args {
                [x, y] => Ok(Value::Bool(values_equal(x, y) == equal)),
                _ => Err(arity_mismatch(symbol, 2, args.len())),
            },
        ),
    )
    .set_binary_precedence(symbol, EQUALITY);
}

fn values_equal(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => widen_int(*a) == *b,
        _ => x == y,
    }
}

fn logic(b: &mut RegistryBuilder) {
    let bools = |args: &[Value]| match args {
        [Value::Bool(x), Value::Bool(y)] => Ok((*x, *y)),
        [Value::Bool(_), other] | [other, _] => Err(type_mismatch("bool", other)),
        _ => Err(arity_mismatch("logical operator", 2, args.len())),
    };
    b.add_binary_operator(
        "and",
        Operator::specialized([Type::Bool, Type::Bool], Type::Bool, move |args| {
            bools(args).map(|(x, y)| Value::Bool(x && y))
        }),
    )
    .add_binary_operator(
        "or",
        Operator::specialized([Type::Bool, Type::Bool], Type::Bool, move |args| {
            bools(args).map(|(x, y)| Value::Bool(x || y))
        }),
    )
    .add_prefix_unary_operator(
        "not",
        Operator::specialized([Type::Bool], Type::Bool, |args| match args {
            [Value::Bool(x)] => Ok(Value::Bool(!x)),
            [other] => Err(type_mismatch("bool", other)),
            _ => Err(arity_mismatch("not", 1, args.len())),
        }),
    );
    b.set_binary_precedence("and", AND)
        .set_binary_precedence("or", OR)
        .set_prefix_precedence("not", PREFIX);
}

fn conversions(b: &mut RegistryBuilder) {
    b.add_prefix_type_converter(
        "int",
        Converter::new(Type::Float, Type::Int, |args| float_to_int(float(args)?)),
    )
    .add_prefix_type_converter(
        "int",
        Converter::new(Type::Str, Type::Int, |args| {
            let s = text(args)?;
            s.trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| custom(format!("`{s}` is not an integer")))
        }),
    )
    .add_prefix_type_converter(
        "int",
        Converter::new(Type::Bool, Type::Int, |args| match args {
            [Value::Bool(x)] => Ok(Value::Int(i64::from(*x))),
            _ => Err(custom("expected a bool")),
        }),
    )
    .add_prefix_type_converter(
        "float",
        Converter::new(Type::Int, Type::Float, |args| Ok(Value::Float(float(args)?))),
    )
    .add_prefix_type_converter(
        "float",
        Converter::new(Type::Str, Type::Float, |args| {
            let s = text(args)?;
            s.trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| custom(format!("`{s}` is not a number")))
        }),
    )
    .add_prefix_type_converter(
        "text",
        Converter::generic(Type::Str, |args| match args {
            [value] => Ok(Value::string(value.to_string())),
            _ => Err(arity_mismatch("text", 1, args.len())),
        }),
    );
    b.set_prefix_precedence("int", PREFIX)
        .set_prefix_precedence("float", PREFIX)
        .set_prefix_precedence("text", PREFIX);
}

fn constants(b: &mut RegistryBuilder) {
    b.add_constant("true", true)
        .add_constant("false", false)
        .add_constant("pi", std::f64::consts::PI)
        .add_constant("e", std::f64::consts::E);
}

fn functions(b: &mut RegistryBuilder) {
    let float_fn = |f: fn(f64) -> f64| {
        Function::new([Type::Float], Type::Float, move |args| Ok(Value::Float(f(float(args)?))))
    };
    let rounding = |f: fn(f64) -> f64| {
        Function::new([Type::Float], Type::Int, move |args| float_to_int(f(float(args)?)))
    };

    b.add_function(
        "abs",
        Function::new([Type::Int], Type::Int, |args| {
            checked("absolute value", int(args)?.checked_abs())
        }),
    )
    .add_function("abs", float_fn(f64::abs))
    .add_function(
        "sqrt",
        Function::new([Type::Float], Type::Float, |args| {
            let x = float(args)?;
            if x < 0.0 {
                return Err(custom("square root of a negative number"));
            }
            Ok(Value::Float(x.sqrt()))
        }),
    )
    .add_function("min", int_binary_fn(std::cmp::min))
    .add_function("min", Function::new([Type::Float, Type::Float], Type::Float, |args| {
        floats(args).map(|(x, y)| Value::Float(x.min(y)))
    }))
    .add_function("max", int_binary_fn(std::cmp::max))
    .add_function("max", Function::new([Type::Float, Type::Float], Type::Float, |args| {
        floats(args).map(|(x, y)| Value::Float(x.max(y)))
    }))
    .add_function("round", rounding(f64::round))
    .add_function(
        "round",
        Function::new([Type::Float, Type::Int], Type::Float, |args| match args {
            [x, Value::Int(digits)] => {
                let x = x.as_float().ok_or_else(|| type_mismatch("float", x))?;
                let digits = i32::try_from(*digits)
                    .map_err(|_| custom(format!("cannot round to {digits} digits")))?;
                let scale = 10_f64.powi(digits);
                Ok(Value::Float((x * scale).round() / scale))
            }
            _ => Err(arity_mismatch("round", 2, args.len())),
        }),
    )
    .add_function("floor", rounding(f64::floor))
    .add_function("ceil", rounding(f64::ceil))
    .add_function(
        "len",
        Function::new([Type::Str], Type::Int, |args| {
            Ok(Value::Int(count(text(args)?.chars().count())))
        }),
    )
    .add_function(
        "upper",
        Function::new([Type::Str], Type::Str, |args| Ok(Value::string(text(args)?.to_uppercase()))),
    )
    .add_function(
        "lower",
        Function::new([Type::Str], Type::Str, |args| Ok(Value::string(text(args)?.to_lowercase()))),
    );
}

fn int_binary_fn(f: fn(i64, i64) -> i64) -> Function {
    Function::new([Type::Int, Type::Int], Type::Int, move |args| {
        ints(args).map(|(x, y)| Value::Int(f(x, y)))
    })
}

fn variadics(b: &mut RegistryBuilder) {
    b.add_variadic_function("sum", VariadicFunction::new(resolve_sum))
        .add_variadic_function(
            "concat",
            VariadicFunction::new(|_| {
                Ok(Resolved::new(Type::Str, |args| {
                    Ok(Value::string(args.iter().map(ToString::to_string).collect::<String>()))
                }))
            }),
        )
        .add_variadic_function("iif", VariadicFunction::new(resolve_iif));
}

fn resolve_sum(site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    if let Some(bad) = site.types.iter().find(|ty| !ty.is_numeric()) {
        return Err(format!("`sum` adds numbers, found `{bad}`").into());
    }
    if site.types.contains(&Type::Float) {
        Ok(Resolved::new(Type::Float, |args| {
            let mut total = 0.0;
            for value in args {
                total += value.as_float().ok_or_else(|| type_mismatch("float", value))?;
            }
            Ok(Value::Float(total))
        }))
    } else {
        Ok(Resolved::new(Type::Int, |args| {
            let mut total = 0_i64;
            for value in args {
                let n = value.as_int().ok_or_else(|| type_mismatch("int", value))?;
                total = total.checked_add(n).ok_or_else(|| integer_overflow("sum"))?;
            }
            Ok(Value::Int(total))
        }))
    }
}

/// `iif(condition, then, else)`. Both branches are evaluated.
fn resolve_iif(site: &CallSite<'_>) -> Result<Resolved, CallRejection> {
    let [condition, then, otherwise] = site.types else {
        return Err(CallRejection::Arity(format!(
            "`iif` takes 3 arguments (condition, then, else), found {}",
            site.len()
        )));
    };
    if *condition != Type::Bool {
        return Err(format!("`iif` condition must be `bool`, found `{condition}`").into());
    }
    let result = if then == otherwise {
        then.clone()
    } else if then.is_numeric() && otherwise.is_numeric() {
        Type::Float
    } else {
        return Err(format!("`iif` branches have different types `{then}` and `{otherwise}`").into());
    };
    let target = result.clone();
    Ok(Resolved::new(result, move |args| match args {
        [Value::Bool(c), then, otherwise] => {
            let chosen = if *c { then } else { otherwise };
            chosen
                .coerce_to(&target)
                .ok_or_else(|| type_mismatch(&target.to_string(), chosen))
        }
        [other, _, _] => Err(type_mismatch("bool", other)),
        _ => Err(arity_mismatch("iif", 3, args.len())),
    }))
}

#[cfg(test)]
mod tests;
