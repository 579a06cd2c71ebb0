#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill_ir::{Type, TypeSignature, Value};
use quill_lexer::LexerConfig;

use crate::{
    BuildError, Configuration, ConstructKind, ConstructKinds, Converter, Fixity, Function,
    Operator, RegistryBuilder, TypeDescriptor, VariadicFunction,
};

fn int_add() -> Operator {
    Operator::specialized([Type::Int, Type::Int], Type::Int, |args| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
        _ => Err(quill_ir::custom("add")),
    })
}

fn negate() -> Operator {
    Operator::specialized([Type::Int], Type::Int, |args| match args {
        [Value::Int(a)] => Ok(Value::Int(-a)),
        _ => Err(quill_ir::custom("negate")),
    })
}

fn any_op() -> Operator {
    Operator::generic(|types| Ok(types[0].clone()), |args| Ok(args[0].clone()))
}

fn errors_of(builder: RegistryBuilder) -> Vec<BuildError> {
    builder.build().expect_err("build should fail").into_vec()
}

#[test]
fn test_valid_registry_builds() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_binary_operator("+", int_add())
        .add_prefix_unary_operator("-", negate())
        .add_binary_operator("-", int_add())
        .set_binary_precedence("+", 5)
        .set_binary_precedence("-", 5)
        .set_prefix_precedence("-", 2)
        .add_constant("answer", 42_i64)
        .add_function("twice", Function::new([Type::Int], Type::Int, |a| Ok(a[0].clone())));
    let registry = builder.build().unwrap();

    assert_eq!(
        registry.symbols().map(|s| s.as_str()).collect::<Vec<_>>(),
        vec!["+", "-", "answer", "twice"]
    );
    assert_eq!(
        registry.kinds("-"),
        ConstructKinds::BINARY_OPERATOR | ConstructKinds::PREFIX_OPERATOR
    );
    assert_eq!(registry.precedence("-", Fixity::Prefix), Some(2));
    assert_eq!(registry.precedence("-", Fixity::Postfix), None);
    assert_eq!(registry.kinds("missing"), ConstructKinds::empty());
}

#[test]
fn test_empty_builder_builds() {
    let registry = RegistryBuilder::new().build().unwrap();
    assert_eq!(registry.symbols().count(), 0);
}

#[test]
fn test_invalid_symbols() {
    let mut builder = RegistryBuilder::new();
    for symbol in ["", "1x", "a b", "f(", "x,y", "it's", ".x"] {
        builder.add_constant(symbol, 1_i64);
    }
    let errors = errors_of(builder);
    assert_eq!(errors.len(), 7);
    assert!(errors
        .iter()
        .all(|e| matches!(e, BuildError::InvalidSymbol { .. })));
}

#[test]
fn test_reserved_symbols() {
    let mut builder = RegistryBuilder::new();
    builder.add_constant("#new", 1_i64).add_constant("[]", 1_i64);
    let errors = errors_of(builder);
    assert_eq!(
        errors,
        vec![
            BuildError::ReservedSymbol {
                symbol: "#new".into(),
                purpose: "constructor calls",
            },
            BuildError::ReservedSymbol {
                symbol: "[]".into(),
                purpose: "indexing",
            },
        ]
    );
}

#[test]
fn test_incompatible_kinds() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_binary_operator("x", int_add())
        .set_binary_precedence("x", 1)
        .add_constant("x", 1_i64)
        .add_constant("y", 1_i64)
        .add_function("y", Function::new(TypeSignature::default(), Type::Int, |_| Ok(Value::Int(1))));
    let errors = errors_of(builder);
    assert_eq!(
        errors,
        vec![
            BuildError::IncompatibleKinds {
                symbol: "x".into(),
                first: ConstructKind::BinaryOperator,
                second: ConstructKind::Constant,
            },
            BuildError::IncompatibleKinds {
                symbol: "y".into(),
                first: ConstructKind::Constant,
                second: ConstructKind::Function,
            },
        ]
    );
}

#[test]
fn test_duplicates_in_collections() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_binary_operator("+", int_add())
        .add_binary_operator("+", int_add())
        .add_binary_operator("+", any_op())
        .add_binary_operator("+", any_op())
        .set_binary_precedence("+", 1);
    let errors = errors_of(builder);
    assert_eq!(
        errors,
        vec![
            BuildError::DuplicateSpecialized {
                symbol: "+".into(),
                fixity: Fixity::Binary,
                signature: [Type::Int, Type::Int].into(),
            },
            BuildError::DuplicateGeneric {
                symbol: "+".into(),
                fixity: Fixity::Binary,
            },
        ]
    );
}

#[test]
fn test_operator_arity_checked() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_binary_operator("+", negate())
        .set_binary_precedence("+", 1);
    assert_eq!(
        errors_of(builder),
        vec![BuildError::ArityMismatch {
            symbol: "+".into(),
            kind: ConstructKind::BinaryOperator,
            expected: 2,
            found: 1,
        }]
    );
}

#[test]
fn test_converters_share_collection_with_operators() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_prefix_unary_operator("-", negate())
        .add_prefix_type_converter("-", Converter::new(Type::Int, Type::Float, |a| Ok(a[0].clone())))
        .set_prefix_precedence("-", 2);
    let errors = errors_of(builder);
    assert!(matches!(
        errors.as_slice(),
        [BuildError::DuplicateSpecialized { fixity: Fixity::Prefix, .. }]
    ));
}

#[test]
fn test_converter_targets_must_agree() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_prefix_type_converter("num", Converter::new(Type::Str, Type::Int, |a| Ok(a[0].clone())))
        .add_prefix_type_converter("num", Converter::new(Type::Bool, Type::Float, |a| Ok(a[0].clone())))
        .set_prefix_precedence("num", 2);
    assert_eq!(
        errors_of(builder),
        vec![BuildError::ConverterTargetMismatch {
            symbol: "num".into(),
            first_fixity: Fixity::Prefix,
            first: "int".into(),
            second_fixity: Fixity::Prefix,
            second: "float".into(),
        }]
    );
}

#[test]
fn test_prefix_and_postfix_converters_share_target() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_prefix_type_converter("cv", Converter::new(Type::Str, Type::Int, |a| Ok(a[0].clone())))
        .add_postfix_type_converter("cv", Converter::new(Type::Bool, Type::Float, |a| Ok(a[0].clone())))
        .set_prefix_precedence("cv", 2)
        .set_postfix_precedence("cv", 1);
    let errors = errors_of(builder);
    assert_eq!(
        errors,
        vec![BuildError::ConverterTargetMismatch {
            symbol: "cv".into(),
            first_fixity: Fixity::Prefix,
            first: "int".into(),
            second_fixity: Fixity::Postfix,
            second: "float".into(),
        }]
    );
    assert_eq!(
        errors[0].to_string(),
        "converters for `cv` disagree on the target type: prefix gives int, postfix gives float"
    );
}

#[test]
fn test_prefix_and_postfix_converters_with_same_target_build() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_prefix_type_converter("cv", Converter::new(Type::Str, Type::Int, |a| Ok(a[0].clone())))
        .add_postfix_type_converter("cv", Converter::new(Type::Bool, Type::Int, |a| Ok(a[0].clone())))
        .set_prefix_precedence("cv", 2)
        .set_postfix_precedence("cv", 1);
    assert!(builder.build().is_ok());
}

#[test]
fn test_precedence_checks() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_binary_operator("+", int_add())
        .add_postfix_unary_operator("!", negate())
        .set_postfix_precedence("!", 1)
        .set_postfix_precedence("!", 3)
        .set_prefix_precedence("+", 2)
        .set_binary_precedence("ghost", 4);
    let errors = errors_of(builder);
    assert_eq!(
        errors,
        vec![
            BuildError::MissingPrecedence {
                symbol: "+".into(),
                fixity: Fixity::Binary,
            },
            BuildError::OrphanPrecedence {
                symbol: "+".into(),
                fixity: Fixity::Prefix,
            },
            BuildError::ConflictingPrecedence {
                symbol: "!".into(),
                fixity: Fixity::Postfix,
                first: 1,
                second: 3,
            },
            BuildError::OrphanPrecedence {
                symbol: "ghost".into(),
                fixity: Fixity::Binary,
            },
        ]
    );
}

#[test]
fn test_value_singularity() {
    let variadic = || VariadicFunction::new(|_| Err("never".into()));
    let mut builder = RegistryBuilder::new();
    builder
        .add_constant("c", 1_i64)
        .add_constant("c", 2_i64)
        .add_variadic_function("v", variadic())
        .add_variadic_function("v", variadic())
        .add_type_declaration("T", TypeDescriptor::new("T"))
        .add_type_declaration("T", TypeDescriptor::new("T"))
        .add_function("f", Function::new([Type::Int], Type::Int, |a| Ok(a[0].clone())))
        .add_function("f", Function::new([Type::Float], Type::Int, |a| Ok(a[0].clone())))
        .add_function("f", Function::new([Type::Int], Type::Str, |a| Ok(a[0].clone())));
    assert_eq!(
        errors_of(builder),
        vec![
            BuildError::DuplicateConstant { symbol: "c".into() },
            BuildError::DuplicateVariadic { symbol: "v".into() },
            BuildError::DuplicateTypeDeclaration { symbol: "T".into() },
            BuildError::DuplicateOverload {
                symbol: "f".into(),
                signature: [Type::Int].into(),
            },
        ]
    );
}

#[test]
fn test_type_names_are_unique() {
    let mut builder = RegistryBuilder::new();
    builder
        .add_type_declaration("Money", TypeDescriptor::new("Money"))
        .add_type_declaration("Cash", TypeDescriptor::new("Money"));
    assert_eq!(
        errors_of(builder),
        vec![BuildError::DuplicateTypeName {
            type_name: "Money".into(),
            first: "Money".into(),
            second: "Cash".into(),
        }]
    );
}

#[test]
fn test_configuration_errors_are_collected_with_others() {
    let mut builder = RegistryBuilder::new();
    builder
        .set_configuration(
            Configuration::default().with_lexer(LexerConfig::default().with_decimal_point('x')),
        )
        .add_constant("", 1_i64);
    let errors = errors_of(builder);
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], BuildError::InvalidConfiguration(_)));
    assert!(matches!(errors[1], BuildError::InvalidSymbol { .. }));
}

#[test]
fn test_symbol_validity_follows_string_delimiter() {
    let mut builder = RegistryBuilder::new();
    builder
        .set_configuration(
            Configuration::default()
                .with_lexer(LexerConfig::default().with_string_delimiter('"')),
        )
        .add_constant("it's", 1_i64);
    assert!(builder.build().is_ok());
}

#[test]
fn test_error_display_lists_everything() {
    let mut builder = RegistryBuilder::new();
    builder.add_constant("", 1_i64).add_constant("9", 1_i64);
    let errors = builder.build().unwrap_err();
    assert_eq!(
        errors.to_string(),
        "registry build failed with 2 errors\n  \
         - invalid symbol ``: symbol is empty\n  \
         - invalid symbol `9`: symbol starts with a digit"
    );
}
