#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

const SYMBOLS: [&str; 8] = ["+", "-", "*", "<=", "<", "<>", "and", "%"];

fn kinds_with(source: &str, config: &LexerConfig) -> (Vec<TokenKind>, Vec<LexErrorKind>) {
    let (tokens, errors) = tokenize(source, config, &SYMBOLS);
    (
        tokens.into_iter().map(|t| t.kind).collect(),
        errors.into_iter().map(|e| e.kind).collect(),
    )
}

fn kinds(source: &str) -> Vec<TokenKind> {
    let (kinds, errors) = kinds_with(source, &LexerConfig::default());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    kinds
}

fn texts(source: &str) -> Vec<&str> {
    let (tokens, _) = tokenize(source, &LexerConfig::default(), &SYMBOLS);
    tokens.iter().map(|t| t.text(source)).collect()
}

#[test]
fn test_simple_arithmetic() {
    assert_eq!(
        kinds("2 + 3 * foo"),
        vec![
            TokenKind::Int(2),
            TokenKind::Symbol,
            TokenKind::Int(3),
            TokenKind::Symbol,
            TokenKind::Symbol,
        ]
    );
    assert_eq!(texts("2 + 3 * foo"), vec!["2", "+", "3", "*", "foo"]);
}

#[test]
fn test_sign_is_not_part_of_number() {
    assert_eq!(texts("-5"), vec!["-", "5"]);
    assert_eq!(texts("2*-3"), vec!["2", "*", "-", "3"]);
}

#[test]
fn test_longest_registered_operator_wins() {
    assert_eq!(texts("a<=b"), vec!["a", "<=", "b"]);
    assert_eq!(texts("a<>b"), vec!["a", "<>", "b"]);
    assert_eq!(texts("a<b"), vec!["a", "<", "b"]);
}

#[test]
fn test_unregistered_operator_run_is_one_symbol() {
    assert_eq!(texts("a @@ b"), vec!["a", "@@", "b"]);
}

#[test]
fn test_identifier_runs_are_not_split_by_symbols() {
    assert_eq!(texts("android and x"), vec!["android", "and", "x"]);
}

#[test]
fn test_punctuation_is_single_character() {
    assert_eq!(
        kinds("f((x),[y])"),
        vec![
            TokenKind::Symbol,
            TokenKind::LParen,
            TokenKind::LParen,
            TokenKind::Symbol,
            TokenKind::RParen,
            TokenKind::Comma,
            TokenKind::LBracket,
            TokenKind::Symbol,
            TokenKind::RBracket,
            TokenKind::RParen,
        ]
    );
}

#[test]
fn test_member_dot() {
    assert_eq!(
        kinds("name.length"),
        vec![TokenKind::Symbol, TokenKind::Dot, TokenKind::Symbol]
    );
    assert_eq!(
        kinds("3.length"),
        vec![TokenKind::Int(3), TokenKind::Dot, TokenKind::Symbol]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(kinds("42"), vec![TokenKind::Int(42)]);
    assert_eq!(kinds("1_000_000"), vec![TokenKind::Int(1_000_000)]);
    assert_eq!(kinds("2.5"), vec![TokenKind::Float(2.5)]);
    assert_eq!(kinds("1_000.25"), vec![TokenKind::Float(1000.25)]);
    assert_eq!(kinds("1e3"), vec![TokenKind::Float(1000.0)]);
    assert_eq!(kinds("2.5E-1"), vec![TokenKind::Float(0.25)]);
    assert_eq!(kinds("7e+2"), vec![TokenKind::Float(700.0)]);
}

#[test]
fn test_separator_only_between_digits() {
    // A trailing separator is not part of the number; `_` then lexes as an
    // identifier glued to it, which is a malformed suffix.
    let (kinds, errors) = kinds_with("1_", &LexerConfig::default());
    assert_eq!(kinds, vec![TokenKind::Error]);
    assert_eq!(
        errors,
        vec![LexErrorKind::MalformedNumber(MalformedNumber::InvalidSuffix)]
    );
}

#[test]
fn test_custom_decimal_point_and_separator() {
    let config = LexerConfig::default()
        .with_decimal_point(';')
        .with_digit_separator(Some('\''))
        .with_string_delimiter('"');
    let (kinds, errors) = kinds_with("1'234;5", &config);
    assert!(errors.is_empty());
    assert_eq!(kinds, vec![TokenKind::Float(1234.5)]);
}

#[test]
fn test_non_integer_numbers_disabled_fall_back_to_symbol() {
    let config = LexerConfig::default().with_non_integer_numbers(false);
    let (tokens, errors) = tokenize("1.5 + 2", &config, &SYMBOLS);
    assert!(errors.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::Symbol);
    assert_eq!(tokens[0].text("1.5 + 2"), "1.5");
    assert_eq!(tokens[2].kind, TokenKind::Int(2));
}

#[test]
fn test_non_integer_numbers_disabled_rejects_exponents() {
    let config = LexerConfig::default().with_non_integer_numbers(false);
    for source in ["1e-2", "1e3", "7E+2"] {
        let (tokens, errors) = tokenize(source, &config, &SYMBOLS);
        assert!(errors.is_empty(), "{source}: {errors:?}");
        assert_eq!(tokens.len(), 1, "{source}");
        assert_eq!(tokens[0].kind, TokenKind::Symbol, "{source}");
        assert_eq!(tokens[0].text(source), source);
    }
}

#[test]
fn test_scientific_notation_disabled() {
    let config = LexerConfig::default().with_scientific_notation(false);
    let (kinds, errors) = kinds_with("1e3", &config);
    assert_eq!(kinds, vec![TokenKind::Error]);
    assert_eq!(
        errors,
        vec![LexErrorKind::MalformedNumber(MalformedNumber::InvalidSuffix)]
    );
}

#[test]
fn test_malformed_numbers() {
    let config = LexerConfig::default();
    let (_, errors) = kinds_with("1e+", &config);
    assert_eq!(
        errors,
        vec![LexErrorKind::MalformedNumber(MalformedNumber::MissingExponentDigits)]
    );

    let (_, errors) = kinds_with("99999999999999999999", &config);
    assert_eq!(
        errors,
        vec![LexErrorKind::MalformedNumber(MalformedNumber::IntegerOverflow)]
    );

    let (_, errors) = kinds_with("1e999", &config);
    assert_eq!(
        errors,
        vec![LexErrorKind::MalformedNumber(MalformedNumber::FloatOutOfRange)]
    );
}

#[test]
fn test_strings() {
    assert_eq!(kinds("'abc'"), vec![TokenKind::Str("abc".into())]);
    assert_eq!(kinds("''"), vec![TokenKind::Str("".into())]);
    assert_eq!(kinds("'it''s'"), vec![TokenKind::Str("it's".into())]);
    assert_eq!(
        kinds("'a' + 'b'"),
        vec![
            TokenKind::Str("a".into()),
            TokenKind::Symbol,
            TokenKind::Str("b".into()),
        ]
    );
}

#[test]
fn test_multibyte_string_delimiter() {
    let config = LexerConfig::default().with_string_delimiter('§');
    let (kinds, errors) = kinds_with("§x§§y§", &config);
    assert!(errors.is_empty());
    assert_eq!(kinds, vec![TokenKind::Str("x§y".into())]);
}

#[test]
fn test_unterminated_string() {
    let source = "1 + 'abc";
    let config = LexerConfig::default();
    let mut lexer = Lexer::new(source, &config, &SYMBOLS);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    let errors = lexer.take_errors();

    assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Error));
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        LexErrorKind::UnterminatedString { delimiter: '\'' }
    );
    assert_eq!(errors[0].span, Span::new(4, 5));
    assert_eq!(
        errors[0].to_diagnostic().code,
        quill_diagnostic::ErrorCode::E0001
    );
}

#[test]
fn test_invalid_control_character() {
    let (kinds, errors) = kinds_with("1 \u{7} 2", &LexerConfig::default());
    assert_eq!(kinds, vec![TokenKind::Int(1), TokenKind::Error, TokenKind::Int(2)]);
    assert_eq!(errors, vec![LexErrorKind::InvalidCharacter('\u{7}')]);
}

#[test]
fn test_eof_is_sticky() {
    let config = LexerConfig::default();
    let mut lexer = Lexer::new("  ", &config, &NoSymbols);
    assert!(lexer.next_token().is_eof());
    assert!(lexer.next_token().is_eof());
    assert_eq!(lexer.position(), 2);
}

#[test]
fn test_spans() {
    let (tokens, _) = tokenize("  ab +  12", &LexerConfig::default(), &SYMBOLS);
    let spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();
    assert_eq!(spans, vec![Span::new(2, 4), Span::new(5, 6), Span::new(8, 10)]);
}

proptest! {
    #[test]
    fn grouped_integers_lex_to_their_value(n in 0_i64..=i64::MAX) {
        let plain = n.to_string();
        let mut grouped = String::new();
        for (i, c) in plain.chars().enumerate() {
            if i > 0 && (plain.len() - i) % 3 == 0 {
                grouped.push('_');
            }
            grouped.push(c);
        }
        let (kinds, errors) = kinds_with(&grouped, &LexerConfig::default());
        prop_assert!(errors.is_empty());
        prop_assert_eq!(kinds, vec![TokenKind::Int(n)]);
    }

    #[test]
    fn lexer_never_panics_and_always_progresses(source in "\\PC{0,40}") {
        let config = LexerConfig::default();
        let mut lexer = Lexer::new(&source, &config, &SYMBOLS);
        let mut last = 0;
        loop {
            let token = lexer.next_token();
            if token.is_eof() {
                break;
            }
            prop_assert!(lexer.position() > last);
            last = lexer.position();
        }
    }
}
