//! Lexical errors.

use quill_diagnostic::{Diagnostic, ErrorCode};
use quill_ir::Span;

/// Why a number literal was rejected.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MalformedNumber {
    /// Exponent marker and sign with no digits (`1e+`).
    MissingExponentDigits,
    /// Letters or digits glued to the literal (`12px`).
    InvalidSuffix,
    /// Does not fit in a 64-bit signed integer.
    IntegerOverflow,
    /// Parses to an infinite float.
    FloatOutOfRange,
}

impl MalformedNumber {
    fn message(self) -> &'static str {
        match self {
            MalformedNumber::MissingExponentDigits => "exponent has no digits",
            MalformedNumber::InvalidSuffix => "invalid suffix on number literal",
            MalformedNumber::IntegerOverflow => "integer literal is too large",
            MalformedNumber::FloatOutOfRange => "float literal is out of range",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum LexErrorKind {
    UnterminatedString { delimiter: char },
    InvalidCharacter(char),
    MalformedNumber(MalformedNumber),
}

/// A lexical error with its location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { kind, span }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self.kind {
            LexErrorKind::UnterminatedString { delimiter } => {
                Diagnostic::error(ErrorCode::E0001)
                    .with_message("unterminated string literal")
                    .with_label(self.span, "string starts here")
                    .with_suggestion(format!("close the string with `{delimiter}`"))
            }
            LexErrorKind::InvalidCharacter(c) => Diagnostic::error(ErrorCode::E0002)
                .with_message(format!("invalid character `{}`", c.escape_debug()))
                .with_label(self.span, "not allowed in expressions"),
            LexErrorKind::MalformedNumber(reason) => Diagnostic::error(ErrorCode::E0003)
                .with_message(format!("malformed number: {}", reason.message()))
                .with_label(self.span, reason.message()),
        }
    }
}
