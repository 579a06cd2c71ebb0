//! Token types.

use std::fmt;
use std::sync::Arc;

use quill_ir::Span;

/// Token classification.
///
/// Symbols carry no text: the parser slices it from the source by span.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    /// String literal with doubled delimiters already collapsed.
    Str(Arc<str>),
    /// Identifier, operator or any other run resolved against the registry.
    Symbol,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// `.` directly before a member name.
    Dot,
    /// Text that failed to lex; an error has already been recorded.
    Error,
    Eof,
}

impl TokenKind {
    /// Whether this token can begin an operand.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::Symbol
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Error
        )
    }

    /// Short description for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Int(_) | TokenKind::Float(_) => "number",
            TokenKind::Str(_) => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Error => "invalid input",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A token with its location.
#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Source text covered by this token.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.to_range()).unwrap_or("")
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:?}", self.kind.describe(), self.span)
    }
}
