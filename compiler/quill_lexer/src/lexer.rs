//! The tokenizer.
//!
//! A single forward cursor over the formula text. Each call to
//! [`Lexer::next_token`] skips whitespace and scans exactly one token; the
//! lexer never backtracks past a token it has returned.
//!
//! Symbols are split with help from the registry: at an operator character
//! the longest registered symbol wins (so `2*-3` splits as `*`, `-`), while
//! identifier runs are only extended, never shortened, by a registered
//! match (so `android` is not `and` + `roid`).

use std::sync::Arc;

use quill_ir::Span;
use tracing::trace;

use crate::config::PUNCTUATION;
use crate::error::{LexError, LexErrorKind, MalformedNumber};
use crate::{LexerConfig, Token, TokenKind};

/// Set of registered symbol texts, queried while splitting symbol runs.
pub trait SymbolSet {
    /// Byte length of the longest registered symbol that is a prefix of
    /// `text`, if any.
    fn longest_prefix(&self, text: &str) -> Option<usize>;
}

/// A symbol set with nothing registered.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoSymbols;

impl SymbolSet for NoSymbols {
    fn longest_prefix(&self, _text: &str) -> Option<usize> {
        None
    }
}

fn longest_of<'s>(symbols: impl Iterator<Item = &'s str>, text: &str) -> Option<usize> {
    symbols
        .filter(|sym| !sym.is_empty() && text.starts_with(*sym))
        .map(str::len)
        .max()
}

impl<const N: usize> SymbolSet for [&str; N] {
    fn longest_prefix(&self, text: &str) -> Option<usize> {
        longest_of(self.iter().copied(), text)
    }
}

impl SymbolSet for Vec<String> {
    fn longest_prefix(&self, text: &str) -> Option<usize> {
        longest_of(self.iter().map(String::as_str), text)
    }
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenizer over one formula.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    config: &'a LexerConfig,
    symbols: &'a dyn SymbolSet,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, config: &'a LexerConfig, symbols: &'a dyn SymbolSet) -> Self {
        Lexer {
            source,
            pos: 0,
            config,
            symbols,
            errors: Vec::new(),
        }
    }

    /// Errors recorded so far, draining them.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    #[cfg(test)]
    fn position(&self) -> usize {
        self.pos
    }

    /// Scan the next token. Returns `Eof` forever once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.pos;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some('[') => self.single(TokenKind::LBracket),
            Some(']') => self.single(TokenKind::RBracket),
            Some(',') => self.single(TokenKind::Comma),
            Some(c) if c == self.config.string_delimiter => self.string(),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('.') if self.peek_nth(1).is_some_and(is_ident_start) => {
                self.single(TokenKind::Dot)
            }
            Some(c) if is_ident_start(c) => self.identifier(),
            Some(c) if c.is_control() => {
                self.pos += c.len_utf8();
                self.error(LexErrorKind::InvalidCharacter(c), start);
                TokenKind::Error
            }
            Some(_) => self.operator(),
        };
        let token = Token::new(kind, Span::from_range(start..self.pos));
        trace!(kind = ?token.kind, span = ?token.span, "token");
        token
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or("")
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.source.get(offset..).and_then(|s| s.chars().next())
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn error(&mut self, kind: LexErrorKind, start: usize) {
        self.errors
            .push(LexError::new(kind, Span::from_range(start..self.pos)));
    }

    fn skip_whitespace(&mut self) {
        let skipped = self
            .rest()
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(self.rest().len());
        self.pos += skipped;
    }

    fn identifier(&mut self) -> TokenKind {
        let rest = self.rest();
        let run = rest.find(|c| !is_ident_continue(c)).unwrap_or(rest.len());
        let registered = self.symbols.longest_prefix(rest).unwrap_or(0);
        self.pos += run.max(registered);
        TokenKind::Symbol
    }

    fn is_operator_char(&self, c: char) -> bool {
        !(c.is_whitespace()
            || c.is_control()
            || is_ident_continue(c)
            || PUNCTUATION.contains(&c)
            || c == self.config.string_delimiter)
    }

    fn operator(&mut self) -> TokenKind {
        let rest = self.rest();
        let run = rest
            .find(|c| !self.is_operator_char(c))
            .unwrap_or(rest.len());
        let len = match self.symbols.longest_prefix(rest) {
            Some(len) if len > 0 => len,
            _ => run,
        };
        if len == 0 {
            // A character no rule claims (e.g. a non-ASCII digit).
            self.bump();
        } else {
            self.pos += len;
        }
        TokenKind::Symbol
    }

    /// Consume digits, allowing the separator only between two digits.
    fn digits(&mut self) {
        let sep = self.config.integer_digit_separator;
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => self.bump(),
                Some(c)
                    if Some(c) == sep
                        && self.pos > 0
                        && self.char_at(self.pos - 1).is_some_and(|p| p.is_ascii_digit())
                        && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) =>
                {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        let dp = self.config.decimal_point;
        let mut is_float = false;

        self.digits();

        if self.peek() == Some(dp) && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += dp.len_utf8();
            self.digits();
            if !self.config.allow_non_integer_numbers {
                return TokenKind::Symbol;
            }
            is_float = true;
        }

        if let Some(e) = self.peek().filter(|&c| self.config.is_exponent(c)) {
            let mut look = self.pos + e.len_utf8();
            let signed = matches!(self.char_at(look), Some('+' | '-'));
            if signed {
                look += 1;
            }
            if self.char_at(look).is_some_and(|c| c.is_ascii_digit()) {
                self.pos = look;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                // Exponent literals are floats, so they fall back like `1.5`.
                if !self.config.allow_non_integer_numbers {
                    return TokenKind::Symbol;
                }
                is_float = true;
            } else if signed {
                self.pos = look;
                return self.malformed(start, MalformedNumber::MissingExponentDigits);
            }
        }

        if self.peek().is_some_and(is_ident_continue) {
            while self.peek().is_some_and(is_ident_continue) {
                self.bump();
            }
            return self.malformed(start, MalformedNumber::InvalidSuffix);
        }

        let sep = self.config.integer_digit_separator;
        let text: String = self.source[start..self.pos]
            .chars()
            .filter(|&c| Some(c) != sep)
            .map(|c| if c == dp { '.' } else { c })
            .collect();

        if is_float {
            match text.parse::<f64>() {
                Ok(x) if x.is_finite() => TokenKind::Float(x),
                _ => self.malformed(start, MalformedNumber::FloatOutOfRange),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => self.malformed(start, MalformedNumber::IntegerOverflow),
            }
        }
    }

    fn malformed(&mut self, start: usize, reason: MalformedNumber) -> TokenKind {
        self.error(LexErrorKind::MalformedNumber(reason), start);
        TokenKind::Error
    }

    fn string(&mut self) -> TokenKind {
        let delimiter = self.config.string_delimiter;
        let width = delimiter.len_utf8();
        let open = self.pos;
        self.pos += width;

        let mut value = String::new();
        loop {
            let rest = self.rest();
            let Some(offset) = find_char(rest, delimiter) else {
                self.pos = self.source.len();
                self.errors.push(LexError::new(
                    LexErrorKind::UnterminatedString { delimiter },
                    Span::from_range(open..open + width),
                ));
                return TokenKind::Error;
            };
            value.push_str(&rest[..offset]);
            self.pos += offset + width;
            if self.rest().starts_with(delimiter) {
                value.push(delimiter);
                self.pos += width;
            } else {
                break;
            }
        }
        TokenKind::Str(Arc::from(value))
    }
}

/// Byte offset of the first `c` in `haystack`.
fn find_char(haystack: &str, c: char) -> Option<usize> {
    match u8::try_from(c) {
        Ok(byte) if byte.is_ascii() => memchr::memchr(byte, haystack.as_bytes()),
        _ => haystack.find(c),
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is_eof()).then_some(token)
    }
}

/// Tokenize a whole formula, returning tokens (without `Eof`) and errors.
pub fn tokenize(
    source: &str,
    config: &LexerConfig,
    symbols: &dyn SymbolSet,
) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(source, config, symbols);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    (tokens, lexer.take_errors())
}

#[cfg(test)]
mod tests;
