//! Token cursor with one token of lookahead.
//!
//! Wraps the lexer so the parser pulls tokens on demand. Lexer errors are
//! converted to diagnostics as they appear.

use quill_diagnostic::Diagnostic;
use quill_lexer::{Lexer, LexerConfig, SymbolSet, Token};

pub(crate) struct Cursor<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str, config: &'a LexerConfig, symbols: &'a dyn SymbolSet) -> Self {
        Cursor {
            lexer: Lexer::new(source, config, symbols),
            peeked: None,
        }
    }

    /// Consume the next token. Returns `Eof` forever once input ends.
    pub(crate) fn advance(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        }
    }

    /// The next token, without consuming it.
    pub(crate) fn peek(&mut self) -> &Token {
        let lexer = &mut self.lexer;
        self.peeked.get_or_insert_with(|| lexer.next_token())
    }

    /// Diagnostics for lexer errors found since the last call.
    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.lexer
            .take_errors()
            .into_iter()
            .map(|e| e.to_diagnostic())
            .collect()
    }
}
