//! Tokenizer for the Quill expression language.
//!
//! Turns formula text into a lazy stream of [`Token`]s according to a
//! [`LexerConfig`]: number literals with configurable decimal point, digit
//! grouping and exponents; delimited strings with doubled-delimiter
//! escapes; single-character punctuation; and symbol runs, split with the
//! help of the registry's [`SymbolSet`].

mod config;
mod error;
mod lexer;
mod token;

pub use config::{LexerConfig, PUNCTUATION};
pub use error::{LexError, LexErrorKind, MalformedNumber};
pub use lexer::{tokenize, Lexer, NoSymbols, SymbolSet};
pub use token::{Token, TokenKind};
