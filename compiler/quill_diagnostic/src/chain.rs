//! Ordered collections of diagnostics.

use std::fmt;

use crate::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use crate::{Diagnostic, ErrorCode};

/// Every problem found in one formula, in the order it was found.
///
/// Parsing keeps going after most errors, so a single failed `create` call
/// returns all of them together.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ErrorChain {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    /// Whether any diagnostic carries `code`.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Codes in order, for compact assertions.
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Render all diagnostics against the formula text they refer to,
    /// without color.
    pub fn render(&self, source: &str) -> String {
        let mut out = Vec::new();
        {
            let mut emitter =
                TerminalEmitter::with_color_mode(&mut out, ColorMode::Never, false).with_source(source);
            emitter.emit_all(&self.diagnostics);
            emitter.flush();
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl Extend<Diagnostic> for ErrorChain {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diagnostics.extend(iter);
    }
}

impl FromIterator<Diagnostic> for ErrorChain {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        ErrorChain {
            diagnostics: iter.into_iter().collect(),
        }
    }
}

impl From<Diagnostic> for ErrorChain {
    fn from(diagnostic: Diagnostic) -> Self {
        ErrorChain {
            diagnostics: vec![diagnostic],
        }
    }
}

impl IntoIterator for ErrorChain {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorChain {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorChain {}
