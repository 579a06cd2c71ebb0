//! Diagnostic output.
//!
//! Only a terminal renderer ships here. Hosts that want JSON or editor
//! markers implement [`DiagnosticEmitter`] themselves.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// A sink for rendered diagnostics. Write failures are swallowed; a
/// broken output stream must not turn into a second error.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all<'d>(&mut self, diagnostics: impl IntoIterator<Item = &'d Diagnostic>)
    where
        Self: Sized,
    {
        diagnostics.into_iter().for_each(|d| self.emit(d));
    }

    fn flush(&mut self);

    /// Trailing "N errors found" line. Prints nothing when both counts are
    /// zero.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
