//! Terminal Emitter
//!
//! Human-readable diagnostic output. Each diagnostic is rendered into a
//! string first and written in one call, so concurrent writers to the same
//! stream never interleave inside a diagnostic.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::span_utils::{underline_width, LineOffsetTable};
use crate::{Diagnostic, Label, LabelStyle, Severity};

use super::DiagnosticEmitter;

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors only when writing to a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Roles a piece of output can play; each maps to one ANSI sequence.
#[derive(Clone, Copy)]
enum Paint {
    Error,
    Warning,
    Emphasis,
    Help,
    Context,
}

impl Paint {
    fn ansi(self) -> &'static str {
        match self {
            Paint::Error => "\x1b[1;31m",
            Paint::Warning => "\x1b[1;33m",
            Paint::Emphasis => "\x1b[1m",
            Paint::Help => "\x1b[1;32m",
            Paint::Context => "\x1b[1;34m",
        }
    }

    fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Error => Paint::Error,
            Severity::Warning => Paint::Warning,
        }
    }

    fn for_label(label: &Label) -> Self {
        match label.style {
            LabelStyle::Primary => Paint::Error,
            LabelStyle::Secondary => Paint::Context,
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Formula text plus its line table.
struct SourceView<'s> {
    text: &'s str,
    lines: LineOffsetTable,
}

/// Builds the text of one diagnostic.
struct Canvas {
    out: String,
    colors: bool,
}

impl Canvas {
    fn paint(&mut self, paint: Paint, text: &str) {
        if self.colors {
            let _ = write!(self.out, "{}{text}{RESET}", paint.ansi());
        } else {
            self.out.push_str(text);
        }
    }

    fn plain(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn header(&mut self, diagnostic: &Diagnostic) {
        self.paint(
            Paint::for_severity(diagnostic.severity),
            diagnostic.severity.as_str(),
        );
        self.paint(Paint::Emphasis, &format!("[{}]", diagnostic.code));
        let _ = writeln!(self.out, ": {}", diagnostic.message);
    }

    /// A label without source text: its byte range and message.
    fn span_line(&mut self, label: &Label) {
        let lead = if label.is_primary() { "-->" } else { "   " };
        let _ = write!(self.out, "  {lead} {:?}: ", label.span);
        self.paint(Paint::for_label(label), &label.message);
        self.out.push('\n');
    }

    /// A label as a gutter, the source line, and an underline.
    fn snippet(&mut self, label: &Label, view: &SourceView<'_>) {
        let (line, col) = view.lines.offset_to_line_col(view.text, label.span.start);
        let number = line.to_string();
        let blank = " ".repeat(number.len());
        let (arrow, mark) = match label.style {
            LabelStyle::Primary => ("-->", "^"),
            LabelStyle::Secondary => (":::", "-"),
        };

        let _ = writeln!(self.out, "{blank}{arrow} {line}:{col}");
        let _ = writeln!(self.out, "{blank} |");
        let _ = writeln!(
            self.out,
            "{number} | {}",
            view.lines.line_text(view.text, line)
        );

        let lead = " ".repeat(col.saturating_sub(1) as usize);
        let _ = write!(self.out, "{blank} | {lead}");
        let paint = Paint::for_label(label);
        self.paint(paint, &mark.repeat(underline_width(view.text, label.span)));
        if !label.message.is_empty() {
            self.plain(" ");
            self.paint(paint, &label.message);
        }
        self.out.push('\n');
    }

    fn trailer(&mut self, kind: &str, paint: Paint, text: &str) {
        self.plain("  = ");
        self.paint(paint, kind);
        let _ = writeln!(self.out, ": {text}");
    }
}

/// Writes diagnostics to any [`Write`] sink, optionally with colors and
/// source snippets.
pub struct TerminalEmitter<'s, W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceView<'s>>,
}

impl<'s, W: Write> TerminalEmitter<'s, W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Render labels as snippets of `source` instead of raw byte ranges.
    #[must_use]
    pub fn with_source(mut self, source: &'s str) -> Self {
        self.source = Some(SourceView {
            text: source,
            lines: LineOffsetTable::build(source),
        });
        self
    }

    fn canvas(&self) -> Canvas {
        Canvas {
            out: String::new(),
            colors: self.colors,
        }
    }

    fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut canvas = self.canvas();
        canvas.header(diagnostic);
        for label in &diagnostic.labels {
            match &self.source {
                Some(view) => canvas.snippet(label, view),
                None => canvas.span_line(label),
            }
        }
        for note in &diagnostic.notes {
            canvas.trailer("note", Paint::Emphasis, note);
        }
        for suggestion in &diagnostic.suggestions {
            canvas.trailer("help", Paint::Help, suggestion);
        }
        canvas.out.push('\n');
        canvas.out
    }
}

impl TerminalEmitter<'static, io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let text = self.render(diagnostic);
        let _ = self.writer.write_all(text.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let (paint, kind, count, tail) = match (error_count, warning_count) {
            (0, 0) => return,
            (0, w) => (Paint::Warning, "warning", w, "emitted"),
            (e, _) => (Paint::Error, "error", e, "found in expression"),
        };
        let mut canvas = self.canvas();
        canvas.paint(paint, kind);
        let plural = if count == 1 { "" } else { "s" };
        let _ = writeln!(canvas.out, ": {count} {kind}{plural} {tail}");
        let _ = self.writer.write_all(canvas.out.as_bytes());
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use pretty_assertions::assert_eq;
    use quill_ir::Span;

    fn sample_diagnostic() -> Diagnostic {
        Diagnostic::error(ErrorCode::E2002)
            .with_message("unresolved symbol `foo`")
            .with_label(Span::new(4, 7), "not found")
            .with_note("declare `foo` as an argument")
    }

    fn render(emitter_source: Option<&str>, colors: ColorMode) -> String {
        let mut output = Vec::new();
        {
            let mut emitter = TerminalEmitter::with_color_mode(&mut output, colors, false);
            if let Some(source) = emitter_source {
                emitter = emitter.with_source(source);
            }
            emitter.emit(&sample_diagnostic());
            emitter.flush();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_plain_output() {
        let text = render(None, ColorMode::Never);
        assert_eq!(
            text,
            "error[E2002]: unresolved symbol `foo`\n  --> 4..7: not found\n  = note: declare `foo` as an argument\n\n"
        );
    }

    #[test]
    fn test_snippet_output() {
        let text = render(Some("2 + foo"), ColorMode::Never);
        assert_eq!(
            text,
            "error[E2002]: unresolved symbol `foo`\n --> 1:5\n  |\n1 | 2 + foo\n  |     ^^^ not found\n  = note: declare `foo` as an argument\n\n"
        );
    }

    #[test]
    fn test_secondary_label_uses_dashes() {
        let mut output = Vec::new();
        {
            let mut emitter =
                TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false)
                    .with_source("(1 + 2");
            emitter.emit(&crate::unclosed_delimiter(Span::new(0, 1), Span::point(6), '('));
        }
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("|       ^ expected `)`"), "{text}");
        assert!(text.contains("| - unclosed delimiter opened here"), "{text}");
    }

    #[test]
    fn test_colors_only_when_requested() {
        assert!(render(None, ColorMode::Always).contains("\x1b["));
        assert!(!render(None, ColorMode::Auto).contains("\x1b["));
    }

    #[test]
    fn test_summary() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        emitter.emit_summary(2, 0);
        emitter.emit_summary(0, 1);
        emitter.emit_summary(0, 0);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "error: 2 errors found in expression\nwarning: 1 warning emitted\n"
        );
    }
}
