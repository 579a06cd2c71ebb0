use std::fmt;

use quill_ir::Span;

use crate::ErrorCode;

/// How serious a [`Diagnostic`] is. Any error fails the `create` call.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a label marks the offending input or points at related input.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LabelStyle {
    /// The input the diagnostic is about; underlined with `^`.
    Primary,
    /// Context such as the opening bracket of an unclosed group.
    Secondary,
}

/// A message attached to a byte range of the formula.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::styled(LabelStyle::Primary, span, message)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::styled(LabelStyle::Secondary, span, message)
    }

    fn styled(style: LabelStyle, span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            style,
        }
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.style == LabelStyle::Primary
    }
}

/// One problem found in a formula, with enough context to point at it.
///
/// Built fluently: start from [`Diagnostic::error`] and chain `with_*`
/// calls. The free functions at the bottom of this module build the
/// diagnostics the lexer and parser report.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "a diagnostic does nothing until it is pushed onto an ErrorChain"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Spans in the formula, primary ones first by convention.
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    /// Rendered as `help:` lines.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            ..self
        }
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(|label| label.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Single-line-per-part rendering without source text. Spans print as byte
/// ranges; use [`crate::emitter::TerminalEmitter`] for snippets.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            let lead = match label.style {
                LabelStyle::Primary => "-->",
                LabelStyle::Secondary => "   ",
            };
            write!(f, "\n  {lead} {:?}: {}", label.span, label.message)?;
        }
        let trailers = self
            .notes
            .iter()
            .map(|text| ("note", text))
            .chain(self.suggestions.iter().map(|text| ("help", text)));
        for (kind, text) in trailers {
            write!(f, "\n  = {kind}: {text}")?;
        }
        Ok(())
    }
}

// Constructors for the diagnostics the front end reports.

pub fn unexpected_token(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!(
            "unexpected token: expected {expected}, found `{found}`"
        ))
        .with_label(span, format!("expected {expected}"))
}

/// `found` is a description such as "end of input" or "`)`".
pub fn expected_expression(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("expected expression, found {found}"))
        .with_label(span, "expected expression here")
}

/// `end_span` is where the closer was expected; `open_span` gets a
/// secondary label.
pub fn unclosed_delimiter(open_span: Span, end_span: Span, delimiter: char) -> Diagnostic {
    let closer = match delimiter {
        '(' => ')',
        '[' => ']',
        other => other,
    };
    Diagnostic::error(ErrorCode::E1003)
        .with_message(format!("unclosed delimiter `{delimiter}`"))
        .with_label(end_span, format!("expected `{closer}`"))
        .with_secondary_label(open_span, "unclosed delimiter opened here")
}

pub fn unmatched_delimiter(span: Span, delimiter: char) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1004)
        .with_message(format!("unmatched closing delimiter `{delimiter}`"))
        .with_label(span, "no matching opening delimiter")
}

pub fn type_mismatch(span: Span, expected: &str, found: &str, context: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!(
            "type mismatch: expected `{expected}`, found `{found}`"
        ))
        .with_label(span, context)
}

pub fn unresolved_symbol(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!("unresolved symbol `{name}`"))
        .with_label(span, "not a registered construct or declared argument")
}

/// `available` lists the signatures `symbol` does accept; an empty list
/// omits the note.
pub fn unresolved_overload(
    span: Span,
    symbol: &str,
    operands: &str,
    available: &[String],
) -> Diagnostic {
    let diagnostic = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("no overload of `{symbol}` accepts {operands}"))
        .with_label(span, format!("`{symbol}` applied to {operands}"));
    match available {
        [] => diagnostic,
        _ => diagnostic.with_note(format!("available: {}", available.join(", "))),
    }
}

/// A registered construct panicked while the expression was being built.
pub fn internal_error(span: Span, detail: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!("internal error while building expression: {detail}"))
        .with_label(span, "while processing this input")
        .with_note("a registered construct panicked; this is a bug in the host application")
}
