//! Closed error taxonomy, severities, and a bounded error collector.

use std::fmt;

use thiserror::Error;

use crate::position::SourcePosition;

/// The kind of lexical error encountered, with a default message supplied by
/// `thiserror`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexerErrorKind {
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid escape sequence")]
    InvalidEscapeSequence,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("invalid identifier")]
    InvalidIdentifier,
    #[error("buffer overflow")]
    BufferOverflow,
    #[error("encoding error")]
    EncodingError,
    #[error("unexpected end of file")]
    UnexpectedEndOfFile,
    #[error("invalid token")]
    InvalidToken,
    #[error("nesting too deep")]
    NestingTooDeep,
    #[error("token too long")]
    TokenTooLong,
    /// Not produced by the lexer itself; synthesized by [`ErrorCollector::add`]
    /// when the collector is already at capacity.
    #[error("too many errors collected")]
    TooManyErrors,
}

/// Severity of a collected error, determining whether lexing may continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Lexing continues; informational.
    Warning,
    /// Lexing continues; a defect was recorded.
    Error,
    /// Lexing must stop.
    Fatal,
}

impl LexerErrorKind {
    /// The default severity for this kind, per the recoverability taxonomy.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::BufferOverflow => Severity::Fatal,
            Self::InvalidIdentifier => Severity::Warning,
            Self::TooManyErrors => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

/// A single recorded lexical error: kind, severity, the position it occurred
/// at, an overridable human-readable message (defaults to the kind's own
/// message), and optional `context`/`suggestion` lines for richer
/// diagnostics.
///
/// `Display` is implemented by hand rather than derived: the user-visible
/// format is `<severity>: <message> at <line>:<column>`, followed by a
/// `context` line and a `suggestion` line when those are present, which
/// `thiserror`'s field-interpolated `#[error("...")]` string can't express
/// conditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub severity: Severity,
    pub position: SourcePosition,
    pub message: String,
    pub context: Option<String>,
    pub suggestion: Option<String>,
}

impl LexerError {
    /// Construct an error at its kind's default severity, with `message`
    /// defaulted to the kind's own `Display` text.
    #[must_use]
    pub fn new(kind: LexerErrorKind, position: SourcePosition) -> Self {
        Self {
            message: kind.to_string(),
            severity: kind.default_severity(),
            kind,
            position,
            context: None,
            suggestion: None,
        }
    }

    /// Construct an error overriding the default severity.
    #[must_use]
    pub fn with_severity(kind: LexerErrorKind, severity: Severity, position: SourcePosition) -> Self {
        Self {
            message: kind.to_string(),
            kind,
            severity,
            position,
            context: None,
            suggestion: None,
        }
    }

    /// Override the default message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach additional context (e.g. the lexeme or enclosing construct).
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach a suggested fix.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Whether this error is fatal (must halt the lexer loop).
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} at {}", self.severity, self.message, self.position)?;
        if let Some(context) = &self.context {
            write!(f, "\n  context: {context}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LexerError {}

/// Counts of collected errors by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorStats {
    pub total: usize,
    pub warnings: usize,
    pub errors: usize,
    pub fatals: usize,
}

/// A capacity-bounded sequence of collected [`LexerError`]s.
#[derive(Debug, Clone)]
pub struct ErrorCollector {
    errors: Vec<LexerError>,
    max_errors: usize,
    stats: ErrorStats,
}

impl ErrorCollector {
    /// Create a collector bounded to `max_errors` entries.
    #[must_use]
    pub fn new(max_errors: usize) -> Self {
        Self {
            errors: Vec::new(),
            max_errors,
            stats: ErrorStats::default(),
        }
    }

    /// Append `err`, emitting a `tracing` event at a level matching its
    /// severity. Returns `Err` (carrying a synthesized [`LexerErrorKind::TooManyErrors`]
    /// error at `err`'s position) without appending when the collector is
    /// already at `max_errors`.
    pub fn add(&mut self, err: LexerError) -> Result<(), LexerError> {
        if self.errors.len() >= self.max_errors {
            let overflow = LexerError::with_severity(LexerErrorKind::TooManyErrors, Severity::Fatal, err.position);
            tracing::error!(target: "lexcore::error", ?overflow, "error collector at capacity");
            return Err(overflow);
        }

        match err.severity {
            Severity::Warning => {
                self.stats.warnings += 1;
                tracing::warn!(target: "lexcore::error", ?err, "lexical warning collected");
            }
            Severity::Error => {
                self.stats.errors += 1;
                tracing::warn!(target: "lexcore::error", ?err, "lexical error collected");
            }
            Severity::Fatal => {
                self.stats.fatals += 1;
                tracing::error!(target: "lexcore::error", ?err, "fatal lexical error collected");
            }
        }
        self.stats.total += 1;
        self.errors.push(err);
        Ok(())
    }

    /// Whether any error (of any severity) has been collected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether any fatal error has been collected.
    #[must_use]
    pub fn has_fatal_errors(&self) -> bool {
        self.stats.fatals > 0
    }

    /// All collected errors, in collection order.
    #[must_use]
    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    /// Current counts by severity.
    #[must_use]
    pub fn stats(&self) -> ErrorStats {
        self.stats
    }

    /// The configured capacity.
    #[must_use]
    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Empty the collected sequence and zero the counters, retaining
    /// allocated capacity.
    pub fn clear(&mut self) {
        self.errors.clear();
        self.stats = ErrorStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(kind: LexerErrorKind) -> LexerError {
        LexerError::new(kind, SourcePosition::START)
    }

    #[test]
    fn default_severities() {
        assert_eq!(LexerErrorKind::BufferOverflow.default_severity(), Severity::Fatal);
        assert_eq!(LexerErrorKind::InvalidIdentifier.default_severity(), Severity::Warning);
        assert_eq!(LexerErrorKind::UnexpectedCharacter.default_severity(), Severity::Error);
    }

    #[test]
    fn collects_and_counts() {
        let mut c = ErrorCollector::new(10);
        c.add(err(LexerErrorKind::UnexpectedCharacter)).unwrap();
        c.add(err(LexerErrorKind::InvalidIdentifier)).unwrap();
        let stats = c.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.warnings, 1);
        assert!(c.has_errors());
        assert!(!c.has_fatal_errors());
    }

    #[test]
    fn fatal_is_tracked() {
        let mut c = ErrorCollector::new(10);
        c.add(err(LexerErrorKind::BufferOverflow)).unwrap();
        assert!(c.has_fatal_errors());
    }

    #[test]
    fn overflow_rejects_and_reports_fatal() {
        let mut c = ErrorCollector::new(1);
        c.add(err(LexerErrorKind::UnexpectedCharacter)).unwrap();
        let result = c.add(err(LexerErrorKind::UnexpectedCharacter));
        assert!(result.is_err());
        assert_eq!(c.errors().len(), 1);
        let rejected = result.unwrap_err();
        assert_eq!(rejected.kind, LexerErrorKind::TooManyErrors);
        assert!(rejected.is_fatal());
    }

    #[test]
    fn clear_resets_state() {
        let mut c = ErrorCollector::new(10);
        c.add(err(LexerErrorKind::UnexpectedCharacter)).unwrap();
        c.clear();
        assert!(!c.has_errors());
        assert_eq!(c.stats(), ErrorStats::default());
    }

    #[test]
    fn display_format() {
        let e = err(LexerErrorKind::UnexpectedCharacter);
        let text = e.to_string();
        assert!(text.contains("UnexpectedCharacter") || text.contains("unexpected character"));
        assert!(text.contains("1:1"));
    }

    #[test]
    fn with_message_overrides_default() {
        let e = err(LexerErrorKind::InvalidNumber).with_message("'3.5.2' is not a valid number");
        assert_eq!(e.message, "'3.5.2' is not a valid number");
        assert!(e.to_string().contains("'3.5.2' is not a valid number"));
    }

    #[test]
    fn context_and_suggestion_appear_on_their_own_lines() {
        let e = err(LexerErrorKind::UnterminatedString)
            .with_context("string starting at byte 12")
            .with_suggestion("add a closing '\"'");
        let text = e.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("unterminated string literal"));
        assert!(lines[1].trim().starts_with("context:"));
        assert!(lines[1].contains("byte 12"));
        assert!(lines[2].trim().starts_with("suggestion:"));
        assert!(lines[2].contains("closing"));
    }

    #[test]
    fn no_context_or_suggestion_is_single_line() {
        let e = err(LexerErrorKind::UnexpectedCharacter);
        assert_eq!(e.to_string().lines().count(), 1);
    }
}
