//! Source position tracking: line/column/offset bookkeeping across tabs,
//! line-ending conventions, and multi-byte codepoints.

use std::fmt;

use thiserror::Error;

use crate::unicode::{self, display_width};

/// An immutable 1-based line/column, 0-based byte-offset position in a source
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: u32,
    /// 1-based display column.
    pub column: u32,
    /// 0-based byte offset from the start of the source.
    pub offset: usize,
}

impl SourcePosition {
    /// The position at the very start of a source buffer: line 1, column 1,
    /// offset 0.
    pub const START: Self = Self {
        line: 1,
        column: 1,
        offset: 0,
    };
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line-ending convention a [`PositionTracker`] uses to decide when a line
/// counter advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n` only.
    Lf,
    /// `\r` only.
    Cr,
    /// `\r\n` as a single terminator.
    CrLf,
    /// Infer from whichever terminator is seen first; `\r\n` is always
    /// treated as a single terminator regardless of what was inferred.
    #[default]
    Auto,
}

/// Errors a [`PositionTracker`] can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionTrackerError {
    /// `restore()` was called with no matching `mark()`.
    #[error("no savepoint to restore")]
    EmptyStack,
    /// `set_tab_width` was called with `0`.
    #[error("tab width must be at least 1")]
    InvalidTabWidth,
}

/// Tracks `(line, column, offset)` as bytes/codepoints are consumed,
/// honoring a configured tab width and line-ending convention.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    current: SourcePosition,
    tab_width: u32,
    line_ending: LineEnding,
    just_saw_cr: bool,
    savepoints: Vec<SourcePosition>,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    /// Create a tracker at [`SourcePosition::START`] with tab width 4 and
    /// [`LineEnding::Auto`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: SourcePosition::START,
            tab_width: 4,
            line_ending: LineEnding::Auto,
            just_saw_cr: false,
            savepoints: Vec::new(),
        }
    }

    /// The current position.
    #[must_use]
    pub fn position(&self) -> SourcePosition {
        self.current
    }

    /// The configured tab width.
    #[must_use]
    pub fn tab_width(&self) -> u32 {
        self.tab_width
    }

    /// The configured line-ending convention.
    #[must_use]
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Reconfigure the tab width. Rejects `0`, since the column-rounding
    /// formula divides by it.
    pub fn set_tab_width(&mut self, width: u32) -> Result<(), PositionTrackerError> {
        if width == 0 {
            return Err(PositionTrackerError::InvalidTabWidth);
        }
        self.tab_width = width;
        Ok(())
    }

    /// Reconfigure the line-ending convention.
    pub fn set_line_ending(&mut self, mode: LineEnding) {
        self.line_ending = mode;
    }

    /// Reset to `(1, 1, 0)` and drop all savepoints.
    pub fn reset(&mut self) {
        self.current = SourcePosition::START;
        self.just_saw_cr = false;
        self.savepoints.clear();
    }

    /// Push the current position onto the savepoint stack.
    pub fn mark(&mut self) {
        tracing::debug!(target: "lexcore::position", position = ?self.current, "mark");
        self.savepoints.push(self.current);
    }

    /// Pop the most recent savepoint and make it current.
    pub fn restore(&mut self) -> Result<(), PositionTrackerError> {
        let restored = self.savepoints.pop().ok_or(PositionTrackerError::EmptyStack)?;
        tracing::debug!(target: "lexcore::position", position = ?restored, "restore");
        self.current = restored;
        Ok(())
    }

    /// Number of savepoints currently on the stack.
    #[must_use]
    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }

    /// Advance over a single byte, treated as an ASCII-like display unit.
    pub fn advance(&mut self, byte: u8) {
        self.advance_with_tab_width(byte, self.tab_width);
    }

    /// Advance over a single byte using a one-off tab width override.
    pub fn advance_with_tab_width(&mut self, byte: u8, tab_width: u32) {
        match byte {
            b'\n' => {
                if self.just_saw_cr && matches!(self.line_ending, LineEnding::Auto | LineEnding::CrLf) {
                    // Continuation of a CRLF pair already counted by the '\r'.
                    self.current.offset += 1;
                } else {
                    self.current.line += 1;
                    self.current.column = 1;
                    self.current.offset += 1;
                }
                self.just_saw_cr = false;
            }
            b'\r' => {
                self.current.line += 1;
                self.current.column = 1;
                self.current.offset += 1;
                self.just_saw_cr = true;
            }
            b'\t' => {
                self.current.column = tab_stop(self.current.column, tab_width);
                self.current.offset += 1;
                self.just_saw_cr = false;
            }
            _ => {
                self.current.column += 1;
                self.current.offset += 1;
                self.just_saw_cr = false;
            }
        }
    }

    /// Advance over a single codepoint, using its display width for the
    /// column increment and its UTF-8 length for the offset increment.
    pub fn advance_codepoint(&mut self, cp: char) {
        match cp {
            '\n' => self.advance(b'\n'),
            '\r' => self.advance(b'\r'),
            '\t' => self.advance(b'\t'),
            other => {
                self.current.column += u32::from(display_width(other));
                self.current.offset += other.len_utf8();
                self.just_saw_cr = false;
            }
        }
    }

    /// Decode and advance over `bytes` end-to-end as UTF-8. Invalid
    /// sequences fall back to advancing a single byte (as a one-column
    /// unit) and resynchronizing; the tracker itself never fails.
    pub fn advance_utf8_bytes(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        while !rest.is_empty() {
            match unicode::decode_utf8(rest) {
                Ok((cp, len)) => {
                    self.advance_codepoint(cp);
                    rest = &rest[len..];
                }
                Err(_) => {
                    self.current.column += 1;
                    self.current.offset += 1;
                    self.just_saw_cr = false;
                    rest = &rest[1..];
                }
            }
        }
    }
}

fn tab_stop(column: u32, tab_width: u32) -> u32 {
    ((column - 1) / tab_width + 1) * tab_width + 1
}
