//! A reusable lexer (tokenizer) core: a zero-copy buffer, a position
//! tracker, a generic token type, and a recoverable error collector.
//!
//! This crate deliberately stops at the tokenization pipeline. It does not
//! define a grammar, a parser, or any particular source language — callers
//! supply their own token-kind enumeration and keyword table and get back a
//! `Token<K>` stream with precise `(line, column, offset)` positions and
//! collected, severity-tagged errors.
//!
//! # Architecture
//!
//! - [`unicode`]: UTF-8 decode/encode and codepoint classification, leaf
//!   module with no dependencies on the rest of the crate.
//! - [`position`]: [`position::PositionTracker`] maintains line/column/offset
//!   across tab stops, line-ending conventions, and multi-byte codepoints.
//! - [`error`]: the closed [`error::LexerErrorKind`] enumeration, severities,
//!   and the bounded [`error::ErrorCollector`].
//! - [`buffer`]: [`buffer::Buffer`] is the zero-copy cursor over the source
//!   slice, with optional position tracking and independent savepoint
//!   stacks.
//! - [`token`]: the generic [`token::Token`] value and the [`token::TokenClass`]
//!   classification trait.
//! - [`default_kind`]: [`default_kind::DefaultKind`], a demonstration token
//!   kind set used by the `demo` binary and this crate's own tests.
//! - [`lexer`]: [`lexer::Lexer`], the top-level tokenization loop.
//!
//! # Example
//!
//! ```
//! use lexcore::default_kind::DefaultKind;
//! use lexcore::lexer::Lexer;
//!
//! let config = DefaultKind::lexer_config();
//! let mut lexer = Lexer::new(b"foo + 42", config);
//! for token in &mut lexer {
//!     println!("{:?}", token);
//! }
//! assert!(!lexer.errors().iter().any(|e| e.is_fatal()));
//! ```

/// UTF-8 decoding/encoding and character classification helpers.
pub mod unicode;

/// Source position tracking: line/column/offset across tabs, line endings,
/// and multi-byte codepoints.
pub mod position;

/// Closed error taxonomy, severities, and the bounded error collector.
pub mod error;

/// Zero-copy cursor over a borrowed byte slice.
pub mod buffer;

/// Generic, zero-copy lexical token and its classification trait.
pub mod token;

/// A demonstration token kind set.
pub mod default_kind;

/// The top-level tokenization loop.
pub mod lexer;
