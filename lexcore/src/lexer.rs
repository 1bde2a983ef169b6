//! The top-level tokenization loop: dispatches on the buffer's next
//! codepoint, scans literals/identifiers/comments, and drives recovery
//! through an [`ErrorCollector`].

use std::collections::HashMap;

use memchr::memchr;

use crate::buffer::Buffer;
use crate::error::{ErrorCollector, ErrorStats, LexerError, LexerErrorKind, Severity};
use crate::position::{LineEnding, SourcePosition};
use crate::token::{Token, TokenMetadata};
use crate::unicode::{is_digit, is_identifier_start, is_whitespace};

/// Per-`K` constructors for the fixed set of categories the driver itself
/// recognizes (identifiers, literals, whitespace, comments, end-of-file,
/// invalid), plus a lexeme-to-kind table for operators and delimiters.
///
/// This generalizes a hardcoded `TokenKind` construction: the dispatch
/// logic below follows the classic `next_token` shape, but every
/// `TokenKind::Foo` literal is replaced by a call through one of these
/// function pointers (or a lookup in `operators`), so the same driver
/// serves any caller-supplied `K`.
pub struct KindBuilder<K> {
    pub identifier: fn() -> K,
    pub integer_literal: fn() -> K,
    pub float_literal: fn() -> K,
    pub string_literal: fn() -> K,
    pub whitespace: fn() -> K,
    pub comment: fn() -> K,
    pub end_of_file: fn() -> K,
    pub invalid: fn() -> K,
    /// Lexeme (e.g. `"+"`, `"=="`, `"("`) to kind. Checked longest-match
    /// first (two bytes, then one).
    pub operators: HashMap<&'static str, K>,
}

/// In-process configuration for a [`Lexer`]. Constructed with ordinary
/// struct literals; non-`kinds` fields have sensible defaults via
/// [`LexerConfig::new`].
pub struct LexerConfig<K> {
    pub tab_width: u32,
    pub line_ending: LineEnding,
    pub track_positions: bool,
    pub max_errors: usize,
    pub keywords: Option<HashMap<String, K>>,
    pub skip_whitespace: bool,
    pub nested_block_comments: bool,
    pub max_comment_nesting: u32,
    pub token_too_long_is_fatal: bool,
    pub max_token_length: Option<usize>,
    pub kinds: KindBuilder<K>,
}

impl<K> LexerConfig<K> {
    /// Construct a config with the given kind constructors and every other
    /// field at its documented default.
    #[must_use]
    pub fn new(kinds: KindBuilder<K>) -> Self {
        Self {
            tab_width: 4,
            line_ending: LineEnding::Auto,
            track_positions: true,
            max_errors: 100,
            keywords: None,
            skip_whitespace: true,
            nested_block_comments: false,
            max_comment_nesting: 32,
            token_too_long_is_fatal: false,
            max_token_length: None,
            kinds,
        }
    }
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Drives tokenization of a borrowed `&'a [u8]` source into a stream of
/// `Token<'a, K>`, recovering from non-fatal errors and halting on fatal
/// ones.
pub struct Lexer<'a, K> {
    buffer: Buffer<'a>,
    config: LexerConfig<K>,
    errors: ErrorCollector,
    /// Set once a terminal state (EOF or fatal halt) is reached; further
    /// `next_token()` calls deterministically return the EOF token without
    /// re-running the dispatch loop.
    done: bool,
    eof_yielded: bool,
}

impl<'a, K: Clone> Lexer<'a, K> {
    /// Construct a lexer over `source` with the given configuration.
    pub fn new(source: &'a [u8], config: LexerConfig<K>) -> Self {
        let mut buffer = if config.track_positions {
            Buffer::with_position_tracking(source)
        } else {
            Buffer::new(source)
        };
        if let Some(tracker) = buffer.tracker_mut() {
            let _ = tracker.set_tab_width(config.tab_width);
            tracker.set_line_ending(config.line_ending);
        }
        let errors = ErrorCollector::new(config.max_errors);
        Self {
            buffer,
            config,
            errors,
            done: false,
            eof_yielded: false,
        }
    }

    /// All errors collected so far, in collection order.
    #[must_use]
    pub fn errors(&self) -> &[LexerError] {
        self.errors.errors()
    }

    /// Error counts by severity.
    #[must_use]
    pub fn error_stats(&self) -> ErrorStats {
        self.errors.stats()
    }

    /// Consume the lexer and return its collected errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<LexerError> {
        self.errors.errors().to_vec()
    }

    fn current_pos(&self) -> SourcePosition {
        self.buffer.current_position().unwrap_or(SourcePosition {
            line: 1,
            column: 1,
            offset: self.buffer.pos(),
        })
    }

    fn eof_token(&self) -> Token<'a, K> {
        Token::new((self.config.kinds.end_of_file)(), &[], self.current_pos())
    }

    /// Record `err`. Fatal errors (either the kind's own severity, or the
    /// collector rejecting on overflow) set `done` and propagate as `Err`;
    /// non-fatal errors are swallowed after emitting the matching `tracing`
    /// event (done inside [`ErrorCollector::add`]).
    fn record_error(&mut self, err: LexerError) -> Result<(), LexerError> {
        if err.is_fatal() {
            self.done = true;
            let halting = err.clone();
            let _ = self.errors.add(err);
            return Err(halting);
        }
        match self.errors.add(err) {
            Ok(()) => Ok(()),
            Err(overflow) => {
                self.done = true;
                Err(overflow)
            }
        }
    }

    fn try_match_operator(&self) -> Option<(K, usize)> {
        let first = self.buffer.peek()?;
        if let Some(second) = self.buffer.peek_at(1) {
            let two = [first, second];
            if let Ok(s) = std::str::from_utf8(&two) {
                if let Some(k) = self.config.kinds.operators.get(s) {
                    return Some((k.clone(), 2));
                }
            }
        }
        let one = [first];
        let s = std::str::from_utf8(&one).ok()?;
        self.config.kinds.operators.get(s).map(|k| (k.clone(), 1))
    }

    /// The primitive tokenization operation: scan and return exactly one
    /// token, or an `Err` if a fatal error halts the lexer.
    ///
    /// Once the buffer is exhausted (or a fatal error has occurred), every
    /// subsequent call deterministically returns the `EndOfFile` token.
    pub fn next_token(&mut self) -> Result<Token<'a, K>, LexerError> {
        if self.done {
            return Ok(self.eof_token());
        }
        loop {
            if self.buffer.is_at_end() {
                self.done = true;
                return Ok(self.eof_token());
            }

            let start_offset = self.buffer.pos();
            let start_pos = self.current_pos();

            let token = match self.scan_one(start_pos)? {
                Some(token) => token,
                None => continue,
            };

            if let Some(max_len) = self.config.max_token_length {
                if token.length() > max_len {
                    let severity = if self.config.token_too_long_is_fatal {
                        Severity::Fatal
                    } else {
                        Severity::Error
                    };
                    self.record_error(LexerError::with_severity(LexerErrorKind::TokenTooLong, severity, start_pos))?;
                }
            }
            let _ = start_offset;
            tracing::trace!(target: "lexcore::lexer", position = ?start_pos, len = token.length(), "token produced");
            return Ok(token);
        }
    }

    /// Scan exactly one lexical item at the buffer's current position.
    /// Returns `Ok(None)` only when whitespace was consumed and the config
    /// says to not emit it (the caller should loop and try again).
    fn scan_one(&mut self, start_pos: SourcePosition) -> Result<Option<Token<'a, K>>, LexerError> {
        let cp = match self.buffer.peek_codepoint() {
            Ok(Some(cp)) => cp,
            Ok(None) => unreachable!("checked not at end"),
            Err(err) => {
                self.record_error(err)?;
                let start_offset = self.buffer.pos();
                let _ = self.buffer.next();
                let slice = self.buffer.slice_from(start_offset);
                return Ok(Some(Token::new((self.config.kinds.invalid)(), slice, start_pos)));
            }
        };

        if is_whitespace(cp) {
            let ws = self.buffer.consume_whitespace();
            if self.config.skip_whitespace {
                return Ok(None);
            }
            return Ok(Some(Token::new((self.config.kinds.whitespace)(), ws, start_pos)));
        }

        if is_digit(cp) {
            return self.scan_number(start_pos).map(Some);
        }

        if is_identifier_start(cp) {
            return self.scan_identifier(start_pos).map(Some);
        }

        if cp == '"' {
            return self.scan_string(start_pos).map(Some);
        }

        if cp == '/' && matches!(self.buffer.peek_at(1), Some(b'/') | Some(b'*')) {
            return self.scan_comment(start_pos).map(Some);
        }

        if let Some((kind, len)) = self.try_match_operator() {
            let start_offset = self.buffer.pos();
            for _ in 0..len {
                let _ = self.buffer.next();
            }
            let slice = self.buffer.slice_from(start_offset);
            return Ok(Some(Token::new(kind, slice, start_pos)));
        }

        let start_offset = self.buffer.pos();
        self.record_error(LexerError::new(LexerErrorKind::UnexpectedCharacter, start_pos))?;
        let _ = self.buffer.next_codepoint();
        let slice = self.buffer.slice_from(start_offset);
        Ok(Some(Token::new((self.config.kinds.invalid)(), slice, start_pos)))
    }

    fn scan_number(&mut self, start_pos: SourcePosition) -> Result<Token<'a, K>, LexerError> {
        let start_offset = self.buffer.pos();
        let _ = self.buffer.consume_while(|b| b.is_ascii_digit());

        let mut is_float = false;
        if self.buffer.peek() == Some(b'.') && matches!(self.buffer.peek_at(1), Some(b'0'..=b'9')) {
            let _ = self.buffer.next();
            let _ = self.buffer.consume_while(|b| b.is_ascii_digit());
            is_float = true;
        }

        if matches!(self.buffer.peek(), Some(b'e' | b'E')) {
            let mut lookahead = 1usize;
            let has_sign = matches!(self.buffer.peek_at(lookahead), Some(b'+' | b'-'));
            if has_sign {
                lookahead += 1;
            }
            if matches!(self.buffer.peek_at(lookahead), Some(b'0'..=b'9')) {
                let _ = self.buffer.next();
                if has_sign {
                    let _ = self.buffer.next();
                }
                let _ = self.buffer.consume_while(|b| b.is_ascii_digit());
                is_float = true;
            }
        }

        let slice = self.buffer.slice_from(start_offset);
        let lexeme = std::str::from_utf8(slice).unwrap_or_default();

        if is_float {
            match lexeme.parse::<f64>() {
                Ok(v) => Ok(Token::with_metadata(
                    (self.config.kinds.float_literal)(),
                    slice,
                    start_pos,
                    TokenMetadata::Float(v),
                )),
                Err(_) => {
                    self.record_error(LexerError::new(LexerErrorKind::InvalidNumber, start_pos))?;
                    Ok(Token::new((self.config.kinds.invalid)(), slice, start_pos))
                }
            }
        } else {
            match lexeme.parse::<i64>() {
                Ok(v) => Ok(Token::with_metadata(
                    (self.config.kinds.integer_literal)(),
                    slice,
                    start_pos,
                    TokenMetadata::Integer(v),
                )),
                Err(_) => {
                    self.record_error(LexerError::new(LexerErrorKind::InvalidNumber, start_pos))?;
                    Ok(Token::new((self.config.kinds.invalid)(), slice, start_pos))
                }
            }
        }
    }

    fn scan_identifier(&mut self, start_pos: SourcePosition) -> Result<Token<'a, K>, LexerError> {
        let slice = self.buffer.consume_identifier()?;
        let kind = std::str::from_utf8(slice)
            .ok()
            .and_then(|s| self.config.keywords.as_ref()?.get(s))
            .cloned()
            .unwrap_or_else(|| (self.config.kinds.identifier)());
        Ok(Token::new(kind, slice, start_pos))
    }

    fn scan_string(&mut self, start_pos: SourcePosition) -> Result<Token<'a, K>, LexerError> {
        let start_offset = self.buffer.pos();
        let _ = self.buffer.next(); // opening '"'

        let mut decoded = String::new();
        let mut has_escape = false;
        let mut terminated = false;

        loop {
            match self.buffer.peek() {
                None => break,
                Some(b'"') => {
                    let _ = self.buffer.next();
                    terminated = true;
                    break;
                }
                Some(b'\\') => {
                    has_escape = true;
                    if let Some(ch) = self.scan_escape(start_pos)? {
                        decoded.push(ch);
                    }
                }
                Some(_) => {
                    let ch = self.buffer.next_codepoint()?;
                    decoded.push(ch);
                }
            }
        }

        let slice = self.buffer.slice_from(start_offset);
        if !terminated {
            self.record_error(LexerError::new(LexerErrorKind::UnterminatedString, start_pos))?;
        }

        if has_escape {
            Ok(Token::with_metadata(
                (self.config.kinds.string_literal)(),
                slice,
                start_pos,
                TokenMetadata::Opaque(Box::new(decoded)),
            ))
        } else {
            let inner_end = slice.len().saturating_sub(usize::from(terminated));
            let inner = std::str::from_utf8(&slice[1.min(slice.len())..inner_end]).unwrap_or("");
            Ok(Token::with_metadata(
                (self.config.kinds.string_literal)(),
                slice,
                start_pos,
                TokenMetadata::String(inner),
            ))
        }
    }

    /// Decode one escape sequence starting at the backslash. Returns
    /// `Ok(None)` (rather than failing the whole scan) when the escape is
    /// invalid, recording `InvalidEscapeSequence` and leaving the raw bytes
    /// already consumed.
    fn scan_escape(&mut self, start_pos: SourcePosition) -> Result<Option<char>, LexerError> {
        let _ = self.buffer.next(); // backslash
        match self.buffer.peek() {
            Some(b'n') => {
                let _ = self.buffer.next();
                Ok(Some('\n'))
            }
            Some(b't') => {
                let _ = self.buffer.next();
                Ok(Some('\t'))
            }
            Some(b'r') => {
                let _ = self.buffer.next();
                Ok(Some('\r'))
            }
            Some(b'\\') => {
                let _ = self.buffer.next();
                Ok(Some('\\'))
            }
            Some(b'"') => {
                let _ = self.buffer.next();
                Ok(Some('"'))
            }
            Some(b'x') => {
                let _ = self.buffer.next();
                let hi = self.buffer.peek().and_then(hex_val);
                let lo = self.buffer.peek_at(1).and_then(hex_val);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        let _ = self.buffer.next();
                        let _ = self.buffer.next();
                        Ok(Some((h << 4 | l) as char))
                    }
                    _ => {
                        self.record_error(LexerError::new(LexerErrorKind::InvalidEscapeSequence, start_pos))?;
                        Ok(None)
                    }
                }
            }
            Some(b'u') => {
                let _ = self.buffer.next();
                let mut value: u32 = 0;
                let mut ok = true;
                for i in 0..4 {
                    match self.buffer.peek_at(i).and_then(hex_val) {
                        Some(d) => value = (value << 4) | u32::from(d),
                        None => {
                            ok = false;
                            break;
                        }
                    }
                }
                if ok {
                    for _ in 0..4 {
                        let _ = self.buffer.next();
                    }
                    match char::from_u32(value) {
                        Some(c) => Ok(Some(c)),
                        None => {
                            self.record_error(LexerError::new(LexerErrorKind::InvalidEscapeSequence, start_pos))?;
                            Ok(None)
                        }
                    }
                } else {
                    self.record_error(LexerError::new(LexerErrorKind::InvalidEscapeSequence, start_pos))?;
                    Ok(None)
                }
            }
            _ => {
                self.record_error(LexerError::new(LexerErrorKind::InvalidEscapeSequence, start_pos))?;
                Ok(None)
            }
        }
    }

    fn scan_comment(&mut self, start_pos: SourcePosition) -> Result<Token<'a, K>, LexerError> {
        let start_offset = self.buffer.pos();
        let _ = self.buffer.next(); // '/'
        let second = self.buffer.peek();
        let _ = self.buffer.next(); // '/' or '*'

        if second == Some(b'/') {
            let pos = self.buffer.pos();
            let rest = &self.buffer.source()[pos..];
            let line_len = memchr(b'\n', rest).unwrap_or(rest.len());
            for _ in 0..line_len {
                let _ = self.buffer.next();
            }
        } else {
            let mut depth: u32 = 1;
            loop {
                match (self.buffer.peek(), self.buffer.peek_at(1)) {
                    (None, _) => {
                        self.record_error(LexerError::new(LexerErrorKind::UnterminatedComment, start_pos))?;
                        break;
                    }
                    (Some(b'*'), Some(b'/')) => {
                        let _ = self.buffer.next();
                        let _ = self.buffer.next();
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    (Some(b'/'), Some(b'*')) if self.config.nested_block_comments => {
                        let _ = self.buffer.next();
                        let _ = self.buffer.next();
                        depth += 1;
                        if depth > self.config.max_comment_nesting {
                            self.record_error(LexerError::new(LexerErrorKind::NestingTooDeep, start_pos))?;
                            break;
                        }
                    }
                    _ => {
                        let _ = self.buffer.next();
                    }
                }
            }
        }

        let slice = self.buffer.slice_from(start_offset);
        Ok(Token::new((self.config.kinds.comment)(), slice, start_pos))
    }
}

impl<'a, K: Clone> Iterator for Lexer<'a, K> {
    type Item = Token<'a, K>;

    /// Yields tokens until `EndOfFile`, inclusive, then `None` forever.
    ///
    /// A fatal error also terminates the stream, but does so by yielding the
    /// `EndOfFile` token as a sentinel (rather than ending one token short)
    /// so callers driving the lexer via `for token in lexer` always see a
    /// deterministic final token, matching a halt reached by reaching the
    /// end of the source.
    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_yielded {
            return None;
        }
        match self.next_token() {
            Ok(token) => {
                if self.done {
                    self.eof_yielded = true;
                }
                Some(token)
            }
            Err(_) => {
                self.eof_yielded = true;
                Some(self.eof_token())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_kind::DefaultKind;

    #[test]
    fn tokenizes_arithmetic_expression() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"12 + foo * 3.5", config);
        let kinds: Vec<DefaultKind> = (&mut lexer).map(|t| *t.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DefaultKind::IntegerLiteral,
                DefaultKind::Plus,
                DefaultKind::Identifier,
                DefaultKind::Star,
                DefaultKind::FloatLiteral,
                DefaultKind::EndOfFile,
            ]
        );
        assert!(lexer.errors().is_empty());
    }

    #[test]
    fn iterator_stops_after_eof() {
        let config = DefaultKind::lexer_config();
        let lexer = Lexer::new(b"1", config);
        let tokens: Vec<_> = lexer.collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(*tokens[1].kind(), DefaultKind::EndOfFile);
    }

    #[test]
    fn iterator_yields_eof_sentinel_after_fatal_error() {
        let mut config = DefaultKind::lexer_config();
        config.max_errors = 0;
        let lexer = Lexer::new(b"@", config);
        let tokens: Vec<_> = lexer.collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(*tokens[0].kind(), DefaultKind::EndOfFile);
    }

    #[test]
    fn skip_whitespace_suppresses_tokens() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"  1  ", config);
        let first = lexer.next_token().unwrap();
        assert_eq!(*first.kind(), DefaultKind::IntegerLiteral);
    }

    #[test]
    fn unterminated_string_records_error() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"\"abc", config);
        let token = lexer.next_token().unwrap();
        assert_eq!(*token.kind(), DefaultKind::StringLiteral);
        assert!(lexer.errors().iter().any(|e| e.kind == LexerErrorKind::UnterminatedString));
    }

    #[test]
    fn string_with_escapes_decodes() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"\"a\\nb\"", config);
        let token = lexer.next_token().unwrap();
        match token.metadata() {
            Some(TokenMetadata::Opaque(v)) => {
                let s = v.downcast_ref::<String>().unwrap();
                assert_eq!(s, "a\nb");
            }
            other => panic!("expected opaque decoded string, got {other:?}"),
        }
    }

    #[test]
    fn line_comment_scanned() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"// hi\n1", config);
        let token = lexer.next_token().unwrap();
        assert_eq!(*token.kind(), DefaultKind::Comment);
        assert_eq!(token.lexeme(), b"// hi");
    }

    #[test]
    fn block_comment_unterminated_records_error() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"/* never closes", config);
        let _ = lexer.next_token().unwrap();
        assert!(lexer.errors().iter().any(|e| e.kind == LexerErrorKind::UnterminatedComment));
    }

    #[test]
    fn unexpected_character_recovers() {
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(b"@1", config);
        let first = lexer.next_token().unwrap();
        assert_eq!(*first.kind(), DefaultKind::Invalid);
        let second = lexer.next_token().unwrap();
        assert_eq!(*second.kind(), DefaultKind::IntegerLiteral);
        assert!(lexer.errors().iter().any(|e| e.kind == LexerErrorKind::UnexpectedCharacter));
    }

    #[test]
    fn zero_copy_slices_point_into_source() {
        let source: &[u8] = b"foo";
        let config = DefaultKind::lexer_config();
        let mut lexer = Lexer::new(source, config);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.lexeme().as_ptr(), source.as_ptr());
    }

    #[test]
    fn keyword_table_relabels_identifier() {
        let mut config = DefaultKind::lexer_config();
        let mut keywords = HashMap::new();
        keywords.insert("let".to_string(), DefaultKind::Identifier);
        config.keywords = Some(keywords);
        let mut lexer = Lexer::new(b"let", config);
        let token = lexer.next_token().unwrap();
        assert_eq!(*token.kind(), DefaultKind::Identifier);
    }
}
