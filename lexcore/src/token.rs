//! A generic, zero-copy lexical token and its classification trait.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::Utf8Error;

use crate::position::SourcePosition;

/// Optional typed payload attached to a token, produced by scanners that
/// already know the parsed value (numbers, escaped strings, character
/// literals).
pub enum TokenMetadata<'a> {
    Integer(i64),
    Float(f64),
    String(&'a str),
    Boolean(bool),
    Character(char),
    Opaque(Box<dyn Any + 'a>),
}

impl fmt::Debug for TokenMetadata<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            Self::Character(v) => f.debug_tuple("Character").field(v).finish(),
            Self::Opaque(_) => f.debug_tuple("Opaque").field(&"..").finish(),
        }
    }
}

/// A zero-copy lexical token: a kind `K`, the exact source bytes it spans,
/// and the position of its first byte.
///
/// Immutable once constructed — all fields are private, accessed only via
/// the methods below.
#[derive(Debug)]
pub struct Token<'a, K> {
    kind: K,
    slice: &'a [u8],
    position: SourcePosition,
    metadata: Option<TokenMetadata<'a>>,
}

impl<'a, K> Token<'a, K> {
    /// Construct a token with no metadata.
    #[must_use]
    pub fn new(kind: K, slice: &'a [u8], position: SourcePosition) -> Self {
        Self {
            kind,
            slice,
            position,
            metadata: None,
        }
    }

    /// Construct a token carrying a typed metadata payload.
    #[must_use]
    pub fn with_metadata(kind: K, slice: &'a [u8], position: SourcePosition, metadata: TokenMetadata<'a>) -> Self {
        Self {
            kind,
            slice,
            position,
            metadata: Some(metadata),
        }
    }

    /// The exact source bytes this token spans.
    #[must_use]
    pub fn lexeme(&self) -> &'a [u8] {
        self.slice
    }

    /// The source bytes this token spans, decoded as UTF-8.
    pub fn lexeme_str(&self) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.slice)
    }

    /// The byte length of the lexeme.
    #[must_use]
    pub fn length(&self) -> usize {
        self.slice.len()
    }

    /// The position of the first byte of the lexeme.
    #[must_use]
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// The attached metadata payload, if any.
    #[must_use]
    pub fn metadata(&self) -> Option<&TokenMetadata<'a>> {
        self.metadata.as_ref()
    }

    /// The token's kind.
    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Whether `self` and `other` are *identical*: equal kind, equal slice
    /// content, and equal position.
    #[must_use]
    pub fn is_identical_to(&self, other: &Self) -> bool
    where
        K: PartialEq,
    {
        self.kind == other.kind && self.slice == other.slice && self.position == other.position
    }
}

impl<K: PartialEq> PartialEq for Token<'_, K> {
    /// Two tokens are equal when their kind and slice content match;
    /// position is not considered (see [`Token::is_identical_to`]).
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.slice == other.slice
    }
}

impl<K: Eq> Eq for Token<'_, K> {}

/// Whether `a` immediately precedes `b` in the source with no gap.
#[must_use]
pub fn are_adjacent<K>(a: &Token<'_, K>, b: &Token<'_, K>) -> bool {
    a.position().offset + a.length() == b.position().offset
}

/// Absolute byte distance between two tokens' starting offsets.
#[must_use]
pub fn distance<K>(a: &Token<'_, K>, b: &Token<'_, K>) -> usize {
    a.position().offset.abs_diff(b.position().offset)
}

/// Total ordering over tokens by source position (offset).
#[must_use]
pub fn compare_by_position<K>(a: &Token<'_, K>, b: &Token<'_, K>) -> Ordering {
    a.position().offset.cmp(&b.position().offset)
}

/// Generic classification queries over a caller-supplied token kind.
///
/// No blanket implementation is provided: a blanket `impl<K: Debug> TokenClass
/// for K` would make it impossible for a downstream crate to write its own
/// `impl TokenClass for MyKind` (E0119, conflicting implementations), which
/// defeats the point of letting callers override classification. Implement
/// this trait directly on `K`, using the [`classify`] helpers below for the
/// debug-name-sniffing default where that's good enough.
pub trait TokenClass {
    fn is_whitespace(&self) -> bool;
    fn is_comment(&self) -> bool;
    fn is_identifier(&self) -> bool;
    fn is_literal(&self) -> bool;
    fn is_operator(&self) -> bool;
    fn is_keyword(&self) -> bool;
}

/// Debug-name-sniffing default classifiers, for `TokenClass` implementations
/// that want the out-of-the-box heuristic rather than a per-variant match.
/// Each inspects the `{:?}` rendering of the variant name — adequate for
/// kinds whose variant names are self-describing, not a substitute for a
/// precise implementation.
pub mod classify {
    use std::fmt;

    pub fn is_whitespace<K: fmt::Debug>(kind: &K) -> bool {
        debug_name_contains(kind, "Whitespace")
    }

    pub fn is_comment<K: fmt::Debug>(kind: &K) -> bool {
        debug_name_contains(kind, "Comment")
    }

    pub fn is_identifier<K: fmt::Debug>(kind: &K) -> bool {
        debug_name_contains(kind, "Identifier")
    }

    pub fn is_literal<K: fmt::Debug>(kind: &K) -> bool {
        debug_name_contains(kind, "Literal")
    }

    pub fn is_operator<K: fmt::Debug>(kind: &K) -> bool {
        debug_name_contains(kind, "Operator")
            || ["Plus", "Minus", "Star", "Slash", "Percent", "Equal", "Bang", "Less", "Greater"]
                .iter()
                .any(|needle| debug_name_contains(kind, needle))
    }

    pub fn is_keyword<K: fmt::Debug>(kind: &K) -> bool {
        debug_name_contains(kind, "Keyword")
    }

    fn debug_name_contains<K: fmt::Debug>(kind: &K, needle: &str) -> bool {
        format!("{kind:?}").contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum K {
        Identifier,
        Whitespace,
        Plus,
    }

    impl TokenClass for K {
        fn is_whitespace(&self) -> bool {
            classify::is_whitespace(self)
        }

        fn is_comment(&self) -> bool {
            classify::is_comment(self)
        }

        fn is_identifier(&self) -> bool {
            classify::is_identifier(self)
        }

        fn is_literal(&self) -> bool {
            classify::is_literal(self)
        }

        fn is_operator(&self) -> bool {
            classify::is_operator(self)
        }

        fn is_keyword(&self) -> bool {
            classify::is_keyword(self)
        }
    }

    #[test]
    fn accessors() {
        let tok = Token::new(K::Identifier, b"foo", SourcePosition::START);
        assert_eq!(tok.lexeme(), b"foo");
        assert_eq!(tok.lexeme_str().unwrap(), "foo");
        assert_eq!(tok.length(), 3);
        assert_eq!(tok.position(), SourcePosition::START);
        assert!(tok.metadata().is_none());
    }

    #[test]
    fn equality_ignores_position_identity_does_not() {
        let a = Token::new(K::Identifier, b"foo", SourcePosition::START);
        let b = Token::new(
            K::Identifier,
            b"foo",
            SourcePosition {
                line: 2,
                column: 1,
                offset: 10,
            },
        );
        assert_eq!(a, b);
        assert!(!a.is_identical_to(&b));
    }

    #[test]
    fn metadata_round_trip() {
        let tok = Token::with_metadata(K::Identifier, b"42", SourcePosition::START, TokenMetadata::Integer(42));
        match tok.metadata() {
            Some(TokenMetadata::Integer(v)) => assert_eq!(*v, 42),
            _ => panic!("expected integer metadata"),
        }
    }

    #[test]
    fn adjacency_and_distance() {
        let a = Token::new(K::Identifier, b"foo", SourcePosition { line: 1, column: 1, offset: 0 });
        let b = Token::new(K::Plus, b"+", SourcePosition { line: 1, column: 4, offset: 3 });
        assert!(are_adjacent(&a, &b));
        assert_eq!(distance(&a, &b), 3);
    }

    #[test]
    fn classify_helpers_sniff_debug_name() {
        assert!(K::Whitespace.is_whitespace());
        assert!(!K::Identifier.is_whitespace());
        assert!(K::Identifier.is_identifier());
        assert!(K::Plus.is_operator());
    }

    #[test]
    fn position_ordering() {
        let a = Token::new(K::Identifier, b"a", SourcePosition { line: 1, column: 1, offset: 0 });
        let b = Token::new(K::Plus, b"+", SourcePosition { line: 1, column: 2, offset: 1 });
        assert_eq!(compare_by_position(&a, &b), Ordering::Less);
    }
}
