//! A demonstration token kind set, used by the `demo` binary and by this
//! crate's own tests. Not authoritative — callers define their own kind
//! enumeration and implement [`crate::token::TokenClass`] for it.

use std::collections::HashMap;

use crate::lexer::{KindBuilder, LexerConfig};
use crate::token::{classify, TokenClass};

/// The demonstration token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultKind {
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Whitespace,
    Comment,
    EndOfFile,
    Invalid,
}

impl DefaultKind {
    /// A ready-to-use [`LexerConfig`] wired for [`DefaultKind`]: no keyword
    /// table, whitespace suppressed by default, and the arithmetic
    /// operator/delimiter set this enum names mapped to their lexemes.
    #[must_use]
    pub fn lexer_config() -> LexerConfig<DefaultKind> {
        let mut operators = HashMap::new();
        operators.insert("+", DefaultKind::Plus);
        operators.insert("-", DefaultKind::Minus);
        operators.insert("*", DefaultKind::Star);
        operators.insert("/", DefaultKind::Slash);
        operators.insert("(", DefaultKind::LeftParen);
        operators.insert(")", DefaultKind::RightParen);
        operators.insert("{", DefaultKind::LeftBrace);
        operators.insert("}", DefaultKind::RightBrace);
        operators.insert(",", DefaultKind::Comma);
        operators.insert(";", DefaultKind::Semicolon);

        LexerConfig::new(KindBuilder {
            identifier: || DefaultKind::Identifier,
            integer_literal: || DefaultKind::IntegerLiteral,
            float_literal: || DefaultKind::FloatLiteral,
            string_literal: || DefaultKind::StringLiteral,
            whitespace: || DefaultKind::Whitespace,
            comment: || DefaultKind::Comment,
            end_of_file: || DefaultKind::EndOfFile,
            invalid: || DefaultKind::Invalid,
            operators,
        })
    }
}

impl TokenClass for DefaultKind {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_variant_names() {
        assert!(DefaultKind::Whitespace.is_whitespace());
        assert!(DefaultKind::Comment.is_comment());
        assert!(DefaultKind::Identifier.is_identifier());
        assert!(DefaultKind::IntegerLiteral.is_literal());
        assert!(DefaultKind::Plus.is_operator());
        assert!(!DefaultKind::EndOfFile.is_operator());
    }
}
