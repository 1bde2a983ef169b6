//! UTF-8 decoding/encoding and character classification helpers.
//!
//! Everything here is a pure function over bytes or `char`s. No type in this
//! module holds any state; the [`crate::buffer::Buffer`] and
//! [`crate::position::PositionTracker`] are the stateful consumers.

use thiserror::Error;

/// Failure decoding a UTF-8 byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Utf8DecodeError {
    /// The leading byte declares a sequence longer than the remaining bytes.
    #[error("incomplete UTF-8 sequence")]
    Incomplete,
    /// The bytes are not a valid UTF-8 sequence.
    #[error("invalid UTF-8 sequence")]
    Invalid,
}

/// Failure encoding a codepoint as UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Utf8EncodeError {
    /// The destination buffer is smaller than the encoded length requires.
    ///
    /// Unreachable through [`encode_utf8`] itself (the caller-supplied buffer
    /// is always `[u8; 4]`, large enough for any scalar value), but kept for
    /// API symmetry with [`Utf8DecodeError`] and for lower-level callers that
    /// hand in a smaller buffer directly.
    #[error("destination buffer too small to hold encoded codepoint")]
    BufferTooSmall,
    /// The codepoint is not a valid Unicode scalar value (e.g. a surrogate).
    #[error("codepoint is not a valid Unicode scalar value")]
    InvalidCodepoint,
}

/// Number of bytes a UTF-8 sequence occupies, based on its leading byte.
///
/// Returns `1` for continuation/invalid leading bytes so callers always make
/// forward progress when resynchronizing after an encoding error.
#[inline]
#[must_use]
pub fn utf8_leading_byte_len(byte: u8) -> usize {
    match byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Decode the first codepoint from `bytes`, returning it and the number of
/// bytes consumed.
pub fn decode_utf8(bytes: &[u8]) -> Result<(char, usize), Utf8DecodeError> {
    let Some(&lead) = bytes.first() else {
        return Err(Utf8DecodeError::Invalid);
    };
    let len = utf8_leading_byte_len(lead);
    if bytes.len() < len {
        return Err(Utf8DecodeError::Incomplete);
    }
    let slice = &bytes[..len];
    let s = std::str::from_utf8(slice).map_err(|_| Utf8DecodeError::Invalid)?;
    let ch = s.chars().next().ok_or(Utf8DecodeError::Invalid)?;
    Ok((ch, len))
}

/// Encode `codepoint` into `buf`, returning the number of bytes written.
pub fn encode_utf8(codepoint: char, buf: &mut [u8; 4]) -> Result<usize, Utf8EncodeError> {
    if !is_valid_codepoint(codepoint as u32) {
        return Err(Utf8EncodeError::InvalidCodepoint);
    }
    let s = codepoint.encode_utf8(buf);
    Ok(s.len())
}

/// Whether `cp` is a valid Unicode scalar value: at most `U+10FFFF` and not a
/// surrogate (`U+D800..=U+DFFF`).
#[inline]
#[must_use]
pub fn is_valid_codepoint(cp: u32) -> bool {
    cp <= 0x0010_FFFF && !(0xD800..=0xDFFF).contains(&cp)
}

/// Whether `bytes` is a complete, valid UTF-8 sequence.
#[must_use]
pub fn validate_utf8(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

/// Count the number of codepoints in `bytes`, failing on the first invalid
/// sequence encountered.
pub fn count_codepoints(bytes: &[u8]) -> Result<usize, Utf8DecodeError> {
    let mut count = 0;
    let mut rest = bytes;
    while !rest.is_empty() {
        let (_, consumed) = decode_utf8(rest)?;
        rest = &rest[consumed..];
        count += 1;
    }
    Ok(count)
}

/// Unicode-aware whitespace classification: ASCII whitespace, `U+00A0`
/// (no-break space), and a handful of common Unicode space separators.
#[inline]
#[must_use]
pub fn is_whitespace(cp: char) -> bool {
    matches!(
        cp,
        ' ' | '\t'
            | '\r'
            | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Letter classification: ASCII letters plus the Latin-1 letter range.
/// Deliberately small and extensible rather than a full Unicode-table
/// dependency.
#[inline]
#[must_use]
pub fn is_letter(cp: char) -> bool {
    cp.is_ascii_alphabetic() || matches!(cp, '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{00FF}')
}

/// ASCII digit classification (`0`..=`9`).
#[inline]
#[must_use]
pub fn is_digit(cp: char) -> bool {
    cp.is_ascii_digit()
}

/// Letter or digit.
#[inline]
#[must_use]
pub fn is_alphanumeric(cp: char) -> bool {
    is_letter(cp) || is_digit(cp)
}

/// Whether `cp` may start an identifier: a letter, `_`, or `$`.
#[inline]
#[must_use]
pub fn is_identifier_start(cp: char) -> bool {
    is_letter(cp) || cp == '_' || cp == '$'
}

/// Whether `cp` may continue an identifier: alphanumeric or `_`.
#[inline]
#[must_use]
pub fn is_identifier_continue(cp: char) -> bool {
    is_alphanumeric(cp) || cp == '_'
}

/// Display width in terminal cells: `0` for control characters, `2` for
/// CJK/wide ranges, `1` otherwise.
#[must_use]
pub fn display_width(cp: char) -> u8 {
    let cp = cp as u32;
    if is_control(cp) {
        return 0;
    }
    if is_wide(cp) {
        return 2;
    }
    1
}

fn is_control(cp: u32) -> bool {
    matches!(cp, 0x00..=0x1F | 0x7F..=0x9F)
}

fn is_wide(cp: u32) -> bool {
    matches!(
        cp,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1_F300..=0x1_FAFF
            | 0x2_0000..=0x3_FFFD
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ascii() {
        assert_eq!(decode_utf8(b"x"), Ok(('x', 1)));
    }

    #[test]
    fn decode_cjk() {
        let bytes = "中".as_bytes();
        assert_eq!(decode_utf8(bytes), Ok(('中', 3)));
    }

    #[test]
    fn decode_incomplete() {
        let bytes = "中".as_bytes();
        assert_eq!(decode_utf8(&bytes[..1]), Err(Utf8DecodeError::Incomplete));
    }

    #[test]
    fn decode_invalid_continuation() {
        assert_eq!(decode_utf8(&[0xC2, 0x20]), Err(Utf8DecodeError::Invalid));
    }

    #[test]
    fn round_trip() {
        for ch in ['a', '中', '💯', '\0'] {
            let mut buf = [0u8; 4];
            let len = encode_utf8(ch, &mut buf).unwrap();
            let mut expected = [0u8; 4];
            let expected_str = ch.encode_utf8(&mut expected);
            assert_eq!(&buf[..len], expected_str.as_bytes());
        }
    }

    #[test]
    fn surrogate_is_invalid_codepoint() {
        assert!(!is_valid_codepoint(0xD800));
        assert!(is_valid_codepoint(0x10FFFF));
        assert!(!is_valid_codepoint(0x110000));
    }

    #[test]
    fn width_table() {
        assert_eq!(display_width('a'), 1);
        assert_eq!(display_width('中'), 2);
        assert_eq!(display_width('\u{07}'), 0);
    }

    #[test]
    fn count_codepoints_mixed() {
        assert_eq!(count_codepoints("a中b".as_bytes()), Ok(3));
    }

    #[test]
    fn identifier_classifiers() {
        assert!(is_identifier_start('_'));
        assert!(is_identifier_start('$'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_continue('1'));
    }
}
