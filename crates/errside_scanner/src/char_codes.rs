//! Character classes used by the scanner.

use unicode_xid::UnicodeXID;

/// Go letters are Unicode letters plus `_`.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && UnicodeXID::is_xid_start(ch))
}

#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (!ch.is_ascii() && UnicodeXID::is_xid_continue(ch))
}

/// Whitespace that never ends a line.
#[inline]
pub fn is_white_space_single_line(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r')
}

#[inline]
pub fn is_decimal_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Whether `b` is a digit in the given base, hex letters included.
#[inline]
pub fn is_digit_in_base(b: u8, base: u32) -> bool {
    match base {
        2 => matches!(b, b'0' | b'1'),
        8 => matches!(b, b'0'..=b'7'),
        16 => b.is_ascii_hexdigit(),
        _ => b.is_ascii_digit(),
    }
}
