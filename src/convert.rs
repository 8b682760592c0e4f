//! Strict conversions from raw value tokens.
//!
//! Every conversion must consume the whole token: `"12 "` is not an integer
//! and `"yes!"` is not a boolean.

#![allow(clippy::question_mark)]

use crate::arena::NodeId;
use crate::context::Context;
use crate::error::{Error, ErrorKind};
use crate::span::Spanned;

#[cfg(test)]
#[path = "./convert_tests.rs"]
mod tests;

/// Parses one of the accepted boolean spellings.
///
/// `t T y Y 1` and `f F n N 0`, then case-insensitive `on`/`no`, `yes`/`off`,
/// `true` and `false`.
pub fn parse_bool(token: &[u8]) -> Result<bool, ErrorKind> {
    let value = match token {
        [b't' | b'T' | b'y' | b'Y' | b'1'] => true,
        [b'f' | b'F' | b'n' | b'N' | b'0'] => false,
        _ if token.eq_ignore_ascii_case(b"on") => true,
        _ if token.eq_ignore_ascii_case(b"no") => false,
        _ if token.eq_ignore_ascii_case(b"yes") => true,
        _ if token.eq_ignore_ascii_case(b"off") => false,
        _ if token.eq_ignore_ascii_case(b"true") => true,
        _ if token.eq_ignore_ascii_case(b"false") => false,
        _ => return Err(ErrorKind::BoolFormat),
    };
    Ok(value)
}

/// Parses a signed 64-bit integer in `base`.
///
/// An optional `+` or `-` sign comes first. Base `0` picks the radix from the
/// prefix: `0x`/`0X` for hexadecimal, a leading `0` for octal, decimal
/// otherwise. Base 16 also accepts the `0x` prefix. Bases outside `2..=36`
/// are rejected.
pub fn parse_int(token: &[u8], base: u32) -> Result<i64, ErrorKind> {
    if base == 1 || base > 36 {
        return Err(ErrorKind::IntegerFormat);
    }
    let (negative, rest) = match token {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, token),
    };
    let has_hex_prefix = matches!(rest, [b'0', b'x' | b'X', _, ..]);
    let (radix, digits) = match base {
        0 if has_hex_prefix => (16, &rest[2..]),
        0 if rest.len() > 1 && rest[0] == b'0' => (8, &rest[1..]),
        0 => (10, rest),
        16 if has_hex_prefix => (16, &rest[2..]),
        _ => (base, rest),
    };
    if digits.is_empty() {
        return Err(ErrorKind::IntegerFormat);
    }

    let mut magnitude: u64 = 0;
    let mut overflow = false;
    for &b in digits {
        let digit = match (b as char).to_digit(radix) {
            Some(digit) => digit as u64,
            None => return Err(ErrorKind::IntegerFormat),
        };
        match magnitude
            .checked_mul(radix as u64)
            .and_then(|m| m.checked_add(digit))
        {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
    }

    if negative {
        if overflow || magnitude > i64::MIN.unsigned_abs() {
            return Err(ErrorKind::IntegerTooSmall);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        if overflow || magnitude > i64::MAX as u64 {
            return Err(ErrorKind::IntegerTooLarge);
        }
        Ok(magnitude as i64)
    }
}

/// Parses a 64-bit float. Accepts what [`f64::from_str`] accepts.
pub fn parse_f64(token: &[u8]) -> Result<f64, ErrorKind> {
    let text = match std::str::from_utf8(token) {
        Ok(text) => text,
        Err(_) => return Err(ErrorKind::NumberFormat),
    };
    match text.parse::<f64>() {
        Ok(value) => Ok(value),
        Err(_) => Err(ErrorKind::NumberFormat),
    }
}

/// Copies `token` into `buf` followed by a zero byte, returning the token
/// length. The buffer must be strictly larger than the token.
pub fn copy_str(token: &[u8], buf: &mut [u8]) -> Result<usize, ErrorKind> {
    let len = token.len();
    if len >= buf.len() {
        return Err(ErrorKind::StringTooLarge);
    }
    buf[..len].copy_from_slice(token);
    buf[len] = 0;
    Ok(len)
}

/// Narrows a parsed integer to a signed destination.
pub fn narrow_signed<T: TryFrom<i64>>(value: i64) -> Result<T, ErrorKind> {
    match T::try_from(value) {
        Ok(v) => Ok(v),
        Err(_) if value < 0 => Err(ErrorKind::IntegerTooSmall),
        Err(_) => Err(ErrorKind::IntegerTooLarge),
    }
}

/// Narrows a parsed integer to an unsigned destination.
pub fn narrow_unsigned<T: TryFrom<u64>>(value: i64) -> Result<T, ErrorKind> {
    if value < 0 {
        return Err(ErrorKind::IntegerNegative);
    }
    match T::try_from(value as u64) {
        Ok(v) => Ok(v),
        Err(_) => Err(ErrorKind::IntegerTooLarge),
    }
}

/// Types a value token can be converted into.
pub trait FromToken<'a>: Sized {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind>;
}

impl<'a> FromToken<'a> for &'a [u8] {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
        Ok(token)
    }
}

/// Fails with [`ErrorKind::InvalidType`] if the token is not UTF-8.
impl<'a> FromToken<'a> for &'a str {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
        match std::str::from_utf8(token) {
            Ok(s) => Ok(s),
            Err(_) => Err(ErrorKind::InvalidType),
        }
    }
}

impl<'a> FromToken<'a> for String {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
        Ok(String::from_utf8_lossy(token).into_owned())
    }
}

impl<'a> FromToken<'a> for bool {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
        parse_bool(token)
    }
}

macro_rules! signed_from_token {
    ($($num:ty),+) => {$(
        impl<'a> FromToken<'a> for $num {
            fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
                match parse_int(token, 0) {
                    Ok(i) => narrow_signed(i),
                    Err(e) => Err(e),
                }
            }
        }
    )+};
}

macro_rules! unsigned_from_token {
    ($($num:ty),+) => {$(
        impl<'a> FromToken<'a> for $num {
            fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
                match parse_int(token, 0) {
                    Ok(i) => narrow_unsigned(i),
                    Err(e) => Err(e),
                }
            }
        }
    )+};
}

signed_from_token!(i8, i16, i32, i64);
unsigned_from_token!(u8, u16, u32, u64);

impl<'a> FromToken<'a> for f64 {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
        parse_f64(token)
    }
}

impl<'a> FromToken<'a> for f32 {
    fn from_token(token: &'a [u8]) -> Result<Self, ErrorKind> {
        match parse_f64(token) {
            Ok(f) => Ok(f as f32),
            Err(e) => Err(e),
        }
    }
}

impl<'a> Context<'a> {
    /// The value token of `key` and the node errors about it are anchored to.
    fn token(&self, key: NodeId) -> (&'a [u8], NodeId) {
        match self.value(key) {
            Some(value) => (self.text(value), value),
            None => (&[], key),
        }
    }

    fn convert<T>(
        &mut self,
        key: NodeId,
        f: impl FnOnce(&'a [u8]) -> Result<T, ErrorKind>,
    ) -> Result<T, Error> {
        let (token, anchor) = self.token(key);
        match f(token) {
            Ok(v) => Ok(v),
            Err(kind) => Err(self.add_error(anchor, kind)),
        }
    }

    /// Converts the value of `key`, logging the error on failure.
    ///
    /// A key without a value converts from an empty token.
    pub fn read<T: FromToken<'a>>(&mut self, key: NodeId) -> Result<T, Error> {
        self.convert(key, T::from_token)
    }

    /// Like [`Context::read`], keeping the span of the value.
    pub fn read_spanned<T: FromToken<'a>>(&mut self, key: NodeId) -> Result<Spanned<T>, Error> {
        let span = match self.value(key) {
            Some(value) => self.span(value),
            None => self.span(key),
        };
        match self.read(key) {
            Ok(value) => Ok(Spanned {
                value,
                span: span.unwrap_or_default(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Reads the value of `key` as an integer in `base` (`0` detects the prefix).
    pub fn read_int(&mut self, key: NodeId, base: u32) -> Result<i64, Error> {
        self.convert(key, |token| parse_int(token, base))
    }

    pub fn read_bool(&mut self, key: NodeId) -> Result<bool, Error> {
        self.convert(key, parse_bool)
    }

    pub fn read_f64(&mut self, key: NodeId) -> Result<f64, Error> {
        self.convert(key, parse_f64)
    }

    /// Copies the value of `key` into `buf` with a zero terminator.
    pub fn read_str(&mut self, key: NodeId, buf: &mut [u8]) -> Result<usize, Error> {
        self.convert(key, |token| copy_str(token, buf))
    }
}
