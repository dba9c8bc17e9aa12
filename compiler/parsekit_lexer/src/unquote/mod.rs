//! Quoted-literal decoding.
//!
//! Three literal forms are recognized, by their opening delimiter:
//!
//! - `"..."`: escaped string. No raw newline, no unescaped `"`.
//! - `'...'`: escaped character literal holding exactly one character.
//! - `` `...` ``: raw string. No escapes; carriage returns are dropped.
//!
//! Escapes: `\a \b \f \n \r \t \v \\`, the literal's own delimiter,
//! `\xHH`, `\ooo` (octal, at most `\377`), `\uXXXX` and `\UXXXXXXXX`.
//! `\x` and octal escapes denote the code point with that value.

use std::str::Chars;
use thiserror::Error;

/// Failure to decode a quoted literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum UnquoteError {
    #[error("not a quoted literal")]
    NotQuoted,
    #[error("unescaped {0:?} inside literal")]
    UnescapedQuote(char),
    #[error("newline in quoted literal")]
    Newline,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("escape sequence ends early")]
    ShortEscape,
    #[error("escape value {0:#x} is not a valid character")]
    InvalidCodePoint(u32),
    #[error("character literal must hold exactly one character")]
    CharLength,
}

/// Decode a quoted literal, delimiters included.
pub fn unquote(literal: &str) -> Result<String, UnquoteError> {
    let mut chars = literal.chars();
    let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
        return Err(UnquoteError::NotQuoted);
    };
    if open != close {
        return Err(UnquoteError::NotQuoted);
    }
    let body = chars.as_str();
    match open {
        '`' => {
            if body.contains('`') {
                return Err(UnquoteError::UnescapedQuote('`'));
            }
            Ok(body.replace('\r', ""))
        }
        '"' => unescape(body, '"'),
        '\'' => {
            let text = unescape(body, '\'')?;
            if text.chars().count() != 1 {
                return Err(UnquoteError::CharLength);
            }
            Ok(text)
        }
        _ => Err(UnquoteError::NotQuoted),
    }
}

fn unescape(body: &str, quote: char) -> Result<String, UnquoteError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(escape(&mut chars, quote)?),
            '\n' => return Err(UnquoteError::Newline),
            c if c == quote => return Err(UnquoteError::UnescapedQuote(c)),
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Decode one escape; the backslash is already consumed.
fn escape(chars: &mut Chars<'_>, quote: char) -> Result<char, UnquoteError> {
    let c = chars.next().ok_or(UnquoteError::ShortEscape)?;
    let decoded = match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0C',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0B',
        '\\' => '\\',
        c if c == quote => c,
        'x' => code_point(chars, 2)?,
        'u' => code_point(chars, 4)?,
        'U' => code_point(chars, 8)?,
        '0'..='7' => {
            let mut value = c.to_digit(8).unwrap_or(0);
            for _ in 0..2 {
                let digit = chars.next().ok_or(UnquoteError::ShortEscape)?;
                value = value * 8 + digit.to_digit(8).ok_or(UnquoteError::InvalidEscape(digit))?;
            }
            if value > 0o377 {
                return Err(UnquoteError::InvalidCodePoint(value));
            }
            char::from_u32(value).ok_or(UnquoteError::InvalidCodePoint(value))?
        }
        other => return Err(UnquoteError::InvalidEscape(other)),
    };
    Ok(decoded)
}

/// Read `digits` hex digits and turn them into a character.
fn code_point(chars: &mut Chars<'_>, digits: usize) -> Result<char, UnquoteError> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let digit = chars.next().ok_or(UnquoteError::ShortEscape)?;
        let nibble = digit.to_digit(16).ok_or(UnquoteError::InvalidEscape(digit))?;
        value = value
            .checked_mul(16)
            .and_then(|v| v.checked_add(nibble))
            .ok_or(UnquoteError::InvalidCodePoint(value))?;
    }
    char::from_u32(value).ok_or(UnquoteError::InvalidCodePoint(value))
}
