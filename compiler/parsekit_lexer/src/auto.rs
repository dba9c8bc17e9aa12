//! Typed values parsed straight from a lexeme.
//!
//! [`Token::auto`](crate::Token::auto) picks the conversion from the
//! requested type: strings are unquoted, integers are parsed as signed or
//! unsigned decimals, IP addresses in their usual textual forms. Grammars
//! add their own value types by implementing [`FromLexeme`].

use crate::unquote::{unquote, UnquoteError};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::ParseIntError;
use thiserror::Error;

/// Failure to turn a lexeme into a value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("lexeme is not valid UTF-8")]
    Utf8,
    #[error("invalid quoted literal {lexeme:?}: {source}")]
    Unquote {
        lexeme: String,
        #[source]
        source: UnquoteError,
    },
    #[error("invalid integer {lexeme:?}: {source}")]
    Integer {
        lexeme: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid {what} {lexeme:?}: {reason}")]
    Invalid {
        what: &'static str,
        lexeme: String,
        reason: String,
    },
}

impl ValueError {
    /// A conversion failure for a custom value type.
    pub fn invalid(what: &'static str, lexeme: &[u8], reason: impl fmt::Display) -> Self {
        ValueError::Invalid {
            what,
            lexeme: String::from_utf8_lossy(lexeme).into_owned(),
            reason: reason.to_string(),
        }
    }
}

/// A type that can be parsed from raw lexeme bytes.
pub trait FromLexeme: Sized {
    fn from_lexeme(lexeme: &[u8]) -> Result<Self, ValueError>;
}

/// View a lexeme as text.
pub fn lexeme_str(lexeme: &[u8]) -> Result<&str, ValueError> {
    std::str::from_utf8(lexeme).map_err(|_| ValueError::Utf8)
}

impl FromLexeme for String {
    fn from_lexeme(lexeme: &[u8]) -> Result<Self, ValueError> {
        let text = lexeme_str(lexeme)?;
        unquote(text).map_err(|source| ValueError::Unquote {
            lexeme: text.to_owned(),
            source,
        })
    }
}

macro_rules! impl_integer {
    ($($ty:ty)*) => {$(
        impl FromLexeme for $ty {
            fn from_lexeme(lexeme: &[u8]) -> Result<Self, ValueError> {
                let text = lexeme_str(lexeme)?;
                text.parse::<$ty>().map_err(|source| ValueError::Integer {
                    lexeme: text.to_owned(),
                    source,
                })
            }
        }
    )*};
}

impl_integer!(i8 i16 i32 i64 i128 isize u8 u16 u32 u64 u128 usize);

macro_rules! impl_address {
    ($($ty:ty => $what:literal),* $(,)?) => {$(
        impl FromLexeme for $ty {
            fn from_lexeme(lexeme: &[u8]) -> Result<Self, ValueError> {
                let text = lexeme_str(lexeme)?;
                text.parse::<$ty>().map_err(|e| ValueError::invalid($what, lexeme, e))
            }
        }
    )*};
}

impl_address!(
    Ipv4Addr => "IPv4 address",
    Ipv6Addr => "IPv6 address",
    IpAddr => "IP address",
);
