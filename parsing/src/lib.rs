//! Text-level parsing shared by `win-user-rights`.
//!
//! Nothing in here touches the operating system: SID strings, principal
//! specifications and LSA string limits are checked purely on their text.
#![cfg_attr(not(feature = "std"), no_std)]

use core::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Only SID revision understood by Windows.
pub const SID_REVISION: u8 = 1;

/// Maximum number of sub-authorities a SID may carry.
pub const MAX_SUBAUTHORITY_COUNT: u8 = 15;

/// Largest byte length of an `LSA_UNICODE_STRING` payload (32 KiB minus the terminator).
pub const LSA_UNICODE_MAX_BYTES: usize = 0x7ffe;

/// Largest value representable by the 6-byte identifier authority.
const MAX_IDENTIFIER_AUTHORITY: u64 = (1 << 48) - 1;

/// Decomposed SID text `S-R-I-S1-S2-...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidComponents {
    /// The SID revision value, always [`SID_REVISION`] once parsed.
    pub revision: u8,
    /// The SID identifier authority value, big-endian.
    pub identifier_authority: [u8; 6],
    /// The SID sub-authority values.
    pub sub_authority: ArrayVec<u32, { MAX_SUBAUTHORITY_COUNT as usize }>,
}

/// Error type returned when parsing a SID string fails due to an invalid format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid format for Sid")]
pub struct InvalidSidFormat;

/// Strict unsigned decimal: ASCII digits only, no sign, no whitespace.
fn parse_decimal<T: FromStr>(s: &str) -> Result<T, InvalidSidFormat> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidSidFormat);
    }
    s.parse::<T>().map_err(|_| InvalidSidFormat)
}

fn parse_authority(s: &str) -> Result<[u8; 6], InvalidSidFormat> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u64::from_str_radix(hex, 16).map_err(|_| InvalidSidFormat)?
        }
        Some(_) => return Err(InvalidSidFormat),
        None => parse_decimal::<u64>(s)?,
    };
    if value > MAX_IDENTIFIER_AUTHORITY {
        return Err(InvalidSidFormat);
    }
    let [_, _, a, b, c, d, e, f] = value.to_be_bytes();
    Ok([a, b, c, d, e, f])
}

impl FromStr for SidComponents {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut s_cmp = s.split('-');
        if !s_cmp
            .next()
            .is_some_and(|head| head.eq_ignore_ascii_case("s"))
        {
            return Err(InvalidSidFormat);
        }
        let revision = parse_decimal::<u8>(s_cmp.next().ok_or(InvalidSidFormat)?)?;
        if revision != SID_REVISION {
            return Err(InvalidSidFormat);
        }
        let identifier_authority = parse_authority(s_cmp.next().ok_or(InvalidSidFormat)?)?;

        let mut sub_authority = ArrayVec::new();
        for item in s_cmp {
            let item = parse_decimal::<u32>(item)?;
            sub_authority.try_push(item).map_err(|_| InvalidSidFormat)?;
        }

        Ok(Self {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}

/// Returns `true` when `s` is shaped like SID text (`S-...`), valid or not.
///
/// Used to tell a malformed SID apart from an account name that simply does
/// not exist.
#[must_use]
pub fn looks_like_sid(s: &str) -> bool {
    s.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("s-"))
}

/// Why a principal specification was rejected before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// The specification is the empty string.
    #[error("principal is empty")]
    Empty,
    /// The specification only contains whitespace.
    #[error("principal is whitespace only")]
    Whitespace,
    /// A control character was found.
    #[error("control character U+{unit:04X} at index {index}")]
    ControlCharacter {
        /// Offending code point.
        unit: u32,
        /// Char index of the offending code point.
        index: usize,
    },
}

/// Validates a principal specification (`DOMAIN\name`, bare name or SID text).
///
/// # Errors
/// See [`PrincipalError`].
pub fn validate_principal(s: &str) -> Result<&str, PrincipalError> {
    if s.is_empty() {
        return Err(PrincipalError::Empty);
    }
    if let Some((index, c)) = s.chars().enumerate().find(|(_, c)| c.is_control()) {
        return Err(PrincipalError::ControlCharacter {
            unit: u32::from(c),
            index,
        });
    }
    if s.chars().all(char::is_whitespace) {
        return Err(PrincipalError::Whitespace);
    }
    Ok(s)
}

/// Why a string cannot be carried in an `LSA_UNICODE_STRING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LsaStringError {
    /// LSA strings passed as arguments must not be empty.
    #[error("LSA string is empty")]
    Empty,
    /// The UTF-16 payload exceeds [`LSA_UNICODE_MAX_BYTES`].
    #[error("LSA string too long: max={max} bytes, actual={actual} bytes")]
    TooLong {
        /// Limit in bytes.
        max: usize,
        /// UTF-16 byte length of the rejected string.
        actual: usize,
    },
}

/// Returns the UTF-16 byte length of `s` if it fits in an `LSA_UNICODE_STRING`.
///
/// # Errors
/// See [`LsaStringError`].
pub fn lsa_byte_len(s: &str) -> Result<u16, LsaStringError> {
    if s.is_empty() {
        return Err(LsaStringError::Empty);
    }
    let actual = s.encode_utf16().count().saturating_mul(2);
    if actual > LSA_UNICODE_MAX_BYTES {
        return Err(LsaStringError::TooLong {
            max: LSA_UNICODE_MAX_BYTES,
            actual,
        });
    }
    u16::try_from(actual).map_err(|_| LsaStringError::TooLong {
        max: LSA_UNICODE_MAX_BYTES,
        actual,
    })
}
