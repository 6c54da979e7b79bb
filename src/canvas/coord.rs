//! Fixed-width base-26 coordinate codec
//!
//! A coordinate in `[0, 675]` maps to exactly two uppercase letters:
//! the high digit is `n / 26`, the low digit is `n % 26`.
//!
//! ```text
//!   0 -> "AA"    1 -> "AB"    25 -> "AZ"    26 -> "BA"    675 -> "ZZ"
//! ```

use crate::errors::{PlaceError, Result};

/// Digit symbols, in value order
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of symbols per digit
pub const BASE: u16 = 26;

/// One past the largest encodable coordinate
pub const COORD_LIMIT: u16 = BASE * BASE;

/// Largest encodable coordinate
pub const MAX_COORD: u16 = COORD_LIMIT - 1;

/// Encode a coordinate as two letters.
///
/// Negative values and values `>= 676` are a `RangeError`; the encoding
/// never wraps.
pub fn encode(n: i64) -> Result<String> {
    let value = u16::try_from(n)
        .ok()
        .filter(|v| *v < COORD_LIMIT)
        .ok_or(PlaceError::RangeError {
            value: n,
            limit: COORD_LIMIT,
        })?;

    let mut out = String::with_capacity(2);
    out.push(char::from(ALPHABET[usize::from(value / BASE)]));
    out.push(char::from(ALPHABET[usize::from(value % BASE)]));
    Ok(out)
}

/// Decode two letters back into a coordinate
pub fn decode(s: &str) -> Result<u16> {
    let mut chars = s.chars();
    let (Some(high), Some(low), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(PlaceError::format(format!(
            "encoded coordinate must be 2 characters, got {s:?}"
        )));
    };

    Ok(digit(high)? * BASE + digit(low)?)
}

#[inline]
fn digit(c: char) -> Result<u16> {
    if c.is_ascii_uppercase() {
        Ok(u16::from(c as u8 - b'A'))
    } else {
        Err(PlaceError::format(format!(
            "{c:?} is not a coordinate digit (expected A-Z)"
        )))
    }
}
