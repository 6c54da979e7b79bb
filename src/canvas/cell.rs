//! Canvas cell and its single-line wire record
//!
//! Record layout, four single-space separated tokens:
//!
//! ```text
//!   <x decimal><y encoded> <bg> <fg> <glyph>
//!   12AB 0 15 ▀            -> x = 12, y = 1, bg = 0, fg = 15, glyph '▀'
//!   3AA 15 15 _            -> blank glyph travels as the `_` placeholder
//! ```
//!
//! The vertical axis is always the encoded one, so the trailing two
//! characters of the first token are a fixed-width field.

use std::fmt;
use std::str::FromStr;

use super::color::WHITE;
use super::coord;
use crate::errors::{PlaceError, Result};

/// Upper half block: top pixel = `fg`, bottom pixel = `bg`
pub const UPPER_HALF_BLOCK: char = '▀';

/// Wire token standing in for a blank glyph
pub const BLANK_PLACEHOLDER: &str = "_";

/// One grid unit: position, colors, glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    x: u16,
    y: u16,
    bg: u8,
    fg: u8,
    glyph: char,
}

impl Cell {
    /// Background-only cell (blank glyph)
    pub const fn new(x: u16, y: u16, bg: u8, fg: u8) -> Self {
        Self {
            x,
            y,
            bg,
            fg,
            glyph: ' ',
        }
    }

    /// Cell showing two stacked pixels through the upper half block
    pub const fn half_block(x: u16, y: u16, bg: u8, fg: u8) -> Self {
        Self {
            x,
            y,
            bg,
            fg,
            glyph: UPPER_HALF_BLOCK,
        }
    }

    /// Fully lit neutral cell used to fill a fresh canvas
    pub const fn blank(x: u16, y: u16) -> Self {
        Self::new(x, y, WHITE, WHITE)
    }

    /// Cell with an explicit glyph.
    ///
    /// The glyph must survive a round trip through the record format, so
    /// control characters, whitespace other than `' '` and the `_`
    /// placeholder are rejected.
    pub fn with_glyph(x: u16, y: u16, bg: u8, fg: u8, glyph: char) -> Result<Self> {
        validate_glyph(glyph)?;
        Ok(Self {
            x,
            y,
            bg,
            fg,
            glyph,
        })
    }

    #[inline]
    pub fn x(&self) -> u16 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> u16 {
        self.y
    }

    #[inline]
    pub fn bg(&self) -> u8 {
        self.bg
    }

    #[inline]
    pub fn fg(&self) -> u8 {
        self.fg
    }

    #[inline]
    pub fn glyph(&self) -> char {
        self.glyph
    }

    /// Same colors and glyph, ignoring position
    pub fn same_look(&self, other: &Cell) -> bool {
        self.bg == other.bg && self.fg == other.fg && self.glyph == other.glyph
    }

    /// Copy of this cell moved by `(dx, dy)`
    pub fn translated(&self, dx: u16, dy: u16) -> Result<Self> {
        let x = self.x.checked_add(dx).ok_or(PlaceError::RangeError {
            value: i64::from(self.x) + i64::from(dx),
            limit: u16::MAX,
        })?;
        let y = self
            .y
            .checked_add(dy)
            .filter(|y| *y <= coord::MAX_COORD)
            .ok_or(PlaceError::RangeError {
                value: i64::from(self.y) + i64::from(dy),
                limit: coord::COORD_LIMIT,
            })?;
        Ok(Self { x, y, ..*self })
    }

    /// Serialize into the single-line wire record
    pub fn serialize(&self) -> Result<String> {
        let y = coord::encode(i64::from(self.y))?;
        Ok(format!(
            "{}{} {} {} {}",
            self.x,
            y,
            self.bg,
            self.fg,
            glyph_token(self.glyph)
        ))
    }

    /// Parse a wire record
    pub fn parse(line: &str) -> Result<Self> {
        let tokens: Vec<&str> = line.split(' ').collect();
        let [position, bg, fg, glyph] = tokens.as_slice() else {
            return Err(PlaceError::format(format!(
                "expected 4 space-separated fields, got {} in {line:?}",
                tokens.len()
            )));
        };

        let (x, y) = parse_position(position)?;
        let bg = parse_index("bg", bg)?;
        let fg = parse_index("fg", fg)?;
        let glyph = parse_glyph(glyph)?;

        Ok(Self { x, y, bg, fg, glyph })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serialize() {
            Ok(record) => f.write_str(&record),
            Err(_) => write!(f, "<unencodable cell at ({}, {})>", self.x, self.y),
        }
    }
}

impl FromStr for Cell {
    type Err = PlaceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn glyph_token(glyph: char) -> String {
    if glyph == ' ' {
        BLANK_PLACEHOLDER.to_string()
    } else {
        glyph.to_string()
    }
}

fn validate_glyph(glyph: char) -> Result<()> {
    if glyph.is_control() || (glyph.is_whitespace() && glyph != ' ') {
        return Err(PlaceError::format(format!(
            "glyph {glyph:?} cannot be carried in a record"
        )));
    }
    if glyph.to_string() == BLANK_PLACEHOLDER {
        return Err(PlaceError::format(format!(
            "glyph {glyph:?} is reserved for blank cells"
        )));
    }
    Ok(())
}

fn parse_position(token: &str) -> Result<(u16, u16)> {
    // Byte offset of the second-to-last char; the encoded field is 2 chars
    let split = token
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| i)
        .filter(|i| *i > 0)
        .ok_or_else(|| {
            PlaceError::format(format!(
                "position {token:?} needs a decimal x followed by 2 letters"
            ))
        })?;

    let (x, y) = token.split_at(split);
    if !x.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlaceError::format(format!("x {x:?} is not a decimal number")));
    }
    let x = x
        .parse::<u16>()
        .map_err(|e| PlaceError::format(format!("x {x:?}: {e}")))?;
    let y = coord::decode(y)?;
    Ok((x, y))
}

/// Color indices are `u8` because a palette holds at most 256 colors, so an
/// integer like `300` or `-3` is a format error rather than a wrapped index.
fn parse_index(field: &str, token: &str) -> Result<u8> {
    token
        .parse::<u8>()
        .map_err(|e| PlaceError::format(format!("{field} {token:?}: {e}")))
}

fn parse_glyph(token: &str) -> Result<char> {
    if token == BLANK_PLACEHOLDER {
        return Ok(' ');
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(glyph), None) => {
            validate_glyph(glyph)?;
            Ok(glyph)
        }
        _ => Err(PlaceError::format(format!(
            "glyph {token:?} must be a single character"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_layout() {
        let cell = Cell::with_glyph(2, 1, 3, 7, 'x').unwrap();
        assert_eq!(cell.serialize().unwrap(), "2AB 3 7 x");

        let cell = Cell::half_block(12, 27, 0, 15);
        assert_eq!(cell.serialize().unwrap(), "12BB 0 15 ▀");
    }

    #[test]
    fn test_blank_glyph_uses_placeholder() {
        let cell = Cell::blank(3, 0);
        let record = cell.serialize().unwrap();
        assert_eq!(record, "3AA 15 15 _");
        assert_eq!(record.split(' ').count(), 4);
        assert_eq!(Cell::parse(&record).unwrap(), cell);
    }

    #[test]
    fn test_round_trip() {
        let cells = [
            Cell::new(0, 0, 0, 0),
            Cell::half_block(675, 675, 255, 1),
            Cell::with_glyph(40, 300, 9, 4, '#').unwrap(),
            Cell::with_glyph(1, 2, 3, 4, 'é').unwrap(),
        ];
        for cell in cells {
            let record = cell.serialize().unwrap();
            assert_eq!(Cell::parse(&record).unwrap(), cell, "record {record:?}");
            assert_eq!(record.parse::<Cell>().unwrap(), cell);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "garbage",
            "",
            "2AB 3 7",
            "2AB 3 7 x extra",
            "2AB  3 7 x",
            "AB 3 7 x",
            "2A1 3 7 x",
            "-2AB 3 7 x",
            "2AB -3 7 x",
            "2AB 300 7 x",
            "2AB 3 256 x",
            "2AB 3 7 xy",
            "2AB 3 7 \t",
            "99999AB 3 7 x",
        ] {
            assert!(
                matches!(Cell::parse(bad), Err(PlaceError::FormatError(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_with_glyph_rejects_reserved() {
        assert!(Cell::with_glyph(0, 0, 0, 0, '_').is_err());
        assert!(Cell::with_glyph(0, 0, 0, 0, '\n').is_err());
        assert!(Cell::with_glyph(0, 0, 0, 0, ' ').is_ok());
    }

    #[test]
    fn test_serialize_rejects_unencodable_y() {
        let cell = Cell::new(0, 676, 0, 0);
        assert!(matches!(cell.serialize(), Err(PlaceError::RangeError { .. })));
    }

    #[test]
    fn test_translated() {
        let cell = Cell::half_block(1, 2, 3, 4);
        let moved = cell.translated(10, 5).unwrap();
        assert_eq!((moved.x(), moved.y()), (11, 7));
        assert!(moved.same_look(&cell));
        assert!(cell.translated(0, 700).is_err());
    }
}
