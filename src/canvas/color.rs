//! Color types and the shared index palette
//!
//! Both ends of the wire must use the same palette, otherwise an index
//! silently names a different color.

use crate::errors::{PlaceError, Result};

/// Palette index of the neutral "fully lit" color
pub const WHITE: u8 = 15;

/// Palette index of black
pub const BLACK: u8 = 0;

/// Alpha below this counts as transparent
pub const ALPHA_THRESHOLD: u8 = 128;

/// The 16 xterm system colors, in index order
pub const XTERM_16: [Rgb; 16] = [
    Rgb::from_u32(0x000000),
    Rgb::from_u32(0x800000),
    Rgb::from_u32(0x008000),
    Rgb::from_u32(0x808000),
    Rgb::from_u32(0x000080),
    Rgb::from_u32(0x800080),
    Rgb::from_u32(0x008080),
    Rgb::from_u32(0xC0C0C0),
    Rgb::from_u32(0x808080),
    Rgb::from_u32(0xFF0000),
    Rgb::from_u32(0x00FF00),
    Rgb::from_u32(0xFFFF00),
    Rgb::from_u32(0x0000FF),
    Rgb::from_u32(0xFF00FF),
    Rgb::from_u32(0x00FFFF),
    Rgb::from_u32(0xFFFFFF),
];

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from a packed hex value (e.g., 0xFF0000 for red)
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| PlaceError::config(format!("{hex:?} is not a #rrggbb color")))?;
        let packed = u32::from_str_radix(digits, 16)
            .map_err(|e| PlaceError::config(format!("{hex:?}: {e}")))?;
        Ok(Self::from_u32(packed))
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Squared Euclidean distance to another color
    #[inline]
    pub fn distance_sq(&self, other: &Rgb) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db).unsigned_abs()
    }
}

/// Fixed index <-> color table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: XTERM_16.to_vec(),
        }
    }
}

impl Palette {
    /// Build a palette from `#rrggbb` strings, index = position
    pub fn new<S: AsRef<str>>(hexes: &[S]) -> Result<Self> {
        if hexes.is_empty() || hexes.len() > 256 {
            return Err(PlaceError::config(format!(
                "palette must hold 1 to 256 colors, got {}",
                hexes.len()
            )));
        }
        let colors = hexes
            .iter()
            .map(|h| Rgb::from_hex(h.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`
    pub fn color(&self, index: u8) -> Option<Rgb> {
        self.colors.get(usize::from(index)).copied()
    }

    /// Hex string of the color at `index`
    pub fn hex(&self, index: u8) -> Option<String> {
        self.color(index).map(|c| c.to_hex())
    }

    /// Exact lookup of a `#rrggbb` string
    pub fn index_of_hex(&self, hex: &str) -> Option<u8> {
        let wanted = Rgb::from_hex(hex).ok()?;
        self.colors
            .iter()
            .position(|c| *c == wanted)
            .and_then(|i| u8::try_from(i).ok())
    }

    /// Index of the closest color; ties go to the lower index
    pub fn nearest(&self, color: Rgb) -> u8 {
        let best = self
            .colors
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.distance_sq(&color), *i))
            .map_or(0, |(i, _)| i);
        u8::try_from(best).unwrap_or(u8::MAX)
    }

    /// Quantize a `#rrggbb` string
    pub fn quantize_hex(&self, hex: &str) -> Result<u8> {
        Ok(self.nearest(Rgb::from_hex(hex)?))
    }

    /// Quantize one RGBA pixel; transparent pixels become `WHITE`
    pub fn quantize_rgba(&self, [r, g, b, a]: [u8; 4]) -> u8 {
        if a < ALPHA_THRESHOLD {
            WHITE
        } else {
            self.nearest(Rgb::new(r, g, b))
        }
    }
}
