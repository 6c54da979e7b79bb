//! Fixed-size grid of cells, the authoritative canvas state

use super::cell::Cell;
use super::color::WHITE;
use super::coord::COORD_LIMIT;
use crate::errors::{PlaceError, Result};

/// How much of a cell is lit, judged only by whether its colors are `WHITE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// Both halves white
    Lit,
    /// Background white, top half colored
    LowerLit,
    /// Foreground white, bottom half colored
    UpperLit,
    /// Neither half white
    Unlit,
}

impl Shade {
    pub fn of(cell: &Cell) -> Self {
        match (cell.bg() == WHITE, cell.fg() == WHITE) {
            (true, true) => Shade::Lit,
            (true, false) => Shade::LowerLit,
            (false, true) => Shade::UpperLit,
            (false, false) => Shade::Unlit,
        }
    }

    /// Presentation glyph for the debug board
    pub fn glyph(self) -> char {
        match self {
            Shade::Lit => '█',
            Shade::LowerLit => '▄',
            Shade::UpperLit => '▀',
            Shade::Unlit => ' ',
        }
    }
}

/// Canvas of `width × height` cells stored row-major
///
/// The grid never resizes, and every slot always holds exactly one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    /// Create a canvas filled with fully lit cells.
    ///
    /// `height` is bounded by the encoded axis (676 rows).
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let invalid = PlaceError::InvalidSizeError { width, height };
        if width == 0 || height == 0 || height > u32::from(COORD_LIMIT) {
            return Err(invalid);
        }
        let w = u16::try_from(width).map_err(|_| invalid.clone())?;
        let h = u16::try_from(height).map_err(|_| invalid)?;

        let size = usize::from(w) * usize::from(h);
        let cells = (0..size)
            .map(|i| {
                // i < w * h, so both quotients fit in u16
                let x = (i % usize::from(w)) as u16;
                let y = (i / usize::from(w)) as u16;
                Cell::blank(x, y)
            })
            .collect();

        Ok(Self {
            width: w,
            height: h,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at coordinates
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Parse a wire record and write it to its slot.
    ///
    /// On error nothing is modified.
    pub fn apply(&mut self, line: &str) -> Result<()> {
        let cell = Cell::parse(line)?;
        self.apply_cell(cell)
    }

    /// Replace the slot addressed by `cell` (last write wins)
    pub fn apply_cell(&mut self, cell: Cell) -> Result<()> {
        let index = self
            .index(cell.x(), cell.y())
            .ok_or(PlaceError::OutOfBoundsError {
                x: cell.x(),
                y: cell.y(),
                width: self.width,
                height: self.height,
            })?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Every cell serialized, row-major
    pub fn snapshot(&self) -> Result<Vec<String>> {
        self.cells.iter().map(Cell::serialize).collect()
    }

    /// Debug board: one shade glyph per cell, one line per row
    pub fn render(&self) -> String {
        let mut out =
            String::with_capacity((usize::from(self.width) * 3 + 1) * usize::from(self.height));
        for row in self.cells.chunks(usize::from(self.width)) {
            out.extend(row.iter().map(|c| Shade::of(c).glyph()));
            out.push('\n');
        }
        out
    }
}
