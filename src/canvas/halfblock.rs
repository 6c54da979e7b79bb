//! `HalfBlock` folding - turns an RGBA image into canvas cells
//!
//! Each cell covers 2 vertical source pixels through `▀`:
//! - Top pixel = foreground color
//! - Bottom pixel = background color
//!
//! An odd final row gets a `WHITE` bottom half.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info, instrument};

use super::cell::Cell;
use super::color::{Palette, WHITE};
use super::coord::COORD_LIMIT;
use crate::errors::{PlaceError, Result};

/// Cells produced from one source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// Width in cells (= source width in pixels)
    pub width: u16,
    /// Height in cells (= source height / 2, rounded up)
    pub rows: u16,
    /// Row-major cells
    pub cells: Vec<Cell>,
}

impl RenderedImage {
    /// Cells moved by `(dx, dy)`, e.g. to place the image on a larger canvas
    pub fn offset(&self, dx: u16, dy: u16) -> Result<Vec<Cell>> {
        self.cells.iter().map(|c| c.translated(dx, dy)).collect()
    }

    /// Serialized records of the cells moved by `(dx, dy)`
    pub fn records(&self, dx: u16, dy: u16) -> Result<Vec<String>> {
        self.offset(dx, dy)?.iter().map(Cell::serialize).collect()
    }
}

/// Half-block folder
#[derive(Debug, Clone, Default)]
pub struct HalfBlockFolder {
    palette: Palette,
}

impl HalfBlockFolder {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Fold a decoded image into cells
    pub fn fold(&self, image: &RgbaImage) -> Result<RenderedImage> {
        let (width, height) = image.dimensions();
        let rows = height.div_ceil(2);
        let size_error = || PlaceError::InvalidSizeError { width, height: rows };

        let w = u16::try_from(width).map_err(|_| size_error())?;
        let r = u16::try_from(rows)
            .ok()
            .filter(|r| *r <= COORD_LIMIT)
            .ok_or_else(size_error)?;

        let mut cells = Vec::with_capacity(usize::from(w) * usize::from(r));
        for row in 0..r {
            let top_y = u32::from(row) * 2;
            for x in 0..w {
                let fg = self.palette.quantize_rgba(image.get_pixel(u32::from(x), top_y).0);
                let bg = if top_y + 1 < height {
                    self.palette
                        .quantize_rgba(image.get_pixel(u32::from(x), top_y + 1).0)
                } else {
                    WHITE
                };
                cells.push(Cell::half_block(x, row, bg, fg));
            }
        }

        Ok(RenderedImage {
            width: w,
            rows: r,
            cells,
        })
    }

    /// Decode an image file and fold it
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, path: &Path) -> Result<RenderedImage> {
        debug!("Reading image: {}", path.display());

        if !path.is_file() {
            return Err(image_error(path, "File does not exist or is not a file"));
        }

        let decoded = image::open(path)
            .map_err(|e| image_error(path, &format!("Error decoding image: {e}")))?
            .to_rgba8();

        let rendered = self.fold(&decoded)?;
        info!(
            "Loaded {} as {}x{} cells",
            path.display(),
            rendered.width,
            rendered.rows
        );
        Ok(rendered)
    }
}

fn image_error(path: &Path, message: &str) -> PlaceError {
    PlaceError::ImageError {
        path: PathBuf::from(path),
        message: Arc::new(message.to_string()),
    }
}
