//! # Canvas - half-block pixel protocol
//!
//! Image pixels are folded two rows at a time into `▀` cells, each cell
//! travels as one text record, and the receiving canvas overwrites the slot
//! the record addresses.
//!
//! ## Architecture
//!
//! ```text
//!    ┌───────────┐   fold    ┌───────────┐  serialize  ┌─────────────────┐
//!    │ RGBA image│ ────────▶ │   Cells   │ ──────────▶ │ "12AB 0 15 ▀"   │
//!    └───────────┘  Palette  └───────────┘    coord    └────────┬────────┘
//!                                                               │ parse
//!                                                               ▼
//!                                                      ┌─────────────────┐
//!                                                      │ Canvas (w × h)  │
//!                                                      └─────────────────┘
//! ```

mod canvas;
mod cell;
mod color;
pub mod coord;
mod halfblock;

pub use canvas::{Canvas, Shade};
pub use cell::{Cell, BLANK_PLACEHOLDER, UPPER_HALF_BLOCK};
pub use color::{Palette, Rgb, ALPHA_THRESHOLD, BLACK, WHITE, XTERM_16};
pub use halfblock::{HalfBlockFolder, RenderedImage};
