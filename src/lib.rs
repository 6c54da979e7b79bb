//! # rplace-painter
//!
//! Renders an image into colored half-block cells and reproduces it on a
//! shared canvas, one text record per cell.
//!
//! - [`canvas`] holds the record format, the coordinate codec, the palette
//!   and the canvas grid.
//! - [`server`] serves the desired image and an optional virtual canvas.
//! - [`painter`] polls the server and submits what is still missing.

pub mod canvas;
pub mod config;
pub mod errors;
pub mod painter;
pub mod server;

pub use canvas::{Canvas, Cell, Palette};
pub use config::Config;
pub use errors::{PlaceError, Result};
pub use painter::Painter;
pub use server::CanvasServer;
