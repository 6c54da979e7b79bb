//! Configuration for the canvas server and the painter
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file,
//! `RPLACE_*` environment variables, and command-line flags (applied by the
//! binary).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{Palette, WHITE};
use crate::errors::{PlaceError, Result};

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT: u64 = 30;
const DEFAULT_PIXEL_DELAY_MS: u64 = 1000;
const DEFAULT_IDLE_DELAY_MS: u64 = 5000;
const DEFAULT_POLL_DELAY_MS: u64 = 1000;

const ERR_BIND_EMPTY: &str = "server.bind cannot be empty";
const ERR_URL_SCHEME: &str = "painter.url must start with http:// or https://";
const ERR_TIMEOUT_RANGE: &str = "painter.timeout_seconds must be between 1 and 300";
const ERR_PROGRAM_EMPTY: &str = "painter.submit.program cannot be empty";
const ERR_PALETTE_WHITE: &str = "palette must define index 15 (white) and so needs at least 16 colors";

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub painter: PainterConfig,
    /// Optional `#rrggbb` palette replacing the xterm 16 colors
    pub palette: Option<Vec<String>>,
}

/// Snapshot server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// Image to serve as the desired snapshot
    pub image: Option<PathBuf>,
    /// Horizontal placement of the image on the canvas
    pub x_offset: u16,
    /// Vertical placement of the image on the canvas, in cells
    pub y_offset: u16,
    /// Keep an in-memory canvas that accepts `/put`
    pub virtual_canvas: bool,
    /// Log the debug board after every accepted put
    pub render_board: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            image: None,
            x_offset: 0,
            y_offset: 0,
            virtual_canvas: true,
            render_board: false,
        }
    }
}

/// How the painter delivers a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SubmitMode {
    /// `GET {url}/put?pixel=<record>`
    #[default]
    Http,
    /// Run `program args.. <record tokens..>`
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Painter loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    /// Base URL of the snapshot server
    pub url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Pause between two submissions
    pub pixel_delay_ms: u64,
    /// Extra pause after a cycle that had nothing to paint
    pub idle_delay_ms: u64,
    /// Pause between two cycles
    pub poll_delay_ms: u64,
    pub submit: SubmitMode,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT,
            pixel_delay_ms: DEFAULT_PIXEL_DELAY_MS,
            idle_delay_ms: DEFAULT_IDLE_DELAY_MS,
            poll_delay_ms: DEFAULT_POLL_DELAY_MS,
            submit: SubmitMode::Http,
        }
    }
}

impl PainterConfig {
    pub fn pixel_delay(&self) -> Duration {
        Duration::from_millis(self.pixel_delay_ms)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PlaceError::config(format!("Invalid TOML: {e}")))
    }

    /// Load a TOML file; `~` is expanded
    pub fn load(path: &Path) -> Result<Self> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        debug!("Loading config from {}", expanded.display());
        let text = std::fs::read_to_string(&expanded).map_err(|e| {
            PlaceError::config(format!("Cannot read {}: {e}", expanded.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` if given, otherwise defaults, then apply the environment
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Override values with environment variables if present
    pub fn apply_env(&mut self) {
        if let Ok(bind) = env::var("RPLACE_BIND") {
            self.server.bind = bind;
        }

        if let Ok(image) = env::var("RPLACE_IMAGE") {
            self.server.image = Some(PathBuf::from(image));
        }

        if let Ok(url) = env::var("RPLACE_URL") {
            self.painter.url = url;
        }

        if let Ok(timeout) = env::var("RPLACE_TIMEOUT_SECONDS") {
            self.painter.timeout_seconds = timeout.parse().unwrap_or(self.painter.timeout_seconds);
        }
    }

    /// The palette shared by both ends of the wire
    pub fn palette(&self) -> Result<Palette> {
        match &self.palette {
            Some(hexes) => {
                if hexes.len() <= usize::from(WHITE) {
                    return Err(PlaceError::config(ERR_PALETTE_WHITE));
                }
                Palette::new(hexes.as_slice())
            }
            None => Ok(Palette::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            return Err(PlaceError::config(ERR_BIND_EMPTY));
        }

        if !(self.painter.url.starts_with("http://") || self.painter.url.starts_with("https://")) {
            return Err(PlaceError::config(ERR_URL_SCHEME));
        }

        if self.painter.timeout_seconds == 0 || self.painter.timeout_seconds > 300 {
            return Err(PlaceError::config(ERR_TIMEOUT_RANGE));
        }

        if let SubmitMode::Command { program, .. } = &self.painter.submit {
            if program.trim().is_empty() {
                return Err(PlaceError::config(ERR_PROGRAM_EMPTY));
            }
        }

        self.palette()?;
        Ok(())
    }
}
