use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while encoding, decoding, or painting canvas cells
#[derive(Error, Debug, Clone)]
pub enum PlaceError {
    /// A coordinate does not fit the two-letter encoding
    #[error("Coordinate {value} is outside the encodable range [0, {limit})")]
    RangeError { value: i64, limit: u16 },

    /// A record or encoded coordinate is malformed
    #[error("Malformed record: {0}")]
    FormatError(Arc<String>),

    /// A decoded cell addresses a slot outside the canvas
    #[error("Cell ({x}, {y}) is outside the {width}x{height} canvas")]
    OutOfBoundsError {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },

    /// A canvas was requested with unusable dimensions
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSizeError { width: u32, height: u32 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(Arc<String>),

    /// Error when loading or decoding a source image
    #[error("Image error for {path}: {message}")]
    ImageError { path: PathBuf, message: Arc<String> },

    /// Network error for HTTP requests
    #[error("Network error: {0}")]
    NetworkError(Arc<String>),

    /// Error when the external paint command fails
    #[error("Command execution failed: {0}")]
    CommandError(Arc<String>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(Arc<std::io::Error>),
}

/// Type alias for Result with PlaceError
pub type Result<T> = std::result::Result<T, PlaceError>;

impl From<std::io::Error> for PlaceError {
    fn from(error: std::io::Error) -> Self {
        PlaceError::IoError(Arc::new(error))
    }
}

impl PlaceError {
    /// Build a `FormatError` from any message
    pub fn format(message: impl Into<String>) -> Self {
        PlaceError::FormatError(Arc::new(message.into()))
    }

    /// Build a `ConfigError` from any message
    pub fn config(message: impl Into<String>) -> Self {
        PlaceError::ConfigError(Arc::new(message.into()))
    }

    /// Build a `NetworkError` from any message
    pub fn network(message: impl Into<String>) -> Self {
        PlaceError::NetworkError(Arc::new(message.into()))
    }

    /// True for errors caused by a bad record rather than by the environment.
    ///
    /// The server answers these with `400` and the painter skips the record.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            PlaceError::RangeError { .. }
                | PlaceError::FormatError(_)
                | PlaceError::OutOfBoundsError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_errors_are_classified() {
        assert!(PlaceError::format("bad").is_protocol_error());
        assert!(PlaceError::RangeError { value: -1, limit: 676 }.is_protocol_error());
        assert!(!PlaceError::network("down").is_protocol_error());
        assert!(!PlaceError::InvalidSizeError { width: 0, height: 1 }.is_protocol_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: PlaceError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().contains("gone"));
    }
}
