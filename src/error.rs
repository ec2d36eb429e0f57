//! Error types for the gauge.

use thiserror::Error;

/// Boxed error returned by a failing mark formatter.
pub type FormatError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or hosting a gauge.
#[derive(Debug, Error)]
pub enum GaugeError {
    /// The configuration cannot describe a gauge (e.g. `from == to`).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The user supplied mark formatter failed while labelling a tick.
    #[error("mark formatter failed for value {value}: {source}")]
    FormatterFailure {
        value: f64,
        #[source]
        source: FormatError,
    },

    /// The options document could not be parsed.
    #[error("malformed options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Font data could not be loaded for text rasterization.
    #[error("font error: {0}")]
    Font(String),

    /// Window or pixel surface setup failed.
    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, GaugeError>;
