//! Error types for the preview engine.

use crate::{FontId, ValueKey};

/// Result type for preview controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller.
///
/// Parse and load failures are not listed here: they degrade the affected
/// font instead of failing the operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No font with this id exists in the catalog.
    #[error("Unknown font id {0}")]
    UnknownFont(FontId),

    /// No active control matches this key.
    #[error("No active control for {0}")]
    UnknownControl(ValueKey),

    /// A control was given NaN or an infinity.
    #[error("Value {value} for {key} is not a finite number")]
    InvalidValue { key: ValueKey, value: f64 },

    /// An uploaded file could not be read.
    #[error("Failed to read uploaded font '{file_name}': {reason}")]
    UnreadableUpload { file_name: String, reason: String },

    /// The configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
