// Typed errors with thiserror. Converted to JsValue strings at the WASM boundary.

use thiserror::Error;

/// Viewer error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to preload frame {frame}: {reason}")]
    PreloadFailed { frame: String, reason: String },

    #[error("Viewer is not ready")]
    NotReady,

    #[error("Viewer has been destroyed")]
    Destroyed,

    #[error("Frame index {index} out of range for {len} frames")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid animation duration: {0}ms")]
    InvalidDuration(f64),

    #[error("Invalid easing: {0}")]
    InvalidEasing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Serialization(err.to_string())
    }
}
