//! Error types for wave packet evaluation and its output collaborators

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    /// Rejected input to the field engine: non-positive constants, an empty
    /// emitter set, a degenerate grid or an out-of-range detector row.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl FieldError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        FieldError::InvalidParameter(msg.into())
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, FieldError::InvalidParameter(_))
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;
