//! Errors raised while reading, writing or reconciling label files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    /// Label file could not be read or written
    #[error("Label file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Label file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON with the wrong shape
    #[error("Malformed label file: {message}")]
    InvalidFormat { message: String },

    /// An entry lacks `frame_id` or `label`
    #[error("Label entry is missing {field}")]
    MissingField { field: String },

    /// Filename-keyed entry with no image of that name (strict import only)
    #[error("Frame '{frame_id}' has no matching image in the current folder")]
    UnmatchedFrame { frame_id: String },
}

impl FormatError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// `field` names the field and the entry it is missing from.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn unmatched_frame(frame_id: impl Into<String>) -> Self {
        Self::UnmatchedFrame {
            frame_id: frame_id.into(),
        }
    }
}
