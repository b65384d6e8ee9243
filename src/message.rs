//! Session message types.
//!
//! All pointer, keyboard and toolbar events reach the session as a
//! [`Message`] and are processed one at a time by
//! [`AnnotationSession::update`](crate::session::AnnotationSession::update).
//! Operator-facing status comes back as [`Notice`]s.

use std::fmt;
use std::path::PathBuf;

use crate::model::DisplayPos;

/// Messages that can be sent to update session state.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Pointer
    /// Primary button pressed at a viewport position
    PrimaryPress(DisplayPos),
    /// Pointer moved with the primary button held
    PointerMove(DisplayPos),
    /// Primary button released
    PrimaryRelease,
    /// Secondary button clicked (fast save)
    SecondaryClick,

    // Navigation
    /// Navigate to previous image
    PrevImage,
    /// Navigate to next image
    NextImage,

    // Toolbar
    /// Clear the points of the current frame
    ResetFrame,
    /// Save the full label set to an operator-chosen path
    SaveAs(PathBuf),
    /// Import a label file and reconcile it against the current folder
    ImportLabels(PathBuf),
    /// Open an image folder
    OpenFolder(PathBuf),
    /// Toggle carrying the previous frame's points into unsaved frames
    SetCarryPrevious(bool),
    /// Toggle filename-based frame ids
    SetFilenameIds(bool),
    /// Change the autosave directory
    SetOutputDir(Option<PathBuf>),

    // Window
    /// Viewport resized
    Resize { width: f64, height: f64 },
    /// Window closing
    Close,
}

/// Severity level for operator notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational message, not a problem.
    Info,
    /// Something was skipped or dropped.
    Warning,
    /// An operation failed.
    Error,
}

/// A status line for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity level of the notice.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl Notice {
    /// Create a new notice.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Create an info-level notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Create a warning-level notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an error-level notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Emit this notice through the `log` facade.
    pub fn log(&self) {
        match self.severity {
            Severity::Info => log::info!("{}", self.message),
            Severity::Warning => log::warn!("{}", self.message),
            Severity::Error => log::error!("{}", self.message),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
