//! Per-frame label types and frame identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Point;

/// Polygon edges of a complete quadrilateral, by point index.
///
/// Point order defines the outline; edits never reorder points.
pub const QUAD_EDGES: [(usize, usize); 4] = [(0, 1), (1, 2), (2, 3), (3, 0)];

/// Identifier stamped on each stored frame label.
///
/// Which variant is produced is decided by the active [`FrameIdMode`],
/// never by the shape of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameId {
    /// Positional index of the image in the sequence.
    Index(usize),
    /// Image filename.
    Filename(String),
}

impl FrameId {
    /// The filename, if this id is filename-keyed.
    pub fn as_filename(&self) -> Option<&str> {
        match self {
            FrameId::Filename(name) => Some(name),
            FrameId::Index(_) => None,
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Index(i) => write!(f, "{}", i),
            FrameId::Filename(name) => f.write_str(name),
        }
    }
}

/// How new label entries are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameIdMode {
    /// Use the positional index.
    #[default]
    Index,
    /// Use the image filename.
    Filename,
}

impl FrameIdMode {
    /// Stamp the id for the frame at `index` of `images`.
    ///
    /// In filename mode an index past the end of `images` falls back to
    /// the positional id, since there is no filename to use.
    pub fn frame_id(self, index: usize, images: &[String]) -> FrameId {
        match self {
            FrameIdMode::Index => FrameId::Index(index),
            FrameIdMode::Filename => match images.get(index) {
                Some(name) => FrameId::Filename(name.clone()),
                None => {
                    log::warn!(
                        "No image at position {} to stamp a filename id, using index",
                        index
                    );
                    FrameId::Index(index)
                }
            },
        }
    }

    /// Whether filenames are used as ids.
    pub fn is_filename(self) -> bool {
        matches!(self, FrameIdMode::Filename)
    }
}

/// The stored quadrilateral (or empty) annotation for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLabel {
    pub frame_id: FrameId,
    #[serde(rename = "label")]
    pub points: Vec<Point>,
}

impl FrameLabel {
    pub fn new(frame_id: FrameId, points: Vec<Point>) -> Self {
        Self { frame_id, points }
    }

    /// A label with no points.
    pub fn empty(frame_id: FrameId) -> Self {
        Self::new(frame_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
