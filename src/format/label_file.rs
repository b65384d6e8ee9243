//! The persisted label file.
//!
//! A label file is a JSON array with one object per image position:
//!
//! ```json
//! [
//!   { "frame_id": "img_000.png", "label": [[200.0, 200.0], [1400.0, 200.0], [1400.0, 1000.0], [200.0, 1000.0]] },
//!   { "frame_id": "img_001.png", "label": [] }
//! ]
//! ```
//!
//! `frame_id` is either a filename string or an integer position. Points are
//! `[x, y]` pairs of non-negative original-image pixels. Parsing fails fast
//! on structural problems instead of coercing them.

use serde::Deserialize;

use crate::constants::MAX_POINTS;
use crate::format::error::FormatError;
use crate::model::{FrameId, FrameLabel, Point};

/// Entry as it appears on disk, before validation.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    frame_id: Option<FrameId>,
    #[serde(default)]
    label: Option<Vec<Point>>,
}

/// Serialize labels to the pretty-printed label file form.
pub fn to_json(labels: &[FrameLabel]) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(labels)?)
}

/// Parse and validate a label file.
pub fn from_json(json: &str) -> Result<Vec<FrameLabel>, FormatError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(FormatError::invalid_format(
            "label file must contain a JSON array of frame entries",
        ));
    }

    let raw: Vec<RawEntry> = serde_json::from_value(value)?;
    let mut labels = Vec::with_capacity(raw.len());

    for (i, entry) in raw.into_iter().enumerate() {
        let frame_id = entry
            .frame_id
            .ok_or_else(|| FormatError::missing_field(format!("frame_id (entry {})", i)))?;
        let points = entry
            .label
            .ok_or_else(|| FormatError::missing_field(format!("label (entry {})", i)))?;

        if points.len() > MAX_POINTS {
            return Err(FormatError::invalid_format(format!(
                "entry {} ({}) has {} points, at most {} allowed",
                i,
                frame_id,
                points.len(),
                MAX_POINTS
            )));
        }

        if let Some((j, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| p.x < 0.0 || p.y < 0.0)
        {
            return Err(FormatError::invalid_format(format!(
                "entry {} ({}) point {} has negative coordinates ({}, {})",
                i, frame_id, j, p.x, p.y
            )));
        }

        labels.push(FrameLabel::new(frame_id, points));
    }

    log::debug!("Parsed label file with {} entries", labels.len());
    Ok(labels)
}
