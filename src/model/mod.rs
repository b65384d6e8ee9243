//! Data models for quadlabel.

mod edit;
mod label;
mod point;

pub use edit::EditState;
pub use label::{FrameId, FrameIdMode, FrameLabel, QUAD_EDGES};
pub use point::{DisplayPos, Point};
