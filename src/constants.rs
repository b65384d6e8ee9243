//! Global constants for the quadlabel engine

/// Number of corner points in a complete quadrilateral label
pub const MAX_POINTS: usize = 4;

/// Radius of a drawn point marker, in display pixels on screen and in image
/// pixels on overlay copies
pub const MARKER_RADIUS: f64 = 5.0;

/// Default grab radius in display pixels.
///
/// A click grabs an existing point when it lands within twice this radius
/// (measured after scaling the image-space distance to the display).
pub const DEFAULT_HIT_RADIUS: f64 = MARKER_RADIUS;

/// Filename written into the configured output directory on autosave
pub const AUTOSAVE_FILENAME: &str = "labels.json";

/// Supported image extensions (lowercase, without dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Marker colors by point index: red, green, blue, yellow
pub const MARKER_COLORS: [[u8; 3]; MAX_POINTS] =
    [[255, 0, 0], [0, 128, 0], [0, 0, 255], [255, 255, 0]];

/// Marker outline color
pub const MARKER_OUTLINE: [u8; 3] = [255, 255, 255];

/// Quadrilateral edge color (#FF69B4)
pub const EDGE_COLOR: [u8; 3] = [0xFF, 0x69, 0xB4];

/// Edge stroke width in pixels
pub const EDGE_WIDTH: u32 = 2;

/// Horizontal gap between a marker and its index text
pub const MARKER_TEXT_GAP: f64 = 5.0;
