//! Offline QA overlay: draws saved quadrilaterals onto copies of the images.
//!
//! Reads a label file, and for every complete entry whose `frame_id` names
//! an image in the source folder writes a copy of that image with the four
//! edges and the colored corner markers drawn on it. Entries that cannot be
//! drawn are reported and skipped; they never abort the batch.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use thiserror::Error;

use crate::constants::{
    EDGE_COLOR, EDGE_WIDTH, MARKER_COLORS, MARKER_OUTLINE, MARKER_RADIUS, MAX_POINTS,
};
use crate::format::{FormatError, label_file};
use crate::model::{FrameId, Point, QUAD_EDGES};

/// Errors that stop the whole batch.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Label file missing or malformed
    #[error("Failed to load labels from {path:?}: {source}")]
    Labels {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// Source image folder does not exist
    #[error("Image folder {0:?} does not exist")]
    ImageDirMissing(PathBuf),

    /// Output folder could not be created
    #[error("Failed to create output folder {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why an entry was not drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Fewer or more than four points
    Incomplete { points: usize },
    /// Positional id; no image name to look up
    NoFilename,
    /// Id carries directory parts and could resolve outside the folders
    NotPlainFilename,
    /// No such file in the image folder
    ImageMissing,
    /// Image could not be decoded
    Unreadable(String),
    /// A point lies outside the image it labels
    PointOutsideImage { index: usize },
    /// Annotated copy could not be written
    WriteFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Incomplete { points } => {
                write!(f, "has {} points, expected {}", points, MAX_POINTS)
            }
            SkipReason::NoFilename => f.write_str("frame id is not a filename"),
            SkipReason::NotPlainFilename => f.write_str("frame id is not a plain filename"),
            SkipReason::ImageMissing => f.write_str("image not found"),
            SkipReason::Unreadable(e) => write!(f, "could not read image: {}", e),
            SkipReason::PointOutsideImage { index } => {
                write!(f, "point {} lies outside the image", index)
            }
            SkipReason::WriteFailed(e) => write!(f, "could not write output: {}", e),
        }
    }
}

/// Summary of one overlay batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayReport {
    /// Annotated copies written
    pub written: Vec<PathBuf>,
    /// Entries left out, with the reason
    pub skipped: Vec<(FrameId, SkipReason)>,
}

/// Draw every complete label in `labels_path` onto its image from
/// `image_dir`, writing the results under the same names in `output_dir`.
pub fn run_overlay(
    labels_path: &Path,
    image_dir: &Path,
    output_dir: &Path,
) -> Result<OverlayReport, OverlayError> {
    let labels = std::fs::read_to_string(labels_path)
        .map_err(FormatError::from)
        .and_then(|json| label_file::from_json(&json))
        .map_err(|source| OverlayError::Labels {
            path: labels_path.to_path_buf(),
            source,
        })?;

    if !image_dir.is_dir() {
        return Err(OverlayError::ImageDirMissing(image_dir.to_path_buf()));
    }
    std::fs::create_dir_all(output_dir).map_err(|source| OverlayError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    log::info!(
        "Drawing {} label entries from {:?} onto images in {:?}",
        labels.len(),
        labels_path,
        image_dir
    );

    let mut report = OverlayReport::default();
    for label in labels {
        match overlay_one(&label.frame_id, &label.points, image_dir, output_dir) {
            Ok(path) => {
                log::debug!("Wrote {:?}", path);
                report.written.push(path);
            }
            Err(reason) => {
                log::warn!("Skipping {}: {}", label.frame_id, reason);
                report.skipped.push((label.frame_id, reason));
            }
        }
    }

    log::info!(
        "Overlay done: {} written, {} skipped",
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn overlay_one(
    frame_id: &FrameId,
    points: &[Point],
    image_dir: &Path,
    output_dir: &Path,
) -> Result<PathBuf, SkipReason> {
    if points.len() != MAX_POINTS {
        return Err(SkipReason::Incomplete {
            points: points.len(),
        });
    }
    let name = frame_id.as_filename().ok_or(SkipReason::NoFilename)?;
    if !is_plain_filename(name) {
        return Err(SkipReason::NotPlainFilename);
    }

    let source = image_dir.join(name);
    if !source.is_file() {
        return Err(SkipReason::ImageMissing);
    }

    let mut canvas = image::open(&source)
        .map_err(|e| SkipReason::Unreadable(e.to_string()))?
        .to_rgba8();
    let (width, height) = canvas.dimensions();
    if let Some(index) = points
        .iter()
        .position(|p| !inside(p, f64::from(width), f64::from(height)))
    {
        return Err(SkipReason::PointOutsideImage { index });
    }
    draw_quad(&mut canvas, points);

    let target = output_dir.join(name);
    save_like_source(canvas, &target).map_err(|e| SkipReason::WriteFailed(e.to_string()))?;
    Ok(target)
}

/// A single normal path component, so joining it stays inside the folder.
fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part.to_str() == Some(name),
        _ => false,
    }
}

/// Within `[0, width] x [0, height]`, the range the session produces.
fn inside(p: &Point, width: f64, height: f64) -> bool {
    (0.0..=width).contains(&p.x) && (0.0..=height).contains(&p.y)
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Draw the outline then the markers on top.
pub fn draw_quad(canvas: &mut RgbaImage, points: &[Point]) {
    if points.len() == MAX_POINTS {
        for &(a, b) in QUAD_EDGES.iter() {
            draw_thick_segment(canvas, points[a], points[b]);
        }
    }

    let radius = MARKER_RADIUS.round() as i32;
    for (i, p) in points.iter().enumerate() {
        let center = (p.x.round() as i32, p.y.round() as i32);
        draw_filled_circle_mut(canvas, center, radius, rgba(MARKER_COLORS[i % MARKER_COLORS.len()]));
        draw_hollow_circle_mut(canvas, center, radius, rgba(MARKER_OUTLINE));
    }
}

/// `imageproc` segments are one pixel wide; widen by stacking parallel
/// copies across the shallower axis.
fn draw_thick_segment(canvas: &mut RgbaImage, from: Point, to: Point) {
    let horizontal = (to.x - from.x).abs() >= (to.y - from.y).abs();
    for step in 0..EDGE_WIDTH {
        let d = step as f32;
        let (dx, dy) = if horizontal { (0.0, d) } else { (d, 0.0) };
        draw_line_segment_mut(
            canvas,
            (from.x as f32 + dx, from.y as f32 + dy),
            (to.x as f32 + dx, to.y as f32 + dy),
            rgba(EDGE_COLOR),
        );
    }
}

/// JPEG has no alpha channel, so those are written as RGB.
fn save_like_source(canvas: RgbaImage, path: &Path) -> image::ImageResult<()> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false);

    let image = DynamicImage::ImageRgba8(canvas);
    if is_jpeg {
        image.to_rgb8().save(path)
    } else {
        image.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrameLabel;

    fn quad() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
            Point::new(50.0, 40.0),
            Point::new(10.0, 40.0),
        ]
    }

    fn write_labels(dir: &Path, labels: &[FrameLabel]) -> PathBuf {
        let path = dir.join("labels.json");
        std::fs::write(&path, label_file::to_json(labels).unwrap()).unwrap();
        path
    }

    fn write_image(dir: &Path, name: &str) {
        image::RgbImage::from_pixel(64, 48, image::Rgb([0, 0, 0]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_draw_quad_marks_edges_and_corners() {
        let mut canvas = RgbaImage::from_pixel(64, 48, Rgba([0, 0, 0, 255]));
        draw_quad(&mut canvas, &quad());

        // Mid-edge pixel of the top edge
        assert_eq!(*canvas.get_pixel(30, 10), rgba(EDGE_COLOR));
        // Marker fills
        assert_eq!(*canvas.get_pixel(10, 10), rgba(MARKER_COLORS[0]));
        assert_eq!(*canvas.get_pixel(50, 40), rgba(MARKER_COLORS[2]));
        // Untouched interior
        assert_eq!(*canvas.get_pixel(30, 25), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_batch_skips_without_aborting() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let images = temp.path().join("images");
        let out = temp.path().join("out");
        std::fs::create_dir_all(&images).unwrap();
        write_image(&images, "a.png");
        write_image(&images, "b.jpg");

        let labels = write_labels(
            temp.path(),
            &[
                FrameLabel::new(FrameId::Filename("a.png".into()), quad()),
                FrameLabel::new(FrameId::Filename("b.jpg".into()), quad()),
                FrameLabel::new(FrameId::Filename("c.png".into()), quad()),
                FrameLabel::new(FrameId::Filename("a.png".into()), quad()[..2].to_vec()),
                FrameLabel::new(FrameId::Index(0), quad()),
            ],
        );

        let report = run_overlay(&labels, &images, &out).expect("batch should run");

        assert_eq!(report.written, vec![out.join("a.png"), out.join("b.jpg")]);
        let reasons: Vec<&SkipReason> = report.skipped.iter().map(|(_, r)| r).collect();
        assert_eq!(
            reasons,
            vec![
                &SkipReason::ImageMissing,
                &SkipReason::Incomplete { points: 2 },
                &SkipReason::NoFilename,
            ]
        );

        let drawn = image::open(out.join("a.png")).unwrap().to_rgba8();
        assert_eq!(*drawn.get_pixel(10, 10), rgba(MARKER_COLORS[0]));
        // Source left untouched
        let source = image::open(images.join("a.png")).unwrap().to_rgba8();
        assert_eq!(*source.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_missing_inputs_are_hard_errors() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let out = temp.path().join("out");

        let err = run_overlay(&temp.path().join("none.json"), temp.path(), &out).unwrap_err();
        assert!(matches!(err, OverlayError::Labels { .. }));

        let labels = write_labels(temp.path(), &[]);
        let err = run_overlay(&labels, &temp.path().join("nowhere"), &out).unwrap_err();
        assert!(matches!(err, OverlayError::ImageDirMissing(_)));
    }

    #[test]
    fn test_unsafe_entries_are_skipped() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let images = temp.path().join("images");
        let out = temp.path().join("out");
        std::fs::create_dir_all(&images).unwrap();
        write_image(&images, "a.png");
        // Reachable from the image folder through `..`
        write_image(temp.path(), "escape.png");

        let mut far = quad();
        far[2] = Point::new(1e12, 10.0);
        let labels = write_labels(
            temp.path(),
            &[
                FrameLabel::new(FrameId::Filename("../escape.png".into()), quad()),
                FrameLabel::new(FrameId::Filename("a.png".into()), far),
                FrameLabel::new(FrameId::Filename("a.png".into()), quad()),
            ],
        );

        let report = run_overlay(&labels, &images, &out).expect("batch should run");

        assert_eq!(report.written, vec![out.join("a.png")]);
        let reasons: Vec<&SkipReason> = report.skipped.iter().map(|(_, r)| r).collect();
        assert_eq!(
            reasons,
            vec![
                &SkipReason::NotPlainFilename,
                &SkipReason::PointOutsideImage { index: 2 },
            ]
        );
        // Not overwritten by an annotated copy
        let outside = image::open(temp.path().join("escape.png")).unwrap().to_rgba8();
        assert_eq!(*outside.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_plain_filename_check() {
        assert!(is_plain_filename("img_001.png"));
        assert!(!is_plain_filename("../x.png"));
        assert!(!is_plain_filename("sub/x.png"));
        assert!(!is_plain_filename("/abs/x.png"));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename(""));
    }
}
