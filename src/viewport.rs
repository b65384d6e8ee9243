//! Fit-to-viewport coordinate mapping.
//!
//! Maps between original-image pixel coordinates and viewport display
//! coordinates for an image scaled uniformly to fit the viewport and
//! centered in it. Extracted from the session for testability.

use crate::model::{DisplayPos, Point};

/// Uniform scale plus centering offset for the image currently shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    viewport_width: f64,
    viewport_height: f64,
    image_width: f64,
    image_height: f64,
}

impl CoordinateMapper {
    /// Create an unfitted mapper (scale 1, no offset, empty image).
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
            image_width: 0.0,
            image_height: 0.0,
        }
    }

    /// Fit an image into a viewport.
    ///
    /// Returns false (and leaves the previous transform in place) when any
    /// dimension is not positive, e.g. before the viewport has been laid out.
    pub fn fit(
        &mut self,
        viewport_width: f64,
        viewport_height: f64,
        image_width: f64,
        image_height: f64,
    ) -> bool {
        self.viewport_width = viewport_width;
        self.viewport_height = viewport_height;
        self.image_width = image_width;
        self.image_height = image_height;
        self.refit()
    }

    /// Update the viewport size, keeping the current image.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> bool {
        self.viewport_width = width;
        self.viewport_height = height;
        self.refit()
    }

    /// Update the image size, keeping the current viewport.
    pub fn set_image(&mut self, width: f64, height: f64) -> bool {
        self.image_width = width;
        self.image_height = height;
        self.refit()
    }

    fn refit(&mut self) -> bool {
        let dims = [
            self.viewport_width,
            self.viewport_height,
            self.image_width,
            self.image_height,
        ];
        if !dims.iter().all(|d| d.is_finite() && *d > 0.0) {
            log::debug!(
                "Mapper not fitted: viewport {}x{}, image {}x{}",
                self.viewport_width,
                self.viewport_height,
                self.image_width,
                self.image_height
            );
            return false;
        }

        self.scale = (self.viewport_width / self.image_width)
            .min(self.viewport_height / self.image_height);
        let (display_width, display_height) = self.display_size();
        // An odd leftover centers on a half pixel
        self.offset_x = (self.viewport_width - display_width) / 2.0;
        self.offset_y = (self.viewport_height - display_height) / 2.0;

        log::trace!(
            "Mapper fitted: scale={:.4}, offset=({}, {})",
            self.scale,
            self.offset_x,
            self.offset_y
        );
        true
    }

    /// Uniform image-to-display scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Top-left corner of the drawn image in the viewport.
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Size of the drawn image in display pixels.
    pub fn display_size(&self) -> (f64, f64) {
        (
            (self.image_width * self.scale).round(),
            (self.image_height * self.scale).round(),
        )
    }

    /// Original image size.
    pub fn image_size(&self) -> (f64, f64) {
        (self.image_width, self.image_height)
    }

    /// Map an image-space point to display space.
    pub fn to_display(&self, p: Point) -> DisplayPos {
        DisplayPos::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }

    /// Map a display position to image space, clamped to the image bounds.
    ///
    /// Pointer positions outside the drawn image still yield an
    /// addressable point on the image border.
    pub fn to_original(&self, d: DisplayPos) -> Point {
        let x = (d.x - self.offset_x) / self.scale;
        let y = (d.y - self.offset_y) / self.scale;
        Point::new(
            x.clamp(0.0, self.image_width.max(0.0)),
            y.clamp(0.0, self.image_height.max(0.0)),
        )
    }

    /// Whether `candidate` is close enough to `target` to grab it.
    ///
    /// The image-space distance is scaled to display pixels and compared
    /// against twice the marker radius, so the grab area follows the zoom.
    pub fn within_hit_radius(&self, target: &Point, candidate: &Point, radius: f64) -> bool {
        target.distance_to(candidate) * self.scale <= radius * 2.0
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn fitted(vw: f64, vh: f64, iw: f64, ih: f64) -> CoordinateMapper {
        let mut m = CoordinateMapper::new();
        assert!(m.fit(vw, vh, iw, ih));
        m
    }

    #[test]
    fn test_fit_exact_half_scale() {
        let m = fitted(800.0, 600.0, 1600.0, 1200.0);
        assert!(approx_eq(m.scale(), 0.5));
        assert_eq!(m.display_size(), (800.0, 600.0));
        assert_eq!(m.offset(), (0.0, 0.0));

        let p = m.to_original(DisplayPos::new(100.0, 100.0));
        assert_eq!(p, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_fit_letterbox_centers_image() {
        // Wide viewport: height limits the scale
        let m = fitted(1000.0, 500.0, 400.0, 400.0);
        assert!(approx_eq(m.scale(), 1.25));
        assert_eq!(m.display_size(), (500.0, 500.0));
        assert_eq!(m.offset(), (250.0, 0.0));

        let d = m.to_display(Point::new(0.0, 0.0));
        assert_eq!(d, DisplayPos::new(250.0, 0.0));
    }

    #[test]
    fn test_odd_leftover_is_split_evenly() {
        let m = fitted(801.0, 600.0, 1600.0, 1200.0);
        assert!(approx_eq(m.scale(), 0.5));
        assert_eq!(m.display_size(), (800.0, 600.0));
        assert_eq!(m.offset(), (0.5, 0.0));

        let p = m.to_original(DisplayPos::new(100.5, 100.0));
        assert_eq!(p, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_fit_is_idempotent() {
        let mut m = fitted(640.0, 480.0, 1920.0, 1080.0);
        let before = m;
        assert!(m.set_viewport(640.0, 480.0));
        assert_eq!(m, before);
    }

    #[test]
    fn test_fit_rejects_zero_dimensions() {
        let mut m = fitted(800.0, 600.0, 1600.0, 1200.0);
        assert!(!m.set_viewport(0.0, 600.0));
        // Previous transform stays in place
        assert!(approx_eq(m.scale(), 0.5));
    }

    #[test]
    fn test_to_original_clamps_outside_image() {
        let m = fitted(1000.0, 500.0, 400.0, 400.0);
        // Left of the drawn image
        let p = m.to_original(DisplayPos::new(10.0, 250.0));
        assert_eq!(p.x, 0.0);
        assert!(approx_eq(p.y, 200.0));
        // Beyond the bottom-right corner
        let p = m.to_original(DisplayPos::new(2000.0, 2000.0));
        assert_eq!(p, Point::new(400.0, 400.0));
    }

    #[test]
    fn test_round_trip_within_bounds() {
        let cases = [
            (800.0, 600.0, 1600.0, 1200.0),
            (1000.0, 500.0, 400.0, 400.0),
            (333.0, 777.0, 1280.0, 720.0),
            (1920.0, 1080.0, 64.0, 48.0),
        ];
        for (vw, vh, iw, ih) in cases {
            let m = fitted(vw, vh, iw, ih);
            for (fx, fy) in [(0.0, 0.0), (0.25, 0.75), (0.5, 0.5), (1.0, 1.0)] {
                let p = Point::new(iw * fx, ih * fy);
                let back = m.to_original(m.to_display(p));
                assert!(
                    (back.x - p.x).abs() < 1e-6 && (back.y - p.y).abs() < 1e-6,
                    "round trip failed for {:?} in {}x{} -> {}x{}",
                    p,
                    iw,
                    ih,
                    vw,
                    vh
                );
            }
        }
    }

    #[test]
    fn test_hit_radius_follows_scale() {
        let target = Point::new(100.0, 100.0);
        let candidate = Point::new(115.0, 100.0);

        // 15 image px at scale 0.5 is 7.5 display px: inside 2 * 5
        let half = fitted(800.0, 600.0, 1600.0, 1200.0);
        assert!(half.within_hit_radius(&target, &candidate, 5.0));

        // 15 image px at scale 1.0 is 15 display px: outside
        let full = fitted(1600.0, 1200.0, 1600.0, 1200.0);
        assert!(!full.within_hit_radius(&target, &candidate, 5.0));

        // Exactly on the boundary counts as a hit
        let edge = Point::new(110.0, 100.0);
        assert!(full.within_hit_radius(&target, &edge, 5.0));
    }
}
