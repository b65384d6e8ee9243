//! Display-space scene handed to a renderer.
//!
//! The session turns the active frame's points into a [`Scene`] of markers
//! and edges in viewport coordinates. Any toolkit can draw it by
//! implementing [`FrameRenderer`].

use crate::constants::{MARKER_COLORS, MARKER_RADIUS, MARKER_TEXT_GAP, MAX_POINTS};
use crate::model::{DisplayPos, Point, QUAD_EDGES};
use crate::viewport::CoordinateMapper;

/// A point marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Index of the point within the frame (also drawn as text).
    pub index: usize,
    /// Marker center in viewport coordinates.
    pub position: DisplayPos,
    /// Fill color (RGB), chosen by index.
    pub color: [u8; 3],
    /// Where the index text starts, right of the marker.
    pub text_anchor: DisplayPos,
}

/// An outline segment between two markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Point indices the edge connects.
    pub indices: (usize, usize),
    pub from: DisplayPos,
    pub to: DisplayPos,
}

/// Everything needed to draw one frame's annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub markers: Vec<Marker>,
    /// Empty until the quadrilateral is complete.
    pub edges: Vec<Edge>,
}

impl Scene {
    /// Build the scene for `points` under the current mapping.
    pub fn build(points: &[Point], mapper: &CoordinateMapper) -> Self {
        let positions: Vec<DisplayPos> = points.iter().map(|p| mapper.to_display(*p)).collect();

        let markers = positions
            .iter()
            .enumerate()
            .map(|(index, position)| Marker {
                index,
                position: *position,
                color: MARKER_COLORS[index % MARKER_COLORS.len()],
                text_anchor: DisplayPos::new(
                    position.x + MARKER_RADIUS + MARKER_TEXT_GAP,
                    position.y,
                ),
            })
            .collect();

        let edges = if positions.len() == MAX_POINTS {
            QUAD_EDGES
                .iter()
                .map(|&(a, b)| Edge {
                    indices: (a, b),
                    from: positions[a],
                    to: positions[b],
                })
                .collect()
        } else {
            Vec::new()
        };

        Self { markers, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Anything that can draw a [`Scene`] (canvas widget, test recorder, ...).
pub trait FrameRenderer {
    fn render(&mut self, scene: &Scene);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        let mut m = CoordinateMapper::new();
        m.fit(800.0, 600.0, 1600.0, 1200.0);
        m
    }

    #[test]
    fn test_partial_frame_has_no_edges() {
        let pts = [Point::new(200.0, 200.0), Point::new(1400.0, 200.0)];
        let scene = Scene::build(&pts, &mapper());
        assert_eq!(scene.markers.len(), 2);
        assert!(scene.edges.is_empty());
        assert_eq!(scene.markers[1].position, DisplayPos::new(700.0, 100.0));
        assert_eq!(scene.markers[1].color, MARKER_COLORS[1]);
        assert_eq!(scene.markers[1].text_anchor, DisplayPos::new(710.0, 100.0));
    }

    #[test]
    fn test_edges_follow_point_order() {
        // A self-intersecting order still connects consecutive indices
        let pts = [
            Point::new(200.0, 200.0),
            Point::new(1400.0, 1000.0),
            Point::new(1400.0, 200.0),
            Point::new(200.0, 1000.0),
        ];
        let scene = Scene::build(&pts, &mapper());
        let indices: Vec<_> = scene.edges.iter().map(|e| e.indices).collect();
        assert_eq!(indices, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(scene.edges[3].from, DisplayPos::new(100.0, 500.0));
        assert_eq!(scene.edges[3].to, DisplayPos::new(100.0, 100.0));
    }
}
