//! Pointer handling: placing and dragging points.
//!
//! A press near an existing point grabs it, anywhere else appends a new
//! point while the frame holds fewer than four. Motion while grabbing moves
//! the grabbed point; release ends the drag.

use super::AnnotationSession;
use crate::constants::MAX_POINTS;
use crate::fs::FileSystem;
use crate::message::Notice;
use crate::model::{DisplayPos, EditState};

impl<F: FileSystem> AnnotationSession<F> {
    /// Primary button pressed at `pos`.
    pub fn primary_press(&mut self, pos: DisplayPos) {
        if self.sequence.is_none() {
            return;
        }

        let p = self.mapper.to_original(pos);
        log::trace!("Press at ({:.1}, {:.1}) -> image ({:.1}, {:.1})", pos.x, pos.y, p.x, p.y);

        // Lowest index wins when markers overlap
        let hit = self
            .points
            .iter()
            .position(|pt| self.mapper.within_hit_radius(pt, &p, self.config.hit_radius));

        if let Some(index) = hit {
            log::debug!("Grabbed point {}", index);
            self.edit_state = EditState::Dragging { index };
            return;
        }

        if self.points.len() >= MAX_POINTS {
            self.notify(Notice::info(format!(
                "Frame already has {} points; drag one or reset the frame",
                MAX_POINTS
            )));
            return;
        }

        self.points.push(p);
        log::debug!("Placed point {} at ({:.1}, {:.1})", self.points.len() - 1, p.x, p.y);
        self.commit();
        self.request_redraw();
    }

    /// Pointer moved to `pos` with the primary button held.
    pub fn pointer_move(&mut self, pos: DisplayPos) {
        let EditState::Dragging { index } = self.edit_state else {
            return;
        };

        let p = self.mapper.to_original(pos);
        match self.points.get_mut(index) {
            Some(point) => *point = p,
            None => {
                self.edit_state = EditState::Idle;
                return;
            }
        }
        self.commit();
        self.request_redraw();
    }

    /// Primary button released.
    pub fn primary_release(&mut self) {
        if let Some(index) = self.edit_state.dragged_index() {
            log::debug!("Released point {}", index);
        }
        self.edit_state = EditState::Idle;
    }
}
