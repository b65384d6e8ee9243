//! Point interaction state.

/// State of the point interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    /// No point is grabbed.
    #[default]
    Idle,
    /// A point is being dragged.
    Dragging {
        /// Index of the dragged point in the active frame.
        index: usize,
    },
}

impl EditState {
    /// Check if a point is currently being dragged.
    pub fn is_dragging(&self) -> bool {
        matches!(self, EditState::Dragging { .. })
    }

    /// Index of the dragged point, if any.
    pub fn dragged_index(&self) -> Option<usize> {
        match self {
            EditState::Dragging { index } => Some(*index),
            EditState::Idle => None,
        }
    }
}
