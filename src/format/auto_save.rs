//! Auto-save bookkeeping.
//!
//! Autosave is event driven: the session writes the full label set on every
//! navigation, fast-save and close. This manager tracks where that write
//! goes and how the last attempts went. Whether the in-memory set has
//! unsaved changes is owned by [`LabelStore`](crate::store::LabelStore).

use std::path::{Path, PathBuf};

use crate::constants::AUTOSAVE_FILENAME;

/// Tracks the autosave target and save outcomes.
#[derive(Debug, Default)]
pub struct AutoSaveManager {
    /// Directory receiving `labels.json`.
    output_dir: Option<PathBuf>,

    /// Number of successful saves this session.
    save_count: usize,

    /// Message of the most recent failed save, cleared on success.
    last_error: Option<String>,
}

impl AutoSaveManager {
    /// Create a manager with no output directory configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Change (or clear) the output directory.
    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) {
        log::debug!("Auto-save: output directory = {:?}", dir);
        self.output_dir = dir;
    }

    /// The configured output directory, if any.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Full path of the autosave file, or None when no directory is set.
    pub fn target_path(&self) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(AUTOSAVE_FILENAME))
    }

    /// Mark that a save completed successfully.
    pub fn mark_saved(&mut self) {
        self.save_count += 1;
        self.last_error = None;
        log::trace!("Auto-save: marked saved");
    }

    /// Mark that a save failed. The next trigger writes again.
    pub fn mark_save_failed(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        log::trace!("Auto-save: marked save failed");
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Error message of the last failed save, if the last attempt failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Forget save outcomes, keeping the output directory.
    pub fn reset(&mut self) {
        self.save_count = 0;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let manager = AutoSaveManager::new();
        assert!(manager.last_error().is_none());
        assert!(manager.target_path().is_none());
        assert_eq!(manager.save_count(), 0);
    }

    #[test]
    fn test_target_path_uses_fixed_filename() {
        let manager = AutoSaveManager::new().with_output_dir("/data/out");
        assert_eq!(
            manager.target_path(),
            Some(PathBuf::from("/data/out").join("labels.json"))
        );
    }

    #[test]
    fn test_mark_saved() {
        let mut manager = AutoSaveManager::new();
        manager.mark_saved();
        manager.mark_saved();
        assert_eq!(manager.save_count(), 2);

        manager.reset();
        assert_eq!(manager.save_count(), 0);
    }

    #[test]
    fn test_failed_save_keeps_error_until_success() {
        let mut manager = AutoSaveManager::new();
        manager.mark_save_failed("disk full");
        assert_eq!(manager.save_count(), 0);
        assert_eq!(manager.last_error(), Some("disk full"));

        manager.mark_saved();
        assert!(manager.last_error().is_none());
    }
}
