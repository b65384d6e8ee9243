//! The annotation session.
//!
//! Owns the label store, the image sequence, the coordinate mapper and the
//! points of the frame being edited. Every edit is committed to the store
//! immediately; the label file is written on navigation, fast-save and
//! close (autosave) and on explicit save.
//!
//! The session is single threaded: each [`Message`] is fully processed,
//! including any file write, before the next one is accepted.

mod pointer;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::SessionConfig;
use crate::format::{AutoSaveManager, FormatError, label_file};
use crate::fs::FileSystem;
use crate::message::{Message, Notice};
use crate::model::{EditState, FrameIdMode, Point};
use crate::render::{FrameRenderer, Scene};
use crate::sequence::{ImageSequence, SequenceError};
use crate::store::{LabelStore, ReconcileReport};
use crate::viewport::CoordinateMapper;

/// Errors surfaced to the operator by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Folder could not be loaded
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Label file could not be read, parsed, reconciled or written
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Operation needs an image folder
    #[error("No image folder loaded")]
    NoFolder,

    /// Frame index outside the image sequence
    #[error("Frame {index} is out of range ({len} images)")]
    FrameOutOfRange { index: usize, len: usize },

    /// Image size could not be determined
    #[error("Failed to read image {path:?}: {source}")]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Prev,
    Next,
}

/// Interactive annotation session over one image folder.
#[derive(Debug)]
pub struct AnnotationSession<F: FileSystem> {
    fs: F,
    config: SessionConfig,
    store: LabelStore,
    sequence: Option<ImageSequence>,
    mapper: CoordinateMapper,
    /// Points of the active frame, in original-image space
    points: Vec<Point>,
    edit_state: EditState,
    auto_save: AutoSaveManager,
    notices: Vec<Notice>,
    needs_redraw: bool,
    closed: bool,
}

impl<F: FileSystem> AnnotationSession<F> {
    /// Create a session with no folder loaded.
    pub fn new(fs: F, config: SessionConfig) -> Self {
        let mut auto_save = AutoSaveManager::new();
        auto_save.set_output_dir(config.output_dir.clone());

        Self {
            fs,
            config,
            store: LabelStore::new(),
            sequence: None,
            mapper: CoordinateMapper::new(),
            points: Vec::new(),
            edit_state: EditState::Idle,
            auto_save,
            notices: Vec::new(),
            needs_redraw: false,
            closed: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &LabelStore {
        &self.store
    }

    pub fn sequence(&self) -> Option<&ImageSequence> {
        self.sequence.as_ref()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Points of the frame being edited.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn edit_state(&self) -> EditState {
        self.edit_state
    }

    pub fn auto_save(&self) -> &AutoSaveManager {
        &self.auto_save
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Whether labels changed since they were last written to any file.
    pub fn has_unsaved_changes(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current cursor position, if a folder is loaded.
    pub fn current_index(&self) -> Option<usize> {
        self.sequence.as_ref().map(ImageSequence::current_index)
    }

    /// Drain queued operator notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Whether the view changed since the last render.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Display-space scene of the active frame.
    pub fn scene(&self) -> Scene {
        Scene::build(&self.points, &self.mapper)
    }

    /// Draw the active frame and clear the redraw request.
    pub fn render(&mut self, renderer: &mut dyn FrameRenderer) {
        renderer.render(&self.scene());
        self.needs_redraw = false;
    }

    fn notify(&mut self, notice: Notice) {
        notice.log();
        self.notices.push(notice);
    }

    fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Process one event.
    pub fn update(&mut self, message: Message) -> Result<(), SessionError> {
        if self.closed {
            log::debug!("Session closed, ignoring {:?}", message);
            return Ok(());
        }

        match message {
            Message::PrimaryPress(pos) => self.primary_press(pos),
            Message::PointerMove(pos) => self.pointer_move(pos),
            Message::PrimaryRelease => self.primary_release(),
            Message::SecondaryClick => self.fast_save(),
            Message::PrevImage => return self.prev(),
            Message::NextImage => return self.next(),
            Message::ResetFrame => self.reset_frame(),
            Message::SaveAs(path) => return self.save_as(&path),
            Message::ImportLabels(path) => return self.import_labels(&path).map(|_| ()),
            Message::OpenFolder(path) => return self.open_folder(&path),
            Message::SetCarryPrevious(enabled) => self.set_carry_previous(enabled),
            Message::SetFilenameIds(enabled) => self.set_frame_id_mode(if enabled {
                FrameIdMode::Filename
            } else {
                FrameIdMode::Index
            }),
            Message::SetOutputDir(dir) => self.set_output_dir(dir),
            Message::Resize { width, height } => self.resize(width, height),
            Message::Close => self.close(),
        }
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn set_carry_previous(&mut self, enabled: bool) {
        log::debug!("Carry previous: {}", enabled);
        self.config.carry_previous = enabled;
    }

    /// Change the id mode used for entries stamped from now on.
    pub fn set_frame_id_mode(&mut self, mode: FrameIdMode) {
        log::debug!("Frame id mode: {:?}", mode);
        self.config.frame_id_mode = mode;
    }

    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) {
        self.config.output_dir = dir.clone();
        self.auto_save.set_output_dir(dir);
    }

    /// Refit the mapping to a new viewport size.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.mapper.set_viewport(width, height) {
            self.request_redraw();
        }
    }

    // =========================================================================
    // Folder and frames
    // =========================================================================

    /// Discover images in `folder` and start annotating the first one.
    pub fn open_folder(&mut self, folder: &Path) -> Result<(), SessionError> {
        let sequence = ImageSequence::discover(&self.fs, folder)?;
        self.select_folder(sequence)
    }

    /// Replace the image sequence, discarding all in-memory labels.
    ///
    /// Nothing changes if the first image cannot be read.
    pub fn select_folder(&mut self, sequence: ImageSequence) -> Result<(), SessionError> {
        let dims = self.read_dimensions(&sequence, 0)?;

        log::info!(
            "Selected folder {:?} with {} images",
            sequence.folder(),
            sequence.len()
        );
        self.store.clear();
        self.store.clear_dirty();
        self.auto_save.reset();
        self.sequence = Some(sequence);
        self.apply_frame(0, dims);
        Ok(())
    }

    /// Show the frame at `index`: saved points, else carried-forward ones.
    pub fn show_frame(&mut self, index: usize) -> Result<(), SessionError> {
        let sequence = self.sequence.as_ref().ok_or(SessionError::NoFolder)?;
        let dims = self.read_dimensions(sequence, index)?;
        self.apply_frame(index, dims);
        Ok(())
    }

    fn read_dimensions(&self, sequence: &ImageSequence, index: usize) -> Result<(u32, u32), SessionError> {
        let path = sequence
            .path_of(index)
            .ok_or(SessionError::FrameOutOfRange {
                index,
                len: sequence.len(),
            })?;
        self.fs
            .image_dimensions(&path)
            .map_err(|source| SessionError::ImageUnreadable { path, source })
    }

    fn apply_frame(&mut self, index: usize, (width, height): (u32, u32)) {
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.set_index(index);
        }
        self.mapper.set_image(f64::from(width), f64::from(height));

        let saved = self.store.points(index);
        self.points = if saved.is_empty() {
            self.store.carry_forward(index, self.config.carry_previous)
        } else {
            saved.to_vec()
        };
        self.edit_state = EditState::Idle;

        log::debug!(
            "Showing frame {} ({}x{}) with {} points",
            index,
            width,
            height,
            self.points.len()
        );
        self.request_redraw();
    }

    /// Write the active points into the store at the cursor.
    fn commit(&mut self) {
        let Some(sequence) = self.sequence.as_ref() else {
            return;
        };
        self.store.set(
            sequence.current_index(),
            self.points.clone(),
            self.config.frame_id_mode,
            sequence.names(),
        );
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Commit, autosave, and move to the next image.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.navigate(Step::Next)
    }

    /// Commit, autosave, and move to the previous image.
    pub fn prev(&mut self) -> Result<(), SessionError> {
        self.navigate(Step::Prev)
    }

    fn navigate(&mut self, step: Step) -> Result<(), SessionError> {
        if self.sequence.is_none() {
            return Ok(());
        }

        self.commit();
        self.autosave();

        let Some(sequence) = self.sequence.as_ref() else {
            return Ok(());
        };
        let current = sequence.current_index();
        let target = match step {
            Step::Next if sequence.is_last() => None,
            Step::Next => Some(current + 1),
            Step::Prev if sequence.is_first() => None,
            Step::Prev => Some(current - 1),
        };

        match target {
            Some(index) => {
                self.show_frame(index)?;
                if let Some(sequence) = self.sequence.as_ref() {
                    log::info!("Image {}: {}", sequence.progress(), sequence.current_name());
                }
                Ok(())
            }
            None => {
                let which = if step == Step::Next { "last" } else { "first" };
                self.notify(Notice::info(format!("Already at the {} image", which)));
                Ok(())
            }
        }
    }

    // =========================================================================
    // Editing commands
    // =========================================================================

    /// Clear the current frame's points.
    pub fn reset_frame(&mut self) {
        if self.sequence.is_none() {
            return;
        }
        self.points.clear();
        self.edit_state = EditState::Idle;
        self.commit();
        self.request_redraw();
        log::debug!("Reset current frame");
    }

    /// Commit and autosave without navigating.
    pub fn fast_save(&mut self) {
        self.commit();
        self.autosave();
    }

    /// Commit, autosave, and stop accepting events.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.commit();
        self.autosave();
        self.closed = true;
        log::info!("Session closed");
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn write_labels(&mut self, path: &Path) -> Result<(), FormatError> {
        let json = label_file::to_json(self.store.labels())?;
        self.fs.write(path, &json)?;
        Ok(())
    }

    /// Write the full label set to the autosave target.
    ///
    /// Failures and a missing target become notices, never errors.
    fn autosave(&mut self) {
        if self.store.is_empty() {
            log::debug!("Auto-save skipped: no labels yet");
            return;
        }

        let Some(path) = self.auto_save.target_path() else {
            self.notify(Notice::warning(
                "Autosave skipped: no output directory configured",
            ));
            return;
        };

        match self.write_labels(&path) {
            Ok(()) => {
                log::info!("Auto-saved {} entries to {:?}", self.store.len(), path);
                self.auto_save.mark_saved();
                self.store.clear_dirty();
            }
            Err(e) => {
                self.auto_save.mark_save_failed(e.to_string());
                self.notify(Notice::error(format!(
                    "Autosave to {} failed: {}",
                    path.display(),
                    e
                )));
            }
        }
    }

    /// Commit and write the full label set to `path`.
    pub fn save_as(&mut self, path: &Path) -> Result<(), SessionError> {
        self.commit();
        if self.store.is_empty() {
            self.notify(Notice::info("Nothing to save yet"));
            return Ok(());
        }

        self.write_labels(path)?;
        self.store.clear_dirty();
        self.notify(Notice::info(format!("Labels saved to {}", path.display())));
        Ok(())
    }

    /// Load a label file and align it to the current folder.
    ///
    /// A malformed file (or, with strict import, an unmatched entry) leaves
    /// the in-memory labels untouched. On success the cursor returns to the
    /// first image.
    pub fn import_labels(&mut self, path: &Path) -> Result<ReconcileReport, SessionError> {
        let sequence = self.sequence.as_ref().ok_or(SessionError::NoFolder)?;

        let json = self.fs.read_to_string(path).map_err(FormatError::from)?;
        let loaded = label_file::from_json(&json)?;
        let dims = self.read_dimensions(sequence, 0)?;

        let report = self.store.reconcile(
            sequence.names(),
            loaded,
            self.config.frame_id_mode,
            self.config.strict_import,
        )?;

        for frame_id in &report.dropped {
            self.notify(Notice::warning(format!(
                "Image {} not found in folder, label dropped",
                frame_id
            )));
        }
        for name in &report.duplicates {
            self.notify(Notice::warning(format!(
                "Duplicate label for {}, kept the last one",
                name
            )));
        }
        self.notify(Notice::info(format!(
            "Imported {} labels from {}",
            report.placed,
            path.display()
        )));

        self.apply_frame(0, dims);
        Ok(report)
    }
}
