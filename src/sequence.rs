//! The ordered image sequence of a loaded folder.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::IMAGE_EXTENSIONS;
use crate::fs::FileSystem;

/// Check if a filename has a supported image extension.
pub fn is_image_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Errors raised while discovering images in a folder.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The folder could not be listed
    #[error("Failed to read folder {folder:?}: {source}")]
    Unreadable {
        folder: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The folder holds no supported image files
    #[error("No images found in {folder:?}")]
    NoImages { folder: PathBuf },
}

/// Images of one folder in filename order, with a cursor.
///
/// The list is fixed once loaded; the cursor always points at a valid image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSequence {
    /// Folder the images were discovered in
    folder: PathBuf,
    /// Image filenames, sorted
    names: Vec<String>,
    /// Current image index
    current_index: usize,
}

impl ImageSequence {
    /// Build a sequence from filenames, keeping only images, sorted by name.
    pub fn from_names(folder: impl Into<PathBuf>, names: Vec<String>) -> Result<Self, SequenceError> {
        let folder = folder.into();
        let mut names: Vec<String> = names
            .into_iter()
            .filter(|name| is_image_filename(name))
            .collect();

        if names.is_empty() {
            return Err(SequenceError::NoImages { folder });
        }

        // Sort by filename for consistent ordering
        names.sort();
        names.dedup();

        Ok(Self {
            folder,
            names,
            current_index: 0,
        })
    }

    /// Discover image files directly inside `folder`.
    pub fn discover(fs: &dyn FileSystem, folder: &Path) -> Result<Self, SequenceError> {
        let names = fs
            .list_files(folder)
            .map_err(|source| SequenceError::Unreadable {
                folder: folder.to_path_buf(),
                source,
            })?;
        let sequence = Self::from_names(folder, names)?;

        log::info!(
            "Scanned folder {:?}: found {} images",
            folder,
            sequence.len()
        );
        Ok(sequence)
    }

    /// Folder the images live in.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// All image filenames in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Current image index.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current image filename.
    pub fn current_name(&self) -> &str {
        &self.names[self.current_index]
    }

    /// Full path of the image at `index`.
    pub fn path_of(&self, index: usize) -> Option<PathBuf> {
        self.names.get(index).map(|name| self.folder.join(name))
    }

    /// Move the cursor. Returns false (cursor unchanged) when out of range.
    pub fn set_index(&mut self, index: usize) -> bool {
        if index < self.names.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.names.len()
    }

    /// Get progress string like "3/15".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.names.len())
    }
}
