//! Filesystem access for the annotation session.
//!
//! The session never touches `std::fs` directly; it goes through the
//! [`FileSystem`] port so the engine runs against [`NativeFileSystem`] in
//! the application and [`MemoryFileSystem`] in tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Capability for listing folders, reading and writing label files, and
/// probing image sizes.
pub trait FileSystem {
    /// File names (not paths) of the regular files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Read a whole text file.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Overwrite `path` with `contents`, creating parent directories.
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()>;

    /// Pixel dimensions (width, height) of the image at `path`.
    fn image_dimensions(&self, path: &Path) -> io::Result<(u32, u32)>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("Skipping non UTF-8 filename {:?}", raw),
            }
        }
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Plain overwrite: a crash mid-write can leave a truncated file
        std::fs::write(path, contents)
    }

    fn image_dimensions(&self, path: &Path) -> io::Result<(u32, u32)> {
        image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) => io,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })
    }
}

/// In-memory filesystem for tests and headless use.
///
/// Images are registered with their dimensions only; no pixel data is kept.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    images: BTreeMap<PathBuf, (u32, u32)>,
    /// When set, every write fails with this error kind.
    fail_writes: Option<io::ErrorKind>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image file of the given size.
    pub fn with_image(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.images.insert(path.into(), (width, height));
        self
    }

    /// Register a text file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Make subsequent writes fail (or succeed again with `None`).
    pub fn set_fail_writes(&mut self, kind: Option<io::ErrorKind>) {
        self.fail_writes = kind;
    }

    /// Contents of a text file, if present.
    pub fn file(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let names: Vec<String> = self
            .files
            .keys()
            .chain(self.images.keys())
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .filter_map(|name| name.to_str())
            .map(String::from)
            .collect();

        if names.is_empty() {
            return Err(Self::not_found(dir));
        }
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(kind) = self.fail_writes {
            return Err(io::Error::new(kind, "write rejected"));
        }
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn image_dimensions(&self, path: &Path) -> io::Result<(u32, u32)> {
        self.images
            .get(path)
            .copied()
            .ok_or_else(|| Self::not_found(path))
    }
}
