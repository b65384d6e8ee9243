//! quadlabel - Quadrilateral Annotation Engine
//!
//! Headless engine for labelling each image of a folder with a four-corner
//! polygon. A UI drives an [`AnnotationSession`] with [`Message`]s and draws
//! the [`Scene`] it produces; labels are kept in original-image pixel
//! coordinates and persisted as a JSON label file.

pub mod config;
pub mod constants;
pub mod format;
pub mod fs;
pub mod message;
pub mod model;
pub mod overlay;
pub mod render;
pub mod sequence;
pub mod session;
pub mod store;
pub mod viewport;

pub use config::{AppConfig, SessionConfig};
pub use fs::{FileSystem, MemoryFileSystem, NativeFileSystem};
pub use message::{Message, Notice, Severity};
pub use render::{FrameRenderer, Scene};
pub use session::{AnnotationSession, SessionError};
pub use store::LabelStore;
pub use viewport::CoordinateMapper;
