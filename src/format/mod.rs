//! Label file import/export.
//!
//! The label file is the only persisted artifact: a JSON array of
//! `{ "frame_id", "label" }` objects, one per image position. It is written
//! by autosave and manual save, read back by label import, and consumed by
//! the batch overlay tool.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quadlabel::format::label_file;
//!
//! let json = label_file::to_json(store.labels())?;
//! let loaded = label_file::from_json(&json)?;
//! ```

mod auto_save;
mod error;
pub mod label_file;

pub use auto_save::AutoSaveManager;
pub use error::FormatError;
