//! Configuration for quadlabel.
//!
//! [`SessionConfig`] carries the runtime toggles the session passes into the
//! label store. [`AppConfig`] wraps it with a log level so operators can keep
//! their preferences in a settings file. None of this is written into the
//! label file itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HIT_RADIUS;
use crate::fs::FileSystem;
use crate::model::FrameIdMode;

/// Verbosity of the `env_logger` backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    /// Includes every pointer event
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Initialise the `env_logger` backend at `level`.
///
/// `RUST_LOG`, when set, takes precedence. Calling this twice is harmless.
pub fn init_logging(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialised");
    }
}

/// Runtime toggles of an annotation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Start unsaved frames with a copy of the previous frame's points
    #[serde(default)]
    pub carry_previous: bool,

    /// Whether new entries are keyed by filename or position
    #[serde(default)]
    pub frame_id_mode: FrameIdMode,

    /// Directory receiving the autosaved `labels.json`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Grab distance around a point, in display pixels
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f64,

    /// Abort label import when an entry names no image in the folder
    #[serde(default)]
    pub strict_import: bool,
}

fn default_hit_radius() -> f64 {
    DEFAULT_HIT_RADIUS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            carry_previous: false,
            frame_id_mode: FrameIdMode::default(),
            output_dir: None,
            hit_radius: default_hit_radius(),
            strict_import: false,
        }
    }
}

impl SessionConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_carry_previous(mut self, enabled: bool) -> Self {
        self.carry_previous = enabled;
        self
    }

    pub fn with_frame_id_mode(mut self, mode: FrameIdMode) -> Self {
        self.frame_id_mode = mode;
        self
    }

    pub fn with_strict_import(mut self, strict: bool) -> Self {
        self.strict_import = strict;
        self
    }
}

/// Settings file format version. Bump on breaking changes.
pub const CONFIG_VERSION: u32 = 1;

/// Name of the settings file inside the config directory.
pub const CONFIG_FILENAME: &str = "quadlabel-config.json";

/// Persisted operator preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Defaults for new sessions
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a settings file, rejecting versions this build cannot read.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `<config dir>/quadlabel/quadlabel-config.json`, falling back to
    /// `~/.config` when the platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join("quadlabel").join(CONFIG_FILENAME))
    }

    /// Read the settings file at `path`.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, ConfigError> {
        let json = fs.read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded settings from {:?}", path);
        Ok(config)
    }

    /// Read the settings file at `path`, using defaults when it is missing
    /// or unusable.
    pub fn load_or_default(fs: &dyn FileSystem, path: &Path) -> Self {
        match Self::load(fs, path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings file at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Write the settings file to `path`.
    pub fn save(&self, fs: &mut dyn FileSystem, path: &Path) -> Result<(), ConfigError> {
        fs.write(path, &self.to_json()?)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Errors from reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Settings file version {found} is newer than supported version {supported}")]
    VersionTooNew { found: u32, supported: u32 },

    #[error("Settings file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
