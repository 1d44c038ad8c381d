use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Tunable behaviour for both front ends. Every field has a default, so an empty
/// file (or no file at all) reproduces the classroom setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub window: WindowConfig,
    pub trackbars: TrackbarConfig,
    pub detector: DetectorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Still image opened by `line_plot` when no path is given on the command line.
    #[serde(default = "default_image")]
    pub image: PathBuf,
    /// Video file opened by `line_follower`.
    #[serde(default = "default_video")]
    pub video: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Where `s` writes the current frame. Overwritten on every save.
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
    /// Which frame the video front end saves. The still-image front end has no
    /// detector markers, so it always saves the clean frame.
    #[serde(default = "default_snapshot_source")]
    pub snapshot_source: SnapshotSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// The frame exactly as decoded.
    Clean,
    /// The frame with edge detector markers drawn on it.
    Annotated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_still_key_wait_ms")]
    pub still_key_wait_ms: i32,
    #[serde(default = "default_video_key_wait_ms")]
    pub video_key_wait_ms: i32,
}

/// Initial slider positions, in percent.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackbarConfig {
    #[serde(default = "default_row")]
    pub row: i32,
    #[serde(default = "default_scale")]
    pub scale: i32,
    #[serde(default = "default_resize")]
    pub resize: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Clear the edge flags before each frame's scan. Crossing columns and the
    /// midpoint always carry over.
    #[serde(default = "default_reset_each_frame")]
    pub reset_each_frame: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Loads `path` when one is given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            video: default_video(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            snapshot_source: default_snapshot_source(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            still_key_wait_ms: default_still_key_wait_ms(),
            video_key_wait_ms: default_video_key_wait_ms(),
        }
    }
}

impl Default for TrackbarConfig {
    fn default() -> Self {
        Self {
            row: default_row(),
            scale: default_scale(),
            resize: default_resize(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            reset_each_frame: default_reset_each_frame(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_image() -> PathBuf {
    "../line1.jpeg".into()
}
fn default_video() -> PathBuf {
    "../line.mp4".into()
}
fn default_snapshot() -> PathBuf {
    "../output.jpg".into()
}
fn default_snapshot_source() -> SnapshotSource {
    SnapshotSource::Annotated
}
fn default_title() -> String {
    "EML6805".into()
}
fn default_still_key_wait_ms() -> i32 {
    10
}
fn default_video_key_wait_ms() -> i32 {
    30
}
fn default_row() -> i32 {
    70
}
fn default_scale() -> i32 {
    40
}
fn default_resize() -> i32 {
    100
}
fn default_threshold() -> u8 {
    200
}
fn default_reset_each_frame() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}
