use crate::config::ConfigError;

/// Exit code used when the input image or video cannot be opened or decoded.
pub const EXIT_NOT_FOUND: i32 = -1;
/// Exit code used when a frame is not three channels of 8 bits.
pub const EXIT_UNSUPPORTED_FORMAT: i32 = 1;
/// Exit code used when the configuration file cannot be read or parsed.
pub const EXIT_CONFIG: i32 = 2;

/// Everything that can go wrong between opening a source and presenting a canvas.
///
/// Running out of video frames is deliberately absent: `FrameSource::next_frame`
/// reports it as `Ok(None)` and the run loop stops normally.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// `resource` names what was being opened ("Image", "Video").
    #[error("{resource} '{path}' not found!")]
    NotFound { resource: &'static str, path: String },
    #[error("Ops, format '{layout}' not supported!")]
    UnsupportedFormat { layout: String },
    #[error("failed to save snapshot to {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("display backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// The process exit code a front end should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::NotFound { .. } => EXIT_NOT_FOUND,
            ScanError::UnsupportedFormat { .. } => EXIT_UNSUPPORTED_FORMAT,
            ScanError::Config(_) => EXIT_CONFIG,
            ScanError::Snapshot { .. } | ScanError::Backend(_) => 1,
        }
    }
}
