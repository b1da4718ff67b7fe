//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use vshort_models::ConfigError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid media file: {0}")]
    InvalidVideo(String),

    #[error("Filler {path} is {available:.2}s long, shorter than the {required:.2}s clip")]
    InsufficientFiller {
        path: PathBuf,
        available: f64,
        required: f64,
    },

    #[error("Background track {path} is {available:.2}s long, shorter than the {required:.2}s clip")]
    BackgroundTooShort {
        path: PathBuf,
        available: f64,
        required: f64,
    },

    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    #[error("No filler videos found in {0}")]
    NoFillers(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Errors that make the whole run pointless, as opposed to a single
    /// segment failing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MediaError::FfmpegNotFound
                | MediaError::FfprobeNotFound
                | MediaError::NoFillers(_)
                | MediaError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_filler_message() {
        let err = MediaError::InsufficientFiller {
            path: PathBuf::from("fillers/short.mp4"),
            available: 20.0,
            required: 30.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("fillers/short.mp4"));
        assert!(msg.contains("20.00s"));
        assert!(msg.contains("30.00s"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(MediaError::FfmpegNotFound.is_fatal());
        assert!(MediaError::Config(ConfigError::ZeroMaxSegments).is_fatal());
        assert!(!MediaError::Timeout(30).is_fatal());
        assert!(!MediaError::ffmpeg_failed("exit 1", None, Some(1)).is_fatal());
    }
}
