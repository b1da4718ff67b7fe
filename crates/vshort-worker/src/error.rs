//! Worker error types.

use thiserror::Error;

use vshort_media::MediaError;
use vshort_models::{ConfigError, SegmentStage};

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Segment {index} failed after {stage}: {source}")]
    SegmentFailed {
        index: usize,
        stage: SegmentStage,
        #[source]
        source: MediaError,
    },
}

impl WorkerError {
    pub fn segment_failed(index: usize, stage: SegmentStage, source: MediaError) -> Self {
        Self::SegmentFailed {
            index,
            stage,
            source,
        }
    }

    /// Errors that abort the run before (or instead of) processing segments.
    pub fn is_fatal(&self) -> bool {
        match self {
            WorkerError::Config(_) => true,
            WorkerError::Media(e) => e.is_fatal() || is_source_error(e),
            WorkerError::SegmentFailed { .. } => false,
        }
    }
}

/// A preflight media error outside a segment (missing or unreadable input).
fn is_source_error(e: &MediaError) -> bool {
    matches!(
        e,
        MediaError::FileNotFound(_) | MediaError::InvalidVideo(_) | MediaError::FfprobeFailed { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(WorkerError::from(ConfigError::ZeroMaxSegments).is_fatal());
        assert!(WorkerError::from(MediaError::FfmpegNotFound).is_fatal());
        assert!(WorkerError::from(MediaError::NoFillers("fillers".into())).is_fatal());
        assert!(WorkerError::from(MediaError::FileNotFound("source.mp4".into())).is_fatal());

        let per_segment = WorkerError::segment_failed(
            2,
            SegmentStage::Rendered,
            MediaError::ffmpeg_failed("exit 1", None, Some(1)),
        );
        assert!(!per_segment.is_fatal());
        assert_eq!(
            per_segment.to_string(),
            "Segment 2 failed after rendered: FFmpeg command failed: exit 1"
        );
    }
}
