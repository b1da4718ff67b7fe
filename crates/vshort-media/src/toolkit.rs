//! Seam between the pipeline and the external media tools.
//!
//! Everything that spawns `ffmpeg` or `ffprobe` goes through
//! [`MediaToolkit`], so the pipeline can be driven by a fake in tests.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::{probe_media_with_timeout, MediaInfo};
use crate::progress::quarter_logger;

/// External media tool interface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Inspect a media file.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Run an FFmpeg command to completion. `expected_secs` is the length of
    /// the output, used for progress reporting only.
    async fn run(&self, cmd: &FfmpegCommand, expected_secs: f64) -> MediaResult<()>;
}

#[async_trait]
impl<T: MediaToolkit + ?Sized> MediaToolkit for &T {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        (**self).probe(path).await
    }

    async fn run(&self, cmd: &FfmpegCommand, expected_secs: f64) -> MediaResult<()> {
        (**self).run(cmd, expected_secs).await
    }
}

/// [`MediaToolkit`] backed by the system `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegToolkit {
    runner: FfmpegRunner,
    probe_timeout: Option<Duration>,
}

impl FfmpegToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any ffmpeg invocation running longer than `secs`.
    pub fn with_ffmpeg_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }

    /// Kill any ffprobe invocation running longer than `timeout`.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Kill the running ffmpeg once `cancel_rx` turns true.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.runner = self.runner.with_cancel(cancel_rx);
        self
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_media_with_timeout(path, self.probe_timeout).await
    }

    async fn run(&self, cmd: &FfmpegCommand, expected_secs: f64) -> MediaResult<()> {
        let label = cmd
            .output_path()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        debug!(output = %cmd.output_path().display(), "Starting FFmpeg step");

        self.runner
            .run_with_progress(cmd, quarter_logger(label, expected_secs))
            .await
    }
}
