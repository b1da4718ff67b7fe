//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Process-level settings that are not part of a single run's parameters.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Parent directory for per-segment temp directories
    pub work_dir: PathBuf,
    /// Where finished shorts are written
    pub output_dir: PathBuf,
    /// Kill an ffmpeg invocation after this long (`None` = no limit)
    pub ffmpeg_timeout: Option<Duration>,
    /// Kill an ffprobe invocation after this long
    pub probe_timeout: Option<Duration>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("vshort"),
            output_dir: PathBuf::from("output"),
            ffmpeg_timeout: Some(Duration::from_secs(1800)), // 30 minutes
            probe_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// A timeout of `0` disables that timeout.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("VSHORT_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            output_dir: std::env::var("VSHORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            ffmpeg_timeout: timeout_from_env("VSHORT_FFMPEG_TIMEOUT_SECS", defaults.ffmpeg_timeout),
            probe_timeout: timeout_from_env("VSHORT_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
        }
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

fn timeout_from_env(var: &str, default: Option<Duration>) -> Option<Duration> {
    match std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => default,
    }
}
