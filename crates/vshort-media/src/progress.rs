//! FFmpeg progress tracking.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

/// Progress information from FFmpeg's `-progress` stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Progress percentage against an expected output length in seconds.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if total_secs <= 0.0 {
            return 0.0;
        }
        if self.is_complete {
            return 100.0;
        }
        ((self.out_time_ms as f64 / 1000.0 / total_secs) * 100.0).clamp(0.0, 100.0)
    }

    /// Estimated seconds remaining at the current encoding speed.
    pub fn eta_seconds(&self, total_secs: f64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }

        let remaining = total_secs - self.out_time_ms as f64 / 1000.0;
        if remaining <= 0.0 {
            return Some(0.0);
        }

        Some(remaining / self.speed)
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(FfmpegProgress) + Send + 'static>;

/// Progress callback that logs at debug level each time another quarter of
/// `total_secs` has been encoded.
pub fn quarter_logger(label: impl Into<String>, total_secs: f64) -> ProgressCallback {
    let label = label.into();
    let last_quarter = AtomicU8::new(0);

    Box::new(move |progress: FfmpegProgress| {
        let quarter = (progress.percentage(total_secs) / 25.0).floor() as u8;
        if quarter > last_quarter.load(Ordering::Relaxed) {
            last_quarter.store(quarter, Ordering::Relaxed);
            debug!(
                step = %label,
                percent = quarter as u32 * 25,
                speed = progress.speed,
                eta_secs = progress.eta_seconds(total_secs).unwrap_or_default(),
                "FFmpeg progress"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10.0) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5.0) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0.0), 0.0);
    }

    #[test]
    fn test_complete_is_full() {
        let progress = FfmpegProgress {
            out_time_ms: 1000,
            is_complete: true,
            ..Default::default()
        };
        assert_eq!(progress.percentage(30.0), 100.0);
    }

    #[test]
    fn test_eta_calculation() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            speed: 2.0,
            ..Default::default()
        };

        // 5 seconds remaining at 2x speed
        let eta = progress.eta_seconds(10.0).unwrap();
        assert!((eta - 2.5).abs() < 0.01);
        assert!(FfmpegProgress::default().eta_seconds(10.0).is_none());
    }

    #[test]
    fn test_quarter_logger_accepts_updates() {
        let callback = quarter_logger("render", 10.0);
        for ms in [0, 2600, 5100, 9000, 10000] {
            callback(FfmpegProgress {
                out_time_ms: ms,
                ..Default::default()
            });
        }
    }
}
