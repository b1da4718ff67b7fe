//! Pipeline configuration.
//!
//! Every knob the pipeline needs travels in [`PipelineConfig`]; nothing is
//! read from process-wide defaults once a run starts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::canvas::CanvasConfig;
use crate::encoding::EncodingConfig;
use crate::timestamp::TimestampError;

/// Seconds trimmed between consecutive windows (each window starts
/// `segment_secs - overlap_trim_secs` after the previous one).
pub const DEFAULT_OVERLAP_TRIM_SECS: f64 = 5.0;
pub const DEFAULT_SEGMENT_SECS: f64 = 30.0;
pub const DEFAULT_MAX_SEGMENTS: usize = 5;
pub const DEFAULT_BACKGROUND_VOLUME: f64 = 0.1;

/// Accepted playback speed multipliers.
pub const MIN_SPEED_FACTOR: f64 = 0.1;
pub const MAX_SPEED_FACTOR: f64 = 10.0;

/// Configuration errors. All of these abort a run before any media work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Start offset cannot be negative: {0}s")]
    NegativeStartOffset(f64),

    #[error("Start time ({start}s) is not before the video duration ({duration}s)")]
    StartBeyondDuration { start: f64, duration: f64 },

    #[error("Segment length {segment_secs}s must exceed the {overlap_secs}s overlap trim")]
    SegmentTooShort { segment_secs: f64, overlap_secs: f64 },

    #[error("Overlap trim cannot be negative: {0}s")]
    NegativeOverlap(f64),

    #[error("Maximum segment count must be at least 1")]
    ZeroMaxSegments,

    #[error("Speed factor {0} outside supported range {min}..={max}", min = MIN_SPEED_FACTOR, max = MAX_SPEED_FACTOR)]
    InvalidSpeedFactor(f64),

    #[error("Background volume {0} must be in (0, 1]")]
    InvalidVolume(f64),

    #[error("Invalid canvas {width}x{height}@{fps}")]
    InvalidCanvas { width: u32, height: u32, fps: u32 },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),
}

/// Where the background track starts for each segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStart {
    /// Always from time zero
    #[default]
    Beginning,
    /// Uniformly random offset, drawn per segment
    Random,
}

/// What to do when the background track is shorter than a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortBackgroundPolicy {
    /// Repeat the track until it covers the segment
    #[default]
    Loop,
    /// Play once, then silence
    PadSilence,
    /// Fail the segment
    Fail,
}

/// Background music mixed under every segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundAudioConfig {
    pub path: PathBuf,
    /// Amplitude multiplier in (0, 1]
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub start: BackgroundStart,
    #[serde(default)]
    pub when_short: ShortBackgroundPolicy,
}

fn default_volume() -> f64 {
    DEFAULT_BACKGROUND_VOLUME
}

impl BackgroundAudioConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            volume: DEFAULT_BACKGROUND_VOLUME,
            start: BackgroundStart::default(),
            when_short: ShortBackgroundPolicy::default(),
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_start(mut self, start: BackgroundStart) -> Self {
        self.start = start;
        self
    }

    pub fn with_short_policy(mut self, policy: ShortBackgroundPolicy) -> Self {
        self.when_short = policy;
        self
    }
}

/// Parameters for one shorts run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// First window starts here (seconds into the source)
    pub start_offset_secs: f64,
    /// Target window length in source seconds
    pub segment_secs: f64,
    /// Upper bound on produced shorts
    pub max_segments: usize,
    /// Gap trimmed between consecutive window starts
    pub overlap_trim_secs: f64,
    /// Playback speed multiplier (1.0 = unchanged)
    pub speed_factor: f64,
    /// Optional background music
    pub background: Option<BackgroundAudioConfig>,
    /// Horizontally flip the main segment
    pub mirror: bool,
    pub canvas: CanvasConfig,
    /// Encoding for intermediate renders and mixes
    pub segment_encoding: EncodingConfig,
    /// Encoding for the final composed short
    pub output_encoding: EncodingConfig,
    /// Seed for segment sampling and filler picks
    pub seed: Option<u64>,
    /// Stop at the first failed segment instead of moving on
    pub fail_fast: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_offset_secs: 0.0,
            segment_secs: DEFAULT_SEGMENT_SECS,
            max_segments: DEFAULT_MAX_SEGMENTS,
            overlap_trim_secs: DEFAULT_OVERLAP_TRIM_SECS,
            speed_factor: 1.0,
            background: None,
            mirror: true,
            canvas: CanvasConfig::default(),
            segment_encoding: EncodingConfig::for_segment(),
            output_encoding: EncodingConfig::default(),
            seed: None,
            fail_fast: false,
        }
    }
}

impl PipelineConfig {
    /// Check every parameter that can be checked without probing media.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start_offset_secs.is_finite() || self.start_offset_secs < 0.0 {
            return Err(ConfigError::NegativeStartOffset(self.start_offset_secs));
        }

        if !self.overlap_trim_secs.is_finite() || self.overlap_trim_secs < 0.0 {
            return Err(ConfigError::NegativeOverlap(self.overlap_trim_secs));
        }

        // A non-positive step would never advance the window start.
        if !self.segment_secs.is_finite() || self.segment_secs <= self.overlap_trim_secs {
            return Err(ConfigError::SegmentTooShort {
                segment_secs: self.segment_secs,
                overlap_secs: self.overlap_trim_secs,
            });
        }

        if self.max_segments == 0 {
            return Err(ConfigError::ZeroMaxSegments);
        }

        validate_speed_factor(self.speed_factor)?;

        if let Some(background) = &self.background {
            if !(background.volume > 0.0 && background.volume <= 1.0) {
                return Err(ConfigError::InvalidVolume(background.volume));
            }
        }

        let canvas = &self.canvas;
        if canvas.width < 2 || canvas.height < 6 || canvas.fps == 0 || canvas.width % 2 != 0 || canvas.height % 2 != 0 {
            return Err(ConfigError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
                fps: canvas.fps,
            });
        }

        Ok(())
    }

    /// Distance between consecutive window starts.
    pub fn step_secs(&self) -> f64 {
        self.segment_secs - self.overlap_trim_secs
    }
}

/// Reject zero, negative, non-finite and out-of-range speed factors.
pub fn validate_speed_factor(speed_factor: f64) -> Result<(), ConfigError> {
    if speed_factor.is_finite() && (MIN_SPEED_FACTOR..=MAX_SPEED_FACTOR).contains(&speed_factor) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSpeedFactor(speed_factor))
    }
}
