//! Command-line arguments for the `vshort` binary.

use clap::{Parser, ValueEnum, ValueHint};
use std::path::PathBuf;

use vshort_models::config::{
    DEFAULT_BACKGROUND_VOLUME, DEFAULT_MAX_SEGMENTS, DEFAULT_OVERLAP_TRIM_SECS,
    DEFAULT_SEGMENT_SECS,
};
use vshort_models::{
    parse_timestamp, BackgroundAudioConfig, BackgroundStart, CanvasConfig, PipelineConfig,
    ShortBackgroundPolicy,
};

use crate::config::WorkerConfig;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStartArg {
    /// Start the track at 0:00 for every short
    Beginning,
    /// Start at a random offset, drawn per short
    Random,
}

impl From<BackgroundStartArg> for BackgroundStart {
    fn from(arg: BackgroundStartArg) -> Self {
        match arg {
            BackgroundStartArg::Beginning => BackgroundStart::Beginning,
            BackgroundStartArg::Random => BackgroundStart::Random,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortBackgroundArg {
    /// Repeat the track
    Loop,
    /// Play once, then silence
    PadSilence,
    /// Fail the affected short
    Fail,
}

impl From<ShortBackgroundArg> for ShortBackgroundPolicy {
    fn from(arg: ShortBackgroundArg) -> Self {
        match arg {
            ShortBackgroundArg::Loop => ShortBackgroundPolicy::Loop,
            ShortBackgroundArg::PadSilence => ShortBackgroundPolicy::PadSilence,
            ShortBackgroundArg::Fail => ShortBackgroundPolicy::Fail,
        }
    }
}

/// Cut a long video into vertical shorts with a filler clip underneath.
#[derive(Parser, Debug, Clone)]
#[command(name = "vshort", version, about)]
pub struct Cli {
    /// Source video
    #[arg(value_hint = ValueHint::FilePath)]
    pub source: PathBuf,

    /// Folder of filler videos (.mp4, .mkv, .avi)
    #[arg(short = 'f', long, env = "VSHORT_FILLER_DIR", value_hint = ValueHint::DirPath)]
    pub fillers: PathBuf,

    /// Background music mixed under every short
    #[arg(short = 'b', long, env = "VSHORT_BACKGROUND", value_hint = ValueHint::FilePath)]
    pub background: Option<PathBuf>,

    /// Background volume in (0, 1]
    #[arg(long, env = "VSHORT_BACKGROUND_VOLUME", default_value_t = DEFAULT_BACKGROUND_VOLUME)]
    pub volume: f64,

    /// Where the background track starts
    #[arg(long, value_enum, env = "VSHORT_BACKGROUND_START", default_value = "beginning")]
    pub background_start: BackgroundStartArg,

    /// What to do when the background track is shorter than a short
    #[arg(long, value_enum, env = "VSHORT_SHORT_BACKGROUND", default_value = "loop")]
    pub short_background: ShortBackgroundArg,

    /// First window start (SS, MM:SS or HH:MM:SS[.mmm])
    #[arg(short = 's', long, env = "VSHORT_START", value_parser = parse_timestamp, default_value = "0")]
    pub start: f64,

    /// Window length in source seconds
    #[arg(short = 'd', long, env = "VSHORT_SEGMENT_SECS", default_value_t = DEFAULT_SEGMENT_SECS)]
    pub segment_secs: f64,

    /// Maximum number of shorts
    #[arg(short = 'n', long, env = "VSHORT_MAX_SEGMENTS", default_value_t = DEFAULT_MAX_SEGMENTS)]
    pub max_segments: usize,

    /// Seconds trimmed between consecutive window starts
    #[arg(long, env = "VSHORT_OVERLAP_SECS", default_value_t = DEFAULT_OVERLAP_TRIM_SECS)]
    pub overlap_secs: f64,

    /// Playback speed multiplier
    #[arg(long, env = "VSHORT_SPEED", default_value_t = 1.0)]
    pub speed: f64,

    /// Keep the main segment unmirrored
    #[arg(long)]
    pub no_mirror: bool,

    /// Canvas width
    #[arg(long, env = "VSHORT_WIDTH")]
    pub width: Option<u32>,

    /// Canvas height
    #[arg(long, env = "VSHORT_HEIGHT")]
    pub height: Option<u32>,

    /// Output frame rate
    #[arg(long, env = "VSHORT_FPS")]
    pub fps: Option<u32>,

    /// Seed for segment sampling and filler picks
    #[arg(long, env = "VSHORT_SEED")]
    pub seed: Option<u64>,

    /// Stop at the first failed short
    #[arg(long)]
    pub fail_fast: bool,

    /// Output directory (overrides VSHORT_OUTPUT_DIR)
    #[arg(short = 'o', long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Work directory for temp files (overrides VSHORT_WORK_DIR)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub work_dir: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        let defaults = CanvasConfig::default();
        PipelineConfig {
            start_offset_secs: self.start,
            segment_secs: self.segment_secs,
            max_segments: self.max_segments,
            overlap_trim_secs: self.overlap_secs,
            speed_factor: self.speed,
            background: self.background.as_ref().map(|path| {
                BackgroundAudioConfig::new(path)
                    .with_volume(self.volume)
                    .with_start(self.background_start.into())
                    .with_short_policy(self.short_background.into())
            }),
            mirror: !self.no_mirror,
            canvas: CanvasConfig::new(
                self.width.unwrap_or(defaults.width),
                self.height.unwrap_or(defaults.height),
                self.fps.unwrap_or(defaults.fps),
            ),
            seed: self.seed,
            fail_fast: self.fail_fast,
            ..Default::default()
        }
    }

    /// Apply directory overrides on top of the environment config.
    pub fn worker_config(&self, mut base: WorkerConfig) -> WorkerConfig {
        if let Some(dir) = &self.output_dir {
            base = base.with_output_dir(dir);
        }
        if let Some(dir) = &self.work_dir {
            base = base.with_work_dir(dir);
        }
        base
    }
}
