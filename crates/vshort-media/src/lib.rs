//! FFmpeg CLI wrapper for building vertical shorts.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a cancellable runner
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe media inspection
//! - Segment planning, filler selection, rendering, audio mixing and
//!   portrait compositing
//! - The [`MediaToolkit`] seam the orchestrator drives

pub mod audio;
pub mod command;
pub mod compose;
pub mod error;
pub mod filler;
pub mod filters;
pub mod fs_utils;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod render;
pub mod toolkit;

pub use audio::{background_window, mix_background, BackgroundWindow};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{compose_short, ComposeRequest};
pub use error::{MediaError, MediaResult};
pub use filler::{discover_fillers, extract_filler, select_filler, FillerSelection};
pub use filters::tempo_stages;
pub use fs_utils::{ensure_dir, move_file};
pub use planner::plan_segments;
pub use probe::{probe_media, MediaInfo};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use render::{render_segment, RenderRequest, RenderedClip};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
