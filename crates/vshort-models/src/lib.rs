//! Shared data models for the vshort workspace.
//!
//! This crate provides Serde-serializable types for:
//! - Pipeline, canvas and encoding configuration
//! - Source segments and segment plans
//! - Per-segment outcomes and run reports
//! - Timestamp parsing

pub mod canvas;
pub mod config;
pub mod encoding;
pub mod report;
pub mod segment;
pub mod timestamp;

// Re-export common types
pub use canvas::CanvasConfig;
pub use config::{
    validate_speed_factor, BackgroundAudioConfig, BackgroundStart, ConfigError, PipelineConfig,
    ShortBackgroundPolicy,
};
pub use encoding::EncodingConfig;
pub use report::{RunReport, SegmentOutcome, SegmentStage, SegmentStatus};
pub use segment::{Segment, SegmentPlan};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
