//! Shorts pipeline worker.
//!
//! This crate provides:
//! - The per-segment orchestration (`ShortsPipeline`)
//! - Worker configuration from the environment
//! - Structured segment logging
//! - CLI argument parsing for the `vshort` binary

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use cli::Cli;
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::SegmentLogger;
pub use pipeline::{output_file_name, ShortsPipeline};
