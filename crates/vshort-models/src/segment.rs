//! Source timeline segments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timestamp::format_seconds;

/// A `[start, end)` window of the source video, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the window in source time.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Length after playback is sped up (or slowed down) by `speed_factor`.
    pub fn output_duration(&self, speed_factor: f64) -> f64 {
        self.duration() / speed_factor
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            format_seconds(self.start),
            format_seconds(self.end)
        )
    }
}

/// Segments chosen for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Segments to process, in processing order
    pub segments: Vec<Segment>,
    /// Number of windows generated before sampling
    pub candidate_count: usize,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the plan was reduced to a random subset of the candidates.
    pub fn was_sampled(&self) -> bool {
        self.segments.len() < self.candidate_count
    }
}
