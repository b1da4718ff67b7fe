//! Structured segment logging.
//!
//! Every line carries the run id and the 1-based segment index so the
//! progress of one short can be followed through interleaved output.

use tracing::{error, info, warn, Span};

use vshort_models::{Segment, SegmentStage};

/// Logger bound to one segment of one run.
#[derive(Debug, Clone)]
pub struct SegmentLogger {
    run_id: String,
    index: usize,
    total: usize,
    window: String,
}

impl SegmentLogger {
    pub fn new(run_id: &str, index: usize, total: usize, segment: &Segment) -> Self {
        Self {
            run_id: run_id.to_string(),
            index,
            total,
            window: segment.to_string(),
        }
    }

    pub fn log_start(&self) {
        info!(
            run_id = %self.run_id,
            segment = self.index,
            total = self.total,
            window = %self.window,
            "Segment started"
        );
    }

    /// Log that `stage` has been reached.
    pub fn log_stage(&self, stage: SegmentStage) {
        info!(
            run_id = %self.run_id,
            segment = self.index,
            stage = %stage,
            "Segment progress"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            segment = self.index,
            "Segment warning: {}", message
        );
    }

    /// Log a failure together with the last stage completed.
    pub fn log_error(&self, stage: SegmentStage, message: &str) {
        error!(
            run_id = %self.run_id,
            segment = self.index,
            stage = %stage,
            "Segment failed: {}", message
        );
    }

    pub fn log_completion(&self, output: &str, elapsed_ms: u64) {
        info!(
            run_id = %self.run_id,
            segment = self.index,
            output = %output,
            elapsed_ms,
            "Segment written"
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Span wrapping all work for this segment.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "segment",
            run_id = %self.run_id,
            segment = self.index,
            window = %self.window
        )
    }
}
