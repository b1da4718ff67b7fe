//! Per-segment results and run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::segment::Segment;

/// Last stage a segment completed.
///
/// Stages advance in declaration order; a failure is recorded together with
/// the stage reached before the failing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStage {
    #[default]
    Planned,
    Rendered,
    Mixed,
    FillerPicked,
    Composed,
    Written,
}

impl SegmentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStage::Planned => "planned",
            SegmentStage::Rendered => "rendered",
            SegmentStage::Mixed => "mixed",
            SegmentStage::FillerPicked => "filler_picked",
            SegmentStage::Composed => "composed",
            SegmentStage::Written => "written",
        }
    }
}

impl fmt::Display for SegmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status of a planned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Written,
    Failed,
    /// Never attempted (cancelled run or fail-fast stop)
    Skipped,
}

/// Result of processing one planned segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOutcome {
    /// 1-based position in the plan, also used in the output file name
    pub index: usize,
    pub segment: Segment,
    pub status: SegmentStatus,
    /// Last stage completed
    pub stage: SegmentStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl SegmentOutcome {
    pub fn written(
        index: usize,
        segment: Segment,
        output: PathBuf,
        filler: Option<PathBuf>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            index,
            segment,
            status: SegmentStatus::Written,
            stage: SegmentStage::Written,
            output: Some(output),
            filler,
            error: None,
            elapsed_ms,
        }
    }

    pub fn failed(
        index: usize,
        segment: Segment,
        stage: SegmentStage,
        filler: Option<PathBuf>,
        error: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            index,
            segment,
            status: SegmentStatus::Failed,
            stage,
            output: None,
            filler,
            error: Some(error.into()),
            elapsed_ms,
        }
    }

    pub fn skipped(index: usize, segment: Segment, reason: impl Into<String>) -> Self {
        Self {
            index,
            segment,
            status: SegmentStatus::Skipped,
            stage: SegmentStage::Planned,
            output: None,
            filler: None,
            error: Some(reason.into()),
            elapsed_ms: 0,
        }
    }

    pub fn is_written(&self) -> bool {
        self.status == SegmentStatus::Written
    }
}

/// Everything a run produced, segment by segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub source: PathBuf,
    pub source_duration: f64,
    /// Windows generated before sampling
    pub candidate_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SegmentOutcome>,
}

impl RunReport {
    pub fn written_count(&self) -> usize {
        self.count(SegmentStatus::Written)
    }

    pub fn failed_count(&self) -> usize {
        self.count(SegmentStatus::Failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(SegmentStatus::Skipped)
    }

    fn count(&self, status: SegmentStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Paths of every written short, in plan order.
    pub fn outputs(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.output.as_ref())
            .collect()
    }

    /// True when every planned segment was written.
    pub fn is_complete(&self) -> bool {
        self.written_count() == self.outcomes.len()
    }

    /// One-line status for logs and terminal output.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} of {} shorts written",
            self.written_count(),
            self.outcomes.len()
        );
        if self.failed_count() > 0 {
            summary.push_str(&format!(", {} failed", self.failed_count()));
        }
        if self.skipped_count() > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped_count()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<SegmentOutcome>) -> RunReport {
        RunReport {
            run_id: "run-1".to_string(),
            source: PathBuf::from("source.mkv"),
            source_duration: 700.0,
            candidate_count: outcomes.len(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes,
        }
    }

    #[test]
    fn test_stage_ordering() {
        assert!(SegmentStage::Planned < SegmentStage::Rendered);
        assert!(SegmentStage::Mixed < SegmentStage::FillerPicked);
        assert!(SegmentStage::Composed < SegmentStage::Written);
    }

    #[test]
    fn test_summary_counts() {
        let segment = Segment::new(0.0, 30.0);
        let report = report(vec![
            SegmentOutcome::written(1, segment, PathBuf::from("out/1.mp4"), None, 10),
            SegmentOutcome::failed(2, segment, SegmentStage::Planned, None, "ffmpeg exited 1", 5),
            SegmentOutcome::skipped(3, segment, "cancelled"),
        ]);

        assert_eq!(report.written_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.outputs(), vec![&PathBuf::from("out/1.mp4")]);
        assert!(!report.is_complete());
        assert_eq!(report.summary(), "1 of 3 shorts written, 1 failed, 1 skipped");
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let outcome = SegmentOutcome::failed(
            4,
            Segment::new(10.0, 40.0),
            SegmentStage::FillerPicked,
            Some(PathBuf::from("fillers/a.mp4")),
            "boom",
            1,
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "filler_picked");
        assert!(json.get("output").is_none());
    }
}
