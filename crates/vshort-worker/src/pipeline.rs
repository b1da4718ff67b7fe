//! Shorts pipeline orchestration.
//!
//! Each planned segment moves through
//! `Planned -> Rendered -> Mixed -> FillerPicked -> Composed -> Written`
//! inside its own temp directory under the work dir. A failing segment is
//! logged, its temp directory removed, and the run moves on to the next one.

use chrono::{Local, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use vshort_media::{
    compose_short, discover_fillers, ensure_dir, extract_filler, mix_background, move_file,
    plan_segments, render_segment, select_filler, ComposeRequest, MediaError, MediaInfo,
    MediaToolkit, RenderRequest,
};
use vshort_models::{PipelineConfig, RunReport, Segment, SegmentOutcome, SegmentStage};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::SegmentLogger;

/// Output file name for the `index`-th short (1-based) of a run started at
/// `stamp` (`YYYYmmddHHMMSS`).
pub fn output_file_name(index: usize, stamp: &str) -> String {
    format!("short_video_{index}_{stamp}.mp4")
}

/// Inputs resolved once per run and shared by every segment.
#[derive(Debug)]
struct RunContext {
    run_id: String,
    source: PathBuf,
    source_info: MediaInfo,
    fillers: Vec<PathBuf>,
    background_secs: Option<f64>,
    stamp: String,
    total: usize,
}

/// Where a segment got to, kept current so a failure can be reported
/// against the last completed stage.
#[derive(Debug, Default)]
struct SegmentState {
    stage: SegmentStage,
    filler: Option<PathBuf>,
}

/// Orchestrates planner, renderer, mixer, filler selector and compositor.
pub struct ShortsPipeline<T: MediaToolkit> {
    toolkit: T,
    config: PipelineConfig,
    worker: WorkerConfig,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl<T: MediaToolkit> ShortsPipeline<T> {
    pub fn new(toolkit: T, config: PipelineConfig, worker: WorkerConfig) -> Self {
        Self {
            toolkit,
            config,
            worker,
            cancel_rx: None,
        }
    }

    /// Stop starting new segments once `cancel_rx` turns true.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    /// Produce shorts from `source` with fillers taken from `filler_dir`.
    ///
    /// Returns `Err` only for problems that prevent any segment from being
    /// attempted. Per-segment failures are recorded in the report.
    pub async fn run(&self, source: &Path, filler_dir: &Path) -> WorkerResult<RunReport> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        let (ctx, plan) = self.prepare(run_id, source, filler_dir).await?;
        // Filler and background picks draw from a generator separate from
        // the planner's.
        let mut rng = self.rng();
        let mut outcomes = Vec::with_capacity(plan.len());
        let mut stop_reason: Option<&'static str> = None;

        for (i, segment) in plan.segments.iter().copied().enumerate() {
            let index = i + 1;

            if stop_reason.is_none() && self.is_cancelled() {
                stop_reason = Some("run cancelled");
            }
            if let Some(reason) = stop_reason {
                outcomes.push(SegmentOutcome::skipped(index, segment, reason));
                continue;
            }

            let outcome = self.process_segment(&ctx, index, segment, &mut rng).await;
            if !outcome.is_written() && self.config.fail_fast {
                stop_reason = Some("stopped after earlier failure");
            }
            outcomes.push(outcome);
        }

        let report = RunReport {
            run_id: ctx.run_id,
            source: ctx.source,
            source_duration: ctx.source_info.duration,
            candidate_count: plan.candidate_count,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        info!(
            run_id = %report.run_id,
            written = report.written_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "{}", report.summary()
        );

        Ok(report)
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Validate inputs, probe media and plan segments. Every error here is
    /// fatal to the run.
    async fn prepare(
        &self,
        run_id: String,
        source: &Path,
        filler_dir: &Path,
    ) -> WorkerResult<(RunContext, vshort_models::SegmentPlan)> {
        self.config.validate()?;

        ensure_dir(&self.worker.work_dir).await?;
        ensure_dir(&self.worker.output_dir).await?;

        let source_info = self.toolkit.probe(source).await?;
        if !source_info.has_video {
            return Err(MediaError::InvalidVideo(format!(
                "{} has no video stream",
                source.display()
            ))
            .into());
        }

        let fillers = discover_fillers(filler_dir).await?;

        let background_secs = match &self.config.background {
            Some(background) => {
                let info = self.toolkit.probe(&background.path).await?;
                if !info.has_audio {
                    return Err(MediaError::InvalidVideo(format!(
                        "{} has no audio stream",
                        background.path.display()
                    ))
                    .into());
                }
                Some(info.duration)
            }
            None => None,
        };

        let plan = plan_segments(source_info.duration, &self.config, &mut self.rng())?;

        info!(
            run_id = %run_id,
            source = %source.display(),
            duration = source_info.duration,
            fillers = fillers.len(),
            candidates = plan.candidate_count,
            planned = plan.len(),
            "Starting shorts run"
        );

        let ctx = RunContext {
            run_id,
            source: source.to_path_buf(),
            source_info,
            fillers,
            background_secs,
            stamp: Local::now().format("%Y%m%d%H%M%S").to_string(),
            total: plan.len(),
        };
        Ok((ctx, plan))
    }

    async fn process_segment(
        &self,
        ctx: &RunContext,
        index: usize,
        segment: Segment,
        rng: &mut StdRng,
    ) -> SegmentOutcome {
        let logger = SegmentLogger::new(&ctx.run_id, index, ctx.total, &segment);
        let span = logger.create_span();
        let started = Instant::now();
        let mut state = SegmentState::default();

        logger.log_start();

        let result: Result<PathBuf, MediaError> = async {
            let workspace = tempfile::Builder::new()
                .prefix(&format!("segment-{index:03}-"))
                .tempdir_in(&self.worker.work_dir)
                .map_err(MediaError::from)?;

            let output = self
                .run_stages(ctx, index, segment, workspace.path(), &logger, &mut state, rng)
                .await;

            if let Err(e) = workspace.close() {
                logger.log_warning(&format!("could not remove segment temp dir: {e}"));
            }
            output
        }
        .instrument(span)
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(output) => {
                logger.log_completion(&output.display().to_string(), elapsed_ms);
                SegmentOutcome::written(index, segment, output, state.filler, elapsed_ms)
            }
            Err(e) => {
                let err = WorkerError::segment_failed(index, state.stage, e);
                logger.log_error(state.stage, &err.to_string());
                SegmentOutcome::failed(
                    index,
                    segment,
                    state.stage,
                    state.filler,
                    err.to_string(),
                    elapsed_ms,
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_stages(
        &self,
        ctx: &RunContext,
        index: usize,
        segment: Segment,
        workspace: &Path,
        logger: &SegmentLogger,
        state: &mut SegmentState,
        rng: &mut StdRng,
    ) -> Result<PathBuf, MediaError> {
        let config = &self.config;
        let toolkit: &dyn MediaToolkit = &self.toolkit;

        let render = RenderRequest {
            source: &ctx.source,
            source_info: &ctx.source_info,
            segment,
            speed_factor: config.speed_factor,
            encoding: &config.segment_encoding,
        };
        let mut main = render_segment(toolkit, &render, workspace.join("rendered.mp4")).await?;
        self.advance(state, SegmentStage::Rendered, logger)?;

        match (&config.background, ctx.background_secs) {
            (Some(background), Some(background_secs)) => {
                main = mix_background(
                    toolkit,
                    &main,
                    background,
                    background_secs,
                    &config.segment_encoding,
                    workspace.join("mixed.mp4"),
                    rng,
                )
                .await?;
            }
            _ => debug!(segment = index, "No background track, keeping clip audio"),
        }
        self.advance(state, SegmentStage::Mixed, logger)?;

        let selection = select_filler(toolkit, &ctx.fillers, main.duration, rng).await?;
        state.filler = Some(selection.asset.clone());
        let filler_clip = extract_filler(toolkit, &selection, workspace.join("filler.mp4")).await?;
        self.advance(state, SegmentStage::FillerPicked, logger)?;

        let compose = ComposeRequest {
            main: &main,
            filler: &filler_clip,
            canvas: &config.canvas,
            mirror: config.mirror,
            encoding: &config.output_encoding,
        };
        let composed = compose_short(toolkit, &compose, workspace.join("short.mp4")).await?;
        self.advance(state, SegmentStage::Composed, logger)?;

        let output = self.output_path(ctx, index).await?;
        move_file(&composed, &output).await?;
        state.stage = SegmentStage::Written;

        Ok(output)
    }

    /// Destination for a finished short. Falls back to a run-qualified name
    /// when another run already wrote the timestamped one.
    async fn output_path(&self, ctx: &RunContext, index: usize) -> Result<PathBuf, MediaError> {
        let dir = &self.worker.output_dir;
        let preferred = dir.join(output_file_name(index, &ctx.stamp));
        if !tokio::fs::try_exists(&preferred).await? {
            return Ok(preferred);
        }

        let run = ctx.run_id.get(..8).unwrap_or(&ctx.run_id);
        let fallback = dir.join(format!("short_video_{index}_{}_{run}.mp4", ctx.stamp));
        debug!(
            taken = %preferred.display(),
            output = %fallback.display(),
            "Output name taken, using run-qualified name"
        );
        Ok(fallback)
    }

    /// Record a completed stage, bailing out if the run was cancelled
    /// meanwhile.
    fn advance(
        &self,
        state: &mut SegmentState,
        stage: SegmentStage,
        logger: &SegmentLogger,
    ) -> Result<(), MediaError> {
        state.stage = stage;
        logger.log_stage(stage);
        if self.is_cancelled() {
            warn!(segment = logger.index(), stage = %stage, "Cancelled mid-segment");
            return Err(MediaError::Cancelled);
        }
        Ok(())
    }
}
