//! End-to-end pipeline tests against a recording fake toolkit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio_test::{assert_err, assert_ok};

use vshort_media::{FfmpegCommand, MediaError, MediaInfo, MediaResult, MediaToolkit};
use vshort_models::{
    BackgroundAudioConfig, PipelineConfig, SegmentStage, SegmentStatus, ShortBackgroundPolicy,
};
use vshort_worker::{ShortsPipeline, WorkerConfig, WorkerError};

/// Records every ffmpeg invocation and writes a placeholder output file.
#[derive(Default)]
struct FakeToolkit {
    media: HashMap<PathBuf, MediaInfo>,
    filler_duration: f64,
    /// Fail the n-th (1-based) run whose output file has this name
    fail_on: Option<(&'static str, usize)>,
    /// Flip this flag during the n-th render, then report cancellation
    cancel_on_render: Option<(usize, watch::Sender<bool>)>,
    calls: Mutex<Vec<Vec<String>>>,
    counts: Mutex<HashMap<String, usize>>,
}

impl FakeToolkit {
    fn new(source: &Path, source_secs: f64, filler_secs: f64) -> Self {
        let mut media = HashMap::new();
        media.insert(source.to_path_buf(), MediaInfo::video(source_secs, 1920, 1080));
        Self {
            media,
            filler_duration: filler_secs,
            ..Default::default()
        }
    }

    fn with_background(mut self, path: &Path, secs: f64) -> Self {
        self.media.insert(path.to_path_buf(), MediaInfo::audio(secs));
        self
    }

    fn calls_for(&self, file_name: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|args| args.last().map(|a| a.ends_with(file_name)).unwrap_or(false))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MediaToolkit for FakeToolkit {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        if let Some(info) = self.media.get(path) {
            return Ok(info.clone());
        }
        if path.exists() {
            return Ok(MediaInfo::video(self.filler_duration, 1280, 720).without_audio());
        }
        Err(MediaError::FileNotFound(path.to_path_buf()))
    }

    async fn run(&self, cmd: &FfmpegCommand, _expected_secs: f64) -> MediaResult<()> {
        self.calls.lock().unwrap().push(cmd.build_args());

        let name = cmd
            .output_path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let nth = {
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(name.clone()).or_insert(0);
            *count += 1;
            *count
        };

        if let Some((target, n)) = self.fail_on {
            if name == target && nth == n {
                return Err(MediaError::ffmpeg_failed(
                    "FFmpeg exited with status 1",
                    Some("simulated failure".to_string()),
                    Some(1),
                ));
            }
        }
        if let Some((n, tx)) = &self.cancel_on_render {
            if name == "rendered.mp4" && nth == *n {
                tx.send(true).ok();
                return Err(MediaError::Cancelled);
            }
        }

        tokio::fs::write(cmd.output_path(), name.as_bytes()).await?;
        Ok(())
    }
}

struct Fixture {
    _root: TempDir,
    source: PathBuf,
    fillers: PathBuf,
    worker: WorkerConfig,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let source = root.path().join("talk.mp4");
        std::fs::write(&source, b"source").unwrap();

        let fillers = root.path().join("fillers");
        std::fs::create_dir(&fillers).unwrap();
        for name in ["parkour.mp4", "slime.MKV", "readme.txt"] {
            std::fs::write(fillers.join(name), b"filler").unwrap();
        }

        let worker = WorkerConfig::default()
            .with_work_dir(root.path().join("work"))
            .with_output_dir(root.path().join("out"));

        Self {
            _root: root,
            source,
            fillers,
            worker,
        }
    }

    fn work_dir_entries(&self) -> usize {
        std::fs::read_dir(&self.worker.work_dir).unwrap().count()
    }

    fn output_names(&self) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(&self.worker.output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// The 700s source starting at 568s with 70s windows: three segments.
fn tail_config() -> PipelineConfig {
    PipelineConfig {
        start_offset_secs: 568.0,
        segment_secs: 70.0,
        max_segments: 5,
        seed: Some(7),
        ..Default::default()
    }
}

#[tokio::test]
async fn writes_every_planned_short() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit::new(&fx.source, 700.0, 600.0);
    let pipeline = ShortsPipeline::new(toolkit, tail_config(), fx.worker.clone());

    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.candidate_count, 3);
    assert!(report.is_complete());
    assert_eq!(report.summary(), "3 of 3 shorts written");

    let names = fx.output_names();
    assert_eq!(names.len(), 3);
    for (i, name) in names.iter().enumerate() {
        assert!(name.starts_with(&format!("short_video_{}_", i + 1)), "{name}");
        assert!(name.ends_with(".mp4"));
    }
    for outcome in &report.outcomes {
        assert_eq!(outcome.stage, SegmentStage::Written);
        assert!(outcome.output.as_ref().unwrap().exists());
        let filler = outcome.filler.as_ref().unwrap();
        assert!(filler.ends_with("parkour.mp4") || filler.ends_with("slime.MKV"));
    }
    assert_eq!(fx.work_dir_entries(), 0);
}

#[tokio::test]
async fn repeated_runs_never_replace_earlier_shorts() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit::new(&fx.source, 700.0, 600.0);
    let pipeline = ShortsPipeline::new(&toolkit, tail_config(), fx.worker.clone());

    let first = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);
    let second = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);

    assert!(first.is_complete() && second.is_complete());
    let names = fx.output_names();
    assert_eq!(names.len(), 6, "{names:?}");
    for outcome in first.outcomes.iter().chain(&second.outcomes) {
        assert!(outcome.output.as_ref().unwrap().exists());
    }
}

#[tokio::test]
async fn render_failure_skips_only_that_segment() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit {
        fail_on: Some(("rendered.mp4", 2)),
        ..FakeToolkit::new(&fx.source, 700.0, 600.0)
    };
    let pipeline = ShortsPipeline::new(toolkit, tail_config(), fx.worker.clone());

    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);

    assert_eq!(report.written_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(fx.output_names().len(), 2);

    let failed = &report.outcomes[1];
    assert_eq!(failed.status, SegmentStatus::Failed);
    assert_eq!(failed.stage, SegmentStage::Planned);
    assert!(failed.error.as_ref().unwrap().contains("FFmpeg command failed"));
    assert!(failed.filler.is_none());

    assert_eq!(report.outcomes[2].status, SegmentStatus::Written);
    assert_eq!(fx.work_dir_entries(), 0, "temp files of the failed segment remain");
}

#[tokio::test]
async fn short_filler_fails_each_segment_after_mix() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit::new(&fx.source, 700.0, 20.0);
    let config = PipelineConfig {
        segment_secs: 30.0,
        start_offset_secs: 0.0,
        max_segments: 2,
        ..tail_config()
    };
    let pipeline = ShortsPipeline::new(toolkit, config, fx.worker.clone());

    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);

    assert_eq!(report.written_count(), 0);
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, SegmentStatus::Failed);
        assert_eq!(outcome.stage, SegmentStage::Mixed);
        assert!(outcome.filler.is_none());
        let error = outcome.error.as_ref().unwrap();
        assert!(error.contains("is 20.00s long, shorter than"), "{error}");
    }
    assert_eq!(fx.work_dir_entries(), 0);
}

#[tokio::test]
async fn fail_fast_skips_remaining_segments() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit {
        fail_on: Some(("short.mp4", 1)),
        ..FakeToolkit::new(&fx.source, 700.0, 600.0)
    };
    let config = PipelineConfig {
        fail_fast: true,
        ..tail_config()
    };
    let pipeline = ShortsPipeline::new(toolkit, config, fx.worker.clone());

    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);

    assert_eq!(report.outcomes[0].status, SegmentStatus::Failed);
    assert_eq!(report.outcomes[0].stage, SegmentStage::FillerPicked);
    assert!(report.outcomes[0].filler.is_some());
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(report.summary(), "0 of 3 shorts written, 1 failed, 2 skipped");
}

#[tokio::test]
async fn cancellation_fails_current_and_skips_rest() {
    let fx = Fixture::new();
    let (tx, rx) = watch::channel(false);
    let toolkit = FakeToolkit {
        cancel_on_render: Some((2, tx)),
        ..FakeToolkit::new(&fx.source, 700.0, 600.0)
    };
    let pipeline =
        ShortsPipeline::new(toolkit, tail_config(), fx.worker.clone()).with_cancel(rx);

    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);

    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            SegmentStatus::Written,
            SegmentStatus::Failed,
            SegmentStatus::Skipped
        ]
    );
    assert!(report.outcomes[1]
        .error
        .as_ref()
        .unwrap()
        .contains("Operation cancelled"));
    assert_eq!(fx.work_dir_entries(), 0);
}

#[tokio::test]
async fn background_is_mixed_under_every_segment() {
    let fx = Fixture::new();
    let music = fx.fillers.parent().unwrap().join("lofi.mp3");
    std::fs::write(&music, b"music").unwrap();

    let toolkit = FakeToolkit::new(&fx.source, 700.0, 600.0).with_background(&music, 45.0);
    let config = PipelineConfig {
        background: Some(
            BackgroundAudioConfig::new(&music)
                .with_volume(0.2)
                .with_short_policy(ShortBackgroundPolicy::Loop),
        ),
        ..tail_config()
    };
    let pipeline = ShortsPipeline::new(&toolkit, config, fx.worker.clone());

    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);
    assert!(report.is_complete());

    let mixes = toolkit.calls_for("mixed.mp4");
    assert_eq!(mixes.len(), 3);
    for args in &mixes {
        let graph = args.iter().find(|a| a.contains("amix")).expect("mix graph");
        assert!(graph.contains("volume=0.2"));
    }
}

#[tokio::test]
async fn recorded_commands_follow_stage_order() {
    let fx = Fixture::new();
    let music = fx.fillers.parent().unwrap().join("lofi.mp3");
    std::fs::write(&music, b"music").unwrap();

    let toolkit = FakeToolkit::new(&fx.source, 700.0, 600.0).with_background(&music, 45.0);
    let config = PipelineConfig {
        max_segments: 1,
        background: Some(BackgroundAudioConfig::new(&music)),
        ..tail_config()
    };

    let pipeline = ShortsPipeline::new(&toolkit, config, fx.worker.clone());
    let report = assert_ok!(pipeline.run(&fx.source, &fx.fillers).await);
    assert_eq!(report.written_count(), 1);

    let order: Vec<String> = toolkit
        .calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|args| args.last().cloned())
        .map(|out| {
            Path::new(&out)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    assert_eq!(order, vec!["rendered.mp4", "mixed.mp4", "filler.mp4", "short.mp4"]);

    let mix = &toolkit.calls_for("mixed.mp4")[0];
    assert!(mix.iter().any(|a| a == "-stream_loop"), "45s bed under a 70s clip loops");

    let compose = &toolkit.calls_for("short.mp4")[0];
    let graph = compose
        .iter()
        .find(|a| a.contains("vstack"))
        .expect("stack filter");
    assert!(graph.contains("hflip"));
    assert!(graph.contains("1080"));
}

#[tokio::test]
async fn same_seed_same_segments() {
    let fx = Fixture::new();
    let config = PipelineConfig {
        start_offset_secs: 0.0,
        segment_secs: 30.0,
        max_segments: 3,
        seed: Some(99),
        ..Default::default()
    };

    let first = ShortsPipeline::new(
        FakeToolkit::new(&fx.source, 250.0, 600.0),
        config.clone(),
        fx.worker.clone(),
    )
    .run(&fx.source, &fx.fillers)
    .await
    .unwrap();
    let second = ShortsPipeline::new(
        FakeToolkit::new(&fx.source, 250.0, 600.0),
        config,
        fx.worker.clone(),
    )
    .run(&fx.source, &fx.fillers)
    .await
    .unwrap();

    assert_eq!(first.candidate_count, 10);
    let segments = |r: &vshort_models::RunReport| {
        r.outcomes.iter().map(|o| o.segment).collect::<Vec<_>>()
    };
    assert_eq!(segments(&first), segments(&second));
    assert_eq!(segments(&first).len(), 3);
}

#[tokio::test]
async fn start_beyond_duration_is_fatal() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit::new(&fx.source, 500.0, 600.0);
    let pipeline = ShortsPipeline::new(toolkit, tail_config(), fx.worker.clone());

    let err = assert_err!(pipeline.run(&fx.source, &fx.fillers).await);
    assert!(matches!(err, WorkerError::Config(_)));
    assert!(err.is_fatal());
    assert!(fx.output_names().is_empty());
}

#[tokio::test]
async fn empty_filler_folder_is_fatal() {
    let fx = Fixture::new();
    let empty = fx.fillers.parent().unwrap().join("no-fillers");
    std::fs::create_dir(&empty).unwrap();

    let toolkit = FakeToolkit::new(&fx.source, 700.0, 600.0);
    let pipeline = ShortsPipeline::new(toolkit, tail_config(), fx.worker.clone());

    let err = assert_err!(pipeline.run(&fx.source, &empty).await);
    assert!(matches!(err, WorkerError::Media(MediaError::NoFillers(_))));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn missing_source_is_fatal() {
    let fx = Fixture::new();
    let toolkit = FakeToolkit::new(&fx.source, 700.0, 600.0);
    let pipeline = ShortsPipeline::new(toolkit, tail_config(), fx.worker.clone());

    let missing = fx.source.with_file_name("gone.mp4");
    let err = assert_err!(pipeline.run(&missing, &fx.fillers).await);
    assert!(matches!(err, WorkerError::Media(MediaError::FileNotFound(_))));
    assert!(err.is_fatal());
}
