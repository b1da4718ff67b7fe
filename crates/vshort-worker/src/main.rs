//! `vshort` binary: turn a long video into vertical shorts.

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vshort_media::{check_ffmpeg, check_ffprobe, FfmpegToolkit};
use vshort_worker::{Cli, ShortsPipeline, WorkerConfig};

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for terminals, JSON for log collectors
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    // Matches every vshort* crate target
    let env_filter = EnvFilter::from_default_env().add_directive("vshort=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing()?;

    info!("Starting vshort");

    let worker = cli.worker_config(WorkerConfig::from_env());
    info!("Worker config: {:?}", worker);

    let ffmpeg = check_ffmpeg().context("ffmpeg is required")?;
    let ffprobe = check_ffprobe().context("ffprobe is required")?;
    info!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Media tools found");

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, cancelling the current short");
            cancel_tx.send(true).ok();
        }
    });

    let mut toolkit = FfmpegToolkit::new().with_cancel(cancel_rx.clone());
    if let Some(timeout) = worker.ffmpeg_timeout {
        toolkit = toolkit.with_ffmpeg_timeout(timeout.as_secs());
    }
    if let Some(timeout) = worker.probe_timeout {
        toolkit = toolkit.with_probe_timeout(timeout);
    }

    let pipeline =
        ShortsPipeline::new(toolkit, cli.pipeline_config(), worker).with_cancel(cancel_rx);

    let report = match pipeline.run(&cli.source, &cli.fillers).await {
        Ok(report) => report,
        Err(e) => {
            error!("Run aborted: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(report = %path.display(), "Run report written");
    }

    for output in report.outputs() {
        println!("{}", output.display());
    }
    println!("{}", report.summary());

    if report.written_count() == 0 {
        std::process::exit(1);
    }
    Ok(())
}
