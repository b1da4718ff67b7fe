//! Filler clip discovery and selection.
//!
//! Every segment gets an independent pick: one filler file uniformly at
//! random, then a uniformly random sub-range exactly as long as the segment.
//! The same filler may be picked for several segments of one run.

use rand::seq::IndexedRandom;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::toolkit::MediaToolkit;

/// Extensions accepted as filler videos (compared case-insensitively).
pub const FILLER_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi"];

/// A chosen filler sub-range.
#[derive(Debug, Clone, PartialEq)]
pub struct FillerSelection {
    pub asset: PathBuf,
    pub start: f64,
    pub end: f64,
    /// Full length of the filler file
    pub asset_duration: f64,
}

impl FillerSelection {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

fn has_filler_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FILLER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// List filler videos in `dir`, sorted by path.
pub async fn discover_fillers(dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MediaError::FileNotFound(dir.to_path_buf()));
    }

    let mut fillers = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && has_filler_extension(&path) {
            fillers.push(path);
        }
    }

    if fillers.is_empty() {
        return Err(MediaError::NoFillers(dir.to_path_buf()));
    }

    fillers.sort();
    info!(dir = %dir.display(), count = fillers.len(), "Discovered filler videos");
    Ok(fillers)
}

/// Pick a filler and a `duration`-long sub-range of it.
///
/// Fails with [`MediaError::InsufficientFiller`] when the picked file is
/// shorter than `duration`; the range is never truncated.
pub async fn select_filler<R: Rng + ?Sized>(
    toolkit: &dyn MediaToolkit,
    fillers: &[PathBuf],
    duration: f64,
    rng: &mut R,
) -> MediaResult<FillerSelection> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(MediaError::internal(format!(
            "filler duration must be positive, got {duration}"
        )));
    }

    let asset = fillers
        .choose(rng)
        .ok_or_else(|| MediaError::internal("no filler candidates"))?
        .clone();

    let info = toolkit.probe(&asset).await?;
    if info.duration < duration {
        return Err(MediaError::InsufficientFiller {
            path: asset,
            available: info.duration,
            required: duration,
        });
    }

    let slack = info.duration - duration;
    let start = if slack > 0.0 {
        rng.random_range(0.0..=slack)
    } else {
        0.0
    };

    debug!(
        filler = %asset.display(),
        start,
        duration,
        filler_duration = info.duration,
        "Selected filler range"
    );

    Ok(FillerSelection {
        asset,
        start,
        end: start + duration,
        asset_duration: info.duration,
    })
}

/// Stream-copy command extracting the selected range, video only.
pub fn extract_command(selection: &FillerSelection, output: impl AsRef<Path>) -> FfmpegCommand {
    FfmpegCommand::new(&selection.asset, output)
        .seek(selection.start)
        .duration(selection.duration())
        .video_copy()
        .no_audio()
}

/// Extract the selected range into `output`.
pub async fn extract_filler(
    toolkit: &dyn MediaToolkit,
    selection: &FillerSelection,
    output: impl AsRef<Path>,
) -> MediaResult<PathBuf> {
    let output = output.as_ref();
    let cmd = extract_command(selection, output);
    toolkit.run(&cmd, selection.duration()).await?;
    Ok(output.to_path_buf())
}
