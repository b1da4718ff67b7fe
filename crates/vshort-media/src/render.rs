//! Segment rendering: cut a window out of the source and time-stretch it.

use std::path::{Path, PathBuf};
use tracing::info;

use vshort_models::{EncodingConfig, Segment};

use crate::command::FfmpegCommand;
use crate::error::MediaResult;
use crate::filters::{atempo_filter, setpts_filter};
use crate::probe::MediaInfo;
use crate::toolkit::MediaToolkit;

/// A temporary clip owned by the segment being processed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClip {
    pub path: PathBuf,
    /// Playback length in seconds
    pub duration: f64,
    pub has_audio: bool,
}

/// Render request for one window of the source.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub source: &'a Path,
    pub source_info: &'a MediaInfo,
    pub segment: Segment,
    pub speed_factor: f64,
    pub encoding: &'a EncodingConfig,
}

/// Build the re-encode command for a window.
///
/// Video timestamps are divided by the speed factor and the audio tempo is
/// multiplied by it through chained `atempo` stages. A factor of 1.0 adds no
/// filters at all.
pub fn render_command(request: &RenderRequest<'_>, output: impl AsRef<Path>) -> MediaResult<FfmpegCommand> {
    let segment = request.segment;
    let mut cmd = FfmpegCommand::new(request.source, output)
        .seek(segment.start)
        .duration(segment.duration());

    if let Some(filter) = setpts_filter(request.speed_factor)? {
        cmd = cmd.video_filter(filter);
    }

    if request.source_info.has_audio {
        if let Some(filter) = atempo_filter(request.speed_factor)? {
            cmd = cmd.audio_filter(filter);
        }
    } else {
        cmd = cmd.no_audio();
    }

    Ok(cmd.encoding(request.encoding))
}

/// Render a window of the source into `output`.
pub async fn render_segment(
    toolkit: &dyn MediaToolkit,
    request: &RenderRequest<'_>,
    output: impl AsRef<Path>,
) -> MediaResult<RenderedClip> {
    let output = output.as_ref();
    let cmd = render_command(request, output)?;
    let duration = request.segment.output_duration(request.speed_factor);

    info!(
        segment = %request.segment,
        speed_factor = request.speed_factor,
        output = %output.display(),
        "Rendering segment"
    );

    toolkit.run(&cmd, duration).await?;

    Ok(RenderedClip {
        path: output.to_path_buf(),
        duration,
        has_audio: request.source_info.has_audio,
    })
}
