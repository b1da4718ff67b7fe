//! Portrait compositing of the main segment over a filler clip.

use std::path::{Path, PathBuf};
use tracing::info;

use vshort_models::{CanvasConfig, EncodingConfig};

use crate::command::FfmpegCommand;
use crate::error::MediaResult;
use crate::filters::build_stack_filter;
use crate::render::RenderedClip;
use crate::toolkit::MediaToolkit;

/// Inputs to one composition.
#[derive(Debug, Clone)]
pub struct ComposeRequest<'a> {
    /// Main segment (top panel)
    pub main: &'a RenderedClip,
    /// Extracted filler range (bottom panel, video only)
    pub filler: &'a Path,
    pub canvas: &'a CanvasConfig,
    pub mirror: bool,
    pub encoding: &'a EncodingConfig,
}

/// Build the stacking command. Audio comes from the main segment only.
pub fn compose_command(request: &ComposeRequest<'_>, output: impl AsRef<Path>) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(&request.main.path, output)
        .add_input(request.filler)
        .filter_complex(build_stack_filter(request.canvas, request.mirror))
        .map("[vout]");

    if request.main.has_audio {
        cmd = cmd.map("0:a");
    } else {
        cmd = cmd.no_audio();
    }

    cmd.encoding(request.encoding)
        .frame_rate(request.canvas.fps)
        .faststart()
}

/// Stack the main segment and filler into `output`.
pub async fn compose_short(
    toolkit: &dyn MediaToolkit,
    request: &ComposeRequest<'_>,
    output: impl AsRef<Path>,
) -> MediaResult<PathBuf> {
    let output = output.as_ref();
    let cmd = compose_command(request, output);
    toolkit.run(&cmd, request.main.duration).await?;

    info!(
        output = %output.display(),
        width = request.canvas.width,
        height = request.canvas.height,
        mirror = request.mirror,
        "Composed short"
    );
    Ok(output.to_path_buf())
}
