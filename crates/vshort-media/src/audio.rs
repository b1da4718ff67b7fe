//! Background music mixing.
//!
//! The background track is trimmed to the clip length, scaled by the
//! configured volume and summed with the clip's own audio (no ducking, no
//! normalisation). Tracks shorter than the clip follow the configured
//! [`ShortBackgroundPolicy`].

use rand::Rng;
use std::path::Path;
use tracing::{debug, info};

use vshort_models::{BackgroundAudioConfig, BackgroundStart, EncodingConfig, ShortBackgroundPolicy};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::{build_background_chain, build_mix_filter};
use crate::render::RenderedClip;
use crate::toolkit::MediaToolkit;

/// Which part of the background track plays under a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundWindow {
    /// Offset into the (possibly looped) background track
    pub start: f64,
    /// Length taken, always the clip duration
    pub duration: f64,
    /// Feed the track with `-stream_loop -1`
    pub looped: bool,
    /// Pad with silence once the track runs out
    pub pad_silence: bool,
}

/// Decide the background sub-range for a clip of `clip_secs`.
pub fn background_window<R: Rng + ?Sized>(
    config: &BackgroundAudioConfig,
    background_secs: f64,
    clip_secs: f64,
    rng: &mut R,
) -> MediaResult<BackgroundWindow> {
    let random_start = |rng: &mut R, upper: f64| {
        if config.start == BackgroundStart::Random && upper > 0.0 {
            rng.random_range(0.0..upper)
        } else {
            0.0
        }
    };

    if background_secs >= clip_secs {
        let start = random_start(rng, background_secs - clip_secs);
        return Ok(BackgroundWindow {
            start,
            duration: clip_secs,
            looped: false,
            pad_silence: false,
        });
    }

    match config.when_short {
        ShortBackgroundPolicy::Loop => Ok(BackgroundWindow {
            start: random_start(rng, background_secs),
            duration: clip_secs,
            looped: true,
            pad_silence: false,
        }),
        ShortBackgroundPolicy::PadSilence => Ok(BackgroundWindow {
            start: 0.0,
            duration: clip_secs,
            looped: false,
            pad_silence: true,
        }),
        ShortBackgroundPolicy::Fail => Err(MediaError::BackgroundTooShort {
            path: config.path.clone(),
            available: background_secs,
            required: clip_secs,
        }),
    }
}

/// Build the mix command: video copied through the re-encode, audio from
/// the mix graph.
pub fn mix_command(
    clip: &RenderedClip,
    config: &BackgroundAudioConfig,
    window: &BackgroundWindow,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(&clip.path, output).add_input(&config.path);
    if window.looped {
        cmd = cmd.stream_loop();
    }

    let chain = build_background_chain(
        window.start,
        window.duration,
        config.volume,
        window.pad_silence,
    );

    cmd.filter_complex(build_mix_filter(&chain, clip.has_audio))
        .map("0:v")
        .map("[aout]")
        .encoding(encoding)
        .output_arg("-t")
        .output_arg(format!("{:.3}", clip.duration))
}

/// Mix the background track under `clip`, writing a new clip to `output`.
pub async fn mix_background<R: Rng + ?Sized>(
    toolkit: &dyn MediaToolkit,
    clip: &RenderedClip,
    config: &BackgroundAudioConfig,
    background_secs: f64,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
    rng: &mut R,
) -> MediaResult<RenderedClip> {
    let output = output.as_ref();
    let window = background_window(config, background_secs, clip.duration, rng)?;

    debug!(
        background = %config.path.display(),
        start = window.start,
        duration = window.duration,
        looped = window.looped,
        padded = window.pad_silence,
        "Background window"
    );

    let cmd = mix_command(clip, config, &window, encoding, output);
    toolkit.run(&cmd, clip.duration).await?;

    info!(output = %output.display(), volume = config.volume, "Mixed background audio");

    Ok(RenderedClip {
        path: output.to_path_buf(),
        duration: clip.duration,
        has_audio: true,
    })
}
