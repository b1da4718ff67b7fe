//! FFmpeg filter graph builders.

use vshort_models::{validate_speed_factor, CanvasConfig};

use crate::error::MediaResult;

/// Range a single `atempo` stage accepts.
pub const ATEMPO_MIN: f64 = 0.5;
pub const ATEMPO_MAX: f64 = 2.0;

const TEMPO_EPSILON: f64 = 1e-9;

/// Split a speed factor into `atempo` stages, each within
/// [`ATEMPO_MIN`, `ATEMPO_MAX`], whose product is the factor.
///
/// `1.0` yields no stages. `3.0` yields `[2.0, 1.5]`, `0.2` yields
/// `[0.5, 0.5, 0.8]`.
pub fn tempo_stages(speed_factor: f64) -> MediaResult<Vec<f64>> {
    validate_speed_factor(speed_factor)?;

    let mut stages = Vec::new();
    let mut remaining = speed_factor;

    while remaining > ATEMPO_MAX + TEMPO_EPSILON {
        stages.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN - TEMPO_EPSILON {
        stages.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    if (remaining - 1.0).abs() > TEMPO_EPSILON {
        stages.push(remaining);
    }

    Ok(stages)
}

/// Audio filter chain for a speed factor, `None` when the tempo is unchanged.
pub fn atempo_filter(speed_factor: f64) -> MediaResult<Option<String>> {
    let stages = tempo_stages(speed_factor)?;
    if stages.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        stages
            .iter()
            .map(|s| format!("atempo={}", format_factor(*s)))
            .collect::<Vec<_>>()
            .join(","),
    ))
}

/// Video timestamp filter for a speed factor, `None` when unchanged.
pub fn setpts_filter(speed_factor: f64) -> MediaResult<Option<String>> {
    validate_speed_factor(speed_factor)?;
    if (speed_factor - 1.0).abs() <= TEMPO_EPSILON {
        return Ok(None);
    }
    Ok(Some(format!("setpts=PTS/{}", format_factor(speed_factor))))
}

/// Shortest decimal that round-trips, trimmed of noise past 6 places.
fn format_factor(value: f64) -> String {
    let rounded = format!("{:.6}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Scale a stream to `height`, clamp its width to `width` (centre crop),
/// then pad it back to exactly `width` (centre pad).
fn fit_panel(input: &str, output: &str, width: u32, height: u32, mirror: bool) -> String {
    let flip = if mirror { "hflip," } else { "" };
    format!(
        "[{input}]scale=-2:{height},{flip}crop=min(iw\\,{width}):ih,\
         pad={width}:{height}:(ow-iw)/2:0,setsar=1[{output}]"
    )
}

/// Portrait stack: main segment on top (optionally mirrored), filler
/// underneath, both exactly canvas-wide. Produces `[vout]`.
pub fn build_stack_filter(canvas: &CanvasConfig, mirror: bool) -> String {
    let top = fit_panel("0:v", "top", canvas.width, canvas.main_height(), mirror);
    let bottom = fit_panel("1:v", "bottom", canvas.width, canvas.filler_height(), false);
    format!(
        "{top};{bottom};[top][bottom]vstack=inputs=2:shortest=1,fps={fps},format=yuv420p[vout]",
        fps = canvas.fps
    )
}

/// Background bed: trim to the clip length, reset timestamps, scale volume,
/// optionally pad with silence. Produces `[bg]`.
pub fn build_background_chain(start: f64, duration: f64, volume: f64, pad: bool) -> String {
    let mut chain = format!(
        "[1:a]atrim=start={start:.3}:duration={duration:.3},asetpts=PTS-STARTPTS,volume={volume}"
    );
    if pad {
        chain.push_str(&format!(",apad=whole_dur={duration:.3}"));
    }
    chain.push_str("[bg]");
    chain
}

/// Full mix graph. With clip audio the two tracks are summed (no
/// normalisation, output as long as the clip audio); without it the
/// background alone becomes the soundtrack. Produces `[aout]`.
pub fn build_mix_filter(background_chain: &str, clip_has_audio: bool) -> String {
    if clip_has_audio {
        format!(
            "{background_chain};[0:a][bg]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]"
        )
    } else {
        format!("{background_chain};[bg]anull[aout]")
    }
}
