//! FFprobe media information.
//!
//! A probe either yields a usable, positive duration or an error. A file
//! ffprobe cannot read is never reported as zero seconds long.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Media file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds (always > 0)
    pub duration: f64,
    /// Width in pixels (0 without a video stream)
    pub width: u32,
    /// Height in pixels (0 without a video stream)
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec, or the audio codec for audio-only files
    pub codec: String,
    pub has_video: bool,
    pub has_audio: bool,
}

impl MediaInfo {
    /// Info for a video with an audio track.
    pub fn video(duration: f64, width: u32, height: u32) -> Self {
        Self {
            duration,
            width,
            height,
            fps: 30.0,
            codec: "h264".to_string(),
            has_video: true,
            has_audio: true,
        }
    }

    /// Info for an audio-only file.
    pub fn audio(duration: f64) -> Self {
        Self {
            duration,
            width: 0,
            height: 0,
            fps: 0.0,
            codec: "mp3".to_string(),
            has_video: false,
            has_audio: true,
        }
    }

    pub fn without_audio(mut self) -> Self {
        self.has_audio = false;
        self
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    probe_media_with_timeout(path, None).await
}

/// Probe a media file, killing ffprobe if it runs longer than `timeout`.
pub async fn probe_media_with_timeout(
    path: impl AsRef<Path>,
    timeout: Option<Duration>,
) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    debug!(path = %path.display(), "Probing media");

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, output)
            .await
            .map_err(|_| MediaError::Timeout(limit.as_secs()))??,
        None => output.await?,
    };

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            format!("FFprobe could not read {}", path.display()),
            Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
        ));
    }

    parse_probe_output(&output.stdout)
        .map_err(|e| match e {
            MediaError::InvalidVideo(msg) => {
                MediaError::InvalidVideo(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
}

/// Turn ffprobe's JSON into [`MediaInfo`].
pub fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream_of = |kind: &str| {
        probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };
    let video_stream = stream_of("video");
    let audio_stream = stream_of("audio");

    if video_stream.is_none() && audio_stream.is_none() {
        return Err(MediaError::InvalidVideo(
            "no audio or video streams".to_string(),
        ));
    }

    // Container duration first, then whichever stream reports one.
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| parse_positive(f.duration.as_deref()))
        .or_else(|| video_stream.and_then(|s| parse_positive(s.duration.as_deref())))
        .or_else(|| audio_stream.and_then(|s| parse_positive(s.duration.as_deref())))
        .ok_or_else(|| MediaError::InvalidVideo("no readable duration".to_string()))?;

    let fps = video_stream
        .and_then(|s| {
            s.avg_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .or_else(|| s.r_frame_rate.as_deref().and_then(parse_frame_rate))
        })
        .unwrap_or(0.0);

    let codec = video_stream
        .or(audio_stream)
        .and_then(|s| s.codec_name.clone())
        .unwrap_or_default();

    Ok(MediaInfo {
        duration,
        width: video_stream.and_then(|s| s.width).unwrap_or(0),
        height: video_stream.and_then(|s| s.height).unwrap_or(0),
        fps,
        codec,
        has_video: video_stream.is_some(),
        has_audio: audio_stream.is_some(),
    })
}

fn parse_positive(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}
