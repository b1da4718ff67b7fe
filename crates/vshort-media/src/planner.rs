//! Segment planning over the source timeline.

use rand::Rng;
use tracing::debug;

use vshort_models::{ConfigError, PipelineConfig, Segment, SegmentPlan};

/// Windows shorter than this are dropped rather than rendered.
const MIN_WINDOW_SECS: f64 = 1e-3;

/// Split `[start_offset, duration)` into overlapping windows and keep at
/// most `max_segments` of them.
///
/// Windows start at `S`, `S + step`, `S + 2 * step`, ... while the start is
/// before `duration`, with `step = segment_secs - overlap_trim_secs`. Each
/// window ends at `min(start + segment_secs, duration)`. When more windows
/// exist than `max_segments`, a uniform random subset (without replacement)
/// is kept, in the order the sampler produced it. Only the kept windows are
/// built, so memory stays bounded by `max_segments`.
pub fn plan_segments<R: Rng + ?Sized>(
    duration: f64,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<SegmentPlan, ConfigError> {
    config.validate()?;

    let start_offset = config.start_offset_secs;
    let beyond = || ConfigError::StartBeyondDuration {
        start: start_offset,
        duration,
    };
    if !duration.is_finite() || start_offset >= duration {
        return Err(beyond());
    }

    let step = config.step_secs();
    let candidate_count = window_count(start_offset, duration, step);
    if candidate_count == 0 {
        return Err(beyond());
    }

    let window = |i: usize| {
        // start_i = S + i * step, not accumulated.
        let start = start_offset + step * i as f64;
        Segment::new(start, (start + config.segment_secs).min(duration))
    };

    let segments: Vec<Segment> = if candidate_count > config.max_segments {
        rand::seq::index::sample(rng, candidate_count, config.max_segments)
            .into_iter()
            .map(window)
            .collect()
    } else {
        (0..candidate_count).map(window).collect()
    };

    debug!(
        duration,
        candidates = candidate_count,
        planned = segments.len(),
        "Planned segments"
    );

    Ok(SegmentPlan {
        segments,
        candidate_count,
    })
}

/// Number of windows whose start lies in `[start_offset, duration)` and
/// whose length is at least `MIN_WINDOW_SECS`.
fn window_count(start_offset: f64, duration: f64, step: f64) -> usize {
    let start_of = |i: usize| start_offset + step * i as f64;

    // Float-to-int casts saturate, so a tiny step cannot wrap.
    let mut n = ((duration - start_offset) / step).ceil() as usize;
    while n > 0 && start_of(n - 1) >= duration {
        n -= 1;
    }
    while n < usize::MAX && start_of(n) < duration {
        n += 1;
    }

    if n > 0 && duration - start_of(n - 1) < MIN_WINDOW_SECS {
        n -= 1;
    }
    n
}
