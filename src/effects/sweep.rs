use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::foundation::math::lerp;
use crate::track::schedule::LineWindow;

/// Karaoke sweep tuning.
///
/// A single "light" of half-width `light_width` travels across the line over
/// its duration, from `-light_width` to `1 + light_width` in normalized line
/// coordinates, so it is fully outside the line at both window edges. Words
/// behind the light sit at `reached_opacity`, words under its leading edge
/// fade between `active_opacity` and `unreached_opacity`.
///
/// In the canonical tuning `reached_opacity == active_opacity == 1.0`, which
/// collapses the first two bands visually; the band structure is kept
/// because each constant is independently customizable.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SweepParams {
    /// Half-width of the light in normalized line coordinates.
    pub light_width: f64,
    /// Opacity of words the light has fully passed.
    pub reached_opacity: f64,
    /// Opacity of a word exactly under the light's center.
    pub active_opacity: f64,
    /// Opacity of words the light has not yet reached.
    pub unreached_opacity: f64,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            light_width: 0.7,
            reached_opacity: 1.0,
            active_opacity: 1.0,
            unreached_opacity: 0.35,
        }
    }
}

impl SweepParams {
    /// Reject non-positive light widths and out-of-range opacities.
    pub fn validate(&self) -> CapsyncResult<()> {
        if !self.light_width.is_finite() || self.light_width <= 0.0 {
            return Err(CapsyncError::validation("sweep light_width must be > 0"));
        }
        for (name, v) in [
            ("reached_opacity", self.reached_opacity),
            ("active_opacity", self.active_opacity),
            ("unreached_opacity", self.unreached_opacity),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(CapsyncError::validation(format!(
                    "sweep {name} must be within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Center position of word `word_index` along a line of `word_count` words,
/// normalized so 0 is the left edge and 1 the right edge.
pub fn word_position_ratio(word_index: usize, word_count: usize) -> f64 {
    debug_assert!(word_index < word_count);
    (word_index as f64 + 0.5) / (word_count as f64)
}

/// Opacity of one word at an absolute frame.
///
/// Pure function of its arguments; millisecond-precision speech timing flows
/// through `window.start_sec`/`end_sec`, not through the truncated frame
/// bounds, so the sweep stays aligned with the audio across the window.
/// Static lines (`!effects_enabled`) are always fully opaque.
pub fn word_opacity(
    frame: FrameIndex,
    fps: Fps,
    window: &LineWindow,
    word_position_ratio: f64,
    params: &SweepParams,
) -> f64 {
    if !window.effects_enabled {
        return 1.0;
    }

    let span = window.duration_sec();
    let time_progress = if span > 0.0 {
        ((fps.frames_to_secs(frame.0) - window.start_sec) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let w = params.light_width;
    let light_position = lerp(-w, 1.0 + w, time_progress);
    let distance = word_position_ratio - light_position;

    // Bands, in order: fully behind the light, trailing edge, leading edge,
    // not yet reached.
    if distance < -w {
        params.reached_opacity
    } else if distance < 0.0 {
        lerp(params.reached_opacity, params.active_opacity, (distance + w) / w)
    } else if distance <= w {
        lerp(params.active_opacity, params.unreached_opacity, distance / w)
    } else {
        params.unreached_opacity
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/sweep.rs"]
mod tests;
