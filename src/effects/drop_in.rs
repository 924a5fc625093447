use crate::effects::ease::Ease;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::foundation::math::lerp;
use crate::track::schedule::LineWindow;

/// Drop-in tuning: the small upward settle a line performs when it appears.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DropInParams {
    /// How far above the baseline the line starts, in pixels.
    pub distance_px: f64,
    /// Animation length in milliseconds, converted to whole frames.
    pub duration_ms: u32,
    /// Curve applied to the settle.
    pub ease: Ease,
}

impl Default for DropInParams {
    fn default() -> Self {
        Self {
            distance_px: 6.0,
            duration_ms: 400,
            ease: Ease::OutCubic,
        }
    }
}

impl DropInParams {
    /// Reject non-finite or negative drop distances.
    pub fn validate(&self) -> CapsyncResult<()> {
        if !self.distance_px.is_finite() || self.distance_px < 0.0 {
            return Err(CapsyncError::validation("drop-in distance_px must be >= 0"));
        }
        Ok(())
    }
}

/// Vertical offset of a line at an absolute frame, in pixels.
///
/// Negative while settling (the line sits above its baseline), exactly 0
/// once settled and for static lines. Anchored to `window.start_frame`; runs
/// once, never re-triggers, and depends on nothing but its arguments.
pub fn line_offset_px(
    frame: FrameIndex,
    fps: Fps,
    window: &LineWindow,
    params: &DropInParams,
) -> f64 {
    if !window.effects_enabled {
        return 0.0;
    }

    let duration_frames = (f64::from(params.duration_ms) / 1000.0 * fps.as_f64()).floor();
    let progress = if duration_frames > 0.0 {
        let elapsed = frame.0 as f64 - window.start_frame.0 as f64;
        (elapsed / duration_frames).clamp(0.0, 1.0)
    } else {
        // The animation would be shorter than one frame; snap to settled.
        1.0
    };

    lerp(-params.distance_px, 0.0, params.ease.apply(progress))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/drop_in.rs"]
mod tests;
