use crate::foundation::core::{FrameIndex, FrameRange, Fps};
use crate::track::resolve::WordGroup;

/// Lines shorter than this render statically: no sweep, no drop-in.
///
/// Below ~half a second there are not enough frames for either animation to
/// resolve cleanly, so short lines pin to full opacity at the baseline.
pub const DEFAULT_EFFECT_THRESHOLD_MS: u32 = 500;

/// Display window of one caption line, in both frame and second units.
///
/// `start_frame = floor(start_sec * fps)` and `end_frame = floor(end_sec *
/// fps)`; the window is half-open `[start_frame, end_frame)`. Both the
/// truncating frame conversion and the retained second-precision endpoints
/// matter: the sweep engine derives its time progress from the seconds, so
/// the two representations must come from the same schedule call.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineWindow {
    /// First frame on which the line is visible.
    pub start_frame: FrameIndex,
    /// First frame on which the line is no longer visible.
    pub end_frame: FrameIndex,
    /// Speech start of the line's first word, seconds.
    pub start_sec: f64,
    /// Speech end of the line's last word, seconds.
    pub end_sec: f64,
    /// Whether the line is long enough to animate.
    pub effects_enabled: bool,
}

impl LineWindow {
    /// The window as a [`FrameRange`].
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: self.start_frame,
            end: self.end_frame,
        }
    }

    /// True when `frame` falls inside the half-open window.
    pub fn contains(&self, frame: FrameIndex) -> bool {
        self.frame_range().contains(frame)
    }

    /// Window length in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// Convert a resolved word group into its display window at `fps`.
///
/// Effect eligibility is decided here, once, so every downstream engine sees
/// the same answer: `(end_sec - start_sec) * 1000 >= effect_threshold_ms`.
pub fn schedule(group: &WordGroup, fps: Fps, effect_threshold_ms: u32) -> LineWindow {
    let start_sec = group.start_sec();
    let end_sec = group.end_sec();
    LineWindow {
        start_frame: FrameIndex(fps.secs_to_frames_floor(start_sec)),
        end_frame: FrameIndex(fps.secs_to_frames_floor(end_sec)),
        start_sec,
        end_sec,
        effects_enabled: (end_sec - start_sec) * 1000.0 >= f64::from(effect_threshold_ms),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/track/schedule.rs"]
mod tests;
