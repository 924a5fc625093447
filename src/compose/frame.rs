use crate::effects::drop_in::{DropInParams, line_offset_px};
use crate::effects::sweep::{SweepParams, word_opacity, word_position_ratio};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::CapsyncResult;
use crate::track::resolve::CaptionTrack;
use crate::track::schedule::LineWindow;

/// Combined effect tuning consumed by the compositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectParams {
    /// Karaoke sweep tuning.
    pub sweep: SweepParams,
    /// Drop-in tuning.
    pub drop_in: DropInParams,
}

impl EffectParams {
    /// Validate both effect parameter sets.
    pub fn validate(&self) -> CapsyncResult<()> {
        self.sweep.validate()?;
        self.drop_in.validate()
    }
}

/// Visual state of one word on one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderedWord {
    /// Word text, in line order.
    pub text: String,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Visual state of the active caption line on one frame.
///
/// Carries everything a rasterizer needs: each word at its fixed horizontal
/// slot with its own opacity, and the whole line at `baseline_y +
/// offset_px`. The baseline itself is the rasterizer's layout concern.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderedLine {
    /// Index of the line within the track.
    pub line_index: usize,
    /// The line's display window.
    pub window: LineWindow,
    /// Vertical offset added to the line's baseline, in pixels.
    pub offset_px: f64,
    /// Per-word visual state, in line order.
    pub words: Vec<RenderedWord>,
}

/// Compute the visual state of the requested frame.
///
/// Referentially transparent: identical arguments produce bit-identical
/// output, frames can be computed in any order on any worker, and no call
/// observes any other. Returns `None` when no line is visible (an
/// all-transparent caption frame, not an error).
///
/// Under the non-overlap invariant at most one window contains `frame`.
/// When upstream data violates it, the line with the later `start_frame`
/// wins deterministically (equal starts: the later-declared line), and a
/// warning is emitted rather than silently picking or crashing mid-render.
pub fn render_frame(
    track: &CaptionTrack,
    frame: FrameIndex,
    fps: Fps,
    params: &EffectParams,
) -> Option<RenderedLine> {
    let mut selected: Option<usize> = None;
    let mut matches = 0usize;

    for (idx, line) in track.lines().iter().enumerate() {
        if !line.window.contains(frame) {
            continue;
        }
        matches += 1;
        // Later start_frame wins; ties fall to the later declaration, which
        // this `>=` encodes as the scan runs in declaration order.
        let better = match selected {
            None => true,
            Some(cur) => line.window.start_frame.0 >= track.lines()[cur].window.start_frame.0,
        };
        if better {
            selected = Some(idx);
        }
    }

    let idx = selected?;
    if matches > 1 {
        tracing::warn!(
            frame = frame.0,
            candidates = matches,
            winner = idx,
            "multiple caption lines visible on one frame; later start wins"
        );
    }

    let line = &track.lines()[idx];
    let count = line.words.len();
    let words = line
        .words
        .words()
        .iter()
        .enumerate()
        .map(|(i, w)| RenderedWord {
            text: w.text.clone(),
            opacity: word_opacity(
                frame,
                fps,
                &line.window,
                word_position_ratio(i, count),
                &params.sweep,
            ),
        })
        .collect();

    Some(RenderedLine {
        line_index: idx,
        window: line.window,
        offset_px: line_offset_px(frame, fps, &line.window, &params.drop_in),
        words,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;
