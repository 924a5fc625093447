use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::layout::engine::{TextBrushRgba8, TextLayoutEngine, measure};
use crate::track::resolve::WordGroup;

/// Visual styling of the caption track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionStyle {
    /// Path to the TTF/OTF font file, relative to the caller's asset root.
    pub font_source: PathBuf,
    /// Font size in pixels.
    pub size_px: f32,
    /// Text color, straight-alpha RGBA8. Per-word sweep opacity multiplies
    /// into the alpha channel at raster time.
    pub color_rgba8: [u8; 4],
    /// Horizontal gap between word slots, in pixels.
    pub word_gap_px: f64,
    /// Line baseline as a fraction of canvas height (0 top, 1 bottom).
    pub baseline_ratio: f64,
}

impl CaptionStyle {
    /// Style with lower-third defaults for the given font file.
    pub fn new(font_source: impl Into<PathBuf>) -> Self {
        Self {
            font_source: font_source.into(),
            size_px: 64.0,
            color_rgba8: [255, 255, 255, 255],
            word_gap_px: 18.0,
            baseline_ratio: 0.82,
        }
    }

    /// Reject unusable style parameters.
    pub fn validate(&self) -> CapsyncResult<()> {
        if !self.size_px.is_finite() || self.size_px <= 0.0 {
            return Err(CapsyncError::validation("style size_px must be > 0"));
        }
        if !self.word_gap_px.is_finite() || self.word_gap_px < 0.0 {
            return Err(CapsyncError::validation("style word_gap_px must be >= 0"));
        }
        if !self.baseline_ratio.is_finite() || !(0.0..=1.0).contains(&self.baseline_ratio) {
            return Err(CapsyncError::validation(
                "style baseline_ratio must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// One word's fixed horizontal slot plus its shaped glyphs.
#[derive(Clone)]
pub struct WordSlot {
    /// Left edge of the slot, canvas pixels.
    pub x: f64,
    /// Advance width of the shaped word, pixels.
    pub advance: f64,
    /// Shaped glyph layout for the word.
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
}

impl std::fmt::Debug for WordSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordSlot")
            .field("x", &self.x)
            .field("advance", &self.advance)
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .finish()
    }
}

/// Fixed geometry of one caption line: word slots centered on the canvas and
/// the line's baseline position.
///
/// Built once per line before rendering; slots never move while the line is
/// visible (only opacity and the whole-line drop offset animate).
#[derive(Clone, Debug)]
pub struct LineLayout {
    /// Word slots in line order.
    pub slots: Vec<WordSlot>,
    /// Total width of the slot row, pixels.
    pub total_width: f64,
    /// Baseline y of the settled line, canvas pixels.
    pub baseline_y: f64,
    /// Font ascent above the baseline, pixels.
    pub ascent: f64,
}

impl LineLayout {
    /// Shape every word of `group` and assign centered slots.
    pub fn build(
        engine: &mut TextLayoutEngine,
        group: &WordGroup,
        font_bytes: &[u8],
        style: &CaptionStyle,
        canvas: Canvas,
    ) -> CapsyncResult<Self> {
        let brush = TextBrushRgba8 {
            r: style.color_rgba8[0],
            g: style.color_rgba8[1],
            b: style.color_rgba8[2],
            a: style.color_rgba8[3],
        };

        let mut layouts = Vec::with_capacity(group.len());
        let mut advances = Vec::with_capacity(group.len());
        let mut ascent = 0.0f64;
        for word in group.words() {
            let layout = engine.layout_word(word.text.trim(), font_bytes, style.size_px, brush)?;
            let (advance, word_ascent) = measure(&layout);
            advances.push(advance);
            ascent = ascent.max(word_ascent);
            layouts.push(Arc::new(layout));
        }

        let (xs, total_width) =
            slot_positions(&advances, style.word_gap_px, f64::from(canvas.width));

        let slots = xs
            .into_iter()
            .zip(advances)
            .zip(layouts)
            .map(|((x, advance), layout)| WordSlot { x, advance, layout })
            .collect();

        Ok(Self {
            slots,
            total_width,
            baseline_y: f64::from(canvas.height) * style.baseline_ratio,
            ascent,
        })
    }
}

/// Centered slot x positions for a row of word advances.
///
/// Returns `(left edges, total row width)`. Pure helper so the geometry is
/// testable without shaping real fonts.
pub(crate) fn slot_positions(advances: &[f64], gap_px: f64, canvas_width: f64) -> (Vec<f64>, f64) {
    let total: f64 = advances.iter().sum::<f64>()
        + gap_px * (advances.len().saturating_sub(1) as f64);
    let mut x = (canvas_width - total) / 2.0;
    let mut xs = Vec::with_capacity(advances.len());
    for &advance in advances {
        xs.push(x);
        x += advance + gap_px;
    }
    (xs, total)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/line.rs"]
mod tests;
