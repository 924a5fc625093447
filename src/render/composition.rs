use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::compose::frame::EffectParams;
use crate::foundation::core::{Canvas, FrameIndex, Fps};
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::layout::engine::TextLayoutEngine;
use crate::layout::line::{CaptionStyle, LineLayout};
use crate::track::resolve::CaptionTrack;

/// The engine's input boundary: a built caption track plus the target video
/// parameters and styling.
///
/// Merging the words file and the grouping file into a [`CaptionTrack`] is
/// the caller's job (see [`CaptionTrack::build`]); from here on everything
/// is a pure projection to frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionComposition {
    /// The resolved, scheduled caption timeline.
    pub track: CaptionTrack,
    /// Output raster dimensions.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Total frames in the target video.
    pub duration: FrameIndex,
    /// Text styling.
    pub style: CaptionStyle,
    /// Effect tuning.
    pub effects: EffectParams,
}

impl CaptionComposition {
    /// Validate canvas, style, and effect parameters.
    ///
    /// A track extending past `duration` is not an error — those frames are
    /// simply never requested — but it usually means a stale grouping, so it
    /// is warned about.
    pub fn validate(&self) -> CapsyncResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CapsyncError::validation("canvas must be non-zero"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(CapsyncError::validation(
                "canvas dimensions exceed the CPU raster limit (u16)",
            ));
        }
        self.style.validate()?;
        self.effects.validate()?;

        let track_end = self.track.end_frame();
        if track_end > self.duration.0 {
            tracing::warn!(
                track_end,
                duration = self.duration.0,
                "caption track extends past the video duration; trailing lines will be cut"
            );
        }
        Ok(())
    }
}

/// Front-loaded raster state: font bytes read, every line's words shaped and
/// slotted.
///
/// Preparing once keeps the per-frame path deterministic and IO-free, which
/// is what lets frames render on any worker in any order.
pub struct PreparedCaptions {
    line_layouts: Vec<LineLayout>,
    font: Option<vello_cpu::peniko::FontData>,
}

impl PreparedCaptions {
    /// Read the style's font and shape every caption line.
    ///
    /// `root` anchors the style's relative `font_source`. An empty track
    /// prepares without touching the filesystem at all — it only ever
    /// renders transparent frames.
    #[tracing::instrument(skip_all, fields(lines = comp.track.len()))]
    pub fn prepare(comp: &CaptionComposition, root: impl Into<PathBuf>) -> CapsyncResult<Self> {
        comp.validate()?;

        if comp.track.is_empty() {
            return Ok(Self {
                line_layouts: Vec::new(),
                font: None,
            });
        }

        let font_path = resolve_font_path(&root.into(), &comp.style.font_source);
        let font_bytes = std::fs::read(&font_path)
            .with_context(|| format!("read caption font from '{}'", font_path.display()))?;

        let mut engine = TextLayoutEngine::new();
        let mut line_layouts = Vec::with_capacity(comp.track.len());
        for line in comp.track.lines() {
            line_layouts.push(LineLayout::build(
                &mut engine,
                &line.words,
                &font_bytes,
                &comp.style,
                comp.canvas,
            )?);
        }

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes),
            0,
        );

        Ok(Self {
            line_layouts,
            font: Some(font),
        })
    }

    /// Prepared geometry for every track line, in track order.
    pub fn line_layouts(&self) -> &[LineLayout] {
        &self.line_layouts
    }

    pub(crate) fn font(&self) -> Option<&vello_cpu::peniko::FontData> {
        self.font.as_ref()
    }
}

impl std::fmt::Debug for PreparedCaptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedCaptions")
            .field("lines", &self.line_layouts.len())
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

fn resolve_font_path(root: &Path, source: &Path) -> PathBuf {
    if source.is_absolute() {
        source.to_path_buf()
    } else {
        root.join(source)
    }
}
