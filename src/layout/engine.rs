use crate::foundation::error::{CapsyncError, CapsyncResult};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Stateful helper for shaping caption words from raw font bytes.
///
/// Shaping happens once, ahead of rendering, when line layouts are prepared;
/// the per-frame path only reads the finished layouts.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    last_family_name: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            last_family_name: None,
        }
    }

    /// Return last successfully resolved family name, if any.
    pub fn last_family_name(&self) -> Option<String> {
        self.last_family_name.clone()
    }

    /// Shape one word (no line breaking; pixel-width wrapping is not this
    /// engine's job) using the provided font bytes and styling.
    pub fn layout_word(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CapsyncResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CapsyncError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CapsyncError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CapsyncError::validation("registered font family has no name"))?
            .to_string();
        self.last_family_name = Some(family_name.clone());

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(layout)
    }
}

/// Measure a shaped word: `(advance, ascent)` in pixels.
pub(crate) fn measure(layout: &parley::Layout<TextBrushRgba8>) -> (f64, f64) {
    let mut advance = 0.0f64;
    let mut ascent = 0.0f64;
    for line in layout.lines() {
        let m = line.metrics();
        advance = advance.max(f64::from(m.advance));
        ascent = ascent.max(f64::from(m.ascent));
    }
    (advance, ascent)
}
