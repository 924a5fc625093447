use crate::compose::frame::RenderedLine;
use crate::foundation::core::{Affine, Canvas, Rgba8Premul, Vec2};
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::render::composition::{CaptionComposition, PreparedCaptions};

/// A rendered caption frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** over a fully transparent background;
/// the external compositing step lays them over footage. The flag makes
/// this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame of the given canvas size.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; (canvas.width as usize) * (canvas.height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    ///
    /// Rasterizer output is always premultiplied; check `premultiplied`
    /// before interpreting frames from other sources.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some(Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }
}

/// CPU rasterizer turning compositor output into pixels via `vello_cpu`.
///
/// Holds a reusable render context; each worker owns its own rasterizer, so
/// parallel rendering shares nothing mutable.
pub struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRasterizer {
    /// Construct a rasterizer with no allocated context yet.
    pub fn new() -> Self {
        Self { ctx: None }
    }

    /// Rasterize one frame's visual state.
    ///
    /// `None` (no visible line) short-circuits to a transparent frame
    /// without touching the render context.
    pub fn rasterize(
        &mut self,
        comp: &CaptionComposition,
        prepared: &PreparedCaptions,
        line: Option<&RenderedLine>,
    ) -> CapsyncResult<FrameRGBA> {
        let Some(line) = line else {
            return Ok(FrameRGBA::transparent(comp.canvas));
        };

        let layout = prepared
            .line_layouts()
            .get(line.line_index)
            .ok_or_else(|| {
                CapsyncError::evaluation(format!(
                    "no prepared layout for line {} (prepared {})",
                    line.line_index,
                    prepared.line_layouts().len()
                ))
            })?;
        if layout.slots.len() != line.words.len() {
            return Err(CapsyncError::evaluation(format!(
                "line {} slot/word count mismatch: {} slots, {} words",
                line.line_index,
                layout.slots.len(),
                line.words.len()
            )));
        }
        let font = prepared
            .font()
            .ok_or_else(|| CapsyncError::evaluation("prepared captions carry no font data"))?;

        let width: u16 = comp
            .canvas
            .width
            .try_into()
            .map_err(|_| CapsyncError::evaluation("canvas width exceeds u16"))?;
        let height: u16 = comp
            .canvas
            .height
            .try_into()
            .map_err(|_| CapsyncError::evaluation("canvas height exceeds u16"))?;

        let top_y = layout.baseline_y - layout.ascent + line.offset_px;

        self.with_ctx_mut(width, height, |ctx| {
            for (slot, word) in layout.slots.iter().zip(&line.words) {
                let tr = Affine::translate(Vec2::new(slot.x, top_y));
                ctx.set_transform(affine_to_cpu(tr));
                for parley_line in slot.layout.lines() {
                    for item in parley_line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        let alpha = (f64::from(brush.a) * word.opacity)
                            .round()
                            .clamp(0.0, 255.0) as u8;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, alpha,
                        ));
                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width: comp.canvas.width,
                height: comp.canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> CapsyncResult<R>,
    ) -> CapsyncResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}
