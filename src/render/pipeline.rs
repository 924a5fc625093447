use rayon::prelude::*;

use crate::compose::frame::render_frame;
use crate::encode::ffmpeg::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::render::composition::{CaptionComposition, PreparedCaptions};
use crate::render::raster::{CpuRasterizer, FrameRGBA};

/// Threading/chunking configuration for frame-range rendering.
#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Render frames across a rayon worker pool.
    pub parallel: bool,
    /// Frames per scheduling chunk.
    pub chunk_size: usize,
    /// Worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Counters for one frame-range render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames requested.
    pub frames_total: u64,
    /// Frames that had a visible caption line rasterized.
    pub frames_rendered: u64,
    /// Frames with no visible line, emitted as shared transparent pixels.
    pub frames_blank: u64,
}

impl RenderStats {
    fn absorb(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_blank += other.frames_blank;
    }
}

/// Evaluate + rasterize a single frame.
///
/// This is the primary one-shot API for producing caption pixels. The
/// compositor decides what is visible; the rasterizer turns it into
/// premultiplied RGBA8.
pub fn render_frame_rgba(
    comp: &CaptionComposition,
    prepared: &PreparedCaptions,
    frame: FrameIndex,
    raster: &mut CpuRasterizer,
) -> CapsyncResult<FrameRGBA> {
    let state = render_frame(&comp.track, frame, comp.fps, &comp.effects);
    raster.rasterize(comp, prepared, state.as_ref())
}

/// Render a frame range sequentially.
pub fn render_frames(
    comp: &CaptionComposition,
    prepared: &PreparedCaptions,
    range: FrameRange,
) -> CapsyncResult<Vec<FrameRGBA>> {
    render_frames_with_stats(comp, prepared, range, &RenderThreading::default())
        .map(|(frames, _)| frames)
}

/// Render a frame range with explicit threading configuration.
///
/// Rendering is embarrassingly parallel: the compositor and rasterizer take
/// no mutable shared state, so parallel output is bit-identical to
/// sequential output in every scheduling order.
#[tracing::instrument(skip(comp, prepared), fields(frames = range.len_frames()))]
pub fn render_frames_with_stats(
    comp: &CaptionComposition,
    prepared: &PreparedCaptions,
    range: FrameRange,
    threading: &RenderThreading,
) -> CapsyncResult<(Vec<FrameRGBA>, RenderStats)> {
    if range.is_empty() {
        return Err(CapsyncError::validation("render range must be non-empty"));
    }

    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut out = Vec::with_capacity(range.len_frames().min(4096) as usize);
    let mut stats = RenderStats::default();

    let pool = threading.parallel.then(|| build_thread_pool(threading.threads)).transpose()?;

    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size as u64).min(range.end.0);
        let chunk = FrameRange {
            start: FrameIndex(chunk_start),
            end: FrameIndex(chunk_end),
        };
        let (mut frames, chunk_stats) = match pool.as_ref() {
            Some(pool) => render_chunk_parallel(comp, prepared, chunk, pool)?,
            None => render_chunk_sequential(comp, prepared, chunk)?,
        };
        out.append(&mut frames);
        stats.absorb(chunk_stats);
        chunk_start = chunk_end;
    }

    Ok((out, stats))
}

fn render_chunk_sequential(
    comp: &CaptionComposition,
    prepared: &PreparedCaptions,
    range: FrameRange,
) -> CapsyncResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut raster = CpuRasterizer::new();
    let mut blank: Option<FrameRGBA> = None;
    let mut out = Vec::with_capacity(range.len_frames() as usize);
    let mut stats = RenderStats::default();

    for f in range.start.0..range.end.0 {
        let state = render_frame(&comp.track, FrameIndex(f), comp.fps, &comp.effects);
        stats.frames_total += 1;
        match state {
            Some(line) => {
                out.push(raster.rasterize(comp, prepared, Some(&line))?);
                stats.frames_rendered += 1;
            }
            None => {
                // All blank frames share one transparent template.
                let template =
                    blank.get_or_insert_with(|| FrameRGBA::transparent(comp.canvas));
                out.push(template.clone());
                stats.frames_blank += 1;
            }
        }
    }
    Ok((out, stats))
}

fn render_chunk_parallel(
    comp: &CaptionComposition,
    prepared: &PreparedCaptions,
    range: FrameRange,
    pool: &rayon::ThreadPool,
) -> CapsyncResult<(Vec<FrameRGBA>, RenderStats)> {
    let frames: Vec<u64> = (range.start.0..range.end.0).collect();

    let rendered = pool.install(|| {
        frames
            .par_iter()
            .map_init(
                CpuRasterizer::new,
                |raster, &f| -> CapsyncResult<(FrameRGBA, bool)> {
                    let state = render_frame(&comp.track, FrameIndex(f), comp.fps, &comp.effects);
                    let visible = state.is_some();
                    let frame = raster.rasterize(comp, prepared, state.as_ref())?;
                    Ok((frame, visible))
                },
            )
            .collect::<Vec<_>>()
    });

    let mut out = Vec::with_capacity(rendered.len());
    let mut stats = RenderStats::default();
    for item in rendered {
        let (frame, visible) = item?;
        stats.frames_total += 1;
        if visible {
            stats.frames_rendered += 1;
        } else {
            stats.frames_blank += 1;
        }
        out.push(frame);
    }
    Ok((out, stats))
}

/// Options for [`render_to_video`].
#[derive(Clone, Debug)]
pub struct RenderToVideoOpts {
    /// Frame range to render (start inclusive, end exclusive).
    pub range: FrameRange,
    /// Whether to overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Render threading/chunking configuration.
    pub threading: RenderThreading,
}

impl Default for RenderToVideoOpts {
    fn default() -> Self {
        Self {
            range: FrameRange {
                start: FrameIndex(0),
                end: FrameIndex(1),
            },
            overwrite: true,
            threading: RenderThreading::default(),
        }
    }
}

/// Render the composition and stream it to the system `ffmpeg` binary.
///
/// The encoder configuration decides whether alpha is preserved (the normal
/// caption handoff) or flattened for opaque previews. `ffmpeg` must be on
/// `PATH`; this is checked before any frame is rendered.
pub fn render_to_video(
    comp: &CaptionComposition,
    prepared: &PreparedCaptions,
    cfg: EncodeConfig,
    opts: RenderToVideoOpts,
) -> CapsyncResult<RenderStats> {
    if opts.range.is_empty() {
        return Err(CapsyncError::validation(
            "render_to_video range must be non-empty",
        ));
    }
    if opts.range.end.0 > comp.duration.0 {
        return Err(CapsyncError::validation(
            "render_to_video range must be within the composition duration",
        ));
    }
    if !is_ffmpeg_on_path() {
        return Err(CapsyncError::evaluation(
            "ffmpeg is required for video encoding, but was not found on PATH",
        ));
    }

    let cfg = EncodeConfig {
        overwrite: opts.overwrite,
        ..cfg
    };
    let mut enc = FfmpegEncoder::new(cfg)?;
    let mut stats = RenderStats::default();
    let chunk_size = normalized_chunk_size(opts.threading.chunk_size);

    let pool = opts
        .threading
        .parallel
        .then(|| build_thread_pool(opts.threading.threads))
        .transpose()?;

    let mut chunk_start = opts.range.start.0;
    while chunk_start < opts.range.end.0 {
        let chunk_end = (chunk_start + chunk_size as u64).min(opts.range.end.0);
        let chunk = FrameRange {
            start: FrameIndex(chunk_start),
            end: FrameIndex(chunk_end),
        };
        let (frames, chunk_stats) = match pool.as_ref() {
            Some(pool) => render_chunk_parallel(comp, prepared, chunk, pool)?,
            None => render_chunk_sequential(comp, prepared, chunk)?,
        };
        for frame in &frames {
            enc.encode_frame(frame)?;
        }
        stats.absorb(chunk_stats);
        chunk_start = chunk_end;
    }

    enc.finish()?;
    Ok(stats)
}

fn normalized_chunk_size(requested: usize) -> usize {
    requested.max(1)
}

fn build_thread_pool(threads: Option<usize>) -> CapsyncResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        if n == 0 {
            return Err(CapsyncError::validation("threads must be > 0 when set"));
        }
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CapsyncError::evaluation(format!("failed to build thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
