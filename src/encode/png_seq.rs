use std::path::PathBuf;

use anyhow::Context as _;

use crate::encode::ffmpeg::unpremultiply_rgba8;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::render::raster::FrameRGBA;

/// Writes frames as numbered straight-alpha PNGs.
///
/// The simplest alpha-correct handoff: any compositor or encoder can consume
/// a PNG sequence, and transparency survives without codec negotiation.
#[derive(Clone, Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    digits: usize,
}

impl PngSequenceSink {
    /// Sink writing `frame_00000.png`-style files into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_string(),
            digits: 5,
        }
    }

    /// Override the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Path the given frame index writes to.
    pub fn path_for(&self, frame: FrameIndex) -> PathBuf {
        self.dir.join(format!(
            "{}{:0width$}.png",
            self.prefix,
            frame.0,
            width = self.digits
        ))
    }

    /// Write one frame; returns the written path.
    pub fn write_frame(&self, frame: FrameIndex, rgba: &FrameRGBA) -> CapsyncResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create png sequence directory '{}'", self.dir.display()))?;

        let mut straight = vec![0u8; rgba.data.len()];
        unpremultiply_rgba8(&mut straight, &rgba.data, rgba.premultiplied)?;

        let img: image::RgbaImage =
            image::ImageBuffer::from_raw(rgba.width, rgba.height, straight).ok_or_else(|| {
                CapsyncError::evaluation("frame buffer does not match its declared dimensions")
            })?;

        let path = self.path_for(frame);
        img.save(&path)
            .with_context(|| format!("write png frame '{}'", path.display()))?;
        Ok(path)
    }
}
