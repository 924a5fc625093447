use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::foundation::error::{CapsyncError, CapsyncResult};
use crate::foundation::math::{mul_div255_u16, unpremul_channel};
use crate::render::raster::FrameRGBA;

/// How the encoder handles the caption frames' alpha channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    /// Keep alpha: `qtrle` in a QuickTime container, pixel format `argb`.
    /// This is the normal handoff — caption frames get composited over
    /// footage by an external step that needs the transparency.
    Preserve,
    /// Flatten over a background color and encode opaque H.264/yuv420p.
    /// Useful for quick previews without a compositing step.
    FlattenOver([u8; 4]),
}

/// Configuration for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Integer output frame rate.
    pub fps: u32,
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Alpha handling.
    pub alpha: AlphaMode,
}

impl EncodeConfig {
    /// Reject configurations ffmpeg would choke on.
    pub fn validate(&self) -> CapsyncResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CapsyncError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(CapsyncError::validation("encode fps must be non-zero"));
        }
        if matches!(self.alpha, AlphaMode::FlattenOver(_))
            && (!self.width.is_multiple_of(2) || !self.height.is_multiple_of(2))
        {
            return Err(CapsyncError::validation(
                "encode width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(())
    }
}

/// Alpha-preserving QuickTime config, the default caption handoff.
pub fn default_mov_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
        alpha: AlphaMode::Preserve,
    }
}

/// True when a working `ffmpeg` binary is on `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the output file's parent directory if needed.
pub fn ensure_parent_dir(path: &Path) -> CapsyncResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams raw RGBA frames to the system `ffmpeg` binary.
///
/// We intentionally use the system binary rather than linked FFmpeg
/// libraries to avoid native dev header/lib requirements.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    /// Spawn `ffmpeg` for the given configuration.
    pub fn new(cfg: EncodeConfig) -> CapsyncResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(CapsyncError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(CapsyncError::evaluation(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: raw straight-alpha RGBA8 frames on stdin. `ffmpeg` does not
        // understand premultiplied input, so encode_frame un-premultiplies
        // (or flattens) into the scratch buffer first.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
        ]);

        match cfg.alpha {
            AlphaMode::Preserve => {
                cmd.args(["-c:v", "qtrle", "-pix_fmt", "argb"]);
            }
            AlphaMode::FlattenOver(_) => {
                cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
            }
        }
        cmd.arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            CapsyncError::evaluation(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CapsyncError::evaluation("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            scratch: vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4],
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    /// Convert and write one frame to ffmpeg's stdin.
    pub fn encode_frame(&mut self, frame: &FrameRGBA) -> CapsyncResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(CapsyncError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(CapsyncError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        match self.cfg.alpha {
            AlphaMode::Preserve => {
                unpremultiply_rgba8(&mut self.scratch, &frame.data, frame.premultiplied)
            }
            AlphaMode::FlattenOver(bg) => {
                flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, frame.premultiplied, bg)
            }
        }?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CapsyncError::evaluation(
                "ffmpeg encoder is already finalized",
            ));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            CapsyncError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        Ok(())
    }

    /// Close stdin and wait for ffmpeg to finish cleanly.
    pub fn finish(mut self) -> CapsyncResult<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            CapsyncError::evaluation(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapsyncError::evaluation(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

pub(crate) fn unpremultiply_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
) -> CapsyncResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CapsyncError::validation(
            "unpremultiply_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    if !src_is_premul {
        dst.copy_from_slice(src);
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        d[0] = unpremul_channel(s[0], a);
        d[1] = unpremul_channel(s[1], a);
        d[2] = unpremul_channel(s[2], a);
        d[3] = a;
    }
    Ok(())
}

pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> CapsyncResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CapsyncError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255_u16(bg_r, inv),
                u16::from(s[1]) + mul_div255_u16(bg_g, inv),
                u16::from(s[2]) + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(u16::from(s[0]), a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(u16::from(s[1]), a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(u16::from(s[2]), a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
