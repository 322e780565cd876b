use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{PinholeCamera, RenderSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{UmiError, UmiResult};
use crate::stream::streamer::StreamedFrame;

/// Name of the per-frame JSON lines file written by [`DumpSink`].
pub const FRAMES_FILE: &str = "frames.jsonl";

/// Options for [`DumpSink`].
#[derive(Clone, Debug)]
pub struct DumpSinkOpts {
    /// Output directory, created on `begin`.
    pub out_dir: PathBuf,
    /// Write one PNG per frame next to the JSON lines file.
    pub write_images: bool,
}

impl DumpSinkOpts {
    /// Dump frames and images into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            write_images: true,
        }
    }
}

#[derive(serde::Serialize)]
struct FrameLine<'a> {
    index: FrameIndex,
    position: [f64; 3],
    rotation_vector: [f64; 3],
    angle: f64,
    axis: Option<[f64; 3]>,
    gripper_width: f64,
    trajectory_len: usize,
    image: Option<&'a str>,
    camera: PinholeCamera,
}

/// Sink that writes every frame to disk: `frame_<index>.png` and one line of `frames.jsonl`.
pub struct DumpSink {
    opts: DumpSinkOpts,
    cfg: Option<SinkConfig>,
    lines: Option<BufWriter<File>>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl DumpSink {
    /// Create a sink writing under `opts.out_dir`.
    pub fn new(opts: DumpSinkOpts) -> Self {
        Self {
            opts,
            cfg: None,
            lines: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn out_dir(&self) -> &Path {
        &self.opts.out_dir
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

fn image_file_name(idx: FrameIndex) -> String {
    format!("frame_{:06}.png", idx.0)
}

impl RenderSink for DumpSink {
    fn begin(&mut self, cfg: SinkConfig) -> UmiResult<()> {
        let dir = &self.opts.out_dir;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create dump dir '{}'", dir.display()))?;
        let path = dir.join(FRAMES_FILE);
        let file = File::create(&path).with_context(|| format!("create '{}'", path.display()))?;

        self.lines = Some(BufWriter::new(file));
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &StreamedFrame<'_>) -> UmiResult<()> {
        let (Some(cfg), Some(lines)) = (self.cfg.as_ref(), self.lines.as_mut()) else {
            return Err(UmiError::validation("dump sink not started"));
        };
        let record = &frame.record;
        let idx = record.index();
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(UmiError::validation(format!(
                "dump sink expects increasing frame indices, got {idx} after {last}"
            )));
        }

        let image_name = self.opts.write_images.then(|| image_file_name(idx));
        if let Some(name) = image_name.as_deref() {
            let img = record.image();
            let color = match img.channels {
                1 => image::ColorType::L8,
                3 => image::ColorType::Rgb8,
                4 => image::ColorType::Rgba8,
                c => {
                    return Err(UmiError::unsupported(format!(
                        "{c}-channel images cannot be written as png"
                    )));
                }
            };
            let path = self.opts.out_dir.join(name);
            image::save_buffer_with_format(
                &path,
                &img.data,
                img.width,
                img.height,
                color,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write png '{}'", path.display()))?;
        }

        let line = FrameLine {
            index: idx,
            position: record.eef_pos(),
            rotation_vector: record.eef_rot(),
            angle: frame.rotation.angle,
            axis: frame.rotation.axis,
            gripper_width: record.gripper_width(),
            trajectory_len: frame.trajectory.len(),
            image: image_name.as_deref(),
            camera: PinholeCamera::new(&cfg.settings, record.image()),
        };
        serde_json::to_writer(&mut *lines, &line).context("serialize frame line")?;
        lines.write_all(b"\n").context("write frame line")?;

        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> UmiResult<()> {
        if let Some(mut lines) = self.lines.take() {
            lines.flush().context("flush frame lines")?;
        }
        tracing::info!(
            dir = %self.opts.out_dir.display(),
            frames = self.written,
            "wrote frame dump"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/dump.rs"]
mod tests;
