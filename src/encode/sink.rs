use crate::episode::frame::{FrameImage, FrameRecord};
use crate::episode::index::EpisodeId;
use crate::foundation::core::{FrameIndex, FrameRange, Rgb8};
use crate::foundation::error::UmiResult;
use crate::foundation::math::AxisAngle;
use crate::session::config::RenderSettings;
use crate::stream::streamer::StreamedFrame;

/// Length of each arrow in the end-effector axis triad.
pub const AXIS_LENGTH: f64 = 0.1;
/// Radius of the triad arrows.
pub const AXIS_RADIUS: f64 = 0.002;
/// Triad colors for the x, y and z arrows.
pub const AXIS_COLORS: [Rgb8; 3] = [
    Rgb8::new(255, 0, 0),
    Rgb8::new(0, 255, 0),
    Rgb8::new(0, 0, 255),
];

/// Configuration provided to a [`RenderSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SinkConfig {
    /// Presentation parameters.
    pub settings: RenderSettings,
    /// Episode being streamed.
    pub episode: EpisodeId,
    /// Global frame range of the episode.
    pub range: FrameRange,
}

/// Pinhole camera derived from the render settings and one frame's image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PinholeCamera {
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Distance of the drawn image plane.
    pub image_plane_distance: f64,
}

impl PinholeCamera {
    /// Camera for `image` under `settings`.
    pub fn new(settings: &RenderSettings, image: &FrameImage) -> Self {
        Self {
            focal_length: settings.focal_length,
            width: image.width,
            height: image.height,
            image_plane_distance: settings.image_plane_distance,
        }
    }

    /// Principal point at the image center.
    pub fn principal_point(&self) -> [f64; 2] {
        [f64::from(self.width) / 2.0, f64::from(self.height) / 2.0]
    }
}

/// Sink contract for consuming validated frames in episode order.
///
/// Ordering contract: `push_frame` is called with strictly increasing local frame indices
/// (skipped frames leave gaps). `begin` is called once before any frame; `end` once after the
/// last frame, also when the run stopped on an invalid frame.
///
/// For each frame a sink is expected to present, in order: the time marker (local index), the
/// end-effector transform, the pinhole camera, the image, the trajectory polyline, the axis
/// triad and the gripper-width scalar.
pub trait RenderSink {
    /// Prepare for a run.
    fn begin(&mut self, cfg: SinkConfig) -> UmiResult<()>;
    /// Present one frame.
    fn push_frame(&mut self, frame: &StreamedFrame<'_>) -> UmiResult<()>;
    /// Finish the run.
    fn end(&mut self) -> UmiResult<()>;
}

/// Frame kept by [`InMemorySink`].
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    /// The delivered frame.
    pub record: FrameRecord,
    /// Derived rotation.
    pub rotation: AxisAngle,
    /// Trajectory length when the frame was delivered.
    pub trajectory_len: usize,
    /// Camera the frame would be shown through.
    pub camera: PinholeCamera,
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    /// Frames in delivery order.
    pub frames: Vec<CapturedFrame>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration received in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// `true` once `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Local indices of the captured frames.
    pub fn indices(&self) -> Vec<FrameIndex> {
        self.frames.iter().map(|f| f.record.index()).collect()
    }
}

impl RenderSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> UmiResult<()> {
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &StreamedFrame<'_>) -> UmiResult<()> {
        let settings = self.cfg.map(|c| c.settings).unwrap_or_default();
        self.frames.push(CapturedFrame {
            record: frame.record.clone(),
            rotation: frame.rotation,
            trajectory_len: frame.trajectory.len(),
            camera: PinholeCamera::new(&settings, frame.record.image()),
        });
        Ok(())
    }

    fn end(&mut self) -> UmiResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Sink that reports every frame as a `tracing` event.
#[derive(Debug, Default)]
pub struct LogSink {
    frames: u64,
}

impl LogSink {
    /// Create a sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for LogSink {
    fn begin(&mut self, cfg: SinkConfig) -> UmiResult<()> {
        self.frames = 0;
        tracing::info!(
            episode = cfg.episode.one_based(),
            start = cfg.range.start.0,
            end = cfg.range.end.0,
            "begin episode"
        );
        Ok(())
    }

    fn push_frame(&mut self, frame: &StreamedFrame<'_>) -> UmiResult<()> {
        let r = &frame.record;
        let img = r.image();
        tracing::info!(
            frame = r.index().0,
            pos = ?r.eef_pos(),
            angle = frame.rotation.angle,
            axis = ?frame.rotation.axis,
            gripper_width = r.gripper_width(),
            image = %format_args!("{}x{}x{}", img.height, img.width, img.channels),
            trajectory = frame.trajectory.len(),
            "frame"
        );
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> UmiResult<()> {
        tracing::info!(frames = self.frames, "end episode");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
