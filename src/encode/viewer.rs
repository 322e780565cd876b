//! Live viewer sink backed by the Rerun SDK.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::encode::sink::{
    AXIS_COLORS, AXIS_LENGTH, AXIS_RADIUS, PinholeCamera, RenderSink, SinkConfig,
};
use crate::foundation::core::Rgb8;
use crate::foundation::error::{UmiError, UmiResult};
use crate::stream::streamer::StreamedFrame;

/// Application id shown in the viewer.
pub const APP_ID: &str = "UMI_Full_Visualizer";
/// Timeline carrying the local frame index.
pub const TIMELINE: &str = "frame_ids";

const WORLD: &str = "world";
const EE: &str = "world/robot/ee_pos";
const CAMERA: &str = "world/robot/ee_pos/camera";
const AXES: &str = "world/robot/ee_pos/axes";
const TRAJECTORY: &str = "world/robot/trajectory";
const GRIPPER: &str = "world/robot/gripper_width";

/// Where the recording goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RerunTarget {
    /// Spawn a local viewer process and stream to it.
    Spawn,
    /// Write an `.rrd` file.
    Save(PathBuf),
}

/// Sink that streams frames to a Rerun viewer or recording file.
pub struct RerunSink {
    target: RerunTarget,
    rec: Option<rerun::RecordingStream>,
    cfg: Option<SinkConfig>,
}

impl RerunSink {
    /// Create a sink; the recording is opened on `begin`.
    pub fn new(target: RerunTarget) -> Self {
        Self {
            target,
            rec: None,
            cfg: None,
        }
    }
}

fn color(c: Rgb8) -> rerun::Color {
    rerun::Color::from_rgb(c.r, c.g, c.b)
}

fn f32x3(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

impl RenderSink for RerunSink {
    fn begin(&mut self, cfg: SinkConfig) -> UmiResult<()> {
        let builder = rerun::RecordingStreamBuilder::new(APP_ID);
        let rec = match &self.target {
            RerunTarget::Spawn => builder.spawn().context("spawn rerun viewer")?,
            RerunTarget::Save(path) => builder
                .save(path)
                .with_context(|| format!("create recording '{}'", path.display()))?,
        };

        rec.log_static(WORLD, &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())
            .context("log view coordinates")?;
        rec.log_static(
            GRIPPER,
            &rerun::SeriesLines::new()
                .with_colors([color(cfg.settings.gripper_color)])
                .with_names(["gripper_width"]),
        )
        .context("log gripper series style")?;

        tracing::info!(target = ?self.target, "rerun recording started");
        self.rec = Some(rec);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &StreamedFrame<'_>) -> UmiResult<()> {
        let (Some(rec), Some(cfg)) = (self.rec.as_ref(), self.cfg.as_ref()) else {
            return Err(UmiError::validation("rerun sink not started"));
        };
        let record = &frame.record;
        let settings = &cfg.settings;

        rec.set_time_sequence(TIMELINE, record.index().0 as i64);

        let translation = f32x3(record.eef_pos());
        let transform = match frame.rotation.axis {
            Some(axis) => rerun::Transform3D::from_translation_rotation(
                translation,
                rerun::RotationAxisAngle::new(
                    f32x3(axis),
                    rerun::Angle::from_radians(frame.rotation.angle as f32),
                ),
            ),
            None => rerun::Transform3D::from_translation(translation),
        };
        rec.log(EE, &transform)
            .context("log end-effector transform")?;

        let img = record.image();
        let camera = PinholeCamera::new(settings, img);
        rec.log(
            CAMERA,
            &rerun::Pinhole::from_focal_length_and_resolution(
                [camera.focal_length as f32, camera.focal_length as f32],
                [camera.width as f32, camera.height as f32],
            )
            .with_image_plane_distance(camera.image_plane_distance as f32),
        )
        .context("log pinhole camera")?;

        let resolution = [img.width, img.height];
        let image = match img.channels {
            1 => rerun::Image::from_l8(img.data.clone(), resolution),
            3 => rerun::Image::from_rgb24(img.data.clone(), resolution),
            4 => rerun::Image::from_rgba32(img.data.clone(), resolution),
            c => return Err(UmiError::unsupported(format!("{c}-channel camera images"))),
        };
        rec.log(CAMERA, &image).context("log camera image")?;

        let strip: Vec<[f32; 3]> = frame
            .trajectory
            .points()
            .iter()
            .copied()
            .map(f32x3)
            .collect();
        rec.log(
            TRAJECTORY,
            &rerun::LineStrips3D::new([strip])
                .with_colors([color(settings.trajectory_color)])
                .with_radii([settings.trajectory_radius as f32]),
        )
        .context("log trajectory")?;

        let l = AXIS_LENGTH as f32;
        rec.log(
            AXES,
            &rerun::Arrows3D::from_vectors([[l, 0.0, 0.0], [0.0, l, 0.0], [0.0, 0.0, l]])
                .with_colors(AXIS_COLORS.map(color))
                .with_radii([AXIS_RADIUS as f32]),
        )
        .context("log axis triad")?;

        rec.log(GRIPPER, &rerun::Scalars::new([record.gripper_width()]))
            .context("log gripper width")?;
        Ok(())
    }

    fn end(&mut self) -> UmiResult<()> {
        // Dropping the stream flushes pending data to the viewer or file.
        if self.rec.take().is_some() {
            tracing::info!("rerun recording finished");
        }
        Ok(())
    }
}
