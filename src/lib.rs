//! umi-viz streams one episode of a UMI robot demonstration dataset as validated frames.
//!
//! The dataset is a Zarr v2 replay buffer: per-frame lanes for the wrist camera, end-effector
//! pose and gripper width, plus cumulative `meta/episode_ends` offsets. The public API is
//! session-oriented:
//!
//! - Validate a [`VisConfig`]
//! - Call [`run_visualizer`] with a [`RenderSink`]
//! - Inspect the returned [`RunReport`]
//!
//! Lower-level pieces ([`ZarrDataset`], [`FrameStreamer`], [`EpisodeBoundaries`]) are exported
//! for callers that bring their own [`FrameSource`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod encode;
pub(crate) mod episode;
pub(crate) mod session;
pub(crate) mod store;
pub(crate) mod stream;

pub use crate::foundation::core::{FrameIndex, FramePositions, FrameRange, Rgb8};
pub use crate::foundation::error::{FrameError, UmiError, UmiResult};
pub use crate::foundation::math::{AXIS_ANGLE_EPSILON, AxisAngle, norm3, to_axis_angle};

pub use crate::episode::frame::{FrameImage, FrameRecord, LaneRow};
pub use crate::episode::index::{EpisodeBoundaries, EpisodeId};
pub use crate::episode::trajectory::Trajectory;

pub use crate::encode::dump::{DumpSink, DumpSinkOpts, FRAMES_FILE};
pub use crate::encode::sink::{
    AXIS_COLORS, AXIS_LENGTH, AXIS_RADIUS, CapturedFrame, InMemorySink, LogSink, PinholeCamera,
    RenderSink, SinkConfig,
};
#[cfg(feature = "rerun")]
pub use crate::encode::viewer::{APP_ID, RerunSink, RerunTarget, TIMELINE};

pub use crate::session::config::{RenderSettings, VisConfig};
pub use crate::session::visualize::{
    EXIT_ABORTED, EXIT_ERROR, EXIT_OK, RunReport, run_visualizer, visualize_episode,
};
pub use crate::store::dataset::{DATASET_DIR_NAME, ZarrDataset};
pub use crate::stream::source::{FrameSource, InMemorySource, RawFrame};
pub use crate::stream::streamer::{
    FrameStreamer, StreamOutcome, StreamReport, StreamState, StreamedFrame,
};
