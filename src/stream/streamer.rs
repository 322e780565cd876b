use crate::episode::frame::FrameRecord;
use crate::episode::trajectory::Trajectory;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{FrameError, UmiError, UmiResult};
use crate::foundation::math::{AxisAngle, to_axis_angle};
use crate::stream::source::FrameSource;

/// Lifecycle of a [`FrameStreamer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Created, not yet run.
    Ready,
    /// Walking the frame range.
    Streaming,
    /// Every position was either delivered or skipped.
    Completed,
    /// Stopped early by an invalid frame or an error.
    Aborted,
}

/// One delivered frame with its derived rotation and the trajectory so far.
#[derive(Debug)]
pub struct StreamedFrame<'a> {
    /// The validated frame.
    pub record: FrameRecord,
    /// Rotation split into angle and axis.
    pub rotation: AxisAngle,
    /// All delivered positions up to and including this frame.
    pub trajectory: &'a Trajectory,
}

/// How a streaming run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamOutcome {
    /// The whole range was processed.
    Completed,
    /// A frame failed validation; nothing after it was delivered.
    Aborted {
        /// Local index of the invalid frame.
        index: FrameIndex,
        /// Validation failure.
        error: FrameError,
    },
}

/// Summary of a streaming run.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamReport {
    /// Final outcome.
    pub outcome: StreamOutcome,
    /// Number of frames handed to the callback.
    pub delivered: u64,
    /// Local indices skipped because their image was missing or empty.
    pub skipped: Vec<FrameIndex>,
}

impl StreamReport {
    /// `true` when the run stopped on an invalid frame.
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, StreamOutcome::Aborted { .. })
    }
}

/// Single-pass driver over one episode's frame range.
///
/// For each global position `p` in the range the image is fetched first; a missing or empty
/// image skips the frame. Pose and gripper lanes are then read at the same `p`, validated into
/// a [`FrameRecord`] and delivered with the updated trajectory. A streamer runs at most once.
#[derive(Debug)]
pub struct FrameStreamer {
    range: FrameRange,
    state: StreamState,
    trajectory: Trajectory,
}

impl FrameStreamer {
    /// Create a streamer over `range` (global positions).
    pub fn new(range: FrameRange) -> Self {
        Self {
            range,
            state: StreamState::Ready,
            trajectory: Trajectory::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Range being streamed.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Positions delivered so far.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Walk the range once, calling `on_frame` for every valid frame in ascending order.
    ///
    /// Frame validation failures end the run with [`StreamOutcome::Aborted`]. Source and
    /// callback errors are returned as `Err`; the streamer is left `Aborted` in both cases.
    pub fn run<S, F>(&mut self, source: &mut S, mut on_frame: F) -> UmiResult<StreamReport>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&StreamedFrame<'_>) -> UmiResult<()>,
    {
        if self.state != StreamState::Ready {
            return Err(UmiError::validation(format!(
                "frame streamer cannot be restarted (state: {:?})",
                self.state
            )));
        }
        self.state = StreamState::Streaming;
        tracing::debug!(
            start = self.range.start.0,
            end = self.range.end.0,
            "streaming frames"
        );

        let result = self.stream(source, &mut on_frame);
        self.state = match &result {
            Ok(report) if !report.is_aborted() => StreamState::Completed,
            _ => StreamState::Aborted,
        };
        result
    }

    fn stream<S, F>(&mut self, source: &mut S, on_frame: &mut F) -> UmiResult<StreamReport>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&StreamedFrame<'_>) -> UmiResult<()>,
    {
        let mut delivered = 0u64;
        let mut skipped = Vec::new();

        for (global, local) in self.range.positions() {
            let p = global.0;
            let image = match source.image(p)? {
                Some(image) if !image.is_empty() => image,
                _ => {
                    tracing::warn!(frame = local.0, "skipping frame {local}: image data is empty");
                    skipped.push(local);
                    continue;
                }
            };

            let eef_pos = source.eef_pos(p)?;
            let eef_rot = source.eef_rot(p)?;
            let gripper_width = source.gripper_width(p)?;

            let record = match FrameRecord::new(image, &eef_pos, &eef_rot, gripper_width, local) {
                Ok(record) => record,
                Err(error) => {
                    tracing::error!(frame = local.0, %error, "invalid frame, stopping");
                    return Ok(StreamReport {
                        outcome: StreamOutcome::Aborted {
                            index: local,
                            error,
                        },
                        delivered,
                        skipped,
                    });
                }
            };

            let rotation = to_axis_angle(record.eef_rot());
            self.trajectory.push(record.eef_pos());
            on_frame(&StreamedFrame {
                record,
                rotation,
                trajectory: &self.trajectory,
            })?;
            delivered += 1;
        }

        Ok(StreamReport {
            outcome: StreamOutcome::Completed,
            delivered,
            skipped,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/streamer.rs"]
mod tests;
