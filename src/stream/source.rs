use crate::episode::frame::{FrameImage, LaneRow};
use crate::episode::index::EpisodeBoundaries;
use crate::foundation::error::{UmiError, UmiResult};

/// Random-access view over the per-frame lanes of a dataset.
///
/// Every lane is addressed with the same global frame position `p`. Implementations may cache
/// but must not require whole-dataset materialization.
pub trait FrameSource {
    /// Cumulative episode end offsets.
    fn episode_boundaries(&self) -> &EpisodeBoundaries;

    /// Camera image at `p`, or `None` when the frame has no image data.
    fn image(&mut self, p: u64) -> UmiResult<Option<FrameImage>>;

    /// End-effector position row at `p`.
    fn eef_pos(&mut self, p: u64) -> UmiResult<LaneRow>;

    /// End-effector axis-angle rotation row at `p`.
    fn eef_rot(&mut self, p: u64) -> UmiResult<LaneRow>;

    /// Gripper opening width at `p`.
    fn gripper_width(&mut self, p: u64) -> UmiResult<f64>;
}

/// One frame's raw lanes, as held by [`InMemorySource`].
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    /// Camera image, `None` for a missing frame.
    pub image: Option<FrameImage>,
    /// End-effector position row.
    pub eef_pos: LaneRow,
    /// End-effector rotation row.
    pub eef_rot: LaneRow,
    /// Gripper width.
    pub gripper_width: f64,
}

/// Frame source backed by vectors. Useful for tests and synthetic data.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    boundaries: EpisodeBoundaries,
    frames: Vec<RawFrame>,
}

impl InMemorySource {
    /// Build a source; `boundaries` must not reach past `frames`.
    pub fn new(boundaries: EpisodeBoundaries, frames: Vec<RawFrame>) -> UmiResult<Self> {
        if boundaries.total_frames() > frames.len() as u64 {
            return Err(UmiError::validation(format!(
                "episode_ends cover {} frames but only {} were provided",
                boundaries.total_frames(),
                frames.len()
            )));
        }
        Ok(Self { boundaries, frames })
    }

    /// Stored frames, indexed by global position.
    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    fn frame(&self, p: u64) -> UmiResult<&RawFrame> {
        usize::try_from(p)
            .ok()
            .and_then(|i| self.frames.get(i))
            .ok_or_else(|| {
                UmiError::store(format!(
                    "frame position {} is out of bounds ({} frames)",
                    p,
                    self.frames.len()
                ))
            })
    }
}

impl FrameSource for InMemorySource {
    fn episode_boundaries(&self) -> &EpisodeBoundaries {
        &self.boundaries
    }

    fn image(&mut self, p: u64) -> UmiResult<Option<FrameImage>> {
        Ok(self.frame(p)?.image.clone())
    }

    fn eef_pos(&mut self, p: u64) -> UmiResult<LaneRow> {
        Ok(self.frame(p)?.eef_pos.clone())
    }

    fn eef_rot(&mut self, p: u64) -> UmiResult<LaneRow> {
        Ok(self.frame(p)?.eef_rot.clone())
    }

    fn gripper_width(&mut self, p: u64) -> UmiResult<f64> {
        Ok(self.frame(p)?.gripper_width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/source.rs"]
mod tests;
