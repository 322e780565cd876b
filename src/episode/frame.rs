use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FrameError, UmiError, UmiResult};

const VEC3_SHAPE: [usize; 1] = [3];

/// Row-major `height x width x channels` 8-bit image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameImage {
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
    /// Channels per pixel (1, 3 or 4).
    pub channels: u32,
    /// Pixel bytes, `height * width * channels` long.
    pub data: Vec<u8>,
}

impl FrameImage {
    /// Wrap pixel bytes, checking the length against the dimensions.
    pub fn new(height: u32, width: u32, channels: u32, data: Vec<u8>) -> UmiResult<Self> {
        let expected = (height as usize)
            .saturating_mul(width as usize)
            .saturating_mul(channels as usize);
        if data.len() != expected {
            return Err(UmiError::validation(format!(
                "image {}x{}x{} needs {} bytes, got {}",
                height,
                width,
                channels,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Number of pixel values (`h * w * c`).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// `true` when the image holds no pixel values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One frame's row of a float lane, with the frame axis removed from `shape`.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneRow {
    /// Row shape, e.g. `[3]` for an `(N, 3)` array.
    pub shape: Vec<usize>,
    /// Values in row-major order.
    pub values: Vec<f64>,
}

impl LaneRow {
    /// Build a 1-D row.
    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    fn as_vec3(&self, field: &'static str, index: FrameIndex) -> Result<[f64; 3], FrameError> {
        match (self.shape.as_slice(), self.values.as_slice()) {
            (s, &[x, y, z]) if s == VEC3_SHAPE.as_slice() => Ok([x, y, z]),
            _ => Err(FrameError::Shape {
                index,
                field,
                expected: VEC3_SHAPE.to_vec(),
                actual: self.shape.clone(),
            }),
        }
    }
}

/// A validated, immutable frame: image, end-effector pose and gripper width.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    image: FrameImage,
    eef_pos: [f64; 3],
    eef_rot: [f64; 3],
    gripper_width: f64,
    index: FrameIndex,
}

impl FrameRecord {
    /// Validate and build a frame.
    ///
    /// Checks run in order: `eef_pos` shape `(3,)`, `eef_rot` shape `(3,)`, non-empty image. The
    /// first violation is returned.
    pub fn new(
        image: FrameImage,
        eef_pos: &LaneRow,
        eef_rot: &LaneRow,
        gripper_width: f64,
        index: FrameIndex,
    ) -> Result<Self, FrameError> {
        let eef_pos = eef_pos.as_vec3("eef_pos", index)?;
        let eef_rot = eef_rot.as_vec3("eef_rot", index)?;
        if image.is_empty() {
            return Err(FrameError::EmptyImage { index });
        }
        Ok(Self {
            image,
            eef_pos,
            eef_rot,
            gripper_width,
            index,
        })
    }

    /// Camera image.
    pub fn image(&self) -> &FrameImage {
        &self.image
    }

    /// End-effector position.
    pub fn eef_pos(&self) -> [f64; 3] {
        self.eef_pos
    }

    /// End-effector rotation as an axis-angle vector (radians).
    pub fn eef_rot(&self) -> [f64; 3] {
        self.eef_rot
    }

    /// Gripper opening width.
    pub fn gripper_width(&self) -> f64 {
        self.gripper_width
    }

    /// Index within the episode.
    pub fn index(&self) -> FrameIndex {
        self.index
    }
}

#[cfg(test)]
#[path = "../../tests/unit/episode/frame.rs"]
mod tests;
