use std::path::{Path, PathBuf};

use crate::episode::frame::{FrameImage, LaneRow};
use crate::episode::index::EpisodeBoundaries;
use crate::foundation::error::{UmiError, UmiResult};
use crate::store::array::ZarrArray;
use crate::store::meta::Kind;
use crate::stream::source::FrameSource;

pub(crate) const EPISODE_ENDS: &str = "meta/episode_ends";
pub(crate) const CAMERA: &str = "data/camera0_rgb";
pub(crate) const EEF_POS: &str = "data/robot0_eef_pos";
pub(crate) const EEF_ROT: &str = "data/robot0_eef_rot_axis_angle";
pub(crate) const GRIPPER: &str = "data/robot0_gripper_width";

/// Directory name of the replay buffer inside a UMI project folder.
pub const DATASET_DIR_NAME: &str = "dataset.zarr";

/// A UMI replay buffer stored as a Zarr v2 directory store.
///
/// All five lanes are opened up front; rows are read lazily through a per-lane chunk cache.
#[derive(Debug)]
pub struct ZarrDataset {
    root: PathBuf,
    boundaries: EpisodeBoundaries,
    num_frames: u64,
    camera: ZarrArray,
    eef_pos: ZarrArray,
    eef_rot: ZarrArray,
    gripper: ZarrArray,
}

impl ZarrDataset {
    /// Open the dataset at `path`.
    ///
    /// `path` may be a project folder containing `dataset.zarr` or the store root itself.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> UmiResult<Self> {
        let root = resolve_root(path.as_ref())?;

        let mut ends = ZarrArray::open(&root, EPISODE_ENDS)?;
        if ends.shape().len() != 1 {
            return Err(UmiError::store(format!(
                "'{}' must be 1-dimensional, got shape {:?}",
                EPISODE_ENDS,
                ends.shape()
            )));
        }
        let boundaries = EpisodeBoundaries::from_signed(&ends.read_all_i64()?)?;

        let camera = ZarrArray::open(&root, CAMERA)?;
        let dtype = camera.dtype();
        if dtype.kind != Kind::UInt || dtype.size != 1 {
            return Err(UmiError::unsupported(format!(
                "'{CAMERA}' must hold 8-bit unsigned pixels"
            )));
        }
        match camera.row_shape().as_slice() {
            [_, _] | [_, _, 1 | 3 | 4] => {}
            other => {
                return Err(UmiError::store(format!(
                    "'{CAMERA}' rows must be (H, W) or (H, W, C) with C in {{1, 3, 4}}, got {other:?}"
                )));
            }
        }

        let eef_pos = ZarrArray::open(&root, EEF_POS)?;
        let eef_rot = ZarrArray::open(&root, EEF_ROT)?;
        let gripper = ZarrArray::open(&root, GRIPPER)?;

        let num_frames = camera.len();
        for lane in [&eef_pos, &eef_rot, &gripper] {
            if lane.len() != num_frames {
                return Err(UmiError::store(format!(
                    "'{}' has {} frames but '{}' has {}",
                    lane.name(),
                    lane.len(),
                    CAMERA,
                    num_frames
                )));
            }
        }
        if boundaries.total_frames() > num_frames {
            return Err(UmiError::store(format!(
                "episode_ends reach frame {} but the data lanes hold {} frames",
                boundaries.total_frames(),
                num_frames
            )));
        }

        tracing::debug!(
            root = %root.display(),
            frames = num_frames,
            episodes = boundaries.len(),
            "opened dataset"
        );
        Ok(Self {
            root,
            boundaries,
            num_frames,
            camera,
            eef_pos,
            eef_rot,
            gripper,
        })
    }

    /// Resolved store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of frames in the data lanes.
    pub fn num_frames(&self) -> u64 {
        self.num_frames
    }

    /// Number of episodes.
    pub fn num_episodes(&self) -> u64 {
        self.boundaries.len()
    }

    fn float_row(lane: &mut ZarrArray, p: u64) -> UmiResult<LaneRow> {
        let values = lane.read_row_f64(p)?.ok_or_else(|| {
            UmiError::store(format!(
                "'{}' has no data for frame {} and no fill value",
                lane.name(),
                p
            ))
        })?;
        Ok(LaneRow {
            shape: lane.row_shape(),
            values,
        })
    }
}

impl FrameSource for ZarrDataset {
    fn episode_boundaries(&self) -> &EpisodeBoundaries {
        &self.boundaries
    }

    fn image(&mut self, p: u64) -> UmiResult<Option<FrameImage>> {
        let Some(bytes) = self.camera.read_row(p)? else {
            return Ok(None);
        };
        let (h, w, c) = match *self.camera.row_shape().as_slice() {
            [h, w] => (h, w, 1),
            [h, w, c] => (h, w, c),
            _ => return Err(UmiError::store(format!("'{CAMERA}' rows have an invalid shape"))),
        };
        let dim = |d: usize| {
            u32::try_from(d)
                .map_err(|_| UmiError::store(format!("'{CAMERA}' dimension {d} is too large")))
        };
        FrameImage::new(dim(h)?, dim(w)?, dim(c)?, bytes).map(Some)
    }

    fn eef_pos(&mut self, p: u64) -> UmiResult<LaneRow> {
        Self::float_row(&mut self.eef_pos, p)
    }

    fn eef_rot(&mut self, p: u64) -> UmiResult<LaneRow> {
        Self::float_row(&mut self.eef_rot, p)
    }

    fn gripper_width(&mut self, p: u64) -> UmiResult<f64> {
        let row = Self::float_row(&mut self.gripper, p)?;
        row.values
            .first()
            .copied()
            .ok_or_else(|| UmiError::store(format!("'{GRIPPER}' row {p} is empty")))
    }
}

impl Drop for ZarrDataset {
    fn drop(&mut self) {
        tracing::debug!(root = %self.root.display(), "released dataset");
    }
}

/// Prefer `<path>/dataset.zarr`; otherwise `path` must itself look like the store root.
fn resolve_root(path: &Path) -> UmiResult<PathBuf> {
    let nested = path.join(DATASET_DIR_NAME);
    if nested.is_dir() {
        return Ok(nested);
    }
    if path.join(".zgroup").is_file() || path.join(EPISODE_ENDS).is_dir() {
        return Ok(path.to_path_buf());
    }
    Err(UmiError::config(format!(
        "dataset not found: neither '{}' nor a Zarr group at '{}'",
        nested.display(),
        path.display()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/store/dataset.rs"]
mod tests;
