use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::episode::index::EpisodeId;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{UmiError, UmiResult};

/// Presentation parameters handed to render sinks.
///
/// Missing keys in a settings file fall back to the defaults below.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Pinhole focal length in pixels.
    pub focal_length: f64,
    /// Distance of the drawn image plane from the camera origin.
    pub image_plane_distance: f64,
    /// Color of the trajectory polyline.
    pub trajectory_color: Rgb8,
    /// Color of the gripper-width series.
    pub gripper_color: Rgb8,
    /// Radius of the trajectory polyline.
    pub trajectory_radius: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            focal_length: 450.0,
            image_plane_distance: 0.2,
            trajectory_color: Rgb8::new(100, 149, 237),
            gripper_color: Rgb8::new(255, 165, 0),
            trajectory_radius: 0.002,
        }
    }
}

impl RenderSettings {
    /// Load settings from a JSON file and validate them.
    pub fn from_path(path: impl AsRef<Path>) -> UmiResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_slice(&bytes)
            .map_err(|e| UmiError::config(format!("invalid settings '{}': {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every numeric parameter is finite and in range.
    pub fn validate(&self) -> UmiResult<()> {
        let positive = [
            ("focal_length", self.focal_length),
            ("image_plane_distance", self.image_plane_distance),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(UmiError::config(format!("{name} must be > 0, got {v}")));
            }
        }
        if !(self.trajectory_radius.is_finite() && self.trajectory_radius >= 0.0) {
            return Err(UmiError::config(format!(
                "trajectory_radius must be >= 0, got {}",
                self.trajectory_radius
            )));
        }
        Ok(())
    }
}

/// Validated run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct VisConfig {
    dataset_path: PathBuf,
    episode: EpisodeId,
    settings: RenderSettings,
}

impl VisConfig {
    /// Validate the inputs of one visualization run.
    ///
    /// The dataset path must exist; it is stored in absolute form.
    pub fn new(
        dataset_path: impl AsRef<Path>,
        episode: EpisodeId,
        settings: RenderSettings,
    ) -> UmiResult<Self> {
        let path = dataset_path.as_ref();
        let dataset_path = match std::fs::canonicalize(path) {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UmiError::config(format!("Path not found: {}", path.display())));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("resolve dataset path '{}'", path.display()))
                    .into());
            }
        };
        settings.validate()?;
        Ok(Self {
            dataset_path,
            episode,
            settings,
        })
    }

    /// Build from the 1-based episode number used on the command line.
    pub fn from_one_based(
        dataset_path: impl AsRef<Path>,
        episode: i64,
        settings: RenderSettings,
    ) -> UmiResult<Self> {
        Self::new(dataset_path, EpisodeId::from_one_based(episode)?, settings)
    }

    /// Absolute dataset path.
    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Episode to visualize.
    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// Render settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
