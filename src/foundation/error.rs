use crate::foundation::core::FrameIndex;

/// Convenience result type used across the crate.
pub type UmiResult<T> = Result<T, UmiError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum UmiError {
    /// Invalid user-provided configuration (episode number, dataset path, settings file).
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid argument or value passed to a library API.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested episode does not exist in the dataset.
    #[error("episode {episode} is out of range for a dataset with {episodes} episode(s)")]
    EpisodeRange {
        /// 0-based episode requested.
        episode: u64,
        /// Number of episodes in the dataset.
        episodes: u64,
    },

    /// A frame failed validation.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Malformed or inconsistent store contents.
    #[error("store error: {0}")]
    Store(String),

    /// Store feature outside the supported subset (codec, dtype, memory order).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UmiError {
    /// Build a [`UmiError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`UmiError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`UmiError::Store`] value.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Build a [`UmiError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

/// Frame-level validation failure raised by [`crate::FrameRecord::new`].
///
/// Both variants are fatal for a streaming run. A missing or empty image seen by the streamer
/// *before* construction is skipped instead and never becomes a `FrameError`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A pose lane row does not have the expected shape.
    #[error("frame {index}: {field} must be shape {}, got {}", fmt_shape(.expected), fmt_shape(.actual))]
    Shape {
        /// Local frame index.
        index: FrameIndex,
        /// Lane field name (`eef_pos`, `eef_rot`).
        field: &'static str,
        /// Expected row shape.
        expected: Vec<usize>,
        /// Actual row shape.
        actual: Vec<usize>,
    },

    /// Image data has no pixels.
    #[error("frame {index}: image data is empty")]
    EmptyImage {
        /// Local frame index.
        index: FrameIndex,
    },
}

impl FrameError {
    /// Local index of the offending frame.
    pub fn index(&self) -> FrameIndex {
        match self {
            Self::Shape { index, .. } | Self::EmptyImage { index } => *index,
        }
    }
}

/// Render a shape the way array libraries print it: `(3,)`, `(2, 3)`, `()`.
pub(crate) fn fmt_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({n},)"),
        dims => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
