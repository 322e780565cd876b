use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{UmiError, UmiResult};

/// 0-based episode number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct EpisodeId(pub u64);

impl EpisodeId {
    /// Convert the 1-based episode number used on the command line.
    ///
    /// Numbers that end up below 0 after conversion are configuration errors.
    pub fn from_one_based(n: i64) -> UmiResult<Self> {
        match n.checked_sub(1) {
            Some(zero_based) if zero_based >= 0 => Ok(Self(zero_based as u64)),
            _ => Err(UmiError::config(format!(
                "episode_id must be >= 0, got {} (1-based input {n})",
                i128::from(n) - 1
            ))),
        }
    }

    /// Validate a signed 0-based episode number.
    pub fn from_zero_based(n: i64) -> UmiResult<Self> {
        if n < 0 {
            return Err(UmiError::config(format!("episode_id must be >= 0, got {n}")));
        }
        Ok(Self(n as u64))
    }

    /// The 1-based number shown to users.
    pub fn one_based(self) -> u64 {
        self.0 + 1
    }
}

impl std::fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cumulative exclusive end offsets of each episode (`meta/episode_ends`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpisodeBoundaries {
    ends: Vec<u64>,
}

impl EpisodeBoundaries {
    /// Validate a non-decreasing sequence of end offsets.
    pub fn new(ends: Vec<u64>) -> UmiResult<Self> {
        if let Some(k) = ends.windows(2).position(|w| w[0] > w[1]) {
            return Err(UmiError::store(format!(
                "episode_ends must be non-decreasing, but ends[{}] = {} > ends[{}] = {}",
                k,
                ends[k],
                k + 1,
                ends[k + 1]
            )));
        }
        Ok(Self { ends })
    }

    /// Build from raw signed values as stored on disk.
    pub fn from_signed(raw: &[i64]) -> UmiResult<Self> {
        let ends = raw
            .iter()
            .enumerate()
            .map(|(k, &v)| {
                u64::try_from(v)
                    .map_err(|_| UmiError::store(format!("episode_ends[{k}] is negative ({v})")))
            })
            .collect::<UmiResult<Vec<_>>>()?;
        Self::new(ends)
    }

    /// Number of episodes.
    pub fn len(&self) -> u64 {
        self.ends.len() as u64
    }

    /// `true` when the dataset holds no episodes.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Total frame count covered by all episodes.
    pub fn total_frames(&self) -> u64 {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Raw end offsets.
    pub fn ends(&self) -> &[u64] {
        &self.ends
    }

    /// Frame range `[ends[k-1], ends[k])` of episode `k` (episode 0 starts at 0).
    pub fn resolve(&self, episode: EpisodeId) -> UmiResult<FrameRange> {
        let k = usize::try_from(episode.0).unwrap_or(usize::MAX);
        let end = *self.ends.get(k).ok_or(UmiError::EpisodeRange {
            episode: episode.0,
            episodes: self.len(),
        })?;
        let start = if k == 0 { 0 } else { self.ends[k - 1] };
        FrameRange::new(FrameIndex(start), FrameIndex(end))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/episode/index.rs"]
mod tests;
