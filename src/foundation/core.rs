use crate::foundation::error::{UmiError, UmiResult};

/// 0-based frame position.
///
/// Depending on context this is either a global position in the dataset's frame axis or a
/// local position inside an episode. Conversions between the two go through [`FrameRange`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open frame range `[start, end)` in global dataset positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> UmiResult<Self> {
        if start.0 > end.0 {
            return Err(UmiError::validation(format!(
                "frame range start {} must be <= end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Map a global position inside the range to its local (episode-relative) index.
    pub fn to_local(self, global: FrameIndex) -> Option<FrameIndex> {
        self.contains(global)
            .then(|| FrameIndex(global.0 - self.start.0))
    }

    /// Forward-only walk over the global positions of the range, paired with local indices.
    pub fn positions(self) -> FramePositions {
        FramePositions {
            range: self,
            next: self.start.0,
        }
    }
}

/// Iterator returned by [`FrameRange::positions`].
///
/// Yields `(global, local)` pairs in ascending order and cannot be rewound.
#[derive(Clone, Debug)]
pub struct FramePositions {
    range: FrameRange,
    next: u64,
}

impl Iterator for FramePositions {
    type Item = (FrameIndex, FrameIndex);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.range.end.0 {
            return None;
        }
        let global = self.next;
        self.next += 1;
        Some((FrameIndex(global), FrameIndex(global - self.range.start.0)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.range.end.0.saturating_sub(self.next) as usize;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for FramePositions {}

/// Straight-alpha RGB8 color used by render settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
