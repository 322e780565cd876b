/// Append-only path of end-effector positions, in the order frames were delivered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<[f64; 3]>,
}

impl Trajectory {
    /// Create an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next position.
    pub fn push(&mut self, position: [f64; 3]) {
        self.points.push(position);
    }

    /// Number of positions recorded.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` before the first push.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions in append order.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Most recent position.
    pub fn last(&self) -> Option<[f64; 3]> {
        self.points.last().copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/episode/trajectory.rs"]
mod tests;
