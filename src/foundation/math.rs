/// Rotation magnitude at or below which an axis-angle vector has no usable axis.
pub const AXIS_ANGLE_EPSILON: f64 = 1e-6;

/// Axis-angle rotation split into magnitude and unit axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AxisAngle {
    /// Rotation angle in radians (norm of the input vector).
    pub angle: f64,
    /// Unit rotation axis, `None` for a near-zero rotation (render as identity).
    pub axis: Option<[f64; 3]>,
}

impl AxisAngle {
    /// `true` when the rotation should be treated as identity.
    pub fn is_identity(&self) -> bool {
        self.axis.is_none()
    }
}

/// Split an axis-angle rotation vector into angle and unit axis.
///
/// Angles `<= AXIS_ANGLE_EPSILON` yield `axis: None` instead of dividing by a near-zero norm.
pub fn to_axis_angle(rot_vec: [f64; 3]) -> AxisAngle {
    let angle = norm3(rot_vec);
    if angle > AXIS_ANGLE_EPSILON {
        AxisAngle {
            angle,
            axis: Some([rot_vec[0] / angle, rot_vec[1] / angle, rot_vec[2] / angle]),
        }
    } else {
        AxisAngle { angle, axis: None }
    }
}

/// Euclidean norm of a 3-vector.
pub fn norm3(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
