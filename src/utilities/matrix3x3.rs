use glam::{Quat, Vec3};

/// 3 row, 3 column matrix.
///
/// Vectors are treated as rows: `transform(v) = v.x * x + v.y * y + v.z * z`.
/// Orientations handed to the query engine are assumed orthonormal, so the
/// transpose doubles as the inverse.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix3x3 {
    /// First row of the matrix.
    pub x: Vec3,
    /// Second row of the matrix.
    pub y: Vec3,
    /// Third row of the matrix.
    pub z: Vec3,
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3x3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Self = Self {
        x: Vec3::X,
        y: Vec3::Y,
        z: Vec3::Z,
    };

    /// Creates a matrix from its rows.
    #[inline(always)]
    pub const fn from_rows(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self { x, y, z }
    }

    /// Transforms the vector by the matrix.
    #[inline(always)]
    pub fn transform(&self, v: Vec3) -> Vec3 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// Transforms the vector by the matrix's transpose.
    #[inline(always)]
    pub fn transform_transpose(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.x), v.dot(self.y), v.dot(self.z))
    }

    /// Creates a rotation matrix from a unit quaternion.
    #[inline(always)]
    pub fn from_quaternion(q: Quat) -> Self {
        let qx2 = q.x + q.x;
        let qy2 = q.y + q.y;
        let qz2 = q.z + q.z;
        let xx = qx2 * q.x;
        let yy = qy2 * q.y;
        let zz = qz2 * q.z;
        let xy = qx2 * q.y;
        let xz = qx2 * q.z;
        let xw = qx2 * q.w;
        let yz = qy2 * q.z;
        let yw = qy2 * q.w;
        let zw = qz2 * q.w;

        Self {
            x: Vec3::new(1.0 - yy - zz, xy + zw, xz - yw),
            y: Vec3::new(xy - zw, 1.0 - xx - zz, yz + xw),
            z: Vec3::new(xz + yw, yz - xw, 1.0 - xx - yy),
        }
    }

    /// Creates a matrix representing a rotation about a unit axis.
    #[inline(always)]
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let xx = axis.x * axis.x;
        let yy = axis.y * axis.y;
        let zz = axis.z * axis.z;
        let xy = axis.x * axis.y;
        let xz = axis.x * axis.z;
        let yz = axis.y * axis.z;

        let (sin_angle, cos_angle) = angle.sin_cos();
        let one_minus_cos_angle = 1.0 - cos_angle;

        Self {
            x: Vec3::new(
                1.0 + one_minus_cos_angle * (xx - 1.0),
                axis.z * sin_angle + one_minus_cos_angle * xy,
                -axis.y * sin_angle + one_minus_cos_angle * xz,
            ),
            y: Vec3::new(
                -axis.z * sin_angle + one_minus_cos_angle * xy,
                1.0 + one_minus_cos_angle * (yy - 1.0),
                axis.x * sin_angle + one_minus_cos_angle * yz,
            ),
            z: Vec3::new(
                axis.y * sin_angle + one_minus_cos_angle * xz,
                -axis.x * sin_angle + one_minus_cos_angle * yz,
                1.0 + one_minus_cos_angle * (zz - 1.0),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transpose_inverts_rotation() {
        let rotation = Matrix3x3::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 0.7);
        let v = Vec3::new(0.3, -1.2, 4.0);
        let round_trip = rotation.transform_transpose(rotation.transform(v));
        assert!(round_trip.abs_diff_eq(v, 1e-5));
        assert_relative_eq!(rotation.transform(v).length(), v.length(), epsilon = 1e-5);
    }

    #[test]
    fn quaternion_and_axis_angle_agree() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let from_quat = Matrix3x3::from_quaternion(Quat::from_axis_angle(axis, FRAC_PI_2));
        let from_axis = Matrix3x3::from_axis_angle(axis, FRAC_PI_2);
        assert!(from_quat.x.abs_diff_eq(from_axis.x, 1e-6));
        assert!(from_quat.y.abs_diff_eq(from_axis.y, 1e-6));
        assert!(from_quat.z.abs_diff_eq(from_axis.z, 1e-6));
        // Row vector convention: local X maps onto the first row.
        assert!(from_axis.transform(Vec3::X).abs_diff_eq(Vec3::Y, 1e-6));
    }
}
