use glam::Vec3;

use super::shape::SupportMapping;

/// Collision shape representing a cylinder along the local Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cylinder {
    /// Radius of the cylinder.
    pub radius: f32,
    /// Half length of the cylinder along its local Y axis.
    pub half_length: f32,
}

impl Cylinder {
    /// Creates a cylinder shape.
    #[inline(always)]
    pub fn new(radius: f32, length: f32) -> Self {
        Self {
            radius,
            half_length: length * 0.5,
        }
    }
}

impl SupportMapping for Cylinder {
    #[inline(always)]
    fn support_mapping(&self, direction: Vec3) -> Vec3 {
        let y = if direction.y > 0.0 {
            self.half_length
        } else {
            -self.half_length
        };
        let horizontal_length = (direction.x * direction.x + direction.z * direction.z).sqrt();
        if horizontal_length > 1e-8 {
            let normalize_scale = self.radius / horizontal_length;
            Vec3::new(direction.x * normalize_scale, y, direction.z * normalize_scale)
        } else {
            Vec3::new(0.0, y, 0.0)
        }
    }

    #[inline(always)]
    fn support_center(&self) -> Vec3 {
        Vec3::ZERO
    }
}
