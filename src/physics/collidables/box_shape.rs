use glam::Vec3;

use super::shape::SupportMapping;

/// Collision shape representing a solid cuboid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxShape {
    /// Half of the box's extent along each local axis.
    pub half_extents: Vec3,
}

impl BoxShape {
    /// Creates a box shape from its full width, height and length.
    #[inline(always)]
    pub fn new(width: f32, height: f32, length: f32) -> Self {
        Self {
            half_extents: Vec3::new(width * 0.5, height * 0.5, length * 0.5),
        }
    }

    /// Creates a box shape from its half extents.
    #[inline(always)]
    pub fn from_half_extents(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}

/// Sign of `x`, keeping zero as zero.
#[inline(always)]
fn sign_or_zero(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl SupportMapping for BoxShape {
    // Zero direction components map to zero, landing on face centers.
    #[inline(always)]
    fn support_mapping(&self, direction: Vec3) -> Vec3 {
        Vec3::new(
            sign_or_zero(direction.x) * self.half_extents.x,
            sign_or_zero(direction.y) * self.half_extents.y,
            sign_or_zero(direction.z) * self.half_extents.z,
        )
    }

    #[inline(always)]
    fn support_center(&self) -> Vec3 {
        Vec3::ZERO
    }
}
