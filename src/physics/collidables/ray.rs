use glam::Vec3;

/// Data for a single ray.
///
/// The direction is not normalized; hit fractions are measured in multiples of it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline(always)]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Gets the point at `fraction` multiples of the direction from the origin.
    #[inline(always)]
    pub fn point_at(&self, fraction: f32) -> Vec3 {
        self.origin + self.direction * fraction
    }
}
