use glam::Vec3;

use super::ray::Ray;
use super::shape::SupportMapping;
use crate::physics::collision_detection::gjk::RayHit;

/// Collision shape representing a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    /// Radius of the sphere.
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere shape.
    #[inline(always)]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Tests a ray against the sphere centered at `position` analytically.
    pub fn ray_test(&self, position: Vec3, ray: &Ray) -> Option<RayHit> {
        // Normalize the direction. Sqrts aren't *that* bad, and it both simplifies things
        // and helps avoid numerical problems.
        let inverse_d_length = 1.0 / ray.direction.length();
        let d = ray.direction * inverse_d_length;

        // Move the origin up to the earliest possible impact time.
        let mut o = ray.origin - position;
        let t_offset = (-o.dot(d) - self.radius).max(0.0);
        o += d * t_offset;
        let b = o.dot(d);
        let c = o.dot(o) - self.radius * self.radius;

        if b > 0.0 && c > 0.0 {
            // Ray is outside and pointing away.
            return None;
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()).max(-t_offset);
        Some(RayHit {
            fraction: (t + t_offset) * inverse_d_length,
            normal: (o + d * t) / self.radius,
        })
    }
}

impl SupportMapping for Sphere {
    #[inline(always)]
    fn support_mapping(&self, direction: Vec3) -> Vec3 {
        direction.normalize_or_zero() * self.radius
    }

    #[inline(always)]
    fn support_center(&self) -> Vec3 {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn support_lies_on_surface() {
        let sphere = Sphere::new(2.0);
        let support = sphere.support_mapping(Vec3::new(3.0, 4.0, 0.0));
        assert!(support.abs_diff_eq(Vec3::new(1.2, 1.6, 0.0), 1e-6));
        assert_eq!(sphere.support_mapping(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn analytic_ray_test() {
        let sphere = Sphere::new(1.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let hit = sphere.ray_test(Vec3::ZERO, &ray).unwrap();
        assert_relative_eq!(hit.fraction, 0.4, epsilon = 1e-6);
        assert!(hit.normal.abs_diff_eq(Vec3::NEG_X, 1e-6));

        let away = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert!(sphere.ray_test(Vec3::ZERO, &away).is_none());
        let wide = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(sphere.ray_test(Vec3::ZERO, &wide).is_none());
    }
}
