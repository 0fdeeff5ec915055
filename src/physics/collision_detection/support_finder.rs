use glam::Vec3;

use crate::physics::collidables::shape::SupportMapping;
use crate::utilities::matrix3x3::Matrix3x3;

/// Computes the world space support point of a posed shape.
///
/// The direction is brought into the shape's local frame by the orientation's transpose,
/// the local support is rotated back out, then offset by the position.
#[inline(always)]
pub fn support_map_transformed<S: SupportMapping + ?Sized>(
    shape: &S,
    orientation: &Matrix3x3,
    position: Vec3,
    direction: Vec3,
) -> Vec3 {
    let local_direction = orientation.transform_transpose(direction);
    let local_support = shape.support_mapping(local_direction);
    orientation.transform(local_support) + position
}
