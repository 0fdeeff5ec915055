use glam::Vec3;

/// Defines a convex shape by its support mapping.
///
/// Convex shapes have no hollowed out regions; any line passing through a convex shape
/// will never enter and exit more than once. Both functions work in the shape's local space.
/// No guarantee is made for non-convex implementors.
pub trait SupportMapping {
    /// Returns the point of the shape farthest along `direction`.
    ///
    /// `direction` is not necessarily normalized and may be zero.
    fn support_mapping(&self, direction: Vec3) -> Vec3;

    /// Returns a point strictly inside the shape, such as its centroid.
    fn support_center(&self) -> Vec3;
}

impl<T: SupportMapping + ?Sized> SupportMapping for &T {
    #[inline(always)]
    fn support_mapping(&self, direction: Vec3) -> Vec3 {
        (**self).support_mapping(direction)
    }

    #[inline(always)]
    fn support_center(&self) -> Vec3 {
        (**self).support_center()
    }
}

impl<T: SupportMapping + ?Sized> SupportMapping for Box<T> {
    #[inline(always)]
    fn support_mapping(&self, direction: Vec3) -> Vec3 {
        (**self).support_mapping(direction)
    }

    #[inline(always)]
    fn support_center(&self) -> Vec3 {
        (**self).support_center()
    }
}
