use glam::Vec3;

use super::shape::SupportMapping;

/// Convex hull of a point cloud, sampled by brute force over its points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvexHull {
    points: Vec<Vec3>,
    center: Vec3,
}

impl ConvexHull {
    /// Creates a hull from its points. Returns `None` if there are no points.
    ///
    /// Interior points are harmless; they are simply never selected as support points.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        Some(Self { points, center })
    }

    /// Gets the points of the hull.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

impl SupportMapping for ConvexHull {
    fn support_mapping(&self, direction: Vec3) -> Vec3 {
        let Some((&first, rest)) = self.points.split_first() else {
            return self.center;
        };
        let mut best = first;
        let mut best_dot = best.dot(direction);
        for &point in rest {
            let dot = point.dot(direction);
            if dot > best_dot {
                best_dot = dot;
                best = point;
            }
        }
        best
    }

    #[inline(always)]
    fn support_center(&self) -> Vec3 {
        self.center
    }
}
