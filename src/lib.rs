//! GJK narrow-phase queries over support-mapped convex shapes.
//!
//! Shapes only need to implement [`SupportMapping`]. Each query takes the shape's
//! orientation and position fresh, so nothing about a pose is cached between calls.
//!
//! ```
//! use glam::Vec3;
//! use rust_gjk::{raycast, BoxShape, Matrix3x3, Ray};
//!
//! let shape = BoxShape::from_half_extents(Vec3::ONE);
//! let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
//! let hit = raycast(&shape, &Matrix3x3::IDENTITY, Vec3::ZERO, &ray).unwrap();
//! assert!((hit.fraction - 0.4).abs() < 1e-5);
//! ```

pub mod error;
pub mod physics;
pub mod utilities;

pub use error::{GjkError, GjkResult};
pub use physics::collidables::{
    box_shape::BoxShape, capsule::Capsule, convex_hull::ConvexHull, cylinder::Cylinder, ray::Ray,
    shape::SupportMapping, sphere::Sphere,
};
pub use physics::collision_detection::gjk::{
    closest_points, pointcast, raycast, ClosestPointsResult, GjkQuery, RayHit,
};
pub use physics::collision_detection::gjk_config::GjkConfig;
pub use physics::collision_detection::voronoi_simplex_solver::VoronoiSimplexSolver;
pub use utilities::matrix3x3::Matrix3x3;
