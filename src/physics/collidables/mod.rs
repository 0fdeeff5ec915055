pub mod shape;
pub mod ray;

// Convex shape primitives
pub mod sphere;
pub mod box_shape;
pub mod capsule;
pub mod cylinder;
pub mod convex_hull;
