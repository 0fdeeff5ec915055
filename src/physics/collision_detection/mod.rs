pub mod gjk_config;
pub mod support_finder;

// Simplex solving
pub mod closest_point;
pub mod voronoi_simplex_solver;

// Queries
pub mod gjk;
