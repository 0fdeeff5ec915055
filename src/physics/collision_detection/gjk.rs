//! GJK queries against support-mapped convex shapes.
//!
//! All three queries share one loop shape: sample a Minkowski-difference vertex along the
//! current search direction, push it into a [`VoronoiSimplexSolver`], and take the solver's
//! closest point as the next direction until the squared distance falls under the query's
//! tolerance or the iteration cap is hit.

use std::cell::RefCell;

use glam::Vec3;
use tracing::{debug, trace};

use super::gjk_config::GjkConfig;
use super::support_finder::support_map_transformed;
use super::voronoi_simplex_solver::VoronoiSimplexSolver;
use crate::error::GjkResult;
use crate::physics::collidables::ray::Ray;
use crate::physics::collidables::shape::SupportMapping;
use crate::utilities::matrix3x3::Matrix3x3;
use crate::utilities::memory::resource_pool::ResourcePool;

/// Witness points and separating normal returned by a closest points query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosestPointsResult {
    /// Closest point on shape A.
    pub point_a: Vec3,
    /// Closest point on shape B.
    pub point_b: Vec3,
    /// Unit vector from B toward A, or zero when the shapes touch or overlap.
    pub normal: Vec3,
}

impl ClosestPointsResult {
    /// Distance between the two witness points.
    #[inline(always)]
    pub fn distance(&self) -> f32 {
        self.point_a.distance(self.point_b)
    }

    /// Gap between the witness points measured along the normal.
    #[inline(always)]
    pub fn separation(&self) -> f32 {
        (self.point_a - self.point_b).dot(self.normal)
    }
}

/// Impact reported by a ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RayHit {
    /// Impact parameter in units of the ray direction's length.
    pub fraction: f32,
    /// Surface normal at the impact; unit length unless the ray started inside the shape.
    pub normal: Vec3,
}

impl RayHit {
    /// World space impact position along `ray`.
    #[inline(always)]
    pub fn point(&self, ray: &Ray) -> Vec3 {
        ray.point_at(self.fraction)
    }
}

/// Runs GJK queries with a fixed configuration, reusing solvers from its own pool.
///
/// One instance per thread; the free functions in this module use a thread-local pool instead.
#[derive(Debug, Default)]
pub struct GjkQuery {
    config: GjkConfig,
    pool: ResourcePool<VoronoiSimplexSolver>,
}

impl GjkQuery {
    /// Creates a query runner with the default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query runner with custom tolerances.
    pub fn with_config(config: GjkConfig) -> GjkResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pool: ResourcePool::new(),
        })
    }

    #[inline(always)]
    pub fn config(&self) -> &GjkConfig {
        &self.config
    }

    /// Gets the solver pool backing this runner.
    pub fn pool(&self) -> &ResourcePool<VoronoiSimplexSolver> {
        &self.pool
    }

    /// Finds the closest points between two posed convex shapes.
    ///
    /// Always produces a result. Overlapping shapes yield coincident witness points and a
    /// zero normal, with accuracy degrading as penetration grows.
    #[allow(clippy::too_many_arguments)]
    pub fn closest_points<A, B>(
        &mut self,
        shape_a: &A,
        orientation_a: &Matrix3x3,
        position_a: Vec3,
        shape_b: &B,
        orientation_b: &Matrix3x3,
        position_b: Vec3,
    ) -> ClosestPointsResult
    where
        A: SupportMapping + ?Sized,
        B: SupportMapping + ?Sized,
    {
        let mut solver = self.pool.take();
        let result = closest_points_with(
            &mut solver,
            &self.config,
            shape_a,
            orientation_a,
            position_a,
            shape_b,
            orientation_b,
            position_b,
        );
        self.pool.give_back(solver);
        result
    }

    /// Returns whether `point` lies inside the posed shape.
    pub fn pointcast<S: SupportMapping + ?Sized>(
        &mut self,
        shape: &S,
        orientation: &Matrix3x3,
        position: Vec3,
        point: Vec3,
    ) -> bool {
        let mut solver = self.pool.take();
        let inside = pointcast_with(&mut solver, &self.config, shape, orientation, position, point);
        self.pool.give_back(solver);
        inside
    }

    /// Casts a ray against the posed shape.
    pub fn raycast<S: SupportMapping + ?Sized>(
        &mut self,
        shape: &S,
        orientation: &Matrix3x3,
        position: Vec3,
        ray: &Ray,
    ) -> Option<RayHit> {
        let mut solver = self.pool.take();
        let hit = raycast_with(&mut solver, &self.config, shape, orientation, position, ray);
        self.pool.give_back(solver);
        hit
    }
}

thread_local! {
    static SOLVER_POOL: RefCell<ResourcePool<VoronoiSimplexSolver>> = RefCell::new(ResourcePool::new());
}

/// Runs `query` on a solver checked out of this thread's pool.
///
/// The pool is only borrowed to take and return the solver, so support mappings may
/// themselves issue queries.
fn with_pooled_solver<R>(query: impl FnOnce(&mut VoronoiSimplexSolver) -> R) -> R {
    let mut solver = SOLVER_POOL.with(|pool| pool.borrow_mut().take());
    let result = query(&mut solver);
    SOLVER_POOL.with(|pool| pool.borrow_mut().give_back(solver));
    result
}

/// Finds the closest points between two posed convex shapes using default tolerances.
///
/// See [`GjkQuery::closest_points`].
pub fn closest_points<A, B>(
    shape_a: &A,
    orientation_a: &Matrix3x3,
    position_a: Vec3,
    shape_b: &B,
    orientation_b: &Matrix3x3,
    position_b: Vec3,
) -> ClosestPointsResult
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    with_pooled_solver(|solver| {
        closest_points_with(
            solver,
            &GjkConfig::default(),
            shape_a,
            orientation_a,
            position_a,
            shape_b,
            orientation_b,
            position_b,
        )
    })
}

/// Returns whether `point` lies inside the posed shape using default tolerances.
pub fn pointcast<S: SupportMapping + ?Sized>(
    shape: &S,
    orientation: &Matrix3x3,
    position: Vec3,
    point: Vec3,
) -> bool {
    with_pooled_solver(|solver| {
        pointcast_with(solver, &GjkConfig::default(), shape, orientation, position, point)
    })
}

/// Casts a ray against the posed shape using default tolerances.
pub fn raycast<S: SupportMapping + ?Sized>(
    shape: &S,
    orientation: &Matrix3x3,
    position: Vec3,
    ray: &Ray,
) -> Option<RayHit> {
    with_pooled_solver(|solver| {
        raycast_with(solver, &GjkConfig::default(), shape, orientation, position, ray)
    })
}

#[inline(always)]
fn normalize_if_nondegenerate(v: Vec3, epsilon: f32) -> Vec3 {
    if v.length_squared() > epsilon * epsilon {
        v.normalize()
    } else {
        v
    }
}

/// Closest points between two shapes on a caller-provided solver.
#[allow(clippy::too_many_arguments)]
pub fn closest_points_with<A, B>(
    solver: &mut VoronoiSimplexSolver,
    config: &GjkConfig,
    shape_a: &A,
    orientation_a: &Matrix3x3,
    position_a: Vec3,
    shape_b: &B,
    orientation_b: &Matrix3x3,
    position_b: Vec3,
) -> ClosestPointsResult
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    solver.reset();

    let support_a = |direction: Vec3| {
        support_map_transformed(shape_a, orientation_a, position_a, direction)
    };
    let support_b = |direction: Vec3| {
        support_map_transformed(shape_b, orientation_b, position_b, direction)
    };

    let r = position_a - position_b;
    let mut v = support_a(-r) - support_b(r);
    let mut normal = Vec3::ZERO;
    let mut dist_sq = v.length_squared();

    let mut iterations = 0;
    while dist_sq > config.closest_points_epsilon && iterations < config.max_iterations {
        iterations += 1;
        let vertex_a = support_a(-v);
        let vertex_b = support_b(v);
        let w = vertex_a - vertex_b;

        if !solver.in_simplex(w) {
            solver.add_vertex(w, vertex_a, vertex_b);
        }
        match solver.closest() {
            Some(closest) => {
                v = closest;
                dist_sq = v.length_squared();
                normal = v;
            }
            None => dist_sq = 0.0,
        }
    }
    if dist_sq > config.closest_points_epsilon {
        trace!(
            iterations,
            dist_sq,
            "closest points hit the iteration cap before converging"
        );
    }

    let (point_a, point_b) = solver.compute_points();
    ClosestPointsResult {
        point_a,
        point_b,
        normal: normalize_if_nondegenerate(normal, config.epsilon),
    }
}

/// Point containment on a caller-provided solver.
pub fn pointcast_with<S: SupportMapping + ?Sized>(
    solver: &mut VoronoiSimplexSolver,
    config: &GjkConfig,
    shape: &S,
    orientation: &Matrix3x3,
    position: Vec3,
    point: Vec3,
) -> bool {
    solver.reset();

    let support = |direction: Vec3| support_map_transformed(shape, orientation, position, direction);

    let arbitrary_point = point - support(point);
    let r = point - (position + orientation.transform(shape.support_center()));
    let x = point;
    let mut v = x - arbitrary_point;
    let mut dist_sq = v.length_squared();
    let separating_tolerance = -(config.epsilon * config.epsilon);

    let mut iterations = 0;
    while dist_sq > config.pointcast_epsilon && iterations < config.max_iterations {
        iterations += 1;
        let p = support(v);
        let w = x - p;

        if v.dot(w) > 0.0 {
            if v.dot(r) >= separating_tolerance {
                return false;
            }
            solver.reset();
        }
        if !solver.in_simplex(w) {
            solver.add_vertex(w, x, p);
        }
        dist_sq = match solver.closest() {
            Some(closest) => {
                v = closest;
                v.length_squared()
            }
            None => 0.0,
        };
    }
    true
}

/// Ray cast on a caller-provided solver.
///
/// Returns `None` when a separating plane proves the ray misses, the iteration cap runs out,
/// or the ray direction has zero length.
pub fn raycast_with<S: SupportMapping + ?Sized>(
    solver: &mut VoronoiSimplexSolver,
    config: &GjkConfig,
    shape: &S,
    orientation: &Matrix3x3,
    position: Vec3,
    ray: &Ray,
) -> Option<RayHit> {
    solver.reset();

    let support = |direction: Vec3| support_map_transformed(shape, orientation, position, direction);

    let origin = ray.origin;
    let r = ray.direction;
    // Fractions are measured in multiples of the direction.
    if r.length_squared() == 0.0 {
        return None;
    }
    let mut lambda = 0.0f32;
    let mut x = origin;
    let mut v = x - support(r);
    let mut normal = Vec3::ZERO;
    let mut dist_sq = v.length_squared();

    let mut iterations = 0;
    while dist_sq > config.raycast_epsilon {
        if iterations == config.max_iterations {
            debug!(iterations, dist_sq, "raycast hit the iteration cap before converging");
            return None;
        }
        iterations += 1;

        let p = support(v);
        let mut w = x - p;

        let v_dot_w = v.dot(w);
        if v_dot_w > 0.0 {
            let v_dot_r = v.dot(r);
            if v_dot_r >= -config.epsilon {
                return None;
            }
            lambda -= v_dot_w / v_dot_r;
            x = origin + r * lambda;
            w = x - p;
            normal = v;
        }
        if !solver.in_simplex(w) {
            solver.add_vertex(w, x, p);
        }
        dist_sq = match solver.closest() {
            Some(closest) => {
                v = closest;
                v.length_squared()
            }
            None => 0.0,
        };
    }

    // The shape side witness is more accurate than lambda against large shapes.
    let (_, hit_point) = solver.compute_points();
    Some(RayHit {
        fraction: (hit_point - origin).length() / r.length(),
        normal: normalize_if_nondegenerate(normal, config.epsilon),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::box_shape::BoxShape;
    use crate::physics::collidables::sphere::Sphere;
    use crate::utilities::memory::worker_pools::WorkerPools;
    use approx::assert_relative_eq;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    const IDENTITY: Matrix3x3 = Matrix3x3::IDENTITY;

    #[test]
    fn separated_boxes_along_x() {
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        for gap in [0.5, 1.0, 2.0] {
            let position_b = Vec3::new(2.0 + gap, 0.0, 0.0);
            let result = closest_points(&shape, &IDENTITY, Vec3::ZERO, &shape, &IDENTITY, position_b);
            assert_relative_eq!(result.distance(), gap, epsilon = 1e-5);
            assert_relative_eq!(result.separation(), gap, epsilon = 1e-5);
            assert_relative_eq!(result.normal.x.abs(), 1.0, epsilon = 1e-5);
            assert!(result.point_a.abs_diff_eq(Vec3::X, 1e-5));
            assert!(result.point_b.abs_diff_eq(Vec3::new(1.0 + gap, 0.0, 0.0), 1e-5));
        }
    }

    #[test]
    fn deeply_overlapping_spheres_report_zero_distance() {
        let sphere = Sphere::new(1.0);
        let result = closest_points(
            &sphere,
            &IDENTITY,
            Vec3::ZERO,
            &sphere,
            &IDENTITY,
            Vec3::new(0.5, 0.0, 0.0),
        );
        assert!(result.distance() < 1e-3);
    }

    #[test]
    fn sphere_distance_shrinks_on_approach() {
        let sphere = Sphere::new(1.0);
        let mut query = GjkQuery::new();
        let mut previous = f32::MAX;
        for offset in [4.0, 3.0, 2.5, 2.1] {
            let result = query.closest_points(
                &sphere,
                &IDENTITY,
                Vec3::ZERO,
                &sphere,
                &IDENTITY,
                Vec3::new(offset, 0.0, 0.0),
            );
            let distance = result.distance();
            assert_relative_eq!(distance, offset - 2.0, epsilon = 1e-4);
            assert!(distance < previous);
            // Normal points from B back toward A.
            assert!(result.normal.abs_diff_eq(Vec3::NEG_X, 1e-4));
            previous = distance;
        }
        assert_eq!(query.pool().allocated_count(), 1);
    }

    #[test]
    fn sphere_pointcast() {
        let sphere = Sphere::new(2.0);
        assert!(pointcast(&sphere, &IDENTITY, Vec3::ZERO, Vec3::ZERO));
        assert!(pointcast(&sphere, &IDENTITY, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        assert!(pointcast(&sphere, &IDENTITY, Vec3::ZERO, Vec3::new(1.8, 0.0, 0.0)));
        assert!(pointcast(&sphere, &IDENTITY, Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));

        assert!(!pointcast(&sphere, &IDENTITY, Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)));
        assert!(!pointcast(&sphere, &IDENTITY, Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0)));
        let diagonal = Vec3::ONE.normalize() * 3.0;
        assert!(!pointcast(&sphere, &IDENTITY, Vec3::ZERO, diagonal));
    }

    #[test]
    fn sphere_pointcast_boundary_is_stable() {
        let radius = 2.0;
        let sphere = Sphere::new(radius);
        for axis in [Vec3::X, Vec3::NEG_Y, Vec3::Z] {
            let just_inside = axis * (radius * (1.0 - 1e-3));
            let just_outside = axis * (radius * (1.0 + 1e-3));
            assert!(pointcast(&sphere, &IDENTITY, Vec3::ZERO, just_inside));
            assert!(pointcast(&sphere, &IDENTITY, Vec3::ZERO, axis * radius));
            assert!(!pointcast(&sphere, &IDENTITY, Vec3::ZERO, just_outside));
        }
    }

    #[test]
    fn pointcast_rotated_box() {
        // Quarter turn about Z: the long local Y extent lies along world X.
        let shape = BoxShape::from_half_extents(Vec3::new(1.0, 2.0, 1.0));
        let orientations = [
            Matrix3x3::from_quaternion(Quat::from_rotation_z(FRAC_PI_2)),
            Matrix3x3::from_axis_angle(Vec3::Z, FRAC_PI_2),
        ];
        for orientation in &orientations {
            assert!(pointcast(&shape, orientation, Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0)));
            assert!(pointcast(&shape, orientation, Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0)));
            assert!(!pointcast(&shape, orientation, Vec3::ZERO, Vec3::new(0.0, 6.0, 0.0)));
        }
    }

    #[test]
    fn pointcast_follows_position() {
        let sphere = Sphere::new(1.0);
        let position = Vec3::new(5.0, 0.0, 0.0);
        assert!(pointcast(&sphere, &IDENTITY, position, Vec3::new(5.5, 0.0, 0.0)));
        assert!(!pointcast(&sphere, &IDENTITY, position, Vec3::ZERO));
    }

    #[test]
    fn raycast_box_hits_near_face() {
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let hit = raycast(&shape, &IDENTITY, Vec3::ZERO, &ray).unwrap();
        assert_relative_eq!(hit.fraction, 0.4, epsilon = 1e-5);
        assert!(hit.normal.abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert!(hit.point(&ray).abs_diff_eq(Vec3::NEG_X, 1e-4));
    }

    #[test]
    fn raycast_box_misses() {
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let away = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::NEG_X);
        assert!(raycast(&shape, &IDENTITY, Vec3::ZERO, &away).is_none());
        let beside = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::X);
        assert!(raycast(&shape, &IDENTITY, Vec3::ZERO, &beside).is_none());
    }

    #[test]
    fn raycast_with_zero_direction_is_a_miss() {
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let inside = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(raycast(&shape, &IDENTITY, Vec3::ZERO, &inside).is_none());
        let outside = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::ZERO);
        assert!(raycast(&shape, &IDENTITY, Vec3::ZERO, &outside).is_none());
    }

    #[test]
    fn raycast_translated_box() {
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0));
        let hit = raycast(&shape, &IDENTITY, Vec3::new(10.0, 0.0, 0.0), &ray).unwrap();
        assert_relative_eq!(hit.fraction, 0.45, epsilon = 1e-5);
        assert!(hit.normal.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn raycast_rotated_box() {
        // Quarter turn about Z puts the box's long local Y extent along world X.
        let orientation = Matrix3x3::from_rows(Vec3::Y, Vec3::NEG_X, Vec3::Z);
        let shape = BoxShape::from_half_extents(Vec3::new(1.0, 2.0, 1.0));
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let hit = raycast(&shape, &orientation, Vec3::ZERO, &ray).unwrap();
        assert_relative_eq!(hit.fraction, 0.3, epsilon = 1e-5);
        assert!(hit.normal.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn raycast_sphere_matches_analytic_test() {
        let sphere = Sphere::new(2.0);
        let position = Vec3::new(3.0, 4.0, 0.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(6.0, 8.0, 0.0));
        let hit = raycast(&sphere, &IDENTITY, position, &ray).unwrap();
        let expected = sphere.ray_test(position, &ray).unwrap();
        assert_relative_eq!(hit.fraction, 0.3, epsilon = 1e-5);
        assert_relative_eq!(hit.fraction, expected.fraction, epsilon = 1e-5);
        assert!(hit.normal.abs_diff_eq(expected.normal, 1e-4));
    }

    #[test]
    fn pooled_solver_matches_fresh_solver() {
        let config = GjkConfig::default();
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let sphere = Sphere::new(0.5);
        let position_b = Vec3::new(3.0, 0.0, 0.0);

        let mut pooled = VoronoiSimplexSolver::new();
        // Unrelated query leaves state behind in the solver.
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        raycast_with(&mut pooled, &config, &sphere, &IDENTITY, Vec3::ZERO, &ray);

        let reused = closest_points_with(
            &mut pooled, &config, &shape, &IDENTITY, Vec3::ZERO, &sphere, &IDENTITY, position_b,
        );
        let fresh = closest_points_with(
            &mut VoronoiSimplexSolver::new(),
            &config,
            &shape,
            &IDENTITY,
            Vec3::ZERO,
            &sphere,
            &IDENTITY,
            position_b,
        );
        assert_eq!(reused, fresh);
        assert_relative_eq!(fresh.distance(), 1.5, epsilon = 1e-5);
    }

    #[test]
    fn custom_config_is_validated() {
        assert!(GjkQuery::with_config(GjkConfig::default().with_max_iterations(0)).is_err());
        let query = GjkQuery::with_config(GjkConfig::default().with_max_iterations(30)).unwrap();
        assert_eq!(query.config().max_iterations, 30);
    }

    #[test]
    fn zero_iteration_budget_on_raycast_is_a_miss() {
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let config = GjkConfig {
            max_iterations: 0,
            ..GjkConfig::default()
        };
        let mut solver = VoronoiSimplexSolver::new();
        assert!(raycast_with(&mut solver, &config, &shape, &IDENTITY, Vec3::ZERO, &ray).is_none());
    }

    #[test]
    fn worker_pools_serve_queries_per_thread() {
        let mut pools = WorkerPools::<VoronoiSimplexSolver>::new(3, 1);
        let config = GjkConfig::default();
        let shape = BoxShape::from_half_extents(Vec3::ONE);
        let mut fractions = [0.0f32; 3];

        crossbeam_utils::thread::scope(|scope| {
            for ((worker, pool), fraction) in pools.iter_mut().enumerate().zip(fractions.iter_mut()) {
                let shape = &shape;
                let config = &config;
                scope.spawn(move |_| {
                    let mut solver = pool.take();
                    let position = Vec3::new(worker as f32 * 10.0, 0.0, 0.0);
                    let ray = Ray::new(position - Vec3::new(5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
                    if let Some(hit) = raycast_with(&mut solver, config, shape, &IDENTITY, position, &ray) {
                        *fraction = hit.fraction;
                    }
                    pool.give_back(solver);
                });
            }
        })
        .unwrap();

        for fraction in fractions {
            assert_relative_eq!(fraction, 0.4, epsilon = 1e-4);
        }
        assert_eq!(pools.total_allocated_count(), 3);
    }
}
