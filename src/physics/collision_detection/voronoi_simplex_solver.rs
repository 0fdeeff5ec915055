//! Incremental simplex in Minkowski-difference space.
//!
//! Every vertex `w = p - q` also stores its witness points `p` and `q`, so the
//! closest point on the simplex can be mapped back onto both original shapes.

use glam::Vec3;
use tracing::trace;

use super::closest_point::{
    closest_point_on_tetrahedron, closest_point_on_triangle, SubSimplexClosestResult,
    TetrahedronClosest, UsedVertices,
};

/// Maximum number of vertices a simplex can hold in three dimensions.
pub const MAX_VERTICES: usize = 4;

/// Tracks a 0 to 4 vertex simplex and the point on it closest to the origin.
///
/// Instances carry no state across queries once [`reset`](Self::reset) is called.
#[derive(Debug, Clone)]
pub struct VoronoiSimplexSolver {
    num_vertices: usize,
    simplex_vectors_w: [Vec3; MAX_VERTICES],
    simplex_points_p: [Vec3; MAX_VERTICES],
    simplex_points_q: [Vec3; MAX_VERTICES],

    cached_p1: Vec3,
    cached_p2: Vec3,
    cached_v: Vec3,
    last_w: Vec3,
    cached_valid_closest: bool,
    cached_bc: SubSimplexClosestResult,
    needs_update: bool,
}

impl Default for VoronoiSimplexSolver {
    fn default() -> Self {
        Self {
            num_vertices: 0,
            simplex_vectors_w: [Vec3::ZERO; MAX_VERTICES],
            simplex_points_p: [Vec3::ZERO; MAX_VERTICES],
            simplex_points_q: [Vec3::ZERO; MAX_VERTICES],
            cached_p1: Vec3::ZERO,
            cached_p2: Vec3::ZERO,
            cached_v: Vec3::ZERO,
            // Sentinel that no real vertex matches.
            last_w: Vec3::splat(f32::MAX),
            cached_valid_closest: false,
            cached_bc: SubSimplexClosestResult::default(),
            needs_update: true,
        }
    }
}

impl VoronoiSimplexSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the simplex.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Appends a vertex `w = p - q` with its witness points.
    ///
    /// The simplex must not be full; GJK loops reduce it every time [`closest`](Self::closest) runs.
    #[inline(always)]
    pub fn add_vertex(&mut self, w: Vec3, p: Vec3, q: Vec3) {
        debug_assert!(
            self.num_vertices < MAX_VERTICES,
            "Simplex is full; it must be reduced before adding another vertex."
        );
        self.last_w = w;
        self.needs_update = true;

        self.simplex_vectors_w[self.num_vertices] = w;
        self.simplex_points_p[self.num_vertices] = p;
        self.simplex_points_q[self.num_vertices] = q;
        self.num_vertices += 1;
    }

    /// Returns the vector from the origin to the closest point on the simplex,
    /// or `None` if no valid closest point exists (empty or numerically degenerate simplex).
    #[inline(always)]
    pub fn closest(&mut self) -> Option<Vec3> {
        self.update_closest_vector_and_points()
            .then_some(self.cached_v)
    }

    /// Returns whether `w` is exactly the last added vertex or any vertex still in the simplex.
    pub fn in_simplex(&self, w: Vec3) -> bool {
        // The last vertex may already have been reduced away.
        w == self.last_w || self.simplex_vectors_w[..self.num_vertices].contains(&w)
    }

    /// Returns the closest points on the two sides, in the order the witnesses were added.
    pub fn compute_points(&mut self) -> (Vec3, Vec3) {
        self.update_closest_vector_and_points();
        (self.cached_p1, self.cached_p2)
    }

    /// Returns the largest squared length among the simplex vertices.
    pub fn max_vertex(&self) -> f32 {
        self.simplex_vectors_w[..self.num_vertices]
            .iter()
            .map(|w| w.length_squared())
            .fold(0.0, f32::max)
    }

    #[inline(always)]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.num_vertices == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.num_vertices == MAX_VERTICES
    }

    /// Gets the live vertices and their witness points.
    pub fn simplex(&self) -> (&[Vec3], &[Vec3], &[Vec3]) {
        let n = self.num_vertices;
        (
            &self.simplex_vectors_w[..n],
            &self.simplex_points_p[..n],
            &self.simplex_points_q[..n],
        )
    }

    /// Gets the barycentric result of the most recent recompute.
    pub fn closest_result(&self) -> &SubSimplexClosestResult {
        &self.cached_bc
    }

    /// Removes the vertex at `index`, shifting later vertices down.
    fn remove_vertex(&mut self, index: usize) {
        debug_assert!(index < self.num_vertices);
        let n = self.num_vertices;
        self.simplex_vectors_w.copy_within(index + 1..n, index);
        self.simplex_points_p.copy_within(index + 1..n, index);
        self.simplex_points_q.copy_within(index + 1..n, index);
        self.num_vertices -= 1;
    }

    /// Evicts unused vertices, D first, keeping survivors in their original order.
    fn reduce_vertices(&mut self, used: UsedVertices) {
        if self.num_vertices >= 4 && !used.vertex_d {
            self.remove_vertex(3);
        }
        if self.num_vertices >= 3 && !used.vertex_c {
            self.remove_vertex(2);
        }
        if self.num_vertices >= 2 && !used.vertex_b {
            self.remove_vertex(1);
        }
        if self.num_vertices >= 1 && !used.vertex_a {
            self.remove_vertex(0);
        }
    }

    /// Blends the stored witness points by the cached barycentric weights.
    fn blend_witnesses(&mut self) {
        let n = self.num_vertices;
        let weights = &self.cached_bc.barycentric_coords[..n];
        self.cached_p1 = self.simplex_points_p[..n]
            .iter()
            .zip(weights)
            .map(|(&p, &weight)| p * weight)
            .sum();
        self.cached_p2 = self.simplex_points_q[..n]
            .iter()
            .zip(weights)
            .map(|(&q, &weight)| q * weight)
            .sum();
        self.cached_v = self.cached_p1 - self.cached_p2;
    }

    fn update_closest_vector_and_points(&mut self) -> bool {
        if !self.needs_update {
            return self.cached_valid_closest;
        }
        self.cached_bc.reset();
        self.needs_update = false;

        match self.num_vertices {
            0 => {
                self.cached_valid_closest = false;
            }
            1 => {
                self.cached_p1 = self.simplex_points_p[0];
                self.cached_p2 = self.simplex_points_q[0];
                self.cached_v = self.cached_p1 - self.cached_p2;
                self.cached_bc.used_vertices.vertex_a = true;
                self.cached_bc.set_barycentric_coordinates(1.0, 0.0, 0.0, 0.0);
                self.cached_valid_closest = self.cached_bc.is_valid();
            }
            2 => {
                // Closest point on segment from..to to the origin.
                let from = self.simplex_vectors_w[0];
                let to = self.simplex_vectors_w[1];
                let diff = -from;
                let v = to - from;
                let mut t = v.dot(diff);

                if t > 0.0 {
                    let dot_vv = v.length_squared();
                    if t < dot_vv {
                        t /= dot_vv;
                        self.cached_bc.used_vertices.vertex_a = true;
                        self.cached_bc.used_vertices.vertex_b = true;
                    } else {
                        t = 1.0;
                        self.cached_bc.used_vertices.vertex_b = true;
                    }
                } else {
                    t = 0.0;
                    self.cached_bc.used_vertices.vertex_a = true;
                }
                self.cached_bc.set_barycentric_coordinates(1.0 - t, t, 0.0, 0.0);
                self.cached_bc.closest_point_on_simplex = from + v * t;

                self.blend_witnesses();
                let used = self.cached_bc.used_vertices;
                self.reduce_vertices(used);
                self.cached_valid_closest = self.cached_bc.is_valid();
            }
            3 => {
                let [a, b, c, _] = self.simplex_vectors_w;
                self.cached_bc = closest_point_on_triangle(Vec3::ZERO, a, b, c);
                self.blend_witnesses();
                let used = self.cached_bc.used_vertices;
                self.reduce_vertices(used);
                self.cached_valid_closest = self.cached_bc.is_valid();
            }
            4 => {
                let [a, b, c, d] = self.simplex_vectors_w;
                match closest_point_on_tetrahedron(Vec3::ZERO, a, b, c, d) {
                    TetrahedronClosest::Separated(result) => {
                        self.cached_bc = result;
                        self.blend_witnesses();
                        let used = self.cached_bc.used_vertices;
                        self.reduce_vertices(used);
                        self.cached_valid_closest = self.cached_bc.is_valid();
                    }
                    TetrahedronClosest::Enclosed => {
                        // Origin is inside the simplex: the shapes overlap.
                        self.cached_valid_closest = true;
                        self.cached_v = Vec3::ZERO;
                    }
                    TetrahedronClosest::Degenerate => {
                        trace!("tetrahedron simplex is numerically flat");
                        self.cached_bc.degenerate = true;
                        self.cached_valid_closest = false;
                    }
                }
            }
            _ => unreachable!("simplex holds at most {MAX_VERTICES} vertices"),
        }
        self.cached_valid_closest
    }
}
