//! Closest point queries from a point to a triangle or tetrahedron.
//!
//! Both primitives classify the query point against the Voronoi regions of the
//! simplex with dot products only and report which vertices support the result,
//! along with their barycentric weights.

use glam::Vec3;

use super::gjk_config::DEGENERATE_THRESHOLD;

/// Marks which of the up to four simplex vertices support a closest point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsedVertices {
    pub vertex_a: bool,
    pub vertex_b: bool,
    pub vertex_c: bool,
    pub vertex_d: bool,
}

impl UsedVertices {
    /// Gets the flags as an array indexed by simplex slot.
    #[inline(always)]
    pub fn as_array(&self) -> [bool; 4] {
        [self.vertex_a, self.vertex_b, self.vertex_c, self.vertex_d]
    }

    /// Gets the number of vertices marked as used.
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.as_array().iter().filter(|&&used| used).count()
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Closest point on a sub-simplex together with the vertices and weights producing it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubSimplexClosestResult {
    pub closest_point_on_simplex: Vec3,
    pub used_vertices: UsedVertices,
    /// Barycentric weight per simplex slot; zero for unused slots.
    pub barycentric_coords: [f32; 4],
    /// Set when the simplex was too flat to classify.
    pub degenerate: bool,
}

impl SubSimplexClosestResult {
    #[inline(always)]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A result is valid when no barycentric weight is negative.
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.barycentric_coords.iter().all(|&w| w >= 0.0)
    }

    #[inline(always)]
    pub fn set_barycentric_coordinates(&mut self, a: f32, b: f32, c: f32, d: f32) {
        self.barycentric_coords = [a, b, c, d];
    }
}

/// Outcome of a closest point query against a tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TetrahedronClosest {
    /// The point lies outside at least one face; the closest point on those faces.
    Separated(SubSimplexClosestResult),
    /// The point lies inside every face.
    Enclosed,
    /// A face plane could not be classified because the tetrahedron is numerically flat.
    Degenerate,
}

/// Side of a tetrahedron face plane a point lies on, relative to the opposite vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaneSide {
    Inside,
    Outside,
    Degenerate,
}

/// Computes the closest point to `p` on the triangle `abc`.
///
/// The seven Voronoi regions are tested in the order A, B, AB, C, AC, BC, face. The
/// inequality directions are the exact region boundaries; a point on a boundary is
/// claimed by whichever region is tested first.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> SubSimplexClosestResult {
    let mut result = SubSimplexClosestResult::default();

    // Check if P is in vertex region outside A.
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        result.closest_point_on_simplex = a;
        result.used_vertices.vertex_a = true;
        result.set_barycentric_coordinates(1.0, 0.0, 0.0, 0.0);
        return result;
    }

    // Check if P is in vertex region outside B.
    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        result.closest_point_on_simplex = b;
        result.used_vertices.vertex_b = true;
        result.set_barycentric_coordinates(0.0, 1.0, 0.0, 0.0);
        return result;
    }

    // Check if P is in edge region of AB; if so return projection of P onto AB.
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        result.closest_point_on_simplex = a + ab * v;
        result.used_vertices.vertex_a = true;
        result.used_vertices.vertex_b = true;
        result.set_barycentric_coordinates(1.0 - v, v, 0.0, 0.0);
        return result;
    }

    // Check if P is in vertex region outside C.
    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        result.closest_point_on_simplex = c;
        result.used_vertices.vertex_c = true;
        result.set_barycentric_coordinates(0.0, 0.0, 1.0, 0.0);
        return result;
    }

    // Check if P is in edge region of AC; if so return projection of P onto AC.
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        result.closest_point_on_simplex = a + ac * w;
        result.used_vertices.vertex_a = true;
        result.used_vertices.vertex_c = true;
        result.set_barycentric_coordinates(1.0 - w, 0.0, w, 0.0);
        return result;
    }

    // Check if P is in edge region of BC; if so return projection of P onto BC.
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        result.closest_point_on_simplex = b + (c - b) * w;
        result.used_vertices.vertex_b = true;
        result.used_vertices.vertex_c = true;
        result.set_barycentric_coordinates(0.0, 1.0 - w, w, 0.0);
        return result;
    }

    // P is inside the face region.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    result.closest_point_on_simplex = a + ab * v + ac * w;
    result.used_vertices.vertex_a = true;
    result.used_vertices.vertex_b = true;
    result.used_vertices.vertex_c = true;
    result.set_barycentric_coordinates(1.0 - v - w, v, w, 0.0);
    result
}

/// Classifies `p` against the plane of `abc`, using `d` as the inside reference.
#[inline(always)]
fn point_outside_of_plane(p: Vec3, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> PlaneSide {
    let normal = (b - a).cross(c - a);
    let sign_p = (p - a).dot(normal);
    let sign_d = (d - a).dot(normal);

    if sign_d * sign_d < DEGENERATE_THRESHOLD * DEGENERATE_THRESHOLD {
        return PlaneSide::Degenerate;
    }
    // Points on the plane count as inside.
    if sign_p * sign_d < 0.0 {
        PlaneSide::Outside
    } else {
        PlaneSide::Inside
    }
}

/// Computes the closest point to `p` on the tetrahedron `abcd`.
///
/// Each face the point lies outside of is tested with [`closest_point_on_triangle`] and the
/// nearest face wins. Face results are remapped into tetrahedron slots so that the weights
/// line up with the witness points stored per vertex.
pub fn closest_point_on_tetrahedron(
    p: Vec3,
    a: Vec3,
    b: Vec3,
    c: Vec3,
    d: Vec3,
) -> TetrahedronClosest {
    let outside_abc = point_outside_of_plane(p, a, b, c, d);
    let outside_acd = point_outside_of_plane(p, a, c, d, b);
    let outside_adb = point_outside_of_plane(p, a, d, b, c);
    let outside_bdc = point_outside_of_plane(p, b, d, c, a);
    let sides = [outside_abc, outside_acd, outside_adb, outside_bdc];

    if sides.contains(&PlaneSide::Degenerate) {
        return TetrahedronClosest::Degenerate;
    }
    if !sides.contains(&PlaneSide::Outside) {
        return TetrahedronClosest::Enclosed;
    }

    let mut final_result = SubSimplexClosestResult::default();
    let mut best_sq_dist = f32::MAX;

    if outside_abc == PlaneSide::Outside {
        let temp = closest_point_on_triangle(p, a, b, c);
        let sq_dist = (temp.closest_point_on_simplex - p).length_squared();
        if sq_dist < best_sq_dist {
            best_sq_dist = sq_dist;
            final_result.closest_point_on_simplex = temp.closest_point_on_simplex;
            final_result.used_vertices = UsedVertices {
                vertex_a: temp.used_vertices.vertex_a,
                vertex_b: temp.used_vertices.vertex_b,
                vertex_c: temp.used_vertices.vertex_c,
                vertex_d: false,
            };
            let [ta, tb, tc, _] = temp.barycentric_coords;
            final_result.set_barycentric_coordinates(ta, tb, tc, 0.0);
        }
    }

    if outside_acd == PlaneSide::Outside {
        let temp = closest_point_on_triangle(p, a, c, d);
        let sq_dist = (temp.closest_point_on_simplex - p).length_squared();
        if sq_dist < best_sq_dist {
            best_sq_dist = sq_dist;
            final_result.closest_point_on_simplex = temp.closest_point_on_simplex;
            final_result.used_vertices = UsedVertices {
                vertex_a: temp.used_vertices.vertex_a,
                vertex_b: false,
                vertex_c: temp.used_vertices.vertex_b,
                vertex_d: temp.used_vertices.vertex_c,
            };
            let [ta, tb, tc, _] = temp.barycentric_coords;
            final_result.set_barycentric_coordinates(ta, 0.0, tb, tc);
        }
    }

    if outside_adb == PlaneSide::Outside {
        let temp = closest_point_on_triangle(p, a, d, b);
        let sq_dist = (temp.closest_point_on_simplex - p).length_squared();
        if sq_dist < best_sq_dist {
            best_sq_dist = sq_dist;
            final_result.closest_point_on_simplex = temp.closest_point_on_simplex;
            final_result.used_vertices = UsedVertices {
                vertex_a: temp.used_vertices.vertex_a,
                vertex_b: temp.used_vertices.vertex_c,
                vertex_c: false,
                vertex_d: temp.used_vertices.vertex_b,
            };
            let [ta, tb, tc, _] = temp.barycentric_coords;
            final_result.set_barycentric_coordinates(ta, tc, 0.0, tb);
        }
    }

    if outside_bdc == PlaneSide::Outside {
        let temp = closest_point_on_triangle(p, b, d, c);
        let sq_dist = (temp.closest_point_on_simplex - p).length_squared();
        if sq_dist < best_sq_dist {
            final_result.closest_point_on_simplex = temp.closest_point_on_simplex;
            final_result.used_vertices = UsedVertices {
                vertex_a: false,
                vertex_b: temp.used_vertices.vertex_a,
                vertex_c: temp.used_vertices.vertex_c,
                vertex_d: temp.used_vertices.vertex_b,
            };
            let [ta, tb, tc, _] = temp.barycentric_coords;
            final_result.set_barycentric_coordinates(0.0, ta, tc, tb);
        }
    }

    TetrahedronClosest::Separated(final_result)
}
