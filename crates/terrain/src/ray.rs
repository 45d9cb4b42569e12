use glam::{Vec2, Vec3};

use crate::grid;
use crate::heightfield::Terrain;

/// Tolerance on barycentric bounds so rays through shared edges and vertices
/// are not lost to rounding.
const BARY_EPSILON: f32 = 1e-5;

/// Below this determinant the ray is parallel to, or behind, the triangle.
const PARALLEL_EPSILON: f32 = 1e-9;

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// A ray pointing straight down (-Y).
    pub fn down(origin: Vec3) -> Self {
        Self {
            origin,
            direction: Vec3::NEG_Y,
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Nearest intersection of a ray with the terrain surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    pub point: Vec3,
    /// Unit face normal of the hit triangle.
    pub normal: Vec3,
    /// Index of the hit triangle (in units of triangles).
    pub triangle: usize,
}

impl Terrain {
    /// Cast `ray` against the surface and return the nearest front-facing hit
    /// within `max_distance` (may be `f32::INFINITY`).
    ///
    /// Faces point up, so a ray that starts beneath the surface and travels
    /// down finds nothing.
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        if ray.direction == Vec3::ZERO {
            return None;
        }
        let reach = if max_distance.is_finite() {
            max_distance
        } else {
            self.horizontal_reach(ray)
        };
        let start = Vec2::new(ray.origin.x, ray.origin.z);
        let end = start + Vec2::new(ray.direction.x, ray.direction.z) * reach;
        let span = grid::cells_under(self.config(), start, end)?;

        let mut best: Option<RayHit> = None;
        for cell in span.cells() {
            for triangle in grid::cell_triangles(self.config(), cell) {
                let [v0, v1, v2] = self.triangle(triangle);
                let Some(t) = intersect_triangle(ray, v0, v1, v2, max_distance) else {
                    continue;
                };
                if best.is_some_and(|b| b.distance <= t) {
                    continue;
                }
                best = Some(RayHit {
                    distance: t,
                    point: ray.at(t),
                    normal: (v1 - v0).cross(v2 - v0).normalize_or_zero(),
                    triangle,
                });
            }
        }
        best
    }

    fn triangle(&self, triangle: usize) -> [Vec3; 3] {
        let idx = &self.indices()[triangle * 3..triangle * 3 + 3];
        let p = self.positions();
        [p[idx[0] as usize], p[idx[1] as usize], p[idx[2] as usize]]
    }

    /// Distance along `ray` after which its horizontal footprint has left the
    /// domain. Zero for vertical rays.
    fn horizontal_reach(&self, ray: &Ray) -> f32 {
        let horizontal = Vec2::new(ray.direction.x, ray.direction.z).length();
        if horizontal < 1e-6 {
            return 0.0;
        }
        let origin = Vec2::new(ray.origin.x, ray.origin.z).length();
        (origin + self.config().size) / horizontal
    }
}

/// Möller–Trumbore ray-triangle intersection with back-face culling.
/// Returns the hit distance.
fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3, max_t: f32) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // a <= 0: back face or parallel
    if a < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(-BARY_EPSILON..=1.0 + BARY_EPSILON).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < -BARY_EPSILON || u + v > 1.0 + BARY_EPSILON {
        return None;
    }

    let t = f * edge2.dot(q);
    (t >= 0.0 && t <= max_t).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::{TerrainConfig, height_at};

    fn terrain() -> Terrain {
        Terrain::generate(TerrainConfig::default()).unwrap()
    }

    #[test]
    fn downward_ray_hits_origin_vertex() {
        let t = terrain();
        let hit = t
            .raycast(&Ray::down(Vec3::new(0.0, 100.0, 0.0)), f32::INFINITY)
            .unwrap();
        assert!((hit.distance - 98.0).abs() < 1e-4);
        assert!((hit.point.y - 2.0).abs() < 1e-4);
        assert!(hit.normal.y > 0.9);
    }

    #[test]
    fn downward_ray_between_vertices_lands_near_formula() {
        let t = terrain();
        let (x, z) = (12.3, -45.6);
        let hit = t
            .raycast(&Ray::down(Vec3::new(x, 50.0, z)), f32::INFINITY)
            .unwrap();
        assert!((hit.point.x - x).abs() < 1e-4);
        assert!((hit.point.z - z).abs() < 1e-4);
        // Linear interpolation over a 1m cell stays close to the smooth surface.
        assert!((hit.point.y - height_at(x, z)).abs() < 0.01);
    }

    #[test]
    fn ray_from_beneath_surface_misses() {
        let t = terrain();
        assert!(
            t.raycast(&Ray::down(Vec3::new(0.0, -20.0, 0.0)), f32::INFINITY)
                .is_none()
        );
    }

    #[test]
    fn upward_ray_from_beneath_hits_nothing() {
        let t = terrain();
        let ray = Ray::new(Vec3::new(3.0, -20.0, 3.0), Vec3::Y);
        assert!(t.raycast(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn ray_outside_domain_misses() {
        let t = terrain();
        assert!(
            t.raycast(&Ray::down(Vec3::new(150.0, 10.0, 0.0)), f32::INFINITY)
                .is_none()
        );
    }

    #[test]
    fn max_distance_limits_hits() {
        let t = terrain();
        let ray = Ray::down(Vec3::new(0.0, 10.0, 0.0));
        assert!(t.raycast(&ray, 7.9).is_none());
        let hit = t.raycast(&ray, 8.1).unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-4);
    }

    #[test]
    fn slanted_ray_hits_surface() {
        let t = terrain();
        let ray = Ray::new(Vec3::new(-20.0, 30.0, 5.0), Vec3::new(1.0, -1.0, 0.0));
        let hit = t.raycast(&ray, f32::INFINITY).unwrap();
        assert!((hit.point.y - height_at(hit.point.x, hit.point.z)).abs() < 0.02);
        assert!(hit.point.x > -20.0);
        // Direction is normalised, so distance is Euclidean.
        assert!((hit.distance - (hit.point - ray.origin).length()).abs() < 1e-3);
    }

    #[test]
    fn zero_direction_is_a_miss() {
        let t = terrain();
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert!(t.raycast(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn nearest_of_two_surfaces_wins() {
        // A low grazing ray over rolling ground can cross several crests; the
        // first crossing must be reported.
        let t = terrain();
        let ray = Ray::new(Vec3::new(-90.0, 6.0, -90.0), Vec3::new(1.0, -0.02, 1.0));
        let hit = t.raycast(&ray, f32::INFINITY).unwrap();
        let steps = (hit.distance / 0.05) as usize;
        for i in 0..steps.saturating_sub(2) {
            let p = ray.at(i as f32 * 0.05);
            assert!(p.y >= height_at(p.x, p.z) - 0.05, "ray dipped below ground before hit at step {i}");
        }
    }

    #[test]
    fn intersect_triangle_culls_back_faces() {
        let v0 = Vec3::new(0.0, 0.0, 0.0);
        let v1 = Vec3::new(0.0, 0.0, 1.0);
        let v2 = Vec3::new(1.0, 0.0, 0.0);
        let down = Ray::down(Vec3::new(0.25, 1.0, 0.25));
        assert_eq!(intersect_triangle(&down, v0, v1, v2, 10.0), Some(1.0));
        let up = Ray::new(Vec3::new(0.25, -1.0, 0.25), Vec3::Y);
        assert_eq!(intersect_triangle(&up, v0, v1, v2, 10.0), None);
    }
}
