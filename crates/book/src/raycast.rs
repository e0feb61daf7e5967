//! Rays, planes and ray-triangle hits.
//!
//! Host input arrives as world-space rays. Papers move them into their own
//! local space and intersect the rest plane `y = 0`, or the live mesh when a
//! paper is bent.

use glam::{Affine3A, Vec2, Vec3};

use crate::content::ContentId;

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-6;

/// A half-line with a normalized direction.
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

    /// Point at `distance` along the ray.
    #[inline]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// The ray expressed in the space `matrix` maps into.
    pub fn transformed(&self, matrix: &Affine3A) -> Self {
        Self::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }
}

/// Infinite plane `dot(normal, p) + distance = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::XZ
    }
}

impl Plane {
    /// The rest plane of a paper in its local space.
    pub const XZ: Self = Self {
        normal: Vec3::Y,
        distance: 0.0,
    };

    /// Plane through `point` facing `normal`.
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Distance along `ray` to the plane.
    ///
    /// Misses when the ray is parallel to the plane or the plane lies behind
    /// the ray origin.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        let along = ray.direction.dot(self.normal);
        if along.abs() < EPSILON {
            return None;
        }
        let enter = (-ray.origin.dot(self.normal) - self.distance) / along;
        (enter > 0.0).then_some(enter)
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection, both faces.
///
/// # Arguments
/// * `ray` - Ray in the same space as the triangle
/// * `v0`, `v1`, `v2` - Triangle vertices
///
/// # Returns
/// `Some(TriangleHit)` if the ray intersects in front of its origin, `None` otherwise
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// A hit on a resting page of a book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookRaycastHit {
    /// World-space hit point
    pub point: Vec3,
    /// Texture coordinate inside the page content
    pub texture_coordinate: Vec2,
    /// Content shown on the hit side of the paper
    pub content: ContentId,
    pub paper_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_hit_from_above() {
        let ray = Ray::new(Vec3::new(0.5, 2.0, 0.5), Vec3::NEG_Y);
        let distance = Plane::XZ.raycast(&ray).unwrap();
        assert!((distance - 2.0).abs() < 1e-6);
        assert!(ray.point_at(distance).abs_diff_eq(Vec3::new(0.5, 0.0, 0.5), 1e-6));
    }

    #[test]
    fn test_plane_miss_behind_or_parallel() {
        let up = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(Plane::XZ.raycast(&up).is_none());

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(Plane::XZ.raycast(&parallel).is_none());
    }

    #[test]
    fn test_offset_plane() {
        let plane = Plane::new(Vec3::Y, Vec3::new(0.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y);
        assert!((plane.raycast(&ray).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray_transformed() {
        let matrix = Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y).transformed(&matrix);
        assert!(ray.origin.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.25, 1.0, 0.25), Vec3::NEG_Y);
        let hit = ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Z).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-6);
        assert!((hit.u - 0.25).abs() < 1e-6);
        assert!((hit.v - 0.25).abs() < 1e-6);

        let outside = Ray::new(Vec3::new(2.0, 1.0, 2.0), Vec3::NEG_Y);
        assert!(ray_triangle_intersection(&outside, Vec3::ZERO, Vec3::X, Vec3::Z).is_none());
    }
}
