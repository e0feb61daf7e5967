//! Triangle helpers.

use glam::Vec3;

/// Unit normal of the triangle `a, b, c`.
///
/// Edges are normalized before the cross product so that long thin triangles
/// produced by the seam rows still give a stable direction.
pub fn normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = (b - a).normalize_or_zero();
    let ac = (c - a).normalize_or_zero();
    ab.cross(ac).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_of_xz_triangle() {
        let n = normal(Vec3::ZERO, Vec3::Z, Vec3::X);
        assert!(n.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_degenerate_triangle_is_zero() {
        let n = normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(n, Vec3::ZERO);
    }
}
