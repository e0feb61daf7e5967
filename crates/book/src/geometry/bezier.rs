//! Quadratic Bezier evaluation.

use glam::Vec3;

/// Point on the quadratic Bezier curve through `p0`, `p1` (control) and `p2`.
#[inline]
pub fn quadratic(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 2.0, 0.0);
        let c = Vec3::new(2.0, 0.0, 0.0);
        assert!(quadratic(a, b, c, 0.0).abs_diff_eq(a, 1e-6));
        assert!(quadratic(a, b, c, 1.0).abs_diff_eq(c, 1e-6));
        assert!(quadratic(a, b, c, 0.5).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }
}
