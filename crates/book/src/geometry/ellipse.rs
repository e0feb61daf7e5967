//! Clamping points into axis-aligned ellipses.

use glam::Vec2;

use super::quadratic::{self, QuadraticRoots};

/// Clamp `point` into the ellipse centred at `center` with radii `size`.
///
/// Points inside are returned unchanged. Outside points are pulled onto the
/// boundary along the line from `(point.x, center.y)` to `point`; when that line
/// misses the ellipse the line start is returned.
pub fn clamp(point: Vec2, center: Vec2, size: Vec2) -> Vec2 {
    if contains(point, center, size) {
        return point;
    }
    linecast(Vec2::new(point.x, center.y), point, center, size)
}

/// Whether `point` lies strictly inside the ellipse.
pub fn contains(point: Vec2, center: Vec2, size: Vec2) -> bool {
    let mut d = point - center;
    d.y *= size.x / size.y;
    d.length() < size.x
}

fn linecast(start: Vec2, end: Vec2, center: Vec2, size: Vec2) -> Vec2 {
    let (h, k) = (center.x, center.y);
    let (x1, y1) = (start.x, start.y);
    let (x2, y2) = (end.x, end.y);
    let (a, b) = (size.x, size.y);

    let inv_a = 1.0 / (a * a);
    let inv_b = 1.0 / (b * b);

    if (x1 - x2).abs() < 1e-5 {
        if x1 >= h - a && x1 <= h + a {
            let roots = quadratic::solve(
                inv_b,
                -2.0 * inv_b * k,
                inv_a * (x1 * x1 - 2.0 * h * x1 + h * h) + inv_b * k * k - 1.0,
            );
            match roots {
                QuadraticRoots::One(y) => return Vec2::new(x1, y),
                QuadraticRoots::Two(r0, r1) => {
                    let y = if y1 < y2 { r0 } else { r1 };
                    return Vec2::new(x1, y);
                }
                QuadraticRoots::None => {}
            }
        }
    } else {
        let m = (y2 - y1) / (x2 - x1);
        let c = y1 - m * x1;
        let w = c - k;
        let roots = quadratic::solve(
            inv_a + inv_b * m * m,
            2.0 * w * m * inv_b - 2.0 * h * inv_a,
            h * h * inv_a + w * w * inv_b - 1.0,
        );
        match roots {
            QuadraticRoots::One(x) => return Vec2::new(x, m * x + c),
            QuadraticRoots::Two(r0, r1) => {
                let x = if x1 < x2 { r0 } else { r1 };
                return Vec2::new(x, m * x + c);
            }
            QuadraticRoots::None => {}
        }
    }

    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_point_unchanged() {
        let p = Vec2::new(0.5, 0.2);
        assert_eq!(clamp(p, Vec2::ZERO, Vec2::new(2.0, 1.0)), p);
    }

    #[test]
    fn test_exterior_point_lands_on_boundary() {
        let center = Vec2::new(0.0, 1.0);
        let size = Vec2::new(2.0, 1.0);
        let p = clamp(Vec2::new(0.5, 4.0), center, size);
        assert!((p.x - 0.5).abs() < 1e-5);
        assert!(p.y > center.y);
        let d = p - center;
        let on_boundary = (d.x / size.x).powi(2) + (d.y / size.y).powi(2);
        assert!((on_boundary - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_exterior_below_center_picks_lower_root() {
        let p = clamp(Vec2::new(0.0, -5.0), Vec2::ZERO, Vec2::new(1.0, 2.0));
        assert!(p.abs_diff_eq(Vec2::new(0.0, -2.0), 1e-4));
    }

    #[test]
    fn test_vertical_line_outside_returns_start() {
        let p = clamp(Vec2::new(5.0, 3.0), Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert_eq!(p, Vec2::new(5.0, 0.0));
    }
}
