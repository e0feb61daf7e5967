//! Real roots of `a·x² + b·x + c = 0`.

/// Real roots of a quadratic equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadraticRoots {
    None,
    One(f32),
    /// `(-b + √Δ) / 2a` and `(-b - √Δ) / 2a`, in that order
    Two(f32, f32),
}

/// Solve `a·x² + b·x + c = 0`.
pub fn solve(a: f32, b: f32, c: f32) -> QuadraticRoots {
    let delta = b * b - 4.0 * a * c;
    if delta < 0.0 {
        QuadraticRoots::None
    } else if delta == 0.0 {
        QuadraticRoots::One(-b / (2.0 * a))
    } else {
        let s = delta.sqrt();
        QuadraticRoots::Two((-b + s) / (2.0 * a), (-b - s) / (2.0 * a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_roots_order() {
        // (x - 1)(x - 3)
        assert_eq!(solve(1.0, -4.0, 3.0), QuadraticRoots::Two(3.0, 1.0));
    }

    #[test]
    fn test_single_root() {
        // 2(x - 1)² = 2x² - 4x + 2
        assert_eq!(solve(2.0, -4.0, 2.0), QuadraticRoots::One(1.0));
    }

    #[test]
    fn test_no_roots() {
        assert_eq!(solve(1.0, 0.0, 1.0), QuadraticRoots::None);
    }
}
