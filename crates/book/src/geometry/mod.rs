//! Pure math used by the paper simulation.
//!
//! Everything here is stateless. Angles passed to the rotation helpers are in
//! degrees because the paper and binding code reason in degrees throughout.

pub mod bezier;
pub mod cylinder;
pub mod ellipse;
pub mod loop_index;
pub mod quadratic;
pub mod triangle;

pub use cylinder::Cylinder;
pub use quadratic::QuadraticRoots;

use glam::{EulerRot, Mat3, Quat, Vec2, Vec3, Vec4};

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Linear interpolation without clamping.
#[inline]
pub fn lerp_unclamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 for an empty range.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Hermite smoothstep of a clamped `t`: `t² (3 - 2t)`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Interpolate between `from` and `to` along the smoothstep curve.
#[inline]
pub fn smooth_step(from: f32, to: f32, t: f32) -> f32 {
    let t = smoothstep(t);
    to * t + from * (1.0 - t)
}

/// Critically damped spring towards `target`.
///
/// `velocity` carries the spring state between calls. Never overshoots the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;

    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let original_to = target;
    let target = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (original_to - current > 0.0) == (output > original_to) {
        output = original_to;
        *velocity = if dt > 0.0 { (output - original_to) / dt } else { 0.0 };
    }

    output
}

/// Per-component [`smooth_damp`] with an individual smooth time for each axis.
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: Vec3,
    dt: f32,
) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, target.x, &mut velocity.x, smooth_time.x, dt),
        smooth_damp(current.y, target.y, &mut velocity.y, smooth_time.y, dt),
        smooth_damp(current.z, target.z, &mut velocity.z, smooth_time.z, dt),
    )
}

/// Map the XZ plane onto XY (z becomes y).
#[inline]
pub fn xz_to_xy(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Map the XY plane back onto XZ with y = 0.
#[inline]
pub fn xy_to_xz(v: Vec2) -> Vec3 {
    Vec3::new(v.x, 0.0, v.y)
}

/// Rotation from Euler angles in degrees, applied z first, then x, then y.
#[inline]
pub fn euler(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, y.to_radians(), x.to_radians(), z.to_radians())
}

/// Rotation about Y in degrees.
#[inline]
pub fn rot_y(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}

/// Rotation about Z in degrees.
#[inline]
pub fn rot_z(degrees: f32) -> Quat {
    Quat::from_rotation_z(degrees.to_radians())
}

/// Rotation whose local +Z looks along `forward` with +Y as close to `up` as possible.
///
/// Degenerate inputs (zero forward, forward parallel to up) fall back to the
/// shortest arc from +Z.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let x = up.cross(z).normalize_or_zero();
    if x == Vec3::ZERO {
        return Quat::from_rotation_arc(Vec3::Z, z);
    }
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Spherical interpolation between two directions, also blending their lengths.
pub fn slerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    let la = a.length();
    let lb = b.length();
    if la < 1e-6 || lb < 1e-6 {
        return a.lerp(b, t);
    }
    let rotation = Quat::IDENTITY.slerp(Quat::from_rotation_arc(a / la, b / lb), t);
    rotation * (a / la) * lerp_unclamped(la, lb, t)
}

/// Signed angle in degrees of the XY direction `to - from`.
#[inline]
pub fn atan2_degrees(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Texture scale/offset packed as `(scale.x, scale.y, offset.x, offset.y)`.
pub fn x_flip_st(st: Vec4) -> Vec4 {
    Vec4::new(-st.x, st.y, st.z + st.x, st.w)
}

/// Mirror a texture scale/offset vertically.
pub fn y_flip_st(st: Vec4) -> Vec4 {
    Vec4::new(st.x, -st.y, st.z, st.w + st.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_and_inverse() {
        assert!((lerp(2.0, 4.0, 0.5) - 3.0).abs() < 1e-6);
        assert!((lerp(2.0, 4.0, 3.0) - 4.0).abs() < 1e-6);
        assert!((lerp_unclamped(2.0, 4.0, 3.0) - 8.0).abs() < 1e-6);
        assert!((inverse_lerp(2.0, 4.0, 3.0) - 0.5).abs() < 1e-6);
        assert!((inverse_lerp(4.0, 2.0, 3.5) - 0.25).abs() < 1e-6);
        assert_eq!(inverse_lerp(1.0, 1.0, 5.0), 0.0);
    }

    #[test]
    fn test_smoothstep_ends() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
        assert!((smooth_step(10.0, 20.0, 0.5) - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..600 {
            value = smooth_damp(value, 1.0, &mut velocity, 0.2, 1.0 / 60.0);
            assert!(value <= 1.0);
        }
        assert!((value - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_euler_applies_z_before_y() {
        // Rolling (1,0,0) by 90 degrees about z lifts it to +y, then yaw leaves it alone.
        let p = euler(0.0, 45.0, 90.0) * Vec3::X;
        assert!(p.abs_diff_eq(Vec3::Y, 1e-5));

        let p = rot_y(90.0) * Vec3::X;
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_look_rotation_axes() {
        let q = look_rotation(Vec3::X, Vec3::Y);
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));
        assert!((q * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));

        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_slerp_vec3_midpoint() {
        let mid = slerp_vec3(Vec3::X, Vec3::Y, 0.5);
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!(mid.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_st_flips() {
        let st = Vec4::new(0.5, 0.25, 0.1, 0.2);
        assert_eq!(x_flip_st(st), Vec4::new(-0.5, 0.25, 0.6, 0.2));
        assert_eq!(y_flip_st(st), Vec4::new(0.5, -0.25, 0.1, 0.45));
    }
}
