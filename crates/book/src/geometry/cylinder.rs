//! Virtual cylinder that a turning sheet rolls around.
//!
//! The sheet lies flat in its local XZ plane. Points on the far side of the
//! cylinder axis are wrapped onto the cylinder surface for up to half a turn;
//! beyond that they continue flat on top, `2 * radius` above the rest plane.

use std::f32::consts::PI;

use glam::Vec3;

use super::{euler, rot_y};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cylinder {
    position_x: f32,
    position_z: f32,
    direction_x: f32,
    direction_z: f32,
    euler_y: f32,
    radius: f32,
}

impl Cylinder {
    pub fn new(position: Vec3, direction: Vec3, radius: f32) -> Self {
        let mut cylinder = Self::default();
        cylinder.set_position(position);
        cylinder.set_direction(direction);
        cylinder.set_radius(radius);
        cylinder
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position_x, 0.0, self.position_z)
    }

    /// Set the axis position (only x and z are used).
    pub fn set_position(&mut self, position: Vec3) {
        self.position_x = position.x;
        self.position_z = position.z;
    }

    /// Set the axis direction (only x and z are used, expected unit length).
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction_x = direction.x;
        self.direction_z = direction.z;
        self.euler_y = self.direction_x.atan2(self.direction_z).to_degrees();
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Yaw of the axis in degrees.
    pub fn euler_y(&self) -> f32 {
        self.euler_y
    }

    /// Rolled position of `point`, shifted so the spine edge (x = 0) stays put.
    pub fn roll_point(&self, point: Vec3) -> Vec3 {
        self.roll(point) - self.offset(point)
    }

    /// Wrap `point` around the cylinder.
    pub fn roll(&self, point: Vec3) -> Vec3 {
        if self.side(point) >= 0.0 {
            return point;
        }

        let closest = self.closest_point(point);
        let mut distance = point.distance(closest);
        let half_turn = PI * self.radius;

        if distance > half_turn {
            distance -= half_turn;
            let mut rolled = rot_y(self.euler_y) * Vec3::new(-distance, 0.0, 0.0) + closest;
            rolled.y += self.radius * 2.0;
            rolled
        } else {
            let z = (distance / self.radius).to_degrees() - 90.0;
            let mut rolled = euler(0.0, self.euler_y, z) * Vec3::new(self.radius, 0.0, 0.0) + closest;
            rolled.y += self.radius;
            rolled
        }
    }

    /// Displacement of the spine point on the same row as `point`.
    pub fn offset(&self, mut point: Vec3) -> Vec3 {
        point.x = 0.0;
        let mut offset = self.roll(point);
        offset.z -= point.z;
        offset
    }

    /// Projection of `point` onto the axis (y is kept).
    pub fn closest_point(&self, mut point: Vec3) -> Vec3 {
        let dx = point.x - self.position_x;
        let dz = point.z - self.position_z;
        let dot = dx * self.direction_x + dz * self.direction_z;
        point.x = self.position_x + self.direction_x * dot;
        point.z = self.position_z + self.direction_z * dot;
        point
    }

    /// Signed side of `point` relative to the axis; negative values get rolled.
    pub fn side(&self, point: Vec3) -> f32 {
        let dx = point.x - self.position_x;
        let dz = point.z - self.position_z;
        dz * self.direction_x - dx * self.direction_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_axis_cylinder(x: f32, radius: f32) -> Cylinder {
        // Axis along +z; points with larger x are rolled.
        Cylinder::new(Vec3::new(x, 0.0, 0.0), Vec3::Z, radius)
    }

    #[test]
    fn test_points_before_axis_unchanged() {
        let cylinder = vertical_axis_cylinder(1.0, 0.2);
        let p = Vec3::new(0.5, 0.0, 0.3);
        assert_eq!(cylinder.roll(p), p);
        assert!(cylinder.roll_point(p).abs_diff_eq(p, 1e-6));
    }

    #[test]
    fn test_roll_quarter_turn() {
        let radius = 0.5;
        let cylinder = vertical_axis_cylinder(1.0, radius);
        let arc = PI * radius * 0.5;
        let p = cylinder.roll(Vec3::new(1.0 + arc, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0 + radius, radius, 0.0), 1e-4));
    }

    #[test]
    fn test_roll_continuous_at_half_turn() {
        let radius = 0.3;
        let cylinder = vertical_axis_cylinder(1.0, radius);
        let half = PI * radius;
        let before = cylinder.roll(Vec3::new(1.0 + half - 1e-4, 0.0, 0.0));
        let after = cylinder.roll(Vec3::new(1.0 + half + 1e-4, 0.0, 0.0));
        assert!(before.distance(after) < 1e-3);
        assert!((after.y - 2.0 * radius).abs() < 1e-3);
    }

    #[test]
    fn test_past_half_turn_lies_flat_on_top() {
        let radius = 0.25;
        let cylinder = vertical_axis_cylinder(1.0, radius);
        let p = cylinder.roll(Vec3::new(1.0 + PI * radius + 0.5, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(0.5, 2.0 * radius, 0.0), 1e-4));
    }

    #[test]
    fn test_closest_point_keeps_height() {
        let cylinder = vertical_axis_cylinder(1.0, 0.2);
        let p = cylinder.closest_point(Vec3::new(3.0, 0.7, 2.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.7, 2.0), 1e-6));
    }
}
