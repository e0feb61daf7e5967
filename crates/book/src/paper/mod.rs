//! One physical sheet of a book.
//!
//! A paper rests flat in its local XZ plane: X runs from the spine to the
//! outer edge, Z along the spine. Turning rolls the sheet around a virtual
//! [`Cylinder`] whose pose is solved every frame so that the grabbed edge
//! follows the handle.
//!
//! Work that touches neighbors, mesh pools or the binding lives in
//! [`PaperStack`]; this module holds the per-sheet state and math.

mod stack;

pub use stack::PaperStack;

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Affine3A, Vec2, Vec3};

use folio_config::{BookDirection, Color, PaperUvMargin};

use crate::content::{BookContent, ContentId, Texture, TextureSt};
use crate::geometry::{
    ellipse, inverse_lerp, lerp, lerp_unclamped, rot_z, smooth_damp_vec3, smoothstep, xy_to_xz, xz_to_xy,
    Cylinder,
};
use crate::pattern::PaperPattern;
use crate::pool::{MeshDataRef, PoolKind};
use crate::raycast::{BookRaycastHit, Plane, Ray};

/// Number of handle velocity samples averaged when a turn is released
const VELOCITY_SAMPLES: usize = 5;

/// Bisection steps of the cylinder solve
const CYLINDER_ITERATIONS: usize = 100;

/// Handle x distance at which the cylinder solve and the spring stop
const HANDLE_EPSILON: f32 = 1e-4;

/// Mesh detail currently shown by a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Own detailed mesh while turning or falling
    Highpoly,
    Lowpoly,
    /// Lowpoly with the faces hidden by the neighbors cut out
    LowpolyHole,
}

/// Texture binding of one sub-mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSlot {
    pub color: Color,
    pub texture: Texture,
    pub st: TextureSt,
}

/// Per-paper values fixed at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperSettings {
    pub is_cover: bool,
    /// Size in paper-local axes (x from the spine, y along the spine)
    pub size: Vec2,
    pub thickness: f32,
    pub stiffness: f32,
    /// Offset along the spine, centering covers and pages of different heights
    pub margin: f32,
    pub uv_margin: PaperUvMargin,
    pub color: Color,
    pub direction: BookDirection,
    pub cast_shadows: bool,
    pub reduce_shadows: bool,
}

#[derive(Debug, Clone)]
struct PaperMesh {
    current: MeshDataRef,
    kind: MeshKind,
    lowpoly: MeshDataRef,
    lowpoly_hole: Option<MeshDataRef>,
    highpoly: PoolKind,
    pattern: Arc<PaperPattern>,
}

#[derive(Debug, Clone)]
pub struct Paper {
    index: usize,
    settings: PaperSettings,
    size: Vec2,
    size_x_offset: f32,

    front: ContentId,
    back: ContentId,
    use_back_content_for_sides: bool,
    prev: Option<usize>,
    next: Option<usize>,
    no_hole: bool,

    position: Vec3,
    rotation_z: f32,
    flipped: bool,

    mesh: Option<PaperMesh>,
    cast_shadows: bool,
    materials: Vec<MaterialSlot>,

    cylinder: Cylinder,
    rolling: bool,
    auto_turning: bool,
    world_plane: Plane,

    start_handle: Vec3,
    current_handle: Vec3,
    end_handle: Vec3,
    prev_handle: Vec3,
    handle_offset: Vec3,
    handle_velocity: Vec3,
    handle_velocities: VecDeque<Vec3>,

    min_turning_radius: f32,
    turning_radius: f32,
    fall_duration: f32,
    fall_time: f32,

    x_time: f32,
    z_time: f32,

    turning: bool,
    falling: bool,
    falling_left: bool,
}

impl Paper {
    pub fn new(index: usize, settings: PaperSettings, front: ContentId, back: ContentId) -> Self {
        Self {
            index,
            size: settings.size,
            size_x_offset: 0.0,
            cast_shadows: settings.cast_shadows && !settings.reduce_shadows,
            settings,
            front,
            back,
            use_back_content_for_sides: false,
            prev: None,
            next: None,
            no_hole: false,
            position: Vec3::ZERO,
            rotation_z: 0.0,
            flipped: false,
            mesh: None,
            materials: Vec::new(),
            cylinder: Cylinder::default(),
            rolling: false,
            auto_turning: false,
            world_plane: Plane::default(),
            start_handle: Vec3::ZERO,
            current_handle: Vec3::ZERO,
            end_handle: Vec3::ZERO,
            prev_handle: Vec3::ZERO,
            handle_offset: Vec3::ZERO,
            handle_velocity: Vec3::ZERO,
            handle_velocities: VecDeque::with_capacity(VELOCITY_SAMPLES),
            min_turning_radius: 0.0,
            turning_radius: 0.0,
            fall_duration: 0.0,
            fall_time: 0.2,
            x_time: 0.0,
            z_time: 0.0,
            turning: false,
            falling: false,
            falling_left: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_cover(&self) -> bool {
        self.settings.is_cover
    }

    pub fn settings(&self) -> &PaperSettings {
        &self.settings
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Bindings shorten papers by the part wrapped around the spine.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Length of the paper behind local x = 0, towards the spine.
    pub fn size_x_offset(&self) -> f32 {
        self.size_x_offset
    }

    pub fn set_size_x_offset(&mut self, offset: f32) {
        self.size_x_offset = offset;
    }

    pub fn thickness(&self) -> f32 {
        self.settings.thickness
    }

    pub fn margin(&self) -> f32 {
        self.settings.margin
    }

    pub fn front_content(&self) -> ContentId {
        self.front
    }

    pub fn back_content(&self) -> ContentId {
        self.back
    }

    pub fn set_use_back_content_for_sides(&mut self, value: bool) {
        self.use_back_content_for_sides = value;
    }

    /// Content facing up on the stack the paper rests on.
    pub fn current_content(&self) -> ContentId {
        if self.is_on_right_stack() { self.front } else { self.back }
    }

    pub fn set_neighbors(&mut self, prev: Option<usize>, next: Option<usize>) {
        self.prev = prev;
        self.next = next;
    }

    pub fn prev(&self) -> Option<usize> {
        self.prev
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn set_no_hole(&mut self, value: bool) {
        self.no_hole = value;
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_turning(&self) -> bool {
        self.turning
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn is_auto_turning(&self) -> bool {
        self.auto_turning
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    pub fn materials(&self) -> &[MaterialSlot] {
        &self.materials
    }

    pub fn mesh_kind(&self) -> Option<MeshKind> {
        self.mesh.as_ref().map(|m| m.kind)
    }

    pub fn mesh_data(&self) -> Option<MeshDataRef> {
        self.mesh.as_ref().map(|m| m.current)
    }

    /// Pattern of the mesh currently shown.
    pub fn pattern(&self) -> Option<&Arc<PaperPattern>> {
        self.mesh.as_ref().map(|m| &m.pattern)
    }

    pub fn cylinder(&self) -> &Cylinder {
        &self.cylinder
    }

    pub fn turning_radius(&self) -> f32 {
        self.turning_radius
    }

    pub fn x_time(&self) -> f32 {
        self.x_time
    }

    /// Turn progress: 0 on the right stack, 1 on the left stack.
    pub fn z_time(&self) -> f32 {
        if self.falling || self.turning {
            if self.flipped { 1.0 - self.z_time } else { self.z_time }
        } else if self.flipped {
            1.0
        } else {
            0.0
        }
    }

    pub fn set_time(&mut self, time: f32) {
        self.x_time = time;
        self.z_time = time;
    }

    /// Direction from the spine towards the outer edge for the current progress.
    pub fn direction(&self) -> Vec3 {
        rot_z(self.z_time() * 180.0) * Vec3::NEG_X
    }

    pub fn is_on_right_stack(&self) -> bool {
        if self.falling {
            if self.flipped { self.falling_left } else { !self.falling_left }
        } else {
            !self.flipped
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation about the spine axis in degrees.
    pub fn rotation_z(&self) -> f32 {
        self.rotation_z
    }

    pub fn set_pose(&mut self, position: Vec3, rotation_z: f32) {
        self.position = position;
        self.rotation_z = rotation_z;
    }

    pub fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    /// Paper space to parent (book root) space. Flipped papers mirror X.
    pub fn local_matrix(&self) -> Affine3A {
        let scale = Vec3::new(if self.flipped { -1.0 } else { 1.0 }, 1.0, 1.0);
        Affine3A::from_scale_rotation_translation(scale, rot_z(self.rotation_z), self.position)
    }

    pub fn set_min_turning_radius(&mut self, min: f32) {
        self.min_turning_radius = min;
    }

    /// Derive the roll radius from stiffness and the requested bend.
    ///
    /// Soft papers curl up to a half circle over their width; stiff papers
    /// approach a flat sweep.
    pub fn update_turning_radius(&mut self, bend: f32) {
        let h = self.settings.stiffness.max(1.0 - bend.clamp(0.0, 1.0));
        let radius = if h <= 0.5 {
            inverse_lerp(0.0, 0.5, h) * self.size.x / PI
        } else {
            let degrees = (180.0 * (1.0 - inverse_lerp(0.5, 1.0, h))).max(5.0);
            self.size.x / degrees.to_radians()
        };
        self.turning_radius = radius.max(self.min_turning_radius);
    }

    fn roll_point(&self, point: Vec3) -> Vec3 {
        if self.rolling { self.cylinder.roll_point(point) } else { point }
    }

    /// Edge direction near the spine at height `z`, in parent space.
    pub fn direction_at(&self, z: f32) -> Vec3 {
        let matrix = self.local_matrix();
        let a = matrix.transform_point3(self.roll_point(Vec3::new(0.0, 0.0, z)));
        let b = matrix.transform_point3(self.roll_point(Vec3::new(0.1, 0.0, z)));
        (a - b).normalize_or_zero()
    }

    /// Recompute x/z progress from the rolled corners.
    pub fn update_time(&mut self) {
        let pattern = self.mesh.as_ref().map(|m| Arc::clone(&m.pattern));
        let (Some(pattern), true) = (pattern, self.turning || self.falling) else {
            self.x_time = 0.0;
            self.z_time = 0.0;
            return;
        };

        let t0 = self.find_time(Vec3::new(self.size.x, 0.0, 0.0));
        let t1 = self.find_time(Vec3::new(self.size.x, 0.0, self.size.y));
        self.x_time = lerp(t0.min(t1), t0.max(t1), 0.9);

        let xs = &pattern.base_x;
        let z_last = pattern.base_z.last().copied().unwrap_or(self.size.y);
        let (x1, x2) = (xs.get(1).copied().unwrap_or(0.0), xs.get(2).copied().unwrap_or(self.size.x));

        let a = self.roll_point(Vec3::new(x1, 0.0, 0.0));
        let b = self.roll_point(Vec3::new(x2, 0.0, 0.0));
        let c = self.roll_point(Vec3::new(x1, 0.0, z_last));
        let d = self.roll_point(Vec3::new(x2, 0.0, z_last));

        let ab = (b - a).normalize_or_zero();
        let cd = (d - c).normalize_or_zero();
        let z0 = ab.y.atan2(ab.x).to_degrees();
        let z1 = cd.y.atan2(cd.x).to_degrees();
        self.z_time = (z0 + z1) / 2.0 / 180.0;
    }

    fn find_time(&self, vertex: Vec3) -> f32 {
        inverse_lerp(self.size.x, -self.size.x, self.roll_point(vertex).x)
    }

    /// Keep the handle inside the reach of both spine corners.
    ///
    /// Each corner allows an ellipse whose long radius is its distance to the
    /// start handle and whose short radius loses the turning radius.
    pub fn clamp_handle(&mut self) {
        self.start_handle.y = 0.0;
        self.current_handle.y = 0.0;

        let start = self.start_handle;
        let a = Vec3::ZERO;
        let c = Vec3::new(0.0, 0.0, self.size.y);

        let ra = a.distance(start);
        let rc = c.distance(start);
        let raz = (ra - self.turning_radius).max(0.01);
        let rcz = (rc - self.turning_radius).max(0.01);
        let z0 = start.z;

        let a_center = Vec2::new(0.0, z0 + (a.z - z0) * (raz / ra));
        let c_center = Vec2::new(0.0, z0 + (c.z - z0) * (rcz / rc));

        let mut p = self.current_handle;
        p.x = p.x.clamp(-self.size.x, self.size.x);

        let mut p = xz_to_xy(p);
        p = ellipse::clamp(p, a_center, Vec2::new(ra, raz));
        p = ellipse::clamp(p, c_center, Vec2::new(rc, rcz));
        self.current_handle = xy_to_xz(p);
    }

    /// Find the cylinder pose that rolls the start handle onto the current one.
    ///
    /// The cylinder slides along the handle direction; bisection runs until
    /// the rolled start handle matches the current handle along X.
    pub fn solve_cylinder(&mut self) {
        let start = self.start_handle;
        let current = self.current_handle;

        let mut direction = (start - current).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::X;
        }

        let mut a = start - direction * (self.size.x * 2.0 + self.turning_radius * PI);
        let mut b = start;

        let mut cylinder = Cylinder::new(
            Vec3::ZERO,
            Vec3::new(-direction.z, 0.0, direction.x),
            self.turning_radius,
        );
        for _ in 0..CYLINDER_ITERATIONS {
            cylinder.set_position((a + b) / 2.0);
            let v = cylinder.roll_point(start);
            if (current.x - v.x).abs() < HANDLE_EPSILON {
                break;
            }
            if v.x > current.x {
                b = cylinder.position();
            } else {
                a = cylinder.position();
            }
        }
        self.cylinder = cylinder;
    }

    /// Release a user turn: pick the side to fall to from the recent handle
    /// velocity, or from the progress when the release is slow.
    pub fn stop_turning(&mut self) {
        self.clamp_handle();
        self.turning = false;
        self.falling = true;

        let velocity = if self.handle_velocities.is_empty() {
            Vec3::ZERO
        } else {
            self.handle_velocities.iter().sum::<Vec3>() / self.handle_velocities.len() as f32
        };

        self.falling_left = if velocity.length() > 0.1 {
            velocity.x < 0.0
        } else {
            self.x_time > 0.5 && self.z_time > 0.1
        };

        let progress = if self.falling_left { 1.0 - self.x_time } else { self.x_time };
        self.fall_time = lerp(0.1, 0.2, progress);

        self.end_handle = self.start_handle;
        if self.falling_left {
            self.end_handle.x = -self.size.x;
        }
    }

    /// Move the handle one step towards the end of the fall.
    ///
    /// Returns true when the fall is over.
    pub fn advance_fall(&mut self, dt: f32) -> bool {
        if self.auto_turning {
            let t = if self.fall_duration > 0.0 {
                (self.fall_time / self.fall_duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let t = smoothstep(smoothstep(t));
            self.current_handle = self
                .start_handle
                .lerp(self.end_handle, if self.falling_left { t } else { 1.0 - t });
            self.fall_time += dt;
            t >= 1.0
        } else {
            let smooth_time = Vec3::new(self.fall_time, 0.0, self.fall_time * 0.75);
            self.current_handle = smooth_damp_vec3(
                self.current_handle,
                self.end_handle,
                &mut self.handle_velocity,
                smooth_time,
                dt,
            );
            (self.end_handle.x - self.current_handle.x).abs() < HANDLE_EPSILON
        }
    }

    /// Record the handle after a turning update. `local_hit` is the ray hit
    /// in paper space.
    fn track_handle(&mut self, local_hit: Vec3, dt: f32) {
        let mut handle = local_hit;
        handle.y = 0.0;
        self.current_handle = handle + self.handle_offset;

        self.handle_velocity = if dt > 0.0 {
            (self.current_handle - self.prev_handle) / dt
        } else {
            Vec3::ZERO
        };
        if self.handle_velocities.len() == VELOCITY_SAMPLES {
            self.handle_velocities.pop_front();
        }
        self.handle_velocities.push_back(self.handle_velocity);
        self.prev_handle = self.current_handle;
    }

    /// Intersect a world ray with the paper's rest plane, in paper space.
    ///
    /// Misses outside the paper unless `no_bounds_check` is set.
    pub fn raycast_local(&self, ray: &Ray, parent: &Affine3A, no_bounds_check: bool) -> Option<Vec3> {
        let world = *parent * self.local_matrix();
        let ray = ray.transformed(&world.inverse());
        let hit = ray.point_at(Plane::XZ.raycast(&ray)?);
        (self.contains(hit) || no_bounds_check).then_some(hit)
    }

    fn contains(&self, hit: Vec3) -> bool {
        hit.x > 0.0 && hit.x < self.size.x && hit.z > 0.0 && hit.z < self.size.y
    }

    /// Hit test of a resting paper.
    pub fn raycast(&self, ray: &Ray, parent: &Affine3A) -> Option<BookRaycastHit> {
        if self.falling || self.turning {
            return None;
        }
        let hit = self.raycast_local(ray, parent, false)?;
        Some(BookRaycastHit {
            point: (*parent * self.local_matrix()).transform_point3(hit),
            texture_coordinate: self.hit_to_uv(hit),
            content: self.current_content(),
            paper_index: self.index,
        })
    }

    /// Texture coordinate of the ray on the paper plane, hit or not.
    pub fn texture_coordinate(&self, ray: &Ray, parent: &Affine3A) -> Vec2 {
        self.raycast_local(ray, parent, true)
            .map_or(Vec2::ZERO, |hit| self.hit_to_uv(hit))
    }

    fn hit_to_uv(&self, hit: Vec3) -> Vec2 {
        let uv = [inverse_lerp(-self.size_x_offset, self.size.x, hit.x), hit.z / self.size.y];
        let [x, y] = self.settings.uv_margin.fix_uv(uv);

        if self.settings.direction.is_vertical() {
            let (x, y) = (y, x);
            Vec2::new(x, if self.is_on_right_stack() { 1.0 - y } else { y })
        } else {
            Vec2::new(if self.is_on_right_stack() { x } else { 1.0 - x }, y)
        }
    }

    /// Refresh the texture bindings of every sub-mesh.
    pub fn update_materials(&mut self, content: &BookContent) {
        let sub_mesh_count = self.pattern().map_or(1, |p| p.sub_mesh_count());
        let color = self.settings.color;

        let front = content.get(self.front);
        let back = content.get(self.back);
        let front = MaterialSlot {
            color,
            texture: front.texture().into(),
            st: front.texture_st(),
        };
        let back_st = back.texture_st();
        let back = MaterialSlot {
            color,
            texture: back.texture().into(),
            st: if self.settings.direction.is_vertical() {
                back_st.y_flipped()
            } else {
                back_st.x_flipped()
            },
        };

        self.materials = if sub_mesh_count == 3 {
            let (a, b) = if self.flipped { (1, 0) } else { (0, 1) };
            let mut slots = vec![front; 3];
            slots[a] = front;
            slots[b] = back;
            slots[2] = if self.use_back_content_for_sides { back } else { front };
            slots
        } else {
            vec![if self.flipped { back } else { front }]
        };
    }

    /// Prepare a scripted turn. `flip` mirrors the paper first (surface mode).
    fn begin_auto_turn(&mut self, flip: bool, falling_left: bool, twist: f32, bend: f32, duration: f32) {
        self.update_turning_radius(bend);

        self.prev_handle = self.current_handle;
        self.rolling = true;
        self.handle_offset = Vec3::ZERO;
        if flip {
            self.flipped = !self.flipped;
        }

        self.falling_left = falling_left;
        self.turning = false;
        self.falling = true;
        self.fall_time = 0.0;
        self.fall_duration = duration;

        let twist = twist.clamp(-0.99, 0.99);
        let start_z = lerp_unclamped(0.5, 1.0, twist);
        let end_z = lerp_unclamped(0.5, 0.0, twist);
        self.start_handle = Vec3::new(self.size.x, 0.0, self.size.y * start_z);
        self.end_handle = Vec3::new(-self.size.x, 0.0, self.size.y * end_z);

        self.auto_turning = true;
    }

    /// Grab the paper at a local hit. Returns false outside the paper.
    fn begin_turn(&mut self, local_hit: Vec3) -> bool {
        if !self.contains(local_hit) {
            return false;
        }
        self.rolling = true;
        self.turning = true;
        self.falling = false;
        self.handle_offset = Vec3::ZERO;

        self.start_handle = local_hit;
        self.start_handle.x = self.size.x;
        self.current_handle = self.start_handle;

        if local_hit.x < self.size.x * 0.9 {
            self.handle_offset = Vec3::new(local_hit.x - self.size.x, 0.0, 0.0);
            self.flipped = !self.flipped;
        }

        self.handle_velocity = Vec3::ZERO;
        self.prev_handle = self.current_handle;
        self.handle_velocities.clear();
        true
    }

    /// Settle after a fall: mirror if it landed on the other stack.
    fn end_fall(&mut self) -> bool {
        let landed_left = self.falling_left;
        if landed_left {
            self.flipped = !self.flipped;
        }
        self.z_time = if self.flipped { 1.0 } else { 0.0 };
        self.rolling = false;
        self.falling_left = false;
        self.falling = false;
        landed_left
    }

    pub(crate) fn handles(&self) -> (Vec3, Vec3, Vec3) {
        (self.start_handle, self.current_handle, self.end_handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentId;

    fn settings() -> PaperSettings {
        PaperSettings {
            is_cover: false,
            size: Vec2::new(2.0, 3.0),
            thickness: 0.02,
            stiffness: 0.2,
            margin: 0.0,
            uv_margin: PaperUvMargin::default(),
            color: folio_config::WHITE,
            direction: BookDirection::LeftToRight,
            cast_shadows: true,
            reduce_shadows: false,
        }
    }

    fn paper() -> Paper {
        let mut paper = Paper::new(0, settings(), ContentId::page(0), ContentId::page(1));
        paper.update_turning_radius(1.0);
        paper
    }

    #[test]
    fn test_turning_radius_from_stiffness() {
        let mut paper = paper();
        // stiffness 0.2 with full bend: 0.4 of a half circle
        let expected = 0.4 * 2.0 / PI;
        assert!((paper.turning_radius() - expected).abs() < 1e-5);

        paper.update_turning_radius(0.0);
        // no bend: stiff sweep of 5 degrees
        assert!((paper.turning_radius() - 2.0 / 5f32.to_radians()).abs() < 1e-3);

        paper.set_min_turning_radius(10.0);
        paper.update_turning_radius(1.0);
        assert_eq!(paper.turning_radius(), 10.0);
    }

    #[test]
    fn test_resting_time_and_stack() {
        let mut paper = paper();
        assert_eq!(paper.z_time(), 0.0);
        assert!(paper.is_on_right_stack());
        assert!(paper.direction().abs_diff_eq(Vec3::NEG_X, 1e-6));

        paper.set_flipped(true);
        assert_eq!(paper.z_time(), 1.0);
        assert!(!paper.is_on_right_stack());
        assert!(paper.direction().abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(paper.current_content(), ContentId::page(1));
    }

    #[test]
    fn test_local_matrix_mirrors_when_flipped() {
        let mut paper = paper();
        paper.set_pose(Vec3::new(0.0, 1.0, 0.0), 0.0);
        paper.set_flipped(true);
        let p = paper.local_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_clamp_handle_keeps_reachable_point() {
        let mut paper = paper();
        paper.start_handle = Vec3::new(2.0, 0.0, 1.5);
        paper.current_handle = Vec3::new(1.0, 0.3, 1.5);
        paper.clamp_handle();
        assert!(paper.current_handle.abs_diff_eq(Vec3::new(1.0, 0.0, 1.5), 1e-5));
    }

    #[test]
    fn test_clamp_handle_pulls_far_point_in() {
        let mut paper = paper();
        paper.start_handle = Vec3::new(2.0, 0.0, 1.5);
        paper.current_handle = Vec3::new(0.0, 0.0, 10.0);
        paper.clamp_handle();
        let p = paper.current_handle;
        assert!(p.z < 10.0);
        assert!(p.x.abs() <= 2.0 + 1e-5);
    }

    #[test]
    fn test_cylinder_solve_matches_handle() {
        let mut paper = paper();
        paper.rolling = true;
        paper.start_handle = Vec3::new(2.0, 0.0, 1.5);
        paper.current_handle = Vec3::new(0.5, 0.0, 1.5);
        paper.solve_cylinder();
        let rolled = paper.cylinder().roll_point(paper.start_handle);
        assert!((rolled.x - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stop_turning_slow_release_falls_back() {
        let mut paper = paper();
        paper.turning = true;
        paper.start_handle = Vec3::new(2.0, 0.0, 1.5);
        paper.current_handle = Vec3::new(1.8, 0.0, 1.5);
        paper.x_time = 0.1;
        paper.z_time = 0.05;
        paper.stop_turning();
        assert!(paper.is_falling());
        assert!(!paper.is_turning());
        assert!(paper.is_on_right_stack());
        assert!((paper.fall_time - lerp(0.1, 0.2, 0.1)).abs() < 1e-6);
        assert_eq!(paper.end_handle, paper.start_handle);
    }

    #[test]
    fn test_stop_turning_fling_left() {
        let mut paper = paper();
        paper.turning = true;
        paper.start_handle = Vec3::new(2.0, 0.0, 1.5);
        paper.current_handle = Vec3::new(1.0, 0.0, 1.5);
        paper.prev_handle = Vec3::new(1.5, 0.0, 1.5);
        paper.track_handle(Vec3::new(1.0, 0.0, 1.5), 1.0 / 60.0);
        paper.stop_turning();
        assert!(paper.falling_left);
        assert_eq!(paper.end_handle.x, -2.0);
    }

    #[test]
    fn test_velocity_window_is_bounded() {
        let mut paper = paper();
        for i in 0..8 {
            paper.track_handle(Vec3::new(i as f32 * 0.1, 0.0, 0.0), 0.1);
        }
        assert_eq!(paper.handle_velocities.len(), VELOCITY_SAMPLES);
    }

    #[test]
    fn test_auto_fall_reaches_end() {
        let mut paper = paper();
        paper.begin_auto_turn(false, true, 0.0, 1.0, 0.5);
        assert!(paper.is_falling());
        assert!((paper.start_handle.z - 1.5).abs() < 1e-6);

        let mut steps = 0;
        while !paper.advance_fall(1.0 / 60.0) {
            steps += 1;
            assert!(steps < 100);
        }
        assert!(paper.current_handle.abs_diff_eq(paper.end_handle, 1e-5));
        assert!(paper.end_fall());
        assert!(paper.is_flipped());
        assert_eq!(paper.z_time(), 1.0);
    }

    #[test]
    fn test_twist_skews_handles() {
        let mut paper = paper();
        paper.begin_auto_turn(true, false, 0.5, 1.0, 0.5);
        let (start, _, end) = paper.handles();
        assert!((start.z - 3.0 * 0.75).abs() < 1e-6);
        assert!((end.z - 3.0 * 0.25).abs() < 1e-6);
        assert!(paper.is_flipped());
    }

    #[test]
    fn test_raycast_resting_paper() {
        let paper = paper();
        let parent = Affine3A::IDENTITY;
        let ray = Ray::new(Vec3::new(0.5, 1.0, 1.5), Vec3::NEG_Y);
        let hit = paper.raycast(&ray, &parent).unwrap();
        assert_eq!(hit.paper_index, 0);
        assert!((hit.texture_coordinate.x - 0.25).abs() < 1e-6);
        assert!((hit.texture_coordinate.y - 0.5).abs() < 1e-6);

        let outside = Ray::new(Vec3::new(3.0, 1.0, 1.5), Vec3::NEG_Y);
        assert!(paper.raycast(&outside, &parent).is_none());
        assert!(paper.texture_coordinate(&outside, &parent).x > 0.99);
    }

    #[test]
    fn test_begin_turn_near_spine_flips() {
        let mut paper = paper();
        assert!(!paper.begin_turn(Vec3::new(2.5, 0.0, 1.0)));
        assert!(paper.begin_turn(Vec3::new(1.0, 0.0, 1.0)));
        assert!(paper.is_flipped());
        assert_eq!(paper.handle_offset, Vec3::new(-1.0, 0.0, 0.0));
        assert!(paper.is_turning());
    }
}
