//! Spiral wire binding.
//!
//! Papers are punched near the spine and hang on a coil of twin loops. A
//! resting paper lies on a circle of [`WireBound::loop_radius`] around the
//! coil center; turning swings it over the top of the coil. The lowpoly mesh
//! never deforms at rest, so every resting page shares one mesh.

use std::f32::consts::PI;

use glam::{Affine3A, Quat, Vec3};
use tracing::debug;

use folio_config::{AnimationCurve, Color, Keyframe, WireBindingSetup, WireSetup};

use super::{spine_point, BinderMesh, BookBound, MeshRefresh, PatternRequest, StackInfo};
use crate::error::BookError;
use crate::geometry::{lerp, look_rotation, loop_index, rot_y, rot_z};
use crate::paper::Paper;
use crate::pattern::{seam_nodes_to_seams, NodeArena, NodeMargin, PaperBorder, PaperPattern, PatternBuilder};
use crate::pool::MeshPools;

/// Angle of the outermost papers at the coil
const BINDING_ANGLE: f32 = 45.0 + 22.5;

#[derive(Debug, Clone)]
pub struct WireBound {
    stack: StackInfo,
    color: Color,
    mesh: BinderMesh,

    loop_radius: f32,
    stack_height: f32,
    paper_z_angle: f32,

    wire_thickness: f32,
    wire_margin: f32,
    twin_loop_space: f32,
    twin_loop_count: usize,
    gap: f32,
}

/// Coil layout along the spine.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CoilLayout {
    margin: f32,
    twin_loop_space: f32,
    twin_loop_count: usize,
    gap: f32,
}

impl WireBound {
    pub fn new(setup: &WireBindingSetup, stack: StackInfo, papers: &mut [Paper]) -> Result<Self, BookError> {
        Self::validate(&stack)?;

        let wire = &setup.wire;
        let wire_thickness = wire.thickness;
        let stack_height = stack.total_thickness;

        let mut radius = ((stack_height / 2.0) / BINDING_ANGLE.to_radians().sin()).max(0.0) + wire_thickness;
        let h = stack_height / 2.0;
        let r1 = radius - wire_thickness / 2.0;
        let vx1 = (r1 * r1 - h * h).max(0.0).sqrt() - stack.max_paper_thickness.max(wire_thickness);
        radius += (stack.min_paper_thickness * 0.75 - vx1).max(0.0);

        let h2 = radius - stack_height / 2.0 + wire_thickness / 2.0;
        let w2 = papers.first().map_or(stack.min_paper_width, |p| p.size().x);
        let b2 = (w2 * w2 - h2 * h2).max(0.0).sqrt();
        let paper_z_angle = (b2 / w2).clamp(-1.0, 1.0).asin().to_degrees() - 90.0;

        let layout = coil_layout(wire, stack.min_paper_height);
        let mesh = wire_mesh(wire, radius, &layout);

        let bound = Self {
            color: wire.color,
            mesh,
            loop_radius: radius,
            stack_height,
            paper_z_angle,
            wire_thickness,
            wire_margin: layout.margin,
            twin_loop_space: layout.twin_loop_space,
            twin_loop_count: layout.twin_loop_count,
            gap: layout.gap,
            stack,
        };
        debug!(
            radius = bound.loop_radius,
            loops = bound.twin_loop_count,
            gap = bound.gap,
            "Wire binding created"
        );

        let min_turning_radius = (bound.stack.cover_thickness * 2.0).max(bound.loop_radius);
        for i in 0..papers.len() {
            papers[i].set_min_turning_radius(min_turning_radius);
            papers[i].update_turning_radius(1.0);
            bound.reset_paper_position(papers, i);
        }
        Ok(bound)
    }

    pub fn loop_radius(&self) -> f32 {
        self.loop_radius
    }

    pub fn twin_loop_count(&self) -> usize {
        self.twin_loop_count
    }

    /// Stack height from the middle of the book out to `index`, inclusive on
    /// the back half.
    fn stack_mid_height(&self, index: usize) -> f32 {
        let t = &self.stack.thicknesses;
        let mid = t.len() / 2;
        if index < mid {
            t[index..mid].iter().sum()
        } else {
            t.iter().take(index + 1).skip(mid).sum()
        }
    }

    fn stack_z(&self, h: f32) -> f32 {
        ((h - self.stack_height * 0.5) / self.loop_radius).clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Distance from the coil to the punched hole of a paper.
    fn hole_offset(&self, index: usize, thickness: f32) -> f32 {
        let h = self.stack_mid_height(index);
        let h0 = h - thickness / 2.0;
        let r0 = self.loop_radius;
        let r1 = self.loop_radius - self.wire_thickness / 2.0;
        let x0 = (r0 * r0 - h0 * h0).max(0.0).sqrt();
        let x1 = (r1 * r1 - h * h).max(0.0).sqrt();
        thickness.max(self.wire_thickness) + x0 - x1
    }

    /// Right and left stack angles of a resting paper.
    fn stack_angles(&self, index: usize, thickness: f32) -> (f32, f32) {
        let h = self.stack.stack_height(index) - thickness / 2.0;
        let right = self.stack_z(h);
        (right, 180.0 + right)
    }

    /// Coil-side x of a resting right-stack paper at `index`.
    fn paper_x(&self, index: usize, thickness: f32) -> f32 {
        let (right, _) = self.stack_angles(index, thickness);
        let p = spine_point(right, self.loop_radius) + Vec3::NEG_X * self.hole_offset(index, thickness);
        p.x
    }

    fn rotation(&self, t: f32) -> f32 {
        if self.stack.align_to_ground {
            lerp(self.paper_z_angle, -self.paper_z_angle, t)
        } else {
            0.0
        }
    }
}

impl BookBound for WireBound {
    fn validate(stack: &StackInfo) -> Result<(), BookError> {
        if stack.total_thickness > stack.min_paper_width * 4.0 {
            return Err(BookError::BookHeight);
        }
        Ok(())
    }

    fn use_shared_mesh_data_for_lowpoly(&self) -> bool {
        true
    }

    fn binder_mesh(&self) -> &BinderMesh {
        &self.mesh
    }

    fn binder_transform(&self) -> Affine3A {
        Affine3A::from_translation(Vec3::new(
            0.0,
            0.0,
            self.wire_margin + self.stack.page_margin + self.stack.cover_margin,
        ))
    }

    fn binder_color(&self) -> Color {
        self.color
    }

    fn create_pattern(&self, request: &PatternRequest) -> PaperPattern {
        let size = request.size;
        let thickness = request.thickness;
        let hole_count = self.twin_loop_count;
        let gap = self.gap;

        let mut corner0 = self.wire_thickness * 2.0;
        let mut corner1 = self.twin_loop_space;
        let mut base_radius = self.wire_thickness / 2.0;
        let margin_z = (size.y - (hole_count as f32 * (corner0 + corner1) * 2.0 + gap * (hole_count - 1) as f32)) / 2.0;
        corner0 -= base_radius * 2.0;
        corner1 += base_radius * 2.0;

        base_radius = base_radius.max(thickness / 2.0);
        let x1 = base_radius * 2.0;

        let h = self.stack_height / 2.0;
        let h0 = h - thickness;
        let r0 = self.loop_radius + self.wire_thickness / 2.0;
        let r1 = self.loop_radius - self.wire_thickness / 2.0;
        let vx0 = (r0 * r0 - h0 * h0).max(0.0).sqrt();
        let vx1 = (r1 * r1 - h * h).max(0.0).sqrt();
        let x2 = x1 + (vx0 - vx1);

        let quality = request.quality as f32 / 5.0;
        let s = size.x.min(size.y) / 60.0;
        let x_space_count = lerp(0.0, (size.x - x2) / s, quality) as usize;
        let z_space_count = lerp(0.0, (gap + corner0 * 2.0) / s, quality) as usize;
        let z_hole_count = lerp(0.0, (corner1 * 2.0) / s, quality) as usize;
        let z_edge_count = lerp(0.0, (corner0 + margin_z) / s, quality) as usize;

        let mut arena = NodeArena::new();

        // x: spine edge, punched column, then on to the outer edge
        let x_root = arena.create(0.0, false, false);
        let x_hole = arena.create_next(x_root, x1, true, false);
        let mut current = arena.create_next(x_hole, x2, false, false);
        let x_step = (size.x - x2) / (x_space_count + 1) as f32;
        let mut value = x2 + x_step;
        for _ in 0..x_space_count {
            current = arena.create_next(current, value, false, false);
            value += x_step;
        }
        arena.create_next(current, size.x, false, false);

        // z: edge space, then a hole and a space per twin loop
        let z_root = arena.create(0.0, false, false);
        let mut z_holes = Vec::with_capacity(hole_count);
        let edge_step = (corner0 + margin_z) / (z_edge_count + 1) as f32;
        let space_step = (corner0 * 2.0 + gap) / (z_space_count + 1) as f32;
        let hole_step = (corner1 * 2.0) / (z_hole_count + 1) as f32;

        let mut current = z_root;
        let mut value = 0.0;
        let mut step = |arena: &mut NodeArena, current: &mut _, delta: f32, hole: bool| {
            value += delta;
            *current = arena.create_next(*current, value, hole, false);
        };
        for _ in 0..z_edge_count + 1 {
            step(&mut arena, &mut current, edge_step, false);
        }
        for k in 0..hole_count {
            if k > 0 {
                for _ in 0..z_space_count + 1 {
                    step(&mut arena, &mut current, space_step, false);
                }
            }
            arena.get_mut(current).hole = true;
            z_holes.push(current);
            for _ in 0..z_hole_count + 1 {
                step(&mut arena, &mut current, hole_step, true);
            }
            arena.get_mut(current).hole = false;
        }
        for _ in 0..z_edge_count + 1 {
            step(&mut arena, &mut current, edge_step, false);
        }

        let mut margin = request.uv_margin;
        if request.reduce_overdraw {
            let i = if self.stack.has_cover { self.stack.first_page_paper_index } else { 0 };
            let w = thickness.max(0.01);
            let o = self.paper_x(i + 1, thickness) - self.paper_x(i, thickness);
            margin.left = (x2 + 0.01 + o) / size.x;
            margin.right = (o + w) / size.x;
            margin.down = w / size.y;
            margin.up = w / size.y;
        }

        let node_margin = NodeMargin::new(&mut arena, size, &margin, false);
        let (mut x_seam_nodes, mut z_seam_nodes) = (Vec::new(), Vec::new());
        node_margin.insert(&mut arena, x_root, z_root, &mut x_seam_nodes, &mut z_seam_nodes);
        arena.update_indices(x_root);
        arena.update_indices(z_root);

        let mut pattern = PaperPattern {
            size,
            thickness,
            x_seams: seam_nodes_to_seams(&arena, &x_seam_nodes),
            z_seams: seam_nodes_to_seams(&arena, &z_seam_nodes),
            ..Default::default()
        };

        let xs = arena.values(x_root);
        let zs = arena.values(z_root);
        let x_holes = arena.holes(x_root);
        let z_holes_mask = arena.holes(z_root);
        let (nx, nz) = (xs.len(), zs.len());

        let mut builder = PatternBuilder::new(&xs, &zs, size, &request.uv_margin, self.stack.direction);
        builder.add_border(PaperBorder::new(0, 0, nx - 1, nz - 1, false, true));

        let mut x_cut = (arena.get(node_margin.left).index, arena.get(node_margin.right).index);
        let mut z_cut = (arena.get(node_margin.down).index, arena.get(node_margin.up).index);
        if x_cut.1 == 0 {
            x_cut.1 = nx - 1;
        }
        if z_cut.1 == 0 {
            z_cut.1 = nz - 1;
        }

        for z in 0..nz - 1 {
            for x in 0..nx - 1 {
                if request.reduce_overdraw && (z_cut.0..z_cut.1).contains(&z) && (x_cut.0..x_cut.1).contains(&x) {
                    continue;
                }
                builder.add_weight(x, z);
                if x_holes[x] && z_holes_mask[z] {
                    continue;
                }
                builder.add_faces(x, z);
            }
        }

        let hole_x = arena.get(x_hole).index;
        let hole_x_end = arena.next_none_hole(x_hole).map_or(hole_x + 1, |id| arena.get(id).index);
        for &z_hole in &z_holes {
            let start = arena.get(z_hole).index;
            let end = arena.next_none_hole(z_hole).map_or(start + 1, |id| arena.get(id).index);
            builder.add_border(PaperBorder::new(hole_x, start, hole_x_end, end, true, true));
        }
        builder.finish(&mut pattern, request.reduce_sub_meshes);

        pattern.base_x = xs;
        pattern.base_z = zs;
        pattern
    }

    fn reset_paper_position(&self, papers: &mut [Paper], index: usize) {
        let paper = &papers[index];
        let (right, left) = self.stack_angles(index, paper.thickness());
        let t = if paper.is_flipped() { 1.0 } else { 0.0 };
        let direction = if paper.is_flipped() { Vec3::X } else { Vec3::NEG_X };

        let mut p = spine_point(lerp(right, left, t), self.loop_radius);
        p += direction * self.hole_offset(index, paper.thickness());
        p.z = paper.margin();
        let rotation = self.rotation(t);
        papers[index].set_pose(p, rotation);
    }

    fn update_paper_position(&self, papers: &mut [Paper], index: usize) {
        let paper = &mut papers[index];
        let (right, left) = self.stack_angles(index, paper.thickness());

        paper.update_time();
        let t = paper.z_time();
        let curve = AnimationCurve::new(vec![
            Keyframe::new(0.0, right),
            Keyframe::new(0.5, 90.0),
            Keyframe::new(1.0, left),
        ]);

        let mut p = spine_point(curve.evaluate(t), self.loop_radius);
        p += paper.direction() * self.hole_offset(index, paper.thickness());

        let flipped = paper.is_flipped();
        let min_y = spine_point(if flipped { left } else { right }, self.loop_radius).y;
        if (flipped && t > 0.5) || (!flipped && t < 0.5) {
            p.y = p.y.max(min_y);
        }
        p.z = paper.margin();
        paper.set_pose(p, self.rotation(t));
    }

    fn on_late_update(&mut self, _papers: &mut [Paper], _pools: &mut MeshPools) -> MeshRefresh {
        MeshRefresh::Moving
    }

    fn root_position(&self, _papers: &[Paper], current: Vec3) -> Vec3 {
        Vec3::new(0.0, self.loop_radius + self.wire_thickness / 2.0, current.z)
    }
}

/// Fit the twin loops into the paper height, dropping loops and then
/// shrinking the twin space until they fit.
fn coil_layout(wire: &WireSetup, paper_height: f32) -> CoilLayout {
    let thickness = wire.thickness;
    let corner0 = thickness * 2.0;
    let mut corner1 = lerp(thickness * 0.5, thickness * 1.5, wire.twin_loop_space);

    let margin = lerp(0.0, (paper_height - (corner0 + corner1) * 4.0) / 2.0, wire.margin).max(0.0);
    let length = paper_height - margin * 2.0;

    let mut count = (wire.twin_loop_count as usize).max(2);
    let gap_for = |count: usize, corner1: f32| (length - (corner0 + corner1) * 2.0 * count as f32) / (count - 1) as f32;
    let mut gap = gap_for(count, corner1);
    while gap < 0.0 && count > 2 {
        count -= 1;
        gap = gap_for(count, corner1);
    }
    while gap < 0.0 && corner1 > 1e-6 {
        corner1 *= 0.99;
        gap = gap_for(count, corner1);
    }

    CoilLayout {
        margin,
        twin_loop_space: corner1,
        twin_loop_count: count,
        gap: gap.max(0.0),
    }
}

/// Build the coil: one tube running around every twin loop, capped at both
/// ends.
fn wire_mesh(wire: &WireSetup, radius: f32, layout: &CoilLayout) -> BinderMesh {
    let quality = wire.quality as f32 / 5.0;
    let base_count = lerp(4.0, 20.0, quality) as usize;
    let corner_count0 = lerp(4.0, 10.0, quality) as usize;
    let corner_count1 = lerp(3.0, 10.0, quality) as usize;
    let circle_count = lerp(10.0, 50.0, quality) as usize;

    let corner0 = wire.thickness * 2.0;
    let corner1 = layout.twin_loop_space;
    let width = corner0 + corner1;
    let base_radius = wire.thickness / 2.0;
    let center = Vec3::new(0.0, radius, 0.0);

    let circle: Vec<Vec3> = (0..base_count)
        .map(|i| rot_z(90.0 - i as f32 * (360.0 / base_count as f32)) * Vec3::X)
        .collect();

    let mut mesh = BinderMesh::default();

    // start cap
    for &dir in &circle {
        mesh.positions.push(dir * base_radius - center);
        mesh.normals.push(Vec3::NEG_Z);
    }
    for i in 2..base_count {
        mesh.indices.extend([0, i - 1, i].map(|v| v as u32));
    }

    // one loop unrolled onto a strip: x runs along the circumference
    let height = 2.0 * radius * PI;
    let mut points = Vec::with_capacity((corner_count0 + circle_count + corner_count1) * 2);
    for i in 0..corner_count0 {
        let t = i as f32 / (corner_count0 - 1) as f32;
        let mut p = rot_y(lerp(-90.0, 0.0, t)) * Vec3::new(0.0, 0.0, corner0);
        p.x += corner0;
        points.push(p);
    }
    for i in 0..circle_count {
        let t = (i + 1) as f32 / (circle_count + 1) as f32;
        points.push(Vec3::new(lerp(corner0, height - corner1, t), 0.0, corner0));
    }
    for i in 0..corner_count1 {
        let t = i as f32 / (corner_count1 - 1) as f32;
        let mut p = rot_y(lerp(180.0, 90.0, t)) * Vec3::new(0.0, 0.0, corner1);
        p.z += width;
        p.x += height - corner1;
        points.push(p);
    }

    // wrap the strip around the coil
    for p in &mut points {
        let z = (p.x / radius).to_degrees() - 90.0;
        let mut v = rot_z(z) * Vec3::new(radius, 0.0, 0.0);
        v.y += radius;
        v.z = p.z;
        *p = v;
    }

    // second half of the twin loop
    let l = points.len();
    for i in 1..l {
        let mut v = points[l - i - 1];
        v.z = width * 2.0 - v.z;
        points.push(v);
    }

    let n = points.len();
    let mut ring = Vec::with_capacity(n * base_count);
    let mut ring_normals = Vec::with_capacity(n * base_count);
    for i in 0..n {
        let current = points[i];
        let forward = if i == 0 || i == n - 1 {
            Vec3::Z
        } else {
            let prev = points[loop_index::prev(i, n)];
            let next = points[loop_index::next(i, n)];
            ((current - prev).normalize_or_zero() + (next - current).normalize_or_zero()) / 2.0
        };
        let up = -(Vec3::new(current.x, current.y, 0.0) - Vec3::new(center.x, center.y, 0.0));
        let q = if forward == Vec3::ZERO { Quat::IDENTITY } else { look_rotation(forward, up) };

        for &dir in &circle {
            let normal = q * dir;
            ring.push(current + normal * base_radius - center);
            ring_normals.push(normal);
        }
    }

    let loop_step = Vec3::new(0.0, 0.0, width * 2.0 + layout.gap);
    for k in 0..layout.twin_loop_count {
        let offset = loop_step * k as f32;
        mesh.positions.extend(ring.iter().map(|&v| v + offset));
        mesh.normals.extend_from_slice(&ring_normals);
    }

    let rings = n * layout.twin_loop_count;
    for i in 0..rings.saturating_sub(1) {
        let current = base_count + i * base_count;
        let next = base_count + (i + 1) * base_count;
        for j in 0..base_count {
            let jn = loop_index::next(j, base_count);
            let (a, b, c, d) = (current + j, current + jn, next + jn, next + j);
            mesh.indices.extend([a, d, b, b, d, c].map(|v| v as u32));
        }
    }

    // end cap
    let offset = mesh.positions.len();
    let end_z = (layout.twin_loop_count - 1) as f32 * (width * 2.0 + layout.gap) + width * 2.0;
    for &dir in &circle {
        let mut p = dir * base_radius;
        p.z = end_z;
        mesh.positions.push(p - center);
        mesh.normals.push(Vec3::Z);
    }
    for i in 2..base_count {
        mesh.indices.extend([offset, offset + i, offset + i - 1].map(|v| v as u32));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::binding::tests::papers;
    use crate::pattern::SubMeshes;

    fn bound(count: usize) -> (WireBound, Vec<Paper>) {
        let mut papers = papers(count, true);
        let stack = StackInfo::measure(&papers, true, 1);
        let bound = WireBound::new(&WireBindingSetup::default(), stack, &mut papers).unwrap();
        (bound, papers)
    }

    fn request(reduce_overdraw: bool) -> PatternRequest {
        PatternRequest {
            quality: 2,
            size: Vec2::new(2.0, 3.0),
            thickness: 0.02,
            uv_margin: Default::default(),
            reduce_overdraw,
            reduce_sub_meshes: false,
        }
    }

    #[test]
    fn test_coil_layout_fits_paper() {
        let layout = coil_layout(&WireSetup::default(), 3.0);
        assert_eq!(layout.twin_loop_count, 4);
        let used = layout.margin * 2.0
            + (0.1 + layout.twin_loop_space) * 2.0 * 4.0
            + layout.gap * 3.0;
        assert!((used - 3.0).abs() < 1e-4);

        // a short paper drops loops
        let layout = coil_layout(&WireSetup::default(), 1.0);
        assert!(layout.twin_loop_count < 4);
        assert!(layout.gap >= 0.0);
    }

    #[test]
    fn test_resting_papers_stack_on_coil() {
        let (bound, papers) = bound(6);
        assert!(bound.use_shared_mesh_data_for_lowpoly());
        for pair in papers.windows(2) {
            assert!(pair[0].position().y > pair[1].position().y);
        }
        // pages sit inside the cover heights
        assert!((papers[2].position().z - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_update_matches_reset_at_rest() {
        let (bound, mut papers) = bound(6);
        let rest: Vec<_> = papers.iter().map(|p| (p.position(), p.rotation_z())).collect();
        for i in 0..papers.len() {
            bound.update_paper_position(&mut papers, i);
        }
        for (paper, (position, rotation)) in papers.iter().zip(rest) {
            assert!(paper.position().abs_diff_eq(position, 1e-4));
            assert!((paper.rotation_z() - rotation).abs() < 1e-4);
        }
    }

    #[test]
    fn test_flipped_paper_rests_on_left() {
        let mut papers = papers(6, true);
        papers[0].set_flipped(true);
        let stack = StackInfo::measure(&papers, true, 1);
        let bound = WireBound::new(&WireBindingSetup::default(), stack, &mut papers).unwrap();
        // the hole side of a flipped paper lies left of the spine
        assert!(papers[0].position().x < 0.0);
        assert!(papers[1].position().x > 0.0);
        let mut rest = papers.clone();
        bound.update_paper_position(&mut rest, 0);
        assert!(rest[0].position().abs_diff_eq(papers[0].position(), 1e-4));
        assert_eq!(bound.root_position(&papers, Vec3::ONE).z, 1.0);
    }

    #[test]
    fn test_root_lifts_coil_off_ground() {
        let (bound, papers) = bound(4);
        let root = bound.root_position(&papers, Vec3::ZERO);
        assert!((root.y - (bound.loop_radius() + 0.025)).abs() < 1e-6);
    }

    #[test]
    fn test_wire_mesh_is_closed_tube() {
        let (bound, _) = bound(6);
        let mesh = bound.binder_mesh();
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_pattern_punches_holes() {
        let (bound, _) = bound(6);
        let pattern = bound.create_pattern(&request(false));
        assert!(pattern.validate().is_ok());
        assert_eq!(pattern.borders.len(), 1 + bound.twin_loop_count());
        assert!(pattern.borders[1..].iter().all(|b| b.flip));

        let SubMeshes::Split { front, .. } = &pattern.triangles else {
            panic!("expected split sub-meshes");
        };
        let quads = (pattern.nx() - 1) * (pattern.nz() - 1);
        assert!(front.len() < quads * 6);
        assert_eq!(pattern.base_x_offset, 0.0);
    }

    #[test]
    fn test_reduce_overdraw_pattern() {
        let (bound, _) = bound(8);
        let pattern = bound.create_pattern(&request(true));
        assert!(pattern.validate().is_ok());
        assert!(!pattern.x_seams.is_empty());
        assert!(pattern.weights.iter().any(|&w| w == 0));
    }
}
