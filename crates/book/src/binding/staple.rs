//! Saddle-stitch binding.
//!
//! All papers are folded around the staples: the front half of the stack
//! lies on the right, the back half on the left, and a fan of papers wraps a
//! circle of [`StapleBound::binding_radius`] around the spine. Resting papers
//! are shortened by that radius; their binding-side columns are bent onto a
//! Bezier curve towards the staple every frame.

use glam::{Affine3A, Quat, Vec3};
use tracing::debug;

use folio_config::{Color, StapleBindingSetup, StapleSetup};

use super::{spine_point, BinderMesh, BookBound, MeshRefresh, PatternRequest, StackInfo};
use crate::error::BookError;
use crate::geometry::{atan2_degrees, bezier, inverse_lerp, lerp, look_rotation, loop_index, rot_y, rot_z};
use crate::paper::Paper;
use crate::pattern::{seam_nodes_to_seams, NodeArena, NodeMargin, PaperBorder, PaperPattern, PatternBuilder};
use crate::pool::MeshPools;

/// Angle of the outermost papers at the spine
const BINDING_ANGLE: f32 = 45.0;

#[derive(Debug, Clone)]
pub struct StapleBound {
    stack: StackInfo,
    color: Color,
    mesh: BinderMesh,

    staple_margin: f32,
    staple_thickness: f32,
    binding_radius: f32,
    binding_mid_space: f32,
    /// Paper stack plus the space taken by the staple in the middle
    stack_height: f32,
    binding_vertex_count: usize,

    binder_position: Vec3,
    binder_rotation_z: f32,
}

impl StapleBound {
    pub fn new(setup: &StapleBindingSetup, stack: StackInfo, papers: &mut [Paper]) -> Result<Self, BookError> {
        Self::validate(&stack)?;

        let staple = &setup.staple;
        let staple_thickness = staple.thickness;
        let binding_mid_space = staple_thickness * 1.75;
        let binding_radius = ((stack.total_thickness + binding_mid_space) / 2.0) / BINDING_ANGLE.to_radians().sin();

        let first_thickness = stack.thicknesses.first().copied().unwrap_or(0.0);
        let (mesh, staple_margin) = staple_mesh(staple, &stack, first_thickness);

        let mut bound = Self {
            color: staple.color,
            mesh,
            staple_margin,
            staple_thickness,
            binding_radius,
            binding_mid_space,
            stack_height: stack.total_thickness + binding_mid_space,
            binding_vertex_count: setup.quality as usize + 1,
            binder_position: Vec3::new(0.0, 0.0, staple_margin + stack.page_margin + stack.cover_margin),
            binder_rotation_z: 0.0,
            stack,
        };
        debug!(
            radius = bound.binding_radius,
            margin = bound.staple_margin,
            "Staple binding created"
        );

        let min_turning_radius = bound.binding_radius.max(bound.stack.cover_thickness);
        for i in 0..papers.len() {
            let paper = &mut papers[i];
            let mut size = paper.size();
            size.x -= bound.binding_radius;
            paper.set_size(size);
            paper.set_size_x_offset(bound.binding_radius);
            paper.set_min_turning_radius(min_turning_radius);
            paper.update_turning_radius(1.0);
            bound.update_paper_position(papers, i);
        }
        bound.binder_rotation_z = 0.0;
        Ok(bound)
    }

    pub fn binding_radius(&self) -> f32 {
        self.binding_radius
    }

    pub fn stack_height(&self) -> f32 {
        self.stack_height
    }

    /// Stack height from `start` to the back, plus the middle space for papers
    /// of the front half.
    fn stack_height_from(&self, start: usize) -> f32 {
        let h = self.stack.stack_height(start);
        if start < self.stack.paper_count() / 2 { h + self.binding_mid_space } else { h }
    }

    /// Angle around the spine of a paper resting at stack height `h`.
    fn stack_z(&self, h: f32) -> f32 {
        let h = h.clamp(0.0, self.stack_height) - self.stack_height * 0.5;
        (h / self.binding_radius).asin().to_degrees()
    }

    /// Spine-side x of a resting paper at `index`.
    fn paper_x(&self, index: usize, thickness: f32) -> f32 {
        let h = self.stack_height_from(index) - thickness / 2.0;
        spine_point(self.stack_z(h), self.binding_radius).x
    }

    /// Thickness moved to the left stack so far, refreshing every paper's time.
    fn turned_thickness(&self, papers: &mut [Paper]) -> f32 {
        let n = papers.len();
        let mid0 = (n / 2).checked_sub(1);
        let mid1 = n / 2;
        let mut th = 0.0;
        for (j, paper) in papers.iter_mut().enumerate() {
            paper.update_time();
            let z_time = paper.z_time();
            th += z_time * paper.thickness();
            if Some(j) == mid0 {
                th += z_time * self.binding_mid_space / 2.0;
            }
            if j == mid1 {
                th += z_time * self.binding_mid_space / 2.0;
            }
        }
        th
    }

    /// Rotation of a paper about the spine: the two halves fan out from the
    /// middle space and, on the ground, tilt with the turned thickness.
    fn paper_rotation(&self, papers: &[Paper], index: usize, th: f32, t: f32) -> f32 {
        let n = papers.len();
        let half_angle = |w: f32, h: f32| ((w * w - h * h).sqrt() / w).asin().to_degrees() - 90.0;

        let z2 = half_angle(papers[n / 2].size().x, self.binding_mid_space);
        let w = papers[0].size().x;
        let mid_h = self.stack_height / 2.0;

        if index < n / 2 {
            let z3 = if self.stack.align_to_ground {
                half_angle(w, th.clamp(0.0, mid_h) - mid_h) * 2.0
            } else {
                0.0
            };
            lerp(z2, -z3, t)
        } else {
            let z3 = if self.stack.align_to_ground {
                half_angle(w, mid_h - th.clamp(mid_h, mid_h * 2.0)) * 2.0
            } else {
                0.0
            };
            lerp(z3, -z2, t)
        }
    }

    fn place(&self, papers: &mut [Paper], index: usize, z: f32, th: f32, t: f32) {
        let mut p = spine_point(z, self.binding_radius);
        p.z = papers[index].margin();
        let rotation = self.paper_rotation(papers, index, th, t);
        papers[index].set_pose(p, rotation);
    }

    /// Bend the binding-side columns of every paper onto the staple.
    fn update_binding_vertices(&mut self, papers: &[Paper], pools: &mut MeshPools) {
        let n = papers.len();
        let half = (n / 2).max(1) as f32;
        let staple_thickness = self.staple_thickness * 0.5;
        let cover_thickness = papers[0].thickness();
        let last_x = self.binding_vertex_count + 1;

        let mut staple_direction = Vec3::ZERO;
        let mut binding_normal = Vec3::ZERO;

        for (i, paper) in papers.iter().enumerate() {
            let (Some(pattern), Some(data)) = (paper.pattern().cloned(), paper.mesh_data()) else {
                continue;
            };
            let thickness = paper.thickness();
            let local_position = paper.position();

            let (sheet_index, normal_mul) = if i >= n / 2 {
                (n - i - 1, -staple_thickness)
            } else {
                (i, staple_thickness)
            };
            let direction_mul = (cover_thickness + thickness) * 0.5 + thickness * (sheet_index as f32 - 1.0);
            let to_paper = paper.local_matrix().inverse();
            let binding_radius = self.binding_radius * lerp(0.45, 0.65, 1.0 - sheet_index as f32 / half);

            for (iz, &z) in pattern.base_z.iter().enumerate() {
                let mut a = Vec3::new(0.0, 0.0, local_position.z + z);
                let c = local_position + Vec3::new(0.0, 0.0, z);
                let b = c + paper.direction_at(z) * binding_radius;

                if i == 0 && iz == 0 {
                    let last = &papers[n - 1];
                    let c2 = last.position() + Vec3::new(0.0, 0.0, z);
                    let b2 = c2 + last.direction_at(z) * binding_radius;
                    binding_normal = (b - b2).normalize_or_zero();
                    staple_direction = -Vec3::new(-binding_normal.y, binding_normal.x, 0.0).normalize_or_zero();
                    self.binder_rotation_z = atan2_degrees(Vec3::ZERO, staple_direction);
                }

                if sheet_index > 0 {
                    a += staple_direction * direction_mul;
                }

                let Some(data) = pools.data_mut(data) else {
                    break;
                };
                let base = data.base_vertices_mut();
                let row = iz * pattern.nx();
                base[row] = to_paper.transform_point3(a);

                a += binding_normal * normal_mul;
                let (a, b, c) = (
                    to_paper.transform_point3(a),
                    to_paper.transform_point3(b),
                    to_paper.transform_point3(c),
                );

                let columns = &pattern.x_none_seam_indices;
                if let Some(&x1) = columns.get(1) {
                    base[row + x1] = a;
                }
                for ix in 2..last_x {
                    let Some(&x) = columns.get(ix) else {
                        break;
                    };
                    let t = inverse_lerp(1.0, last_x as f32, ix as f32);
                    base[row + x] = bezier::quadratic(a, b, c, t);
                }
            }
        }
    }
}

impl BookBound for StapleBound {
    fn validate(stack: &StackInfo) -> Result<(), BookError> {
        if stack.total_thickness * 1.25 > stack.min_paper_width {
            return Err(BookError::BookHeight);
        }
        Ok(())
    }

    fn use_shared_mesh_data_for_lowpoly(&self) -> bool {
        false
    }

    fn binder_mesh(&self) -> &BinderMesh {
        &self.mesh
    }

    fn binder_transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(rot_z(self.binder_rotation_z), self.binder_position)
    }

    fn binder_color(&self) -> Color {
        self.color
    }

    fn create_pattern(&self, request: &PatternRequest) -> PaperPattern {
        let size = request.size;
        let radius = self.binding_radius;
        let binding_count = self.binding_vertex_count;

        let quality = request.quality as f32 / 5.0;
        let s = size.x.min(size.y) / 60.0;
        let main_count = lerp(0.0, (size.x - radius) / s, quality) as usize;
        let z_count = lerp(0.0, size.y / s, quality) as usize;

        let nx = 2 + main_count + 1 + binding_count;
        let nz = 2 + z_count;

        let mut arena = NodeArena::new();

        // x runs 0, 0, .., radius in the binding area, then on to the edge
        let x_root = arena.create(0.0, false, false);
        let mut current = x_root;
        let mut value = 0.0;
        let step = radius / binding_count as f32;
        for _ in 1..binding_count + 1 {
            current = arena.create_next(current, value, false, false);
            value += step;
        }
        let step = (size.x - radius) / (main_count + 1) as f32;
        for _ in binding_count + 1..nx {
            current = arena.create_next(current, value, false, false);
            value += step;
        }

        let z_root = arena.create(0.0, false, false);
        let mut current = z_root;
        let step = size.y / (nz - 1) as f32;
        let mut value = 0.0;
        for _ in 0..nz - 1 {
            value += step;
            current = arena.create_next(current, value, false, false);
        }

        let mut margin = request.uv_margin;
        if request.reduce_overdraw {
            let i = if self.stack.has_cover { self.stack.first_page_paper_index } else { 0 };
            let w = request.thickness.max(0.01);
            let o = self.paper_x(i + 1, request.thickness) - self.paper_x(i, request.thickness);
            margin.left = 0.0;
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
            thickness: request.thickness,
            base_x_offset: -radius,
            x_seams: seam_nodes_to_seams(&arena, &x_seam_nodes),
            z_seams: seam_nodes_to_seams(&arena, &z_seam_nodes),
            ..Default::default()
        };

        let mut current = Some(x_root);
        for _ in 0..binding_count + 2 {
            let Some(id) = current else {
                break;
            };
            pattern.x_none_seam_indices.push(arena.get(id).index);
            current = arena.next_none_seam(id);
        }

        let xs = arena.values(x_root);
        let zs = arena.values(z_root);
        let (nx, nz) = (xs.len(), zs.len());

        let mut x_hole = (arena.get(node_margin.left).index, arena.get(node_margin.right).index);
        let mut z_hole = (arena.get(node_margin.down).index, arena.get(node_margin.up).index);
        if x_hole.1 == 0 {
            x_hole.1 = nx - 1;
        }
        if z_hole.1 == 0 {
            z_hole.1 = nz - 1;
        }

        let mut builder = PatternBuilder::new(&xs, &zs, size, &request.uv_margin, self.stack.direction);
        for z in 0..nz - 1 {
            for x in 0..nx - 1 {
                if request.reduce_overdraw && (z_hole.0..z_hole.1).contains(&z) && (x_hole.0..x_hole.1).contains(&x) {
                    continue;
                }
                builder.add_weight(x, z);
                builder.add_faces(x, z);
            }
        }
        builder.add_border(PaperBorder::new(0, 0, nx - 1, nz - 1, false, false));
        builder.finish(&mut pattern, request.reduce_sub_meshes);

        pattern.base_x = xs;
        pattern.base_z = zs;
        pattern
    }

    fn reset_paper_position(&self, papers: &mut [Paper], index: usize) {
        let th = self.turned_thickness(papers);
        let paper = &papers[index];
        let h = self.stack_height_from(index) - paper.thickness() / 2.0;
        let right = self.stack_z(h);
        let left = 180.0 + right;
        let t = if paper.is_flipped() { 1.0 } else { 0.0 };
        self.place(papers, index, lerp(right, left, t), th, t);
    }

    fn update_paper_position(&self, papers: &mut [Paper], index: usize) {
        let th = self.turned_thickness(papers);
        let paper = &papers[index];
        let h = self.stack_height_from(index) - paper.thickness() / 2.0;
        let right = self.stack_z(h + th);
        let left = 180.0 + self.stack_z(h + th - self.stack_height);
        let t = paper.z_time();
        self.place(papers, index, lerp(right, left, t), th, t);
    }

    fn on_late_update(&mut self, papers: &mut [Paper], pools: &mut MeshPools) -> MeshRefresh {
        for i in 0..papers.len() {
            self.update_paper_position(papers, i);
        }
        self.update_binding_vertices(papers, pools);
        MeshRefresh::All
    }

    fn root_position(&self, papers: &[Paper], current: Vec3) -> Vec3 {
        let (Some(first), Some(last)) = (papers.first(), papers.last()) else {
            return current;
        };
        let h = -first.position().y.min(last.position().y) + first.thickness() / 2.0;
        Vec3::new(0.0, h, current.z)
    }
}

/// Build the staple tubes. Returns the mesh and the staple margin.
///
/// One staple is a tube swept along its leg, corner and crown, mirrored
/// across the crown center and repeated along the spine.
fn staple_mesh(staple: &StapleSetup, stack: &StackInfo, first_thickness: f32) -> (BinderMesh, f32) {
    let thickness = staple.thickness;
    let crown = staple.crown.max(thickness * 4.0);

    let min_margin = thickness * 0.5;
    let max_margin = (stack.min_paper_height / 2.0 - crown - min_margin).max(min_margin);
    let margin = lerp(min_margin, max_margin, staple.margin);

    let length = stack.min_paper_height - margin * 2.0;
    let mut count = staple.count.max(2);
    let space_for = |count: u32| ((length - crown * count as f32) / (count - 1) as f32).max(0.0);
    let mut space = space_for(count);
    while space < thickness * 2.0 && count > 2 {
        count -= 1;
        space = space_for(count);
    }

    let quality = staple.quality as f32 / 5.0;
    let base_count = lerp(4.0, 20.0, quality) as usize;
    let corner_count0 = lerp(4.0, 10.0, quality) as usize;
    let corner_count1 = lerp(3.0, 10.0, quality) as usize;
    let base_radius = thickness / 2.0;
    let teeth_h = base_radius * 2.5;
    let corner_radius0 = base_radius;
    let corner_radius1 = (crown / 2.0 * 0.9).max(corner_radius0 * 2.0);
    let leg = stack.total_thickness / 2.0 + base_radius;
    let x_offset = -(first_thickness / 2.0 + base_radius);

    let mut points = Vec::with_capacity(corner_count0 + corner_count1);
    for i in 0..corner_count0 {
        let t = i as f32 / (corner_count0 - 1) as f32;
        let mut p = rot_y(lerp(-90.0, -180.0, t)) * Vec3::new(0.0, 0.0, corner_radius0);
        p.x += corner_radius0 + x_offset;
        p.z += corner_radius0;
        points.push(p);
    }
    let a = Vec3::new(leg, 0.0, 0.0);
    let b = Vec3::new(leg + teeth_h * 0.75, 0.0, 0.0);
    let c = Vec3::new(leg - base_radius * 0.5, 0.0, corner_radius1);
    for i in 0..corner_count1 {
        let t = i as f32 / (corner_count1 - 1) as f32;
        let mut p = bezier::quadratic(a, b, c, t);
        p.x += x_offset;
        points.push(p);
    }
    points.reverse();

    let circle: Vec<Vec3> = (0..base_count)
        .map(|i| {
            let mut v = rot_z(90.0 - i as f32 * (360.0 / base_count as f32)) * Vec3::X;
            v.x *= 0.75;
            v
        })
        .collect();

    let n = points.len();
    let n3 = n * base_count;
    let mut vertices = vec![Vec3::ZERO; n3 * 2];
    let mut normals = vec![Vec3::ZERO; n3 * 2];
    let mut w = 0;
    for i in 0..n {
        let current = points[i];
        let forward = if i == 0 {
            Vec3::new(1.0, 0.0, -2.0).normalize()
        } else if i == n - 1 {
            Vec3::Z
        } else {
            let prev = points[loop_index::prev(i, n)];
            let next = points[loop_index::next(i, n)];
            ((current - prev).normalize_or_zero() + (next - current).normalize_or_zero()) / 2.0
        };
        let q = if forward == Vec3::ZERO { Quat::IDENTITY } else { look_rotation(forward, Vec3::Y) };

        // the leg tip tapers
        let taper = lerp(0.1, 1.0, inverse_lerp(0.0, corner_count1 as f32 / 4.0, i as f32)).sqrt();

        let ring = w;
        for (j, &dir) in circle.iter().enumerate() {
            let normal = q * dir * taper;
            let vertex = current + normal * base_radius;
            vertices[w] = vertex;
            normals[w] = normal;

            let mirrored = n3 * 2 - (ring + base_count - j - 1) - 1;
            vertices[mirrored] = Vec3::new(vertex.x, vertex.y, crown - vertex.z);
            normals[mirrored] = Vec3::new(normal.x, normal.y, -normal.z);
            w += 1;
        }
    }

    let mut indices = Vec::with_capacity((n * 2 - 1) * base_count * 6);
    for i in 0..n * 2 - 1 {
        let current = i * base_count;
        let next = (i + 1) * base_count;
        for j in 0..base_count {
            let jn = loop_index::next(j, base_count);
            let (a, b, c, d) = (current + j, current + jn, next + jn, next + j);
            indices.extend([a, d, b, b, d, c].map(|v| v as u32));
        }
    }

    let mut mesh = BinderMesh::default();
    for k in 0..count {
        let offset = Vec3::new(0.0, 0.0, (space + crown) * k as f32);
        let base = mesh.positions.len() as u32;
        mesh.positions.extend(vertices.iter().map(|&v| v + offset));
        mesh.normals.extend_from_slice(&normals);
        mesh.indices.extend(indices.iter().map(|&i| i + base));
    }
    (mesh, margin)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::binding::tests::papers;

    fn bound(count: usize) -> (StapleBound, Vec<Paper>) {
        let mut papers = papers(count, true);
        let stack = StackInfo::measure(&papers, true, 1);
        let bound = StapleBound::new(&StapleBindingSetup::default(), stack, &mut papers).unwrap();
        (bound, papers)
    }

    #[test]
    fn test_papers_shortened_by_binding_radius() {
        let (bound, papers) = bound(6);
        let r = bound.binding_radius();
        assert!(r > 0.0);
        assert!((papers[1].size().x - (2.0 - r)).abs() < 1e-5);
        assert!((papers[1].size_x_offset() - r).abs() < 1e-6);
    }

    #[test]
    fn test_resting_papers_fan_around_spine() {
        let (bound, papers) = bound(6);
        for paper in &papers {
            let distance = Vec2::new(paper.position().x, paper.position().y).length();
            assert!((distance - bound.binding_radius()).abs() < 1e-4);
        }
        // front half on top
        assert!(papers[0].position().y > papers[5].position().y);
    }

    #[test]
    fn test_root_keeps_lowest_paper_on_ground() {
        let (bound, papers) = bound(6);
        let root = bound.root_position(&papers, Vec3::new(0.0, 0.0, 0.5));
        let lowest = papers[0].position().y.min(papers[5].position().y);
        assert!((root.y + lowest - papers[0].thickness() / 2.0).abs() < 1e-6);
        assert_eq!(root.z, 0.5);
    }

    #[test]
    fn test_staple_mesh_is_indexed_consistently() {
        let (bound, _) = bound(6);
        let mesh = bound.binder_mesh();
        assert!(mesh.vertex_count() > 0);
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn test_pattern_binding_columns() {
        let (bound, _) = bound(6);
        let pattern = bound.create_pattern(&PatternRequest {
            quality: 3,
            size: Vec2::new(2.0, 3.0),
            thickness: 0.02,
            uv_margin: Default::default(),
            reduce_overdraw: false,
            reduce_sub_meshes: false,
        });
        assert!(pattern.validate().is_ok());
        assert_eq!(pattern.x_none_seam_indices.len(), bound.binding_vertex_count + 2);
        assert_eq!(pattern.base_x[0], 0.0);
        assert_eq!(pattern.base_x[1], 0.0);
        assert!((pattern.base_x.last().unwrap() - 2.0).abs() < 1e-4);
        assert!((pattern.base_x_offset + bound.binding_radius()).abs() < 1e-6);
        assert_eq!(pattern.sub_mesh_count(), 3);
    }

    #[test]
    fn test_reduce_overdraw_cuts_faces() {
        let (bound, _) = bound(8);
        let request = PatternRequest {
            quality: 2,
            size: Vec2::new(2.0, 3.0),
            thickness: 0.02,
            uv_margin: Default::default(),
            reduce_overdraw: false,
            reduce_sub_meshes: true,
        };
        let full = bound.create_pattern(&request);
        let cut = bound.create_pattern(&PatternRequest {
            reduce_overdraw: true,
            ..request
        });
        assert!(cut.validate().is_ok());
        let count = |p: &PaperPattern| p.triangles.lists().iter().map(|l| l.len()).sum::<usize>();
        assert!(cut.nx() > full.nx());
        assert!(cut.weights.iter().any(|&w| w == 0));
        assert!(count(&cut) > 0);
    }
}
