//! Live vertex buffers of one paper mesh.

use std::sync::Arc;

use glam::{Vec2, Vec3};

use super::{PaperBorder, PaperPattern, PaperSeam};
use crate::geometry::{slerp_vec3, triangle};
use crate::raycast::{interpolate_vec2, ray_triangle_intersection, Ray};

/// Deformable mesh built from a shared [`PaperPattern`].
///
/// The paper writes its (possibly rolled) grid into the base vertices, then
/// [`PaperMeshData::update_mesh`] derives normals, extrudes both layers by
/// half the thickness and closes the side walls.
#[derive(Debug, Clone)]
pub struct PaperMeshData {
    pattern: Arc<PaperPattern>,
    base_vertices: Vec<Vec3>,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl PaperMeshData {
    pub fn new(pattern: Arc<PaperPattern>) -> Self {
        let vertex_count = pattern.vertex_count();
        let mut data = Self {
            base_vertices: vec![Vec3::ZERO; pattern.base_vertex_count()],
            vertices: vec![Vec3::ZERO; vertex_count],
            normals: vec![Vec3::ZERO; vertex_count],
            pattern,
        };
        data.reset_base_vertices();
        data
    }

    pub fn pattern(&self) -> &Arc<PaperPattern> {
        &self.pattern
    }

    pub fn base_vertices(&self) -> &[Vec3] {
        &self.base_vertices
    }

    pub fn base_vertices_mut(&mut self) -> &mut [Vec3] {
        &mut self.base_vertices
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.pattern.texcoords
    }

    /// Lay the base grid out flat in the XZ plane.
    pub fn reset_base_vertices(&mut self) {
        let pattern = &self.pattern;
        let mut i = 0;
        for &z in &pattern.base_z {
            for &x in &pattern.base_x {
                self.base_vertices[i] = Vec3::new(x + pattern.base_x_offset, 0.0, z);
                i += 1;
            }
        }
    }

    /// Rebuild the output vertices and normals from the base vertices.
    pub fn update_mesh(&mut self) {
        let pattern = Arc::clone(&self.pattern);
        let (nx, nz) = (pattern.nx(), pattern.nz());
        let base = pattern.base_vertex_count();

        update_x_seams(&pattern.x_seams, &mut self.base_vertices, nx, nz, false);
        update_z_seams(&pattern.z_seams, &mut self.base_vertices, nx, nz, false);

        let normals = &mut self.normals;
        normals[..base].fill(Vec3::ZERO);
        let vertices = &self.base_vertices;
        for z in 0..nz - 1 {
            for x in 0..nx - 1 {
                let a = z * nx + x;
                let b = a + 1;
                let c = a + nx;
                let d = c + 1;
                let (pa, pb, pc, pd) = (vertices[a], vertices[b], vertices[c], vertices[d]);
                let sum = triangle::normal(pa, pc, pb) + triangle::normal(pd, pb, pc);
                for i in [a, b, c, d] {
                    normals[i] += sum;
                }
            }
        }
        for (normal, &weight) in normals[..base].iter_mut().zip(&pattern.weights) {
            *normal = if weight == 0 {
                Vec3::ZERO
            } else {
                (*normal / weight as f32).normalize_or_zero()
            };
        }

        update_x_seams(&pattern.x_seams, normals, nx, nz, true);
        update_z_seams(&pattern.z_seams, normals, nx, nz, true);

        let half_thickness = pattern.thickness / 2.0;
        for i in 0..base {
            let normal = normals[i];
            let vertex = self.base_vertices[i];
            normals[i + base] = -normal;
            self.vertices[i] = vertex + normal * half_thickness;
            self.vertices[i + base] = vertex - normal * half_thickness;
        }

        update_borders(&pattern.borders, &mut self.vertices, normals, nx, nz);
    }

    /// Nearest hit of `ray` (in mesh space) on the current vertices.
    ///
    /// Returns the hit distance and the interpolated texcoord.
    pub fn raycast(&self, ray: &Ray) -> Option<(f32, Vec2)> {
        let texcoords = &self.pattern.texcoords;
        let mut best: Option<(f32, Vec2)> = None;
        for list in self.pattern.triangles.lists() {
            for tri in list.chunks_exact(3) {
                let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                let Some(hit) = ray_triangle_intersection(
                    ray,
                    self.vertices[i0],
                    self.vertices[i1],
                    self.vertices[i2],
                ) else {
                    continue;
                };
                if best.is_some_and(|(t, _)| t <= hit.t) {
                    continue;
                }
                let uv = interpolate_vec2(texcoords[i0], texcoords[i1], texcoords[i2], hit.u, hit.v);
                best = Some((hit.t, uv));
            }
        }
        best
    }
}

fn blend(a: Vec3, b: Vec3, t: f32, slerp: bool) -> Vec3 {
    if slerp { slerp_vec3(a, b, t) } else { a.lerp(b, t) }
}

/// Move every seam column onto the blend of its neighbor columns.
///
/// Stops at the first inactive seam.
pub fn update_x_seams(seams: &[PaperSeam], vertices: &mut [Vec3], nx: usize, nz: usize, slerp: bool) {
    for seam in seams {
        if !seam.active {
            return;
        }
        for z in 0..nz {
            let row = z * nx;
            vertices[row + seam.index] = blend(vertices[row + seam.prev], vertices[row + seam.next], seam.t, slerp);
        }
    }
}

/// Move every seam row onto the blend of its neighbor rows.
///
/// Stops at the first inactive seam.
pub fn update_z_seams(seams: &[PaperSeam], vertices: &mut [Vec3], nx: usize, _nz: usize, slerp: bool) {
    for seam in seams {
        if !seam.active {
            return;
        }
        for x in 0..nx {
            vertices[seam.index * nx + x] =
                blend(vertices[seam.prev * nx + x], vertices[seam.next * nx + x], seam.t, slerp);
        }
    }
}

/// Write the wall vertices of every border after the two layers.
pub fn update_borders(borders: &[PaperBorder], vertices: &mut [Vec3], normals: &mut [Vec3], nx: usize, nz: usize) {
    let base = nx * nz;
    let mut w = base * 2;
    let mut push = |vertices: &mut [Vec3], n: Vec3, flip: bool, first: Vec3, second: Vec3| {
        let n = if flip { -n } else { n };
        normals[w] = n;
        vertices[w] = first;
        normals[w + 1] = n;
        vertices[w + 1] = second;
        w += 2;
    };

    for border in borders {
        for i in border.start_x..=border.end_x {
            let j = border.start_z * nx + i;
            let v = vertices[j];
            let n = (v - vertices[j + nx]).normalize_or_zero();
            let back = vertices[j + base];
            push(vertices, n, border.flip, v, back);
        }
        for i in border.start_x..=border.end_x {
            let j = border.end_z * nx + i;
            let v = vertices[j + base];
            let n = (v - vertices[j + base - nx]).normalize_or_zero();
            let front = vertices[j];
            push(vertices, n, border.flip, v, front);
        }
        for i in border.start_z..=border.end_z {
            let j = i * nx + border.start_x;
            let v = vertices[j + base];
            let n = (v - vertices[j + base + 1]).normalize_or_zero();
            let front = vertices[j];
            push(vertices, n, border.flip, v, front);
        }
        for i in border.start_z..=border.end_z {
            let j = i * nx + border.end_x;
            let v = vertices[j];
            let n = (v - vertices[j - 1]).normalize_or_zero();
            let back = vertices[j + base];
            push(vertices, n, border.flip, v, back);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternBuilder, SubMeshes};
    use folio_config::{BookDirection, PaperUvMargin};

    /// 2x1 paper with one seam column inserted at x = 0.5.
    fn seamed_pattern() -> Arc<PaperPattern> {
        let xs = [0.0, 0.5, 2.0];
        let zs = [0.0, 1.0];
        let mut pattern = PaperPattern {
            base_x: xs.to_vec(),
            base_z: zs.to_vec(),
            size: Vec2::new(2.0, 1.0),
            thickness: 0.2,
            x_seams: vec![PaperSeam::new(0, 1, 2, 0.25)],
            ..Default::default()
        };
        let mut builder =
            PatternBuilder::new(&xs, &zs, pattern.size, &PaperUvMargin::default(), BookDirection::LeftToRight);
        for x in 0..2 {
            builder.add_weight(x, 0);
            builder.add_faces(x, 0);
        }
        builder.add_border(PaperBorder::new(0, 0, 2, 1, false, true));
        builder.finish(&mut pattern, false);
        Arc::new(pattern)
    }

    #[test]
    fn test_flat_mesh_extrudes_along_y() {
        let mut data = PaperMeshData::new(seamed_pattern());
        data.update_mesh();
        let base = data.pattern().base_vertex_count();
        for i in 0..base {
            assert!(data.normals()[i].abs_diff_eq(Vec3::Y, 1e-5));
            assert!((data.vertices()[i].y - 0.1).abs() < 1e-6);
            assert!((data.vertices()[i + base].y + 0.1).abs() < 1e-6);
        }
    }

    #[test]
    fn test_seam_follows_neighbors() {
        let mut data = PaperMeshData::new(seamed_pattern());
        for v in data.base_vertices_mut() {
            v.y = v.x;
        }
        data.update_mesh();
        let seam = data.base_vertices()[1];
        assert!((seam.x - 0.5).abs() < 1e-6);
        assert!((seam.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_seam_endpoints() {
        let mut vertices = vec![Vec3::ZERO, Vec3::ZERO, Vec3::X];
        update_x_seams(&[PaperSeam::new(0, 1, 2, 0.0)], &mut vertices, 3, 1, false);
        assert_eq!(vertices[1], Vec3::ZERO);
        update_x_seams(&[PaperSeam::new(0, 1, 2, 1.0)], &mut vertices, 3, 1, false);
        assert_eq!(vertices[1], Vec3::X);
    }

    #[test]
    fn test_inactive_seam_stops_update() {
        let mut vertices = vec![Vec3::ZERO, Vec3::Y, Vec3::X];
        let mut inactive = PaperSeam::new(0, 1, 2, 0.5);
        inactive.active = false;
        update_x_seams(&[inactive, PaperSeam::new(0, 1, 2, 0.5)], &mut vertices, 3, 1, false);
        assert_eq!(vertices[1], Vec3::Y);
    }

    #[test]
    fn test_border_walls_face_outwards() {
        let mut data = PaperMeshData::new(seamed_pattern());
        data.update_mesh();
        let base = data.pattern().base_vertex_count();
        // first rim is the z = 0 row, facing -Z
        assert!(data.normals()[base * 2].abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert_eq!(data.vertices().len(), data.pattern().vertex_count());
        assert!(matches!(data.pattern().triangles, SubMeshes::Split { .. }));
    }

    #[test]
    fn test_raycast_front_layer() {
        let mut data = PaperMeshData::new(seamed_pattern());
        data.update_mesh();
        let ray = Ray::new(Vec3::new(1.0, 1.0, 0.5), Vec3::NEG_Y);
        let (t, uv) = data.raycast(&ray).unwrap();
        assert!((t - 0.9).abs() < 1e-5);
        assert!((uv.x - 0.5).abs() < 1e-5);
        assert!((uv.y - 0.5).abs() < 1e-5);
    }
}
