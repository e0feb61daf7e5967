//! Shared steps for turning node chains into a [`PaperPattern`].
//!
//! Bindings lay out their own X and Z chains, then hand the baked values to a
//! [`PatternBuilder`] which owns texcoords, normal weights, faces and borders.

use glam::Vec2;
use tracing::warn;

use folio_config::{BookDirection, PaperUvMargin};

use super::node::{NodeArena, NodeId};
use super::{PaperBorder, PaperPattern, PaperSeam, SubMeshes};
use crate::geometry::inverse_lerp;

/// Four seam nodes marking the UV margin (or an overdraw cut) of a paper.
#[derive(Debug, Clone, Copy)]
pub struct NodeMargin {
    pub left: NodeId,
    pub right: NodeId,
    pub down: NodeId,
    pub up: NodeId,
}

impl NodeMargin {
    pub fn new(arena: &mut NodeArena, size: Vec2, margin: &PaperUvMargin, hole: bool) -> Self {
        Self {
            left: arena.create(margin.left * size.x, hole, true),
            right: arena.create((1.0 - margin.right) * size.x, hole, true),
            down: arena.create(margin.down * size.y, hole, true),
            up: arena.create((1.0 - margin.up) * size.y, hole, true),
        }
    }

    /// Splice the margin nodes into both chains, collecting the ones that fit.
    pub fn insert(
        &self,
        arena: &mut NodeArena,
        x_root: NodeId,
        z_root: NodeId,
        x_seam_nodes: &mut Vec<NodeId>,
        z_seam_nodes: &mut Vec<NodeId>,
    ) {
        for node in [self.left, self.right] {
            if arena.insert(x_root, node) {
                x_seam_nodes.push(node);
            }
        }
        for node in [self.down, self.up] {
            if arena.insert(z_root, node) {
                z_seam_nodes.push(node);
            }
        }
    }
}

/// Seam records for inserted nodes. Call after [`NodeArena::update_indices`].
pub fn seam_nodes_to_seams(arena: &NodeArena, seam_nodes: &[NodeId]) -> Vec<PaperSeam> {
    let mut seams = Vec::with_capacity(seam_nodes.len());
    for &id in seam_nodes {
        let (Some(prev), Some(next)) = (arena.prev_none_seam(id), arena.next_none_seam(id)) else {
            warn!(node = id.raw(), "Seam node has no regular neighbor, skipped");
            continue;
        };
        let (prev, node, next) = (arena.get(prev), arena.get(id), arena.get(next));
        seams.push(PaperSeam::new(
            prev.index,
            node.index,
            next.index,
            inverse_lerp(prev.value, next.value, node.value),
        ));
    }
    seams
}

/// Quad `a b c d` as seen from the front: `c d` above `a b`.
pub fn add_front_face(triangles: &mut Vec<u32>, a: u32, b: u32, c: u32, d: u32) {
    triangles.extend_from_slice(&[a, c, b, b, c, d]);
}

/// Same quad with the opposite winding.
pub fn add_back_face(triangles: &mut Vec<u32>, a: u32, b: u32, c: u32, d: u32) {
    triangles.extend_from_slice(&[a, b, c, b, d, c]);
}

fn add_two_front_faces(triangles: &mut Vec<u32>, a: u32, b: u32, c: u32, d: u32, offset: u32) {
    add_front_face(triangles, a, b, c, d);
    add_front_face(triangles, a + offset, b + offset, c + offset, d + offset);
}

fn add_two_back_faces(triangles: &mut Vec<u32>, a: u32, b: u32, c: u32, d: u32, offset: u32) {
    add_back_face(triangles, a, b, c, d);
    add_back_face(triangles, a + offset, b + offset, c + offset, d + offset);
}

/// Front face into `front`, the mirrored copy `offset` vertices later into `back`.
pub fn add_front_and_back_faces(
    front: &mut Vec<u32>,
    back: &mut Vec<u32>,
    [a, b, c, d]: [u32; 4],
    offset: u32,
) {
    add_front_face(front, a, b, c, d);
    add_back_face(back, a + offset, b + offset, c + offset, d + offset);
}

/// Grid texcoords for the front layer, duplicated for the back layer.
///
/// Vertical books rotate the content a quarter turn.
pub fn front_and_back_texcoords(
    xs: &[f32],
    zs: &[f32],
    size: Vec2,
    uv_margin: &PaperUvMargin,
    direction: BookDirection,
) -> Vec<Vec2> {
    let u_start = uv_margin.left * size.x;
    let u_end = (1.0 - uv_margin.right) * size.x;
    let v_start = uv_margin.down * size.y;
    let v_end = (1.0 - uv_margin.up) * size.y;

    let mut texcoords = Vec::with_capacity(xs.len() * zs.len() * 2);
    for &z in zs {
        for &x in xs {
            let v = inverse_lerp(v_start, v_end, z);
            if direction.is_vertical() {
                texcoords.push(Vec2::new(v, inverse_lerp(u_end, u_start, x)));
            } else {
                texcoords.push(Vec2::new(inverse_lerp(u_start, u_end, x), v));
            }
        }
    }
    texcoords.extend_from_within(..);
    texcoords
}

/// Append the wall quads and texcoords of every border.
///
/// Each border adds four rims of vertex pairs (front, back): the start Z row,
/// the end Z row, the start X column and the end X column. The vertex order
/// here must match [`update_borders`](super::mesh_data::update_borders).
pub fn add_borders(
    borders: &[PaperBorder],
    triangles: &mut Vec<u32>,
    texcoords: &mut Vec<Vec2>,
    nx: usize,
    nz: usize,
) {
    let nxz = nx * nz;
    for border in borders {
        let nx2 = ((border.end_x - border.start_x + 1) * 2) as u32;
        let nz2 = ((border.end_z - border.start_z + 1) * 2) as u32;
        let iv = texcoords.len() as u32;

        for i in 0..(border.end_x - border.start_x) as u32 {
            let a = iv + i * 2;
            if border.flip {
                add_two_back_faces(triangles, a, a + 1, a + 2, a + 3, nx2);
            } else {
                add_two_front_faces(triangles, a, a + 1, a + 2, a + 3, nx2);
            }
        }

        for i in 0..(border.end_z - border.start_z) as u32 {
            if border.left {
                let a = iv + i * 2 + nx2 * 2;
                if border.flip {
                    add_two_back_faces(triangles, a, a + 1, a + 2, a + 3, nz2);
                } else {
                    add_two_front_faces(triangles, a, a + 1, a + 2, a + 3, nz2);
                }
            } else {
                let a = iv + i * 2 + nx2 * 2 + nz2;
                if border.flip {
                    add_back_face(triangles, a, a + 1, a + 2, a + 3);
                } else {
                    add_front_face(triangles, a, a + 1, a + 2, a + 3);
                }
            }
        }

        for i in border.start_x..=border.end_x {
            let j = border.start_z * nx + i;
            texcoords.push(texcoords[j]);
            texcoords.push(texcoords[j + nxz]);
        }
        for i in border.start_x..=border.end_x {
            let j = border.end_z * nx + i;
            texcoords.push(texcoords[j + nxz]);
            texcoords.push(texcoords[j]);
        }
        for i in border.start_z..=border.end_z {
            let j = i * nx + border.start_x;
            texcoords.push(texcoords[j + nxz]);
            texcoords.push(texcoords[j]);
        }
        for i in border.start_z..=border.end_z {
            let j = i * nx + border.end_x;
            texcoords.push(texcoords[j]);
            texcoords.push(texcoords[j + nxz]);
        }
    }
}

/// Accumulates faces, weights and borders over a baked grid.
#[derive(Debug)]
pub struct PatternBuilder {
    nx: usize,
    nz: usize,
    texcoords: Vec<Vec2>,
    weights: Vec<u32>,
    front: Vec<u32>,
    back: Vec<u32>,
    borders: Vec<PaperBorder>,
}

impl PatternBuilder {
    pub fn new(
        xs: &[f32],
        zs: &[f32],
        size: Vec2,
        uv_margin: &PaperUvMargin,
        direction: BookDirection,
    ) -> Self {
        let (nx, nz) = (xs.len(), zs.len());
        Self {
            nx,
            nz,
            texcoords: front_and_back_texcoords(xs, zs, size, uv_margin, direction),
            weights: vec![0; nx * nz],
            front: Vec::new(),
            back: Vec::new(),
            borders: Vec::new(),
        }
    }

    pub fn base_vertex_count(&self) -> usize {
        self.nx * self.nz
    }

    /// Corner indices of the quad whose lower-left corner is `(x, z)`.
    pub fn quad(&self, x: usize, z: usize) -> [u32; 4] {
        let a = z * self.nx + x;
        let c = (z + 1) * self.nx + x;
        [a as u32, (a + 1) as u32, c as u32, (c + 1) as u32]
    }

    /// Count the quad in the normal average of its corners.
    pub fn add_weight(&mut self, x: usize, z: usize) {
        for i in self.quad(x, z) {
            self.weights[i as usize] += 2;
        }
    }

    pub fn add_faces(&mut self, x: usize, z: usize) {
        let quad = self.quad(x, z);
        let offset = self.base_vertex_count() as u32;
        add_front_and_back_faces(&mut self.front, &mut self.back, quad, offset);
    }

    pub fn add_border(&mut self, border: PaperBorder) {
        self.borders.push(border);
    }

    /// Emit the border geometry and store everything in `pattern`.
    pub fn finish(mut self, pattern: &mut PaperPattern, reduce_sub_meshes: bool) {
        let mut border = Vec::new();
        add_borders(&self.borders, &mut border, &mut self.texcoords, self.nx, self.nz);

        pattern.triangles = if reduce_sub_meshes {
            let mut merged = self.front;
            merged.extend_from_slice(&border);
            merged.extend_from_slice(&self.back);
            SubMeshes::Merged(merged)
        } else {
            SubMeshes::Split {
                front: self.front,
                back: self.back,
                border,
            }
        };
        pattern.texcoords = self.texcoords;
        pattern.weights = self.weights;
        pattern.borders = self.borders;
    }
}
