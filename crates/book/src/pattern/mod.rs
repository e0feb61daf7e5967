//! Paper mesh topology.
//!
//! A [`PaperPattern`] describes the irregular grid of one paper class for one
//! binding: the node values along X (spine to edge) and Z (along the spine),
//! the seam rows that follow their neighbors, the side walls and the triangle
//! lists. Patterns are immutable once built and shared between every
//! [`PaperMeshData`] created from them.
//!
//! Vertex layout of a mesh built from a pattern:
//! - `0..base`: front layer, one vertex per grid node (z-major)
//! - `base..2 * base`: back layer
//! - `2 * base..`: border wall vertices, in [`PaperPattern::borders`] order

pub mod builder;
pub mod mesh_data;
pub mod node;

pub use builder::{seam_nodes_to_seams, NodeMargin, PatternBuilder};
pub use mesh_data::PaperMeshData;
pub use node::{NodeArena, NodeId, PaperNode};

use glam::Vec2;

use crate::error::PatternError;

/// A grid row or column interpolated between two regular rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSeam {
    pub active: bool,
    pub prev: usize,
    pub index: usize,
    pub next: usize,
    pub t: f32,
}

impl PaperSeam {
    pub fn new(prev: usize, index: usize, next: usize, t: f32) -> Self {
        Self {
            active: true,
            prev,
            index,
            next,
            t,
        }
    }
}

/// A rectangular rim of the grid that gets a side wall.
///
/// `flip` reverses the winding for cutouts whose walls face inwards. When
/// `left` is false the start X column only gets a single wall face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperBorder {
    pub start_x: usize,
    pub start_z: usize,
    pub end_x: usize,
    pub end_z: usize,
    pub flip: bool,
    pub left: bool,
}

impl PaperBorder {
    pub fn new(start_x: usize, start_z: usize, end_x: usize, end_z: usize, flip: bool, left: bool) -> Self {
        Self {
            start_x,
            start_z,
            end_x,
            end_z,
            flip,
            left,
        }
    }
}

/// Triangle lists of a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum SubMeshes {
    /// Front, border and back faces in one list
    Merged(Vec<u32>),
    Split {
        front: Vec<u32>,
        back: Vec<u32>,
        border: Vec<u32>,
    },
}

impl Default for SubMeshes {
    fn default() -> Self {
        Self::Merged(Vec::new())
    }
}

impl SubMeshes {
    pub fn count(&self) -> usize {
        match self {
            Self::Merged(_) => 1,
            Self::Split { .. } => 3,
        }
    }

    /// Every list, in sub-mesh order.
    pub fn lists(&self) -> Vec<&[u32]> {
        match self {
            Self::Merged(all) => vec![all.as_slice()],
            Self::Split { front, back, border } => vec![front.as_slice(), back.as_slice(), border.as_slice()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperPattern {
    /// Node values along X, starting at the spine
    pub base_x: Vec<f32>,
    /// Node values along Z
    pub base_z: Vec<f32>,
    /// Added to every X value when laying out the base vertices
    pub base_x_offset: f32,
    pub x_seams: Vec<PaperSeam>,
    pub z_seams: Vec<PaperSeam>,
    /// Grid X indices of the regular (non-seam) nodes near the spine
    pub x_none_seam_indices: Vec<usize>,
    pub borders: Vec<PaperBorder>,
    pub texcoords: Vec<Vec2>,
    /// Number of quad contributions per base vertex, for normal averaging
    pub weights: Vec<u32>,
    pub triangles: SubMeshes,
    pub size: Vec2,
    pub thickness: f32,
}

impl PaperPattern {
    pub fn nx(&self) -> usize {
        self.base_x.len()
    }

    pub fn nz(&self) -> usize {
        self.base_z.len()
    }

    pub fn base_vertex_count(&self) -> usize {
        self.nx() * self.nz()
    }

    pub fn vertex_count(&self) -> usize {
        self.texcoords.len()
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.triangles.count()
    }

    /// Check the structural invariants of the pattern.
    pub fn validate(&self) -> Result<(), PatternError> {
        for axis in [&self.base_x, &self.base_z] {
            if axis.len() < 2 {
                return Err(PatternError::TooFewNodes(axis.len()));
            }
            if let Some(i) = axis.windows(2).position(|w| w[0] > w[1]) {
                return Err(PatternError::Decreasing(i + 1));
            }
        }

        let count = self.vertex_count();
        for list in self.triangles.lists() {
            if list.len() % 3 != 0 {
                return Err(PatternError::IncompleteTriangle(list.len()));
            }
            if let Some(&index) = list.iter().find(|&&i| i as usize >= count) {
                return Err(PatternError::VertexOutOfRange { index, count });
            }
        }

        for seam in &self.x_seams {
            if seam.prev.max(seam.index).max(seam.next) >= self.nx() {
                return Err(PatternError::SeamOutOfRange(seam.index));
            }
        }
        for seam in &self.z_seams {
            if seam.prev.max(seam.index).max(seam.next) >= self.nz() {
                return Err(PatternError::SeamOutOfRange(seam.index));
            }
        }
        for &i in &self.x_none_seam_indices {
            if i >= self.nx() {
                return Err(PatternError::InvalidNode(i));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_pattern() -> PaperPattern {
        let xs = [0.0, 1.0, 2.0];
        let zs = [0.0, 1.0];
        let mut pattern = PaperPattern {
            base_x: xs.to_vec(),
            base_z: zs.to_vec(),
            size: Vec2::new(2.0, 1.0),
            thickness: 0.1,
            ..Default::default()
        };
        let mut builder = PatternBuilder::new(
            &xs,
            &zs,
            pattern.size,
            &folio_config::PaperUvMargin::default(),
            folio_config::BookDirection::LeftToRight,
        );
        for x in 0..2 {
            builder.add_weight(x, 0);
            builder.add_faces(x, 0);
        }
        builder.add_border(PaperBorder::new(0, 0, 2, 1, false, true));
        builder.finish(&mut pattern, true);
        pattern
    }

    #[test]
    fn test_valid_pattern() {
        let pattern = flat_pattern();
        assert_eq!(pattern.sub_mesh_count(), 1);
        assert!(pattern.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut pattern = flat_pattern();
        pattern.base_x = vec![0.0, 2.0, 1.0];
        assert_eq!(pattern.validate(), Err(PatternError::Decreasing(2)));

        let mut pattern = flat_pattern();
        pattern.triangles = SubMeshes::Merged(vec![0, 1]);
        assert_eq!(pattern.validate(), Err(PatternError::IncompleteTriangle(2)));

        let mut pattern = flat_pattern();
        pattern.triangles = SubMeshes::Merged(vec![0, 1, 999]);
        assert!(matches!(pattern.validate(), Err(PatternError::VertexOutOfRange { index: 999, .. })));

        let mut pattern = flat_pattern();
        pattern.x_seams.push(PaperSeam::new(0, 1, 7, 0.5));
        assert_eq!(pattern.validate(), Err(PatternError::SeamOutOfRange(1)));
    }

    #[test]
    fn test_seam_records_from_inserted_nodes() {
        let mut arena = NodeArena::new();
        let root = arena.create(0.0, false, false);
        arena.create_next(root, 2.0, false, false);
        let seam = arena.create(0.5, false, true);
        assert!(arena.insert(root, seam));
        arena.update_indices(root);

        let seams = seam_nodes_to_seams(&arena, &[seam]);
        assert_eq!(seams.len(), 1);
        assert_eq!((seams[0].prev, seams[0].index, seams[0].next), (0, 1, 2));
        assert!((seams[0].t - 0.25).abs() < 1e-6);
    }
}
