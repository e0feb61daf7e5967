//! GPU instancing of the resting interior pages.
//!
//! With a wire binding every resting page shows the same shared lowpoly mesh,
//! so the host can draw all of them in one instanced call. The per-instance
//! data is laid out for direct upload.

use glam::{Affine3A, Mat4, Vec3};

use crate::content::BookContent;
use crate::geometry::rot_z;
use crate::paper::Paper;
use crate::pool::MeshDataRef;

/// Per-instance data of one resting page.
///
/// This struct is designed for GPU compatibility with bytemuck.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct PaperInstance {
    /// Paper to world, column major
    pub matrix: [f32; 16],
    /// World to paper, column major
    pub inverse: [f32; 16],
    /// Texture scale and offset of the side facing up
    pub st: [f32; 4],
}

impl PaperInstance {
    pub fn new(matrix: Mat4, st: [f32; 4]) -> Self {
        Self {
            matrix: matrix.to_cols_array(),
            inverse: matrix.inverse().to_cols_array(),
            st,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.matrix)
    }
}

/// Whether a paper is drawn through instancing instead of its own mesh.
///
/// Only papers showing the one shared `mesh` qualify, and the outer papers
/// never do. Moving papers show their own highpoly data, so they drop out.
pub fn is_instanced(papers: &[Paper], index: usize, mesh: MeshDataRef) -> bool {
    if index == 0 || index + 1 >= papers.len() {
        return false;
    }
    papers[index].mesh_data() == Some(mesh)
}

/// Instances of every instanced paper: the right stack in paper order, then
/// the left stack from its top down.
pub fn collect_instances(
    papers: &[Paper],
    content: &BookContent,
    parent: &Affine3A,
    mesh: MeshDataRef,
) -> Vec<PaperInstance> {
    let (right, mut left): (Vec<usize>, Vec<usize>) = (0..papers.len())
        .filter(|&i| is_instanced(papers, i, mesh))
        .partition(|&i| papers[i].is_on_right_stack());
    left.reverse();

    right
        .into_iter()
        .chain(left)
        .map(|i| {
            let paper = &papers[i];
            let mut matrix = Mat4::from(*parent * paper.local_matrix());
            let mut st = content.get(paper.current_content()).texture_st();
            if paper.is_flipped() {
                // show the back side with the front faces
                matrix = matrix * Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)) * Mat4::from_quat(rot_z(180.0));
                st = st.x_flipped();
            }
            PaperInstance::new(matrix, st.to_vec4().to_array())
        })
        .collect()
}
