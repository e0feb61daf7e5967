//! Bevy mesh conversion.
//!
//! Papers keep one vertex buffer per mesh data but up to three triangle lists
//! (front, back, border). Bevy meshes carry a single index buffer, so every
//! sub-mesh becomes its own [`Mesh`] sharing the same vertices.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::binding::BinderMesh;
use crate::pattern::PaperMeshData;

fn paper_attributes(data: &PaperMeshData) -> (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<[f32; 2]>) {
    let positions = data.vertices().iter().map(|v| v.to_array()).collect();
    let normals = data.normals().iter().map(|n| n.to_array()).collect();
    let uvs = data.texcoords().iter().map(|uv| uv.to_array()).collect();
    (positions, normals, uvs)
}

/// Convert one sub-mesh of a paper to a Bevy mesh.
///
/// Returns `None` if the pattern has no such sub-mesh.
pub fn paper_mesh(data: &PaperMeshData, sub_mesh: usize) -> Option<Mesh> {
    let lists = data.pattern().triangles.lists();
    let indices = lists.get(sub_mesh)?.to_vec();
    let (positions, normals, uvs) = paper_attributes(data);

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    Some(mesh)
}

/// Every sub-mesh of a paper, in material order.
pub fn paper_meshes(data: &PaperMeshData) -> Vec<Mesh> {
    (0..data.pattern().sub_mesh_count())
        .filter_map(|i| paper_mesh(data, i))
        .collect()
}

/// Convert the staples or the wire to a Bevy mesh.
pub fn binder_mesh(binder: &BinderMesh) -> Mesh {
    let positions: Vec<[f32; 3]> = binder.positions.iter().map(|v| v.to_array()).collect();
    let normals: Vec<[f32; 3]> = binder.normals.iter().map(|n| n.to_array()).collect();

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(binder.indices.clone()));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Book, BookContent};
    use folio_config::{BookConfig, BookDirection};

    #[test]
    fn test_paper_meshes_share_vertices() {
        let content = BookContent::new(BookDirection::LeftToRight).with_pages(4);
        let mut book = Book::new(BookConfig::default(), content);
        book.build().unwrap();

        let data = book.paper_mesh_data(0).unwrap();
        let meshes = paper_meshes(data);
        assert_eq!(meshes.len(), data.pattern().sub_mesh_count());
        for mesh in &meshes {
            assert_eq!(mesh.count_vertices(), data.vertices().len());
        }
        assert!(paper_mesh(data, 3).is_none());
    }

    #[test]
    fn test_binder_mesh() {
        let content = BookContent::new(BookDirection::LeftToRight).with_pages(4);
        let mut book = Book::new(BookConfig::default(), content);
        book.build().unwrap();

        let binder = book.binder_mesh().unwrap();
        let mesh = binder_mesh(binder);
        assert_eq!(mesh.count_vertices(), binder.vertex_count());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(binder.indices.len()));
    }
}
