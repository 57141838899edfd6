//! Indexed mesh built from a face list
//!
//! Faces produced by the driver repeat their corner coordinates. This pass
//! merges corners with identical lattice coordinates into one shared vertex
//! carrying the grid sample, and rewrites each face as three vertex indices.

use std::collections::HashMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::node::TriangleNode;

/// A shared mesh vertex: lattice position and the sample found there
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: IVec2,
    pub value: f64,
}

/// Deduplicated vertex list plus per-face vertex indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Merge the corners of `faces`, numbering vertices in first-seen order
    ///
    /// Corner order inside each triangle is kept, so the first index of every
    /// triangle is still its right-angle corner.
    pub fn from_faces(faces: &[TriangleNode], grid: &Grid<'_>) -> Self {
        let mut mesh = Mesh {
            vertices: Vec::new(),
            triangles: Vec::with_capacity(faces.len()),
        };
        let mut lookup: HashMap<IVec2, u32> = HashMap::new();

        for face in faces {
            let triangle = face.corners.map(|corner| {
                *lookup.entry(corner).or_insert_with(|| {
                    mesh.vertices.push(MeshVertex {
                        position: corner,
                        value: grid.sample_at(corner),
                    });
                    (mesh.vertices.len() - 1) as u32
                })
            });
            mesh.triangles.push(triangle);
        }

        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Lattice positions of the corners of triangle `index`
    pub fn triangle_positions(&self, index: usize) -> Option<[IVec2; 3]> {
        let triangle = self.triangles.get(index)?;
        Some(triangle.map(|vertex| self.vertices[vertex as usize].position))
    }

    /// Rebuild the face list this mesh was made from
    pub fn to_faces(&self) -> Vec<TriangleNode> {
        (0..self.triangles.len())
            .filter_map(|index| self.triangle_positions(index))
            .map(|[a, b, c]| TriangleNode::new(a, b, c))
            .collect()
    }
}
