//! Vertex positions plus a flat triangle index list.
//!
//! [`MeshBuffer`] is the substrate every editing algorithm queries. The
//! vertex array is never modified after construction; only the triangle
//! list can be swapped, through [`MeshBuffer::replace_triangles`].

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::error::InvalidMesh;
use crate::types::FaceId;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Check that `indices` describes whole triangles over `vertex_count` vertices
fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), InvalidMesh> {
    if indices.len() % 3 != 0 {
        return Err(InvalidMesh::PartialTriangle {
            index_count: indices.len(),
        });
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|(_, i)| **i as usize >= vertex_count)
    {
        return Err(InvalidMesh::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }

    Ok(())
}

/// Triangle mesh snapshot: `V` positions and `3T` indices.
///
/// Every construction and every successful triangle replacement stamps the
/// buffer with a new process-unique revision. Data derived from the
/// triangle list (normals, bounds, adjacency indices) records the revision
/// it was built from and can tell when it is stale.
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    revision: u64,
}

impl MeshBuffer {
    /// Build a mesh from positions and a flat index list.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, InvalidMesh> {
        validate_indices(&indices, positions.len())?;
        Ok(Self {
            positions,
            indices,
            revision: next_revision(),
        })
    }

    /// Build a mesh from positions and index triples.
    pub fn from_triangles(positions: Vec<Vec3>, triangles: &[[u32; 3]]) -> Result<Self, InvalidMesh> {
        let indices = triangles.iter().flat_map(|t| t.iter().copied()).collect();
        Self::new(positions, indices)
    }

    /// A mesh with no vertices and no triangles.
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
            revision: next_revision(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `i`
    pub fn vertex(&self, i: usize) -> Option<Vec3> {
        self.positions.get(i).copied()
    }

    /// Vertex indices of a triangle
    pub fn triangle(&self, face: FaceId) -> Option<[u32; 3]> {
        let start = face.index().checked_mul(3)?;
        let tri = self.indices.get(start..start + 3)?;
        Some([tri[0], tri[1], tri[2]])
    }

    /// Corner positions of a triangle
    pub fn triangle_positions(&self, face: FaceId) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.triangle(face)?;
        Some([
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ])
    }

    /// Iterate over all triangles in ascending face order
    pub fn triangles(&self) -> impl Iterator<Item = (FaceId, [u32; 3])> + '_ {
        self.indices
            .chunks_exact(3)
            .enumerate()
            .map(|(i, t)| (FaceId(i as u32), [t[0], t[1], t[2]]))
    }

    /// All face ids in ascending order
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.triangle_count() as u32).map(FaceId)
    }

    pub fn contains_face(&self, face: FaceId) -> bool {
        face.index() < self.triangle_count()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// A mesh with zero triangles. Its vertices may still be present.
    pub fn is_degenerate(&self) -> bool {
        self.indices.is_empty()
    }

    /// Revision stamp of the current triangle list
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap in a new triangle list.
    ///
    /// On failure the buffer is left untouched. On success the revision
    /// changes, so anything derived from the old triangle list is stale.
    pub fn replace_triangles(&mut self, indices: Vec<u32>) -> Result<(), InvalidMesh> {
        validate_indices(&indices, self.positions.len())?;
        self.indices = indices;
        self.revision = next_revision();
        Ok(())
    }
}

impl PartialEq for MeshBuffer {
    /// Geometry equality; revisions are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.positions == other.positions && self.indices == other.indices
    }
}
