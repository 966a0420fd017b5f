//! Per-vertex normals and bounding volume derived from a triangle list.

use glam::Vec3;

use crate::mesh_buffer::MeshBuffer;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for no points
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Aabb { min: first, max: first }, |b, p| Aabb {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Derived surface data for one mesh revision.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceData {
    /// One normal per vertex; zero for vertices no triangle references
    pub normals: Vec<Vec3>,
    /// Bounds of the referenced vertices; `None` when there are no triangles
    pub bounds: Option<Aabb>,
    revision: u64,
}

impl SurfaceData {
    pub fn new(normals: Vec<Vec3>, bounds: Option<Aabb>, mesh: &MeshBuffer) -> Self {
        Self {
            normals,
            bounds,
            revision: mesh.revision(),
        }
    }

    /// Whether this data was computed from the mesh's current triangle list
    pub fn is_current(&self, mesh: &MeshBuffer) -> bool {
        self.revision == mesh.revision()
    }
}

/// Geometry kernel that recomputes surface data after a topology change.
///
/// Implementations must accept meshes with zero triangles.
pub trait SurfaceKernel {
    fn recompute(&self, mesh: &MeshBuffer) -> SurfaceData;
}

/// Area-weighted vertex normals and bounds over referenced vertices.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaWeightedNormals;

impl AreaWeightedNormals {
    /// Un-normalized face normal; its length is twice the face area
    pub fn weighted_face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
        (p1 - p0).cross(p2 - p0)
    }
}

impl SurfaceKernel for AreaWeightedNormals {
    fn recompute(&self, mesh: &MeshBuffer) -> SurfaceData {
        let positions = mesh.positions();
        let mut normals = vec![Vec3::ZERO; positions.len()];
        let mut referenced = vec![false; positions.len()];

        for (_, [a, b, c]) in mesh.triangles() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let n = Self::weighted_face_normal(positions[a], positions[b], positions[c]);
            for v in [a, b, c] {
                normals[v] += n;
                referenced[v] = true;
            }
        }

        for n in normals.iter_mut() {
            *n = n.normalize_or_zero();
        }

        let bounds = Aabb::from_points(
            positions
                .iter()
                .zip(&referenced)
                .filter(|(_, r)| **r)
                .map(|(p, _)| *p),
        );

        SurfaceData::new(normals, bounds, mesh)
    }
}
