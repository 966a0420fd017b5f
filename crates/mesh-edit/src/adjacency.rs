//! Face adjacency and connected-face search.
//!
//! Two triangles are adjacent when their vertex-index sets share at least
//! two elements. This approximates edge sharing: it also fires for
//! non-manifold pairs that share two vertices without a common drawn edge,
//! and it never fires across unwelded seams where coincident vertices have
//! different indices. Seam welding is available as an explicit opt-in
//! ([`WeldConfig`]); it can add adjacency across seams but never removes
//! any that index equality finds.
//!
//! [`adjacent_faces`] and [`connected_component`] answer queries directly
//! from a [`MeshBuffer`] by scanning every triangle. [`AdjacencyFinder`]
//! caches a [`MeshTopology`] per mesh revision and can answer the same
//! queries from a vertex → faces index instead.

use std::collections::{HashMap, HashSet, VecDeque};

use facecut_config::{AdjacencyStrategy, WeldConfig};
use tracing::{debug, trace, warn};

use crate::mesh_buffer::MeshBuffer;
use crate::types::FaceId;

/// Number of distinct vertex indices two triangles have in common
pub fn shared_vertex_count(a: [u32; 3], b: [u32; 3]) -> usize {
    a.iter()
        .enumerate()
        .filter(|(i, v)| !a[..*i].contains(v) && b.contains(v))
        .count()
}

/// Whether two triangles share at least two vertex indices
pub fn are_adjacent(a: [u32; 3], b: [u32; 3]) -> bool {
    shared_vertex_count(a, b) >= 2
}

/// Faces adjacent to `face`, found by scanning every triangle.
///
/// Returns an empty set when `face` is out of range.
pub fn adjacent_faces(mesh: &MeshBuffer, face: FaceId) -> HashSet<FaceId> {
    let Some(tri) = mesh.triangle(face) else {
        return HashSet::new();
    };

    mesh.triangles()
        .filter(|(other, other_tri)| *other != face && are_adjacent(tri, *other_tri))
        .map(|(other, _)| other)
        .collect()
}

/// Every face reachable from `seed` through chains of adjacent faces.
///
/// Uses the scanning [`adjacent_faces`]; see [`AdjacencyFinder`] for the
/// indexed variant.
pub fn connected_component(mesh: &MeshBuffer, seed: FaceId) -> HashSet<FaceId> {
    if !mesh.contains_face(seed) {
        return HashSet::new();
    }
    breadth_first(seed, |face| adjacent_faces(mesh, face))
}

/// FIFO flood fill. Each face is expanded at most once.
fn breadth_first<F>(seed: FaceId, mut neighbors: F) -> HashSet<FaceId>
where
    F: FnMut(FaceId) -> HashSet<FaceId>,
{
    let mut queue = VecDeque::from([seed]);
    let mut visited: HashSet<FaceId> = HashSet::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        for face in neighbors(current) {
            if !visited.contains(&face) {
                queue.push_back(face);
            }
        }
    }

    visited
}

/// Canonical vertex index per vertex, merging positionally identical ones.
///
/// Positions are scaled and truncated to integers before comparison, so
/// vertices closer than `1 / scale` on every axis usually coincide. The
/// canonical index of a group is its lowest vertex index.
#[derive(Debug, Clone)]
pub struct WeldMap {
    canonical: Vec<u32>,
    welded: usize,
}

impl WeldMap {
    pub fn build(mesh: &MeshBuffer, scale: f32) -> Self {
        let quantize = |p: glam::Vec3| -> [i64; 3] {
            [
                (p.x * scale) as i64,
                (p.y * scale) as i64,
                (p.z * scale) as i64,
            ]
        };

        let mut first_at: HashMap<[i64; 3], u32> = HashMap::new();
        let canonical: Vec<u32> = mesh
            .positions()
            .iter()
            .enumerate()
            .map(|(i, p)| *first_at.entry(quantize(*p)).or_insert(i as u32))
            .collect();

        let welded = canonical
            .iter()
            .enumerate()
            .filter(|(i, c)| **c as usize != *i)
            .count();

        Self { canonical, welded }
    }

    /// Canonical index for vertex `v`
    pub fn canonical(&self, v: u32) -> u32 {
        self.canonical.get(v as usize).copied().unwrap_or(v)
    }

    /// Number of vertices merged into another vertex
    pub fn welded_count(&self) -> usize {
        self.welded
    }

    fn map_triangle(&self, tri: [u32; 3]) -> [u32; 3] {
        tri.map(|v| self.canonical(v))
    }
}

/// Adjacency view of one mesh revision.
///
/// Holds the raw triangle triples and, when welding is on, their canonical
/// counterparts. Welding only adds adjacency: two faces are adjacent when
/// either their raw or their welded triples share two vertices, so corners
/// merged by coarse quantization never hide a shared edge. For
/// [`AdjacencyStrategy::VertexIndex`] the faces around each (canonical)
/// vertex are indexed as well.
#[derive(Debug, Clone)]
pub struct MeshTopology {
    revision: u64,
    triangles: Vec<[u32; 3]>,
    welded: Option<Vec<[u32; 3]>>,
    vertex_faces: Option<Vec<Vec<FaceId>>>,
    welded_vertices: usize,
}

impl MeshTopology {
    pub fn build(mesh: &MeshBuffer, strategy: AdjacencyStrategy, weld: &WeldConfig) -> Self {
        let weld_map = match (weld.enabled, weld.scale_is_valid()) {
            (true, true) => Some(WeldMap::build(mesh, weld.scale)),
            (true, false) => {
                warn!("MeshTopology: ignoring weld with invalid scale {}", weld.scale);
                None
            }
            (false, _) => None,
        };

        let triangles: Vec<[u32; 3]> = mesh.triangles().map(|(_, tri)| tri).collect();
        let welded: Option<Vec<[u32; 3]>> = weld_map
            .as_ref()
            .map(|map| triangles.iter().map(|tri| map.map_triangle(*tri)).collect());

        let vertex_faces = match strategy {
            AdjacencyStrategy::BruteForce => None,
            AdjacencyStrategy::VertexIndex => {
                // Raw neighbours share a raw vertex, hence its canonical one too
                let keys = welded.as_ref().unwrap_or(&triangles);
                let mut vertex_faces: Vec<Vec<FaceId>> = vec![Vec::new(); mesh.vertex_count()];
                for (i, tri) in keys.iter().enumerate() {
                    for (corner, v) in tri.iter().enumerate() {
                        if !tri[..corner].contains(v) {
                            vertex_faces[*v as usize].push(FaceId(i as u32));
                        }
                    }
                }
                Some(vertex_faces)
            }
        };

        let welded_vertices = weld_map.as_ref().map_or(0, WeldMap::welded_count);
        if welded_vertices > 0 {
            debug!(
                "MeshTopology: welded {} duplicate vertices of {} total",
                welded_vertices,
                mesh.vertex_count()
            );
        }
        debug!(
            "MeshTopology: built {:?} topology for {} faces (revision {})",
            strategy,
            triangles.len(),
            mesh.revision()
        );

        Self {
            revision: mesh.revision(),
            triangles,
            welded,
            vertex_faces,
            welded_vertices,
        }
    }

    /// Whether this topology was built from the mesh's current triangle list
    pub fn is_current(&self, mesh: &MeshBuffer) -> bool {
        self.revision == mesh.revision()
    }

    pub fn face_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn welded_vertices(&self) -> usize {
        self.welded_vertices
    }

    /// Faces whose triangles touch vertex `v` (vertex-index strategy only)
    pub fn faces_around_vertex(&self, v: u32) -> Option<&[FaceId]> {
        let vertex_faces = self.vertex_faces.as_ref()?;
        vertex_faces.get(v as usize).map(Vec::as_slice)
    }

    fn faces_adjacent(&self, a: usize, b: usize) -> bool {
        are_adjacent(self.triangles[a], self.triangles[b])
            || self
                .welded
                .as_ref()
                .is_some_and(|welded| are_adjacent(welded[a], welded[b]))
    }

    /// Faces sharing at least two vertices with `face`
    pub fn adjacent_faces(&self, face: FaceId) -> HashSet<FaceId> {
        let index = face.index();
        if index >= self.triangles.len() {
            return HashSet::new();
        }

        match &self.vertex_faces {
            Some(vertex_faces) => {
                let key = self.welded.as_ref().unwrap_or(&self.triangles)[index];
                key.iter()
                    .flat_map(|v| vertex_faces[*v as usize].iter().copied())
                    .filter(|other| *other != face && self.faces_adjacent(index, other.index()))
                    .collect()
            }
            None => (0..self.triangles.len())
                .filter(|other| *other != index && self.faces_adjacent(index, *other))
                .map(|other| FaceId(other as u32))
                .collect(),
        }
    }

    /// Faces reachable from `seed`; empty when `seed` is out of range
    pub fn connected_component(&self, seed: FaceId) -> HashSet<FaceId> {
        if seed.index() >= self.triangles.len() {
            return HashSet::new();
        }
        let component = breadth_first(seed, |face| self.adjacent_faces(face));
        trace!(
            "connected_component: seed {:?} reached {} faces",
            seed,
            component.len()
        );
        component
    }
}

/// Adjacency queries with a per-revision topology cache.
#[derive(Debug, Clone)]
pub struct AdjacencyFinder {
    strategy: AdjacencyStrategy,
    weld: WeldConfig,
    topology: Option<MeshTopology>,
}

impl Default for AdjacencyFinder {
    fn default() -> Self {
        Self::new(AdjacencyStrategy::default(), WeldConfig::default())
    }
}

impl AdjacencyFinder {
    pub fn new(strategy: AdjacencyStrategy, weld: WeldConfig) -> Self {
        Self {
            strategy,
            weld,
            topology: None,
        }
    }

    pub fn strategy(&self) -> AdjacencyStrategy {
        self.strategy
    }

    /// Drop the cached topology
    pub fn invalidate(&mut self) {
        self.topology = None;
    }

    /// Topology for the mesh's current revision, rebuilding if stale
    pub fn topology(&mut self, mesh: &MeshBuffer) -> &MeshTopology {
        let (strategy, weld) = (self.strategy, self.weld);
        if !matches!(&self.topology, Some(t) if t.is_current(mesh)) {
            self.topology = None;
        }
        self.topology
            .get_or_insert_with(|| MeshTopology::build(mesh, strategy, &weld))
    }

    pub fn adjacent_faces(&mut self, mesh: &MeshBuffer, face: FaceId) -> HashSet<FaceId> {
        self.topology(mesh).adjacent_faces(face)
    }

    pub fn connected_component(&mut self, mesh: &MeshBuffer, seed: FaceId) -> HashSet<FaceId> {
        self.topology(mesh).connected_component(seed)
    }
}
