//! Face removal and triangle-list compaction.
//!
//! Removal rebuilds the flat index list without the selected faces. The
//! vertex array is left alone: no welding, no pruning of vertices that are
//! no longer referenced.

use tracing::{debug, info};

use crate::error::InvalidMesh;
use crate::mesh_buffer::MeshBuffer;
use crate::selection::FaceSelection;
use crate::surface::{AreaWeightedNormals, SurfaceData, SurfaceKernel};
use crate::types::FaceId;

/// Index list of `mesh` without the faces in `selection`.
///
/// Faces are copied in ascending order. Selected ids outside the mesh's
/// triangle range match nothing and are ignored.
pub fn compact_indices(mesh: &MeshBuffer, selection: &FaceSelection) -> Vec<u32> {
    let kept = mesh.triangle_count().saturating_sub(selection.len());
    let mut indices = Vec::with_capacity(kept * 3);
    for (face, tri) in mesh.triangles() {
        if !selection.contains(face) {
            indices.extend_from_slice(&tri);
        }
    }
    indices
}

/// A copy of `mesh` without the faces in `selection`.
///
/// The input is not modified. An empty selection yields an equal mesh.
pub fn remove_faces(mesh: &MeshBuffer, selection: &FaceSelection) -> Result<MeshBuffer, InvalidMesh> {
    let mut result = mesh.clone();
    result.replace_triangles(compact_indices(mesh, selection))?;
    Ok(result)
}

/// Old face id → new face id after a compaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceRemap {
    /// Indexed by old face id. `None` for removed faces.
    pub faces: Vec<Option<FaceId>>,
}

impl FaceRemap {
    fn build(triangle_count: usize, selection: &FaceSelection) -> Self {
        let mut next = 0u32;
        let faces = (0..triangle_count as u32)
            .map(|i| {
                if selection.contains(FaceId(i)) {
                    None
                } else {
                    next += 1;
                    Some(FaceId(next - 1))
                }
            })
            .collect();
        Self { faces }
    }

    /// New id of an old face, `None` if it was removed or never existed
    pub fn get(&self, old: FaceId) -> Option<FaceId> {
        self.faces.get(old.index()).copied().flatten()
    }
}

/// Outcome of a committed removal
#[derive(Debug, Clone)]
pub struct Compaction {
    pub removed: usize,
    pub remaining: usize,
    pub face_map: FaceRemap,
    pub surface: SurfaceData,
}

/// Commits face removals in place and refreshes derived surface data.
pub struct MeshCompactor {
    kernel: Box<dyn SurfaceKernel>,
}

impl std::fmt::Debug for MeshCompactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshCompactor").finish_non_exhaustive()
    }
}

impl Default for MeshCompactor {
    fn default() -> Self {
        Self::new(AreaWeightedNormals)
    }
}

impl MeshCompactor {
    pub fn new(kernel: impl SurfaceKernel + 'static) -> Self {
        Self {
            kernel: Box::new(kernel),
        }
    }

    /// Recompute normals and bounds for the mesh's current triangle list
    pub fn recompute_surface(&self, mesh: &MeshBuffer) -> SurfaceData {
        self.kernel.recompute(mesh)
    }

    /// Remove the selected faces from `mesh`.
    ///
    /// On success the triangle list is replaced, surface data recomputed and
    /// `selection` cleared, since its ids no longer match the renumbered
    /// faces. On failure neither `mesh` nor `selection` is changed.
    pub fn commit(
        &self,
        mesh: &mut MeshBuffer,
        selection: &mut FaceSelection,
    ) -> Result<Compaction, InvalidMesh> {
        let compact_start = std::time::Instant::now();
        let before = mesh.triangle_count();
        debug!(
            "commit: START ({} faces, {} selected)",
            before,
            selection.len()
        );

        let indices = compact_indices(mesh, selection);
        let face_map = FaceRemap::build(before, selection);
        mesh.replace_triangles(indices)?;

        let surface = self.kernel.recompute(mesh);
        let remaining = mesh.triangle_count();
        let removed = before - remaining;
        selection.clear();

        info!(
            "Removed {} faces ({} remaining) in {:?}",
            removed,
            remaining,
            compact_start.elapsed()
        );

        Ok(Compaction {
            removed,
            remaining,
            face_map,
            surface,
        })
    }
}
