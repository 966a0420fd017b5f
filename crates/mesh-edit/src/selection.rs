//! Face selection set.

use std::collections::HashSet;

use crate::mesh_buffer::MeshBuffer;
use crate::types::FaceId;

/// Set of selected triangles.
///
/// Ids refer to the triangle list the selection was made against. Removing
/// faces renumbers the list, so the selection must be cleared whenever the
/// mesh is rebuilt or reloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceSelection {
    faces: HashSet<FaceId>,
}

impl FaceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `face` if unselected, deselect it otherwise.
    ///
    /// Returns whether the face is selected afterwards.
    pub fn toggle(&mut self, face: FaceId) -> bool {
        if self.faces.remove(&face) {
            false
        } else {
            self.faces.insert(face);
            true
        }
    }

    /// Union a batch of faces into the selection.
    ///
    /// Returns the number of faces that were not already selected.
    pub fn add_all<I>(&mut self, faces: I) -> usize
    where
        I: IntoIterator<Item = FaceId>,
    {
        let before = self.faces.len();
        self.faces.extend(faces);
        self.faces.len() - before
    }

    /// Select every face of `mesh`
    pub fn select_all(&mut self, mesh: &MeshBuffer) {
        self.faces.clear();
        self.faces.extend(mesh.face_ids());
    }

    /// Drop ids that no longer name a triangle of `mesh`.
    ///
    /// Returns how many ids were dropped.
    pub fn retain_valid(&mut self, mesh: &MeshBuffer) -> usize {
        let before = self.faces.len();
        self.faces.retain(|f| mesh.contains_face(*f));
        before - self.faces.len()
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }

    pub fn contains(&self, face: FaceId) -> bool {
        self.faces.contains(&face)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Selected faces in no particular order
    pub fn iter(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().copied()
    }

    /// Selected faces in ascending order
    pub fn to_sorted_vec(&self) -> Vec<FaceId> {
        let mut faces: Vec<FaceId> = self.faces.iter().copied().collect();
        faces.sort_unstable();
        faces
    }
}

impl FromIterator<FaceId> for FaceSelection {
    fn from_iter<I: IntoIterator<Item = FaceId>>(iter: I) -> Self {
        Self {
            faces: iter.into_iter().collect(),
        }
    }
}
