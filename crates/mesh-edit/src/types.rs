//! Identifier types shared across the crate.

use serde::{Deserialize, Serialize};

/// Type-safe triangle identifier.
///
/// Triangle ids are dense: face `i` lives at flat index positions
/// `3i..3i + 3`. Removing faces renumbers every face after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl FaceId {
    /// Position of this face in the triangle list
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for FaceId {
    fn from(value: u32) -> Self {
        FaceId(value)
    }
}

/// Identity of a mesh-bearing object in the host scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);
