//! Interactive face removal for triangle meshes.
//!
//! The crate provides the editing core behind the face cutter tool:
//! - [`mesh_buffer::MeshBuffer`] - validated vertex positions and a flat triangle index list
//! - [`selection::FaceSelection`] - the set of picked faces
//! - [`adjacency`] - shared-edge adjacency and connected-region search
//! - [`compactor`] - face removal with surface recomputation
//! - [`raycast`] - pointer hit testing
//! - [`persist`] - mesh assets on disk
//! - [`session::EditSession`] - the editing session hosts drive

pub mod adjacency;
pub mod compactor;
pub mod error;
pub mod mesh_buffer;
pub mod persist;
pub mod raycast;
pub mod selection;
pub mod session;
pub mod surface;
pub mod types;

pub use adjacency::{AdjacencyFinder, MeshTopology, WeldMap, are_adjacent, connected_component};
pub use compactor::{Compaction, FaceRemap, MeshCompactor, remove_faces};
pub use error::{EditError, InvalidMesh, PersistError};
pub use mesh_buffer::MeshBuffer;
pub use persist::{AssetPersister, FileAssetPersister, MeshAsset};
pub use raycast::{Camera, HitTester, MeshRaycaster, Ray, SurfaceHit};
pub use selection::FaceSelection;
pub use session::{CommandOutcome, EditSession, PointerOutcome};
pub use surface::{Aabb, AreaWeightedNormals, SurfaceData, SurfaceKernel};
pub use types::{FaceId, ObjectId};

pub use facecut_config as config;
pub use facecut_ipc as ipc;
pub use glam;
