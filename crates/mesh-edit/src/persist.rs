//! Mesh asset persistence.
//!
//! The editing core only needs [`AssetPersister::save`]. Hosts with their own
//! asset database implement the trait themselves; [`FileAssetPersister`]
//! covers the plain filesystem case and can read back what it wrote.
//!
//! ## Binary layout
//!
//! ```text
//! AssetHeader (20 bytes)  magic "FCMESH\0\0", version, vertex count, index count
//! positions               vertex count * 3 f32
//! indices                 index count u32
//! ```
//!
//! All values are in native byte order.

use std::path::{Component, Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use facecut_config::{AssetFormat, SaveConfig};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PersistError;
use crate::mesh_buffer::MeshBuffer;

/// Current mesh asset schema version
pub const ASSET_VERSION: u32 = 1;

const ASSET_MAGIC: [u8; 8] = *b"FCMESH\0\0";

/// Writes finished meshes to durable storage.
pub trait AssetPersister {
    /// Persist `mesh` at `path`. Callers guarantee `path` is not empty.
    fn save(&mut self, mesh: &MeshBuffer, path: &str) -> Result<(), PersistError>;
}

/// Serialized form of a [`MeshBuffer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshAsset {
    /// Schema version
    pub version: u32,
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshAsset {
    pub fn from_mesh(mesh: &MeshBuffer) -> Self {
        Self {
            version: ASSET_VERSION,
            positions: mesh.positions().iter().map(|p| p.to_array()).collect(),
            indices: mesh.indices().to_vec(),
        }
    }

    /// Validate and convert into a mesh
    pub fn into_mesh(self) -> Result<MeshBuffer, PersistError> {
        if self.version != ASSET_VERSION {
            return Err(PersistError::format(format!(
                "unsupported asset version {}",
                self.version
            )));
        }
        let positions = self.positions.into_iter().map(Vec3::from_array).collect();
        Ok(MeshBuffer::new(positions, self.indices)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, PersistError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PersistError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        let header = AssetHeader {
            magic: ASSET_MAGIC,
            version: self.version,
            vertex_count: self.positions.len() as u32,
            index_count: self.indices.len() as u32,
        };

        let positions: &[u8] = bytemuck::cast_slice(&self.positions);
        let indices: &[u8] = bytemuck::cast_slice(&self.indices);

        let mut bytes = Vec::with_capacity(AssetHeader::SIZE + positions.len() + indices.len());
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(positions);
        bytes.extend_from_slice(indices);
        bytes
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < AssetHeader::SIZE {
            return Err(PersistError::format(format!(
                "expected at least {} header bytes, got {}",
                AssetHeader::SIZE,
                bytes.len()
            )));
        }

        let header: AssetHeader = bytemuck::pod_read_unaligned(&bytes[..AssetHeader::SIZE]);
        if header.magic != ASSET_MAGIC {
            return Err(PersistError::format("bad magic"));
        }

        let position_bytes = header.vertex_count as usize * std::mem::size_of::<[f32; 3]>();
        let index_bytes = header.index_count as usize * std::mem::size_of::<u32>();
        let body = &bytes[AssetHeader::SIZE..];
        if body.len() != position_bytes + index_bytes {
            return Err(PersistError::format(format!(
                "expected {} body bytes for {} vertices and {} indices, got {}",
                position_bytes + index_bytes,
                header.vertex_count,
                header.index_count,
                body.len()
            )));
        }

        let (position_body, index_body) = body.split_at(position_bytes);
        Ok(Self {
            version: header.version,
            positions: bytemuck::pod_collect_to_vec(position_body),
            indices: bytemuck::pod_collect_to_vec(index_body),
        })
    }

    /// Decode either encoding, telling them apart by the binary magic
    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.starts_with(&ASSET_MAGIC) {
            Self::from_binary(bytes)
        } else {
            Self::from_json(bytes)
        }
    }
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct AssetHeader {
    magic: [u8; 8],
    version: u32,
    vertex_count: u32,
    index_count: u32,
}

impl AssetHeader {
    const SIZE: usize = std::mem::size_of::<AssetHeader>();
}

/// Persists meshes as files below a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetPersister {
    root: PathBuf,
    format: AssetFormat,
    extension: String,
}

impl FileAssetPersister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &SaveConfig::default())
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &SaveConfig) -> Self {
        Self {
            root: root.into(),
            format: config.format,
            extension: config.extension.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for an asset path, adding the configured extension if the
    /// path has none.
    ///
    /// Asset paths are relative to the root and may not climb out of it:
    /// absolute paths and `..` components are rejected.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, PersistError> {
        let relative = Path::new(path);
        if let Some(component) = relative.components().find(|c| {
            matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir)
        }) {
            return Err(PersistError::format(format!(
                "asset path {path:?} escapes the asset root at {component:?}"
            )));
        }

        let mut resolved = self.root.join(relative);
        if resolved.extension().is_none() && !self.extension.is_empty() {
            resolved.set_extension(&self.extension);
        }
        Ok(resolved)
    }

    /// Read a mesh previously written by any [`FileAssetPersister`]
    pub fn load(&self, path: &str) -> Result<MeshBuffer, PersistError> {
        let resolved = self.resolve(path)?;
        let bytes = std::fs::read(&resolved).map_err(|e| PersistError::io(&resolved, e))?;
        let mesh = MeshAsset::decode(&bytes)?.into_mesh()?;
        debug!(
            "Loaded mesh from {} ({} vertices, {} faces)",
            resolved.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

impl AssetPersister for FileAssetPersister {
    fn save(&mut self, mesh: &MeshBuffer, path: &str) -> Result<(), PersistError> {
        if path.is_empty() {
            return Err(PersistError::format("empty destination path"));
        }

        let asset = MeshAsset::from_mesh(mesh);
        let bytes = match self.format {
            AssetFormat::Json => asset.to_json()?,
            AssetFormat::Binary => asset.to_binary(),
        };

        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
        }

        // Write next to the target and rename so a failed write leaves no partial asset
        let mut temp_name = resolved.clone().into_os_string();
        temp_name.push(".tmp");
        let temp = PathBuf::from(temp_name);

        if let Err(e) = std::fs::write(&temp, &bytes) {
            discard_temp(&temp);
            return Err(PersistError::io(&temp, e));
        }
        if let Err(e) = std::fs::rename(&temp, &resolved) {
            discard_temp(&temp);
            return Err(PersistError::io(&resolved, e));
        }

        info!(
            "Mesh saved to {} ({:?}, {} bytes)",
            resolved.display(),
            self.format,
            bytes.len()
        );
        Ok(())
    }
}

/// Remove a leftover temp file; a file that was never created is fine
fn discard_temp(temp: &Path) {
    match std::fs::remove_file(temp) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", temp.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_buffer::fixtures::{line_positions, quad_and_islands};

    #[test]
    fn test_asset_version_checked() {
        let mut asset = MeshAsset::from_mesh(&quad_and_islands());
        asset.version = 99;
        assert!(matches!(asset.into_mesh(), Err(PersistError::Format { .. })));
    }

    #[test]
    fn test_asset_with_bad_indices_rejected() {
        let asset = MeshAsset {
            version: ASSET_VERSION,
            positions: vec![[0.0; 3]; 2],
            indices: vec![0, 1, 2],
        };
        assert!(matches!(asset.into_mesh(), Err(PersistError::InvalidMesh(_))));
    }

    #[test]
    fn test_binary_header_size() {
        assert_eq!(AssetHeader::SIZE, 20);
        let bytes = MeshAsset::from_mesh(&MeshBuffer::empty()).to_binary();
        assert_eq!(bytes.len(), 20);
        assert!(bytes.starts_with(b"FCMESH"));
    }

    #[test]
    fn test_binary_rejects_truncated_body() {
        let mut bytes = MeshAsset::from_mesh(&quad_and_islands()).to_binary();
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(
            MeshAsset::from_binary(&bytes),
            Err(PersistError::Format { .. })
        ));
        assert!(MeshAsset::from_binary(&bytes[..10]).is_err());
    }

    #[test]
    fn test_decode_detects_format() {
        let asset = MeshAsset::from_mesh(&quad_and_islands());
        assert_eq!(MeshAsset::decode(&asset.to_binary()).unwrap(), asset);
        assert_eq!(MeshAsset::decode(&asset.to_json().unwrap()).unwrap(), asset);
        assert!(matches!(
            MeshAsset::decode(b"not a mesh"),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn test_resolve_adds_extension() {
        let persister = FileAssetPersister::new("/project/Assets");
        assert_eq!(
            persister.resolve("Meshes/Cut").unwrap(),
            PathBuf::from("/project/Assets/Meshes/Cut.asset")
        );
        assert_eq!(
            persister.resolve("Meshes/Cut.mesh").unwrap(),
            PathBuf::from("/project/Assets/Meshes/Cut.mesh")
        );
        assert_eq!(
            persister.resolve("./Meshes/Cut").unwrap(),
            PathBuf::from("/project/Assets/Meshes/Cut.asset")
        );
    }

    #[test]
    fn test_file_roundtrip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut degenerate = MeshBuffer::new(line_positions(4), vec![0, 1, 2]).unwrap();
        degenerate.replace_triangles(Vec::new()).unwrap();

        for format in [AssetFormat::Json, AssetFormat::Binary] {
            let config = SaveConfig {
                format,
                ..SaveConfig::default()
            };
            let mut persister = FileAssetPersister::from_config(dir.path(), &config);

            for (name, mesh) in [("full", quad_and_islands()), ("degenerate", degenerate.clone())] {
                let path = format!("{format:?}/{name}");
                persister.save(&mesh, &path).unwrap();
                assert!(persister.resolve(&path).unwrap().exists());
                assert_eq!(persister.load(&path).unwrap(), mesh);
            }
        }
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut persister = FileAssetPersister::new(dir.path());
        persister.save(&quad_and_islands(), "NewMesh").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["NewMesh.asset".to_string()]);
    }

    #[test]
    fn test_save_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), b"x").unwrap();
        let mut persister = FileAssetPersister::new(dir.path());

        let result = persister.save(&quad_and_islands(), "blocker/mesh");
        assert!(matches!(result, Err(PersistError::Io { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let persister = FileAssetPersister::new(dir.path());
        assert!(matches!(persister.load("missing"), Err(PersistError::Io { .. })));
    }

    #[test]
    fn test_save_rejects_escaping_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Assets");
        let mut persister = FileAssetPersister::new(&root);
        let mesh = quad_and_islands();

        let absolute = dir.path().join("outside");
        let absolute = absolute.to_str().unwrap();
        for path in [absolute, "../escaped", "Meshes/../../escaped"] {
            assert!(matches!(
                persister.save(&mesh, path),
                Err(PersistError::Format { .. })
            ));
            assert!(matches!(persister.load(path), Err(PersistError::Format { .. })));
        }

        assert!(!dir.path().join("outside.asset").exists());
        assert!(!dir.path().join("escaped.asset").exists());
        assert!(!root.exists());
    }

    #[test]
    fn test_discard_temp() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("NewMesh.asset.tmp");
        std::fs::write(&temp, b"partial").unwrap();

        discard_temp(&temp);
        assert!(!temp.exists());
        // Already gone: nothing to do
        discard_temp(&temp);
    }
}
