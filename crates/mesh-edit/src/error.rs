//! Error types for mesh editing.

use std::path::PathBuf;

/// A triangle index array that cannot describe a mesh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMesh {
    #[error("index count {index_count} is not a multiple of 3")]
    PartialTriangle { index_count: usize },

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Errors raised by an asset persister.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode or decode mesh asset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed mesh asset: {reason}")]
    Format { reason: String },

    #[error("Mesh asset contains an invalid mesh: {0}")]
    InvalidMesh(#[from] InvalidMesh),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(reason: impl Into<String>) -> Self {
        PersistError::Format {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to the command handler of an editing session.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(#[from] InvalidMesh),

    /// Save requested with no destination. Hosts treat this as a cancel.
    #[error("Save requested without a destination path")]
    EmptyPath,

    #[error("Failed to save mesh: {0}")]
    Persist(#[from] PersistError),
}

impl EditError {
    /// Stable code reported to the host
    pub fn code(&self) -> &'static str {
        match self {
            EditError::InvalidMesh(_) => "invalid_mesh",
            EditError::EmptyPath => "empty_path",
            EditError::Persist(_) => "persist_failed",
        }
    }

    /// Whether the error is a user cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EditError::EmptyPath)
    }
}
