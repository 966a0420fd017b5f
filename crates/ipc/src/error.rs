//! Error types for the host protocol.

/// Errors raised while encoding or decoding protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty payload")]
    EmptyPayload,

    #[error("Invalid pointer position ({x}, {y})")]
    InvalidPointer { x: f32, y: f32 },
}
