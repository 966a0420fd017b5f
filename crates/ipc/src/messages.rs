//! Notifications from a face editing session back to the host.

use serde::{Deserialize, Serialize};

/// Messages from the editing session to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorToHost {
    /// Face selection changed
    SelectionChanged {
        /// Number of selected faces
        face_count: usize,
    },

    /// Selected faces were deleted from the working mesh
    FacesRemoved {
        /// Faces deleted by this commit
        removed: usize,
        /// Faces left in the mesh
        remaining: usize,
    },

    /// The working mesh was written to an asset
    MeshSaved { path: String },

    /// Save was requested without a destination
    SaveCancelled,

    /// Error notification
    Error { code: String, message: String },
}

/// Queue of outbound messages, drained by the host once per frame.
#[derive(Debug, Default)]
pub struct OutboundMessages {
    pub messages: Vec<EditorToHost>,
}

impl OutboundMessages {
    /// Queue a message to be sent to the host
    pub fn send(&mut self, msg: EditorToHost) {
        self.messages.push(msg);
    }

    /// Take all queued messages, leaving the queue empty
    pub fn drain(&mut self) -> Vec<EditorToHost> {
        std::mem::take(&mut self.messages)
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
