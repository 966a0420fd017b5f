//! Face editing command types.

use serde::{Deserialize, Serialize};

/// Commands the host sends to a face editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionCommand {
    /// Delete every selected face from the working mesh
    RemoveSelected,
    /// Drop the current selection (mesh reloaded by the host)
    Refresh,
    /// Select every face of the working mesh
    SelectAll,
    /// Deselect all faces
    DeselectAll,
    /// Persist the working mesh to `path`. An empty path means the
    /// user cancelled the save dialog.
    Save { path: String },
}

impl SessionCommand {
    /// Short name used in logs and error codes
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::RemoveSelected => "remove_selected",
            SessionCommand::Refresh => "refresh",
            SessionCommand::SelectAll => "select_all",
            SessionCommand::DeselectAll => "deselect_all",
            SessionCommand::Save { .. } => "save",
        }
    }
}
