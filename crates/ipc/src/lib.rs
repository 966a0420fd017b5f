//! Host protocol for Facecut
//!
//! Defines the message types exchanged between a host editor and a face
//! editing session: pointer input, session commands and outbound
//! notifications. Everything is plain serde data so hosts can move it over
//! whatever channel they already have (in-process calls, a webview bridge,
//! JSON over a socket).

mod commands;
mod error;
mod input;
mod messages;

pub use commands::SessionCommand;
pub use error::IpcError;
pub use input::{Modifiers, MouseButton, PointerDown};
pub use messages::{EditorToHost, OutboundMessages};

/// Decode a command sent by the host as JSON.
pub fn parse_command(json: &str) -> Result<SessionCommand, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::EmptyPayload);
    }
    Ok(serde_json::from_str(json)?)
}

/// Decode a pointer press sent by the host as JSON.
///
/// Non-finite coordinates are rejected since they cannot be unprojected.
pub fn parse_pointer(json: &str) -> Result<PointerDown, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::EmptyPayload);
    }
    let pointer: PointerDown = serde_json::from_str(json)?;
    if !pointer.x.is_finite() || !pointer.y.is_finite() {
        return Err(IpcError::InvalidPointer {
            x: pointer.x,
            y: pointer.y,
        });
    }
    Ok(pointer)
}

/// Encode an outbound message as JSON.
pub fn encode_message(msg: &EditorToHost) -> Result<String, IpcError> {
    Ok(serde_json::to_string(msg)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_command() {
        let cmd = parse_command(r#"{"type":"RemoveSelected"}"#).unwrap();
        assert_eq!(cmd, SessionCommand::RemoveSelected);
        assert_eq!(cmd.name(), "remove_selected");
    }

    #[test]
    fn test_parse_save_command() {
        let cmd = parse_command(r#"{"type":"Save","data":{"path":"Meshes/Cut.asset"}}"#).unwrap();
        assert_eq!(
            cmd,
            SessionCommand::Save {
                path: "Meshes/Cut.asset".to_string()
            }
        );
    }

    #[test]
    fn test_parse_empty_command() {
        assert!(matches!(parse_command("  "), Err(IpcError::EmptyPayload)));
        assert!(matches!(
            parse_command(r#"{"type":"Explode"}"#),
            Err(IpcError::Json(_))
        ));
    }

    #[test]
    fn test_parse_pointer_defaults_modifiers() {
        let pointer = parse_pointer(r#"{"button":"Left","x":10.0,"y":20.5}"#).unwrap();
        assert_eq!(pointer.button, MouseButton::Left);
        assert_eq!(pointer.position(), [10.0, 20.5]);
        assert_eq!(pointer.modifiers, Modifiers::NONE);
    }

    #[test]
    fn test_parse_pointer_with_ctrl() {
        let pointer = parse_pointer(
            r#"{"button":"Left","x":1.0,"y":2.0,"modifiers":{"shift":false,"ctrl":true,"alt":false,"meta":false}}"#,
        )
        .unwrap();
        assert_eq!(pointer, PointerDown::left(1.0, 2.0, Modifiers::CTRL));
    }

    #[test]
    fn test_encode_message_shape() {
        let json = encode_message(&EditorToHost::FacesRemoved {
            removed: 2,
            remaining: 10,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"FacesRemoved","data":{"removed":2,"remaining":10}}"#
        );

        let json = encode_message(&EditorToHost::SaveCancelled).unwrap();
        assert_eq!(json, r#"{"type":"SaveCancelled"}"#);
    }

    #[test]
    fn test_outbound_drain() {
        let mut outbound = OutboundMessages::default();
        outbound.send(EditorToHost::SelectionChanged { face_count: 3 });
        outbound.send(EditorToHost::SaveCancelled);
        assert_eq!(outbound.len(), 2);

        let drained = outbound.drain();
        assert_eq!(drained.len(), 2);
        assert!(outbound.is_empty());
    }
}
