//! Face editing session for one mesh-bearing object.
//!
//! The session owns the working mesh and the face selection. Hosts feed it
//! pointer presses and commands, then drain [`OutboundMessages`] once per
//! frame to update their UI.

use facecut_config::{EditorConfig, SaveConfig, SelectModifier};
use facecut_ipc::{EditorToHost, Modifiers, MouseButton, OutboundMessages, PointerDown, SessionCommand};
use glam::Vec2;
use tracing::{debug, info, warn};

use crate::adjacency::AdjacencyFinder;
use crate::compactor::MeshCompactor;
use crate::error::EditError;
use crate::mesh_buffer::MeshBuffer;
use crate::persist::AssetPersister;
use crate::raycast::HitTester;
use crate::selection::FaceSelection;
use crate::surface::SurfaceData;
use crate::types::{FaceId, ObjectId};

/// What a pointer press did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Not a selection click, or nothing of this object under the pointer
    Ignored,
    /// A single face was toggled
    Toggled { face: FaceId, selected: bool },
    /// The connected region around `face` was added
    Extended { face: FaceId, added: usize },
}

/// Result of a successfully handled command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Removed { removed: usize, remaining: usize },
    SelectionCleared,
    Selected { face_count: usize },
    Saved { path: String },
}

/// Whether the connected-select chord is held
fn modifier_held(modifier: SelectModifier, held: Modifiers) -> bool {
    match modifier {
        SelectModifier::Ctrl => held.ctrl,
        SelectModifier::Shift => held.shift,
        SelectModifier::Meta => held.meta,
    }
}

/// Editing state for the object being cut.
#[derive(Debug)]
pub struct EditSession {
    object: ObjectId,
    mesh: MeshBuffer,
    selection: FaceSelection,
    adjacency: AdjacencyFinder,
    compactor: MeshCompactor,
    surface: SurfaceData,
    select_modifier: SelectModifier,
    save: SaveConfig,
    last_saved_path: Option<String>,
    outbound: OutboundMessages,
}

impl EditSession {
    pub fn new(object: ObjectId, mesh: MeshBuffer, config: &EditorConfig) -> Self {
        let compactor = MeshCompactor::default();
        let surface = compactor.recompute_surface(&mesh);
        info!(
            "Editing object {:?} ({} vertices, {} faces)",
            object,
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        Self {
            object,
            mesh,
            selection: FaceSelection::new(),
            adjacency: AdjacencyFinder::new(config.adjacency, config.weld),
            compactor,
            surface,
            select_modifier: config.select_modifier,
            save: config.save.clone(),
            last_saved_path: None,
            outbound: OutboundMessages::default(),
        }
    }

    /// Use a custom compactor (and so a custom surface kernel)
    pub fn with_compactor(mut self, compactor: MeshCompactor) -> Self {
        self.surface = compactor.recompute_surface(&self.mesh);
        self.compactor = compactor;
        self
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn mesh(&self) -> &MeshBuffer {
        &self.mesh
    }

    pub fn selection(&self) -> &FaceSelection {
        &self.selection
    }

    pub fn surface(&self) -> &SurfaceData {
        &self.surface
    }

    pub fn last_saved_path(&self) -> Option<&str> {
        self.last_saved_path.as_deref()
    }

    /// File name offered in the host's save dialog
    pub fn suggested_file_name(&self) -> String {
        self.save.suggested_file_name()
    }

    pub fn outbound(&self) -> &OutboundMessages {
        &self.outbound
    }

    /// Take every queued host notification
    pub fn drain_messages(&mut self) -> Vec<EditorToHost> {
        self.outbound.drain()
    }

    /// Swap in a new working mesh, e.g. after the host re-imported the asset.
    pub fn reload(&mut self, mesh: MeshBuffer) {
        self.mesh = mesh;
        self.adjacency.invalidate();
        self.surface = self.compactor.recompute_surface(&self.mesh);
        let had_selection = !self.selection.is_empty();
        self.selection.clear();
        if had_selection {
            self.send_selection_update();
        }
        debug!(
            "Reloaded mesh for {:?} ({} faces)",
            self.object,
            self.mesh.triangle_count()
        );
    }

    /// Handle a button press in the viewport.
    pub fn on_pointer_down(
        &mut self,
        hit_tester: &impl HitTester,
        pointer: PointerDown,
    ) -> PointerOutcome {
        // Alt + left drag orbits the viewport
        if pointer.button != MouseButton::Left || pointer.modifiers.alt {
            return PointerOutcome::Ignored;
        }

        let Some(hit) = hit_tester.hit_test(Vec2::from_array(pointer.position()), &self.mesh) else {
            return PointerOutcome::Ignored;
        };
        if hit.object != self.object || !self.mesh.contains_face(hit.face) {
            debug!("Ignoring hit on {:?} face {:?}", hit.object, hit.face);
            return PointerOutcome::Ignored;
        }

        let outcome = if modifier_held(self.select_modifier, pointer.modifiers) {
            let region = self.adjacency.connected_component(&self.mesh, hit.face);
            let added = self.selection.add_all(region);
            debug!("Connected select from {:?} added {} faces", hit.face, added);
            PointerOutcome::Extended {
                face: hit.face,
                added,
            }
        } else {
            let selected = self.selection.toggle(hit.face);
            PointerOutcome::Toggled {
                face: hit.face,
                selected,
            }
        };

        self.send_selection_update();
        outcome
    }

    /// Handle a command from the host.
    ///
    /// Failures are also reported to the host as messages. A failed command
    /// leaves the mesh and selection as they were.
    pub fn on_command(
        &mut self,
        command: SessionCommand,
        persister: &mut impl AssetPersister,
    ) -> Result<CommandOutcome, EditError> {
        debug!("Handling command {}", command.name());
        let result = match command {
            SessionCommand::RemoveSelected => self.remove_selected(),
            SessionCommand::Refresh | SessionCommand::DeselectAll => {
                self.selection.clear();
                self.send_selection_update();
                Ok(CommandOutcome::SelectionCleared)
            }
            SessionCommand::SelectAll => {
                self.selection.select_all(&self.mesh);
                self.send_selection_update();
                Ok(CommandOutcome::Selected {
                    face_count: self.selection.len(),
                })
            }
            SessionCommand::Save { path } => self.save(&path, persister),
        };

        if let Err(e) = &result {
            if e.is_cancellation() {
                info!("Save cancelled");
                self.outbound.send(EditorToHost::SaveCancelled);
            } else {
                warn!("Command failed: {}", e);
                self.outbound.send(EditorToHost::Error {
                    code: e.code().to_string(),
                    message: e.to_string(),
                });
            }
        }
        result
    }

    fn remove_selected(&mut self) -> Result<CommandOutcome, EditError> {
        if self.selection.is_empty() {
            return Ok(CommandOutcome::Removed {
                removed: 0,
                remaining: self.mesh.triangle_count(),
            });
        }

        let compaction = self.compactor.commit(&mut self.mesh, &mut self.selection)?;
        self.adjacency.invalidate();
        self.surface = compaction.surface;

        self.outbound.send(EditorToHost::FacesRemoved {
            removed: compaction.removed,
            remaining: compaction.remaining,
        });
        self.send_selection_update();

        Ok(CommandOutcome::Removed {
            removed: compaction.removed,
            remaining: compaction.remaining,
        })
    }

    fn save(
        &mut self,
        path: &str,
        persister: &mut impl AssetPersister,
    ) -> Result<CommandOutcome, EditError> {
        if path.is_empty() {
            return Err(EditError::EmptyPath);
        }

        persister.save(&self.mesh, path)?;
        self.last_saved_path = Some(path.to_string());
        self.outbound.send(EditorToHost::MeshSaved {
            path: path.to_string(),
        });
        Ok(CommandOutcome::Saved {
            path: path.to_string(),
        })
    }

    fn send_selection_update(&mut self) {
        self.outbound.send(EditorToHost::SelectionChanged {
            face_count: self.selection.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistError;
    use crate::mesh_buffer::fixtures::quad_and_islands;
    use crate::raycast::SurfaceHit;

    const OBJECT: ObjectId = ObjectId(1);

    /// Persister that keeps saved meshes in memory, or fails every save
    #[derive(Default)]
    struct MemoryPersister {
        saved: Vec<(String, MeshBuffer)>,
        fail: bool,
    }

    impl AssetPersister for MemoryPersister {
        fn save(&mut self, mesh: &MeshBuffer, path: &str) -> Result<(), PersistError> {
            if self.fail {
                return Err(PersistError::format("disk full"));
            }
            self.saved.push((path.to_string(), mesh.clone()));
            Ok(())
        }
    }

    /// Hit tester that always reports `face` on `object`
    fn hit(object: ObjectId, face: u32) -> impl Fn(Vec2, &MeshBuffer) -> Option<SurfaceHit> {
        move |_: Vec2, _: &MeshBuffer| {
            Some(SurfaceHit {
                object,
                face: FaceId(face),
                distance: 1.0,
            })
        }
    }

    fn miss(_: Vec2, _: &MeshBuffer) -> Option<SurfaceHit> {
        None
    }

    fn session() -> EditSession {
        EditSession::new(OBJECT, quad_and_islands(), &EditorConfig::default())
    }

    fn click(mods: Modifiers) -> PointerDown {
        PointerDown::left(10.0, 10.0, mods)
    }

    #[test]
    fn test_click_toggles_face() {
        let mut s = session();
        let outcome = s.on_pointer_down(&hit(OBJECT, 2), click(Modifiers::NONE));
        assert_eq!(
            outcome,
            PointerOutcome::Toggled {
                face: FaceId(2),
                selected: true
            }
        );
        assert!(s.selection().contains(FaceId(2)));

        s.on_pointer_down(&hit(OBJECT, 2), click(Modifiers::NONE));
        assert!(s.selection().is_empty());

        assert_eq!(
            s.drain_messages(),
            vec![
                EditorToHost::SelectionChanged { face_count: 1 },
                EditorToHost::SelectionChanged { face_count: 0 },
            ]
        );
    }

    #[test]
    fn test_ctrl_click_selects_connected_region() {
        let mut s = session();
        let outcome = s.on_pointer_down(&hit(OBJECT, 0), click(Modifiers::CTRL));
        assert_eq!(
            outcome,
            PointerOutcome::Extended {
                face: FaceId(0),
                added: 2
            }
        );
        assert_eq!(s.selection().to_sorted_vec(), vec![FaceId(0), FaceId(1)]);

        // Union, not toggle: a second ctrl click adds nothing and removes nothing
        let again = s.on_pointer_down(&hit(OBJECT, 1), click(Modifiers::CTRL));
        assert_eq!(
            again,
            PointerOutcome::Extended {
                face: FaceId(1),
                added: 0
            }
        );
        assert_eq!(s.selection().len(), 2);
    }

    #[test]
    fn test_configured_select_modifier() {
        let config = EditorConfig {
            select_modifier: SelectModifier::Shift,
            ..EditorConfig::default()
        };
        let mut s = EditSession::new(OBJECT, quad_and_islands(), &config);

        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        s.on_pointer_down(&hit(OBJECT, 1), click(shift));
        assert_eq!(s.selection().len(), 2);

        // Ctrl is a plain click under this configuration
        s.on_pointer_down(&hit(OBJECT, 2), click(Modifiers::CTRL));
        assert_eq!(s.selection().len(), 3);
    }

    #[test]
    fn test_non_selection_clicks_ignored() {
        let mut s = session();
        let right = PointerDown {
            button: MouseButton::Right,
            ..click(Modifiers::NONE)
        };
        assert_eq!(s.on_pointer_down(&hit(OBJECT, 0), right), PointerOutcome::Ignored);
        assert_eq!(
            s.on_pointer_down(&hit(OBJECT, 0), click(Modifiers::ALT)),
            PointerOutcome::Ignored
        );
        assert_eq!(s.on_pointer_down(&miss, click(Modifiers::NONE)), PointerOutcome::Ignored);
        assert_eq!(
            s.on_pointer_down(&hit(ObjectId(2), 0), click(Modifiers::NONE)),
            PointerOutcome::Ignored
        );
        assert_eq!(
            s.on_pointer_down(&hit(OBJECT, 99), click(Modifiers::NONE)),
            PointerOutcome::Ignored
        );

        assert!(s.selection().is_empty());
        assert!(s.outbound().is_empty());
    }

    #[test]
    fn test_remove_selected() {
        let mut s = session();
        let mut persister = MemoryPersister::default();
        s.on_pointer_down(&hit(OBJECT, 0), click(Modifiers::CTRL));
        s.drain_messages();

        let outcome = s.on_command(SessionCommand::RemoveSelected, &mut persister).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Removed {
                removed: 2,
                remaining: 2
            }
        );
        assert_eq!(s.mesh().indices(), &[4, 5, 6, 7, 8, 9]);
        assert_eq!(s.mesh().vertex_count(), 10);
        assert!(s.selection().is_empty());
        assert!(s.surface().is_current(s.mesh()));

        assert_eq!(
            s.drain_messages(),
            vec![
                EditorToHost::FacesRemoved {
                    removed: 2,
                    remaining: 2
                },
                EditorToHost::SelectionChanged { face_count: 0 },
            ]
        );

        // Adjacency follows the compacted mesh: old face 2 is now face 0
        s.on_pointer_down(&hit(OBJECT, 0), click(Modifiers::CTRL));
        assert_eq!(s.selection().to_sorted_vec(), vec![FaceId(0)]);
    }

    #[test]
    fn test_remove_with_empty_selection_is_noop() {
        let mut s = session();
        let before = s.mesh().clone();
        let outcome = s
            .on_command(SessionCommand::RemoveSelected, &mut MemoryPersister::default())
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Removed {
                removed: 0,
                remaining: 4
            }
        );
        assert_eq!(s.mesh(), &before);
        assert!(s.outbound().is_empty());
    }

    #[test]
    fn test_select_all_and_refresh() {
        let mut s = session();
        let mut persister = MemoryPersister::default();
        assert_eq!(
            s.on_command(SessionCommand::SelectAll, &mut persister).unwrap(),
            CommandOutcome::Selected { face_count: 4 }
        );
        assert_eq!(
            s.on_command(SessionCommand::Refresh, &mut persister).unwrap(),
            CommandOutcome::SelectionCleared
        );
        assert!(s.selection().is_empty());
        assert_eq!(s.mesh().triangle_count(), 4);
    }

    #[test]
    fn test_save_records_path() {
        let mut s = session();
        let mut persister = MemoryPersister::default();
        s.on_pointer_down(&hit(OBJECT, 3), click(Modifiers::NONE));
        s.on_command(SessionCommand::RemoveSelected, &mut persister).unwrap();
        s.drain_messages();

        let outcome = s
            .on_command(
                SessionCommand::Save {
                    path: "Assets/Cut".to_string(),
                },
                &mut persister,
            )
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Saved {
                path: "Assets/Cut".to_string()
            }
        );
        assert_eq!(s.last_saved_path(), Some("Assets/Cut"));
        assert_eq!(persister.saved.len(), 1);
        assert_eq!(persister.saved[0].1.triangle_count(), 3);
        assert_eq!(
            s.drain_messages(),
            vec![EditorToHost::MeshSaved {
                path: "Assets/Cut".to_string()
            }]
        );
    }

    #[test]
    fn test_save_with_empty_path_is_cancel() {
        let mut s = session();
        let mut persister = MemoryPersister::default();
        s.on_pointer_down(&hit(OBJECT, 0), click(Modifiers::NONE));
        s.drain_messages();

        let err = s
            .on_command(
                SessionCommand::Save {
                    path: String::new(),
                },
                &mut persister,
            )
            .unwrap_err();
        assert!(matches!(err, EditError::EmptyPath));
        assert!(persister.saved.is_empty());
        assert_eq!(s.selection().len(), 1);
        assert_eq!(s.last_saved_path(), None);
        assert_eq!(s.drain_messages(), vec![EditorToHost::SaveCancelled]);
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let mut s = session();
        let mut persister = MemoryPersister {
            fail: true,
            ..MemoryPersister::default()
        };
        s.on_pointer_down(&hit(OBJECT, 0), click(Modifiers::NONE));
        s.drain_messages();
        let before = s.mesh().clone();

        let err = s
            .on_command(
                SessionCommand::Save {
                    path: "Assets/Cut".to_string(),
                },
                &mut persister,
            )
            .unwrap_err();
        assert_eq!(err.code(), "persist_failed");
        assert_eq!(s.mesh(), &before);
        assert_eq!(s.selection().len(), 1);
        assert_eq!(s.last_saved_path(), None);

        let messages = s.drain_messages();
        assert_eq!(messages.len(), 1);
        assert!(matches!(
            &messages[0],
            EditorToHost::Error { code, .. } if code == "persist_failed"
        ));
    }

    #[test]
    fn test_reload_clears_selection() {
        let mut s = session();
        s.on_pointer_down(&hit(OBJECT, 3), click(Modifiers::NONE));
        s.drain_messages();

        let mut smaller = quad_and_islands();
        smaller.replace_triangles(vec![0, 2, 1]).unwrap();
        s.reload(smaller);

        assert!(s.selection().is_empty());
        assert_eq!(s.mesh().triangle_count(), 1);
        assert!(s.surface().is_current(s.mesh()));
        assert_eq!(
            s.drain_messages(),
            vec![EditorToHost::SelectionChanged { face_count: 0 }]
        );
        assert_eq!(
            s.on_pointer_down(&hit(OBJECT, 3), click(Modifiers::NONE)),
            PointerOutcome::Ignored
        );
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(session().suggested_file_name(), "NewMesh.asset");
    }
}
