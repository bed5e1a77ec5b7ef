//! Editor message handlers.
//!
//! Messages are drained once per frame, before the lifecycle passes, and
//! each handler runs to completion. A message naming an unknown entity,
//! kind or property is logged and changes nothing.

use engine_component::{ComponentError, Entity};
use engine_net::{EditorMessage, KeyType, NetError};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    /// Handle every message the editor queued since the last frame.
    pub(crate) fn process_editor_messages(&mut self) {
        let Some(channel) = self.editor.as_mut() else {
            return;
        };
        let messages = channel.drain();
        for message in messages {
            self.handle_message(message);
        }
    }

    /// Apply one editor message, logging a rejection.
    pub fn handle_message(&mut self, message: EditorMessage) {
        let kind = message.kind();
        debug!(message = kind, "editor message");
        match self.apply_message(message) {
            Ok(()) => {}
            Err(e @ EngineError::DuplicateComponent { .. }) => {
                warn!(message = kind, error = %e, "editor message rejected");
            }
            Err(e) => error!(message = kind, error = %e, "editor message rejected"),
        }
    }

    fn apply_message(&mut self, message: EditorMessage) -> Result<(), EngineError> {
        match message {
            EditorMessage::PropertyChanged {
                entity_id,
                variant_type,
                key_path,
                key_type,
                value,
            } => self.property_changed(entity_id, &variant_type, &key_path, key_type, &value),
            EditorMessage::VariantAdded {
                entity_id,
                variant_type,
            } => self.variant_added(entity_id, &variant_type),
            EditorMessage::VariantRemoved {
                entity_id,
                variant_type,
            } => self.variant_removed(entity_id, &variant_type),
            EditorMessage::EntityRemoved { entity_id } => {
                if !self.world.remove_entity(entity_id) {
                    return Err(EngineError::UnknownEntity(entity_id));
                }
                info!(entity = %entity_id, "removed entity");
                Ok(())
            }
            EditorMessage::SceneLoad { scene } => {
                let text = match scene {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                let report = self.load_scene(&text).inspect_err(|e| {
                    self.notify(false, format!("Failed to load scene: {e}"));
                })?;
                info!(
                    loaded = report.loaded.len(),
                    failed = report.failed.len(),
                    "editor loaded scene"
                );
                Ok(())
            }
            EditorMessage::EnterPlayMode { paused } => {
                self.enter_play_mode(paused);
                Ok(())
            }
            EditorMessage::ExitPlayMode => self.exit_play_mode().inspect_err(|e| {
                self.notify(false, format!("Failed to exit play mode: {e}"));
            }),
            EditorMessage::PausePlayMode => {
                self.pause();
                Ok(())
            }
            EditorMessage::UnpausePlayMode => {
                self.unpause();
                Ok(())
            }
            EditorMessage::ExportScene { name } => match self.export_scene(&name) {
                Ok(outcome) => {
                    self.notify(true, outcome.message());
                    Ok(())
                }
                Err(e) => {
                    self.notify(false, format!("Failed to export {name}: {e}"));
                    Err(e)
                }
            },
            EditorMessage::RequestShutdown => {
                self.request_shutdown();
                Ok(())
            }
        }
    }

    fn property_changed(
        &mut self,
        entity: Entity,
        kind: &str,
        key_path: &str,
        key_type: KeyType,
        raw: &str,
    ) -> Result<(), EngineError> {
        if !self.world.storage.contains_entity(entity) {
            return Err(EngineError::UnknownEntity(entity));
        }
        let value = key_type.parse(raw)?;
        let info = self.world.registry.find(kind)?;
        let instance = self
            .world
            .storage
            .find_by_name_mut(entity, kind)
            .ok_or_else(|| ComponentError::NotFound(format!("{kind} on entity {entity}")))?;
        info.set_path(instance, key_path, value)?;
        debug!(%entity, kind, key_path, "property changed");
        Ok(())
    }

    /// Add a default-valued component. Required kinds are not checked here;
    /// the editor adds components one at a time.
    fn variant_added(&mut self, entity: Entity, kind: &str) -> Result<(), EngineError> {
        if !entity.is_valid() {
            return Err(EngineError::UnknownEntity(entity));
        }
        let info = self.world.registry.find(kind)?;
        if self.world.storage.has_kind(entity, kind) {
            return Err(EngineError::DuplicateComponent {
                entity,
                kind: kind.to_string(),
            });
        }
        let instance = info.create(entity);

        self.world.allocator.reserve(entity);
        self.world.storage.ensure_entity(entity);
        if let Err(e) = self.world.insert(instance) {
            warn!(%entity, kind, error = %e, "on_init failed for added component");
        }
        info!(%entity, kind, "added component");
        Ok(())
    }

    fn variant_removed(&mut self, entity: Entity, kind: &str) -> Result<(), EngineError> {
        self.world.registry.find(kind)?;
        if self.world.remove_component(entity, kind) == 0 {
            return Err(ComponentError::NotFound(format!("{kind} on entity {entity}")).into());
        }
        info!(%entity, kind, "removed component");
        Ok(())
    }

    fn notify(&mut self, success: bool, message: String) {
        let Some(channel) = &self.editor else {
            return;
        };
        match channel.notify(success, message) {
            Ok(()) => {}
            Err(NetError::ChannelClosed) => {
                warn!("editor channel closed, detaching");
                self.editor = None;
            }
            Err(e) => error!(error = %e, "failed to send notice"),
        }
    }
}
