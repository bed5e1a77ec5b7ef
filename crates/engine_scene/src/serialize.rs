//! Storage → documents.

use engine_component::{Entity, World};
use tracing::{error, warn};

use crate::document::{ComponentDocument, EntityDocument, SceneDocument};
use crate::error::SceneError;

/// Serialize the live components of one entity, in insertion order.
///
/// Components whose kind is not registered are skipped with a warning.
///
/// # Errors
///
/// Returns [`SceneError::UnknownEntity`] if the entity does not exist.
pub fn serialize_entity(world: &World, entity: Entity) -> Result<EntityDocument, SceneError> {
    if !world.storage.contains_entity(entity) {
        return Err(SceneError::UnknownEntity(entity));
    }

    let components = world
        .storage
        .live_components(entity)
        .filter_map(|instance| {
            let Some(info) = world.registry.get(instance.kind_name()) else {
                warn!(%entity, kind = instance.kind_name(), "skipping unregistered component");
                return None;
            };
            Some(ComponentDocument {
                kind: info.name.to_string(),
                inputs: info.read_inputs(instance),
            })
        })
        .collect();

    Ok(EntityDocument {
        id: entity,
        components,
    })
}

/// Serialize every entity in storage. Entities without live components are
/// left out.
#[must_use]
pub fn serialize_scene(world: &World) -> SceneDocument {
    let mut scene = SceneDocument::new();
    for entity in world.storage.entities() {
        let doc = match serialize_entity(world, entity) {
            Ok(doc) if !doc.is_empty() => doc,
            Ok(_) => continue,
            Err(e) => {
                error!(%entity, error = %e, "failed to serialize entity");
                continue;
            }
        };
        match serde_json::to_value(doc) {
            Ok(value) => scene.entities.push(value),
            Err(e) => error!(%entity, error = %e, "failed to encode entity"),
        }
    }
    scene
}

/// Serialize the whole scene to compact JSON text.
///
/// # Errors
///
/// Returns [`SceneError::Json`] if encoding fails.
pub fn scene_to_string(world: &World) -> Result<String, SceneError> {
    Ok(serde_json::to_string(&serialize_scene(world))?)
}

/// Serialize the whole scene to indented JSON text, for files people read.
///
/// # Errors
///
/// Returns [`SceneError::Json`] if encoding fails.
pub fn scene_to_string_pretty(world: &World) -> Result<String, SceneError> {
    Ok(serde_json::to_string_pretty(&serialize_scene(world))?)
}
