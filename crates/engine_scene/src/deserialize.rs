//! Documents → storage.
//!
//! Loading is lenient about properties and strict about kinds: an input that
//! does not convert to its declared type is skipped, but a component of an
//! unknown kind abandons the rest of its entity. Components attached before
//! the unknown one stay attached.

use engine_component::{Entity, World};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::document::{EntityDocument, SceneDocument};
use crate::error::SceneError;

/// What to do when a component's `REQUIRES` kinds are missing after its
/// entity has been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequirePolicy {
    /// Reject the entity and remove it from storage.
    #[default]
    Enforce,
    /// Log a warning and keep the entity.
    Advisory,
}

/// Outcome of a scene load that did not fail outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entities listed in the document.
    pub attempted: usize,
    /// Entities that loaded.
    pub loaded: Vec<Entity>,
    /// Index in the document and reason for each entity that did not.
    pub failed: Vec<(usize, String)>,
}

impl LoadReport {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Deserialize one entity document into `world`.
///
/// Any components already stored under the same id are discarded first.
/// The id is reserved in the identity generator so it is never handed out
/// again.
///
/// # Errors
///
/// - [`SceneError::Json`] if the document is not an entity document.
/// - [`SceneError::Malformed`] for the reserved id `0`.
/// - [`SceneError::UnknownKind`] if a component kind is not registered.
/// - [`SceneError::MissingRequirement`] under [`RequirePolicy::Enforce`].
pub fn deserialize_entity(
    world: &mut World,
    document: &Value,
    policy: RequirePolicy,
) -> Result<Entity, SceneError> {
    let doc: EntityDocument = serde_json::from_value(document.clone())?;
    load_entity(world, doc, policy)
}

/// Deserialize an already typed entity document.
///
/// # Errors
///
/// See [`deserialize_entity`].
pub fn load_entity(
    world: &mut World,
    doc: EntityDocument,
    policy: RequirePolicy,
) -> Result<Entity, SceneError> {
    let entity = doc.id;
    if !entity.is_valid() {
        return Err(SceneError::Malformed("entity id 0 is reserved".to_string()));
    }

    world.remove_entity(entity);
    world.allocator.reserve(entity);
    world.storage.ensure_entity(entity);

    for component in doc.components {
        let Some(info) = world.registry.get(&component.kind) else {
            return Err(SceneError::UnknownKind(component.kind));
        };
        let mut instance = info.create(entity);
        info.write_inputs(&mut instance, &component.inputs);
        if let Err(e) = world.insert(instance) {
            warn!(%entity, kind = %component.kind, error = %e, "on_init failed during load");
        }
    }

    check_requirements(world, entity, policy)?;
    Ok(entity)
}

fn check_requirements(world: &mut World, entity: Entity, policy: RequirePolicy) -> Result<(), SceneError> {
    let missing = world
        .storage
        .live_components(entity)
        .filter_map(|instance| {
            let info = world.registry.get(instance.kind_name())?;
            let required = info
                .requires
                .iter()
                .find(|required| !world.storage.has_kind(entity, required))?;
            Some((info.name, *required))
        })
        .next();

    let Some((kind, required)) = missing else {
        return Ok(());
    };
    match policy {
        RequirePolicy::Enforce => {
            world.remove_entity(entity);
            Err(SceneError::MissingRequirement {
                entity,
                kind: kind.to_string(),
                required: required.to_string(),
            })
        }
        RequirePolicy::Advisory => {
            warn!(%entity, kind, required, "component requirement not met");
            Ok(())
        }
    }
}

/// Replace the contents of `world` with the scene in `text`.
///
/// The document shape is validated before storage is touched. After that,
/// storage is cleared and each entity loaded on its own; failures are logged
/// and collected in the report.
///
/// # Errors
///
/// Shape errors from [`SceneDocument::parse`], or
/// [`SceneError::NothingLoaded`] when the scene lists entities and none of
/// them loaded. In the latter case storage holds whatever the failed
/// entities left behind.
pub fn deserialize_scene(
    world: &mut World,
    text: &str,
    policy: RequirePolicy,
) -> Result<LoadReport, SceneError> {
    let scene = SceneDocument::parse(text)?;
    load_scene(world, scene, policy)
}

/// Replace the contents of `world` with an already validated scene.
///
/// # Errors
///
/// See [`deserialize_scene`].
pub fn load_scene(
    world: &mut World,
    scene: SceneDocument,
    policy: RequirePolicy,
) -> Result<LoadReport, SceneError> {
    world.clear();

    let mut report = LoadReport {
        attempted: scene.len(),
        ..LoadReport::default()
    };
    for (index, entity) in scene.entities.iter().enumerate() {
        match deserialize_entity(world, entity, policy) {
            Ok(id) => report.loaded.push(id),
            Err(e) => {
                error!(index, error = %e, "failed to deserialize entity");
                report.failed.push((index, e.to_string()));
            }
        }
    }

    if report.loaded.is_empty() && report.attempted > 0 {
        error!(attempted = report.attempted, "failed to deserialize any entities from scene");
        return Err(SceneError::NothingLoaded(report.attempted));
    }

    info!(entities = report.loaded.len(), "scene loaded");
    Ok(report)
}

/// Serialize the live world and load it back in place.
///
/// # Errors
///
/// See [`deserialize_scene`].
pub fn reload_scene(world: &mut World, policy: RequirePolicy) -> Result<LoadReport, SceneError> {
    let scene = crate::serialize::serialize_scene(world);
    load_scene(world, scene, policy)
}
