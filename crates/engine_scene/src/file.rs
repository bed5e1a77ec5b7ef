//! Scene files on disk.
//!
//! Loading never touches storage unless the file exists, is readable and has
//! content. Saving overwrites silently; the returned [`SaveOutcome`] records
//! whether it did.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use engine_component::{Entity, World};
use tracing::info;

use crate::deserialize::{LoadReport, RequirePolicy, deserialize_scene};
use crate::error::SceneError;
use crate::serialize::{scene_to_string_pretty, serialize_entity};

/// Extension of scene files.
pub const SCENE_EXTENSION: &str = "scene";

/// Where a document was written and whether a file was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub overwritten: bool,
}

impl SaveOutcome {
    /// Human-readable summary for the editor's pop-up.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Saved to {}", self.path.display())?;
        if self.overwritten {
            f.write_str(" (overwritten)")?;
        }
        Ok(())
    }
}

/// Read a scene file into `world`.
///
/// # Errors
///
/// [`SceneError::Io`] if the file is missing or unreadable,
/// [`SceneError::Empty`] if it has no content, otherwise whatever
/// [`deserialize_scene`] reports.
pub fn load_scene_file(
    world: &mut World,
    path: impl AsRef<Path>,
    policy: RequirePolicy,
) -> Result<LoadReport, SceneError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SceneError::io(path, e))?;
    if text.trim().is_empty() {
        return Err(SceneError::Empty(path.to_path_buf()));
    }
    let report = deserialize_scene(world, &text, policy)?;
    info!(path = %path.display(), entities = report.loaded.len(), "loaded scene file");
    Ok(report)
}

/// Write the live scene to `path`.
///
/// # Errors
///
/// [`SceneError::Io`] if the file cannot be written.
pub fn save_scene_file(world: &World, path: impl AsRef<Path>) -> Result<SaveOutcome, SceneError> {
    let text = scene_to_string_pretty(world)?;
    write_document(path.as_ref(), &text)
}

/// Write one entity's document to `path` (prefab save).
///
/// # Errors
///
/// [`SceneError::UnknownEntity`] if the entity does not exist,
/// [`SceneError::Io`] if the file cannot be written.
pub fn serialize_entity_to_file(
    world: &World,
    entity: Entity,
    path: impl AsRef<Path>,
) -> Result<SaveOutcome, SceneError> {
    let doc = serialize_entity(world, entity)?;
    let text = serde_json::to_string_pretty(&doc)?;
    write_document(path.as_ref(), &text)
}

/// Write an already serialized scene into `scenes_dir` under `name`.
///
/// `.scene` is appended when `name` lacks it.
///
/// # Errors
///
/// [`SceneError::InvalidName`] for an empty or path-like name,
/// [`SceneError::Empty`] for an empty document, [`SceneError::Io`] if the
/// file cannot be written.
pub fn export_scene(scenes_dir: impl AsRef<Path>, name: &str, document: &str) -> Result<SaveOutcome, SceneError> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(SceneError::InvalidName(name.to_string()));
    }
    let mut file_name = name.to_string();
    if Path::new(name).extension().is_none_or(|ext| ext != SCENE_EXTENSION) {
        file_name.push('.');
        file_name.push_str(SCENE_EXTENSION);
    }
    let path = scenes_dir.as_ref().join(file_name);
    if document.trim().is_empty() {
        return Err(SceneError::Empty(path));
    }
    write_document(&path, document)
}

fn write_document(path: &Path, text: &str) -> Result<SaveOutcome, SceneError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SceneError::io(parent, e))?;
    }
    let overwritten = path.exists();
    fs::write(path, text).map_err(|e| SceneError::io(path, e))?;
    let outcome = SaveOutcome {
        path: path.to_path_buf(),
        overwritten,
    };
    info!(path = %path.display(), overwritten, "wrote document");
    Ok(outcome)
}
