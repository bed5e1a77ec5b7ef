//! # engine_scene
//!
//! Converts entity storage to and from JSON documents using the component
//! registry's property reflection, and persists those documents on disk.
//!
//! - [`serialize_entity`] / [`serialize_scene`]: storage → documents.
//! - [`deserialize_entity`] / [`deserialize_scene`]: documents → storage,
//!   lenient about properties, strict about kinds.
//! - [`load_scene_file`] / [`save_scene_file`] / [`export_scene`]: files.
//! - [`write_templates`]: default-valued documents for the editor.

pub mod deserialize;
pub mod document;
pub mod error;
pub mod file;
pub mod serialize;
pub mod template;

#[cfg(test)]
mod test_kinds;

pub use deserialize::{
    LoadReport, RequirePolicy, deserialize_entity, deserialize_scene, load_entity, load_scene,
    reload_scene,
};
pub use document::{ComponentDocument, EntityDocument, SCENE_TYPE, SceneDocument};
pub use error::SceneError;
pub use file::{
    SCENE_EXTENSION, SaveOutcome, export_scene, load_scene_file, save_scene_file,
    serialize_entity_to_file,
};
pub use serialize::{scene_to_string, scene_to_string_pretty, serialize_entity, serialize_scene};
pub use template::{TEMPLATE_EXTENSION, write_templates};
