//! Editor protocol messages.
//!
//! Every message is a JSON object tagged by `"type"`. Inbound
//! ([`EditorMessage`]) documents come from the external editor; outbound
//! ([`EngineEvent`]) documents carry the session id of the engine process
//! that produced them.

use std::fmt;

use engine_component::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NetError;

// ── Inbound ─────────────────────────────────────────────────────────────────

/// The declared type of a `property_changed` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Int,
    Float,
    Bool,
    String,
}

impl KeyType {
    /// Parse the editor's textual value into JSON.
    ///
    /// Booleans are `true` only for `"true"` and `"1"`; anything else is
    /// `false`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Value`] for numbers that do not parse.
    pub fn parse(self, raw: &str) -> Result<Value, NetError> {
        let invalid = || NetError::Value {
            key_type: self.to_string(),
            value: raw.to_string(),
        };
        match self {
            Self::Int => raw.trim().parse::<i64>().map(Value::from).map_err(|_| invalid()),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from)
                .ok_or_else(invalid),
            Self::Bool => Ok(Value::Bool(matches!(raw, "true" | "1"))),
            Self::String => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
        })
    }
}

/// A message from the editor. Handlers run on the frame thread between
/// frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorMessage {
    /// Write one (possibly nested) property of a component.
    PropertyChanged {
        entity_id: Entity,
        variant_type: String,
        key_path: String,
        key_type: KeyType,
        value: String,
    },
    /// Add a default-valued component to an entity.
    VariantAdded { entity_id: Entity, variant_type: String },
    /// Tombstone a component.
    VariantRemoved { entity_id: Entity, variant_type: String },
    /// Drop an entity and its components.
    EntityRemoved { entity_id: Entity },
    /// Replace the whole scene. `scene` is either the scene object itself or
    /// a string holding its JSON text.
    SceneLoad { scene: Value },
    EnterPlayMode {
        #[serde(default)]
        paused: bool,
    },
    ExitPlayMode,
    PausePlayMode,
    UnpausePlayMode,
    /// Write the live scene to `scenes/<name>.scene`.
    ExportScene { name: String },
    RequestShutdown,
}

impl EditorMessage {
    /// The `type` tag, for log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PropertyChanged { .. } => "property_changed",
            Self::VariantAdded { .. } => "variant_added",
            Self::VariantRemoved { .. } => "variant_removed",
            Self::EntityRemoved { .. } => "entity_removed",
            Self::SceneLoad { .. } => "scene_load",
            Self::EnterPlayMode { .. } => "enter_play_mode",
            Self::ExitPlayMode => "exit_play_mode",
            Self::PausePlayMode => "pause_play_mode",
            Self::UnpausePlayMode => "unpause_play_mode",
            Self::ExportScene { .. } => "export_scene",
            Self::RequestShutdown => "request_shutdown",
        }
    }
}

// ── Outbound ────────────────────────────────────────────────────────────────

/// A message from the engine to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The complete live scene.
    SceneSync { session: String, scene: Value },
    /// Outcome of an editor-requested operation, shown to the user.
    Notice {
        session: String,
        success: bool,
        message: String,
    },
}
