//! Scene and entity document model.
//!
//! ```json
//! {
//!   "type": "scene",
//!   "entities": [
//!     {
//!       "id": 42,
//!       "components": [
//!         { "type": "Position", "inputs": { "x": 10.0, "y": 4.0 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Scene entities are kept as raw [`Value`]s so each one can fail to parse
//! on its own without rejecting its siblings.

use engine_component::Entity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SceneError;

/// The `type` tag of a scene document.
pub const SCENE_TYPE: &str = "scene";

/// One component: its kind name and its serializable properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

/// One entity with its components in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub id: Entity,
    #[serde(default)]
    pub components: Vec<ComponentDocument>,
}

impl EntityDocument {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// A whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub entities: Vec<Value>,
}

impl SceneDocument {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: SCENE_TYPE.to_string(),
            entities: Vec::new(),
        }
    }

    /// Parse scene text, checking the shape before anything else looks at it.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Malformed`] for empty text or a document that is
    /// not `{"type": "scene", "entities": [...]}`, and [`SceneError::Json`]
    /// for text that is not JSON.
    pub fn parse(text: &str) -> Result<Self, SceneError> {
        if text.trim().is_empty() {
            return Err(SceneError::Malformed("empty scene document".to_string()));
        }
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Validate and convert an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Malformed`] if the shape is wrong.
    pub fn from_value(value: Value) -> Result<Self, SceneError> {
        let Value::Object(mut map) = value else {
            return Err(SceneError::Malformed("scene is not an object".to_string()));
        };
        match map.get("type") {
            Some(Value::String(kind)) if kind == SCENE_TYPE => {}
            _ => {
                return Err(SceneError::Malformed(
                    "scene \"type\" must be \"scene\"".to_string(),
                ));
            }
        }
        let Some(Value::Array(entities)) = map.remove("entities") else {
            return Err(SceneError::Malformed(
                "scene \"entities\" must be an array".to_string(),
            ));
        };
        Ok(Self {
            kind: SCENE_TYPE.to_string(),
            entities,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_empty_scene() {
        let doc = SceneDocument::parse(r#"{"type": "scene", "entities": []}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(SceneDocument::parse("  "), Err(SceneError::Malformed(_))));
        assert!(matches!(SceneDocument::parse("{nope"), Err(SceneError::Json(_))));
        assert!(matches!(SceneDocument::parse("[]"), Err(SceneError::Malformed(_))));
        assert!(matches!(
            SceneDocument::parse(r#"{"type": "prefab", "entities": []}"#),
            Err(SceneError::Malformed(_))
        ));
        assert!(matches!(
            SceneDocument::parse(r#"{"type": "scene", "entities": {}}"#),
            Err(SceneError::Malformed(_))
        ));
    }

    #[test]
    fn test_entity_document_shape() {
        let doc: EntityDocument = serde_json::from_value(json!({
            "id": 7,
            "components": [{"type": "Tag", "inputs": {"value": "player"}}]
        }))
        .unwrap();
        assert_eq!(doc.id, Entity(7));
        assert_eq!(doc.components[0].kind, "Tag");
        assert_eq!(doc.components[0].inputs["value"], "player");
    }

    #[test]
    fn test_component_inputs_default_to_empty() {
        let doc: ComponentDocument = serde_json::from_value(json!({"type": "Tag"})).unwrap();
        assert!(doc.inputs.is_empty());
    }

    #[test]
    fn test_scene_serializes_with_type_tag() {
        let json = serde_json::to_value(SceneDocument::new()).unwrap();
        assert_eq!(json, json!({"type": "scene", "entities": []}));
    }
}
