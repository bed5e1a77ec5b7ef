//! Scene-layer error types.

use std::path::PathBuf;

use engine_component::Entity;

/// Errors raised while converting, loading or persisting scene documents.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The document parsed but does not have the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A component names a kind the registry does not know.
    #[error("unknown component kind: {0}")]
    UnknownKind(String),

    /// A component's declared co-component is missing from its entity.
    #[error("entity {entity}: {kind} requires {required}")]
    MissingRequirement {
        entity: Entity,
        kind: String,
        required: String,
    },

    /// No entity with this id exists in storage.
    #[error("no entity with id {0}")]
    UnknownEntity(Entity),

    /// The scene listed entities but none of them could be loaded.
    #[error("none of the {0} entities in the scene could be loaded")]
    NothingLoaded(usize),

    /// A scene name was empty or otherwise unusable as a file name.
    #[error("invalid scene name: {0:?}")]
    InvalidName(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file or document that must have content was empty.
    #[error("{} is empty", .0.display())]
    Empty(PathBuf),
}

impl SceneError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
