//! Engine-level error types.

use std::path::PathBuf;

use engine_component::{ComponentError, Entity};
use engine_net::NetError;
use engine_scene::SceneError;

/// Errors raised by the engine outside of individual lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Net(#[from] NetError),

    /// Leaving play mode without a snapshot taken on entry.
    #[error("no recovery snapshot to restore")]
    NoRecoveryBuffer,

    #[error("entity {0} not found")]
    UnknownEntity(Entity),

    /// An editor-driven add of a kind the entity already has.
    #[error("entity {entity} already has a {kind}")]
    DuplicateComponent { entity: Entity, kind: String },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
