//! Component-layer error types.

/// Errors raised by the registry, property reflection and lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// No component kind is registered under this name.
    #[error("unknown component kind: {0}")]
    UnknownKind(String),

    /// A value could not be converted to the declared property type.
    #[error("cannot convert {found} to {expected} for property '{property}'")]
    Conversion {
        /// The property being written.
        property: String,
        /// The declared property type.
        expected: String,
        /// A short description of the offending value.
        found: String,
    },

    /// An entity, component or property lookup missed.
    #[error("not found: {0}")]
    NotFound(String),

    /// A key path could not be parsed or walked.
    #[error("invalid key path: {0}")]
    InvalidKeyPath(String),

    /// A lifecycle hook reported a failure.
    #[error("{kind} hook failed: {message}")]
    Hook {
        /// The component kind whose hook failed.
        kind: String,
        /// What went wrong.
        message: String,
    },
}

impl ComponentError {
    /// Convenience constructor for hook failures.
    pub fn hook(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
