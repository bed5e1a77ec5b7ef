//! Network-layer error types.

/// Errors that can occur while moving editor traffic.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to JSON.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to decode a message from JSON.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// A `property_changed` value did not parse as its declared key type.
    #[error("cannot parse {value:?} as {key_type}")]
    Value { key_type: String, value: String },

    /// The other side of an in-process channel was dropped.
    #[error("editor channel closed")]
    ChannelClosed,

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),
}
