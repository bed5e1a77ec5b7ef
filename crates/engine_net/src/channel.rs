//! The in-process editor channel.
//!
//! The frame loop owns an [`EditorChannel`] and drains it once per frame;
//! nothing inside the engine ever blocks on it. The other half, an
//! [`EditorEndpoint`], is handed to whatever transports traffic to the real
//! editor (the NATS bridge) or to tests.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;
use uuid::Uuid;

use crate::codec::decode_message;
use crate::error::NetError;
use crate::messages::{EditorMessage, EngineEvent};

/// Engine-side half: inbound editor messages, outbound events.
#[derive(Debug)]
pub struct EditorChannel {
    session: String,
    inbound: UnboundedReceiver<EditorMessage>,
    outbound: UnboundedSender<EngineEvent>,
}

/// Transport-side half.
#[derive(Debug)]
pub struct EditorEndpoint {
    session: String,
    to_engine: UnboundedSender<EditorMessage>,
    from_engine: UnboundedReceiver<EngineEvent>,
}

impl EditorChannel {
    /// Create a connected channel/endpoint pair with a fresh session id.
    #[must_use]
    pub fn in_process() -> (Self, EditorEndpoint) {
        let session = Uuid::new_v4().to_string();
        let (to_engine, inbound) = mpsc::unbounded_channel();
        let (outbound, from_engine) = mpsc::unbounded_channel();
        (
            Self {
                session: session.clone(),
                inbound,
                outbound,
            },
            EditorEndpoint {
                session,
                to_engine,
                from_engine,
            },
        )
    }

    /// Returns the session id stamped on outbound events.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Take every message queued so far, oldest first, without waiting.
    pub fn drain(&mut self) -> Vec<EditorMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.inbound.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Queue an event for the editor.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ChannelClosed`] if the endpoint was dropped.
    pub fn send(&self, event: EngineEvent) -> Result<(), NetError> {
        self.outbound.send(event).map_err(|_| NetError::ChannelClosed)
    }

    /// Publish a full scene snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ChannelClosed`] if the endpoint was dropped.
    pub fn sync_scene(&self, scene: serde_json::Value) -> Result<(), NetError> {
        self.send(EngineEvent::SceneSync {
            session: self.session.clone(),
            scene,
        })
    }

    /// Report the outcome of an editor-requested operation.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ChannelClosed`] if the endpoint was dropped.
    pub fn notify(&self, success: bool, message: impl Into<String>) -> Result<(), NetError> {
        self.send(EngineEvent::Notice {
            session: self.session.clone(),
            success,
            message: message.into(),
        })
    }
}

impl EditorEndpoint {
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Deliver a message to the engine.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ChannelClosed`] if the engine side was dropped.
    pub fn send(&self, message: EditorMessage) -> Result<(), NetError> {
        self.to_engine.send(message).map_err(|_| NetError::ChannelClosed)
    }

    /// Decode a raw document and deliver it. Malformed documents are logged
    /// and dropped; they never reach the engine.
    ///
    /// Returns `Ok(false)` if the document was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ChannelClosed`] if the engine side was dropped.
    pub fn send_raw(&self, bytes: &[u8]) -> Result<bool, NetError> {
        match decode_message(bytes) {
            Ok(message) => self.send(message).map(|()| true),
            Err(e) => {
                warn!(error = %e, "dropping malformed editor message");
                Ok(false)
            }
        }
    }

    /// Wait for the next outbound event. `None` once the engine side is gone.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.from_engine.recv().await
    }

    /// Take the next outbound event if one is queued.
    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.from_engine.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use engine_component::Entity;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_messages_arrive_in_order() {
        let (mut channel, endpoint) = EditorChannel::in_process();
        endpoint.send(EditorMessage::PausePlayMode).unwrap();
        endpoint.send(EditorMessage::UnpausePlayMode).unwrap();
        assert_eq!(
            channel.drain(),
            vec![EditorMessage::PausePlayMode, EditorMessage::UnpausePlayMode]
        );
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn test_send_raw_drops_malformed() {
        let (mut channel, endpoint) = EditorChannel::in_process();
        assert!(!endpoint.send_raw(br#"{"type": "variant_removed"}"#).unwrap());
        assert!(
            endpoint
                .send_raw(br#"{"type": "entity_removed", "entity_id": 2}"#)
                .unwrap()
        );
        assert_eq!(
            channel.drain(),
            vec![EditorMessage::EntityRemoved { entity_id: Entity(2) }]
        );
    }

    #[test]
    fn test_events_carry_session() {
        let (channel, mut endpoint) = EditorChannel::in_process();
        assert_eq!(channel.session(), endpoint.session());
        channel.sync_scene(json!({"type": "scene", "entities": []})).unwrap();
        channel.notify(true, "Saved").unwrap();

        match endpoint.try_recv().unwrap() {
            EngineEvent::SceneSync { session, .. } => assert_eq!(session, channel.session()),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            endpoint.try_recv(),
            Some(EngineEvent::Notice { success: true, .. })
        ));
        assert!(endpoint.try_recv().is_none());
    }

    #[test]
    fn test_closed_endpoint() {
        let (channel, endpoint) = EditorChannel::in_process();
        drop(endpoint);
        assert!(matches!(channel.notify(false, "x"), Err(NetError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_async_receive() {
        let (channel, mut endpoint) = EditorChannel::in_process();
        channel.notify(true, "done").unwrap();
        assert!(endpoint.recv().await.is_some());
        drop(channel);
        assert!(endpoint.recv().await.is_none());
    }
}
