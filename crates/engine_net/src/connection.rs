//! The engine's NATS client.
//!
//! Wraps an `async-nats` client with the two operations the editor bridge
//! needs: listening on the inbound editor subject and fanning an engine
//! event out to the shared and per-session outbound subjects.

use async_nats::Subscriber;
use tracing::{debug, info};

use crate::codec::encode;
use crate::error::NetError;
use crate::messages::EngineEvent;
use crate::subjects::{EDITOR_IN, EDITOR_OUT, editor_session_out};

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Environment variable overriding the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

#[derive(Debug, Clone)]
pub struct NatsConnection {
    client: async_nats::Client,
}

impl NatsConnection {
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the server cannot be reached.
    pub async fn connect_to(url: &str) -> Result<Self, NetError> {
        info!(url, "connecting to NATS");
        let client = async_nats::connect(url).await?;
        info!(url, "connected to NATS");
        Ok(Self { client })
    }

    #[must_use]
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    /// Subscribe to editor documents.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn editor_messages(&self) -> Result<Subscriber, NetError> {
        Ok(self.client.subscribe(EDITOR_IN).await?)
    }

    /// Publish `event` on [`EDITOR_OUT`] and on the session's own subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if encoding or publishing fails.
    pub async fn publish_event(&self, session: &str, event: &EngineEvent) -> Result<(), NetError> {
        let payload = encode(event)?;
        let len = payload.len();
        self.client.publish(EDITOR_OUT, payload.clone().into()).await?;
        self.client
            .publish(editor_session_out(session), payload.into())
            .await?;
        debug!(session, bytes = len, "published engine event");
        Ok(())
    }
}
