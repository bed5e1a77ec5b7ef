//! Bridge between NATS and the in-process editor channel.
//!
//! Runs on the async runtime next to the frame thread: editor documents
//! arriving on [`EDITOR_IN`] are decoded and queued for the next frame, and
//! events the engine emits are published on [`EDITOR_OUT`](crate::subjects::EDITOR_OUT) and on the
//! session-scoped subject.

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::channel::EditorEndpoint;
use crate::connection::NatsConnection;
use crate::error::NetError;
use crate::subjects::EDITOR_IN;

/// Pump traffic until the engine drops its channel or the subscription ends.
///
/// # Errors
///
/// Returns [`NetError`] if subscribing or publishing fails.
pub async fn run_bridge(connection: NatsConnection, mut endpoint: EditorEndpoint) -> Result<(), NetError> {
    let mut inbound = connection.editor_messages().await?;
    let session = endpoint.session().to_string();
    info!(subject = EDITOR_IN, session = %session, "editor bridge running");

    loop {
        tokio::select! {
            message = inbound.next() => {
                let Some(message) = message else {
                    warn!("editor subscription closed");
                    break;
                };
                match endpoint.send_raw(&message.payload) {
                    Ok(accepted) => debug!(accepted, bytes = message.payload.len(), "editor message"),
                    Err(NetError::ChannelClosed) => break,
                    Err(e) => return Err(e),
                }
            }
            event = endpoint.recv() => {
                let Some(event) = event else {
                    break;
                };
                connection.publish_event(&session, &event).await?;
            }
        }
    }

    info!("editor bridge stopped");
    Ok(())
}
