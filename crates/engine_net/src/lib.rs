//! # engine_net
//!
//! The editor sync channel.
//!
//! This crate provides:
//!
//! - [`messages`]: Editor protocol documents, inbound and outbound.
//! - [`codec`]: JSON serialisation/deserialisation helpers.
//! - [`channel`]: The in-process queue the frame loop drains.
//! - [`subjects`]: NATS subject constants and builders.
//! - [`connection`]: NATS connection management.
//! - [`bridge`]: The task moving traffic between NATS and the channel.
//! - [`error`]: Network-layer error types.

pub mod bridge;
pub mod channel;
pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod subjects;

pub use bridge::run_bridge;
pub use channel::{EditorChannel, EditorEndpoint};
pub use codec::{decode, decode_message, encode};
pub use connection::NatsConnection;
pub use error::NetError;
pub use messages::{EditorMessage, EngineEvent, KeyType};
