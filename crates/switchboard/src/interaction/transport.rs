//! The seam between the dispatcher and the chat platform

use std::fmt;

use super::{
    event::{ChannelId, InteractionId, MessageId},
    response::Payload,
};

/// An opaque error returned by a [`Transport`]
#[derive(Debug, thiserror::Error)]
#[error("Transport error: {0:#}")]
pub struct TransportError(#[from] pub anyhow::Error);

/// The primary response used to acknowledge an interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialResponse<'a> {
    /// Reply with a new message
    Message(&'a Payload),
    /// Show a loading state, to be completed later with an edit
    Defer {
        /// Whether the eventual reply is only visible to the invoking user
        ephemeral: bool,
    },
    /// Acknowledge a component interaction without sending anything
    Acknowledge,
}

/// Outbound calls made on behalf of an interaction's handler
///
/// Implementations wrap a platform client.  Each call is a single request;
/// retries are handled by the caller.
#[async_trait::async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Create the primary response for an interaction
    async fn send_response(
        &self,
        id: InteractionId,
        res: InitialResponse<'_>,
    ) -> Result<(), TransportError>;

    /// Replace the original response of an interaction, completing a
    /// deferral if one is pending
    async fn edit_response(&self, id: InteractionId, msg: &Payload)
        -> Result<(), TransportError>;

    /// Delete the original response of an interaction
    async fn delete_response(&self, id: InteractionId) -> Result<(), TransportError>;

    /// Send an additional message after an interaction was acknowledged
    async fn create_followup(
        &self,
        id: InteractionId,
        msg: &Payload,
    ) -> Result<MessageId, TransportError>;

    /// Delete an arbitrary channel message
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError>;
}
