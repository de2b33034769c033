//! Response logic for a single interaction
//!
//! # Notes
//!
//! The platform enforces the following rules on the flow of responses:
//! - You **must** create **exactly one** primary response (a message, a
//!   deferral or, for components, a bare acknowledgement) to acknowledge an
//!   interaction, and it must arrive before the acknowledgement deadline
//! - A deferral is completed by editing the original response
//! - You **may** edit the original response zero or more times
//! - You **may** delete the original response at most once
//! - You **must not** make _any_ original-response calls after deleting the
//!   original response
//! - You **must not** create a followup message until the interaction is
//!   acknowledged
//! - You **may** create followup messages after the original response is
//!   deleted
//!
//! [`Responder`] tracks these rules in a small state machine and rejects
//! invalid calls locally instead of sending them.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::watch, time::Instant};

use super::{Message, MessageBody, PayloadError, Prepare};
use crate::interaction::{
    event::{ChannelId, InteractionId, MessageId},
    transport::{InitialResponse, Transport, TransportError},
};

/// An error arising from sending an interaction response
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// A primary response was already sent for this interaction
    #[error("Interaction was already responded to")]
    DuplicateResponse,
    /// The acknowledgement deadline passed before a primary response was sent
    #[error("Acknowledgement deadline of {0:?} exceeded")]
    Timeout(Duration),
    /// The transport failed to deliver a call
    #[error("Failed to send response")]
    Transport(#[from] TransportError),
    /// The response violated a platform limit
    #[error("Invalid response payload")]
    Payload(#[from] PayloadError),
    /// The operation requires the interaction to be acknowledged first
    #[error("Interaction has not been acknowledged")]
    NotAcknowledged,
    /// The original response was already deleted
    #[error("Original response was already deleted")]
    Deleted,
    /// The interaction does not originate from a message
    #[error("Interaction has no source message")]
    NoSourceMessage,
    /// The operation is only valid for component interactions
    #[error("Operation is only valid for component interactions")]
    NotComponent,
}

/// The lifecycle state of an interaction's primary response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseState {
    /// Nothing has been sent yet
    NotResponded,
    /// A deferral was sent and has not yet been completed
    Deferred,
    /// A message (or bare acknowledgement) was sent
    Responded,
    /// The original response was deleted
    Deleted,
}

impl ResponseState {
    /// Returns true if the platform has received a primary response
    #[inline]
    #[must_use]
    pub fn is_acked(self) -> bool { !matches!(self, Self::NotResponded) }

    /// Returns true if a primary response or deferral completion can still be
    /// sent
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool { matches!(self, Self::NotResponded | Self::Deferred) }
}

/// A followup message returned from a responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Followup(MessageId);

impl Followup {
    /// Get the ID of the followup message
    #[inline]
    #[must_use]
    pub fn id(self) -> MessageId { self.0 }
}

async fn retry_once<T, F: Future<Output = Result<T, TransportError>>>(
    op: &'static str,
    mut f: impl FnMut() -> F,
) -> Result<T, TransportError> {
    match f().await {
        Ok(v) => Ok(v),
        Err(err) => {
            tracing::warn!(op, %err, "Transport call failed, retrying once");
            f().await
        },
    }
}

/// Handle for sending the responses to a single interaction
#[derive(Debug)]
pub struct Responder {
    transport: Arc<dyn Transport>,
    id: InteractionId,
    source: Option<(ChannelId, MessageId)>,
    state: watch::Sender<ResponseState>,
    ephemeral_defer: bool,
    source_deleted: bool,
    received: Instant,
    ack_deadline: Duration,
}

impl Responder {
    /// Construct a new responder for an interaction received at the given
    /// instant
    ///
    /// `source` is the channel and message a component interaction originates
    /// from, and is `None` for commands.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        id: InteractionId,
        source: Option<(ChannelId, MessageId)>,
        received: Instant,
        ack_deadline: Duration,
    ) -> Self {
        Self {
            transport,
            id,
            source,
            state: watch::Sender::new(ResponseState::NotResponded),
            ephemeral_defer: false,
            source_deleted: false,
            received,
            ack_deadline,
        }
    }

    /// Get the ID of the interaction being responded to
    #[inline]
    #[must_use]
    pub fn id(&self) -> InteractionId { self.id }

    /// Get the current state of the primary response
    #[inline]
    #[must_use]
    pub fn state(&self) -> ResponseState { *self.state.borrow() }

    /// Get the instant after which a primary response will be rejected
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Instant { self.received + self.ack_deadline }

    /// Get the time allowed between receipt and the primary response
    #[inline]
    #[must_use]
    pub fn ack_deadline(&self) -> Duration { self.ack_deadline }

    /// Returns true if the pending deferral, if any, was sent as ephemeral
    #[inline]
    #[must_use]
    pub fn ephemeral_defer(&self) -> bool { self.ephemeral_defer }

    /// Returns true if nothing further is owed to the platform for this
    /// interaction
    ///
    /// This holds once a primary response was sent, or once the message a
    /// component interaction originates from was deleted, which retires the
    /// interaction along with it.
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool { self.state().is_acked() || self.source_deleted }

    /// Watch for changes to the response state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResponseState> { self.state.subscribe() }

    fn set_state(&self, state: ResponseState) {
        let prev = self.state.send_replace(state);
        tracing::trace!(?prev, ?state, "Response state changed");
    }

    fn check_deadline(&self) -> Result<(), ResponseError> {
        if Instant::now() >= self.deadline() {
            Err(ResponseError::Timeout(self.ack_deadline))
        } else {
            Ok(())
        }
    }

    async fn send_primary(
        &self,
        res: InitialResponse<'_>,
        next: ResponseState,
    ) -> Result<(), ResponseError> {
        match self.state() {
            ResponseState::NotResponded => (),
            _ => return Err(ResponseError::DuplicateResponse),
        }

        self.check_deadline()?;
        self.transport.send_response(self.id, res).await?;
        self.set_state(next);
        Ok(())
    }

    /// Send a message as the primary response, or complete a pending
    /// deferral with it
    ///
    /// # Errors
    /// This method returns an error if the message violates a platform limit,
    /// a primary response was already sent, the acknowledgement deadline has
    /// passed, or the transport fails.
    pub async fn respond(&mut self, msg: impl Into<Message>) -> Result<(), ResponseError> {
        let payload = msg.into().prepare()?;

        if self.state() == ResponseState::Deferred {
            retry_once("edit_response", || {
                self.transport.edit_response(self.id, &payload)
            })
            .await?;
            self.set_state(ResponseState::Responded);
            return Ok(());
        }

        self.send_primary(InitialResponse::Message(&payload), ResponseState::Responded)
            .await
    }

    /// Acknowledge the interaction with a loading state, to be completed
    /// later with [`respond`](Self::respond) or [`edit`](Self::edit)
    ///
    /// # Errors
    /// This method returns an error if a primary response was already sent,
    /// the acknowledgement deadline has passed, or the transport fails.
    pub async fn defer(&mut self, ephemeral: bool) -> Result<(), ResponseError> {
        self.send_primary(InitialResponse::Defer { ephemeral }, ResponseState::Deferred)
            .await?;
        self.ephemeral_defer = ephemeral;
        Ok(())
    }

    /// Acknowledge a component interaction without sending a message
    ///
    /// # Errors
    /// This method returns an error if this is not a component interaction,
    /// a primary response was already sent, the acknowledgement deadline has
    /// passed, or the transport fails.
    pub async fn acknowledge(&mut self) -> Result<(), ResponseError> {
        if self.source.is_none() {
            return Err(ResponseError::NotComponent);
        }

        self.send_primary(InitialResponse::Acknowledge, ResponseState::Responded)
            .await
    }

    /// Replace the content of the original response
    ///
    /// # Errors
    /// This method returns an error if the interaction was not acknowledged,
    /// the original response was deleted, the message violates a platform
    /// limit, or the transport fails twice.
    pub async fn edit(&mut self, body: impl Into<MessageBody>) -> Result<(), ResponseError> {
        match self.state() {
            ResponseState::NotResponded => return Err(ResponseError::NotAcknowledged),
            ResponseState::Deleted => return Err(ResponseError::Deleted),
            ResponseState::Deferred | ResponseState::Responded => (),
        }

        let payload = body.into().prepare()?;
        retry_once("edit_response", || {
            self.transport.edit_response(self.id, &payload)
        })
        .await?;
        self.set_state(ResponseState::Responded);

        Ok(())
    }

    /// Delete the original response
    ///
    /// # Errors
    /// This method returns an error if the interaction was not acknowledged,
    /// the original response was already deleted, or the transport fails
    /// twice.
    pub async fn delete_original(&mut self) -> Result<(), ResponseError> {
        match self.state() {
            ResponseState::NotResponded => return Err(ResponseError::NotAcknowledged),
            ResponseState::Deleted => return Err(ResponseError::Deleted),
            ResponseState::Deferred | ResponseState::Responded => (),
        }

        retry_once("delete_response", || self.transport.delete_response(self.id)).await?;
        self.set_state(ResponseState::Deleted);

        Ok(())
    }

    /// Create a followup message for this interaction
    ///
    /// # Errors
    /// This method returns an error if the interaction was not acknowledged,
    /// the message violates a platform limit, or the transport fails.
    pub async fn followup(&self, msg: impl Into<Message>) -> Result<Followup, ResponseError> {
        if !self.state().is_acked() {
            return Err(ResponseError::NotAcknowledged);
        }

        let payload = msg.into().prepare()?;
        let id = self.transport.create_followup(self.id, &payload).await?;

        Ok(Followup(id))
    }

    /// Send a message as the primary response if none has been sent yet,
    /// otherwise send it as a followup
    ///
    /// # Errors
    /// This method returns an error if the message violates a platform limit,
    /// the acknowledgement deadline has passed, or the transport fails.
    pub async fn respond_or_followup(
        &mut self,
        msg: impl Into<Message>,
    ) -> Result<Option<Followup>, ResponseError> {
        if self.state().is_open() {
            self.respond(msg).await.map(|()| None)
        } else {
            self.followup(msg).await.map(Some)
        }
    }

    /// Delete the message a component interaction originates from
    ///
    /// This does not count as a response to the interaction, but it does
    /// settle it (see [`is_settled`](Self::is_settled)).
    ///
    /// # Errors
    /// This method returns an error if the interaction has no source message
    /// or the transport fails twice.
    pub async fn delete_source_message(&mut self) -> Result<(), ResponseError> {
        let (channel, message) = self.source.ok_or(ResponseError::NoSourceMessage)?;

        retry_once("delete_message", || {
            self.transport.delete_message(channel, message)
        })
        .await?;
        self.source_deleted = true;

        Ok(())
    }
}
