//! Helpers for exercising handlers without a chat platform

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use crate::interaction::{
    dispatch::Inbound,
    event::{
        Argument, ChannelId, CommandInvocation, ComponentCallback, Interaction, InteractionId,
        InteractionKind, MessageId,
    },
    response::Payload,
    transport::{InitialResponse, Transport, TransportError},
};

/// The channel every test interaction is invoked in
pub const CHANNEL: u64 = 100;
/// The message every test component is attached to
pub const MESSAGE: u64 = 200;
/// The user invoking every test interaction
pub const USER: u64 = 300;

/// An owned copy of an [`InitialResponse`]
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    /// A message reply
    Message(Payload),
    /// A deferral
    Defer {
        /// Whether the eventual reply is ephemeral
        ephemeral: bool,
    },
    /// A bare component acknowledgement
    Acknowledge,
}

/// A call recorded by a [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// [`Transport::send_response`]
    Respond(InteractionId, Sent),
    /// [`Transport::edit_response`]
    Edit(InteractionId, Payload),
    /// [`Transport::delete_response`]
    DeleteResponse(InteractionId),
    /// [`Transport::create_followup`]
    Followup(InteractionId, Payload),
    /// [`Transport::delete_message`]
    DeleteMessage(ChannelId, MessageId),
}

impl Call {
    /// Get the message payload carried by this call, if any
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Respond(_, Sent::Message(p)) | Self::Edit(_, p) | Self::Followup(_, p) => Some(p),
            _ => None,
        }
    }
}

/// A [`Transport`] that records every successful call in order
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    fail_next: AtomicUsize,
    failures: AtomicUsize,
    next_message: AtomicU64,
}

impl RecordingTransport {
    fn calls_mut(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) -> Result<(), TransportError> {
        let failed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if failed {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(anyhow::anyhow!("Simulated failure for {call:?}").into());
        }

        self.calls_mut().push(call);
        Ok(())
    }

    /// Make the next `n` calls fail without being recorded
    pub fn fail_next(&self, n: usize) { self.fail_next.store(n, Ordering::SeqCst); }

    /// Get the number of calls that failed
    #[must_use]
    pub fn failures(&self) -> usize { self.failures.load(Ordering::SeqCst) }

    /// Get a copy of the recorded calls
    #[must_use]
    pub fn calls(&self) -> Vec<Call> { self.calls_mut().clone() }

    /// Get the message payloads sent so far, in order
    #[must_use]
    pub fn messages(&self) -> Vec<Payload> {
        self.calls_mut()
            .iter()
            .filter_map(Call::payload)
            .cloned()
            .collect()
    }

    /// Get the ID assigned to the most recent followup message
    #[must_use]
    pub fn last_followup(&self) -> Option<MessageId> {
        match self.next_message.load(Ordering::SeqCst) {
            0 => None,
            n => Some(MessageId(MESSAGE + n)),
        }
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send_response(
        &self,
        id: InteractionId,
        res: InitialResponse<'_>,
    ) -> Result<(), TransportError> {
        let sent = match res {
            InitialResponse::Message(p) => Sent::Message(p.clone()),
            InitialResponse::Defer { ephemeral } => Sent::Defer { ephemeral },
            InitialResponse::Acknowledge => Sent::Acknowledge,
        };

        self.record(Call::Respond(id, sent))
    }

    async fn edit_response(
        &self,
        id: InteractionId,
        msg: &Payload,
    ) -> Result<(), TransportError> {
        self.record(Call::Edit(id, msg.clone()))
    }

    async fn delete_response(&self, id: InteractionId) -> Result<(), TransportError> {
        self.record(Call::DeleteResponse(id))
    }

    async fn create_followup(
        &self,
        id: InteractionId,
        msg: &Payload,
    ) -> Result<MessageId, TransportError> {
        self.record(Call::Followup(id, msg.clone()))?;
        let n = self.next_message.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageId(MESSAGE + n))
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        self.record(Call::DeleteMessage(channel, message))
    }
}

/// Construct a slash command interaction
#[must_use]
pub fn command(id: u64, name: &str, args: Vec<Argument>) -> Interaction {
    Interaction {
        id: InteractionId(id),
        guild_id: None,
        channel_id: ChannelId(CHANNEL),
        user_id: Some(USER),
        kind: InteractionKind::Command(CommandInvocation {
            name: name.into(),
            args,
        }),
    }
}

/// Construct a component interaction attached to [`MESSAGE`]
#[must_use]
pub fn component(id: u64, custom_id: &str, values: &[&str]) -> Interaction {
    Interaction {
        id: InteractionId(id),
        guild_id: None,
        channel_id: ChannelId(CHANNEL),
        user_id: Some(USER),
        kind: InteractionKind::Component(ComponentCallback {
            custom_id: custom_id.into(),
            message_id: MessageId(MESSAGE),
            values: values.iter().map(|&v| v.to_owned()).collect(),
        }),
    }
}

/// Pair an interaction with a recording transport
#[must_use]
pub fn inbound(interaction: Interaction, transport: &Arc<RecordingTransport>) -> Inbound {
    Inbound::new(interaction, Arc::clone(transport) as Arc<dyn Transport>)
}
