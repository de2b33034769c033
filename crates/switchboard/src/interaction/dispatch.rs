//! Routing of inbound interactions to their handlers

use std::{
    collections::{HashSet, VecDeque},
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinSet},
    time::Instant,
};

use super::{
    command::{ArgumentError, CommandInfo},
    event::{CommandInvocation, ComponentCallback, Interaction, InteractionId, InteractionKind},
    handler::{
        CommandHandler, CommandVisitor, ComponentHandler, ComponentVisitor, HandlerError,
        HandlerResult,
    },
    registry::{self, Registry},
    response::{Message, Responder, ResponseError, ResponseState},
    route::{self, Router},
    transport::Transport,
    visitor,
};

/// Tunables for a [`Dispatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOpts {
    /// Time allowed between receiving an interaction and sending its primary
    /// response
    pub ack_deadline: Duration,
    /// Time in-flight interactions are given to finish once shutdown begins
    pub shutdown_grace: Duration,
    /// Number of recently accepted interaction IDs remembered for replay
    /// detection
    pub replay_window: usize,
}

impl Default for DispatchOpts {
    fn default() -> Self {
        Self {
            ack_deadline: Duration::from_secs(3),
            shutdown_grace: Duration::from_secs(5),
            replay_window: 1024,
        }
    }
}

/// An error arising from registering handlers with a [`DispatcherBuilder`]
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// A command could not be registered
    #[error("Error registering command")]
    Command(#[from] registry::Error),
    /// A component route could not be registered
    #[error("Error registering component route")]
    Route(#[from] route::Error),
}

/// An error recorded while dispatching a single interaction
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The interaction ID was already accepted
    #[error("Interaction was already handled")]
    Replayed,
    /// No command is registered under the invoked name
    #[error("Error resolving command")]
    UnknownCommand(#[source] registry::Error),
    /// No component route matches the custom ID
    #[error("Error resolving component")]
    NoRoute(#[source] route::Error),
    /// The arguments do not satisfy the command's parameter schema
    #[error("Invalid command arguments")]
    Arguments(#[from] ArgumentError),
    /// The handler returned an error
    #[error("Handler failed")]
    Handler(#[from] HandlerError),
    /// No primary response was sent before the acknowledgement deadline
    #[error("Interaction was not acknowledged within {0:?}")]
    Timeout(Duration),
}

/// The outcome of dispatching a single interaction
#[derive(Debug)]
pub struct Report {
    /// The ID of the interaction
    pub id: InteractionId,
    /// The final state of the primary response
    pub state: ResponseState,
    /// Whether the acknowledgement deadline passed without a primary
    /// response
    pub timed_out: bool,
    /// The first error encountered, if any
    pub error: Option<DispatchError>,
}

/// An interaction paired with the transport used to respond to it
#[derive(Debug)]
pub struct Inbound {
    /// The received interaction
    pub interaction: Interaction,
    /// The transport for outbound calls on behalf of the interaction
    pub transport: Arc<dyn Transport>,
    /// When the interaction was received, used to compute its deadline
    pub received: Instant,
}

impl Inbound {
    /// Pair an interaction with its transport, stamped as received now
    #[must_use]
    pub fn new(interaction: Interaction, transport: Arc<dyn Transport>) -> Self {
        Self {
            interaction,
            transport,
            received: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
struct RecentIds {
    set: HashSet<InteractionId>,
    order: VecDeque<InteractionId>,
}

impl RecentIds {
    fn insert(&mut self, id: InteractionId, cap: usize) -> bool {
        if !self.set.insert(id) {
            return false;
        }

        self.order.push_back(id);
        while self.order.len() > cap {
            if let Some(old) = self.order.pop_front() {
                self.set.remove(&old);
            }
        }

        true
    }
}

/// Builder for a [`Dispatcher`]
///
/// All registration happens here, so a built dispatcher never changes.
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    commands: Registry,
    routes: Router,
    opts: DispatchOpts,
}

impl DispatcherBuilder {
    /// Construct a new builder with no handlers and default options
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register a slash command and its handler
    ///
    /// # Errors
    /// This method returns an error if a command with the same name was
    /// already registered.
    pub fn register_command(
        &mut self,
        info: CommandInfo,
        handler: impl CommandHandler + 'static,
    ) -> Result<&mut Self, SetupError> {
        self.commands.register(info, Arc::new(handler))?;
        Ok(self)
    }

    /// Register a component route pattern and its handler
    ///
    /// # Errors
    /// This method returns an error if the pattern is malformed or was
    /// already registered.
    pub fn register_component_route(
        &mut self,
        pattern: impl Into<String>,
        handler: impl ComponentHandler + 'static,
    ) -> Result<&mut Self, SetupError> {
        self.routes.register(pattern, Arc::new(handler))?;
        Ok(self)
    }

    /// Set the options for the dispatcher
    pub fn opts(&mut self, opts: DispatchOpts) -> &mut Self {
        self.opts = opts;
        self
    }

    /// Finish registration
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let Self {
            commands,
            routes,
            opts,
        } = self;

        tracing::debug!(
            commands = commands.len(),
            routes = routes.len(),
            ?opts,
            "Dispatcher ready"
        );

        Dispatcher {
            commands,
            routes,
            opts,
            recent: Mutex::default(),
        }
    }
}

/// Dispatches inbound interactions to their registered handlers and enforces
/// the response rules around them
#[derive(Debug)]
pub struct Dispatcher {
    commands: Registry,
    routes: Router,
    opts: DispatchOpts,
    recent: Mutex<RecentIds>,
}

/// Race a handler against the acknowledgement deadline without cancelling it
async fn watch_deadline<T>(
    fut: impl Future<Output = T>,
    mut state: watch::Receiver<ResponseState>,
    deadline: Instant,
) -> (T, bool) {
    tokio::pin!(fut);
    let acked = tokio::time::timeout_at(deadline, async move {
        state.wait_for(|s| s.is_acked()).await.is_ok()
    });

    tokio::select! {
        res = &mut fut => (res, false),
        acked = acked => {
            let timed_out = acked.is_err();
            if timed_out {
                tracing::error!("Interaction was not acknowledged before the deadline");
            }

            (fut.await, timed_out)
        },
    }
}

/// Deliver an error message without revealing it to the whole channel
///
/// A public deferral cannot be edited into an ephemeral message, so its
/// placeholder is removed and the error is sent as an ephemeral followup.
async fn send_error(responder: &mut Responder, msg: Message) -> Result<(), ResponseError> {
    if responder.state() == ResponseState::Deferred && !responder.ephemeral_defer() {
        responder.delete_original().await?;
        responder.followup(msg).await.map(|_| ())
    } else {
        responder.respond(msg).await
    }
}

fn pretty_handler_error(err: &HandlerError, desc: &'static str) -> Option<Message> {
    let msg = match err {
        HandlerError::Parse(visitor::Error::GuildRequired) => {
            tracing::debug!(%err, "Responding with guild error");
            format!("**ERROR:** This {desc} must be run inside a server.")
        },
        HandlerError::Parse(err) => {
            tracing::error!(%err, "Unexpected error parsing {desc}");
            format!("Unexpected error parsing {desc}: `{err}`")
        },
        HandlerError::User(msg) => {
            tracing::debug!(msg, "Handler for {desc} responded to user with error");
            msg.clone()
        },
        HandlerError::Response(err) => {
            tracing::error!(%err, "Error responding to {desc}");
            return None;
        },
        HandlerError::Other(err) => {
            tracing::error!(?err, "Unexpected error handling {desc}");
            format!("Unexpected error: `{err}`")
        },
    };

    Some(Message::plain(msg).ephemeral(true))
}

async fn reject(responder: &mut Responder, msg: &str) {
    if let Err(err) = responder.respond(Message::plain(msg).ephemeral(true)).await {
        tracing::error!(%err, "Unable to send rejection response");
    }
}

fn log_join(res: Result<Report, JoinError>) {
    match res {
        Ok(Report {
            id,
            state,
            timed_out,
            error,
        }) => tracing::trace!(%id, ?state, timed_out, ?error, "Interaction task finished"),
        Err(err) if err.is_panic() => tracing::error!(%err, "Interaction task panicked"),
        Err(err) => tracing::debug!(%err, "Interaction task cancelled"),
    }
}

impl Dispatcher {
    /// Construct a new builder
    #[inline]
    #[must_use]
    pub fn builder() -> DispatcherBuilder { DispatcherBuilder::new() }

    /// Get the registered commands
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &Registry { &self.commands }

    /// Get the registered component routes
    #[inline]
    #[must_use]
    pub fn routes(&self) -> &Router { &self.routes }

    /// Get the options this dispatcher was built with
    #[inline]
    #[must_use]
    pub fn opts(&self) -> &DispatchOpts { &self.opts }

    fn accept(&self, id: InteractionId) -> bool {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, self.opts.replay_window)
    }

    async fn conclude(
        responder: &mut Responder,
        res: HandlerResult,
        desc: &'static str,
    ) -> Option<DispatchError> {
        let err = match res {
            Ok(()) if responder.is_settled() => return None,
            Ok(()) => {
                tracing::error!("Handler for {desc} completed without acknowledging");
                return Some(DispatchError::Timeout(responder.ack_deadline()));
            },
            Err(e) => e,
        };

        if responder.state().is_open() {
            if let Some(msg) = pretty_handler_error(&err, desc) {
                if let Err(err) = send_error(responder, msg).await {
                    tracing::error!(%err, "Unable to send error response");
                }
            }
        } else {
            tracing::debug!(%err, "Response already sent, logging {desc} error only");
        }

        Some(err.into())
    }

    #[tracing::instrument(
        level = "error",
        name = "handle_command",
        skip(self, int, cmd, responder)
    )]
    async fn handle_command(
        &self,
        int: &Interaction,
        cmd: &CommandInvocation,
        responder: &mut Responder,
        name: String,
        id: InteractionId,
        issuer: String,
    ) -> (Option<DispatchError>, bool) {
        tracing::info!("Handling application command");

        let entry = match self.commands.resolve(&cmd.name) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Rejecting unknown command");
                reject(responder, "Unknown command - this may be a bug.").await;
                return (Some(DispatchError::UnknownCommand(err)), false);
            },
        };

        if let Err(err) = entry.info().validate(&cmd.args) {
            tracing::warn!(%err, "Rejecting command with invalid arguments");
            reject(responder, &format!("Invalid arguments - {err}")).await;
            return (Some(err.into()), false);
        }

        let handler = entry.handler();
        tracing::debug!(?handler, "Command handler selected");

        let (state, deadline) = (responder.subscribe(), responder.deadline());
        let mut vis = CommandVisitor::new(int, cmd);
        let (res, timed_out) =
            watch_deadline(handler.respond(&mut vis, responder), state, deadline).await;
        let res = res.and_then(|()| vis.finish().map_err(Into::into));

        (Self::conclude(responder, res, "command").await, timed_out)
    }

    #[tracing::instrument(
        level = "error",
        name = "handle_component",
        skip(self, int, cb, responder)
    )]
    async fn handle_component(
        &self,
        int: &Interaction,
        cb: &ComponentCallback,
        responder: &mut Responder,
        name: String,
        id: InteractionId,
        issuer: String,
    ) -> (Option<DispatchError>, bool) {
        tracing::info!("Handling message component");

        let route::Resolved {
            pattern,
            handler,
            captures,
        } = match self.routes.resolve(&cb.custom_id) {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("Rejecting unknown component");
                reject(responder, "Unknown component - this may be a bug.").await;
                return (Some(DispatchError::NoRoute(err)), false);
            },
        };
        tracing::debug!(%pattern, ?captures, ?handler, "Component handler selected");

        let (state, deadline) = (responder.subscribe(), responder.deadline());
        let vis = ComponentVisitor::new(int, cb, captures);
        let (res, timed_out) =
            watch_deadline(handler.respond(&vis, responder), state, deadline).await;

        (Self::conclude(responder, res, "component").await, timed_out)
    }

    /// Handle a single interaction to completion
    ///
    /// Errors never escape this method; they are logged, reported to the
    /// user where possible, and recorded in the returned [`Report`].
    pub async fn handle(&self, inbound: Inbound) -> Report {
        let Inbound {
            interaction: int,
            transport,
            received,
        } = inbound;
        let id = int.id;

        if !self.accept(id) {
            tracing::warn!(%id, "Dropping replayed interaction");
            return Report {
                id,
                state: ResponseState::NotResponded,
                timed_out: false,
                error: Some(DispatchError::Replayed),
            };
        }

        let source = match int.kind {
            InteractionKind::Command(_) => None,
            InteractionKind::Component(ref c) => Some((int.channel_id, c.message_id)),
        };
        let mut responder =
            Responder::new(transport, id, source, received, self.opts.ack_deadline);
        let (name, issuer) = (int.describe(), int.issuer());

        let (error, timed_out) = match int.kind {
            InteractionKind::Command(ref cmd) => {
                self.handle_command(&int, cmd, &mut responder, name, id, issuer)
                    .await
            },
            InteractionKind::Component(ref cb) => {
                self.handle_component(&int, cb, &mut responder, name, id, issuer)
                    .await
            },
        };

        let error = match error {
            None if timed_out => Some(DispatchError::Timeout(self.opts.ack_deadline)),
            e => e,
        };
        let timed_out = timed_out || matches!(error, Some(DispatchError::Timeout(_)));

        Report {
            id,
            state: responder.state(),
            timed_out,
            error,
        }
    }

    /// Handle interactions from the given channel until it closes or
    /// `shutdown` resolves
    ///
    /// Each interaction runs in its own task.  On shutdown no further
    /// interactions are accepted, and in-flight tasks are given
    /// [`DispatchOpts::shutdown_grace`] to finish before being aborted.
    pub async fn serve(
        self: Arc<Self>,
        mut rx: mpsc::Receiver<Inbound>,
        shutdown: impl Future<Output = ()>,
    ) {
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                inbound = rx.recv() => {
                    let Some(inbound) = inbound else { break };
                    let this = Arc::clone(&self);
                    tasks.spawn(async move { this.handle(inbound).await });
                },
                Some(res) = tasks.join_next(), if !tasks.is_empty() => log_join(res),
            }
        }

        rx.close();
        tracing::info!(in_flight = tasks.len(), "Dispatcher shutting down");

        let drained = tokio::time::timeout(self.opts.shutdown_grace, async {
            while let Some(res) = tasks.join_next().await {
                log_join(res);
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = tasks.len(),
                "Shutdown grace period elapsed, aborting remaining interactions"
            );
            tasks.shutdown().await;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        interaction::{
            event::{Argument, ChannelId, MessageId},
            response::Payload,
        },
        testing::{self, Call, RecordingTransport, Sent},
    };

    #[derive(Debug)]
    struct Pong;

    #[async_trait::async_trait]
    impl CommandHandler for Pong {
        async fn respond(&self, _: &mut CommandVisitor<'_>, res: &mut Responder) -> HandlerResult {
            res.respond(Message::plain("pong")).await?;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Echo;

    #[async_trait::async_trait]
    impl CommandHandler for Echo {
        async fn respond(
            &self,
            vis: &mut CommandVisitor<'_>,
            res: &mut Responder,
        ) -> HandlerResult {
            let input = vis.visit_string("input")?.required()?;
            res.respond(Message::plain(input)).await?;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Slow {
        defer: bool,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl CommandHandler for Slow {
        async fn respond(&self, _: &mut CommandVisitor<'_>, res: &mut Responder) -> HandlerResult {
            if self.defer {
                res.defer(false).await?;
            }
            tokio::time::sleep(self.delay).await;
            res.respond(Message::plain("done")).await?;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Fails {
        defer: Option<bool>,
        respond: bool,
    }

    #[async_trait::async_trait]
    impl CommandHandler for Fails {
        async fn respond(&self, _: &mut CommandVisitor<'_>, res: &mut Responder) -> HandlerResult {
            if let Some(ephemeral) = self.defer {
                res.defer(ephemeral).await?;
            }
            if self.respond {
                res.respond(Message::plain("partial")).await?;
            }
            Err(anyhow::anyhow!("boom").into())
        }
    }

    #[derive(Debug, Default)]
    struct Capture(Arc<Mutex<Vec<(Vec<String>, Vec<String>)>>>);

    #[async_trait::async_trait]
    impl ComponentHandler for Capture {
        async fn respond(&self, vis: &ComponentVisitor<'_>, res: &mut Responder) -> HandlerResult {
            self.0.lock().unwrap().push((
                vis.captures().iter().map(|&s| s.to_owned()).collect(),
                vis.values().to_vec(),
            ));
            res.acknowledge().await?;
            Ok(())
        }
    }

    fn dispatcher(f: impl FnOnce(&mut DispatcherBuilder)) -> Dispatcher {
        let mut builder = Dispatcher::builder();
        builder
            .register_command(CommandInfo::build_slash("ping", "Ping", |a| a).unwrap(), Pong)
            .unwrap()
            .register_command(
                CommandInfo::build_slash("echo", "Echo", |a| a.string("input", "Input", true))
                    .unwrap(),
                Echo,
            )
            .unwrap();
        f(&mut builder);
        builder.build()
    }

    fn only_message(t: &RecordingTransport) -> Payload {
        let calls = t.calls();
        assert_eq!(calls.len(), 1, "{calls:?}");
        match calls.into_iter().next() {
            Some(Call::Respond(_, Sent::Message(p))) => p,
            c => panic!("Unexpected call {c:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ping() {
        let d = dispatcher(|_| ());
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::command(1, "ping", vec![]), &t)).await;
        assert_eq!(report.state, ResponseState::Responded);
        assert!(report.error.is_none());
        assert!(!report.timed_out);

        let p = only_message(&t);
        assert_eq!(p.content(), Some("pong"));
        assert!(!p.ephemeral());
    }

    #[tokio::test(start_paused = true)]
    async fn test_echo() {
        let d = dispatcher(|_| ());
        let t = Arc::new(RecordingTransport::default());
        let int = testing::command(1, "echo", vec![Argument::new("input", "hello *world*")]);

        d.handle(testing::inbound(int, &t)).await;
        assert_eq!(only_message(&t).content(), Some("hello *world*"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_command() {
        let d = dispatcher(|_| ());
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::command(1, "nope", vec![]), &t)).await;
        assert!(matches!(
            report.error,
            Some(DispatchError::UnknownCommand(registry::Error::UnknownCommand(ref n)))
                if n == "nope"
        ));

        let p = only_message(&t);
        assert_eq!(p.content(), Some("Unknown command - this may be a bug."));
        assert!(p.ephemeral());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_arguments() {
        let d = dispatcher(|_| ());
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::command(1, "echo", vec![]), &t)).await;
        assert!(matches!(
            report.error,
            Some(DispatchError::Arguments(ArgumentError::Missing(_)))
        ));
        assert!(only_message(&t).ephemeral());

        let int = testing::command(2, "echo", vec![Argument::new("input", 5_i64)]);
        let report = d.handle(testing::inbound(int, &t)).await;
        assert!(matches!(
            report.error,
            Some(DispatchError::Arguments(ArgumentError::TypeMismatch { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_dropped() {
        let d = dispatcher(|_| ());
        let t = Arc::new(RecordingTransport::default());

        d.handle(testing::inbound(testing::command(7, "ping", vec![]), &t)).await;
        let report = d.handle(testing::inbound(testing::command(7, "ping", vec![]), &t)).await;

        assert!(matches!(report.error, Some(DispatchError::Replayed)));
        assert_eq!(t.calls().len(), 1);
    }

    #[test]
    fn test_replay_window_evicts() {
        let mut recent = RecentIds::default();
        assert!(recent.insert(InteractionId(1), 2));
        assert!(recent.insert(InteractionId(2), 2));
        assert!(!recent.insert(InteractionId(2), 2));
        assert!(recent.insert(InteractionId(3), 2));
        assert!(recent.insert(InteractionId(1), 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_not_cancelled() {
        let d = dispatcher(|b| {
            b.register_command(CommandInfo::build_slash("slow", "Slow", |a| a).unwrap(), Slow {
                defer: false,
                delay: Duration::from_secs(4),
            })
            .unwrap();
        });
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::command(1, "slow", vec![]), &t)).await;
        assert!(report.timed_out);
        assert_eq!(report.state, ResponseState::NotResponded);
        assert!(matches!(
            report.error,
            Some(DispatchError::Handler(HandlerError::Response(ResponseError::Timeout(_))))
        ));
        assert!(t.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_defer_then_slow_respond() {
        let d = dispatcher(|b| {
            b.register_command(CommandInfo::build_slash("slow", "Slow", |a| a).unwrap(), Slow {
                defer: true,
                delay: Duration::from_secs(10),
            })
            .unwrap();
        });
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::command(1, "slow", vec![]), &t)).await;
        assert!(!report.timed_out);
        assert!(report.error.is_none());
        assert_eq!(report.state, ResponseState::Responded);

        let calls = t.calls();
        assert!(matches!(calls[0], Call::Respond(_, Sent::Defer { ephemeral: false })));
        assert!(matches!(calls[1], Call::Edit(_, ref p) if p.content() == Some("done")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_error_replies() {
        let d = dispatcher(|b| {
            b.register_command(CommandInfo::build_slash("fail", "Fail", |a| a).unwrap(), Fails {
                defer: None,
                respond: false,
            })
            .unwrap()
            .register_command(
                CommandInfo::build_slash("fail-deferred", "Fail", |a| a).unwrap(),
                Fails {
                    defer: Some(true),
                    respond: false,
                },
            )
            .unwrap()
            .register_command(
                CommandInfo::build_slash("fail-public", "Fail", |a| a).unwrap(),
                Fails {
                    defer: Some(false),
                    respond: false,
                },
            )
            .unwrap()
            .register_command(
                CommandInfo::build_slash("fail-late", "Fail", |a| a).unwrap(),
                Fails {
                    defer: None,
                    respond: true,
                },
            )
            .unwrap();
        });

        let t = Arc::new(RecordingTransport::default());
        let report = d.handle(testing::inbound(testing::command(1, "fail", vec![]), &t)).await;
        assert!(matches!(report.error, Some(DispatchError::Handler(HandlerError::Other(_)))));
        let p = only_message(&t);
        assert!(p.ephemeral());
        assert_eq!(p.content(), Some("Unexpected error: `boom`"));

        let t = Arc::new(RecordingTransport::default());
        d.handle(testing::inbound(testing::command(2, "fail-deferred", vec![]), &t))
            .await;
        let calls = t.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(
            calls[1],
            Call::Edit(_, ref p) if p.content() == Some("Unexpected error: `boom`")
        ));

        let t = Arc::new(RecordingTransport::default());
        let report = d
            .handle(testing::inbound(testing::command(4, "fail-public", vec![]), &t))
            .await;
        assert_eq!(report.state, ResponseState::Deleted);
        let calls = t.calls();
        assert_eq!(calls.len(), 3, "{calls:?}");
        assert!(matches!(calls[0], Call::Respond(_, Sent::Defer { ephemeral: false })));
        assert!(matches!(calls[1], Call::DeleteResponse(InteractionId(4))));
        assert!(matches!(
            calls[2],
            Call::Followup(_, ref p)
                if p.ephemeral() && p.content() == Some("Unexpected error: `boom`")
        ));

        let t = Arc::new(RecordingTransport::default());
        let report = d
            .handle(testing::inbound(testing::command(3, "fail-late", vec![]), &t))
            .await;
        assert!(report.error.is_some());
        assert_eq!(only_message(&t).content(), Some("partial"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_component_route() {
        let seen = Arc::new(Mutex::new(vec![]));
        let d = dispatcher(|b| {
            b.register_component_route("menu-*", Capture(Arc::clone(&seen)))
                .unwrap();
        });
        let t = Arc::new(RecordingTransport::default());

        let int = testing::component(1, "menu-file", &["opt-a", "opt-b"]);
        let report = d.handle(testing::inbound(int, &t)).await;
        assert_eq!(report.state, ResponseState::Responded);

        assert_eq!(*seen.lock().unwrap(), [(
            vec!["file".to_owned()],
            vec!["opt-a".to_owned(), "opt-b".to_owned()]
        )]);
        assert!(matches!(t.calls()[0], Call::Respond(_, Sent::Acknowledge)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_route() {
        let d = dispatcher(|_| ());
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::component(1, "delete", &[]), &t)).await;
        assert!(matches!(report.error, Some(DispatchError::NoRoute(_))));

        let p = only_message(&t);
        assert_eq!(p.content(), Some("Unknown component - this may be a bug."));
        assert!(p.ephemeral());
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_drains_then_aborts() {
        let d = Arc::new(dispatcher(|b| {
            b.register_command(CommandInfo::build_slash("slow", "Slow", |a| a).unwrap(), Slow {
                defer: true,
                delay: Duration::from_secs(3600),
            })
            .unwrap();
        }));
        let t = Arc::new(RecordingTransport::default());
        let (tx, rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let serve = tokio::spawn(Arc::clone(&d).serve(rx, async move {
            let _ = stop_rx.await;
        }));

        tx.send(testing::inbound(testing::command(1, "ping", vec![]), &t))
            .await
            .unwrap();
        tx.send(testing::inbound(testing::command(2, "slow", vec![]), &t))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        stop_tx.send(()).unwrap();
        let start = Instant::now();
        serve.await.unwrap();
        assert!(start.elapsed() >= d.opts().shutdown_grace);

        let calls = t.calls();
        assert_eq!(calls.len(), 2, "{calls:?}");
        assert!(calls.iter().any(|c| matches!(
            c,
            Call::Respond(InteractionId(1), Sent::Message(p)) if p.content() == Some("pong")
        )));
        assert!(calls.iter().all(|c| !matches!(c, Call::Edit(..))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_handler_times_out() {
        #[derive(Debug)]
        struct Silent;

        #[async_trait::async_trait]
        impl CommandHandler for Silent {
            async fn respond(&self, _: &mut CommandVisitor<'_>, _: &mut Responder) -> HandlerResult {
                Ok(())
            }
        }

        let d = dispatcher(|b| {
            b.register_command(CommandInfo::build_slash("silent", "Silent", |a| a).unwrap(), Silent)
                .unwrap();
        });
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::command(1, "silent", vec![]), &t)).await;
        assert_eq!(report.state, ResponseState::NotResponded);
        assert!(report.timed_out);
        assert!(matches!(
            report.error,
            Some(DispatchError::Timeout(dur)) if dur == DispatchOpts::default().ack_deadline
        ));
        assert!(t.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_source_without_ack() {
        #[derive(Debug)]
        struct Delete;

        #[async_trait::async_trait]
        impl ComponentHandler for Delete {
            async fn respond(&self, _: &ComponentVisitor<'_>, res: &mut Responder) -> HandlerResult {
                res.delete_source_message().await?;
                Ok(())
            }
        }

        let d = dispatcher(|b| {
            b.register_component_route("delete", Delete).unwrap();
        });
        let t = Arc::new(RecordingTransport::default());

        let report = d.handle(testing::inbound(testing::component(1, "delete", &[]), &t)).await;
        assert_eq!(report.state, ResponseState::NotResponded);
        assert!(report.error.is_none());
        assert!(!report.timed_out);
        assert_eq!(t.calls(), [Call::DeleteMessage(
            ChannelId(testing::CHANNEL),
            MessageId(testing::MESSAGE)
        )]);
    }
}
