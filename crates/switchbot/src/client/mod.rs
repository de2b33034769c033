use serenity::{cache, model::gateway::GatewayIntents, Client};
use switchboard::{interaction::dispatch::DispatchOpts, Dispatcher};
use tokio::sync::mpsc;

use crate::{prelude::*, util::DebugShim};

mod commands;
mod convert;
mod handler;
mod transport;

use switchboard::interaction::dispatch::Inbound;

#[derive(Debug, clap::Args)]
pub struct ClientOpts {
    /// The Discord API token to use
    #[arg(long, env)]
    discord_token: DebugShim<String>,

    /// Register commands to this guild only, instead of globally
    #[arg(long, env)]
    guild_id: Option<u64>,

    /// Maximum number of messages to cache per channel
    #[arg(long, env, default_value_t = 50)]
    message_cache_size: usize,

    #[command(flatten)]
    dispatch: DispatchArgs,
}

#[derive(Debug, Clone, Copy, clap::Args)]
struct DispatchArgs {
    /// Time allowed to acknowledge an interaction, in milliseconds
    #[arg(long, env, default_value_t = 3000)]
    ack_deadline_ms: u64,

    /// Time allowed for in-flight interactions on shutdown, in milliseconds
    #[arg(long, env, default_value_t = 5000)]
    shutdown_grace_ms: u64,
}

impl From<DispatchArgs> for DispatchOpts {
    fn from(args: DispatchArgs) -> Self {
        let DispatchArgs {
            ack_deadline_ms,
            shutdown_grace_ms,
        } = args;

        Self {
            ack_deadline: Duration::from_millis(ack_deadline_ms),
            shutdown_grace: Duration::from_millis(shutdown_grace_ms),
            ..Self::default()
        }
    }
}

/// A constructed client and the dispatcher fed by its event handler
pub struct Bot {
    pub client: Client,
    pub dispatcher: Arc<Dispatcher>,
    pub inbound: mpsc::Receiver<Inbound>,
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("client", &DebugShim(&self.client))
            .field("dispatcher", &self.dispatcher)
            .field("inbound", &self.inbound)
            .finish()
    }
}

pub async fn build(opts: ClientOpts) -> Result<Bot> {
    let ClientOpts {
        discord_token,
        guild_id,
        message_cache_size,
        dispatch,
    } = opts;

    let dispatcher = Arc::new(commands::build(dispatch.into())?);
    let (tx, inbound) = mpsc::channel(64);

    let intents = GatewayIntents::non_privileged();
    let handler = handler::Handler::new_rc(Arc::clone(&dispatcher), tx, guild_id);

    let mut cache_settings = cache::Settings::default();
    cache_settings.max_messages = message_cache_size;

    let client = Client::builder(discord_token.0, intents)
        .event_handler_arc(handler)
        .cache_settings(cache_settings)
        .await
        .context("Error constructing Serenity client")?;

    Ok(Bot {
        client,
        dispatcher,
        inbound,
    })
}
