use serenity::{
    all::{Command, CommandOptionType, GuildId, Interaction},
    builder::{CreateCommand, CreateCommandOption},
    model::gateway::Ready,
    prelude::*,
};
use switchboard::{
    interaction::{
        command::{CommandInfo, ParamType},
        dispatch::Inbound,
        event::InteractionId,
        response::{Message, Responder, ResponseError},
        transport::Transport,
    },
    Dispatcher,
};
use tokio::{sync::mpsc, time::Instant};

use super::{convert, transport::SerenityTransport};
use crate::prelude::*;

#[derive(Debug)]
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    tx: mpsc::Sender<Inbound>,
    guild_id: Option<u64>,
}

impl Handler {
    pub fn new_rc(
        dispatcher: Arc<Dispatcher>,
        tx: mpsc::Sender<Inbound>,
        guild_id: Option<u64>,
    ) -> Arc<Self> {
        Arc::new(Self {
            dispatcher,
            tx,
            guild_id,
        })
    }
}

#[instrument(skip(f))]
async fn handler(method: &'static str, f: impl Future<Output = Result<()>>) {
    match f.await {
        Ok(()) => (),
        Err(e) => error!("Error in {method}: {e:?}"),
    }
}

/// Reply to a command the bot could not make sense of, so the user isn't left
/// waiting on an interaction that will never be dispatched
async fn reject_unparsed(
    transport: Arc<dyn Transport>,
    id: InteractionId,
    ack_deadline: Duration,
) -> Result<(), ResponseError> {
    let mut responder = Responder::new(transport, id, None, Instant::now(), ack_deadline);

    let msg = Message::plain("Unable to read this command - this may be a bug.");

    responder.respond(msg.ephemeral(true)).await
}

fn option_type(ty: ParamType) -> CommandOptionType {
    match ty {
        ParamType::String => CommandOptionType::String,
        ParamType::Integer => CommandOptionType::Integer,
        ParamType::Number => CommandOptionType::Number,
        ParamType::Boolean => CommandOptionType::Boolean,
        ParamType::User => CommandOptionType::User,
        ParamType::Channel => CommandOptionType::Channel,
        ParamType::Role => CommandOptionType::Role,
    }
}

fn create_command(info: &CommandInfo) -> CreateCommand {
    CreateCommand::new(info.name())
        .description(info.desc())
        .set_options(
            info.params()
                .iter()
                .map(|p| {
                    CreateCommandOption::new(option_type(p.ty()), p.name(), p.desc())
                        .required(p.required())
                })
                .collect(),
        )
}

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, int: Interaction) {
        handler("interaction_create", async move {
            let (event, transport) = match int {
                Interaction::Command(c) => {
                    let id = InteractionId(c.id.get());
                    let event = convert::command(&c);
                    let transport: Arc<dyn Transport> =
                        Arc::new(SerenityTransport::command(Arc::clone(&ctx.http), c));

                    match event {
                        Ok(e) => (e, transport),
                        Err(err) => {
                            let ack_deadline = self.dispatcher.opts().ack_deadline;
                            if let Err(e) = reject_unparsed(transport, id, ack_deadline).await {
                                error!(err = %e, "Unable to reject unreadable command");
                            }

                            return Err(err);
                        },
                    }
                },
                Interaction::Component(c) => {
                    let event = convert::component(&c);
                    let transport: Arc<dyn Transport> =
                        Arc::new(SerenityTransport::component(Arc::clone(&ctx.http), c));

                    (event, transport)
                },
                i if cfg!(debug_assertions) => {
                    warn!("Unknown interaction {i:?}");
                    return Ok(());
                },
                _ => return Ok(()),
            };

            self.tx
                .send(Inbound::new(event, transport))
                .await
                .map_err(|_| anyhow!("Dispatcher is no longer accepting interactions"))
        })
        .await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        handler("ready", async move {
            let cmds: Vec<_> = self
                .dispatcher
                .commands()
                .definitions()
                .map(create_command)
                .collect();
            let count = cmds.len();

            match self.guild_id {
                Some(guild) => {
                    debug!(count, guild, "Registering guild commands");
                    GuildId::new(guild)
                        .set_commands(&ctx.http, cmds)
                        .await
                        .with_context(|| {
                            format!("Failed to register commands for guild {guild}")
                        })?;
                },
                None => {
                    debug!(count, "Registering global commands");
                    Command::set_global_commands(&ctx.http, cmds)
                        .await
                        .context("Failed to register global commands")?;
                },
            }

            info!(user = %ready.user.name, "Bot is connected!");

            Ok(())
        })
        .await;
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use switchboard::{
        interaction::{command::CommandInfo, event::InteractionId, transport::Transport},
        testing::{Call, RecordingTransport, Sent},
    };

    use super::{create_command, reject_unparsed};

    #[tokio::test(start_paused = true)]
    async fn test_reject_unparsed() {
        let transport = Arc::new(RecordingTransport::default());

        let dyn_transport = Arc::clone(&transport) as Arc<dyn Transport>;
        reject_unparsed(dyn_transport, InteractionId(7), Duration::from_secs(3))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1, "{calls:?}");
        assert!(matches!(
            calls[0],
            Call::Respond(InteractionId(7), Sent::Message(ref p))
                if p.ephemeral() && p.content().is_some_and(|c| c.contains("this may be a bug"))
        ));
    }

    #[test]
    fn test_create_command() {
        let info = CommandInfo::build_slash("echo", "Prints input", |a| {
            a.string("input", "The text to print", true)
                .int("times", "How many times", false)
        })
        .unwrap();

        let json = serde_json::to_value(create_command(&info)).unwrap();
        assert_eq!(json["name"], "echo");
        assert_eq!(json["description"], "Prints input");

        let opts = json["options"].as_array().unwrap();
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0]["name"], "input");
        assert_eq!(opts[0]["type"], 3);
        assert_eq!(opts[0]["required"], true);
        assert_eq!(opts[1]["type"], 4);
    }
}
