use super::prelude::*;

#[derive(Debug, Default)]
pub struct PingCommand;

impl PingCommand {
    pub fn info() -> Result<CommandInfo, DefinitionError> {
        CommandInfo::build_slash("ping", "Checks the bot connection", id)
    }
}

#[async_trait]
impl CommandHandler for PingCommand {
    async fn respond(
        &self,
        _: &mut CommandVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult {
        responder.respond(Message::plain("pong")).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use switchboard::{
        interaction::{event::InteractionId, response::ResponseState},
        testing::{self, Call, Sent},
    };

    use super::super::harness::dispatch;

    #[tokio::test(start_paused = true)]
    async fn test_pong() {
        let (report, transport) = dispatch(testing::command(1, "ping", vec![])).await;

        assert!(report.error.is_none(), "{report:?}");
        assert_eq!(report.state, ResponseState::Responded);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let Call::Respond(InteractionId(1), Sent::Message(ref msg)) = calls[0] else {
            panic!("expected a primary response, got {calls:?}");
        };
        assert_eq!(msg.content(), Some("pong"));
        assert!(!msg.ephemeral());
    }
}
