use super::prelude::*;

#[derive(Debug, Default)]
pub struct EchoCommand;

impl EchoCommand {
    pub fn info() -> Result<CommandInfo, DefinitionError> {
        CommandInfo::build_slash("echo", "Prints input", |a| {
            a.string("input", "The text to print", true)
        })
    }
}

#[async_trait]
impl CommandHandler for EchoCommand {
    async fn respond(
        &self,
        visitor: &mut CommandVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult {
        let input = visitor.visit_string("input")?.required()?;

        responder.respond(Message::plain(input)).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use switchboard::{
        interaction::{dispatch::DispatchError, event::Argument},
        testing,
    };

    use super::super::harness::dispatch;

    #[tokio::test(start_paused = true)]
    async fn test_verbatim() {
        let input = "  *hello*\n`world`  ";
        let (report, transport) =
            dispatch(testing::command(1, "echo", vec![Argument::new("input", input)])).await;

        assert!(report.error.is_none(), "{report:?}");
        let msgs = transport.messages();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content(), Some(input));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_input() {
        let (report, transport) = dispatch(testing::command(1, "echo", vec![])).await;

        assert!(matches!(report.error, Some(DispatchError::Arguments(_))));
        let msgs = transport.messages();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].ephemeral());
        assert!(msgs[0].content().unwrap().starts_with("Invalid arguments - "));
    }
}
