use super::prelude::*;

/// Custom ID of the select menu attached to `/embed`
pub const FILE_MENU: &str = "menu-file";

pub const ROUTE: &str = "menu-*";

#[derive(Debug, Default)]
pub struct MenuComponent;

#[async_trait]
impl ComponentHandler for MenuComponent {
    async fn respond(
        &self,
        visitor: &ComponentVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult {
        let values = visitor.values();
        if values.is_empty() {
            return Err(HandlerError::User("No option was selected.".into()));
        }

        debug!(menu = ?visitor.captures(), ?values, "Menu submitted");

        for value in values {
            responder
                .respond_or_followup(Message::plain(value).ephemeral(true))
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use switchboard::{
        interaction::{dispatch::DispatchError, event::InteractionId, response::ResponseState},
        testing::{self, Call, Sent},
    };

    use super::super::harness::dispatch;

    #[tokio::test(start_paused = true)]
    async fn test_values_in_order() {
        let (report, transport) =
            dispatch(testing::component(1, "menu-file", &["opt-b", "opt-a"])).await;

        assert!(report.error.is_none(), "{report:?}");
        assert_eq!(report.state, ResponseState::Responded);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2, "{calls:?}");
        let Call::Respond(InteractionId(1), Sent::Message(ref first)) = calls[0] else {
            panic!("expected a primary response, got {:?}", calls[0]);
        };
        let Call::Followup(InteractionId(1), ref second) = calls[1] else {
            panic!("expected a followup, got {:?}", calls[1]);
        };
        assert_eq!(first.content(), Some("opt-b"));
        assert_eq!(second.content(), Some("opt-a"));
        assert!(first.ephemeral() && second.ephemeral());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_values() {
        let (report, transport) = dispatch(testing::component(1, "menu-file", &[])).await;

        assert!(matches!(report.error, Some(DispatchError::Handler(_))));
        let msgs = transport.messages();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content(), Some("No option was selected."));
    }
}
