use super::prelude::*;

pub const ROUTE: &str = "delete";

#[derive(Debug, Default)]
pub struct DeleteComponent;

#[async_trait]
impl ComponentHandler for DeleteComponent {
    async fn respond(
        &self,
        _: &ComponentVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult {
        responder.delete_source_message().await?;

        Ok(())
    }
}
