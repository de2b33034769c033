use chrono::Utc;

use super::{delete, menu, prelude::*};

#[derive(Debug, Default)]
pub struct EmbedCommand;

impl EmbedCommand {
    pub fn info() -> Result<CommandInfo, DefinitionError> {
        CommandInfo::build_slash("embed", "Creates an embedded message", |a| {
            a.string("input", "The text to embed", true)
        })
    }
}

fn file_menu() -> Menu {
    Menu::new(menu::FILE_MENU)
        .placeholder("Select an option")
        .count(1, 1)
        .option(MenuOption::new("Option A", "opt-a").desc("Option B is lying!"))
        .option(MenuOption::new("Option B", "opt-b").desc("Option A is telling the truth!"))
}

#[async_trait]
impl CommandHandler for EmbedCommand {
    async fn respond(
        &self,
        visitor: &mut CommandVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult {
        let input = visitor.visit_string("input")?.required()?;

        let msg = Message::plain("Here is a button!")
            .build_embed(|e| {
                e.title("EmbedTitle")
                    .desc(format!("EmbedDescription:\n```{input}```"))
                    .color(Color::GREEN)
                    .timestamp(Utc::now())
                    .field("Field1", "some field input", false)
            })
            .components(|c| {
                c.menu(file_menu())
                    .buttons(|b| b.button(delete::ROUTE, ButtonStyle::Danger, "❌"))
            });

        responder.respond(msg).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use switchboard::{
        interaction::{
            event::Argument,
            response::{ActionRow, ButtonStyle, ButtonType, Color},
        },
        testing,
    };

    use super::super::harness::dispatch;

    #[tokio::test(start_paused = true)]
    async fn test_embed() {
        let (report, transport) =
            dispatch(testing::command(1, "embed", vec![Argument::new("input", "hi")])).await;
        assert!(report.error.is_none(), "{report:?}");

        let msgs = transport.messages();
        assert_eq!(msgs.len(), 1);
        let msg = &msgs[0];
        assert_eq!(msg.content(), Some("Here is a button!"));

        let [embed] = msg.embeds() else {
            panic!("expected one embed, got {:?}", msg.embeds());
        };
        assert_eq!(embed.get_title(), Some("EmbedTitle"));
        assert_eq!(embed.get_desc(), Some("EmbedDescription:\n```hi```"));
        assert_eq!(embed.get_color(), Some(Color::GREEN));
        assert!(embed.get_timestamp().is_some());
        assert_eq!(embed.get_fields()[0].name(), "Field1");
        assert_eq!(embed.get_fields()[0].value(), "some field input");

        let [ActionRow::Menu(menu), ActionRow::Buttons(buttons)] = msg.components() else {
            panic!("expected a menu and a button row, got {:?}", msg.components());
        };
        assert_eq!(menu.id(), "menu-file");
        assert_eq!(menu.get_placeholder(), Some("Select an option"));
        assert_eq!(menu.get_count(), (1, 1));
        let values: Vec<_> = menu.options().iter().map(|o| o.value()).collect();
        assert_eq!(values, ["opt-a", "opt-b"]);

        let [button] = &buttons[..] else {
            panic!("expected one button, got {buttons:?}");
        };
        assert_eq!(button.ty(), &ButtonType::Custom {
            id: "delete".into(),
            style: ButtonStyle::Danger,
        });
        assert_eq!(button.label().text(), Some("❌"));
    }
}
