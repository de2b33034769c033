mod delete;
mod echo;
mod embed;
mod menu;
mod ping;

pub(self) mod prelude {
    pub use switchboard::interaction::{
        command::{CommandInfo, DefinitionError},
        handler::{
            CommandHandler, CommandVisitor, ComponentHandler, ComponentVisitor, HandlerError,
            HandlerResult,
        },
        response::{ButtonStyle, Color, Menu, MenuOption, Message, Responder},
    };

    pub use crate::prelude::*;

    #[inline]
    pub fn id<T>(t: T) -> T { t }
}

use switchboard::{interaction::dispatch::DispatchOpts, Dispatcher};

use crate::prelude::*;

/// Construct the dispatcher with every command and component route the bot
/// knows about
pub fn build(opts: DispatchOpts) -> Result<Dispatcher> {
    let mut builder = Dispatcher::builder();

    builder
        .opts(opts)
        .register_command(ping::PingCommand::info()?, ping::PingCommand)?
        .register_command(echo::EchoCommand::info()?, echo::EchoCommand)?
        .register_command(embed::EmbedCommand::info()?, embed::EmbedCommand)?
        .register_component_route(delete::ROUTE, delete::DeleteComponent)?
        .register_component_route(menu::ROUTE, menu::MenuComponent)?;

    Ok(builder.build())
}


#[cfg(test)]
mod test {
    use switchboard::interaction::command::ParamType;

    use super::build;

    #[test]
    fn test_definitions() {
        let dispatcher = build(Default::default()).unwrap();

        let mut names: Vec<_> = dispatcher.commands().definitions().map(|c| c.name()).collect();
        names.sort_unstable();
        assert_eq!(names, ["echo", "embed", "ping"]);

        let echo = dispatcher.commands().resolve("echo").unwrap().info();
        assert_eq!(echo.desc(), "Prints input");
        assert_eq!(echo.params().len(), 1);
        assert_eq!(echo.params()[0].ty(), ParamType::String);
        assert!(echo.params()[0].required());

        assert_eq!(dispatcher.routes().len(), 2);
    }
}
