//! Conversion from Serenity's interaction events into the dispatcher's model

use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, ComponentInteraction,
    ComponentInteractionDataKind,
};
use switchboard::interaction::event::{
    ArgValue, Argument, ChannelId, CommandInvocation, ComponentCallback, Interaction,
    InteractionId, InteractionKind, MessageId,
};

use crate::prelude::*;

fn arg_value(value: &CommandDataOptionValue) -> Option<ArgValue> {
    Some(match *value {
        CommandDataOptionValue::String(ref s) => ArgValue::String(s.clone()),
        CommandDataOptionValue::Integer(i) => ArgValue::Integer(i),
        CommandDataOptionValue::Number(n) => ArgValue::Number(n),
        CommandDataOptionValue::Boolean(b) => ArgValue::Boolean(b),
        CommandDataOptionValue::User(u) => ArgValue::User(u.get()),
        CommandDataOptionValue::Channel(c) => ArgValue::Channel(c.get()),
        CommandDataOptionValue::Role(r) => ArgValue::Role(r.get()),
        _ => return None,
    })
}

fn argument(opt: &CommandDataOption) -> Result<Argument> {
    let value = arg_value(&opt.value).ok_or_else(|| {
        anyhow!(
            "Unsupported value for command option {:?}: {:?}",
            opt.name,
            opt.value
        )
    })?;

    Ok(Argument::new(opt.name.clone(), value))
}

pub fn command(cmd: &CommandInteraction) -> Result<Interaction> {
    let args = cmd
        .data
        .options
        .iter()
        .map(argument)
        .collect::<Result<_>>()
        .with_context(|| format!("Error converting arguments of /{}", cmd.data.name))?;

    Ok(Interaction {
        id: InteractionId(cmd.id.get()),
        guild_id: cmd.guild_id.map(|g| g.get()),
        channel_id: ChannelId(cmd.channel_id.get()),
        user_id: Some(cmd.user.id.get()),
        kind: InteractionKind::Command(CommandInvocation {
            name: cmd.data.name.clone(),
            args,
        }),
    })
}

pub fn component(cpt: &ComponentInteraction) -> Interaction {
    let values = match cpt.data.kind {
        ComponentInteractionDataKind::StringSelect { ref values } => values.clone(),
        _ => vec![],
    };

    Interaction {
        id: InteractionId(cpt.id.get()),
        guild_id: cpt.guild_id.map(|g| g.get()),
        channel_id: ChannelId(cpt.channel_id.get()),
        user_id: Some(cpt.user.id.get()),
        kind: InteractionKind::Component(ComponentCallback {
            custom_id: cpt.data.custom_id.clone(),
            message_id: MessageId(cpt.message.id.get()),
            values,
        }),
    }
}

#[cfg(test)]
mod test {
    use serenity::all::{CommandDataOptionValue, RoleId, UserId};
    use switchboard::interaction::event::ArgValue;

    use super::arg_value;

    #[test]
    fn test_arg_values() {
        assert_eq!(
            arg_value(&CommandDataOptionValue::String("hi".into())),
            Some(ArgValue::String("hi".into()))
        );
        assert_eq!(
            arg_value(&CommandDataOptionValue::Integer(-4)),
            Some(ArgValue::Integer(-4))
        );
        assert_eq!(
            arg_value(&CommandDataOptionValue::User(UserId::new(12))),
            Some(ArgValue::User(12))
        );
        assert_eq!(
            arg_value(&CommandDataOptionValue::Role(RoleId::new(5))),
            Some(ArgValue::Role(5))
        );
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(
            arg_value(&CommandDataOptionValue::SubCommand(vec![])),
            None
        );
    }
}
