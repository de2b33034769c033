//! Serenity-backed implementation of the dispatcher's transport seam

use serenity::{
    all::{
        ButtonStyle as SerenityStyle, ChannelId as SerenityChannel, CommandInteraction,
        ComponentInteraction, MessageId as SerenityMessage, ReactionType,
    },
    builder::{
        CreateActionRow, CreateButton, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter,
        CreateInteractionResponse, CreateInteractionResponseFollowup,
        CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
        CreateSelectMenuOption, EditInteractionResponse,
    },
    http::Http,
};
use switchboard::interaction::{
    event::{ChannelId, InteractionId, MessageId},
    response::{
        ActionRow, Button, ButtonLabel, ButtonStyle, ButtonType, Embed, Menu, MenuOption, Payload,
    },
    transport::{InitialResponse, Transport, TransportError},
};

use crate::{prelude::*, util::DebugShim};

#[derive(Debug)]
enum Source {
    Command(CommandInteraction),
    Component(ComponentInteraction),
}

macro_rules! on_source {
    ($self:expr, $int:ident => $body:expr) => {
        match $self.source {
            Source::Command(ref $int) => $body,
            Source::Component(ref $int) => $body,
        }
    };
}

/// Sends responses for a single Serenity interaction
#[derive(Debug)]
pub struct SerenityTransport {
    http: DebugShim<Arc<Http>>,
    source: Source,
}

impl SerenityTransport {
    pub fn command(http: Arc<Http>, cmd: CommandInteraction) -> Self {
        Self {
            http: http.into(),
            source: Source::Command(cmd),
        }
    }

    pub fn component(http: Arc<Http>, cpt: ComponentInteraction) -> Self {
        Self {
            http: http.into(),
            source: Source::Component(cpt),
        }
    }

    fn http(&self) -> &Http { &self.http.0 }

    fn check_id(&self, id: InteractionId) -> Result<(), TransportError> {
        let actual = on_source!(self, i => i.id.get());

        if actual == id.0 {
            Ok(())
        } else {
            Err(anyhow!("Transport for interaction {actual} used for {id}").into())
        }
    }
}

fn style(style: ButtonStyle) -> SerenityStyle {
    match style {
        ButtonStyle::Primary => SerenityStyle::Primary,
        ButtonStyle::Secondary => SerenityStyle::Secondary,
        ButtonStyle::Success => SerenityStyle::Success,
        ButtonStyle::Danger => SerenityStyle::Danger,
    }
}

fn button(btn: &Button) -> CreateButton {
    let out = match btn.ty() {
        ButtonType::Link(url) => CreateButton::new_link(url.as_str()),
        ButtonType::Custom { id, style: s } => CreateButton::new(id).style(style(*s)),
    };

    let (emoji, text) = match btn.label() {
        ButtonLabel::Text(emoji, text) => (emoji.as_ref(), text.as_str()),
        ButtonLabel::Emoji(emoji) => (Some(emoji), ""),
    };

    let out = if text.is_empty() { out } else { out.label(text) };
    let out = match emoji {
        Some(e) if !e.is_empty() => out.emoji(ReactionType::Unicode(e.clone())),
        _ => out,
    };

    out.disabled(btn.is_disabled())
}

fn menu_option(opt: &MenuOption) -> CreateSelectMenuOption {
    let out = CreateSelectMenuOption::new(opt.label(), opt.value())
        .default_selection(opt.is_default());

    match opt.get_desc() {
        Some(desc) => out.description(desc),
        None => out,
    }
}

fn menu(menu: &Menu) -> CreateSelectMenu {
    let (min, max) = menu.get_count();
    let out = CreateSelectMenu::new(menu.id(), CreateSelectMenuKind::String {
        options: menu.options().iter().map(menu_option).collect(),
    })
    .min_values(min)
    .max_values(max)
    .disabled(menu.is_disabled());

    match menu.get_placeholder() {
        Some(p) => out.placeholder(p),
        None => out,
    }
}

fn action_row(row: &ActionRow) -> CreateActionRow {
    match row {
        ActionRow::Buttons(btns) => CreateActionRow::Buttons(btns.iter().map(button).collect()),
        ActionRow::Menu(m) => CreateActionRow::SelectMenu(menu(m)),
    }
}

fn embed(embed: &Embed) -> CreateEmbed {
    let mut out = CreateEmbed::new().fields(
        embed
            .get_fields()
            .iter()
            .map(|f| (f.name(), f.value(), f.inline())),
    );

    if let Some(title) = embed.get_title() {
        out = out.title(title);
    }
    if let Some(desc) = embed.get_desc() {
        out = out.description(desc);
    }
    if let Some(url) = embed.get_url() {
        out = out.url(url.as_str());
    }
    if let Some(ts) = embed.get_timestamp() {
        out = out.timestamp(ts);
    }
    if let Some(color) = embed.get_color() {
        out = out.colour(color.0);
    }
    if let Some(footer) = embed.get_footer() {
        out = out.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(author) = embed.get_author() {
        out = out.author(CreateEmbedAuthor::new(author));
    }

    out
}

fn embeds(payload: &Payload) -> Vec<CreateEmbed> { payload.embeds().iter().map(embed).collect() }

fn components(payload: &Payload) -> Vec<CreateActionRow> {
    payload.components().iter().map(action_row).collect()
}

fn create_message(payload: &Payload) -> CreateInteractionResponseMessage {
    let out = CreateInteractionResponseMessage::new()
        .tts(payload.tts())
        .ephemeral(payload.ephemeral())
        .embeds(embeds(payload))
        .components(components(payload));

    match payload.content() {
        Some(c) => out.content(c),
        None => out,
    }
}

fn edit_message(payload: &Payload) -> EditInteractionResponse {
    EditInteractionResponse::new()
        .content(payload.content().unwrap_or_default())
        .embeds(embeds(payload))
        .components(components(payload))
}

fn create_followup(payload: &Payload) -> CreateInteractionResponseFollowup {
    let out = CreateInteractionResponseFollowup::new()
        .tts(payload.tts())
        .ephemeral(payload.ephemeral())
        .embeds(embeds(payload))
        .components(components(payload));

    match payload.content() {
        Some(c) => out.content(c),
        None => out,
    }
}

fn initial_response(res: InitialResponse<'_>) -> CreateInteractionResponse {
    match res {
        InitialResponse::Message(p) => CreateInteractionResponse::Message(create_message(p)),
        InitialResponse::Defer { ephemeral } => CreateInteractionResponse::Defer(
            CreateInteractionResponseMessage::new().ephemeral(ephemeral),
        ),
        InitialResponse::Acknowledge => CreateInteractionResponse::Acknowledge,
    }
}

#[async_trait]
impl Transport for SerenityTransport {
    async fn send_response(
        &self,
        id: InteractionId,
        res: InitialResponse<'_>,
    ) -> Result<(), TransportError> {
        self.check_id(id)?;
        let res = initial_response(res);

        on_source!(self, i => i.create_response(self.http(), res).await)
            .context("Error sending interaction response")?;

        Ok(())
    }

    async fn edit_response(
        &self,
        id: InteractionId,
        msg: &Payload,
    ) -> Result<(), TransportError> {
        self.check_id(id)?;
        let msg = edit_message(msg);

        on_source!(self, i => i.edit_response(self.http(), msg).await)
            .context("Error editing interaction response")?;

        Ok(())
    }

    async fn delete_response(&self, id: InteractionId) -> Result<(), TransportError> {
        self.check_id(id)?;

        on_source!(self, i => i.delete_response(self.http()).await)
            .context("Error deleting interaction response")?;

        Ok(())
    }

    async fn create_followup(
        &self,
        id: InteractionId,
        msg: &Payload,
    ) -> Result<MessageId, TransportError> {
        self.check_id(id)?;
        let msg = create_followup(msg);

        let sent = on_source!(self, i => i.create_followup(self.http(), msg).await)
            .context("Error sending followup message")?;

        Ok(MessageId(sent.id.get()))
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        SerenityChannel::new(channel.0)
            .delete_message(self.http(), SerenityMessage::new(message.0))
            .await
            .with_context(|| format!("Error deleting message {message} in channel {channel}"))?;

        Ok(())
    }
}
