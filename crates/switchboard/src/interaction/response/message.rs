use serde::Serialize;

use super::{
    prepare::{check_count, check_len, CustomIds, MAX_CONTENT, MAX_EMBEDS, MAX_EMBED_TOTAL},
    ActionRow, Components, Embed, PayloadError, Prepare,
};

/// The body of a message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBody {
    content: Option<String>,
    embeds: Vec<Embed>,
    components: Components,
}

impl MessageBody {
    /// Construct a new plaintext message
    #[inline]
    #[must_use]
    pub fn plain(c: impl Into<String>) -> Self {
        Self {
            content: Some(c.into()),
            ..Self::default()
        }
    }
}

/// Helper methods for building [`MessageBody`]
impl MessageBody {
    /// Set the text content of this message
    #[must_use]
    pub fn content(mut self, c: impl Into<String>) -> Self {
        self.content = Some(c.into());
        self
    }

    /// Add an embed to this message
    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Add an embed to this message using the given closure
    #[must_use]
    pub fn build_embed(self, f: impl FnOnce(Embed) -> Embed) -> Self {
        self.embed(f(Embed::default()))
    }

    /// Add components to this message using the given closure
    #[must_use]
    pub fn components(mut self, f: impl FnOnce(Components) -> Components) -> Self {
        self.components = f(self.components);
        self
    }
}

impl From<Embed> for MessageBody {
    fn from(embed: Embed) -> Self { Self::default().embed(embed) }
}

impl Prepare for MessageBody {
    type Error = PayloadError;
    type Output = Payload;

    fn prepare(self) -> Result<Self::Output, Self::Error> {
        Message::from(self).prepare()
    }
}

/// Options to provide when creating (or deferring the creation of) a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageOpts {
    tts: bool,
    ephemeral: bool,
}

/// Helper methods for building [`MessageOpts`]
impl MessageOpts {
    /// Set whether this message should be read by screen readers
    #[must_use]
    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    /// Set whether this message should be a private temporary response
    #[must_use]
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

/// A message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    body: MessageBody,
    opts: MessageOpts,
}

impl From<MessageBody> for Message {
    fn from(body: MessageBody) -> Self {
        Self {
            body,
            opts: MessageOpts::default(),
        }
    }
}

impl From<Embed> for Message {
    fn from(value: Embed) -> Self { MessageBody::from(value).into() }
}

impl Message {
    /// Construct a new plaintext message
    #[inline]
    #[must_use]
    pub fn plain(c: impl Into<String>) -> Self { MessageBody::plain(c).into() }

    /// Construct a new message from its constituent parts
    #[inline]
    #[must_use]
    pub fn from_parts(body: MessageBody, opts: MessageOpts) -> Self { Self { body, opts } }
}

/// Helper methods for building [`Message`]
impl Message {
    /// Apply the given closure to the body of this message
    #[must_use]
    pub fn body(mut self, f: impl FnOnce(MessageBody) -> MessageBody) -> Self {
        self.body = f(self.body);
        self
    }

    /// Set the text content of this message
    #[must_use]
    pub fn content(self, c: impl Into<String>) -> Self { self.body(|b| b.content(c)) }

    /// Add an embed to this message
    #[must_use]
    pub fn embed(self, embed: Embed) -> Self { self.body(|b| b.embed(embed)) }

    /// Add an embed to this message using the given closure
    #[must_use]
    pub fn build_embed(self, f: impl FnOnce(Embed) -> Embed) -> Self {
        self.body(|b| b.build_embed(f))
    }

    /// Add components to this message using the given closure
    #[must_use]
    pub fn components(self, f: impl FnOnce(Components) -> Components) -> Self {
        self.body(|b| b.components(f))
    }

    /// Set whether this message should be read by screen readers
    #[must_use]
    pub fn tts(mut self, tts: bool) -> Self {
        self.opts = self.opts.tts(tts);
        self
    }

    /// Set whether this message should be a private temporary response
    #[must_use]
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.opts = self.opts.ephemeral(ephemeral);
        self
    }
}

impl Prepare for Message {
    type Error = PayloadError;
    type Output = Payload;

    fn prepare(self) -> Result<Self::Output, Self::Error> {
        let Self {
            body:
                MessageBody {
                    content,
                    embeds,
                    components,
                },
            opts: MessageOpts { tts, ephemeral },
        } = self;

        let content = content.filter(|c| !c.is_empty());
        if content.is_none() && embeds.is_empty() && components.0.is_empty() {
            return Err(PayloadError::Invalid("message is empty"));
        }

        if let Some(ref c) = content {
            check_len("message content", c, MAX_CONTENT)?;
        }

        check_count("embeds", embeds.len(), MAX_EMBEDS)?;
        let mut total = 0;
        for embed in &embeds {
            total += embed.check()?;
        }
        if total > MAX_EMBED_TOTAL {
            return Err(PayloadError::TooLong {
                what: "combined embed text",
                len: total,
                max: MAX_EMBED_TOTAL,
            });
        }

        components.check(&mut CustomIds::default())?;

        Ok(Payload {
            content,
            embeds,
            components: components.0,
            ephemeral,
            tts,
        })
    }
}

/// A validated, immutable message ready to be sent through a transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    embeds: Vec<Embed>,
    components: Vec<ActionRow>,
    ephemeral: bool,
    tts: bool,
}

impl Payload {
    /// Get the text content of this message
    #[inline]
    #[must_use]
    pub fn content(&self) -> Option<&str> { self.content.as_deref() }

    /// Get the embeds of this message
    #[inline]
    #[must_use]
    pub fn embeds(&self) -> &[Embed] { &self.embeds }

    /// Get the component rows of this message
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ActionRow] { &self.components }

    /// Returns true if this message is only visible to the invoking user
    #[inline]
    #[must_use]
    pub fn ephemeral(&self) -> bool { self.ephemeral }

    /// Returns true if this message should be read by screen readers
    #[inline]
    #[must_use]
    pub fn tts(&self) -> bool { self.tts }
}
