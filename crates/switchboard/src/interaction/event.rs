//! The inbound interaction data model
//!
//! These types describe what a transport hands to the
//! [`Dispatcher`](super::dispatch::Dispatcher), independent of how the
//! platform encodes them on the wire.  They can be decoded from JSON of the
//! form
//!
//! ```json
//! { "id": 1, "channel_id": 2, "type": "command", "name": "echo",
//!   "args": [{ "name": "input", "value": { "type": "string", "value": "hi" } }] }
//! ```

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[doc = $doc:literal] $name:ident),* $(,)?) => {
        $(
            #[doc = $doc]
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            #[repr(transparent)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                #[inline]
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
            }

            impl From<u64> for $name {
                #[inline]
                fn from(id: u64) -> Self { Self(id) }
            }
        )*
    };
}

id_type! {
    /// Session-scoped unique identifier of a single interaction
    InteractionId,
    /// Identifier of a channel
    ChannelId,
    /// Identifier of a message
    MessageId,
}

/// A single inbound user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// The unique ID of this interaction
    pub id: InteractionId,
    /// The guild this interaction was invoked in, if any
    #[serde(default)]
    pub guild_id: Option<u64>,
    /// The channel this interaction was invoked in
    pub channel_id: ChannelId,
    /// The invoking user, if known
    #[serde(default)]
    pub user_id: Option<u64>,
    /// The kind-specific data of this interaction
    #[serde(flatten)]
    pub kind: InteractionKind,
}

/// The two kinds of interaction the dispatcher understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionKind {
    /// A slash command was invoked
    Command(CommandInvocation),
    /// A button was pressed or a select menu was submitted
    Component(ComponentCallback),
}

impl Interaction {
    /// Short human-readable name of this interaction for logging
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.kind {
            InteractionKind::Command(c) => {
                let mut s = format!("/{}", c.name);
                for arg in &c.args {
                    write!(s, " {}({})", arg.name, arg.value)
                        .unwrap_or_else(|e| unreachable!("{e}"));
                }
                s
            },
            InteractionKind::Component(c) => format!("component::{:?}", c.custom_id),
        }
    }

    /// Describe the issuer of this interaction for logging
    #[must_use]
    pub fn issuer(&self) -> String {
        let user = self
            .user_id
            .map_or_else(|| "<unknown user>".to_owned(), |u| format!("<@{u}>"));

        match self.guild_id {
            Some(g) => format!("{user} in guild {g} <#{}>", self.channel_id),
            None => format!("{user} in DM <#{}>", self.channel_id),
        }
    }
}

/// Data for a slash command invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// The invoked command name
    pub name: String,
    /// The supplied arguments, in the order the platform delivered them
    #[serde(default)]
    pub args: Vec<Argument>,
}

/// A single named argument of a command invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// The parameter name
    pub name: String,
    /// The supplied value
    pub value: ArgValue,
}

impl Argument {
    /// Construct a new argument
    #[inline]
    pub fn new(name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    /// A string value
    String(String),
    /// An integer value
    Integer(i64),
    /// A real (decimal) numeric value
    Number(f64),
    /// A boolean value
    Boolean(bool),
    /// A user ID
    User(u64),
    /// A channel ID
    Channel(u64),
    /// A role ID
    Role(u64),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n:.2}"),
            Self::Boolean(b) => write!(f, "{b:?}"),
            Self::User(u) => write!(f, "<@{u}>"),
            Self::Channel(c) => write!(f, "<#{c}>"),
            Self::Role(r) => write!(f, "<@&{r}>"),
        }
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self { Self::String(value) }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self { Self::String(value.into()) }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self { Self::Integer(value) }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self { Self::Number(value) }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self { Self::Boolean(value) }
}

/// Data for a component (button or select menu) callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCallback {
    /// The custom ID carried by the component
    pub custom_id: String,
    /// The message the component is attached to
    pub message_id: MessageId,
    /// The selected option values, in selection order (empty for buttons)
    #[serde(default)]
    pub values: Vec<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_command() {
        let int: Interaction = serde_json::from_value(serde_json::json!({
            "id": 7,
            "channel_id": 3,
            "type": "command",
            "name": "echo",
            "args": [{ "name": "input", "value": { "type": "string", "value": "hello" } }],
        }))
        .unwrap();

        assert_eq!(int.id, InteractionId(7));
        assert_eq!(int.guild_id, None);
        assert_eq!(
            int.kind,
            InteractionKind::Command(CommandInvocation {
                name: "echo".into(),
                args: vec![Argument::new("input", "hello")],
            })
        );
        assert_eq!(int.describe(), "/echo input(\"hello\")");
    }

    #[test]
    fn test_decode_component() {
        let int: Interaction = serde_json::from_value(serde_json::json!({
            "id": 8,
            "guild_id": 1,
            "channel_id": 3,
            "user_id": 4,
            "type": "component",
            "custom_id": "menu-file",
            "message_id": 99,
            "values": ["opt-a", "opt-b"],
        }))
        .unwrap();

        let InteractionKind::Component(cb) = &int.kind else {
            panic!("expected a component callback, got {int:?}");
        };
        assert_eq!(cb.custom_id, "menu-file");
        assert_eq!(cb.message_id, MessageId(99));
        assert_eq!(cb.values, ["opt-a", "opt-b"]);
        assert_eq!(int.issuer(), "<@4> in guild 1 <#3>");
    }

    #[test]
    fn test_button_has_no_values() {
        let int: Interaction = serde_json::from_value(serde_json::json!({
            "id": 9,
            "channel_id": 3,
            "type": "component",
            "custom_id": "delete",
            "message_id": 5,
        }))
        .unwrap();

        let InteractionKind::Component(cb) = int.kind else {
            panic!("expected a component callback");
        };
        assert!(cb.values.is_empty());
    }
}
