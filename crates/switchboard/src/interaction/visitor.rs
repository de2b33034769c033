//! Types for extracting data from interaction invocations in a type-safe manner

use std::collections::HashSet;

use super::{
    command::ParamType,
    event::{
        ArgValue, Argument, ChannelId, CommandInvocation, ComponentCallback, Interaction,
        InteractionId, MessageId,
    },
};

/// An error caused by performing an invalid extraction
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument was required but not present in the input
    #[error("Required command option {0:?} missing or already visited")]
    MissingOption(String),
    /// An argument was present in the input but its value was not of the
    /// correct type
    #[error("Type mismatch in value of command option {0:?} - expected {1}, found {2}")]
    BadOptionValueType(String, ParamType, ParamType),
    /// A trailing argument was left in the visitor after the handler completed
    #[error("Trailing arguments: {0:?}")]
    Trailing(Vec<String>),
    /// A guild-only interaction was invoked outside of a guild
    #[error("Guild-only interaction run inside DM")]
    GuildRequired,
}

type Result<T> = std::result::Result<T, Error>;

/// Core logic common to all interaction visitors
#[derive(Debug, Clone, Copy)]
pub struct BasicVisitor<'a> {
    int: &'a Interaction,
}

impl<'a> BasicVisitor<'a> {
    /// Get the ID identifying this interaction
    #[inline]
    #[must_use]
    pub fn id(&self) -> InteractionId { self.int.id }

    /// Get the channel this interaction was invoked in
    #[inline]
    #[must_use]
    pub fn channel(&self) -> ChannelId { self.int.channel_id }

    /// Get the invoking user, if known
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<u64> { self.int.user_id }

    /// Get the guild this interaction was invoked in
    ///
    /// # Errors
    /// This method returns an error if the interaction was invoked in a DM.
    #[inline]
    pub fn guild(&self) -> Result<u64> { self.int.guild_id.ok_or(Error::GuildRequired) }

    /// Get the full interaction being visited
    #[inline]
    #[must_use]
    pub fn interaction(&self) -> &'a Interaction { self.int }
}

/// The result of visiting a single command option
#[derive(Debug, Clone, Copy)]
pub struct OptionVisitor<'a, T>(&'a str, Option<T>);

impl<T> OptionVisitor<'_, T> {
    /// Extract the option value, returning `None` if it was not supplied
    #[inline]
    #[must_use]
    pub fn optional(self) -> Option<T> { self.1 }

    /// Extract the option value
    ///
    /// # Errors
    /// This method returns an error if the option was not supplied.
    #[inline]
    pub fn required(self) -> Result<T> { self.1.ok_or_else(|| Error::MissingOption(self.0.into())) }
}

/// A visitor for extracting arguments from a command invocation
#[derive(Debug)]
pub struct CommandVisitor<'a> {
    base: BasicVisitor<'a>,
    cmd: &'a CommandInvocation,
    visited: HashSet<&'a str>,
}

impl<'a> std::ops::Deref for CommandVisitor<'a> {
    type Target = BasicVisitor<'a>;

    fn deref(&self) -> &Self::Target { &self.base }
}

macro_rules! visit_basic {
    ($($(#[doc = $doc:literal])* $vis:vis fn $name:ident() -> $ty:ty { $var:ident($val:ident) => $expr:expr })*) => {
        $(
            $(#[doc = $doc])*
            ///
            /// # Errors
            /// This method returns an error if the supplied argument has a
            /// different type.
            $vis fn $name(&mut self, name: &'a str) -> Result<OptionVisitor<'a, $ty>> {
                let Some(arg) = self.visit_opt(name) else {
                    return Ok(OptionVisitor(name, None));
                };

                match arg.value {
                    ArgValue::$var(ref $val) => Ok(OptionVisitor(name, Some($expr))),
                    ref v => Err(Error::BadOptionValueType(
                        name.into(),
                        ParamType::$var,
                        ParamType::of(v),
                    )),
                }
            }
        )*
    };
}

impl<'a> CommandVisitor<'a> {
    /// Wrap a reference to a command interaction in a new visitor
    #[must_use]
    pub fn new(int: &'a Interaction, cmd: &'a CommandInvocation) -> Self {
        Self {
            base: BasicVisitor { int },
            cmd,
            visited: HashSet::new(),
        }
    }

    /// Get the name of the invoked command
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'a str { &self.cmd.name }

    fn visit_opt(&mut self, name: &'a str) -> Option<&'a Argument> {
        if !self.visited.insert(name) {
            return None;
        }

        self.cmd.args.iter().find(|a| a.name == name)
    }

    visit_basic! {
        /// Visit a string argument
        pub fn visit_string() -> &'a str { String(s) => s.as_str() }

        /// Visit an integer argument
        pub fn visit_i64() -> i64 { Integer(i) => *i }

        /// Visit a real (decimal) numeric argument
        pub fn visit_number() -> f64 { Number(n) => *n }

        /// Visit a boolean argument
        pub fn visit_bool() -> bool { Boolean(b) => *b }

        /// Visit a user argument
        pub fn visit_user() -> u64 { User(u) => *u }

        /// Visit a channel argument
        pub fn visit_channel() -> u64 { Channel(c) => *c }

        /// Visit a role argument
        pub fn visit_role() -> u64 { Role(r) => *r }
    }

    /// Check that every supplied argument was visited
    ///
    /// # Errors
    /// This method returns an error if any argument was left unvisited.
    pub fn finish(self) -> Result<()> {
        let trailing: Vec<_> = self
            .cmd
            .args
            .iter()
            .filter(|a| !self.visited.contains(a.name.as_str()))
            .map(|a| a.name.clone())
            .collect();

        if trailing.is_empty() {
            Ok(())
        } else {
            Err(Error::Trailing(trailing))
        }
    }
}

/// A visitor for extracting data from a component interaction
#[derive(Debug)]
pub struct ComponentVisitor<'a> {
    base: BasicVisitor<'a>,
    cb: &'a ComponentCallback,
    captures: Vec<&'a str>,
}

impl<'a> std::ops::Deref for ComponentVisitor<'a> {
    type Target = BasicVisitor<'a>;

    fn deref(&self) -> &Self::Target { &self.base }
}

impl<'a> ComponentVisitor<'a> {
    /// Wrap a reference to a component interaction and the segments captured
    /// by its route in a new visitor
    #[must_use]
    pub fn new(int: &'a Interaction, cb: &'a ComponentCallback, captures: Vec<&'a str>) -> Self {
        Self {
            base: BasicVisitor { int },
            cb,
            captures,
        }
    }

    /// Get the custom ID of the component
    #[inline]
    #[must_use]
    pub fn custom_id(&self) -> &'a str { &self.cb.custom_id }

    /// Get the segments captured by a wildcard route pattern
    #[inline]
    #[must_use]
    pub fn captures(&self) -> &[&'a str] { &self.captures }

    /// Get the selected option values, in selection order
    ///
    /// This is empty for buttons.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &'a [String] { &self.cb.values }

    /// Get the message the component is attached to
    #[inline]
    #[must_use]
    pub fn message(&self) -> MessageId { self.cb.message_id }
}
