//! Traits for defining handler logic for various interactions

use std::fmt;

use super::{
    response::{ResponseError, Responder},
    visitor,
};

/// An error arising from handling an interaction
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A visitor extractor returned an error
    #[error("Error parsing interaction data: {0}")]
    Parse(#[from] visitor::Error),
    /// A response call failed
    #[error("Error responding to interaction: {0}")]
    Response(#[from] ResponseError),
    /// The handler wants the given message shown to the user
    #[error("Bot responded with error: {0}")]
    User(String),
    /// An unhandled error occurred
    #[error("Unexpected error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Return type for all interaction handlers
pub type HandlerResult = Result<(), HandlerError>;

/// Visitor type provided to command handlers
pub type CommandVisitor<'a> = visitor::CommandVisitor<'a>;
/// Visitor type provided to component handlers
pub type ComponentVisitor<'a> = visitor::ComponentVisitor<'a>;

/// A handler for a slash command interaction
///
/// Arguments have already been checked against the command's parameter
/// schema by the time [`respond`](Self::respond) is called.
#[async_trait::async_trait]
pub trait CommandHandler: fmt::Debug + Send + Sync {
    /// Respond to a command interaction
    async fn respond(
        &self,
        visitor: &mut CommandVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult;
}

/// A handler for a component (button or select menu) interaction
#[async_trait::async_trait]
pub trait ComponentHandler: fmt::Debug + Send + Sync {
    /// Respond to a component interaction
    async fn respond(
        &self,
        visitor: &ComponentVisitor<'_>,
        responder: &mut Responder,
    ) -> HandlerResult;
}
