//! Types for building interaction responses and tracking their lifecycle
//!
//! Drafts ([`Message`], [`MessageBody`], [`Embed`], [`Components`]) are built
//! by value and can never fail to construct.  Platform limits are checked all
//! at once by [`Prepare::prepare`], which yields an immutable [`Payload`].

mod component;
mod embed;
mod message;
mod prepare;
mod responder;

pub use component::*;
pub use embed::*;
pub use message::*;
pub use prepare::{PayloadError, Prepare};
pub use responder::*;
