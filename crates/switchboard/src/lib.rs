//! Transport-agnostic routing and response lifecycle for slash-command bots
//!
//! The [`interaction`] module contains everything needed to turn a stream of
//! inbound interaction events into handler invocations:
//!
//! - [`interaction::event`] models the inbound events
//! - [`interaction::registry`] and [`interaction::route`] map command names
//!   and component custom IDs to handlers
//! - [`interaction::dispatch`] ties the two together and enforces the
//!   exactly-once response rules
//! - [`interaction::response`] builds response payloads and tracks the
//!   response slot of each interaction
//! - [`interaction::transport`] is the seam to the chat platform itself

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod interaction;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use interaction::{
    dispatch::{Dispatcher, DispatcherBuilder},
    Registry,
};
