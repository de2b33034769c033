//! Types and support traits for responding to application interaction events

pub mod command;
pub mod dispatch;
pub mod event;
pub mod handler;
pub mod registry;
pub mod response;
pub mod route;
pub mod transport;
pub mod visitor;

pub use registry::Registry;
pub use route::Router;
