//! Name-keyed storage for slash command handlers

use std::{collections::HashMap, sync::Arc};

use super::{command::CommandInfo, handler::CommandHandler};

/// An error arising from registering or resolving a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A command with this name is already registered
    #[error("Command {0:?} is already registered")]
    DuplicateCommand(String),
    /// No command with this name is registered
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),
}

/// A registered command: its definition and the handler invoked for it
#[derive(Debug)]
pub struct Entry {
    info: CommandInfo,
    handler: Arc<dyn CommandHandler>,
}

impl Entry {
    /// Get the definition this command was registered with
    #[inline]
    #[must_use]
    pub fn info(&self) -> &CommandInfo { &self.info }

    /// Get the handler for this command
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn CommandHandler> { &self.handler }
}

/// A registry of slash commands keyed by name
///
/// Commands are added during startup; once the registry is handed to a
/// [`Dispatcher`](super::dispatch::Dispatcher) it is only ever read.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Construct a new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register a command definition and its handler
    ///
    /// # Errors
    /// This method returns an error if a command with the same name has
    /// already been registered.
    pub fn register(
        &mut self,
        info: CommandInfo,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), Error> {
        if self.by_name.contains_key(info.name()) {
            return Err(Error::DuplicateCommand(info.name().to_owned()));
        }

        tracing::debug!(name = info.name(), ?handler, "Registering command");
        self.by_name.insert(info.name().to_owned(), self.entries.len());
        self.entries.push(Entry { info, handler });

        Ok(())
    }

    /// Look up a command by name
    ///
    /// # Errors
    /// This method returns an error if no command with the given name has
    /// been registered.
    pub fn resolve(&self, name: &str) -> Result<&Entry, Error> {
        self.by_name
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::UnknownCommand(name.to_owned()))
    }

    /// Iterate over all registered command definitions in registration order
    pub fn definitions(&self) -> impl ExactSizeIterator<Item = &CommandInfo> {
        self.entries.iter().map(Entry::info)
    }

    /// Get the number of registered commands
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns true if no commands have been registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::interaction::{
        handler::{CommandVisitor, HandlerResult},
        response::Responder,
    };

    #[derive(Debug)]
    struct Nop;

    #[async_trait::async_trait]
    impl CommandHandler for Nop {
        async fn respond(&self, _: &mut CommandVisitor<'_>, _: &mut Responder) -> HandlerResult {
            Ok(())
        }
    }

    fn info(name: &str) -> CommandInfo {
        CommandInfo::build_slash(name, "A test command", |a| a).unwrap()
    }

    fn same(a: &Arc<dyn CommandHandler>, b: &Arc<dyn CommandHandler>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
    }

    #[test]
    fn test_duplicate() {
        let mut reg = Registry::new();
        reg.register(info("ping"), Arc::new(Nop)).unwrap();

        assert_eq!(
            reg.register(info("ping"), Arc::new(Nop)),
            Err(Error::DuplicateCommand("ping".into()))
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_definitions_in_order() {
        let mut reg = Registry::new();
        for name in ["ping", "echo", "embed"] {
            reg.register(info(name), Arc::new(Nop)).unwrap();
        }

        let names: Vec<_> = reg.definitions().map(CommandInfo::name).collect();
        assert_eq!(names, ["ping", "echo", "embed"]);
    }

    proptest! {
        #[test]
        fn resolve_returns_registered_handler(
            names in prop::collection::hash_set("[a-z][a-z0-9_-]{0,31}", 1..16),
            probe in "[a-z][a-z0-9_-]{0,31}",
        ) {
            let mut reg = Registry::new();
            let mut handlers = vec![];

            for name in &names {
                let handler: Arc<dyn CommandHandler> = Arc::new(Nop);
                reg.register(info(name), Arc::clone(&handler)).unwrap();
                handlers.push((name.clone(), handler));
            }

            for (name, handler) in &handlers {
                let entry = reg.resolve(name).unwrap();
                prop_assert!(same(entry.handler(), handler));
                prop_assert_eq!(entry.info().name(), name.as_str());
            }

            if !names.contains(&probe) {
                prop_assert_eq!(
                    reg.resolve(&probe).unwrap_err(),
                    Error::UnknownCommand(probe.clone())
                );
            }
        }
    }
}
