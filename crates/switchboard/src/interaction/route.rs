//! Custom-ID routing for component interactions
//!
//! A route pattern is a sequence of tokens delimited by `:` or `-`.  The
//! final token may be a lone `*`, which matches any non-empty remainder of
//! the custom ID and captures it:
//!
//! | pattern      | custom ID       | captures     |
//! |--------------|-----------------|--------------|
//! | `delete`     | `delete`        | `[]`         |
//! | `menu-*`     | `menu-file`     | `["file"]`   |
//! | `page:*`     | `page:3-next`   | `["3-next"]` |
//! | `*`          | `anything`      | `["anything"]` |
//!
//! Patterns are tried in registration order and the first match wins, so
//! more specific patterns must be registered before the wildcards that
//! overlap them.

use std::{fmt, sync::Arc};

use super::handler::ComponentHandler;

const WILDCARD: &str = "*";

fn is_delim(c: char) -> bool { c == ':' || c == '-' }

/// An error arising from registering or resolving a component route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No registered pattern matches the custom ID
    #[error("No component route matches {0:?}")]
    NoRouteMatch(String),
    /// The pattern is malformed
    #[error("Invalid route pattern {0:?}: {1}")]
    InvalidPattern(String, &'static str),
    /// The exact pattern was already registered
    #[error("Route pattern {0:?} is already registered")]
    DuplicateRoute(String),
}

/// A parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    raw: String,
    wildcard: bool,
}

impl Pattern {
    /// Parse a route pattern
    ///
    /// # Errors
    /// This method returns an error if the pattern is empty or contains a
    /// wildcard anywhere but as its final token.
    pub fn parse(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();

        if raw.is_empty() {
            return Err(Error::InvalidPattern(raw, "pattern is empty"));
        }

        let (prefix, wildcard) = match raw.strip_suffix(WILDCARD) {
            Some(p) if p.is_empty() || p.ends_with(is_delim) => (p, true),
            Some(_) => {
                return Err(Error::InvalidPattern(
                    raw,
                    "wildcard must be a whole token",
                ))
            },
            None => (raw.as_str(), false),
        };

        if prefix.contains(WILDCARD) {
            return Err(Error::InvalidPattern(
                raw,
                "wildcard is only allowed as the final token",
            ));
        }

        Ok(Self { raw, wildcard })
    }

    /// The fixed (non-wildcard) part of this pattern
    #[inline]
    fn prefix(&self) -> &str {
        if self.wildcard {
            &self.raw[..self.raw.len() - WILDCARD.len()]
        } else {
            &self.raw
        }
    }

    /// Returns true if this pattern ends in a wildcard
    #[inline]
    #[must_use]
    pub fn is_wildcard(&self) -> bool { self.wildcard }

    /// Match a custom ID against this pattern, returning the captured
    /// segments on success
    #[must_use]
    pub fn matches<'a>(&self, id: &'a str) -> Option<Vec<&'a str>> {
        if self.wildcard {
            id.strip_prefix(self.prefix())
                .filter(|rest| !rest.is_empty())
                .map(|rest| vec![rest])
        } else {
            (id == self.raw).then(Vec::new)
        }
    }

    /// Returns true if every custom ID matched by `other` is also matched by
    /// `self`
    fn covers(&self, other: &Self) -> bool {
        if !self.wildcard {
            return self == other;
        }

        let prefix = self.prefix();
        let other_prefix = other.prefix();

        if other.wildcard {
            other_prefix.starts_with(prefix)
        } else {
            other_prefix.len() > prefix.len() && other_prefix.starts_with(prefix)
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.raw) }
}

/// A route resolved from a custom ID
#[derive(Debug)]
pub struct Resolved<'a, 'b> {
    /// The pattern that matched
    pub pattern: &'a Pattern,
    /// The handler registered for the pattern
    pub handler: &'a Arc<dyn ComponentHandler>,
    /// The segments captured by a trailing wildcard, if any
    pub captures: Vec<&'b str>,
}

/// An ordered table of component route patterns and their handlers
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<(Pattern, Arc<dyn ComponentHandler>)>,
}

impl Router {
    /// Construct a new empty router
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register a handler for a route pattern
    ///
    /// # Errors
    /// This method returns an error if the pattern is malformed or has
    /// already been registered.
    pub fn register(
        &mut self,
        pattern: impl Into<String>,
        handler: Arc<dyn ComponentHandler>,
    ) -> Result<(), Error> {
        let pattern = Pattern::parse(pattern)?;

        if self.routes.iter().any(|(p, _)| *p == pattern) {
            return Err(Error::DuplicateRoute(pattern.raw));
        }

        if let Some((shadow, _)) = self.routes.iter().find(|(p, _)| p.covers(&pattern)) {
            tracing::warn!(
                %pattern,
                %shadow,
                "Route is shadowed by an earlier pattern and will never match"
            );
        }

        tracing::debug!(%pattern, ?handler, "Registering component route");
        self.routes.push((pattern, handler));

        Ok(())
    }

    /// Find the first registered route matching the given custom ID
    ///
    /// # Errors
    /// This method returns an error if no pattern matches.
    pub fn resolve<'b>(&self, id: &'b str) -> Result<Resolved<'_, 'b>, Error> {
        self.routes
            .iter()
            .find_map(|(pattern, handler)| {
                pattern.matches(id).map(|captures| Resolved {
                    pattern,
                    handler,
                    captures,
                })
            })
            .ok_or_else(|| Error::NoRouteMatch(id.to_owned()))
    }

    /// Get the number of registered routes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.routes.len() }

    /// Returns true if no routes have been registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}
