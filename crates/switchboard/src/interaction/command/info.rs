use std::collections::HashSet;

use super::{valid_name, ArgBuilder, ArgumentError, DefinitionError, Param, Params, MAX_DESC_LEN};
use crate::interaction::event::Argument;

/// Metadata for a slash command: its name, description, and parameter schema
///
/// A `CommandInfo` is validated when it is constructed and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandInfo {
    name: String,
    desc: String,
    params: Params,
}

impl CommandInfo {
    /// Construct a new description of a chat input command
    ///
    /// # Errors
    /// This method returns an error if the name or description do not meet
    /// the platform's requirements.
    pub fn slash(
        name: impl Into<String>,
        desc: impl Into<String>,
        params: Params,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        let desc = desc.into();

        if !valid_name(&name) {
            return Err(DefinitionError::BadName(name));
        }

        if desc.is_empty() || desc.chars().count() > MAX_DESC_LEN {
            return Err(DefinitionError::BadDescription(name));
        }

        Ok(Self { name, desc, params })
    }

    /// Construct a new description of a chat input command using the given
    /// closure to build the parameter schema
    ///
    /// # Errors
    /// This method returns an error if the name or description are invalid
    /// or invoking the closure results in an [`ArgBuilder`] with an invalid
    /// state.
    #[inline]
    pub fn build_slash(
        name: impl Into<String>,
        desc: impl Into<String>,
        f: impl FnOnce(ArgBuilder) -> ArgBuilder,
    ) -> Result<Self, DefinitionError> {
        Self::slash(name, desc, f(ArgBuilder::default()).try_into()?)
    }

    /// Get the unique, non-localized name of this command
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Get the description of this command
    #[inline]
    #[must_use]
    pub fn desc(&self) -> &str { &self.desc }

    /// Get the parameter schema of this command, in declaration order
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Param] { &self.params.0 }

    /// Check a set of invocation arguments against this command's parameter
    /// schema
    ///
    /// # Errors
    /// This method returns an error if an argument is undeclared, duplicated,
    /// or of the wrong type, or if a required argument is missing.
    pub fn validate(&self, args: &[Argument]) -> Result<(), ArgumentError> {
        let mut seen = HashSet::new();

        for Argument { name, value } in args {
            let Some(param) = self.params().iter().find(|p| p.name == *name) else {
                return Err(ArgumentError::Unexpected(name.clone()));
            };

            if !seen.insert(name.as_str()) {
                return Err(ArgumentError::Duplicate(name.clone()));
            }

            if !param.ty.accepts(value) {
                return Err(ArgumentError::TypeMismatch {
                    name: name.clone(),
                    expected: param.ty,
                    found: super::ParamType::of(value),
                });
            }
        }

        if let Some(missing) = self
            .params()
            .iter()
            .find(|p| p.required && !seen.contains(p.name.as_str()))
        {
            return Err(ArgumentError::Missing(missing.name.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interaction::command::ParamType;

    fn echo() -> CommandInfo {
        CommandInfo::build_slash("echo", "Prints input", |a| {
            a.string("input", "Text to print", true)
                .bool("loud", "Shout it", false)
        })
        .unwrap()
    }

    #[test]
    fn test_bad_names() {
        assert!(matches!(
            CommandInfo::build_slash("Echo", "Prints input", |a| a),
            Err(DefinitionError::BadName(_))
        ));
        assert!(matches!(
            CommandInfo::build_slash("", "Prints input", |a| a),
            Err(DefinitionError::BadName(_))
        ));
        assert!(matches!(
            CommandInfo::build_slash("echo", "", |a| a),
            Err(DefinitionError::BadDescription(_))
        ));
        assert!(matches!(
            CommandInfo::build_slash("echo", "x".repeat(101), |a| a),
            Err(DefinitionError::BadDescription(_))
        ));
    }

    #[test]
    fn test_validate_ok() {
        let cmd = echo();
        cmd.validate(&[Argument::new("input", "hello")]).unwrap();
        cmd.validate(&[Argument::new("loud", true), Argument::new("input", "hi")])
            .unwrap();
    }

    #[test]
    fn test_validate_errors() {
        let cmd = echo();

        assert!(matches!(
            cmd.validate(&[]),
            Err(ArgumentError::Missing(n)) if n == "input"
        ));
        assert!(matches!(
            cmd.validate(&[Argument::new("input", "a"), Argument::new("other", "b")]),
            Err(ArgumentError::Unexpected(n)) if n == "other"
        ));
        assert!(matches!(
            cmd.validate(&[Argument::new("input", "a"), Argument::new("input", "b")]),
            Err(ArgumentError::Duplicate(n)) if n == "input"
        ));
        assert!(matches!(
            cmd.validate(&[Argument::new("input", 4_i64)]),
            Err(ArgumentError::TypeMismatch {
                expected: ParamType::String,
                found: ParamType::Integer,
                ..
            })
        ));
    }

    #[test]
    fn test_no_params() {
        let ping = CommandInfo::build_slash("ping", "Checks the bot connection", |a| a).unwrap();
        assert!(ping.params().is_empty());
        ping.validate(&[]).unwrap();
        assert!(ping.validate(&[Argument::new("x", 1_i64)]).is_err());
    }
}
