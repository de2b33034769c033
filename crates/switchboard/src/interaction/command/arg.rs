use std::fmt;

use super::{valid_name, DefinitionError, MAX_DESC_LEN, MAX_PARAMS};
use crate::interaction::event::ArgValue;

/// The value type accepted by a command parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamType {
    /// A string value
    String,
    /// An integer value
    Integer,
    /// A real (decimal) numeric value
    Number,
    /// A boolean value
    Boolean,
    /// A user
    User,
    /// A channel
    Channel,
    /// A guild role
    Role,
}

impl ParamType {
    /// Check whether the given value is acceptable for this parameter type
    #[must_use]
    pub fn accepts(self, value: &ArgValue) -> bool { self == ParamType::of(value) }

    /// Get the parameter type corresponding to a given argument value
    #[must_use]
    pub fn of(value: &ArgValue) -> Self {
        match value {
            ArgValue::String(_) => Self::String,
            ArgValue::Integer(_) => Self::Integer,
            ArgValue::Number(_) => Self::Number,
            ArgValue::Boolean(_) => Self::Boolean,
            ArgValue::User(_) => Self::User,
            ArgValue::Channel(_) => Self::Channel,
            ArgValue::Role(_) => Self::Role,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::User => "a user",
            Self::Channel => "a channel",
            Self::Role => "a role",
        })
    }
}

/// Metadata for a chat input command parameter
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Param {
    pub(super) name: String,
    pub(super) desc: String,
    pub(super) ty: ParamType,
    pub(super) required: bool,
}

impl Param {
    /// Get the name of this parameter
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Get the description of this parameter
    #[inline]
    #[must_use]
    pub fn desc(&self) -> &str { &self.desc }

    /// Get the accepted value type of this parameter
    #[inline]
    #[must_use]
    pub fn ty(&self) -> ParamType { self.ty }

    /// Whether an argument must be supplied for this parameter
    #[inline]
    #[must_use]
    pub fn required(&self) -> bool { self.required }
}

/// An ordered list of validated command parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Params(pub(super) Vec<Param>);

/// Helper for constructing chat input command parameters
#[derive(Debug, Default)]
pub struct ArgBuilder(ArgBuilderState);

#[derive(Debug)]
enum ArgBuilderState {
    Params(Vec<Param>),
    Error(DefinitionError),
}

impl Default for ArgBuilderState {
    fn default() -> Self { Self::Params(vec![]) }
}

macro_rules! typed_param {
    ($($(#[doc = $doc:literal])* $name:ident => $ty:ident),* $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[inline]
            #[must_use]
            pub fn $name(
                self,
                name: impl Into<String>,
                desc: impl Into<String>,
                required: bool,
            ) -> Self {
                self.param(name, desc, ParamType::$ty, required)
            }
        )*
    };
}

impl ArgBuilder {
    /// Add a parameter of the given type
    #[must_use]
    pub fn param(
        mut self,
        name: impl Into<String>,
        desc: impl Into<String>,
        ty: ParamType,
        required: bool,
    ) -> Self {
        let ArgBuilderState::Params(ref mut params) = self.0 else {
            return self;
        };

        let name = name.into();
        let desc = desc.into();

        let err = if !valid_name(&name) {
            Some(DefinitionError::BadParamName(name.clone()))
        } else if desc.is_empty() || desc.chars().count() > MAX_DESC_LEN {
            Some(DefinitionError::BadParamDescription(name.clone()))
        } else if params.iter().any(|p| p.name == name) {
            Some(DefinitionError::DuplicateParam(name.clone()))
        } else if required && params.last().is_some_and(|p| !p.required) {
            Some(DefinitionError::RequiredAfterOptional(name.clone()))
        } else if params.len() >= MAX_PARAMS {
            Some(DefinitionError::TooManyParams)
        } else {
            None
        };

        if let Some(err) = err {
            self.0 = ArgBuilderState::Error(err);
        } else {
            params.push(Param {
                name,
                desc,
                ty,
                required,
            });
        }

        self
    }

    typed_param! {
        /// Add a string parameter
        string => String,
        /// Add an integer parameter
        int => Integer,
        /// Add a real (decimal) numeric parameter
        real => Number,
        /// Add a boolean parameter
        bool => Boolean,
        /// Add a user parameter
        user => User,
        /// Add a channel parameter
        channel => Channel,
        /// Add a guild role parameter
        role => Role,
    }
}

impl TryFrom<ArgBuilder> for Params {
    type Error = DefinitionError;

    fn try_from(value: ArgBuilder) -> Result<Self, Self::Error> {
        match value.0 {
            ArgBuilderState::Params(p) => Ok(Self(p)),
            ArgBuilderState::Error(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_order() {
        let Params(params) = ArgBuilder::default()
            .string("input", "Text to print", true)
            .int("count", "How many times", false)
            .try_into()
            .unwrap();

        let names: Vec<_> = params.iter().map(Param::name).collect();
        assert_eq!(names, ["input", "count"]);
        assert_eq!(params[1].ty(), ParamType::Integer);
        assert!(!params[1].required());
    }

    #[test]
    fn test_builder_errors() {
        let err = Params::try_from(
            ArgBuilder::default()
                .string("input", "x", true)
                .string("input", "y", false),
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateParam(n) if n == "input"));

        let err = Params::try_from(
            ArgBuilder::default()
                .bool("loud", "x", false)
                .string("input", "y", true),
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::RequiredAfterOptional(n) if n == "input"));

        let err = Params::try_from(ArgBuilder::default().string("Bad Name", "x", true))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::BadParamName(_)));

        // The first error sticks
        let err = Params::try_from(
            ArgBuilder::default()
                .string("", "x", true)
                .string("fine", "", true),
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::BadParamName(n) if n.is_empty()));
    }

    #[test]
    fn test_too_many_params() {
        let b = (0..=MAX_PARAMS).fold(ArgBuilder::default(), |b, i| {
            b.string(format!("p{i}"), "a parameter", false)
        });
        assert!(matches!(
            Params::try_from(b),
            Err(DefinitionError::TooManyParams)
        ));
    }
}
