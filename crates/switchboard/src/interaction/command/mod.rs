//! Types for describing slash commands and checking invocations against
//! their parameter schema

mod arg;
mod info;

pub use arg::*;
pub use info::*;

const MAX_NAME_LEN: usize = 32;
const MAX_DESC_LEN: usize = 100;
const MAX_PARAMS: usize = 25;

fn valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// An error resulting from constructing an invalid [`CommandInfo`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The command name is empty, too long, or contains invalid characters
    #[error("Invalid command name {0:?}")]
    BadName(String),
    /// The command description is empty or too long
    #[error("Invalid description for command {0:?}")]
    BadDescription(String),
    /// A parameter name is empty, too long, or contains invalid characters
    #[error("Invalid parameter name {0:?}")]
    BadParamName(String),
    /// A parameter description is empty or too long
    #[error("Invalid description for parameter {0:?}")]
    BadParamDescription(String),
    /// Two parameters share a name
    #[error("Duplicate parameter {0:?}")]
    DuplicateParam(String),
    /// A required parameter was declared after an optional one
    #[error("Required parameter {0:?} follows an optional parameter")]
    RequiredAfterOptional(String),
    /// Too many parameters were declared
    #[error("Too many parameters (maximum is {MAX_PARAMS})")]
    TooManyParams,
}

/// An error resulting from invoking a command with arguments that do not
/// satisfy its parameter schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// A required argument was not supplied
    #[error("Missing required argument {0:?}")]
    Missing(String),
    /// An argument was supplied that the command does not declare
    #[error("Unexpected argument {0:?}")]
    Unexpected(String),
    /// The same argument was supplied more than once
    #[error("Argument {0:?} supplied more than once")]
    Duplicate(String),
    /// An argument value was of the wrong type
    #[error("Argument {name:?} should be {expected}, found {found}")]
    TypeMismatch {
        /// The argument name
        name: String,
        /// The declared parameter type
        expected: ParamType,
        /// The type of the supplied value
        found: ParamType,
    },
}
