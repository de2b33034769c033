use std::collections::HashSet;

pub(super) const MAX_CONTENT: usize = 2000;
pub(super) const MAX_EMBEDS: usize = 10;
pub(super) const MAX_EMBED_TITLE: usize = 256;
pub(super) const MAX_EMBED_DESC: usize = 4096;
pub(super) const MAX_EMBED_FIELDS: usize = 25;
pub(super) const MAX_FIELD_NAME: usize = 256;
pub(super) const MAX_FIELD_VALUE: usize = 1024;
pub(super) const MAX_FOOTER: usize = 2048;
pub(super) const MAX_AUTHOR: usize = 256;
pub(super) const MAX_EMBED_TOTAL: usize = 6000;
pub(super) const MAX_ROWS: usize = 5;
pub(super) const MAX_BUTTONS: usize = 5;
pub(super) const MAX_BUTTON_LABEL: usize = 80;
pub(super) const MAX_MENU_OPTIONS: usize = 25;
pub(super) const MAX_OPTION_TEXT: usize = 100;
pub(super) const MAX_PLACEHOLDER: usize = 150;
pub(super) const MAX_CUSTOM_ID: usize = 100;

/// An error resulting from a response draft that violates a platform limit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// A text field exceeded its length limit
    #[error("{what} is too long ({len} > {max} characters)")]
    TooLong {
        /// The offending field
        what: &'static str,
        /// The length of the field, in characters
        len: usize,
        /// The maximum allowed length
        max: usize,
    },
    /// A collection exceeded its size limit
    #[error("Too many {what} ({count} > {max})")]
    TooMany {
        /// The offending collection
        what: &'static str,
        /// The number of items supplied
        count: usize,
        /// The maximum allowed count
        max: usize,
    },
    /// A component custom ID was empty or too long
    #[error("Invalid custom ID {0:?}")]
    BadCustomId(String),
    /// Two components in the same message share a custom ID
    #[error("Duplicate custom ID {0:?}")]
    DuplicateCustomId(String),
    /// The draft is structurally invalid
    #[error("Invalid response: {0}")]
    Invalid(&'static str),
}

/// Trait for purging errors from an object
pub trait Prepare {
    /// The resulting error-free type
    type Output;
    /// The error transposed out of `self`
    type Error;

    /// Return any latent errors within `self`, else return an immutable
    /// validated version of `self`
    ///
    /// # Errors
    /// This function should return an error if `self` contains any errors
    fn prepare(self) -> Result<Self::Output, Self::Error>;
}

/// Length in characters, as counted by the platform
#[inline]
pub(super) fn chars(s: &str) -> usize { s.chars().count() }

pub(super) fn check_len(what: &'static str, s: &str, max: usize) -> Result<usize, PayloadError> {
    let len = chars(s);
    if len > max {
        Err(PayloadError::TooLong { what, len, max })
    } else {
        Ok(len)
    }
}

pub(super) fn check_count(
    what: &'static str,
    count: usize,
    max: usize,
) -> Result<(), PayloadError> {
    if count > max {
        Err(PayloadError::TooMany { what, count, max })
    } else {
        Ok(())
    }
}

/// Tracks the custom IDs seen while preparing a single message
#[derive(Debug, Default)]
pub(super) struct CustomIds<'a>(HashSet<&'a str>);

impl<'a> CustomIds<'a> {
    pub(super) fn claim(&mut self, id: &'a str) -> Result<(), PayloadError> {
        if id.is_empty() || chars(id) > MAX_CUSTOM_ID {
            return Err(PayloadError::BadCustomId(id.into()));
        }

        if self.0.insert(id) {
            Ok(())
        } else {
            Err(PayloadError::DuplicateCustomId(id.into()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check_len_counts_chars() {
        assert_eq!(check_len("x", "❌❌", 2), Ok(2));
        assert_eq!(
            check_len("content", "abc", 2),
            Err(PayloadError::TooLong {
                what: "content",
                len: 3,
                max: 2
            })
        );
    }

    #[test]
    fn test_custom_ids() {
        let long = "a".repeat(101);
        let mut ids = CustomIds::default();
        ids.claim("delete").unwrap();
        assert_eq!(
            ids.claim("delete"),
            Err(PayloadError::DuplicateCustomId("delete".into()))
        );
        assert!(matches!(ids.claim(""), Err(PayloadError::BadCustomId(_))));
        assert!(matches!(
            ids.claim(&long),
            Err(PayloadError::BadCustomId(_))
        ));
    }
}
