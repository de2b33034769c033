use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use super::prepare::{
    check_count, check_len, PayloadError, MAX_AUTHOR, MAX_EMBED_DESC, MAX_EMBED_FIELDS,
    MAX_EMBED_TITLE, MAX_FIELD_NAME, MAX_FIELD_VALUE, MAX_FOOTER,
};

/// A 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Teal
    pub const TEAL: Self = Self(0x1A_BC9C);
    /// Green
    pub const GREEN: Self = Self(0x2E_CC71);
    /// Blue
    pub const BLUE: Self = Self(0x34_98DB);
    /// Purple
    pub const PURPLE: Self = Self(0x9B_59B6);
    /// Gold
    pub const GOLD: Self = Self(0xF1_C40F);
    /// Orange
    pub const ORANGE: Self = Self(0xE6_7E22);
    /// Red
    pub const RED: Self = Self(0xE7_4C3C);

    /// Construct a color from its RGB components
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

impl From<u32> for Color {
    fn from(val: u32) -> Self { Self(val & 0xFF_FFFF) }
}

/// A message rich content embed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField>,
}

/// A single name-value field in an embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

impl EmbedField {
    /// Get the name of this field
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Get the value of this field
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str { &self.value }

    /// Returns true if this field should be rendered inline
    #[inline]
    #[must_use]
    pub fn inline(&self) -> bool { self.inline }
}

/// Helper methods for building an [`Embed`]
impl Embed {
    /// Set the title of this embed
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description of this embed
    #[must_use]
    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Set the URL of this embed
    #[must_use]
    pub fn url(mut self, url: impl Into<Url>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the timestamp of this embed
    #[must_use]
    pub fn timestamp(mut self, ts: impl Into<DateTime<Utc>>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }

    /// Set the primary color of this embed
    #[must_use]
    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set (or reset) the primary color of this embed
    #[must_use]
    pub fn color_opt(mut self, color: Option<impl Into<Color>>) -> Self {
        self.color = color.map(Into::into);
        self
    }

    /// Set the footer text of this embed
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Set the author name of this embed
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Add a field to this embed
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// Accessors for a prepared [`Embed`]
impl Embed {
    /// Get the title of this embed
    #[inline]
    #[must_use]
    pub fn get_title(&self) -> Option<&str> { self.title.as_deref() }

    /// Get the description of this embed
    #[inline]
    #[must_use]
    pub fn get_desc(&self) -> Option<&str> { self.desc.as_deref() }

    /// Get the URL of this embed
    #[inline]
    #[must_use]
    pub fn get_url(&self) -> Option<&Url> { self.url.as_ref() }

    /// Get the timestamp of this embed
    #[inline]
    #[must_use]
    pub fn get_timestamp(&self) -> Option<DateTime<Utc>> { self.timestamp }

    /// Get the color of this embed
    #[inline]
    #[must_use]
    pub fn get_color(&self) -> Option<Color> { self.color }

    /// Get the footer text of this embed
    #[inline]
    #[must_use]
    pub fn get_footer(&self) -> Option<&str> { self.footer.as_deref() }

    /// Get the author name of this embed
    #[inline]
    #[must_use]
    pub fn get_author(&self) -> Option<&str> { self.author.as_deref() }

    /// Get the fields of this embed
    #[inline]
    #[must_use]
    pub fn get_fields(&self) -> &[EmbedField] { &self.fields }

    /// Check this embed against the per-embed limits, returning its total
    /// text length
    pub(super) fn check(&self) -> Result<usize, PayloadError> {
        let mut total = 0;
        let mut opt = |what, s: &Option<String>, max| -> Result<(), PayloadError> {
            if let Some(s) = s {
                total += check_len(what, s, max)?;
            }
            Ok(())
        };

        opt("embed title", &self.title, MAX_EMBED_TITLE)?;
        opt("embed description", &self.desc, MAX_EMBED_DESC)?;
        opt("embed footer", &self.footer, MAX_FOOTER)?;
        opt("embed author", &self.author, MAX_AUTHOR)?;

        check_count("embed fields", self.fields.len(), MAX_EMBED_FIELDS)?;
        for field in &self.fields {
            if field.name.is_empty() || field.value.is_empty() {
                return Err(PayloadError::Invalid(
                    "embed field name and value must be non-empty",
                ));
            }

            total += check_len("embed field name", &field.name, MAX_FIELD_NAME)?;
            total += check_len("embed field value", &field.value, MAX_FIELD_VALUE)?;
        }

        Ok(total)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rgb() {
        assert_eq!(Color::rgb(0x2E, 0xCC, 0x71), Color::GREEN);
        assert_eq!(Color::from(0xFF_2E_CC71), Color::GREEN);
    }

    #[test]
    fn test_check_total() {
        let embed = Embed::default()
            .title("abc")
            .desc("de")
            .field("f", "ghi", false);

        assert_eq!(embed.check(), Ok(9));
    }

    #[test]
    fn test_check_limits() {
        let embed = Embed::default().title("t".repeat(257));
        assert!(matches!(
            embed.check(),
            Err(PayloadError::TooLong {
                what: "embed title",
                len: 257,
                ..
            })
        ));

        let embed = (0..26).fold(Embed::default(), |e, i| e.field(i.to_string(), "v", true));
        assert!(matches!(
            embed.check(),
            Err(PayloadError::TooMany { count: 26, .. })
        ));

        let embed = Embed::default().field("name", "", false);
        assert!(matches!(embed.check(), Err(PayloadError::Invalid(_))));
    }
}
