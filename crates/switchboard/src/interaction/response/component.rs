use serde::Serialize;
use url::Url;

use super::prepare::{
    check_count, check_len, CustomIds, PayloadError, MAX_BUTTONS, MAX_BUTTON_LABEL,
    MAX_MENU_OPTIONS, MAX_OPTION_TEXT, MAX_PLACEHOLDER, MAX_ROWS,
};

/// A list of action rows attached to a message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Components(pub(super) Vec<ActionRow>);

/// Helper methods for building [`Components`]
impl Components {
    /// Add a row to this list
    #[must_use]
    pub fn row(mut self, row: impl Into<ActionRow>) -> Self {
        self.0.push(row.into());
        self
    }

    /// Add a row of buttons using the given closure
    #[must_use]
    pub fn buttons(self, f: impl FnOnce(ButtonsBuilder) -> ButtonsBuilder) -> Self {
        self.row(f(ButtonsBuilder::default()))
    }

    /// Add a select menu occupying a full row
    #[must_use]
    pub fn menu(self, menu: Menu) -> Self { self.row(menu) }

    /// Get the rows in this list
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[ActionRow] { &self.0 }

    pub(super) fn check<'a>(&'a self, ids: &mut CustomIds<'a>) -> Result<(), PayloadError> {
        check_count("action rows", self.0.len(), MAX_ROWS)?;
        self.0.iter().try_for_each(|r| r.check(ids))
    }
}

/// Helper for building a row of buttons
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct ButtonsBuilder(Vec<Button>);

impl ButtonsBuilder {
    /// Add a button to this row by value
    #[must_use]
    pub fn push(mut self, btn: Button) -> Self {
        self.0.push(btn);
        self
    }

    /// Add a button to this row
    #[must_use]
    pub fn button(
        self,
        id: impl Into<String>,
        style: ButtonStyle,
        label: impl Into<ButtonLabel>,
    ) -> Self {
        self.push(Button::new(id, style, label))
    }

    /// Add a new link-style button to this row
    #[must_use]
    pub fn link(self, url: impl Into<Url>, label: impl Into<ButtonLabel>) -> Self {
        self.push(Button::link(url, label))
    }
}

impl From<ButtonsBuilder> for ActionRow {
    fn from(ButtonsBuilder(b): ButtonsBuilder) -> Self { Self::Buttons(b) }
}

impl From<Menu> for ActionRow {
    fn from(menu: Menu) -> Self { Self::Menu(menu) }
}

/// A single row of components that are valid inside a message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "components", rename_all = "snake_case")]
pub enum ActionRow {
    /// A row of buttons
    Buttons(Vec<Button>),
    /// A single menu occupying a full row
    Menu(Menu),
}

impl ActionRow {
    fn check<'a>(&'a self, ids: &mut CustomIds<'a>) -> Result<(), PayloadError> {
        match self {
            Self::Buttons(b) => {
                if b.is_empty() {
                    return Err(PayloadError::Invalid("button row is empty"));
                }

                check_count("buttons in row", b.len(), MAX_BUTTONS)?;
                b.iter().try_for_each(|b| b.check(ids))
            },
            Self::Menu(m) => m.check(ids),
        }
    }
}

/// A single button component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(flatten)]
    ty: ButtonType,
    label: ButtonLabel,
    disabled: bool,
}

impl Button {
    /// Construct a new non-link button
    #[must_use]
    pub fn new(id: impl Into<String>, style: ButtonStyle, label: impl Into<ButtonLabel>) -> Self {
        Self {
            ty: ButtonType::Custom {
                id: id.into(),
                style,
            },
            label: label.into(),
            disabled: false,
        }
    }

    /// Construct a new link-style button
    #[must_use]
    pub fn link(url: impl Into<Url>, label: impl Into<ButtonLabel>) -> Self {
        Self {
            ty: ButtonType::Link(url.into()),
            label: label.into(),
            disabled: false,
        }
    }

    /// Set whether this button is greyed out
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Get the type of this button
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &ButtonType { &self.ty }

    /// Get the label of this button
    #[inline]
    #[must_use]
    pub fn label(&self) -> &ButtonLabel { &self.label }

    /// Returns true if this button is greyed out
    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool { self.disabled }

    fn check<'a>(&'a self, ids: &mut CustomIds<'a>) -> Result<(), PayloadError> {
        if let ButtonType::Custom { ref id, .. } = self.ty {
            ids.claim(id)?;
        }

        let (emoji, text) = match self.label {
            ButtonLabel::Text(ref e, ref t) => (e.as_deref().unwrap_or_default(), t.as_str()),
            ButtonLabel::Emoji(ref e) => (e.as_str(), ""),
        };

        if emoji.is_empty() && text.is_empty() {
            return Err(PayloadError::Invalid("button has neither a label nor an emoji"));
        }

        check_len("button label", text, MAX_BUTTON_LABEL).map(|_| ())
    }
}

/// The label of a button, composed of text and/or an emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ButtonLabel {
    /// A text label with an optional emoji
    Text(Option<String>, String),
    /// An emoji-only label
    Emoji(String),
}

impl ButtonLabel {
    /// Get the text of this label, if any
    #[inline]
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(_, t) => Some(t),
            Self::Emoji(_) => None,
        }
    }

    /// Get the emoji of this label, if any
    #[inline]
    #[must_use]
    pub fn emoji(&self) -> Option<&str> {
        match self {
            Self::Text(e, _) => e.as_deref(),
            Self::Emoji(e) => Some(e),
        }
    }
}

impl From<String> for ButtonLabel {
    fn from(text: String) -> Self { Self::Text(None, text) }
}

impl From<&str> for ButtonLabel {
    fn from(text: &str) -> Self { Self::Text(None, text.into()) }
}

impl From<(String, String)> for ButtonLabel {
    fn from((emoji, text): (String, String)) -> Self { Self::Text(Some(emoji), text) }
}

/// The type of a button component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    /// A link-style button
    Link(Url),
    /// A non-link button
    Custom {
        /// Button ID for callbacks
        id: String,
        /// Button style
        style: ButtonStyle,
    },
}

/// Style for non-link buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// A primary (bold) button
    Primary,
    /// A secondary (faint) button
    Secondary,
    /// A success (green) button
    Success,
    /// A danger (red) button
    Danger,
}

/// A single string select menu component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    id: String,
    options: Vec<MenuOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    min_count: u8,
    max_count: u8,
    disabled: bool,
}

/// A single option in a select menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuOption {
    label: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    default: bool,
}

impl MenuOption {
    /// Construct a new option with the given display label and submitted
    /// value
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            desc: None,
            default: false,
        }
    }

    /// Set the description shown beneath this option
    #[must_use]
    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Set whether this option is selected by default
    #[must_use]
    pub fn default_selected(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Get the display label of this option
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str { &self.label }

    /// Get the value submitted when this option is selected
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str { &self.value }

    /// Get the description of this option
    #[inline]
    #[must_use]
    pub fn get_desc(&self) -> Option<&str> { self.desc.as_deref() }

    /// Returns true if this option is selected by default
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool { self.default }
}

impl Menu {
    /// Construct a new empty menu allowing exactly one selection
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: vec![],
            placeholder: None,
            min_count: 1,
            max_count: 1,
            disabled: false,
        }
    }

    /// Add an option to this menu
    #[must_use]
    pub fn option(mut self, opt: MenuOption) -> Self {
        self.options.push(opt);
        self
    }

    /// Set the placeholder text shown when nothing is selected
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the minimum and maximum number of options that may be selected
    #[must_use]
    pub fn count(mut self, min: u8, max: u8) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }

    /// Set whether this menu is greyed out
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Get the custom ID of this menu
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    /// Get the options of this menu
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[MenuOption] { &self.options }

    /// Get the placeholder text of this menu
    #[inline]
    #[must_use]
    pub fn get_placeholder(&self) -> Option<&str> { self.placeholder.as_deref() }

    /// Get the minimum and maximum selection count of this menu
    #[inline]
    #[must_use]
    pub fn get_count(&self) -> (u8, u8) { (self.min_count, self.max_count) }

    /// Returns true if this menu is greyed out
    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool { self.disabled }

    fn check<'a>(&'a self, ids: &mut CustomIds<'a>) -> Result<(), PayloadError> {
        ids.claim(&self.id)?;

        if self.options.is_empty() {
            return Err(PayloadError::Invalid("select menu has no options"));
        }
        check_count("select menu options", self.options.len(), MAX_MENU_OPTIONS)?;

        let (min, max) = (usize::from(self.min_count), usize::from(self.max_count));
        if max == 0 || min > max || max > MAX_MENU_OPTIONS || max > self.options.len() {
            return Err(PayloadError::Invalid("select menu value count out of range"));
        }

        if let Some(ref p) = self.placeholder {
            check_len("select menu placeholder", p, MAX_PLACEHOLDER)?;
        }

        let mut values = std::collections::HashSet::new();
        for opt in &self.options {
            check_len("option label", &opt.label, MAX_OPTION_TEXT)?;
            check_len("option value", &opt.value, MAX_OPTION_TEXT)?;
            if let Some(ref d) = opt.desc {
                check_len("option description", d, MAX_OPTION_TEXT)?;
            }

            if opt.label.is_empty() || opt.value.is_empty() {
                return Err(PayloadError::Invalid(
                    "option label and value must be non-empty",
                ));
            }

            if !values.insert(opt.value.as_str()) {
                return Err(PayloadError::Invalid(
                    "select menu option values must be unique",
                ));
            }
        }

        Ok(())
    }
}
