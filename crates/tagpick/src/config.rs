#![forbid(unsafe_code)]

//! Picker configuration.
//!
//! A [`PickerConfig`] is fixed for the lifetime of a picker. Build one with the
//! `with_*` methods and hand it to [`PickerBuilder`](crate::PickerBuilder).
//!
//! ```
//! use tagpick::{Mode, PickerConfig};
//!
//! let config = PickerConfig::new()
//!     .with_mode(Mode::Multi)
//!     .with_placeholder("Add tags")
//!     .with_new_value_format("tag:%value%");
//! assert_eq!(config.make_new_value("rust"), "tag:rust");
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tagpick_core::keys::KeyTable;

use crate::error::{PickerError, Result};

/// Placeholder substituted by [`PickerConfig::make_new_value`].
pub const VALUE_PLACEHOLDER: &str = "%value%";

/// Default form field name.
pub const DEFAULT_FIELD_NAME: &str = "items";

/// Default "no results" message.
pub const DEFAULT_NO_RESULTS_TEXT: &str = "No results found";

/// Selection cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// At most one selected entry; selecting replaces it.
    Single,
    /// Any number of distinct selected entries.
    #[default]
    Multi,
}

/// Arrow-key navigation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationConfig {
    /// Skip candidates that are already selected when moving.
    pub skip_selected: bool,
    /// Up at the first candidate hides the list instead of wrapping.
    pub up_at_top_hides: bool,
}

/// Immutable per-picker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PickerConfig {
    mode: Mode,
    allow_new: bool,
    hide_selected: bool,
    placeholder: String,
    new_value_format: Option<String>,
    has_autocomplete: bool,
    form_field_name: String,
    use_string_input: bool,
    string_input_separator: String,
    no_results_text: String,
    allow_clear: bool,
    navigation: NavigationConfig,
    #[cfg_attr(feature = "serde", serde(skip))]
    keys: KeyTable,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Multi,
            allow_new: true,
            hide_selected: false,
            placeholder: String::new(),
            new_value_format: None,
            has_autocomplete: true,
            form_field_name: DEFAULT_FIELD_NAME.to_string(),
            use_string_input: false,
            string_input_separator: ",".to_string(),
            no_results_text: DEFAULT_NO_RESULTS_TEXT.to_string(),
            allow_clear: false,
            navigation: NavigationConfig::default(),
            keys: KeyTable::DEFAULT,
        }
    }
}

impl PickerConfig {
    /// Default configuration: multi mode, free text allowed.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Builder methods ---

    /// Set the selection mode (builder).
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Permit entries created from typed text (builder). Ignored in single mode.
    pub fn with_allow_new(mut self, allow: bool) -> Self {
        self.allow_new = allow;
        self
    }

    /// Exclude selected entries from the candidate list (builder).
    pub fn with_hide_selected(mut self, hide: bool) -> Self {
        self.hide_selected = hide;
        self
    }

    /// Set the placeholder text (builder).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the template for values of created entries (builder).
    ///
    /// The first `%value%` is replaced by the typed text.
    pub fn with_new_value_format(mut self, format: impl Into<String>) -> Self {
        self.new_value_format = Some(format.into());
        self
    }

    /// Enable or disable the autocomplete list (builder).
    pub fn with_autocomplete(mut self, enabled: bool) -> Self {
        self.has_autocomplete = enabled;
        self
    }

    /// Set the form field name (builder).
    pub fn with_form_field_name(mut self, name: impl Into<String>) -> Self {
        self.form_field_name = name.into();
        self
    }

    /// Submit the selection as one delimiter-joined string (builder).
    pub fn with_string_input(mut self, separator: impl Into<String>) -> Self {
        self.use_string_input = true;
        self.string_input_separator = separator.into();
        self
    }

    /// Set the "no results" message (builder).
    pub fn with_no_results_text(mut self, text: impl Into<String>) -> Self {
        self.no_results_text = text.into();
        self
    }

    /// Show a clear control in single mode (builder).
    pub fn with_allow_clear(mut self, allow: bool) -> Self {
        self.allow_clear = allow;
        self
    }

    /// Set arrow-key navigation behavior (builder).
    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    /// Set the key table (builder).
    pub fn with_keys(mut self, keys: KeyTable) -> Self {
        self.keys = keys;
        self
    }

    // --- Accessors ---

    /// Selection mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether this is a single-selection picker.
    pub fn is_single(&self) -> bool {
        self.mode == Mode::Single
    }

    /// Whether free-text entries may be created. Always false in single mode.
    pub fn allow_new(&self) -> bool {
        self.allow_new && !self.is_single()
    }

    /// Whether selected entries are hidden from candidates.
    pub fn hide_selected(&self) -> bool {
        self.hide_selected
    }

    /// Placeholder text.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Template for created values, if any.
    pub fn new_value_format(&self) -> Option<&str> {
        self.new_value_format.as_deref()
    }

    /// Whether the autocomplete list is enabled.
    pub fn has_autocomplete(&self) -> bool {
        self.has_autocomplete
    }

    /// Form field name.
    pub fn form_field_name(&self) -> &str {
        &self.form_field_name
    }

    /// Whether the selection is submitted as one joined string.
    pub fn use_string_input(&self) -> bool {
        self.use_string_input
    }

    /// Delimiter for string input.
    pub fn string_input_separator(&self) -> &str {
        &self.string_input_separator
    }

    /// "No results" message.
    pub fn no_results_text(&self) -> &str {
        &self.no_results_text
    }

    /// Whether single mode shows a clear control.
    pub fn allow_clear(&self) -> bool {
        self.allow_clear
    }

    /// Navigation behavior.
    pub fn navigation(&self) -> NavigationConfig {
        self.navigation
    }

    /// Key table.
    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    /// Derive the value for an entry created from `text`.
    pub fn make_new_value(&self, text: &str) -> String {
        match &self.new_value_format {
            Some(format) => format.replacen(VALUE_PLACEHOLDER, text, 1),
            None => text.to_string(),
        }
    }

    /// Check for combinations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.new_value_format
            && !format.contains(VALUE_PLACEHOLDER)
        {
            return Err(PickerError::ValueFormatMissingPlaceholder {
                format: format.clone(),
            });
        }
        if self.use_string_input && self.string_input_separator.is_empty() {
            return Err(PickerError::EmptySeparator);
        }
        Ok(())
    }
}
