#![forbid(unsafe_code)]

//! Construction-time errors.
//!
//! Commands on a built picker never fail with an error; they report success
//! as a `bool`. Everything here is a host misconfiguration caught by
//! [`PickerBuilder::build`](crate::PickerBuilder::build).

use thiserror::Error;

/// Errors raised while building a picker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PickerError {
    /// A multi-valued selection store was supplied to a single-mode picker.
    #[error("single mode takes a single value; use `value` instead of `selected_values`")]
    SelectedValuesInSingleMode,

    /// A single value slot was supplied to a multi-mode picker.
    #[error("multi mode takes `selected_values`; `value` is only for single mode")]
    ValueInMultiMode,

    /// The new-value template has no placeholder, so every created entry
    /// would share one value.
    #[error("new value format {format:?} does not contain the `%value%` placeholder")]
    ValueFormatMissingPlaceholder {
        /// The offending template.
        format: String,
    },

    /// String-input mode needs a delimiter to join values with.
    #[error("string input separator must not be empty")]
    EmptySeparator,

    /// A picker document could not be parsed.
    #[cfg(feature = "serde")]
    #[error("invalid picker document: {0}")]
    Document(String),
}

/// Result type for picker construction.
pub type Result<T> = std::result::Result<T, PickerError>;
