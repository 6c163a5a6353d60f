#![forbid(unsafe_code)]

//! Host-form views of the selection.

#[cfg(feature = "serde")]
use serde::Serialize;

/// What the host form submits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FormValue {
    /// One field per selected value, in selection order.
    Values(Vec<String>),
    /// All values joined with the string-input separator.
    Joined(String),
}

impl FormValue {
    /// Name/value pairs as a form encoder would emit them.
    pub fn pairs<'a>(&'a self, name: &'a str) -> Vec<(&'a str, &'a str)> {
        match self {
            Self::Values(values) => values.iter().map(|v| (name, v.as_str())).collect(),
            Self::Joined(joined) => vec![(name, joined.as_str())],
        }
    }

    /// Whether nothing would be submitted.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Values(values) => values.is_empty(),
            Self::Joined(joined) => joined.is_empty(),
        }
    }
}

/// One option of the native multi-select mirror of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MirrorOption {
    /// Option label.
    pub text: String,
    /// Option value.
    pub value: String,
    /// Whether the option is selected.
    pub selected: bool,
}
