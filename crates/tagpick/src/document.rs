#![forbid(unsafe_code)]

//! JSON picker documents.
//!
//! A document bundles everything a host would otherwise pass to
//! [`PickerBuilder`]: configuration, catalog and initial selection.
//!
//! ```json
//! {
//!   "config": { "mode": "multi", "placeholder": "Add tags" },
//!   "catalog": [ { "text": "Rust", "value": "rs" }, { "text": "Go" } ],
//!   "selected_values": [ "rs" ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::PickerConfig;
use crate::entry::EntrySpec;
use crate::error::{PickerError, Result};
use crate::picker::{Picker, PickerBuilder};

/// Serialized picker setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerDocument {
    /// Picker configuration.
    pub config: PickerConfig,
    /// Catalog entries. Absent means "derive from the selection".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<EntrySpec>>,
    /// Initial selection (multi mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_values: Option<Vec<String>>,
    /// Initial value (single mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PickerDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| PickerError::Document(err.to_string()))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| PickerError::Document(err.to_string()))
    }

    /// Turn the document into a builder.
    pub fn into_builder(self) -> PickerBuilder {
        let mut builder = Picker::builder(self.config);
        if let Some(catalog) = self.catalog {
            builder = builder.with_catalog(catalog);
        }
        if let Some(values) = self.selected_values {
            builder = builder.with_selected_values(values);
        }
        if let Some(value) = self.value {
            builder = builder.with_value(value);
        }
        builder
    }

    /// Build the picker this document describes.
    pub fn into_picker(self) -> Result<Picker> {
        self.into_builder().build()
    }
}
