#![forbid(unsafe_code)]

//! The ordered set of selected values.

/// Selected values in selection order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: Vec<String>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selected values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `value` is selected.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// The most recently selected value.
    pub fn last(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    /// The earliest selected value (the sole one in single mode).
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Values in selection order.
    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    /// Iterate over values in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Join the values with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.values.join(separator)
    }

    /// Append a value. Returns `false` if it was already selected.
    pub(crate) fn push(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Remove a value. Returns `false` if it was not selected.
    pub(crate) fn remove(&mut self, value: &str) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }
}
