#![forbid(unsafe_code)]

//! Entries: the selectable items of a picker.
//!
//! An [`Entry`] is a display `text` plus an opaque `value`. Where it came from
//! is carried by [`EntryKind`] rather than independent flags, so an entry can
//! never be both a throwaway preview and a committed catalog member.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryKind {
    /// Supplied by the host as part of the catalog.
    #[default]
    Predefined,
    /// Created by the user from typed free text and committed.
    New,
    /// Synthetic "create from typed text" candidate. Never stored.
    Preview,
}

/// A selectable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    text: String,
    value: String,
    kind: EntryKind,
}

impl Entry {
    /// Create a predefined entry.
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            kind: EntryKind::Predefined,
        }
    }

    /// Create a predefined entry whose value is its text.
    pub fn identity(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }

    /// Create a user-made entry from typed text.
    pub fn created(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            kind: EntryKind::New,
        }
    }

    pub(crate) fn preview(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            kind: EntryKind::Preview,
        }
    }

    /// Display label.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Opaque key used for selection membership and form submission.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where this entry came from.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// True for user-made entries, committed or still in preview.
    pub fn is_new(&self) -> bool {
        matches!(self.kind, EntryKind::New | EntryKind::Preview)
    }

    /// True only for the synthetic preview candidate.
    pub fn is_preview(&self) -> bool {
        self.kind == EntryKind::Preview
    }

    /// Turn a preview into a committed new entry. Other kinds are unchanged.
    pub(crate) fn promote(mut self) -> Self {
        if self.kind == EntryKind::Preview {
            self.kind = EntryKind::New;
        }
        self
    }

    /// Location of the first case-sensitive occurrence of `query` in the text.
    ///
    /// Previews and empty queries have no span.
    pub fn match_span(&self, query: &str) -> Option<MatchSpan> {
        if self.is_preview() || query.is_empty() {
            return None;
        }
        self.text.find(query).map(|start| MatchSpan {
            start,
            len: query.len(),
        })
    }

    /// Split the text into runs, marking every occurrence of `query`.
    ///
    /// Previews and empty queries yield the whole text as one unmatched run.
    pub fn highlight<'a>(&'a self, query: &str) -> Vec<TextSegment<'a>> {
        if self.is_preview() || query.is_empty() {
            return vec![TextSegment::plain(&self.text)];
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for (start, part) in self.text.match_indices(query) {
            if start > last {
                segments.push(TextSegment::plain(&self.text[last..start]));
            }
            segments.push(TextSegment {
                text: part,
                matched: true,
            });
            last = start + part.len();
        }
        if last < self.text.len() || segments.is_empty() {
            segments.push(TextSegment::plain(&self.text[last..]));
        }
        segments
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Byte range of a query match inside an entry's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSpan {
    /// Byte offset of the match start.
    pub start: usize,
    /// Byte length of the match.
    pub len: usize,
}

impl MatchSpan {
    /// The span as a byte range.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// A run of display text, either matching the query or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    /// The text of this run.
    pub text: &'a str,
    /// Whether this run is an occurrence of the query.
    pub matched: bool,
}

impl<'a> TextSegment<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            matched: false,
        }
    }
}

/// Host-supplied description of a catalog entry.
///
/// A missing value means the text doubles as the value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntrySpec {
    /// Display label.
    pub text: String,
    /// Optional key; defaults to `text`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<String>,
}

impl EntrySpec {
    /// Spec with an explicit value.
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: Some(value.into()),
        }
    }

    /// Build the predefined entry this spec describes.
    pub fn into_entry(self) -> Entry {
        match self.value {
            Some(value) => Entry::new(self.text, value),
            None => Entry::identity(self.text),
        }
    }
}

impl From<&str> for EntrySpec {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            value: None,
        }
    }
}

impl From<String> for EntrySpec {
    fn from(text: String) -> Self {
        Self { text, value: None }
    }
}

impl<T: Into<String>, V: Into<String>> From<(T, V)> for EntrySpec {
    fn from((text, value): (T, V)) -> Self {
        Self::new(text, value)
    }
}
