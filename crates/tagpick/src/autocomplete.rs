#![forbid(unsafe_code)]

//! Candidate filtering and highlight navigation.
//!
//! Everything here is a pure function of the catalog, the selection, the
//! typed query and the configuration. The [`Picker`](crate::Picker) calls
//! [`filter_candidates`] after every state change and keeps the result.
//!
//! # Filtering rule
//!
//! 1. Keep catalog entries whose text contains the query (case-sensitive),
//!    dropping selected ones when `hide_selected` is set.
//! 2. When free text is allowed and the trimmed query is non-empty, put a
//!    preview entry first, unless a catalog entry already has exactly that
//!    text or the value the preview would get.
//! 3. "No results" applies when free text is not allowed and step 1 kept
//!    nothing.

use bitflags::bitflags;

use crate::catalog::Catalog;
use crate::config::PickerConfig;
use crate::entry::{Entry, MatchSpan, TextSegment};
use crate::selection::Selection;

bitflags! {
    /// Per-candidate display state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CandidateFlags: u8 {
        /// The highlighted candidate.
        const ACTIVE   = 0b0000_0001;
        /// Already in the selection.
        const SELECTED = 0b0000_0010;
        /// Synthetic "create from typed text" candidate.
        const PREVIEW  = 0b0000_0100;
    }
}

/// One row of the autocomplete list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    entry: Entry,
    flags: CandidateFlags,
    span: Option<MatchSpan>,
}

impl Candidate {
    fn new(entry: Entry, selected: bool, query: &str) -> Self {
        let mut flags = CandidateFlags::empty();
        flags.set(CandidateFlags::SELECTED, selected);
        flags.set(CandidateFlags::PREVIEW, entry.is_preview());
        let span = entry.match_span(query);
        Self { entry, flags, span }
    }

    /// The underlying entry.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Display text.
    pub fn text(&self) -> &str {
        self.entry.text()
    }

    /// Entry value.
    pub fn value(&self) -> &str {
        self.entry.value()
    }

    /// Display flags.
    pub fn flags(&self) -> CandidateFlags {
        self.flags
    }

    /// Whether this is the highlighted row.
    pub fn is_active(&self) -> bool {
        self.flags.contains(CandidateFlags::ACTIVE)
    }

    /// Whether the entry is already selected.
    pub fn is_selected(&self) -> bool {
        self.flags.contains(CandidateFlags::SELECTED)
    }

    /// Whether this is the preview row.
    pub fn is_preview(&self) -> bool {
        self.flags.contains(CandidateFlags::PREVIEW)
    }

    /// First match of the query in the text, if any.
    pub fn span(&self) -> Option<MatchSpan> {
        self.span
    }

    /// The text split at every occurrence of `query`.
    pub fn highlight<'a>(&'a self, query: &str) -> Vec<TextSegment<'a>> {
        self.entry.highlight(query)
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.flags.set(CandidateFlags::ACTIVE, active);
    }
}

/// Result of [`filter_candidates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtered {
    /// Candidates in display order, preview first when present.
    pub candidates: Vec<Candidate>,
    /// Whether the "no results" message applies.
    pub no_results: bool,
}

/// Compute the candidate list for `query`.
///
/// Returns an empty result when the autocomplete is disabled.
pub fn filter_candidates(
    catalog: &Catalog,
    selection: &Selection,
    query: &str,
    config: &PickerConfig,
) -> Filtered {
    if !config.has_autocomplete() {
        return Filtered::default();
    }

    let hide_selected = config.hide_selected();
    let mut candidates: Vec<Candidate> = catalog
        .iter()
        .filter(|entry| !hide_selected || !selection.contains(entry.value()))
        .filter(|entry| entry.text().contains(query))
        .map(|entry| Candidate::new(entry.clone(), selection.contains(entry.value()), query))
        .collect();

    let no_results = !config.allow_new() && candidates.is_empty();

    let text = query.trim();
    if config.allow_new() && !text.is_empty() && catalog.find_by_text(text).is_none() {
        let value = config.make_new_value(text);
        if !catalog.contains_value(&value) {
            let preview = Entry::preview(text, value);
            candidates.insert(0, Candidate::new(preview, false, query));
        }
    }

    Filtered {
        candidates,
        no_results,
    }
}

/// Where the highlight starts when the list opens.
///
/// Index 0, unless the first row is a preview and other rows exist: then the
/// first non-preview unselected row, falling back to 0.
pub fn initial_active_index(candidates: &[Candidate]) -> Option<usize> {
    let first = candidates.first()?;
    if first.is_preview() && candidates.len() > 1 {
        let skip_to = candidates
            .iter()
            .position(|c| !c.is_preview() && !c.is_selected());
        return Some(skip_to.unwrap_or(0));
    }
    Some(0)
}

/// Highlight movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the first row.
    Up,
    /// Towards the last row.
    Down,
}

/// Index reached by moving one step from `current`, wrapping around.
///
/// With `skip_selected`, selected rows are passed over; if a full cycle finds
/// none, `current` is returned unchanged.
pub fn step_index(
    candidates: &[Candidate],
    current: usize,
    direction: Direction,
    skip_selected: bool,
) -> usize {
    let len = candidates.len();
    if len == 0 {
        return current;
    }
    let mut index = current.min(len - 1);
    for _ in 0..len {
        index = match direction {
            Direction::Down => (index + 1) % len,
            Direction::Up => (index + len - 1) % len,
        };
        if !skip_selected || !candidates[index].is_selected() {
            return index;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> Catalog {
        Catalog::from_specs([("Apple", "a"), ("Banana", "b")])
    }

    fn texts(filtered: &Filtered) -> Vec<(&str, &str, bool)> {
        filtered
            .candidates
            .iter()
            .map(|c| (c.text(), c.value(), c.is_preview()))
            .collect()
    }

    #[test]
    fn substring_filter_with_preview() {
        let filtered = filter_candidates(&fruit(), &Selection::new(), "an", &PickerConfig::new());
        assert_eq!(
            texts(&filtered),
            vec![("an", "an", true), ("Banana", "b", false)]
        );
        assert!(!filtered.no_results);
    }

    #[test]
    fn substring_filter_without_allow_new() {
        let config = PickerConfig::new().with_allow_new(false);
        let filtered = filter_candidates(&fruit(), &Selection::new(), "an", &config);
        assert_eq!(texts(&filtered), vec![("Banana", "b", false)]);
    }

    #[test]
    fn exact_text_suppresses_preview() {
        let filtered =
            filter_candidates(&fruit(), &Selection::new(), "Apple", &PickerConfig::new());
        assert_eq!(texts(&filtered), vec![("Apple", "a", false)]);
    }

    #[test]
    fn hidden_exact_match_still_suppresses_preview() {
        let mut selection = Selection::new();
        selection.push("a");
        let config = PickerConfig::new().with_hide_selected(true);
        let filtered = filter_candidates(&fruit(), &selection, "Apple", &config);
        assert!(filtered.candidates.is_empty());
    }

    #[test]
    fn taken_value_suppresses_preview() {
        let catalog = Catalog::from_specs([("Rust", "rs")]);
        let filtered = filter_candidates(&catalog, &Selection::new(), "rs", &PickerConfig::new());
        assert!(filtered.candidates.is_empty());

        let config = PickerConfig::new().with_new_value_format("tag-%value%");
        let catalog = Catalog::from_specs([("Go", "tag-go")]);
        let filtered = filter_candidates(&catalog, &Selection::new(), "go", &config);
        assert!(filtered.candidates.iter().all(|c| !c.is_preview()));
    }

    #[test]
    fn empty_query_lists_everything() {
        let filtered = filter_candidates(&fruit(), &Selection::new(), "", &PickerConfig::new());
        assert_eq!(filtered.candidates.len(), 2);
        assert!(filtered.candidates.iter().all(|c| c.span().is_none()));
    }

    #[test]
    fn hide_selected_drops_selected() {
        let mut selection = Selection::new();
        selection.push("b");
        let config = PickerConfig::new().with_hide_selected(true).with_allow_new(false);
        let filtered = filter_candidates(&fruit(), &selection, "", &config);
        assert_eq!(texts(&filtered), vec![("Apple", "a", false)]);
    }

    #[test]
    fn selected_rows_are_flagged() {
        let mut selection = Selection::new();
        selection.push("a");
        let filtered = filter_candidates(&fruit(), &selection, "", &PickerConfig::new());
        assert!(filtered.candidates[0].is_selected());
        assert!(!filtered.candidates[1].is_selected());
    }

    #[test]
    fn no_results_only_without_allow_new() {
        let strict = PickerConfig::new().with_allow_new(false);
        let filtered = filter_candidates(&fruit(), &Selection::new(), "zzz", &strict);
        assert!(filtered.candidates.is_empty());
        assert!(filtered.no_results);

        let open = filter_candidates(&fruit(), &Selection::new(), "zzz", &PickerConfig::new());
        assert!(!open.no_results);
        assert_eq!(texts(&open), vec![("zzz", "zzz", true)]);
    }

    #[test]
    fn disabled_autocomplete_is_empty() {
        let config = PickerConfig::new().with_autocomplete(false);
        let filtered = filter_candidates(&fruit(), &Selection::new(), "", &config);
        assert_eq!(filtered, Filtered::default());
    }

    #[test]
    fn preview_uses_value_format() {
        let config = PickerConfig::new().with_new_value_format("new:%value%");
        let filtered = filter_candidates(&Catalog::new(), &Selection::new(), "kiwi", &config);
        assert_eq!(texts(&filtered), vec![("kiwi", "new:kiwi", true)]);
    }

    #[test]
    fn match_spans_are_recorded() {
        let filtered = filter_candidates(&fruit(), &Selection::new(), "an", &PickerConfig::new());
        assert_eq!(filtered.candidates[0].span(), None);
        assert_eq!(
            filtered.candidates[1].span(),
            Some(MatchSpan { start: 1, len: 2 })
        );
    }

    #[test]
    fn initial_index_skips_leading_preview() {
        let filtered = filter_candidates(&fruit(), &Selection::new(), "an", &PickerConfig::new());
        assert_eq!(initial_active_index(&filtered.candidates), Some(1));

        let alone = filter_candidates(&fruit(), &Selection::new(), "zz", &PickerConfig::new());
        assert_eq!(initial_active_index(&alone.candidates), Some(0));
        assert_eq!(initial_active_index(&[]), None);
    }

    #[test]
    fn initial_index_falls_back_when_all_selected() {
        let mut selection = Selection::new();
        selection.push("b");
        let filtered = filter_candidates(&fruit(), &selection, "an", &PickerConfig::new());
        assert_eq!(initial_active_index(&filtered.candidates), Some(0));
    }

    #[test]
    fn step_wraps_both_ways() {
        let filtered = filter_candidates(&fruit(), &Selection::new(), "", &PickerConfig::new());
        let rows = &filtered.candidates;
        assert_eq!(step_index(rows, 0, Direction::Down, false), 1);
        assert_eq!(step_index(rows, 1, Direction::Down, false), 0);
        assert_eq!(step_index(rows, 0, Direction::Up, false), 1);
    }

    #[test]
    fn step_skips_selected_rows() {
        let catalog = Catalog::from_specs(["a", "b", "c"]);
        let mut selection = Selection::new();
        selection.push("b");
        let filtered = filter_candidates(&catalog, &selection, "", &PickerConfig::new());
        let rows = &filtered.candidates;
        assert_eq!(step_index(rows, 0, Direction::Down, true), 2);
        assert_eq!(step_index(rows, 2, Direction::Up, true), 0);
    }

    #[test]
    fn step_stops_after_full_cycle() {
        let catalog = Catalog::from_specs(["a", "b"]);
        let mut selection = Selection::new();
        selection.push("a");
        selection.push("b");
        let filtered = filter_candidates(&catalog, &selection, "", &PickerConfig::new());
        assert_eq!(step_index(&filtered.candidates, 1, Direction::Down, true), 1);
    }
}
