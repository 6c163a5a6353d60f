#![forbid(unsafe_code)]

//! The selection controller.
//!
//! A [`Picker`] owns the catalog, the selection, the input buffer and the
//! autocomplete state. Hosts drive it with commands (or raw events through
//! [`Picker::handle_event`]) and read derived views back out.
//!
//! # Invariants
//!
//! 1. Catalog values and selected values are unique.
//! 2. Every selected value resolves to a catalog entry.
//! 3. A user-created entry is in the catalog exactly while it is selected.
//! 4. Single mode holds at most one selected value.
//! 5. When the list is visible it has rows or shows the "no results" message.
//! 6. Derived views are recomputed before a command returns, and listeners
//!    run only after that.
//!
//! # Usage
//!
//! ```
//! use tagpick::{Picker, PickerConfig};
//!
//! let mut picker = Picker::builder(PickerConfig::new())
//!     .with_catalog([("Apple", "a"), ("Banana", "b")])
//!     .build()
//!     .unwrap();
//!
//! picker.set_input("an");
//! assert!(picker.is_visible());
//! assert_eq!(picker.active_candidate().unwrap().text(), "Banana");
//!
//! assert!(picker.commit_active());
//! assert_eq!(picker.selected_values(), ["b".to_string()]);
//! assert_eq!(picker.input(), "");
//! ```

use std::fmt;

use tagpick_core::event::{Event, KeyCode, KeyEvent};
use tagpick_core::{debug, debug_span, trace};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::autocomplete::{
    Candidate, Direction, filter_candidates, initial_active_index, step_index,
};
use crate::catalog::Catalog;
use crate::config::PickerConfig;
use crate::entry::{Entry, EntrySpec};
use crate::error::{PickerError, Result};
use crate::form::{FormValue, MirrorOption};
use crate::interpreter::{InterpreterState, KeyCommand, interpret};
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`Picker`] from configuration and initial data.
#[derive(Debug, Clone, Default)]
pub struct PickerBuilder {
    config: PickerConfig,
    catalog: Option<Vec<EntrySpec>>,
    selected_values: Option<Vec<String>>,
    value: Option<String>,
}

impl PickerBuilder {
    /// Start from a configuration.
    pub fn new(config: PickerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Supply the catalog (builder).
    ///
    /// Without one, the catalog is derived from the initial selection and the
    /// autocomplete list is disabled.
    pub fn with_catalog<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntrySpec>,
    {
        self.catalog = Some(specs.into_iter().map(Into::into).collect());
        self
    }

    /// Initial selection for multi mode (builder).
    pub fn with_selected_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.selected_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Initial value for single mode (builder).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Validate and build the picker.
    pub fn build(self) -> Result<Picker> {
        let Self {
            mut config,
            catalog,
            selected_values,
            value,
        } = self;

        config.validate()?;
        if config.is_single() && selected_values.is_some() {
            return Err(PickerError::SelectedValuesInSingleMode);
        }
        if !config.is_single() && value.is_some() {
            return Err(PickerError::ValueInMultiMode);
        }

        let initial: Vec<String> = match (selected_values, value) {
            (Some(values), _) => values,
            (None, Some(value)) => vec![value],
            (None, None) => Vec::new(),
        };

        let catalog = match catalog {
            Some(specs) => Catalog::from_specs(specs),
            None => {
                config = config.with_autocomplete(false);
                Catalog::from_specs(initial.iter().map(String::as_str))
            }
        };

        let mut selection = Selection::new();
        for value in initial {
            if !catalog.contains_value(&value) {
                trace!(value = value.as_str(), "initial value dropped: not in catalog");
                continue;
            }
            selection.push(value);
            if config.is_single() {
                break;
            }
        }

        if config.is_single()
            && selection.is_empty()
            && config.placeholder().is_empty()
            && let Some(first) = catalog.entries().first()
        {
            selection.push(first.value());
        }

        debug!(
            entries = catalog.len(),
            selected = selection.len(),
            "picker built"
        );

        let mut picker = Picker {
            config,
            catalog,
            selection,
            input: String::new(),
            focused: false,
            visible: false,
            candidates: Vec::new(),
            no_results: false,
            active: None,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        };
        picker.refresh();
        Ok(picker)
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// Handle returned by [`Picker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Picker)>;

/// Result of [`Picker::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Command the key mapped to, if any.
    pub command: Option<KeyCommand>,
    /// Whether the command succeeded.
    pub succeeded: bool,
    /// Whether the key should keep its native behavior.
    pub pass_through: bool,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self {
            command: None,
            succeeded: false,
            pass_through: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Picker
// ---------------------------------------------------------------------------

/// Selection and autocomplete state machine.
pub struct Picker {
    config: PickerConfig,
    catalog: Catalog,
    selection: Selection,
    /// Raw typed text, not yet committed.
    input: String,
    focused: bool,
    visible: bool,
    /// Derived from catalog, selection, input and config by `refresh`.
    candidates: Vec<Candidate>,
    no_results: bool,
    /// Highlighted row; `None` while hidden.
    active: Option<usize>,
    /// Bumped on every observable change.
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for Picker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Picker")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .field("selection", &self.selection)
            .field("input", &self.input)
            .field("focused", &self.focused)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Picker {
    /// Start building a picker.
    pub fn builder(config: PickerConfig) -> PickerBuilder {
        PickerBuilder::new(config)
    }

    // --- Change notification ---

    /// Register a listener called after every command that changed state.
    pub fn subscribe(&mut self, listener: impl FnMut(&Picker) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Counter bumped on every observable change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- Selection commands ---

    /// Add `entry` to the selection.
    ///
    /// Fails for previews, entries already selected, catalog entries that do
    /// not exist, and user-created entries when free text is not allowed or
    /// their value is taken. In single mode the current selection is replaced.
    pub fn select(&mut self, entry: &Entry) -> bool {
        self.run("select", |p| p.do_select(entry))
    }

    /// Select the catalog entry with `value`.
    pub fn select_value(&mut self, value: &str) -> bool {
        self.run("select_value", |p| match p.catalog.get(value).cloned() {
            Some(entry) => p.do_select(&entry),
            None => false,
        })
    }

    /// Remove `entry` from the selection and focus the input.
    pub fn unselect(&mut self, entry: &Entry) -> bool {
        self.run("unselect", |p| p.do_remove(entry.value()))
    }

    /// Remove the selected value `value` (the close button on a chip) and
    /// focus the input.
    pub fn remove_selected(&mut self, value: &str) -> bool {
        self.run("remove_selected", |p| p.do_remove(value))
    }

    /// Commit the highlighted row.
    pub fn commit_active(&mut self) -> bool {
        self.run("commit_active", Self::do_commit_active)
    }

    /// Commit the trimmed input text as an existing or new entry.
    pub fn commit_input(&mut self) -> bool {
        self.run("commit_input", Self::do_commit_input)
    }

    /// Remove the last selection when the input is empty (multi mode only).
    ///
    /// A removed user-created entry puts its text back into the input when
    /// free text is allowed.
    pub fn backspace_unselect(&mut self) -> bool {
        self.run("backspace_unselect", Self::do_backspace_unselect)
    }

    /// Append host-supplied entries to the catalog. Returns how many were added.
    pub fn extend_catalog<I, S>(&mut self, specs: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<EntrySpec>,
    {
        self.run("extend_catalog", |p| {
            let added = p.catalog.merge(specs);
            if added > 0 {
                debug!(added, "catalog extended");
                p.bump();
                p.refresh();
            }
            added
        })
    }

    // --- Single mode ---

    /// Replace the single-mode value from the host. `None` clears it.
    ///
    /// Fails in multi mode and for values not in the catalog.
    pub fn set_value(&mut self, value: Option<&str>) -> bool {
        self.run("set_value", |p| {
            if !p.config.is_single() {
                return false;
            }
            match value {
                Some(value) if !p.catalog.contains_value(value) => false,
                Some(value) if p.selection.contains(value) => true,
                Some(value) => {
                    p.clear_selection();
                    p.selection.push(value);
                    p.bump();
                    p.refresh();
                    true
                }
                None => {
                    p.clear_selection();
                    p.refresh();
                    true
                }
            }
        })
    }

    /// Clear the single-mode value when clearing is allowed.
    pub fn clear_single(&mut self) -> bool {
        self.run("clear_single", |p| {
            if !p.is_single_clear_visible() {
                return false;
            }
            p.clear_selection();
            p.refresh();
            true
        })
    }

    // --- Input and autocomplete ---

    /// Replace the input text and reopen the list for it.
    pub fn set_input(&mut self, text: &str) {
        self.run("set_input", |p| p.do_set_input(text));
    }

    /// Append a character to the input.
    pub fn insert_char(&mut self, c: char) {
        let mut text = self.input.clone();
        text.push(c);
        self.set_input(&text);
    }

    /// Append a string to the input.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let text = format!("{}{}", self.input, s);
        self.set_input(&text);
    }

    /// Delete the last grapheme of the input.
    pub fn delete_back(&mut self) -> bool {
        let Some((index, _)) = self.input.grapheme_indices(true).next_back() else {
            return false;
        };
        let text = self.input[..index].to_string();
        self.set_input(&text);
        true
    }

    /// Move the highlight. Only acts while the list has rows.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        self.run("navigate", |p| p.do_navigate(direction))
    }

    /// Open the list. Returns whether it is visible afterwards.
    pub fn show_autocomplete(&mut self) -> bool {
        self.run("show_autocomplete", Self::do_show)
    }

    /// Close the list. In single mode this also blurs.
    pub fn hide_autocomplete(&mut self) {
        self.run("hide_autocomplete", Self::do_hide);
    }

    /// Focus and open the list if closed, close it otherwise.
    ///
    /// Returns whether the list is visible afterwards.
    pub fn toggle_autocomplete(&mut self) -> bool {
        self.run("toggle_autocomplete", |p| {
            p.set_focused(true);
            if p.visible {
                p.do_hide();
                false
            } else {
                p.do_show()
            }
        })
    }

    /// Highlight row `index` (pointer hover).
    pub fn hover_candidate(&mut self, index: usize) -> bool {
        self.run("hover_candidate", |p| p.do_hover(index))
    }

    /// Highlight and commit row `index` (pointer click).
    pub fn click_candidate(&mut self, index: usize) -> bool {
        self.run("click_candidate", |p| p.do_hover(index) && p.do_commit_active())
    }

    // --- Focus ---

    /// Mark the input focused.
    pub fn focus(&mut self) {
        self.run("focus", |p| p.set_focused(true));
    }

    /// Drop focus: pending input is discarded and the list closes.
    pub fn blur(&mut self) {
        self.run("blur", Self::do_blur);
    }

    // --- Events ---

    /// Run the command a key press maps to.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !key.is_actionable() {
            return KeyOutcome::ignored();
        }
        let state = self.interpreter_state();
        let Some(command) = interpret(self.config.keys(), key, &state) else {
            return KeyOutcome::ignored();
        };

        let succeeded = self.run("key", |p| match command {
            KeyCommand::Hide => {
                p.do_hide();
                true
            }
            KeyCommand::Show => p.do_show(),
            KeyCommand::Navigate(direction) => p.do_navigate(direction),
            KeyCommand::CommitActive => p.do_commit_active(),
            KeyCommand::CommitInput { .. } => p.do_commit_input(),
            KeyCommand::BackspaceUnselect => p.do_backspace_unselect(),
        });

        let pass_through = matches!(
            command,
            KeyCommand::CommitInput {
                pass_through_on_failure: true
            }
        ) && !succeeded;

        trace!(?command, succeeded, pass_through, "key handled");
        KeyOutcome {
            command: Some(command),
            succeeded,
            pass_through,
        }
    }

    /// Feed a raw input event.
    ///
    /// Keys go through [`handle_key`](Self::handle_key); keys it lets through
    /// get their text-field behavior (typing and deleting). Pastes append to
    /// the input and focus changes map to [`focus`](Self::focus) and
    /// [`blur`](Self::blur). Returns `true` if the picker consumed the event.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => {
                if !key.is_actionable() {
                    return false;
                }
                if !self.handle_key(key).pass_through {
                    return true;
                }
                self.apply_text_key(key)
            }
            Event::Paste(text) => {
                self.insert_str(text);
                true
            }
            Event::FocusGained => {
                self.focus();
                true
            }
            Event::FocusLost => {
                self.blur();
                true
            }
        }
    }

    fn apply_text_key(&mut self, key: &KeyEvent) -> bool {
        if key.is_chord() {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => self.delete_back(),
            _ => false,
        }
    }

    // --- Views ---

    /// Configuration.
    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// Catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected values in selection order.
    pub fn selected_values(&self) -> &[String] {
        self.selection.as_slice()
    }

    /// Selected entries in selection order.
    pub fn selected_entries(&self) -> Vec<&Entry> {
        self.selection
            .iter()
            .filter_map(|value| self.catalog.get(value))
            .collect()
    }

    /// Input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether the input is focused.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the autocomplete list is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Candidate rows for the current input.
    ///
    /// Kept current even while hidden; renderers should check
    /// [`is_visible`](Self::is_visible).
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Highlighted row index.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Highlighted row.
    pub fn active_candidate(&self) -> Option<&Candidate> {
        self.active.and_then(|index| self.candidates.get(index))
    }

    /// Whether the "no results" message applies.
    pub fn no_results(&self) -> bool {
        self.no_results
    }

    /// Whether the autocomplete list is enabled at all.
    pub fn has_autocomplete(&self) -> bool {
        self.config.has_autocomplete()
    }

    /// Placeholder shown in the input; empty once something is selected.
    pub fn input_placeholder(&self) -> &str {
        if self.selection.is_empty() {
            self.config.placeholder()
        } else {
            ""
        }
    }

    /// Input width in columns: the wider of the text (or placeholder when
    /// empty) and one column, plus one for the caret.
    pub fn input_size(&self) -> usize {
        let shown = if self.input.is_empty() {
            self.input_placeholder()
        } else {
            &self.input
        };
        shown.width().max(1) + 1
    }

    /// Selected text in single mode, or the placeholder.
    pub fn single_text(&self) -> &str {
        self.selection
            .first()
            .and_then(|value| self.catalog.get(value))
            .map_or(self.config.placeholder(), Entry::text)
    }

    /// Whether the single-mode clear control shows.
    ///
    /// Needs a placeholder to fall back to, so clearing never leaves the field
    /// blank.
    pub fn is_single_clear_visible(&self) -> bool {
        self.config.is_single()
            && self.config.allow_clear()
            && !self.config.placeholder().is_empty()
            && !self.selection.is_empty()
    }

    /// Selected values joined with the string-input separator.
    pub fn string_input_value(&self) -> String {
        self.selection.join(self.config.string_input_separator())
    }

    /// Whether the joined string field is submitted.
    ///
    /// Also true while nothing is selected, so an empty selection still
    /// submits the field.
    pub fn is_string_input_enabled(&self) -> bool {
        self.config.use_string_input() || self.selection.is_empty()
    }

    /// Native multi-select mirror of the catalog.
    pub fn mirror_options(&self) -> Vec<MirrorOption> {
        self.catalog
            .iter()
            .map(|entry| MirrorOption {
                text: entry.text().to_string(),
                value: entry.value().to_string(),
                selected: self.selection.contains(entry.value()),
            })
            .collect()
    }

    /// What the host form submits.
    pub fn form_value(&self) -> FormValue {
        if self.config.use_string_input() {
            FormValue::Joined(self.string_input_value())
        } else {
            FormValue::Values(self.selection.as_slice().to_vec())
        }
    }

    fn interpreter_state(&self) -> InterpreterState {
        InterpreterState {
            visible: self.visible,
            active_index: self.active,
            input_empty: self.input.is_empty(),
            selection_empty: self.selection.is_empty(),
            single: self.config.is_single(),
            up_at_top_hides: self.config.navigation().up_at_top_hides,
        }
    }

    // --- Command bodies ---

    fn do_select(&mut self, entry: &Entry) -> bool {
        let value = entry.value();
        if entry.is_preview() || self.selection.contains(value) {
            return false;
        }
        if entry.is_new() {
            if !self.config.allow_new() || self.catalog.contains_value(value) {
                return false;
            }
        } else if !self.catalog.contains_value(value) {
            return false;
        }

        if self.config.is_single() {
            self.clear_selection();
        }
        if entry.is_new() {
            self.catalog.insert(entry.clone());
        }
        self.selection.push(value);
        self.bump();
        debug!(value, created = entry.is_new(), "selected");

        self.replace_input("");
        self.set_focused(true);
        self.do_hide();
        self.refresh();
        true
    }

    fn do_unselect(&mut self, value: &str) -> bool {
        if !self.selection.remove(value) {
            return false;
        }
        if self.catalog.get(value).is_some_and(Entry::is_new) {
            self.catalog.remove(value);
        }
        self.bump();
        debug!(value, "unselected");
        self.refresh();
        true
    }

    fn do_remove(&mut self, value: &str) -> bool {
        if !self.do_unselect(value) {
            return false;
        }
        self.set_focused(true);
        true
    }

    fn clear_selection(&mut self) {
        let values: Vec<String> = self.selection.as_slice().to_vec();
        for value in values {
            self.do_unselect(&value);
        }
    }

    fn do_commit_active(&mut self) -> bool {
        let Some(candidate) = self.active_candidate() else {
            return false;
        };
        if candidate.is_preview() && !self.config.allow_new() {
            return false;
        }
        let entry = candidate.entry().clone().promote();
        if !self.do_select(&entry) {
            return false;
        }
        self.do_hide();
        true
    }

    fn do_commit_input(&mut self) -> bool {
        let text = self.input.trim();
        if text.is_empty() {
            return false;
        }
        let entry = match self.catalog.find_by_text(text) {
            Some(existing) => existing.clone(),
            None if self.config.allow_new() => {
                Entry::created(text, self.config.make_new_value(text))
            }
            None => return false,
        };
        self.do_select(&entry)
    }

    fn do_backspace_unselect(&mut self) -> bool {
        if self.config.is_single() || !self.input.is_empty() {
            return false;
        }
        let Some(value) = self.selection.last().map(str::to_string) else {
            return false;
        };
        let removed = self.catalog.get(&value).cloned();
        if !self.do_unselect(&value) {
            return false;
        }
        if let Some(entry) = removed
            && entry.is_new()
            && self.config.allow_new()
        {
            self.do_set_input(entry.text());
        }
        true
    }

    fn do_set_input(&mut self, text: &str) {
        self.replace_input(text);
        self.set_focused(true);
        self.refresh();
        self.open_list();
    }

    fn do_show(&mut self) -> bool {
        self.refresh();
        self.open_list();
        self.visible
    }

    /// Show the list if it has anything to show and reset the highlight.
    fn open_list(&mut self) {
        let visible = !self.candidates.is_empty() || self.no_results;
        self.set_visible(visible);
        let active = if visible {
            initial_active_index(&self.candidates)
        } else {
            None
        };
        self.apply_active(active);
    }

    fn do_hide(&mut self) {
        self.set_visible(false);
        self.apply_active(None);
        if self.config.is_single() {
            self.do_blur();
        }
    }

    fn do_blur(&mut self) {
        self.set_focused(false);
        self.replace_input("");
        self.set_visible(false);
        self.refresh();
    }

    fn do_navigate(&mut self, direction: Direction) -> bool {
        if !self.visible || self.candidates.is_empty() {
            return false;
        }
        let current = self.active.unwrap_or(0);
        let navigation = self.config.navigation();
        if direction == Direction::Up && current == 0 && navigation.up_at_top_hides {
            self.do_hide();
            return true;
        }
        let next = step_index(
            &self.candidates,
            current,
            direction,
            navigation.skip_selected,
        );
        self.apply_active(Some(next));
        true
    }

    fn do_hover(&mut self, index: usize) -> bool {
        if !self.visible || index >= self.candidates.len() {
            return false;
        }
        self.apply_active(Some(index));
        true
    }

    // --- State plumbing ---

    /// Run a command, then notify listeners if it changed anything.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn run<R>(&mut self, command: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        let _span = debug_span!("picker_command", command).entered();
        let before = self.revision;
        let result = f(self);
        if self.revision != before {
            self.notify();
        }
        result
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in &mut listeners {
            listener(self);
        }
        self.listeners = listeners;
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn replace_input(&mut self, text: &str) {
        if self.input != text {
            self.input.clear();
            self.input.push_str(text);
            self.bump();
        }
    }

    fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            self.focused = focused;
            self.bump();
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.bump();
        }
    }

    fn apply_active(&mut self, active: Option<usize>) {
        let active = active.filter(|&index| index < self.candidates.len());
        if self.active != active {
            self.active = active;
            self.bump();
        }
        for (index, candidate) in self.candidates.iter_mut().enumerate() {
            candidate.set_active(Some(index) == active);
        }
    }

    /// Recompute candidates, keeping the highlight on the same row if it
    /// survives.
    fn refresh(&mut self) {
        let previous = self
            .active_candidate()
            .map(|c| (c.value().to_string(), c.is_preview()));

        let filtered = filter_candidates(&self.catalog, &self.selection, &self.input, &self.config);
        self.candidates = filtered.candidates;
        self.no_results = filtered.no_results;

        if self.visible && self.candidates.is_empty() && !self.no_results {
            self.set_visible(false);
        }

        let active = if self.visible {
            previous
                .and_then(|(value, preview)| {
                    self.candidates
                        .iter()
                        .position(|c| c.value() == value && c.is_preview() == preview)
                })
                .or_else(|| initial_active_index(&self.candidates))
        } else {
            None
        };
        self.apply_active(active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, NavigationConfig};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tagpick_core::event::{KeyEventKind, Modifiers};

    fn fruit(config: PickerConfig) -> Picker {
        Picker::builder(config)
            .with_catalog([("Apple", "a"), ("Banana", "b"), ("Cherry", "c")])
            .build()
            .unwrap()
    }

    fn press(picker: &mut Picker, code: KeyCode) -> KeyOutcome {
        picker.handle_key(&KeyEvent::new(code))
    }

    fn candidate_texts(picker: &Picker) -> Vec<String> {
        picker
            .candidates()
            .iter()
            .map(|c| c.text().to_string())
            .collect()
    }

    fn assert_consistent(picker: &Picker) {
        for value in picker.selected_values() {
            assert!(picker.catalog().contains_value(value), "orphan {value}");
        }
        for entry in picker.catalog() {
            if entry.is_new() {
                assert!(picker.selection().contains(entry.value()));
            }
            assert!(!entry.is_preview());
        }
        if picker.is_visible() {
            assert!(!picker.candidates().is_empty() || picker.no_results());
        }
    }

    // --- Construction ---

    #[test]
    fn selected_values_in_single_mode_is_an_error() {
        let err = Picker::builder(PickerConfig::new().with_mode(Mode::Single))
            .with_catalog(["a"])
            .with_selected_values(["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, PickerError::SelectedValuesInSingleMode);
    }

    #[test]
    fn value_in_multi_mode_is_an_error() {
        let err = Picker::builder(PickerConfig::new())
            .with_value("a")
            .build()
            .unwrap_err();
        assert_eq!(err, PickerError::ValueInMultiMode);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Picker::builder(PickerConfig::new().with_new_value_format("x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, PickerError::ValueFormatMissingPlaceholder { .. }));
    }

    #[test]
    fn unknown_initial_values_are_dropped() {
        let picker = Picker::builder(PickerConfig::new())
            .with_catalog([("Apple", "a")])
            .with_selected_values(["a", "zz", "a"])
            .build()
            .unwrap();
        assert_eq!(picker.selected_values(), ["a".to_string()]);
    }

    #[test]
    fn catalog_derived_from_selection_disables_autocomplete() {
        let mut picker = Picker::builder(PickerConfig::new())
            .with_selected_values(["x", "y"])
            .build()
            .unwrap();
        assert_eq!(picker.catalog().len(), 2);
        assert!(!picker.has_autocomplete());
        picker.set_input("x");
        assert!(picker.candidates().is_empty());
        assert!(!picker.is_visible());
    }

    #[test]
    fn single_mode_auto_selects_first_without_placeholder() {
        let picker = fruit(PickerConfig::new().with_mode(Mode::Single));
        assert_eq!(picker.selected_values(), ["a".to_string()]);
        assert_eq!(picker.single_text(), "Apple");

        let with_placeholder =
            fruit(PickerConfig::new().with_mode(Mode::Single).with_placeholder("Pick"));
        assert!(with_placeholder.selection().is_empty());
        assert_eq!(with_placeholder.single_text(), "Pick");
    }

    #[test]
    fn single_mode_initial_value() {
        let picker = Picker::builder(PickerConfig::new().with_mode(Mode::Single))
            .with_catalog([("Apple", "a"), ("Banana", "b")])
            .with_value("b")
            .build()
            .unwrap();
        assert_eq!(picker.single_text(), "Banana");
    }

    // --- Filtering ---

    #[test]
    fn filtering_prepends_preview() {
        let mut picker = Picker::builder(PickerConfig::new())
            .with_catalog([("Apple", "a"), ("Banana", "b")])
            .build()
            .unwrap();
        picker.set_input("an");
        assert_eq!(candidate_texts(&picker), vec!["an", "Banana"]);
        assert!(picker.candidates()[0].is_preview());
        assert_eq!(picker.candidates()[0].value(), "an");
        assert_eq!(picker.active_index(), Some(1));
        assert!(picker.candidates()[1].is_active());
    }

    #[test]
    fn filtering_without_allow_new_has_no_preview() {
        let mut picker = fruit(PickerConfig::new().with_allow_new(false));
        picker.set_input("an");
        assert_eq!(candidate_texts(&picker), vec!["Banana"]);
        assert_eq!(picker.active_index(), Some(0));
    }

    #[test]
    fn no_results_keeps_list_visible() {
        let mut picker = fruit(PickerConfig::new().with_allow_new(false));
        picker.set_input("zzz");
        assert!(picker.is_visible());
        assert!(picker.no_results());
        assert!(picker.candidates().is_empty());
        assert_eq!(picker.active_index(), None);
    }

    // --- Selecting ---

    #[test]
    fn select_is_idempotent() {
        let mut picker = fruit(PickerConfig::new());
        let apple = picker.catalog().get("a").unwrap().clone();
        assert!(picker.select(&apple));
        let revision = picker.revision();
        let values = picker.selected_values().to_vec();
        assert!(!picker.select(&apple));
        assert_eq!(picker.selected_values(), values.as_slice());
        assert_eq!(picker.revision(), revision);
    }

    #[test]
    fn select_rejects_preview_and_unknown() {
        let mut picker = fruit(PickerConfig::new());
        assert!(!picker.select(&Entry::preview("x", "x")));
        assert!(!picker.select(&Entry::new("Ghost", "g")));
        assert!(picker.selection().is_empty());
    }

    #[test]
    fn select_new_requires_allow_new() {
        let mut picker = fruit(PickerConfig::new().with_allow_new(false));
        assert!(!picker.select(&Entry::created("kiwi", "kiwi")));
        assert_eq!(picker.catalog().len(), 3);
    }

    #[test]
    fn select_new_rejects_value_collision() {
        let mut picker = fruit(PickerConfig::new());
        assert!(!picker.select(&Entry::created("other", "a")));
    }

    #[test]
    fn select_clears_input_and_hides() {
        let mut picker = fruit(PickerConfig::new());
        picker.set_input("Ch");
        assert!(picker.is_visible());
        assert!(picker.commit_active());
        assert_eq!(picker.input(), "");
        assert!(!picker.is_visible());
        assert!(picker.is_focused());
        assert_eq!(picker.selected_values(), ["c".to_string()]);
    }

    #[test]
    fn commit_input_round_trip() {
        let mut picker = Picker::builder(PickerConfig::new())
            .with_catalog(Vec::<EntrySpec>::new())
            .build()
            .unwrap();
        picker.set_input("foo");
        assert!(picker.commit_input());
        let selected = picker.selected_entries();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].text(), "foo");
        assert!(selected[0].is_new());

        let foo = selected[0].clone();
        assert!(picker.unselect(&foo));
        assert!(picker.catalog().is_empty());
        assert_consistent(&picker);
    }

    #[test]
    fn commit_input_trims_and_finds_existing() {
        let mut picker = fruit(PickerConfig::new());
        picker.set_input("  Apple ");
        assert!(picker.commit_input());
        assert_eq!(picker.selected_values(), ["a".to_string()]);
        assert_eq!(picker.catalog().len(), 3);
    }

    #[test]
    fn commit_input_fails_on_blank_or_unknown_without_allow_new() {
        let mut picker = fruit(PickerConfig::new().with_allow_new(false));
        picker.set_input("   ");
        assert!(!picker.commit_input());
        picker.set_input("kiwi");
        assert!(!picker.commit_input());
        assert!(picker.selection().is_empty());
    }

    #[test]
    fn commit_input_uses_value_format() {
        let mut picker = fruit(PickerConfig::new().with_new_value_format("new-%value%"));
        picker.set_input("kiwi");
        assert!(picker.commit_input());
        assert_eq!(picker.selected_values(), ["new-kiwi".to_string()]);
        assert_eq!(picker.catalog().get("new-kiwi").unwrap().text(), "kiwi");
    }

    #[test]
    fn commit_active_promotes_preview() {
        let mut picker = fruit(PickerConfig::new());
        picker.set_input("kiwi");
        assert_eq!(picker.active_candidate().unwrap().text(), "kiwi");
        assert!(picker.commit_active());
        let kiwi = picker.catalog().get("kiwi").unwrap();
        assert!(kiwi.is_new());
        assert!(!kiwi.is_preview());
        assert_consistent(&picker);
    }

    #[test]
    fn commit_active_without_highlight_fails() {
        let mut picker = fruit(PickerConfig::new());
        assert!(!picker.commit_active());
    }

    #[test]
    fn unselecting_predefined_keeps_catalog() {
        let mut picker = fruit(PickerConfig::new());
        assert!(picker.select_value("b"));
        assert!(picker.remove_selected("b"));
        assert!(!picker.remove_selected("b"));
        assert_eq!(picker.catalog().len(), 3);
    }

    #[test]
    fn host_entry_survives_unselect_of_created_twin() {
        let mut picker = fruit(PickerConfig::new());
        picker.set_input("kiwi");
        assert!(picker.commit_input());
        assert!(picker.catalog().get("kiwi").unwrap().is_new());

        assert_eq!(picker.extend_catalog([("kiwi", "kiwi")]), 1);
        assert!(picker.remove_selected("kiwi"));
        let kiwi = picker.catalog().get("kiwi").unwrap();
        assert!(!kiwi.is_new());
        assert_eq!(picker.catalog().len(), 4);
    }

    #[test]
    fn taken_value_offers_no_preview() {
        let mut picker = Picker::builder(PickerConfig::new())
            .with_catalog([("Rust", "rs")])
            .build()
            .unwrap();
        picker.set_input("rs");
        assert!(picker.candidates().iter().all(|c| !c.is_preview()));
        assert!(!picker.is_visible());
        assert!(!press(&mut picker, KeyCode::Enter).succeeded);
        assert!(picker.selection().is_empty());
    }

    #[test]
    fn removing_a_chip_focuses_the_input() {
        let mut picker = fruit(PickerConfig::new());
        picker.select_value("a");
        picker.blur();
        assert!(!picker.is_focused());
        assert!(picker.remove_selected("a"));
        assert!(picker.is_focused());
        assert!(!picker.remove_selected("a"));
    }

    #[test]
    fn extend_catalog_is_append_only() {
        let mut picker = fruit(PickerConfig::new());
        picker.select_value("a");
        let added = picker.extend_catalog([("Apricot", "a"), ("Date", "d")]);
        assert_eq!(added, 1);
        assert_eq!(picker.catalog().get("a").unwrap().text(), "Apple");
        assert_eq!(picker.selected_values(), ["a".to_string()]);
    }

    // --- Single mode ---

    #[test]
    fn single_mode_replaces_selection() {
        let mut picker = fruit(PickerConfig::new().with_mode(Mode::Single));
        assert!(picker.select_value("b"));
        assert_eq!(picker.selected_values(), ["b".to_string()]);
        assert!(picker.select_value("c"));
        assert_eq!(picker.selected_values(), ["c".to_string()]);
    }

    #[test]
    fn single_mode_hide_blurs() {
        let mut picker = fruit(PickerConfig::new().with_mode(Mode::Single));
        picker.set_input("Ch");
        assert!(picker.is_focused());
        press(&mut picker, KeyCode::Escape);
        assert!(!picker.is_focused());
        assert_eq!(picker.input(), "");
    }

    #[test]
    fn single_mode_set_value_and_clear() {
        let mut picker = fruit(
            PickerConfig::new()
                .with_mode(Mode::Single)
                .with_placeholder("Pick a fruit")
                .with_allow_clear(true),
        );
        assert!(picker.set_value(Some("c")));
        assert_eq!(picker.single_text(), "Cherry");
        assert!(!picker.set_value(Some("zz")));
        assert!(picker.is_single_clear_visible());
        assert!(picker.clear_single());
        assert!(picker.selection().is_empty());
        assert_eq!(picker.single_text(), "Pick a fruit");
        assert!(!picker.clear_single());
    }

    #[test]
    fn clear_single_requires_placeholder() {
        let mut picker = fruit(
            PickerConfig::new()
                .with_mode(Mode::Single)
                .with_allow_clear(true),
        );
        assert_eq!(picker.single_text(), "Apple");
        assert!(!picker.is_single_clear_visible());
        assert!(!picker.clear_single());
        assert_eq!(picker.selected_values(), ["a".to_string()]);
    }

    #[test]
    fn clear_single_requires_allow_clear() {
        let mut picker = fruit(PickerConfig::new().with_mode(Mode::Single));
        assert!(!picker.is_single_clear_visible());
        assert!(!picker.clear_single());
        assert_eq!(picker.selection().len(), 1);
    }

    #[test]
    fn set_value_fails_in_multi_mode() {
        let mut picker = fruit(PickerConfig::new());
        assert!(!picker.set_value(Some("a")));
    }

    // --- Keyboard ---

    #[test]
    fn arrow_down_shows_with_first_row_active() {
        let mut picker = fruit(PickerConfig::new());
        assert!(!picker.is_visible());
        let outcome = press(&mut picker, KeyCode::Down);
        assert_eq!(outcome.command, Some(KeyCommand::Show));
        assert!(!outcome.pass_through);
        assert!(picker.is_visible());
        assert_eq!(picker.active_index(), Some(0));
    }

    #[test]
    fn arrows_wrap() {
        let mut picker = fruit(PickerConfig::new());
        press(&mut picker, KeyCode::Down);
        press(&mut picker, KeyCode::Up);
        assert_eq!(picker.active_index(), Some(2));
        press(&mut picker, KeyCode::Down);
        assert_eq!(picker.active_index(), Some(0));
    }

    #[test]
    fn arrow_up_at_top_hides_when_configured() {
        let mut picker = fruit(PickerConfig::new().with_navigation(NavigationConfig {
            up_at_top_hides: true,
            ..Default::default()
        }));
        press(&mut picker, KeyCode::Down);
        assert!(picker.is_visible());
        press(&mut picker, KeyCode::Up);
        assert!(!picker.is_visible());
    }

    #[test]
    fn navigation_skips_selected_when_configured() {
        let mut picker = fruit(PickerConfig::new().with_navigation(NavigationConfig {
            skip_selected: true,
            ..Default::default()
        }));
        picker.select_value("b");
        press(&mut picker, KeyCode::Down);
        assert_eq!(picker.active_index(), Some(0));
        press(&mut picker, KeyCode::Down);
        assert_eq!(picker.active_index(), Some(2));
    }

    #[test]
    fn enter_commits_highlighted_row() {
        let mut picker = fruit(PickerConfig::new());
        press(&mut picker, KeyCode::Down);
        press(&mut picker, KeyCode::Down);
        let outcome = press(&mut picker, KeyCode::Enter);
        assert!(outcome.succeeded);
        assert_eq!(picker.selected_values(), ["b".to_string()]);
    }

    #[test]
    fn tab_passes_through_only_when_nothing_committed() {
        let mut picker = fruit(PickerConfig::new());
        let outcome = press(&mut picker, KeyCode::Tab);
        assert!(outcome.pass_through);

        picker.set_input("kiwi");
        let outcome = press(&mut picker, KeyCode::Tab);
        assert!(!outcome.pass_through);
        assert_eq!(picker.selected_values(), ["kiwi".to_string()]);
    }

    #[test]
    fn comma_commits_typed_text() {
        let mut picker = fruit(PickerConfig::new());
        picker.set_input("kiwi");
        let outcome = press(&mut picker, KeyCode::Char(','));
        assert!(!outcome.pass_through);
        assert!(outcome.succeeded);
        assert_eq!(picker.selected_values(), ["kiwi".to_string()]);
    }

    #[test]
    fn backspace_restores_new_entry_text() {
        let mut picker = fruit(PickerConfig::new());
        picker.select_value("a");
        picker.set_input("kiwi");
        picker.commit_input();
        assert_eq!(picker.input(), "");

        let outcome = press(&mut picker, KeyCode::Backspace);
        assert_eq!(outcome.command, Some(KeyCommand::BackspaceUnselect));
        assert_eq!(picker.selected_values(), ["a".to_string()]);
        assert_eq!(picker.input(), "kiwi");
        assert!(picker.catalog().get("kiwi").is_none());

        picker.set_input("");
        press(&mut picker, KeyCode::Backspace);
        assert!(picker.selection().is_empty());
        assert_eq!(picker.input(), "");
    }

    #[test]
    fn backspace_with_text_passes_through() {
        let mut picker = fruit(PickerConfig::new());
        picker.select_value("a");
        picker.set_input("x");
        let outcome = press(&mut picker, KeyCode::Backspace);
        assert!(outcome.pass_through);
        assert_eq!(picker.selected_values(), ["a".to_string()]);
    }

    #[test]
    fn releases_are_ignored() {
        let mut picker = fruit(PickerConfig::new());
        let release = KeyEvent::new(KeyCode::Down).with_kind(KeyEventKind::Release);
        assert!(!picker.handle_event(&Event::Key(release)));
        assert!(!picker.is_visible());
    }

    // --- Events and text editing ---

    #[test]
    fn typing_through_events() {
        let mut picker = fruit(PickerConfig::new());
        for c in "Ban".chars() {
            assert!(picker.handle_event(&Event::Key(KeyEvent::char(c))));
        }
        assert_eq!(picker.input(), "Ban");
        assert!(picker.handle_event(&Event::Key(KeyEvent::new(KeyCode::Backspace))));
        assert_eq!(picker.input(), "Ba");
        assert!(picker.handle_event(&Event::Key(KeyEvent::new(KeyCode::Enter))));
        assert_eq!(picker.selected_values(), ["b".to_string()]);
    }

    #[test]
    fn ctrl_chars_are_not_typed() {
        let mut picker = fruit(PickerConfig::new());
        let ctrl_a = KeyEvent::char('a').with_modifiers(Modifiers::CTRL);
        assert!(!picker.handle_event(&Event::Key(ctrl_a)));
        assert_eq!(picker.input(), "");
    }

    #[test]
    fn paste_appends() {
        let mut picker = fruit(PickerConfig::new());
        picker.insert_char('C');
        picker.handle_event(&Event::Paste("her".into()));
        assert_eq!(picker.input(), "Cher");
    }

    #[test]
    fn delete_back_removes_whole_grapheme() {
        let mut picker = fruit(PickerConfig::new());
        picker.insert_str("ae\u{301}");
        assert!(picker.delete_back());
        assert_eq!(picker.input(), "a");
        assert!(picker.delete_back());
        assert!(!picker.delete_back());
    }

    #[test]
    fn blur_discards_input() {
        let mut picker = fruit(PickerConfig::new());
        picker.set_input("kiwi");
        picker.handle_event(&Event::FocusLost);
        assert_eq!(picker.input(), "");
        assert!(!picker.is_visible());
        assert!(!picker.is_focused());
        assert!(picker.selection().is_empty());
    }

    // --- Pointer ---

    #[test]
    fn hover_and_click() {
        let mut picker = fruit(PickerConfig::new());
        assert!(!picker.hover_candidate(0));
        assert!(picker.toggle_autocomplete());
        assert!(picker.is_focused());
        assert!(picker.hover_candidate(2));
        assert_eq!(picker.active_candidate().unwrap().value(), "c");
        assert!(!picker.hover_candidate(9));
        assert!(picker.click_candidate(1));
        assert_eq!(picker.selected_values(), ["b".to_string()]);
    }

    #[test]
    fn toggle_closes_when_open() {
        let mut picker = fruit(PickerConfig::new());
        assert!(picker.toggle_autocomplete());
        assert!(!picker.toggle_autocomplete());
        assert!(!picker.is_visible());
    }

    // --- Views ---

    #[test]
    fn placeholder_and_input_size() {
        let mut picker = fruit(PickerConfig::new().with_placeholder("Add"));
        assert_eq!(picker.input_placeholder(), "Add");
        assert_eq!(picker.input_size(), 4);
        picker.select_value("a");
        assert_eq!(picker.input_placeholder(), "");
        assert_eq!(picker.input_size(), 2);
        picker.set_input("日本");
        assert_eq!(picker.input_size(), 5);
    }

    #[test]
    fn string_input_views() {
        let mut picker = fruit(PickerConfig::new().with_string_input(";"));
        assert!(picker.is_string_input_enabled());
        picker.select_value("a");
        picker.select_value("c");
        assert_eq!(picker.string_input_value(), "a;c");
        assert_eq!(picker.form_value(), FormValue::Joined("a;c".into()));
    }

    #[test]
    fn string_input_disabled_once_selected() {
        let mut picker = fruit(PickerConfig::new());
        assert!(picker.is_string_input_enabled());
        picker.select_value("b");
        assert!(!picker.is_string_input_enabled());
        assert_eq!(picker.form_value(), FormValue::Values(vec!["b".into()]));
    }

    #[test]
    fn mirror_marks_selected() {
        let mut picker = fruit(PickerConfig::new());
        picker.select_value("b");
        let mirror = picker.mirror_options();
        assert_eq!(mirror.len(), 3);
        assert!(!mirror[0].selected);
        assert!(mirror[1].selected);
    }

    // --- Listeners ---

    #[test]
    fn listeners_see_consistent_state() {
        let mut picker = fruit(PickerConfig::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = picker.subscribe(move |p| {
            sink.borrow_mut()
                .push((p.input().to_string(), p.selected_values().to_vec(), p.is_visible()));
        });

        picker.set_input("kiwi");
        picker.commit_input();
        {
            let seen = seen.borrow();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0], ("kiwi".to_string(), vec![], true));
            assert_eq!(seen[1], (String::new(), vec!["kiwi".to_string()], false));
        }

        assert!(!picker.commit_input());
        assert_eq!(seen.borrow().len(), 2);

        assert!(picker.unsubscribe(id));
        assert!(!picker.unsubscribe(id));
        picker.set_input("x");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn commands_keep_invariants() {
        let mut picker = fruit(PickerConfig::new().with_hide_selected(true));
        picker.set_input("kiwi");
        picker.commit_active();
        picker.select_value("a");
        assert_consistent(&picker);
        picker.set_input("");
        press(&mut picker, KeyCode::Backspace);
        assert_consistent(&picker);
        picker.set_input("e");
        assert_consistent(&picker);
        assert_eq!(candidate_texts(&picker), vec!["e", "Apple", "Cherry"]);
    }
}
