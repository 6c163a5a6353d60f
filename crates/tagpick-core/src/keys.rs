#![forbid(unsafe_code)]

//! The picker key table.
//!
//! The keyboard interpreter never matches on concrete keys directly; it asks a
//! [`KeyTable`] which [`KeyRole`] a key plays. The table is a plain constant
//! value handed to each picker at construction, so hosts can rebind the commit
//! separator (for example `;` instead of `,`) without any global state.
//!
//! Hosts that only have legacy numeric key codes (DOM `keyCode`, some GUI
//! toolkits) can translate them with [`KeyTable::decode_legacy`].

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// The part a key plays in the picker keyboard protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Close the autocomplete list.
    Escape,
    /// Move the highlight up (or open the list).
    Up,
    /// Move the highlight down (or open the list).
    Down,
    /// Commit the highlighted candidate or the typed text.
    Enter,
    /// Commit the typed text; moves focus on when nothing was committed.
    Tab,
    /// Remove the last selected entry when the input is empty.
    Backspace,
    /// Commit the typed text (unless shifted).
    Separator,
}

/// Mapping from key codes to picker roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTable {
    /// Key that closes the list.
    pub escape: KeyCode,
    /// Key that moves up.
    pub up: KeyCode,
    /// Key that moves down.
    pub down: KeyCode,
    /// Key that commits.
    pub enter: KeyCode,
    /// Key that commits and otherwise moves focus.
    pub tab: KeyCode,
    /// Key that removes the last selection.
    pub backspace: KeyCode,
    /// Character that commits typed text when pressed without shift.
    pub separator: char,
}

/// Legacy numeric key codes understood by [`KeyTable::decode_legacy`].
pub const LEGACY_KEY_CODES: [(u32, KeyCode); 7] = [
    (38, KeyCode::Up),
    (40, KeyCode::Down),
    (13, KeyCode::Enter),
    (9, KeyCode::Tab),
    (8, KeyCode::Backspace),
    (27, KeyCode::Escape),
    (188, KeyCode::Char(',')),
];

impl KeyTable {
    /// The standard bindings: arrows, Enter, Tab, Backspace, Escape and `,`.
    pub const DEFAULT: Self = Self {
        escape: KeyCode::Escape,
        up: KeyCode::Up,
        down: KeyCode::Down,
        enter: KeyCode::Enter,
        tab: KeyCode::Tab,
        backspace: KeyCode::Backspace,
        separator: ',',
    };

    /// Use a different commit separator (builder).
    #[must_use]
    pub const fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Which role `code` plays, if any.
    #[must_use]
    pub fn role_of(&self, code: KeyCode) -> Option<KeyRole> {
        if code == self.escape {
            Some(KeyRole::Escape)
        } else if code == self.up {
            Some(KeyRole::Up)
        } else if code == self.down {
            Some(KeyRole::Down)
        } else if code == self.enter {
            Some(KeyRole::Enter)
        } else if code == self.tab {
            Some(KeyRole::Tab)
        } else if code == self.backspace {
            Some(KeyRole::Backspace)
        } else if code == KeyCode::Char(self.separator) {
            Some(KeyRole::Separator)
        } else {
            None
        }
    }

    /// Translate a legacy numeric key code plus shift flag into a key event.
    ///
    /// Returns `None` for codes outside [`LEGACY_KEY_CODES`]; such keys are
    /// never handled by the picker and should keep their native behavior.
    /// Code 188 decodes to this table's separator.
    #[must_use]
    pub fn decode_legacy(&self, code: u32, shift: bool) -> Option<KeyEvent> {
        let (_, key) = LEGACY_KEY_CODES.iter().find(|(c, _)| *c == code)?;
        let key = match key {
            KeyCode::Char(_) => KeyCode::Char(self.separator),
            other => *other,
        };
        let modifiers = if shift {
            Modifiers::SHIFT
        } else {
            Modifiers::empty()
        };
        Some(KeyEvent::new(key).with_modifiers(modifiers))
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}
