#![forbid(unsafe_code)]

//! Keyboard command interpreter.
//!
//! Maps a key press plus a snapshot of picker state to the command the
//! picker should run. The mapping is pure; executing the command and deciding
//! whether the key keeps its native behavior happens in
//! [`Picker::handle_key`](crate::Picker::handle_key).
//!
//! | Key | When | Command |
//! |---|---|---|
//! | Escape | always | hide |
//! | Up | visible, first row highlighted, `up_at_top_hides` | hide |
//! | Up / Down | hidden | show |
//! | Up / Down | visible | navigate |
//! | Enter | visible with a highlighted row | commit highlighted |
//! | Enter / Tab / unshifted separator | otherwise | commit typed text |
//! | Backspace | empty input, non-empty multi selection | unselect last |
//!
//! Any other key is not handled and keeps its native behavior.

use tagpick_core::event::{KeyEvent, Modifiers};
use tagpick_core::keys::{KeyRole, KeyTable};

use crate::autocomplete::Direction;

/// Picker state the interpreter needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpreterState {
    /// Autocomplete list is shown.
    pub visible: bool,
    /// Highlighted row, if any.
    pub active_index: Option<usize>,
    /// Input buffer is empty.
    pub input_empty: bool,
    /// Selection is empty.
    pub selection_empty: bool,
    /// Picker is in single mode.
    pub single: bool,
    /// Up on the first row hides the list.
    pub up_at_top_hides: bool,
}

/// A command decided by [`interpret`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    /// Close the autocomplete list.
    Hide,
    /// Open the autocomplete list.
    Show,
    /// Move the highlight.
    Navigate(Direction),
    /// Commit the highlighted row.
    CommitActive,
    /// Commit the typed text. When `pass_through_on_failure` is set and
    /// nothing gets committed, the key keeps its native behavior.
    CommitInput {
        /// Let the key through if the commit fails (Tab moves focus).
        pass_through_on_failure: bool,
    },
    /// Remove the most recent selection.
    BackspaceUnselect,
}

/// Decide what a key press does. `None` means the picker ignores the key.
pub fn interpret(keys: &KeyTable, key: &KeyEvent, state: &InterpreterState) -> Option<KeyCommand> {
    let role = keys.role_of(key.code)?;
    match role {
        KeyRole::Escape => Some(KeyCommand::Hide),
        KeyRole::Up | KeyRole::Down if !state.visible => Some(KeyCommand::Show),
        KeyRole::Up if state.up_at_top_hides && state.active_index == Some(0) => {
            Some(KeyCommand::Hide)
        }
        KeyRole::Up => Some(KeyCommand::Navigate(Direction::Up)),
        KeyRole::Down => Some(KeyCommand::Navigate(Direction::Down)),
        KeyRole::Enter if state.visible && state.active_index.is_some() => {
            Some(KeyCommand::CommitActive)
        }
        KeyRole::Enter => Some(KeyCommand::CommitInput {
            pass_through_on_failure: false,
        }),
        KeyRole::Tab => Some(KeyCommand::CommitInput {
            pass_through_on_failure: true,
        }),
        KeyRole::Separator if key.has(Modifiers::SHIFT) || key.is_chord() => None,
        KeyRole::Separator => Some(KeyCommand::CommitInput {
            pass_through_on_failure: false,
        }),
        KeyRole::Backspace
            if state.input_empty && !state.selection_empty && !state.single =>
        {
            Some(KeyCommand::BackspaceUnselect)
        }
        KeyRole::Backspace => None,
    }
}
