#![forbid(unsafe_code)]

//! Input events a picker understands.
//!
//! The picker only cares about keys, pasted text and focus changes. Hosts
//! translate whatever their platform produces into [`Event`]; terminal hosts
//! can use [`Event::from_crossterm`]. Pointer input is index-based and goes
//! straight to the picker's hover and click commands, so it has no variant
//! here.

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// An input event for a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press, repeat or release.
    Key(KeyEvent),
    /// Text pasted into the input field.
    Paste(String),
    /// The input field gained focus.
    FocusGained,
    /// The input field lost focus.
    FocusLost,
}

/// Keys the picker can tell apart.
///
/// Anything else a platform reports (function keys, media keys) is dropped
/// during translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    /// Shift+Tab as reported by terminals.
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// Press, auto-repeat or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Platforms without kind reporting produce presses only.
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CTRL  = 1 << 1;
        const ALT   = 1 << 2;
        /// Command on macOS, Windows key elsewhere.
        const SUPER = 1 << 3;
    }
}

impl Modifiers {
    /// Modifiers that turn a key into a shortcut rather than text.
    pub const CHORD: Self = Self::CTRL.union(Self::ALT).union(Self::SUPER);
}

/// One key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain press of `code`.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// A plain press of character `c`.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// Set the held modifiers (builder).
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind (builder).
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether all of `modifiers` are held.
    #[must_use]
    pub const fn has(&self, modifiers: Modifiers) -> bool {
        self.modifiers.contains(modifiers)
    }

    /// Whether ctrl, alt or super is held.
    #[must_use]
    pub const fn is_chord(&self) -> bool {
        self.modifiers.intersects(Modifiers::CHORD)
    }

    /// Presses and repeats act; releases are ignored.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

// ---------------------------------------------------------------------------
// Crossterm translation
// ---------------------------------------------------------------------------

#[cfg(not(target_arch = "wasm32"))]
impl Event {
    /// Translate a crossterm event.
    ///
    /// Mouse and resize events, and keys with no [`KeyCode`], give `None`.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => KeyEvent::from_crossterm(key).map(Self::Key),
            cte::Event::Paste(text) => Some(Self::Paste(text)),
            cte::Event::FocusGained => Some(Self::FocusGained),
            cte::Event::FocusLost => Some(Self::FocusLost),
            cte::Event::Mouse(_) | cte::Event::Resize(..) => None,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyEvent {
    /// Translate a crossterm key event.
    #[must_use]
    pub fn from_crossterm(key: cte::KeyEvent) -> Option<Self> {
        let code = KeyCode::from_crossterm(key.code)?;
        Some(Self {
            code,
            modifiers: key.modifiers.into(),
            kind: key.kind.into(),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyCode {
    /// Translate a crossterm key code, dropping keys the picker ignores.
    #[must_use]
    pub fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        Some(match code {
            cte::KeyCode::Char(c) => Self::Char(c),
            cte::KeyCode::Enter => Self::Enter,
            cte::KeyCode::Esc => Self::Escape,
            cte::KeyCode::Backspace => Self::Backspace,
            cte::KeyCode::Delete => Self::Delete,
            cte::KeyCode::Tab => Self::Tab,
            cte::KeyCode::BackTab => Self::BackTab,
            cte::KeyCode::Up => Self::Up,
            cte::KeyCode::Down => Self::Down,
            cte::KeyCode::Left => Self::Left,
            cte::KeyCode::Right => Self::Right,
            cte::KeyCode::Home => Self::Home,
            cte::KeyCode::End => Self::End,
            _ => return None,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<cte::KeyModifiers> for Modifiers {
    fn from(mods: cte::KeyModifiers) -> Self {
        let mut out = Self::empty();
        out.set(Self::SHIFT, mods.contains(cte::KeyModifiers::SHIFT));
        out.set(Self::CTRL, mods.contains(cte::KeyModifiers::CONTROL));
        out.set(
            Self::ALT,
            mods.intersects(cte::KeyModifiers::ALT | cte::KeyModifiers::META),
        );
        out.set(Self::SUPER, mods.contains(cte::KeyModifiers::SUPER));
        out
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<cte::KeyEventKind> for KeyEventKind {
    fn from(kind: cte::KeyEventKind) -> Self {
        match kind {
            cte::KeyEventKind::Press => Self::Press,
            cte::KeyEventKind::Repeat => Self::Repeat,
            cte::KeyEventKind::Release => Self::Release,
        }
    }
}
