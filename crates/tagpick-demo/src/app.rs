#![forbid(unsafe_code)]

//! Picker setup and the terminal event loop.

use std::cell::Cell;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::event::{
    self as cte, DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste,
    EnableFocusChange,
};
use crossterm::{execute, terminal};
use tagpick::{
    Event, FormValue, KeyCode, Modifiers, Picker, PickerConfig, PickerDocument, PickerError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::Opts;
use crate::render::{draw, render_lines};

/// Languages offered when no document is given.
pub const BUILTIN_CATALOG: [(&str, &str); 12] = [
    ("Rust", "rust"),
    ("Go", "go"),
    ("Python", "python"),
    ("TypeScript", "typescript"),
    ("JavaScript", "javascript"),
    ("C", "c"),
    ("C++", "cpp"),
    ("Zig", "zig"),
    ("Haskell", "haskell"),
    ("OCaml", "ocaml"),
    ("Ruby", "ruby"),
    ("Elixir", "elixir"),
];

/// Errors that end the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The picker could not be built.
    #[error(transparent)]
    Picker(#[from] PickerError),
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The user submitted this value.
    Submitted(FormValue),
    /// The user aborted.
    Aborted,
}

/// Build the picker from a document or from the command-line flags.
pub fn build_picker(opts: &Opts) -> Result<Picker, DemoError> {
    if let Some(path) = &opts.doc {
        let json = fs::read_to_string(path)?;
        info!(path = %path.display(), "loading picker document");
        return Ok(PickerDocument::from_json_str(&json)?.into_picker()?);
    }

    let mut config = PickerConfig::new()
        .with_mode(opts.mode)
        .with_placeholder(opts.placeholder.as_str())
        .with_allow_new(opts.allow_new)
        .with_hide_selected(opts.hide_selected)
        .with_form_field_name("languages");
    if let Some(separator) = &opts.string_input {
        config = config.with_string_input(separator.as_str());
    }

    Ok(Picker::builder(config)
        .with_catalog(BUILTIN_CATALOG)
        .build()?)
}

/// Restores the terminal when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, EnableBracketedPaste, EnableFocusChange)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableFocusChange, DisableBracketedPaste);
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the interactive session on stdout.
pub fn run(picker: &mut Picker, max_rows: usize) -> Result<Outcome, DemoError> {
    let mut out = io::stdout();
    let _guard = RawModeGuard::enter(&mut out)?;

    let dirty = Rc::new(Cell::new(true));
    let flag = Rc::clone(&dirty);
    let subscription = picker.subscribe(move |_| flag.set(true));

    let result = event_loop(picker, &mut out, max_rows, &dirty);
    picker.unsubscribe(subscription);
    result
}

fn event_loop<W: Write>(
    picker: &mut Picker,
    out: &mut W,
    max_rows: usize,
    dirty: &Cell<bool>,
) -> Result<Outcome, DemoError> {
    let mut drawn = 0;
    loop {
        if dirty.replace(false) {
            drawn = draw(out, &render_lines(picker, max_rows), drawn)?;
        }

        let Some(event) = Event::from_crossterm(cte::read()?) else {
            continue;
        };

        if let Event::Key(key) = &event
            && key.is_actionable()
            && key.has(Modifiers::CTRL)
        {
            match key.code {
                KeyCode::Char('c') => {
                    debug!("aborted");
                    return Ok(Outcome::Aborted);
                }
                KeyCode::Char('d') => {
                    debug!(revision = picker.revision(), "submitted");
                    return Ok(Outcome::Submitted(picker.form_value()));
                }
                _ => {}
            }
        }

        picker.handle_event(&event);
    }
}
