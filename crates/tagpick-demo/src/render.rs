#![forbid(unsafe_code)]

//! Line-based rendering of picker state.
//!
//! [`render_lines`] turns a picker into styled lines without touching the
//! terminal; [`draw`] writes them with crossterm, repainting in place.

use std::io::{self, Write};

use crossterm::cursor;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, ClearType};
use crossterm::queue;
use tagpick::Picker;

const HINT: &str = "Enter/Tab/, commit | Up/Down move | Esc close | Ctrl+D submit | Ctrl+C abort";

/// How a span is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Normal text.
    Plain,
    /// Part of a candidate matching the query.
    Match,
    /// The highlighted row.
    Active,
    /// Placeholder, hints and messages.
    Muted,
    /// A selected-entry chip.
    Chip,
}

impl Tone {
    fn attribute(self) -> Attribute {
        match self {
            Self::Plain => Attribute::Reset,
            Self::Match => Attribute::Underlined,
            Self::Active => Attribute::Reverse,
            Self::Muted => Attribute::Dim,
            Self::Chip => Attribute::Bold,
        }
    }
}

/// A run of text in one tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Text to print.
    pub text: String,
    /// How to print it.
    pub tone: Tone,
}

/// One terminal line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// Spans in order.
    pub spans: Vec<Span>,
}

impl Line {
    fn push(&mut self, text: impl Into<String>, tone: Tone) {
        self.spans.push(Span {
            text: text.into(),
            tone,
        });
    }

    fn with(text: impl Into<String>, tone: Tone) -> Self {
        let mut line = Self::default();
        line.push(text, tone);
        line
    }

    /// The line without styling.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// First visible row so that `active` stays within `max_rows`.
fn window_start(active: Option<usize>, max_rows: usize) -> usize {
    match active {
        Some(index) if index >= max_rows => index + 1 - max_rows,
        _ => 0,
    }
}

/// Lay out the picker as lines: selection, input, list, hint.
pub fn render_lines(picker: &Picker, max_rows: usize) -> Vec<Line> {
    let mut lines = Vec::new();

    // Selection
    let mut selection = Line::default();
    if picker.config().is_single() {
        selection.push("value: ", Tone::Muted);
        let tone = if picker.selection().is_empty() {
            Tone::Muted
        } else {
            Tone::Chip
        };
        selection.push(picker.single_text(), tone);
        if picker.is_single_clear_visible() {
            selection.push(" [x]", Tone::Muted);
        }
    } else if picker.selection().is_empty() {
        selection.push("(nothing selected)", Tone::Muted);
    } else {
        for (i, entry) in picker.selected_entries().into_iter().enumerate() {
            if i > 0 {
                selection.push(" ", Tone::Plain);
            }
            let marker = if entry.is_new() { " +" } else { "" };
            selection.push(format!("[{}{marker}]", entry.text()), Tone::Chip);
        }
    }
    lines.push(selection);

    // Input
    let mut input = Line::with("> ", Tone::Plain);
    if picker.input().is_empty() {
        input.push(picker.input_placeholder(), Tone::Muted);
    } else {
        input.push(picker.input(), Tone::Plain);
    }
    lines.push(input);

    // Autocomplete
    if picker.is_visible() {
        let query = picker.input();
        let start = window_start(picker.active_index(), max_rows);
        for candidate in picker.candidates().iter().skip(start).take(max_rows) {
            let base = if candidate.is_active() {
                Tone::Active
            } else {
                Tone::Plain
            };
            let mut row = Line::with(if candidate.is_active() { "  > " } else { "    " }, base);
            if candidate.is_preview() {
                row.push(format!("+ add \"{}\"", candidate.text()), base);
            } else {
                for segment in candidate.highlight(query) {
                    let tone = if segment.matched { Tone::Match } else { base };
                    row.push(segment.text, tone);
                }
            }
            if candidate.is_selected() {
                row.push(" (selected)", Tone::Muted);
            }
            lines.push(row);
        }
        if picker.no_results() && picker.candidates().is_empty() {
            lines.push(Line::with(
                format!("    {}", picker.config().no_results_text()),
                Tone::Muted,
            ));
        }
    }

    lines.push(Line::with(HINT, Tone::Muted));
    lines
}

/// Repaint `lines` over the `previous` line count drawn last time.
///
/// Returns the number of lines now on screen.
pub fn draw<W: Write>(out: &mut W, lines: &[Line], previous: u16) -> io::Result<u16> {
    if previous > 0 {
        queue!(out, cursor::MoveToPreviousLine(previous))?;
    } else {
        queue!(out, cursor::MoveToColumn(0))?;
    }
    queue!(out, terminal::Clear(ClearType::FromCursorDown))?;

    for line in lines {
        for span in &line.spans {
            queue!(
                out,
                SetAttribute(span.tone.attribute()),
                Print(&span.text)
            )?;
        }
        queue!(out, SetAttribute(Attribute::Reset), Print("\r\n"))?;
    }
    out.flush()?;

    Ok(u16::try_from(lines.len()).unwrap_or(u16::MAX))
}
