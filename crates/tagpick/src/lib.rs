#![forbid(unsafe_code)]

//! Selection and autocomplete state machine for tag/option picker inputs.
//!
//! A [`Picker`] is a text field backed by a [`Catalog`] of known entries. It
//! filters the catalog as the user types, supports single or multi selection
//! and can create entries from free text. Rendering is left to the host: it
//! reads the picker's views and forwards input through
//! [`Picker::handle_event`] or the individual commands.
//!
//! # Feature flags
//!
//! - `tracing`: emit spans and events for every command.
//! - `serde`: load [`PickerDocument`]s from JSON.

pub mod autocomplete;
pub mod catalog;
pub mod config;
#[cfg(feature = "serde")]
pub mod document;
pub mod entry;
pub mod error;
pub mod form;
pub mod interpreter;
pub mod picker;
pub mod selection;

pub use autocomplete::{Candidate, CandidateFlags, Direction, Filtered, filter_candidates};
pub use catalog::Catalog;
pub use config::{Mode, NavigationConfig, PickerConfig};
#[cfg(feature = "serde")]
pub use document::PickerDocument;
pub use entry::{Entry, EntryKind, EntrySpec, MatchSpan, TextSegment};
pub use error::{PickerError, Result};
pub use form::{FormValue, MirrorOption};
pub use interpreter::{InterpreterState, KeyCommand, interpret};
pub use picker::{KeyOutcome, Picker, PickerBuilder, SubscriptionId};
pub use selection::Selection;

pub use tagpick_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use tagpick_core::keys::{KeyRole, KeyTable};
