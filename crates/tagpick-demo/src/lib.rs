#![forbid(unsafe_code)]

//! Terminal host for the tagpick picker.

pub mod app;
pub mod cli;
pub mod render;
