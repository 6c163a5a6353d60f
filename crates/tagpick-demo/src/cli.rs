#![forbid(unsafe_code)]

//! Command-line argument parsing for the picker demo.
//!
//! Parses args manually to keep the binary lean.
//! Supports environment variable overrides via `TAGPICK_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use tagpick::Mode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
tagpick demo: a tag picker in your terminal

USAGE:
    tagpick-demo [OPTIONS]

OPTIONS:
    --doc=PATH             Load config, catalog and selection from a JSON document
    --mode=MODE            'multi' (default) or 'single'
    --placeholder=TEXT     Placeholder shown while nothing is selected
    --no-new               Only allow catalog entries
    --hide-selected        Hide selected entries from the list
    --string-input=SEP     Submit one string joined with SEP
    --max-rows=N           Candidate rows shown at once (default: 8)
    --log-file=PATH        Write JSON logs to PATH (filter with RUST_LOG)
    --help, -h             Show this help message
    --version, -V          Show version

The --mode, --placeholder, --no-new, --hide-selected and --string-input
flags configure the built-in catalog and are ignored with --doc.

KEYBINDINGS:
    Up / Down          Open the list or move the highlight
    Enter              Commit the highlighted entry or the typed text
    Tab / ,            Commit the typed text
    Backspace          Delete a character, or remove the last tag
    Escape             Close the list
    Ctrl+D             Submit and print the form value
    Ctrl+C             Abort

ENVIRONMENT VARIABLES:
    TAGPICK_DEMO_DOC          Override --doc
    TAGPICK_DEMO_MODE         Override --mode
    TAGPICK_DEMO_MAX_ROWS     Override --max-rows
    TAGPICK_DEMO_LOG_FILE     Override --log-file";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Picker document to load.
    pub doc: Option<PathBuf>,
    /// Selection mode for the built-in catalog.
    pub mode: Mode,
    /// Placeholder for the built-in catalog.
    pub placeholder: String,
    /// Whether free text creates entries.
    pub allow_new: bool,
    /// Whether selected entries leave the list.
    pub hide_selected: bool,
    /// Separator for string input, if enabled.
    pub string_input: Option<String>,
    /// Candidate rows shown at once.
    pub max_rows: usize,
    /// JSON log destination.
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            doc: None,
            mode: Mode::Multi,
            placeholder: "Add a language".into(),
            allow_new: true,
            hide_selected: false,
            string_input: None,
            max_rows: 8,
            log_file: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Run the demo.
    Run(Opts),
    /// Print help.
    Help,
    /// Print the version.
    Version,
}

fn parse_mode(val: &str) -> Result<Mode, String> {
    match val {
        "multi" => Ok(Mode::Multi),
        "single" => Ok(Mode::Single),
        other => Err(format!("Invalid --mode value: {other}")),
    }
}

fn parse_rows(val: &str) -> Result<usize, String> {
    match val.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Invalid --max-rows value: {val}")),
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Prints help or version and exits when asked to; exits with status 1 on
    /// invalid arguments.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("tagpick-demo {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment lookups through `var`.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse_from<I, F>(args: I, var: F) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = var("TAGPICK_DEMO_DOC") {
            opts.doc = Some(PathBuf::from(val));
        }
        if let Some(val) = var("TAGPICK_DEMO_MODE")
            && let Ok(mode) = parse_mode(&val)
        {
            opts.mode = mode;
        }
        if let Some(val) = var("TAGPICK_DEMO_MAX_ROWS")
            && let Ok(n) = parse_rows(&val)
        {
            opts.max_rows = n;
        }
        if let Some(val) = var("TAGPICK_DEMO_LOG_FILE") {
            opts.log_file = Some(PathBuf::from(val));
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-new" => opts.allow_new = false,
                "--hide-selected" => opts.hide_selected = true,
                other => {
                    if let Some(val) = other.strip_prefix("--doc=") {
                        opts.doc = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--mode=") {
                        opts.mode = parse_mode(val)?;
                    } else if let Some(val) = other.strip_prefix("--placeholder=") {
                        opts.placeholder = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--string-input=") {
                        if val.is_empty() {
                            return Err("--string-input needs a separator".into());
                        }
                        opts.string_input = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--max-rows=") {
                        opts.max_rows = parse_rows(val)?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}
