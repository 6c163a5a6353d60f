#![forbid(unsafe_code)]

//! tagpick demo binary entry point.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tagpick_core::logging::init_json_subscriber;
use tagpick_demo::app::{self, Outcome};
use tagpick_demo::cli;

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                if !init_json_subscriber(Mutex::new(file), "tagpick=debug,tagpick_demo=debug") {
                    eprintln!("Logging already initialized; ignoring --log-file");
                }
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    let mut picker = match app::build_picker(&opts) {
        Ok(picker) => picker,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    };

    match app::run(&mut picker, opts.max_rows) {
        Ok(Outcome::Submitted(value)) => {
            let field = picker.config().form_field_name();
            let json = serde_json::json!({ "name": field, "value": value });
            println!("{json}");
        }
        Ok(Outcome::Aborted) => {
            eprintln!("Aborted");
            std::process::exit(130);
        }
        Err(e) => {
            eprintln!("Runtime error: {e}");
            std::process::exit(1);
        }
    }
}
