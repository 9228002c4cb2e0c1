//! Output helpers shared by all subcommands.
//!
//! Global flags are exported as `INSPECTOR_*` environment variables by the
//! binary so every module can check them without threading state around.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

pub fn is_json() -> bool {
    flag("INSPECTOR_JSON")
}

pub fn is_quiet() -> bool {
    flag("INSPECTOR_QUIET")
}

pub fn is_verbose() -> bool {
    flag("INSPECTOR_VERBOSE")
}

/// Color is off with `--no-color`, `NO_COLOR`, or JSON output.
pub fn use_color() -> bool {
    !flag("INSPECTOR_NO_COLOR") && std::env::var_os("NO_COLOR").is_none() && !is_json()
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}

/// ANSI styling that degrades to plain text when color is disabled.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self { color: use_color() }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn ok_sym(&self) -> String {
        self.paint("32", "✓")
    }

    pub fn warn_sym(&self) -> String {
        self.paint("33", "!")
    }

    pub fn err_sym(&self) -> String {
        self.paint("31", "✗")
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    /// Color an HTTP status by class.
    pub fn status(&self, status: u16) -> String {
        let code = match status {
            200..=299 => "32",
            300..=399 => "36",
            400..=499 => "33",
            _ => "31",
        };
        self.paint(code, &status.to_string())
    }
}

/// Spinner on stderr; hidden in quiet or JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_quiet() || is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
