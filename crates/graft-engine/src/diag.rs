//! Colored diagnostics on stderr.
//!
//! The weaving stages return typed errors; the registry and dispatcher
//! boundaries report them here and keep going. Respects the `NO_COLOR`
//! environment variable.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn color_choice() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn emit(level: &str, color: Color, message: &str) {
    let mut stderr = StandardStream::stderr(color_choice());
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    let _ = stderr.set_color(&spec);
    let _ = write!(stderr, "{level}");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {message}");
}

/// Report a recoverable problem (dropped member, skipped descriptor).
pub fn warn(message: &str) {
    emit("warning", Color::Yellow, message);
}

/// Report a stage failure the dispatcher recovered from.
pub fn error(message: &str) {
    emit("error", Color::Red, message);
}
