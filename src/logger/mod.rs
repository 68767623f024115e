//! Structured console logging for swapwatch.
//!
//! Every subsystem logs through `log(LogTag::X, "EVENT", message)`:
//! a colored tag, a short uppercase event name, and a free-form message.
//! Debug-level output is gated per module via repeatable `--debug`
//! flags (see `arguments.rs`) so a noisy subsystem can be inspected
//! without drowning the rest.

mod tags;

pub use tags::LogTag;

use crate::arguments;
use chrono::Utc;
use colored::*;
use std::io::{self, Write};

/// Log an event. Always shown (errors bypass --quiet).
pub fn log(tag: LogTag, event: &str, message: &str) {
    if arguments::is_quiet_enabled() && !is_error_event(event) {
        return;
    }
    print_line(tag, event, message);
}

/// Log a debug event. Only shown when --debug-<module> is active for the tag.
pub fn debug(tag: LogTag, event: &str, message: &str) {
    if !arguments::is_debug_enabled(tag.as_flag()) {
        return;
    }
    print_line(tag, event, message);
}

fn is_error_event(event: &str) -> bool {
    event.contains("ERROR") || event.contains("FAIL")
}

fn print_line(tag: LogTag, event: &str, message: &str) {
    let timestamp = Utc::now().format("%H:%M:%S%.3f");
    let event_colored = if is_error_event(event) {
        event.red().bold()
    } else if event.contains("WARN") {
        event.yellow().bold()
    } else {
        event.bright_white().bold()
    };

    println!(
        "{} {} {} {}",
        format!("[{}]", timestamp).dimmed(),
        tag.colored_label(),
        event_colored,
        message
    );
    let _ = io::stdout().flush();
}

/// Leading characters of an address or signature for log output.
/// Falls back to the full string when it is short or the cut would
/// split a multi-byte character.
pub fn short_address(address: &str) -> &str {
    address.get(..8).unwrap_or(address)
}

/// Startup banner, printed once from main.
pub fn header(title: &str) {
    println!();
    println!(
        "{} {} {}",
        "👁".green().bold(),
        "swapwatch".green().bold(),
        format!("- {}", title).bright_white().bold()
    );
    println!("{}", "─".repeat(50).dimmed());
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_never_splits_characters() {
        assert_eq!(short_address("7xKXtg2CW87d97TX"), "7xKXtg2C");
        assert_eq!(short_address("abc"), "abc");
        // Byte 8 lands mid-character here; fall back whole instead of
        // panicking.
        assert_eq!(short_address("日本語テスト"), "日本語テスト");
    }
}
