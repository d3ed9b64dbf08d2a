/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Color for a status label (task, time log or invoice).
pub fn color_for_status(status: &str) -> &'static str {
    match status {
        "done" | "approved" | "paid" => GREEN,
        "pending" | "in_progress" | "sent" => YELLOW,
        "rejected" | "cancelled" => RED,
        _ => RESET,
    }
}

pub fn colorize_status(status: &str) -> String {
    format!("{}{}{}", color_for_status(status), status, RESET)
}

/// Greyed "--" placeholder for empty optional values.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}
