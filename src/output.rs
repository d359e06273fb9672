use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
    }
}

pub fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = format!("{} {}", label(kind), message);
    match kind {
        MessageKind::Info => text,
        MessageKind::Success => text.green().to_string(),
        MessageKind::Warning => text.yellow().to_string(),
        MessageKind::Error => text.red().bold().to_string(),
    }
}

pub fn info(message: impl fmt::Display) {
    println!("{}", format_message(MessageKind::Info, message));
}

pub fn success(message: impl fmt::Display) {
    println!("{}", format_message(MessageKind::Success, message));
}

/// Warnings are notices, not failures, so they share stdout with results.
pub fn warning(message: impl fmt::Display) {
    println!("{}", format_message(MessageKind::Warning, message));
}

pub fn error(message: impl fmt::Display) {
    eprintln!("{}", format_message(MessageKind::Error, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_their_text() {
        colored::control::set_override(false);
        assert_eq!(format_message(MessageKind::Success, "done"), "[ok] done");
        assert_eq!(format_message(MessageKind::Warning, "careful"), "[!] careful");
    }
}
