//! User-facing output utilities for clean, colored terminal messages

use owo_colors::OwoColorize;

use crate::models::MatchSpan;

/// Display an error message to the user in red with padding.
pub fn error(message: &str) {
    eprintln!("\n{}\n", message.red());
}

/// Render highlight spans as a single line, matched runs emphasized.
pub fn render_match(spans: &[MatchSpan]) -> String {
    spans
        .iter()
        .map(|span| {
            if span.is_matched {
                span.text.cyan().bold().to_string()
            } else {
                span.text.clone()
            }
        })
        .collect()
}

/// Render highlight spans without any styling (for piped output).
pub fn render_plain(spans: &[MatchSpan]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}
