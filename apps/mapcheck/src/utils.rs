//! Small terminal helpers shared by the binary and printers.

use owo_colors::OwoColorize;

/// Colors are on unless `NO_COLOR` is set or the output is machine-readable.
pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn prefix(text: &str, paint: fn(&str) -> String) -> String {
    if use_colors("human") {
        paint(text)
    } else {
        text.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |t| t.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |t| t.yellow().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", |t| t.blue().bold().to_string())
}
