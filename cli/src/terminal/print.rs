use std::fmt::Display;

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::logging::PRINT_TARGET;

/// Column count every rule and box is drawn to.
pub const WIDTH: usize = 64;

/// Emits one pre-rendered line through the subscriber so it interleaves with the spinner.
pub fn line(msg: impl Display) {
    info!(target: PRINT_TARGET, raw_msg = msg.to_string().as_str());
}

pub fn blank() {
    line("");
}

const BANNER: &str = r#"
     _   _ _____ _        _____           _ _
    | \ | |_   _| |      |_   _|__   ___ | | |__   _____  __
    |  \| | | | | |   _____| |/ _ \ / _ \| | '_ \ / _ \ \/ /
    | |\  | | | | |__|_____| | (_) | (_) | | |_) | (_) >  <
    |_| \_| |_| |_____|    |_|\___/ \___/|_|_.__/ \___/_/\_\
"#;

pub fn banner(quiet: u8) {
    if quiet > 0 {
        return;
    }
    line(BANNER.color(colors::PRIMARY));
    line(rule_with(&format!(" NTL-SysToolbox v{} ", env!("CARGO_PKG_VERSION")), '━'));
}

/// `━━ TITLE ━━━━━━`, with the title left-aligned.
fn rule_with(title: &str, fill: char) -> String {
    let used = UnicodeWidthStr::width(title) + 2;
    format!(
        "{}{}{}",
        fill.to_string().repeat(2).color(colors::SEPARATOR),
        title.bright_green().bold(),
        fill.to_string().repeat(WIDTH.saturating_sub(used)).color(colors::SEPARATOR)
    )
}

/// Opens a block of output. Hidden from `-q` on.
pub fn section(title: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }
    line(rule_with(&format!(" {} ", title.to_uppercase()), '─'));
}

pub fn rule() {
    line("━".repeat(WIDTH).color(colors::SEPARATOR));
}

/// Key/value rows with the keys padded to the longest one.
pub fn fields<K: AsRef<str>, V: Display>(rows: &[(K, V)]) {
    for row in aligned(rows, "  ") {
        line(row);
    }
}

/// Nested key/value rows under a [`item`] line.
pub fn branch<K: AsRef<str>, V: Display>(rows: &[(K, V)]) {
    let last = rows.len().saturating_sub(1);
    for (i, row) in aligned(rows, "").into_iter().enumerate() {
        let glyph = if i == last { "  ╰ " } else { "  │ " };
        line(format!("{}{row}", glyph.color(colors::SEPARATOR)));
    }
}

fn aligned<K: AsRef<str>, V: Display>(rows: &[(K, V)], indent: &str) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(key, _)| UnicodeWidthStr::width(key.as_ref()))
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(key, value)| {
            let key = key.as_ref();
            let pad = " ".repeat(width - UnicodeWidthStr::width(key));
            format!(
                "{indent}{}{pad} {} {value}",
                key.color(colors::PRIMARY),
                "│".color(colors::SEPARATOR)
            )
        })
        .collect()
}

/// `#3 name`
pub fn item(idx: usize, name: &str) {
    line(format!(
        "{} {}",
        format!("#{}", idx + 1).color(colors::ACCENT),
        name.color(colors::PRIMARY).bold()
    ));
}

/// A free-form line under the current section.
pub fn note(msg: impl Display) {
    line(format!("{} {msg}", "›".color(colors::SEPARATOR)));
}

pub fn centered(msg: &str) {
    let pad = " ".repeat(WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    line(format!("{pad}{msg}"));
}

/// Boxes `msg` in the middle of the output width.
fn framed(msg: &str) -> Vec<String> {
    let inner = WIDTH - 4;
    let text = UnicodeWidthStr::width(msg).min(inner);
    let left = (inner - text) / 2;
    let right = inner - text - left;
    vec![
        format!("╭{}╮", "─".repeat(inner + 2)),
        format!("│ {} │", " ".repeat(inner)),
        format!("│ {}{msg}{} │", " ".repeat(left), " ".repeat(right)),
        format!("│ {} │", " ".repeat(inner)),
        format!("╰{}╯", "─".repeat(inner + 2)),
    ]
}

pub fn nothing_found(what: &str) {
    for row in framed(what) {
        line(row.color(colors::STATUS_WARN));
    }
}

pub fn closing(quiet: u8) {
    if quiet < 2 {
        rule();
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framed_box_keeps_the_output_width() {
        let rows = framed("no host answered");
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert_eq!(UnicodeWidthStr::width(row.as_str()), WIDTH);
        }
        assert!(rows[2].contains("no host answered"));
    }

    #[test]
    fn aligned_rows_share_one_separator_column() {
        colored::control::set_override(false);
        let rows = aligned(&[("Total", 12), ("Ending soon", 3)], "");
        assert_eq!(rows[0], "Total       │ 12");
        assert_eq!(rows[1], "Ending soon │ 3");
    }
}
