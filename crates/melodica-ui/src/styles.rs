//! Colored status lines for `melodica-pkg` output.
//!
//! Colors come from the Ayu palette (<https://github.com/ayu-theme/ayu-colors>)
//! and are dropped entirely when [`supports_color`] says no.

use owo_colors::OwoColorize;

use crate::terminal::supports_color;

/// Meaning of a line of output, which decides its color and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pass,
    Warn,
    Fail,
    Muted,
}

impl Tone {
    fn rgb(self) -> (u8, u8, u8) {
        match self {
            Tone::Pass => (0xc2, 0xd9, 0x4c),
            Tone::Warn => (0xff, 0xb4, 0x54),
            Tone::Fail => (0xf0, 0x71, 0x78),
            Tone::Muted => (0x6c, 0x76, 0x80),
        }
    }

    /// Leading symbol for status lines.
    pub fn icon(self) -> &'static str {
        match self {
            Tone::Pass => "\u{2713}",
            Tone::Warn => "\u{26A0}",
            Tone::Fail => "\u{2716}",
            Tone::Muted => "-",
        }
    }
}

/// `text` in the color of `tone`, or unchanged without color support.
pub fn paint(tone: Tone, text: &str) -> String {
    paint_if(tone, text, supports_color())
}

fn paint_if(tone: Tone, text: &str, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let (r, g, b) = tone.rgb();
    text.truecolor(r, g, b).to_string()
}

/// `<icon> <text>`, colored by `tone`.
pub fn status_line(tone: Tone, text: &str) -> String {
    paint(tone, &format!("{} {text}", tone.icon()))
}

pub fn bold(text: &str) -> String {
    if supports_color() {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// A `key: value` line with the key muted.
pub fn field(key: &str, value: &str) -> String {
    format!("{} {value}", paint(Tone::Muted, &format!("{key}:")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_without_color() {
        assert_eq!(paint_if(Tone::Pass, "ok", false), "ok");
    }

    #[test]
    fn truecolor_escape_with_color() {
        let out = paint_if(Tone::Fail, "bad", true);
        assert!(out.starts_with("\u{1b}[38;2;240;113;120m"), "got: {out:?}");
        assert!(out.contains("bad"));
    }

    #[test]
    fn status_line_starts_with_icon() {
        let line = status_line(Tone::Warn, "careful");
        assert!(line.contains("\u{26A0} careful"), "got: {line:?}");
    }

    #[test]
    fn field_keeps_key_and_value() {
        let out = field("version", "0.0.2");
        assert!(out.contains("version:"));
        assert!(out.ends_with(" 0.0.2"));
    }
}
