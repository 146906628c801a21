//! Drawing the player screen.

use std::io::Write;
use std::ops::Range;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};

use melodica_core::{PlaybackStatus, PlayerState};

use crate::error::Result;
use crate::keys::HELP_TEXT;
use crate::layout::{Layout, Rect};

const CURRENT_MARKER: &str = "\u{25B6} ";
const NO_MARKER: &str = "  ";

/// Draw every pane for `state` and flush.
pub fn draw<W: Write>(out: &mut W, state: &PlayerState, layout: &Layout) -> Result<()> {
    draw_playlist(out, state, layout.playlist)?;
    draw_text_pane(out, layout.now_playing, "Now Playing", &state.now_playing_text())?;
    draw_text_pane(out, layout.help, "", HELP_TEXT)?;
    out.flush()?;
    Ok(())
}

fn draw_playlist<W: Write>(out: &mut W, state: &PlayerState, rect: Rect) -> Result<()> {
    draw_border(out, rect, "Playlist")?;
    let inner = rect.inner();
    let rows = state.playlist().display_rows();
    let window = visible_window(rows.len(), state.cursor(), usize::from(inner.height));
    let playing = state.status() != PlaybackStatus::Stopped;

    for line in 0..inner.height {
        let index = window.start + usize::from(line);
        queue!(out, MoveTo(inner.x, inner.y + line))?;
        let Some(row) = rows.get(index).filter(|_| index < window.end) else {
            queue!(out, Print(fit("", usize::from(inner.width))))?;
            continue;
        };

        let is_current = playing && index == state.current();
        let marker = if is_current { CURRENT_MARKER } else { NO_MARKER };
        let text = fit(&format!("{marker}{row}"), usize::from(inner.width));

        if is_current {
            queue!(out, SetForegroundColor(Color::Yellow))?;
        }
        if index == state.cursor() {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
    }
    Ok(())
}

fn draw_text_pane<W: Write>(out: &mut W, rect: Rect, title: &str, text: &str) -> Result<()> {
    draw_border(out, rect, title)?;
    let inner = rect.inner();
    for line in 0..inner.height {
        let content = if line == 0 { text } else { "" };
        queue!(
            out,
            MoveTo(inner.x, inner.y + line),
            Print(fit(content, usize::from(inner.width)))
        )?;
    }
    Ok(())
}

fn draw_border<W: Write>(out: &mut W, rect: Rect, title: &str) -> Result<()> {
    let width = usize::from(rect.width);
    let inner = width.saturating_sub(2);
    queue!(out, MoveTo(rect.x, rect.y), Print(border_top(width, title)))?;
    for row in 1..rect.height.saturating_sub(1) {
        queue!(out, MoveTo(rect.x, rect.y + row), Print('\u{2502}'))?;
        queue!(
            out,
            MoveTo(rect.x + rect.width - 1, rect.y + row),
            Print('\u{2502}')
        )?;
    }
    let bottom = format!("\u{2514}{}\u{2518}", "\u{2500}".repeat(inner));
    queue!(out, MoveTo(rect.x, rect.y + rect.height - 1), Print(bottom))?;
    Ok(())
}

/// Top border with `title` centered in it.
fn border_top(width: usize, title: &str) -> String {
    let inner = width.saturating_sub(2);
    let label = if title.is_empty() {
        String::new()
    } else {
        truncate(&format!(" {title} "), inner)
    };
    let fill = inner - display_width(&label);
    let left = fill / 2;
    format!(
        "\u{250C}{}{label}{}\u{2510}",
        "\u{2500}".repeat(left),
        "\u{2500}".repeat(fill - left)
    )
}

/// Rows of a `len`-item list shown in `rows` lines, scrolled so that
/// `cursor` stays visible.
pub fn visible_window(len: usize, cursor: usize, rows: usize) -> Range<usize> {
    if rows == 0 || len == 0 {
        return 0..0;
    }
    let start = (cursor + 1).saturating_sub(rows).min(len.saturating_sub(1));
    start..len.min(start + rows)
}

/// Terminal columns taken by `c`: 0 for combining and zero-width marks, 2
/// for East Asian wide characters and emoji, 1 otherwise.
fn char_width(c: char) -> usize {
    match u32::from(c) {
        0x0300..=0x036F | 0x200B..=0x200F | 0x20D0..=0x20FF | 0xFE00..=0xFE0F => 0,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}

/// Terminal columns taken by `text`.
fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Longest prefix of `text` fitting in `width` columns.
fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|&c| {
            used += char_width(c);
            used <= width
        })
        .collect()
}

/// `text` cut or space-padded to exactly `width` columns.
fn fit(text: &str, width: usize) -> String {
    let mut out = truncate(text, width);
    let len = display_width(&out);
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}
