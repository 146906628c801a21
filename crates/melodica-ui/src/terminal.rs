//! Terminal detection and setup.

use std::env;
use std::io::{self, Write};

use crossterm::{cursor, execute, terminal};

/// Returns `true` if stdout is connected to a terminal (TTY).
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&io::stdout())
}

/// Returns the terminal size as `(columns, rows)`, defaulting to 80x24.
pub fn terminal_size() -> (u16, u16) {
    terminal::size().unwrap_or((80, 24))
}

/// Determines if ANSI color codes should be used.
///
/// Respects standard conventions:
/// - `NO_COLOR` (any value): disables color (<https://no-color.org/>)
/// - `CLICOLOR=0`: disables color
/// - `TERM=dumb`: disables color
/// - `CLICOLOR_FORCE` (any value): forces color even in non-TTY
/// - Falls back to TTY detection
pub fn supports_color() -> bool {
    color_from_env(
        env::var_os("NO_COLOR").is_some(),
        env::var("CLICOLOR").ok().as_deref(),
        env::var("TERM").ok().as_deref(),
        env::var_os("CLICOLOR_FORCE").is_some(),
        is_tty(),
    )
}

fn color_from_env(
    no_color: bool,
    clicolor: Option<&str>,
    term: Option<&str>,
    force: bool,
    tty: bool,
) -> bool {
    if no_color || clicolor == Some("0") || term == Some("dumb") {
        return false;
    }
    force || tty
}

/// Raw mode plus the alternate screen for as long as the guard lives.
///
/// Dropping the guard restores the terminal, including on early returns and
/// panics that unwind through the owner.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen, hiding the cursor.
    pub fn enter() -> crate::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self { _private: () };
        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = out.flush();
    }
}
