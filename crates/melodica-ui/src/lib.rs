//! Terminal UI components for melodica.
//!
//! The player screen is three stacked panes (playlist, now playing, key
//! bindings) drawn directly with crossterm. Key handling is a pure mapping
//! from key events to [`keys::Action`]s so it can be tested without a
//! terminal.

pub mod error;
pub mod keys;
pub mod layout;
pub mod styles;
pub mod terminal;
pub mod view;

pub use error::{Result, UiError};
pub use keys::{Action, map_key};
pub use layout::{Layout, Rect};
pub use terminal::TerminalGuard;
