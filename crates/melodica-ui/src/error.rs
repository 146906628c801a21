//! UI error types.

use thiserror::Error;

/// Errors raised while driving the terminal.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("terminal too small: {width}x{height}")]
    TooSmall { width: u16, height: u16 },
}

pub type Result<T> = std::result::Result<T, UiError>;
