//! Screen layout.

use crate::error::{Result, UiError};

/// Height of the "Now Playing" and key-binding panes, borders included.
pub const PANE_HEIGHT: u16 = 3;

/// Narrowest screen the panes can be drawn on.
pub const MIN_WIDTH: u16 = 4;

/// Shortest screen: one playlist row plus borders and both fixed panes.
pub const MIN_HEIGHT: u16 = 3 + 2 * PANE_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// The area inside a one-cell border.
    pub fn inner(&self) -> Rect {
        Rect {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}

/// Pane positions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub playlist: Rect,
    pub now_playing: Rect,
    pub help: Rect,
}

/// Split a `width` x `height` screen: the playlist takes whatever the two
/// fixed panes at the bottom leave.
pub fn compute(width: u16, height: u16) -> Result<Layout> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(UiError::TooSmall { width, height });
    }
    let playlist_height = height - 2 * PANE_HEIGHT;
    Ok(Layout {
        playlist: Rect {
            x: 0,
            y: 0,
            width,
            height: playlist_height,
        },
        now_playing: Rect {
            x: 0,
            y: playlist_height,
            width,
            height: PANE_HEIGHT,
        },
        help: Rect {
            x: 0,
            y: playlist_height + PANE_HEIGHT,
            width,
            height: PANE_HEIGHT,
        },
    })
}
