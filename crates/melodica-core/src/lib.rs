//! Core types for the melodica console audio player.
//!
//! Everything here is free of I/O beyond reading the playlist file, so the
//! terminal front-end and the audio engine can share one model of what is
//! playing.

pub mod error;
pub mod player;
pub mod playlist;
pub mod volume;

pub use error::{CoreError, Result};
pub use player::{PlaybackStatus, PlayerCommand, PlayerState};
pub use playlist::Playlist;
pub use volume::Volume;
