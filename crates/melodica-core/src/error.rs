//! Core error types.

/// Errors produced while loading or navigating a playlist.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The playlist file could not be read.
    #[error("could not read playlist {path}: {source}")]
    Read {
        /// Path of the playlist file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The playlist contained no tracks.
    #[error("playlist is empty")]
    EmptyPlaylist,

    /// A track index was outside the playlist.
    #[error("track index {index} out of range (playlist has {len} tracks)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of tracks.
        len: usize,
    },
}

/// A specialized `Result` type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
