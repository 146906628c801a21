//! Audio error types.

/// Errors that can occur while fetching, decoding, or playing a track.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The HTTP request for a track failed.
    #[error("could not fetch {url}: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: Box<ureq::Error>,
    },

    /// A local track could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// Path of the track.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A track exceeded the configured size limit.
    #[error("{location} is larger than the {limit} byte limit")]
    TooLarge {
        /// Track location.
        location: String,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The container could not be recognized or read.
    #[error("unsupported or corrupt audio: {0}")]
    Format(#[from] symphonia::core::errors::Error),

    /// The container has no decodable audio track.
    #[error("no audio track found")]
    NoAudioTrack,

    /// The audio output device could not be opened.
    #[error("could not open audio output: {0}")]
    Output(String),
}

/// A specialized `Result` type for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;
