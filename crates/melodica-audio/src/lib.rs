//! Audio pipeline for melodica.
//!
//! A track travels through three stages:
//!
//! 1. [`fetch`] buffers the whole file in memory (HTTP or local disk)
//! 2. [`decode`] turns it into interleaved signed 16-bit PCM chunks
//! 3. [`engine`] scales each chunk by the current volume and queues it on an
//!    [`output::AudioSink`], honoring pause and cancellation
//!
//! The default output is the system audio device through rodio.

pub mod decode;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod output;

pub use decode::{PcmChunk, PcmDecoder};
pub use engine::{EngineOptions, PlaybackEngine, PlaybackEvent};
pub use error::{AudioError, Result};
pub use fetch::{FetchOptions, buffer_audio_data};
pub use output::{AudioSink, MemorySink, RodioOutput, RodioSink};
