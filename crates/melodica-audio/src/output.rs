//! Audio output sinks.
//!
//! The engine talks to the device through [`AudioSink`] so that playback
//! logic can run against [`MemorySink`] in tests. [`RodioSink`] plays on the
//! default system device.

use std::sync::Mutex;

use crate::decode::PcmChunk;
use crate::error::{AudioError, Result};

/// Destination for decoded audio.
pub trait AudioSink: Send + Sync {
    /// Queue a chunk behind whatever is already queued.
    fn append(&self, chunk: PcmChunk);

    /// Number of chunks queued and not yet fully played.
    fn queued(&self) -> usize;

    /// Suspend output, keeping the queue.
    fn pause(&self);

    /// Resume output.
    fn resume(&self);

    /// Drop everything queued.
    fn clear(&self);
}

/// Handle on the default output device.
///
/// The device stream stops when this is dropped, so keep it alive for as long
/// as the sink is in use.
pub struct RodioOutput {
    _stream: rodio::OutputStream,
}

impl RodioOutput {
    /// Open the default output device and a sink connected to it.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Output`] if no device can be opened.
    pub fn open_default() -> Result<(Self, RodioSink)> {
        let mut stream = rodio::OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::Output(e.to_string()))?;
        // Dropping the stream would otherwise print to stderr over the UI.
        stream.log_on_drop(false);
        let sink = rodio::Sink::connect_new(stream.mixer());
        tracing::info!("opened default audio output");
        Ok((Self { _stream: stream }, RodioSink { sink }))
    }
}

/// Sink feeding the system audio device.
pub struct RodioSink {
    sink: rodio::Sink,
}

impl AudioSink for RodioSink {
    fn append(&self, chunk: PcmChunk) {
        let samples: Vec<f32> = chunk
            .samples
            .iter()
            .map(|&s| f32::from(s) / 32_768.0)
            .collect();
        self.sink.append(rodio::buffer::SamplesBuffer::new(
            chunk.channels,
            chunk.sample_rate,
            samples,
        ));
    }

    fn queued(&self) -> usize {
        self.sink.len()
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn clear(&self) {
        self.sink.clear();
    }
}

/// In-memory sink that plays chunks instantly and records what it received.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    chunks: Vec<PcmChunk>,
    paused: bool,
    clears: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All samples appended so far, in order.
    pub fn samples(&self) -> Vec<i16> {
        self.lock()
            .chunks
            .iter()
            .flat_map(|c| c.samples.iter().copied())
            .collect()
    }

    /// Number of chunks appended so far.
    pub fn chunk_count(&self) -> usize {
        self.lock().chunks.len()
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// How many times [`AudioSink::clear`] was called.
    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the recorded data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioSink for MemorySink {
    fn append(&self, chunk: PcmChunk) {
        self.lock().chunks.push(chunk);
    }

    fn queued(&self) -> usize {
        0
    }

    fn pause(&self) {
        self.lock().paused = true;
    }

    fn resume(&self) {
        self.lock().paused = false;
    }

    fn clear(&self) {
        self.lock().clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_chunks() {
        let sink = MemorySink::new();
        sink.append(PcmChunk {
            channels: 1,
            sample_rate: 8_000,
            samples: vec![1, 2],
        });
        sink.append(PcmChunk {
            channels: 1,
            sample_rate: 8_000,
            samples: vec![3],
        });
        assert_eq!(sink.samples(), vec![1, 2, 3]);
        assert_eq!(sink.chunk_count(), 2);
        assert_eq!(sink.queued(), 0);

        sink.pause();
        assert!(sink.is_paused());
        sink.resume();
        assert!(!sink.is_paused());
        sink.clear();
        assert_eq!(sink.clear_count(), 1);
    }
}
