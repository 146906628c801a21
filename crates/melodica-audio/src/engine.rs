//! Playback engine.
//!
//! Each track runs on its own worker thread: buffer, decode, scale by the
//! current volume, queue on the sink. The UI thread steers workers through
//! shared controls and learns about completions from [`PlaybackEvent`]s.
//!
//! Generations are assigned by the caller (see
//! `melodica_core::PlayerState`) and start at 1; generation 0 means nothing
//! may play. A worker may only write to the sink while its generation is the
//! active one, and the check and the write happen under the same lock that
//! `play` and `stop` take before clearing the sink, so audio from a
//! superseded track never reaches the device after it was cleared.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use melodica_core::playlist::Playlist;
use melodica_core::volume::adjust_volume;
use melodica_core::PlayerCommand;

use crate::decode::{PcmDecoder, extension_hint};
use crate::error::Result;
use crate::fetch::{FetchOptions, buffer_audio_data};
use crate::output::AudioSink;

/// Interval at which a worker re-checks a full output queue.
const QUEUE_POLL: Duration = Duration::from_millis(10);

/// Tuning for the engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Limits for buffering tracks.
    pub fetch: FetchOptions,
    /// How often a paused worker checks whether it may continue.
    pub pause_poll: Duration,
    /// Maximum number of chunks queued on the sink ahead of playback.
    pub queue_chunks: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            pause_poll: Duration::from_millis(100),
            queue_chunks: 8,
        }
    }
}

/// Progress reports from track workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The track was buffered and decoding began.
    Started { index: usize, generation: u64 },
    /// The track played to the end.
    Finished { index: usize, generation: u64 },
    /// The track could not be fetched, decoded, or played.
    Failed {
        index: usize,
        generation: u64,
        message: String,
    },
}

/// State shared between the engine and its workers.
#[derive(Debug)]
struct Controls {
    paused: AtomicBool,
    volume_bits: AtomicU64,
    active: Mutex<u64>,
}

impl Controls {
    fn lock_active(&self) -> MutexGuard<'_, u64> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_live(&self, generation: u64) -> bool {
        *self.lock_active() == generation
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn volume(&self) -> f64 {
        f64::from_bits(self.volume_bits.load(Ordering::SeqCst))
    }
}

/// How a worker ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Cancelled,
}

struct TrackJob {
    location: String,
    index: usize,
    generation: u64,
}

/// Drives playback of one track at a time on an [`AudioSink`].
pub struct PlaybackEngine {
    sink: Arc<dyn AudioSink>,
    controls: Arc<Controls>,
    options: EngineOptions,
    events: Sender<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create an engine and the receiver for its events.
    pub fn new(
        sink: Arc<dyn AudioSink>,
        options: EngineOptions,
        volume: f64,
    ) -> (Self, Receiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::channel();
        let controls = Arc::new(Controls {
            paused: AtomicBool::new(false),
            volume_bits: AtomicU64::new(volume.to_bits()),
            active: Mutex::new(0),
        });
        let engine = Self {
            sink,
            controls,
            options,
            events: tx,
        };
        (engine, rx)
    }

    /// Start playing `location`, cancelling whatever was playing.
    pub fn play(&mut self, location: &str, index: usize, generation: u64) {
        {
            let mut active = self.controls.lock_active();
            *active = generation;
            self.sink.clear();
        }
        self.controls.paused.store(false, Ordering::SeqCst);
        self.sink.resume();

        let job = TrackJob {
            location: location.to_string(),
            index,
            generation,
        };
        let sink = Arc::clone(&self.sink);
        let controls = Arc::clone(&self.controls);
        let options = self.options.clone();
        let events = self.events.clone();

        tracing::info!(index, generation, location, "starting track");
        let spawned = thread::Builder::new()
            .name(format!("melodica-track-{generation}"))
            .spawn(move || run_worker(job, sink.as_ref(), &controls, &options, &events));
        if let Err(e) = spawned {
            tracing::error!(error = %e, "could not spawn track worker");
            let _ = self.events.send(PlaybackEvent::Failed {
                index,
                generation,
                message: e.to_string(),
            });
        }
    }

    /// Cancel the current track and drop queued audio.
    pub fn stop(&mut self) {
        let mut active = self.controls.lock_active();
        *active = 0;
        self.sink.clear();
        tracing::info!("playback stopped");
    }

    /// Suspend playback; the worker holds its position.
    pub fn pause(&self) {
        self.controls.paused.store(true, Ordering::SeqCst);
        self.sink.pause();
    }

    /// Continue after [`pause`](Self::pause).
    pub fn resume(&self) {
        self.controls.paused.store(false, Ordering::SeqCst);
        self.sink.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.controls.is_paused()
    }

    /// Set the gain applied to chunks decoded from now on.
    pub fn set_volume(&self, level: f64) {
        self.controls
            .volume_bits
            .store(level.to_bits(), Ordering::SeqCst);
    }

    pub fn volume(&self) -> f64 {
        self.controls.volume()
    }

    /// Execute a command produced by the player state machine.
    pub fn apply(&mut self, command: &PlayerCommand, playlist: &Playlist) {
        match *command {
            PlayerCommand::Play { index, generation } => match playlist.get(index) {
                Ok(location) => self.play(location, index, generation),
                Err(e) => tracing::error!(error = %e, "cannot play track"),
            },
            PlayerCommand::Stop => self.stop(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Resume => self.resume(),
            PlayerCommand::SetVolume(level) => self.set_volume(level),
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    job: TrackJob,
    sink: &dyn AudioSink,
    controls: &Controls,
    options: &EngineOptions,
    events: &Sender<PlaybackEvent>,
) {
    let (index, generation) = (job.index, job.generation);
    match play_track(&job, sink, controls, options, events) {
        Ok(Outcome::Completed) => {
            if controls.is_live(generation) {
                tracing::info!(index, generation, "track finished");
                let _ = events.send(PlaybackEvent::Finished { index, generation });
            }
        }
        Ok(Outcome::Cancelled) => {
            tracing::debug!(index, generation, "track cancelled");
        }
        Err(e) => {
            if controls.is_live(generation) {
                tracing::error!(index, generation, location = %job.location, error = %e, "could not play track");
                let _ = events.send(PlaybackEvent::Failed {
                    index,
                    generation,
                    message: e.to_string(),
                });
            } else {
                tracing::debug!(index, generation, error = %e, "cancelled track failed");
            }
        }
    }
}

fn play_track(
    job: &TrackJob,
    sink: &dyn AudioSink,
    controls: &Controls,
    options: &EngineOptions,
    events: &Sender<PlaybackEvent>,
) -> Result<Outcome> {
    let data = buffer_audio_data(&job.location, &options.fetch)?;
    if !controls.is_live(job.generation) {
        return Ok(Outcome::Cancelled);
    }

    let mut decoder = PcmDecoder::new(data, extension_hint(&job.location))?;
    let _ = events.send(PlaybackEvent::Started {
        index: job.index,
        generation: job.generation,
    });

    loop {
        if !controls.is_live(job.generation) {
            return Ok(Outcome::Cancelled);
        }
        if controls.is_paused() {
            thread::sleep(options.pause_poll);
            continue;
        }
        if sink.queued() >= options.queue_chunks {
            thread::sleep(QUEUE_POLL);
            continue;
        }

        let Some(mut chunk) = decoder.next_chunk()? else {
            break;
        };
        adjust_volume(&mut chunk.samples, controls.volume());

        let active = controls.lock_active();
        if *active != job.generation {
            return Ok(Outcome::Cancelled);
        }
        sink.append(chunk);
    }

    // Let the queued tail play out before reporting completion.
    while sink.queued() > 0 {
        if !controls.is_live(job.generation) {
            return Ok(Outcome::Cancelled);
        }
        thread::sleep(QUEUE_POLL);
    }
    Ok(Outcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::test_support::wav_file;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    const TIMEOUT: Duration = Duration::from_secs(10);

    /// Sink that reports a full queue until opened.
    #[derive(Default)]
    struct GatedSink {
        open: AtomicBool,
        polls: AtomicUsize,
        inner: MemorySink,
    }

    impl AudioSink for GatedSink {
        fn append(&self, chunk: crate::decode::PcmChunk) {
            self.inner.append(chunk);
        }
        fn queued(&self) -> usize {
            self.polls.fetch_add(1, Ordering::SeqCst);
            if self.open.load(Ordering::SeqCst) { 0 } else { usize::MAX }
        }
        fn pause(&self) {
            self.inner.pause();
        }
        fn resume(&self) {
            self.inner.resume();
        }
        fn clear(&self) {
            self.inner.clear();
        }
    }

    fn options() -> EngineOptions {
        EngineOptions {
            pause_poll: Duration::from_millis(5),
            ..EngineOptions::default()
        }
    }

    /// Wait for the next terminal event (`Finished` or `Failed`).
    fn wait_terminal(rx: &Receiver<PlaybackEvent>) -> PlaybackEvent {
        loop {
            let event = rx.recv_timeout(TIMEOUT).expect("no playback event");
            if !matches!(event, PlaybackEvent::Started { .. }) {
                return event;
            }
        }
    }

    /// Wait until the worker has polled the gated queue at least once.
    fn wait_for_poll(sink: &GatedSink) {
        let deadline = std::time::Instant::now() + TIMEOUT;
        while sink.polls.load(Ordering::SeqCst) == 0 {
            assert!(std::time::Instant::now() < deadline, "worker never polled");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn plays_track_to_completion_with_volume() {
        let dir = tempfile::tempdir().unwrap();
        let input: Vec<i16> = (0..4000).map(|i| if i % 2 == 0 { 1000 } else { -1000 }).collect();
        let path = wav_file(&dir, "a.wav", &input);

        let sink = Arc::new(MemorySink::new());
        let (mut engine, rx) = PlaybackEngine::new(sink.clone(), options(), 0.5);
        engine.play(path.to_str().unwrap(), 3, 1);

        assert_eq!(
            rx.recv_timeout(TIMEOUT).unwrap(),
            PlaybackEvent::Started {
                index: 3,
                generation: 1
            }
        );
        assert_eq!(
            wait_terminal(&rx),
            PlaybackEvent::Finished {
                index: 3,
                generation: 1
            }
        );
        let expected: Vec<i16> = input.iter().map(|s| s / 2).collect();
        assert_eq!(sink.samples(), expected);
    }

    #[test]
    fn missing_track_reports_failure() {
        let sink = Arc::new(MemorySink::new());
        let (mut engine, rx) = PlaybackEngine::new(sink, options(), 1.0);
        engine.play("/nonexistent/track.mp3", 0, 1);

        match wait_terminal(&rx) {
            PlaybackEvent::Failed {
                index,
                generation,
                message,
            } => {
                assert_eq!((index, generation), (0, 1));
                assert!(message.contains("/nonexistent/track.mp3"));
            }
            other => panic!("expected Failed, got: {other:?}"),
        }
    }

    #[test]
    fn paused_worker_writes_nothing_until_resumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(&dir, "b.wav", &[5; 512]);

        let sink = Arc::new(GatedSink::default());
        let (mut engine, rx) = PlaybackEngine::new(sink.clone(), options(), 1.0);
        engine.play(path.to_str().unwrap(), 0, 1);
        wait_for_poll(&sink);

        engine.pause();
        assert!(engine.is_paused());
        assert!(sink.inner.is_paused());
        sink.open.store(true, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(sink.inner.chunk_count(), 0);

        engine.resume();
        assert!(matches!(wait_terminal(&rx), PlaybackEvent::Finished { .. }));
        assert_eq!(sink.inner.samples(), vec![5; 512]);
    }

    #[test]
    fn stop_cancels_without_finished_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(&dir, "c.wav", &[9; 512]);

        let sink = Arc::new(GatedSink::default());
        let (mut engine, rx) = PlaybackEngine::new(sink.clone(), options(), 1.0);
        engine.play(path.to_str().unwrap(), 0, 1);
        wait_for_poll(&sink);

        engine.stop();
        sink.open.store(true, Ordering::SeqCst);

        let deadline = std::time::Instant::now() + Duration::from_millis(300);
        while let Ok(event) = rx.recv_timeout(deadline - std::time::Instant::now()) {
            assert!(
                matches!(event, PlaybackEvent::Started { .. }),
                "unexpected event after stop: {event:?}"
            );
            if std::time::Instant::now() >= deadline {
                break;
            }
        }
        assert_eq!(sink.inner.chunk_count(), 0);
    }

    #[test]
    fn new_track_supersedes_old_one() {
        let dir = tempfile::tempdir().unwrap();
        let first = wav_file(&dir, "first.wav", &[1; 256]);
        let second = wav_file(&dir, "second.wav", &[2; 256]);

        let sink = Arc::new(GatedSink::default());
        let (mut engine, rx) = PlaybackEngine::new(sink.clone(), options(), 1.0);
        engine.play(first.to_str().unwrap(), 0, 1);
        wait_for_poll(&sink);
        engine.play(second.to_str().unwrap(), 1, 2);
        sink.open.store(true, Ordering::SeqCst);

        assert_eq!(
            wait_terminal(&rx),
            PlaybackEvent::Finished {
                index: 1,
                generation: 2
            }
        );
        assert_eq!(sink.inner.samples(), vec![2; 256]);
    }

    #[test]
    fn apply_maps_player_commands() {
        let sink = Arc::new(MemorySink::new());
        let playlist = Playlist::new(vec!["a.mp3".to_string()]).unwrap();
        let (mut engine, _rx) = PlaybackEngine::new(sink.clone(), options(), 1.0);

        engine.apply(&PlayerCommand::SetVolume(1.5), &playlist);
        assert_eq!(engine.volume(), 1.5);
        engine.apply(&PlayerCommand::Pause, &playlist);
        assert!(engine.is_paused());
        engine.apply(&PlayerCommand::Resume, &playlist);
        assert!(!engine.is_paused());
        engine.apply(&PlayerCommand::Stop, &playlist);
        assert_eq!(sink.clear_count(), 1);
    }
}
