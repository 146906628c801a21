//! Player state machine.
//!
//! [`PlayerState`] owns every decision the UI makes about which track is
//! current, whether playback is paused, and what the "Now Playing" pane says.
//! The audio engine only executes those decisions. Each start of a track bumps
//! a generation counter so that completion events from a superseded track can
//! be told apart from the live one.

use crate::playlist::Playlist;
use crate::volume::Volume;

/// What the player is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Nothing is playing.
    #[default]
    Stopped,
    /// A track is playing.
    Playing,
    /// A track is loaded but paused.
    Paused,
}

/// Instruction for the audio engine produced by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Start the track at `index`, tagged with `generation`.
    Play {
        /// Playlist index.
        index: usize,
        /// Generation assigned to this start.
        generation: u64,
    },
    /// Cancel the current track.
    Stop,
    /// Suspend output.
    Pause,
    /// Resume output.
    Resume,
    /// Apply a new gain factor.
    SetVolume(f64),
}

/// Complete UI-side state of the player.
#[derive(Debug, Clone)]
pub struct PlayerState {
    playlist: Playlist,
    current: usize,
    cursor: usize,
    status: PlaybackStatus,
    volume: Volume,
    generation: u64,
    auto_advance: bool,
    volume_shown: bool,
}

impl PlayerState {
    /// Create a stopped player positioned on the first track.
    pub fn new(playlist: Playlist, volume: Volume) -> Self {
        Self {
            playlist,
            current: 0,
            cursor: 0,
            status: PlaybackStatus::Stopped,
            volume,
            generation: 0,
            auto_advance: true,
            volume_shown: false,
        }
    }

    /// Disable or enable moving to the next track when one finishes.
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Index of the current (playing, paused, or last played) track.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Index of the highlighted playlist row.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Generation of the most recent track start.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start the track at `index` (wrapped into range).
    pub fn play(&mut self, index: usize) -> PlayerCommand {
        let index = index % self.playlist.len();
        self.current = index;
        self.cursor = index;
        self.set_status(PlaybackStatus::Playing);
        self.generation += 1;
        PlayerCommand::Play {
            index,
            generation: self.generation,
        }
    }

    /// Start the highlighted track.
    pub fn play_selected(&mut self) -> PlayerCommand {
        self.play(self.cursor)
    }

    /// Start the track after the current one, looping to the first.
    pub fn next(&mut self) -> PlayerCommand {
        self.play((self.current + 1) % self.playlist.len())
    }

    /// Start the track before the current one, looping to the last.
    pub fn previous(&mut self) -> PlayerCommand {
        let len = self.playlist.len();
        self.play((self.current + len - 1) % len)
    }

    /// Stop playback.
    pub fn stop(&mut self) -> PlayerCommand {
        self.set_status(PlaybackStatus::Stopped);
        PlayerCommand::Stop
    }

    /// Toggle between playing and paused. Does nothing while stopped.
    pub fn toggle_pause(&mut self) -> Option<PlayerCommand> {
        match self.status {
            PlaybackStatus::Playing => {
                self.set_status(PlaybackStatus::Paused);
                Some(PlayerCommand::Pause)
            }
            PlaybackStatus::Paused => {
                self.set_status(PlaybackStatus::Playing);
                Some(PlayerCommand::Resume)
            }
            PlaybackStatus::Stopped => None,
        }
    }

    /// Raise the volume. The pane shows the new level until the next
    /// status change, whatever the status.
    pub fn volume_up(&mut self) -> PlayerCommand {
        self.volume_shown = true;
        PlayerCommand::SetVolume(self.volume.raise())
    }

    pub fn volume_down(&mut self) -> PlayerCommand {
        self.volume_shown = true;
        PlayerCommand::SetVolume(self.volume.lower())
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
        self.volume_shown = false;
    }

    /// React to the engine reporting that a track ran to completion.
    ///
    /// Returns the command starting the next track when `generation` is the
    /// live one and auto-advance is enabled.
    pub fn on_track_finished(&mut self, generation: u64) -> Option<PlayerCommand> {
        if generation != self.generation || self.status == PlaybackStatus::Stopped {
            return None;
        }
        if !self.auto_advance {
            self.set_status(PlaybackStatus::Stopped);
            return None;
        }
        Some(self.next())
    }

    /// React to the engine reporting that a track failed.
    pub fn on_track_failed(&mut self, generation: u64) {
        if generation == self.generation {
            self.set_status(PlaybackStatus::Stopped);
        }
    }

    /// Text of the "Now Playing" pane.
    ///
    /// Right after a volume change the level is shown even when stopped or
    /// paused, naming the current track.
    pub fn now_playing_text(&self) -> String {
        if self.volume_shown {
            return self.volume_text();
        }
        match self.status {
            PlaybackStatus::Stopped => "Now Playing: None".to_string(),
            PlaybackStatus::Paused => "Paused".to_string(),
            PlaybackStatus::Playing => self.volume_text(),
        }
    }

    fn volume_text(&self) -> String {
        format!(
            "Now Playing: {} | Volume: {}%",
            self.playlist.track_name(self.current),
            self.volume.percent()
        )
    }

    pub fn cursor_up(&mut self) {
        let len = self.playlist.len();
        self.cursor = (self.cursor + len - 1) % len;
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1) % self.playlist.len();
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.playlist.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn player(n: usize) -> PlayerState {
        let entries = (1..=n).map(|i| format!("http://host/track{i}.mp3")).collect();
        PlayerState::new(Playlist::new(entries).unwrap(), Volume::default())
    }

    #[test]
    fn starts_stopped() {
        let p = player(3);
        assert_eq!(p.status(), PlaybackStatus::Stopped);
        assert_eq!(p.now_playing_text(), "Now Playing: None");
        assert_eq!(p.generation(), 0);
    }

    #[test]
    fn play_reports_track_and_volume() {
        let mut p = player(3);
        assert_eq!(
            p.play(1),
            PlayerCommand::Play {
                index: 1,
                generation: 1
            }
        );
        assert_eq!(p.now_playing_text(), "Now Playing: track2.mp3 | Volume: 100%");
        assert_eq!(p.cursor(), 1);
    }

    #[test]
    fn next_and_previous_wrap() {
        let mut p = player(3);
        p.play(2);
        assert_eq!(
            p.next(),
            PlayerCommand::Play {
                index: 0,
                generation: 2
            }
        );
        assert_eq!(
            p.previous(),
            PlayerCommand::Play {
                index: 2,
                generation: 3
            }
        );
    }

    #[test]
    fn pause_toggle_only_while_active() {
        let mut p = player(2);
        assert_eq!(p.toggle_pause(), None);

        p.play(0);
        assert_eq!(p.toggle_pause(), Some(PlayerCommand::Pause));
        assert_eq!(p.now_playing_text(), "Paused");
        assert_eq!(p.toggle_pause(), Some(PlayerCommand::Resume));
        assert_eq!(p.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn play_resets_pause() {
        let mut p = player(2);
        p.play(0);
        p.toggle_pause();
        p.next();
        assert_eq!(p.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn finished_advances_only_for_live_generation() {
        let mut p = player(2);
        p.play(1);
        let stale = p.generation();
        p.play(0);
        assert_eq!(p.on_track_finished(stale), None);

        let live = p.generation();
        assert_eq!(
            p.on_track_finished(live),
            Some(PlayerCommand::Play {
                index: 1,
                generation: live + 1
            })
        );
    }

    #[test]
    fn finished_after_stop_is_ignored() {
        let mut p = player(2);
        p.play(0);
        p.stop();
        assert_eq!(p.on_track_finished(p.generation()), None);
        assert_eq!(p.now_playing_text(), "Now Playing: None");
    }

    #[test]
    fn finished_without_auto_advance_stops() {
        let mut p = player(2).with_auto_advance(false);
        p.play(0);
        assert_eq!(p.on_track_finished(p.generation()), None);
        assert_eq!(p.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn failure_of_live_track_stops() {
        let mut p = player(2);
        p.play(0);
        p.on_track_failed(p.generation());
        assert_eq!(p.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn volume_changes_show_in_now_playing() {
        let mut p = player(1);
        p.play(0);
        assert_eq!(p.volume_up(), PlayerCommand::SetVolume(1.1));
        assert_eq!(p.now_playing_text(), "Now Playing: track1.mp3 | Volume: 110%");
        p.volume_down();
        p.volume_down();
        assert_eq!(p.volume().percent(), 90);
    }

    #[test]
    fn volume_keys_give_feedback_while_stopped_or_paused() {
        let mut p = player(2);
        p.volume_down();
        assert_eq!(p.now_playing_text(), "Now Playing: track1.mp3 | Volume: 90%");
        assert_eq!(p.status(), PlaybackStatus::Stopped);

        p.play(1);
        p.toggle_pause();
        assert_eq!(p.now_playing_text(), "Paused");
        p.volume_up();
        assert_eq!(p.now_playing_text(), "Now Playing: track2.mp3 | Volume: 100%");

        p.stop();
        assert_eq!(p.now_playing_text(), "Now Playing: None");
    }

    #[test]
    fn cursor_wraps() {
        let mut p = player(3);
        p.cursor_up();
        assert_eq!(p.cursor(), 2);
        p.cursor_down();
        assert_eq!(p.cursor(), 0);
        p.cursor_end();
        assert_eq!(p.cursor(), 2);
        p.cursor_home();
        assert_eq!(p.cursor(), 0);
        assert_eq!(
            p.play_selected(),
            PlayerCommand::Play {
                index: 0,
                generation: 1
            }
        );
    }
}
