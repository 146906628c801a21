//! The interactive player loop.
//!
//! Key presses become [`Action`]s, actions become state transitions on
//! [`PlayerState`], and the resulting [`melodica_core::PlayerCommand`]s are
//! handed to the [`PlaybackEngine`]. Engine events flow back through the
//! same controller so that auto-advance only ever happens on the UI thread.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};

use melodica_audio::{PlaybackEngine, PlaybackEvent};
use melodica_core::{PlayerCommand, PlayerState};
use melodica_ui::terminal::terminal_size;
use melodica_ui::{Action, TerminalGuard, UiError, layout, map_key, view};

/// How long to wait for input before checking engine events.
const TICK: Duration = Duration::from_millis(100);

/// Whether the loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Couples the player state with the engine executing its commands.
pub struct Controller {
    state: PlayerState,
    engine: PlaybackEngine,
}

impl Controller {
    pub fn new(state: PlayerState, engine: PlaybackEngine) -> Self {
        Self { state, engine }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Apply one user action.
    pub fn handle_action(&mut self, action: Action) -> Flow {
        let command = match action {
            Action::Quit => {
                self.execute(PlayerCommand::Stop);
                return Flow::Quit;
            }
            Action::PlaySelected => Some(self.state.play_selected()),
            Action::Next => Some(self.state.next()),
            Action::Previous => Some(self.state.previous()),
            Action::Stop => Some(self.state.stop()),
            Action::TogglePause => self.state.toggle_pause(),
            Action::VolumeUp => Some(self.state.volume_up()),
            Action::VolumeDown => Some(self.state.volume_down()),
            Action::CursorUp => {
                self.state.cursor_up();
                None
            }
            Action::CursorDown => {
                self.state.cursor_down();
                None
            }
            Action::CursorHome => {
                self.state.cursor_home();
                None
            }
            Action::CursorEnd => {
                self.state.cursor_end();
                None
            }
        };
        if let Some(command) = command {
            self.execute(command);
        }
        Flow::Continue
    }

    /// Apply one engine event. Returns `true` when the screen changed.
    pub fn handle_event(&mut self, event: PlaybackEvent) -> bool {
        match event {
            PlaybackEvent::Started { index, generation } => {
                tracing::debug!(index, generation, "track started");
                false
            }
            PlaybackEvent::Finished { generation, .. } => {
                match self.state.on_track_finished(generation) {
                    Some(command) => self.execute(command),
                    None => tracing::debug!(generation, "no track to advance to"),
                }
                true
            }
            PlaybackEvent::Failed {
                index,
                generation,
                message,
            } => {
                tracing::error!(index, generation, %message, "playback failed");
                self.state.on_track_failed(generation);
                true
            }
        }
    }

    fn execute(&mut self, command: PlayerCommand) {
        tracing::debug!(?command, "executing");
        self.engine.apply(&command, self.state.playlist());
    }
}

/// Run the UI until the user quits.
pub fn run(mut controller: Controller, events: Receiver<PlaybackEvent>) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut out = io::stdout();
    let mut dirty = true;

    loop {
        if dirty {
            draw(&mut out, controller.state())?;
            dirty = false;
        }

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(action) = map_key(&key) {
                        if controller.handle_action(action) == Flow::Quit {
                            break;
                        }
                        dirty = true;
                    }
                }
                Event::Resize(..) => {
                    queue!(out, Clear(ClearType::All))?;
                    dirty = true;
                }
                _ => {}
            }
        }

        loop {
            match events.try_recv() {
                Ok(event) => dirty |= controller.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    anyhow::bail!("playback engine stopped unexpectedly")
                }
            }
        }
    }

    tracing::info!("quitting");
    Ok(())
}

fn draw<W: Write>(out: &mut W, state: &PlayerState) -> Result<()> {
    let (width, height) = terminal_size();
    match layout::compute(width, height) {
        Ok(layout) => view::draw(out, state, &layout)?,
        Err(UiError::TooSmall { .. }) => {
            queue!(
                out,
                Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                Print("Terminal too small")
            )?;
            out.flush()?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
