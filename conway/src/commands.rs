//! # Command listener
//!
//! Consumes external control commands for the lifetime of a run.
//!
//! ## Commands
//!
//! - `Save` persists the current generation, leaving the run untouched
//! - `Pause` / `Resume` flip the shared run state; the controller notices at
//!   its next turn boundary
//! - `Quit` persists the current generation, waits for the IO service to go
//!   idle, reports `Quitting` and closes the event sink. No final-turn report
//!   is sent for a run ended this way.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::control::{RunControl, RunState};
use crate::error::EngineResult;
use crate::events::{Event, EventSink};
use crate::io::IoHandle;
use crate::world::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    Pause,
    Resume,
    /// Pause when running, resume when paused
    TogglePause,
    Quit,
}

impl Command {
    /// Key bindings: `s` save, `p` pause/resume, `r` resume, `q` quit.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            's' => Some(Command::Save),
            'p' => Some(Command::TogglePause),
            'r' => Some(Command::Resume),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}

pub struct CommandListener {
    world: WorldState,
    control: RunControl,
    events: EventSink,
    io: IoHandle,
    commands: mpsc::Receiver<Command>,
}

impl CommandListener {
    pub fn new(
        world: WorldState,
        control: RunControl,
        events: EventSink,
        io: IoHandle,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            world,
            control,
            events,
            io,
            commands,
        }
    }

    /// Serves commands until a quit is handled, the command source closes,
    /// or the run ends some other way.
    ///
    /// Returns `true` if this listener ran the quit sequence.
    pub async fn run(mut self) -> EngineResult<bool> {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => {
                        if self.handle(command).await? {
                            return Ok(true);
                        }
                    }
                    None => {
                        debug!("command source closed");
                        // Nobody is left to resume a paused run.
                        self.control.resume();
                        return Ok(false);
                    }
                },
                _ = self.control.quitting() => return Ok(false),
            }
        }
    }

    async fn handle(&self, command: Command) -> EngineResult<bool> {
        match command {
            Command::Save => {
                let snapshot = self.world.snapshot();
                self.io.write_grid(&snapshot)?;
                info!(turn = snapshot.turn, "saved current generation");
            }
            Command::Pause => self.pause().await,
            Command::Resume => self.resume().await,
            Command::TogglePause => match self.control.state() {
                RunState::Paused => self.resume().await,
                _ => self.pause().await,
            },
            Command::Quit => return self.quit().await,
        }
        Ok(false)
    }

    async fn pause(&self) {
        if self.control.pause() {
            let turn = self.world.turn();
            info!(turn, "paused");
            self.events.send(Event::StateChange {
                completed_turns: turn,
                new_state: RunState::Paused,
            })
            .await;
        } else {
            warn!(state = %self.control.state(), "pause ignored");
        }
    }

    async fn resume(&self) {
        if self.control.resume() {
            let turn = self.world.turn();
            info!(turn, "resumed");
            self.events.send(Event::StateChange {
                completed_turns: turn,
                new_state: RunState::Running,
            })
            .await;
        } else {
            warn!(state = %self.control.state(), "resume ignored");
        }
    }

    async fn quit(&self) -> EngineResult<bool> {
        // The saved generation is the last one published before Quitting.
        let snapshot = {
            let _gate = self.control.turn_gate().await;
            if !self.control.quit() {
                warn!("quit ignored, run is already ending");
                return Ok(false);
            }
            self.world.snapshot()
        };
        info!(turn = snapshot.turn, "quitting");
        let flushed = match self.io.write_grid(&snapshot) {
            Ok(()) => self.io.wait_idle().await,
            Err(e) => Err(e),
        };
        self.events
            .send_and_close(Event::StateChange {
                completed_turns: snapshot.turn,
                new_state: RunState::Quitting,
            })
            .await;
        flushed.map(|()| true)
    }
}
