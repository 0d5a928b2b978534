//! # Run control
//!
//! One shared run-state machine for the whole run. The controller, the
//! ticker and the command listener all observe the same `watch` channel,
//! so a pause can never freeze one of them while another keeps going.
//!
//! Transitions: `Running <-> Paused`, and anything `-> Quitting`.
//! `Quitting` is terminal.
//!
//! A turn gate orders turn publication against ending the run: the
//! controller holds it from its last `Quitting` check until the turn's
//! `TurnComplete` is sent, and the quit sequence takes it to move to
//! `Quitting` and read the generation it will save.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Quitting,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Running => "Executing",
            RunState::Paused => "Paused",
            RunState::Quitting => "Quitting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunControl {
    state: Arc<watch::Sender<RunState>>,
    turn_gate: Arc<Mutex<()>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        let (state, _) = watch::channel(RunState::Running);
        Self {
            state: Arc::new(state),
            turn_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// `Running -> Paused`. Returns whether the state changed.
    pub fn pause(&self) -> bool {
        self.transition(RunState::Running, RunState::Paused)
    }

    /// `Paused -> Running`. Returns whether the state changed.
    pub fn resume(&self) -> bool {
        self.transition(RunState::Paused, RunState::Running)
    }

    /// Moves to `Quitting` from any other state. Only the first caller gets
    /// `true`, which makes it the owner of the end-of-run sequence.
    pub fn quit(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == RunState::Quitting {
                return false;
            }
            *state = RunState::Quitting;
            true
        })
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.state.send_if_modified(|state| {
            if *state != from {
                return false;
            }
            *state = to;
            true
        })
    }

    /// Blocks while paused, then reports the state that ended the wait
    /// (`Running` or `Quitting`). Returns at once when not paused.
    pub async fn wait_while_paused(&self) -> RunState {
        let mut rx = self.state.subscribe();
        let state = rx.wait_for(|state| *state != RunState::Paused).await.map(|state| *state);
        state.unwrap_or(RunState::Quitting)
    }

    /// Waits until no turn is being published.
    pub async fn turn_gate(&self) -> MutexGuard<'_, ()> {
        self.turn_gate.lock().await
    }

    /// Completes once the run is quitting.
    pub async fn quitting(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == RunState::Quitting).await;
    }
}
