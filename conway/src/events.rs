//! Events streamed to the observer, and the sink that carries them.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::cell::Cell;
use crate::control::RunState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A cell changed state during `completed_turns`. Turn 0 carries the
    /// live cells of the initial grid.
    CellFlipped { completed_turns: u32, cell: Cell },
    /// Every `CellFlipped` for this turn has been sent.
    TurnComplete { completed_turns: u32 },
    /// Periodic population report.
    AliveCellsCount { completed_turns: u32, cells_count: usize },
    /// Sent once when every configured turn has run.
    FinalTurnComplete { completed_turns: u32, alive: Vec<Cell> },
    StateChange { completed_turns: u32, new_state: RunState },
}

impl Event {
    pub fn completed_turns(&self) -> u32 {
        match self {
            Event::CellFlipped { completed_turns, .. }
            | Event::TurnComplete { completed_turns }
            | Event::AliveCellsCount { completed_turns, .. }
            | Event::FinalTurnComplete { completed_turns, .. }
            | Event::StateChange { completed_turns, .. } => *completed_turns,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::CellFlipped { completed_turns, cell } => {
                write!(f, "Turn {completed_turns}: cell {cell} flipped")
            }
            Event::TurnComplete { completed_turns } => {
                write!(f, "Turn {completed_turns} complete")
            }
            Event::AliveCellsCount { completed_turns, cells_count } => {
                write!(f, "Turn {completed_turns}: {cells_count} alive cells")
            }
            Event::FinalTurnComplete { completed_turns, alive } => {
                write!(f, "Final turn {completed_turns}: {} alive cells", alive.len())
            }
            Event::StateChange { completed_turns, new_state } => {
                write!(f, "Turn {completed_turns}: {new_state}")
            }
        }
    }
}

/// Capacity of the channel created by [`EventSink::channel`]
pub const EVENT_BUFFER: usize = 1024;

/// Ordered outbound event channel shared by every task in a run.
///
/// The channel is bounded: a sender waits for room once the observer falls
/// `capacity` events behind. The sink lock is held while waiting, so a
/// batch is never interleaved with other senders and nothing can follow
/// the closing event. The sink is closed exactly once; anything sent
/// afterwards is dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Arc<Mutex<Option<mpsc::Sender<Event>>>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::Receiver<Event>) {
        Self::bounded(EVENT_BUFFER)
    }

    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sink = Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        (sink, rx)
    }

    /// Returns `false` if the sink is closed or the observer has gone away.
    pub async fn send(&self, event: Event) -> bool {
        let guard = self.tx.lock().await;
        match guard.as_ref() {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Sends a batch without letting other senders interleave.
    pub async fn send_all(&self, events: impl IntoIterator<Item = Event>) -> bool {
        let guard = self.tx.lock().await;
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        for event in events {
            if tx.send(event).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Sends `event` as the last message and closes the sink.
    pub async fn send_and_close(&self, event: Event) -> bool {
        let last = self.tx.lock().await.take();
        match last {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    pub async fn close(&self) {
        self.tx.lock().await.take();
    }

    pub async fn is_closed(&self) -> bool {
        self.tx.lock().await.is_none()
    }
}
