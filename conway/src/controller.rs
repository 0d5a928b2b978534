//! The turn loop.

use std::sync::Arc;

use tokio::task;
use tracing::debug;

use crate::control::{RunControl, RunState};
use crate::error::EngineResult;
use crate::events::{Event, EventSink};
use crate::pool::WorkerPool;
use crate::world::WorldState;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every configured turn ran.
    Completed { turns: u32 },
    /// A quit command ended the run after `turn` completed turns.
    Quit { turn: u32 },
}

/// Advances the world one generation per turn. The only writer of
/// [`WorldState`].
pub struct Controller {
    world: WorldState,
    pool: WorkerPool,
    control: RunControl,
    events: EventSink,
    turns: u32,
}

impl Controller {
    pub fn new(
        world: WorldState,
        pool: WorkerPool,
        control: RunControl,
        events: EventSink,
        turns: u32,
    ) -> Self {
        Self {
            world,
            pool,
            control,
            events,
            turns,
        }
    }

    /// Runs turns until the configured count is reached or the run starts
    /// quitting. Pause and quit are only honoured between turns.
    pub async fn run(&self) -> EngineResult<RunOutcome> {
        let mut completed = self.world.turn();

        for turn in completed + 1..=self.turns {
            if self.control.wait_while_paused().await == RunState::Quitting {
                return Ok(RunOutcome::Quit { turn: completed });
            }

            let previous = self.world.snapshot().grid;
            let next = self.pool.advance(Arc::clone(&previous)).await?;

            {
                let _gate = self.control.turn_gate().await;

                // A quit that landed mid-computation keeps the last published turn.
                if self.control.state() == RunState::Quitting {
                    return Ok(RunOutcome::Quit { turn: completed });
                }

                let flips = previous
                    .flipped_cells(&next)
                    .map(|cell| Event::CellFlipped { completed_turns: turn, cell });
                self.events.send_all(flips).await;
                self.world.publish(Arc::new(next), turn);
                self.events.send(Event::TurnComplete { completed_turns: turn }).await;
            }

            completed = turn;
            debug!(turn, "turn complete");

            // Let the ticker and command listener in between turns.
            task::yield_now().await;
        }

        Ok(RunOutcome::Completed { turns: completed })
    }
}
