//! # Engine
//!
//! Wires one run together: loads turn 0 through the IO service, starts the
//! ticker and command listener next to the controller, and performs the
//! end-of-run sequence.
//!
//! Exactly one party ends the run. If the controller finishes every turn
//! first, the engine saves the final grid, reports `FinalTurnComplete`,
//! waits for IO to go idle and reports `Quitting`. If a quit command gets
//! there first, the command listener does its own save and report instead
//! and no final-turn report is sent. Either way the event sink is closed
//! exactly once.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::commands::{Command, CommandListener};
use crate::control::{RunControl, RunState};
use crate::controller::{Controller, RunOutcome};
use crate::error::EngineResult;
use crate::events::{Event, EventSink};
use crate::io::IoHandle;
use crate::params::Params;
use crate::pool::WorkerPool;
use crate::ticker::Ticker;
use crate::world::WorldState;

/// Capacity of the command channel created by [`Engine::spawn`]
const COMMAND_BUFFER: usize = 16;

pub struct Engine {
    params: Params,
    io: IoHandle,
}

/// A run in progress, as seen by the embedding caller.
pub struct EngineHandle {
    /// Ordered event stream; ends when the run ends.
    pub events: mpsc::Receiver<Event>,
    /// Control commands for the run.
    pub commands: mpsc::Sender<Command>,
    /// Resolves with the outcome once the run has fully shut down.
    pub task: JoinHandle<EngineResult<RunOutcome>>,
}

impl Engine {
    /// Validates `params` before anything is started.
    pub fn new(params: Params, io: IoHandle) -> EngineResult<Self> {
        params.validate()?;
        Ok(Self { params, io })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Starts the run on the current runtime.
    pub fn spawn(self) -> EngineHandle {
        let (sink, events) = EventSink::channel();
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(self.run(sink, rx));
        EngineHandle { events, commands, task }
    }

    /// Runs to completion or quit. The sink is closed on every exit path.
    pub async fn run(
        self,
        events: EventSink,
        commands: mpsc::Receiver<Command>,
    ) -> EngineResult<RunOutcome> {
        let result = self.drive(&events, commands).await;
        if let Err(e) = &result {
            error!(error = %e, "run failed");
        }
        events.close().await;
        result
    }

    async fn drive(
        &self,
        events: &EventSink,
        commands: mpsc::Receiver<Command>,
    ) -> EngineResult<RunOutcome> {
        let Params {
            width,
            height,
            turns,
            threads,
            tick_interval,
        } = self.params;

        let grid = self.io.read_grid(width, height).await?;
        let pool = WorkerPool::new(threads, height)?;
        info!(width, height, turns, threads, alive = grid.alive_count(), "starting run");

        let seeded = grid
            .alive_cells()
            .into_iter()
            .map(|cell| Event::CellFlipped { completed_turns: 0, cell });
        events.send_all(seeded).await;

        let world = WorldState::new(grid);
        let control = RunControl::new();

        let ticker =
            Ticker::new(world.clone(), control.clone(), events.clone(), tick_interval).spawn();
        let listener = CommandListener::new(
            world.clone(),
            control.clone(),
            events.clone(),
            self.io.clone(),
            commands,
        );
        let listener = tokio::spawn(listener.run());

        let controller =
            Controller::new(world.clone(), pool, control.clone(), events.clone(), turns);
        let advanced = controller.run().await;

        // Whoever moves the run to Quitting first owns the end-of-run sequence.
        let owns_ending = control.quit();
        ticker.await?;

        let ending = match advanced {
            Ok(RunOutcome::Completed { turns }) if owns_ending => {
                self.finish(&world, events).await.map(|()| {
                    info!(turns, "run complete");
                    RunOutcome::Completed { turns }
                })
            }
            // A quit command got in after the last turn.
            Ok(RunOutcome::Completed { turns }) => Ok(RunOutcome::Quit { turn: turns }),
            // Turns stop at the generation the quit sequence saved.
            Ok(quit) => Ok(quit),
            Err(e) => Err(e),
        };

        // The listener either ran the quit sequence or stops now that the
        // run is quitting.
        let listened = listener.await?;
        let outcome = ending?;
        listened?;
        Ok(outcome)
    }

    async fn finish(&self, world: &WorldState, events: &EventSink) -> EngineResult<()> {
        let snapshot = world.snapshot();
        self.io.write_grid(&snapshot)?;
        events
            .send(Event::FinalTurnComplete {
                completed_turns: snapshot.turn,
                alive: snapshot.grid.alive_cells(),
            })
            .await;

        let idle = self.io.wait_idle().await;
        events
            .send_and_close(Event::StateChange {
                completed_turns: snapshot.turn,
                new_state: RunState::Quitting,
            })
            .await;
        idle
    }
}
