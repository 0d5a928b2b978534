// ticker.rs - Periodic alive-cell reports

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::control::{RunControl, RunState};
use crate::events::{Event, EventSink};
use crate::world::WorldState;

/// Samples the world on a fixed interval, independent of turn cadence.
pub struct Ticker {
    world: WorldState,
    control: RunControl,
    events: EventSink,
    period: Duration,
}

impl Ticker {
    pub fn new(
        world: WorldState,
        control: RunControl,
        events: EventSink,
        period: Duration,
    ) -> Self {
        Self {
            world,
            control,
            events,
            period,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until the run starts quitting or the sink closes. The first
    /// report comes one full period after start; nothing is reported while
    /// paused.
    pub async fn run(self) {
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.control.state() {
                        RunState::Paused => continue,
                        RunState::Quitting => break,
                        RunState::Running => {}
                    }

                    let snapshot = self.world.snapshot();
                    let cells_count = snapshot.grid.alive_count();
                    let report = Event::AliveCellsCount {
                        completed_turns: snapshot.turn,
                        cells_count,
                    };
                    if !self.events.send(report).await {
                        break;
                    }
                }
                _ = self.control.quitting() => break,
            }
        }
        debug!("ticker stopped");
    }
}
