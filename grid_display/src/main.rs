// main.rs - Game of Life viewer fed by the engine's event stream
//
// The engine runs on a tokio runtime owned by the viewer. The viewer keeps
// its own copy of the grid, built purely from CellFlipped events, and
// sends commands back over the engine's command channel.

use std::env;
use std::error::Error;

use eframe::egui;
use egui::Color32;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Level};

use conway::{
    CellState, Command, Engine, EngineResult, Event, Grid, IoHandle, Params, PgmStore, RunOutcome,
    RunState, patterns,
};

mod ui;

/// Upper bound on events applied per frame
const EVENTS_PER_FRAME: usize = 64 * 1024;

/// Defaults for a grid small enough to draw cell by cell.
fn viewer_default(key: &str) -> Option<String> {
    let value = match key {
        "GOL_WIDTH" | "GOL_HEIGHT" => "64",
        "GOL_TURNS" => "100000",
        "GOL_THREADS" => "4",
        _ => return None,
    };
    Some(value.to_string())
}

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let viewer = match setup() {
        Ok(viewer) => viewer,
        Err(e) => {
            error!(error = %e, "could not start the run");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 950.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(|_cc| Box::new(viewer)),
    )
}

/// Seeds a missing input image, then starts the engine.
fn setup() -> Result<Viewer, Box<dyn Error>> {
    let params = Params::from_lookup(|key| env::var(key).ok().or_else(|| viewer_default(key)));
    let input_dir = env::var("GOL_INPUT_DIR").unwrap_or_else(|_| "images".into());
    let output_dir = env::var("GOL_OUTPUT_DIR").unwrap_or_else(|_| "out".into());

    let store = PgmStore::new(input_dir, output_dir);
    let name = Params::input_name(params.width, params.height);
    if !store.input_path(&name).exists() {
        let pattern = env::var("GOL_PATTERN").ok();
        let grid = patterns::seed_grid(params.width, params.height, pattern.as_deref())?;
        store.write_input(&name, params.width, params.height, &grid.to_bytes())?;
    }

    let (io, _io_thread) = IoHandle::spawn(store)?;
    Ok(Viewer::start(params, io)?)
}

pub struct Viewer {
    pub grid: Grid,
    pub turn: u32,
    pub alive_count: usize,
    pub state: RunState,
    /// Set once the event stream has ended
    pub status: Option<String>,
    pub live_color: Color32,
    pub dead_color: Color32,

    events: mpsc::Receiver<Event>,
    commands: mpsc::Sender<Command>,
    run: Option<JoinHandle<EngineResult<RunOutcome>>>,
    runtime: tokio::runtime::Runtime,
}

impl Viewer {
    fn start(params: Params, io: IoHandle) -> EngineResult<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let engine = Engine::new(params, io)?;
        let handle = {
            let _guard = runtime.enter();
            engine.spawn()
        };
        info!(width = params.width, height = params.height, turns = params.turns, "run started");

        Ok(Self {
            grid: Grid::new(params.width, params.height),
            turn: 0,
            alive_count: 0,
            state: RunState::Running,
            status: None,
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
            events: handle.events,
            commands: handle.commands,
            run: Some(handle.task),
            runtime,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some()
    }

    /// Applies the events received since the last frame, up to one frame's
    /// worth so a fast run cannot stall the UI.
    pub fn drain_events(&mut self) {
        for _ in 0..EVENTS_PER_FRAME {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finish();
                    break;
                }
            }
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::CellFlipped { cell, .. } => {
                let flipped = match self.grid.get(cell.x, cell.y) {
                    CellState::Alive => CellState::Dead,
                    CellState::Dead => CellState::Alive,
                };
                self.grid.set(cell.x, cell.y, flipped);
            }
            Event::TurnComplete { completed_turns } => self.turn = completed_turns,
            Event::AliveCellsCount { cells_count, .. } => self.alive_count = cells_count,
            Event::FinalTurnComplete { completed_turns, alive } => {
                self.turn = completed_turns;
                self.alive_count = alive.len();
            }
            Event::StateChange { new_state, .. } => self.state = new_state,
        }
    }

    fn finish(&mut self) {
        let Some(run) = self.run.take() else { return };
        let status = match self.runtime.block_on(run) {
            Ok(Ok(RunOutcome::Completed { turns })) => format!("Finished after {turns} turns"),
            Ok(Ok(RunOutcome::Quit { turn })) => format!("Quit at turn {turn}"),
            Ok(Err(e)) => format!("Run failed: {e}"),
            Err(e) => format!("Run panicked: {e}"),
        };
        info!("{status}");
        self.status = Some(status);
    }

    pub fn send(&self, command: Command) {
        if let Err(e) = self.commands.try_send(command) {
            warn!(?command, error = %e, "command dropped");
        }
    }
}
