//! Headless Game of Life runner.
//!
//! Reads `images/<W>x<H>.pgm`, runs the configured number of turns and
//! writes `out/<W>x<H>x<turn>.pgm`. Type `s`, `p` or `q` (then Enter) to
//! save, pause/resume or quit.
//!
//! Configuration comes from the environment: `GOL_WIDTH`, `GOL_HEIGHT`,
//! `GOL_TURNS`, `GOL_THREADS`, `GOL_TICK_MS`, plus `GOL_INPUT_DIR`,
//! `GOL_OUTPUT_DIR`, `GOL_PATTERN` (seed used when the input image is
//! missing) and `GOL_LOG`.

use std::env;
use std::error::Error;
use std::io::BufRead;
use std::thread;

use conway::{patterns, Command, Engine, Event, IoHandle, Params, PgmStore, RunOutcome};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Level};

fn log_level() -> Level {
    env::var("GOL_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO)
}

/// Writes a seed image when the input file is missing.
fn seed_input(store: &PgmStore, params: &Params) -> Result<(), Box<dyn Error>> {
    let name = Params::input_name(params.width, params.height);
    if store.input_path(&name).exists() {
        return Ok(());
    }

    let pattern = env::var("GOL_PATTERN").ok();
    let grid = patterns::seed_grid(params.width, params.height, pattern.as_deref())?;
    info!(pattern = pattern.as_deref().unwrap_or("random"), %name, "seeding missing input");
    store.write_input(&name, params.width, params.height, &grid.to_bytes())?;
    Ok(())
}

/// Forwards key presses from stdin. Runs on its own thread so a blocked
/// read never holds up runtime shutdown.
fn spawn_key_reader(commands: mpsc::Sender<Command>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { return };
            for command in line.chars().filter_map(Command::from_key) {
                if commands.blocking_send(command).is_err() {
                    return;
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_max_level(log_level()).init();

    let params = Params::from_env();
    let input_dir = env::var("GOL_INPUT_DIR").unwrap_or_else(|_| "images".into());
    let output_dir = env::var("GOL_OUTPUT_DIR").unwrap_or_else(|_| "out".into());
    info!(?params, %input_dir, %output_dir, "configuration");

    let store = PgmStore::new(input_dir, output_dir);
    seed_input(&store, &params)?;

    let (io, io_thread) = IoHandle::spawn(store)?;
    let mut run = Engine::new(params, io)?.spawn();
    spawn_key_reader(run.commands.clone());

    let mut flipped = 0usize;
    while let Some(event) = run.events.recv().await {
        match &event {
            Event::CellFlipped { .. } => flipped += 1,
            Event::TurnComplete { completed_turns } => {
                debug!(turn = completed_turns, flipped, "turn complete");
                flipped = 0;
            }
            Event::AliveCellsCount { .. }
            | Event::FinalTurnComplete { .. }
            | Event::StateChange { .. } => info!("{event}"),
        }
    }

    match run.task.await? {
        Ok(RunOutcome::Completed { turns }) => info!(turns, "finished"),
        Ok(RunOutcome::Quit { turn }) => info!(turn, "quit early"),
        Err(e) => {
            warn!(error = %e, "run failed");
            return Err(e.into());
        }
    }

    // The engine has dropped its IO handles, so the thread is winding down.
    if io_thread.join().is_err() {
        warn!("io thread panicked");
    }
    Ok(())
}
