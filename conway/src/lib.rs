//! # Conway
//!
//! A concurrent Game of Life engine on a toroidal grid.
//!
//! Each generation is split into row strips computed in parallel against
//! the previous, immutable generation. Alongside the turn loop a ticker
//! reports the live-cell count and a command listener handles
//! pause/resume/save/quit, all coordinated through one shared world lock
//! and one shared run state.
//!
//! ## Modules
//!
//! - [`rules`]: neighbour counting and the birth/survival rule
//! - [`strip`] and [`pool`]: strip decomposition and the fan-out/fan-in step
//! - [`world`]: the shared `(grid, turn)` snapshot
//! - [`controller`], [`ticker`], [`commands`]: the three long-lived tasks
//! - [`engine`]: wiring and end-of-run handling
//! - [`io`] and [`pgm`]: the byte-stream image collaborator

pub mod cell;
pub mod commands;
pub mod control;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod io;
pub mod params;
pub mod patterns;
pub mod pgm;
pub mod pool;
pub mod rules;
pub mod strip;
pub mod ticker;
pub mod world;

pub use cell::{Cell, CellState, ALIVE, DEAD};
pub use commands::Command;
pub use control::{RunControl, RunState};
pub use controller::RunOutcome;
pub use engine::{Engine, EngineHandle};
pub use error::{EngineError, EngineResult};
pub use events::{Event, EventSink};
pub use grid::Grid;
pub use io::{GridStore, IoHandle, MemoryStore};
pub use params::Params;
pub use pgm::PgmStore;
pub use world::{Snapshot, WorldState};
