//! Shared world state: the current generation and its turn number.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::grid::Grid;

/// An immutable generation paired with the turn that produced it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub grid: Arc<Grid>,
    pub turn: u32,
}

/// Handle to the single mutable piece of state in a run.
///
/// Cloning the handle shares the state. Readers get a consistent
/// `(grid, turn)` pair; the lock is held just long enough to clone an `Arc`.
#[derive(Debug, Clone)]
pub struct WorldState {
    current: Arc<RwLock<Snapshot>>,
}

impl WorldState {
    /// World at turn 0.
    pub fn new(grid: Grid) -> Self {
        Self {
            current: Arc::new(RwLock::new(Snapshot {
                grid: Arc::new(grid),
                turn: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.read().clone()
    }

    pub fn turn(&self) -> u32 {
        self.current.read().turn
    }

    /// Replaces grid and turn together. Only the controller calls this, and
    /// only with a fully computed generation.
    pub(crate) fn publish(&self, grid: Arc<Grid>, turn: u32) {
        *self.current.write() = Snapshot { grid, turn };
    }
}
