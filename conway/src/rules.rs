//! Conway transition for a single cell on a toroidal grid.

use crate::cell::CellState;
use crate::grid::Grid;

const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Live cells among the 8 neighbours of `(x, y)`, wrapping at every edge.
pub fn alive_neighbours(grid: &Grid, x: usize, y: usize) -> u8 {
    let (x, y) = (x as isize, y as isize);
    NEIGHBOUR_OFFSETS
        .iter()
        .filter(|&&(dx, dy)| grid.get_wrapped(x + dx, y + dy).is_alive())
        .count() as u8
}

/// State of `(x, y)` in the next generation.
pub fn next_cell_state(grid: &Grid, x: usize, y: usize) -> CellState {
    match (grid.get(x, y), alive_neighbours(grid, x, y)) {
        // Survival
        (CellState::Alive, 2) | (CellState::Alive, 3) => CellState::Alive,
        // Birth
        (CellState::Dead, 3) => CellState::Alive,
        // Death or stays dead
        _ => CellState::Dead,
    }
}
