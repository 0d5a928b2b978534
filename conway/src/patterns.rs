use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::cell::{Cell, CellState};
use crate::error::{EngineError, EngineResult};
use crate::grid::Grid;

/// A named seed pattern. `cells` are `(x, y)` offsets from the top-left corner.
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

pub const BLOCK: Pattern = Pattern {
    name: "Block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

pub const TOAD: Pattern = Pattern {
    name: "Toad",
    cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
};

pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
};

pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

pub const PULSAR: Pattern = Pattern {
    name: "Pulsar",
    cells: &[
        // Top half
        (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
        (0, 2), (5, 2), (7, 2), (12, 2),
        (0, 3), (5, 3), (7, 3), (12, 3),
        (0, 4), (5, 4), (7, 4), (12, 4),
        (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
        // Bottom half (mirrored)
        (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
        (0, 8), (5, 8), (7, 8), (12, 8),
        (0, 9), (5, 9), (7, 9), (12, 9),
        (0, 10), (5, 10), (7, 10), (12, 10),
        (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
    ],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "R-pentomino",
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

pub const GOSPER_GLIDER_GUN: Pattern = Pattern {
    name: "Gosper Glider Gun",
    cells: &[
        (24, 0), (22, 1), (24, 1),
        (12, 2), (13, 2), (20, 2), (21, 2), (34, 2), (35, 2),
        (11, 3), (15, 3), (20, 3), (21, 3), (34, 3), (35, 3),
        (0, 4), (1, 4), (10, 4), (16, 4), (20, 4), (21, 4),
        (0, 5), (1, 5), (10, 5), (14, 5), (16, 5), (17, 5), (22, 5), (24, 5),
        (10, 6), (16, 6), (24, 6),
        (11, 7), (15, 7),
        (12, 8), (13, 8),
    ],
};

pub const PATTERNS: &[Pattern] = &[
    BLOCK,
    BLINKER,
    TOAD,
    BEACON,
    GLIDER,
    PULSAR,
    R_PENTOMINO,
    GOSPER_GLIDER_GUN,
];

/// Looks a pattern up by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Pattern {
    /// Absolute coordinates of the pattern placed at `origin`, before wrapping.
    pub fn cells_at(&self, origin: Cell) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .map(move |&(dx, dy)| Cell::new(origin.x + dx, origin.y + dy))
    }
}

/// Sets the pattern's cells alive at `origin`, wrapping past the edges.
pub fn place(grid: &mut Grid, pattern: &Pattern, origin: Cell) {
    let (width, height) = (grid.width(), grid.height());
    for cell in pattern.cells_at(origin) {
        grid.set(cell.x % width, cell.y % height, CellState::Alive);
    }
}

/// Starting grid when no input image exists: the named pattern placed a
/// third of the way in, or a random fill seeded from the dimensions.
pub fn seed_grid(width: usize, height: usize, name: Option<&str>) -> EngineResult<Grid> {
    let mut grid = Grid::new(width, height);
    match name {
        Some(name) => {
            let pattern = find(name)
                .ok_or_else(|| EngineError::config(format!("unknown pattern {name:?}")))?;
            place(&mut grid, pattern, Cell::new(width / 3, height / 3));
        }
        None => random_fill(&mut grid, (width as u64) ^ ((height as u64) << 32)),
    }
    Ok(grid)
}

/// Deterministic pseudo-random fill, roughly a third of the cells alive.
pub fn random_fill(grid: &mut Grid, seed_value: u64) {
    let mut hasher = DefaultHasher::new();
    seed_value.hash(&mut hasher);
    let mut seed = hasher.finish();

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let state = if (seed >> 33) % 3 == 0 { CellState::Alive } else { CellState::Dead };
            grid.set(x, y, state);
        }
    }
}
