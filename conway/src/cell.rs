// cell.rs - Cell values and coordinates

use std::fmt;

/// Byte marker for a live cell in the stored image
pub const ALIVE: u8 = 255;
/// Byte marker for a dead cell in the stored image
pub const DEAD: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    Alive,
    #[default]
    Dead,
}

impl CellState {
    /// Decodes a stored byte. Anything other than the two markers is rejected.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            ALIVE => Some(CellState::Alive),
            DEAD => Some(CellState::Dead),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            CellState::Alive => ALIVE,
            CellState::Dead => DEAD,
        }
    }

    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }
}

/// Grid coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
