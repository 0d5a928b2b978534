// grid.rs - Toroidal grid of cells for Conway's Game of Life

use std::ops::Range;

use crate::cell::{Cell, CellState};
use crate::error::{EngineError, EngineResult};

/// Fixed-size `width` x `height` grid stored row-major.
///
/// Dimensions never change after construction. Coordinates wrap at the
/// edges only through [`Grid::get_wrapped`]; plain indexing expects
/// in-bounds coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// All-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Dead; width * height],
        }
    }

    /// Builds a grid from `width * height` stored bytes, row-major.
    ///
    /// The byte count must match exactly; the input is never truncated or
    /// padded.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> EngineResult<Self> {
        let expected = width * height;
        if bytes.len() != expected {
            return Err(EngineError::Dimensions {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }

        let cells = bytes
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                CellState::from_byte(value).ok_or(EngineError::InvalidCell {
                    x: i % width,
                    y: i / width,
                    value,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self { width, height, cells })
    }

    /// Dead grid with the given cells set alive. Coordinates wrap.
    pub fn with_alive(width: usize, height: usize, alive: impl IntoIterator<Item = Cell>) -> Self {
        let mut grid = Self::new(width, height);
        for cell in alive {
            grid.set(cell.x % width, cell.y % height, CellState::Alive);
        }
        grid
    }

    /// Reassembles a grid from row-major cells produced by the workers.
    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<CellState>) -> Self {
        debug_assert_eq!(cells.len(), width * height, "strips must cover every cell");
        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> CellState {
        self.cells[y * self.width + x]
    }

    /// Looks a cell up with toroidal wrap on both axes.
    pub fn get_wrapped(&self, x: isize, y: isize) -> CellState {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.get(x, y)
    }

    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        self.cells[y * self.width + x] = state;
    }

    /// Cells of the rows in `rows`, row-major.
    pub fn rows(&self, rows: Range<usize>) -> &[CellState] {
        &self.cells[rows.start * self.width..rows.end * self.width]
    }

    /// Stored-byte form, row-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|state| state.to_byte()).collect()
    }

    /// Every live coordinate, in row-major order.
    pub fn alive_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_alive())
            .map(|(i, _)| Cell::new(i % self.width, i / self.width))
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_alive()).count()
    }

    /// Coordinates whose state differs between `self` and `next`.
    pub fn flipped_cells<'a>(&'a self, next: &'a Grid) -> impl Iterator<Item = Cell> + 'a {
        debug_assert_eq!((self.width, self.height), (next.width, next.height));
        let width = self.width;
        self.cells
            .iter()
            .zip(&next.cells)
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .map(move |(i, _)| Cell::new(i % width, i / width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{ALIVE, DEAD};

    #[test]
    fn test_from_bytes_rejects_wrong_count() {
        let err = Grid::from_bytes(4, 4, &[DEAD; 15]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Dimensions { expected: 16, actual: 15, .. }
        ));

        assert!(Grid::from_bytes(4, 4, &[DEAD; 17]).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_unknown_marker() {
        let mut bytes = vec![DEAD; 6];
        bytes[4] = 7;
        let err = Grid::from_bytes(3, 2, &bytes).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCell { x: 1, y: 1, value: 7 }));
    }

    #[test]
    fn test_bytes_layout_is_row_major() {
        let mut bytes = vec![DEAD; 12];
        bytes[5] = ALIVE; // row 1, column 1
        let grid = Grid::from_bytes(4, 3, &bytes).unwrap();
        assert_eq!(grid.get(1, 1), CellState::Alive);
        assert_eq!(grid.alive_cells(), vec![Cell::new(1, 1)]);
        assert_eq!(grid.to_bytes(), bytes);
    }

    #[test]
    fn test_wrapped_lookup() {
        let grid = Grid::with_alive(5, 4, [Cell::new(0, 0)]);
        assert!(grid.get_wrapped(5, 4).is_alive());
        assert!(grid.get_wrapped(-5, -4).is_alive());
        assert!(!grid.get_wrapped(-1, 0).is_alive());
    }

    #[test]
    fn test_flipped_cells_is_symmetric_difference() {
        let before = Grid::with_alive(4, 4, [Cell::new(0, 0), Cell::new(1, 1), Cell::new(2, 2)]);
        let after = Grid::with_alive(4, 4, [Cell::new(1, 1), Cell::new(3, 0), Cell::new(2, 3)]);

        let mut flipped: Vec<Cell> = before.flipped_cells(&after).collect();
        flipped.sort();
        assert_eq!(
            flipped,
            vec![Cell::new(0, 0), Cell::new(2, 2), Cell::new(2, 3), Cell::new(3, 0)]
        );
        assert_eq!(before.flipped_cells(&before).count(), 0);
    }

    #[test]
    fn test_alive_count_and_rows() {
        let grid = Grid::with_alive(3, 3, [Cell::new(0, 1), Cell::new(2, 1), Cell::new(1, 2)]);
        assert_eq!(grid.alive_count(), 3);
        assert_eq!(
            grid.rows(1..2),
            &[CellState::Alive, CellState::Dead, CellState::Alive]
        );
    }
}
