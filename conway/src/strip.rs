// strip.rs - One worker's share of a generation step

use std::ops::Range;

use crate::cell::CellState;
use crate::grid::Grid;
use crate::rules::next_cell_state;

/// Next-generation cells for the rows in `rows`, row-major.
///
/// Reads only `previous`; the result covers exactly `rows.len() * width` cells
/// and belongs to the caller alone.
pub fn compute_strip(previous: &Grid, rows: Range<usize>) -> Vec<CellState> {
    let width = previous.width();
    let mut strip = Vec::with_capacity(rows.len() * width);
    for y in rows {
        for x in 0..width {
            strip.push(next_cell_state(previous, x, y));
        }
    }
    strip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn test_strip_covers_only_its_rows() {
        // Vertical blinker through rows 1..4 becomes horizontal on row 2.
        let grid = Grid::with_alive(5, 5, [Cell::new(2, 1), Cell::new(2, 2), Cell::new(2, 3)]);

        let middle = compute_strip(&grid, 2..3);
        assert_eq!(middle.len(), 5);
        assert_eq!(
            middle,
            vec![
                CellState::Dead,
                CellState::Alive,
                CellState::Alive,
                CellState::Alive,
                CellState::Dead,
            ]
        );

        let top = compute_strip(&grid, 0..2);
        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|state| !state.is_alive()));
    }

    #[test]
    fn test_empty_range() {
        let grid = Grid::new(3, 3);
        assert!(compute_strip(&grid, 1..1).is_empty());
    }
}
