//! # Worker pool
//!
//! Splits a generation step into horizontal strips and fans them out to
//! the runtime's blocking pool, one task per strip, then joins them back
//! into a full grid. With a single worker the step runs inline in the
//! calling task.

use std::ops::Range;
use std::sync::Arc;

use tokio::task;
use tracing::trace;

use crate::error::{EngineError, EngineResult};
use crate::grid::Grid;
use crate::strip::compute_strip;

/// Contiguous row ranges covering `0..height`, one per worker.
///
/// Every strip gets `height / workers` rows and the last one also takes the
/// remainder, so each row lands in exactly one strip.
pub fn partition_rows(height: usize, workers: usize) -> Vec<Range<usize>> {
    let rows_per_strip = height / workers;
    (0..workers)
        .map(|i| {
            let start = i * rows_per_strip;
            let end = if i == workers - 1 { height } else { start + rows_per_strip };
            start..end
        })
        .collect()
}

/// Parallel stepper for grids of a fixed height.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    height: usize,
    strips: Vec<Range<usize>>,
}

impl WorkerPool {
    /// Fails unless `1 <= workers <= height`.
    pub fn new(workers: usize, height: usize) -> EngineResult<Self> {
        if workers == 0 {
            return Err(EngineError::config("worker count must be positive"));
        }
        if workers > height {
            return Err(EngineError::config(format!(
                "worker count {workers} exceeds grid height {height}"
            )));
        }

        Ok(Self {
            height,
            strips: partition_rows(height, workers),
        })
    }

    pub fn workers(&self) -> usize {
        self.strips.len()
    }

    pub fn strips(&self) -> &[Range<usize>] {
        &self.strips
    }

    /// Computes the generation after `previous`.
    ///
    /// Returns only once every strip has finished; no partial grid is ever
    /// produced.
    pub async fn advance(&self, previous: Arc<Grid>) -> EngineResult<Grid> {
        debug_assert_eq!(previous.height(), self.height);
        let (width, height) = (previous.width(), previous.height());

        // Sequential if 1 worker
        if self.strips.len() == 1 {
            let cells = compute_strip(&previous, 0..height);
            return Ok(Grid::from_cells(width, height, cells));
        }

        let mut handles = Vec::with_capacity(self.strips.len());
        for rows in &self.strips {
            let grid = Arc::clone(&previous);
            let rows = rows.clone();
            handles.push(task::spawn_blocking(move || compute_strip(&grid, rows)));
        }

        // Strips are in row order, so appending them reassembles the grid.
        let mut cells = Vec::with_capacity(width * height);
        for (i, handle) in handles.into_iter().enumerate() {
            let strip = handle.await?;
            trace!(strip = i, cells = strip.len(), "strip joined");
            cells.extend(strip);
        }

        Ok(Grid::from_cells(width, height, cells))
    }
}
