//! The total ordering of an ingest job's work units.
//!
//! Work units are ordered by the nested loops below, outermost first:
//!
//! ```text
//! for t in t_start..t_stop step t_tile_size
//!   for z_chunk_start in z_start..z_stop step z_chunk_size
//!     for y in y_start..y_stop step y_tile_size
//!       for x in x_start..x_stop step x_tile_size
//!         for z in z_chunk_start..min(z_chunk_start + z_chunk_size, z_stop)
//! ```
//!
//! [TileGrid] maps an index in that ordering directly to the coordinates of the work unit,
//! so a worker can start at its window without walking the units before it.

use crate::error::IngestError;
use crate::models::IngestJobSpec;

use std::ops::Range;

/// One axis of the grid: a half-open range walked with a fixed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Axis {
    start: u64,
    step: u64,
    count: u64,
}

impl Axis {
    fn new(start: u64, stop: u64, step: u64, field: &'static str) -> Result<Self, IngestError> {
        if step == 0 {
            return Err(IngestError::ZeroSize { field });
        }
        let count = if stop > start {
            (stop - start).div_ceil(step)
        } else {
            0
        };
        Ok(Axis { start, step, count })
    }

    fn value(&self, index: u64) -> u64 {
        self.start + index * self.step
    }
}

/// Coordinates of one work unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePosition {
    /// Time index
    pub t: u64,
    /// First z index of the chunk containing the tile
    pub z_chunk_start: u64,
    /// Pixel offset of the tile along y
    pub y: u64,
    /// Pixel offset of the tile along x
    pub x: u64,
    /// Absolute z index of the tile
    pub z: u64,
    pub chunk_x: u64,
    pub chunk_y: u64,
    pub chunk_z: u64,
    /// Number of z tiles in the chunk containing the tile
    pub num_tiles_in_chunk: u64,
}

/// Index-to-coordinate mapping over the work units of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    t: Axis,
    y: Axis,
    x: Axis,
    z_start: u64,
    z_stop: u64,
    z_chunk_size: u64,
    /// Units in one full chunk across the whole x/y plane.
    chunk_block: u64,
    /// Units in one time step.
    per_t: u64,
    total: u64,
}

impl TileGrid {
    /// Build the grid of a job.
    ///
    /// Fails if a tile or chunk size is zero, or if the job has more work units than fit in a
    /// `u64`.
    pub fn new(job: &IngestJobSpec) -> Result<Self, IngestError> {
        let t = Axis::new(job.t_start, job.t_stop, job.t_tile_size, "t_tile_size")?;
        let y = Axis::new(job.y_start, job.y_stop, job.y_tile_size, "y_tile_size")?;
        let x = Axis::new(job.x_start, job.x_stop, job.x_tile_size, "x_tile_size")?;
        let z = Axis::new(job.z_start, job.z_stop, 1, "z_tile_size")?;
        if job.z_chunk_size == 0 {
            return Err(IngestError::ZeroSize {
                field: "z_chunk_size",
            });
        }

        let plane = y
            .count
            .checked_mul(x.count)
            .ok_or(IngestError::VolumeTooLarge)?;
        let per_t = plane
            .checked_mul(z.count)
            .ok_or(IngestError::VolumeTooLarge)?;
        let total = per_t
            .checked_mul(t.count)
            .ok_or(IngestError::VolumeTooLarge)?;
        // A chunk never holds more tiles than the z range, so this cannot exceed per_t.
        let chunk_block = plane * job.z_chunk_size.min(z.count);

        Ok(TileGrid {
            t,
            y,
            x,
            z_start: job.z_start,
            z_stop: job.z_stop,
            z_chunk_size: job.z_chunk_size,
            chunk_block,
            per_t,
            total,
        })
    }

    /// Total number of work units in the job.
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Clamp a window to the grid, returning the range of indices it covers.
    ///
    /// # Arguments
    ///
    /// * `items_to_skip`: Index of the first unit in the window
    /// * `max_items`: Maximum number of units in the window, or `None` for no limit
    pub fn window(&self, items_to_skip: u64, max_items: Option<u64>) -> Range<u64> {
        let start = items_to_skip.min(self.total);
        let end = match max_items {
            Some(max_items) => start.saturating_add(max_items).min(self.total),
            None => self.total,
        };
        start..end
    }

    /// Returns the coordinates of the work unit at `index`, or `None` if out of range.
    pub fn position(&self, index: u64) -> Option<TilePosition> {
        if index >= self.total {
            return None;
        }
        let t_index = index / self.per_t;
        let in_t = index % self.per_t;

        // Every chunk before the last is full, so chunks start at multiples of chunk_block.
        let chunk_index = in_t / self.chunk_block;
        let in_chunk = in_t % self.chunk_block;
        let z_chunk_start = self.z_start + chunk_index * self.z_chunk_size;
        let num_tiles_in_chunk = self.z_chunk_size.min(self.z_stop - z_chunk_start);

        let row = self.x.count * num_tiles_in_chunk;
        let y_index = in_chunk / row;
        let x_index = (in_chunk % row) / num_tiles_in_chunk;
        let z_offset = in_chunk % num_tiles_in_chunk;

        let x = self.x.value(x_index);
        let y = self.y.value(y_index);
        Some(TilePosition {
            t: self.t.value(t_index),
            z_chunk_start,
            y,
            x,
            z: z_chunk_start + z_offset,
            chunk_x: x / self.x.step,
            chunk_y: y / self.y.step,
            chunk_z: z_chunk_start / self.z_chunk_size,
            num_tiles_in_chunk,
        })
    }
}

/// Returns the number of tiles in a job, counting each axis in whole tiles.
///
/// Enumeration walks z one slice at a time, so this agrees with [TileGrid::len] when
/// `z_tile_size` is 1.
pub fn tile_count(job: &IngestJobSpec) -> Result<u64, IngestError> {
    [
        Axis::new(job.x_start, job.x_stop, job.x_tile_size, "x_tile_size")?,
        Axis::new(job.y_start, job.y_stop, job.y_tile_size, "y_tile_size")?,
        Axis::new(job.z_start, job.z_stop, job.z_tile_size, "z_tile_size")?,
        Axis::new(job.t_start, job.t_stop, job.t_tile_size, "t_tile_size")?,
    ]
    .iter()
    .try_fold(1u64, |count, axis| {
        count
            .checked_mul(axis.count)
            .ok_or(IngestError::VolumeTooLarge)
    })
}
