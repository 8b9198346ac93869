//! Lazy enumeration of the work units in one window of an ingest job.
//!
//! Workers that enumerate disjoint windows of the same job produce disjoint sets of messages,
//! and together cover the whole job, without any coordination between them. Re-running a window
//! reproduces identical messages.

use crate::error::IngestError;
use crate::grid::{TileGrid, TilePosition};
use crate::keys;
use crate::models::{IngestJobSpec, TileMessage};

use std::io::Write;
use std::iter::FusedIterator;
use std::ops::Range;

/// Iterator over the tile messages in a job's window.
///
/// Created by [enumerate_work]. Only indices inside the window are ever visited.
#[derive(Clone, Debug)]
pub struct WorkUnits<'a> {
    job: &'a IngestJobSpec,
    grid: TileGrid,
    indices: Range<u64>,
}

impl<'a> WorkUnits<'a> {
    /// Total number of work units in the job, regardless of the window.
    pub fn total(&self) -> u64 {
        self.grid.len()
    }

    /// Number of work units left in the window.
    pub fn remaining(&self) -> u64 {
        self.indices.end - self.indices.start
    }

    /// Index of the next work unit to be produced.
    pub fn next_index(&self) -> u64 {
        self.indices.start
    }

    fn message(&self, position: &TilePosition) -> TileMessage {
        let job = self.job;
        TileMessage {
            job_id: job.job_id,
            upload_queue_arn: job.upload_queue.clone(),
            ingest_queue_arn: job.ingest_queue.clone(),
            chunk_key: keys::chunk_key(
                position.num_tiles_in_chunk,
                &job.project_info,
                job.resolution,
                position.chunk_x,
                position.chunk_y,
                position.chunk_z,
                position.t,
            ),
            tile_key: keys::tile_key(
                &job.project_info,
                job.resolution,
                position.chunk_x,
                position.chunk_y,
                position.z,
                position.t,
            ),
        }
    }
}

impl Iterator for WorkUnits<'_> {
    type Item = TileMessage;

    fn next(&mut self) -> Option<TileMessage> {
        let index = self.indices.next()?;
        let position = self.grid.position(index)?;
        Some(self.message(&position))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }

    fn nth(&mut self, n: usize) -> Option<TileMessage> {
        let index = self.indices.nth(n)?;
        let position = self.grid.position(index)?;
        Some(self.message(&position))
    }
}

impl ExactSizeIterator for WorkUnits<'_> {}

impl FusedIterator for WorkUnits<'_> {}

/// Enumerate the work units in the window `[items_to_skip, items_to_skip + max_items)` of a job.
///
/// An absent `max_items` means the window runs to the end of the job.
pub fn enumerate_work(job: &IngestJobSpec) -> Result<WorkUnits<'_>, IngestError> {
    let grid = TileGrid::new(job)?;
    let indices = grid.window(job.items_to_skip, job.max_items);
    tracing::debug!(
        job_id = job.job_id,
        total = grid.len(),
        start = indices.start,
        end = indices.end,
        "enumerating work units"
    );
    Ok(WorkUnits { job, grid, indices })
}

/// Enumerate the work units of a job's window as serialised JSON messages.
pub fn create_messages(
    job: &IngestJobSpec,
) -> Result<impl Iterator<Item = Result<String, IngestError>> + '_, IngestError> {
    Ok(enumerate_work(job)?
        .map(|message| serde_json::to_string(&message).map_err(IngestError::from)))
}

/// Write messages as newline-delimited JSON, returning the number written.
///
/// # Arguments
///
/// * `units`: Messages to write
/// * `writer`: Destination of the messages
pub fn write_messages<W: Write>(units: WorkUnits<'_>, mut writer: W) -> Result<u64, IngestError> {
    let mut count = 0;
    for message in units {
        serde_json::to_writer(&mut writer, &message)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}
