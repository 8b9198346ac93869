//! Partitioning of a job's work units into per-worker windows.

use crate::error::IngestError;
use crate::grid::TileGrid;
use crate::models::{IngestJobSpec, Plan, Window};

/// Split `total` work units into contiguous windows of `window_size`.
///
/// The windows are in enumeration order, do not overlap, and leave no gaps. The last window is
/// trimmed to the units remaining. Fails without allocating if more than `max_windows` windows
/// would be needed.
pub fn plan_windows(total: u64, window_size: u64, max_windows: u64) -> Result<Plan, IngestError> {
    if window_size == 0 {
        return Err(IngestError::ZeroSize {
            field: "MAX_NUM_ITEMS_PER_LAMBDA",
        });
    }
    let num_windows = total.div_ceil(window_size);
    if num_windows > max_windows {
        return Err(IngestError::TooManyWindows {
            windows: num_windows,
            limit: max_windows,
        });
    }
    let windows = (0..num_windows)
        .map(|i| {
            let items_to_skip = i * window_size;
            Window {
                items_to_skip,
                max_items: window_size.min(total - items_to_skip),
            }
        })
        .collect();
    Ok(Plan {
        total,
        window_size,
        windows,
    })
}

/// Split `total` work units evenly across `num_workers` windows of `ceil(total / num_workers)`.
///
/// Fewer windows than workers are returned when there are fewer units than workers.
pub fn plan_for_workers(
    total: u64,
    num_workers: u64,
    max_windows: u64,
) -> Result<Plan, IngestError> {
    if num_workers == 0 {
        return Err(IngestError::ZeroSize {
            field: "num_workers",
        });
    }
    plan_windows(total, total.div_ceil(num_workers).max(1), max_windows)
}

/// Plan the windows of a job.
///
/// Every window of the plan is accepted by a service limited to `max_window_size` units per
/// request.
///
/// # Arguments
///
/// * `job`: The job to partition
/// * `num_workers`: Optional number of workers to spread the job across
/// * `max_window_size`: Largest window allowed, and the window size used when neither
///   `num_workers` nor the job's `max_items` is given
/// * `max_windows`: Largest number of windows allowed
pub fn plan_job(
    job: &IngestJobSpec,
    num_workers: Option<u64>,
    max_window_size: u64,
    max_windows: u64,
) -> Result<Plan, IngestError> {
    let total = TileGrid::new(job)?.len();
    let plan = match num_workers {
        Some(num_workers) => plan_for_workers(total, num_workers, max_windows)?,
        None => plan_windows(
            total,
            job.max_items.unwrap_or(max_window_size),
            max_windows,
        )?,
    };
    if plan.window_size > max_window_size && total > max_window_size {
        return Err(IngestError::WindowTooLarge {
            max_items: plan.window_size,
            limit: max_window_size,
        });
    }
    tracing::info!(
        job_id = job.job_id,
        total,
        windows = plan.windows.len(),
        window_size = plan.window_size,
        "planned ingest job"
    );
    Ok(plan)
}
