//! Data types and associated functions and methods

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Project identifiers of an ingest job: collection, experiment and channel.
pub type ProjectInfo = [String; 3];

/// Default size of a tile along an axis that the job description may omit.
fn default_tile_size() -> u64 {
    1
}

/// Description of one ingest job, or of one worker's share of it.
///
/// This is the flat key/value object handed to each worker by the orchestrator. Keys the
/// enumerator does not use (e.g. `upload_sfn`) are accepted and ignored, since orchestrators
/// pass their whole argument map through.
///
/// All bounds are half-open: `[start, stop)`. An axis with `stop <= start` contains no tiles.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct IngestJobSpec {
    pub x_start: u64,
    pub x_stop: u64,
    pub y_start: u64,
    pub y_stop: u64,
    pub z_start: u64,
    pub z_stop: u64,
    pub t_start: u64,
    pub t_stop: u64,
    /// Width of a tile in voxels
    #[validate(range(min = 1, message = "x_tile_size must be greater than 0"))]
    pub x_tile_size: u64,
    /// Height of a tile in voxels
    #[validate(range(min = 1, message = "y_tile_size must be greater than 0"))]
    pub y_tile_size: u64,
    /// Depth of a tile in slices. Enumeration always steps z one slice at a time; this is only
    /// used by [crate::grid::tile_count].
    #[serde(default = "default_tile_size")]
    #[validate(range(min = 1, message = "z_tile_size must be greater than 0"))]
    pub z_tile_size: u64,
    /// Number of time samples in a tile
    #[serde(default = "default_tile_size")]
    #[validate(range(min = 1, message = "t_tile_size must be greater than 0"))]
    pub t_tile_size: u64,
    /// Maximum number of consecutive z tiles grouped into one chunk
    #[validate(range(min = 1, message = "z_chunk_size must be greater than 0"))]
    pub z_chunk_size: u64,
    /// Collection, experiment and channel identifiers
    #[validate(custom = "validate_project_info")]
    pub project_info: ProjectInfo,
    /// Resolution level
    pub resolution: u32,
    /// Ingest job identifier
    pub job_id: u64,
    /// Queue that ingest workers read tiles from
    #[validate(length(min = 1, message = "ingest_queue must not be empty"))]
    pub ingest_queue: String,
    /// Queue that tile upload messages are written to
    #[validate(length(min = 1, message = "upload_queue must not be empty"))]
    pub upload_queue: String,
    /// Number of work units to skip before emitting
    #[serde(default)]
    pub items_to_skip: u64,
    /// Maximum number of work units to emit. Unbounded if absent.
    #[serde(
        rename = "MAX_NUM_ITEMS_PER_LAMBDA",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(range(min = 1, message = "MAX_NUM_ITEMS_PER_LAMBDA must be greater than 0"))]
    pub max_items: Option<u64>,
}

impl IngestJobSpec {
    /// Return a copy of this job restricted to `window`.
    pub fn with_window(&self, window: &Window) -> Self {
        IngestJobSpec {
            items_to_skip: window.items_to_skip,
            max_items: Some(window.max_items),
            ..self.clone()
        }
    }
}

/// Validate project identifiers
fn validate_project_info(project_info: &ProjectInfo) -> Result<(), ValidationError> {
    if project_info.iter().any(|id| id.is_empty()) {
        return Err(ValidationError::new(
            "project_info identifiers must not be empty",
        ));
    }
    Ok(())
}

/// A contiguous range of the job's work units assigned to one worker.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Window {
    /// Index of the first work unit in the window
    pub items_to_skip: u64,
    /// Number of work units in the window
    #[serde(rename = "MAX_NUM_ITEMS_PER_LAMBDA")]
    pub max_items: u64,
}

/// Request data for planning the partition of a job across workers
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlanRequest {
    /// The job to partition. Any window it carries is ignored except `MAX_NUM_ITEMS_PER_LAMBDA`,
    /// which sets the window size when `num_workers` is absent.
    #[validate]
    pub job: IngestJobSpec,
    /// Number of workers to spread the job across
    #[validate(range(min = 1, message = "num_workers must be greater than 0"))]
    pub num_workers: Option<u64>,
}

/// Partition of a job into worker windows
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct Plan {
    /// Total number of work units in the job
    pub total: u64,
    /// Size of every window except possibly the last
    pub window_size: u64,
    /// Windows in enumeration order
    pub windows: Vec<Window>,
}

/// One work unit as placed on the upload queue.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TileMessage {
    pub job_id: u64,
    pub upload_queue_arn: String,
    pub ingest_queue_arn: String,
    pub chunk_key: String,
    pub tile_key: String,
}

/// Response containing the serialised messages of one window.
pub struct PopulateResponse {
    /// Newline-delimited JSON tile messages
    pub body: Bytes,
    /// Number of messages in the body
    pub count: u64,
    /// Total number of work units in the job
    pub total: u64,
}

impl PopulateResponse {
    /// Return a PopulateResponse object
    pub fn new(body: Bytes, count: u64, total: u64) -> PopulateResponse {
        PopulateResponse { body, count, total }
    }
}
