use crate::models::*;

/// Create an IngestJobSpec for a 2x2 grid of 1024 pixel tiles over 20 slices, chunked in 16s.
pub(crate) fn get_test_job() -> IngestJobSpec {
    IngestJobSpec {
        x_start: 0,
        x_stop: 2048,
        y_start: 0,
        y_stop: 2048,
        z_start: 0,
        z_stop: 20,
        t_start: 0,
        t_stop: 1,
        x_tile_size: 1024,
        y_tile_size: 1024,
        z_tile_size: 1,
        t_tile_size: 1,
        z_chunk_size: 16,
        project_info: ["3".to_string(), "3".to_string(), "3".to_string()],
        resolution: 0,
        job_id: 11,
        ingest_queue: "https://queue.amazonaws.com/ingest".to_string(),
        upload_queue: "https://queue.amazonaws.com/upload".to_string(),
        items_to_skip: 0,
        max_items: None,
    }
}

/// Create an IngestJobSpec with non-zero starts and ranges that the tile and chunk sizes do
/// not divide.
pub(crate) fn get_test_job_uneven() -> IngestJobSpec {
    IngestJobSpec {
        x_start: 0,
        x_stop: 1028,
        y_start: 100,
        y_stop: 700,
        z_start: 3,
        z_stop: 26,
        t_start: 0,
        t_stop: 3,
        x_tile_size: 512,
        y_tile_size: 256,
        z_chunk_size: 8,
        ..get_test_job()
    }
}
