//! This crate enumerates the work units of BOSS ingest jobs. An ingest job uploads a 4-D
//! (x, y, z, t) image volume tile by tile; each tile becomes one message on an upload queue,
//! keyed by the chunk it belongs to and by its own position.
//!
//! Large jobs are split across many independent workers. Each worker is given the same job
//! description and a window `[items_to_skip, items_to_skip + MAX_NUM_ITEMS_PER_LAMBDA)` over a
//! fixed total ordering of the job's tiles. Because the ordering and the keys are pure functions
//! of the job, disjoint windows yield disjoint messages and together cover the whole job, with
//! no coordination between workers, and a retried window yields identical messages.
//!
//! * [grid] maps an index in the total ordering to tile coordinates.
//! * [keys] derives content-addressed chunk and tile keys.
//! * [enumerate] produces the messages of a window lazily.
//! * [plan] partitions a job into windows for an orchestrator.
//!
//! The service is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team.
//! * [Serde](serde) performs (de)serialisation of JSON request and response data.
//! * [Validator](validator) checks job descriptions before any enumeration starts.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod enumerate;
pub mod error;
pub mod grid;
pub mod keys;
pub mod metrics;
pub mod models;
pub mod plan;
pub mod resource_manager;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod validated_json;
