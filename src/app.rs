//! HTTP API of the ingest service.

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::enumerate;
use crate::error::IngestError;
use crate::metrics::{self, metrics_handler, WORK_UNITS_EMITTED};
use crate::models;
use crate::plan;
use crate::validated_json::ValidatedJson;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

static HEADER_COUNT: header::HeaderName = header::HeaderName::from_static("x-boss-ingest-count");
static HEADER_TOTAL: header::HeaderName = header::HeaderName::from_static("x-boss-ingest-total");

/// Content type of newline-delimited JSON.
const APPLICATION_NDJSON: &str = "application/x-ndjson";

impl IntoResponse for models::PopulateResponse {
    fn into_response(self) -> Response {
        (
            [
                (&header::CONTENT_TYPE, APPLICATION_NDJSON.to_string()),
                (&HEADER_COUNT, self.count.to_string()),
                (&HEADER_TOTAL, self.total.to_string()),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Service type returned by [service].
pub type Service = NormalizePath<Router>;

/// Returns a [Service] with all routes and state attached.
///
/// # Arguments
///
/// * `args`: Command line arguments
pub fn service(args: &CommandLineArgs) -> Service {
    let state: SharedAppState = Arc::new(AppState::new(args));
    let router = router().with_state(state);
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Returns the router of the service, before state is attached.
pub fn router() -> Router<SharedAppState> {
    fn v1() -> Router<SharedAppState> {
        Router::new()
            .route("/plan", post(plan))
            .route("/populate", post(populate))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            )
    }

    Router::new()
        .route("/.well-known/boss-ingest-schema", get(schema))
        .route("/metrics", get(metrics_handler))
        .nest("/v1", v1())
}

async fn schema() -> &'static str {
    "BOSS ingest tile enumeration service"
}

/// Partition a job into per-worker windows.
async fn plan(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::PlanRequest>,
) -> Result<Json<models::Plan>, IngestError> {
    let plan = plan::plan_job(
        &request.job,
        request.num_workers,
        state.args.max_items_per_worker,
        state.args.max_windows,
    )?;
    Ok(Json(plan))
}

/// Enumerate one window of a job as newline-delimited JSON tile messages.
async fn populate(
    State(state): State<SharedAppState>,
    ValidatedJson(mut job): ValidatedJson<models::IngestJobSpec>,
) -> Result<models::PopulateResponse, IngestError> {
    let limit = state.args.max_items_per_worker;
    job.max_items.get_or_insert(limit);
    let _task_permit = state.resource_manager.task().await?;
    let response = if state.args.use_rayon {
        tokio_rayon::spawn(move || populate_window(&job, limit)).await
    } else {
        tokio::task::spawn_blocking(move || populate_window(&job, limit)).await?
    }?;
    WORK_UNITS_EMITTED.inc_by(response.count);
    Ok(response)
}

/// Enumerate and serialise one window. CPU bound: one MD5 per key.
///
/// The whole window is buffered, so windows of more than `limit` units are rejected before
/// any enumeration.
fn populate_window(
    job: &models::IngestJobSpec,
    limit: u64,
) -> Result<models::PopulateResponse, IngestError> {
    let units = enumerate::enumerate_work(job)?;
    let total = units.total();
    let window = units.remaining();
    if window > limit {
        return Err(IngestError::WindowTooLarge {
            max_items: window,
            limit,
        });
    }
    let mut body = Vec::new();
    let count = enumerate::write_messages(units, &mut body)?;
    tracing::info!(
        job_id = job.job_id,
        items_to_skip = job.items_to_skip,
        count,
        total,
        "populated window"
    );
    Ok(models::PopulateResponse::new(
        Bytes::from(body),
        count,
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IngestJobSpec, Plan, TileMessage};
    use crate::test_utils;

    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
    };
    use clap::Parser;
    use std::collections::HashSet;
    use tower::ServiceExt; // for `oneshot`

    fn test_args(extra: &[&str]) -> CommandLineArgs {
        let mut args = vec!["boss-ingest", "--thread-limit", "2"];
        args.extend_from_slice(extra);
        CommandLineArgs::try_parse_from(args).unwrap()
    }

    async fn post_json(args: &CommandLineArgs, uri: &str, body: String) -> Response {
        service(args)
            .oneshot(
                Request::builder()
                    .method(http::Method::POST)
                    .uri(uri)
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    fn header_value(response: &Response, name: &header::HeaderName) -> String {
        response.headers()[name].to_str().unwrap().to_string()
    }

    fn messages(body: &str) -> Vec<TileMessage> {
        body.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn schema_route() {
        let response = service(&test_args(&[]))
            .oneshot(
                Request::builder()
                    .uri("/.well-known/boss-ingest-schema")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn populate_whole_job() {
        let args = test_args(&[]);
        let job = serde_json::to_string(&test_utils::get_test_job()).unwrap();
        let response = post_json(&args, "/v1/populate", job).await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("application/x-ndjson", header_value(&response, &header::CONTENT_TYPE));
        assert_eq!("80", header_value(&response, &HEADER_COUNT));
        assert_eq!("80", header_value(&response, &HEADER_TOTAL));
        let messages = messages(&body_string(response).await);
        assert_eq!(80, messages.len());
        assert!(messages.iter().all(|m| m.job_id == 11));
    }

    #[tokio::test]
    async fn populate_default_window() {
        let args = test_args(&["--max-items-per-worker", "30"]);
        let job = serde_json::to_string(&test_utils::get_test_job()).unwrap();
        let response = post_json(&args, "/v1/populate", job).await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("30", header_value(&response, &HEADER_COUNT));
        assert_eq!("80", header_value(&response, &HEADER_TOTAL));
    }

    #[tokio::test]
    async fn populate_rayon() {
        let args = test_args(&["--use-rayon"]);
        let job = IngestJobSpec {
            items_to_skip: 70,
            ..test_utils::get_test_job()
        };
        let response = post_json(&args, "/v1/populate", serde_json::to_string(&job).unwrap()).await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("10", header_value(&response, &HEADER_COUNT));
    }

    #[tokio::test]
    async fn populate_invalid_job() {
        let args = test_args(&[]);
        let job = IngestJobSpec {
            x_tile_size: 0,
            ..test_utils::get_test_job()
        };
        let response = post_json(&args, "/v1/populate", serde_json::to_string(&job).unwrap()).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }

    fn huge_job() -> IngestJobSpec {
        IngestJobSpec {
            x_stop: 1 << 40,
            x_tile_size: 1,
            max_items: Some(1 << 40),
            ..test_utils::get_test_job()
        }
    }

    #[test]
    fn populate_window_limit() {
        let job = huge_job();
        assert!(matches!(
            populate_window(&job, 500000),
            Err(IngestError::WindowTooLarge {
                max_items: 1099511627776,
                limit: 500000
            })
        ));

        // Only the units actually in the window count against the limit.
        let job = IngestJobSpec {
            items_to_skip: 75,
            max_items: Some(1 << 40),
            ..test_utils::get_test_job()
        };
        let response = populate_window(&job, 10).unwrap();
        assert_eq!(5, response.count);
        assert_eq!(80, response.total);
    }

    #[tokio::test]
    async fn populate_window_too_large() {
        let args = test_args(&[]);
        let job = serde_json::to_string(&huge_job()).unwrap();
        let response = post_json(&args, "/v1/populate", job).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let body = body_string(response).await;
        assert!(
            body.contains("window of 1099511627776 work units exceeds the limit of 500000"),
            "body: {body}"
        );
    }

    #[tokio::test]
    async fn plan_too_many_windows() {
        let args = test_args(&["--max-windows", "3"]);
        let request = format!(
            r#"{{"job": {}, "num_workers": 4}}"#,
            serde_json::to_string(&test_utils::get_test_job()).unwrap()
        );
        let response = post_json(&args, "/v1/plan", request).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let body = body_string(response).await;
        assert!(
            body.contains("plan of 4 windows exceeds the limit of 3"),
            "body: {body}"
        );
    }

    #[tokio::test]
    async fn plan_then_populate() {
        let args = test_args(&[]);
        let job = test_utils::get_test_job_uneven();
        let request = format!(
            r#"{{"job": {}, "num_workers": 4}}"#,
            serde_json::to_string(&job).unwrap()
        );
        let response = post_json(&args, "/v1/plan", request).await;
        assert_eq!(StatusCode::OK, response.status());
        let plan: Plan = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(4, plan.windows.len());

        let mut tile_keys = HashSet::new();
        for window in &plan.windows {
            let windowed = serde_json::to_string(&job.with_window(window)).unwrap();
            let response = post_json(&args, "/v1/populate", windowed).await;
            assert_eq!(StatusCode::OK, response.status());
            for message in messages(&body_string(response).await) {
                assert!(tile_keys.insert(message.tile_key));
            }
        }
        assert_eq!(plan.total, tile_keys.len() as u64);
    }

    #[tokio::test]
    async fn plan_unknown_field() {
        let args = test_args(&[]);
        let request = format!(
            r#"{{"job": {}, "workers": 4}}"#,
            serde_json::to_string(&test_utils::get_test_job()).unwrap()
        );
        let response = post_json(&args, "/v1/plan", request).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }

    #[tokio::test]
    async fn trailing_slash() {
        let args = test_args(&[]);
        let request = format!(
            r#"{{"job": {}}}"#,
            serde_json::to_string(&test_utils::get_test_job()).unwrap()
        );
        let response = post_json(&args, "/v1/plan/", request).await;
        assert_eq!(StatusCode::OK, response.status());
    }
}
