use axum::{extract::State, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::Bucket;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Monotonic store version; bumps on every applied write.
    pub store_version: u64,
    pub in_progress: usize,
    pub ready_to_dispatch: usize,
    pub dispatched: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store_version: state.store.version(),
        in_progress: state.store.list(Bucket::InProgress).len(),
        ready_to_dispatch: state.store.list(Bucket::ReadyToDispatch).len(),
        dispatched: state.store.list(Bucket::Dispatched).len(),
    })
}
