use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::handlers::UpdateOutcome;
use crate::models::order::Order;
use crate::sequence::TeamId;
use crate::services::orders::{EligibilityReport, RecordProductionRequest};
use crate::store::Bucket;
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(default = "default_bucket")]
    pub bucket: Bucket,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_bucket() -> Bucket {
    Bucket::InProgress
}
fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TeamQuery {
    pub team: TeamId,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DispatchRequest {
    pub team: TeamId,
}

/// An order together with the bucket it currently sits in.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderEnvelope {
    pub bucket: Bucket,
    pub order: Order,
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "Page through one storage bucket of the cached order book",
    params(
        ("bucket" = Option<Bucket>, Query, description = "Storage bucket (default: in_progress)"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<PaginatedResponse<Order>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Json<ApiResponse<PaginatedResponse<Order>>> {
    let limit = query.limit.clamp(1, 100);
    let page = query.page.max(1);
    let (orders, total) = state.services.orders.list_orders(query.bucket, page, limit);
    Json(ApiResponse::success(PaginatedResponse {
        items: orders,
        total,
        page,
        limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_number}",
    summary = "Get order",
    params(("order_number" = String, Path, description = "Business order number")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderEnvelope>),
        (status = 404, description = "Order not cached", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<OrderEnvelope>>, ServiceError> {
    let (bucket, order) = state.services.orders.get_order(&order_number)?;
    Ok(Json(ApiResponse::success(OrderEnvelope { bucket, order })))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_number}/items/{item_id}/components/{component_id}/eligibility",
    summary = "Evaluate team eligibility",
    description = "Whether the given team may currently edit, work, or is waiting upstream",
    params(
        ("order_number" = String, Path, description = "Business order number"),
        ("item_id" = String, Path, description = "Item id within the order"),
        ("component_id" = String, Path, description = "Component id within the item"),
        ("team" = String, Query, description = "Team identifier"),
    ),
    responses(
        (status = 200, description = "Eligibility evaluated", body = ApiResponse<EligibilityReport>),
        (status = 404, description = "Order, item or component not cached", body = crate::errors::ErrorResponse),
    )
)]
pub async fn component_eligibility(
    State(state): State<AppState>,
    Path((order_number, item_id, component_id)): Path<(String, String, String)>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<ApiResponse<EligibilityReport>>, ServiceError> {
    let report =
        state
            .services
            .orders
            .eligibility(&order_number, &item_id, &component_id, &query.team)?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_number}/items/{item_id}/components/{component_id}/production",
    summary = "Record production",
    description = "Record a signed production quantity delta for a team; refused when the edit gate is closed",
    request_body = RecordProductionRequest,
    responses(
        (status = 200, description = "Production recorded", body = ApiResponse<Order>),
        (status = 400, description = "Quantity validation failed", body = crate::errors::ErrorResponse),
        (status = 403, description = "Edit gate closed for this team", body = crate::errors::ErrorResponse),
        (status = 502, description = "Upstream delivery failed; retry", body = crate::errors::ErrorResponse),
    )
)]
pub async fn record_production(
    State(state): State<AppState>,
    Path((order_number, item_id, component_id)): Path<(String, String, String)>,
    Json(request): Json<RecordProductionRequest>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state
        .services
        .orders
        .record_production(&order_number, &item_id, &component_id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_number}/items/{item_id}/components/{component_id}/dispatch",
    summary = "Dispatch component output",
    description = "Hand the component's output to the next team (or shipping); only valid from READY_TO_DISPATCH",
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Component dispatched", body = ApiResponse<UpdateOutcome>),
        (status = 400, description = "Component not ready to dispatch", body = crate::errors::ErrorResponse),
        (status = 403, description = "Edit gate closed for this team", body = crate::errors::ErrorResponse),
    )
)]
pub async fn dispatch_component(
    State(state): State<AppState>,
    Path((order_number, item_id, component_id)): Path<(String, String, String)>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<ApiResponse<UpdateOutcome>>, ServiceError> {
    let applied = state
        .services
        .orders
        .dispatch(&order_number, &item_id, &component_id, &request.team)
        .await?;
    Ok(Json(ApiResponse::success(applied.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/sync",
    summary = "Resync order book",
    description = "Refetch the full order book from the upstream backend; the manual retry path",
    responses(
        (status = 200, description = "Order book resynced", body = ApiResponse<serde_json::Value>),
        (status = 502, description = "Upstream fetch failed; retry", body = crate::errors::ErrorResponse),
    )
)]
pub async fn resync_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    let count = state.services.orders.resync().await?;
    Ok(Json(ApiResponse::success(json!({ "synced": count }))))
}
