use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::errors::ServiceError;
use crate::handlers::UpdateOutcome;
use crate::services::vehicles::MarkDeliveredRequest;
use crate::{ApiResponse, AppState};

#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_number}/items/{item_id}/components/{component_id}/vehicles/delivered",
    summary = "Confirm vehicle delivery",
    description = "Mark one vehicle (by plate) or every vehicle on the component delivered; first-team only",
    request_body = MarkDeliveredRequest,
    responses(
        (status = 200, description = "Delivery confirmed", body = ApiResponse<UpdateOutcome>),
        (status = 403, description = "Caller is not the first team in the sequence", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order, component or vehicle not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Upstream delivery failed; retry", body = crate::errors::ErrorResponse),
    )
)]
pub async fn mark_delivered(
    State(state): State<AppState>,
    Path((order_number, item_id, component_id)): Path<(String, String, String)>,
    Json(request): Json<MarkDeliveredRequest>,
) -> Result<Json<ApiResponse<UpdateOutcome>>, ServiceError> {
    let applied = state
        .services
        .vehicles
        .mark_delivered(&order_number, &item_id, &component_id, request)
        .await?;
    Ok(Json(ApiResponse::success(applied.into())))
}
