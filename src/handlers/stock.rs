use axum::{extract::State, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::services::stock::AdjustStockRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct StockLevelResponse {
    pub name: String,
    pub level: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/stock/adjust",
    summary = "Adjust master stock",
    description = "Apply a `+N`/`-N` delta or bare absolute level to one stock line; levels never go below zero",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<StockLevelResponse>),
        (status = 400, description = "Malformed adjustment expression or underflow", body = crate::errors::ErrorResponse),
        (status = 502, description = "Upstream delivery failed; retry", body = crate::errors::ErrorResponse),
    )
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<ApiResponse<StockLevelResponse>>, ServiceError> {
    let name = request.name.clone();
    let level = state.services.stock.adjust(request).await?;
    Ok(Json(ApiResponse::success(StockLevelResponse {
        name,
        level,
    })))
}
