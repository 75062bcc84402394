use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::client::{StockAdjustmentReport, UpstreamClient};
use crate::errors::ServiceError;
use crate::models::stock::{MasterStockKey, StockAdjustment};

/// Master stock adjustment payload. `adjustment` accepts `+N`, `-N` or a
/// bare absolute `N`.
#[derive(Clone, Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    #[validate(length(min = 1))]
    pub name: String,

    pub capacity_ml: Decimal,

    pub weight_gm: Decimal,

    pub neck_diameter_mm: Decimal,

    #[validate(length(min = 1))]
    pub adjustment: String,
}

impl AdjustStockRequest {
    pub fn key(&self) -> MasterStockKey {
        MasterStockKey {
            name: self.name.clone(),
            capacity_ml: self.capacity_ml,
            weight_gm: self.weight_gm,
            neck_diameter_mm: self.neck_diameter_mm,
        }
    }
}

/// Master stock register mirror. The upstream backend owns the levels; this
/// service validates adjustments, forwards them, and mirrors the result for
/// display.
pub struct StockService {
    upstream: Arc<UpstreamClient>,
    levels: DashMap<MasterStockKey, i64>,
}

impl StockService {
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self {
            upstream,
            levels: DashMap::new(),
        }
    }

    /// Applies an adjustment expression to the stock line identified by the
    /// name + dimensions tuple. The expression is validated and resolved
    /// against the mirrored level before the outbound request is issued; a
    /// transport failure leaves the mirror untouched.
    #[instrument(skip(self, request), fields(name = %request.name, adjustment = %request.adjustment))]
    pub async fn adjust(&self, request: AdjustStockRequest) -> Result<i64, ServiceError> {
        request.validate()?;

        let adjustment = StockAdjustment::parse(&request.adjustment)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let key = request.key();
        let current = self.levels.get(&key).map(|level| *level).unwrap_or(0);
        let new_level = adjustment
            .apply(current)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        self.upstream
            .adjust_stock(&StockAdjustmentReport::new(&key, new_level))
            .await?;

        self.levels.insert(key, new_level);
        info!(new_level, "stock level adjusted");
        Ok(new_level)
    }

    pub fn level(&self, key: &MasterStockKey) -> Option<i64> {
        self.levels.get(key).map(|level| *level)
    }
}
