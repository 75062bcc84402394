//! Upstream factory backend client.
//!
//! The order book lives on a remote REST backend; this client performs the
//! initial fetch and delivers outbound actions (production reports, vehicle
//! delivery confirmations, stock adjustments). There is no automatic retry:
//! failures surface as retryable errors and the resync endpoint is the
//! manual retry path.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::errors::ServiceError;
use crate::models::order::Order;
use crate::models::stock::MasterStockKey;
use crate::sequence::TeamId;

/// Outbound production report for one team/component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductionReport {
    pub order_number: String,
    pub item_id: String,
    pub component_id: String,
    pub team: TeamId,
    /// Signed delta; negative is a rollback.
    pub quantity: i64,
    pub stock_used: i64,
    pub notes: Option<String>,
}

/// Outbound confirmation that vehicles were delivered to the first team.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleDeliveryReport {
    pub order_number: String,
    pub item_id: String,
    pub component_id: String,
    pub team: TeamId,
    /// Plates confirmed in this action; empty means all.
    pub vehicle_plates: Vec<String>,
}

/// Outbound dispatch notice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchReport {
    pub order_number: String,
    pub item_id: String,
    pub component_id: String,
    pub team: TeamId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockAdjustmentReport {
    pub name: String,
    pub capacity_ml: Decimal,
    pub weight_gm: Decimal,
    pub neck_diameter_mm: Decimal,
    /// The resolved level after applying the adjustment expression.
    pub new_level: i64,
}

#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches the full order list for this team session.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Result<Vec<Order>, ServiceError> {
        let url = self.url("/api/orders");
        let response = self.http.get(&url).send().await.map_err(|e| {
            error!("order fetch failed: {}", e);
            ServiceError::ExternalServiceError(format!("order fetch failed: {e}"))
        })?;
        let response = response.error_for_status().map_err(|e| {
            error!("order fetch returned error status: {}", e);
            ServiceError::ExternalServiceError(format!("order fetch failed: {e}"))
        })?;
        let orders: Vec<Order> = response.json().await.map_err(|e| {
            error!("order list decode failed: {}", e);
            ServiceError::ExternalServiceError(format!("order list decode failed: {e}"))
        })?;
        info!("fetched {} orders from upstream", orders.len());
        Ok(orders)
    }

    #[instrument(skip(self, report), fields(order_number = %report.order_number, team = %report.team))]
    pub async fn record_production(&self, report: &ProductionReport) -> Result<(), ServiceError> {
        self.post("/api/production", report).await
    }

    #[instrument(skip(self, report), fields(order_number = %report.order_number, team = %report.team))]
    pub async fn mark_vehicles_delivered(
        &self,
        report: &VehicleDeliveryReport,
    ) -> Result<(), ServiceError> {
        self.post("/api/vehicles/delivered", report).await
    }

    #[instrument(skip(self, report), fields(order_number = %report.order_number, team = %report.team))]
    pub async fn mark_dispatched(&self, report: &DispatchReport) -> Result<(), ServiceError> {
        self.post("/api/dispatch", report).await
    }

    #[instrument(skip(self, report), fields(name = %report.name))]
    pub async fn adjust_stock(&self, report: &StockAdjustmentReport) -> Result<(), ServiceError> {
        self.post("/api/stock/adjust", report).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), ServiceError> {
        let url = self.url(path);
        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            error!(path, "upstream request failed: {}", e);
            ServiceError::ExternalServiceError(format!("upstream request failed: {e}"))
        })?;
        response.error_for_status().map_err(|e| {
            error!(path, "upstream rejected request: {}", e);
            ServiceError::ExternalServiceError(format!("upstream rejected request: {e}"))
        })?;
        Ok(())
    }
}

impl StockAdjustmentReport {
    pub fn new(key: &MasterStockKey, new_level: i64) -> Self {
        Self {
            name: key.name.clone(),
            capacity_ml: key.capacity_ml,
            weight_gm: key.weight_gm,
            neck_diameter_mm: key.neck_diameter_mm,
            new_level,
        }
    }
}
