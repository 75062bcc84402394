//! Decotrack API Library
//!
//! Order-tracking backend for bottle decoration teams: decoration sequence
//! parsing, per-team eligibility gating, vehicle delivery tracking and
//! cross-team update propagation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod client;
pub mod config;
pub mod eligibility;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod propagator;
pub mod sequence;
pub mod services;
pub mod store;
pub mod vehicles;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::events::{EventSender, UpdateNotice};
use crate::store::OrderStore;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<dyn OrderStore>,
    pub services: services::AppServices,
    pub event_sender: EventSender,
    pub notices: broadcast::Sender<UpdateNotice>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let component = "/orders/:order_number/items/:item_id/components/:component_id";

    Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/sync", post(handlers::orders::resync_orders))
        .route("/orders/:order_number", get(handlers::orders::get_order))
        .route(
            &format!("{component}/eligibility"),
            get(handlers::orders::component_eligibility),
        )
        .route(
            &format!("{component}/production"),
            post(handlers::orders::record_production),
        )
        .route(
            &format!("{component}/dispatch"),
            post(handlers::orders::dispatch_component),
        )
        .route(
            &format!("{component}/vehicles/delivered"),
            post(handlers::vehicles::mark_delivered),
        )
        .route("/stock/adjust", post(handlers::stock::adjust_stock))
        .route("/events", post(handlers::events::ingest_event))
        .route("/events/stream", get(handlers::events::event_stream))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn success_response_carries_data_and_timestamp() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
        DateTime::parse_from_rfc3339(&response.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn error_response_carries_message() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("oops"));
    }
}
