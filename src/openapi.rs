use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Decotrack API",
        version = "0.1.0",
        description = r#"
# Decoration Tracking API

Order-tracking backend for bottle decoration teams. Each decorated glass
component carries an ordered decoration sequence (for example
`printing_coating_foiling`); the API evaluates which team may work or
record production right now, tracks vehicle deliveries for the first team
in each sequence, and propagates cross-team update events to every
connected dashboard.

## Buckets

Cached orders live in one of three buckets: `in_progress`,
`ready_to_dispatch`, `dispatched`. List endpoints page through one bucket
at a time.

## Events

`POST /api/v1/events` ingests push events; `GET /api/v1/events/stream` is
a server-sent event stream of applied-update notices. Events carry a
monotonic per-component revision; stale revisions are dropped.

## Error Handling

Errors use a consistent JSON shape with a `retryable` flag:

```json
{
  "error": "External Service Error",
  "message": "upstream request failed",
  "retryable": true,
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order book and production recording"),
        (name = "Vehicles", description = "Vehicle delivery confirmations"),
        (name = "Stock", description = "Master stock register"),
        (name = "Events", description = "Push event ingestion and fan-out"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::component_eligibility,
        crate::handlers::orders::record_production,
        crate::handlers::orders::dispatch_component,
        crate::handlers::orders::resync_orders,
        crate::handlers::vehicles::mark_delivered,
        crate::handlers::stock::adjust_stock,
        crate::handlers::events::ingest_event,
        crate::handlers::events::event_stream,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,

            crate::models::order::Order,
            crate::models::item::Item,
            crate::models::component::Component,
            crate::models::component::ComponentKind,
            crate::models::component::DecorationStatus,
            crate::models::component::TeamDecorationRecord,
            crate::models::component::TrackingEntry,
            crate::models::vehicle::VehicleRecord,
            crate::models::vehicle::VehicleStatus,
            crate::sequence::DecoSequence,
            crate::sequence::TeamId,
            crate::store::Bucket,
            crate::vehicles::VehicleApproval,
            crate::eligibility::EditDecision,
            crate::eligibility::DenyReason,

            crate::handlers::UpdateOutcome,
            crate::handlers::orders::OrderEnvelope,
            crate::handlers::orders::DispatchRequest,
            crate::handlers::stock::StockLevelResponse,
            crate::handlers::health::HealthResponse,
            crate::services::orders::RecordProductionRequest,
            crate::services::orders::EligibilityReport,
            crate::services::vehicles::MarkDeliveredRequest,
            crate::services::stock::AdjustStockRequest,

            crate::events::DecoEvent,
            crate::events::EventKind,
            crate::events::ComponentPatch,
            crate::events::DecorationPatch,
            crate::events::ItemPatch,
            crate::events::OrderPatch,
            crate::events::UpdateNotice,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
