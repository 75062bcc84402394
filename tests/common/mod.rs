use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceExt;

use decotrack_api::{
    api_v1_routes,
    client::UpstreamClient,
    config::AppConfig,
    events::{self, EventSender},
    models::component::{Component, DecorationStatus, TeamDecorationRecord},
    models::item::Item,
    models::order::Order,
    models::vehicle::VehicleRecord,
    propagator,
    sequence::{DecoSequence, TeamId},
    services::AppServices,
    store::{InMemoryOrderStore, OrderStore},
    AppState,
};

/// Helper harness for spinning up an application state backed by an
/// in-memory order store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// App with an unreachable upstream; outbound actions fail fast, which
    /// is what the refusal- and transport-failure tests want.
    pub fn new() -> Self {
        Self::with_upstream("http://127.0.0.1:9")
    }

    /// App pointed at a real upstream URL (a wiremock server in the
    /// success-path tests).
    pub fn with_upstream(upstream_url: &str) -> Self {
        let cfg = AppConfig {
            upstream_url: upstream_url.to_string(),
            upstream_timeout_secs: 1,
            sync_on_start: false,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            cors_allowed_origins: None,
            event_buffer: 64,
            notice_buffer: 64,
        };

        let store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        let (event_tx, event_rx) = mpsc::channel(cfg.event_buffer);
        let (notice_tx, _) = broadcast::channel(cfg.notice_buffer);
        let upstream = Arc::new(
            UpstreamClient::new(&cfg.upstream_url, cfg.upstream_timeout_secs)
                .expect("test client builds"),
        );
        let services = AppServices::new(store.clone(), upstream, notice_tx.clone());

        let event_task = tokio::spawn(events::process_events(
            event_rx,
            store.clone(),
            notice_tx.clone(),
        ));

        let state = AppState {
            config: cfg,
            store,
            services,
            event_sender: EventSender::new(event_tx),
            notices: notice_tx,
        };

        let router = Router::new()
            .route(
                "/health",
                get(decotrack_api::handlers::health::health_check),
            )
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Inserts an order into the bucket its component statuses imply.
    pub fn seed(&self, mut order: Order) {
        order.normalize();
        order.recompute_completion();
        let bucket = propagator::bucket_for(&order);
        self.state.store.upsert(bucket, order);
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request builds");
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is json")
        };
        (status, json)
    }
}

/// An order with one decorated glass component on a two-team sequence
/// (`printing_coating`), 100 units per team, decoration approved.
#[allow(dead_code)]
pub fn seeded_order(order_number: &str) -> Order {
    let mut component = Component {
        component_id: "c1".into(),
        name: "500ml round bottle".into(),
        deco_sequence: DecoSequence::parse("printing_coating"),
        is_deco_approved: true,
        ..Default::default()
    };
    component.decorations.insert(
        TeamId::from("printing"),
        TeamDecorationRecord {
            qty: 100,
            completed_qty: 0,
            status: DecorationStatus::Pending,
        },
    );
    component.decorations.insert(
        TeamId::from("coating"),
        TeamDecorationRecord {
            qty: 100,
            completed_qty: 0,
            status: DecorationStatus::Pending,
        },
    );

    let mut order = Order::new(order_number, "Acme Bottling");
    order.items.push(Item {
        item_id: "i1".into(),
        name: "500ml round".into(),
        status: None,
        components: vec![component],
    });
    order
}

/// A vehicle already confirmed delivered to the first team.
#[allow(dead_code)]
pub fn delivered_vehicle(plate: &str) -> VehicleRecord {
    let mut vehicle = VehicleRecord {
        vehicle_plate: plate.into(),
        ..Default::default()
    };
    vehicle.mark_delivered();
    vehicle
}
