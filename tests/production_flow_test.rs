//! Success paths of the write services against a mocked upstream backend:
//! production recording, rollback semantics, dispatch hand-off and vehicle
//! delivery confirmation.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{delivered_vehicle, seeded_order, TestApp};
use decotrack_api::models::component::{DecorationStatus, TeamDecorationRecord};
use decotrack_api::models::vehicle::VehicleRecord;
use decotrack_api::sequence::TeamId;

const PRODUCTION: &str = "/api/v1/orders/ORD-3001/items/i1/components/c1/production";
const DISPATCH: &str = "/api/v1/orders/ORD-3001/items/i1/components/c1/dispatch";
const DELIVERED: &str = "/api/v1/orders/ORD-3001/items/i1/components/c1/vehicles/delivered";
const ELIGIBILITY: &str = "/api/v1/orders/ORD-3001/items/i1/components/c1/eligibility";

/// App wired to a wiremock upstream accepting every outbound action.
async fn app_with_upstream() -> (TestApp, MockServer) {
    let server = MockServer::start().await;
    for endpoint in ["/api/production", "/api/dispatch", "/api/vehicles/delivered"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    (TestApp::with_upstream(&server.uri()), server)
}

#[tokio::test]
async fn recording_production_updates_the_cached_component() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    order.items[0].components[0]
        .vehicle_details
        .push(delivered_vehicle("MH12AB1234"));
    app.seed(order);

    let (status, body) = app
        .post_json(
            PRODUCTION,
            json!({
                "team": "printing",
                "quantity": 60,
                "stock_used": 120,
                "notes": "first run"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let component = &body["data"]["items"][0]["components"][0];
    assert_eq!(component["decorations"]["printing"]["completed_qty"], json!(60));
    assert_eq!(
        component["decorations"]["printing"]["status"],
        json!("IN_PROGRESS")
    );
    assert_eq!(component["revision"], json!(1));

    let history = component["tracking_history"].as_array().expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["quantity_produced"], json!(60));
    assert_eq!(history[0]["stock_used"], json!(120));
    assert_eq!(history[0]["notes"], json!("first run"));
}

#[tokio::test]
async fn completing_the_full_quantity_marks_ready_to_dispatch() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    order.items[0].components[0]
        .vehicle_details
        .push(delivered_vehicle("MH12AB1234"));
    app.seed(order);

    let (status, body) = app
        .post_json(PRODUCTION, json!({ "team": "printing", "quantity": 100 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["items"][0]["components"][0]["decorations"]["printing"]["status"],
        json!("READY_TO_DISPATCH")
    );

    // the terminal status floors the remaining quantity
    let (_, report) = app.get(&format!("{ELIGIBILITY}?team=printing")).await;
    assert_eq!(report["data"]["remaining_qty"], json!(0));
}

#[tokio::test]
async fn rollback_reverts_ready_to_dispatch_to_in_progress() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    order.items[0].components[0]
        .vehicle_details
        .push(delivered_vehicle("MH12AB1234"));
    app.seed(order);

    let (status, _) = app
        .post_json(PRODUCTION, json!({ "team": "printing", "quantity": 100 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_json(
            PRODUCTION,
            json!({ "team": "printing", "quantity": -30, "notes": "breakage" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let record = &body["data"]["items"][0]["components"][0]["decorations"]["printing"];
    assert_eq!(record["completed_qty"], json!(70));
    assert_eq!(record["status"], json!("IN_PROGRESS"));
}

#[tokio::test]
async fn rollback_is_rejected_once_dispatched() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    {
        let component = &mut order.items[0].components[0];
        component.vehicle_details.push(delivered_vehicle("MH12AB1234"));
        component.decorations.insert(
            TeamId::from("printing"),
            TeamDecorationRecord {
                qty: 100,
                completed_qty: 100,
                status: DecorationStatus::Dispatched,
            },
        );
    }
    app.seed(order);

    let (status, body) = app
        .post_json(PRODUCTION, json!({ "team": "printing", "quantity": -10 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Validation error: cannot roll back a dispatched component")
    );
}

#[tokio::test]
async fn rollback_exceeding_completed_quantity_is_rejected() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    order.items[0].components[0]
        .vehicle_details
        .push(delivered_vehicle("MH12AB1234"));
    app.seed(order);

    let (status, _) = app
        .post_json(PRODUCTION, json!({ "team": "printing", "quantity": -1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dispatch_hands_off_to_the_next_team() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    {
        let component = &mut order.items[0].components[0];
        component.vehicle_details.push(delivered_vehicle("MH12AB1234"));
        component.decorations.insert(
            TeamId::from("printing"),
            TeamDecorationRecord {
                qty: 100,
                completed_qty: 100,
                status: DecorationStatus::ReadyToDispatch,
            },
        );
    }
    app.seed(order);

    let (status, body) = app
        .post_json(DISPATCH, json!({ "team": "printing" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    // coating is still pending, so the order stays in its bucket
    assert_eq!(body["data"]["bucket"], json!("in_progress"));
    assert_eq!(body["data"]["moved"], json!(false));

    let (_, order) = app.get("/api/v1/orders/ORD-3001").await;
    assert_eq!(
        order["data"]["order"]["items"][0]["components"][0]["decorations"]["printing"]["status"],
        json!("DISPATCHED")
    );

    // the hand-off unlocks the downstream team
    let (_, report) = app.get(&format!("{ELIGIBILITY}?team=coating")).await;
    assert_eq!(report["data"]["can_edit"]["allowed"], json!(true));
}

#[tokio::test]
async fn first_team_confirms_vehicle_delivery() {
    let (app, _server) = app_with_upstream().await;
    let mut order = seeded_order("ORD-3001");
    order.items[0].components[0].vehicle_details.push(VehicleRecord {
        vehicle_plate: "GJ01XY9876".into(),
        ..Default::default()
    });
    app.seed(order);

    // in transit, so the first team is still locked
    let (_, before) = app.get(&format!("{ELIGIBILITY}?team=printing")).await;
    assert_eq!(before["data"]["can_edit"]["allowed"], json!(false));

    let (status, _) = app
        .post_json(
            DELIVERED,
            json!({ "team": "printing", "vehicle_plate": "GJ01XY9876" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, order) = app.get("/api/v1/orders/ORD-3001").await;
    let vehicle = &order["data"]["order"]["items"][0]["components"][0]["vehicle_details"][0];
    assert_eq!(vehicle["status"], json!("DELIVERED"));
    assert_eq!(vehicle["received"], json!(true));

    let (_, after) = app.get(&format!("{ELIGIBILITY}?team=printing")).await;
    assert_eq!(after["data"]["can_edit"]["allowed"], json!(true));
    assert_eq!(after["data"]["vehicle_approval"], json!("APPROVED"));
}
