use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use futures::stream::Stream;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;

use crate::errors::ServiceError;
use crate::events::{DecoEvent, UpdateNotice};
use crate::{ApiResponse, AppState};

#[utoipa::path(
    post,
    path = "/api/v1/events",
    summary = "Ingest a push event",
    description = "Queue a cross-team update event for asynchronous application to the order book",
    request_body = DecoEvent,
    responses(
        (status = 202, description = "Event accepted for processing", body = ApiResponse<serde_json::Value>),
        (status = 500, description = "Event queue unavailable", body = crate::errors::ErrorResponse),
    )
)]
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<DecoEvent>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ServiceError> {
    let event_id = event.event_id;
    state.event_sender.send(event).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(json!({ "event_id": event_id }))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/stream",
    summary = "Subscribe to update notices",
    description = "Server-sent event stream of update notices; one JSON notice per applied event",
    responses(
        (status = 200, description = "SSE stream of update notices"),
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notices.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notice) => {
                    let event = match notice_to_sse(&notice) {
                        Some(event) => event,
                        None => continue,
                    };
                    return Some((Ok(event), rx));
                }
                // slow consumer: drop the missed notices, keep streaming
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "sse subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn notice_to_sse(notice: &UpdateNotice) -> Option<Event> {
    let data = serde_json::to_string(notice).ok()?;
    Some(Event::default().event(notice.kind.to_string()).data(data))
}
