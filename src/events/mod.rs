//! Push events and the event processing loop.
//!
//! Every inbound event is structurally a partial patch over one component,
//! addressed by order number, item id and component id. Whatever action
//! produced it upstream, it flows through the same propagator; the kinds
//! only matter for display and fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::component::DecorationStatus;
use crate::models::vehicle::VehicleRecord;
use crate::models::TrackingEntry;
use crate::propagator;
use crate::sequence::{DecoSequence, TeamId};
use crate::store::{Bucket, OrderStore};

/// Kinds of push events observed on the wire.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EventKind {
    ProductionUpdated,
    ComponentDispatched,
    TeamCanStartWork,
    VehicleDetailsReceived,
    VehicleMarkedDelivered,
    VehicleApprovalRequired,
}

/// Partial patch over one team's decoration record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DecorationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_qty: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DecorationStatus>,
}

/// Partial patch over a component. Fields absent from the patch are left
/// untouched; `decorations` is merged key-by-key so an update about one
/// team never erases another team's record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComponentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deco_approved: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deco_sequence: Option<DecoSequence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorations: Option<HashMap<TeamId, DecorationPatch>>,

    /// Full replacement list; vehicle events always carry the whole set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_details: Option<Vec<VehicleRecord>>,

    /// Full replacement of the production log (authoritative upstream copy).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_history: Option<Vec<TrackingEntry>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
}

/// An inbound cross-team update event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DecoEvent {
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,

    pub kind: EventKind,

    pub order_number: String,

    pub item_id: String,

    pub component_id: String,

    /// Monotonic per-component revision. Events that are not strictly newer
    /// than the component's applied revision are rejected as stale; zero
    /// means the producer does not fill revisions and gating is skipped.
    #[serde(default)]
    pub revision: u64,

    #[serde(default, rename = "updatedComponent", alias = "updated_component")]
    pub updated_component: ComponentPatch,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_changes: Option<ItemPatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_changes: Option<OrderPatch>,

    #[serde(default = "Utc::now")]
    pub occurred_at: DateTime<Utc>,
}

impl DecoEvent {
    pub fn new(
        kind: EventKind,
        order_number: impl Into<String>,
        item_id: impl Into<String>,
        component_id: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            order_number: order_number.into(),
            item_id: item_id.into(),
            component_id: component_id.into(),
            revision: 0,
            updated_component: ComponentPatch::default(),
            item_changes: None,
            order_changes: None,
            occurred_at: Utc::now(),
        }
    }
}

/// Handle for pushing events into the processing loop.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<DecoEvent>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<DecoEvent>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: DecoEvent) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("failed to enqueue event: {e}")))
    }
}

/// Notification fanned out to connected team views after an event applied.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UpdateNotice {
    pub order_number: String,
    pub item_id: String,
    pub component_id: String,
    pub kind: EventKind,
    pub bucket: Bucket,
    /// Whether the order changed storage bucket.
    pub moved: bool,
    /// Store version after the write; views re-render on change.
    pub version: u64,
}

/// Event processing loop: applies each inbound event to the order store and
/// broadcasts a notice to subscribed views. Unknown references are logged
/// and skipped, never fatal.
pub async fn process_events(
    mut rx: mpsc::Receiver<DecoEvent>,
    store: Arc<dyn OrderStore>,
    notices: broadcast::Sender<UpdateNotice>,
) {
    info!("starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!(
            kind = %event.kind,
            order_number = %event.order_number,
            component_id = %event.component_id,
            revision = event.revision,
            "received event"
        );

        match propagator::propagate(store.as_ref(), &event) {
            Some(applied) => {
                let notice = UpdateNotice {
                    order_number: event.order_number.clone(),
                    item_id: event.item_id.clone(),
                    component_id: event.component_id.clone(),
                    kind: event.kind,
                    bucket: applied.bucket,
                    moved: applied.moved,
                    version: applied.version,
                };
                // no subscribers is fine; views come and go
                let _ = notices.send(notice);
            }
            None => {
                debug!(event_id = %event.event_id, "event not applied");
            }
        }
    }

    warn!("event processing loop has ended");
}
