use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::client::{UpstreamClient, VehicleDeliveryReport};
use crate::errors::ServiceError;
use crate::events::{DecoEvent, EventKind, UpdateNotice};
use crate::propagator::AppliedUpdate;
use crate::sequence::TeamId;
use crate::services::apply_and_notify;
use crate::services::orders::find_component;
use crate::store::OrderStore;
use crate::vehicles;

/// Delivery confirmation payload. Without a plate, every vehicle on the
/// component is confirmed at once.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct MarkDeliveredRequest {
    pub team: TeamId,

    #[serde(default)]
    pub vehicle_plate: Option<String>,
}

/// Vehicle delivery confirmations, restricted to the first team in each
/// component's decoration sequence.
pub struct VehicleService {
    store: Arc<dyn OrderStore>,
    upstream: Arc<UpstreamClient>,
    notices: broadcast::Sender<UpdateNotice>,
}

impl VehicleService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        upstream: Arc<UpstreamClient>,
        notices: broadcast::Sender<UpdateNotice>,
    ) -> Self {
        Self {
            store,
            upstream,
            notices,
        }
    }

    /// Marks one vehicle (or all, when no plate is given) delivered. The
    /// eligibility evaluator refuses callers other than the first team
    /// before any request leaves this process.
    #[instrument(skip(self, request), fields(team = %request.team, plate = request.vehicle_plate.as_deref().unwrap_or("*")))]
    pub async fn mark_delivered(
        &self,
        order_number: &str,
        item_id: &str,
        component_id: &str,
        request: MarkDeliveredRequest,
    ) -> Result<AppliedUpdate, ServiceError> {
        let (_, order) = self
            .store
            .get(order_number)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))?;
        let component = find_component(&order, item_id, component_id)?;

        if !vehicles::can_approve_vehicles(component, &request.team) {
            warn!(
                component_id,
                "vehicle confirmation refused for non-first team"
            );
            return Err(ServiceError::Forbidden(
                "only the first team in the decoration sequence may confirm vehicle deliveries"
                    .into(),
            ));
        }
        if component.vehicle_details.is_empty() {
            return Err(ServiceError::ValidationError(
                "no vehicle details recorded for this component".into(),
            ));
        }

        let mut updated = component.vehicle_details.clone();
        let confirmed: Vec<String> = match &request.vehicle_plate {
            Some(plate) => {
                let vehicle = updated
                    .iter_mut()
                    .find(|v| &v.vehicle_plate == plate)
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Vehicle {} not found", plate))
                    })?;
                vehicle.mark_delivered();
                vec![plate.clone()]
            }
            None => {
                for vehicle in &mut updated {
                    vehicle.mark_delivered();
                }
                Vec::new()
            }
        };

        self.upstream
            .mark_vehicles_delivered(&VehicleDeliveryReport {
                order_number: order_number.to_string(),
                item_id: item_id.to_string(),
                component_id: component_id.to_string(),
                team: request.team.clone(),
                vehicle_plates: confirmed,
            })
            .await?;

        let mut event = DecoEvent::new(
            EventKind::VehicleMarkedDelivered,
            order_number,
            item_id,
            component_id,
        );
        event.revision = component.revision + 1;
        event.updated_component.vehicle_details = Some(updated);

        let applied = apply_and_notify(self.store.as_ref(), &self.notices, &event)?;
        info!(order_number, component_id, "vehicle delivery confirmed");
        Ok(applied)
    }
}
