use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::client::{DispatchReport, ProductionReport, UpstreamClient};
use crate::eligibility::{self, EditDecision};
use crate::errors::ServiceError;
use crate::events::{DecoEvent, DecorationPatch, EventKind, UpdateNotice};
use crate::models::component::{Component, DecorationStatus, TrackingEntry};
use crate::models::order::Order;
use crate::propagator::{self, AppliedUpdate};
use crate::sequence::TeamId;
use crate::services::apply_and_notify;
use crate::store::{Bucket, OrderStore};
use crate::vehicles::{self, VehicleApproval};

/// Production recording payload for one team/component.
#[derive(Clone, Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RecordProductionRequest {
    pub team: TeamId,

    /// Signed quantity delta; negative rolls previously recorded production
    /// back.
    pub quantity: i64,

    /// Raw stock consumed alongside this entry.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock_used: Option<i64>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Everything a team card needs to render its gates for one component.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct EligibilityReport {
    pub can_edit: EditDecision,
    pub can_work: EditDecision,
    pub waiting_message: String,
    pub vehicle_approval: VehicleApproval,
    pub remaining_qty: i64,
}

/// Order book operations for the team dashboards.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    upstream: Arc<UpstreamClient>,
    notices: broadcast::Sender<UpdateNotice>,
}

impl OrderService {
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

    /// Page of orders from one bucket, newest first, with the total count.
    pub fn list_orders(&self, bucket: Bucket, page: u64, limit: u64) -> (Vec<Order>, u64) {
        let orders = self.store.list(bucket);
        let total = orders.len() as u64;
        let start = page.saturating_sub(1).saturating_mul(limit) as usize;
        let page_items = orders
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();
        (page_items, total)
    }

    pub fn get_order(&self, order_number: &str) -> Result<(Bucket, Order), ServiceError> {
        self.store
            .get(order_number)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))
    }

    /// Full eligibility view for one team against one component.
    pub fn eligibility(
        &self,
        order_number: &str,
        item_id: &str,
        component_id: &str,
        team: &TeamId,
    ) -> Result<EligibilityReport, ServiceError> {
        let (_, order) = self.get_order(order_number)?;
        let component = find_component(&order, item_id, component_id)?;

        let remaining_qty = component
            .decoration(team)
            .map(|record| record.remaining())
            .unwrap_or(0);

        Ok(EligibilityReport {
            can_edit: eligibility::can_edit(component, team),
            can_work: eligibility::can_work(component, team),
            waiting_message: eligibility::waiting_message(component, team),
            vehicle_approval: vehicles::vehicle_approval_for_team(component, team),
            remaining_qty,
        })
    }

    /// Records produced quantity for a team. The edit gate and quantity
    /// validation run before anything mutates; the upstream report goes out
    /// before the local snapshot changes, so a transport failure leaves the
    /// cache untouched and retryable.
    #[instrument(skip(self, request), fields(team = %request.team, quantity = request.quantity))]
    pub async fn record_production(
        &self,
        order_number: &str,
        item_id: &str,
        component_id: &str,
        request: RecordProductionRequest,
    ) -> Result<Order, ServiceError> {
        request.validate()?;
        if request.quantity == 0 {
            return Err(ServiceError::ValidationError(
                "quantity delta must be non-zero".into(),
            ));
        }

        let (_, order) = self.get_order(order_number)?;
        let component = find_component(&order, item_id, component_id)?;

        let decision = eligibility::can_edit(component, &request.team);
        if !decision.allowed {
            let message = decision
                .message()
                .unwrap_or_else(|| "edit not allowed".to_string());
            warn!(component_id, "production edit refused: {}", message);
            return Err(ServiceError::Forbidden(message));
        }

        let record = component.decoration(&request.team).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no decoration record for team {} on component {}",
                request.team, component_id
            ))
        })?;

        let delta = request.quantity;
        if delta > 0 && delta > record.remaining() {
            return Err(ServiceError::ValidationError(format!(
                "quantity {} exceeds remaining capacity {}",
                delta,
                record.remaining()
            )));
        }
        if delta < 0 {
            if record.status == DecorationStatus::Dispatched {
                return Err(ServiceError::ValidationError(
                    "cannot roll back a dispatched component".into(),
                ));
            }
            if -delta > record.completed_qty {
                return Err(ServiceError::ValidationError(format!(
                    "rollback {} exceeds completed quantity {}",
                    -delta,
                    record.completed_qty
                )));
            }
        }

        let completed = record.completed_qty + delta;
        let status = if completed >= record.qty && record.qty > 0 {
            DecorationStatus::ReadyToDispatch
        } else if completed > 0 || record.status != DecorationStatus::Pending {
            DecorationStatus::InProgress
        } else {
            DecorationStatus::Pending
        };

        let stock_used = request.stock_used.unwrap_or(0);
        let report = ProductionReport {
            order_number: order_number.to_string(),
            item_id: item_id.to_string(),
            component_id: component_id.to_string(),
            team: request.team.clone(),
            quantity: delta,
            stock_used,
            notes: request.notes.clone(),
        };
        self.upstream.record_production(&report).await?;

        let mut history = component.tracking_history.clone();
        history.push(TrackingEntry {
            date: Utc::now(),
            quantity_produced: delta,
            stock_used,
            notes: request.notes.clone(),
        });

        let mut event = DecoEvent::new(
            EventKind::ProductionUpdated,
            order_number,
            item_id,
            component_id,
        );
        event.revision = component.revision + 1;
        event.updated_component.decorations = Some(HashMap::from([(
            request.team.clone(),
            DecorationPatch {
                qty: None,
                completed_qty: Some(completed),
                status: Some(status),
            },
        )]));
        event.updated_component.tracking_history = Some(history);

        apply_and_notify(self.store.as_ref(), &self.notices, &event)?;
        info!(
            order_number,
            component_id,
            completed,
            %status,
            "production recorded"
        );

        Ok(self.get_order(order_number)?.1)
    }

    /// Hands the component's output to the next stage. Only valid from
    /// `ReadyToDispatch`, and only for a team that currently holds the edit
    /// gate.
    #[instrument(skip(self, team), fields(team = %team))]
    pub async fn dispatch(
        &self,
        order_number: &str,
        item_id: &str,
        component_id: &str,
        team: &TeamId,
    ) -> Result<AppliedUpdate, ServiceError> {
        let (_, order) = self.get_order(order_number)?;
        let component = find_component(&order, item_id, component_id)?;

        let decision = eligibility::can_edit(component, team);
        if !decision.allowed {
            let message = decision
                .message()
                .unwrap_or_else(|| "dispatch not allowed".to_string());
            return Err(ServiceError::Forbidden(message));
        }

        let record = component.decoration(team).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no decoration record for team {} on component {}",
                team, component_id
            ))
        })?;
        if record.status != DecorationStatus::ReadyToDispatch {
            return Err(ServiceError::InvalidStatus(format!(
                "cannot dispatch from status {}",
                record.status
            )));
        }

        self.upstream
            .mark_dispatched(&DispatchReport {
                order_number: order_number.to_string(),
                item_id: item_id.to_string(),
                component_id: component_id.to_string(),
                team: team.clone(),
            })
            .await?;

        let mut event = DecoEvent::new(
            EventKind::ComponentDispatched,
            order_number,
            item_id,
            component_id,
        );
        event.revision = component.revision + 1;
        event.updated_component.decorations = Some(HashMap::from([(
            team.clone(),
            DecorationPatch {
                qty: None,
                completed_qty: None,
                status: Some(DecorationStatus::Dispatched),
            },
        )]));

        let applied = apply_and_notify(self.store.as_ref(), &self.notices, &event)?;
        info!(order_number, component_id, "component dispatched");
        Ok(applied)
    }

    /// Refetches the full order book from upstream and rebuilds the local
    /// buckets. This is the manual retry path for failed fetches.
    #[instrument(skip(self))]
    pub async fn resync(&self) -> Result<usize, ServiceError> {
        let orders = self.upstream.fetch_orders().await?;
        let count = orders.len();
        for mut order in orders {
            order.normalize();
            order.recompute_completion();
            let bucket = propagator::bucket_for(&order);
            self.store.upsert(bucket, order);
        }
        info!("resynced {} orders from upstream", count);
        Ok(count)
    }
}

/// Resolves an order/item/component path, mapping each miss to NotFound.
pub(crate) fn find_component<'a>(
    order: &'a Order,
    item_id: &str,
    component_id: &str,
) -> Result<&'a Component, ServiceError> {
    let item = order.item(item_id).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Item {} not found in order {}",
            item_id, order.order_number
        ))
    })?;
    item.component(component_id).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Component {} not found in item {}",
            component_id, item_id
        ))
    })
}
