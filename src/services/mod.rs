pub mod orders;
pub mod stock;
pub mod vehicles;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::client::UpstreamClient;
use crate::errors::ServiceError;
use crate::events::{DecoEvent, UpdateNotice};
use crate::propagator::{self, AppliedUpdate};
use crate::store::OrderStore;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<orders::OrderService>,
    pub vehicles: Arc<vehicles::VehicleService>,
    pub stock: Arc<stock::StockService>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn OrderStore>,
        upstream: Arc<UpstreamClient>,
        notices: broadcast::Sender<UpdateNotice>,
    ) -> Self {
        Self {
            orders: Arc::new(orders::OrderService::new(
                store.clone(),
                upstream.clone(),
                notices.clone(),
            )),
            vehicles: Arc::new(vehicles::VehicleService::new(
                store,
                upstream.clone(),
                notices,
            )),
            stock: Arc::new(stock::StockService::new(upstream)),
        }
    }
}

/// Applies a locally originated event to the store and fans the resulting
/// notice out to subscribed views. Locally built events always address a
/// cached order, so a miss is a real error here, unlike in the event loop.
pub(crate) fn apply_and_notify(
    store: &dyn OrderStore,
    notices: &broadcast::Sender<UpdateNotice>,
    event: &DecoEvent,
) -> Result<AppliedUpdate, ServiceError> {
    let applied = propagator::propagate(store, event).ok_or_else(|| {
        ServiceError::NotFound(format!("order {} is not cached", event.order_number))
    })?;

    let notice = UpdateNotice {
        order_number: event.order_number.clone(),
        item_id: event.item_id.clone(),
        component_id: event.component_id.clone(),
        kind: event.kind,
        bucket: applied.bucket,
        moved: applied.moved,
        version: applied.version,
    };
    if notices.send(notice).is_err() {
        debug!("no views subscribed for update notice");
    }
    Ok(applied)
}
