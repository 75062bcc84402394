//! Cross-team update propagation.
//!
//! Applies a remotely-originated update to the locally held order snapshot
//! and decides whether the order must change storage bucket. Patches use
//! merge semantics, not increments: applying the same event twice leaves
//! the state identical to applying it once.

use tracing::{debug, warn};

use crate::events::{ComponentPatch, DecoEvent};
use crate::models::component::{Component, DecorationStatus};
use crate::models::order::Order;
use crate::store::{Bucket, OrderStore};

/// What became of an event offered to [`apply_update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Patch merged into the order.
    Applied {
        bucket: Bucket,
        /// Whether `bucket` differs from where the order sat before.
        moved: bool,
    },
    /// Event revision was not newer than the component's applied revision.
    Stale,
    /// The addressed item or component is not in this snapshot.
    Missing,
}

/// Result of a store-level propagation, for fan-out to views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub bucket: Bucket,
    pub moved: bool,
    pub version: u64,
}

/// Storage bucket an order belongs in, derived from every decorated glass
/// component's per-team statuses: `Dispatched` once every team of every
/// decorated component has dispatched, `ReadyToDispatch` once every team is
/// at least terminal, `InProgress` otherwise.
pub fn bucket_for(order: &Order) -> Bucket {
    let mut saw_component = false;
    let mut all_dispatched = true;
    let mut all_terminal = true;

    for component in order.decorated_components() {
        saw_component = true;
        for team in component.deco_sequence.teams() {
            let status = component
                .decoration(team)
                .map(|record| record.status)
                .unwrap_or_default();
            all_dispatched &= status == DecorationStatus::Dispatched;
            all_terminal &= status.is_terminal();
        }
    }

    if !saw_component {
        return Bucket::InProgress;
    }
    if all_dispatched {
        Bucket::Dispatched
    } else if all_terminal {
        Bucket::ReadyToDispatch
    } else {
        Bucket::InProgress
    }
}

/// Merges a partial component patch. Fields absent from the patch survive;
/// `decorations` is merged key-by-key. `qty` lands before `completed_qty`
/// so the `0 <= completed_qty <= qty` invariant is clamped against the
/// patched quantity.
pub fn merge_component_patch(component: &mut Component, patch: &ComponentPatch) {
    if let Some(approved) = patch.is_deco_approved {
        component.is_deco_approved = approved;
    }
    let sequence_changed = match &patch.deco_sequence {
        Some(sequence) if *sequence != component.deco_sequence => {
            component.deco_sequence = sequence.clone();
            true
        }
        _ => false,
    };
    if let Some(decorations) = &patch.decorations {
        for (team, decoration) in decorations {
            let record = component.decorations.entry(team.clone()).or_default();
            if let Some(qty) = decoration.qty {
                record.qty = qty.max(0);
            }
            if let Some(completed) = decoration.completed_qty {
                record.completed_qty = completed.clamp(0, record.qty);
            }
            if let Some(status) = decoration.status {
                record.status = status;
            }
        }
    }
    if let Some(vehicles) = &patch.vehicle_details {
        component.vehicle_details = vehicles.clone();
    }
    if let Some(history) = &patch.tracking_history {
        component.tracking_history = history.clone();
    }
    if sequence_changed {
        component.normalize_decorations();
    }
}

/// Applies an event to an order snapshot in place. Nothing is touched until
/// the event has been located and passed the revision gate; stale or
/// mis-addressed events leave the snapshot byte-identical.
pub fn apply_update(order: &mut Order, event: &DecoEvent) -> ApplyOutcome {
    let previous_bucket = bucket_for(order);

    let Some(item_idx) = order.items.iter().position(|i| i.item_id == event.item_id) else {
        warn!(
            order_number = %order.order_number,
            item_id = %event.item_id,
            "update event for unknown item; ignoring"
        );
        return ApplyOutcome::Missing;
    };
    let Some(component_idx) = order.items[item_idx]
        .components
        .iter()
        .position(|c| c.component_id == event.component_id)
    else {
        warn!(
            order_number = %order.order_number,
            item_id = %event.item_id,
            component_id = %event.component_id,
            "update event for unknown component; ignoring"
        );
        return ApplyOutcome::Missing;
    };

    // revision 0 means an unversioned producer; merge semantics alone keep
    // those idempotent
    let applied_revision = order.items[item_idx].components[component_idx].revision;
    if event.revision != 0 && event.revision <= applied_revision {
        debug!(
            component_id = %event.component_id,
            applied = applied_revision,
            received = event.revision,
            "stale event rejected"
        );
        return ApplyOutcome::Stale;
    }

    let item = &mut order.items[item_idx];
    if let Some(patch) = &event.item_changes {
        if let Some(status) = &patch.status {
            item.status = Some(status.clone());
        }
        if let Some(name) = &patch.name {
            item.name = name.clone();
        }
    }

    let component = &mut item.components[component_idx];
    merge_component_patch(component, &event.updated_component);
    component.revision = component.revision.max(event.revision);

    if let Some(patch) = &event.order_changes {
        if let Some(status) = &patch.status {
            order.status = Some(status.clone());
        }
        if let Some(manager) = &patch.manager_name {
            order.manager_name = Some(manager.clone());
        }
    }

    order.recompute_completion();
    let bucket = bucket_for(order);
    ApplyOutcome::Applied {
        bucket,
        moved: bucket != previous_bucket,
    }
}

/// Applies an inbound event against the injected store. Returns `None` when
/// the event referenced an order this view does not hold, or was stale: a
/// remote event for an uncached order is not an error, just irrelevant.
pub fn propagate(store: &dyn OrderStore, event: &DecoEvent) -> Option<AppliedUpdate> {
    let Some((current_bucket, mut order)) = store.get(&event.order_number) else {
        warn!(
            order_number = %event.order_number,
            kind = %event.kind,
            "event for uncached order; ignoring"
        );
        return None;
    };

    match apply_update(&mut order, event) {
        ApplyOutcome::Applied { bucket, moved } => {
            let order_number = order.order_number.clone();
            store.upsert(current_bucket, order);
            if moved {
                store.move_to(&order_number, bucket);
            }
            Some(AppliedUpdate {
                bucket,
                moved,
                version: store.version(),
            })
        }
        ApplyOutcome::Stale | ApplyOutcome::Missing => None,
    }
}
