//! Local order store.
//!
//! Each team view holds a mirror of the upstream order book, partitioned
//! into the three dashboard buckets. The store is injected as a capability
//! (rather than reached for as ambient state) so the engine can be driven
//! deterministically in tests. A monotonic version counter is bumped on
//! every write so dependent views know to re-render.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::order::Order;

/// Storage partition an order lives in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Bucket {
    InProgress,
    ReadyToDispatch,
    Dispatched,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::InProgress, Bucket::ReadyToDispatch, Bucket::Dispatched];

    fn index(self) -> usize {
        match self {
            Bucket::InProgress => 0,
            Bucket::ReadyToDispatch => 1,
            Bucket::Dispatched => 2,
        }
    }
}

/// Read/write contract over the partitioned order mirror.
pub trait OrderStore: Send + Sync {
    /// Looks an order up across all buckets.
    fn get(&self, order_number: &str) -> Option<(Bucket, Order)>;

    fn list(&self, bucket: Bucket) -> Vec<Order>;

    /// Inserts or replaces an order in `bucket`, removing any copy held
    /// under another bucket so the order number stays unique store-wide.
    fn upsert(&self, bucket: Bucket, order: Order);

    /// Remove-from-one/append-to-other move keyed by order number. Returns
    /// false when the order is not held.
    fn move_to(&self, order_number: &str, bucket: Bucket) -> bool;

    fn remove(&self, order_number: &str) -> bool;

    fn clear(&self);

    /// Monotonic version, bumped on every write.
    fn version(&self) -> u64;
}

/// In-memory store backing a single team view.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    partitions: [DashMap<String, Order>; 3],
    version: AtomicU64,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, bucket: Bucket) -> &DashMap<String, Order> {
        &self.partitions[bucket.index()]
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }
}

impl OrderStore for InMemoryOrderStore {
    fn get(&self, order_number: &str) -> Option<(Bucket, Order)> {
        for bucket in Bucket::ALL {
            if let Some(order) = self.partition(bucket).get(order_number) {
                return Some((bucket, order.clone()));
            }
        }
        None
    }

    fn list(&self, bucket: Bucket) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .partition(bucket)
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    fn upsert(&self, bucket: Bucket, order: Order) {
        for other in Bucket::ALL {
            if other != bucket {
                self.partition(other).remove(&order.order_number);
            }
        }
        self.partition(bucket).insert(order.order_number.clone(), order);
        self.bump();
    }

    fn move_to(&self, order_number: &str, bucket: Bucket) -> bool {
        let Some((current, order)) = self.get(order_number) else {
            return false;
        };
        if current == bucket {
            return true;
        }
        self.partition(current).remove(order_number);
        self.partition(bucket).insert(order_number.to_string(), order);
        self.bump();
        true
    }

    fn remove(&self, order_number: &str) -> bool {
        let removed = Bucket::ALL
            .iter()
            .any(|bucket| self.partition(*bucket).remove(order_number).is_some());
        if removed {
            self.bump();
        }
        removed
    }

    fn clear(&self) {
        for bucket in Bucket::ALL {
            self.partition(bucket).clear();
        }
        self.bump();
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}
