use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::component::Component;
use crate::models::item::Item;

/// Top-level unit of work, created upstream when a sales order is placed.
///
/// Orders are never deleted locally; they only migrate between the three
/// storage buckets as their components progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    /// Business key, unique across the order book.
    pub order_number: String,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub manager_name: Option<String>,

    /// Upstream's own status label, carried through untouched.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Order-level completion, 0-100, recomputed on every applied update.
    #[serde(default)]
    pub completion_pct: f64,
}

impl Order {
    pub fn new(order_number: impl Into<String>, customer_name: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            customer_name: customer_name.into(),
            manager_name: None,
            status: None,
            items: Vec::new(),
            created_at: Utc::now(),
            completion_pct: 0.0,
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// All components that participate in the decoration workflow.
    pub fn decorated_components(&self) -> impl Iterator<Item = &Component> {
        self.items
            .iter()
            .flat_map(|item| item.components.iter())
            .filter(|c| c.is_decorated_glass())
    }

    /// Restores component invariants across the whole order (see
    /// [`Component::normalize_decorations`]).
    pub fn normalize(&mut self) {
        for item in &mut self.items {
            for component in &mut item.components {
                component.normalize_decorations();
            }
        }
    }

    /// Recomputes `completion_pct` as completed units over required units
    /// across every team record of every decorated component.
    pub fn recompute_completion(&mut self) {
        let mut required: i64 = 0;
        let mut completed: i64 = 0;
        for component in self.decorated_components() {
            for team in component.deco_sequence.teams() {
                if let Some(record) = component.decoration(team) {
                    required += record.qty;
                    completed += record.completed_qty.min(record.qty);
                }
            }
        }
        self.completion_pct = if required == 0 {
            0.0
        } else {
            (completed as f64 / required as f64) * 100.0
        };
    }
}
